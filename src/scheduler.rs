//! C4: the real-time pacing loop. Bridges the 8080's separate I/O address
//! space to the cabinet ports, steps the CPU against a wall-clock cycle
//! budget, and injects the two per-frame interrupts the ROM expects.

use std::time::{Duration, Instant};

use crate::cpu::CpuState;
use crate::devices::sound::SoundSink;
use crate::devices::Ports;
use crate::input::InputSource;
use crate::video;

pub const CPU_HZ: f64 = 2_000_000.0;
pub const INT_HZ: f64 = 120.0;
/// Cycles retired between consecutive interrupts at 1x speed: `CPU_HZ / INT_HZ`.
pub const CYCLES_PER_HALF_FRAME: i64 = (CPU_HZ / INT_HZ) as i64;

const OPCODE_IN: u8 = 0xDB;
const OPCODE_OUT: u8 = 0xD3;
const RENDER_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Mid-frame and end-of-frame interrupt vectors, corresponding to `RST 1`
/// and `RST 2` on the real cabinet.
const VECTOR_MID_FRAME: u8 = 1;
const VECTOR_END_OF_FRAME: u8 = 2;

/// Collaborator boundary for presentation: one push per render deadline.
pub trait FrameSink {
    fn present(&mut self, frame: &[u32]);
}

/// A `FrameSink` that discards every frame, for headless runs.
#[derive(Debug, Default)]
pub struct NullFrameSink;

impl FrameSink for NullFrameSink {
    fn present(&mut self, _frame: &[u32]) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Ok,
    Quit,
}

/// Drives one `CpuState` at real-time pace, dispatching IN/OUT to `Ports`
/// and servicing the two per-frame interrupts. Owns no window or audio
/// device itself; those are reached only through the collaborator traits.
pub struct Scheduler<'a> {
    pub cpu: CpuState,
    pub ports: Ports,
    sound: &'a mut dyn SoundSink,
    play_speed: f64,
    cycles_until_interrupt: i64,
    next_vector: u8,
    last_tick: Instant,
    last_render: Instant,
    paused: bool,
    prev_pause_key: bool,
}

impl<'a> Scheduler<'a> {
    pub fn new(cpu: CpuState, sound: &'a mut dyn SoundSink, play_speed: f64) -> Self {
        let now = Instant::now();
        Scheduler {
            cpu,
            ports: Ports::new(),
            sound,
            play_speed,
            cycles_until_interrupt: CYCLES_PER_HALF_FRAME,
            next_vector: VECTOR_MID_FRAME,
            last_tick: now,
            last_render: now,
            paused: false,
            prev_pause_key: false,
        }
    }

    /// One iteration of the outer loop: latch input, retire the cycle
    /// budget owed since the last tick, service interrupts along the way,
    /// and present a frame if the 60 Hz render deadline has elapsed.
    ///
    /// The host may suspend between calls to `tick`, but once inside the
    /// inner catch-up loop this runs to completion or exhausts the budget;
    /// there is no mid-burst yield point.
    pub fn tick(&mut self, input: &mut dyn InputSource, frame_sink: &mut dyn FrameSink) -> Signal {
        let inputs = input.poll();
        if inputs.pause && !self.prev_pause_key {
            self.paused = !self.paused;
        }
        self.prev_pause_key = inputs.pause;
        self.ports.latch_inputs(&inputs);

        let now = Instant::now();
        if self.paused {
            // Refresh the wall-clock reference so resuming never floods the
            // CPU with a catch-up burst covering the paused interval.
            self.last_tick = now;
            return Signal::Ok;
        }

        let elapsed = now.duration_since(self.last_tick).as_secs_f64();
        self.last_tick = now;
        let mut budget = (elapsed * CPU_HZ * self.play_speed) as i64;

        while budget > 0 {
            if self.cpu.halted {
                return Signal::Quit;
            }
            let cycles = self.step_one() as i64;
            budget -= cycles;
            self.cycles_until_interrupt -= cycles;

            if self.cpu.int_enable && self.cycles_until_interrupt <= 0 {
                self.cpu.interrupt(self.next_vector);
                self.next_vector = match self.next_vector {
                    VECTOR_MID_FRAME => VECTOR_END_OF_FRAME,
                    _ => VECTOR_MID_FRAME,
                };
                self.cycles_until_interrupt += CYCLES_PER_HALF_FRAME;
            }
        }

        if now.duration_since(self.last_render) >= RENDER_INTERVAL {
            let frame = video::decode_frame(self.cpu.memory.video_ram());
            frame_sink.present(&frame);
            self.last_render = now;
        }

        Signal::Ok
    }

    /// The IN/OUT fast path: the 8080 has no memory-mapped I/O, so the
    /// scheduler (not the CPU) is the only component that can bridge
    /// `PC`-adjacent opcode bytes to the cabinet's separate port space.
    fn step_one(&mut self) -> u32 {
        let pc = self.cpu.pc;
        let opcode = self.cpu.memory.read(pc);
        match opcode {
            OPCODE_IN => {
                let port = self.cpu.memory.read(pc.wrapping_add(1));
                self.cpu.a = self.ports.read(port);
                self.cpu.pc = pc.wrapping_add(2);
                10
            }
            OPCODE_OUT => {
                let port = self.cpu.memory.read(pc.wrapping_add(1));
                let value = self.cpu.a;
                self.ports.write(port, value, &mut *self.sound);
                self.cpu.pc = pc.wrapping_add(2);
                10
            }
            _ => self.cpu.step(),
        }
    }
}
