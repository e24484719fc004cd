//! Intel 8080 interpreter and cabinet I/O for the 1978 Space Invaders ROM.
//!
//! The four cooperating components (memory region policy, CPU, cabinet
//! ports, and the real-time scheduler) are each their own module; this
//! crate root only wires them into the `Emulator` facade a host binary
//! drives one `tick` at a time.

pub mod cpu;
pub mod devices;
pub mod error;
pub mod input;
pub mod memory;
pub mod scheduler;
pub mod video;

use cpu::CpuState;
use devices::sound::SoundSink;
use error::RomError;
use input::InputSource;
use memory::{Memory, RomImage};
use scheduler::{FrameSink, Scheduler, Signal};

/// Top-level facade: owns the CPU/memory/ports through a `Scheduler` and
/// exposes a single `tick` the host's event loop calls repeatedly. The host
/// owns the "quit" decision (window closed, `Signal::Quit` returned, or
/// its own reason) — this type never loops internally.
pub struct Emulator<'a> {
    scheduler: Scheduler<'a>,
}

impl<'a> Emulator<'a> {
    /// Loads `rom` into a fresh `CpuState` and wires it to a `Scheduler`.
    /// `cpudiag` mirrors the binary's `--cpudiag` flag: when set, writes to
    /// the ROM region are allowed, which the `cpudiag.bin` 8080 self-test
    /// program needs since it patches itself in place. `play_speed` scales
    /// the wall-clock-to-cycle conversion (1.0 is real time).
    pub fn new(rom: &RomImage, cpudiag: bool, play_speed: f64, sound: &'a mut dyn SoundSink) -> Self {
        let mut memory = Memory::with_rom_writes_allowed(cpudiag);
        memory.load_rom(rom);
        let cpu = CpuState::with_memory(memory);
        Emulator { scheduler: Scheduler::new(cpu, sound, play_speed) }
    }

    /// Loads a ROM from disk; the only fallible entry point the core owns.
    pub fn from_path<P: AsRef<std::path::Path>>(
        path: P,
        cpudiag: bool,
        play_speed: f64,
        sound: &'a mut dyn SoundSink,
    ) -> Result<Self, RomError> {
        let rom = RomImage::load(path)?;
        Ok(Self::new(&rom, cpudiag, play_speed, sound))
    }

    /// Drives one scheduler iteration: latches input, retires the cycle
    /// budget owed since the last call, services interrupts, and presents
    /// a frame if the render deadline has elapsed.
    pub fn tick(&mut self, input: &mut dyn InputSource, frame_sink: &mut dyn FrameSink) -> Signal {
        self.scheduler.tick(input, frame_sink)
    }

    /// Read-only view of video RAM, for callers that want to decode a frame
    /// outside the render-deadline cadence (e.g. a test harness).
    pub fn video_ram(&self) -> &[u8] {
        self.scheduler.cpu.memory.video_ram()
    }

    pub fn cpu(&self) -> &CpuState {
        &self.scheduler.cpu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devices::sound::NullSink;
    use input::NoInput;
    use scheduler::NullFrameSink;

    #[test]
    fn emulator_runs_a_tiny_program_headlessly() {
        let rom_bytes = vec![0x00u8; 64]; // NOPs; never halts on its own.
        let rom = RomImage { bytes: rom_bytes };
        let mut sink = NullSink::default();
        let mut emulator = Emulator::new(&rom, false, 1.0, &mut sink);
        let mut input = NoInput;
        let mut frame_sink = NullFrameSink;
        let signal = emulator.tick(&mut input, &mut frame_sink);
        assert_eq!(signal, Signal::Ok);
    }

    #[test]
    fn hlt_opcode_ends_emulation() {
        let mut rom_bytes = vec![0x00u8; 64];
        rom_bytes[0] = 0x76; // HLT
        let rom = RomImage { bytes: rom_bytes };
        let mut sink = NullSink::default();
        let mut emulator = Emulator::new(&rom, false, 1.0, &mut sink);
        let mut input = NoInput;
        let mut frame_sink = NullFrameSink;
        // Force a non-trivial cycle budget by backdating isn't exposed here,
        // so step the CPU directly through the facade's scheduler instead.
        emulator.scheduler.cpu.step();
        assert!(emulator.scheduler.cpu.halted);
        let _ = (input, frame_sink); // kept for parity with the tick-based tests
    }
}
