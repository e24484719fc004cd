//! C3: the cabinet's custom I/O ports. Two input latches, the hardware
//! bit-shift register (ports 2/3/4), and the sound-edge detector (ports
//! 3/5) that turns level writes into discrete sample triggers.

pub mod sound;

use sound::{ChannelHandle, SoundId, SoundSink};

use crate::input::CabinetInputs;

/// `INP1` bit 3 is wired high on the real cabinet; an implementation is
/// free to leave it low, but matching the hardware costs nothing and keeps
/// a raw port dump comparable to a reference trace.
const INP1_ALWAYS_ONE: u8 = 1 << 3;

pub struct Ports {
    inp1: u8,
    inp2: u8,
    shift: u16,
    shift_offset: u8,
    prev_p3: u8,
    prev_p5: u8,
    ufo_channel: Option<ChannelHandle>,
}

impl Ports {
    pub fn new() -> Self {
        Ports {
            inp1: INP1_ALWAYS_ONE,
            inp2: 0,
            shift: 0,
            shift_offset: 0,
            prev_p3: 0,
            prev_p5: 0,
            ufo_channel: None,
        }
    }

    /// Folds the host's translated key state into `INP1`/`INP2`. Called once
    /// per scheduler tick, before any `IN` reads are serviced.
    pub fn latch_inputs(&mut self, input: &CabinetInputs) {
        let mut inp1 = INP1_ALWAYS_ONE;
        inp1 |= input.credit as u8;
        inp1 |= (input.p2_start as u8) << 1;
        inp1 |= (input.p1_start as u8) << 2;
        inp1 |= (input.p1_shoot as u8) << 4;
        inp1 |= (input.p1_left as u8) << 5;
        inp1 |= (input.p1_right as u8) << 6;
        self.inp1 = inp1;

        let mut inp2 = 0u8;
        inp2 |= input.dip3 as u8;
        inp2 |= (input.dip5 as u8) << 1;
        inp2 |= (input.tilt as u8) << 2;
        inp2 |= (input.dip6 as u8) << 3;
        inp2 |= (input.p2_shoot as u8) << 4;
        inp2 |= (input.p2_left as u8) << 5;
        inp2 |= (input.p2_right as u8) << 6;
        inp2 |= (input.dip7 as u8) << 7;
        self.inp2 = inp2;
    }

    /// `IN` port read. Any port outside {1,2,3} is a programmer error in
    /// the guest ROM and is therefore a fatal diagnostic, per the error
    /// handling design.
    pub fn read(&self, port: u8) -> u8 {
        match port {
            1 => self.inp1,
            2 => self.inp2,
            3 => (self.shift >> (8 - self.shift_offset)) as u8,
            other => {
                log::error!("unknown IN port {other}");
                panic!("unknown IN port {other}");
            }
        }
    }

    /// `OUT` port write. Ports 2/3/4/5/6 are serviced; anything else is a
    /// fatal diagnostic.
    pub fn write(&mut self, port: u8, value: u8, sound: &mut dyn SoundSink) {
        match port {
            2 => self.shift_offset = value & 0x7,
            4 => self.shift = ((value as u16) << 8) | (self.shift >> 8),
            3 => {
                let prev = self.prev_p3;
                if rising_edge(prev, value, 0) {
                    self.ufo_channel = Some(sound.play_loop(SoundId::Ufo));
                } else if falling_edge(prev, value, 0) {
                    if let Some(channel) = self.ufo_channel.take() {
                        sound.stop(channel);
                    }
                }
                if rising_edge(prev, value, 1) {
                    sound.play_once(SoundId::Shot);
                }
                if rising_edge(prev, value, 2) {
                    sound.play_once(SoundId::PlayerDie);
                }
                if rising_edge(prev, value, 3) {
                    sound.play_once(SoundId::InvaderDie);
                }
                self.prev_p3 = value;
            }
            5 => {
                let prev = self.prev_p5;
                if rising_edge(prev, value, 0) {
                    sound.play_once(SoundId::FleetMove1);
                }
                if rising_edge(prev, value, 1) {
                    sound.play_once(SoundId::FleetMove2);
                }
                if rising_edge(prev, value, 2) {
                    sound.play_once(SoundId::FleetMove3);
                }
                if rising_edge(prev, value, 3) {
                    sound.play_once(SoundId::FleetMove4);
                }
                if rising_edge(prev, value, 4) {
                    sound.play_once(SoundId::UfoDie);
                }
                self.prev_p5 = value;
            }
            6 => log::debug!("watchdog OUT 6 ignored (value {value:#04x})"),
            other => {
                log::error!("unknown OUT port {other}");
                panic!("unknown OUT port {other}");
            }
        }
    }
}

impl Default for Ports {
    fn default() -> Self {
        Ports::new()
    }
}

fn rising_edge(prev: u8, cur: u8, bit: u8) -> bool {
    prev & (1 << bit) == 0 && cur & (1 << bit) != 0
}

fn falling_edge(prev: u8, cur: u8, bit: u8) -> bool {
    prev & (1 << bit) != 0 && cur & (1 << bit) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use sound::NullSink;

    #[test]
    fn shift_register_scenario_s3() {
        let mut ports = Ports::new();
        let mut sink = NullSink::default();
        ports.write(4, 0xAB, &mut sink);
        assert_eq!(ports.shift, 0xAB00);
        ports.write(4, 0xCD, &mut sink);
        assert_eq!(ports.shift, 0xCDAB);
        ports.write(2, 4, &mut sink);
        assert_eq!(ports.shift_offset, 4);
        assert_eq!(ports.read(3), 0xDA);
    }

    #[test]
    fn inp1_bit3_is_always_set() {
        let ports = Ports::new();
        assert_eq!(ports.read(1) & INP1_ALWAYS_ONE, INP1_ALWAYS_ONE);
    }

    #[test]
    fn credit_bit_round_trips_through_latch() {
        let mut ports = Ports::new();
        let mut input = CabinetInputs::default();
        input.credit = true;
        ports.latch_inputs(&input);
        assert_eq!(ports.read(1) & 0x1, 0x1);
        input.credit = false;
        ports.latch_inputs(&input);
        assert_eq!(ports.read(1) & 0x1, 0x0);
    }

    #[test]
    fn ufo_loop_starts_and_stops_on_bit0_edges() {
        let mut ports = Ports::new();
        let mut sink = NullSink::default();
        ports.write(3, 0b0000_0001, &mut sink);
        assert!(ports.ufo_channel.is_some());
        ports.write(3, 0b0000_0000, &mut sink);
        assert!(ports.ufo_channel.is_none());
    }

    #[test]
    #[should_panic(expected = "unknown IN port")]
    fn unknown_in_port_is_fatal() {
        let ports = Ports::new();
        ports.read(7);
    }
}
