//! Property tests for the arithmetic/flag laws in the design doc's testable
//! properties section. These are universally quantified over register
//! values, which is exactly what `proptest` is for rather than a hand-rolled
//! loop over a handful of examples.

use invaders8080::cpu::flags::parity;
use invaders8080::cpu::CpuState;
use proptest::prelude::*;

/// Builds a CPU with `a` preloaded into the accumulator and a single
/// instruction at address 0 operating on an immediate operand `d`.
fn cpu_for(opcode: u8, a: u8, d: u8) -> CpuState {
    let mut cpu = CpuState::new();
    cpu.a = a;
    cpu.memory.write(0, opcode);
    cpu.memory.write(1, d);
    cpu
}

proptest! {
    #[test]
    fn add_matches_wraparound_and_carry_law(a in any::<u8>(), d in any::<u8>()) {
        let mut cpu = cpu_for(0xC6, a, d); // ADI d8
        cpu.step();
        let expected = (a as u16 + d as u16) & 0xff;
        prop_assert_eq!(cpu.a as u16, expected);
        prop_assert_eq!(cpu.flags.cy, (a as u16 + d as u16) > 0xff);
        prop_assert_eq!(cpu.flags.z, cpu.a == 0);
        prop_assert_eq!(cpu.flags.s, cpu.a & 0x80 != 0);
        prop_assert_eq!(cpu.flags.p, parity(cpu.a));
    }

    #[test]
    fn sub_matches_wraparound_and_borrow_law(a in any::<u8>(), d in any::<u8>()) {
        let mut cpu = cpu_for(0xD6, a, d); // SUI d8
        cpu.step();
        let expected = (a as i16 - d as i16).rem_euclid(256) as u8;
        prop_assert_eq!(cpu.a, expected);
        prop_assert_eq!(cpu.flags.cy, a < d);
    }

    #[test]
    fn inr_never_touches_carry_and_always_updates_zsp(b in any::<u8>(), cy in any::<bool>()) {
        let mut cpu = CpuState::new();
        cpu.b = b;
        cpu.flags.cy = cy;
        cpu.memory.write(0, 0x04); // INR B
        cpu.step();
        prop_assert_eq!(cpu.flags.cy, cy);
        prop_assert_eq!(cpu.b, b.wrapping_add(1));
        prop_assert_eq!(cpu.flags.z, cpu.b == 0);
        prop_assert_eq!(cpu.flags.s, cpu.b & 0x80 != 0);
        prop_assert_eq!(cpu.flags.p, parity(cpu.b));
    }

    #[test]
    fn dcr_never_touches_carry_and_always_updates_zsp(b in any::<u8>(), cy in any::<bool>()) {
        let mut cpu = CpuState::new();
        cpu.b = b;
        cpu.flags.cy = cy;
        cpu.memory.write(0, 0x05); // DCR B
        cpu.step();
        prop_assert_eq!(cpu.flags.cy, cy);
        prop_assert_eq!(cpu.b, b.wrapping_sub(1));
    }

    #[test]
    fn logic_ops_always_clear_carry(a in any::<u8>(), d in any::<u8>()) {
        for opcode in [0xE6u8, 0xEE, 0xF6] { // ANI, XRI, ORI
            let mut cpu = cpu_for(opcode, a, d);
            cpu.flags.cy = true;
            cpu.step();
            prop_assert!(!cpu.flags.cy);
        }
    }

    #[test]
    fn parity_is_even_bit_count(value in any::<u8>()) {
        prop_assert_eq!(parity(value), value.count_ones() % 2 == 0);
    }

    #[test]
    fn jmp_leaves_pc_at_target_regardless_of_flags(
        addr in any::<u16>(), z in any::<bool>(), cy in any::<bool>(), s in any::<bool>()
    ) {
        let mut cpu = CpuState::new();
        cpu.memory.write(0, 0xC3);
        let [lo, hi] = addr.to_le_bytes();
        cpu.memory.write(1, lo);
        cpu.memory.write(2, hi);
        cpu.flags.z = z;
        cpu.flags.cy = cy;
        cpu.flags.s = s;
        cpu.step();
        prop_assert_eq!(cpu.pc, addr);
    }
}
