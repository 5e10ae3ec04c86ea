use crate::bus::{Fault, FlatMemory};
use crate::cpu_xl::test_helpers::*;
use crate::cpu_xl::{CpuXl, StatusFlag};
use crate::opcodes::{find_opcode, Instruction, Mode};

fn op(instruction: Instruction, mode: Mode) -> u8 {
    find_opcode(instruction, mode).unwrap()
}

mod reset {
    use super::*;

    #[test]
    fn reset_loads_the_vector_and_zeroes_the_register_file() {
        let mut cpu = CpuXl::new(FlatMemory::new());
        cpu.bus.write_word(0xFFFE, 0x1234);
        // Scribble over the state to prove reset clears it.
        cpu.a = 0xAA;
        cpu.x = 0xBB;
        cpu.y = 0xCC;
        cpu.s = 0xDD;
        cpu.f = 0xEE;
        cpu.next_b_flag = true;
        cpu.restart();
        cpu.int_break();
        cpu.int_react();

        assert!(!cpu.cycle(), "the reset sequence is not an instruction");
        assert_eq!(cpu.pc, 0x1234);
        assert_eq!((cpu.a, cpu.x, cpu.y, cpu.s, cpu.f), (0, 0, 0, 0, 0));
        assert!(!cpu.is_reset && !cpu.is_break && !cpu.is_react);
        assert!(!cpu.next_b_flag);

        // One residual cycle, then the first instruction begins.
        assert!(!cpu.cycle());
        assert_eq!(cpu.icycles, 0);
        assert!(cpu.cycle());
    }

    #[test]
    fn restart_only_raises_the_request_line() {
        let mut cpu = CpuXl::new(FlatMemory::new());
        cpu.pc = 0x4444;
        cpu.restart();
        assert!(cpu.is_reset);
        assert_eq!(cpu.pc, 0x4444);
    }
}

mod cycles {
    use super::*;
    use crate::opcodes::COMBOS;

    fn mode_cycles(mode: Mode) -> u16 {
        match mode {
            Mode::Implied | Mode::Immediate => 0,
            Mode::Relative | Mode::ZeroPage | Mode::ZeroPageX | Mode::ZeroPageY => 1,
            Mode::Absolute | Mode::AbsoluteIndexedX | Mode::AbsoluteIndexedY => 2,
            Mode::IndirectX | Mode::IndirectY => 3,
            Mode::Indirect => 4,
        }
    }

    fn instruction_cycles(instruction: Instruction) -> u16 {
        use Instruction::*;
        match instruction {
            RTI => 3,
            RET | CAL => 2,
            INC | DEC | NOT | SHL | SHR => 2,
            FOR | FND => 1,
            LDA | LDX | LDY | STA | STX | STY => 1,
            PLA | PLF | PLX | PLY | PHA | PHF | PHX | PHY => 1,
            CMP | CPX | CPY | SBC | SUB | ADC | ADD => 1,
            BOR | XOR | AND | BIT => 1,
            _ => 0,
        }
    }

    /// Every opcode costs its addressing-mode cycles plus its intrinsic
    /// cycles plus the fetch cycle. brk is excluded: it hands off to the
    /// interrupt controller, which bills separately.
    #[test]
    fn every_opcode_matches_its_documented_cost() {
        for (byte, combo) in COMBOS.iter().enumerate() {
            if combo.instruction == Instruction::BRK {
                continue;
            }
            let expected = 1 + mode_cycles(combo.mode) + instruction_cycles(combo.instruction);
            let measured = measured_cycles(&[byte as u8, 0, 0]);
            assert_eq!(
                measured, expected,
                "opcode {:#04X} ({:?} {:?})",
                byte, combo.instruction, combo.mode
            );
        }
    }

    #[test]
    fn landmark_costs() {
        // lda #n: fetch + load.
        assert_eq!(measured_cycles(&[0x30, 0x41]), 2);
        // lda abs: fetch + two operand cycles + load.
        assert_eq!(measured_cycles(&[0x31, 0x00, 0x10]), 4);
        // lda through a vector: fetch + four + load.
        assert_eq!(measured_cycles(&[0x33, 0x00, 0x10]), 6);
        // Conditional jump: fetch + rel, taken or not.
        assert_eq!(measured_cycles(&[0x1F, 0x05]), 2);
        // cal abs: fetch + two operand cycles + two for the push.
        assert_eq!(measured_cycles(&[0x71, 0x00, 0x90]), 5);
        // inc abs: fetch + two + read-modify-write.
        assert_eq!(measured_cycles(&[0x80, 0x00, 0x10]), 5);
        // nop: just the fetch.
        assert_eq!(measured_cycles(&[0x07]), 1);
    }
}

mod stack {
    use super::*;

    #[test]
    fn push_stores_then_grows_upward() {
        // lda #$AB, pha, pla
        let mut cpu = cpu_with_program(&[0x30, 0xAB, 0x20, 0x24]);
        settle(&mut cpu);
        step_n(&mut cpu, 2);
        assert_eq!(cpu.bus.mem[0x0100], 0xAB);
        assert_eq!(cpu.s, 1);
        step(&mut cpu);
        assert_eq!(cpu.a, 0xAB);
        assert_eq!(cpu.s, 0);
        assert_eq!(cpu.f, N);
    }

    #[test]
    fn stack_index_wraps_within_the_page() {
        // lda #$FF, tas, pha
        let mut cpu = cpu_with_program(&[0x30, 0xFF, 0x29, 0x20]);
        settle(&mut cpu);
        step_n(&mut cpu, 3);
        assert_eq!(cpu.bus.mem[0x01FF], 0xFF);
        assert_eq!(cpu.s, 0x00);
    }

    #[test]
    fn words_push_high_then_low() {
        let mut cpu = CpuXl::new(FlatMemory::new());
        cpu.push_word(0x1234);
        assert_eq!(cpu.bus.mem[0x0100], 0x12);
        assert_eq!(cpu.bus.mem[0x0101], 0x34);
        assert_eq!(cpu.s, 2);
        assert_eq!(cpu.pull_word(), 0x1234);
        assert_eq!(cpu.s, 0);
    }

    #[test]
    fn push_pull_round_trips_any_byte() {
        let mut cpu = CpuXl::new(FlatMemory::new());
        for value in [0x00, 0x01, 0x7F, 0x80, 0xFF] {
            let initial_s = cpu.s;
            cpu.push(value);
            assert_eq!(cpu.pull(), value);
            assert_eq!(cpu.s, initial_s);
        }
    }
}

mod flags {
    use super::*;

    #[test]
    fn set_then_get_every_mask() {
        let mut cpu = CpuXl::new(FlatMemory::new());
        let masks = [
            StatusFlag::Break,
            StatusFlag::Carry,
            StatusFlag::Disable,
            StatusFlag::Negative,
            StatusFlag::Reserve,
            StatusFlag::User,
            StatusFlag::Overflow,
            StatusFlag::Zero,
        ];
        for mask in masks {
            cpu.set_flag(mask, true);
            assert!(cpu.get_flag(mask));
            assert_eq!(cpu.f, mask as u8);
            cpu.set_flag(mask, false);
            assert!(!cpu.get_flag(mask));
            assert_eq!(cpu.f, 0);
        }
    }

    #[test]
    fn reserved_bits_hold_what_was_written() {
        // for #(R | U), then a nop: nothing clears them.
        let mut cpu = cpu_with_program(&[0x04, R | U, 0x07]);
        settle(&mut cpu);
        step_n(&mut cpu, 2);
        assert_eq!(cpu.f, R | U);
    }
}

mod interrupts {
    use super::*;

    fn cpu_with_vectors(program: &[u8]) -> CpuXl<FlatMemory> {
        let mut cpu = cpu_with_program(program);
        cpu.bus.write_word(0xFFFA, 0x9000);
        cpu.bus.write_word(0xFFFC, 0xA000);
        cpu
    }

    #[test]
    fn reset_outranks_react_outranks_break() {
        let mut cpu = cpu_with_vectors(&[0x07]);
        cpu.int_break();
        cpu.int_react();
        cpu.int_reset();
        cpu.cycle();
        // Reset went first and swallowed the other requests.
        assert_eq!(cpu.pc, 0x8000);
        assert!(!cpu.is_break && !cpu.is_react && !cpu.is_reset);
        cpu.cycle();

        // With reset out of the way, react wins over break.
        cpu.int_break();
        cpu.int_react();
        assert!(!cpu.cycle());
        assert_eq!(cpu.pc, 0xA000);
        assert!(!cpu.is_break && !cpu.is_react);
        assert!(cpu.get_flag(StatusFlag::Disable));
    }

    #[test]
    fn break_request_is_gated_by_flag_d() {
        let mut cpu = cpu_with_vectors(&[0x07, 0x07]);
        settle(&mut cpu);
        cpu.set_flag(StatusFlag::Disable, true);
        cpu.int_break();
        // The request is consumed but an ordinary instruction runs.
        assert!(cpu.cycle());
        assert!(!cpu.is_break);
        assert_eq!(cpu.pc, 0x8001);
    }

    #[test]
    fn react_dispatches_even_with_flag_d_set() {
        let mut cpu = cpu_with_vectors(&[0x07]);
        settle(&mut cpu);
        cpu.set_flag(StatusFlag::Disable, true);
        cpu.int_break();
        cpu.int_react();
        assert!(!cpu.cycle());
        // Both lines consumed, only react dispatched.
        assert_eq!(cpu.pc, 0xA000);
        assert!(!cpu.is_break && !cpu.is_react);
    }

    #[test]
    fn brk_raises_the_line_and_dispatch_records_b() {
        let mut cpu = cpu_with_vectors(&[0x01]);
        settle(&mut cpu);

        // The brk instruction itself only raises the request.
        assert!(cpu.cycle());
        assert!(cpu.is_break);
        assert!(cpu.next_b_flag);
        assert_eq!(cpu.pc, 0x8001);

        // The next cycle dispatches: four cycles, pc and flags pushed,
        // then D set and B deposited from next_b_flag.
        assert!(!cpu.cycle());
        assert_eq!(cpu.icycles, 4);
        assert_eq!(cpu.pc, 0x9000);
        assert_eq!(cpu.bus.mem[0x0100], 0x80);
        assert_eq!(cpu.bus.mem[0x0101], 0x01);
        assert_eq!(cpu.bus.mem[0x0102], 0x00);
        assert_eq!(cpu.f, D | B);
        assert!(!cpu.next_b_flag);
        assert_eq!(cpu.s, 3);
    }

    #[test]
    fn rti_returns_from_the_handler() {
        let mut cpu = cpu_with_vectors(&[0x01, 0x07]);
        // The handler is a lone rti.
        cpu.bus.mem[0x9000] = 0x02;
        settle(&mut cpu);
        step(&mut cpu); // brk
        step(&mut cpu); // rti, after the dispatch in between
        assert_eq!(cpu.pc, 0x8001);
        assert_eq!(cpu.f, 0x00);
        assert_eq!(cpu.s, 0);
    }

    #[test]
    fn invalid_opcode_reports_once_until_reset() {
        let mut cpu = cpu_with_program(&[0xFC, 0xFD, 0xFE]);
        settle(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.bus.faults, vec![Fault::InvalidOpcode]);
        assert!(cpu.is_invalid);
        // The latch keeps later invalid opcodes silent.
        step(&mut cpu);
        assert_eq!(cpu.bus.faults.len(), 1);
        // Reset clears the latch.
        cpu.restart();
        settle(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.bus.faults.len(), 2);
    }
}

mod addressing {
    use super::*;

    #[test]
    fn indirect_pointer_crosses_pages_without_wrapping() {
        // lda *$80FF reads the pointer from $80FF and $8100.
        let mut cpu = cpu_with_program(&[0x33, 0xFF, 0x80]);
        cpu.bus.mem[0x80FF] = 0x78;
        cpu.bus.mem[0x8100] = 0x56;
        cpu.bus.mem[0x5678] = 0x42;
        settle(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.addr, 0x5678);
        assert_eq!(cpu.a, 0x42);
    }

    #[test]
    fn pre_indexed_pointer_stays_in_the_zero_page() {
        // lda x *$FF: pointer bytes at $FF and $00, then X is added.
        let mut cpu = cpu_with_program(&[0x30, 0x05, 0x2A, 0x66, 0xFF]);
        cpu.bus.mem[0x00FF] = 0x00;
        cpu.bus.mem[0x0000] = 0x20;
        cpu.bus.mem[0x2005] = 0x99;
        settle(&mut cpu);
        step_n(&mut cpu, 3);
        assert_eq!(cpu.addr, 0x2005);
        assert_eq!(cpu.a, 0x99);
    }

    #[test]
    fn post_indexed_operand_wraps_before_the_pointer_fetch() {
        // lda y *$FE with Y = 1: the operand wraps to $FF first.
        let mut cpu = cpu_with_program(&[0x30, 0x01, 0x2B, 0x67, 0xFE]);
        cpu.bus.mem[0x00FF] = 0x00;
        cpu.bus.mem[0x0000] = 0x20;
        cpu.bus.mem[0x2000] = 0x77;
        settle(&mut cpu);
        step_n(&mut cpu, 3);
        assert_eq!(cpu.addr, 0x2000);
        assert_eq!(cpu.a, 0x77);
    }

    #[test]
    fn zero_page_indexing_wraps() {
        // lda #$F0, tax, lda x $20 -> zpx address ($20 + $F0) & $FF = $10.
        let zpx = op(Instruction::LDA, Mode::ZeroPageX);
        let mut cpu = cpu_with_program(&[0x30, 0xF0, 0x2A, zpx, 0x20]);
        cpu.bus.mem[0x0010] = 0x31;
        settle(&mut cpu);
        step_n(&mut cpu, 3);
        assert_eq!(cpu.addr, 0x0010);
        assert_eq!(cpu.a, 0x31);
    }

    #[test]
    fn relative_displacement_is_signed() {
        // jmp ~-2 lands back on the jmp itself.
        let mut cpu = cpu_with_program(&[0x58, 0xFE]);
        settle(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.pc, 0x8000);

        // jmp ~+5 from the opcode byte.
        let mut cpu = cpu_with_program(&[0x58, 0x05]);
        settle(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.pc, 0x8005);
    }

    #[test]
    fn absolute_indexing_wraps_the_address_space() {
        // lda #$10, tax, lda x $FFF8 -> $0008.
        let abx = op(Instruction::LDA, Mode::AbsoluteIndexedX);
        let mut cpu = cpu_with_program(&[0x30, 0x10, 0x2A, abx, 0xF8, 0xFF]);
        cpu.bus.mem[0x0008] = 0x61;
        settle(&mut cpu);
        step_n(&mut cpu, 3);
        assert_eq!(cpu.addr, 0x0008);
        assert_eq!(cpu.a, 0x61);
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn adc_uses_the_carry_and_reports_signed_overflow() {
        // lda #$7F, for #C, adc #$01 -> $81 with N and V.
        let mut cpu = cpu_with_program(&[0x30, 0x7F, 0x04, C, 0xC0, 0x01]);
        settle(&mut cpu);
        step_n(&mut cpu, 3);
        assert_eq!(cpu.a, 0x81);
        assert_eq!(cpu.f, N | V);
    }

    #[test]
    fn add_ignores_the_carry() {
        // for #C, lda #$05, add #$03 -> 8, and the stale carry is cleared.
        let mut cpu = cpu_with_program(&[0x04, C, 0x30, 0x05, 0xD0, 0x03]);
        settle(&mut cpu);
        step_n(&mut cpu, 3);
        assert_eq!(cpu.a, 0x08);
        assert_eq!(cpu.f, 0);
    }

    #[test]
    fn sbc_with_borrow_clear() {
        // for #C, lda #$33, sbc #$11 -> $22, carry still set.
        let mut cpu = cpu_with_program(&[0x04, C, 0x30, 0x33, 0xC8, 0x11]);
        settle(&mut cpu);
        step_n(&mut cpu, 3);
        assert_eq!(cpu.a, 0x22);
        assert_eq!(cpu.f, C);
    }

    #[test]
    fn cmp_subtracts_without_carry_in() {
        // cmp is sub with carry-in zero, so comparing equal values lands
        // one below zero.
        let mut cpu = cpu_with_program(&[0x30, 0x05, 0x50, 0x05]);
        settle(&mut cpu);
        step_n(&mut cpu, 2);
        assert_eq!(cpu.a, 0x05);
        assert_eq!(cpu.f, N);

        // Strictly greater produces carry and zero.
        let mut cpu = cpu_with_program(&[0x30, 0x06, 0x50, 0x05]);
        settle(&mut cpu);
        step_n(&mut cpu, 2);
        assert_eq!(cpu.f, C | Z);
    }

    #[test]
    fn memory_increment_in_place() {
        // lda #$40, sta $10, inc $10.
        let inc_zpg = op(Instruction::INC, Mode::ZeroPage);
        let mut cpu = cpu_with_program(&[0x30, 0x40, 0x3A, 0x10, inc_zpg, 0x10]);
        settle(&mut cpu);
        step_n(&mut cpu, 3);
        assert_eq!(cpu.bus.mem[0x0010], 0x41);
    }

    #[test]
    fn memory_shift_rotates_through_carry() {
        // for #C, lda #$81, sta $10, shl $10 -> $03 with carry from bit 7.
        let shl_zpg = op(Instruction::SHL, Mode::ZeroPage);
        let mut cpu = cpu_with_program(&[0x04, C, 0x30, 0x81, 0x3A, 0x10, shl_zpg, 0x10]);
        settle(&mut cpu);
        step_n(&mut cpu, 4);
        assert_eq!(cpu.bus.mem[0x0010], 0x03);
        assert_eq!(cpu.f, C);
    }

    #[test]
    fn not_complements_memory() {
        let not_zpg = op(Instruction::NOT, Mode::ZeroPage);
        let mut cpu = cpu_with_program(&[0x30, 0x0F, 0x3A, 0x10, not_zpg, 0x10]);
        settle(&mut cpu);
        step_n(&mut cpu, 3);
        assert_eq!(cpu.bus.mem[0x0010], 0xF0);
        assert_eq!(cpu.f, N);
    }

    #[test]
    fn bit_keeps_the_accumulator() {
        // lda #$0F, bit #$F0: A unchanged, Z from the discarded and.
        let mut cpu = cpu_with_program(&[0x30, 0x0F, 0xA0, 0xF0]);
        settle(&mut cpu);
        step_n(&mut cpu, 2);
        assert_eq!(cpu.a, 0x0F);
        assert_eq!(cpu.f, Z);
    }
}

mod control {
    use super::*;

    #[test]
    fn cal_pushes_the_return_address_and_ret_pulls_it() {
        let mut program = vec![0x71, 0x05, 0x80, 0x07, 0x07];
        program.push(op(Instruction::RET, Mode::Implied));
        let mut cpu = cpu_with_program(&program);
        settle(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.pc, 0x8005);
        assert_eq!(cpu.bus.mem[0x0100], 0x80);
        assert_eq!(cpu.bus.mem[0x0101], 0x03);
        step(&mut cpu);
        assert_eq!(cpu.pc, 0x8003);
        assert_eq!(cpu.s, 0);
    }

    #[test]
    fn conditional_jump_taken_and_not_taken() {
        let mut cpu = cpu_with_program(&[0x1F, 0x05]);
        settle(&mut cpu);
        cpu.set_flag(StatusFlag::Zero, true);
        step(&mut cpu);
        assert_eq!(cpu.pc, 0x8005);

        let mut cpu = cpu_with_program(&[0x1F, 0x05]);
        settle(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.pc, 0x8002);
    }

    #[test]
    fn transfers_have_no_flag_side_effects() {
        // lda #$80 sets N; tay must leave the flags alone.
        let mut cpu = cpu_with_program(&[0x30, 0x80, 0x2B]);
        settle(&mut cpu);
        step_n(&mut cpu, 2);
        assert_eq!(cpu.y, 0x80);
        assert_eq!(cpu.f, N);
    }

    #[test]
    fn taf_and_tfa_move_the_flag_byte() {
        // lda #$55, taf.
        let mut cpu = cpu_with_program(&[0x30, 0x55, 0x28]);
        settle(&mut cpu);
        step_n(&mut cpu, 2);
        assert_eq!(cpu.f, 0x55);

        // for #C, tfa.
        let mut cpu = cpu_with_program(&[0x04, C, 0x2C]);
        settle(&mut cpu);
        step_n(&mut cpu, 2);
        assert_eq!(cpu.a, C);
    }

    #[test]
    fn register_clears_leave_flags_alone() {
        // lda #$80, zra: A cleared, N still set from the load.
        let mut cpu = cpu_with_program(&[0x30, 0x80, 0x38]);
        settle(&mut cpu);
        step_n(&mut cpu, 2);
        assert_eq!(cpu.a, 0);
        assert_eq!(cpu.f, N);
    }

    #[test]
    fn flag_or_and_flag_and() {
        let mut cpu = cpu_with_program(&[0x04, 0xFF, 0x05, 0x0D]);
        settle(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.f, 0xFF);
        step(&mut cpu);
        assert_eq!(cpu.f, 0x0D);
    }

    #[test]
    fn flag_push_and_pull_round_trip() {
        // for #C, phf, clc, plf.
        let mut cpu = cpu_with_program(&[0x04, C, 0x21, 0x06, 0x25]);
        settle(&mut cpu);
        step_n(&mut cpu, 3);
        assert_eq!(cpu.f, 0);
        step(&mut cpu);
        assert_eq!(cpu.f, C);
    }
}
