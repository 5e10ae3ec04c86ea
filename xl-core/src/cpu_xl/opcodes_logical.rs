//! Arithmetic, logic, shift and increment/decrement instructions. All of
//! them route their flag effects through the ALU helpers.

use crate::bus::Bus;
use crate::cpu_xl::{alu, CpuXl, StatusFlag};

/// Add with carry: A := A + {adr} + C.
pub fn adc<B: Bus>(cpu: &mut CpuXl<B>) {
    let carry = cpu.get_flag(StatusFlag::Carry);
    let data = cpu.bus.load(cpu.addr);
    cpu.a = cpu.apply_alu(alu::add(cpu.a, data, carry));
    cpu.icycles += 1;
}

/// Add ignoring carry: A := A + {adr}.
pub fn add<B: Bus>(cpu: &mut CpuXl<B>) {
    let data = cpu.bus.load(cpu.addr);
    cpu.a = cpu.apply_alu(alu::add(cpu.a, data, false));
    cpu.icycles += 1;
}

/// Subtract with carry: A := A - {adr} - (1 - C).
pub fn sbc<B: Bus>(cpu: &mut CpuXl<B>) {
    let carry = cpu.get_flag(StatusFlag::Carry);
    let data = cpu.bus.load(cpu.addr);
    cpu.a = cpu.apply_alu(alu::sub(cpu.a, data, carry));
    cpu.icycles += 1;
}

/// Subtract ignoring carry: A := A - {adr} - 1.
pub fn sub<B: Bus>(cpu: &mut CpuXl<B>) {
    let data = cpu.bus.load(cpu.addr);
    cpu.a = cpu.apply_alu(alu::sub(cpu.a, data, false));
    cpu.icycles += 1;
}

/// Compare A with memory: the subtraction result is discarded, the flags
/// are kept.
pub fn cmp<B: Bus>(cpu: &mut CpuXl<B>) {
    let data = cpu.bus.load(cpu.addr);
    cpu.apply_alu(alu::sub(cpu.a, data, false));
    cpu.icycles += 1;
}

/// Compare X with memory.
pub fn cpx<B: Bus>(cpu: &mut CpuXl<B>) {
    let data = cpu.bus.load(cpu.addr);
    cpu.apply_alu(alu::sub(cpu.x, data, false));
    cpu.icycles += 1;
}

/// Compare Y with memory.
pub fn cpy<B: Bus>(cpu: &mut CpuXl<B>) {
    let data = cpu.bus.load(cpu.addr);
    cpu.apply_alu(alu::sub(cpu.y, data, false));
    cpu.icycles += 1;
}

/// A := A | {adr}.
pub fn bor<B: Bus>(cpu: &mut CpuXl<B>) {
    let data = cpu.bus.load(cpu.addr);
    cpu.a = cpu.apply_alu(alu::bor(cpu.a, data));
    cpu.icycles += 1;
}

/// A := A ^ {adr}.
pub fn xor<B: Bus>(cpu: &mut CpuXl<B>) {
    let data = cpu.bus.load(cpu.addr);
    cpu.a = cpu.apply_alu(alu::xor(cpu.a, data));
    cpu.icycles += 1;
}

/// A := A & {adr}.
pub fn and<B: Bus>(cpu: &mut CpuXl<B>) {
    let data = cpu.bus.load(cpu.addr);
    cpu.a = cpu.apply_alu(alu::and(cpu.a, data));
    cpu.icycles += 1;
}

/// Like and, but the accumulator keeps its value; only Z and N change.
pub fn bit<B: Bus>(cpu: &mut CpuXl<B>) {
    let data = cpu.bus.load(cpu.addr);
    cpu.apply_alu(alu::and(cpu.a, data));
    cpu.icycles += 1;
}

/// Complement a memory byte in place.
pub fn not<B: Bus>(cpu: &mut CpuXl<B>) {
    let data = cpu.bus.load(cpu.addr);
    let result = cpu.apply_alu(alu::not(data));
    cpu.bus.store(cpu.addr, result);
    cpu.icycles += 2;
}

/// Complement the accumulator.
pub fn nta<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.a = cpu.apply_alu(alu::not(cpu.a));
}

/// Rotate a memory byte left through carry.
pub fn shl<B: Bus>(cpu: &mut CpuXl<B>) {
    let carry = cpu.get_flag(StatusFlag::Carry);
    let data = cpu.bus.load(cpu.addr);
    let result = cpu.apply_alu(alu::shl(data, carry));
    cpu.bus.store(cpu.addr, result);
    cpu.icycles += 2;
}

/// Rotate a memory byte right through carry.
pub fn shr<B: Bus>(cpu: &mut CpuXl<B>) {
    let carry = cpu.get_flag(StatusFlag::Carry);
    let data = cpu.bus.load(cpu.addr);
    let result = cpu.apply_alu(alu::shr(data, carry));
    cpu.bus.store(cpu.addr, result);
    cpu.icycles += 2;
}

/// Rotate the accumulator left through carry.
pub fn sla<B: Bus>(cpu: &mut CpuXl<B>) {
    let carry = cpu.get_flag(StatusFlag::Carry);
    cpu.a = cpu.apply_alu(alu::shl(cpu.a, carry));
}

/// Rotate the accumulator right through carry.
pub fn sra<B: Bus>(cpu: &mut CpuXl<B>) {
    let carry = cpu.get_flag(StatusFlag::Carry);
    cpu.a = cpu.apply_alu(alu::shr(cpu.a, carry));
}

/// Increment a memory byte in place.
pub fn inc<B: Bus>(cpu: &mut CpuXl<B>) {
    let data = cpu.bus.load(cpu.addr);
    let result = cpu.apply_alu(alu::inc(data));
    cpu.bus.store(cpu.addr, result);
    cpu.icycles += 2;
}

/// Decrement a memory byte in place.
pub fn dec<B: Bus>(cpu: &mut CpuXl<B>) {
    let data = cpu.bus.load(cpu.addr);
    let result = cpu.apply_alu(alu::dec(data));
    cpu.bus.store(cpu.addr, result);
    cpu.icycles += 2;
}

/// A := A + 1.
pub fn app<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.a = cpu.apply_alu(alu::inc(cpu.a));
}

/// A := A - 1.
pub fn amm<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.a = cpu.apply_alu(alu::dec(cpu.a));
}

/// S := S + 1.
pub fn spp<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.s = cpu.apply_alu(alu::inc(cpu.s));
}

/// S := S - 1.
pub fn smm<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.s = cpu.apply_alu(alu::dec(cpu.s));
}

/// X := X + 1.
pub fn xpp<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.x = cpu.apply_alu(alu::inc(cpu.x));
}

/// X := X - 1.
pub fn xmm<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.x = cpu.apply_alu(alu::dec(cpu.x));
}

/// Y := Y + 1.
pub fn ypp<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.y = cpu.apply_alu(alu::inc(cpu.y));
}

/// Y := Y - 1.
pub fn ymm<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.y = cpu.apply_alu(alu::dec(cpu.y));
}
