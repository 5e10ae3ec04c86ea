//! Loads, stores, stack pushes and pulls, transfers and register clears.

use crate::bus::Bus;
use crate::cpu_xl::CpuXl;

/// A := {adr}, setting Z and N.
pub fn lda<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.a = cpu.bus.load(cpu.addr);
    cpu.update_zero_and_negative_flag(cpu.a);
    cpu.icycles += 1;
}

/// X := {adr}, setting Z and N.
pub fn ldx<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.x = cpu.bus.load(cpu.addr);
    cpu.update_zero_and_negative_flag(cpu.x);
    cpu.icycles += 1;
}

/// Y := {adr}, setting Z and N.
pub fn ldy<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.y = cpu.bus.load(cpu.addr);
    cpu.update_zero_and_negative_flag(cpu.y);
    cpu.icycles += 1;
}

/// {adr} := A.
pub fn sta<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.bus.store(cpu.addr, cpu.a);
    cpu.icycles += 1;
}

/// {adr} := X.
pub fn stx<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.bus.store(cpu.addr, cpu.x);
    cpu.icycles += 1;
}

/// {adr} := Y.
pub fn sty<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.bus.store(cpu.addr, cpu.y);
    cpu.icycles += 1;
}

/// Pull the accumulator, setting Z and N.
pub fn pla<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.a = cpu.pull();
    cpu.update_zero_and_negative_flag(cpu.a);
    cpu.icycles += 1;
}

/// Pull the status flags. No flag side effects beyond the pull itself.
pub fn plf<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.f = cpu.pull();
    cpu.icycles += 1;
}

/// Pull X, setting Z and N.
pub fn plx<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.x = cpu.pull();
    cpu.update_zero_and_negative_flag(cpu.x);
    cpu.icycles += 1;
}

/// Pull Y, setting Z and N.
pub fn ply<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.y = cpu.pull();
    cpu.update_zero_and_negative_flag(cpu.y);
    cpu.icycles += 1;
}

/// Push the accumulator.
pub fn pha<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.push(cpu.a);
    cpu.icycles += 1;
}

/// Push the status flags.
pub fn phf<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.push(cpu.f);
    cpu.icycles += 1;
}

/// Push X.
pub fn phx<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.push(cpu.x);
    cpu.icycles += 1;
}

/// Push Y.
pub fn phy<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.push(cpu.y);
    cpu.icycles += 1;
}

// The transfers copy registers around without touching any flag.

pub fn taf<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.f = cpu.a;
}

pub fn tas<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.s = cpu.a;
}

pub fn tax<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.x = cpu.a;
}

pub fn tay<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.y = cpu.a;
}

pub fn tfa<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.a = cpu.f;
}

pub fn tsa<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.a = cpu.s;
}

pub fn txa<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.a = cpu.x;
}

pub fn tya<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.a = cpu.y;
}

// The clears zero a register without touching any flag.

pub fn zra<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.a = 0;
}

pub fn zrx<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.x = 0;
}

pub fn zry<B: Bus>(cpu: &mut CpuXl<B>) {
    cpu.y = 0;
}
