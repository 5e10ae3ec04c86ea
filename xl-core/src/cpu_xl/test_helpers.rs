use crate::bus::FlatMemory;
use crate::cpu_xl::{CpuXl, StatusFlag};

pub const B: u8 = StatusFlag::Break as u8;
pub const C: u8 = StatusFlag::Carry as u8;
pub const D: u8 = StatusFlag::Disable as u8;
pub const N: u8 = StatusFlag::Negative as u8;
pub const R: u8 = StatusFlag::Reserve as u8;
pub const U: u8 = StatusFlag::User as u8;
pub const V: u8 = StatusFlag::Overflow as u8;
pub const Z: u8 = StatusFlag::Zero as u8;

/// A CPU with the program at $8000, the reset vector pointing at it, and a
/// pending reset.
pub fn cpu_with_program(program: &[u8]) -> CpuXl<FlatMemory> {
    let mut cpu = CpuXl::new(FlatMemory::with_program(program));
    cpu.restart();
    cpu
}

/// Consume the reset sequence: one cycle performs it, one pays off its
/// residual cycle. Afterwards the CPU sits at an instruction boundary.
pub fn settle(cpu: &mut CpuXl<FlatMemory>) {
    cpu.cycle();
    cpu.cycle();
    assert_eq!(cpu.icycles, 0, "expected an instruction boundary");
}

/// Cycle until one instruction has begun. The instruction has fully
/// executed when this returns; only its residual cycles remain pending.
pub fn step(cpu: &mut CpuXl<FlatMemory>) {
    loop {
        if cpu.cycle() {
            return;
        }
    }
}

pub fn step_n(cpu: &mut CpuXl<FlatMemory>, n: usize) {
    for _ in 0..n {
        step(cpu);
    }
}

/// The number of cycles one instruction costs: the cycle that began it
/// plus every residual cycle before the next instruction begins.
pub fn measured_cycles(program: &[u8]) -> u16 {
    let mut cpu = cpu_with_program(program);
    step(&mut cpu);
    let mut count = 1;
    while !cpu.cycle() {
        count += 1;
    }
    count
}
