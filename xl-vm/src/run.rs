//! The two run loops: the paced one behind `xlx` and the single-stepping
//! one behind `xlxdb`.

use crate::machine::{Machine, VmError};
use crate::trace;
use std::time::{Duration, Instant};
use xl_core::constants::CLOCK_HZ;
use xl_core::cpu_xl::CpuXl;

/// Outcomes checked between cycles. `Some(Ok(()))` is a clean halt.
fn check(cpu: &CpuXl<Machine>) -> Option<Result<(), VmError>> {
    if cpu.bus.halted {
        return Some(Ok(()));
    }
    if let Some(addr) = cpu.bus.rom_write {
        return Some(Err(VmError::RomWrite {
            filename: cpu.bus.filename.clone(),
            addr,
        }));
    }
    if cpu.bus.invalid {
        // The invalid opcode was one byte back from where pc rests now.
        return Some(Err(VmError::InvalidOpcode {
            filename: cpu.bus.filename.clone(),
            addr: cpu.pc.wrapping_sub(1),
        }));
    }
    None
}

/// Run until a halt or an error, pacing `CLOCK_HZ` cycles into each
/// wall-clock second.
pub fn run(cpu: &mut CpuXl<Machine>) -> Result<(), VmError> {
    cpu.restart();
    loop {
        let slice = Instant::now();
        for _ in 0..CLOCK_HZ {
            cpu.cycle();
            if let Some(result) = check(cpu) {
                return result;
            }
        }
        let elapsed = slice.elapsed();
        if elapsed < Duration::from_secs(1) {
            std::thread::sleep(Duration::from_secs(1) - elapsed);
        }
    }
}

/// Run unpaced, one instruction at a time, tracing every retired
/// instruction and register delta to stderr.
pub fn run_debug(cpu: &mut CpuXl<Machine>) -> Result<(), VmError> {
    cpu.restart();
    let mut prev = trace::Snapshot::take(cpu);
    prev.pc = cpu.bus.entry_point();
    loop {
        while !cpu.cycle() {
            if let Some(result) = check(cpu) {
                return result;
            }
        }
        if let Some(result) = check(cpu) {
            if result.is_err() {
                return result;
            }
        }
        eprintln!(
            "{}{}",
            trace::instruction_line(&cpu.bus.mem, prev.pc),
            trace::diff_line(&prev, cpu)
        );
        prev = trace::Snapshot::take(cpu);
        if cpu.bus.halted {
            return Ok(());
        }
    }
}
