// Clippy rules to disable.
#![allow(clippy::new_without_default)]

pub mod bus;
pub mod constants;
pub mod cpu_xl;
pub mod disasm;
pub mod opcodes;
