// Clippy rules to disable.
#![allow(clippy::new_without_default)]

pub mod machine;
pub mod run;
pub mod trace;

pub use machine::{Machine, VmError};
