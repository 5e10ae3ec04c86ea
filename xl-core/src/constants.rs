/// How many times per second `CpuXl::cycle` must be called to run the
/// processor at its designed speed.
pub const CLOCK_HZ: u32 = 1_000_020;

/// The stack is hardwired to page $01 and grows upward.
pub const STACK_PAGE: u16 = 0x0100;

/// Where program images are loaded and where `$$` points in the assembler.
pub const ROM_ORIGIN: u16 = 0x8000;

/// Size in bytes of an assembled program image.
pub const IMAGE_SIZE: usize = 0x8000;

pub enum InterruptVectors {
    // A fourth word at $FFF8 is reserved but never read by the CPU.
    BreakVector = 0xFFFA,
    ReactVector = 0xFFFC,
    ResetVector = 0xFFFE,
}
