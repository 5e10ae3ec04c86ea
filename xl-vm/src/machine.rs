//! The host machine behind the CPU: 64 KiB of memory with the program
//! image in the upper half, one memory-mapped I/O port, a halt latch, and
//! write protection over the image.

use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use xl_core::bus::{Bus, Fault};
use xl_core::constants::{IMAGE_SIZE, ROM_ORIGIN};

/// Reading this address pulls a byte from input; writing sends one to
/// output.
pub const IO_PORT: u16 = 0x00FF;

/// Any store here halts the machine cleanly.
pub const HALT_PORT: u16 = 0x7FFF;

#[derive(Debug, Error)]
pub enum VmError {
    #[error("{filename}: {source}")]
    Io {
        filename: String,
        source: std::io::Error,
    },
    #[error("{filename}: too few bytes in the file")]
    ShortImage { filename: String },
    #[error("{filename}: invalid instruction executed at 0x{addr:04X}")]
    InvalidOpcode { filename: String, addr: u16 },
    #[error("{filename}: attempt to write to 0x{addr:04X}")]
    RomWrite { filename: String, addr: u16 },
}

pub struct Machine {
    pub mem: Vec<u8>,
    pub filename: String,
    /// Latched by a store to `HALT_PORT`.
    pub halted: bool,
    /// Latched by the CPU's invalid-opcode fault.
    pub invalid: bool,
    /// The first store into the image half, if any happened.
    pub rom_write: Option<u16>,
    /// Echo every I/O byte to stderr, the way the debug VM does.
    pub echo_io: bool,
    input: Box<dyn Read>,
    output: Box<dyn Write>,
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("mem", &self.mem)
            .field("filename", &self.filename)
            .field("halted", &self.halted)
            .field("invalid", &self.invalid)
            .field("rom_write", &self.rom_write)
            .field("echo_io", &self.echo_io)
            .finish()
    }
}

impl Machine {
    /// A machine with the image loaded at `ROM_ORIGIN` and I/O bound to
    /// stdin/stdout. The image must fill the whole upper half; anything
    /// past it is ignored.
    pub fn new(image: &[u8], filename: &str) -> Result<Machine, VmError> {
        if image.len() < IMAGE_SIZE {
            return Err(VmError::ShortImage {
                filename: filename.to_string(),
            });
        }
        let mut mem = vec![0; 0x10000];
        let origin = ROM_ORIGIN as usize;
        mem[origin..origin + IMAGE_SIZE].copy_from_slice(&image[..IMAGE_SIZE]);
        Ok(Machine {
            mem,
            filename: filename.to_string(),
            halted: false,
            invalid: false,
            rom_write: None,
            echo_io: false,
            input: Box::new(std::io::stdin()),
            output: Box::new(std::io::stdout()),
        })
    }

    pub fn from_file(path: &Path) -> Result<Machine, VmError> {
        let filename = path.display().to_string();
        let image = std::fs::read(path).map_err(|source| VmError::Io {
            filename: filename.clone(),
            source,
        })?;
        Machine::new(&image, &filename)
    }

    /// Rebind the I/O port, so tests can feed and capture bytes.
    pub fn with_io(mut self, input: Box<dyn Read>, output: Box<dyn Write>) -> Machine {
        self.input = input;
        self.output = output;
        self
    }

    /// The address the reset vector points at.
    pub fn entry_point(&self) -> u16 {
        u16::from_le_bytes([self.mem[0xFFFE], self.mem[0xFFFF]])
    }
}

impl Bus for Machine {
    fn load(&mut self, addr: u16) -> u8 {
        if addr == IO_PORT {
            let mut buf = [0u8; 1];
            let byte = match self.input.read(&mut buf) {
                Ok(1) => Some(buf[0]),
                _ => None,
            };
            if self.echo_io {
                // Echo the raw read, keeping end-of-input apart from a
                // real $FF byte.
                match byte {
                    Some(byte) => eprintln!("input VVV {}", byte),
                    None => eprintln!("input VVV -1"),
                }
            }
            // End of input reads as $FF.
            return byte.unwrap_or(0xFF);
        }
        self.mem[addr as usize]
    }

    fn store(&mut self, addr: u16, data: u8) {
        if addr == IO_PORT {
            let _ = self.output.write_all(&[data]);
            if data == b'\n' {
                let _ = self.output.flush();
            }
            if self.echo_io {
                eprintln!("output VVV {}", data);
            }
        }
        if addr < HALT_PORT {
            self.mem[addr as usize] = data;
        } else if addr == HALT_PORT {
            self.halted = true;
        } else {
            // The image half is read-only; remember the first offender.
            self.rom_write.get_or_insert(addr);
        }
    }

    fn fault(&mut self, fault: Fault) {
        match fault {
            Fault::InvalidOpcode => self.invalid = true,
        }
    }
}
