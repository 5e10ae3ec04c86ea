//! Disassembler for 32 KiB program images. Walks the opcode table forward
//! and prints a fixed tabular listing: address, the raw bytes as printable
//! text, the raw bytes in hex, and the instruction in assembler syntax.

use crate::constants::{IMAGE_SIZE, ROM_ORIGIN};
use crate::opcodes::{instruction_name, instruction_size, mode_signature, Mode, COMBOS};
use std::fmt::Write;

pub const LISTING_HEADER: &str = "_addr__txt__b1_b2_b3__xlas_________________";

/// The last eight bytes of the image hold the vector table.
const CODE_END: usize = IMAGE_SIZE - 8;

const VECTOR_NAMES: [&str; 4] = ["reserved", "break", "react", "reset"];

/// Render the operand the way the assembler spells it: immediates in
/// decimal, addresses in hex, relative displacements with their target.
fn write_operand(out: &mut String, mode: Mode, bytes: &[u8], addr_of_opcode: i32) {
    match bytes.len() {
        2 => {
            let val = bytes[1];
            match mode {
                Mode::Immediate => {
                    let _ = write!(out, "{}", val);
                }
                Mode::Relative => {
                    let val = val as i8 as i32;
                    let target = (addr_of_opcode + val) as u16;
                    let _ = write!(out, "{} -> 0x{:04X}", val, target);
                }
                _ => {
                    let _ = write!(out, "0x{:02X}", val);
                }
            }
        }
        3 => {
            let val = u16::from_le_bytes([bytes[1], bytes[2]]);
            let _ = write!(out, "0x{:04X}", val);
        }
        _ => {}
    }
}

/// Disassemble a whole image into a listing. Runs of zero bytes collapse
/// into `rb` lines and the trailing vector table prints as `dw` words.
///
/// Panics if the image is not exactly `IMAGE_SIZE` bytes; the CLI checks
/// sizes before calling in.
pub fn disassemble(image: &[u8]) -> String {
    assert_eq!(image.len(), IMAGE_SIZE, "expected a full program image");
    let mut out = String::new();
    out.push_str(LISTING_HEADER);
    out.push('\n');

    let mut i = 0;
    while i < CODE_END {
        let _ = write!(out, " {:04X}  ", ROM_ORIGIN as usize + i);

        let mut zeros = 0;
        while i < CODE_END && image[i] == 0 {
            i += 1;
            zeros += 1;
        }
        if zeros > 0 {
            let _ = writeln!(out, "               rb {}", zeros);
            continue;
        }

        let combo = COMBOS[image[i] as usize];
        let n = instruction_size(combo.mode);
        let truncated = i + n > CODE_END;
        let limit = if truncated { CODE_END } else { i + n };

        for k in i..limit {
            let byte = image[k];
            out.push(if (0x20..=0x7E).contains(&byte) {
                byte as char
            } else {
                '.'
            });
        }
        if n == 2 {
            out.push(' ');
        }
        if n == 1 {
            out.push_str("  ");
        }
        out.push(' ');
        for k in i..limit {
            let _ = write!(out, " {:02X}", image[k]);
        }
        if n == 2 {
            out.push_str("   ");
        }
        if n == 1 {
            out.push_str("      ");
        }
        if truncated {
            // The operand runs into the vector table; leave the line as
            // raw bytes.
            out.push('\n');
            i += n;
            continue;
        }

        let _ = write!(out, "  {}", instruction_name(combo.instruction));
        out.push_str(mode_signature(combo.mode));
        write_operand(
            &mut out,
            combo.mode,
            &image[i..limit],
            ROM_ORIGIN as i32 + i as i32,
        );
        out.push('\n');
        i += n;
    }

    for (k, name) in VECTOR_NAMES.iter().enumerate() {
        let offset = CODE_END + k * 2;
        let val = u16::from_le_bytes([image[offset], image[offset + 1]]);
        let _ = writeln!(
            out,
            " {:04X}                 dw 0x{:04X}; {}",
            ROM_ORIGIN as usize + offset,
            val,
            name
        );
    }
    out
}
