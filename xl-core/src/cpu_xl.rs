use crate::bus::{Bus, Fault};
use crate::constants::{InterruptVectors, STACK_PAGE};
use crate::cpu_xl::alu::AluResult;
use crate::opcodes::{combo, Instruction, Mode};

pub mod alu;
pub mod opcodes_jump;
pub mod opcodes_logical;
pub mod opcodes_move;

#[cfg(test)]
mod test_helpers;

// Test must be after test_helpers, rust format tries to move things around.
#[cfg(test)]
mod test;

use opcodes_jump::*;
use opcodes_logical::*;
use opcodes_move::*;

/// Status flag masks. B, and the otherwise uncommitted R and U bits, have no
/// arithmetic meaning; the CPU only deposits into B when an interrupt
/// dispatches, and the conditional jumps can test all eight bits.
#[rustfmt::skip]
#[derive(Debug, Clone, Copy)]
pub enum StatusFlag {
  Break    = 0b0000_0001,
  Carry    = 0b0000_0010,
  Disable  = 0b0000_0100,
  Negative = 0b0000_1000,
  Reserve  = 0b0001_0000,
  User     = 0b0010_0000,
  Overflow = 0b0100_0000,
  Zero     = 0b1000_0000,
}

/// This struct implements the XL microprocessor.
///
/// The host supplies the bus; the core owns no memory of its own. Calling
/// `cycle` at `constants::CLOCK_HZ` per second runs the CPU at its designed
/// speed, and every mutation of the state happens inside `cycle`.
pub struct CpuXl<B: Bus> {
    pub bus: B,
    /// The accumulator. Arithmetic and logic results land here.
    pub a: u8,
    /// The X index register, used by the x-indexed addressing modes.
    pub x: u8,
    /// The Y index register.
    pub y: u8,
    /// The program counter. All arithmetic on it wraps modulo 65536.
    pub pc: u16,
    /// The stack index. The stack lives in page $01 and grows upward:
    /// pushing stores at `$0100 | s` and then increments s.
    pub s: u8,
    /// The status flags, addressed through `StatusFlag` masks.
    pub f: u8,
    /// Effective address produced by the addressing mode of the current
    /// instruction. Scratch state, but kept in the register file so the
    /// decoder and the executor stay decoupled.
    pub addr: u16,
    /// Residual cycle counter. While nonzero, `cycle` only counts down;
    /// this is how multi-cycle instructions spend their budget.
    pub icycles: u16,
    /// The value deposited into flag B when the next interrupt dispatches.
    pub next_b_flag: bool,
    /// Latched once an invalid opcode has fired the fault callback, so
    /// repeats stay silent until the next reset.
    pub is_invalid: bool,
    /// Pending interrupt request lines. Edge-triggered: raising one is
    /// idempotent until it is serviced.
    pub is_break: bool,
    pub is_react: bool,
    pub is_reset: bool,
}

impl<B: Bus> CpuXl<B> {
    /// A freshly zeroed CPU. It does nothing useful until `restart`.
    pub fn new(bus: B) -> CpuXl<B> {
        CpuXl {
            bus,
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            s: 0,
            f: 0,
            addr: 0,
            icycles: 0,
            next_b_flag: false,
            is_invalid: false,
            is_break: false,
            is_react: false,
            is_reset: false,
        }
    }

    /// Start or restart the processor. The next `cycle` performs the reset
    /// sequence and leaves the CPU at the address in the reset vector.
    pub fn restart(&mut self) {
        self.is_reset = true;
    }

    /// Request a break interrupt. Serviced at the next instruction
    /// boundary unless flag D is set.
    pub fn int_break(&mut self) {
        self.is_break = true;
    }

    /// Request a react interrupt. Serviced unconditionally at the next
    /// instruction boundary, ahead of any pending break.
    pub fn int_react(&mut self) {
        self.is_react = true;
    }

    /// Request a reset. Takes priority over every other pending interrupt.
    pub fn int_reset(&mut self) {
        self.is_reset = true;
    }

    /// Run exactly one CPU cycle. Returns true if this cycle began a new
    /// instruction, which lets a host tell instruction boundaries apart.
    pub fn cycle(&mut self) -> bool {
        if self.icycles != 0 {
            self.icycles -= 1;
            return false;
        }
        if self.is_reset {
            self.icycles = 1;
            self.is_reset = false;
            self.is_break = false;
            self.is_react = false;
            self.next_b_flag = false;
            self.is_invalid = false;
            self.pc = self.load_word(InterruptVectors::ResetVector as u16);
            self.a = 0;
            self.f = 0;
            self.s = 0;
            self.x = 0;
            self.y = 0;
            return false;
        }
        let mut vector = 0;
        let mut dispatch = false;
        if self.is_break {
            self.is_break = false;
            vector = InterruptVectors::BreakVector as u16;
            dispatch = !self.get_flag(StatusFlag::Disable);
        }
        if self.is_react {
            // React outranks break: both request lines are consumed, but
            // the react vector wins.
            self.is_react = false;
            vector = InterruptVectors::ReactVector as u16;
            dispatch = true;
        }
        if dispatch {
            self.icycles = 4;
            self.push_word(self.pc);
            self.push(self.f);
            self.pc = self.load_word(vector);
            self.set_flag(StatusFlag::Disable, true);
            self.set_flag(StatusFlag::Break, self.next_b_flag);
            self.next_b_flag = false;
            return false;
        }
        let opcode = self.bus.load(self.pc);
        self.pc = self.pc.wrapping_add(1);
        let combo = combo(opcode);
        self.run_mode(combo.mode);
        self.run_instruction(combo.instruction);
        true
    }

    pub fn get_flag(&self, flag: StatusFlag) -> bool {
        self.f & flag as u8 != 0
    }

    pub fn set_flag(&mut self, flag: StatusFlag, value: bool) {
        if value {
            self.f |= flag as u8;
        } else {
            self.f &= !(flag as u8);
        }
    }

    /// The addressing-mode decoder. Consumes the operand bytes at pc,
    /// leaves the effective address in `addr`, and charges the mode's
    /// share of the cycle budget.
    fn run_mode(&mut self, mode: Mode) {
        match mode {
            // No operand; `addr` keeps its stale value and nothing reads it.
            Mode::Implied => {}
            // The operand byte itself is the value, so the effective
            // address is the operand's own location.
            Mode::Immediate => {
                self.addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
            }
            Mode::Absolute => {
                self.addr = self.load_word(self.pc);
                self.pc = self.pc.wrapping_add(2);
                self.icycles += 2;
            }
            Mode::AbsoluteIndexedX => {
                self.addr = self.load_word(self.pc).wrapping_add(self.x as u16);
                self.pc = self.pc.wrapping_add(2);
                self.icycles += 2;
            }
            Mode::AbsoluteIndexedY => {
                self.addr = self.load_word(self.pc).wrapping_add(self.y as u16);
                self.pc = self.pc.wrapping_add(2);
                self.icycles += 2;
            }
            // The displacement is signed and relative to the opcode byte:
            // pc has advanced past two instruction bytes at this point,
            // which the -2 pays back.
            Mode::Relative => {
                let offset = self.bus.load(self.pc) as i8 as u16;
                self.pc = self.pc.wrapping_add(1);
                self.addr = self.pc.wrapping_add(offset).wrapping_sub(2);
                self.icycles += 1;
            }
            Mode::ZeroPage => {
                self.addr = self.bus.load(self.pc) as u16;
                self.pc = self.pc.wrapping_add(1);
                self.icycles += 1;
            }
            Mode::ZeroPageX => {
                self.addr = (self.bus.load(self.pc).wrapping_add(self.x)) as u16;
                self.pc = self.pc.wrapping_add(1);
                self.icycles += 1;
            }
            Mode::ZeroPageY => {
                self.addr = (self.bus.load(self.pc).wrapping_add(self.y)) as u16;
                self.pc = self.pc.wrapping_add(1);
                self.icycles += 1;
            }
            // The operand is a pointer to the effective address. The
            // pointer fetch is an ordinary 16-bit read with no page wrap.
            Mode::Indirect => {
                let vector = self.load_word(self.pc);
                self.pc = self.pc.wrapping_add(2);
                self.addr = self.load_word(vector);
                self.icycles += 4;
            }
            // Zero-page pointer, then X is added to the loaded address.
            Mode::IndirectX => {
                let vector = self.bus.load(self.pc) as u16;
                self.pc = self.pc.wrapping_add(1);
                self.addr = self.load_word_zpg(vector).wrapping_add(self.x as u16);
                self.icycles += 3;
            }
            // Y is added to the operand first, staying inside the zero
            // page, and the pointer there is the effective address.
            Mode::IndirectY => {
                let vector = (self.bus.load(self.pc).wrapping_add(self.y)) as u16;
                self.pc = self.pc.wrapping_add(1);
                self.addr = self.load_word_zpg(vector);
                self.icycles += 3;
            }
        }
    }

    fn run_instruction(&mut self, instruction: Instruction) {
        match instruction {
            Instruction::INV => inv(self),
            Instruction::NOP => nop(self),
            Instruction::BRK => brk(self),
            Instruction::RTI => rti(self),
            Instruction::RET => ret(self),
            Instruction::FOR => for_(self),
            Instruction::FND => fnd(self),
            Instruction::CLC => clc(self),
            Instruction::APP => app(self),
            Instruction::AMM => amm(self),
            Instruction::SPP => spp(self),
            Instruction::SMM => smm(self),
            Instruction::XPP => xpp(self),
            Instruction::XMM => xmm(self),
            Instruction::YPP => ypp(self),
            Instruction::YMM => ymm(self),
            Instruction::INC => inc(self),
            Instruction::DEC => dec(self),
            Instruction::JFB => jfb(self),
            Instruction::JFC => jfc(self),
            Instruction::JFD => jfd(self),
            Instruction::JFN => jfn(self),
            Instruction::JFR => jfr(self),
            Instruction::JFU => jfu(self),
            Instruction::JFV => jfv(self),
            Instruction::JFZ => jfz(self),
            Instruction::JTB => jtb(self),
            Instruction::JTC => jtc(self),
            Instruction::JTD => jtd(self),
            Instruction::JTN => jtn(self),
            Instruction::JTR => jtr(self),
            Instruction::JTU => jtu(self),
            Instruction::JTV => jtv(self),
            Instruction::JTZ => jtz(self),
            Instruction::JMP => jmp(self),
            Instruction::CAL => cal(self),
            Instruction::LDA => lda(self),
            Instruction::LDX => ldx(self),
            Instruction::LDY => ldy(self),
            Instruction::STA => sta(self),
            Instruction::STX => stx(self),
            Instruction::STY => sty(self),
            Instruction::PLA => pla(self),
            Instruction::PLF => plf(self),
            Instruction::PLX => plx(self),
            Instruction::PLY => ply(self),
            Instruction::PHA => pha(self),
            Instruction::PHF => phf(self),
            Instruction::PHX => phx(self),
            Instruction::PHY => phy(self),
            Instruction::TAF => taf(self),
            Instruction::TAS => tas(self),
            Instruction::TAX => tax(self),
            Instruction::TAY => tay(self),
            Instruction::TFA => tfa(self),
            Instruction::TSA => tsa(self),
            Instruction::TXA => txa(self),
            Instruction::TYA => tya(self),
            Instruction::CMP => cmp(self),
            Instruction::CPX => cpx(self),
            Instruction::CPY => cpy(self),
            Instruction::SBC => sbc(self),
            Instruction::SUB => sub(self),
            Instruction::ADC => adc(self),
            Instruction::ADD => add(self),
            Instruction::BOR => bor(self),
            Instruction::XOR => xor(self),
            Instruction::AND => and(self),
            Instruction::BIT => bit(self),
            Instruction::NOT => not(self),
            Instruction::NTA => nta(self),
            Instruction::SHL => shl(self),
            Instruction::SHR => shr(self),
            Instruction::SLA => sla(self),
            Instruction::SRA => sra(self),
            Instruction::ZRA => zra(self),
            Instruction::ZRX => zrx(self),
            Instruction::ZRY => zry(self),
        }
    }

    /// Little-endian 16-bit read through the bus.
    pub(crate) fn load_word(&mut self, addr: u16) -> u16 {
        let lsb = self.bus.load(addr);
        let msb = self.bus.load(addr.wrapping_add(1));
        u16::from_le_bytes([lsb, msb])
    }

    /// Little-endian 16-bit read where both bytes stay in the zero page.
    pub(crate) fn load_word_zpg(&mut self, addr: u16) -> u16 {
        let lsb = self.bus.load(addr & 0xFF);
        let msb = self.bus.load(addr.wrapping_add(1) & 0xFF);
        u16::from_le_bytes([lsb, msb])
    }

    /// Store at the stack index, then grow the stack upward.
    pub(crate) fn push(&mut self, data: u8) {
        self.bus.store(STACK_PAGE | self.s as u16, data);
        self.s = self.s.wrapping_add(1);
    }

    /// Shrink the stack, then read the byte it pointed past.
    pub(crate) fn pull(&mut self) -> u8 {
        self.s = self.s.wrapping_sub(1);
        self.bus.load(STACK_PAGE | self.s as u16)
    }

    /// Push high byte then low byte, so a pull reads them back in order.
    pub(crate) fn push_word(&mut self, data: u16) {
        self.push((data >> 8) as u8);
        self.push(data as u8);
    }

    pub(crate) fn pull_word(&mut self) -> u16 {
        let lsb = self.pull();
        let msb = self.pull();
        u16::from_le_bytes([lsb, msb])
    }

    /// Commit an ALU result's flag effects and hand back the value.
    pub(crate) fn apply_alu(&mut self, result: AluResult) -> u8 {
        if let Some(c) = result.flags.c {
            self.set_flag(StatusFlag::Carry, c);
        }
        if let Some(v) = result.flags.v {
            self.set_flag(StatusFlag::Overflow, v);
        }
        self.set_flag(StatusFlag::Zero, result.flags.z);
        self.set_flag(StatusFlag::Negative, result.flags.n);
        result.value
    }

    /// Z and N from a freshly loaded or pulled register value.
    pub(crate) fn update_zero_and_negative_flag(&mut self, value: u8) {
        self.set_flag(StatusFlag::Zero, value == 0);
        self.set_flag(StatusFlag::Negative, value & 0x80 != 0);
    }

    /// Report a fault to the host. The invalid latch makes sure the
    /// callback fires at most once per reset.
    pub(crate) fn report_invalid(&mut self) {
        if !self.is_invalid {
            self.is_invalid = true;
            self.bus.fault(Fault::InvalidOpcode);
        }
    }
}
