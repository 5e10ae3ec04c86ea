//! The normative opcode table of the XL processor. The CPU dispatches
//! through it, the assembler searches it in reverse, and the disassembler
//! walks it forward. The index of a combo is the instruction byte.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Implied,          // nam
    Immediate,        // imm
    Absolute,         // abs
    AbsoluteIndexedX, // abx
    AbsoluteIndexedY, // aby
    Relative,         // rel
    ZeroPage,         // zpg
    ZeroPageX,        // zpx
    ZeroPageY,        // zpy
    Indirect,         // vec
    IndirectX,        // zvx
    IndirectY,        // zyv
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum Instruction {
    // Specials and flag commands
    INV, NOP, BRK, RTI, RET, FOR, FND, CLC,
    // Register increment/decrement
    APP, AMM, SPP, SMM, XPP, XMM, YPP, YMM,
    // Memory increment/decrement
    INC, DEC,
    // Conditional jumps, one per flag, jump-if-false then jump-if-true
    JFB, JFC, JFD, JFN, JFR, JFU, JFV, JFZ,
    JTB, JTC, JTD, JTN, JTR, JTU, JTV, JTZ,
    // Unconditional control flow
    JMP, CAL,
    // Loads and stores
    LDA, LDX, LDY, STA, STX, STY,
    // Stack commands
    PLA, PLF, PLX, PLY, PHA, PHF, PHX, PHY,
    // Transfers
    TAF, TAS, TAX, TAY, TFA, TSA, TXA, TYA,
    // Compares
    CMP, CPX, CPY,
    // Arithmetic
    SBC, SUB, ADC, ADD,
    // Logic
    BOR, XOR, AND, BIT, NOT, NTA,
    // Shifts through carry
    SHL, SHR, SLA, SRA,
    // Register clears
    ZRA, ZRX, ZRY,
}

/// One entry of the dispatch table: which instruction runs and how its
/// operand is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Combo {
    pub instruction: Instruction,
    pub mode: Mode,
}

macro_rules! mode_to_type {
    (nam) => {
        Mode::Implied
    };
    (imm) => {
        Mode::Immediate
    };
    (abs) => {
        Mode::Absolute
    };
    (abx) => {
        Mode::AbsoluteIndexedX
    };
    (aby) => {
        Mode::AbsoluteIndexedY
    };
    (rel) => {
        Mode::Relative
    };
    (zpg) => {
        Mode::ZeroPage
    };
    (zpx) => {
        Mode::ZeroPageX
    };
    (zpy) => {
        Mode::ZeroPageY
    };
    (vec) => {
        Mode::Indirect
    };
    (zvx) => {
        Mode::IndirectX
    };
    (zyv) => {
        Mode::IndirectY
    };
}

macro_rules! combo {
    ($instruction:ident, $mode:ident) => {
        Combo {
            instruction: Instruction::$instruction,
            mode: mode_to_type!($mode),
        }
    };
}

#[rustfmt::skip]
pub static COMBOS: [Combo; 256] = [
    // $00 Specials and register inc/dec
    combo!(INV, nam), combo!(BRK, nam), combo!(RTI, nam), combo!(RET, nam),
    combo!(FOR, imm), combo!(FND, imm), combo!(CLC, nam), combo!(NOP, nam),
    combo!(APP, nam), combo!(AMM, nam), combo!(SPP, nam), combo!(SMM, nam),
    combo!(XPP, nam), combo!(XMM, nam), combo!(YPP, nam), combo!(YMM, nam),
    // $10 Conditional jumps
    combo!(JFB, rel), combo!(JFC, rel), combo!(JFD, rel), combo!(JFN, rel),
    combo!(JFR, rel), combo!(JFU, rel), combo!(JFV, rel), combo!(JFZ, rel),
    combo!(JTB, rel), combo!(JTC, rel), combo!(JTD, rel), combo!(JTN, rel),
    combo!(JTR, rel), combo!(JTU, rel), combo!(JTV, rel), combo!(JTZ, rel),
    // $20 Stack ops and transfers
    combo!(PHA, nam), combo!(PHF, nam), combo!(PHX, nam), combo!(PHY, nam),
    combo!(PLA, nam), combo!(PLF, nam), combo!(PLX, nam), combo!(PLY, nam),
    combo!(TAF, nam), combo!(TAS, nam), combo!(TAX, nam), combo!(TAY, nam),
    combo!(TFA, nam), combo!(TSA, nam), combo!(TXA, nam), combo!(TYA, nam),
    // $30 Accumulator loads and stores
    combo!(LDA, imm), combo!(LDA, abs), combo!(LDA, zpg), combo!(LDA, vec),
    combo!(LDA, abx), combo!(LDA, aby), combo!(LDA, zpx), combo!(LDA, zpy),
    combo!(ZRA, nam), combo!(STA, abs), combo!(STA, zpg), combo!(STA, vec),
    combo!(STA, abx), combo!(STA, aby), combo!(STA, zpx), combo!(STA, zpy),
    // $40 Index register loads
    combo!(ZRX, nam), combo!(LDX, imm), combo!(LDX, abs), combo!(LDX, aby),
    combo!(LDX, zpg), combo!(LDX, zpy), combo!(LDX, vec), combo!(LDX, zyv),
    combo!(ZRY, nam), combo!(LDY, imm), combo!(LDY, abs), combo!(LDY, abx),
    combo!(LDY, zpg), combo!(LDY, zpx), combo!(LDY, vec), combo!(LDY, zvx),
    // $50 Compares and jumps
    combo!(CMP, imm), combo!(CMP, abs), combo!(CMP, zpg), combo!(CMP, vec),
    combo!(CMP, abx), combo!(CMP, aby), combo!(CMP, zpx), combo!(CMP, zpy),
    combo!(JMP, rel), combo!(JMP, abs), combo!(JMP, zpg), combo!(JMP, vec),
    combo!(JMP, abx), combo!(JMP, aby), combo!(JMP, zpx), combo!(JMP, zpy),
    // $60 Index register stores and secondary lda/sta modes
    combo!(STX, abs), combo!(STX, aby), combo!(STX, zpg), combo!(STX, zpy),
    combo!(STX, vec), combo!(STX, zyv), combo!(LDA, zvx), combo!(LDA, zyv),
    combo!(STY, abs), combo!(STY, abx), combo!(STY, zpg), combo!(STY, zpx),
    combo!(STY, vec), combo!(STY, zvx), combo!(STA, zvx), combo!(STA, zyv),
    // $70 Calls and accumulator shifts
    combo!(NTA, nam), combo!(CAL, abs), combo!(CAL, zpg), combo!(CAL, vec),
    combo!(CAL, abx), combo!(CAL, aby), combo!(CAL, zpx), combo!(CAL, zpy),
    combo!(CAL, zvx), combo!(CAL, zyv), combo!(JMP, zvx), combo!(JMP, zyv),
    combo!(CMP, zvx), combo!(CMP, zyv), combo!(SLA, nam), combo!(SRA, nam),
    // $80 Memory increment and X compares
    combo!(INC, abs), combo!(INC, abx), combo!(INC, aby), combo!(INC, zpg),
    combo!(INC, zpx), combo!(INC, zpy), combo!(INC, vec), combo!(INC, zvx),
    combo!(INC, zyv), combo!(CPX, imm), combo!(CPX, abs), combo!(CPX, aby),
    combo!(CPX, zpg), combo!(CPX, zpy), combo!(CPX, vec), combo!(CPX, zyv),
    // $90 Memory decrement and Y compares
    combo!(DEC, abs), combo!(DEC, abx), combo!(DEC, aby), combo!(DEC, zpg),
    combo!(DEC, zpx), combo!(DEC, zpy), combo!(DEC, vec), combo!(DEC, zvx),
    combo!(DEC, zyv), combo!(CPY, imm), combo!(CPY, abs), combo!(CPY, abx),
    combo!(CPY, zpg), combo!(CPY, zpx), combo!(CPY, vec), combo!(CPY, zvx),
    // $A0 Bit tests and logical and
    combo!(BIT, imm), combo!(BIT, abs), combo!(BIT, zpg), combo!(BIT, vec),
    combo!(BIT, abx), combo!(BIT, aby), combo!(BIT, zpx), combo!(BIT, zpy),
    combo!(AND, imm), combo!(AND, abs), combo!(AND, zpg), combo!(AND, vec),
    combo!(AND, abx), combo!(AND, aby), combo!(AND, zpx), combo!(AND, zpy),
    // $B0 Logical or and exclusive or
    combo!(BOR, imm), combo!(BOR, abs), combo!(BOR, zpg), combo!(BOR, vec),
    combo!(BOR, abx), combo!(BOR, aby), combo!(BOR, zpx), combo!(BOR, zpy),
    combo!(XOR, imm), combo!(XOR, abs), combo!(XOR, zpg), combo!(XOR, vec),
    combo!(XOR, abx), combo!(XOR, aby), combo!(XOR, zpx), combo!(XOR, zpy),
    // $C0 Add and subtract with carry
    combo!(ADC, imm), combo!(ADC, abs), combo!(ADC, zpg), combo!(ADC, vec),
    combo!(ADC, abx), combo!(ADC, aby), combo!(ADC, zpx), combo!(ADC, zpy),
    combo!(SBC, imm), combo!(SBC, abs), combo!(SBC, zpg), combo!(SBC, vec),
    combo!(SBC, abx), combo!(SBC, aby), combo!(SBC, zpx), combo!(SBC, zpy),
    // $D0 Add and subtract ignoring carry
    combo!(ADD, imm), combo!(ADD, abs), combo!(ADD, zpg), combo!(ADD, vec),
    combo!(ADD, abx), combo!(ADD, aby), combo!(ADD, zpx), combo!(ADD, zpy),
    combo!(SUB, imm), combo!(SUB, abs), combo!(SUB, zpg), combo!(SUB, vec),
    combo!(SUB, abx), combo!(SUB, aby), combo!(SUB, zpx), combo!(SUB, zpy),
    // $E0 Indexed-indirect variants of the logic and arithmetic group
    combo!(BIT, zvx), combo!(BIT, zyv), combo!(AND, zvx), combo!(AND, zyv),
    combo!(BOR, zvx), combo!(BOR, zyv), combo!(XOR, zvx), combo!(XOR, zyv),
    combo!(ADC, zvx), combo!(ADC, zyv), combo!(SBC, zvx), combo!(SBC, zyv),
    combo!(ADD, zvx), combo!(ADD, zyv), combo!(SUB, zvx), combo!(SUB, zyv),
    // $F0 Memory complement and shifts, then the invalid tail
    combo!(NOT, zpg), combo!(NOT, zpx), combo!(NOT, abs), combo!(NOT, abx),
    combo!(SHL, zpg), combo!(SHL, zpx), combo!(SHL, abs), combo!(SHL, abx),
    combo!(SHR, zpg), combo!(SHR, zpx), combo!(SHR, abs), combo!(SHR, abx),
    combo!(INV, nam), combo!(INV, nam), combo!(INV, nam), combo!(INV, nam),
];

#[inline]
pub fn combo(opcode: u8) -> Combo {
    COMBOS[opcode as usize]
}

/// Reverse lookup for the assembler: the first opcode byte that pairs the
/// instruction with the addressing mode, if the pairing exists.
pub fn find_opcode(instruction: Instruction, mode: Mode) -> Option<u8> {
    COMBOS
        .iter()
        .position(|combo| combo.instruction == instruction && combo.mode == mode)
        .map(|index| index as u8)
}

/// Whole instruction size in bytes, opcode included, for each mode.
pub fn instruction_size(mode: Mode) -> usize {
    match mode {
        Mode::Implied => 1,
        Mode::Immediate => 2,
        Mode::Absolute => 3,
        Mode::AbsoluteIndexedX => 3,
        Mode::AbsoluteIndexedY => 3,
        Mode::Relative => 2,
        Mode::ZeroPage => 2,
        Mode::ZeroPageX => 2,
        Mode::ZeroPageY => 2,
        Mode::Indirect => 3,
        Mode::IndirectX => 2,
        Mode::IndirectY => 2,
    }
}

/// How the mode looks in assembler source, printed between the mnemonic and
/// the operand.
pub fn mode_signature(mode: Mode) -> &'static str {
    match mode {
        Mode::Implied => "",
        Mode::Immediate => " #",
        Mode::Absolute => " ",
        Mode::AbsoluteIndexedX => " x ",
        Mode::AbsoluteIndexedY => " y ",
        Mode::Relative => " ~",
        Mode::ZeroPage => " ",
        Mode::ZeroPageX => " x ",
        Mode::ZeroPageY => " y ",
        Mode::Indirect => " *",
        Mode::IndirectX => " x *",
        Mode::IndirectY => " y *",
    }
}

pub fn match_instruction(string: &str) -> Option<Instruction> {
    let instruction = match string.to_lowercase().as_ref() {
        "inv" => Instruction::INV,
        "nop" => Instruction::NOP,
        "brk" => Instruction::BRK,
        "rti" => Instruction::RTI,
        "ret" => Instruction::RET,
        "for" => Instruction::FOR,
        "fnd" => Instruction::FND,
        "clc" => Instruction::CLC,
        "app" => Instruction::APP,
        "amm" => Instruction::AMM,
        "spp" => Instruction::SPP,
        "smm" => Instruction::SMM,
        "xpp" => Instruction::XPP,
        "xmm" => Instruction::XMM,
        "ypp" => Instruction::YPP,
        "ymm" => Instruction::YMM,
        "inc" => Instruction::INC,
        "dec" => Instruction::DEC,
        "jfb" => Instruction::JFB,
        "jfc" => Instruction::JFC,
        "jfd" => Instruction::JFD,
        "jfn" => Instruction::JFN,
        "jfr" => Instruction::JFR,
        "jfu" => Instruction::JFU,
        "jfv" => Instruction::JFV,
        "jfz" => Instruction::JFZ,
        "jtb" => Instruction::JTB,
        "jtc" => Instruction::JTC,
        "jtd" => Instruction::JTD,
        "jtn" => Instruction::JTN,
        "jtr" => Instruction::JTR,
        "jtu" => Instruction::JTU,
        "jtv" => Instruction::JTV,
        "jtz" => Instruction::JTZ,
        "jmp" => Instruction::JMP,
        "cal" => Instruction::CAL,
        "lda" => Instruction::LDA,
        "ldx" => Instruction::LDX,
        "ldy" => Instruction::LDY,
        "sta" => Instruction::STA,
        "stx" => Instruction::STX,
        "sty" => Instruction::STY,
        "pla" => Instruction::PLA,
        "plf" => Instruction::PLF,
        "plx" => Instruction::PLX,
        "ply" => Instruction::PLY,
        "pha" => Instruction::PHA,
        "phf" => Instruction::PHF,
        "phx" => Instruction::PHX,
        "phy" => Instruction::PHY,
        "taf" => Instruction::TAF,
        "tas" => Instruction::TAS,
        "tax" => Instruction::TAX,
        "tay" => Instruction::TAY,
        "tfa" => Instruction::TFA,
        "tsa" => Instruction::TSA,
        "txa" => Instruction::TXA,
        "tya" => Instruction::TYA,
        "cmp" => Instruction::CMP,
        "cpx" => Instruction::CPX,
        "cpy" => Instruction::CPY,
        "sbc" => Instruction::SBC,
        "sub" => Instruction::SUB,
        "adc" => Instruction::ADC,
        "add" => Instruction::ADD,
        "bor" => Instruction::BOR,
        "xor" => Instruction::XOR,
        "and" => Instruction::AND,
        "bit" => Instruction::BIT,
        "not" => Instruction::NOT,
        "nta" => Instruction::NTA,
        "shl" => Instruction::SHL,
        "shr" => Instruction::SHR,
        "sla" => Instruction::SLA,
        "sra" => Instruction::SRA,
        "zra" => Instruction::ZRA,
        "zrx" => Instruction::ZRX,
        "zry" => Instruction::ZRY,
        _ => return None,
    };
    Some(instruction)
}

pub fn instruction_name(instruction: Instruction) -> &'static str {
    match instruction {
        Instruction::INV => "inv",
        Instruction::NOP => "nop",
        Instruction::BRK => "brk",
        Instruction::RTI => "rti",
        Instruction::RET => "ret",
        Instruction::FOR => "for",
        Instruction::FND => "fnd",
        Instruction::CLC => "clc",
        Instruction::APP => "app",
        Instruction::AMM => "amm",
        Instruction::SPP => "spp",
        Instruction::SMM => "smm",
        Instruction::XPP => "xpp",
        Instruction::XMM => "xmm",
        Instruction::YPP => "ypp",
        Instruction::YMM => "ymm",
        Instruction::INC => "inc",
        Instruction::DEC => "dec",
        Instruction::JFB => "jfb",
        Instruction::JFC => "jfc",
        Instruction::JFD => "jfd",
        Instruction::JFN => "jfn",
        Instruction::JFR => "jfr",
        Instruction::JFU => "jfu",
        Instruction::JFV => "jfv",
        Instruction::JFZ => "jfz",
        Instruction::JTB => "jtb",
        Instruction::JTC => "jtc",
        Instruction::JTD => "jtd",
        Instruction::JTN => "jtn",
        Instruction::JTR => "jtr",
        Instruction::JTU => "jtu",
        Instruction::JTV => "jtv",
        Instruction::JTZ => "jtz",
        Instruction::JMP => "jmp",
        Instruction::CAL => "cal",
        Instruction::LDA => "lda",
        Instruction::LDX => "ldx",
        Instruction::LDY => "ldy",
        Instruction::STA => "sta",
        Instruction::STX => "stx",
        Instruction::STY => "sty",
        Instruction::PLA => "pla",
        Instruction::PLF => "plf",
        Instruction::PLX => "plx",
        Instruction::PLY => "ply",
        Instruction::PHA => "pha",
        Instruction::PHF => "phf",
        Instruction::PHX => "phx",
        Instruction::PHY => "phy",
        Instruction::TAF => "taf",
        Instruction::TAS => "tas",
        Instruction::TAX => "tax",
        Instruction::TAY => "tay",
        Instruction::TFA => "tfa",
        Instruction::TSA => "tsa",
        Instruction::TXA => "txa",
        Instruction::TYA => "tya",
        Instruction::CMP => "cmp",
        Instruction::CPX => "cpx",
        Instruction::CPY => "cpy",
        Instruction::SBC => "sbc",
        Instruction::SUB => "sub",
        Instruction::ADC => "adc",
        Instruction::ADD => "add",
        Instruction::BOR => "bor",
        Instruction::XOR => "xor",
        Instruction::AND => "and",
        Instruction::BIT => "bit",
        Instruction::NOT => "not",
        Instruction::NTA => "nta",
        Instruction::SHL => "shl",
        Instruction::SHR => "shr",
        Instruction::SLA => "sla",
        Instruction::SRA => "sra",
        Instruction::ZRA => "zra",
        Instruction::ZRX => "zrx",
        Instruction::ZRY => "zry",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn table_landmarks() {
        assert_eq!(combo(0x00), combo!(INV, nam));
        assert_eq!(combo(0x1F), combo!(JTZ, rel));
        assert_eq!(combo(0x30), combo!(LDA, imm));
        assert_eq!(combo(0x38), combo!(ZRA, nam));
        assert_eq!(combo(0x40), combo!(ZRX, nam));
        assert_eq!(combo(0x48), combo!(ZRY, nam));
        assert_eq!(combo(0xC0), combo!(ADC, imm));
        assert_eq!(combo(0xFC), combo!(INV, nam));
        assert_eq!(combo(0xFF), combo!(INV, nam));
    }

    #[test]
    fn reverse_lookup_inverts_the_table() {
        assert_eq!(find_opcode(Instruction::LDA, Mode::Immediate), Some(0x30));
        assert_eq!(find_opcode(Instruction::STA, Mode::Absolute), Some(0x39));
        assert_eq!(find_opcode(Instruction::JMP, Mode::IndirectY), Some(0x7B));
        // INV has several opcodes; the search finds the first.
        assert_eq!(find_opcode(Instruction::INV, Mode::Implied), Some(0x00));
        // Pairings outside the table are rejected.
        assert_eq!(find_opcode(Instruction::STA, Mode::Immediate), None);
        assert_eq!(find_opcode(Instruction::NOP, Mode::Absolute), None);
    }

    #[test]
    fn names_round_trip() {
        for combo in COMBOS.iter() {
            let name = instruction_name(combo.instruction);
            assert_eq!(match_instruction(name), Some(combo.instruction));
        }
    }
}
