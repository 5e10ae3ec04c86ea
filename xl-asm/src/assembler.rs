//! Single-pass assembler with deferred label back-patching. Each line is
//! either a label definition, a directive, or one instruction; expressions
//! evaluate strictly left to right with no operator precedence, and
//! references to labels that are not defined yet are recorded and patched
//! after all input is consumed.

use crate::error::{AsmError, ErrorKind, SourcePos};
use crate::lexer::{Lexer, StringIndex, Token, TokenKind};
use std::path::Path;
use xl_core::constants::{IMAGE_SIZE, ROM_ORIGIN};
use xl_core::opcodes::{find_opcode, match_instruction, Instruction, Mode};

struct Symbol {
    name: StringIndex,
    value: i32,
    is_label: bool,
}

/// Named values and labels. `let` symbols may be redefined freely; labels
/// may not, and nothing may be redefined as a label.
struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    fn new() -> SymbolTable {
        SymbolTable {
            symbols: Vec::new(),
        }
    }

    fn find(&self, name: StringIndex) -> Option<&Symbol> {
        self.symbols.iter().find(|symbol| symbol.name == name)
    }

    /// Define or redefine a symbol. Returns false when the redefinition
    /// rules refuse it.
    fn define(&mut self, name: StringIndex, value: i32, is_label: bool) -> bool {
        if let Some(symbol) = self.symbols.iter_mut().find(|symbol| symbol.name == name) {
            if symbol.is_label || is_label {
                return false;
            }
            symbol.value = value;
            return true;
        }
        self.symbols.push(Symbol {
            name,
            value,
            is_label,
        });
        true
    }
}

/// A byte in the output whose final value waits on a label.
struct Backpatch {
    offset: usize,
    label: StringIndex,
    relative: bool,
    pos: SourcePos,
}

/// The output buffer, bounded at the 32 KiB image size.
struct Section {
    bytes: Vec<u8>,
}

impl Section {
    fn new() -> Section {
        Section { bytes: Vec::new() }
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn emit(&mut self, data: &[u8]) -> Result<(), AsmError> {
        if self.bytes.len() + data.len() > IMAGE_SIZE {
            return Err(AsmError::bare(ErrorKind::ImageOverflow));
        }
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    fn emit_byte(&mut self, data: u8) -> Result<(), AsmError> {
        self.emit(&[data])
    }

    fn emit_word(&mut self, data: u16) -> Result<(), AsmError> {
        self.emit(&data.to_le_bytes())
    }

    fn emit_zeros(&mut self, count: usize) -> Result<(), AsmError> {
        if self.bytes.len() + count > IMAGE_SIZE {
            return Err(AsmError::bare(ErrorKind::ImageOverflow));
        }
        self.bytes.resize(self.bytes.len() + count, 0);
        Ok(())
    }

    fn patch_byte(&mut self, offset: usize, data: u8) {
        self.bytes[offset] = data;
    }

    fn patch_word(&mut self, offset: usize, data: u16) {
        self.bytes[offset..offset + 2].copy_from_slice(&data.to_le_bytes());
    }
}

fn is_keyword(name: &str) -> bool {
    matches!(
        name,
        "let" | "rb" | "db" | "dw" | "include" | "incbin" | "x" | "y"
    ) || match_instruction(name).is_some()
}

fn unexpected(token: &Token) -> AsmError {
    AsmError::new(ErrorKind::UnexpectedToken, token.pos.clone())
}

pub struct Assembler {
    lexer: Lexer,
    symbols: SymbolTable,
    patches: Vec<Backpatch>,
    section: Section,
    /// Interned `$`, the location counter, refreshed at every line.
    dollar: StringIndex,
}

/// Assemble one source file (plus anything it includes) into an image.
pub fn assemble_file(path: &Path) -> Result<Vec<u8>, AsmError> {
    Assembler::new(Lexer::from_file(path)?).assemble()
}

/// Assemble in-memory source. The filename only labels diagnostics.
pub fn assemble_str(filename: &str, text: &str) -> Result<Vec<u8>, AsmError> {
    Assembler::new(Lexer::from_str(filename, text)).assemble()
}

impl Assembler {
    pub fn new(mut lexer: Lexer) -> Assembler {
        let dollar = lexer.strings.intern("$");
        let origin = lexer.strings.intern("$$");
        let mut symbols = SymbolTable::new();
        symbols.define(dollar, 0, false);
        symbols.define(origin, ROM_ORIGIN as i32, false);
        Assembler {
            lexer,
            symbols,
            patches: Vec::new(),
            section: Section::new(),
            dollar,
        }
    }

    pub fn assemble(mut self) -> Result<Vec<u8>, AsmError> {
        self.lexer.advance()?;
        while !self.read_line()? {}
        for patch in &self.patches {
            let symbol = self
                .symbols
                .find(patch.label)
                .ok_or_else(|| AsmError::new(ErrorKind::UndefinedLabel, patch.pos.clone()))?;
            let addr = symbol.value;
            if patch.relative {
                // The displacement is taken from the opcode byte, one
                // before the patched operand.
                let origin = ROM_ORIGIN as i32 + patch.offset as i32 - 1;
                let rel = addr - origin;
                if !(-128..=127).contains(&rel) {
                    return Err(AsmError::new(ErrorKind::LabelTooFar, patch.pos.clone()));
                }
                self.section.patch_byte(patch.offset, rel as u8);
            } else {
                self.section.patch_word(patch.offset, addr as u16);
            }
        }
        Ok(self.section.bytes)
    }

    /// Interpret one line. Returns true once the input is exhausted.
    fn read_line(&mut self) -> Result<bool, AsmError> {
        let dollar_value = ROM_ORIGIN as i32 + self.section.len() as i32;
        // `$` is never a label, so this cannot be refused.
        self.symbols.define(self.dollar, dollar_value, false);

        let token = self.lexer.cur().clone();
        match token.kind {
            TokenKind::Eof => Ok(true),
            TokenKind::Newline => {
                self.lexer.advance()?;
                Ok(false)
            }
            TokenKind::Ident(name) => {
                let text = self.lexer.strings.get(name).to_string();
                if let Some(instruction) = match_instruction(&text) {
                    self.read_instruction(instruction, &token)?;
                    return Ok(false);
                }
                match text.as_str() {
                    "let" => self.do_let(&token)?,
                    "rb" => self.do_rb(&token)?,
                    "db" => self.do_defvals(&token, false)?,
                    "dw" => self.do_defvals(&token, true)?,
                    "include" => self.do_include(&token)?,
                    "incbin" => self.do_incbin(&token)?,
                    "x" | "y" => return Err(unexpected(&token)),
                    _ => {
                        // A label definition: `name:`.
                        self.lexer.advance()?;
                        if self.lexer.cur().kind != TokenKind::Colon {
                            return Err(AsmError::new(ErrorKind::NoColon, token.pos));
                        }
                        if !self.symbols.define(name, dollar_value, true) {
                            return Err(AsmError::new(ErrorKind::Redefinition, token.pos));
                        }
                        self.lexer.advance()?;
                    }
                }
                Ok(false)
            }
            _ => Err(unexpected(&token)),
        }
    }

    /// Parse one instruction line. The addressing mode is decided by the
    /// operand syntax, with absolute modes demoted to their zero-page
    /// variants when the value fits in one byte.
    fn read_instruction(&mut self, instruction: Instruction, itok: &Token) -> Result<(), AsmError> {
        let mut label: Option<(StringIndex, Token)> = None;
        let mut value = 0i32;
        let mut size = 0usize;

        self.lexer.advance()?;
        let first = self.lexer.cur().clone();
        let mut mode = Mode::Absolute;
        let mut has_operand = true;
        match first.kind {
            TokenKind::Newline | TokenKind::Eof => {
                mode = Mode::Implied;
                has_operand = false;
            }
            TokenKind::Sharp => {
                mode = Mode::Immediate;
                self.lexer.advance()?;
            }
            TokenKind::Star => {
                mode = Mode::Indirect;
                self.lexer.advance()?;
            }
            TokenKind::Nor => {
                mode = Mode::Relative;
                self.lexer.advance()?;
            }
            TokenKind::Ident(name) => {
                let text = self.lexer.strings.get(name);
                if text == "x" || text == "y" {
                    let with_x = text == "x";
                    mode = if with_x {
                        Mode::AbsoluteIndexedX
                    } else {
                        Mode::AbsoluteIndexedY
                    };
                    self.lexer.advance()?;
                    if self.lexer.cur().kind == TokenKind::Star {
                        // A trailing `*` turns indexed into indexed-indirect.
                        mode = if with_x {
                            Mode::IndirectX
                        } else {
                            Mode::IndirectY
                        };
                        self.lexer.advance()?;
                    }
                }
            }
            _ => {}
        }

        if has_operand {
            let cur = self.lexer.cur().clone();
            if cur.is_line_end() {
                return Err(AsmError::new(ErrorKind::NoArgument, itok.pos.clone()));
            }
            let forward = match cur.kind {
                TokenKind::Ident(name) => {
                    !is_keyword(self.lexer.strings.get(name)) && self.symbols.find(name).is_none()
                }
                _ => false,
            };
            if forward {
                let name = match cur.kind {
                    TokenKind::Ident(name) => name,
                    _ => unreachable!(),
                };
                label = Some((name, cur));
                size = if mode == Mode::Relative { 1 } else { 2 };
                self.lexer.advance()?;
            } else {
                value = self.eval_expr()?;
                size = if value > 255 { 2 } else { 1 };
            }
            if mode == Mode::AbsoluteIndexedX && size == 1 {
                mode = Mode::ZeroPageX;
            }
            if mode == Mode::AbsoluteIndexedY && size == 1 {
                mode = Mode::ZeroPageY;
            }
            if mode == Mode::Absolute && size == 1 {
                mode = Mode::ZeroPage;
            }
        }

        let cur = self.lexer.cur().clone();
        if !cur.is_line_end() {
            return Err(unexpected(&cur));
        }

        let opcode = find_opcode(instruction, mode)
            .ok_or_else(|| AsmError::new(ErrorKind::UnknownPattern, itok.pos.clone()))?;
        self.section.emit_byte(opcode)?;

        if mode == Mode::Immediate {
            self.section.emit_byte(value as u8)?;
            return Ok(());
        }
        if let Some((name, tok)) = label {
            self.patches.push(Backpatch {
                offset: self.section.len(),
                label: name,
                relative: mode == Mode::Relative,
                pos: tok.pos,
            });
            if size == 1 {
                self.section.emit_byte(0)?;
            } else {
                self.section.emit_word(0)?;
            }
        } else if mode == Mode::Relative {
            let origin = ROM_ORIGIN as i32 + self.section.len() as i32 - 1;
            let rel = value - origin;
            if !(-128..=127).contains(&rel) {
                return Err(AsmError::new(ErrorKind::LocationTooFar, itok.pos.clone()));
            }
            self.section.emit_byte(rel as u8)?;
        } else if size == 1 {
            self.section.emit_byte(value as u8)?;
        } else {
            self.section.emit_word(value as u16)?;
        }
        Ok(())
    }

    /// `let NAME EXPR`
    fn do_let(&mut self, directive: &Token) -> Result<(), AsmError> {
        self.lexer.advance()?;
        let name = match self.lexer.cur().kind {
            TokenKind::Ident(name) if !is_keyword(self.lexer.strings.get(name)) => name,
            _ => return Err(AsmError::new(ErrorKind::LetName, directive.pos.clone())),
        };
        self.lexer.advance()?;
        if self.lexer.cur().is_line_end() {
            return Err(AsmError::new(
                ErrorKind::MissingExpression("let"),
                directive.pos.clone(),
            ));
        }
        let value = self.eval_expr()?;
        let cur = self.lexer.cur().clone();
        if !cur.is_line_end() {
            return Err(unexpected(&cur));
        }
        self.lexer.advance()?;
        if !self.symbols.define(name, value, false) {
            return Err(AsmError::new(ErrorKind::Redefinition, directive.pos.clone()));
        }
        Ok(())
    }

    /// `rb N` emits N zero bytes.
    fn do_rb(&mut self, directive: &Token) -> Result<(), AsmError> {
        self.lexer.advance()?;
        if self.lexer.cur().is_line_end() {
            return Err(AsmError::new(
                ErrorKind::MissingExpression("rb"),
                directive.pos.clone(),
            ));
        }
        let count = self.eval_expr()?;
        let cur = self.lexer.cur().clone();
        if !cur.is_line_end() {
            return Err(unexpected(&cur));
        }
        self.lexer.advance()?;
        self.section.emit_zeros(count as usize)
    }

    /// `db VALUES…` / `dw VALUES…`: comma-separated expressions, strings
    /// emitting their raw bytes, and forward label references reserving a
    /// word either way.
    fn do_defvals(&mut self, directive: &Token, words: bool) -> Result<(), AsmError> {
        let name = if words { "dw" } else { "db" };
        let mut anchor = directive.clone();
        loop {
            self.lexer.advance()?;
            let token = self.lexer.cur().clone();
            if token.is_line_end() {
                return Err(AsmError::new(
                    ErrorKind::MissingExpression(name),
                    anchor.pos.clone(),
                ));
            }
            match token.kind {
                TokenKind::Str(index) => {
                    let string = self.lexer.strings.get(index).to_string();
                    self.section.emit(string.as_bytes())?;
                    self.lexer.advance()?;
                }
                TokenKind::Ident(index)
                    if !is_keyword(self.lexer.strings.get(index))
                        && self.symbols.find(index).is_none() =>
                {
                    self.patches.push(Backpatch {
                        offset: self.section.len(),
                        label: index,
                        relative: false,
                        pos: token.pos.clone(),
                    });
                    self.section.emit_word(0)?;
                    self.lexer.advance()?;
                }
                _ => {
                    let value = self.eval_expr()?;
                    if words {
                        self.section.emit_word(value as u16)?;
                    } else {
                        self.section.emit_byte(value as u8)?;
                    }
                }
            }
            let cur = self.lexer.cur().clone();
            if cur.is_line_end() {
                break;
            }
            if cur.kind != TokenKind::Comma {
                return Err(unexpected(&cur));
            }
            anchor = cur;
        }
        self.lexer.advance()?;
        Ok(())
    }

    /// `include 'FILE'` switches input to the named file until its end.
    fn do_include(&mut self, directive: &Token) -> Result<(), AsmError> {
        self.lexer.advance()?;
        let filename = match self.lexer.cur().kind {
            TokenKind::Str(index) => self.lexer.strings.get(index).to_string(),
            _ => {
                return Err(AsmError::new(
                    ErrorKind::MissingFilename("include"),
                    directive.pos.clone(),
                ))
            }
        };
        self.lexer.advance()?;
        let cur = self.lexer.cur().clone();
        if !cur.is_line_end() {
            return Err(unexpected(&cur));
        }
        self.lexer.include(&filename, &directive.pos)?;
        self.lexer.advance()?;
        Ok(())
    }

    /// `incbin 'FILE'` emits the file contents verbatim.
    fn do_incbin(&mut self, directive: &Token) -> Result<(), AsmError> {
        self.lexer.advance()?;
        let filename = match self.lexer.cur().kind {
            TokenKind::Str(index) => self.lexer.strings.get(index).to_string(),
            _ => {
                return Err(AsmError::new(
                    ErrorKind::MissingFilename("incbin"),
                    directive.pos.clone(),
                ))
            }
        };
        self.lexer.advance()?;
        let cur = self.lexer.cur().clone();
        if !cur.is_line_end() {
            return Err(unexpected(&cur));
        }
        self.lexer.advance()?;
        let bytes = std::fs::read(&filename).map_err(|source| AsmError {
            kind: ErrorKind::Io {
                filename: filename.clone(),
                source,
            },
            pos: Some(directive.pos.clone()),
        })?;
        self.section.emit(&bytes)
    }

    /// One term: an integer constant or an already-defined name.
    fn eval_term(&mut self) -> Result<i32, AsmError> {
        let token = self.lexer.cur().clone();
        match token.kind {
            TokenKind::Ident(name) if !is_keyword(self.lexer.strings.get(name)) => {
                match self.symbols.find(name) {
                    Some(symbol) => Ok(symbol.value),
                    None => Err(AsmError::new(ErrorKind::UndefinedIdentifier, token.pos)),
                }
            }
            TokenKind::Int(value) => Ok(value),
            _ => Err(AsmError::new(ErrorKind::ExpectedTerm, token.pos)),
        }
    }

    /// Evaluate `term (op term)*` strictly left to right. There is no
    /// operator precedence and the grammar has no parentheses; write
    /// expressions linearly. The result is masked to 16 bits.
    fn eval_expr(&mut self) -> Result<i32, AsmError> {
        let mut value = self.eval_term()?;
        loop {
            self.lexer.advance()?;
            let op = self.lexer.cur().clone();
            if matches!(
                op.kind,
                TokenKind::Newline | TokenKind::Eof | TokenKind::Comma
            ) {
                break;
            }
            self.lexer.advance()?;
            let term = self.eval_term()?;
            value = match op.kind {
                TokenKind::Minus => value.wrapping_sub(term),
                TokenKind::Plus => value.wrapping_add(term),
                TokenKind::Star => value.wrapping_mul(term),
                TokenKind::Slash => {
                    if term == 0 {
                        return Err(AsmError::new(
                            ErrorKind::DivisionByZero,
                            self.lexer.cur().pos.clone(),
                        ));
                    }
                    value / term
                }
                TokenKind::BitXor => value ^ term,
                // `~` is binary here: a ~ b is the complement of a | b.
                TokenKind::Nor => !(value | term),
                TokenKind::BitOr => value | term,
                TokenKind::BitAnd => value & term,
                TokenKind::ShiftRight | TokenKind::ShiftLeft => {
                    if !(0..=16).contains(&term) {
                        return Err(AsmError::new(
                            ErrorKind::ShiftRange,
                            self.lexer.cur().pos.clone(),
                        ));
                    }
                    if op.kind == TokenKind::ShiftRight {
                        value >> term
                    } else {
                        value.wrapping_shl(term as u32)
                    }
                }
                _ => return Err(AsmError::new(ErrorKind::InvalidOperator, op.pos)),
            };
        }
        Ok(value & 0xFFFF)
    }
}
