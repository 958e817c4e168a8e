//! 6502 Assembler Module
//!
//! Converts assembly language source code into machine code using the same
//! [`OPCODE_TABLE`](crate::OPCODE_TABLE) the CPU decodes with.
//!
//! Assembly runs in two passes. The first parses every line, records label
//! addresses and fixes each instruction's opcode (and therefore its size). The
//! second resolves label references and emits bytes.
//!
//! # Syntax
//!
//! ```text
//! label:  LDA #$10      ; immediate
//!         STA $80       ; zero page (two hex digits or a value <= 255)
//!         STA $0080     ; absolute
//!         LDA table,X   ; labels always use the absolute form
//!         BNE label     ; branches encode the displacement
//!         .byte 1, $02, %11
//!         .word label
//! ```
//!
//! A program that does not end in `HLT` or `RTS` gets an `RTS` appended.
//!
//! # Examples
//!
//! ```
//! use emu6502::assemble_at;
//!
//! let output = assemble_at("loop: DEX\n BNE loop\n HLT", 0x0200).unwrap();
//! assert_eq!(output.bytes, vec![0xCA, 0xD0, 0xFD, 0x02]);
//! assert_eq!(output.symbol("loop"), Some(0x0200));
//! ```

pub mod encoder;
pub mod lexer;
pub mod parser;
pub mod symbol_table;

use std::fmt;

use crate::memory::layout;
use crate::opcodes::{Mnemonic, OPCODE_TABLE};
use parser::{Statement, Value};
use symbol_table::SymbolTable;

/// Complete output from assembling source code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerOutput {
    /// Assembled machine code bytes
    pub bytes: Vec<u8>,

    /// Every defined label, in definition order
    pub symbols: Vec<Symbol>,

    /// Address of the first byte
    pub origin: u16,
}

impl AssemblerOutput {
    /// Address of a label. Names are case-insensitive.
    pub fn symbol(&self, name: &str) -> Option<u16> {
        self.symbols
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .map(|s| s.address)
    }
}

/// A symbol table entry mapping a label to an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Label name (uppercase normalized)
    pub name: String,

    /// Resolved memory address for this label
    pub address: u16,

    /// Source line where label was defined
    pub line: usize,
}

/// An error encountered during assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerError {
    /// Error type classification
    pub error_type: ErrorType,

    /// Line number where error occurred (1-indexed)
    pub line: usize,

    /// Human-readable error message
    pub message: String,
}

impl AssemblerError {
    pub fn new(error_type: ErrorType, line: usize, message: impl Into<String>) -> Self {
        Self {
            error_type,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for AssemblerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for AssemblerError {}

/// Classification of assembly errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Syntax error (invalid format, unexpected character, unknown mnemonic)
    SyntaxError,

    /// The mnemonic has no opcode for the operand's addressing mode
    UnknownEncoding,

    /// The opcode exists but has no execution semantics
    UnimplementedOpcode,

    /// Undefined label reference
    UndefinedLabel,

    /// Duplicate label definition
    DuplicateLabel,

    /// Invalid label name (too long, reserved word)
    InvalidLabel,

    /// Operand value out of range (byte operand > 255, branch too far)
    RangeError,
}

/// Work left for the second pass.
enum Emit<'a> {
    Instruction { opcode: u8, value: Option<&'a Value> },
    Bytes(&'a [Value]),
    Words(&'a [Value]),
}

struct Pending<'a> {
    line: usize,
    address: u16,
    emit: Emit<'a>,
}

/// Assemble source code at [`layout::ROM_BASE`], where `Memory::load_rom`
/// places programs.
pub fn assemble(source: &str) -> Result<AssemblerOutput, Vec<AssemblerError>> {
    assemble_at(source, layout::ROM_BASE)
}

/// Assemble source code for a program whose first byte lives at `origin`.
///
/// # Errors
///
/// Every error found is returned. Lexing and parsing errors stop assembly
/// before the label passes run.
pub fn assemble_at(source: &str, origin: u16) -> Result<AssemblerOutput, Vec<AssemblerError>> {
    let tokens = lexer::tokenize(source)?;
    let lines = parser::parse(tokens)?;
    let mut errors = Vec::new();

    // Pass 1: labels and sizes
    let mut symbols = SymbolTable::new();
    let mut pending = Vec::new();
    let mut pc = origin as u32;
    let mut ends_with_return = false;

    for line in &lines {
        let line_number = line.line_number;

        if let Some(label) = &line.label {
            if let Err(message) = validate_label(label) {
                errors.push(AssemblerError::new(ErrorType::InvalidLabel, line_number, message));
            } else if let Err(existing) = symbols.add_symbol(label.clone(), pc as u16, line_number) {
                errors.push(AssemblerError::new(
                    ErrorType::DuplicateLabel,
                    line_number,
                    format!("label '{}' already defined on line {}", label, existing.line),
                ));
            }
        }

        let Some(statement) = &line.statement else {
            continue;
        };

        let (emit, size) = match statement {
            Statement::Instruction { mnemonic, operand } => {
                ends_with_return = matches!(mnemonic, Mnemonic::HLT | Mnemonic::RTS);
                match encoder::select_opcode(*mnemonic, operand, line_number) {
                    Ok(opcode) => {
                        let value = encoder::operand_value(operand);
                        let size = OPCODE_TABLE[opcode as usize].size_bytes as u32;
                        (Emit::Instruction { opcode, value }, size)
                    }
                    Err(err) => {
                        errors.push(err);
                        continue;
                    }
                }
            }
            Statement::Bytes(values) => {
                ends_with_return = false;
                (Emit::Bytes(values), values.len() as u32)
            }
            Statement::Words(values) => {
                ends_with_return = false;
                (Emit::Words(values), 2 * values.len() as u32)
            }
        };

        if pc + size > 0x1_0000 {
            errors.push(AssemblerError::new(
                ErrorType::RangeError,
                line_number,
                "program extends past $FFFF",
            ));
            break;
        }
        pending.push(Pending {
            line: line_number,
            address: pc as u16,
            emit,
        });
        pc += size;
    }

    // Pass 2: resolve and emit
    let mut bytes = Vec::with_capacity((pc - origin as u32) as usize + 1);
    for item in &pending {
        if let Err(err) = emit(item, &symbols, &mut bytes) {
            errors.push(err);
        }
    }

    if !ends_with_return {
        if pc < 0x1_0000 {
            bytes.push(0x60);
        } else {
            let last_line = lines.last().map_or(1, |l| l.line_number);
            errors.push(AssemblerError::new(
                ErrorType::RangeError,
                last_line,
                "program extends past $FFFF",
            ));
        }
    }

    if !errors.is_empty() {
        errors.sort_by_key(|e| e.line);
        return Err(errors);
    }

    let symbols = symbols.into_symbols();
    tracing::debug!(origin, bytes = bytes.len(), symbols = symbols.len(), "assembled");

    Ok(AssemblerOutput {
        bytes,
        symbols,
        origin,
    })
}

fn resolve(value: &Value, symbols: &SymbolTable, line: usize) -> Result<u16, AssemblerError> {
    match value {
        Value::Number { value, .. } => Ok(*value),
        Value::Label(name) => symbols
            .lookup_symbol(name)
            .map(|s| s.address)
            .ok_or_else(|| {
                AssemblerError::new(
                    ErrorType::UndefinedLabel,
                    line,
                    format!("undefined label '{}'", name),
                )
            }),
    }
}

fn emit(item: &Pending, symbols: &SymbolTable, out: &mut Vec<u8>) -> Result<(), AssemblerError> {
    match &item.emit {
        Emit::Instruction { opcode, value } => {
            let value = match value {
                Some(v) => resolve(v, symbols, item.line)?,
                None => 0,
            };
            out.extend(encoder::encode(*opcode, value, item.address, item.line)?);
        }
        Emit::Bytes(values) => {
            for v in values.iter() {
                let value = resolve(v, symbols, item.line)?;
                out.push(encoder::byte_operand(value, item.line)?);
            }
        }
        Emit::Words(values) => {
            for v in values.iter() {
                out.extend(resolve(v, symbols, item.line)?.to_le_bytes());
            }
        }
    }
    Ok(())
}

/// Validate a label name.
///
/// The lexer already restricts identifiers to letters, digits and
/// underscores. Labels must also start with a letter, be at most 32
/// characters long, and not be a mnemonic or register name.
fn validate_label(name: &str) -> Result<(), String> {
    if name.len() > 32 {
        return Err(format!("label name too long (max 32 characters): {}", name));
    }

    match name.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return Err(format!("label '{}' must start with a letter", name)),
    }

    if matches!(name, "A" | "X" | "Y") || name.parse::<Mnemonic>().is_ok() {
        return Err(format!("'{}' is reserved and cannot be a label", name));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_types(source: &str) -> Vec<ErrorType> {
        assemble(source)
            .unwrap_err()
            .into_iter()
            .map(|e| e.error_type)
            .collect()
    }

    #[test]
    fn test_validate_label_valid() {
        assert!(validate_label("START").is_ok());
        assert!(validate_label("LOOP_1").is_ok());
        assert!(validate_label("B").is_ok());
    }

    #[test]
    fn test_validate_label_invalid() {
        assert!(validate_label("").is_err());
        assert!(validate_label("_START").is_err());
        assert!(validate_label("LDA").is_err());
        assert!(validate_label("X").is_err());
        assert!(validate_label(&"A".repeat(33)).is_err());
    }

    #[test]
    fn test_appends_rts() {
        assert_eq!(assemble("LDA #1").unwrap().bytes, vec![0xA9, 0x01, 0x60]);
        assert_eq!(assemble("LDA #1\nRTS").unwrap().bytes, vec![0xA9, 0x01, 0x60]);
        assert_eq!(assemble("HLT ; done").unwrap().bytes, vec![0x02]);
        assert_eq!(assemble("").unwrap().bytes, vec![0x60]);
    }

    #[test]
    fn test_no_room_for_appended_rts() {
        let errors = assemble_at("NOP", 0xFFFF).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, ErrorType::RangeError);
        assert_eq!(errors[0].line, 1);

        // A program that already ends in HLT fits
        assert_eq!(assemble_at("HLT", 0xFFFF).unwrap().bytes, vec![0x02]);
        assert_eq!(assemble_at("NOP", 0xFFFE).unwrap().bytes, vec![0xEA, 0x60]);
    }

    #[test]
    fn test_forward_reference() {
        let output = assemble("JMP end\nNOP\nend: HLT").unwrap();
        assert_eq!(output.bytes, vec![0x4C, 0x04, 0xFD, 0xEA, 0x02]);
        assert_eq!(output.origin, layout::ROM_BASE);
        assert_eq!(output.symbols[0].name, "END");
        assert_eq!(output.symbols[0].line, 3);
    }

    #[test]
    fn test_label_errors() {
        assert_eq!(error_types("JMP nowhere"), vec![ErrorType::UndefinedLabel]);
        assert_eq!(
            error_types("a1: NOP\na1: NOP"),
            vec![ErrorType::DuplicateLabel]
        );
        assert_eq!(error_types("lda: NOP"), vec![ErrorType::InvalidLabel]);
    }

    #[test]
    fn test_errors_sorted_by_line() {
        let errors = assemble("STA #1\nLDA #$100\nBNE far\nfar: HLT").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].error_type, ErrorType::UnknownEncoding);
        assert_eq!(errors[0].line, 1);
        assert_eq!(errors[1].error_type, ErrorType::RangeError);
        assert_eq!(errors[1].line, 2);
    }

    #[test]
    fn test_data_directives() {
        let output = assemble_at("HLT\ndata: .byte 1, $FF\n.word data", 0x0200).unwrap();
        assert_eq!(output.bytes, vec![0x02, 0x01, 0xFF, 0x01, 0x02, 0x60]);
    }
}
