//! Instruction encoder for the 6502 assembler
//!
//! Picks the addressing mode for a parsed operand, looks the opcode up in
//! [`OPCODE_TABLE`], and emits the operand bytes once label values are known.

use super::parser::{OperandSyntax, Value};
use super::{AssemblerError, ErrorType};
use crate::addressing::AddressingMode;
use crate::opcodes::{find_opcode, Mnemonic, OPCODE_TABLE};

/// Addressing modes the operand syntax could mean, most specific first.
///
/// Zero-page forms are only candidates for short literals. Labels always
/// take the absolute form so instruction sizes never depend on label values.
fn candidate_modes(mnemonic: Mnemonic, operand: &OperandSyntax) -> &'static [AddressingMode] {
    use AddressingMode::*;

    match operand {
        OperandSyntax::None => &[Implicit, Accumulator],
        OperandSyntax::Accumulator => &[Accumulator],
        OperandSyntax::Immediate(_) => &[Immediate],
        OperandSyntax::Direct(_) if mnemonic.is_branch() => &[Relative],
        OperandSyntax::Direct(v) if v.is_zero_page() => &[ZeroPage, Absolute],
        OperandSyntax::Direct(_) => &[Absolute],
        OperandSyntax::IndexedX(v) if v.is_zero_page() => &[ZeroPageX, AbsoluteX],
        OperandSyntax::IndexedX(_) => &[AbsoluteX],
        OperandSyntax::IndexedY(v) if v.is_zero_page() => &[ZeroPageY, AbsoluteY],
        OperandSyntax::IndexedY(_) => &[AbsoluteY],
        OperandSyntax::Indirect(_) => &[Indirect],
        OperandSyntax::IndirectX(_) => &[IndirectX],
        OperandSyntax::IndirectY(_) => &[IndirectY],
    }
}

/// Selects the opcode for a mnemonic and operand.
///
/// # Errors
///
/// `UnknownEncoding` when the table has no entry for the combination, and
/// `UnimplementedOpcode` when the entry exists but cannot be executed.
pub fn select_opcode(
    mnemonic: Mnemonic,
    operand: &OperandSyntax,
    line: usize,
) -> Result<u8, AssemblerError> {
    let candidates = candidate_modes(mnemonic, operand);
    let opcode = candidates
        .iter()
        .find_map(|&mode| find_opcode(mnemonic, mode))
        .ok_or_else(|| {
            AssemblerError::new(
                ErrorType::UnknownEncoding,
                line,
                format!("{} has no {:?} form", mnemonic, candidates[0]),
            )
        })?;

    if !OPCODE_TABLE[opcode as usize].implemented {
        return Err(AssemblerError::new(
            ErrorType::UnimplementedOpcode,
            line,
            format!("{} (opcode ${:02X}) cannot be executed", mnemonic, opcode),
        ));
    }
    Ok(opcode)
}

fn out_of_range(line: usize, message: String) -> AssemblerError {
    AssemblerError::new(ErrorType::RangeError, line, message)
}

/// Checks that a value fits in one byte.
pub fn byte_operand(value: u16, line: usize) -> Result<u8, AssemblerError> {
    u8::try_from(value)
        .map_err(|_| out_of_range(line, format!("${:04X} does not fit in one byte", value)))
}

/// Encodes the complete instruction at `address`, with `value` as the
/// resolved operand (ignored for modes without one).
pub fn encode(opcode: u8, value: u16, address: u16, line: usize) -> Result<Vec<u8>, AssemblerError> {
    use AddressingMode::*;

    let mode = OPCODE_TABLE[opcode as usize].addressing_mode;
    let mut bytes = vec![opcode];
    match mode {
        Implicit | Accumulator => {}
        Immediate | ZeroPage | ZeroPageX | ZeroPageY | IndirectX | IndirectY => {
            bytes.push(byte_operand(value, line)?);
        }
        Relative => {
            // Branch targets wrap around the address space like the CPU does
            let offset = value.wrapping_sub(address.wrapping_add(2)) as i16;
            let displacement = i8::try_from(offset).map_err(|_| {
                out_of_range(
                    line,
                    format!("branch target ${:04X} is {} bytes away", value, offset),
                )
            })?;
            bytes.push(displacement as u8);
        }
        Absolute | AbsoluteX | AbsoluteY | Indirect => {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }
    Ok(bytes)
}

/// The value carried by an operand, if any.
pub fn operand_value(operand: &OperandSyntax) -> Option<&Value> {
    match operand {
        OperandSyntax::None | OperandSyntax::Accumulator => None,
        OperandSyntax::Immediate(v)
        | OperandSyntax::Direct(v)
        | OperandSyntax::IndexedX(v)
        | OperandSyntax::IndexedY(v)
        | OperandSyntax::Indirect(v)
        | OperandSyntax::IndirectX(v)
        | OperandSyntax::IndirectY(v) => Some(v),
    }
}
