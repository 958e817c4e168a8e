//! Instruction decoder for the 6502 disassembler

use crate::disassembler::Instruction;
use crate::opcodes::{Mnemonic, OPCODE_TABLE};

/// Decode a single instruction from a byte slice
///
/// # Arguments
///
/// * `bytes` - The byte slice starting at the instruction to decode
/// * `address` - The memory address of this instruction
///
/// # Returns
///
/// `None` for an empty slice, an empty table slot, or an instruction whose
/// operand bytes run past the end of the slice. Illegal opcodes decode
/// normally.
pub fn decode_instruction(bytes: &[u8], address: u16) -> Option<Instruction> {
    let (&opcode, rest) = bytes.split_first()?;
    let metadata = &OPCODE_TABLE[opcode as usize];

    if metadata.mnemonic == Mnemonic::Unknown {
        return None;
    }

    let operand_bytes = rest.get(..metadata.operand_bytes() as usize)?.to_vec();

    Some(Instruction {
        address,
        opcode,
        mnemonic: metadata.mnemonic,
        addressing_mode: metadata.addressing_mode,
        operand_bytes,
        size_bytes: metadata.size_bytes,
    })
}
