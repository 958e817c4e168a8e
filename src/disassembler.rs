//! 6502 Disassembler Module
//!
//! Converts machine code back into [`Instruction`]s using the same opcode
//! table the CPU executes from. An instruction's `Display` output is
//! assembler syntax that assembles back to the same bytes when assembled at
//! the same address.
//!
//! ```
//! use emu6502::disassemble;
//!
//! let listing: Vec<String> = disassemble(&[0xA9, 0x42, 0xD0, 0xFE, 0x04], 0xFD00)
//!     .iter()
//!     .map(|i| i.to_string())
//!     .collect();
//! assert_eq!(listing, vec!["LDA #$42", "BNE $FD02", ".byte $04"]);
//! ```

pub mod decoder;
pub mod formatter;

pub use decoder::decode_instruction;

use crate::addressing::AddressingMode;
use crate::opcodes::Mnemonic;

/// A single decoded instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Memory address where this instruction starts
    pub address: u16,

    /// The opcode byte value (0x00-0xFF)
    pub opcode: u8,

    /// `Mnemonic::Unknown` marks a data byte rendered as `.byte`
    pub mnemonic: Mnemonic,

    /// Addressing mode used by this instruction
    pub addressing_mode: AddressingMode,

    /// Operand bytes (0-2 bytes depending on addressing mode)
    pub operand_bytes: Vec<u8>,

    /// Total size in bytes (1-3 bytes: opcode + operands)
    pub size_bytes: u8,
}

impl Instruction {
    /// Data byte for an opcode that cannot be decoded at `address`.
    pub fn data(address: u16, byte: u8) -> Self {
        Self {
            address,
            opcode: byte,
            mnemonic: Mnemonic::Unknown,
            addressing_mode: AddressingMode::Implicit,
            operand_bytes: Vec::new(),
            size_bytes: 1,
        }
    }

    /// Whether this is a `.byte` pseudo-instruction.
    pub fn is_data(&self) -> bool {
        self.mnemonic == Mnemonic::Unknown
    }

    /// Operand value, little-endian. Zero when there are no operand bytes.
    pub fn operand(&self) -> u16 {
        match self.operand_bytes.as_slice() {
            [lo] => *lo as u16,
            [lo, hi] => u16::from_le_bytes([*lo, *hi]),
            _ => 0,
        }
    }

    /// Branch target for relative instructions.
    pub fn branch_target(&self) -> Option<u16> {
        match (self.addressing_mode, self.operand_bytes.as_slice()) {
            (AddressingMode::Relative, [offset]) => Some(
                self.address
                    .wrapping_add(self.size_bytes as u16)
                    .wrapping_add_signed(*offset as i8 as i16),
            ),
            _ => None,
        }
    }
}

/// Disassemble a byte slice whose first byte lives at `start`.
///
/// Empty table slots and instructions cut off by the end of the slice become
/// one-byte `.byte` entries, so every input byte is covered exactly once.
pub fn disassemble(bytes: &[u8], start: u16) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    let mut offset = 0;
    let mut address = start;

    while offset < bytes.len() {
        let instr = decode_instruction(&bytes[offset..], address)
            .unwrap_or_else(|| Instruction::data(address, bytes[offset]));
        offset += instr.size_bytes as usize;
        address = address.wrapping_add(instr.size_bytes as u16);
        instructions.push(instr);
    }

    instructions
}
