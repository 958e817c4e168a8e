//! # Addressing Modes
//!
//! This module defines the addressing modes of the 6502 instruction set and the
//! resolved [`Operand`] an instruction receives once its operand bytes have been
//! fetched.

/// 6502 addressing mode enumeration.
///
/// The addressing mode determines how many operand bytes follow an opcode and
/// how the CPU turns them into an effective address or value.
///
/// # Operand Sizes
///
/// - **0 bytes**: Implicit, Accumulator
/// - **1 byte**: Immediate, ZeroPage, ZeroPageX, ZeroPageY, Relative, IndirectX, IndirectY
/// - **2 bytes**: Absolute, AbsoluteX, AbsoluteY, Indirect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand, operation implied by instruction.
    ///
    /// Examples: CLC, RTS, NOP
    Implicit,

    /// Operates directly on the accumulator register.
    ///
    /// Examples: LSR A, ROL A, ASL A
    Accumulator,

    /// 8-bit constant operand in instruction.
    ///
    /// Example: LDA #$10
    Immediate,

    /// 8-bit address in zero page (0x00-0xFF).
    ///
    /// Example: LDA $80
    ZeroPage,

    /// Zero page address indexed by X register, wrapping within the zero page.
    ZeroPageX,

    /// Zero page address indexed by Y register, wrapping within the zero page.
    ZeroPageY,

    /// Signed 8-bit displacement for branch instructions, relative to the
    /// address of the next instruction.
    Relative,

    /// Full 16-bit address, little-endian.
    ///
    /// Example: JMP $1234
    Absolute,

    /// 16-bit address indexed by X register.
    AbsoluteX,

    /// 16-bit address indexed by Y register.
    AbsoluteY,

    /// Jump through a 16-bit pointer. Only used by JMP.
    Indirect,

    /// Indexed indirect: (ZP + X) then dereference.
    ///
    /// Example: LDA ($40,X)
    IndirectX,

    /// Indirect indexed: ZP dereference then + Y.
    ///
    /// Example: LDA ($40),Y
    IndirectY,
}

impl AddressingMode {
    /// Number of operand bytes that follow the opcode.
    pub const fn operand_bytes(self) -> u8 {
        match self {
            AddressingMode::Implicit | AddressingMode::Accumulator => 0,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
            _ => 1,
        }
    }
}

/// Operand handed to an instruction after its addressing mode has been resolved.
///
/// `address` is `None` for implicit, accumulator and immediate operands. For
/// relative operands it holds the branch target and `value` the raw displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Operand {
    /// Effective address, if the mode produces one.
    pub address: Option<u16>,

    /// Immediate byte, displacement, or the byte read from `address`.
    pub value: u8,
}

impl Operand {
    /// Operand for instructions that take none.
    pub const fn none() -> Self {
        Self {
            address: None,
            value: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_sizes() {
        assert_eq!(AddressingMode::Implicit.operand_bytes(), 0);
        assert_eq!(AddressingMode::Accumulator.operand_bytes(), 0);
        assert_eq!(AddressingMode::Immediate.operand_bytes(), 1);
        assert_eq!(AddressingMode::Relative.operand_bytes(), 1);
        assert_eq!(AddressingMode::IndirectY.operand_bytes(), 1);
        assert_eq!(AddressingMode::Indirect.operand_bytes(), 2);
        assert_eq!(AddressingMode::AbsoluteX.operand_bytes(), 2);
    }
}
