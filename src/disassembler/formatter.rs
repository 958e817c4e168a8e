//! Assembler-syntax rendering of decoded instructions

use std::fmt;

use crate::addressing::AddressingMode;
use crate::disassembler::Instruction;

/// Operand text in the syntax the assembler parses.
///
/// Zero-page operands use two hex digits and absolute ones four, so the
/// assembler picks the same addressing mode again. Branches show their
/// absolute target.
fn format_operand(instr: &Instruction) -> String {
    use AddressingMode::*;

    let value = instr.operand();
    match instr.addressing_mode {
        Implicit => String::new(),
        Accumulator => "A".to_string(),
        Immediate => format!("#${:02X}", value),
        ZeroPage => format!("${:02X}", value),
        ZeroPageX => format!("${:02X},X", value),
        ZeroPageY => format!("${:02X},Y", value),
        IndirectX => format!("(${:02X},X)", value),
        IndirectY => format!("(${:02X}),Y", value),
        Relative => format!("${:04X}", instr.branch_target().unwrap_or(value)),
        Absolute => format!("${:04X}", value),
        AbsoluteX => format!("${:04X},X", value),
        AbsoluteY => format!("${:04X},Y", value),
        Indirect => format!("(${:04X})", value),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_data() {
            return write!(f, ".byte ${:02X}", self.opcode);
        }

        let operand = format_operand(self);
        if operand.is_empty() {
            write!(f, "{}", self.mnemonic)
        } else {
            write!(f, "{} {}", self.mnemonic, operand)
        }
    }
}
