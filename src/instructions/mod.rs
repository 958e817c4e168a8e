//! # 6502 Instruction Implementations
//!
//! This module contains the semantics of every implemented instruction,
//! organized by category. The CPU resolves the operand first, so each
//! category receives the mnemonic and a ready [`Operand`].
//!
//! ## Categories
//!
//! - **alu**: Arithmetic and logic operations (ADC, SBC, AND, ORA, EOR, CMP, CPX, CPY, BIT)
//! - **branches**: Conditional branch instructions (BCC, BCS, BEQ, BNE, BMI, BPL, BVC, BVS)
//! - **shifts**: Shift and rotate operations (ASL, LSR, ROL, ROR)
//! - **load_store**: Load and store instructions (LDA, LDX, LDY, STA, STX, STY)
//! - **inc_dec**: Increment and decrement operations (INC, DEC, INX, INY, DEX, DEY)
//! - **control**: Control flow instructions (JMP, JSR, RTS, RTI, BRK, NOP, HLT)
//! - **stack**: Stack operations (PHA, PHP, PLA, PLP)
//! - **flags**: Status flag manipulation (CLC, SEC, CLI, SEI, CLD, SED, CLV)
//! - **transfer**: Register transfer operations (TAX, TAY, TXA, TYA, TSX, TXS)

pub mod alu;
pub mod branches;
pub mod control;
pub mod flags;
pub mod inc_dec;
pub mod load_store;
pub mod shifts;
pub mod stack;
pub mod transfer;

use crate::opcodes::Mnemonic;
use crate::{ExecutionError, MemoryBus, Operand, CPU};

/// Executes one decoded instruction.
pub(crate) fn execute<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mnemonic: Mnemonic,
    operand: Operand,
) -> Result<(), ExecutionError> {
    use Mnemonic::*;

    match mnemonic {
        ORA | AND | EOR | ADC | SBC | CMP | CPX | CPY | BIT => alu::execute(cpu, mnemonic, operand),
        BPL | BMI | BVC | BVS | BCC | BCS | BNE | BEQ => branches::execute(cpu, mnemonic, operand),
        ASL | LSR | ROL | ROR => shifts::execute(cpu, mnemonic, operand),
        LDA | LDX | LDY | STA | STX | STY => load_store::execute(cpu, mnemonic, operand),
        INC | DEC | INX | INY | DEX | DEY => inc_dec::execute(cpu, mnemonic, operand),
        JMP | JSR | RTS | RTI | BRK | NOP | HLT => control::execute(cpu, mnemonic, operand),
        PHA | PHP | PLA | PLP => stack::execute(cpu, mnemonic),
        CLC | SEC | CLI | SEI | CLD | SED | CLV => flags::execute(cpu, mnemonic),
        TAX | TAY | TXA | TYA | TSX | TXS => transfer::execute(cpu, mnemonic),
        _ => Err(ExecutionError::UnimplementedOpcode {
            opcode: cpu.ir,
            mnemonic: mnemonic.as_str(),
            address: cpu.op_address,
        }),
    }
}
