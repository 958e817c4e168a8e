//! # Load and Store Instructions
//!
//! Loads (LDA, LDX, LDY) assign a register from the operand and update N and Z.
//! Stores (STA, STX, STY) write a register to the effective address and leave
//! the flags alone.

use crate::cpu::Register;
use crate::opcodes::Mnemonic;
use crate::{ExecutionError, MemoryBus, Operand, CPU};

pub(crate) fn execute<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mnemonic: Mnemonic,
    operand: Operand,
) -> Result<(), ExecutionError> {
    match mnemonic {
        Mnemonic::LDA => cpu.load(Register::A, operand.value),
        Mnemonic::LDX => cpu.load(Register::X, operand.value),
        Mnemonic::LDY => cpu.load(Register::Y, operand.value),
        Mnemonic::STA | Mnemonic::STX | Mnemonic::STY => {
            let reg = match mnemonic {
                Mnemonic::STA => Register::A,
                Mnemonic::STX => Register::X,
                _ => Register::Y,
            };
            if let Some(address) = operand.address {
                cpu.store(reg, address);
            }
        }
        _ => unreachable!("{} is not a load or store", mnemonic),
    }
    Ok(())
}
