//! # Transfer Instructions
//!
//! Register-to-register copies. Every transfer updates N and Z from the
//! copied value except TXS, which only sets the stack pointer.

use crate::cpu::Register;
use crate::opcodes::Mnemonic;
use crate::{ExecutionError, MemoryBus, CPU};

pub(crate) fn execute<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mnemonic: Mnemonic,
) -> Result<(), ExecutionError> {
    match mnemonic {
        Mnemonic::TAX => cpu.load(Register::X, cpu.a),
        Mnemonic::TAY => cpu.load(Register::Y, cpu.a),
        Mnemonic::TXA => cpu.load(Register::A, cpu.x),
        Mnemonic::TYA => cpu.load(Register::A, cpu.y),
        Mnemonic::TSX => cpu.load(Register::X, cpu.sp),
        Mnemonic::TXS => cpu.sp = cpu.x,
        _ => unreachable!("{} is not a transfer", mnemonic),
    }
    Ok(())
}
