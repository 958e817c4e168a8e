//! # Flag Instructions
//!
//! Set and clear individual status flags: CLC, SEC, CLI, SEI, CLD, SED, CLV.

use crate::opcodes::Mnemonic;
use crate::status::Flag;
use crate::{ExecutionError, MemoryBus, CPU};

pub(crate) fn execute<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mnemonic: Mnemonic,
) -> Result<(), ExecutionError> {
    let (flag, value) = match mnemonic {
        Mnemonic::CLC => (Flag::Carry, false),
        Mnemonic::SEC => (Flag::Carry, true),
        Mnemonic::CLI => (Flag::InterruptDisable, false),
        Mnemonic::SEI => (Flag::InterruptDisable, true),
        Mnemonic::CLD => (Flag::Decimal, false),
        Mnemonic::SED => (Flag::Decimal, true),
        Mnemonic::CLV => (Flag::Overflow, false),
        _ => unreachable!("{} is not a flag instruction", mnemonic),
    };
    cpu.flags.set(flag, value);
    Ok(())
}
