//! # Shift and Rotate Instructions
//!
//! This module implements the shift and rotate operations:
//! - ASL: Arithmetic Shift Left (bit 7 -> C, 0 -> bit 0)
//! - LSR: Logical Shift Right (bit 0 -> C, 0 -> bit 7)
//! - ROL: Rotate Left (bit 7 -> C, old C -> bit 0)
//! - ROR: Rotate Right (bit 0 -> C, old C -> bit 7)
//!
//! With no effective address (accumulator mode) the accumulator is shifted;
//! otherwise the memory cell is read, shifted and written back. C, N and Z are
//! always updated.

use crate::cpu::Register;
use crate::opcodes::Mnemonic;
use crate::{ExecutionError, MemoryBus, Operand, CPU};

pub(crate) fn execute<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mnemonic: Mnemonic,
    operand: Operand,
) -> Result<(), ExecutionError> {
    let input = match operand.address {
        Some(_) => operand.value,
        None => cpu.a,
    };
    let carry_in = cpu.flags.c;

    let (result, carry_out) = match mnemonic {
        Mnemonic::ASL => (input << 1, input & 0x80 != 0),
        Mnemonic::LSR => (input >> 1, input & 0x01 != 0),
        Mnemonic::ROL => ((input << 1) | carry_in as u8, input & 0x80 != 0),
        Mnemonic::ROR => ((input >> 1) | ((carry_in as u8) << 7), input & 0x01 != 0),
        _ => unreachable!("{} is not a shift", mnemonic),
    };

    cpu.flags.c = carry_out;
    match operand.address {
        Some(address) => {
            cpu.write(address, result);
            cpu.flags.set_nz(result);
        }
        None => cpu.load(Register::A, result),
    }
    Ok(())
}
