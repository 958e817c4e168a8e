//! # ALU (Arithmetic Logic Unit) Instructions
//!
//! This module implements arithmetic, logical and compare operations:
//! - ORA, AND, EOR: bitwise logic with the accumulator
//! - ADC, SBC: wrapping add/subtract
//! - CMP, CPX, CPY: register compares
//! - BIT: bit test
//!
//! ADC and SBC re-load the accumulator and update N and Z only. Carry and
//! overflow are left untouched, and neither the carry input nor decimal mode
//! takes part in the result.

use crate::cpu::Register;
use crate::opcodes::Mnemonic;
use crate::{ExecutionError, MemoryBus, Operand, CPU};

pub(crate) fn execute<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mnemonic: Mnemonic,
    operand: Operand,
) -> Result<(), ExecutionError> {
    let value = operand.value;
    match mnemonic {
        Mnemonic::ORA => cpu.load(Register::A, cpu.a | value),
        Mnemonic::AND => cpu.load(Register::A, cpu.a & value),
        Mnemonic::EOR => cpu.load(Register::A, cpu.a ^ value),
        Mnemonic::ADC => cpu.load(Register::A, cpu.a.wrapping_add(value)),
        Mnemonic::SBC => cpu.load(Register::A, cpu.a.wrapping_sub(value)),
        Mnemonic::CMP => cpu.compare(Register::A, value),
        Mnemonic::CPX => cpu.compare(Register::X, value),
        Mnemonic::CPY => cpu.compare(Register::Y, value),
        Mnemonic::BIT => {
            cpu.flags.z = cpu.a & value == 0;
            cpu.flags.n = value & 0x80 != 0;
            cpu.flags.v = value & 0x40 != 0;
        }
        _ => unreachable!("{} is not an ALU instruction", mnemonic),
    }
    Ok(())
}
