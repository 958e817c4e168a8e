//! # Control Flow Instructions
//!
//! This module implements control flow operations:
//! - JMP: Jump to the resolved address (absolute or through a pointer)
//! - JSR: Push PC (high byte, then low byte) and jump
//! - RTS: Pull PC (low byte, then high byte)
//! - BRK: JSR-style push, then jump through the IRQ vector; sets B and I
//! - RTI: Return like RTS, then clear B and I
//! - NOP: Nothing
//! - HLT: Stop the run loop
//!
//! The pushed return address is the address of the next instruction, and
//! RTS resumes exactly there.

use crate::memory::layout;
use crate::opcodes::Mnemonic;
use crate::{ExecutionError, MemoryBus, Operand, CPU};

pub(crate) fn execute<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mnemonic: Mnemonic,
    operand: Operand,
) -> Result<(), ExecutionError> {
    match mnemonic {
        Mnemonic::JMP => {
            if let Some(target) = operand.address {
                cpu.pc = target;
            }
        }
        Mnemonic::JSR => {
            if let Some(target) = operand.address {
                call(cpu, target)?;
            }
        }
        Mnemonic::RTS => ret(cpu)?,
        Mnemonic::BRK => {
            let lo = cpu.read(layout::IRQ_VECTOR);
            let hi = cpu.read(layout::IRQ_VECTOR + 1);
            call(cpu, u16::from_le_bytes([lo, hi]))?;
            cpu.flags.b = true;
            cpu.flags.i = true;
        }
        Mnemonic::RTI => {
            ret(cpu)?;
            cpu.flags.b = false;
            cpu.flags.i = false;
        }
        Mnemonic::NOP => {}
        Mnemonic::HLT => cpu.halt(),
        _ => unreachable!("{} is not a control instruction", mnemonic),
    }
    Ok(())
}

fn call<M: MemoryBus>(cpu: &mut CPU<M>, target: u16) -> Result<(), ExecutionError> {
    let [lo, hi] = cpu.pc.to_le_bytes();
    cpu.push(&[hi, lo])?;
    cpu.pc = target;
    Ok(())
}

fn ret<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    // Both bytes must be there before either is pulled
    if cpu.sp >= 0xFE {
        return Err(ExecutionError::StackUnderflow {
            address: cpu.op_address,
        });
    }
    let lo = cpu.pop()?;
    let hi = cpu.pop()?;
    cpu.pc = u16::from_le_bytes([lo, hi]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{layout, ExecutionError, Memory, MemoryBus, CPU};

    fn setup_cpu(program: &[u8]) -> CPU<Memory> {
        let mut memory = Memory::new();
        memory.load_rom(program.to_vec()).unwrap();
        CPU::new(memory)
    }

    #[test]
    fn test_jsr_pushes_return_address() {
        // JSR $FD10
        let mut cpu = setup_cpu(&[0x20, 0x10, 0xFD]);
        cpu.step().unwrap();

        assert_eq!(cpu.pc(), 0xFD10);
        assert_eq!(cpu.sp(), 0xFD);
        // High byte pushed first, at the higher address
        assert_eq!(cpu.memory().read(0x01FF), 0xFD);
        assert_eq!(cpu.memory().read(0x01FE), 0x03);
    }

    #[test]
    fn test_jsr_rts_round_trip() {
        // 0xFD00: JSR $FD05; INX; HLT; 0xFD05: INY; RTS
        let mut cpu = setup_cpu(&[0x20, 0x05, 0xFD, 0xE8, 0x02, 0xC8, 0x60]);
        cpu.run().unwrap();

        assert_eq!(cpu.x(), 1);
        assert_eq!(cpu.y(), 1);
        assert_eq!(cpu.sp(), 0xFF);
        assert_eq!(cpu.pc(), layout::ROM_BASE + 5);
    }

    #[test]
    fn test_jmp_indirect_page_wrap() {
        let mut memory = Memory::new();
        // JMP ($02FF)
        memory.load_rom(vec![0x6C, 0xFF, 0x02]).unwrap();
        memory.write(0x02FF, 0x34);
        memory.write(0x0200, 0x12);
        memory.write(0x0300, 0x99);
        let mut cpu = CPU::new(memory);
        cpu.step().unwrap();

        assert_eq!(cpu.pc(), 0x1234);
    }

    #[test]
    fn test_brk_and_rti() {
        let mut memory = Memory::new();
        // BRK; HLT
        memory.load_rom(vec![0x00, 0x02]).unwrap();
        // IRQ vector -> 0x0400: RTI
        memory.map_bytes(layout::IRQ_VECTOR, vec![0x00, 0x04], false).unwrap();
        memory.write(0x0400, 0x40);
        let mut cpu = CPU::new(memory);

        cpu.step().unwrap();
        assert_eq!(cpu.pc(), 0x0400);
        assert!(cpu.flag_b());
        assert!(cpu.flag_i());
        assert_eq!(cpu.sp(), 0xFD);

        cpu.step().unwrap();
        assert_eq!(cpu.pc(), layout::ROM_BASE + 1);
        assert!(!cpu.flag_b());
        assert!(!cpu.flag_i());

        cpu.run().unwrap();
        assert!(cpu.is_halted());
    }

    #[test]
    fn test_rts_on_empty_stack_underflows() {
        let mut cpu = setup_cpu(&[0x60]);
        assert_eq!(
            cpu.step(),
            Err(ExecutionError::StackUnderflow {
                address: layout::ROM_BASE
            })
        );
        assert!(cpu.is_halted());
    }

    #[test]
    fn test_hlt_stops_run() {
        let mut cpu = setup_cpu(&[0xEA, 0x02, 0xE8]);
        cpu.run().unwrap();
        assert!(cpu.is_halted());
        assert_eq!(cpu.x(), 0);
        assert_eq!(cpu.bus(), 0xFF);
        assert_eq!(cpu.instructions(), 2);
    }
}
