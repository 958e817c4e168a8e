//! # Branch Instructions
//!
//! This module implements the conditional branches. Each tests one flag and,
//! when the condition holds, moves PC to the target the relative operand
//! resolved to (next instruction address plus the signed displacement).
//!
//! | Mnemonic | Taken when |
//! |----------|------------|
//! | BPL      | N clear    |
//! | BMI      | N set      |
//! | BVC      | V clear    |
//! | BVS      | V set      |
//! | BCC      | C clear    |
//! | BCS      | C set      |
//! | BNE      | Z clear    |
//! | BEQ      | Z set      |

use crate::opcodes::Mnemonic;
use crate::{ExecutionError, MemoryBus, Operand, CPU};

pub(crate) fn execute<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mnemonic: Mnemonic,
    operand: Operand,
) -> Result<(), ExecutionError> {
    let flags = cpu.flags;
    let taken = match mnemonic {
        Mnemonic::BPL => !flags.n,
        Mnemonic::BMI => flags.n,
        Mnemonic::BVC => !flags.v,
        Mnemonic::BVS => flags.v,
        Mnemonic::BCC => !flags.c,
        Mnemonic::BCS => flags.c,
        Mnemonic::BNE => !flags.z,
        Mnemonic::BEQ => flags.z,
        _ => unreachable!("{} is not a branch", mnemonic),
    };

    if let (true, Some(target)) = (taken, operand.address) {
        cpu.pc = target;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{layout, Memory, CPU};

    fn setup_cpu(program: &[u8]) -> CPU<Memory> {
        let mut memory = Memory::new();
        memory.load_rom(program.to_vec()).unwrap();
        CPU::new(memory)
    }

    #[test]
    fn test_branch_backwards() {
        // NOP x3; BNE -5
        let mut cpu = setup_cpu(&[0xEA, 0xEA, 0xEA, 0xD0, 0xFB]);
        cpu.run_for(4).unwrap();
        // Next instruction would be at ROM_BASE + 5; five back is ROM_BASE
        assert_eq!(cpu.pc(), layout::ROM_BASE);
    }

    #[test]
    fn test_branch_not_taken_falls_through() {
        // LDA #$00; BNE +2; HLT
        let mut cpu = setup_cpu(&[0xA9, 0x00, 0xD0, 0x02, 0x02]);
        cpu.run_for(2).unwrap();
        assert_eq!(cpu.pc(), layout::ROM_BASE + 4);
    }

    #[test]
    fn test_branch_forward() {
        // LDA #$00; BEQ +1; INX; HLT
        let mut cpu = setup_cpu(&[0xA9, 0x00, 0xF0, 0x01, 0xE8, 0x02]);
        cpu.run().unwrap();
        assert_eq!(cpu.x(), 0);
        assert!(cpu.is_halted());
    }
}
