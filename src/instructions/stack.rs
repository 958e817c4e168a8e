//! # Stack Instructions
//!
//! PHA/PLA move the accumulator through the stack page, PHP/PLP the packed
//! status byte. PLA updates N and Z; PLP replaces every flag.

use crate::cpu::Register;
use crate::opcodes::Mnemonic;
use crate::status::{pack_flags, unpack_flags};
use crate::{ExecutionError, MemoryBus, CPU};

pub(crate) fn execute<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mnemonic: Mnemonic,
) -> Result<(), ExecutionError> {
    match mnemonic {
        Mnemonic::PHA => cpu.push(&[cpu.a])?,
        Mnemonic::PHP => cpu.push(&[pack_flags(&cpu.flags)])?,
        Mnemonic::PLA => {
            let value = cpu.pop()?;
            cpu.load(Register::A, value);
        }
        Mnemonic::PLP => {
            let value = cpu.pop()?;
            cpu.flags = unpack_flags(value);
        }
        _ => unreachable!("{} is not a stack instruction", mnemonic),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{Memory, MemoryBus, CPU};

    fn run_program(program: &[u8]) -> CPU<Memory> {
        let mut memory = Memory::new();
        memory.load_rom(program.to_vec()).unwrap();
        let mut cpu = CPU::new(memory);
        cpu.run().unwrap();
        cpu
    }

    #[test]
    fn test_pha_pla() {
        // LDA #$80; PHA; LDA #$00; PLA; HLT
        let cpu = run_program(&[0xA9, 0x80, 0x48, 0xA9, 0x00, 0x68, 0x02]);
        assert_eq!(cpu.a(), 0x80);
        assert!(cpu.flag_n());
        assert!(!cpu.flag_z());
        assert_eq!(cpu.sp(), 0xFF);
    }

    #[test]
    fn test_php_pushes_reserved_bit() {
        // SEC; PHP; HLT
        let cpu = run_program(&[0x38, 0x08, 0x02]);
        assert_eq!(cpu.memory().read(0x01FF), 0b0010_0001);
        assert_eq!(cpu.sp(), 0xFE);
    }

    #[test]
    fn test_plp_restores_flags() {
        // LDA #$C3; PHA; PLP; HLT
        let cpu = run_program(&[0xA9, 0xC3, 0x48, 0x28, 0x02]);
        assert!(cpu.flag_n());
        assert!(cpu.flag_v());
        assert!(cpu.flag_z());
        assert!(cpu.flag_c());
        assert!(!cpu.flag_b());
        assert_eq!(cpu.status(), 0xE3);
    }
}
