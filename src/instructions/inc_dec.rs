//! # Increment and Decrement Instructions
//!
//! INC/DEC modify a memory cell; INX/INY/DEX/DEY modify an index register.
//! All wrap modulo 256 and update N and Z.

use crate::cpu::Register;
use crate::opcodes::Mnemonic;
use crate::{ExecutionError, MemoryBus, Operand, CPU};

pub(crate) fn execute<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mnemonic: Mnemonic,
    operand: Operand,
) -> Result<(), ExecutionError> {
    match mnemonic {
        Mnemonic::INC | Mnemonic::DEC => {
            let result = if mnemonic == Mnemonic::INC {
                operand.value.wrapping_add(1)
            } else {
                operand.value.wrapping_sub(1)
            };
            if let Some(address) = operand.address {
                cpu.write(address, result);
            }
            cpu.flags.set_nz(result);
        }
        Mnemonic::INX => cpu.load(Register::X, cpu.x.wrapping_add(1)),
        Mnemonic::INY => cpu.load(Register::Y, cpu.y.wrapping_add(1)),
        Mnemonic::DEX => cpu.load(Register::X, cpu.x.wrapping_sub(1)),
        Mnemonic::DEY => cpu.load(Register::Y, cpu.y.wrapping_sub(1)),
        _ => unreachable!("{} is not an increment or decrement", mnemonic),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{Memory, MemoryBus, CPU};

    #[test]
    fn test_register_wraparound() {
        let mut memory = Memory::new();
        // DEX; INY; HLT
        memory.load_rom(vec![0xCA, 0xC8, 0x02]).unwrap();
        let mut cpu = CPU::new(memory);
        cpu.set_y(0xFF);
        cpu.run().unwrap();

        assert_eq!(cpu.x(), 0xFF);
        assert_eq!(cpu.y(), 0x00);
        assert!(cpu.flag_z());
    }

    #[test]
    fn test_memory_increment_and_decrement() {
        let mut memory = Memory::new();
        // INC $20; DEC $21; HLT
        memory.load_rom(vec![0xE6, 0x20, 0xC6, 0x21, 0x02]).unwrap();
        memory.write(0x0020, 0xFF);
        memory.write(0x0021, 0x00);
        let mut cpu = CPU::new(memory);
        cpu.run().unwrap();

        assert_eq!(cpu.memory().read(0x0020), 0x00);
        assert_eq!(cpu.memory().read(0x0021), 0xFF);
        assert!(cpu.flag_n());
        assert!(!cpu.flag_z());
    }
}
