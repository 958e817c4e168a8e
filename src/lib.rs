//! # 6502 Emulator Core
//!
//! An NMOS 6502-family CPU emulator that executes machine code against a flat,
//! memory-mapped 64KB address space.
//!
//! This crate provides the CPU execution engine, its table-driven instruction
//! decoder, and the memory-mapping subsystem, plus a small assembler and
//! decoder that share the same opcode table.
//!
//! ## Quick Start
//!
//! ```rust
//! use emu6502::{layout, Memory, MemoryBus, CPU};
//!
//! // LDA #$05; STA $00; HLT
//! let mut memory = Memory::new();
//! memory.load_rom(vec![0xA9, 0x05, 0x85, 0x00, 0x02]).unwrap();
//!
//! // The reset vector points at the ROM base; reset() runs until HLT
//! let mut cpu = CPU::new(memory);
//! cpu.reset().unwrap();
//!
//! assert!(cpu.is_halted());
//! assert_eq!(cpu.a(), 0x05);
//! assert_eq!(cpu.memory().read(0x0000), 0x05);
//! assert_eq!(cpu.pc(), layout::ROM_BASE + 5);
//! ```
//!
//! ## Modules
//!
//! - `cpu` - CPU state and the fetch-decode-execute loop
//! - `memory` - MemoryBus trait, handler mapping and the fixed layout
//! - `opcodes` - Opcode metadata table
//! - `addressing` - Addressing modes and resolved operands
//! - `status` - Status flags and their byte packing
//! - `assembler` - Source text to machine code
//! - `disassembler` - Machine code to instructions

pub mod addressing;
pub mod assembler;
pub mod cpu;
pub mod disassembler;
pub mod memory;
pub mod opcodes;
pub mod status;

#[cfg(feature = "wasm")]
pub mod wasm;

// Internal instruction implementations (not part of public API)
mod instructions;

// Re-export public API
pub use addressing::{AddressingMode, Operand};
pub use assembler::{assemble, assemble_at, AssemblerError, AssemblerOutput, ErrorType};
pub use cpu::{CpuConfig, CpuSnapshot, IndirectYMode, Register, CPU};
pub use disassembler::{decode_instruction, disassemble, Instruction};
pub use memory::{layout, ByteRegion, MapError, Memory, MemoryBus, MemoryHandler};
pub use opcodes::{find_opcode, Mnemonic, OpcodeMetadata, OPCODE_TABLE};
pub use status::{pack_flags, unpack_flags, Flag, StatusFlags};

/// Errors that can occur during CPU execution.
///
/// All of them are fatal to the current run: the CPU halts and the error is
/// returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The opcode has no execution semantics (illegal opcode space).
    UnimplementedOpcode {
        /// Opcode byte
        opcode: u8,
        /// Mnemonic from the opcode table (`???` for empty slots)
        mnemonic: &'static str,
        /// Address the opcode was fetched from
        address: u16,
    },

    /// A push found the stack page full.
    StackOverflow {
        /// Address of the faulting instruction
        address: u16,
    },

    /// A pull found the stack page empty.
    StackUnderflow {
        /// Address of the faulting instruction
        address: u16,
    },
}

impl std::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ExecutionError::UnimplementedOpcode {
                opcode,
                mnemonic,
                address,
            } => write!(
                f,
                "Opcode 0x{:02X} ({}) at 0x{:04X} is not implemented",
                opcode, mnemonic, address
            ),
            ExecutionError::StackOverflow { address } => {
                write!(f, "Stack overflow at 0x{:04X}", address)
            }
            ExecutionError::StackUnderflow { address } => {
                write!(f, "Stack underflow at 0x{:04X}", address)
            }
        }
    }
}

impl std::error::Error for ExecutionError {}
