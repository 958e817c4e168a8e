//! Fuzz target for CPU execution.
//!
//! This target creates arbitrary CPU states and memory contents, then runs a
//! bounded number of instructions. Faults are expected; panics are bugs.

#![no_main]

use arbitrary::Arbitrary;
use emu6502::{
    layout, unpack_flags, CpuConfig, ExecutionError, IndirectYMode, Memory, MemoryBus, CPU,
};
use libfuzzer_sys::fuzz_target;

/// Arbitrary CPU initial state for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzCpuState {
    a: u8,
    x: u8,
    y: u8,
    sp: u8,
    status: u8,
    same_byte_indirect_y: bool,
}

/// Memory region for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzMemory {
    /// ROM image at the ROM base
    program: Vec<u8>,
    /// Zero page contents
    zero_page: [u8; 256],
    /// Stack page contents
    stack_page: [u8; 256],
    /// IRQ vector target
    irq_vector: u16,
}

/// Complete fuzz input
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    cpu_state: FuzzCpuState,
    memory: FuzzMemory,
    budget: u8,
}

fuzz_target!(|input: FuzzInput| {
    let mut memory = Memory::new();

    // An empty or oversized program is a mapping error, not a crash
    if memory.load_rom(input.memory.program.clone()).is_err() {
        return;
    }
    memory
        .map_bytes(layout::IRQ_VECTOR, input.memory.irq_vector.to_le_bytes(), false)
        .unwrap();
    for (i, &byte) in input.memory.zero_page.iter().enumerate() {
        memory.write(i as u16, byte);
    }
    for (i, &byte) in input.memory.stack_page.iter().enumerate() {
        memory.write(layout::STACK_BASE + i as u16, byte);
    }

    let config = CpuConfig {
        indirect_y: if input.cpu_state.same_byte_indirect_y {
            IndirectYMode::SameByte
        } else {
            IndirectYMode::Hardware
        },
    };
    let mut cpu = CPU::with_config(memory, config);
    cpu.set_a(input.cpu_state.a);
    cpu.set_x(input.cpu_state.x);
    cpu.set_y(input.cpu_state.y);
    cpu.set_sp(input.cpu_state.sp);
    cpu.set_flags(unpack_flags(input.cpu_state.status));

    let before = cpu.instructions();
    match cpu.run_for(input.budget as u64) {
        Ok(ran) => {
            assert!(ran <= input.budget as u64);
            assert_eq!(cpu.instructions() - before, ran);
        }
        Err(err) => {
            // Every fault is terminal
            assert!(cpu.is_halted());
            if let ExecutionError::UnimplementedOpcode { opcode, .. } = err {
                assert_eq!(opcode, cpu.ir());
            }
        }
    }

    // Reserved bit always reads as set
    assert_ne!(cpu.status() & 0b0010_0000, 0);
});
