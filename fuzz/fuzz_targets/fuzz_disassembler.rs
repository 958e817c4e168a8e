//! Fuzz target for the disassembler.
//!
//! This target feeds arbitrary byte sequences to the disassembler and checks
//! that the listing covers the input exactly and that every decoded
//! instruction renders to source the assembler accepts.

#![no_main]

use arbitrary::Arbitrary;
use emu6502::{assemble_at, decode_instruction, disassemble, OPCODE_TABLE};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    bytes: Vec<u8>,
    start_address: u16,
}

fuzz_target!(|input: FuzzInput| {
    // Limit input size to prevent OOM
    if input.bytes.len() > 4096 {
        return;
    }

    let instructions = disassemble(&input.bytes, input.start_address);

    let mut total_size: usize = 0;
    let mut expected_address = input.start_address;

    for instr in &instructions {
        assert_eq!(instr.address, expected_address);
        assert!(instr.size_bytes >= 1 && instr.size_bytes <= 3);
        assert_eq!(instr.operand_bytes.len() + 1, instr.size_bytes as usize);

        // Executable instructions re-assemble to the same instruction, as long
        // as the appended RTS still fits below $FFFF
        let fits = instr.address as usize + (instr.size_bytes as usize) < 0x1_0000;
        if !instr.is_data() && OPCODE_TABLE[instr.opcode as usize].implemented && fits {
            let output = assemble_at(&instr.to_string(), instr.address).unwrap();
            let again = decode_instruction(&output.bytes, instr.address).unwrap();
            assert_eq!(again.mnemonic, instr.mnemonic);
            assert_eq!(again.addressing_mode, instr.addressing_mode);
            assert_eq!(again.operand_bytes, instr.operand_bytes);
        }

        total_size += instr.size_bytes as usize;
        expected_address = expected_address.wrapping_add(instr.size_bytes as u16);
    }

    assert_eq!(total_size, input.bytes.len());
});
