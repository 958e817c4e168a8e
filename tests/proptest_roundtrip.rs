//! Round-trip tests between the assembler and the decoder.
//!
//! Assembled source decodes to the opcode and operand it was written with,
//! and decoded instructions print as source that assembles back to the same
//! bytes.

use emu6502::{assemble_at, decode_instruction, disassemble, AddressingMode, OPCODE_TABLE};
use proptest::prelude::*;

#[test]
fn test_assemble_then_decode_every_mode() {
    use AddressingMode::*;

    let cases = [
        ("CLC", 0x18, Implicit, 0x0000),
        ("ROR A", 0x6A, Accumulator, 0x0000),
        ("LDA #$42", 0xA9, Immediate, 0x0042),
        ("LDY $42", 0xA4, ZeroPage, 0x0042),
        ("STA $42,X", 0x95, ZeroPageX, 0x0042),
        ("LDX $42,Y", 0xB6, ZeroPageY, 0x0042),
        ("STX $1234", 0x8E, Absolute, 0x1234),
        ("INC $1234,X", 0xFE, AbsoluteX, 0x1234),
        ("EOR $1234,Y", 0x59, AbsoluteY, 0x1234),
        ("JMP ($1234)", 0x6C, Indirect, 0x1234),
        ("CMP ($42,X)", 0xC1, IndirectX, 0x0042),
        ("ADC ($42),Y", 0x71, IndirectY, 0x0042),
        // $0210 is 14 bytes past the instruction that follows the branch
        ("BCS $0210", 0xB0, Relative, 0x000E),
    ];

    for (source, opcode, mode, operand) in cases {
        let output = assemble_at(source, 0x0200).unwrap();
        let instr = decode_instruction(&output.bytes, 0x0200).unwrap();

        assert_eq!(instr.opcode, opcode, "{}", source);
        assert_eq!(instr.addressing_mode, mode, "{}", source);
        assert_eq!(instr.operand(), operand, "{}", source);
    }

    let bytes = assemble_at("BCS $0210", 0x0200).unwrap().bytes;
    let branch = decode_instruction(&bytes, 0x0200).unwrap();
    assert_eq!(branch.branch_target(), Some(0x0210));
}

/// Executable opcodes whose encoding the assembler produces.
///
/// 0xEB is the second `SBC #` encoding; the assembler always emits 0xE9.
fn assemblable_opcode() -> impl Strategy<Value = u8> {
    any::<u8>().prop_filter("opcode the assembler emits", |&op| {
        OPCODE_TABLE[op as usize].implemented && op != 0xEB
    })
}

proptest! {
    #[test]
    fn prop_disassemble_then_assemble(
        opcode in assemblable_opcode(),
        lo in any::<u8>(),
        hi in any::<u8>(),
        address in any::<u16>(),
    ) {
        let size = OPCODE_TABLE[opcode as usize].size_bytes as usize;
        // Leave room for the RTS the assembler appends
        prop_assume!(address as usize + size < 0x1_0000);
        let bytes = [opcode, lo, hi];
        let bytes = &bytes[..size];

        let instr = decode_instruction(bytes, address).unwrap();
        let output = assemble_at(&instr.to_string(), address).unwrap();

        prop_assert_eq!(&output.bytes[..size], bytes);
    }

    #[test]
    fn prop_disassemble_covers_input(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let instructions = disassemble(&bytes, 0x1000);
        let total: usize = instructions.iter().map(|i| i.size_bytes as usize).sum();
        prop_assert_eq!(total, bytes.len());

        let mut address = 0x1000u16;
        for instr in &instructions {
            prop_assert_eq!(instr.address, address);
            address = address.wrapping_add(instr.size_bytes as u16);
        }
    }
}
