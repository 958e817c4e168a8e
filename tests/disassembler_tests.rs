//! Disassembler integration tests

use emu6502::{assemble_at, decode_instruction, disassemble, AddressingMode, Mnemonic};

fn listing(bytes: &[u8], start: u16) -> Vec<String> {
    disassemble(bytes, start).iter().map(|i| i.to_string()).collect()
}

#[test]
fn test_decode_single() {
    let instr = decode_instruction(&[0xBD, 0x34, 0x12], 0x0600).unwrap();
    assert_eq!(instr.mnemonic, Mnemonic::LDA);
    assert_eq!(instr.addressing_mode, AddressingMode::AbsoluteX);
    assert_eq!(instr.operand(), 0x1234);
    assert_eq!(instr.size_bytes, 3);
    assert_eq!(instr.to_string(), "LDA $1234,X");
}

#[test]
fn test_decode_rejects_what_cannot_be_decoded() {
    assert!(decode_instruction(&[], 0).is_none());
    assert!(decode_instruction(&[0x04], 0).is_none());
    assert!(decode_instruction(&[0x20, 0x00], 0).is_none());
}

#[test]
fn test_illegal_opcodes_still_decode() {
    let instr = decode_instruction(&[0xA7, 0x10], 0).unwrap();
    assert_eq!(instr.mnemonic, Mnemonic::LAX);
    assert_eq!(instr.to_string(), "LAX $10");
}

#[test]
fn test_branch_targets() {
    assert_eq!(
        listing(&[0xD0, 0xFE, 0x10, 0x7F, 0xF0, 0x80], 0x0200),
        vec!["BNE $0200", "BPL $0283", "BEQ $0186"]
    );
}

#[test]
fn test_every_byte_covered_once() {
    let bytes = [0xA9, 0x01, 0xFC, 0x8D, 0x00, 0x02, 0x4C];
    let instructions = disassemble(&bytes, 0x8000);

    let total: usize = instructions.iter().map(|i| i.size_bytes as usize).sum();
    assert_eq!(total, bytes.len());
    assert_eq!(instructions[1].to_string(), ".byte $FC");
    assert_eq!(instructions[1].address, 0x8002);
    // Trailing JMP with no operand bytes
    assert!(instructions.last().unwrap().is_data());
}

#[test]
fn test_listing_reassembles() {
    let source = "start: LDX #$08
                  loop: LDA $0300,X
                  STA ($20),Y
                  ROL A
                  DEX
                  BPL loop
                  JMP (start)
                  HLT";
    let output = assemble_at(source, 0x0400).unwrap();
    let text = listing(&output.bytes, 0x0400).join("\n");
    let again = assemble_at(&text, 0x0400).unwrap();

    assert_eq!(again.bytes, output.bytes);
}
