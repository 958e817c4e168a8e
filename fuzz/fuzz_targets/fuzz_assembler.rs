//! Fuzz target for the assembler.
//!
//! This target feeds arbitrary strings to the assembler to find panics in
//! lexing, parsing and encoding. Successful output is decoded again as a
//! sanity check.

#![no_main]

use emu6502::{assemble_at, disassemble};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);

    if let Ok(output) = assemble_at(&source, 0x0200) {
        // Whatever was emitted decodes without gaps
        let total: usize = disassemble(&output.bytes, output.origin)
            .iter()
            .map(|i| i.size_bytes as usize)
            .sum();
        assert_eq!(total, output.bytes.len());
    }
});
