//! WASM API for the emulator.
//!
//! Provides JavaScript-callable interfaces for loading programs, stepping the
//! CPU, inspecting its state, and assembling source text.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::{assemble_at, disassemble, Memory, MemoryBus, CPU};

/// JavaScript-compatible error wrapper
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsError {
    message: String,
}

#[wasm_bindgen]
impl JsError {
    #[wasm_bindgen(constructor)]
    pub fn new(message: &str) -> JsError {
        JsError {
            message: message.to_string(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

impl<E: std::error::Error> From<E> for JsError {
    fn from(err: E) -> Self {
        JsError {
            message: err.to_string(),
        }
    }
}

/// Result of assembly operation
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct AssemblyResult {
    success: bool,
    machine_code: Vec<u8>,
    origin: u16,
    error_message: Option<String>,
    error_line: Option<usize>,
    error_count: usize,
}

#[wasm_bindgen]
impl AssemblyResult {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    #[wasm_bindgen(getter)]
    pub fn machine_code(&self) -> Vec<u8> {
        self.machine_code.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn origin(&self) -> u16 {
        self.origin
    }

    /// First error, if assembly failed
    #[wasm_bindgen(getter)]
    pub fn error_message(&self) -> Option<String> {
        self.error_message.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error_line(&self) -> Option<usize> {
        self.error_line
    }

    #[wasm_bindgen(getter)]
    pub fn error_count(&self) -> usize {
        self.error_count
    }
}

/// Main emulator interface for JavaScript
#[wasm_bindgen]
pub struct Emulator {
    cpu: CPU<Memory>,
}

#[wasm_bindgen]
impl Emulator {
    /// Create an emulator over the default address space
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Emulator {
            cpu: CPU::new(Memory::new()),
        }
    }

    /// Load a writable image at `base`
    pub fn load(&mut self, base: u16, bytes: &[u8]) -> Result<(), JsError> {
        self.cpu.memory_mut().load(base, bytes)?;
        Ok(())
    }

    /// Load a read-only image at the ROM base
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), JsError> {
        self.cpu.memory_mut().load_rom(bytes)?;
        Ok(())
    }

    /// Re-initialise the CPU and jump through the reset vector without running
    pub fn reset(&mut self) {
        self.cpu.reset_state();
    }

    /// Execute a single instruction
    pub fn step(&mut self) -> Result<(), JsError> {
        self.cpu.step()?;
        Ok(())
    }

    /// Execute up to `budget` instructions and return how many ran
    pub fn run_for(&mut self, budget: u32) -> Result<u32, JsError> {
        let ran = self.cpu.run_for(budget as u64)?;
        Ok(ran as u32)
    }

    // Register getters
    #[wasm_bindgen(getter)]
    pub fn a(&self) -> u8 {
        self.cpu.a()
    }

    #[wasm_bindgen(getter)]
    pub fn x(&self) -> u8 {
        self.cpu.x()
    }

    #[wasm_bindgen(getter)]
    pub fn y(&self) -> u8 {
        self.cpu.y()
    }

    #[wasm_bindgen(getter)]
    pub fn pc(&self) -> u16 {
        self.cpu.pc()
    }

    #[wasm_bindgen(getter)]
    pub fn sp(&self) -> u8 {
        self.cpu.sp()
    }

    #[wasm_bindgen(getter)]
    pub fn ir(&self) -> u8 {
        self.cpu.ir()
    }

    #[wasm_bindgen(getter)]
    pub fn bus(&self) -> u8 {
        self.cpu.bus()
    }

    /// Packed status byte (`NV-BDIZC`)
    #[wasm_bindgen(getter)]
    pub fn status(&self) -> u8 {
        self.cpu.status()
    }

    #[wasm_bindgen(getter)]
    pub fn halted(&self) -> bool {
        self.cpu.is_halted()
    }

    #[wasm_bindgen(getter)]
    pub fn instructions(&self) -> f64 {
        self.cpu.instructions() as f64 // u64 does not fit a JS number
    }

    // Flag getters
    #[wasm_bindgen(getter)]
    pub fn flag_n(&self) -> bool {
        self.cpu.flag_n()
    }

    #[wasm_bindgen(getter)]
    pub fn flag_v(&self) -> bool {
        self.cpu.flag_v()
    }

    #[wasm_bindgen(getter)]
    pub fn flag_b(&self) -> bool {
        self.cpu.flag_b()
    }

    #[wasm_bindgen(getter)]
    pub fn flag_d(&self) -> bool {
        self.cpu.flag_d()
    }

    #[wasm_bindgen(getter)]
    pub fn flag_i(&self) -> bool {
        self.cpu.flag_i()
    }

    #[wasm_bindgen(getter)]
    pub fn flag_z(&self) -> bool {
        self.cpu.flag_z()
    }

    #[wasm_bindgen(getter)]
    pub fn flag_c(&self) -> bool {
        self.cpu.flag_c()
    }

    // Memory access methods

    pub fn read_memory(&self, addr: u16) -> u8 {
        self.cpu.memory().read(addr)
    }

    pub fn write_memory(&mut self, addr: u16, value: u8) {
        self.cpu.memory_mut().write(addr, value);
    }

    /// Copy `len` bytes starting at `start`, stopping at the end of the address space
    pub fn memory(&self, start: u16, len: u32) -> Uint8Array {
        let bytes = match len {
            0 => Vec::new(),
            _ => {
                let end = (start as u32).saturating_add(len - 1).min(0xFFFF) as u16;
                self.cpu.memory().snapshot(start..=end)
            }
        };
        Uint8Array::from(bytes.as_slice())
    }

    /// Assemble source text for `origin`
    pub fn assemble(&self, source: &str, origin: u16) -> AssemblyResult {
        match assemble_at(source, origin) {
            Ok(output) => AssemblyResult {
                success: true,
                machine_code: output.bytes,
                origin,
                error_message: None,
                error_line: None,
                error_count: 0,
            },
            Err(errors) => {
                let first = errors.first();
                AssemblyResult {
                    success: false,
                    machine_code: Vec::new(),
                    origin,
                    error_message: first.map(|e| e.message.clone()),
                    error_line: first.map(|e| e.line),
                    error_count: errors.len(),
                }
            }
        }
    }

    /// Disassemble `count` instructions starting at `start`, one string per line
    pub fn disassemble(&self, start: u16, count: u32) -> Array {
        // Three bytes per instruction is the most any one can take
        let end = (start as u32).saturating_add(count.saturating_mul(3)).min(0xFFFF) as u16;
        let bytes = self.cpu.memory().snapshot(start..=end);
        disassemble(&bytes, start)
            .iter()
            .take(count as usize)
            .map(|instr| JsValue::from_str(&format!("{:04X}  {}", instr.address, instr)))
            .collect()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
