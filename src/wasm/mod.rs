//! WebAssembly bindings for the emulator.
//!
//! This module provides JavaScript-callable interfaces to the CPU, enabling
//! browser-based execution and assembly of 6502 programs.

pub mod api;

pub use api::{AssemblyResult, Emulator, JsError};
