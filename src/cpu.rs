//! # CPU State and Execution
//!
//! This module contains the CPU struct representing the processor state and
//! the fetch-decode-execute loop.
//!
//! ## CPU State
//!
//! The CPU maintains:
//! - **Registers**: Accumulator (A), index registers (X, Y)
//! - **Program counter** (PC): 16-bit address of next byte to fetch
//! - **Stack pointer** (SP): 8-bit offset into stack page (0x0100-0x01FF)
//! - **Status flags**: N, V, B, D, I, Z, C
//! - **Diagnostics**: last opcode (I), last bus value (BUS), instruction count
//!
//! ## Execution Model
//!
//! The CPU is either running or halted. `reset()` re-initialises the state,
//! jumps through the RESET vector and runs until `HLT` or a fault. Faults
//! halt the CPU and are returned to the caller; halted is terminal until the
//! next reset.
//!
//! - `step()`: Execute one instruction
//! - `run()`: Execute until halted
//! - `run_for()`: Execute until halted or an instruction budget is spent

use std::time::Duration;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

use crate::memory::layout;
use crate::status::{pack_flags, StatusFlags};
use crate::{instructions, AddressingMode, ExecutionError, MemoryBus, Operand, OPCODE_TABLE};

/// Register selector for [`CPU::load`], [`CPU::store`] and [`CPU::compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    A,
    X,
    Y,
}

/// How `(zp),Y` dereferences its zero-page pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndirectYMode {
    /// Low byte at the pointer, high byte at the next zero-page address.
    #[default]
    Hardware,

    /// The byte at the pointer is the whole base address; the high byte is 0
    /// and the next zero-page byte is never read.
    ///
    /// Reproduces the behavior some existing binaries were built against.
    SameByte,
}

/// Behavioral switches for a [`CPU`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuConfig {
    /// Pointer dereference used by indirect-indexed addressing.
    pub indirect_y: IndirectYMode,
}

/// Start and stop timestamps of a run.
///
/// `wasm32` has no monotonic clock, so nothing is recorded there.
#[derive(Debug, Clone, Copy, Default)]
struct Stopwatch {
    #[cfg(not(target_arch = "wasm32"))]
    started: Option<Instant>,
    #[cfg(not(target_arch = "wasm32"))]
    stopped: Option<Instant>,
}

#[cfg(not(target_arch = "wasm32"))]
impl Stopwatch {
    fn start(&mut self) {
        self.started = Some(Instant::now());
        self.stopped = None;
    }

    fn stop(&mut self) {
        self.stopped = Some(Instant::now());
    }

    fn elapsed(&self) -> Option<Duration> {
        let started = self.started?;
        Some(self.stopped.unwrap_or_else(Instant::now) - started)
    }
}

#[cfg(target_arch = "wasm32")]
impl Stopwatch {
    fn start(&mut self) {}

    fn stop(&mut self) {}

    fn elapsed(&self) -> Option<Duration> {
        None
    }
}

/// Read-only copy of the CPU state, for external reporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub pc: u16,
    pub sp: u8,
    pub ir: u8,
    pub bus: u8,
    pub status: u8,
    pub halted: bool,
    pub instructions: u64,
}

/// 6502 CPU state and execution context.
///
/// The CPU struct contains all processor state and owns its memory bus. It is
/// generic over the memory implementation via the `MemoryBus` trait.
///
/// # Type Parameters
///
/// * `M` - Memory bus implementation (must implement `MemoryBus` trait)
///
/// # Examples
///
/// ```
/// use emu6502::{Memory, CPU};
///
/// let cpu = CPU::new(Memory::new());
///
/// // PC is loaded from the reset vector, which points at the ROM base
/// assert_eq!(cpu.pc(), 0xFD00);
/// assert_eq!(cpu.sp(), 0xFF);
/// assert_eq!(cpu.status(), 0b0010_0000);
/// assert!(!cpu.is_halted());
/// ```
pub struct CPU<M: MemoryBus> {
    /// Accumulator register
    pub(crate) a: u8,

    /// X index register
    pub(crate) x: u8,

    /// Y index register
    pub(crate) y: u8,

    /// Program counter
    pub(crate) pc: u16,

    /// Stack pointer (0x0100 + sp gives full stack address)
    pub(crate) sp: u8,

    /// Last fetched opcode
    pub(crate) ir: u8,

    /// Last value driven on the bus
    pub(crate) bus: u8,

    /// Address the current instruction was fetched from
    pub(crate) op_address: u16,

    pub(crate) flags: StatusFlags,

    pub(crate) halted: bool,

    /// Instructions executed since the last reset
    pub(crate) instructions: u64,

    stopwatch: Stopwatch,

    config: CpuConfig,

    /// Memory bus implementation
    pub(crate) memory: M,
}

impl<M: MemoryBus> CPU<M> {
    /// Creates a CPU with the default configuration.
    ///
    /// The state is initialised as by [`CPU::reset_state`]; nothing runs until
    /// [`CPU::reset`], [`CPU::run`] or [`CPU::step`] is called.
    pub fn new(memory: M) -> Self {
        Self::with_config(memory, CpuConfig::default())
    }

    /// Creates a CPU with an explicit configuration.
    pub fn with_config(memory: M, config: CpuConfig) -> Self {
        let mut cpu = Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xFF,
            ir: 0,
            bus: 0,
            op_address: 0,
            flags: StatusFlags::default(),
            halted: false,
            instructions: 0,
            stopwatch: Stopwatch::default(),
            config,
            memory,
        };
        cpu.reset_state();
        cpu
    }

    /// Re-initialises the CPU and runs from the RESET vector until halted.
    ///
    /// # Errors
    ///
    /// Returns the fault that stopped the run, if any.
    pub fn reset(&mut self) -> Result<(), ExecutionError> {
        self.reset_state();
        self.run()
    }

    /// Re-initialises the CPU without running it.
    ///
    /// - SP = 0xFF; A, X, Y, BUS = 0
    /// - every flag cleared (the reserved bit stays set)
    /// - PC is loaded from the little-endian pointer at the RESET vector
    pub fn reset_state(&mut self) {
        self.sp = 0xFF;
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.ir = 0;
        self.flags = StatusFlags::default();
        self.halted = false;
        self.instructions = 0;
        self.stopwatch.start();

        // Absolute jump decode against the vector: PC <- [RESET_VECTOR]
        self.pc = layout::RESET_VECTOR;
        self.op_address = self.pc;
        self.pc = self.fetch_word();
        self.bus = 0;

        tracing::debug!(pc = self.pc, "reset");
    }

    /// Runs until the CPU halts.
    pub fn run(&mut self) -> Result<(), ExecutionError> {
        while !self.halted {
            self.step()?;
        }
        Ok(())
    }

    /// Runs until the CPU halts or `budget` instructions have executed.
    ///
    /// Returns the number of instructions executed.
    pub fn run_for(&mut self, budget: u64) -> Result<u64, ExecutionError> {
        let start = self.instructions;
        while !self.halted && self.instructions - start < budget {
            self.step()?;
        }
        Ok(self.instructions - start)
    }

    /// Executes one instruction. Does nothing once halted.
    ///
    /// # Examples
    ///
    /// ```
    /// use emu6502::{ExecutionError, Memory, CPU};
    ///
    /// let mut mem = Memory::new();
    /// mem.load_rom(vec![0x03]).unwrap(); // SLO ($nn,X): illegal
    ///
    /// let mut cpu = CPU::new(mem);
    /// match cpu.step() {
    ///     Err(ExecutionError::UnimplementedOpcode { opcode, .. }) => assert_eq!(opcode, 0x03),
    ///     other => panic!("unexpected {:?}", other),
    /// }
    /// assert!(cpu.is_halted());
    /// ```
    pub fn step(&mut self) -> Result<(), ExecutionError> {
        if self.halted {
            return Ok(());
        }

        self.op_address = self.pc;
        self.ir = self.fetch();
        let metadata = OPCODE_TABLE[self.ir as usize];

        tracing::trace!(
            address = self.op_address,
            opcode = self.ir,
            mnemonic = metadata.mnemonic.as_str(),
            "execute"
        );

        if !metadata.implemented {
            return Err(self.fault(ExecutionError::UnimplementedOpcode {
                opcode: self.ir,
                mnemonic: metadata.mnemonic.as_str(),
                address: self.op_address,
            }));
        }

        let operand = self.resolve_operand(metadata.addressing_mode, metadata.mnemonic.reads_operand());
        match instructions::execute(self, metadata.mnemonic, operand) {
            Ok(()) => {
                self.instructions += 1;
                Ok(())
            }
            Err(err) => Err(self.fault(err)),
        }
    }

    /// Stops the run loop and drives BUS to 0xFF.
    pub fn halt(&mut self) {
        self.halted = true;
        self.bus = 0xFF;
        self.stopwatch.stop();
        tracing::debug!(pc = self.pc, instructions = self.instructions, "halt");
    }

    fn fault(&mut self, err: ExecutionError) -> ExecutionError {
        tracing::debug!(error = %err, "fault");
        self.halted = true;
        self.stopwatch.stop();
        err
    }

    // ========== Bus Primitives ==========

    /// Reads the byte at PC and advances PC.
    pub fn fetch(&mut self) -> u8 {
        let value = self.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch();
        let hi = self.fetch();
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn read(&mut self, addr: u16) -> u8 {
        self.bus = self.memory.read(addr);
        self.bus
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        self.bus = value;
        self.memory.write(addr, value);
    }

    /// Resolves the operand of the current instruction, consuming its operand bytes.
    fn resolve_operand(&mut self, mode: AddressingMode, reads_operand: bool) -> Operand {
        let address = match mode {
            AddressingMode::Implicit | AddressingMode::Accumulator => return Operand::none(),
            AddressingMode::Immediate => {
                return Operand {
                    address: None,
                    value: self.fetch(),
                }
            }
            AddressingMode::Relative => {
                let displacement = self.fetch();
                let target = self.pc.wrapping_add_signed(displacement as i8 as i16);
                return Operand {
                    address: Some(target),
                    value: displacement,
                };
            }
            AddressingMode::ZeroPage => self.fetch() as u16,
            AddressingMode::ZeroPageX => self.fetch().wrapping_add(self.x) as u16,
            AddressingMode::ZeroPageY => self.fetch().wrapping_add(self.y) as u16,
            AddressingMode::Absolute => self.fetch_word(),
            AddressingMode::AbsoluteX => self.fetch_word().wrapping_add(self.x as u16),
            AddressingMode::AbsoluteY => self.fetch_word().wrapping_add(self.y as u16),
            AddressingMode::Indirect => {
                let pointer = self.fetch_word();
                // NMOS page wrap: the high byte never crosses into the next page
                let hi_addr = (pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF);
                let lo = self.read(pointer);
                let hi = self.read(hi_addr);
                u16::from_le_bytes([lo, hi])
            }
            AddressingMode::IndirectX => {
                let pointer = self.fetch().wrapping_add(self.x);
                let lo = self.read(pointer as u16);
                let hi = self.read(pointer.wrapping_add(1) as u16);
                u16::from_le_bytes([lo, hi])
            }
            AddressingMode::IndirectY => {
                let pointer = self.fetch();
                let base = match self.config.indirect_y {
                    IndirectYMode::Hardware => {
                        let lo = self.read(pointer as u16);
                        let hi = self.read(pointer.wrapping_add(1) as u16);
                        u16::from_le_bytes([lo, hi])
                    }
                    IndirectYMode::SameByte => self.read(pointer as u16) as u16,
                };
                base.wrapping_add(self.y as u16)
            }
        };

        let value = if reads_operand { self.read(address) } else { 0 };
        Operand {
            address: Some(address),
            value,
        }
    }

    // ========== Register and Stack Primitives ==========

    /// Returns the value of a register.
    pub fn register(&self, reg: Register) -> u8 {
        match reg {
            Register::A => self.a,
            Register::X => self.x,
            Register::Y => self.y,
        }
    }

    /// Assigns a register and updates N and Z from the value.
    pub fn load(&mut self, reg: Register, value: u8) {
        match reg {
            Register::A => self.a = value,
            Register::X => self.x = value,
            Register::Y => self.y = value,
        }
        self.flags.set_nz(value);
    }

    /// Writes a register to memory.
    pub fn store(&mut self, reg: Register, address: u16) {
        let value = self.register(reg);
        self.write(address, value);
    }

    /// Pushes bytes in order, decrementing SP after each.
    ///
    /// SP 0x00 marks a full stack. A push that does not fit is rejected
    /// before anything is written.
    pub fn push(&mut self, bytes: &[u8]) -> Result<(), ExecutionError> {
        if bytes.len() > self.sp as usize {
            return Err(ExecutionError::StackOverflow {
                address: self.op_address,
            });
        }
        for &value in bytes {
            self.write(layout::STACK_BASE + self.sp as u16, value);
            self.sp -= 1;
        }
        Ok(())
    }

    /// Increments SP and reads the byte it then points at.
    ///
    /// SP 0xFF marks an empty stack.
    pub fn pop(&mut self) -> Result<u8, ExecutionError> {
        if self.sp == 0xFF {
            return Err(ExecutionError::StackUnderflow {
                address: self.op_address,
            });
        }
        self.sp += 1;
        Ok(self.read(layout::STACK_BASE + self.sp as u16))
    }

    /// Compares a register with a value: N if the difference is negative,
    /// Z if it is zero, C if it is not negative.
    pub fn compare(&mut self, reg: Register, value: u8) {
        let result = self.register(reg) as i16 - value as i16;
        self.flags.n = result < 0;
        self.flags.z = result == 0;
        self.flags.c = result >= 0;
    }

    // ========== Register Getters ==========

    /// Returns the accumulator register value.
    pub fn a(&self) -> u8 {
        self.a
    }

    /// Returns the X index register value.
    pub fn x(&self) -> u8 {
        self.x
    }

    /// Returns the Y index register value.
    pub fn y(&self) -> u8 {
        self.y
    }

    /// Returns the program counter value.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Returns the stack pointer value.
    ///
    /// Note: The full stack address is 0x0100 + SP. The stack grows downward from 0x01FF.
    pub fn sp(&self) -> u8 {
        self.sp
    }

    /// Returns the last fetched opcode.
    pub fn ir(&self) -> u8 {
        self.ir
    }

    /// Returns the last value driven on the bus.
    pub fn bus(&self) -> u8 {
        self.bus
    }

    /// Returns the status register as a packed byte (`NV-BDIZC`).
    pub fn status(&self) -> u8 {
        pack_flags(&self.flags)
    }

    /// Returns the status flags.
    pub fn flags(&self) -> StatusFlags {
        self.flags
    }

    /// Whether the run loop has stopped.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Instructions executed since the last reset.
    pub fn instructions(&self) -> u64 {
        self.instructions
    }

    /// The active configuration.
    pub fn config(&self) -> CpuConfig {
        self.config
    }

    /// Time between the last reset and the halt, or until now while running.
    ///
    /// Always `None` on `wasm32`, which has no monotonic clock.
    pub fn uptime(&self) -> Option<Duration> {
        self.stopwatch.elapsed()
    }

    /// Copies the register state for reporting.
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            a: self.a,
            x: self.x,
            y: self.y,
            pc: self.pc,
            sp: self.sp,
            ir: self.ir,
            bus: self.bus,
            status: self.status(),
            halted: self.halted,
            instructions: self.instructions,
        }
    }

    // ========== Status Flag Getters ==========

    /// Returns true if the Negative flag is set.
    pub fn flag_n(&self) -> bool {
        self.flags.n
    }

    /// Returns true if the Overflow flag is set.
    pub fn flag_v(&self) -> bool {
        self.flags.v
    }

    /// Returns true if the Break flag is set.
    pub fn flag_b(&self) -> bool {
        self.flags.b
    }

    /// Returns true if the Decimal mode flag is set.
    pub fn flag_d(&self) -> bool {
        self.flags.d
    }

    /// Returns true if the Interrupt Disable flag is set.
    pub fn flag_i(&self) -> bool {
        self.flags.i
    }

    /// Returns true if the Zero flag is set.
    pub fn flag_z(&self) -> bool {
        self.flags.z
    }

    /// Returns true if the Carry flag is set.
    pub fn flag_c(&self) -> bool {
        self.flags.c
    }

    // ========== Setters ==========

    pub fn set_a(&mut self, value: u8) {
        self.a = value;
    }

    pub fn set_x(&mut self, value: u8) {
        self.x = value;
    }

    pub fn set_y(&mut self, value: u8) {
        self.y = value;
    }

    pub fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    pub fn set_sp(&mut self, value: u8) {
        self.sp = value;
    }

    pub fn set_flags(&mut self, flags: StatusFlags) {
        self.flags = flags;
    }

    // ========== Memory Access ==========

    /// Returns a reference to the memory bus.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Returns a mutable reference to the memory bus.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }
}
