//! # Memory Bus and Address-Space Mapping
//!
//! This module provides the `MemoryBus` trait that decouples the CPU from a
//! concrete memory implementation, and `Memory`, the 64KB address space that
//! dispatches every access to the handler mapped at that address.
//!
//! ## Layout
//!
//! | Range           | Use                                   |
//! |-----------------|---------------------------------------|
//! | `0x0000-0xF6FF` | RAM (stack page at `0x0100-0x01FF`)   |
//! | `0xF700-0xFCFF` | Peripheral reservation, unmapped      |
//! | `0xFD00-`       | ROM images                            |
//! | `0xFFFA-0xFFFB` | NMI vector                            |
//! | `0xFFFC-0xFFFD` | RESET vector                          |
//! | `0xFFFE-0xFFFF` | IRQ/BRK vector                        |
//!
//! ## Design Principles
//!
//! - No bus errors: reads and writes always succeed
//! - Unmapped addresses read as `0` and ignore writes
//! - Mappings may overlap; the last mapping wins, address by address

use std::fmt;
use std::ops::RangeInclusive;

/// Fixed address-space constants.
pub mod layout {
    /// First byte of the stack page. The stack occupies `STACK_BASE + 0x00..=0xFF`.
    pub const STACK_BASE: u16 = 0x0100;

    /// First address of the peripheral reservation. RAM ends just below it.
    pub const PERIPHERALS_BASE: u16 = 0xF700;

    /// Default load address of ROM images and default RESET target.
    pub const ROM_BASE: u16 = 0xFD00;

    /// Non-maskable interrupt vector (2 bytes, little-endian).
    pub const NMI_VECTOR: u16 = 0xFFFA;

    /// Reset vector (2 bytes, little-endian).
    pub const RESET_VECTOR: u16 = 0xFFFC;

    /// IRQ/BRK vector (2 bytes, little-endian).
    pub const IRQ_VECTOR: u16 = 0xFFFE;
}

/// Memory bus trait for CPU to read/write bytes.
///
/// The CPU accesses all memory (RAM, ROM, peripherals) through this
/// abstraction.
///
/// # Design
///
/// - `read(&self)`: Immutable reference allows shared reads
/// - `write(&mut self)`: Mutable reference makes side effects explicit
/// - No error types: the bus has no error mechanism
///
/// # Examples
///
/// ```
/// use emu6502::{Memory, MemoryBus};
///
/// let mut mem = Memory::new();
/// mem.write(0x1234, 0x42);
/// assert_eq!(mem.read(0x1234), 0x42);
/// ```
pub trait MemoryBus {
    /// Reads a byte from the specified 16-bit address. Must never panic.
    fn read(&self, addr: u16) -> u8;

    /// Writes a byte to the specified 16-bit address. Must never panic.
    fn write(&mut self, addr: u16, value: u8);
}

/// Read/write handler backing a mapped address range.
///
/// Handlers receive the offset from the first address of the range they were
/// mapped at, not the absolute address.
///
/// Handlers run synchronously inside the CPU's run loop and must not re-enter it.
///
/// # Examples
///
/// ```rust
/// use emu6502::{Memory, MemoryBus, MemoryHandler};
///
/// struct Latch(u8);
///
/// impl MemoryHandler for Latch {
///     fn read(&self, _offset: u16) -> u8 {
///         self.0
///     }
///
///     fn write(&mut self, _offset: u16, value: u8) {
///         self.0 = value;
///     }
/// }
///
/// let mut mem = Memory::new();
/// mem.map_handler(0xF700..=0xF701, Box::new(Latch(0))).unwrap();
/// mem.write(0xF701, 0x55);
/// assert_eq!(mem.read(0xF700), 0x55);
/// ```
pub trait MemoryHandler {
    /// Reads the byte at `offset` within the mapped range.
    fn read(&self, offset: u16) -> u8;

    /// Writes the byte at `offset` within the mapped range.
    fn write(&mut self, offset: u16, value: u8);
}

/// Byte-array backing, optionally read-only.
///
/// Reads past the end of the array return 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteRegion {
    data: Vec<u8>,
    writable: bool,
}

impl ByteRegion {
    /// Creates a region over `data`. Writes are ignored unless `writable`.
    pub fn new(data: Vec<u8>, writable: bool) -> Self {
        Self { data, writable }
    }

    /// Size of the region in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the region holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether writes are applied.
    pub fn is_writable(&self) -> bool {
        self.writable
    }
}

impl MemoryHandler for ByteRegion {
    fn read(&self, offset: u16) -> u8 {
        self.data.get(offset as usize).copied().unwrap_or(0)
    }

    fn write(&mut self, offset: u16, value: u8) {
        if !self.writable {
            return;
        }
        if let Some(byte) = self.data.get_mut(offset as usize) {
            *byte = value;
        }
    }
}

/// Handler built from a read closure and a write closure.
pub struct FnHandler<R, W> {
    read: R,
    write: W,
}

impl<R, W> FnHandler<R, W>
where
    R: Fn(u16) -> u8,
    W: FnMut(u16, u8),
{
    pub fn new(read: R, write: W) -> Self {
        Self { read, write }
    }
}

impl<R, W> MemoryHandler for FnHandler<R, W>
where
    R: Fn(u16) -> u8,
    W: FnMut(u16, u8),
{
    fn read(&self, offset: u16) -> u8 {
        (self.read)(offset)
    }

    fn write(&mut self, offset: u16, value: u8) {
        (self.write)(offset, value)
    }
}

/// Error returned when a mapping request is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The range ends before it starts.
    InvertedRange { start: u16, end: u16 },

    /// A byte-array backing with no bytes.
    EmptyRegion { base: u16 },

    /// A byte-array backing that would extend past 0xFFFF.
    OutOfRange { base: u16, len: usize },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MapError::InvertedRange { start, end } => write!(
                f,
                "Mapping range 0x{:04X}-0x{:04X} ends before it starts",
                start, end
            ),
            MapError::EmptyRegion { base } => {
                write!(f, "Cannot map an empty region at 0x{:04X}", base)
            }
            MapError::OutOfRange { base, len } => write!(
                f,
                "Region of {} bytes at 0x{:04X} extends past the end of the address space",
                len, base
            ),
        }
    }
}

impl std::error::Error for MapError {}

/// A registered handler and the first address of the range it was mapped at.
struct Region {
    start: u16,
    /// Number of slots still dispatching to this region
    live: u32,
    handler: Box<dyn MemoryHandler>,
}

const UNMAPPED: u32 = u32::MAX;

/// The 64KB address space.
///
/// Every address holds the index of the handler that serves it, so dispatch
/// is a single table lookup. `Memory` exclusively owns all backing storage.
///
/// # Construction
///
/// `Memory::new()` maps:
/// - writable RAM over `0x0000..PERIPHERALS_BASE`
/// - the NMI vector as `[0x00, 0x00]`
/// - the RESET vector as a little-endian pointer to `ROM_BASE`
/// - the IRQ vector as `[0x00, 0x00]`
///
/// The vectors are read-only; remap them to change where the CPU starts.
///
/// # Examples
///
/// ```rust
/// use emu6502::{layout, Memory, MemoryBus};
///
/// let mut memory = Memory::new();
///
/// // RAM is writable
/// memory.write(0x0200, 0x42);
/// assert_eq!(memory.read(0x0200), 0x42);
///
/// // The peripheral reservation is unmapped
/// assert_eq!(memory.read(layout::PERIPHERALS_BASE), 0x00);
///
/// // The reset vector points at the ROM base
/// assert_eq!(memory.read(0xFFFC), 0x00);
/// assert_eq!(memory.read(0xFFFD), 0xFD);
/// ```
pub struct Memory {
    /// `None` marks a region every slot has been remapped away from.
    regions: Vec<Option<Region>>,
    /// Indices of dropped regions, reused by later mappings
    free: Vec<u32>,
    slots: Box<[u32]>,
}

impl Memory {
    /// Creates the address space with the default RAM and vectors mapped.
    pub fn new() -> Self {
        let mut memory = Self::unmapped();
        memory.seed_defaults();
        memory
    }

    /// Creates an address space with nothing mapped. Every read returns 0.
    pub fn unmapped() -> Self {
        Self {
            regions: Vec::new(),
            free: Vec::new(),
            slots: vec![UNMAPPED; 0x10000].into_boxed_slice(),
        }
    }

    fn seed_defaults(&mut self) {
        let [rom_lo, rom_hi] = layout::ROM_BASE.to_le_bytes();
        let defaults = [
            (0x0000, vec![0; layout::PERIPHERALS_BASE as usize], true),
            (layout::NMI_VECTOR, vec![0x00, 0x00], false),
            (layout::RESET_VECTOR, vec![rom_lo, rom_hi], false),
            (layout::IRQ_VECTOR, vec![0x00, 0x00], false),
        ];
        for (base, bytes, writable) in defaults {
            // Fixed, non-empty regions that end at or before 0xFFFF.
            let end = base + (bytes.len() as u16 - 1);
            self.install(base..=end, Box::new(ByteRegion::new(bytes, writable)));
        }
    }

    /// Maps a handler over an inclusive address range.
    ///
    /// Addresses previously mapped to another handler are taken over; the
    /// rest of the earlier mapping stays in place.
    pub fn map_handler(
        &mut self,
        range: RangeInclusive<u16>,
        handler: Box<dyn MemoryHandler>,
    ) -> Result<(), MapError> {
        let (start, end) = (*range.start(), *range.end());
        if start > end {
            return Err(MapError::InvertedRange { start, end });
        }
        tracing::debug!(start, end, "mapping handler");
        self.install(range, handler);
        Ok(())
    }

    /// Maps a pair of closures over an inclusive address range.
    ///
    /// ```rust
    /// use emu6502::{Memory, MemoryBus};
    ///
    /// let mut mem = Memory::new();
    /// mem.map_fn(0xF700..=0xF70F, |offset| offset as u8 * 2, |_, _| {}).unwrap();
    /// assert_eq!(mem.read(0xF703), 6);
    /// ```
    pub fn map_fn<R, W>(
        &mut self,
        range: RangeInclusive<u16>,
        read: R,
        write: W,
    ) -> Result<(), MapError>
    where
        R: Fn(u16) -> u8 + 'static,
        W: FnMut(u16, u8) + 'static,
    {
        self.map_handler(range, Box::new(FnHandler::new(read, write)))
    }

    /// Maps a byte array starting at `base`. Writes are ignored unless `writable`.
    pub fn map_bytes(
        &mut self,
        base: u16,
        bytes: impl Into<Vec<u8>>,
        writable: bool,
    ) -> Result<(), MapError> {
        let bytes = bytes.into();
        let len = bytes.len();
        if len == 0 {
            return Err(MapError::EmptyRegion { base });
        }
        let end = base as usize + len - 1;
        if end > 0xFFFF {
            return Err(MapError::OutOfRange { base, len });
        }
        tracing::debug!(base, len, writable, "mapping byte region");
        self.install(base..=end as u16, Box::new(ByteRegion::new(bytes, writable)));
        Ok(())
    }

    /// Loads a writable image at `base`.
    pub fn load(&mut self, base: u16, image: impl Into<Vec<u8>>) -> Result<(), MapError> {
        self.map_bytes(base, image, true)
    }

    /// Loads a read-only image at [`layout::ROM_BASE`].
    pub fn load_rom(&mut self, image: impl Into<Vec<u8>>) -> Result<(), MapError> {
        self.map_bytes(layout::ROM_BASE, image, false)
    }

    /// Whether any handler serves `addr`.
    pub fn is_mapped(&self, addr: u16) -> bool {
        self.slots[addr as usize] != UNMAPPED
    }

    /// Copies the bytes of an inclusive range, for reporting.
    pub fn snapshot(&self, range: RangeInclusive<u16>) -> Vec<u8> {
        range.map(|addr| self.read(addr)).collect()
    }

    fn install(&mut self, range: RangeInclusive<u16>, handler: Box<dyn MemoryHandler>) {
        let start = *range.start();
        let region = Region {
            start,
            live: *range.end() as u32 - start as u32 + 1,
            handler,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.regions[index as usize] = Some(region);
                index
            }
            None => {
                self.regions.push(Some(region));
                (self.regions.len() - 1) as u32
            }
        };

        for addr in range {
            let previous = std::mem::replace(&mut self.slots[addr as usize], index);
            if previous != UNMAPPED {
                self.release(previous);
            }
        }
    }

    /// Drops one slot's reference to a region, freeing the region with the last one.
    fn release(&mut self, index: u32) {
        let entry = &mut self.regions[index as usize];
        if let Some(region) = entry {
            region.live -= 1;
            if region.live == 0 {
                *entry = None;
                self.free.push(index);
            }
        }
    }

    fn region(&self, addr: u16) -> Option<&Region> {
        match self.slots[addr as usize] {
            UNMAPPED => None,
            index => self.regions[index as usize].as_ref(),
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for Memory {
    fn read(&self, addr: u16) -> u8 {
        self.region(addr)
            .map_or(0, |region| region.handler.read(addr - region.start))
    }

    fn write(&mut self, addr: u16, value: u8) {
        let index = self.slots[addr as usize];
        if index == UNMAPPED {
            return;
        }
        if let Some(region) = &mut self.regions[index as usize] {
            region.handler.write(addr - region.start, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_default_layout() {
        let mem = Memory::new();

        assert!(mem.is_mapped(0x0000));
        assert!(mem.is_mapped(layout::PERIPHERALS_BASE - 1));
        assert!(!mem.is_mapped(layout::PERIPHERALS_BASE));
        assert!(!mem.is_mapped(layout::ROM_BASE));

        assert_eq!(mem.snapshot(0xFFFA..=0xFFFF), vec![0x00, 0x00, 0x00, 0xFD, 0x00, 0x00]);
    }

    #[test]
    fn test_unmapped_reads_zero_and_ignores_writes() {
        let mut mem = Memory::new();
        mem.write(0xF800, 0x42);
        assert_eq!(mem.read(0xF800), 0x00);
    }

    #[test]
    fn test_vectors_are_read_only() {
        let mut mem = Memory::new();
        mem.write(0xFFFD, 0x12);
        assert_eq!(mem.read(0xFFFD), 0xFD);
    }

    #[test]
    fn test_handler_receives_offset() {
        let mut mem = Memory::new();
        let last = Rc::new(Cell::new((0u16, 0u8)));
        let sink = Rc::clone(&last);
        mem.map_fn(0xF710..=0xF71F, |offset| offset as u8, move |offset, value| {
            sink.set((offset, value))
        })
        .unwrap();

        assert_eq!(mem.read(0xF715), 0x05);
        mem.write(0xF71F, 0xAA);
        assert_eq!(last.get(), (0x0F, 0xAA));
    }

    #[test]
    fn test_last_mapping_wins_per_address() {
        let mut mem = Memory::unmapped();
        mem.map_fn(0x10..=0x20, |_| 1, |_, _| {}).unwrap();
        mem.map_fn(0x15..=0x16, |_| 2, |_, _| {}).unwrap();

        assert_eq!(mem.read(0x10), 1);
        assert_eq!(mem.read(0x14), 1);
        assert_eq!(mem.read(0x15), 2);
        assert_eq!(mem.read(0x16), 2);
        assert_eq!(mem.read(0x17), 1);
        assert_eq!(mem.read(0x20), 1);
    }

    #[test]
    fn test_map_bytes_read_only() {
        let mut mem = Memory::new();
        mem.map_bytes(0x0300, vec![1, 2, 3], false).unwrap();
        mem.write(0x0301, 0xFF);
        assert_eq!(mem.snapshot(0x0300..=0x0302), vec![1, 2, 3]);
        // RAM past the region is untouched
        mem.write(0x0303, 0x44);
        assert_eq!(mem.read(0x0303), 0x44);
    }

    #[test]
    fn test_map_errors() {
        let mut mem = Memory::new();
        assert_eq!(
            mem.map_bytes(0x1000, Vec::new(), true),
            Err(MapError::EmptyRegion { base: 0x1000 })
        );
        assert_eq!(
            mem.map_bytes(0xFFFF, vec![0, 0], true),
            Err(MapError::OutOfRange { base: 0xFFFF, len: 2 })
        );
        #[allow(clippy::reversed_empty_ranges)]
        let inverted = mem.map_fn(0x20..=0x10, |_| 0, |_, _| {});
        assert_eq!(
            inverted,
            Err(MapError::InvertedRange {
                start: 0x20,
                end: 0x10
            })
        );
    }

    fn live_regions(mem: &Memory) -> usize {
        mem.regions.iter().flatten().count()
    }

    #[test]
    fn test_remapping_frees_covered_regions() {
        let mut mem = Memory::new();
        let baseline = live_regions(&mem);

        for _ in 0..100 {
            mem.load(0x0200, vec![0; 0x1000]).unwrap();
        }

        // Default RAM, the three vectors and the latest image
        assert_eq!(live_regions(&mem), baseline + 1);
        assert_eq!(mem.regions.len(), baseline + 2);
        assert_eq!(mem.read(0x0200), 0);
    }

    #[test]
    fn test_partly_covered_region_stays_live() {
        let mut mem = Memory::unmapped();
        mem.map_bytes(0x10, vec![1; 0x11], true).unwrap();
        mem.map_bytes(0x15, vec![2; 2], true).unwrap();
        mem.map_bytes(0x15, vec![3; 2], true).unwrap();

        assert_eq!(live_regions(&mem), 2);
        assert_eq!(mem.read(0x14), 1);
        assert_eq!(mem.read(0x15), 3);

        // Covering the rest of the first region frees it
        mem.map_bytes(0x10, vec![4; 5], true).unwrap();
        mem.map_bytes(0x17, vec![5; 10], true).unwrap();
        assert_eq!(live_regions(&mem), 3);
        assert_eq!(mem.snapshot(0x14..=0x17), vec![4, 3, 3, 5]);
    }

    #[test]
    fn test_map_bytes_to_end_of_address_space() {
        let mut mem = Memory::new();
        mem.map_bytes(0xFFFC, vec![0x34, 0x12, 0x78, 0x56], false).unwrap();
        assert_eq!(mem.read(0xFFFC), 0x34);
        assert_eq!(mem.read(0xFFFF), 0x56);
    }
}
