//! Integration tests for memory mapping.
//!
//! These tests verify handler dispatch, last-mapping-wins precedence, the
//! default layout, and CPU access through mapped handlers.

use std::cell::RefCell;
use std::rc::Rc;

use emu6502::{layout, ByteRegion, MapError, Memory, MemoryBus, MemoryHandler, CPU};

/// Handler that returns a fixed tag and records the offsets it was written at.
struct Tagged {
    tag: u8,
    writes: Rc<RefCell<Vec<(u16, u8)>>>,
}

impl MemoryHandler for Tagged {
    fn read(&self, _offset: u16) -> u8 {
        self.tag
    }

    fn write(&mut self, offset: u16, value: u8) {
        self.writes.borrow_mut().push((offset, value));
    }
}

fn tagged(tag: u8) -> (Box<Tagged>, Rc<RefCell<Vec<(u16, u8)>>>) {
    let writes = Rc::new(RefCell::new(Vec::new()));
    let handler = Box::new(Tagged {
        tag,
        writes: Rc::clone(&writes),
    });
    (handler, writes)
}

#[test]
fn test_mapping_precedence() {
    let mut memory = Memory::unmapped();
    let (first, _) = tagged(0x11);
    let (second, _) = tagged(0x22);

    memory.map_handler(0x10..=0x20, first).unwrap();
    memory.map_handler(0x15..=0x16, second).unwrap();

    assert_eq!(memory.read(0x10), 0x11);
    assert_eq!(memory.read(0x14), 0x11);
    assert_eq!(memory.read(0x15), 0x22);
    assert_eq!(memory.read(0x16), 0x22);
    assert_eq!(memory.read(0x17), 0x11);
    assert_eq!(memory.read(0x20), 0x11);
}

#[test]
fn test_handlers_receive_offsets() {
    let mut memory = Memory::new();
    let (handler, writes) = tagged(0);
    memory
        .map_handler(layout::PERIPHERALS_BASE..=layout::PERIPHERALS_BASE + 3, handler)
        .unwrap();

    memory.write(layout::PERIPHERALS_BASE + 2, 0xAB);
    assert_eq!(*writes.borrow(), vec![(2, 0xAB)]);
}

#[test]
fn test_unmapped_reads_zero_and_ignores_writes() {
    let mut memory = Memory::unmapped();
    memory.write(0x1234, 0xFF);
    assert_eq!(memory.read(0x1234), 0x00);
    assert!(!memory.is_mapped(0x1234));
}

#[test]
fn test_peripheral_reservation_is_unmapped() {
    let memory = Memory::new();
    assert!(memory.is_mapped(layout::PERIPHERALS_BASE - 1));
    assert!(!memory.is_mapped(layout::PERIPHERALS_BASE));
    assert!(!memory.is_mapped(layout::ROM_BASE - 1));
}

#[test]
fn test_read_only_bytes_ignore_writes() {
    let mut memory = Memory::new();
    memory.map_bytes(0x4000, vec![1, 2, 3], false).unwrap();
    memory.write(0x4001, 0xFF);
    assert_eq!(memory.snapshot(0x4000..=0x4002), vec![1, 2, 3]);

    memory.load(0x5000, vec![1, 2, 3]).unwrap();
    memory.write(0x5001, 0xFF);
    assert_eq!(memory.snapshot(0x5000..=0x5002), vec![1, 0xFF, 3]);
}

#[test]
fn test_vectors_are_read_only() {
    let mut memory = Memory::new();
    memory.write(layout::RESET_VECTOR, 0x55);
    assert_eq!(memory.read(layout::RESET_VECTOR), 0x00);
    assert_eq!(memory.snapshot(layout::NMI_VECTOR..=0xFFFB), vec![0, 0]);
    assert_eq!(memory.snapshot(layout::IRQ_VECTOR..=0xFFFF), vec![0, 0]);
}

#[test]
fn test_map_errors() {
    let mut memory = Memory::new();
    assert_eq!(
        memory.map_bytes(0x1000, Vec::new(), true),
        Err(MapError::EmptyRegion { base: 0x1000 })
    );
    assert_eq!(
        memory.map_bytes(0xFFFF, vec![0, 0], true),
        Err(MapError::OutOfRange {
            base: 0xFFFF,
            len: 2
        })
    );
    #[allow(clippy::reversed_empty_ranges)]
    let inverted = memory.map_handler(0x20..=0x10, Box::new(ByteRegion::new(vec![0], true)));
    assert_eq!(
        inverted,
        Err(MapError::InvertedRange {
            start: 0x20,
            end: 0x10
        })
    );
}

#[test]
fn test_load_rom_past_end_of_address_space() {
    let mut memory = Memory::new();
    let too_big = vec![0xEA; 0x301];
    assert!(matches!(memory.load_rom(too_big), Err(MapError::OutOfRange { .. })));
    assert!(memory.load_rom(vec![0xEA; 0x300]).is_ok());
}

#[test]
fn test_map_fn_closures() {
    let mut memory = Memory::new();
    let latch = Rc::new(RefCell::new(0u8));
    let sink = Rc::clone(&latch);
    memory
        .map_fn(
            0xF800..=0xF8FF,
            |offset| offset as u8,
            move |_, value| *sink.borrow_mut() = value,
        )
        .unwrap();

    assert_eq!(memory.read(0xF842), 0x42);
    memory.write(0xF800, 0x99);
    assert_eq!(*latch.borrow(), 0x99);
}

#[test]
fn test_cpu_writes_through_handler() {
    let mut memory = Memory::new();
    let (handler, writes) = tagged(0x7E);
    memory
        .map_handler(layout::PERIPHERALS_BASE..=layout::PERIPHERALS_BASE, handler)
        .unwrap();
    // LDA $F700; STA $F700; HLT
    memory
        .load_rom(vec![0xAD, 0x00, 0xF7, 0x8D, 0x00, 0xF7, 0x02])
        .unwrap();

    let mut cpu = CPU::new(memory);
    cpu.run().unwrap();

    assert_eq!(cpu.a(), 0x7E);
    assert_eq!(*writes.borrow(), vec![(0, 0x7E)]);
}
