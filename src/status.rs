//! # Processor Status Flags
//!
//! The status register packs seven condition flags and one reserved bit into a
//! single byte with the fixed layout `NV-BDIZC`:
//!
//! | Bit | Flag | Meaning              |
//! |-----|------|----------------------|
//! | 7   | N    | Negative             |
//! | 6   | V    | Overflow             |
//! | 5   | -    | Reserved, always 1   |
//! | 4   | B    | Break                |
//! | 3   | D    | Decimal mode         |
//! | 2   | I    | Interrupt disable    |
//! | 1   | Z    | Zero                 |
//! | 0   | C    | Carry                |
//!
//! [`pack_flags`] and [`unpack_flags`] convert between the individually
//! addressable [`StatusFlags`] and that byte.

/// A single status register bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Negative,
    Overflow,
    Reserved,
    Break,
    Decimal,
    InterruptDisable,
    Zero,
    Carry,
}

impl Flag {
    /// All flags from the most significant bit to the least significant one.
    pub const ORDER: [Flag; 8] = [
        Flag::Negative,
        Flag::Overflow,
        Flag::Reserved,
        Flag::Break,
        Flag::Decimal,
        Flag::InterruptDisable,
        Flag::Zero,
        Flag::Carry,
    ];

    /// Bit mask of the flag within the packed status byte.
    pub const fn mask(self) -> u8 {
        match self {
            Flag::Negative => 0b1000_0000,
            Flag::Overflow => 0b0100_0000,
            Flag::Reserved => 0b0010_0000,
            Flag::Break => 0b0001_0000,
            Flag::Decimal => 0b0000_1000,
            Flag::InterruptDisable => 0b0000_0100,
            Flag::Zero => 0b0000_0010,
            Flag::Carry => 0b0000_0001,
        }
    }
}

/// Individually addressable status flags.
///
/// The reserved bit is not stored: it reads as set and ignores writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusFlags {
    /// Negative (bit 7 of the last result)
    pub n: bool,
    /// Overflow
    pub v: bool,
    /// Break
    pub b: bool,
    /// Decimal mode
    pub d: bool,
    /// Interrupt disable
    pub i: bool,
    /// Zero
    pub z: bool,
    /// Carry
    pub c: bool,
}

impl StatusFlags {
    /// Returns the state of one flag.
    pub const fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::Negative => self.n,
            Flag::Overflow => self.v,
            Flag::Reserved => true,
            Flag::Break => self.b,
            Flag::Decimal => self.d,
            Flag::InterruptDisable => self.i,
            Flag::Zero => self.z,
            Flag::Carry => self.c,
        }
    }

    /// Sets one flag. Writes to [`Flag::Reserved`] are ignored.
    pub fn set(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::Negative => self.n = value,
            Flag::Overflow => self.v = value,
            Flag::Reserved => {}
            Flag::Break => self.b = value,
            Flag::Decimal => self.d = value,
            Flag::InterruptDisable => self.i = value,
            Flag::Zero => self.z = value,
            Flag::Carry => self.c = value,
        }
    }

    /// Sets N and Z from a result byte.
    pub fn set_nz(&mut self, value: u8) {
        self.n = value & 0x80 != 0;
        self.z = value == 0;
    }
}

/// Packs the flags into a status byte. Bit 5 is always set.
///
/// ```
/// use emu6502::{pack_flags, StatusFlags};
///
/// let flags = StatusFlags { n: true, c: true, ..Default::default() };
/// assert_eq!(pack_flags(&flags), 0b1010_0001);
/// ```
pub fn pack_flags(flags: &StatusFlags) -> u8 {
    Flag::ORDER
        .iter()
        .filter(|flag| flags.get(**flag))
        .fold(0, |byte, flag| byte | flag.mask())
}

/// Unpacks a status byte. Bit 5 is ignored.
pub fn unpack_flags(byte: u8) -> StatusFlags {
    let mut flags = StatusFlags::default();
    for flag in Flag::ORDER {
        flags.set(flag, byte & flag.mask() != 0);
    }
    flags
}
