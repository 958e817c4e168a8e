//! # Opcode Metadata Table
//!
//! This module contains the 256-entry opcode table that serves as the single
//! source of truth for decoding, execution and assembly.
//!
//! The table covers:
//! - **151 documented instructions** of the NMOS 6502
//! - **`HLT`** at 0x02, which stops the run loop
//! - **Named illegal opcodes** (`SLO`, `LAX`, ...) that decode but have no semantics
//! - **Empty slots**, marked with the `???` mnemonic
//!
//! Each entry is built once, at compile time, from a mnemonic and an
//! addressing mode. The instruction size is derived from the mode.

use std::fmt;
use std::str::FromStr;

use crate::addressing::AddressingMode;

macro_rules! mnemonics {
    ($($name:ident),+ $(,)?) => {
        /// Instruction mnemonic.
        ///
        /// `Unknown` stands for opcode slots with no instruction at all and
        /// renders as `???`.
        #[allow(clippy::upper_case_acronyms)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Mnemonic {
            $($name,)+
            Unknown,
        }

        impl Mnemonic {
            /// Every named mnemonic, in declaration order. `Unknown` is excluded.
            pub const ALL: &'static [Mnemonic] = &[$(Mnemonic::$name),+];

            /// Three-letter name of the mnemonic.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Mnemonic::$name => stringify!($name),)+
                    Mnemonic::Unknown => "???",
                }
            }
        }
    };
}

mnemonics!(
    // Documented
    ADC, AND, ASL, BCC, BCS, BEQ, BIT, BMI, BNE, BPL, BRK, BVC, BVS, CLC, CLD, CLI, CLV, CMP,
    CPX, CPY, DEC, DEX, DEY, EOR, INC, INX, INY, JMP, JSR, LDA, LDX, LDY, LSR, NOP, ORA, PHA,
    PHP, PLA, PLP, ROL, ROR, RTI, RTS, SBC, SEC, SED, SEI, STA, STX, STY, TAX, TAY, TSX, TXA,
    TXS, TYA,
    // Halt
    HLT,
    // Illegal
    SLO, RLA, SRE, RRA, SAX, LAX, DCP, ISC, ANC, ALR, ARR, XAA, AXS, AHX, SHY, SHX, TAS, LAS,
);

impl Mnemonic {
    /// Whether the mnemonic has execution semantics.
    ///
    /// Illegal opcodes and empty slots decode, but executing them is an
    /// `UnimplementedOpcode` fault.
    pub const fn is_implemented(self) -> bool {
        !matches!(
            self,
            Mnemonic::SLO
                | Mnemonic::RLA
                | Mnemonic::SRE
                | Mnemonic::RRA
                | Mnemonic::SAX
                | Mnemonic::LAX
                | Mnemonic::DCP
                | Mnemonic::ISC
                | Mnemonic::ANC
                | Mnemonic::ALR
                | Mnemonic::ARR
                | Mnemonic::XAA
                | Mnemonic::AXS
                | Mnemonic::AHX
                | Mnemonic::SHY
                | Mnemonic::SHX
                | Mnemonic::TAS
                | Mnemonic::LAS
                | Mnemonic::Unknown
        )
    }

    /// Whether the instruction reads the byte at its effective address.
    ///
    /// Stores only write, and jumps only use the address.
    pub const fn reads_operand(self) -> bool {
        !matches!(
            self,
            Mnemonic::STA | Mnemonic::STX | Mnemonic::STY | Mnemonic::JMP | Mnemonic::JSR
        )
    }

    /// Whether the instruction is a conditional branch.
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Mnemonic::BPL
                | Mnemonic::BMI
                | Mnemonic::BVC
                | Mnemonic::BVS
                | Mnemonic::BCC
                | Mnemonic::BCS
                | Mnemonic::BNE
                | Mnemonic::BEQ
        )
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when text does not name a known mnemonic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMnemonic(pub String);

impl fmt::Display for UnknownMnemonic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown mnemonic '{}'", self.0)
    }
}

impl std::error::Error for UnknownMnemonic {}

impl FromStr for Mnemonic {
    type Err = UnknownMnemonic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mnemonic::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMnemonic(s.to_string()))
    }
}

/// Metadata for a single opcode.
///
/// # Examples
///
/// ```
/// use emu6502::{AddressingMode, Mnemonic, OPCODE_TABLE};
///
/// let lda_imm = &OPCODE_TABLE[0xA9];
/// assert_eq!(lda_imm.mnemonic, Mnemonic::LDA);
/// assert_eq!(lda_imm.addressing_mode, AddressingMode::Immediate);
/// assert_eq!(lda_imm.size_bytes, 2);
/// assert!(lda_imm.implemented);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// Instruction mnemonic.
    pub mnemonic: Mnemonic,

    /// Addressing mode for this instruction.
    pub addressing_mode: AddressingMode,

    /// Total instruction size in bytes (opcode + operands, 1-3).
    pub size_bytes: u8,

    /// Whether executing this opcode is defined.
    pub implemented: bool,
}

impl OpcodeMetadata {
    /// Number of operand bytes following the opcode.
    pub const fn operand_bytes(&self) -> u8 {
        self.size_bytes - 1
    }
}

const fn op(mnemonic: Mnemonic, addressing_mode: AddressingMode) -> OpcodeMetadata {
    OpcodeMetadata {
        mnemonic,
        addressing_mode,
        size_bytes: 1 + addressing_mode.operand_bytes(),
        implemented: mnemonic.is_implemented(),
    }
}

/// Looks up the opcode for a mnemonic and addressing mode.
///
/// When several opcodes share the combination (`SBC #` at 0xE9 and 0xEB) the
/// lowest one is returned.
pub fn find_opcode(mnemonic: Mnemonic, mode: AddressingMode) -> Option<u8> {
    OPCODE_TABLE
        .iter()
        .position(|m| m.mnemonic == mnemonic && m.addressing_mode == mode)
        .map(|i| i as u8)
}

use AddressingMode::*;
use Mnemonic::*;

/// Complete 256-entry opcode table indexed by opcode byte value.
///
/// # Examples
///
/// ```
/// use emu6502::{Mnemonic, OPCODE_TABLE};
///
/// let hlt = &OPCODE_TABLE[0x02];
/// assert_eq!(hlt.mnemonic, Mnemonic::HLT);
///
/// let empty = &OPCODE_TABLE[0x04];
/// assert_eq!(empty.mnemonic.as_str(), "???");
/// assert!(!empty.implemented);
/// ```
pub const OPCODE_TABLE: [OpcodeMetadata; 256] = [
    op(BRK, Implicit), // 0x00
    op(ORA, IndirectX), // 0x01
    op(HLT, Implicit), // 0x02
    op(SLO, IndirectX), // 0x03
    op(Unknown, Implicit), // 0x04
    op(ORA, ZeroPage), // 0x05
    op(ASL, ZeroPage), // 0x06
    op(SLO, ZeroPage), // 0x07
    op(PHP, Implicit), // 0x08
    op(ORA, Immediate), // 0x09
    op(ASL, Accumulator), // 0x0A
    op(ANC, Immediate), // 0x0B
    op(Unknown, Implicit), // 0x0C
    op(ORA, Absolute), // 0x0D
    op(ASL, Absolute), // 0x0E
    op(SLO, Absolute), // 0x0F
    op(BPL, Relative), // 0x10
    op(ORA, IndirectY), // 0x11
    op(Unknown, Implicit), // 0x12
    op(SLO, IndirectY), // 0x13
    op(Unknown, Implicit), // 0x14
    op(ORA, ZeroPageX), // 0x15
    op(ASL, ZeroPageX), // 0x16
    op(SLO, ZeroPageX), // 0x17
    op(CLC, Implicit), // 0x18
    op(ORA, AbsoluteY), // 0x19
    op(Unknown, Implicit), // 0x1A
    op(SLO, AbsoluteY), // 0x1B
    op(Unknown, Implicit), // 0x1C
    op(ORA, AbsoluteX), // 0x1D
    op(ASL, AbsoluteX), // 0x1E
    op(SLO, AbsoluteX), // 0x1F
    op(JSR, Absolute), // 0x20
    op(AND, IndirectX), // 0x21
    op(Unknown, Implicit), // 0x22
    op(RLA, IndirectX), // 0x23
    op(BIT, ZeroPage), // 0x24
    op(AND, ZeroPage), // 0x25
    op(ROL, ZeroPage), // 0x26
    op(RLA, ZeroPage), // 0x27
    op(PLP, Implicit), // 0x28
    op(AND, Immediate), // 0x29
    op(ROL, Accumulator), // 0x2A
    op(ANC, Immediate), // 0x2B
    op(BIT, Absolute), // 0x2C
    op(AND, Absolute), // 0x2D
    op(ROL, Absolute), // 0x2E
    op(RLA, Absolute), // 0x2F
    op(BMI, Relative), // 0x30
    op(AND, IndirectY), // 0x31
    op(Unknown, Implicit), // 0x32
    op(RLA, IndirectY), // 0x33
    op(Unknown, Implicit), // 0x34
    op(AND, ZeroPageX), // 0x35
    op(ROL, ZeroPageX), // 0x36
    op(RLA, ZeroPageX), // 0x37
    op(SEC, Implicit), // 0x38
    op(AND, AbsoluteY), // 0x39
    op(Unknown, Implicit), // 0x3A
    op(RLA, AbsoluteY), // 0x3B
    op(Unknown, Implicit), // 0x3C
    op(AND, AbsoluteX), // 0x3D
    op(ROL, AbsoluteX), // 0x3E
    op(RLA, AbsoluteX), // 0x3F
    op(RTI, Implicit), // 0x40
    op(EOR, IndirectX), // 0x41
    op(Unknown, Implicit), // 0x42
    op(SRE, IndirectX), // 0x43
    op(Unknown, Implicit), // 0x44
    op(EOR, ZeroPage), // 0x45
    op(LSR, ZeroPage), // 0x46
    op(SRE, ZeroPage), // 0x47
    op(PHA, Implicit), // 0x48
    op(EOR, Immediate), // 0x49
    op(LSR, Accumulator), // 0x4A
    op(ALR, Immediate), // 0x4B
    op(JMP, Absolute), // 0x4C
    op(EOR, Absolute), // 0x4D
    op(LSR, Absolute), // 0x4E
    op(SRE, Absolute), // 0x4F
    op(BVC, Relative), // 0x50
    op(EOR, IndirectY), // 0x51
    op(Unknown, Implicit), // 0x52
    op(SRE, IndirectY), // 0x53
    op(Unknown, Implicit), // 0x54
    op(EOR, ZeroPageX), // 0x55
    op(LSR, ZeroPageX), // 0x56
    op(SRE, ZeroPageX), // 0x57
    op(CLI, Implicit), // 0x58
    op(EOR, AbsoluteY), // 0x59
    op(Unknown, Implicit), // 0x5A
    op(SRE, AbsoluteY), // 0x5B
    op(Unknown, Implicit), // 0x5C
    op(EOR, AbsoluteX), // 0x5D
    op(LSR, AbsoluteX), // 0x5E
    op(SRE, AbsoluteX), // 0x5F
    op(RTS, Implicit), // 0x60
    op(ADC, IndirectX), // 0x61
    op(Unknown, Implicit), // 0x62
    op(RRA, IndirectX), // 0x63
    op(Unknown, Implicit), // 0x64
    op(ADC, ZeroPage), // 0x65
    op(ROR, ZeroPage), // 0x66
    op(RRA, ZeroPage), // 0x67
    op(PLA, Implicit), // 0x68
    op(ADC, Immediate), // 0x69
    op(ROR, Accumulator), // 0x6A
    op(ARR, Immediate), // 0x6B
    op(JMP, Indirect), // 0x6C
    op(ADC, Absolute), // 0x6D
    op(ROR, Absolute), // 0x6E
    op(RRA, Absolute), // 0x6F
    op(BVS, Relative), // 0x70
    op(ADC, IndirectY), // 0x71
    op(Unknown, Implicit), // 0x72
    op(RRA, IndirectY), // 0x73
    op(Unknown, Implicit), // 0x74
    op(ADC, ZeroPageX), // 0x75
    op(ROR, ZeroPageX), // 0x76
    op(RRA, ZeroPageX), // 0x77
    op(SEI, Implicit), // 0x78
    op(ADC, AbsoluteY), // 0x79
    op(Unknown, Implicit), // 0x7A
    op(RRA, AbsoluteY), // 0x7B
    op(Unknown, Implicit), // 0x7C
    op(ADC, AbsoluteX), // 0x7D
    op(ROR, AbsoluteX), // 0x7E
    op(RRA, AbsoluteX), // 0x7F
    op(Unknown, Implicit), // 0x80
    op(STA, IndirectX), // 0x81
    op(Unknown, Implicit), // 0x82
    op(SAX, IndirectX), // 0x83
    op(STY, ZeroPage), // 0x84
    op(STA, ZeroPage), // 0x85
    op(STX, ZeroPage), // 0x86
    op(SAX, ZeroPage), // 0x87
    op(DEY, Implicit), // 0x88
    op(Unknown, Implicit), // 0x89
    op(TXA, Implicit), // 0x8A
    op(XAA, Immediate), // 0x8B
    op(STY, Absolute), // 0x8C
    op(STA, Absolute), // 0x8D
    op(STX, Absolute), // 0x8E
    op(SAX, Absolute), // 0x8F
    op(BCC, Relative), // 0x90
    op(STA, IndirectY), // 0x91
    op(Unknown, Implicit), // 0x92
    op(AHX, IndirectY), // 0x93
    op(STY, ZeroPageX), // 0x94
    op(STA, ZeroPageX), // 0x95
    op(STX, ZeroPageY), // 0x96
    op(SAX, ZeroPageY), // 0x97
    op(TYA, Implicit), // 0x98
    op(STA, AbsoluteY), // 0x99
    op(TXS, Implicit), // 0x9A
    op(TAS, AbsoluteY), // 0x9B
    op(SHY, AbsoluteX), // 0x9C
    op(STA, AbsoluteX), // 0x9D
    op(SHX, AbsoluteY), // 0x9E
    op(AHX, AbsoluteY), // 0x9F
    op(LDY, Immediate), // 0xA0
    op(LDA, IndirectX), // 0xA1
    op(LDX, Immediate), // 0xA2
    op(LAX, IndirectX), // 0xA3
    op(LDY, ZeroPage), // 0xA4
    op(LDA, ZeroPage), // 0xA5
    op(LDX, ZeroPage), // 0xA6
    op(LAX, ZeroPage), // 0xA7
    op(TAY, Implicit), // 0xA8
    op(LDA, Immediate), // 0xA9
    op(TAX, Implicit), // 0xAA
    op(LAX, Immediate), // 0xAB
    op(LDY, Absolute), // 0xAC
    op(LDA, Absolute), // 0xAD
    op(LDX, Absolute), // 0xAE
    op(LAX, Absolute), // 0xAF
    op(BCS, Relative), // 0xB0
    op(LDA, IndirectY), // 0xB1
    op(Unknown, Implicit), // 0xB2
    op(LAX, IndirectY), // 0xB3
    op(LDY, ZeroPageX), // 0xB4
    op(LDA, ZeroPageX), // 0xB5
    op(LDX, ZeroPageY), // 0xB6
    op(LAX, ZeroPageY), // 0xB7
    op(CLV, Implicit), // 0xB8
    op(LDA, AbsoluteY), // 0xB9
    op(TSX, Implicit), // 0xBA
    op(LAS, AbsoluteY), // 0xBB
    op(LDY, AbsoluteX), // 0xBC
    op(LDA, AbsoluteX), // 0xBD
    op(LDX, AbsoluteY), // 0xBE
    op(LAX, AbsoluteY), // 0xBF
    op(CPY, Immediate), // 0xC0
    op(CMP, IndirectX), // 0xC1
    op(Unknown, Implicit), // 0xC2
    op(DCP, IndirectX), // 0xC3
    op(CPY, ZeroPage), // 0xC4
    op(CMP, ZeroPage), // 0xC5
    op(DEC, ZeroPage), // 0xC6
    op(DCP, ZeroPage), // 0xC7
    op(INY, Implicit), // 0xC8
    op(CMP, Immediate), // 0xC9
    op(DEX, Implicit), // 0xCA
    op(AXS, Immediate), // 0xCB
    op(CPY, Absolute), // 0xCC
    op(CMP, Absolute), // 0xCD
    op(DEC, Absolute), // 0xCE
    op(DCP, Absolute), // 0xCF
    op(BNE, Relative), // 0xD0
    op(CMP, IndirectY), // 0xD1
    op(Unknown, Implicit), // 0xD2
    op(DCP, IndirectY), // 0xD3
    op(Unknown, Implicit), // 0xD4
    op(CMP, ZeroPageX), // 0xD5
    op(DEC, ZeroPageX), // 0xD6
    op(DCP, ZeroPageX), // 0xD7
    op(CLD, Implicit), // 0xD8
    op(CMP, AbsoluteY), // 0xD9
    op(Unknown, Implicit), // 0xDA
    op(DCP, AbsoluteY), // 0xDB
    op(Unknown, Implicit), // 0xDC
    op(CMP, AbsoluteX), // 0xDD
    op(DEC, AbsoluteX), // 0xDE
    op(DCP, AbsoluteX), // 0xDF
    op(CPX, Immediate), // 0xE0
    op(SBC, IndirectX), // 0xE1
    op(Unknown, Implicit), // 0xE2
    op(ISC, IndirectX), // 0xE3
    op(CPX, ZeroPage), // 0xE4
    op(SBC, ZeroPage), // 0xE5
    op(INC, ZeroPage), // 0xE6
    op(ISC, ZeroPage), // 0xE7
    op(INX, Implicit), // 0xE8
    op(SBC, Immediate), // 0xE9
    op(NOP, Implicit), // 0xEA
    op(SBC, Immediate), // 0xEB
    op(CPX, Absolute), // 0xEC
    op(SBC, Absolute), // 0xED
    op(INC, Absolute), // 0xEE
    op(ISC, Absolute), // 0xEF
    op(BEQ, Relative), // 0xF0
    op(SBC, IndirectY), // 0xF1
    op(Unknown, Implicit), // 0xF2
    op(ISC, IndirectY), // 0xF3
    op(Unknown, Implicit), // 0xF4
    op(SBC, ZeroPageX), // 0xF5
    op(INC, ZeroPageX), // 0xF6
    op(ISC, ZeroPageX), // 0xF7
    op(SED, Implicit), // 0xF8
    op(SBC, AbsoluteY), // 0xF9
    op(Unknown, Implicit), // 0xFA
    op(ISC, AbsoluteY), // 0xFB
    op(Unknown, Implicit), // 0xFC
    op(SBC, AbsoluteX), // 0xFD
    op(INC, AbsoluteX), // 0xFE
    op(ISC, AbsoluteX), // 0xFF
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_opcode_count() {
        let documented = OPCODE_TABLE
            .iter()
            .filter(|m| m.implemented && m.mnemonic != Mnemonic::HLT)
            .count();
        // 151 documented opcodes plus the 0xEB alias of SBC #
        assert_eq!(documented, 152);
    }

    #[test]
    fn test_sizes_follow_addressing_mode() {
        for meta in OPCODE_TABLE.iter() {
            assert_eq!(meta.size_bytes, 1 + meta.addressing_mode.operand_bytes());
        }
    }

    #[test]
    fn test_illegal_opcodes_are_not_implemented() {
        assert_eq!(OPCODE_TABLE[0x03].mnemonic, Mnemonic::SLO);
        assert!(!OPCODE_TABLE[0x03].implemented);
        assert_eq!(OPCODE_TABLE[0xAB].mnemonic, Mnemonic::LAX);
        assert!(!OPCODE_TABLE[0xAB].implemented);
    }

    #[test]
    fn test_branches_are_relative() {
        for opcode in [0x10, 0x30, 0x50, 0x70, 0x90, 0xB0, 0xD0, 0xF0] {
            let meta = &OPCODE_TABLE[opcode];
            assert!(meta.mnemonic.is_branch());
            assert_eq!(meta.addressing_mode, AddressingMode::Relative);
            assert_eq!(meta.size_bytes, 2);
        }
    }

    #[test]
    fn test_find_opcode() {
        assert_eq!(find_opcode(Mnemonic::SBC, AddressingMode::Immediate), Some(0xE9));
        assert_eq!(find_opcode(Mnemonic::CPX, AddressingMode::ZeroPage), Some(0xE4));
        assert_eq!(find_opcode(Mnemonic::CPY, AddressingMode::ZeroPage), Some(0xC4));
        assert_eq!(find_opcode(Mnemonic::JMP, AddressingMode::Indirect), Some(0x6C));
        assert_eq!(find_opcode(Mnemonic::STA, AddressingMode::Immediate), None);
    }

    #[test]
    fn test_mnemonic_from_str() {
        assert_eq!("lda".parse::<Mnemonic>(), Ok(Mnemonic::LDA));
        assert_eq!("HLT".parse::<Mnemonic>(), Ok(Mnemonic::HLT));
        assert!("???".parse::<Mnemonic>().is_err());
        assert!("FOO".parse::<Mnemonic>().is_err());
    }
}
