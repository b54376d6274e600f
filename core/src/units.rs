//! # Units
//! Zero-cost wrappers around the integers an instruction carries, so that a
//! register index can't be passed where an immediate byte is expected.

use std::fmt;

/// Index of one of the sixteen general purpose registers (V0..VF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegisterId(u8);

impl RegisterId {
    /// The flag register VF.
    pub const VF: RegisterId = RegisterId(0xF);
    /// The register V0, used as the offset of `JP V0, addr`.
    pub const V0: RegisterId = RegisterId(0x0);

    /// Builds a register index from the low nibble of `value`.
    pub const fn from_nibble(value: u8) -> Self {
        RegisterId(value & 0xF)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Every register from V0 up to and including `self`.
    pub fn through(self) -> impl Iterator<Item = RegisterId> {
        (0..=self.0).map(RegisterId)
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{:X}", self.0)
    }
}

/// A 12-bit memory address taken from an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u16);

impl Address {
    pub const fn new(value: u16) -> Self {
        Address(value & 0x0FFF)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#05X}", self.0)
    }
}

/// An 8-bit immediate value taken from an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Byte(u8);

impl Byte {
    pub const fn new(value: u8) -> Self {
        Byte(value)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Byte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04X}", self.0)
    }
}

/// A 4-bit immediate value taken from an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nibble(u8);

impl Nibble {
    pub const fn new(value: u8) -> Self {
        Nibble(value & 0xF)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Nibble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A framebuffer column; wrapped horizontally when drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Column(pub usize);

/// A framebuffer row; wrapped vertically only per sprite row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Row(pub usize);
