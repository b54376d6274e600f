use crate::units::{Address, Byte, Nibble, RegisterId};

/// # Opcodes
/// Field access for raw 16-bit instruction words.
///
/// Which instruction a word encodes is decided by:
/// - `(n, _, _, _)` the family; every word has one
/// - `(_, _, _, n)` specific behavior within the arithmetic category
/// - `(_, _, n, n)` specific behavior within the system, key and register categories
///
/// Nibbles not used to determine the operation carry the operands.
/// - `(_, n, n, n)` a 12-bit address
/// - `(_, _, n, n)` a byte that is assigned to and/or compared with Vx
/// - `(_, n, _, _)` the register Vx or the range of registers V0..Vx
/// - `(_, _, n, _)` the register Vy
/// - `(_, _, _, n)` the height of a sprite
pub trait Opcode {
    /// Returns the Opcode's component nibbles.
    fn nibbles(&self) -> (u8, u8, u8, u8);

    /// The Opcode's most significant nibble.
    /// `[p___]`
    fn prefix(&self) -> u8;

    /// The register named by the Opcode's second nibble.
    /// `[_x__]`
    fn x(&self) -> RegisterId;

    /// The register named by the Opcode's third nibble.
    /// `[__y_]`
    fn y(&self) -> RegisterId;

    /// The Opcode's fourth nibble.
    /// `[___n]`
    fn n(&self) -> Nibble;

    /// The Opcode's least significant byte.
    /// `[__kk]`
    fn kk(&self) -> Byte;

    /// The Opcode without its most significant nibble.
    /// `[_adr]`
    fn addr(&self) -> Address;
}

impl Opcode for u16 {
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        (
            self.prefix(),
            ((self & 0x0F00) >> 8) as u8,
            ((self & 0x00F0) >> 4) as u8,
            (self & 0x000F) as u8,
        )
    }

    fn prefix(&self) -> u8 {
        ((self & 0xF000) >> 12) as u8
    }

    fn x(&self) -> RegisterId {
        RegisterId::from_nibble(((self & 0x0F00) >> 8) as u8)
    }

    fn y(&self) -> RegisterId {
        RegisterId::from_nibble(((self & 0x00F0) >> 4) as u8)
    }

    fn n(&self) -> Nibble {
        Nibble::new((self & 0x000F) as u8)
    }

    fn kk(&self) -> Byte {
        Byte::new((self & 0x00FF) as u8)
    }

    fn addr(&self) -> Address {
        Address::new(self & 0x0FFF)
    }
}
