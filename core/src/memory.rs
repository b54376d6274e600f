use log::debug;

use crate::constants::{
    MAX_ROM_SIZE, MEMORY_SIZE, PROGRAM_START, REGISTER_COUNT, SPRITE_SHEET, STACK_SIZE,
};
use crate::error::{Fault, LoadError};
use crate::units::RegisterId;

/// 4096 bytes of addressable memory.
///
/// Every access is bounds checked and an out of range address is reported as a
/// [`Fault`] instead of wrapping or panicking.
#[derive(Clone)]
pub struct Ram {
    cells: Box<[u8; MEMORY_SIZE]>,
}

impl Ram {
    pub fn new() -> Self {
        Ram {
            cells: Box::new([0; MEMORY_SIZE]),
        }
    }

    pub fn read(&self, address: usize) -> Result<u8, Fault> {
        self.cells
            .get(address)
            .copied()
            .ok_or(Fault::MemoryOutOfBounds { address })
    }

    pub fn write(&mut self, address: usize, value: u8) -> Result<(), Fault> {
        let cell = self
            .cells
            .get_mut(address)
            .ok_or(Fault::MemoryOutOfBounds { address })?;
        *cell = value;
        Ok(())
    }

    /// Reads the big-endian word at `address..=address + 1`.
    pub fn read_word(&self, address: usize) -> Result<u16, Fault> {
        let high = u16::from(self.read(address)?);
        let low = u16::from(self.read(address + 1)?);
        Ok(high << 8 | low)
    }

    /// Copies `data` into memory starting at `address`.
    ///
    /// Nothing is written unless the whole block fits.
    pub fn write_block(&mut self, address: usize, data: &[u8]) -> Result<(), Fault> {
        let end = address + data.len();
        if end > MEMORY_SIZE {
            return Err(Fault::MemoryOutOfBounds {
                address: address.max(MEMORY_SIZE),
            });
        }
        self.cells[address..end].copy_from_slice(data);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.cells[..]
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

/// Return addresses for nested subroutine calls.
#[derive(Clone, Copy, Default)]
pub struct Stack {
    slots: [u16; STACK_SIZE],
}

impl Stack {
    pub fn get(&self, slot: u8) -> Option<u16> {
        self.slots.get(slot as usize).copied()
    }

    pub fn set(&mut self, slot: u8, value: u16) -> Option<()> {
        let entry = self.slots.get_mut(slot as usize)?;
        *entry = value;
        Some(())
    }
}

/// # Memory Bank
/// All of the machine's mutable state apart from the display.
///
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the flag register
/// - (i) a 16-bit index register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) an 8-bit stack pointer, incremented before a push and decremented after a pop
///
/// Timers
/// - 2 8-bit timers (delay & sound), decremented towards zero by the timer task
///
/// Memory
/// - 16 slot stack of return addresses
/// - 4096 bytes of addressable memory
#[derive(Clone)]
pub struct MemoryBank {
    pub ram: Ram,
    pub stack: Stack,
    v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
}

impl MemoryBank {
    pub fn new() -> Self {
        MemoryBank {
            ram: Ram::new(),
            stack: Stack::default(),
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
        }
    }

    pub fn register(&self, reg: RegisterId) -> u8 {
        self.v[reg.index()]
    }

    pub fn set_register(&mut self, reg: RegisterId, value: u8) {
        self.v[reg.index()] = value;
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.v
    }

    /// 0x000 - 0x050 is reserved for the font glyphs
    pub fn load_font(&mut self) {
        self.ram.cells[..SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);
    }

    /// Copies a ROM verbatim into memory at `PROGRAM_START`.
    ///
    /// ROMs larger than the space above `PROGRAM_START` are rejected before
    /// anything is written.
    pub fn load_program(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(LoadError::RomTooLarge {
                size: rom.len(),
                max_size: MAX_ROM_SIZE,
            });
        }
        let start = PROGRAM_START as usize;
        self.ram.cells[start..start + rom.len()].copy_from_slice(rom);
        debug!("loaded {} byte ROM at {:#05X}", rom.len(), PROGRAM_START);
        Ok(())
    }
}

impl Default for MemoryBank {
    fn default() -> Self {
        Self::new()
    }
}
