/// Pixels per framebuffer row.
pub const DISPLAY_WIDTH: usize = 64;
/// Pixel rows in the framebuffer.
pub const DISPLAY_HEIGHT: usize = 32;

/// Addressable bytes of RAM.
pub const MEMORY_SIZE: usize = 4096;
/// Return-address slots in the call stack.
pub const STACK_SIZE: usize = 16;
/// Number of general purpose registers (V0..VF).
pub const REGISTER_COUNT: usize = 16;
/// VF doubles as the carry, borrow, shift-out and collision flag.
pub const FLAG_REGISTER: u8 = 0xF;

/// ROMs are copied into memory starting here and execution begins here.
pub const PROGRAM_START: u16 = 0x200;
/// Everything above `PROGRAM_START` is available to a ROM.
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Instructions are two bytes wide.
pub const INSTRUCTION_SIZE: u16 = 0x2;

/// Instructions executed per second.
pub const CPU_FREQUENCY: f64 = 600.0;
/// Delay and sound timer decrements per second.
pub const TIMER_FREQUENCY: f64 = 60.0;

/// Bytes per font glyph.
pub const GLYPH_STRIDE: u16 = 5;
/// Number of keys on the hexadecimal keypad.
pub const KEY_COUNT: usize = 16;

/// # Sprite Sheet
/// The font glyphs 0..F, stored at the very start of memory.
///
/// Each glyph is 5 rows of 4 pixels packed into the high nibble of a byte:
/// ```text
/// 0xF0  ****
/// 0x90  *  *
/// 0x90  *  *
/// 0x90  *  *
/// 0xF0  ****
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
