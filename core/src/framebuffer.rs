use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::units::{Column, Row};

/// The pixel grid, indexed as [row][column]
pub type Pixels = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// Expands a sprite byte into its eight pixels, most significant bit first.
pub fn byte_to_sprite(byte: u8) -> [u8; 8] {
    let mut sprite = [0; 8];
    for (bit, pixel) in sprite.iter_mut().enumerate() {
        *pixel = (byte >> (7 - bit)) & 0x1;
    }
    sprite
}

/// # Framebuffer
/// 64x32 monochrome pixels, each either 0 or 1.
///
/// Pixels are only ever changed by XOR-ing a value onto them, so drawing the
/// same sprite twice erases it. Every draw reports whether it changed anything,
/// which is what the draw instruction turns into its collision flag.
///
/// The screen wraps horizontally on every pixel. It only wraps vertically when
/// a sprite row is drawn; `set_pixel` on its own ignores rows below the screen.
#[derive(Clone)]
pub struct Framebuffer {
    pixels: Pixels,
    dirty: bool,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            dirty: false,
        }
    }

    pub fn width(&self) -> usize {
        DISPLAY_WIDTH
    }

    pub fn height(&self) -> usize {
        DISPLAY_HEIGHT
    }

    /// The value of a single pixel, or 0 for coordinates off the screen.
    pub fn pixel(&self, col: Column, row: Row) -> u8 {
        self.pixels
            .get(row.0)
            .and_then(|r| r.get(col.0))
            .copied()
            .unwrap_or(0)
    }

    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    pub fn clear(&mut self) {
        self.pixels = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.dirty = true;
    }

    /// XORs `value` onto the pixel at (`col` mod width, `row`).
    ///
    /// Returns whether the pixel changed.
    pub fn set_pixel(&mut self, col: Column, row: Row, value: u8) -> bool {
        let col = col.0 % DISPLAY_WIDTH;
        let pixel = match self.pixels.get_mut(row.0) {
            Some(r) => &mut r[col],
            None => return false,
        };
        let old = *pixel;
        *pixel = (old ^ value) & 0x1;
        let changed = *pixel != old;
        self.dirty |= changed;
        changed
    }

    /// XORs one 8 pixel sprite row onto the screen at (`col`, `row` mod height).
    ///
    /// Returns whether any of the eight pixels changed.
    pub fn set_sprite(&mut self, col: Column, row: Row, sprite: [u8; 8]) -> bool {
        let row = Row(row.0 % DISPLAY_HEIGHT);
        let mut any_changed = false;
        for (offset, value) in sprite.iter().enumerate() {
            any_changed |= self.set_pixel(Column(col.0 + offset), row, *value);
        }
        any_changed
    }

    /// Returns true once after any pixel changed, for renderers that only
    /// redraw when needed.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}
