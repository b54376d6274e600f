use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{TextureValueError, WindowCanvas};
use sdl2::video::WindowBuildError;
use sdl2::IntegerOrSdlError;
use thiserror::Error;

use chip8_core::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chip8_core::Pixels;

/// Window size multiplier used when the host doesn't pick one.
pub const DEFAULT_SCALE: u32 = 10;

/// Bytes per pixel in an RGB24 texture.
const CHANNELS: usize = 3;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("sdl error: {0}")]
    Sdl(String),

    #[error("failed to open window: {0}")]
    Window(#[from] WindowBuildError),

    #[error("failed to create canvas: {0}")]
    Canvas(#[from] IntegerOrSdlError),

    #[error("failed to create texture: {0}")]
    Texture(#[from] TextureValueError),
}

impl From<String> for DisplayError {
    fn from(message: String) -> Self {
        DisplayError::Sdl(message)
    }
}

/// # Display
/// The Chip-8 display is composed of 64x32 black/white pixels.
/// The on/off state of these pixels is encoded as 1/0 respectively in a 2d array of 64x32 bytes.
/// The display only gets a call to `render` when the core reports a changed frame.
pub struct Display {
    canvas: WindowCanvas,
    width: usize,
    height: usize,
}

impl Display {
    /// Opens a window bound to an sdl2 context.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    /// * `title` the window title
    /// * `scale` the size multiplier for each pixel
    pub fn new(sdl: &sdl2::Sdl, title: &str, scale: u32) -> Result<Self, DisplayError> {
        let video_subsystem = sdl.video()?;
        let window = video_subsystem
            .window(
                title,
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .opengl()
            .build()?;
        let canvas = window.into_canvas().build()?;

        Ok(Display {
            canvas,
            width: DISPLAY_WIDTH,
            height: DISPLAY_HEIGHT,
        })
    }

    /// Formats a Chip-8 frame for rendering as an SDL2 texture.
    ///
    /// An SDL2 texture is a 1D array of ints that represent concatenated rows of RGB pixels.
    ///
    /// This creates a black and white rendering by:
    /// - Flattening the 2D frame into a 1D array by concatenating its rows
    /// - Triplicating each element of that 1D array to represent the RGB values of each pixel
    /// - Multiplying each value by 255 to convert from a binary state to 0-255 intensity
    ///
    /// # Arguments
    /// * `frame` the pixels of a Chip-8 framebuffer
    fn frame_to_sdl_texture(frame: &Pixels) -> Vec<u8> {
        frame
            .iter()
            .flatten()
            .flat_map(|&pixel| [pixel.min(1) * 0xFF; CHANNELS])
            .collect()
    }

    /// Formats the frame as an SDL2 RGB24 texture and presents it.
    ///
    /// # Arguments
    /// * `frame` the pixels of a Chip-8 framebuffer
    pub fn render(&mut self, frame: &Pixels) -> Result<(), DisplayError> {
        let texture_creator = self.canvas.texture_creator();
        let mut texture = texture_creator.create_texture_streaming(
            PixelFormatEnum::RGB24,
            self.width as u32,
            self.height as u32,
        )?;

        let rgb = Display::frame_to_sdl_texture(frame);
        let row_bytes = self.width * CHANNELS;
        texture.with_lock(None, |buffer: &mut [u8], pitch: usize| {
            for (row, pixels) in rgb.chunks(row_bytes).enumerate() {
                let start = row * pitch;
                buffer[start..start + row_bytes].copy_from_slice(pixels);
            }
        })?;

        self.canvas.copy(&texture, None, None)?;
        self.canvas.present();
        Ok(())
    }
}
