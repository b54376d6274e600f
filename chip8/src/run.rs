use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::info;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use chip8_core::{Emulator, EmulatorConfig, KeyState, Keypad};
use display::Display;

use crate::keymap::keymap;

/// How long the loop idles between polls when not fast-forwarding.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Extra instructions run per loop iteration while fast-forwarding.
const FAST_FORWARD_STEPS: usize = 16;

pub fn run(rom: &[u8], config: EmulatorConfig, scale: u32) -> Result<()> {
    let mut emulator = Emulator::new(rom, Keypad::new(), config)?;

    // Get SDL2 context
    let sdl = sdl2::init().map_err(|e| anyhow!(e))?;
    let mut display = Display::new(&sdl, "Chip-8", scale)?;
    let mut events = sdl.event_pump().map_err(|e| anyhow!(e))?;
    info!("loaded {} byte ROM", rom.len());

    // Whether or not the configured clock speed should be respected
    let mut fast_forward = false;

    'event: loop {
        // Only redraw when a pixel has changed
        if let Some(frame) = emulator.take_frame() {
            display.render(frame)?;
        }

        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(id)) => emulator.input_mut().set(id, KeyState::On),
                    (Keycode::Space, _) => fast_forward = true,
                    (Keycode::Escape, _) => break 'event,
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(id)) => emulator.input_mut().set(id, KeyState::Off),
                    (Keycode::Space, _) => fast_forward = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        emulator.update().context("emulator halted")?;
        if fast_forward {
            for _ in 0..FAST_FORWARD_STEPS {
                emulator.step().context("emulator halted")?;
            }
        } else {
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    Ok(())
}
