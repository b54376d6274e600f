use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use chip8_core::constants::{CPU_FREQUENCY, TIMER_FREQUENCY};
use chip8_core::{read_rom, EmulatorConfig, UnknownOpcodePolicy};
use display::DEFAULT_SCALE;

mod keymap;
mod run;

#[derive(Parser, Debug)]
#[command(name = "chip8")]
#[command(about = "Runs a Chip-8 ROM in an SDL2 window", long_about = None)]
struct Args {
    /// Path to the ROM to run
    rom: PathBuf,

    /// Instructions executed per second
    #[arg(long, default_value_t = CPU_FREQUENCY)]
    cpu_hz: f64,

    /// Delay/sound timer decrements per second
    #[arg(long, default_value_t = TIMER_FREQUENCY)]
    timer_hz: f64,

    /// Window size multiplier
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    scale: u32,

    /// Seed for the random opcode
    #[arg(long)]
    seed: Option<u64>,

    /// Log and record unknown opcodes instead of skipping them silently
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let file = File::open(&args.rom)
        .with_context(|| format!("unable to open {}", args.rom.display()))?;
    let rom = read_rom(&mut BufReader::new(file))
        .with_context(|| format!("unable to load {}", args.rom.display()))?;

    let config = EmulatorConfig {
        cpu_frequency: args.cpu_hz,
        timer_frequency: args.timer_hz,
        seed: args.seed,
        unknown_opcodes: if args.strict {
            UnknownOpcodePolicy::Record
        } else {
            UnknownOpcodePolicy::Ignore
        },
    };
    run::run(&rom, config, args.scale)
}
