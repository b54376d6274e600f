use std::io;

use thiserror::Error;

/// A program did something the machine can't honour.
///
/// Any fault halts the CPU; execution does not resume past it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("stack overflow calling from pc {pc:#06X}")]
    StackOverflow { pc: u16 },

    #[error("stack underflow returning from pc {pc:#06X}")]
    StackUnderflow { pc: u16 },
}

/// A ROM couldn't be placed into memory.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A periodic task couldn't be registered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClockError {
    #[error("clock has no time source")]
    MissingTimeSource,

    #[error("frequency must be positive and finite, got {0} Hz")]
    InvalidFrequency(f64),
}

/// An emulator couldn't be put together.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to load ROM: {0}")]
    Load(#[from] LoadError),

    #[error("failed to schedule task: {0}")]
    Clock(#[from] ClockError),
}
