pub use clock::{Clock, Task, TimeSource};
pub use control_unit::{ControlUnit, Cpu};
pub use emulator::{Emulator, EmulatorConfig};
pub use error::{ClockError, Fault, LoadError, SetupError};
pub use framebuffer::{byte_to_sprite, Framebuffer, Pixels};
pub use input::{InputLatch, KeyId, KeyState, Keypad};
pub use instruction::{Instruction, InstructionDecoder, UnknownOpcodePolicy};
pub use memory::{MemoryBank, Ram, Stack};
pub use rom::read_rom;
pub use units::{Address, Byte, Column, Nibble, RegisterId, Row};

pub mod clock;
pub mod constants;
mod control_unit;
mod emulator;
mod error;
mod framebuffer;
mod input;
mod instruction;
mod memory;
mod opcode;
mod rom;
mod units;
