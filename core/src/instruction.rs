use std::fmt;

use log::warn;

use crate::control_unit::ControlUnit;
use crate::error::Fault;
use crate::opcode::Opcode;
use crate::units::{Address, Byte, Nibble, RegisterId};

/// A decoded instruction with its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    ClearDisplay,
    Return,
    Jump(Address),
    Call(Address),
    SkipIfEqual(RegisterId, Byte),
    SkipIfNotEqual(RegisterId, Byte),
    SkipIfRegistersEqual(RegisterId, RegisterId),
    Load(RegisterId, Byte),
    Add(RegisterId, Byte),
    CopyRegister(RegisterId, RegisterId),
    Or(RegisterId, RegisterId),
    And(RegisterId, RegisterId),
    Xor(RegisterId, RegisterId),
    AddRegisters(RegisterId, RegisterId),
    Sub(RegisterId, RegisterId),
    ShiftRight(RegisterId),
    SubN(RegisterId, RegisterId),
    ShiftLeft(RegisterId),
    SkipIfRegistersNotEqual(RegisterId, RegisterId),
    SetIndex(Address),
    JumpWithOffset(Address),
    Random(RegisterId, Byte),
    Draw(RegisterId, RegisterId, Nibble),
    SkipIfKeyPressed(RegisterId),
    SkipIfKeyNotPressed(RegisterId),
    LoadDelayTimer(RegisterId),
    WaitForKey(RegisterId),
    SetDelayTimer(RegisterId),
    SetSoundTimer(RegisterId),
    AddToIndex(RegisterId),
    SetIndexToGlyph(RegisterId),
    StoreBcd(RegisterId),
    StoreRegisters(RegisterId),
    ReadRegisters(RegisterId),
}

impl Instruction {
    /// Selects the Instruction for a given opcode.
    ///
    /// The system (0), arithmetic (8), key (E) and register (F) families are
    /// selected by a second field: the low byte for 0, E and F, the low nibble
    /// for 8. Returns `None` for anything unrecognised, including the `0nnn`
    /// machine code calls.
    pub fn decode(op: u16) -> Option<Self> {
        use Instruction::*;

        let (prefix, _, _, low) = op.nibbles();
        let (x, y) = (op.x(), op.y());
        let instruction = match prefix {
            0x0 => match op.kk().get() {
                0xE0 => ClearDisplay,
                0xEE => Return,
                _ => return None,
            },
            0x1 => Jump(op.addr()),
            0x2 => Call(op.addr()),
            0x3 => SkipIfEqual(x, op.kk()),
            0x4 => SkipIfNotEqual(x, op.kk()),
            0x5 => SkipIfRegistersEqual(x, y),
            0x6 => Load(x, op.kk()),
            0x7 => Add(x, op.kk()),
            0x8 => match low {
                0x0 => CopyRegister(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => AddRegisters(x, y),
                0x5 => Sub(x, y),
                0x6 => ShiftRight(x),
                0x7 => SubN(x, y),
                0xE => ShiftLeft(x),
                _ => return None,
            },
            0x9 => SkipIfRegistersNotEqual(x, y),
            0xA => SetIndex(op.addr()),
            0xB => JumpWithOffset(op.addr()),
            0xC => Random(x, op.kk()),
            0xD => Draw(x, y, op.n()),
            0xE => match op.kk().get() {
                0x9E => SkipIfKeyPressed(x),
                0xA1 => SkipIfKeyNotPressed(x),
                _ => return None,
            },
            0xF => match op.kk().get() {
                0x07 => LoadDelayTimer(x),
                0x0A => WaitForKey(x),
                0x15 => SetDelayTimer(x),
                0x18 => SetSoundTimer(x),
                0x1E => AddToIndex(x),
                0x29 => SetIndexToGlyph(x),
                0x33 => StoreBcd(x),
                0x55 => StoreRegisters(x),
                0x65 => ReadRegisters(x),
                _ => return None,
            },
            _ => return None,
        };
        Some(instruction)
    }

    /// Runs the instruction against a control unit.
    pub fn execute(self, unit: &mut dyn ControlUnit) -> Result<(), Fault> {
        use Instruction::*;

        match self {
            ClearDisplay => unit.clear_display(),
            Return => unit.return_from_subroutine(),
            Jump(addr) => unit.jump(addr),
            Call(addr) => unit.call(addr),
            SkipIfEqual(x, kk) => unit.skip_if_equal(x, kk),
            SkipIfNotEqual(x, kk) => unit.skip_if_not_equal(x, kk),
            SkipIfRegistersEqual(x, y) => unit.skip_if_registers_equal(x, y),
            Load(x, kk) => unit.load(x, kk),
            Add(x, kk) => unit.add(x, kk),
            CopyRegister(x, y) => unit.copy_register(x, y),
            Or(x, y) => unit.or(x, y),
            And(x, y) => unit.and(x, y),
            Xor(x, y) => unit.xor(x, y),
            AddRegisters(x, y) => unit.add_registers(x, y),
            Sub(x, y) => unit.sub(x, y),
            ShiftRight(x) => unit.shift_right(x),
            SubN(x, y) => unit.subn(x, y),
            ShiftLeft(x) => unit.shift_left(x),
            SkipIfRegistersNotEqual(x, y) => unit.skip_if_registers_not_equal(x, y),
            SetIndex(addr) => unit.set_index(addr),
            JumpWithOffset(addr) => unit.jump_with_offset(addr),
            Random(x, kk) => unit.random(x, kk),
            Draw(x, y, n) => unit.draw(x, y, n),
            SkipIfKeyPressed(x) => unit.skip_if_key_pressed(x),
            SkipIfKeyNotPressed(x) => unit.skip_if_key_not_pressed(x),
            LoadDelayTimer(x) => unit.load_delay_timer(x),
            WaitForKey(x) => unit.wait_for_key(x),
            SetDelayTimer(x) => unit.set_delay_timer(x),
            SetSoundTimer(x) => unit.set_sound_timer(x),
            AddToIndex(x) => unit.add_to_index(x),
            SetIndexToGlyph(x) => unit.set_index_to_glyph(x),
            StoreBcd(x) => unit.store_bcd(x),
            StoreRegisters(x) => unit.store_registers(x),
            ReadRegisters(x) => unit.read_registers(x),
        }
    }
}

/// Conventional assembler mnemonics, e.g. `LD V1, 0x22`.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match self {
            ClearDisplay => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(addr) => write!(f, "JP {}", addr),
            Call(addr) => write!(f, "CALL {}", addr),
            SkipIfEqual(x, kk) => write!(f, "SE {}, {}", x, kk),
            SkipIfNotEqual(x, kk) => write!(f, "SNE {}, {}", x, kk),
            SkipIfRegistersEqual(x, y) => write!(f, "SE {}, {}", x, y),
            Load(x, kk) => write!(f, "LD {}, {}", x, kk),
            Add(x, kk) => write!(f, "ADD {}, {}", x, kk),
            CopyRegister(x, y) => write!(f, "LD {}, {}", x, y),
            Or(x, y) => write!(f, "OR {}, {}", x, y),
            And(x, y) => write!(f, "AND {}, {}", x, y),
            Xor(x, y) => write!(f, "XOR {}, {}", x, y),
            AddRegisters(x, y) => write!(f, "ADD {}, {}", x, y),
            Sub(x, y) => write!(f, "SUB {}, {}", x, y),
            ShiftRight(x) => write!(f, "SHR {}", x),
            SubN(x, y) => write!(f, "SUBN {}, {}", x, y),
            ShiftLeft(x) => write!(f, "SHL {}", x),
            SkipIfRegistersNotEqual(x, y) => write!(f, "SNE {}, {}", x, y),
            SetIndex(addr) => write!(f, "LD I, {}", addr),
            JumpWithOffset(addr) => write!(f, "JP V0, {}", addr),
            Random(x, kk) => write!(f, "RND {}, {}", x, kk),
            Draw(x, y, n) => write!(f, "DRW {}, {}, {}", x, y, n),
            SkipIfKeyPressed(x) => write!(f, "SKP {}", x),
            SkipIfKeyNotPressed(x) => write!(f, "SKNP {}", x),
            LoadDelayTimer(x) => write!(f, "LD {}, DT", x),
            WaitForKey(x) => write!(f, "LD {}, K", x),
            SetDelayTimer(x) => write!(f, "LD DT, {}", x),
            SetSoundTimer(x) => write!(f, "LD ST, {}", x),
            AddToIndex(x) => write!(f, "ADD I, {}", x),
            SetIndexToGlyph(x) => write!(f, "LD F, {}", x),
            StoreBcd(x) => write!(f, "LD B, {}", x),
            StoreRegisters(x) => write!(f, "LD [I], {}", x),
            ReadRegisters(x) => write!(f, "LD {}, [I]", x),
        }
    }
}

/// What to do with words that aren't instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownOpcodePolicy {
    /// Skip them silently.
    #[default]
    Ignore,
    /// Skip them, but log and remember each distinct word once.
    Record,
}

/// # Instruction Decoder
/// Turns raw words into calls on a [`ControlUnit`].
///
/// Unknown words are treated as no-ops so that ROMs relying on the machine
/// code call `0nnn` keep running.
#[derive(Debug, Default)]
pub struct InstructionDecoder {
    policy: UnknownOpcodePolicy,
    unknown: Vec<u16>,
}

impl InstructionDecoder {
    pub fn new(policy: UnknownOpcodePolicy) -> Self {
        InstructionDecoder {
            policy,
            unknown: Vec::new(),
        }
    }

    /// Decodes `op` and runs it against `unit`.
    ///
    /// Returns the decoded instruction, or `None` if the word was skipped.
    pub fn dispatch(
        &mut self,
        op: u16,
        unit: &mut dyn ControlUnit,
    ) -> Result<Option<Instruction>, Fault> {
        let instruction = Instruction::decode(op);
        match instruction {
            Some(instruction) => instruction.execute(unit)?,
            None if self.policy == UnknownOpcodePolicy::Record => {
                if !self.unknown.contains(&op) {
                    warn!("ignoring unknown opcode {:04X}", op);
                    self.unknown.push(op);
                }
            }
            None => {}
        }
        Ok(instruction)
    }

    /// Each distinct unknown word seen so far, in order of first sighting,
    /// when recording.
    pub fn unknown_opcodes(&self) -> &[u16] {
        &self.unknown
    }
}
