use log::{debug, error, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::clock::{self, Clock, TimeSource};
use crate::constants::{CPU_FREQUENCY, INSTRUCTION_SIZE, PROGRAM_START, TIMER_FREQUENCY};
use crate::control_unit::Cpu;
use crate::error::{Fault, SetupError};
use crate::framebuffer::{Framebuffer, Pixels};
use crate::input::{InputLatch, Keypad};
use crate::instruction::{InstructionDecoder, UnknownOpcodePolicy};
use crate::memory::MemoryBank;

/// Tunables for an [`Emulator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmulatorConfig {
    /// Instructions executed per second.
    pub cpu_frequency: f64,
    /// Delay and sound timer decrements per second.
    pub timer_frequency: f64,
    /// Seed for the random opcode; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub unknown_opcodes: UnknownOpcodePolicy,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            cpu_frequency: CPU_FREQUENCY,
            timer_frequency: TIMER_FREQUENCY,
            seed: None,
            unknown_opcodes: UnknownOpcodePolicy::Ignore,
        }
    }
}

/// Everything the clock's tasks run against.
struct Machine<I> {
    memory: MemoryBank,
    display: Framebuffer,
    input: I,
    decoder: InstructionDecoder,
    rng: StdRng,
}

impl<I: InputLatch> Machine<I> {
    /// Fetches, decodes and executes one instruction, then advances the PC.
    fn cycle(&mut self) -> Result<(), Fault> {
        let pc = self.memory.pc;
        let op = self.memory.ram.read_word(pc as usize)?;

        let mut cpu = Cpu::new(
            &mut self.memory,
            &mut self.display,
            &self.input,
            &mut self.rng,
        );
        match self.decoder.dispatch(op, &mut cpu) {
            Ok(Some(instruction)) => trace!("{:#05X}  {:04X}  {}", pc, op, instruction),
            Ok(None) => trace!("{:#05X}  {:04X}  (skipped)", pc, op),
            Err(fault) => {
                error!("halted at {:#05X} executing {:04X}: {}", pc, op, fault);
                return Err(fault);
            }
        }

        self.memory.pc = self.memory.pc.wrapping_add(INSTRUCTION_SIZE);
        Ok(())
    }

    fn decrement_timers(&mut self) {
        self.memory.delay_timer = self.memory.delay_timer.saturating_sub(1);
        self.memory.sound_timer = self.memory.sound_timer.saturating_sub(1);
    }
}

/// # Emulator
/// A Chip-8 machine driven by its own clock.
///
/// Owns:
///  - the `MemoryBank` and `Framebuffer` the program runs against
///  - the input latch the program reads keys from
///  - a `Clock` with two tasks: one instruction per CPU period, then one timer
///    decrement per timer period
///
/// The host calls `update` in a loop and renders whenever `take_frame`
/// returns a frame. The first fault halts the machine for good.
pub struct Emulator<I = Keypad> {
    machine: Machine<I>,
    clock: Clock<Machine<I>, Fault>,
    fault: Option<Fault>,
}

impl<I: InputLatch + 'static> Emulator<I> {
    /// Builds an emulator paced by the system's monotonic clock.
    pub fn new(rom: &[u8], input: I, config: EmulatorConfig) -> Result<Self, SetupError> {
        Self::with_time_source(rom, input, config, clock::monotonic())
    }

    /// Builds an emulator paced by `now`.
    ///
    /// # Arguments
    /// * `rom` program bytes, copied to `PROGRAM_START`
    /// * `input` where key presses are read from
    /// * `config` frequencies, seeding and unknown opcode handling
    /// * `now` a monotonic timestamp source
    pub fn with_time_source(
        rom: &[u8],
        input: I,
        config: EmulatorConfig,
        now: TimeSource,
    ) -> Result<Self, SetupError> {
        let mut memory = MemoryBank::new();
        memory.load_font();
        memory.load_program(rom)?;
        memory.pc = PROGRAM_START;
        memory.sp = 0;
        memory.delay_timer = 0;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut clock: Clock<Machine<I>, Fault> = Clock::new(now);
        clock.register(
            Box::new(|machine: &mut Machine<I>| machine.cycle()),
            config.cpu_frequency,
        )?;
        clock.register(
            Box::new(|machine: &mut Machine<I>| {
                machine.decrement_timers();
                Ok(())
            }),
            config.timer_frequency,
        )?;
        debug!(
            "emulator ready: cpu {} Hz, timers {} Hz",
            config.cpu_frequency, config.timer_frequency
        );

        Ok(Emulator {
            machine: Machine {
                memory,
                display: Framebuffer::new(),
                input,
                decoder: InstructionDecoder::new(config.unknown_opcodes),
                rng,
            },
            clock,
            fault: None,
        })
    }
}

impl<I: InputLatch> Emulator<I> {
    /// Runs whichever tasks are due.
    ///
    /// Once the machine has faulted this does nothing but return that fault.
    pub fn update(&mut self) -> Result<(), Fault> {
        self.halted()?;
        let result = self.clock.tick(&mut self.machine);
        self.record(result)
    }

    /// Runs exactly one instruction, ignoring the clock.
    pub fn step(&mut self) -> Result<(), Fault> {
        self.halted()?;
        let result = self.machine.cycle();
        self.record(result)
    }

    /// Decrements both timers once, ignoring the clock.
    pub fn tick_timers(&mut self) {
        self.machine.decrement_timers();
    }

    fn halted(&self) -> Result<(), Fault> {
        match &self.fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }

    fn record(&mut self, result: Result<(), Fault>) -> Result<(), Fault> {
        if let Err(fault) = &result {
            self.fault = Some(fault.clone());
        }
        result
    }

    /// The fault that halted the machine, if any.
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    pub fn memory(&self) -> &MemoryBank {
        &self.machine.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryBank {
        &mut self.machine.memory
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.machine.display
    }

    /// Returns the pixels if anything changed since the last call.
    pub fn take_frame(&mut self) -> Option<&Pixels> {
        if self.machine.display.take_dirty() {
            Some(self.machine.display.pixels())
        } else {
            None
        }
    }

    pub fn input(&self) -> &I {
        &self.machine.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.machine.input
    }

    /// Whether a beeper should be sounding.
    pub fn sound_active(&self) -> bool {
        self.machine.memory.sound_timer > 0
    }

    /// Distinct words skipped so far under [`UnknownOpcodePolicy::Record`].
    pub fn unknown_opcodes(&self) -> &[u16] {
        self.machine.decoder.unknown_opcodes()
    }
}

#[cfg(test)]
mod test_emulator {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::input::KeyId;
    use crate::units::RegisterId;

    fn seeded() -> EmulatorConfig {
        EmulatorConfig {
            seed: Some(7),
            ..EmulatorConfig::default()
        }
    }

    fn emulator(rom: &[u8]) -> Emulator {
        Emulator::new(rom, Keypad::new(), seeded()).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = EmulatorConfig::default();
        assert_eq!(config.cpu_frequency, 600.0);
        assert_eq!(config.timer_frequency, 60.0);
        assert_eq!(config.seed, None);
        assert_eq!(config.unknown_opcodes, UnknownOpcodePolicy::Ignore);
    }

    #[test]
    fn test_construction_loads_font_and_rom() {
        let emu = emulator(&[0x60, 0x2A]);
        let ram = emu.memory().ram.as_slice();
        assert_eq!(ram[0..5], [0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(ram[0x200..0x202], [0x60, 0x2A]);
        assert_eq!(emu.memory().pc, 0x200);
        assert_eq!(emu.memory().sp, 0);
        assert_eq!(emu.memory().delay_timer, 0);
    }

    #[test]
    fn test_construction_rejects_oversized_rom() {
        let rom = vec![0; 3585];
        assert!(matches!(
            Emulator::new(&rom, Keypad::new(), seeded()),
            Err(SetupError::Load(_))
        ));
    }

    #[test]
    fn test_construction_rejects_bad_frequency() {
        let config = EmulatorConfig {
            cpu_frequency: -1.0,
            ..seeded()
        };
        assert!(matches!(
            Emulator::new(&[], Keypad::new(), config),
            Err(SetupError::Clock(_))
        ));
    }

    #[test]
    fn test_step_executes_and_advances() {
        let mut emu = emulator(&[0x60, 0x2A, 0x71, 0x01]);
        emu.step().unwrap();
        emu.step().unwrap();
        assert_eq!(emu.memory().register(RegisterId::V0), 0x2A);
        assert_eq!(emu.memory().register(RegisterId::from_nibble(1)), 0x01);
        assert_eq!(emu.memory().pc, 0x204);
    }

    #[test]
    fn test_unknown_opcode_still_advances() {
        let config = EmulatorConfig {
            unknown_opcodes: UnknownOpcodePolicy::Record,
            ..seeded()
        };
        let mut emu = Emulator::new(&[0x01, 0x23], Keypad::new(), config).unwrap();
        emu.step().unwrap();
        assert_eq!(emu.memory().pc, 0x202);
        assert_eq!(emu.unknown_opcodes(), &[0x0123]);
    }

    #[test]
    fn test_looping_unknown_opcode_is_recorded_once() {
        let config = EmulatorConfig {
            unknown_opcodes: UnknownOpcodePolicy::Record,
            ..seeded()
        };
        // 0x0123; JP 0x200
        let mut emu = Emulator::new(&[0x01, 0x23, 0x12, 0x00], Keypad::new(), config).unwrap();
        for _ in 0..20_000 {
            emu.step().unwrap();
        }
        assert_eq!(emu.memory().pc, 0x200);
        assert_eq!(emu.unknown_opcodes(), &[0x0123]);
    }

    #[test]
    fn test_fault_halts_for_good() {
        // RET with an empty stack
        let mut emu = emulator(&[0x00, 0xEE, 0x60, 0x01]);
        let fault = Fault::StackUnderflow { pc: 0x200 };
        assert_eq!(emu.step(), Err(fault.clone()));
        assert_eq!(emu.step(), Err(fault.clone()));
        assert_eq!(emu.update(), Err(fault.clone()));
        assert_eq!(emu.fault(), Some(&fault));
        assert_eq!(emu.memory().pc, 0x200);
        assert_eq!(emu.memory().register(RegisterId::V0), 0);
    }

    #[test]
    fn test_fetch_past_end_of_memory_faults() {
        let mut emu = emulator(&[0x1F, 0xFF]);
        emu.step().unwrap();
        assert_eq!(emu.memory().pc, 0xFFF);
        assert_eq!(
            emu.step(),
            Err(Fault::MemoryOutOfBounds { address: 0x1000 })
        );
    }

    #[test]
    fn test_tick_timers() {
        let mut emu = emulator(&[]);
        emu.memory_mut().delay_timer = 2;
        emu.memory_mut().sound_timer = 1;
        assert!(emu.sound_active());
        emu.tick_timers();
        assert_eq!(emu.memory().delay_timer, 1);
        assert!(!emu.sound_active());
        emu.tick_timers();
        emu.tick_timers();
        assert_eq!(emu.memory().delay_timer, 0);
        assert_eq!(emu.memory().sound_timer, 0);
    }

    #[test]
    fn test_take_frame_only_after_change() {
        // CLS
        let mut emu = emulator(&[0x00, 0xE0]);
        assert!(emu.take_frame().is_none());
        emu.step().unwrap();
        assert!(emu.take_frame().is_some());
        assert!(emu.take_frame().is_none());
    }

    #[test]
    fn test_input_mut_reaches_the_program() {
        // SKP V0; LD V1, 0x01; LD V2, 0x02
        let mut emu = emulator(&[0xE0, 0x9E, 0x61, 0x01, 0x62, 0x02]);
        emu.input_mut().press(KeyId::new(0x0).unwrap());
        emu.step().unwrap();
        assert_eq!(emu.memory().pc, 0x204);
    }

    #[test]
    fn test_update_follows_the_clock() {
        let time = Rc::new(Cell::new(Duration::ZERO));
        let source = Rc::clone(&time);
        // LD V0, 0x01; LD V1, 0x02
        let mut emu = Emulator::with_time_source(
            &[0x60, 0x01, 0x61, 0x02],
            Keypad::new(),
            seeded(),
            Box::new(move || source.get()),
        )
        .unwrap();

        emu.update().unwrap();
        assert_eq!(emu.memory().pc, 0x200);

        time.set(Duration::from_millis(2));
        emu.update().unwrap();
        assert_eq!(emu.memory().pc, 0x202);
    }
}
