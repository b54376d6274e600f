use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use chip8_core::constants::{MAX_ROM_SIZE, PROGRAM_START};
use chip8_core::{
    Address, Clock, Column, ControlUnit, Cpu, Framebuffer, Keypad, MemoryBank, Nibble,
    RegisterId, Row,
};

/// Runs `op` on a fresh machine where Vx = `a` and Vy = `b`, returning (Vx, VF).
fn arithmetic(a: u8, b: u8, op: impl FnOnce(&mut Cpu, RegisterId, RegisterId)) -> (u8, u8) {
    let (x, y) = (RegisterId::from_nibble(0x1), RegisterId::from_nibble(0x2));
    let mut memory = MemoryBank::new();
    let mut display = Framebuffer::new();
    let keypad = Keypad::new();
    let mut rng = StdRng::seed_from_u64(0);
    memory.set_register(x, a);
    memory.set_register(y, b);
    op(
        &mut Cpu::new(&mut memory, &mut display, &keypad, &mut rng),
        x,
        y,
    );
    (memory.register(x), memory.register(RegisterId::VF))
}

proptest! {
    #[test]
    fn test_set_pixel_twice_restores(
        col in 0usize..256,
        row in 0usize..32,
        initial in 0u8..=1,
        value in 0u8..=1,
    ) {
        let mut fb = Framebuffer::new();
        fb.set_pixel(Column(col), Row(row), initial);
        let before = fb.pixel(Column(col), Row(row));

        fb.set_pixel(Column(col), Row(row), value);
        let changed = fb.set_pixel(Column(col), Row(row), value);

        prop_assert_eq!(fb.pixel(Column(col), Row(row)), before);
        prop_assert_eq!(changed, value != 0);
    }

    #[test]
    fn test_draw_flag_means_something_changed(
        lit in proptest::collection::vec((0usize..64, 0usize..32), 0..64),
        sprite in proptest::collection::vec(any::<u8>(), 1..16),
        vx in any::<u8>(),
        vy in any::<u8>(),
    ) {
        let mut memory = MemoryBank::new();
        let mut display = Framebuffer::new();
        let keypad = Keypad::new();
        let mut rng = StdRng::seed_from_u64(0);
        for (col, row) in lit {
            display.set_pixel(Column(col), Row(row), 1);
        }
        let before = *display.pixels();

        memory.i = 0x300;
        memory.ram.write_block(0x300, &sprite).unwrap();
        memory.set_register(RegisterId::from_nibble(0x1), vx);
        memory.set_register(RegisterId::from_nibble(0x2), vy);
        Cpu::new(&mut memory, &mut display, &keypad, &mut rng)
            .draw(
                RegisterId::from_nibble(0x1),
                RegisterId::from_nibble(0x2),
                Nibble::new(sprite.len() as u8),
            )
            .unwrap();

        let changed = before != *display.pixels();
        prop_assert_eq!(memory.register(RegisterId::VF), u8::from(changed));
    }

    #[test]
    fn test_add_registers_carry(a in any::<u8>(), b in any::<u8>()) {
        let (result, flag) = arithmetic(a, b, |cpu, x, y| cpu.add_registers(x, y).unwrap());
        prop_assert_eq!(result, a.wrapping_add(b));
        prop_assert_eq!(flag, u8::from(u16::from(a) + u16::from(b) > 255));
    }

    #[test]
    fn test_sub_borrow(a in any::<u8>(), b in any::<u8>()) {
        let (result, flag) = arithmetic(a, b, |cpu, x, y| cpu.sub(x, y).unwrap());
        prop_assert_eq!(result, a.wrapping_sub(b));
        prop_assert_eq!(flag, u8::from(a >= b));
    }

    #[test]
    fn test_subn_borrow(a in any::<u8>(), b in any::<u8>()) {
        let (result, flag) = arithmetic(a, b, |cpu, x, y| cpu.subn(x, y).unwrap());
        prop_assert_eq!(result, b.wrapping_sub(a));
        prop_assert_eq!(flag, u8::from(b >= a));
    }

    #[test]
    fn test_rom_lands_at_program_start(
        rom in proptest::collection::vec(any::<u8>(), 0..=MAX_ROM_SIZE),
    ) {
        let mut memory = MemoryBank::new();
        memory.load_program(&rom).unwrap();
        let start = PROGRAM_START as usize;
        prop_assert_eq!(&memory.ram.as_slice()[start..start + rom.len()], &rom[..]);
    }

    #[test]
    fn test_clock_fires_at_most_once_per_tick(
        frequency in 1.0f64..1e6,
        steps in proptest::collection::vec(0u64..5_000_000_000, 1..32),
    ) {
        let time = Rc::new(Cell::new(Duration::ZERO));
        let source = Rc::clone(&time);
        let mut clock: Clock<u32, ()> = Clock::new(Box::new(move || source.get()));
        clock
            .register(
                Box::new(|count: &mut u32| {
                    *count += 1;
                    Ok(())
                }),
                frequency,
            )
            .unwrap();

        for step in steps {
            time.set(time.get() + Duration::from_nanos(step));
            let mut count = 0;
            clock.tick(&mut count).unwrap();
            prop_assert!(count <= 1);
        }
    }

    #[test]
    fn test_jump_lands_on_target(target in 0u16..0x1000) {
        let mut memory = MemoryBank::new();
        let mut display = Framebuffer::new();
        let keypad = Keypad::new();
        let mut rng = StdRng::seed_from_u64(0);
        Cpu::new(&mut memory, &mut display, &keypad, &mut rng)
            .jump(Address::new(target))
            .unwrap();
        prop_assert_eq!(memory.pc.wrapping_add(2), target);
    }
}
