use rand::{Rng, RngCore};

use crate::constants::{GLYPH_STRIDE, INSTRUCTION_SIZE, REGISTER_COUNT};
use crate::error::Fault;
use crate::framebuffer::{byte_to_sprite, Framebuffer};
use crate::input::{InputLatch, KeyId};
use crate::memory::MemoryBank;
use crate::units::{Address, Byte, Column, Nibble, RegisterId, Row};

/// # Control Unit
/// One operation per instruction.
///
/// The program counter is advanced by 2 after every instruction regardless of
/// what it did, so operations that set it (jumps, calls, returns) aim 2 bytes
/// short of their target and skips add 2 on top of that advance.
///
/// Every operation can fault; the ones that touch memory or the stack fail
/// when a program walks off the end of either.
pub trait ControlUnit {
    /// clear the display
    fn clear_display(&mut self) -> Result<(), Fault>;

    /// PC = STACK[SP]; SP -= 1
    fn return_from_subroutine(&mut self) -> Result<(), Fault>;

    /// PC = addr
    fn jump(&mut self, addr: Address) -> Result<(), Fault>;

    /// SP += 1; STACK[SP] = PC; PC = addr
    fn call(&mut self, addr: Address) -> Result<(), Fault>;

    /// if Vx == kk then skip
    fn skip_if_equal(&mut self, x: RegisterId, kk: Byte) -> Result<(), Fault>;

    /// if Vx != kk then skip
    fn skip_if_not_equal(&mut self, x: RegisterId, kk: Byte) -> Result<(), Fault>;

    /// if Vx == Vy then skip
    fn skip_if_registers_equal(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault>;

    /// if Vx != Vy then skip
    fn skip_if_registers_not_equal(&mut self, x: RegisterId, y: RegisterId)
        -> Result<(), Fault>;

    /// Vx = kk
    fn load(&mut self, x: RegisterId, kk: Byte) -> Result<(), Fault>;

    /// Vx += kk, wrapping
    fn add(&mut self, x: RegisterId, kk: Byte) -> Result<(), Fault>;

    /// Vx = Vy
    fn copy_register(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault>;

    /// Vx |= Vy
    fn or(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault>;

    /// Vx &= Vy
    fn and(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault>;

    /// Vx ^= Vy
    fn xor(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault>;

    /// Vx += Vy; VF = carry
    fn add_registers(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault>;

    /// Vx = Vx - Vy; VF = !borrow
    fn sub(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault>;

    /// Vx = Vy - Vx; VF = !borrow
    fn subn(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault>;

    /// VF = lsb(Vx); Vx >>= 1
    fn shift_right(&mut self, x: RegisterId) -> Result<(), Fault>;

    /// VF = msb(Vx); Vx <<= 1
    fn shift_left(&mut self, x: RegisterId) -> Result<(), Fault>;

    /// I = addr
    fn set_index(&mut self, addr: Address) -> Result<(), Fault>;

    /// PC = addr + V0
    fn jump_with_offset(&mut self, addr: Address) -> Result<(), Fault>;

    /// Vx = random_byte & kk
    fn random(&mut self, x: RegisterId, kk: Byte) -> Result<(), Fault>;

    /// draw_sprite(x=Vx y=Vy size=n); VF = collision
    fn draw(&mut self, x: RegisterId, y: RegisterId, n: Nibble) -> Result<(), Fault>;

    /// if key(Vx).pressed then skip
    fn skip_if_key_pressed(&mut self, x: RegisterId) -> Result<(), Fault>;

    /// if !key(Vx).pressed then skip
    fn skip_if_key_not_pressed(&mut self, x: RegisterId) -> Result<(), Fault>;

    /// Vx = first pressed key, or run this instruction again
    fn wait_for_key(&mut self, x: RegisterId) -> Result<(), Fault>;

    /// Vx = DT
    fn load_delay_timer(&mut self, x: RegisterId) -> Result<(), Fault>;

    /// DT = Vx
    fn set_delay_timer(&mut self, x: RegisterId) -> Result<(), Fault>;

    /// ST = Vx
    fn set_sound_timer(&mut self, x: RegisterId) -> Result<(), Fault>;

    /// I += Vx
    fn add_to_index(&mut self, x: RegisterId) -> Result<(), Fault>;

    /// I = location of the glyph for Vx
    fn set_index_to_glyph(&mut self, x: RegisterId) -> Result<(), Fault>;

    /// mem[I..I+3] = bcd(Vx)
    fn store_bcd(&mut self, x: RegisterId) -> Result<(), Fault>;

    /// mem[I..=I+x] = V0..=Vx
    fn store_registers(&mut self, x: RegisterId) -> Result<(), Fault>;

    /// V0..=Vx = mem[I..=I+x]
    fn read_registers(&mut self, x: RegisterId) -> Result<(), Fault>;
}

/// The control unit of a running machine.
///
/// Borrows everything an instruction can touch for the length of one cycle.
pub struct Cpu<'a> {
    memory: &'a mut MemoryBank,
    display: &'a mut Framebuffer,
    input: &'a dyn InputLatch,
    rng: &'a mut dyn RngCore,
}

impl<'a> Cpu<'a> {
    pub fn new(
        memory: &'a mut MemoryBank,
        display: &'a mut Framebuffer,
        input: &'a dyn InputLatch,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        Cpu {
            memory,
            display,
            input,
            rng,
        }
    }

    fn v(&self, reg: RegisterId) -> u8 {
        self.memory.register(reg)
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.memory.pc = self.memory.pc.wrapping_add(INSTRUCTION_SIZE);
        }
    }

    /// Sets the PC so that the advance after this instruction lands on `target`.
    fn branch_to(&mut self, target: u16) {
        self.memory.pc = target.wrapping_sub(INSTRUCTION_SIZE);
    }

    fn key_pressed(&self, x: RegisterId) -> bool {
        KeyId::new(self.v(x)).map_or(false, |key| self.input.is_pressed(key))
    }

    /// VF is written before Vx, so when x is VF the result wins over the flag.
    fn set_with_flag(&mut self, x: RegisterId, result: u8, flag: bool) {
        self.memory.set_register(RegisterId::VF, u8::from(flag));
        self.memory.set_register(x, result);
    }
}

impl<'a> ControlUnit for Cpu<'a> {
    fn clear_display(&mut self) -> Result<(), Fault> {
        self.display.clear();
        Ok(())
    }

    fn return_from_subroutine(&mut self) -> Result<(), Fault> {
        let pc = self.memory.pc;
        let sp = self.memory.sp;
        if sp == 0 {
            return Err(Fault::StackUnderflow { pc });
        }
        let address = self
            .memory
            .stack
            .get(sp)
            .ok_or(Fault::StackUnderflow { pc })?;
        self.memory.pc = address;
        self.memory.sp = sp - 1;
        Ok(())
    }

    fn jump(&mut self, addr: Address) -> Result<(), Fault> {
        self.branch_to(addr.get());
        Ok(())
    }

    fn call(&mut self, addr: Address) -> Result<(), Fault> {
        let pc = self.memory.pc;
        let sp = self.memory.sp.wrapping_add(1);
        self.memory
            .stack
            .set(sp, pc)
            .ok_or(Fault::StackOverflow { pc })?;
        self.memory.sp = sp;
        self.branch_to(addr.get());
        Ok(())
    }

    fn skip_if_equal(&mut self, x: RegisterId, kk: Byte) -> Result<(), Fault> {
        self.skip_if(self.v(x) == kk.get());
        Ok(())
    }

    fn skip_if_not_equal(&mut self, x: RegisterId, kk: Byte) -> Result<(), Fault> {
        self.skip_if(self.v(x) != kk.get());
        Ok(())
    }

    fn skip_if_registers_equal(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault> {
        self.skip_if(self.v(x) == self.v(y));
        Ok(())
    }

    fn skip_if_registers_not_equal(
        &mut self,
        x: RegisterId,
        y: RegisterId,
    ) -> Result<(), Fault> {
        self.skip_if(self.v(x) != self.v(y));
        Ok(())
    }

    fn load(&mut self, x: RegisterId, kk: Byte) -> Result<(), Fault> {
        self.memory.set_register(x, kk.get());
        Ok(())
    }

    fn add(&mut self, x: RegisterId, kk: Byte) -> Result<(), Fault> {
        self.memory.set_register(x, self.v(x).wrapping_add(kk.get()));
        Ok(())
    }

    fn copy_register(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault> {
        self.memory.set_register(x, self.v(y));
        Ok(())
    }

    fn or(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault> {
        self.memory.set_register(x, self.v(x) | self.v(y));
        Ok(())
    }

    fn and(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault> {
        self.memory.set_register(x, self.v(x) & self.v(y));
        Ok(())
    }

    fn xor(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault> {
        self.memory.set_register(x, self.v(x) ^ self.v(y));
        Ok(())
    }

    fn add_registers(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault> {
        let (result, carry) = self.v(x).overflowing_add(self.v(y));
        self.set_with_flag(x, result, carry);
        Ok(())
    }

    fn sub(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault> {
        let (result, borrow) = self.v(x).overflowing_sub(self.v(y));
        self.set_with_flag(x, result, !borrow);
        Ok(())
    }

    fn subn(&mut self, x: RegisterId, y: RegisterId) -> Result<(), Fault> {
        let (result, borrow) = self.v(y).overflowing_sub(self.v(x));
        self.set_with_flag(x, result, !borrow);
        Ok(())
    }

    fn shift_right(&mut self, x: RegisterId) -> Result<(), Fault> {
        let value = self.v(x);
        self.set_with_flag(x, value >> 1, value & 0x01 != 0);
        Ok(())
    }

    fn shift_left(&mut self, x: RegisterId) -> Result<(), Fault> {
        let value = self.v(x);
        self.set_with_flag(x, value << 1, value & 0x80 != 0);
        Ok(())
    }

    fn set_index(&mut self, addr: Address) -> Result<(), Fault> {
        self.memory.i = addr.get();
        Ok(())
    }

    fn jump_with_offset(&mut self, addr: Address) -> Result<(), Fault> {
        let target = addr.get().wrapping_add(u16::from(self.v(RegisterId::V0)));
        self.branch_to(target);
        Ok(())
    }

    fn random(&mut self, x: RegisterId, kk: Byte) -> Result<(), Fault> {
        let random_byte: u8 = self.rng.gen();
        self.memory.set_register(x, random_byte & kk.get());
        Ok(())
    }

    fn draw(&mut self, x: RegisterId, y: RegisterId, n: Nibble) -> Result<(), Fault> {
        let col = Column(self.v(x) as usize);
        let top = self.v(y) as usize;
        let base = self.memory.i as usize;

        let mut collision = false;
        for offset in 0..n.get() as usize {
            let byte = self.memory.ram.read(base + offset)?;
            collision |= self
                .display
                .set_sprite(col, Row(top + offset), byte_to_sprite(byte));
        }

        self.memory.set_register(RegisterId::VF, u8::from(collision));
        Ok(())
    }

    fn skip_if_key_pressed(&mut self, x: RegisterId) -> Result<(), Fault> {
        self.skip_if(self.key_pressed(x));
        Ok(())
    }

    fn skip_if_key_not_pressed(&mut self, x: RegisterId) -> Result<(), Fault> {
        self.skip_if(!self.key_pressed(x));
        Ok(())
    }

    fn wait_for_key(&mut self, x: RegisterId) -> Result<(), Fault> {
        match KeyId::all().find(|&key| self.input.is_pressed(key)) {
            Some(key) => self.memory.set_register(x, key.index() as u8),
            None => self.memory.pc = self.memory.pc.wrapping_sub(INSTRUCTION_SIZE),
        }
        Ok(())
    }

    fn load_delay_timer(&mut self, x: RegisterId) -> Result<(), Fault> {
        self.memory.set_register(x, self.memory.delay_timer);
        Ok(())
    }

    fn set_delay_timer(&mut self, x: RegisterId) -> Result<(), Fault> {
        self.memory.delay_timer = self.v(x);
        Ok(())
    }

    fn set_sound_timer(&mut self, x: RegisterId) -> Result<(), Fault> {
        self.memory.sound_timer = self.v(x);
        Ok(())
    }

    fn add_to_index(&mut self, x: RegisterId) -> Result<(), Fault> {
        self.memory.i = self.memory.i.wrapping_add(u16::from(self.v(x)));
        Ok(())
    }

    fn set_index_to_glyph(&mut self, x: RegisterId) -> Result<(), Fault> {
        self.memory.i = GLYPH_STRIDE * u16::from(self.v(x));
        Ok(())
    }

    fn store_bcd(&mut self, x: RegisterId) -> Result<(), Fault> {
        let value = self.v(x);
        let digits = [value / 100, value / 10 % 10, value % 10];
        self.memory.ram.write_block(self.memory.i as usize, &digits)
    }

    fn store_registers(&mut self, x: RegisterId) -> Result<(), Fault> {
        let registers = *self.memory.registers();
        self.memory
            .ram
            .write_block(self.memory.i as usize, &registers[..=x.index()])
    }

    fn read_registers(&mut self, x: RegisterId) -> Result<(), Fault> {
        let base = self.memory.i as usize;
        let mut values = [0; REGISTER_COUNT];
        for reg in x.through() {
            values[reg.index()] = self.memory.ram.read(base + reg.index())?;
        }
        for reg in x.through() {
            self.memory.set_register(reg, values[reg.index()]);
        }
        Ok(())
    }
}
