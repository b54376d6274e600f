use sdl2::keyboard::Keycode;

use chip8_core::KeyId;

/// # Keymap
/// Chip-8 input is generated with a hexadecimal keypad.
///
/// That layout is mapped onto the left 4 columns of a QWERTY keyboard.
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  ->  |Q|W|E|R|
/// |7|8|9|E|  ->  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
pub fn keymap(key: Keycode) -> Option<KeyId> {
    let id = match key {
        Keycode::X => 0x0,
        Keycode::Num1 => 0x1,
        Keycode::Num2 => 0x2,
        Keycode::Num3 => 0x3,
        Keycode::Q => 0x4,
        Keycode::W => 0x5,
        Keycode::E => 0x6,
        Keycode::A => 0x7,
        Keycode::S => 0x8,
        Keycode::D => 0x9,
        Keycode::Z => 0xA,
        Keycode::C => 0xB,
        Keycode::Num4 => 0xC,
        Keycode::R => 0xD,
        Keycode::F => 0xE,
        Keycode::V => 0xF,
        _ => return None,
    };
    KeyId::new(id)
}

#[cfg(test)]
mod test_keymap {
    use super::*;

    #[test]
    fn test_corners() {
        assert_eq!(keymap(Keycode::Num1), KeyId::new(0x1));
        assert_eq!(keymap(Keycode::Num4), KeyId::new(0xC));
        assert_eq!(keymap(Keycode::Z), KeyId::new(0xA));
        assert_eq!(keymap(Keycode::V), KeyId::new(0xF));
    }

    #[test]
    fn test_unmapped() {
        assert_eq!(keymap(Keycode::Space), None);
        assert_eq!(keymap(Keycode::Escape), None);
    }
}
