use crate::constants::KEY_COUNT;

/// Whether a key on the pad is held down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    On,
    #[default]
    Off,
}

/// One of the sixteen logical keys 0..F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyId(u8);

impl KeyId {
    /// Returns `None` for anything outside 0x0..=0xF.
    pub fn new(value: u8) -> Option<Self> {
        if (value as usize) < KEY_COUNT {
            Some(KeyId(value))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Every key in ascending order.
    pub fn all() -> impl Iterator<Item = KeyId> {
        (0..KEY_COUNT as u8).map(KeyId)
    }
}

/// # Input Latch
/// Where the core reads the keypad from.
///
/// Implemented by whatever turns physical input into logical keys. `None`
/// means the adapter has no mapping for the key, which the core treats as
/// not pressed.
pub trait InputLatch {
    fn state(&self, key: KeyId) -> Option<KeyState>;

    fn is_pressed(&self, key: KeyId) -> bool {
        self.state(key) == Some(KeyState::On)
    }
}

/// # Keypad
/// The pressed status of each of the sixteen keys.
///
/// ```text
/// |1|2|3|C|
/// |4|5|6|D|
/// |7|8|9|E|
/// |A|0|B|F|
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Keypad {
    keys: [KeyState; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: KeyId) {
        self.keys[key.index()] = KeyState::On;
    }

    pub fn release(&mut self, key: KeyId) {
        self.keys[key.index()] = KeyState::Off;
    }

    pub fn set(&mut self, key: KeyId, state: KeyState) {
        self.keys[key.index()] = state;
    }

    /// Replaces the state of every key at once.
    pub fn update(&mut self, keys: [KeyState; KEY_COUNT]) {
        self.keys = keys;
    }
}

impl InputLatch for Keypad {
    fn state(&self, key: KeyId) -> Option<KeyState> {
        self.keys.get(key.index()).copied()
    }
}
