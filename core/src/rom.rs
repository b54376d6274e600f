use std::io::Read;

use crate::constants::MAX_ROM_SIZE;
use crate::error::LoadError;

/// Reads a whole ROM from `reader`.
///
/// Reading stops one byte past the space available above the program start,
/// so an oversized stream is rejected without being buffered in full. The
/// reported size is then a lower bound.
///
/// # Arguments
/// * `reader` a source of ROM bytes, e.g. an open file
pub fn read_rom(reader: &mut impl Read) -> Result<Vec<u8>, LoadError> {
    let mut rom = Vec::with_capacity(MAX_ROM_SIZE);
    reader.take(MAX_ROM_SIZE as u64 + 1).read_to_end(&mut rom)?;
    if rom.len() > MAX_ROM_SIZE {
        return Err(LoadError::RomTooLarge {
            size: rom.len(),
            max_size: MAX_ROM_SIZE,
        });
    }
    Ok(rom)
}

#[cfg(test)]
mod test_rom {
    use std::io::{self, Cursor};

    use super::*;

    #[test]
    fn test_read_rom() {
        let mut reader = Cursor::new(vec![0x00, 0xE0, 0x12, 0x00]);
        assert_eq!(read_rom(&mut reader).unwrap(), vec![0x00, 0xE0, 0x12, 0x00]);
    }

    #[test]
    fn test_read_empty_rom() {
        let mut reader = Cursor::new(Vec::new());
        assert!(read_rom(&mut reader).unwrap().is_empty());
    }

    #[test]
    fn test_read_largest_rom() {
        let mut reader = Cursor::new(vec![0xAA; MAX_ROM_SIZE]);
        assert_eq!(read_rom(&mut reader).unwrap().len(), MAX_ROM_SIZE);
    }

    #[test]
    fn test_read_oversized_rom() {
        let mut reader = Cursor::new(vec![0xAA; MAX_ROM_SIZE * 2]);
        match read_rom(&mut reader) {
            Err(LoadError::RomTooLarge { size, max_size }) => {
                assert_eq!(size, MAX_ROM_SIZE + 1);
                assert_eq!(max_size, MAX_ROM_SIZE);
            }
            other => panic!("expected RomTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_read_error_is_reported() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "unplugged"))
            }
        }
        assert!(matches!(read_rom(&mut Broken), Err(LoadError::Io(_))));
    }
}
