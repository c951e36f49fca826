//! On-chip EEPROM behind `embedded-storage`

use avr_device::atmega128a::EEPROM;
use embedded_storage::{ReadStorage, Storage};

pub const EEPROM_SIZE: usize = 4096;

// EECR
const EERE: u8 = 1 << 0;
const EEWE: u8 = 1 << 1;
const EEMWE: u8 = 1 << 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EepromError {
    OutOfRange,
}

pub struct Eeprom {
    _private: (),
}

impl Eeprom {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn check(offset: u32, len: usize) -> Result<u16, EepromError> {
        let end = offset as usize + len;
        if end > EEPROM_SIZE {
            return Err(EepromError::OutOfRange);
        }
        Ok(offset as u16)
    }

    fn wait_ready() {
        unsafe { while (*EEPROM::ptr()).eecr.read().bits() & EEWE != 0 {} }
    }

    fn read_byte(address: u16) -> u8 {
        Self::wait_ready();
        unsafe {
            let p = EEPROM::ptr();
            (*p).eear.write(|w| w.bits(address));
            (*p).eecr.write(|w| w.bits(EERE));
            (*p).eedr.read().bits()
        }
    }

    fn write_byte(address: u16, value: u8) {
        Self::wait_ready();
        avr_device::interrupt::free(|_| unsafe {
            let p = EEPROM::ptr();
            (*p).eear.write(|w| w.bits(address));
            (*p).eedr.write(|w| w.bits(value));
            // EEWE must follow EEMWE within four cycles
            (*p).eecr.write(|w| w.bits(EEMWE));
            (*p).eecr.write(|w| w.bits(EEMWE | EEWE));
        });
    }
}

impl Default for Eeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadStorage for Eeprom {
    type Error = EepromError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let base = Self::check(offset, bytes.len())?;
        for (address, byte) in (base..).zip(bytes.iter_mut()) {
            *byte = Self::read_byte(address);
        }
        Ok(())
    }

    fn capacity(&self) -> usize {
        EEPROM_SIZE
    }
}

impl Storage for Eeprom {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let base = Self::check(offset, bytes.len())?;
        for (address, &byte) in (base..).zip(bytes.iter()) {
            Self::write_byte(address, byte);
        }
        Ok(())
    }
}
