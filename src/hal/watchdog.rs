use avr_device::atmega128a::WDT;
use embedded_hal::watchdog;

#[derive(Clone, Copy)]
#[repr(u8)]
pub enum WatchdogTimeout {
    Ms16 = 0,
    Ms32 = 1,
    Ms64 = 2,
    Ms125 = 3,
    Ms250 = 4,
    Ms500 = 5,
    Ms1000 = 6,
    Ms2000 = 7,
}

impl WatchdogTimeout {
    /// Shortest timeout of at least `ms`, capped at the longest one
    pub const fn from_millis(ms: u16) -> Self {
        match ms {
            0..=16 => Self::Ms16,
            17..=32 => Self::Ms32,
            33..=64 => Self::Ms64,
            65..=125 => Self::Ms125,
            126..=250 => Self::Ms250,
            251..=500 => Self::Ms500,
            501..=1000 => Self::Ms1000,
            _ => Self::Ms2000,
        }
    }
}

pub struct Watchdog {
    _private: (),
}

impl Watchdog {
    #[inline]
    pub fn new() -> Self {
        Self { _private: () }
    }

    #[inline]
    pub fn start(&mut self, timeout: WatchdogTimeout) {
        unsafe {
            let p = WDT::ptr();
            // Enable change bit and system reset mode
            (*p).wdtcr.write(|w| w.bits(0x18));
            // Set timeout and enable watchdog
            (*p).wdtcr.write(|w| w.bits(0x08 | timeout as u8));
        }
    }

    #[inline]
    pub fn feed(&mut self) {
        avr_device::asm::wdr();
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl watchdog::Watchdog for Watchdog {
    fn feed(&mut self) {
        Watchdog::feed(self);
    }
}
