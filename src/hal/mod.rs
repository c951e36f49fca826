pub mod adc;
pub mod bus;
pub mod display;
pub mod eeprom;
pub mod gpio;
pub mod pwm;
pub mod timer;
pub mod uart;
pub mod watchdog;

// Re-export commonly used types
pub use adc::{Adc, TouchPads};
pub use bus::{ClockBus, ThermometerBus};
pub use display::SegmentDisplay;
pub use eeprom::Eeprom;
pub use gpio::board;
pub use gpio::{Flex, Input, Output, Pin};
pub use pwm::FadeOutput;
pub use timer::BusyDelay;
pub use uart::Uart;
pub use watchdog::{Watchdog, WatchdogTimeout};
