use avr_device::atmega128a::{PORTA, PORTB, PORTC, PORTD, PORTE, PORTF};
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::{InputPin, OutputPin};

pub trait PinMode {}
pub struct Input;
pub struct Output;
/// Switched between driving low and floating, for open-drain style buses
pub struct Flex;
impl PinMode for Input {}
impl PinMode for Output {}
impl PinMode for Flex {}

#[derive(Debug)]
pub struct Pin<PORT, const PIN: u8, MODE> {
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

impl<PORT, const P: u8> Pin<PORT, P, Input> {
    /// The pin after reset
    ///
    /// # Safety
    /// The caller hands out each pin at most once.
    pub unsafe fn steal() -> Self {
        Pin {
            _port: PhantomData,
            _mode: PhantomData,
        }
    }
}

macro_rules! impl_port {
    ($PORT:ident, $port:ident, $ddr:ident, $pin:ident) => {
        impl<const P: u8, MODE: PinMode> Pin<$PORT, P, MODE> {
            pub fn into_output(self) -> Pin<$PORT, P, Output> {
                // Set DDRx bit
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }

            pub fn into_input(self) -> Pin<$PORT, P, Input> {
                // Clear DDRx bit and disable pull-up
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }

            /// Released (input, no pull-up) with the output latch held low
            pub fn into_flex(self) -> Pin<$PORT, P, Flex> {
                let pin = self.into_input();
                Pin {
                    _port: pin._port,
                    _mode: PhantomData,
                }
            }

            #[inline]
            pub fn is_high(&self) -> bool {
                unsafe { ((*$PORT::ptr()).$pin.read().bits() & (1 << P)) != 0 }
            }
        }

        impl<const P: u8> OutputPin for Pin<$PORT, P, Output> {
            type Error = Infallible;

            #[inline]
            fn set_high(&mut self) -> Result<(), Self::Error> {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Ok(())
            }

            #[inline]
            fn set_low(&mut self) -> Result<(), Self::Error> {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                }
                Ok(())
            }
        }

        impl<const P: u8> InputPin for Pin<$PORT, P, Input> {
            type Error = Infallible;

            #[inline]
            fn is_high(&self) -> Result<bool, Self::Error> {
                Ok(Pin::is_high(self))
            }

            #[inline]
            fn is_low(&self) -> Result<bool, Self::Error> {
                Ok(!Pin::is_high(self))
            }
        }

        impl<const P: u8> Pin<$PORT, P, Flex> {
            /// Pull the line low
            #[inline]
            pub fn drive_low(&mut self) {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
            }

            #[inline]
            pub fn drive_high(&mut self) {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | (1 << P)));
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
            }

            /// Stop driving; the pull-up stays on if the line was last driven high
            #[inline]
            pub fn release(&mut self) {
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                }
            }
        }
    };
}

impl_port!(PORTA, porta, ddra, pina);
impl_port!(PORTB, portb, ddrb, pinb);
impl_port!(PORTC, portc, ddrc, pinc);
impl_port!(PORTD, portd, ddrd, pind);
impl_port!(PORTE, porte, ddre, pine);
impl_port!(PORTF, portf, ddrf, pinf);

// Aquarium board wiring
pub mod board {
    use super::*;

    pub type Heater = Pin<PORTC, 5, Output>;
    pub type LightPwm = Pin<PORTB, 5, Output>;

    pub type RtcEnable = Pin<PORTD, 5, Output>;
    pub type RtcClock = Pin<PORTD, 6, Output>;
    pub type RtcData = Pin<PORTD, 7, Flex>;

    pub type ThermometerPower = Pin<PORTE, 2, Output>;
    pub type ThermometerData = Pin<PORTE, 3, Flex>;

    pub struct Pins {
        pub heater: Heater,
        pub light: LightPwm,
        pub rtc_enable: RtcEnable,
        pub rtc_clock: RtcClock,
        pub rtc_data: RtcData,
        pub thermometer_power: ThermometerPower,
        pub thermometer_data: ThermometerData,
    }

    impl Pins {
        /// Takes the ports the board pins live on
        pub fn new(_portb: PORTB, _portc: PORTC, _portd: PORTD, _porte: PORTE) -> Self {
            // Owning the ports makes each pin unique
            unsafe {
                Self {
                    heater: Pin::<PORTC, 5, Input>::steal().into_output(),
                    light: Pin::<PORTB, 5, Input>::steal().into_output(),
                    rtc_enable: Pin::<PORTD, 5, Input>::steal().into_output(),
                    rtc_clock: Pin::<PORTD, 6, Input>::steal().into_output(),
                    rtc_data: Pin::<PORTD, 7, Input>::steal().into_flex(),
                    thermometer_power: Pin::<PORTE, 2, Input>::steal().into_output(),
                    thermometer_data: Pin::<PORTE, 3, Input>::steal().into_flex(),
                }
            }
        }
    }
}
