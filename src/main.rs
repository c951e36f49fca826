#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use avr_device::atmega128a::Peripherals as Device;
    use log::{info, warn};

    use aquarium_firmware::config::WDT_TIMEOUT_MS;
    use aquarium_firmware::drivers::{Ds1302, Ds18b20, FadeEngine};
    use aquarium_firmware::hal::{
        board, Adc, BusyDelay, ClockBus, Eeprom, FadeOutput, SegmentDisplay, ThermometerBus,
        TouchPads, Uart, Watchdog, WatchdogTimeout,
    };
    use aquarium_firmware::{Aquarium, Board, Peripherals, Scheduler};

    struct AvrBoard;

    impl Board for AvrBoard {
        type Rtc = Ds1302<ClockBus>;
        type Thermometer = Ds18b20<ThermometerBus, board::ThermometerPower, BusyDelay>;
        type Touch = TouchPads;
        type Display = SegmentDisplay;
        type HeaterPin = board::Heater;
        type FadeHardware = FadeOutput;
        type Storage = Eeprom;
        type Delay = BusyDelay;
    }

    static FADE: FadeEngine = FadeEngine::new();

    #[avr_device::interrupt(atmega128a)]
    fn TIMER0_OVF() {
        // Timer0 and Timer1 were configured before interrupts came on
        let mut hardware = unsafe { FadeOutput::steal() };
        FADE.step(&mut hardware);
    }

    #[avr_device::entry]
    fn main() -> ! {
        let mut watchdog = Watchdog::new();
        watchdog.start(WatchdogTimeout::from_millis(WDT_TIMEOUT_MS));

        let Some(dp) = Device::take() else {
            // Second entry, let the watchdog reset us
            loop {}
        };
        let pins = board::Pins::new(dp.PORTB, dp.PORTC, dp.PORTD, dp.PORTE);

        let peripherals = Peripherals::<AvrBoard> {
            rtc: Ds1302::new(ClockBus::new(pins.rtc_enable, pins.rtc_clock, pins.rtc_data)),
            thermometer: Ds18b20::new(
                ThermometerBus::new(pins.thermometer_data),
                pins.thermometer_power,
                BusyDelay,
            ),
            touch: TouchPads::new(Adc::new()),
            display: SegmentDisplay::new(dp.PORTA, dp.PORTG),
            heater: pins.heater,
            fade: FadeOutput::new(pins.light),
            storage: Eeprom::new(),
            delay: BusyDelay,
        };

        let aquarium = match Aquarium::new(&FADE, peripherals) {
            Ok(aquarium) => aquarium,
            Err(err) => {
                warn!("settings store unusable: {}", err);
                loop {}
            }
        };

        // Enable interrupts globally
        unsafe { avr_device::interrupt::enable() };
        info!("aquarium controller v{}", env!("CARGO_PKG_VERSION"));

        Scheduler::new(aquarium, Uart::new(), watchdog).run()
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
