//! Configuration constants for the aquarium controller firmware

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// Watchdog timeout period in milliseconds
pub const WDT_TIMEOUT_MS: u16 = 2000;

/// Scheduler counter modulus, one full wrap is a scheduler cycle
pub const SCHEDULER_MODULUS: u16 = 5000;

/// The time task runs whenever the counter is a multiple of this
pub const TIME_TASK_PERIOD: u16 = 1000;

/// Counter offsets of the once-per-cycle tasks
pub const SENSOR_TASK_OFFSET: u16 = 250;
pub const HEAT_TASK_OFFSET: u16 = 2500;
pub const LIGHT_TASK_OFFSET: u16 = 0;

/// Capacity of the serial command line buffer
pub const LINE_BUFFER_SIZE: usize = 32;

/// Touch sensor settle time before re-sampling a rising edge
pub const TOUCH_SETTLE_MS: u8 = 20;

/// Scheduler cycles an "On"/"OFF"/"Auto" message stays on the display
pub const MESSAGE_HOLD_CYCLES: u8 = 2;

/// Heater never runs above this temperature, whatever the mode
pub const HEAT_SAFETY_CEILING_C: i8 = 35;

/// Bounds accepted for the heater thresholds
pub const HEAT_LOW_FLOOR_C: u8 = 18;
pub const HEAT_HIGH_CEILING_C: u8 = 35;

/// Consecutive thermometer errors tolerated before a hard reset
pub const TEMP_FAIL_LIMIT: u8 = 4;

/// Value the DS18B20 reports right after power-up
pub const TEMP_POWER_ON_DEFAULT_C: i8 = 85;

/// Light level and rise time limits
pub const LIGHT_LEVEL_MAX: u8 = 100;
pub const LIGHT_RISE_MAX_MIN: u8 = 30;

/// Compare register increment per percent of brightness (65535 / 100)
pub const PWM_STEP: u16 = 655;

/// Prescaler of the 8-bit fade step timer
pub const FADE_TIMER_PRESCALER: u32 = 64;

/// Fade step timer ticks in one minute
pub const FADE_TICKS_PER_MINUTE: u32 = CPU_FREQ_HZ / FADE_TIMER_PRESCALER * 60;
