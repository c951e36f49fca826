//! Soft-start / soft-stop light dimmer
//!
//! The light is driven by a 16-bit PWM compare register. A ramp moves that
//! register by one count per step; steps are paced by the overflow interrupt
//! of an 8-bit timer. One step may need thousands of timer ticks, so the
//! per-step tick count is split into a coarse count of full 256-tick
//! overflows and a fine preload for the remaining partial period.
//!
//! The ramp state is shared between the main loop and the timer interrupt and
//! lives behind a `critical_section::Mutex`; every access to the multi-byte
//! fields happens with interrupts masked.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::config::{FADE_TICKS_PER_MINUTE, LIGHT_LEVEL_MAX, LIGHT_RISE_MAX_MIN, PWM_STEP};

/// Hardware behind the dimmer: the PWM output and the step timer
pub trait FadeHardware {
    /// Load the PWM compare register
    fn set_duty(&mut self, duty: u16);
    /// Preload the step timer counter and enable its overflow interrupt
    fn arm(&mut self, preload: u8);
    /// Disable the step timer's overflow interrupt
    fn disarm(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Rising,
    Falling,
}

/// Step timer ticks between two ramp steps, as coarse overflows plus a partial period
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepTiming {
    coarse: u8,
    fine: u8,
}

impl StepTiming {
    /// Pacing that takes `rise_minutes` for a full 0..=0xFFFF sweep
    pub fn for_rise(rise_minutes: u8) -> Self {
        let ticks = rise_minutes as u32 * FADE_TICKS_PER_MINUTE / u16::MAX as u32;
        Self::from_ticks(ticks.min(u16::MAX as u32) as u16)
    }

    pub fn from_ticks(ticks: u16) -> Self {
        let [mut coarse, fine] = ticks.to_be_bytes();
        // A zero partial period is a full overflow, take it out of the coarse part
        if fine == 0 && coarse > 0 {
            coarse -= 1;
        }
        Self { coarse, fine }
    }

    /// Timer ticks per ramp step
    pub fn ticks(&self) -> u32 {
        let partial = if self.fine == 0 { 256 } else { self.fine as u32 };
        self.coarse as u32 * 256 + partial
    }

    /// Counter preload that makes the first overflow arrive after `fine` ticks
    fn preload(&self) -> u8 {
        self.fine.wrapping_neg()
    }
}

/// Compare value for a brightness in percent
pub fn level_to_duty(level: u8) -> u16 {
    if level >= LIGHT_LEVEL_MAX {
        u16::MAX
    } else {
        level as u16 * PWM_STEP
    }
}

/// Snapshot reported by [`FadeEngine::status`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FadeStatus {
    /// Current output in percent
    pub level: u8,
    pub rising: bool,
}

struct FadeState {
    target: u16,
    current: u16,
    timing: StepTiming,
    skip: u8,
    direction: Direction,
    level: u8,
    rise: u8,
}

impl FadeState {
    const INIT: Self = Self {
        target: 0,
        current: 0,
        timing: StepTiming { coarse: 0, fine: 0 },
        skip: 0,
        direction: Direction::Falling,
        level: 0,
        rise: 0,
    };

    fn goal(&self) -> u16 {
        match self.direction {
            Direction::Rising => self.target,
            Direction::Falling => 0,
        }
    }

    fn ramps(&self) -> bool {
        self.level > 0 && self.rise > 0
    }

    fn start<H: FadeHardware>(&mut self, hw: &mut H) {
        let goal = self.goal();
        if self.current == goal {
            hw.disarm();
        } else if self.ramps() {
            self.skip = self.timing.coarse;
            hw.arm(self.timing.preload());
        } else {
            self.current = goal;
            hw.set_duty(goal);
            hw.disarm();
        }
    }
}

pub struct FadeEngine {
    state: Mutex<RefCell<FadeState>>,
}

impl FadeEngine {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(FadeState::INIT)),
        }
    }

    /// Set brightness (0-100 %) and full-scale rise time (0-30 min)
    ///
    /// A light that is currently rising re-targets right away.
    pub fn set_target<H: FadeHardware>(&self, hw: &mut H, level: u8, rise_minutes: u8) {
        let level = level.min(LIGHT_LEVEL_MAX);
        let rise = rise_minutes.min(LIGHT_RISE_MAX_MIN);

        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.level = level;
            state.rise = rise;
            state.target = level_to_duty(level);
            state.timing = StepTiming::for_rise(rise);
            if state.direction == Direction::Rising {
                state.start(hw);
            }
        });
    }

    /// Ramp up to the target, unless already heading there
    pub fn rise<H: FadeHardware>(&self, hw: &mut H) {
        self.turn(hw, Direction::Rising);
    }

    /// Ramp down to zero, unless already heading there
    pub fn fall<H: FadeHardware>(&self, hw: &mut H) {
        self.turn(hw, Direction::Falling);
    }

    fn turn<H: FadeHardware>(&self, hw: &mut H, direction: Direction) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if state.direction != direction {
                state.direction = direction;
                state.start(hw);
            }
        });
    }

    /// Jump to the target without a ramp
    pub fn on<H: FadeHardware>(&self, hw: &mut H) {
        self.snap(hw, Direction::Rising);
    }

    /// Jump to zero without a ramp
    pub fn off<H: FadeHardware>(&self, hw: &mut H) {
        self.snap(hw, Direction::Falling);
    }

    fn snap<H: FadeHardware>(&self, hw: &mut H, direction: Direction) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.direction = direction;
            state.current = state.goal();
            hw.set_duty(state.current);
            hw.disarm();
        });
    }

    pub fn status(&self) -> FadeStatus {
        critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            FadeStatus {
                level: (state.current / PWM_STEP).min(LIGHT_LEVEL_MAX as u16) as u8,
                rising: state.direction == Direction::Rising,
            }
        })
    }

    /// Step timer overflow handler
    pub fn step<H: FadeHardware>(&self, hw: &mut H) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if state.skip > 0 {
                // Counter wrapped to zero on its own, a full period follows
                state.skip -= 1;
                return;
            }

            let goal = state.goal();
            if state.current < goal {
                state.current += 1;
            } else if state.current > goal {
                state.current -= 1;
            }
            hw.set_duty(state.current);

            if state.current == goal {
                hw.disarm();
            } else {
                state.skip = state.timing.coarse;
                hw.arm(state.timing.preload());
            }
        });
    }
}

impl Default for FadeEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Main-loop handle pairing the shared engine with its hardware
pub struct Dimmer<H> {
    engine: &'static FadeEngine,
    hw: H,
}

impl<H: FadeHardware> Dimmer<H> {
    pub fn new(engine: &'static FadeEngine, hw: H) -> Self {
        Self { engine, hw }
    }

    pub fn set_target(&mut self, level: u8, rise_minutes: u8) {
        self.engine.set_target(&mut self.hw, level, rise_minutes);
    }

    pub fn rise(&mut self) {
        self.engine.rise(&mut self.hw);
    }

    pub fn fall(&mut self) {
        self.engine.fall(&mut self.hw);
    }

    pub fn on(&mut self) {
        self.engine.on(&mut self.hw);
    }

    pub fn off(&mut self) {
        self.engine.off(&mut self.hw);
    }

    pub fn status(&self) -> FadeStatus {
        self.engine.status()
    }

    pub fn hardware(&mut self) -> &mut H {
        &mut self.hw
    }
}
