//! Cyclic task scheduler
//!
//! One free-running counter, bumped once per loop iteration and wrapped at
//! [`SCHEDULER_MODULUS`]. Periodic tasks run when the counter hits their
//! slot; the serial interpreter runs every iteration. The watchdog is fed
//! once per iteration, so any task that blocks for longer than its timeout
//! restarts the controller.

use core::fmt::Debug;

use embedded_hal::serial;
use embedded_hal::watchdog::Watchdog;
use log::{info, warn};

use crate::aquarium::{Aquarium, Board};
use crate::config::{
    HEAT_TASK_OFFSET, LIGHT_TASK_OFFSET, SCHEDULER_MODULUS, SENSOR_TASK_OFFSET, TIME_TASK_PERIOD,
};
use crate::protocol::{Buffered, Flow};

/// Tasks that fall on one counter value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DueTasks {
    pub time: bool,
    pub sensors: bool,
    pub heat: bool,
    pub light: bool,
}

pub fn due_tasks(counter: u16) -> DueTasks {
    DueTasks {
        time: counter % TIME_TASK_PERIOD == 0,
        sensors: counter == SENSOR_TASK_OFFSET,
        heat: counter == HEAT_TASK_OFFSET,
        light: counter == LIGHT_TASK_OFFSET,
    }
}

pub struct Scheduler<B: Board, S, W> {
    aquarium: Aquarium<B>,
    serial: S,
    watchdog: W,
    counter: u16,
}

impl<B: Board, S, W: Watchdog> Scheduler<B, S, W> {
    pub fn new(aquarium: Aquarium<B>, serial: S, watchdog: W) -> Self {
        Self {
            aquarium,
            serial,
            watchdog,
            counter: 0,
        }
    }

    /// One loop iteration
    pub fn run_once<E: Debug>(&mut self) -> Flow
    where
        S: Buffered + serial::Read<u8, Error = E> + serial::Write<u8, Error = E>,
    {
        let due = due_tasks(self.counter);
        if due.time {
            self.aquarium.process_time();
        }
        if due.sensors {
            self.aquarium.process_sensors();
        }
        if due.heat {
            self.aquarium.process_heat();
        }
        if due.light {
            self.aquarium.process_light();
        }

        let flow = self
            .aquarium
            .process_serial(&mut self.serial)
            .unwrap_or_else(|err| {
                warn!("serial fault: {:?}", err);
                Flow::Continue
            });

        self.counter = (self.counter + 1) % SCHEDULER_MODULUS;
        if flow == Flow::Continue {
            self.watchdog.feed();
        }
        flow
    }

    pub fn run<E: Debug>(mut self) -> !
    where
        S: Buffered + serial::Read<u8, Error = E> + serial::Write<u8, Error = E>,
    {
        info!("scheduler running");
        loop {
            if self.run_once() == Flow::Restart {
                self.halt();
            }
        }
    }

    /// Starve the watchdog until it resets the controller
    fn halt(&mut self) -> ! {
        info!("restarting");
        loop {
            core::hint::spin_loop();
        }
    }

    pub fn counter(&self) -> u16 {
        self.counter
    }

    pub fn aquarium(&self) -> &Aquarium<B> {
        &self.aquarium
    }

    pub fn serial(&mut self) -> &mut S {
        &mut self.serial
    }

    pub fn watchdog(&self) -> &W {
        &self.watchdog
    }
}
