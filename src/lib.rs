//! Aquarium controller firmware for the ATmega128
//!
//! The control core (scheduler, time keeping, touch UI, heater, light fade
//! and the serial command interpreter) is target independent and tested on
//! the host. Register-level drivers live in [`hal`] and only build for AVR.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

pub mod aquarium;
pub mod config;
pub mod drivers;
pub mod protocol;
pub mod rtos;

#[cfg(target_arch = "avr")]
pub mod hal;

#[cfg(test)]
mod testing;

pub use aquarium::{Aquarium, Board, Peripherals};
pub use protocol::Flow;
pub use rtos::Scheduler;
