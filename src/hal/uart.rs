use avr_device::atmega128a::USART0;
use avr_device::interrupt::Mutex;
use core::cell::RefCell;
use embedded_hal::serial;
use heapless::Deque;

use crate::config::{CPU_FREQ_HZ, UART_BAUD};
use crate::protocol::Buffered;

const RX_BUFFER_SIZE: usize = 32;

// Baud rate divisor, 103 for 9600 baud at 16MHz
const UBRR: u16 = (CPU_FREQ_HZ / (16 * UART_BAUD) - 1) as u16;

// UCSR0A
const UDRE: u8 = 1 << 5;
const TXC: u8 = 1 << 6;
// UCSR0B
const RXCIE: u8 = 1 << 7;
const RXEN: u8 = 1 << 4;
const TXEN: u8 = 1 << 3;
// UCSR0C: asynchronous 8N1
const FRAME_8N1: u8 = 0x06;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UartError {
    /// Received bytes were dropped because the buffer was full
    Overrun,
}

struct RxBuffer {
    bytes: Deque<u8, RX_BUFFER_SIZE>,
    overrun: bool,
}

impl RxBuffer {
    const fn new() -> Self {
        Self {
            bytes: Deque::new(),
            overrun: false,
        }
    }

    fn push(&mut self, byte: u8) {
        if self.bytes.push_back(byte).is_err() {
            self.overrun = true;
        }
    }

    fn take_overrun(&mut self) -> bool {
        core::mem::replace(&mut self.overrun, false)
    }
}

static RX_BUFFER: Mutex<RefCell<RxBuffer>> = Mutex::new(RefCell::new(RxBuffer::new()));

/// USART0, interrupt-driven receive and polled transmit
pub struct Uart {
    _private: (),
}

impl Uart {
    pub fn new() -> Self {
        unsafe {
            let p = USART0::ptr();

            (*p).ubrr0h.write(|w| w.bits((UBRR >> 8) as u8));
            (*p).ubrr0l.write(|w| w.bits(UBRR as u8));
            (*p).ucsr0c.write(|w| w.bits(FRAME_8N1));

            // Enable TX, RX and RX interrupt
            (*p).ucsr0b.write(|w| w.bits(RXEN | TXEN | RXCIE));
        }

        Self { _private: () }
    }

    fn status() -> u8 {
        unsafe { (*USART0::ptr()).ucsr0a.read().bits() }
    }
}

impl Default for Uart {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffered for Uart {
    fn buffered(&self) -> usize {
        avr_device::interrupt::free(|cs| RX_BUFFER.borrow(cs).borrow().bytes.len())
    }
}

impl serial::Read<u8> for Uart {
    type Error = UartError;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        avr_device::interrupt::free(|cs| {
            let mut rx = RX_BUFFER.borrow(cs).borrow_mut();
            if rx.take_overrun() {
                return Err(nb::Error::Other(UartError::Overrun));
            }
            rx.bytes.pop_front().ok_or(nb::Error::WouldBlock)
        })
    }
}

impl serial::Write<u8> for Uart {
    type Error = UartError;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        if Self::status() & UDRE == 0 {
            return Err(nb::Error::WouldBlock);
        }
        unsafe {
            // Clear TXC (write one) so flush tracks this byte
            (*USART0::ptr()).ucsr0a.write(|w| w.bits(TXC));
            (*USART0::ptr()).udr0.write(|w| w.bits(word));
        }
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        let status = Self::status();
        if status & UDRE != 0 && status & TXC != 0 {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

#[avr_device::interrupt(atmega128a)]
fn USART0_RX() {
    let byte = unsafe { (*USART0::ptr()).udr0.read().bits() };
    avr_device::interrupt::free(|cs| {
        RX_BUFFER.borrow(cs).borrow_mut().push(byte);
    });
}
