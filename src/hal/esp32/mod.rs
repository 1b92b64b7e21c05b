//! ESP32-C3 SuperMini hardware abstraction layer for the star tracker.
//!
//! Coils and buttons go through the generic [`GpioCoils`](crate::hal::GpioCoils)
//! and [`GpioButtons`](crate::hal::GpioButtons) adapters over ESP-IDF
//! `PinDriver`s. This module adds the board clock, the delay provider and the
//! pin map.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32-C3 SuperMini (RISC-V 160MHz, 4MB Flash)
//! - **Motor**: 28BYJ-48 5V stepper, 1:64 gearbox
//! - **Driver**: ULN2003 darlington board (coils active high)
//! - **Buttons**: Two momentary switches to ground, internal pull-ups
//!
//! # Pin Assignments
//!
//! The board binary claims these pins from `Peripherals`:
//!
//! | Signal | GPIO | Notes |
//! |--------|------|-------|
//! | Coil A | 2 | ULN2003 IN1 |
//! | Coil B | 4 | ULN2003 IN3 |
//! | Coil C | 3 | ULN2003 IN2 |
//! | Coil D | 5 | ULN2003 IN4 |
//! | Button one | 6 | jog forward, pull-up |
//! | Button two | 7 | jog backward, pull-up |
//!
//! The full-step sequence expects the coils in IN1, IN3, IN2, IN4 order.

mod clock;
mod delay;

pub use clock::Esp32Clock;
pub use delay::Esp32Delay;
