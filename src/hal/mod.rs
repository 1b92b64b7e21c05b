//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Simulated hardware for desktop development and tests
//! - `gpio`: Adapters over any `embedded-hal` 1.0 pins (requires `embedded-hal` feature)
//! - `esp32`: ESP32-C3 SuperMini clock, delay and pin map (requires `esp32` feature)

pub mod mock;

#[cfg(feature = "embedded-hal")]
pub mod gpio;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;

#[cfg(feature = "embedded-hal")]
pub use gpio::*;

#[cfg(feature = "esp32")]
pub use esp32::*;
