//! Trait definitions for hardware abstraction.
//!
//! This module defines the abstractions that let the motion core:
//! - Run on the ESP32 board through `embedded-hal` pins
//! - Run on the desktop against simulated hardware for tests
//!
//! # Hardware Abstraction
//!
//! The key hardware traits are:
//!
//! - [`CoilDriver`]: The four stepper coil outputs
//! - [`ButtonInput`]: The two front-panel buttons (active-low)
//! - [`Clock`]: Monotonic millisecond time source
//! - [`Delay`]: Blocking settle/debounce/pacing waits

pub mod hardware;

pub use hardware::*;
