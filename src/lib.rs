//! # star-tracker
//!
//! Firmware core for a single-axis barn-door star tracker driven by a
//! 28BYJ-48 style 4-phase stepper through a ULN2003 board.
//!
//! ## Features
//!
//! - **Commutation**: Two-phase-on full-step waveform with the coils released after every move
//! - **Kinematics**: Step position to mount angle through the hinge's law of cosines
//! - **Tracking**: Proportional controller that follows the sidereal rate from a zero point
//! - **Mode control**: Two buttons for jogging, calibration and starting a tracking session
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Coil, button, clock and delay abstractions
//! - `commutation` - Phase sequencing and step position
//! - `kinematics` - Barn-door angle model
//! - `tracking` - Sidereal tracking controller
//! - `mount` - Mode state machine that ties everything together
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use star_tracker::{Config, CycleOutcome, Mode, MountController};
//! use star_tracker::hal::{MockButtons, MockClock, MockCoils, MockDelay};
//! use star_tracker::traits::Button;
//!
//! let clock = MockClock::new();
//! let mut buttons = MockButtons::new(&clock);
//! buttons.press(Button::One, 0, 5000);
//! buttons.press(Button::Two, 0, 5000);
//!
//! let mut mount = MountController::new(
//!     MockCoils::new(),
//!     buttons,
//!     clock.clone(),
//!     MockDelay::new(&clock),
//!     &Config::default(),
//! )
//! .unwrap();
//! mount.start().unwrap();
//!
//! // Both buttons held through the debounce: zero and start tracking
//! assert!(matches!(mount.poll().unwrap(), CycleOutcome::Calibrated { .. }));
//! assert_eq!(mount.mode(), Mode::Tracking);
//!
//! // An hour later one cycle catches the mount up to 15 degrees
//! clock.advance(3_600_000);
//! mount.buttons_mut().release_all();
//! assert!(matches!(mount.poll().unwrap(), CycleOutcome::Tracked(_)));
//! assert!(mount.position() > 0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Stepper phase sequencing and the step position it owns.
pub mod commutation;
/// Shared configuration for host simulation and ESP32.
pub mod config;
/// Motion faults and controller error types.
pub mod fault;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Barn-door step-to-angle model.
pub mod kinematics;
/// Mode state machine and the main controller.
pub mod mount;
/// Proportional sidereal tracking.
pub mod tracking;
/// Core traits for hardware abstraction.
pub mod traits;

// Re-exports for convenience
pub use commutation::CommutationEngine;
pub use config::{
    Config, ConfigError, DeviceConfig, JogConfig, MountGeometry, TimingConfig, TrackingConfig,
};
pub use fault::{ControlError, MotionFault};
pub use kinematics::Kinematics;
pub use mount::{CycleOutcome, Mode, MountController, MountError, MountState};
pub use tracking::{TrackingController, TrackingError, TrackingReport, TrackingSession};
pub use traits::{
    Button, ButtonInput, Clock, Coil, CoilDriver, CoilPattern, Delay, Polarity,
};
