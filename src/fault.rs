//! Fault conditions raised by the motion core.
//!
//! [`MotionFault`] covers the numeric edge cases of driving the mount: the
//! lever geometry running out of travel, the configured travel limit, and the
//! clock reading earlier than the session start. Any fault is terminal for
//! the current mode; the controller drops back to Idle and de-energises the
//! coils.
//!
//! [`ControlError`] carries the hardware errors of the coil driver and the
//! button input, which are propagated to the caller rather than handled.

use core::fmt;

/// A physically invalid condition detected by the motion core.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MotionFault {
    /// The displacement is outside the range the lever arm can reach, so the
    /// inverse cosine is undefined.
    RangeExceeded {
        /// Step position that was evaluated.
        position: i64,
        /// The out-of-range cosine argument.
        cosine_arg: f64,
    },

    /// A command would move the screw past the configured travel limit.
    TravelLimit {
        /// Position the command would have reached.
        target: i64,
        /// Configured limit on |position|.
        limit: i64,
    },

    /// The clock reads earlier than the tracking session start.
    ClockWrapped {
        /// Session start time in milliseconds.
        start_ms: u64,
        /// Clock reading in milliseconds.
        now_ms: u64,
    },
}

impl fmt::Display for MotionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionFault::RangeExceeded {
                position,
                cosine_arg,
            } => write!(
                f,
                "lever geometry exceeded at step {position} (cos arg {cosine_arg:.6})"
            ),
            MotionFault::TravelLimit { target, limit } => {
                write!(f, "travel limit exceeded: target {target}, limit ±{limit}")
            }
            MotionFault::ClockWrapped { start_ms, now_ms } => {
                write!(f, "clock went backwards: start {start_ms}ms, now {now_ms}ms")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MotionFault {}

/// Hardware error from one of the controller's peripherals.
///
/// `C` is the coil driver error type, `B` the button input error type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlError<C, B> {
    /// Writing a coil output failed.
    Coils(C),
    /// Reading a button failed.
    Buttons(B),
}

impl<C: fmt::Debug, B: fmt::Debug> fmt::Display for ControlError<C, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::Coils(e) => write!(f, "coil output error: {e:?}"),
            ControlError::Buttons(e) => write!(f, "button input error: {e:?}"),
        }
    }
}

#[cfg(feature = "std")]
impl<C: fmt::Debug, B: fmt::Debug> std::error::Error for ControlError<C, B> {}
