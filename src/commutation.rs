//! Phase commutation for a 4-phase unipolar stepper.
//!
//! [`CommutationEngine`] turns a signed step count into the two-phase-on
//! full-step waveform on the coil outputs. It is the only owner of the step
//! position and the phase index, and keeps them moving in lock-step.
//!
//! # Sequence
//!
//! For each step the engine:
//! 1. Drives the coil pattern for the current phase
//! 2. Holds it for the settle time
//! 3. Moves the phase one place forward (positive steps) or back (negative)
//!
//! When the requested steps are done, every coil is de-energised, so the
//! motor never idles with current flowing. This also happens for a zero-step
//! command.
//!
//! # Example
//!
//! ```rust
//! use star_tracker::commutation::CommutationEngine;
//! use star_tracker::hal::{MockClock, MockCoils, MockDelay};
//!
//! let clock = MockClock::new();
//! let mut delay = MockDelay::new(&clock);
//! let mut engine = CommutationEngine::new(MockCoils::new(), 1500);
//!
//! engine.advance(5, &mut delay).unwrap();
//! assert_eq!(engine.position(), 5);
//! assert_eq!(engine.phase(), 1);
//! assert!(engine.coils().all_inactive());
//! ```

use crate::traits::{CoilDriver, CoilPattern, Delay};

/// Number of phases in the full-step cycle.
pub const PHASES: u8 = 4;

/// Stepper commutation engine.
///
/// # Type Parameter
///
/// - `C`: The coil output implementation ([`CoilDriver`] trait)
pub struct CommutationEngine<C: CoilDriver> {
    coils: C,
    settle_us: u32,
    position: i64,
    phase: u8,
    /// Phase at the last zero event; `phase - zero_phase ≡ position (mod 4)`.
    zero_phase: u8,
}

impl<C: CoilDriver> CommutationEngine<C> {
    /// Create an engine at position 0, phase 0.
    pub fn new(coils: C, settle_us: u32) -> Self {
        Self {
            coils,
            settle_us,
            position: 0,
            phase: 0,
            zero_phase: 0,
        }
    }

    /// Move `steps` full steps; the sign selects the direction.
    ///
    /// The position is updated by `steps` before the waveform is driven. The
    /// coils are released afterwards, and also if a coil write fails part way
    /// through; in that case the position is wound back to the steps that
    /// were actually driven and the first error is returned.
    pub fn advance<D: Delay>(&mut self, steps: i32, delay: &mut D) -> Result<(), C::Error> {
        self.position += i64::from(steps);

        let result = self.drive(steps, delay);
        let released = self.coils.release();
        debug_assert!(self.is_in_sync());

        log::trace!(
            "advance {} -> position {}, phase {}",
            steps,
            self.position,
            self.phase
        );
        result.and(released)
    }

    fn drive<D: Delay>(&mut self, steps: i32, delay: &mut D) -> Result<(), C::Error> {
        let forward = steps > 0;
        let count = steps.unsigned_abs();
        for taken in 0..count {
            if let Err(e) = self.coils.apply(CoilPattern::for_phase(self.phase)) {
                // Position only counts steps that reached the coils
                let untaken = i64::from(count - taken);
                self.position -= if forward { untaken } else { -untaken };
                return Err(e);
            }
            delay.delay_us(self.settle_us);
            self.phase = if forward {
                (self.phase + 1) % PHASES
            } else {
                (self.phase + PHASES - 1) % PHASES
            };
        }
        Ok(())
    }

    /// Reset the step position to zero. The phase is kept so the next move
    /// continues the waveform from where the rotor actually is.
    pub fn zero(&mut self) {
        self.position = 0;
        self.zero_phase = self.phase;
    }

    /// De-energise every coil without moving.
    pub fn release(&mut self) -> Result<(), C::Error> {
        self.coils.release()
    }

    /// Net commanded steps since the last zero event.
    #[inline]
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Current phase index in `0..4`.
    #[inline]
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Time one step holds the control loop, in microseconds.
    #[inline]
    pub fn settle_us(&self) -> u32 {
        self.settle_us
    }

    /// Returns true if the phase index agrees with the step position.
    pub fn is_in_sync(&self) -> bool {
        let expected = (i64::from(self.zero_phase) + self.position).rem_euclid(PHASES.into());
        expected == i64::from(self.phase)
    }

    /// Borrow the coil outputs.
    pub fn coils(&self) -> &C {
        &self.coils
    }

    /// Mutably borrow the coil outputs.
    pub fn coils_mut(&mut self) -> &mut C {
        &mut self.coils
    }
}
