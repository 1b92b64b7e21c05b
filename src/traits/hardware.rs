//! Hardware abstraction traits for the coil outputs, buttons, clock and delay.
//!
//! These are the only points where the motion core touches the board. Everything
//! behind them (pin muxing, pull-ups, timer setup) belongs to the platform.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`CoilDriver`] | Four stepper coil outputs |
//! | [`ButtonInput`] | Two active-low push buttons |
//! | [`Clock`] | Monotonic millisecond time source |
//! | [`Delay`] | Blocking waits (settle, debounce, pacing) |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For real pins, wrap `embedded-hal` 1.0 pins with
//! [`GpioCoils`](crate::hal::GpioCoils) (requires the `embedded-hal` feature).
//!
//! # Example
//!
//! ```rust
//! use star_tracker::traits::{Coil, CoilDriver, CoilPattern};
//! use star_tracker::hal::MockCoils;
//!
//! let mut coils = MockCoils::new();
//! coils.apply(CoilPattern::for_phase(0)).unwrap();
//! assert!(coils.is_active(Coil::A));
//! assert!(!coils.is_active(Coil::B));
//!
//! coils.release().unwrap();
//! assert!(coils.all_inactive());
//! ```

/// One of the four stepper coil outputs, in logical drive order.
///
/// Logical order is the order of the two-phase-on sequence, which is not
/// necessarily the order of the driver board inputs (a 28BYJ-48 on a
/// ULN2003 board is driven IN1, IN3, IN2, IN4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Coil {
    /// First coil output.
    A,
    /// Second coil output.
    B,
    /// Third coil output.
    C,
    /// Fourth coil output.
    D,
}

impl Coil {
    /// All coils in logical order.
    pub const ALL: [Coil; 4] = [Coil::A, Coil::B, Coil::C, Coil::D];

    /// Index of this coil in [`Coil::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Coil::A => 0,
            Coil::B => 1,
            Coil::C => 2,
            Coil::D => 3,
        }
    }
}

/// Which electrical level energises a coil.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Polarity {
    /// A high output energises the coil.
    #[default]
    ActiveHigh,
    /// A low output energises the coil.
    ActiveLow,
}

impl Polarity {
    /// Returns the pin level (`true` = high) that puts a coil in the given state.
    ///
    /// ```
    /// use star_tracker::traits::Polarity;
    ///
    /// assert!(Polarity::ActiveHigh.level(true));
    /// assert!(!Polarity::ActiveLow.level(true));
    /// assert!(Polarity::ActiveLow.level(false));
    /// ```
    #[inline]
    pub const fn level(self, active: bool) -> bool {
        match self {
            Polarity::ActiveHigh => active,
            Polarity::ActiveLow => !active,
        }
    }
}

/// Activation state of all four coils.
///
/// `CoilPattern::for_phase` is the two-phase-on full-step table: exactly two
/// adjacent coils are energised in every phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoilPattern(pub [bool; 4]);

impl CoilPattern {
    /// Every coil de-energised.
    pub const OFF: CoilPattern = CoilPattern([false; 4]);

    /// Full-step table, indexed by phase.
    pub const FULL_STEP: [CoilPattern; 4] = [
        CoilPattern([true, false, true, false]),
        CoilPattern([false, true, true, false]),
        CoilPattern([false, true, false, true]),
        CoilPattern([true, false, false, true]),
    ];

    /// Pattern for a phase index; indices wrap modulo 4.
    #[inline]
    pub const fn for_phase(phase: u8) -> CoilPattern {
        Self::FULL_STEP[(phase % 4) as usize]
    }

    /// Returns true if the given coil is energised in this pattern.
    #[inline]
    pub const fn is_active(&self, coil: Coil) -> bool {
        self.0[coil.index()]
    }

    /// Number of energised coils.
    pub fn active_count(&self) -> usize {
        self.0.iter().filter(|on| **on).count()
    }
}

/// Stepper coil output trait.
///
/// Implementors map the logical "active" state onto a pin level using their
/// configured [`Polarity`].
///
/// # Example Implementation
///
/// ```rust,ignore
/// use star_tracker::traits::{Coil, CoilDriver};
///
/// struct MyCoils { /* four output pins */ }
///
/// impl CoilDriver for MyCoils {
///     type Error = ();
///
///     fn set_coil(&mut self, coil: Coil, active: bool) -> Result<(), ()> {
///         // Drive the pin for `coil`...
///         Ok(())
///     }
/// }
/// ```
pub trait CoilDriver {
    /// Error type for output operations.
    type Error;

    /// Drive a single coil to the given state.
    fn set_coil(&mut self, coil: Coil, active: bool) -> Result<(), Self::Error>;

    /// Drive all four coils to a pattern.
    fn apply(&mut self, pattern: CoilPattern) -> Result<(), Self::Error> {
        for coil in Coil::ALL {
            self.set_coil(coil, pattern.is_active(coil))?;
        }
        Ok(())
    }

    /// De-energise every coil.
    fn release(&mut self) -> Result<(), Self::Error> {
        self.apply(CoilPattern::OFF)
    }
}

/// One of the two front-panel buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Button {
    /// Jogs in the positive direction.
    One,
    /// Jogs in the negative direction.
    Two,
}

/// Push button input trait.
///
/// Buttons are wired to ground with pull-ups, so the raw read is `true`
/// while the button is released.
pub trait ButtonInput {
    /// Error type for input operations.
    type Error;

    /// Raw pin level: `true` when released (pulled up), `false` when pressed.
    fn is_released(&mut self, button: Button) -> Result<bool, Self::Error>;

    /// Returns true while the button is held down.
    fn is_pressed(&mut self, button: Button) -> Result<bool, Self::Error> {
        Ok(!self.is_released(button)?)
    }
}

/// Time source trait for `no_std` compatibility.
///
/// # Example
///
/// ```rust
/// use star_tracker::traits::Clock;
/// use star_tracker::hal::MockClock;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically non-decreasing.
    fn now_ms(&self) -> u64;
}

/// Blocking delay trait.
///
/// All waits in the controller hold the whole control loop; nothing else runs
/// while a delay is in progress.
pub trait Delay {
    /// Busy-wait for the given number of microseconds.
    fn delay_us(&mut self, us: u32);

    /// Wait for the given number of milliseconds.
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1_000);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // CoilPattern Tests
    // =========================================================================

    #[test]
    fn full_step_table_has_two_coils_on() {
        for pattern in CoilPattern::FULL_STEP {
            assert_eq!(pattern.active_count(), 2);
        }
    }

    #[test]
    fn full_step_table_matches_sequence() {
        let on = |p: CoilPattern| Coil::ALL.map(|c| p.is_active(c));
        assert_eq!(on(CoilPattern::for_phase(0)), [true, false, true, false]);
        assert_eq!(on(CoilPattern::for_phase(1)), [false, true, true, false]);
        assert_eq!(on(CoilPattern::for_phase(2)), [false, true, false, true]);
        assert_eq!(on(CoilPattern::for_phase(3)), [true, false, false, true]);
    }

    #[test]
    fn adjacent_phases_change_one_coil_pair() {
        // Two-phase-on stepping switches exactly one coil off and one on per step
        for phase in 0..4u8 {
            let a = CoilPattern::for_phase(phase);
            let b = CoilPattern::for_phase(phase + 1);
            let changed = Coil::ALL
                .iter()
                .filter(|c| a.is_active(**c) != b.is_active(**c))
                .count();
            assert_eq!(changed, 2, "phase {phase} -> {}", phase + 1);
        }
    }

    #[test]
    fn for_phase_wraps() {
        assert_eq!(CoilPattern::for_phase(4), CoilPattern::for_phase(0));
        assert_eq!(CoilPattern::for_phase(7), CoilPattern::for_phase(3));
    }

    #[test]
    fn off_pattern_is_default() {
        assert_eq!(CoilPattern::default(), CoilPattern::OFF);
        assert_eq!(CoilPattern::OFF.active_count(), 0);
    }

    // =========================================================================
    // Coil / Polarity Tests
    // =========================================================================

    #[test]
    fn coil_indices_follow_all() {
        for (i, coil) in Coil::ALL.iter().enumerate() {
            assert_eq!(coil.index(), i);
        }
    }

    #[test]
    fn polarity_default_is_active_high() {
        assert_eq!(Polarity::default(), Polarity::ActiveHigh);
    }

    #[test]
    fn polarity_levels() {
        assert!(Polarity::ActiveHigh.level(true));
        assert!(!Polarity::ActiveHigh.level(false));
        assert!(!Polarity::ActiveLow.level(true));
        assert!(Polarity::ActiveLow.level(false));
    }

    // =========================================================================
    // CoilDriver Default Methods Tests
    // =========================================================================

    struct TestCoils {
        state: [bool; 4],
        writes: usize,
    }

    impl CoilDriver for TestCoils {
        type Error = ();

        fn set_coil(&mut self, coil: Coil, active: bool) -> Result<(), ()> {
            self.state[coil.index()] = active;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn coil_driver_apply_default_impl() {
        let mut coils = TestCoils {
            state: [false; 4],
            writes: 0,
        };
        coils.apply(CoilPattern::for_phase(2)).unwrap();
        assert_eq!(coils.state, [false, true, false, true]);
        assert_eq!(coils.writes, 4);
    }

    #[test]
    fn coil_driver_release_default_impl() {
        let mut coils = TestCoils {
            state: [true; 4],
            writes: 0,
        };
        coils.release().unwrap();
        assert_eq!(coils.state, [false; 4]);
    }

    // =========================================================================
    // ButtonInput / Delay Default Methods Tests
    // =========================================================================

    struct TestButtons {
        released: [bool; 2],
    }

    impl ButtonInput for TestButtons {
        type Error = ();

        fn is_released(&mut self, button: Button) -> Result<bool, ()> {
            Ok(match button {
                Button::One => self.released[0],
                Button::Two => self.released[1],
            })
        }
    }

    #[test]
    fn button_input_is_pressed_inverts_level() {
        let mut buttons = TestButtons {
            released: [false, true],
        };
        assert!(buttons.is_pressed(Button::One).unwrap());
        assert!(!buttons.is_pressed(Button::Two).unwrap());
    }

    struct TestDelay {
        total_us: u64,
    }

    impl Delay for TestDelay {
        fn delay_us(&mut self, us: u32) {
            self.total_us += u64::from(us);
        }
    }

    #[test]
    fn delay_ms_default_impl() {
        let mut delay = TestDelay { total_us: 0 };
        delay.delay_ms(3);
        assert_eq!(delay.total_us, 3_000);
    }
}
