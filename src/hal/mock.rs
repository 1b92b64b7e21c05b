//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware traits, enabling
//! development and testing on desktop without a board.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockCoils`] | [`CoilDriver`] | Records coil states and every applied pattern |
//! | [`MockButtons`] | [`ButtonInput`] | Scripted press intervals on the simulated clock |
//! | [`MockClock`] | [`Clock`] | Shared, controllable time source |
//! | [`MockDelay`] | [`Delay`] | Advances the shared clock instead of sleeping |
//!
//! The clock is shared: cloning a [`MockClock`] (or building a [`MockDelay`] or
//! [`MockButtons`] from it) gives a handle on the same simulated time. Every
//! settle, debounce and pacing wait therefore moves time forward exactly as
//! it would on the board.
//!
//! # Example
//!
//! ```rust
//! use star_tracker::hal::{MockButtons, MockClock, MockDelay};
//! use star_tracker::traits::{Button, ButtonInput, Clock, Delay};
//!
//! let clock = MockClock::new();
//! let mut delay = MockDelay::new(&clock);
//! let mut buttons = MockButtons::new(&clock);
//!
//! // Button one held from 100ms to 300ms
//! buttons.press(Button::One, 100, 300);
//! assert!(!buttons.is_pressed(Button::One).unwrap());
//!
//! delay.delay_ms(150);
//! assert_eq!(clock.now_ms(), 150);
//! assert!(buttons.is_pressed(Button::One).unwrap());
//! ```
//!
//! [`CoilDriver`]: crate::traits::CoilDriver
//! [`ButtonInput`]: crate::traits::ButtonInput
//! [`Clock`]: crate::traits::Clock
//! [`Delay`]: crate::traits::Delay

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::traits::{Button, ButtonInput, Clock, Coil, CoilDriver, CoilPattern, Delay, Polarity};

// ============================================================================
// Coil Outputs
// ============================================================================

/// Mock coil outputs for testing.
///
/// Tracks the logical state of each coil, the pin levels implied by the
/// configured polarity, and the history of patterns driven by
/// [`CoilDriver::apply`]. Releases are counted separately and do not appear
/// in the pattern history.
///
/// # Example
///
/// ```rust
/// use star_tracker::hal::MockCoils;
/// use star_tracker::traits::{CoilDriver, CoilPattern, Polarity};
///
/// let mut coils = MockCoils::new().with_polarity(Polarity::ActiveLow);
/// coils.apply(CoilPattern::for_phase(1)).unwrap();
///
/// assert_eq!(coils.levels(), [true, false, false, true]);
/// assert_eq!(coils.pattern_history().count(), 1);
///
/// coils.release().unwrap();
/// assert!(coils.all_inactive());
/// assert_eq!(coils.levels(), [true; 4]);
/// assert_eq!(coils.release_count, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockCoils {
    state: [bool; 4],
    polarity: Polarity,
    history: Vec<CoilPattern>,
    /// Number of individual coil writes.
    pub write_count: usize,
    /// Number of times the coils were released.
    pub release_count: usize,
    fail_at: Option<usize>,
}

impl MockCoils {
    /// Creates mock coils, all inactive, active-high.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the polarity used by [`levels`](Self::levels).
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Make the write after the next `writes` successful writes fail once.
    pub fn fail_after(&mut self, writes: usize) {
        self.fail_at = Some(self.write_count + writes);
    }

    /// Returns true if the coil is currently energised.
    pub fn is_active(&self, coil: Coil) -> bool {
        self.state[coil.index()]
    }

    /// Returns true if no coil is energised.
    pub fn all_inactive(&self) -> bool {
        self.state.iter().all(|on| !on)
    }

    /// Current pin levels (`true` = high), in coil order.
    pub fn levels(&self) -> [bool; 4] {
        self.state.map(|active| self.polarity.level(active))
    }

    /// Every pattern driven so far, oldest first.
    pub fn pattern_history(&self) -> impl Iterator<Item = CoilPattern> + '_ {
        self.history.iter().copied()
    }

    /// Forget the pattern history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl CoilDriver for MockCoils {
    type Error = ();

    fn set_coil(&mut self, coil: Coil, active: bool) -> Result<(), ()> {
        if self.fail_at == Some(self.write_count) {
            self.fail_at = None;
            return Err(());
        }
        self.state[coil.index()] = active;
        self.write_count += 1;
        Ok(())
    }

    fn apply(&mut self, pattern: CoilPattern) -> Result<(), ()> {
        for coil in Coil::ALL {
            self.set_coil(coil, pattern.is_active(coil))?;
        }
        self.history.push(pattern);
        Ok(())
    }

    fn release(&mut self) -> Result<(), ()> {
        for coil in Coil::ALL {
            self.set_coil(coil, false)?;
        }
        self.release_count += 1;
        Ok(())
    }
}

// ============================================================================
// Clock and Delay
// ============================================================================

/// Mock clock for testing.
///
/// Clones share the same time, so a clock handed to a controller can still be
/// moved by the test.
///
/// # Example
///
/// ```rust
/// use star_tracker::hal::MockClock;
/// use star_tracker::traits::Clock;
///
/// let clock = MockClock::new();
/// let handle = clock.clone();
///
/// clock.set(1000);
/// assert_eq!(handle.now_ms(), 1000);
///
/// handle.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockClock {
    current_ms: Rc<Cell<u64>>,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current time in milliseconds.
    ///
    /// Setting an earlier time is allowed, to simulate a clock that wrapped.
    pub fn set(&self, ms: u64) {
        self.current_ms.set(ms);
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, ms: u64) {
        self.current_ms.set(self.current_ms.get() + ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms.get()
    }
}

/// Mock delay that advances a [`MockClock`] instead of sleeping.
///
/// Microsecond waits are accumulated; the clock moves whenever a whole
/// millisecond has built up.
///
/// # Example
///
/// ```rust
/// use star_tracker::hal::{MockClock, MockDelay};
/// use star_tracker::traits::{Clock, Delay};
///
/// let clock = MockClock::new();
/// let mut delay = MockDelay::new(&clock);
///
/// delay.delay_us(1500);
/// assert_eq!(clock.now_ms(), 1);
/// delay.delay_us(1500);
/// assert_eq!(clock.now_ms(), 3);
/// assert_eq!(delay.total_us(), 3000);
/// ```
#[derive(Debug)]
pub struct MockDelay {
    clock: MockClock,
    total_us: u64,
    /// Number of `delay_ms` calls.
    pub ms_calls: usize,
}

impl MockDelay {
    /// Creates a delay driving the given clock.
    pub fn new(clock: &MockClock) -> Self {
        Self {
            clock: clock.clone(),
            total_us: 0,
            ms_calls: 0,
        }
    }

    /// Total time waited, in microseconds.
    pub fn total_us(&self) -> u64 {
        self.total_us
    }
}

impl Delay for MockDelay {
    fn delay_us(&mut self, us: u32) {
        let before_ms = self.total_us / 1000;
        self.total_us += u64::from(us);
        self.clock.advance(self.total_us / 1000 - before_ms);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.ms_calls += 1;
        self.total_us += u64::from(ms) * 1000;
        self.clock.advance(u64::from(ms));
    }
}

// ============================================================================
// Buttons
// ============================================================================

/// Mock buttons driven by the simulated clock.
///
/// Presses are scripted as half-open intervals `[from_ms, until_ms)` on the
/// shared clock, so a test can lay out a timeline up front and let the
/// controller's own delays walk through it.
#[derive(Debug)]
pub struct MockButtons {
    clock: MockClock,
    presses: Vec<(Button, u64, u64)>,
    /// Number of reads performed.
    pub read_count: usize,
    fail_at: Option<usize>,
}

impl MockButtons {
    /// Creates buttons that are released at all times.
    pub fn new(clock: &MockClock) -> Self {
        Self {
            clock: clock.clone(),
            presses: Vec::new(),
            read_count: 0,
            fail_at: None,
        }
    }

    /// Hold `button` down from `from_ms` until (not including) `until_ms`.
    pub fn press(&mut self, button: Button, from_ms: u64, until_ms: u64) {
        self.presses.push((button, from_ms, until_ms));
    }

    /// Hold `button` down from `from_ms` onward.
    pub fn hold(&mut self, button: Button, from_ms: u64) {
        self.press(button, from_ms, u64::MAX);
    }

    /// Release every button immediately.
    pub fn release_all(&mut self) {
        self.presses.clear();
    }

    /// Make the next read fail.
    pub fn fail_next_read(&mut self) {
        self.fail_after_reads(0);
    }

    /// Make the read after the next `reads` successful reads fail once.
    pub fn fail_after_reads(&mut self, reads: usize) {
        self.fail_at = Some(self.read_count + reads);
    }
}

impl ButtonInput for MockButtons {
    type Error = ();

    fn is_released(&mut self, button: Button) -> Result<bool, ()> {
        if self.fail_at == Some(self.read_count) {
            self.fail_at = None;
            return Err(());
        }
        self.read_count += 1;
        let now = self.clock.now_ms();
        let held = self
            .presses
            .iter()
            .any(|(b, from, until)| *b == button && (*from..*until).contains(&now));
        Ok(!held)
    }
}
