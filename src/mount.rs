//! Mode state machine that ties the buttons, tracking loop and motor together.
//!
//! This module provides [`MountController`], the single owned context for
//! everything mutable in the tracker: step position, phase, tracking session
//! and mode.
//!
//! # Overview
//!
//! Each call to [`MountController::poll`] runs one control cycle:
//! - Waits the pacing delay (longer when not tracking)
//! - Samples both buttons
//! - One button while not tracking: jogs a fixed number of steps
//! - Both buttons: after the debounce interval, zeroes the position and
//!   starts tracking
//! - While tracking: runs one proportional tracking cycle
//!
//! Any [`MotionFault`] drops the controller back to Idle with the coils
//! released.
//!
//! # Example
//!
//! ```rust
//! use star_tracker::{Config, Mode, MountController, CycleOutcome};
//! use star_tracker::hal::{MockButtons, MockClock, MockCoils, MockDelay};
//! use star_tracker::traits::Button;
//!
//! let clock = MockClock::new();
//! let mut buttons = MockButtons::new(&clock);
//! // Both buttons held for two seconds
//! buttons.press(Button::One, 0, 2000);
//! buttons.press(Button::Two, 0, 2000);
//!
//! let mut mount = MountController::new(
//!     MockCoils::new(),
//!     buttons,
//!     clock.clone(),
//!     MockDelay::new(&clock),
//!     &Config::default(),
//! )
//! .unwrap();
//!
//! let outcome = mount.poll().unwrap();
//! assert!(matches!(outcome, CycleOutcome::Calibrated { .. }));
//! assert_eq!(mount.mode(), Mode::Tracking);
//! assert_eq!(mount.position(), 0);
//! ```

use crate::commutation::CommutationEngine;
use crate::config::{Config, ConfigError, JogConfig, TimingConfig};
use crate::fault::{ControlError, MotionFault};
use crate::kinematics::Kinematics;
use crate::tracking::{TrackingController, TrackingError, TrackingReport, TrackingSession};
use crate::traits::{Button, ButtonInput, Clock, CoilDriver, Delay};

/// Operating mode of the mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Mode {
    /// Waiting for a button.
    #[default]
    Idle,
    /// Running a jog in the positive direction.
    JogPositive,
    /// Running a jog in the negative direction.
    JogNegative,
    /// Both buttons pressed; waiting out the debounce interval.
    Calibrating,
    /// Closed-loop sidereal tracking.
    Tracking,
}

impl Mode {
    /// Returns the mode as a lowercase string.
    ///
    /// ```
    /// use star_tracker::Mode;
    ///
    /// assert_eq!(Mode::Idle.as_str(), "idle");
    /// assert_eq!(Mode::JogNegative.as_str(), "jog_negative");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::JogPositive => "jog_positive",
            Mode::JogNegative => "jog_negative",
            Mode::Calibrating => "calibrating",
            Mode::Tracking => "tracking",
        }
    }
}

/// What a single control cycle did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CycleOutcome {
    /// No button action and not tracking.
    Idle,
    /// A jog of `steps` was issued.
    Jogged {
        /// Signed step count moved.
        steps: i32,
    },
    /// Both buttons were held through the debounce; tracking started.
    Calibrated {
        /// Session start time.
        start_ms: u64,
    },
    /// Both buttons were pressed but released before the debounce ended.
    CalibrationRejected,
    /// One tracking cycle ran.
    Tracked(TrackingReport),
    /// A fault forced the controller back to Idle.
    Faulted(MotionFault),
}

/// Hardware error type of a [`MountController`].
pub type MountError<C, B> = ControlError<<C as CoilDriver>::Error, <B as ButtonInput>::Error>;

/// Main mount controller.
///
/// # Type Parameters
///
/// - `C`: Coil outputs ([`CoilDriver`])
/// - `B`: Buttons ([`ButtonInput`])
/// - `K`: Time source ([`Clock`])
/// - `D`: Blocking waits ([`Delay`])
pub struct MountController<C: CoilDriver, B: ButtonInput, K: Clock, D: Delay> {
    engine: CommutationEngine<C>,
    buttons: B,
    clock: K,
    delay: D,
    kinematics: Kinematics,
    tracker: TrackingController,
    timing: TimingConfig,
    jog: JogConfig,
    mode: Mode,
    session: Option<TrackingSession>,
    last_fault: Option<MotionFault>,
}

impl<C, B, K, D> MountController<C, B, K, D>
where
    C: CoilDriver,
    B: ButtonInput,
    K: Clock,
    D: Delay,
{
    /// Create a controller in Idle at position 0.
    ///
    /// Rejects configurations whose constants are not physically usable.
    pub fn new(
        coils: C,
        buttons: B,
        clock: K,
        delay: D,
        config: &Config,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            engine: CommutationEngine::new(coils, config.timing.settle_us),
            buttons,
            clock,
            delay,
            kinematics: Kinematics::new(config.geometry),
            tracker: TrackingController::new(config.tracking),
            timing: config.timing,
            jog: config.jog,
            mode: Mode::Idle,
            session: None,
            last_fault: None,
        })
    }

    /// Release the coils and wait out the power-up delay.
    ///
    /// Call once before the first [`poll`](Self::poll).
    pub fn start(&mut self) -> Result<(), C::Error> {
        self.engine.release()?;
        self.delay.delay_ms(self.timing.startup_delay_ms);
        log::info!("mount controller ready");
        Ok(())
    }

    /// Run one control cycle.
    pub fn poll(&mut self) -> Result<CycleOutcome, MountError<C, B>> {
        self.delay.delay_ms(self.timing.loop_delay_ms);
        if self.mode != Mode::Tracking {
            self.delay.delay_ms(self.timing.idle_delay_ms);
        }

        let one = self.pressed(Button::One)?;
        let two = self.pressed(Button::Two)?;
        let tracking = self.mode == Mode::Tracking;

        match (one, two) {
            (true, true) => self.calibrate(),
            (true, false) if !tracking => self.jog(Mode::JogPositive),
            (false, true) if !tracking => self.jog(Mode::JogNegative),
            _ if tracking => self.track(),
            _ => Ok(CycleOutcome::Idle),
        }
    }

    fn pressed(&mut self, button: Button) -> Result<bool, MountError<C, B>> {
        self.buttons.is_pressed(button).map_err(ControlError::Buttons)
    }

    fn both_pressed(&mut self) -> Result<bool, MountError<C, B>> {
        Ok(self.pressed(Button::One)? && self.pressed(Button::Two)?)
    }

    fn calibrate(&mut self) -> Result<CycleOutcome, MountError<C, B>> {
        let previous = self.mode;
        self.set_mode(Mode::Calibrating);
        self.delay.delay_ms(self.timing.debounce_ms);

        let still_held = match self.both_pressed() {
            Ok(held) => held,
            Err(e) => {
                self.set_mode(previous);
                return Err(e);
            }
        };
        if !still_held {
            log::debug!("double press released before debounce, ignoring");
            self.set_mode(previous);
            return Ok(CycleOutcome::CalibrationRejected);
        }

        let now = self.clock.now_ms();
        self.engine.zero();
        self.session = Some(TrackingSession::new(now));
        self.last_fault = None;
        self.set_mode(Mode::Tracking);
        log::info!("zeroed at {}ms, phase {}", now, self.engine.phase());

        // First tracking cycle runs on the calibrating pass
        match self.track()? {
            CycleOutcome::Faulted(fault) => Ok(CycleOutcome::Faulted(fault)),
            _ => Ok(CycleOutcome::Calibrated { start_ms: now }),
        }
    }

    fn jog(&mut self, mode: Mode) -> Result<CycleOutcome, MountError<C, B>> {
        let size = i32::try_from(self.jog.steps).unwrap_or(i32::MAX);
        let steps = if mode == Mode::JogNegative { -size } else { size };

        let target = self.engine.position() + i64::from(steps);
        if let Err(fault) = self.kinematics.check_travel(target) {
            return self.fault(fault);
        }

        self.set_mode(mode);
        log::debug!("jog {} steps to {}", steps, target);
        let moved = self.engine.advance(steps, &mut self.delay);
        self.delay.delay_ms(self.jog.guard_ms);
        self.set_mode(Mode::Idle);

        moved.map_err(ControlError::Coils)?;
        Ok(CycleOutcome::Jogged { steps })
    }

    fn track(&mut self) -> Result<CycleOutcome, MountError<C, B>> {
        let Some(session) = self.session.as_mut() else {
            self.set_mode(Mode::Idle);
            return Ok(CycleOutcome::Idle);
        };

        let now = self.clock.now_ms();
        match self.tracker.tick(
            session,
            &mut self.engine,
            &self.kinematics,
            &mut self.delay,
            now,
        ) {
            Ok(report) => Ok(CycleOutcome::Tracked(report)),
            Err(TrackingError::Fault(fault)) => self.fault(fault),
            Err(TrackingError::Coils(e)) => {
                log::warn!("coil error while tracking, returning to idle");
                self.session = None;
                self.set_mode(Mode::Idle);
                // Report the original error even if the release also fails
                let _ = self.engine.release();
                Err(ControlError::Coils(e))
            }
        }
    }

    fn fault(&mut self, fault: MotionFault) -> Result<CycleOutcome, MountError<C, B>> {
        log::warn!("{} in {}, returning to idle", fault, self.mode.as_str());
        self.last_fault = Some(fault);
        self.session = None;
        self.set_mode(Mode::Idle);
        self.engine.release().map_err(ControlError::Coils)?;
        Ok(CycleOutcome::Faulted(fault))
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            log::info!("mode {} -> {}", self.mode.as_str(), mode.as_str());
            self.mode = mode;
        }
    }

    /// Leave tracking and release the coils. Not bound to any button.
    pub fn stop_tracking(&mut self) -> Result<(), C::Error> {
        self.session = None;
        self.set_mode(Mode::Idle);
        self.engine.release()
    }

    /// Forget the last recorded fault.
    pub fn clear_fault(&mut self) {
        self.last_fault = None;
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Net steps since the last zero event.
    pub fn position(&self) -> i64 {
        self.engine.position()
    }

    /// Current commutation phase.
    pub fn phase(&self) -> u8 {
        self.engine.phase()
    }

    /// Mount angle for the current position.
    pub fn current_angle_deg(&self) -> Result<f64, MotionFault> {
        self.kinematics.angle_deg(self.engine.position())
    }

    /// Active tracking session, if any.
    pub fn session(&self) -> Option<&TrackingSession> {
        self.session.as_ref()
    }

    /// Most recent fault, if not cleared.
    pub fn last_fault(&self) -> Option<MotionFault> {
        self.last_fault
    }

    /// Check if there's a recorded fault.
    pub fn has_fault(&self) -> bool {
        self.last_fault.is_some()
    }

    /// The kinematic model in use.
    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    /// Borrow the commutation engine.
    pub fn engine(&self) -> &CommutationEngine<C> {
        &self.engine
    }

    /// Mutably borrow the button input.
    pub fn buttons_mut(&mut self) -> &mut B {
        &mut self.buttons
    }

    /// Borrow the clock.
    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Get the current state for logging or display.
    pub fn state(&self) -> MountState {
        let now = self.clock.now_ms();
        let elapsed_ms = self.session.and_then(|s| s.elapsed_ms(now).ok());
        MountState {
            mode: self.mode,
            position: self.engine.position(),
            phase: self.engine.phase(),
            angle_deg: self.current_angle_deg().ok(),
            target_deg: elapsed_ms.map(|ms| self.tracker.desired_angle_deg(ms)),
            session_start_ms: self.session.map(|s| s.start_ms),
            fault: self.last_fault,
        }
    }
}

/// Full state snapshot.
///
/// # Example
///
/// ```rust
/// use star_tracker::{Config, Mode, MountController};
/// use star_tracker::hal::{MockButtons, MockClock, MockCoils, MockDelay};
///
/// let clock = MockClock::new();
/// let mount = MountController::new(
///     MockCoils::new(),
///     MockButtons::new(&clock),
///     clock.clone(),
///     MockDelay::new(&clock),
///     &Config::default(),
/// )
/// .unwrap();
///
/// let state = mount.state();
/// assert_eq!(state.mode, Mode::Idle);
/// assert_eq!(state.angle_deg, Some(0.0));
/// assert!(state.fault.is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MountState {
    /// Current mode.
    pub mode: Mode,
    /// Net steps since the last zero event.
    pub position: i64,
    /// Commutation phase.
    pub phase: u8,
    /// Mount angle, if the position is inside the lever geometry.
    pub angle_deg: Option<f64>,
    /// Tracking target angle, if tracking.
    pub target_deg: Option<f64>,
    /// Session start time, if tracking.
    pub session_start_ms: Option<u64>,
    /// Most recent fault.
    pub fault: Option<MotionFault>,
}
