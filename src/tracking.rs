//! Proportional sidereal tracking.
//!
//! Once a [`TrackingSession`] is started, the mount angle should grow
//! linearly with time at the configured rate. Every control cycle the
//! [`TrackingController`] compares that target with the angle reported by the
//! [`Kinematics`] model and commands `round(gain × error)` steps.
//!
//! There is no integral or derivative term. At ~15°/h the target moves about
//! a quarter of a step per second, so the residual error is bounded by one
//! step plus one cycle of drift.
//!
//! # Example
//!
//! ```rust
//! use star_tracker::commutation::CommutationEngine;
//! use star_tracker::config::{MountGeometry, TrackingConfig};
//! use star_tracker::hal::{MockClock, MockCoils, MockDelay};
//! use star_tracker::kinematics::Kinematics;
//! use star_tracker::tracking::{TrackingController, TrackingSession};
//!
//! let clock = MockClock::new();
//! let mut delay = MockDelay::new(&clock);
//! let mut engine = CommutationEngine::new(MockCoils::new(), 1500);
//! let kinematics = Kinematics::new(MountGeometry::default());
//! let tracker = TrackingController::new(TrackingConfig::default());
//! let mut session = TrackingSession::new(0);
//!
//! // One minute in, the mount should be a quarter degree open
//! let report = tracker
//!     .tick(&mut session, &mut engine, &kinematics, &mut delay, 60_000)
//!     .unwrap();
//! assert!((report.desired_deg - 0.25).abs() < 0.001);
//! assert_eq!(report.commanded, 12);
//! assert_eq!(engine.position(), 12);
//! ```

use core::fmt;

use crate::commutation::CommutationEngine;
use crate::config::TrackingConfig;
use crate::fault::MotionFault;
use crate::kinematics::Kinematics;
use crate::traits::{CoilDriver, Delay};

/// An active tracking run, zeroed at `start_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackingSession {
    /// Clock reading when the step position was zeroed.
    pub start_ms: u64,
    last_status_ms: u64,
}

impl TrackingSession {
    /// Start a session at the given time.
    pub fn new(start_ms: u64) -> Self {
        Self {
            start_ms,
            last_status_ms: start_ms,
        }
    }

    /// Milliseconds since the session started.
    ///
    /// A clock reading before the start is reported as
    /// [`MotionFault::ClockWrapped`].
    pub fn elapsed_ms(&self, now_ms: u64) -> Result<u64, MotionFault> {
        now_ms
            .checked_sub(self.start_ms)
            .ok_or(MotionFault::ClockWrapped {
                start_ms: self.start_ms,
                now_ms,
            })
    }
}

/// What a single tracking cycle computed and commanded.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackingReport {
    /// Time since the session started.
    pub elapsed_ms: u64,
    /// Angle the mount should be at.
    pub desired_deg: f64,
    /// Angle the mount is at, before this cycle's move.
    pub current_deg: f64,
    /// `desired_deg − current_deg`.
    pub error_deg: f64,
    /// Steps issued to the commutation engine.
    pub commanded: i32,
}

/// Error from a tracking cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrackingError<E> {
    /// The cycle would have been physically invalid; nothing was moved.
    Fault(MotionFault),
    /// The coil driver failed while moving.
    Coils(E),
}

impl<E> From<MotionFault> for TrackingError<E> {
    fn from(fault: MotionFault) -> Self {
        TrackingError::Fault(fault)
    }
}

impl<E: fmt::Debug> fmt::Display for TrackingError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingError::Fault(fault) => write!(f, "tracking fault: {fault}"),
            TrackingError::Coils(e) => write!(f, "coil output error: {e:?}"),
        }
    }
}

/// Proportional tracking controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackingController {
    config: TrackingConfig,
}

impl TrackingController {
    /// Create a controller with the given rate and gain.
    pub fn new(config: TrackingConfig) -> Self {
        Self { config }
    }

    /// The configured rate and gain.
    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Target angle after `elapsed_ms` of tracking.
    ///
    /// ```
    /// use star_tracker::config::TrackingConfig;
    /// use star_tracker::tracking::TrackingController;
    ///
    /// let tracker = TrackingController::new(TrackingConfig::default());
    /// let one_hour = tracker.desired_angle_deg(3_600_000);
    /// assert!((one_hour - 15.0).abs() < 0.01);
    /// ```
    pub fn desired_angle_deg(&self, elapsed_ms: u64) -> f64 {
        let elapsed_s = elapsed_ms as f64 / 1000.0;
        elapsed_s * self.config.rate_deg_per_s
    }

    /// Steps to command for an angle error.
    ///
    /// Rounds half away from zero and saturates at the `i32` range.
    pub fn steps_for_error(&self, error_deg: f64) -> i32 {
        let raw = libm::round(self.config.gain_steps_per_deg * error_deg);
        // `as` saturates and maps NaN to 0
        raw as i32
    }

    /// Work out this cycle's command without touching the hardware.
    ///
    /// Fails if the clock went backwards, the current position is outside
    /// the lever geometry, or the command would cross the travel limit.
    pub fn plan(
        &self,
        session: &TrackingSession,
        position: i64,
        kinematics: &Kinematics,
        now_ms: u64,
    ) -> Result<TrackingReport, MotionFault> {
        let elapsed_ms = session.elapsed_ms(now_ms)?;
        let desired_deg = self.desired_angle_deg(elapsed_ms);
        let current_deg = kinematics.angle_deg(position)?;
        let error_deg = desired_deg - current_deg;
        let commanded = self.steps_for_error(error_deg);
        kinematics.check_travel(position + i64::from(commanded))?;

        Ok(TrackingReport {
            elapsed_ms,
            desired_deg,
            current_deg,
            error_deg,
            commanded,
        })
    }

    /// Run one tracking cycle: plan, then advance the engine.
    ///
    /// The engine is advanced every cycle, including by zero steps, which
    /// leaves the coils released.
    pub fn tick<C: CoilDriver, D: Delay>(
        &self,
        session: &mut TrackingSession,
        engine: &mut CommutationEngine<C>,
        kinematics: &Kinematics,
        delay: &mut D,
        now_ms: u64,
    ) -> Result<TrackingReport, TrackingError<C::Error>> {
        let report = self.plan(session, engine.position(), kinematics, now_ms)?;
        engine
            .advance(report.commanded, delay)
            .map_err(TrackingError::Coils)?;

        log::trace!(
            "track t={}ms desired={:.4} current={:.4} steps={}",
            report.elapsed_ms,
            report.desired_deg,
            report.current_deg,
            report.commanded
        );
        if now_ms.saturating_sub(session.last_status_ms) >= self.config.status_interval_ms {
            session.last_status_ms = now_ms;
            log::info!(
                "tracking {}s: angle {:.3}° (target {:.3}°), position {}",
                report.elapsed_ms / 1000,
                report.current_deg,
                report.desired_deg,
                engine.position()
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MountGeometry;
    use crate::hal::{MockClock, MockCoils, MockDelay};

    struct Rig {
        engine: CommutationEngine<MockCoils>,
        delay: MockDelay,
        kinematics: Kinematics,
        tracker: TrackingController,
    }

    fn rig(geometry: MountGeometry) -> Rig {
        let clock = MockClock::new();
        Rig {
            engine: CommutationEngine::new(MockCoils::new(), 1500),
            delay: MockDelay::new(&clock),
            kinematics: Kinematics::new(geometry),
            tracker: TrackingController::new(TrackingConfig::default()),
        }
    }

    // =========================================================================
    // Target Angle Tests
    // =========================================================================

    #[test]
    fn desired_angle_starts_at_zero() {
        let tracker = TrackingController::new(TrackingConfig::default());
        assert_eq!(tracker.desired_angle_deg(0), 0.0);
    }

    #[test]
    fn desired_angle_after_one_hour() {
        let tracker = TrackingController::new(TrackingConfig::default());
        let angle = tracker.desired_angle_deg(3_600_000);
        assert!((angle - 15.0).abs() < 0.01, "angle = {angle}");
    }

    // =========================================================================
    // Rounding Tests
    // =========================================================================

    #[test]
    fn steps_round_half_away_from_zero() {
        let tracker = TrackingController::new(TrackingConfig::default().with_gain(1.0));
        assert_eq!(tracker.steps_for_error(2.5), 3);
        assert_eq!(tracker.steps_for_error(-2.5), -3);
        assert_eq!(tracker.steps_for_error(2.49), 2);
        assert_eq!(tracker.steps_for_error(0.4), 0);
        assert_eq!(tracker.steps_for_error(-0.4), 0);
    }

    #[test]
    fn steps_saturate() {
        let tracker = TrackingController::new(TrackingConfig::default());
        assert_eq!(tracker.steps_for_error(1e12), i32::MAX);
        assert_eq!(tracker.steps_for_error(-1e12), i32::MIN);
        assert_eq!(tracker.steps_for_error(f64::NAN), 0);
    }

    // =========================================================================
    // Tick Tests
    // =========================================================================

    #[test]
    fn tick_at_start_commands_zero_and_releases() {
        let mut r = rig(MountGeometry::default());
        let mut session = TrackingSession::new(1000);
        let report = r
            .tracker
            .tick(&mut session, &mut r.engine, &r.kinematics, &mut r.delay, 1000)
            .unwrap();
        assert_eq!(report.commanded, 0);
        assert_eq!(r.engine.position(), 0);
        assert_eq!(r.engine.coils().release_count, 1);
    }

    #[test]
    fn tick_after_one_hour_moves_toward_target() {
        let mut r = rig(MountGeometry::default());
        let mut session = TrackingSession::new(0);
        let now = 3_600_000;

        let first = r
            .tracker
            .tick(&mut session, &mut r.engine, &r.kinematics, &mut r.delay, now)
            .unwrap();
        assert!((first.desired_deg - 15.0).abs() < 0.01);
        assert_eq!(first.current_deg, 0.0);
        assert_eq!(first.commanded, 750);
        assert_eq!(r.engine.position(), 750);

        let second = r
            .tracker
            .tick(&mut session, &mut r.engine, &r.kinematics, &mut r.delay, now)
            .unwrap();
        assert!(second.current_deg > first.current_deg);
        assert!(second.error_deg < first.error_deg);
        assert!(second.commanded > 0);
    }

    #[test]
    fn tick_backs_off_when_ahead() {
        let mut r = rig(MountGeometry::default());
        let mut session = TrackingSession::new(0);
        let ahead = r.kinematics.steps_for_angle(2.0);
        r.engine.advance(ahead as i32, &mut r.delay).unwrap();

        let report = r
            .tracker
            .tick(&mut session, &mut r.engine, &r.kinematics, &mut r.delay, 60_000)
            .unwrap();
        assert!(report.error_deg < 0.0);
        assert!(report.commanded < 0);
        assert!(r.engine.position() < ahead);
    }

    #[test]
    fn clock_before_start_is_fault() {
        let mut r = rig(MountGeometry::default());
        let mut session = TrackingSession::new(5000);
        let result = r
            .tracker
            .tick(&mut session, &mut r.engine, &r.kinematics, &mut r.delay, 4000);
        assert_eq!(
            result,
            Err(TrackingError::Fault(MotionFault::ClockWrapped {
                start_ms: 5000,
                now_ms: 4000
            }))
        );
        assert_eq!(r.engine.position(), 0);
    }

    #[test]
    fn travel_limit_blocks_command() {
        let mut r = rig(MountGeometry::default().with_travel_limit_steps(100));
        let mut session = TrackingSession::new(0);
        let result = r.tracker.tick(
            &mut session,
            &mut r.engine,
            &r.kinematics,
            &mut r.delay,
            3_600_000,
        );
        assert_eq!(
            result,
            Err(TrackingError::Fault(MotionFault::TravelLimit {
                target: 750,
                limit: 100
            }))
        );
        assert_eq!(r.engine.position(), 0);
        assert!(r.engine.coils().pattern_history().next().is_none());
    }

    #[test]
    fn position_outside_geometry_is_range_fault() {
        let r = rig(MountGeometry::default());
        let session = TrackingSession::new(0);
        let past = r.kinematics.geometric_limit_steps() + 1;
        let result = r.tracker.plan(&session, past, &r.kinematics, 1000);
        assert!(matches!(result, Err(MotionFault::RangeExceeded { .. })));
    }

    #[test]
    fn coil_error_is_reported() {
        let mut r = rig(MountGeometry::default());
        let mut session = TrackingSession::new(0);
        r.engine.coils_mut().fail_after(0);
        let result = r.tracker.tick(
            &mut session,
            &mut r.engine,
            &r.kinematics,
            &mut r.delay,
            3_600_000,
        );
        assert_eq!(result, Err(TrackingError::Coils(())));
    }
}
