//! Step count to mount angle for a barn-door tracker.
//!
//! The threaded rod pushes the top board away from the bottom board at a
//! fixed distance from the hinge. With `d` the rod displacement and `L` the
//! lever length, the opening angle satisfies
//!
//! ```text
//! cos θ = 1 − d² / (2 L²)
//! ```
//!
//! which is the law of cosines for the isosceles triangle formed by the two
//! boards and the chord between the rod contact points.
//!
//! The model is pure: it only depends on the step position and the
//! [`MountGeometry`]. Positions whose cosine argument falls outside `[-1, 1]`
//! are rejected with [`MotionFault::RangeExceeded`] rather than clamped.
//!
//! # Example
//!
//! ```rust
//! use star_tracker::config::MountGeometry;
//! use star_tracker::kinematics::Kinematics;
//!
//! let kinematics = Kinematics::new(MountGeometry::default());
//! assert_eq!(kinematics.angle_deg(0).unwrap(), 0.0);
//!
//! let steps = kinematics.steps_for_angle(15.0);
//! let angle = kinematics.angle_deg(steps).unwrap();
//! assert!((angle - 15.0).abs() < 0.01);
//! ```

use crate::config::MountGeometry;
use crate::fault::MotionFault;

/// Degrees per radian.
const RAD_TO_DEG: f64 = 180.0 / core::f64::consts::PI;

/// Mount kinematic model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kinematics {
    geometry: MountGeometry,
}

impl Kinematics {
    /// Create a model for the given geometry.
    pub fn new(geometry: MountGeometry) -> Self {
        Self { geometry }
    }

    /// The geometry this model was built from.
    pub fn geometry(&self) -> &MountGeometry {
        &self.geometry
    }

    /// Rod displacement in millimetres for a step position.
    #[inline]
    pub fn displacement_mm(&self, position: i64) -> f64 {
        position as f64 * self.geometry.mm_per_step()
    }

    /// Argument of the inverse cosine, `1 − d² / (2 L²)`.
    pub fn cosine_arg(&self, position: i64) -> f64 {
        let d = self.displacement_mm(position);
        let lever = self.geometry.lever_mm;
        1.0 - (d * d) / (2.0 * lever * lever)
    }

    /// Mount opening angle in degrees for a step position.
    ///
    /// The angle depends only on |position|: the screw pushing the boards
    /// apart in either direction opens the hinge.
    pub fn angle_deg(&self, position: i64) -> Result<f64, MotionFault> {
        let arg = self.cosine_arg(position);
        if !(-1.0..=1.0).contains(&arg) {
            return Err(MotionFault::RangeExceeded {
                position,
                cosine_arg: arg,
            });
        }
        Ok(libm::acos(arg) * RAD_TO_DEG)
    }

    /// Nearest step position (non-negative) that opens the mount to `angle_deg`.
    ///
    /// Inverse of [`angle_deg`](Self::angle_deg): `d = 2 L sin(θ / 2)`.
    /// Angles are taken modulo nothing; values beyond 180° give positions past
    /// the geometric limit.
    pub fn steps_for_angle(&self, angle_deg: f64) -> i64 {
        let half = angle_deg.abs() / RAD_TO_DEG / 2.0;
        let d = 2.0 * self.geometry.lever_mm * libm::sin(half);
        libm::round(d / self.geometry.mm_per_step()) as i64
    }

    /// Largest |position| for which the angle is defined.
    ///
    /// At this point the rod has pushed the boards fully open (d = 2 L).
    pub fn geometric_limit_steps(&self) -> i64 {
        let max_d = 2.0 * self.geometry.lever_mm;
        libm::floor(max_d / self.geometry.mm_per_step()) as i64
    }

    /// The tighter of the configured travel limit and the geometric limit.
    pub fn travel_limit_steps(&self) -> i64 {
        let geometric = self.geometric_limit_steps();
        match self.geometry.travel_limit_steps {
            Some(limit) => limit.min(geometric),
            None => geometric,
        }
    }

    /// Check that `target` is inside the travel limit.
    pub fn check_travel(&self, target: i64) -> Result<(), MotionFault> {
        let limit = self.travel_limit_steps();
        if target.abs() > limit {
            Err(MotionFault::TravelLimit { target, limit })
        } else {
            Ok(())
        }
    }
}
