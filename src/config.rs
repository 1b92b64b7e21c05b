//! Compiled-in configuration for the tracker.
//!
//! Every constant the motion core needs lives here, with defaults matching
//! the reference barn-door build (28BYJ-48 motor, M5 × 0.8 threaded rod,
//! 89 mm hinge-to-rod lever). Values are built in code at startup; nothing is
//! read from storage. Uses `heapless::String` for `no_std` compatibility.
//!
//! # Example
//!
//! ```rust
//! use star_tracker::config::{Config, JogConfig, MountGeometry};
//!
//! // Use defaults
//! let config = Config::default();
//! assert!(config.validate().is_ok());
//!
//! // Or customize
//! let config = Config::default()
//!     .with_geometry(MountGeometry::default().with_lever_mm(120.0))
//!     .with_jog(JogConfig::default().with_steps(400));
//! assert!(config.validate().is_ok());
//! ```

use core::fmt;

use heapless::String as HString;

use crate::traits::Polarity;

/// Maximum length for short config strings (device names)
pub const MAX_SHORT_STRING: usize = 32;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Create a ShortString from a &str, truncating at a character boundary if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    for c in s.chars() {
        if hs.push(c).is_err() {
            break;
        }
    }
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete controller configuration
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Mechanical constants of the mount
    pub geometry: MountGeometry,
    /// Sidereal tracking loop parameters
    pub tracking: TrackingConfig,
    /// Settle, debounce and pacing intervals
    pub timing: TimingConfig,
    /// Manual jog parameters
    pub jog: JogConfig,
    /// Board identification and wiring
    pub device: DeviceConfig,
}

impl Config {
    /// Set mount geometry
    pub fn with_geometry(mut self, geometry: MountGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set tracking configuration
    pub fn with_tracking(mut self, tracking: TrackingConfig) -> Self {
        self.tracking = tracking;
        self
    }

    /// Set timing configuration
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Set jog configuration
    pub fn with_jog(mut self, jog: JogConfig) -> Self {
        self.jog = jog;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }

    /// Check that every physical constant is usable.
    ///
    /// Geometry and rate must be positive and finite, the gain finite, the jog
    /// size non-zero and any travel limit positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::NotPositive { field, value })
            }
        };

        positive("steps_per_rev", self.geometry.steps_per_rev)?;
        positive("pitch_mm", self.geometry.pitch_mm)?;
        positive("lever_mm", self.geometry.lever_mm)?;
        positive("rate_deg_per_s", self.tracking.rate_deg_per_s)?;

        if !self.tracking.gain_steps_per_deg.is_finite() {
            return Err(ConfigError::NonFiniteGain);
        }
        if self.jog.steps == 0 {
            return Err(ConfigError::ZeroJog);
        }
        if let Some(limit) = self.geometry.travel_limit_steps {
            if limit <= 0 {
                return Err(ConfigError::InvalidTravelLimit(limit));
            }
        }
        Ok(())
    }
}

/// Reason a [`Config`] was rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// A constant that must be positive and finite is not.
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Its value.
        value: f64,
    },
    /// The proportional gain is NaN or infinite.
    NonFiniteGain,
    /// The jog size is zero.
    ZeroJog,
    /// The travel limit is zero or negative.
    InvalidTravelLimit(i64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            ConfigError::NonFiniteGain => f.write_str("tracking gain must be finite"),
            ConfigError::ZeroJog => f.write_str("jog step count must be non-zero"),
            ConfigError::InvalidTravelLimit(limit) => {
                write!(f, "travel limit must be positive, got {limit}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

// ============================================================================
// Mount Geometry
// ============================================================================

/// Mechanical constants of the drive train and mount
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MountGeometry {
    /// Full steps per output shaft revolution (geared 28BYJ-48: ~2037.89)
    pub steps_per_rev: f64,
    /// Threaded rod advance per revolution in millimetres
    pub pitch_mm: f64,
    /// Hinge-to-rod lever arm length in millimetres
    pub lever_mm: f64,
    /// Largest allowed |step position|; `None` leaves only the geometric limit
    pub travel_limit_steps: Option<i64>,
}

impl Default for MountGeometry {
    fn default() -> Self {
        Self {
            steps_per_rev: 2037.8864,
            pitch_mm: 0.8,
            lever_mm: 89.0,
            travel_limit_steps: None,
        }
    }
}

impl MountGeometry {
    /// Set steps per revolution
    pub fn with_steps_per_rev(mut self, steps: f64) -> Self {
        self.steps_per_rev = steps;
        self
    }

    /// Set rod pitch
    pub fn with_pitch_mm(mut self, pitch: f64) -> Self {
        self.pitch_mm = pitch;
        self
    }

    /// Set lever arm length
    pub fn with_lever_mm(mut self, lever: f64) -> Self {
        self.lever_mm = lever;
        self
    }

    /// Set the travel limit in steps
    pub fn with_travel_limit_steps(mut self, limit: i64) -> Self {
        self.travel_limit_steps = Some(limit);
        self
    }

    /// Rod displacement per full step in millimetres
    #[inline]
    pub fn mm_per_step(&self) -> f64 {
        self.pitch_mm / self.steps_per_rev
    }
}

// ============================================================================
// Tracking Config
// ============================================================================

/// Closed-loop tracking parameters
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackingConfig {
    /// Target angular rate in degrees per second (15°/h sidereal ≈ 0.0041666)
    pub rate_deg_per_s: f64,
    /// Proportional gain in steps per degree of error
    pub gain_steps_per_deg: f64,
    /// Interval between status log lines while tracking
    pub status_interval_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            rate_deg_per_s: 0.0041666,
            gain_steps_per_deg: 50.0,
            status_interval_ms: 5000,
        }
    }
}

impl TrackingConfig {
    /// Set the angular rate
    pub fn with_rate_deg_per_s(mut self, rate: f64) -> Self {
        self.rate_deg_per_s = rate;
        self
    }

    /// Set the proportional gain
    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain_steps_per_deg = gain;
        self
    }

    /// Set the status log interval
    pub fn with_status_interval_ms(mut self, ms: u64) -> Self {
        self.status_interval_ms = ms;
        self
    }
}

// ============================================================================
// Timing Config
// ============================================================================

/// Blocking wait durations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingConfig {
    /// Hold time after each coil pattern change in microseconds
    pub settle_us: u32,
    /// Wait at the start of every control cycle
    pub loop_delay_ms: u32,
    /// Additional wait per cycle when not tracking
    pub idle_delay_ms: u32,
    /// How long both buttons must stay pressed to calibrate
    pub debounce_ms: u32,
    /// Wait after power-up before the first cycle
    pub startup_delay_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_us: 1500,
            loop_delay_ms: 2,
            idle_delay_ms: 200,
            debounce_ms: 1000,
            startup_delay_ms: 100,
        }
    }
}

impl TimingConfig {
    /// Set the coil settle time
    pub fn with_settle_us(mut self, us: u32) -> Self {
        self.settle_us = us;
        self
    }

    /// Set the per-cycle delay
    pub fn with_loop_delay_ms(mut self, ms: u32) -> Self {
        self.loop_delay_ms = ms;
        self
    }

    /// Set the extra idle delay
    pub fn with_idle_delay_ms(mut self, ms: u32) -> Self {
        self.idle_delay_ms = ms;
        self
    }

    /// Set the calibration debounce interval
    pub fn with_debounce_ms(mut self, ms: u32) -> Self {
        self.debounce_ms = ms;
        self
    }
}

// ============================================================================
// Jog Config
// ============================================================================

/// Manual jog parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JogConfig {
    /// Steps moved per jog
    pub steps: u32,
    /// Wait after a jog before buttons are sampled again
    pub guard_ms: u32,
}

impl Default for JogConfig {
    fn default() -> Self {
        Self {
            steps: 200,
            guard_ms: 50,
        }
    }
}

impl JogConfig {
    /// Set the jog size
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    /// Set the post-jog guard delay
    pub fn with_guard_ms(mut self, ms: u32) -> Self {
        self.guard_ms = ms;
        self
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Board identification and output wiring
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
    /// Pin level that energises a coil
    pub coil_polarity: Polarity,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("Star Tracker"),
            coil_polarity: Polarity::ActiveHigh,
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }

    /// Set the coil polarity
    pub fn with_coil_polarity(mut self, polarity: Polarity) -> Self {
        self.coil_polarity = polarity;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
