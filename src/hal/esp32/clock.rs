//! Monotonic milliseconds since boot.

use crate::traits::Clock;

/// ESP32 clock backed by the high resolution `esp_timer`.
///
/// Tracking sessions are measured against this clock, so it must not be
/// adjusted by SNTP or anything else that moves wall time.
///
/// # Example
///
/// ```ignore
/// use star_tracker::hal::esp32::Esp32Clock;
/// use star_tracker::traits::Clock;
///
/// let clock = Esp32Clock::new();
/// let start = clock.now_ms();
/// // ... track ...
/// let elapsed = clock.now_ms() - start;
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Esp32Clock;

impl Esp32Clock {
    /// Creates a new ESP32 clock instance.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for Esp32Clock {
    #[inline]
    fn now_ms(&self) -> u64 {
        // Safe: read-only query of the boot timer
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        u64::try_from(micros / 1000).unwrap_or(0)
    }
}
