//! Blocking waits for the control loop.

use esp_idf_hal::delay::{Ets, FreeRtos};

use crate::traits::Delay;

/// ESP32 delay provider.
///
/// Microsecond waits (coil settle time) busy-wait in ROM so the step timing
/// is not stretched by a scheduler tick. Millisecond waits (pacing, debounce)
/// yield to FreeRTOS so the idle task can feed the watchdog.
#[derive(Clone, Copy, Debug, Default)]
pub struct Esp32Delay;

impl Esp32Delay {
    /// Creates a new delay provider.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Delay for Esp32Delay {
    #[inline]
    fn delay_us(&mut self, us: u32) {
        Ets::delay_us(us);
    }

    #[inline]
    fn delay_ms(&mut self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }
}
