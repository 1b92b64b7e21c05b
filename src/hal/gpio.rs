//! Adapters over `embedded-hal` 1.0 pins and delays.
//!
//! Any board whose HAL implements the `embedded-hal` digital and delay traits
//! can drive the mount through these wrappers.
//!
//! Requires the `embedded-hal` feature.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::traits::{Button, ButtonInput, Coil, CoilDriver, Delay, Polarity};

/// Four coil outputs on GPIO pins.
///
/// Pins are given in logical coil order A, B, C, D. On a ULN2003 board that
/// is IN1, IN3, IN2, IN4.
#[derive(Debug)]
pub struct GpioCoils<P> {
    pins: [P; 4],
    polarity: Polarity,
}

impl<P: OutputPin> GpioCoils<P> {
    /// Wrap four output pins.
    pub fn new(pins: [P; 4], polarity: Polarity) -> Self {
        GpioCoils { pins, polarity }
    }

    /// Give the pins back.
    pub fn into_inner(self) -> [P; 4] {
        self.pins
    }
}

impl<P: OutputPin> CoilDriver for GpioCoils<P> {
    type Error = P::Error;

    #[inline]
    fn set_coil(&mut self, coil: Coil, active: bool) -> Result<(), Self::Error> {
        let pin = &mut self.pins[coil.index()];
        if self.polarity.level(active) {
            pin.set_high()
        } else {
            pin.set_low()
        }
    }
}

/// Two push buttons wired to ground with pull-ups.
///
/// A high level reads as released.
#[derive(Debug)]
pub struct GpioButtons<One, Two> {
    one: One,
    two: Two,
}

impl<One, Two> GpioButtons<One, Two> {
    /// Wrap the two button inputs.
    pub fn new(one: One, two: Two) -> Self {
        GpioButtons { one, two }
    }

    /// Give the pins back.
    pub fn into_inner(self) -> (One, Two) {
        (self.one, self.two)
    }
}

impl<One, Two, E> ButtonInput for GpioButtons<One, Two>
where
    One: InputPin<Error = E>,
    Two: InputPin<Error = E>,
{
    type Error = E;

    fn is_released(&mut self, button: Button) -> Result<bool, Self::Error> {
        match button {
            Button::One => self.one.is_high(),
            Button::Two => self.two.is_high(),
        }
    }
}

/// [`Delay`] on top of any `embedded-hal` delay provider.
#[derive(Debug, Default)]
pub struct HalDelay<D>(pub D);

impl<D: DelayNs> Delay for HalDelay<D> {
    #[inline]
    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us);
    }

    #[inline]
    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct Pin {
        high: bool,
    }

    impl ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    impl InputPin for Pin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.high)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.high)
        }
    }

    fn levels(coils: GpioCoils<Pin>) -> [bool; 4] {
        coils.into_inner().map(|p| p.high)
    }

    #[test]
    fn coils_follow_polarity() {
        let mut high = GpioCoils::new(Default::default(), Polarity::ActiveHigh);
        high.set_coil(Coil::B, true).unwrap();
        assert_eq!(levels(high), [false, true, false, false]);

        let mut low = GpioCoils::new(Default::default(), Polarity::ActiveLow);
        low.release().unwrap();
        low.set_coil(Coil::D, true).unwrap();
        assert_eq!(levels(low), [true, true, true, false]);
    }

    #[test]
    fn pulled_up_button_reads_released() {
        let mut buttons = GpioButtons::new(Pin { high: true }, Pin { high: false });
        assert!(buttons.is_released(Button::One).unwrap());
        assert!(buttons.is_pressed(Button::Two).unwrap());
    }
}
