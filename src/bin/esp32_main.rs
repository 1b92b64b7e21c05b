//! ESP32-C3 SuperMini star tracker firmware.
//!
//! This is the main entry point for the physical mount. It runs the mode
//! state machine forever:
//! - Button one / button two jog the rod forward / backward
//! - Both buttons held through the debounce zero the mount and start tracking
//! - While tracking, each cycle corrects toward the sidereal angle
//!
//! # Hardware Setup
//!
//! ULN2003 IN1-IN4 on GPIO2-5, buttons to ground on GPIO6 and GPIO7.
//! The pin table is in the `star_tracker::hal::esp32` module docs.
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features esp32 --bin esp32_main
//! espflash flash --monitor target/riscv32imc-esp-espidf/release/esp32_main
//! ```

use anyhow::Context;
use esp_idf_hal::gpio::{
    AnyIOPin, AnyOutputPin, IOPin, Input, Output, OutputPin, PinDriver, Pull,
};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::log::EspLogger;
use star_tracker::hal::esp32::{Esp32Clock, Esp32Delay};
use star_tracker::hal::{GpioButtons, GpioCoils};
use star_tracker::{Config, CycleOutcome, MountController};

fn output(pin: AnyOutputPin) -> anyhow::Result<PinDriver<'static, AnyOutputPin, Output>> {
    PinDriver::output(pin).context("coil output")
}

fn button(pin: AnyIOPin) -> anyhow::Result<PinDriver<'static, AnyIOPin, Input>> {
    let mut driver = PinDriver::input(pin).context("button input")?;
    driver.set_pull(Pull::Up).context("button pull-up")?;
    Ok(driver)
}

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    EspLogger::initialize_default();

    let config = Config::default();
    config.validate()?;
    log::info!("{} starting", config.device.name);

    let peripherals = Peripherals::take().context("peripherals already taken")?;
    let pins = peripherals.pins;

    // =========================================================================
    // Coils (ULN2003, logical order IN1, IN3, IN2, IN4)
    // =========================================================================
    let coils = GpioCoils::new(
        [
            output(pins.gpio2.downgrade_output())?,
            output(pins.gpio4.downgrade_output())?,
            output(pins.gpio3.downgrade_output())?,
            output(pins.gpio5.downgrade_output())?,
        ],
        config.device.coil_polarity,
    );
    log::info!("coils on GPIO2/4/3/5");

    // =========================================================================
    // Buttons (pull-up, pressed = low)
    // =========================================================================
    let buttons = GpioButtons::new(
        button(pins.gpio6.downgrade())?,
        button(pins.gpio7.downgrade())?,
    );
    log::info!("buttons on GPIO6/7");

    let mut mount = MountController::new(
        coils,
        buttons,
        Esp32Clock::new(),
        Esp32Delay::new(),
        &config,
    )?;
    mount.start().context("releasing coils")?;

    log::info!("hold both buttons to zero and start tracking");

    loop {
        match mount.poll() {
            Ok(CycleOutcome::Jogged { steps }) => {
                log::info!("jog {} -> position {}", steps, mount.position());
            }
            Ok(CycleOutcome::Calibrated { start_ms }) => {
                log::info!("tracking from t={}ms", start_ms);
            }
            Ok(CycleOutcome::Faulted(fault)) => {
                log::error!("{}; hold both buttons to restart", fault);
            }
            Ok(_) => {}
            Err(e) => {
                log::error!("I/O error: {}", e);
            }
        }
    }
}
