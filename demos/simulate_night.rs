//! Host simulation of a tracking session.
//!
//! Runs the full controller against the mock hardware: jogs the rod out a
//! little, holds both buttons to zero, then tracks for a simulated hour and
//! prints the mount state every ten minutes.
//!
//! ```bash
//! cargo run --example simulate_night
//! ```

use star_tracker::hal::{MockButtons, MockClock, MockCoils, MockDelay};
use star_tracker::traits::{Button, Clock};
use star_tracker::{Config, CycleOutcome, MountController};

/// Simulated session length.
const SESSION_MS: u64 = 60 * 60 * 1000;

/// Time between printed snapshots.
const REPORT_EVERY_MS: u64 = 10 * 60 * 1000;

fn main() {
    let clock = MockClock::new();
    let mut buttons = MockButtons::new(&clock);

    // One forward jog, then both buttons through the debounce
    buttons.press(Button::One, 0, 700);
    buttons.press(Button::One, 1_000, 3_500);
    buttons.press(Button::Two, 1_000, 3_500);

    let config = Config::default();
    let mut mount = MountController::new(
        MockCoils::new(),
        buttons,
        clock.clone(),
        MockDelay::new(&clock),
        &config,
    )
    .expect("default config is valid");
    mount.start().expect("mock coils never fail");

    println!("{}: waiting for buttons", config.device.name);

    let mut start_ms = None;
    while start_ms.is_none() {
        match mount.poll().expect("mock hardware never fails") {
            CycleOutcome::Jogged { steps } => {
                println!("[{:>6} ms] jog {:+} -> {}", clock.now_ms(), steps, mount.position());
            }
            CycleOutcome::Calibrated { start_ms: t } => {
                println!("[{:>6} ms] zeroed, tracking", t);
                start_ms = Some(t);
            }
            _ => {}
        }
    }
    mount.buttons_mut().release_all();

    let start_ms = start_ms.unwrap_or_default();
    let mut next_report = start_ms;
    let mut steps = 0i64;
    while clock.now_ms() < start_ms + SESSION_MS {
        match mount.poll().expect("mock hardware never fails") {
            CycleOutcome::Tracked(report) => steps += i64::from(report.commanded),
            CycleOutcome::Faulted(fault) => {
                println!("fault: {}", fault);
                return;
            }
            _ => {}
        }

        if clock.now_ms() >= next_report {
            let state = mount.state();
            println!(
                "[{:>4} min] target {:>8.4}°  mount {:>8.4}°  position {:>6}  phase {}",
                (clock.now_ms() - start_ms) / 60_000,
                state.target_deg.unwrap_or_default(),
                state.angle_deg.unwrap_or_default(),
                state.position,
                state.phase,
            );
            next_report += REPORT_EVERY_MS;
        }
    }

    println!("{} steps commanded over the session", steps);
}
