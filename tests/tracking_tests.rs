//! Integration tests for sidereal tracking

use star_tracker::hal::{MockClock, MockCoils, MockDelay};
use star_tracker::{
    CommutationEngine, Kinematics, MountGeometry, TrackingConfig, TrackingController,
    TrackingSession,
};

struct Rig {
    engine: CommutationEngine<MockCoils>,
    delay: MockDelay,
    kinematics: Kinematics,
    tracker: TrackingController,
}

fn rig() -> Rig {
    let clock = MockClock::new();
    Rig {
        engine: CommutationEngine::new(MockCoils::new(), 1500),
        delay: MockDelay::new(&clock),
        kinematics: Kinematics::new(MountGeometry::default()),
        tracker: TrackingController::new(TrackingConfig::default()),
    }
}

#[test]
fn one_hour_target_is_fifteen_degrees() {
    let rig = rig();
    let desired = rig.tracker.desired_angle_deg(3_600_000);
    assert!((desired - 15.0).abs() < 0.001, "desired = {desired}");
}

#[test]
fn first_tick_after_one_hour_commands_750_steps() {
    let mut rig = rig();
    let mut session = TrackingSession::new(0);

    let report = rig
        .tracker
        .tick(
            &mut session,
            &mut rig.engine,
            &rig.kinematics,
            &mut rig.delay,
            3_600_000,
        )
        .unwrap();

    assert_eq!(report.current_deg, 0.0);
    assert_eq!(report.commanded, 750);
    assert_eq!(rig.engine.position(), 750);
    assert!(rig.engine.coils().all_inactive());
}

#[test]
fn repeated_ticks_converge_on_target() {
    let mut rig = rig();
    let mut session = TrackingSession::new(0);

    let mut last_error = f64::MAX;
    for _ in 0..2000 {
        let report = rig
            .tracker
            .tick(
                &mut session,
                &mut rig.engine,
                &rig.kinematics,
                &mut rig.delay,
                3_600_000,
            )
            .unwrap();
        assert!(report.error_deg.abs() <= last_error + 1e-9);
        last_error = report.error_deg.abs();
        if report.commanded == 0 {
            break;
        }
    }

    let angle = rig.kinematics.angle_deg(rig.engine.position()).unwrap();
    assert!((angle - 15.0).abs() < 0.02, "angle = {angle}");
    assert!(rig.engine.is_in_sync());
}

#[test]
fn steady_tracking_keeps_error_small() {
    let mut rig = rig();
    let mut session = TrackingSession::new(0);

    // Five minutes of 2ms cycles
    let mut now = 0;
    while now <= 300_000 {
        let report = rig
            .tracker
            .tick(
                &mut session,
                &mut rig.engine,
                &rig.kinematics,
                &mut rig.delay,
                now,
            )
            .unwrap();
        assert!(report.error_deg.abs() < 0.02, "error {} at {now}", report.error_deg);
        now += 2;
    }

    let angle = rig.kinematics.angle_deg(rig.engine.position()).unwrap();
    assert!((angle - 1.25).abs() < 0.02, "angle = {angle}");
}

#[test]
fn session_anchor_is_calibration_time() {
    let rig = rig();
    let session = TrackingSession::new(10_000);
    let report = rig
        .tracker
        .plan(&session, 0, &rig.kinematics, 10_000 + 3_600_000)
        .unwrap();
    assert_eq!(report.elapsed_ms, 3_600_000);
    assert_eq!(report.commanded, 750);
}
