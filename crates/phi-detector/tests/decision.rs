use phi_core::{DetectorConfig, PhiError};
use phi_detector::{DetectorState, PhiDetector};
use phi_hal::{NullSink, Telemetry, TelemetryEvent};

fn detector() -> PhiDetector<Vec<Telemetry>> {
    PhiDetector::new(DetectorConfig::default(), Vec::new()).unwrap()
}

fn with_threshold(phi_threshold: f64) -> PhiDetector<Vec<Telemetry>> {
    let cfg = DetectorConfig { phi_threshold, ..Default::default() };
    PhiDetector::new(cfg, Vec::new()).unwrap()
}

fn decisions(det: &PhiDetector<Vec<Telemetry>>) -> Vec<(bool, f64)> {
    det.sink()
        .iter()
        .filter_map(|r| match r.event {
            TelemetryEvent::Decision { sent, phi } => Some((sent, phi)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_rejects_invalid_config() {
    let cfg = DetectorConfig { window_size: 1, ..Default::default() };
    assert_eq!(PhiDetector::new(cfg, NullSink).err(), Some(PhiError::WindowTooSmall(1)));
}

#[test]
fn test_first_decision_sets_baseline() {
    let mut det = detector();
    assert_eq!(det.state(), DetectorState::Uninitialized);

    assert!(!det.decide(0.0, false));
    assert_eq!(det.state(), DetectorState::Tracking);
    assert_eq!(det.window().heartbeats()[0], 0.0);
    assert_eq!(det.window().heartbeat_cursor(), 0);
    // Bootstrapping evaluates nothing.
    assert!(det.sink().is_empty());
}

#[test]
fn test_early_decision_is_suppressed() {
    let mut det = detector();
    det.decide(0.0, false);

    assert!(!det.decide(0.5, false));
    let records = det.sink();
    assert_eq!(records.len(), 2);
    match records[0].event {
        TelemetryEvent::Suspicion { phi, survival_prob, mean, variance } => {
            assert!(survival_prob > 1e-7);
            assert!(phi < 1e-6, "phi = {}", phi);
            assert_eq!(mean, 1.0);
            assert_eq!(variance, 0.1);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(records[1].at, 0.5);
    assert!(matches!(records[1].event, TelemetryEvent::Decision { sent: false, .. }));
}

#[test]
fn test_repeat_timestamp_reads_zero_elapsed() {
    let mut det = detector();
    assert!(!det.decide(3.0, false));
    assert!(!det.decide(3.0, false));
    assert_eq!(det.state(), DetectorState::Tracking);

    // Zero elapsed against mean 1.0 means no suspicion at all.
    let (sent, phi) = decisions(&det)[0];
    assert!(!sent);
    assert_eq!(phi, 0.0);
}

#[test]
fn test_overdue_heartbeat_is_sent() {
    let mut det = detector();
    det.decide(0.0, false);

    assert!(det.decide(2.0, false));
    let (sent, phi) = decisions(&det)[0];
    assert!(sent);
    assert!((phi - 7.0).abs() < 1e-9, "phi should sit at the floor ceiling, got {}", phi);

    // mean = 1.0 + (2.0 - 1.0)^2
    assert_eq!(det.estimate().mean, 2.0);
    assert_eq!(det.window().heartbeat_cursor(), 1);
    assert_eq!(det.window().heartbeats()[1], 2.0);
    assert_eq!(det.window().latest_heartbeat_time(), 2.0);
    assert_eq!(det.window().loss_cursor(), 0);
}

#[test]
fn test_loss_after_send_overwrites_sent_slot() {
    let mut det = detector();
    det.decide(0.0, false);
    det.decide(2.0, false);

    det.observe_loss(0, 3.0);
    assert_eq!(det.window().heartbeats()[1], 3.0);
    assert_eq!(det.window().heartbeat_cursor(), 2);
    assert_eq!(det.window().loss_cursor(), 1);
    assert_eq!(det.window().losses()[0], 0);
}

#[test]
fn test_threshold_equality_does_not_send() {
    let probe = {
        let mut det = detector();
        det.decide(0.0, false);
        det.phi_at(1.25).unwrap()
    };
    assert!(probe > 4.0 && probe < 7.0, "probe phi {}", probe);

    let mut at = with_threshold(probe);
    at.decide(0.0, false);
    assert!(!at.decide(1.25, false));

    let mut below = with_threshold(probe - 1e-4);
    below.decide(0.0, false);
    assert!(below.decide(1.25, false));
}

#[test]
fn test_force_send_and_defaults_dump() {
    let mut det = detector();
    // Forcing before the baseline still only bootstraps.
    assert!(!det.decide(0.0, true));

    assert!(det.decide(0.1, true));
    assert!(det.decide(0.2, true));

    let dumps: Vec<_> = det
        .sink()
        .iter()
        .filter(|r| matches!(r.event, TelemetryEvent::Defaults { .. }))
        .collect();
    assert_eq!(dumps.len(), 1);
    assert_eq!(
        dumps[0].event,
        TelemetryEvent::Defaults { phi_threshold: 4.0, window_size: 10, increase_factor: 0.1 }
    );
    assert_eq!(decisions(&det).len(), 2);
}

#[test]
fn test_forced_send_updates_mean() {
    let mut det = detector();
    det.decide(0.0, false);
    assert!(det.decide(0.1, true));
    // 1.0 + (0.1 - 1.0)^2
    assert!((det.estimate().mean - 1.81).abs() < 1e-12);
}

#[test]
fn test_phi_at_is_pure() {
    let mut det = detector();
    assert_eq!(det.phi_at(5.0), None);
    assert!(det.is_available(5.0));

    det.decide(0.0, false);
    let before = det.estimate();
    let phi = det.phi_at(2.0).unwrap();
    assert!(phi > 4.0);
    assert!(!det.is_available(2.0));
    assert!(det.is_available(0.5));

    assert!(det.sink().is_empty());
    assert_eq!(det.estimate(), before);
    assert_eq!(det.window().heartbeat_cursor(), 0);
}

#[test]
fn test_observe_loss_emits_estimate() {
    let mut det = detector();
    let est = det.observe_loss(4, 1.0);
    let last = det.sink().last().copied().unwrap();
    assert_eq!(last.at, 1.0);
    assert_eq!(
        last.event,
        TelemetryEvent::Estimate {
            mean: est.mean,
            variance: est.variance,
            lost_rate: 0.4,
            consecutive_zeros: 0.0,
        }
    );
    // Loss reports alone do not leave the bootstrap state.
    assert_eq!(det.state(), DetectorState::Uninitialized);
}

#[test]
fn test_send_then_report_cycle() {
    let cfg = DetectorConfig::default();
    let mut det = PhiDetector::new(cfg, NullSink).unwrap();
    det.decide(0.0, true);

    let mut now = 0.0;
    let mut pending = false;
    let mut sent_count = 0;
    for i in 0..200 {
        if pending {
            let missed = if i % 4 == 0 { (i % 10) as u32 } else { 0 };
            let est = det.observe_loss(missed, now);
            assert!(est.mean >= cfg.min_interval && est.mean <= cfg.max_interval);
            assert!(est.variance >= 0.0 && est.variance <= cfg.max_variance);
            pending = false;
        }
        if det.decide(now, false) {
            pending = true;
            sent_count += 1;
        }
        now += 0.05 * ((i % 7) as f64 + 1.0);
    }
    assert!(sent_count > 0);
}
