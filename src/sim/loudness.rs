//! Loudness gating and microphone calibration
//!
//! The host supplies a loudness level on a 0-100 scale each frame (if a
//! microphone is available). The simulation only asks whether it is above the
//! calibrated threshold.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{Millis, elapsed_ms};

/// Outcome of a calibration pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub threshold: f32,
    /// The sampled average was too quiet and the floor was used instead
    pub clamped_to_floor: bool,
}

/// Threshold = max(mean(samples) * factor, floor). `None` without samples.
pub fn calibrate_threshold(samples: &[f32], factor: f32, floor: f32) -> Option<Calibration> {
    if samples.is_empty() {
        return None;
    }
    let mean = samples.iter().sum::<f32>() / samples.len() as f32;
    let calculated = mean * factor;
    Some(Calibration {
        threshold: calculated.max(floor),
        clamped_to_floor: calculated < floor,
    })
}

/// Compares the incoming loudness level against the threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoudnessGate {
    pub threshold: f32,
}

impl Default for LoudnessGate {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LOUDNESS_THRESHOLD,
        }
    }
}

impl LoudnessGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    #[inline]
    pub fn is_loud(&self, level: f32) -> bool {
        level > self.threshold
    }

    pub fn apply(&mut self, calibration: Calibration) {
        self.threshold = calibration.threshold;
    }
}

/// Time-driven calibration: samples every interval for a fixed window
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSession {
    started_at: Millis,
    last_sample_at: Option<Millis>,
    samples: Vec<f32>,
}

impl CalibrationSession {
    pub fn start(now: Millis) -> Self {
        log::info!("Calibrating loudness threshold");
        Self {
            started_at: now,
            last_sample_at: None,
            samples: Vec::with_capacity(
                (CALIBRATION_WINDOW_MS / CALIBRATION_SAMPLE_INTERVAL_MS) as usize,
            ),
        }
    }

    /// Offer a loudness reading; kept only once per sample interval
    pub fn sample(&mut self, now: Millis, level: f32) {
        if self.is_done(now) {
            return;
        }
        let due = self
            .last_sample_at
            .is_none_or(|t| elapsed_ms(now, t) >= CALIBRATION_SAMPLE_INTERVAL_MS);
        if due {
            self.samples.push(level);
            self.last_sample_at = Some(now);
        }
    }

    pub fn is_done(&self, now: Millis) -> bool {
        elapsed_ms(now, self.started_at) >= CALIBRATION_WINDOW_MS
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Result once the window has elapsed; `None` while still sampling or if
    /// nothing was heard
    pub fn finish(&self, now: Millis) -> Option<Calibration> {
        if !self.is_done(now) {
            return None;
        }
        calibrate_threshold(&self.samples, CALIBRATION_FACTOR, CALIBRATION_FLOOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibrate_above_floor() {
        let result = calibrate_threshold(&[40.0, 60.0], 1.5, 45.0).unwrap();
        assert!((result.threshold - 75.0).abs() < 1e-4);
        assert!(!result.clamped_to_floor);
    }

    #[test]
    fn test_calibrate_quiet_room_uses_floor() {
        let result = calibrate_threshold(&[5.0, 10.0, 15.0], 1.5, 45.0).unwrap();
        assert_eq!(result.threshold, 45.0);
        assert!(result.clamped_to_floor);
    }

    #[test]
    fn test_calibrate_empty() {
        assert!(calibrate_threshold(&[], 1.5, 45.0).is_none());
    }

    #[test]
    fn test_gate_is_strict() {
        let gate = LoudnessGate::new(80.0);
        assert!(!gate.is_loud(80.0));
        assert!(gate.is_loud(80.5));
    }

    #[test]
    fn test_session_samples_at_interval() {
        let mut session = CalibrationSession::start(1_000);

        // Frames every 16 ms: a sample is kept on the first frame at least
        // 100 ms after the previous one, i.e. every 112 ms
        let mut now = 1_000;
        while now < 3_000 {
            session.sample(now, 50.0);
            now += 16;
        }
        assert!(session.finish(2_999).is_none());

        assert_eq!(session.samples().len(), 18);

        let result = session.finish(3_000).unwrap();
        assert!((result.threshold - 75.0).abs() < 1e-4);
    }

    #[test]
    fn test_session_ignores_late_samples() {
        let mut session = CalibrationSession::start(0);
        session.sample(0, 30.0);
        session.sample(2_500, 100.0);
        assert_eq!(session.samples(), &[30.0]);
    }
}
