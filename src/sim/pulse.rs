//! Sound wave pulse
//!
//! A reveal-on-demand ring that expands from the player. At most one pulse is
//! in flight; a new one can only start once the previous pulse and its
//! cooldown have fully elapsed.

use serde::{Deserialize, Serialize};

use crate::{Millis, elapsed_ms};

/// Pulse timing and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseConfig {
    pub duration: Millis,
    pub cooldown: Millis,
    pub max_radius: f32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        use crate::consts::*;
        Self {
            duration: PULSE_DURATION_MS,
            cooldown: PULSE_COOLDOWN_MS,
            max_radius: PULSE_MAX_RADIUS,
        }
    }
}

impl PulseConfig {
    /// Time from one trigger until the next one is allowed
    pub fn period(&self) -> Millis {
        self.duration + self.cooldown
    }
}

/// Idle/Expanding state of the sound wave
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundWave {
    /// Expanding
    pub active: bool,
    pub started_at: Millis,
    /// Only written by a successful trigger
    pub last_used_at: Option<Millis>,
}

impl SoundWave {
    /// Ready to fire: idle and past the previous pulse plus cooldown
    pub fn can_trigger(&self, now: Millis, config: &PulseConfig) -> bool {
        !self.active
            && self
                .last_used_at
                .is_none_or(|used| elapsed_ms(now, used) > config.period())
    }

    /// Start a pulse if allowed. Returns whether a pulse started.
    pub fn try_trigger(&mut self, now: Millis, config: &PulseConfig) -> bool {
        if !self.can_trigger(now, config) {
            return false;
        }
        self.active = true;
        self.started_at = now;
        self.last_used_at = Some(self.last_used_at.map_or(now, |used| used.max(now)));
        true
    }

    /// Expire the pulse once its duration has elapsed
    pub fn update(&mut self, now: Millis, config: &PulseConfig) {
        if self.active && elapsed_ms(now, self.started_at) >= config.duration {
            self.active = false;
        }
    }

    /// Current ring radius (0 while idle or once the duration has elapsed)
    pub fn radius(&self, now: Millis, config: &PulseConfig) -> f32 {
        if !self.active || config.duration == 0 {
            return 0.0;
        }
        let elapsed = elapsed_ms(now, self.started_at);
        if elapsed >= config.duration {
            return 0.0;
        }
        let t = elapsed as f32 / config.duration as f32;
        (t * config.max_radius).min(config.max_radius)
    }

    /// Radius usable for reveal checks, `None` while idle
    pub fn reveal_radius(&self, now: Millis, config: &PulseConfig) -> Option<f32> {
        self.active.then(|| self.radius(now, config))
    }

    /// Progress through `duration + cooldown` since the last trigger, for the
    /// cooldown ring. `None` if never used or fully recharged.
    pub fn cooldown_progress(&self, now: Millis, config: &PulseConfig) -> Option<f32> {
        let since = elapsed_ms(now, self.last_used_at?);
        let period = config.period();
        (since < period).then(|| since as f32 / period as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_idle_to_expanding_to_idle() {
        let config = PulseConfig::default();
        let mut wave = SoundWave::default();

        assert!(wave.try_trigger(10_000, &config));
        assert!(wave.active);
        assert_eq!(wave.started_at, 10_000);
        assert_eq!(wave.last_used_at, Some(10_000));

        // Halfway through
        wave.update(10_750, &config);
        assert!(wave.active);
        assert!((wave.radius(10_750, &config) - 100.0).abs() < 1e-3);

        // Duration reached
        wave.update(11_500, &config);
        assert!(!wave.active);
        assert_eq!(wave.radius(11_500, &config), 0.0);
        assert_eq!(wave.reveal_radius(11_500, &config), None);
    }

    #[test]
    fn test_cooldown_blocks_retrigger() {
        let config = PulseConfig::default();
        let mut wave = SoundWave::default();
        assert!(wave.try_trigger(10_000, &config));
        wave.update(11_600, &config);

        // Exactly at duration + cooldown is still too early (strict >)
        let before = wave;
        assert!(!wave.try_trigger(13_000, &config));
        assert_eq!(wave, before);

        assert!(wave.try_trigger(13_001, &config));
        assert_eq!(wave.last_used_at, Some(13_001));
    }

    #[test]
    fn test_no_trigger_while_expanding() {
        let config = PulseConfig {
            duration: 1_500,
            cooldown: 0,
            max_radius: 200.0,
        };
        let mut wave = SoundWave::default();
        assert!(wave.try_trigger(5_000, &config));
        assert!(!wave.try_trigger(6_000, &config));
        assert_eq!(wave.started_at, 5_000);
    }

    #[test]
    fn test_cooldown_progress() {
        let config = PulseConfig::default();
        let mut wave = SoundWave::default();
        assert_eq!(wave.cooldown_progress(1_000, &config), None);

        wave.try_trigger(10_000, &config);
        let progress = wave.cooldown_progress(11_500, &config).unwrap();
        assert!((progress - 0.5).abs() < 1e-6);
        assert_eq!(wave.cooldown_progress(13_000, &config), None);
    }

    proptest! {
        #[test]
        fn prop_radius_monotonic_while_expanding(
            start in 0u64..50_000,
            a in 0u64..1_500,
            b in 0u64..1_500,
        ) {
            let config = PulseConfig::default();
            let mut wave = SoundWave::default();
            prop_assert!(wave.try_trigger(start, &config));

            let (t0, t1) = if a <= b { (a, b) } else { (b, a) };
            let r0 = wave.radius(start + t0, &config);
            let r1 = wave.radius(start + t1, &config);
            prop_assert!(r1 >= r0);
            prop_assert!(r1 <= config.max_radius);
        }

        #[test]
        fn prop_early_retrigger_is_noop(start in 0u64..50_000, offset in 0u64..=3_000) {
            let config = PulseConfig::default();
            let mut wave = SoundWave::default();
            prop_assert!(wave.try_trigger(start, &config));
            wave.update(start + offset, &config);

            let before = wave;
            prop_assert!(!wave.try_trigger(start + offset, &config));
            prop_assert_eq!(wave, before);
        }
    }
}
