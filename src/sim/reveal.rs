//! Visibility engine
//!
//! Hazards and walls are hidden by default. Each frame they may be revealed by
//! passive proximity or by the expanding sound wave; once revealed they stay
//! drawn for the reveal window. The `visible` flag is never cleared after the
//! first reveal, only the timestamp decides whether the entity is drawn.

use serde::{Deserialize, Serialize};

use crate::{Millis, elapsed_ms};

/// Per-entity reveal bookkeeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealState {
    /// Set on first reveal and never cleared
    pub visible: bool,
    /// Timestamp of the most recent reveal
    pub last_revealed_at: Millis,
}

impl RevealState {
    /// Mark as revealed at `now`
    pub fn reveal(&mut self, now: Millis) {
        self.visible = true;
        self.last_revealed_at = now;
    }

    /// Revealed and still inside the reveal window
    pub fn is_fresh(&self, now: Millis, window: Millis) -> bool {
        self.visible && elapsed_ms(now, self.last_revealed_at) <= window
    }
}

/// Whether an entity at `dist` from the player gets revealed this frame.
///
/// `pulse_radius` is `Some` only while a sound wave is expanding.
#[inline]
pub fn should_reveal(dist: f32, passive_radius: f32, pulse_radius: Option<f32>) -> bool {
    dist <= passive_radius || pulse_radius.is_some_and(|r| dist <= r)
}

/// Whether an entity is drawn this frame
#[inline]
pub fn is_rendered(reveal: &RevealState, now: Millis, window: Millis, invincible: bool) -> bool {
    reveal.is_fresh(now, window) || invincible
}

/// Run the reveal check for one entity; returns true if it was (re)revealed.
pub fn update_reveal(
    reveal: &mut RevealState,
    dist: f32,
    passive_radius: f32,
    pulse_radius: Option<f32>,
    now: Millis,
) -> bool {
    if should_reveal(dist, passive_radius, pulse_radius) {
        reveal.reveal(now);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{PASSIVE_REVEAL_RADIUS, REVEAL_WINDOW_MS};
    use proptest::prelude::*;

    #[test]
    fn test_far_entity_stays_hidden() {
        let mut reveal = RevealState::default();

        assert!(!update_reveal(
            &mut reveal,
            150.0,
            PASSIVE_REVEAL_RADIUS,
            None,
            1_000
        ));
        assert!(!reveal.visible);
        assert!(!is_rendered(&reveal, 1_000, REVEAL_WINDOW_MS, false));
    }

    #[test]
    fn test_close_entity_revealed() {
        let mut reveal = RevealState::default();

        assert!(update_reveal(
            &mut reveal,
            90.0,
            PASSIVE_REVEAL_RADIUS,
            None,
            1_000
        ));
        assert!(reveal.visible);
        assert_eq!(reveal.last_revealed_at, 1_000);
    }

    #[test]
    fn test_pulse_reveals_beyond_passive_radius() {
        let mut reveal = RevealState::default();

        assert!(!should_reveal(150.0, PASSIVE_REVEAL_RADIUS, Some(120.0)));
        assert!(update_reveal(
            &mut reveal,
            150.0,
            PASSIVE_REVEAL_RADIUS,
            Some(160.0),
            5_000
        ));
        assert_eq!(reveal.last_revealed_at, 5_000);
    }

    #[test]
    fn test_window_expiry_keeps_flag() {
        let mut reveal = RevealState::default();
        reveal.reveal(1_000);

        // Inclusive end of the window
        assert!(is_rendered(&reveal, 4_000, REVEAL_WINDOW_MS, false));
        assert!(!is_rendered(&reveal, 4_001, REVEAL_WINDOW_MS, false));
        // Stale flag: still set after the window closed
        assert!(reveal.visible);
    }

    #[test]
    fn test_invincibility_overrides_hidden() {
        let reveal = RevealState::default();
        assert!(is_rendered(&reveal, 10, REVEAL_WINDOW_MS, true));
    }

    proptest! {
        #[test]
        fn prop_rendered_matches_definition(
            visible in any::<bool>(),
            last in 0u64..100_000,
            now in 0u64..200_000,
            invincible in any::<bool>(),
        ) {
            let reveal = RevealState { visible, last_revealed_at: last };
            let expected = (visible && now.saturating_sub(last) <= REVEAL_WINDOW_MS) || invincible;
            prop_assert_eq!(is_rendered(&reveal, now, REVEAL_WINDOW_MS, invincible), expected);
        }

        #[test]
        fn prop_reveal_never_clears_flag(dist in 0.0f32..1000.0, pulse in proptest::option::of(0.0f32..300.0)) {
            let mut reveal = RevealState::default();
            reveal.reveal(10);
            update_reveal(&mut reveal, dist, PASSIVE_REVEAL_RADIUS, pulse, 20);
            prop_assert!(reveal.visible);
        }
    }
}
