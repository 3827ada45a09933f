//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (key names to game intents)
//! - Microphone permission state and loudness (capture is web only)

pub mod input;
pub mod mic_status;
#[cfg(target_arch = "wasm32")]
pub mod microphone;

pub use input::{HeldKeys, Intent};
pub use mic_status::{MicNotice, MicState, MicStatus};
#[cfg(target_arch = "wasm32")]
pub use microphone::Microphone;

/// Await a promise in the background and drop its outcome, so a rejection
/// never surfaces as an unhandled one
#[cfg(target_arch = "wasm32")]
pub fn settle_quietly(promise: js_sys::Promise) {
    wasm_bindgen_futures::spawn_local(async move {
        let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
    });
}
