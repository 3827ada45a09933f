//! Microphone loudness source (Web Audio analyser)
//!
//! Permission is requested asynchronously; until it resolves (or if it is
//! denied) there is simply no loudness reading and the game falls back to
//! proximity reveal only.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AnalyserNode, AudioContext, MediaStream, MediaStreamConstraints, MediaStreamTrack};

use super::mic_status::{MicNotice, MicState, MicStatus};
use super::settle_quietly;

/// FFT size of the analyser (128 frequency bins)
const FFT_SIZE: u32 = 256;

struct Capture {
    ctx: AudioContext,
    stream: MediaStream,
    analyser: AnalyserNode,
    bins: Vec<u8>,
}

impl Drop for Capture {
    fn drop(&mut self) {
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
        if let Ok(promise) = self.ctx.close() {
            settle_quietly(promise);
        }
    }
}

/// Shared handle; cheap to clone into async tasks
#[derive(Clone, Default)]
pub struct Microphone {
    capture: Rc<RefCell<Option<Capture>>>,
    status: Rc<RefCell<MicStatus>>,
}

impl Microphone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MicState {
        self.status.borrow().state()
    }

    /// Result of the last request, handed out once
    pub fn take_notice(&self) -> Option<MicNotice> {
        self.status.borrow_mut().take_notice()
    }

    /// Ask for microphone access in the background. Returns `false` when a
    /// request is already in flight or the microphone is already live.
    pub fn request(&self) -> bool {
        if !self.status.borrow_mut().begin_request() {
            log::debug!("Microphone request skipped ({:?})", self.state());
            return false;
        }

        let capture = self.capture.clone();
        let status = self.status.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match open_capture().await {
                Ok(c) => {
                    log::info!("Microphone enabled");
                    *capture.borrow_mut() = Some(c);
                    status.borrow_mut().resolve(true);
                }
                Err(e) => {
                    log::warn!("Microphone unavailable: {:?}", e);
                    status.borrow_mut().resolve(false);
                }
            }
        });
        true
    }

    /// Average byte frequency magnitude, capped at 100. `None` without a microphone.
    ///
    /// Speech rarely pushes the raw average past 100, so the threshold scale
    /// is the raw analyser scale rather than a rescaled 0-255 range.
    pub fn loudness(&self) -> Option<f32> {
        let mut guard = self.capture.borrow_mut();
        let capture = guard.as_mut()?;
        capture.analyser.get_byte_frequency_data(&mut capture.bins);
        if capture.bins.is_empty() {
            return None;
        }
        let sum: u32 = capture.bins.iter().map(|&b| b as u32).sum();
        let average = sum as f32 / capture.bins.len() as f32;
        Some(average.min(100.0))
    }
}

async fn open_capture() -> Result<Capture, wasm_bindgen::JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let devices = window.navigator().media_devices()?;

    let constraints = MediaStreamConstraints::new();
    constraints.set_audio(&wasm_bindgen::JsValue::TRUE);
    let promise = devices.get_user_media_with_constraints(&constraints)?;
    let stream: MediaStream = JsFuture::from(promise).await?.dyn_into()?;

    let ctx = AudioContext::new()?;
    let analyser = ctx.create_analyser()?;
    analyser.set_fft_size(FFT_SIZE);
    let source = ctx.create_media_stream_source(&stream)?;
    source.connect_with_audio_node(&analyser)?;

    let bins = vec![0u8; analyser.frequency_bin_count() as usize];
    Ok(Capture {
        ctx,
        stream,
        analyser,
        bins,
    })
}
