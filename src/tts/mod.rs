//! Text-to-speech coordination and backends.
//!
//! The [`TtsController`] decides *whether* and *what* to speak; a
//! [`SpeechEngine`] decides *how*. Engines form a closed set of variants
//! selected from config by [`create_engine`], with the no-op engine as the
//! universal safe default. Every engine owns its concurrency: `speak` returns
//! immediately and all I/O happens on a single internal worker, so requests
//! are processed in submission order.

pub mod bridge;
pub mod cloud;
pub mod controller;
pub mod local;
pub mod noop;
pub mod playback;

pub use controller::TtsController;
pub use playback::{GenerationGuard, WavPlayer};

use crate::config::{SpeechBackend, TtsConfig};
use tracing::warn;

/// Abstract speech backend.
///
/// Contract:
/// - `speak` must return quickly; implementers serialize requests internally.
/// - `stop_now` is best-effort: it cancels queued and in-flight work but
///   cannot guarantee mid-utterance silence on backends without a hard stop.
/// - `shutdown` is idempotent and releases all resources.
pub trait SpeechEngine: Send {
    /// Cheap, non-blocking availability check.
    fn is_available(&self) -> bool;

    /// Queue a phrase for speech. Never blocks.
    fn speak(&self, text: &str);

    /// Best-effort cancellation of queued and in-flight work.
    fn stop_now(&self);

    /// Release all resources. Idempotent.
    fn shutdown(&self);

    /// Force a health probe on the engine's worker. Default: no-op.
    fn check_health(&self) {}

    /// Last backend error recorded, if any.
    fn last_error(&self) -> Option<String> {
        None
    }
}

/// A queued speech unit, stamped with the generation current at submission.
///
/// Workers that produce audio bytes must re-check the generation when their
/// result arrives and silently drop it if the epoch has advanced — that is
/// the whole "stop" approximation for backends without a hard-stop primitive.
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub text: String,
    pub generation: u64,
}

/// Build the engine selected by the config snapshot.
///
/// Total: a misconfigured backend degrades to the no-op engine rather than
/// failing construction.
pub fn create_engine(config: &TtsConfig) -> Box<dyn SpeechEngine> {
    if !config.enabled {
        return Box::new(noop::NoopEngine);
    }

    match config.backend {
        SpeechBackend::Bridge => Box::new(bridge::BridgeEngine::new(&config.bridge)),
        SpeechBackend::Cloud => Box::new(cloud::CloudEngine::new(&config.cloud)),
        SpeechBackend::Local => match local::LocalEngine::new(&config.local) {
            Ok(engine) => Box::new(engine),
            Err(e) => {
                warn!("local synthesis backend unavailable, speech disabled: {e}");
                Box::new(noop::NoopEngine)
            }
        },
        SpeechBackend::Noop => Box::new(noop::NoopEngine),
    }
}
