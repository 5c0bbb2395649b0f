//! No-op speech engine: the universal safe default.

use super::SpeechEngine;

/// Engine used when TTS is disabled or the configured backend is unusable.
/// Performs no work.
pub struct NoopEngine;

impl SpeechEngine for NoopEngine {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&self, _text: &str) {}

    fn stop_now(&self) {}

    fn shutdown(&self) {}
}
