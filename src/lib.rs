//! Accessibility narration for tick-driven game clients.
//!
//! Reconstructs a stable dialog state (speaker, line, options, bounds) from a
//! noisy widget tree sampled every tick, and coordinates text-to-speech over
//! it: fingerprint de-duplication, a repeat cooldown, option-list
//! stabilization, post-advance suppression, and generation-gated cancellation
//! of stale audio.
//!
//! The host supplies the UI through the [`ui::UiSnapshot`] / [`ui::Widget`]
//! traits and drives a [`NarrationSession`] from its tick loop; speech flows
//! through a configurable [`SpeechEngine`] backend (bridge service, cloud
//! endpoint, local synthesizer, or no-op).

pub mod config;
pub mod error;
pub mod extract;
pub mod session;
pub mod test_utils;
pub mod text;
pub mod tts;
pub mod ui;

pub use config::ClarionConfig;
pub use error::{ClarionError, Result};
pub use extract::{DialogExtractor, DialogState};
pub use session::NarrationSession;
pub use tts::{SpeechEngine, TtsController};
