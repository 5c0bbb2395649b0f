//! High-level TTS coordination.
//!
//! Sits between the extractor and the active [`SpeechEngine`]:
//! - de-duplicates on dialog/options fingerprints so nothing is spoken every
//!   tick,
//! - holds option lists back until they have been stable for a short window
//!   (widgets populate over 1-2 frames; a half-built list must not be read),
//! - suppresses all speech briefly after the user advances the dialog,
//! - builds the spoken phrases and forwards them to the engine.
//!
//! Every entry point is total: engine failures are swallowed here and must
//! never destabilize the host tick loop.
//!
//! Cooldown/de-dup contract: a *changed* fingerprint is spoken immediately —
//! the cooldown never blocks genuinely new content. An *unchanged*
//! fingerprint repeats only once the cooldown has elapsed since the last
//! emission of any kind.

use super::{SpeechEngine, create_engine};
use crate::config::TtsConfig;
use crate::extract::{DialogLine, DialogState, MAX_OPTIONS};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// How long speech is withheld after a user-advance event.
pub const SUPPRESS_WINDOW: Duration = Duration::from_millis(750);

/// How long an option set must stay unchanged before it may be spoken.
pub const OPTION_STABILIZE_WINDOW: Duration = Duration::from_millis(250);

const TEST_PHRASE: &str = "Clarion text to speech test.";

/// Which fingerprint a phrase belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhraseKind {
    Dialog,
    Options,
}

/// Speech coordinator. One instance per session; all mutation happens on the
/// host tick thread.
#[derive(Default)]
pub struct TtsController {
    engine: Option<Box<dyn SpeechEngine>>,

    last_dialog_key: String,
    last_options_key: String,
    last_spoken_at: Option<Instant>,
    suppress_until: Option<Instant>,

    pending_options_key: String,
    pending_options_since: Option<Instant>,
}

impl TtsController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller with a pre-built engine. Used by tests and by hosts that
    /// construct engines themselves.
    pub fn with_engine(engine: Box<dyn SpeechEngine>) -> Self {
        Self {
            engine: Some(engine),
            ..Self::default()
        }
    }

    /// Tear down the current engine and build a fresh one from the config
    /// snapshot. Resets all fingerprint/cooldown/suppression state.
    pub fn refresh_engine(&mut self, config: &TtsConfig) {
        self.shutdown_engine_only();

        if config.enabled {
            self.engine = Some(create_engine(config));
        }
    }

    /// Tear down the engine without constructing a replacement.
    pub fn shutdown(&mut self) {
        self.shutdown_engine_only();
    }

    fn shutdown_engine_only(&mut self) {
        if let Some(engine) = self.engine.take() {
            engine.shutdown();
        }

        self.last_dialog_key.clear();
        self.last_options_key.clear();
        self.last_spoken_at = None;
        self.suppress_until = None;
        self.pending_options_key.clear();
        self.pending_options_since = None;
    }

    /// Called when the user clicks "continue" or selects a menu option.
    ///
    /// A mid-buffer cut cannot be guaranteed, but this cancels in-flight
    /// work, invalidates queued playback, and suppresses re-speaking the
    /// stale state for [`SUPPRESS_WINDOW`].
    pub fn on_user_advance(&mut self) {
        self.on_user_advance_at(Instant::now());
    }

    pub(crate) fn on_user_advance_at(&mut self, now: Instant) {
        self.suppress_until = Some(now + SUPPRESS_WINDOW);

        if let Some(engine) = &self.engine {
            engine.stop_now();
        }
    }

    /// Best-effort stop without a suppression window. Used when the dialog
    /// UI disappears outright.
    pub fn stop_current(&self) {
        if let Some(engine) = &self.engine {
            engine.stop_now();
        }
    }

    /// Feed the latest dialog state; speaks through the engine when the
    /// fingerprints, cooldown, stabilization window, and suppression window
    /// all allow it.
    pub fn update(&mut self, state: &DialogState, config: &TtsConfig) {
        self.update_at(state, config, Instant::now());
    }

    pub(crate) fn update_at(&mut self, state: &DialogState, config: &TtsConfig, now: Instant) {
        if !config.enabled {
            return;
        }

        // Stabilization bookkeeping runs even while suppressed, so an option
        // list that appeared during the suppression window is eligible the
        // moment the window ends.
        let options_ready = self.track_pending_options(state, config, now);

        self.update_dialog_at(&state.speaker, &state.line, config, now);

        if !options_ready || self.engine.is_none() || self.is_suppressed(now) {
            return;
        }

        let cooldown = Duration::from_millis(config.cooldown_ms);
        let options_key = self.pending_options_key.clone();
        if !options_key.is_empty()
            && self.should_speak(&options_key, PhraseKind::Options, cooldown, now)
        {
            self.last_options_key = options_key;
            self.last_spoken_at = Some(now);

            let phrase = build_options_phrase(&state.options);
            if !phrase.is_empty() {
                self.speak(&phrase);
            }
        }
    }

    /// Dialog-line-only update for callers that carry no option information
    /// (the render-tick fast path). Never touches the option-stabilization
    /// state: "no option data" is not the same as "no options on screen".
    pub fn update_dialog(&mut self, line: &DialogLine, config: &TtsConfig) {
        self.update_dialog_at(&line.speaker, &line.line, config, Instant::now());
    }

    pub(crate) fn update_dialog_at(
        &mut self,
        speaker_raw: &str,
        line_raw: &str,
        config: &TtsConfig,
        now: Instant,
    ) {
        if !config.enabled || self.engine.is_none() {
            return;
        }

        if self.is_suppressed(now) {
            trace!("speech suppressed after user advance");
            return;
        }

        let speaker = if config.include_speaker {
            speaker_raw.trim()
        } else {
            ""
        };
        let line = if config.speak_dialog {
            line_raw.trim()
        } else {
            ""
        };

        let cooldown = Duration::from_millis(config.cooldown_ms);
        let dialog_key = build_dialog_key(speaker, line);
        if !dialog_key.is_empty() && self.should_speak(&dialog_key, PhraseKind::Dialog, cooldown, now)
        {
            self.last_dialog_key = dialog_key;
            self.last_spoken_at = Some(now);

            let phrase = build_dialog_phrase(speaker, line);
            if !phrase.is_empty() {
                self.speak(&phrase);
            }
        }
    }

    fn is_suppressed(&self, now: Instant) -> bool {
        self.suppress_until.is_some_and(|until| now < until)
    }

    /// Maintain the pending-options fingerprint and its first-seen time.
    /// Returns whether the current option set has been stable long enough to
    /// speak.
    fn track_pending_options(&mut self, state: &DialogState, config: &TtsConfig, now: Instant) -> bool {
        if !config.speak_options || state.options.is_empty() {
            self.pending_options_key.clear();
            self.pending_options_since = None;
            return false;
        }

        let key = build_options_key(&state.options);
        if key != self.pending_options_key {
            self.pending_options_key = key;
            self.pending_options_since = Some(now);
            return false;
        }

        self.pending_options_since
            .is_some_and(|since| now.duration_since(since) >= OPTION_STABILIZE_WINDOW)
    }

    fn should_speak(&self, key: &str, kind: PhraseKind, cooldown: Duration, now: Instant) -> bool {
        let last_key = match kind {
            PhraseKind::Dialog => &self.last_dialog_key,
            PhraseKind::Options => &self.last_options_key,
        };

        if key != last_key {
            return true;
        }

        match self.last_spoken_at {
            None => true,
            Some(at) => now.duration_since(at) >= cooldown,
        }
    }

    fn speak(&self, phrase: &str) {
        if let Some(engine) = &self.engine {
            debug!(len = phrase.len(), "speaking phrase");
            engine.speak(phrase);
        }
    }

    /// Speak a fixed test phrase, lazily constructing the engine if absent.
    /// Failures surface only through the engine's own health state.
    pub fn speak_test(&mut self, config: &TtsConfig) {
        if !config.enabled {
            return;
        }

        if self.engine.is_none() {
            self.refresh_engine(config);
        }

        if let Some(engine) = &self.engine {
            engine.speak(TEST_PHRASE);
        }
    }

    /// Whether the active engine currently reports itself usable.
    pub fn is_engine_up(&self) -> bool {
        self.engine.as_ref().is_some_and(|e| e.is_available())
    }

    /// Last error recorded by the active engine, if any.
    pub fn last_engine_error(&self) -> Option<String> {
        self.engine.as_ref().and_then(|e| e.last_error())
    }

    /// Force a health probe on the active engine.
    pub fn check_engine_now(&self) {
        if let Some(engine) = &self.engine {
            engine.check_health();
        }
    }
}

fn build_dialog_key(speaker: &str, line: &str) -> String {
    if line.is_empty() {
        String::new()
    } else {
        format!("{speaker}|{line}")
    }
}

fn build_options_key(options: &[String]) -> String {
    let mut key = String::new();
    for option in options.iter().take(MAX_OPTIONS) {
        key.push_str(option.trim());
        key.push('|');
    }
    key
}

fn build_dialog_phrase(speaker: &str, line: &str) -> String {
    if line.is_empty() {
        String::new()
    } else if speaker.is_empty() {
        line.to_owned()
    } else {
        format!("{speaker}. {line}")
    }
}

fn build_options_phrase(options: &[String]) -> String {
    let clean: Vec<&str> = options
        .iter()
        .take(MAX_OPTIONS)
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .collect();

    if clean.is_empty() {
        return String::new();
    }

    let mut phrase = String::from("Options. ");
    for (i, option) in clean.iter().enumerate() {
        if i > 0 {
            phrase.push_str(". ");
        }
        phrase.push_str(&format!("{}. {option}", i + 1));
    }
    phrase
}
