//! Session object tying extraction to speech.
//!
//! A [`NarrationSession`] is the host-facing surface: the host forwards its
//! render ticks, simulation ticks, user-advance events, and config changes,
//! and reads the current dialog state back for overlay rendering. One session
//! per client instance; every method runs on the host tick thread.

use crate::config::ClarionConfig;
use crate::extract::{DialogExtractor, DialogState};
use crate::tts::TtsController;
use crate::ui::UiSnapshot;
use tracing::debug;

pub struct NarrationSession {
    config: ClarionConfig,
    extractor: DialogExtractor,
    controller: TtsController,

    state: DialogState,
    chatbox_input_open: bool,
    dialog_active: bool,
    // Render-tick-local fingerprint so the controller is only consulted when
    // the cheap direct reads actually change.
    last_fast_dialog_key: String,
}

impl NarrationSession {
    pub fn new(config: ClarionConfig) -> Self {
        let mut controller = TtsController::new();
        controller.refresh_engine(&config.tts);

        Self {
            config,
            extractor: DialogExtractor::new(),
            controller,
            state: DialogState::default(),
            chatbox_input_open: false,
            dialog_active: false,
            last_fast_dialog_key: String::new(),
        }
    }

    /// Session with a caller-supplied controller. Used by tests.
    pub fn with_controller(config: ClarionConfig, controller: TtsController) -> Self {
        Self {
            config,
            extractor: DialogExtractor::new(),
            controller,
            state: DialogState::default(),
            chatbox_input_open: false,
            dialog_active: false,
            last_fast_dialog_key: String::new(),
        }
    }

    /// Cheap per-frame pass: direct widget reads only, no tree walking.
    ///
    /// Detects dialog-active transitions (stopping in-flight speech when the
    /// dialog UI closes) and narrates newly changed dialog lines without
    /// waiting for the next simulation tick.
    pub fn on_render_tick(&mut self, ui: &dyn UiSnapshot) {
        let line = self.extractor.read_dialog_line(ui);

        let now_active = !line.is_empty()
            || self.extractor.has_option_header(ui)
            || !self.state.options.is_empty();

        if self.dialog_active && !now_active {
            debug!("dialog closed, stopping speech");
            self.controller.stop_current();
            self.last_fast_dialog_key.clear();
        }
        self.dialog_active = now_active;

        if !self.config.tts.enabled {
            return;
        }

        let fast_key = format!("{}|{}", line.speaker, line.line);
        if fast_key != self.last_fast_dialog_key {
            self.last_fast_dialog_key = fast_key;

            // Options come from the full extraction on the simulation tick;
            // the fast path narrates the line alone and carries no option
            // information, so it must not disturb option stabilization.
            self.controller.update_dialog(&line, &self.config.tts);
        }
    }

    /// Full per-tick pass: tree walk, option discovery, speech update.
    pub fn on_simulation_tick(&mut self, ui: &dyn UiSnapshot) {
        self.chatbox_input_open = self.extractor.chatbox_input_open(ui);

        if !self.config.dialog.enabled {
            // Overlay disabled: skip the tree walk and publish an empty
            // state. Dialog lines still reach the controller through the
            // direct reads.
            self.state = DialogState::default();
            let line = self.extractor.read_dialog_line(ui);
            self.controller.update_dialog(&line, &self.config.tts);
            return;
        }

        self.state = self.extractor.extract(ui);
        self.controller.update(&self.state, &self.config.tts);
    }

    /// The user advanced the dialog (continue click, option select).
    pub fn on_user_advance(&mut self) {
        self.controller.on_user_advance();
    }

    /// Install a new config snapshot and rebuild the engine from it.
    pub fn set_config(&mut self, config: ClarionConfig) {
        self.config = config;
        self.controller.refresh_engine(&self.config.tts);
        self.last_fast_dialog_key.clear();
    }

    /// Host notification that some config key changed.
    ///
    /// The engine is only rebuilt when the speech section actually changed;
    /// an overlay-only edit (theme, font size) must not cut off a running
    /// utterance.
    pub fn on_config_changed(&mut self, config: ClarionConfig) {
        if config.tts == self.config.tts {
            self.config = config;
            return;
        }
        self.set_config(config);
    }

    pub fn shutdown(&mut self) {
        self.controller.shutdown();
    }

    /// Latest extracted dialog state, for overlay collaborators.
    pub fn dialog_state(&self) -> &DialogState {
        &self.state
    }

    /// Whether the chatbox text-entry line was open on the last tick.
    pub fn chatbox_input_open(&self) -> bool {
        self.chatbox_input_open
    }

    pub fn config(&self) -> &ClarionConfig {
        &self.config
    }

    /// Speak the fixed diagnostic phrase through the configured backend.
    pub fn speak_test(&mut self) {
        let tts = self.config.tts.clone();
        self.controller.speak_test(&tts);
    }

    pub fn check_engine_now(&self) {
        self.controller.check_engine_now();
    }

    pub fn is_engine_up(&self) -> bool {
        self.controller.is_engine_up()
    }

    pub fn last_engine_error(&self) -> Option<String> {
        self.controller.last_engine_error()
    }
}
