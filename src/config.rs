//! Configuration types for the narration subsystem.
//!
//! The host hands the session a fresh [`ClarionConfig`] snapshot whenever the
//! user changes a setting; every decision point re-reads the snapshot, so all
//! options are hot-reloadable without restarting the session.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClarionConfig {
    /// Readable dialog overlay settings.
    pub dialog: DialogConfig,
    /// Text-to-speech settings.
    pub tts: TtsConfig,
}

/// Dialog overlay settings.
///
/// Rendering itself is the host's job; the session only consumes `enabled`
/// (whether to extract full dialog state at all) and republishes the rest to
/// overlay collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// Enable the large, readable dialog overlay.
    pub enabled: bool,
    /// Draw over the native dialog area so only the overlay is visible.
    pub hide_native: bool,
    /// Visual theme for the overlay.
    pub theme: DialogTheme,
    /// Font size for dialog text and options.
    pub font_size: u32,
    /// Overlay panel width in pixels.
    pub panel_width: u32,
    /// Overlay background opacity (40-255).
    pub opacity: u8,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hide_native: true,
            theme: DialogTheme::BlackPanel,
            font_size: 28,
            panel_width: 720,
            opacity: 240,
        }
    }
}

/// Visual theme for the dialog overlay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogTheme {
    Parchment,
    #[default]
    BlackPanel,
}

/// Which speech backend to use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechBackend {
    /// POST text to a local bridge service that synthesizes and plays audio.
    #[default]
    Bridge,
    /// GET WAV bytes from a cloud endpoint and play them locally.
    Cloud,
    /// Run a local synthesis executable and play its WAV output.
    Local,
    /// Discard all speech requests.
    Noop,
}

/// Text-to-speech settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Master switch for speech output.
    pub enabled: bool,
    /// Active speech backend.
    pub backend: SpeechBackend,
    /// Speak NPC/player dialog lines when they appear.
    pub speak_dialog: bool,
    /// Prefix dialog lines with the speaker name.
    pub include_speaker: bool,
    /// Speak option menus once they stabilize.
    pub speak_options: bool,
    /// Minimum milliseconds before an unchanged phrase may repeat.
    pub cooldown_ms: u64,
    /// Bridge backend settings.
    pub bridge: BridgeConfig,
    /// Cloud backend settings.
    pub cloud: CloudConfig,
    /// Local synthesis backend settings.
    pub local: LocalConfig,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: SpeechBackend::default(),
            speak_dialog: true,
            include_speaker: true,
            speak_options: true,
            cooldown_ms: 700,
            bridge: BridgeConfig::default(),
            cloud: CloudConfig::default(),
            local: LocalConfig::default(),
        }
    }
}

/// Bridge backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Base URL of the bridge service.
    pub base_url: String,
    /// Per-request timeout in milliseconds (floor of 100 is enforced).
    pub timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:59125".to_owned(),
            timeout_ms: 3_000,
        }
    }
}

/// Cloud backend settings.
///
/// The endpoint accepts query params `m` (text), `r` (rate) and `v` (voice)
/// and returns raw WAV bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Base URL of the speech service.
    pub base_url: String,
    /// Speech rate parameter (0-10).
    pub rate: u8,
    /// Voice parameter (0-50); values depend on the service.
    pub voice: u8,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ttsplugin.com".to_owned(),
            rate: 1,
            voice: 0,
        }
    }
}

/// Local synthesis backend settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Path to the synthesis executable. When unset, `$PATH` is searched for
    /// `piper`.
    pub synth_path: Option<PathBuf>,
    /// Path to the voice model file. Required for the local backend.
    pub model_path: Option<PathBuf>,
}

impl ClarionConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::ClarionError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ClarionError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config file path: `~/.config/clarion/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("clarion").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("clarion")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/clarion-config/config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ClarionConfig::default();
        assert!(config.dialog.enabled);
        assert!(!config.tts.enabled);
        assert_eq!(config.tts.backend, SpeechBackend::Bridge);
        assert_eq!(config.tts.cooldown_ms, 700);
        assert_eq!(config.tts.cloud.base_url, "https://ttsplugin.com");
    }

    #[test]
    fn roundtrips_through_toml() {
        let mut config = ClarionConfig::default();
        config.tts.enabled = true;
        config.tts.backend = SpeechBackend::Cloud;
        config.tts.cloud.voice = 7;

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let loaded: ClarionConfig = toml::from_str(&toml_str).unwrap();
        assert!(loaded.tts.enabled);
        assert_eq!(loaded.tts.backend, SpeechBackend::Cloud);
        assert_eq!(loaded.tts.cloud.voice, 7);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ClarionConfig = toml::from_str(
            r#"
            [tts]
            enabled = true
            backend = "local"
            "#,
        )
        .unwrap();
        assert!(config.tts.enabled);
        assert_eq!(config.tts.backend, SpeechBackend::Local);
        assert_eq!(config.tts.cooldown_ms, 700);
        assert!(config.dialog.enabled);
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ClarionConfig::default();
        config.dialog.font_size = 36;
        config.save_to_file(&path).unwrap();

        let loaded = ClarionConfig::from_file(&path).unwrap();
        assert_eq!(loaded.dialog.font_size, 36);
    }
}
