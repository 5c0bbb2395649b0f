//! Local synthesis backend.
//!
//! Spawns an external synthesis executable per phrase (text on stdin, WAV to
//! a temp file) and plays the result behind the generation guard. Misconfig
//! (no executable, no model) is detected at construction so the factory can
//! fall back to the no-op engine.

use super::{SpeechEngine, SpeechRequest, WavPlayer};
use crate::config::LocalConfig;
use crate::error::{ClarionError, Result};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::debug;

const QUEUE_CAPACITY: usize = 8;
const SYNTH_DEADLINE: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_millis(25);

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

enum WorkerMessage {
    Speak(SpeechRequest),
    Shutdown,
}

/// Engine that shells out to a local synthesizer such as piper.
#[derive(Debug)]
pub struct LocalEngine {
    tx: Sender<WorkerMessage>,
    worker: Mutex<Option<JoinHandle<()>>>,
    closed: Arc<AtomicBool>,
    player: Arc<WavPlayer>,
    last_error: Arc<Mutex<String>>,
}

impl LocalEngine {
    /// Resolve the synthesizer and model up front and start the worker.
    ///
    /// # Errors
    ///
    /// Returns `ClarionError::Config` when no synthesis executable can be
    /// found or the configured model file does not exist.
    pub fn new(config: &LocalConfig) -> Result<Self> {
        let synth = resolve_synth(config)?;
        let model = config
            .model_path
            .clone()
            .filter(|p| p.is_file())
            .ok_or_else(|| {
                ClarionError::Config("local TTS model file not found".to_owned())
            })?;

        let player = Arc::new(WavPlayer::new());
        let closed = Arc::new(AtomicBool::new(false));
        let last_error = Arc::new(Mutex::new(String::new()));
        let (tx, rx) = crossbeam_channel::bounded(QUEUE_CAPACITY);

        let worker = {
            let player = Arc::clone(&player);
            let closed = Arc::clone(&closed);
            let last_error = Arc::clone(&last_error);
            std::thread::Builder::new()
                .name("clarion-tts-local".to_owned())
                .spawn(move || run_worker(&rx, &synth, &model, &player, &closed, &last_error))
                .ok()
        };

        Ok(Self {
            tx,
            worker: Mutex::new(worker),
            closed,
            player,
            last_error,
        })
    }
}

impl SpeechEngine for LocalEngine {
    fn is_available(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    fn speak(&self, text: &str) {
        if self.closed.load(Ordering::SeqCst) || text.trim().is_empty() {
            return;
        }

        let generation = self.player.bump();
        let request = SpeechRequest {
            text: text.trim().to_owned(),
            generation,
        };
        match self.tx.try_send(WorkerMessage::Speak(request)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("local queue full, dropping phrase"),
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    fn stop_now(&self) {
        self.player.bump();
    }

    fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.player.bump();
        if self
            .tx
            .send_timeout(WorkerMessage::Shutdown, Duration::from_secs(1))
            .is_ok()
            && let Ok(mut guard) = self.worker.lock()
            && let Some(handle) = guard.take()
        {
            let _ = handle.join();
        }
    }

    fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .ok()
            .map(|e| e.clone())
            .filter(|e| !e.is_empty())
    }
}

/// Explicit path from config, else `piper` on PATH.
fn resolve_synth(config: &LocalConfig) -> Result<PathBuf> {
    if let Some(path) = &config.synth_path {
        if path.is_file() {
            return Ok(path.clone());
        }
        return Err(ClarionError::Config(format!(
            "synthesis executable not found: {}",
            path.display()
        )));
    }
    which::which("piper")
        .map_err(|_| ClarionError::Config("no synthesis executable on PATH".to_owned()))
}

fn run_worker(
    rx: &Receiver<WorkerMessage>,
    synth: &Path,
    model: &Path,
    player: &WavPlayer,
    closed: &AtomicBool,
    last_error: &Mutex<String>,
) {
    for message in rx {
        if closed.load(Ordering::SeqCst) {
            if matches!(message, WorkerMessage::Shutdown) {
                break;
            }
            continue;
        }

        match message {
            WorkerMessage::Speak(request) => {
                if !player.is_current(request.generation) {
                    continue;
                }
                match synthesize(synth, model, &request.text) {
                    Ok(wav) => {
                        if let Err(e) = player.play_if_current(&wav, request.generation) {
                            record_error(last_error, e.to_string());
                        }
                    }
                    Err(e) => record_error(last_error, e.to_string()),
                }
            }
            WorkerMessage::Shutdown => break,
        }
    }
}

fn record_error(last_error: &Mutex<String>, message: String) {
    debug!("local TTS: {message}");
    if let Ok(mut e) = last_error.lock() {
        *e = message;
    }
}

/// Run one synthesis process to completion and return the WAV bytes.
fn synthesize(synth: &Path, model: &Path, text: &str) -> Result<Vec<u8>> {
    let wav_path = std::env::temp_dir().join(format!(
        "clarion-tts-{}-{}.wav",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = synthesize_to(synth, model, text, &wav_path);
    let _ = std::fs::remove_file(&wav_path);
    result
}

fn synthesize_to(synth: &Path, model: &Path, text: &str, wav_path: &Path) -> Result<Vec<u8>> {
    let mut child = Command::new(synth)
        .arg("--model")
        .arg(model)
        .arg("--output_file")
        .arg(wav_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ClarionError::Backend(format!("failed to spawn synthesizer: {e}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(text.as_bytes());
        let _ = stdin.write_all(b"\n");
        // Dropping stdin closes the pipe so the synthesizer sees EOF.
    }

    let status = wait_with_deadline(&mut child, SYNTH_DEADLINE)?;
    if !status.success() {
        return Err(ClarionError::Backend(format!(
            "synthesizer exited with {status}"
        )));
    }

    let wav = std::fs::read(wav_path)?;
    if wav.is_empty() {
        return Err(ClarionError::Backend(
            "synthesizer produced no audio".to_owned(),
        ));
    }
    Ok(wav)
}

fn wait_with_deadline(child: &mut Child, deadline: Duration) -> Result<std::process::ExitStatus> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if start.elapsed() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ClarionError::Backend(
                        "synthesizer timed out".to_owned(),
                    ));
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return Err(ClarionError::Backend(format!("wait failed: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn missing_model_fails_construction() {
        let config = LocalConfig {
            synth_path: Some(PathBuf::from("/bin/true")),
            model_path: Some(PathBuf::from("/nonexistent/model.onnx")),
        };
        assert!(LocalEngine::new(&config).is_err());
    }

    #[test]
    fn missing_synth_path_fails_construction() {
        let config = LocalConfig {
            synth_path: Some(PathBuf::from("/nonexistent/piper")),
            model_path: Some(PathBuf::from("/nonexistent/model.onnx")),
        };
        let err = LocalEngine::new(&config).unwrap_err();
        assert!(matches!(err, ClarionError::Config(_)));
    }

    #[cfg(unix)]
    mod with_fake_synth {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Shell script that stands in for the synthesizer: consumes stdin,
        /// writes a minimal valid WAV to the requested output file.
        fn install_fake_synth(dir: &Path) -> (PathBuf, PathBuf) {
            let mut wav = Vec::new();
            let spec = hound::WavSpec {
                channels: 1,
                sample_rate: 22050,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };
            {
                let cursor = std::io::Cursor::new(&mut wav);
                let mut writer = hound::WavWriter::new(cursor, spec).unwrap();
                for _ in 0..220 {
                    writer.write_sample(0i16).unwrap();
                }
                writer.finalize().unwrap();
            }
            let wav_src = dir.join("fixture.wav");
            std::fs::write(&wav_src, &wav).unwrap();

            let script = dir.join("fake-synth.sh");
            std::fs::write(
                &script,
                format!(
                    "#!/bin/sh\ncat > /dev/null\nout=\"\"\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = \"--output_file\" ]; then out=\"$2\"; fi\n  shift\ndone\ncp {} \"$out\"\n",
                    wav_src.display()
                ),
            )
            .unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

            let model = dir.join("model.onnx");
            std::fs::write(&model, b"model").unwrap();
            (script, model)
        }

        #[test]
        fn synthesize_runs_process_and_reads_wav() {
            let dir = tempfile::tempdir().unwrap();
            let (script, model) = install_fake_synth(dir.path());

            let wav = synthesize(&script, &model, "Hello adventurer.").unwrap();
            assert!(!wav.is_empty());
            // The bytes are a decodable WAV.
            hound::WavReader::new(std::io::Cursor::new(&wav)).unwrap();
        }

        #[test]
        fn failing_process_is_a_backend_error() {
            let dir = tempfile::tempdir().unwrap();
            let script = dir.path().join("fail.sh");
            std::fs::write(&script, "#!/bin/sh\ncat > /dev/null\nexit 3\n").unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
            let model = dir.path().join("model.onnx");
            std::fs::write(&model, b"model").unwrap();

            let err = synthesize(&script, &model, "boom").unwrap_err();
            assert!(matches!(err, ClarionError::Backend(_)));
        }
    }
}
