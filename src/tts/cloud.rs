//! Cloud speech backend.
//!
//! Fetches WAV bytes from a remote endpoint
//! (`GET {base}?m=<text>&r=<rate>&v=<voice>`) and plays them locally. Because
//! the audio comes back to this process, every request is stamped with the
//! playback generation current at submission; responses that arrive after the
//! user has advanced the dialog are dropped without playing.

use super::{SpeechEngine, SpeechRequest, WavPlayer};
use crate::config::CloudConfig;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::debug;

const QUEUE_CAPACITY: usize = 8;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

enum WorkerMessage {
    Speak(SpeechRequest),
    Shutdown,
}

/// Engine that downloads synthesized WAV audio and plays it behind the
/// generation guard.
pub struct CloudEngine {
    tx: Sender<WorkerMessage>,
    worker: Mutex<Option<JoinHandle<()>>>,
    closed: Arc<AtomicBool>,
    player: Arc<WavPlayer>,
    last_error: Arc<Mutex<String>>,
    configured: bool,
}

impl CloudEngine {
    pub fn new(config: &CloudConfig) -> Self {
        let configured = !config.base_url.trim().is_empty();

        let player = Arc::new(WavPlayer::new());
        let closed = Arc::new(AtomicBool::new(false));
        let last_error = Arc::new(Mutex::new(String::new()));
        let (tx, rx) = crossbeam_channel::bounded(QUEUE_CAPACITY);

        let worker = {
            let player = Arc::clone(&player);
            let closed = Arc::clone(&closed);
            let last_error = Arc::clone(&last_error);
            let config = config.clone();
            std::thread::Builder::new()
                .name("clarion-tts-cloud".to_owned())
                .spawn(move || run_worker(&rx, &config, &player, &closed, &last_error))
                .ok()
        };

        Self {
            tx,
            worker: Mutex::new(worker),
            closed,
            player,
            last_error,
            configured,
        }
    }
}

impl SpeechEngine for CloudEngine {
    fn is_available(&self) -> bool {
        self.configured && !self.closed.load(Ordering::SeqCst)
    }

    fn speak(&self, text: &str) {
        if !self.is_available() || text.trim().is_empty() {
            return;
        }

        // Each new utterance supersedes the previous one: bumping here stops
        // current playback and invalidates everything still in flight.
        let generation = self.player.bump();

        let request = SpeechRequest {
            text: text.trim().to_owned(),
            generation,
        };
        match self.tx.try_send(WorkerMessage::Speak(request)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("cloud queue full, dropping phrase"),
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

fn run_worker(
    rx: &Receiver<WorkerMessage>,
    config: &CloudConfig,
    player: &WavPlayer,
    closed: &AtomicBool,
    last_error: &Mutex<String>,
) {
    let client = match reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            record_error(last_error, format!("HTTP client setup failed: {e}"));
            return;
        }
    };

    for message in rx {
        if closed.load(Ordering::SeqCst) {
            if matches!(message, WorkerMessage::Shutdown) {
                break;
            }
            continue;
        }

        match message {
            WorkerMessage::Speak(request) => {
                // Superseded before we even started: skip the fetch.
                if !player.is_current(request.generation) {
                    continue;
                }

                let url = synth_url(config, &request.text);
                match client.get(&url).send() {
                    Ok(response) if response.status().is_success() => {
                        match response.bytes() {
                            Ok(wav) => {
                                // Late response after the user clicked
                                // through: drop silently.
                                if !player.is_current(request.generation) {
                                    continue;
                                }
                                if let Err(e) =
                                    player.play_if_current(&wav, request.generation)
                                {
                                    record_error(last_error, e.to_string());
                                }
                            }
                            Err(e) => record_error(
                                last_error,
                                format!("cloud response read failed: {e}"),
                            ),
                        }
                    }
                    Ok(response) => record_error(
                        last_error,
                        format!("cloud service returned {}", response.status()),
                    ),
                    Err(e) => record_error(last_error, format!("cloud service unreachable: {e}")),
                }
            }
            WorkerMessage::Shutdown => break,
        }
    }
}

fn record_error(last_error: &Mutex<String>, message: String) {
    debug!("cloud TTS: {message}");
    if let Ok(mut e) = last_error.lock() {
        *e = message;
    }
}

/// `{base}?m=<urlencoded text>&r=<rate>&v=<voice>`.
fn synth_url(config: &CloudConfig, text: &str) -> String {
    format!(
        "{}?m={}&r={}&v={}",
        config.base_url.trim().trim_end_matches('/'),
        urlencoding::encode(text),
        config.rate,
        config.voice
    )
}
