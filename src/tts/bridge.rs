//! Bridge speech backend.
//!
//! POSTs phrases to a locally running speech service that owns synthesis and
//! playback. No audio ever flows back through this process, so there is
//! nothing to generation-gate here; stopping is the bridge's job.
//!
//! All HTTP happens on a single worker thread fed by a bounded channel, so
//! requests are serialized in submission order and `speak` never blocks the
//! tick thread. Transport failures are non-fatal: they flip the "up" flag and
//! record a last-error string for diagnostics.

use super::SpeechEngine;
use crate::config::BridgeConfig;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

const QUEUE_CAPACITY: usize = 16;

enum WorkerMessage {
    Speak(String),
    CheckHealth,
    Shutdown,
}

/// Shared health state, written by the worker, read from anywhere.
#[derive(Default)]
struct Health {
    up: AtomicBool,
    last_error: Mutex<String>,
}

impl Health {
    fn set_up(&self) {
        self.up.store(true, Ordering::SeqCst);
        if let Ok(mut e) = self.last_error.lock() {
            e.clear();
        }
    }

    fn set_down(&self, error: String) {
        self.up.store(false, Ordering::SeqCst);
        if let Ok(mut e) = self.last_error.lock() {
            *e = error;
        }
    }
}

/// Engine that delegates synthesis and playback to a bridge service.
pub struct BridgeEngine {
    tx: Sender<WorkerMessage>,
    worker: Mutex<Option<JoinHandle<()>>>,
    closed: Arc<AtomicBool>,
    health: Arc<Health>,
}

impl BridgeEngine {
    pub fn new(config: &BridgeConfig) -> Self {
        let speak_url = join_url(&config.base_url, "speak");
        let health_url = join_url(&config.base_url, "health");
        let timeout = Duration::from_millis(config.timeout_ms.max(100));

        let health = Arc::new(Health::default());
        let closed = Arc::new(AtomicBool::new(false));
        let (tx, rx) = crossbeam_channel::bounded(QUEUE_CAPACITY);

        let worker = {
            let health = Arc::clone(&health);
            let closed = Arc::clone(&closed);
            std::thread::Builder::new()
                .name("clarion-tts-bridge".to_owned())
                .spawn(move || run_worker(&rx, &speak_url, &health_url, timeout, &health, &closed))
                .ok()
        };

        if worker.is_none() {
            warn!("failed to spawn bridge worker thread");
        }

        // Probe immediately so diagnostics have an answer before the first
        // phrase.
        let _ = tx.try_send(WorkerMessage::CheckHealth);

        Self {
            tx,
            worker: Mutex::new(worker),
            closed,
            health,
        }
    }
}

impl SpeechEngine for BridgeEngine {
    fn is_available(&self) -> bool {
        !self.closed.load(Ordering::SeqCst) && self.health.up.load(Ordering::SeqCst)
    }

    fn speak(&self, text: &str) {
        if self.closed.load(Ordering::SeqCst) || text.trim().is_empty() {
            return;
        }

        // Best-effort: when the queue is full the phrase is already stale by
        // the time the worker would reach it.
        match self.tx.try_send(WorkerMessage::Speak(text.trim().to_owned())) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("bridge queue full, dropping phrase"),
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    fn stop_now(&self) {
        // The bridge owns playback; without a control endpoint there is
        // nothing to cancel on this side.
    }

    fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        // Queued phrases are abandoned: the worker skips Speak messages once
        // the closed flag is set, so the join stays prompt.
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

    fn check_health(&self) {
        if !self.closed.load(Ordering::SeqCst) {
            let _ = self.tx.try_send(WorkerMessage::CheckHealth);
        }
    }

    fn last_error(&self) -> Option<String> {
        self.health
            .last_error
            .lock()
            .ok()
            .map(|e| e.clone())
            .filter(|e| !e.is_empty())
    }
}

fn run_worker(
    rx: &Receiver<WorkerMessage>,
    speak_url: &str,
    health_url: &str,
    timeout: Duration,
    health: &Health,
    closed: &AtomicBool,
) {
    let client = match reqwest::blocking::Client::builder().timeout(timeout).build() {
        Ok(c) => c,
        Err(e) => {
            health.set_down(format!("HTTP client setup failed: {e}"));
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
            WorkerMessage::Speak(text) => {
                let body = serde_json::json!({ "text": text });
                match client.post(speak_url).json(&body).send() {
                    Ok(response) if response.status().is_success() => health.set_up(),
                    Ok(response) => {
                        health.set_down(format!("bridge returned {}", response.status()));
                    }
                    Err(e) => health.set_down(format!("bridge unreachable: {e}")),
                }
            }
            WorkerMessage::CheckHealth => match client.get(health_url).send() {
                Ok(response) if response.status().is_success() => health.set_up(),
                Ok(response) => {
                    health.set_down(format!("health check returned {}", response.status()));
                }
                Err(e) => health.set_down(format!("bridge unreachable: {e}")),
            },
            WorkerMessage::Shutdown => break,
        }
    }
}

/// Join a base URL and a path segment without doubling slashes, leaving a
/// base that already ends in the segment untouched.
fn join_url(base: &str, segment: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    if base.ends_with(&format!("/{segment}")) {
        base.to_owned()
    } else {
        format!("{base}/{segment}")
    }
}
