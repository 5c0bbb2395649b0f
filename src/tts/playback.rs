//! Generation-gated WAV playback.
//!
//! Some backends hand audio bytes back to us instead of playing them
//! remotely. By the time the bytes arrive the user may have clicked through
//! the dialog, so playback is gated behind a [`GenerationGuard`]: a result is
//! only played while the guard still holds the value captured at submission
//! time. Bumping the guard is how "stop" is approximated for backends with no
//! hard-stop primitive.

use crate::error::{ClarionError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Monotonic cancellation epoch shared between the submitting thread and the
/// audio-producing worker.
#[derive(Debug, Default)]
pub struct GenerationGuard {
    counter: AtomicU64,
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the epoch, invalidating every outstanding result, and return
    /// the new value.
    pub fn bump(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Snapshot the current epoch.
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Whether a result stamped with `generation` is still current.
    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

/// Plays WAV byte buffers on the default output device, honoring the guard.
///
/// `play_if_current` blocks its calling worker thread until the clip finishes
/// or the generation advances; it must never be called from the UI thread.
#[derive(Debug)]
pub struct WavPlayer {
    guard: Arc<GenerationGuard>,
}

impl Default for WavPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl WavPlayer {
    pub fn new() -> Self {
        Self {
            guard: Arc::new(GenerationGuard::new()),
        }
    }

    /// Invalidate all current and pending audio and return the new epoch.
    /// Call when the dialog advances, a new line appears, or an option is
    /// clicked.
    pub fn bump(&self) -> u64 {
        self.guard.bump()
    }

    /// Snapshot the current epoch.
    pub fn current_generation(&self) -> u64 {
        self.guard.current()
    }

    /// Whether `generation` is still current.
    pub fn is_current(&self, generation: u64) -> bool {
        self.guard.is_current(generation)
    }

    /// Decode and play `wav_bytes` if `generation` is still current, aborting
    /// mid-clip as soon as it no longer is.
    ///
    /// # Errors
    ///
    /// Returns an error for undecodable WAV data or audio-device failures.
    /// A stale generation is not an error; the clip is silently dropped.
    pub fn play_if_current(&self, wav_bytes: &[u8], generation: u64) -> Result<()> {
        if wav_bytes.is_empty() || !self.guard.is_current(generation) {
            return Ok(());
        }

        let (samples, channels, sample_rate) = decode_wav(wav_bytes)?;

        // Re-check after the decode: the user may have advanced meanwhile.
        if !self.guard.is_current(generation) {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| ClarionError::Audio("no default output device".into()))?;

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let buffer = Arc::new(Mutex::new(PlaybackBuffer {
            samples,
            position: 0,
            finished: false,
        }));
        let buffer_clone = Arc::clone(&buffer);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                    let mut buf = match buffer_clone.lock() {
                        Ok(b) => b,
                        Err(_) => return,
                    };
                    for sample in data.iter_mut() {
                        if buf.position < buf.samples.len() {
                            *sample = buf.samples[buf.position];
                            buf.position += 1;
                        } else {
                            *sample = 0.0;
                            buf.finished = true;
                        }
                    }
                },
                move |err| {
                    debug!("audio output stream error: {err}");
                },
                None,
            )
            .map_err(|e| ClarionError::Audio(format!("failed to build output stream: {e}")))?;

        stream
            .play()
            .map_err(|e| ClarionError::Audio(format!("failed to start output stream: {e}")))?;

        // Poll until the clip drains or the epoch advances; dropping the
        // stream stops output.
        loop {
            std::thread::sleep(Duration::from_millis(10));

            if !self.guard.is_current(generation) {
                break;
            }
            let finished = buffer
                .lock()
                .map(|b| b.finished)
                .unwrap_or(true);
            if finished {
                break;
            }
        }

        drop(stream);
        Ok(())
    }
}

/// Internal buffer for tracking playback progress.
struct PlaybackBuffer {
    samples: Vec<f32>,
    position: usize,
    finished: bool,
}

/// Decode WAV bytes to interleaved f32 samples.
fn decode_wav(bytes: &[u8]) -> Result<(Vec<f32>, u16, u32)> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| ClarionError::Audio(format!("invalid WAV data: {e}")))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| ClarionError::Audio(format!("WAV read failed: {e}")))?,
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| f32::from(v) / 32_768.0))
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| ClarionError::Audio(format!("WAV read failed: {e}")))?,
        (format, bits) => {
            return Err(ClarionError::Audio(format!(
                "unsupported WAV format: {format:?}/{bits}-bit"
            )));
        }
    };

    Ok((samples, spec.channels, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    /// 16-bit mono WAV with `n` zero samples.
    fn wav_bytes(n: usize) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for _ in 0..n {
                writer.write_sample(0i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn guard_bump_is_monotonic() {
        let guard = GenerationGuard::new();
        let a = guard.bump();
        let b = guard.bump();
        assert!(b > a);
        assert_eq!(guard.current(), b);
    }

    #[test]
    fn guard_invalidates_older_epochs() {
        let guard = GenerationGuard::new();
        let generation = guard.bump();
        assert!(guard.is_current(generation));
        guard.bump();
        assert!(!guard.is_current(generation));
    }

    #[test]
    fn stale_generation_is_silently_dropped() {
        let player = WavPlayer::new();
        let generation = player.bump();
        player.bump();
        // Never touches the audio device, so this must succeed everywhere.
        assert!(player.play_if_current(&wav_bytes(1024), generation).is_ok());
    }

    #[test]
    fn empty_bytes_are_ignored() {
        let player = WavPlayer::new();
        let generation = player.bump();
        assert!(player.play_if_current(&[], generation).is_ok());
    }

    #[test]
    fn garbage_bytes_are_an_audio_error() {
        let player = WavPlayer::new();
        let generation = player.bump();
        let err = player.play_if_current(&[0u8; 16], generation).unwrap_err();
        assert!(matches!(err, ClarionError::Audio(_)));
    }

    #[test]
    fn decode_accepts_int16() {
        let (samples, channels, rate) = decode_wav(&wav_bytes(10)).unwrap();
        assert_eq!(samples.len(), 10);
        assert_eq!(channels, 1);
        assert_eq!(rate, 22_050);
    }
}
