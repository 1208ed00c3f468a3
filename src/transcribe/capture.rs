//! Microphone capture.
//!
//! The cpal stream is owned by a dedicated thread (cpal streams are not
//! `Send`); captured samples accumulate in a shared buffer that the feed
//! drains on its chunk cadence. Desktop builds talk to real hardware; other
//! targets get a stub that refuses to start.

use std::sync::{Arc, Mutex};

#[cfg(feature = "desktop")]
use anyhow::{Context, Result, anyhow};
#[cfg(not(feature = "desktop"))]
use anyhow::{Result, anyhow};

/// Convert f32 samples to little-endian 16-bit PCM bytes.
pub fn samples_to_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let value = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Handle to a live capture. Dropping it stops the device.
pub struct CaptureHandle {
    samples: Arc<Mutex<Vec<f32>>>,
    #[cfg(feature = "desktop")]
    shutdown: std::sync::mpsc::Sender<()>,
    #[cfg(feature = "desktop")]
    worker: Option<std::thread::JoinHandle<()>>,
}

impl CaptureHandle {
    /// Take everything captured since the last drain.
    pub fn drain_chunk(&self) -> Vec<f32> {
        match self.samples.lock() {
            Ok(mut buffer) => std::mem::take(&mut *buffer),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(feature = "desktop")]
impl Drop for CaptureHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Open the default input device and start capturing.
///
/// Fails synchronously when there is no device or the platform denies
/// access, so the caller can stay Idle and surface its status literal.
#[cfg(feature = "desktop")]
pub fn open_capture() -> Result<CaptureHandle> {
    let samples = Arc::new(Mutex::new(Vec::new()));
    let (shutdown_tx, shutdown_rx) = std::sync::mpsc::channel::<()>();
    let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<()>>();

    let sink = Arc::clone(&samples);
    let worker = std::thread::Builder::new()
        .name("starling-mic".to_string())
        .spawn(move || {
            let stream = match build_input_stream(sink) {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    stream
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };
            // Hold the stream until the handle is dropped.
            let _ = shutdown_rx.recv();
            drop(stream);
        })
        .context("failed to spawn capture thread")?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(CaptureHandle {
            samples,
            shutdown: shutdown_tx,
            worker: Some(worker),
        }),
        Ok(Err(err)) => {
            let _ = worker.join();
            Err(err)
        }
        Err(_) => Err(anyhow!("capture thread exited before reporting readiness")),
    }
}

#[cfg(not(feature = "desktop"))]
pub fn open_capture() -> Result<CaptureHandle> {
    Err(anyhow!("microphone capture requires the desktop build"))
}

#[cfg(feature = "desktop")]
fn build_input_stream(sink: Arc<Mutex<Vec<f32>>>) -> Result<cpal::Stream> {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("no input device available"))?;
    let supported = device
        .default_input_config()
        .context("querying default input config")?;
    let channels = supported.channels() as usize;
    let config = supported.config();

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => {
            let sink = Arc::clone(&sink);
            device.build_input_stream(
                &config,
                move |data: &[f32], _| push_mono(&sink, data, channels),
                log_stream_error,
                None,
            )?
        }
        cpal::SampleFormat::I16 => {
            let sink = Arc::clone(&sink);
            device.build_input_stream(
                &config,
                move |data: &[i16], _| {
                    let floats: Vec<f32> =
                        data.iter().map(|&s| f32::from(s) / 32768.0).collect();
                    push_mono(&sink, &floats, channels);
                },
                log_stream_error,
                None,
            )?
        }
        format => return Err(anyhow!("unsupported input sample format {format}")),
    };

    stream.play().context("starting capture stream")?;
    Ok(stream)
}

#[cfg(feature = "desktop")]
fn log_stream_error(err: cpal::StreamError) {
    tracing::error!("input stream error: {err}");
}

/// Downmix interleaved frames to mono and append to the shared buffer.
#[cfg(feature = "desktop")]
fn push_mono(sink: &Mutex<Vec<f32>>, data: &[f32], channels: usize) {
    let Ok(mut buffer) = sink.lock() else {
        return;
    };
    if channels <= 1 {
        buffer.extend_from_slice(data);
        return;
    }
    buffer.extend(
        data.chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm16_conversion_clamps_and_scales() {
        assert_eq!(samples_to_pcm16(&[0.0]), vec![0, 0]);
        assert_eq!(samples_to_pcm16(&[1.0]), 32767i16.to_le_bytes().to_vec());
        assert_eq!(samples_to_pcm16(&[-1.0]), (-32767i16).to_le_bytes().to_vec());
        // Out-of-range input clamps instead of wrapping.
        assert_eq!(samples_to_pcm16(&[2.0]), 32767i16.to_le_bytes().to_vec());
        assert_eq!(samples_to_pcm16(&[-2.0]), (-32768i16).to_le_bytes().to_vec());
    }

    #[test]
    fn pcm16_output_is_two_bytes_per_sample() {
        let bytes = samples_to_pcm16(&[0.1, -0.1, 0.5]);
        assert_eq!(bytes.len(), 6);
    }
}
