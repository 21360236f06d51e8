//! cpal-backed playback deck.
//!
//! Every play mints a fresh output stream reading the shared PCM buffer
//! from the requested offset; the stream feeds each rendered sample into
//! the analyzer tap so the spectrum tracks exactly what is audible.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamConfig};

use nebula_signal::{PlaybackDeck, PlaybackUnit};

use super::decoder::PcmBuffer;
use super::tap::SampleTap;

/// Advances through the buffer at the rate ratio between the track and the
/// output device, handing one mono sample per output frame.
struct Playhead {
    samples: Arc<[f32]>,
    pos: f64,
    step: f64,
    tap: SampleTap,
    scratch: Vec<f32>,
}

impl Playhead {
    fn next_sample(&mut self) -> f32 {
        // Silence past the end; the unit keeps running until stopped.
        let s = self.samples.get(self.pos as usize).copied().unwrap_or(0.0);
        self.pos += self.step;
        s
    }

    fn render(&mut self, len: usize, channels: usize, mut write: impl FnMut(usize, f32)) {
        self.scratch.clear();
        let mut frame = 0;
        while frame < len {
            let s = self.next_sample();
            for ch in 0..channels.min(len - frame) {
                write(frame + ch, s);
            }
            self.scratch.push(s);
            frame += channels;
        }
        self.tap.push(&self.scratch);
    }
}

fn build_stream_f32(
    device: &Device,
    config: &StreamConfig,
    channels: usize,
    mut playhead: Playhead,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [f32], _| {
            playhead.render(data.len(), channels, |i, s| data[i] = s);
        },
        err_fn,
        None,
    )
}

fn build_stream_i16(
    device: &Device,
    config: &StreamConfig,
    channels: usize,
    mut playhead: Playhead,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [i16], _| {
            playhead.render(data.len(), channels, |i, s| {
                data[i] = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            });
        },
        err_fn,
        None,
    )
}

fn build_stream_u16(
    device: &Device,
    config: &StreamConfig,
    channels: usize,
    mut playhead: Playhead,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [u16], _| {
            playhead.render(data.len(), channels, |i, s| {
                let centered = s.clamp(-1.0, 1.0) * 0.5 + 0.5;
                data[i] = (centered * u16::MAX as f32) as u16;
            });
        },
        err_fn,
        None,
    )
}

/// Deck over the default cpal output device.
pub struct CpalDeck {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    tap: SampleTap,
}

impl CpalDeck {
    /// Opens the default output device, or None when the host has none.
    pub fn new(tap: SampleTap) -> Option<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device()?;
        let default = device.default_output_config().ok()?;
        let sample_format = default.sample_format();
        let config: StreamConfig = default.into();

        log::info!(
            "output device: {} ({} ch @ {} Hz, {:?})",
            device.name().unwrap_or_else(|_| "unknown".into()),
            config.channels,
            config.sample_rate.0,
            sample_format
        );

        Some(Self {
            device,
            config,
            sample_format,
            tap,
        })
    }
}

impl PlaybackDeck for CpalDeck {
    type Buffer = PcmBuffer;
    type Unit = CpalUnit;

    fn resume(&mut self) {
        // cpal output streams run as soon as play() is called on them;
        // there is no suspended-context state on the native backends.
    }

    fn start(&mut self, buffer: &PcmBuffer, offset: f64) -> Option<CpalUnit> {
        let channels = self.config.channels.max(1) as usize;
        let device_rate = self.config.sample_rate.0 as f64;

        let playhead = Playhead {
            samples: Arc::clone(&buffer.samples),
            pos: offset.max(0.0) * buffer.sample_rate as f64,
            step: buffer.sample_rate as f64 / device_rate,
            tap: self.tap.clone(),
            scratch: Vec::with_capacity(2048),
        };

        let err_fn = |err| log::error!("output stream error: {err}");

        let built = match self.sample_format {
            SampleFormat::F32 => {
                build_stream_f32(&self.device, &self.config, channels, playhead, err_fn)
            }
            SampleFormat::I16 => {
                build_stream_i16(&self.device, &self.config, channels, playhead, err_fn)
            }
            SampleFormat::U16 => {
                build_stream_u16(&self.device, &self.config, channels, playhead, err_fn)
            }
            other => {
                log::error!("unsupported output sample format: {other:?}");
                return None;
            }
        };

        let stream = match built {
            Ok(stream) => stream,
            Err(e) => {
                log::error!("failed to build output stream: {e}");
                return None;
            }
        };
        if let Err(e) = stream.play() {
            log::error!("failed to start output stream: {e}");
            return None;
        }

        Some(CpalUnit {
            stream: Some(stream),
        })
    }
}

/// One live output stream. Dropping the stream tears it down, so stop is
/// naturally idempotent.
pub struct CpalUnit {
    stream: Option<cpal::Stream>,
}

impl PlaybackUnit for CpalUnit {
    fn stop(&mut self) {
        self.stream.take();
    }
}
