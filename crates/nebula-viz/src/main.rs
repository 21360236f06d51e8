mod audio;
mod utils;

use std::env;
use std::fs;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};

use nebula_signal::{
    PlaybackController, PlaybackState, ScrollSource, TransportClock, VisualPipeline,
};

use audio::{CpalDeck, SampleTap, SpectrumAnalyzer, WavDecoder, FFT_SIZE};
use utils::Config;

/// Monotonic transport clock anchored at process start.
struct MonotonicClock(Instant);

impl TransportClock for MonotonicClock {
    fn now(&self) -> f64 {
        self.0.elapsed().as_secs_f64()
    }
}

/// Stand-in for a page scroll reader: sweeps progress 0 -> 1 -> 0 over a
/// fixed period so every state band gets exercised.
struct SweepScroll {
    started: Instant,
    period: f64,
}

impl SweepScroll {
    fn new(period: f64) -> Self {
        Self {
            started: Instant::now(),
            period: period.max(1.0),
        }
    }
}

impl ScrollSource for SweepScroll {
    fn current_progress(&mut self) -> f32 {
        let phase = (self.started.elapsed().as_secs_f64() / self.period).fract();
        let triangle = if phase < 0.5 {
            phase * 2.0
        } else {
            2.0 - phase * 2.0
        };
        triangle as f32
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.contains(&"--audio-info".to_string()) {
        utils::log_audio_info();
        return Ok(());
    }

    let Some(path) = args.iter().skip(1).find(|a| !a.starts_with('-')) else {
        bail!("usage: nebula-viz [--audio-info] <track.wav>");
    };

    let config = Config::load();
    let params = config.mixer_params();

    let bytes = fs::read(path).with_context(|| format!("reading {}", path))?;

    let tap = SampleTap::new(FFT_SIZE * 2);
    let deck = CpalDeck::new(tap.clone()).context("no usable audio output device")?;
    let clock = MonotonicClock(Instant::now());

    let mut controller = PlaybackController::new(clock, deck);
    let mut decoder = WavDecoder;
    controller
        .load(&mut decoder, &bytes)
        .with_context(|| format!("decoding {}", path))?;

    let duration = controller.buffer().map(|b| b.duration()).unwrap_or(0.0);
    log::info!("loaded {} ({:.1}s)", path, duration);

    let mut pipeline = VisualPipeline::with_beat_config(config.beat_config());
    pipeline.attach_tap(Box::new(SpectrumAnalyzer::new(tap)));

    let mut scroll = SweepScroll::new(config.sweep_secs());

    controller.play();

    let frame_budget = Duration::from_secs_f64(1.0 / config.fps().max(1) as f64);
    let started = Instant::now();
    let mut frames: u64 = 0;

    while controller.state() == PlaybackState::Playing && controller.position() < duration {
        let frame_start = Instant::now();

        let time = started.elapsed().as_secs_f32();
        let progress = scroll.current_progress();
        let uniforms = pipeline.tick(time, progress, &params);

        if frames % config.fps().max(1) as u64 == 0 {
            log::debug!(
                "t={:.1}s progress={:.2} bands=[{:.2} {:.2} {:.2} {:.2}]",
                time,
                progress,
                uniforms.bass,
                uniforms.mid,
                uniforms.high,
                uniforms.energy
            );
        }

        frames += 1;
        if let Some(remaining) = frame_budget.checked_sub(frame_start.elapsed()) {
            thread::sleep(remaining);
        }
    }

    controller.reset();
    log::info!("track finished after {} frames", frames);
    Ok(())
}
