//! Per-frame pipeline.
//!
//! One tick: sample the spectrum, feed the beat detector, run the mixer,
//! blend the scroll states, and hand the results to the rendering surface
//! as a plain uniform block.

use bytemuck::{Pod, Zeroable};

use crate::bands::{SpectrumSampler, SpectrumTap};
use crate::beat::{BeatConfig, BeatDetector};
use crate::mixer::{DualRateMixer, MixerParams};
use crate::scroll::state_weights;

/// Everything the rendering surface needs for one frame, laid out as a
/// block of f32s padded to a 16-byte multiple for direct GPU upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub gas: f32,
    pub water: f32,
    pub solid: f32,
    pub fire: f32,
    pub stillness: f32,
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
    /// Beat-boosted overall energy.
    pub energy: f32,
    pub time: f32,
    _pad: [f32; 2],
}

/// Owns the audio feature pipeline and the scroll blend for one surface.
///
/// Exclusively owned by the frame driver: everything runs inside the
/// host's frame callback and nothing blocks it.
pub struct VisualPipeline {
    sampler: SpectrumSampler,
    beat: BeatDetector,
    mixer: DualRateMixer,
}

impl VisualPipeline {
    pub fn new() -> Self {
        Self::with_beat_config(BeatConfig::default())
    }

    pub fn with_beat_config(config: BeatConfig) -> Self {
        Self {
            sampler: SpectrumSampler::new(),
            beat: BeatDetector::with_config(config),
            mixer: DualRateMixer::new(),
        }
    }

    /// Attaches the live spectrum source. Created once, on first load.
    pub fn attach_tap(&mut self, tap: Box<dyn SpectrumTap>) {
        self.sampler.attach(tap);
    }

    pub fn is_tapped(&self) -> bool {
        self.sampler.is_attached()
    }

    /// Runs one frame of the pipeline.
    pub fn tick(&mut self, time: f32, progress: f32, params: &MixerParams) -> FrameUniforms {
        let raw = self.sampler.sample();
        let pulse = self.beat.update(raw.energy);
        let bands = self.mixer.update(&raw, pulse, params);
        let weights = state_weights(progress);

        FrameUniforms {
            gas: weights.gas,
            water: weights.water,
            solid: weights.solid,
            fire: weights.fire,
            stillness: weights.stillness,
            bass: bands.bass,
            mid: bands.mid,
            high: bands.high,
            energy: bands.energy,
            time,
            _pad: [0.0; 2],
        }
    }

    /// Clears all accumulated smoothing and beat state (track reload).
    pub fn reset(&mut self) {
        self.beat.reset();
        self.mixer.reset();
    }
}

impl Default for VisualPipeline {
    fn default() -> Self {
        Self::new()
    }
}
