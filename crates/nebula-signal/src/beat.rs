//! Beat detection.
//!
//! An adaptive moving average tracks the overall energy envelope; whenever
//! the instantaneous energy jumps a fixed ratio above that baseline the
//! detector snaps its pulse to a boost level, and the pulse decays
//! exponentially every frame. Edge trigger with exponential release, not a
//! precise onset detector; there is no debouncing beyond the ratio test.

/// Tuning for the beat trigger and its release envelope.
#[derive(Clone, Copy, Debug)]
pub struct BeatConfig {
    /// Moving-average adaptation rate per frame.
    pub adapt: f32,
    /// Trigger ratio above the moving average.
    pub threshold: f32,
    /// Multiplicative pulse decay per frame.
    pub decay: f32,
    /// Pulse level assigned on trigger.
    pub boost: f32,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            adapt: 0.02,
            threshold: 1.35,
            decay: 0.92,
            boost: 1.2,
        }
    }
}

/// Emits a decaying impulse whenever overall energy spikes above its
/// adaptive baseline. A retrigger replaces the decaying residual, it does
/// not stack on top of it.
pub struct BeatDetector {
    config: BeatConfig,
    moving_avg: f32,
    pulse: f32,
}

impl BeatDetector {
    pub fn new() -> Self {
        Self::with_config(BeatConfig::default())
    }

    pub fn with_config(config: BeatConfig) -> Self {
        Self {
            config,
            moving_avg: 0.0,
            pulse: 0.0,
        }
    }

    /// Feeds one frame of overall energy, returning the current pulse.
    ///
    /// A trigger frame reports `boost * decay`: the pulse is reassigned to
    /// the boost level and then decayed once like every other frame.
    pub fn update(&mut self, energy: f32) -> f32 {
        self.moving_avg += (energy - self.moving_avg) * self.config.adapt;
        if energy > self.moving_avg * self.config.threshold {
            self.pulse = self.config.boost;
        }
        self.pulse *= self.config.decay;
        self.pulse
    }

    pub fn pulse(&self) -> f32 {
        self.pulse
    }

    pub fn moving_avg(&self) -> f32 {
        self.moving_avg
    }

    /// Clears the baseline and any active pulse (track reload).
    pub fn reset(&mut self) {
        self.moving_avg = 0.0;
        self.pulse = 0.0;
    }

    pub fn config(&self) -> &BeatConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: BeatConfig) {
        self.config = config;
    }
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new()
    }
}
