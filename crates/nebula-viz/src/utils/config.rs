//! Configuration file management.
//!
//! Loads user tuning from `~/.nebula-viz.toml`. A commented template is
//! written on first run so every knob is discoverable.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use nebula_signal::{BeatConfig, MixerParams};

const CONFIG_TEMPLATE: &str = r#"# nebula-viz configuration file

# =============================================================================
# Mixer
# =============================================================================

# Post-mix gain applied to every band
# gain = 1.0

# Fast smoothing coefficient (reacts to transients)
# fast_smooth = 0.35

# Slow smoothing coefficient (tracks the trend)
# slow_smooth = 0.05

# Master smoothing toward the published values
# master_smooth = 0.06

# =============================================================================
# Beat detection
# =============================================================================

# Moving-average adaptation rate per frame
# beat_adapt = 0.02

# Trigger ratio above the moving average
# beat_threshold = 1.35

# Pulse decay per frame
# beat_decay = 0.92

# Pulse level on trigger
# beat_boost = 1.2

# =============================================================================
# Frame loop
# =============================================================================

# Target frames per second
# fps = 60

# Seconds for the demo scroll sweep to run 0 -> 1 -> 0
# sweep_secs = 30.0
"#;

#[derive(Serialize, Deserialize, Default)]
pub struct Config {
    pub gain: Option<f32>,
    pub fast_smooth: Option<f32>,
    pub slow_smooth: Option<f32>,
    pub master_smooth: Option<f32>,

    pub beat_adapt: Option<f32>,
    pub beat_threshold: Option<f32>,
    pub beat_decay: Option<f32>,
    pub beat_boost: Option<f32>,

    pub fps: Option<u32>,
    pub sweep_secs: Option<f64>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".nebula-viz.toml"))
    }

    pub fn load() -> Self {
        let path = match Self::path() {
            Some(p) => p,
            None => return Self::default(),
        };

        // Create template file if it doesn't exist
        if !path.exists() {
            let _ = fs::write(&path, CONFIG_TEMPLATE);
            log::info!("created config template at {:?}", path);
        }

        fs::read_to_string(&path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn fps(&self) -> u32 {
        self.fps.unwrap_or(60)
    }

    pub fn sweep_secs(&self) -> f64 {
        self.sweep_secs.unwrap_or(30.0)
    }

    /// Mixer coefficients with defaults filled in.
    pub fn mixer_params(&self) -> MixerParams {
        let d = MixerParams::default();
        MixerParams {
            gain: self.gain.unwrap_or(d.gain),
            fast_smooth: self.fast_smooth.unwrap_or(d.fast_smooth),
            slow_smooth: self.slow_smooth.unwrap_or(d.slow_smooth),
            master_smooth: self.master_smooth.unwrap_or(d.master_smooth),
        }
    }

    /// Beat-detector tuning with defaults filled in.
    pub fn beat_config(&self) -> BeatConfig {
        let d = BeatConfig::default();
        BeatConfig {
            adapt: self.beat_adapt.unwrap_or(d.adapt),
            threshold: self.beat_threshold.unwrap_or(d.threshold),
            decay: self.beat_decay.unwrap_or(d.decay),
            boost: self.beat_boost.unwrap_or(d.boost),
        }
    }
}
