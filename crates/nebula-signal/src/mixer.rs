//! Dual-rate smoothing and recombination.
//!
//! Every band energy runs through a fast and a slow exponential moving
//! average; a fixed per-feature blend recombines them, and a master stage
//! smooths the blend toward the published values. Three independent
//! first-order low-pass stages, so how fast a value reacts and how fast
//! the renderer perceives change tune independently.

use crate::bands::BandEnergies;

/// Per-feature blend of the slow and fast accumulators: bass leans on the
/// slow trend, high tracks transients, mid and energy sit between. Tuned
/// constants; reproduce, don't re-derive.
const SLOW_WEIGHTS: BandEnergies = BandEnergies {
    bass: 0.8,
    mid: 0.7,
    high: 0.6,
    energy: 0.7,
};
const FAST_WEIGHTS: BandEnergies = BandEnergies {
    bass: 0.4,
    mid: 0.5,
    high: 0.7,
    energy: 0.3,
};

/// Fraction of the beat pulse layered onto the published energy.
const PULSE_GAIN: f32 = 0.25;

/// Per-frame smoothing coefficients, externally tunable.
#[derive(Clone, Copy, Debug)]
pub struct MixerParams {
    /// Post-mix multiplier.
    pub gain: f32,
    /// Fast accumulator smoothing, (0, 1].
    pub fast_smooth: f32,
    /// Slow accumulator smoothing, (0, 1].
    pub slow_smooth: f32,
    /// Master stage smoothing toward the published values, (0, 1].
    pub master_smooth: f32,
}

impl Default for MixerParams {
    fn default() -> Self {
        Self {
            gain: 1.0,
            fast_smooth: 0.35,
            slow_smooth: 0.05,
            master_smooth: 0.06,
        }
    }
}

/// First-order low-pass step toward `target`.
fn ema(state: &mut BandEnergies, target: &BandEnergies, alpha: f32) {
    state.bass += (target.bass - state.bass) * alpha;
    state.mid += (target.mid - state.mid) * alpha;
    state.high += (target.high - state.high) * alpha;
    state.energy += (target.energy - state.energy) * alpha;
}

/// Dual-rate smoother feeding the values handed to the renderer.
///
/// Owns three accumulators: `fast` and `slow` chase the raw bands at their
/// own rates, `published` chases the blended mix. State persists across
/// frames and is only cleared on explicit reset.
pub struct DualRateMixer {
    fast: BandEnergies,
    slow: BandEnergies,
    published: BandEnergies,
}

impl DualRateMixer {
    pub fn new() -> Self {
        Self {
            fast: BandEnergies::default(),
            slow: BandEnergies::default(),
            published: BandEnergies::default(),
        }
    }

    /// Feeds one frame of raw band energies plus the current beat pulse,
    /// returning the values to publish.
    ///
    /// The pulse rides on the returned energy only; it never enters the
    /// published accumulator, so the base envelope stays stable and a
    /// retrigger replaces rather than compounds.
    pub fn update(&mut self, raw: &BandEnergies, pulse: f32, params: &MixerParams) -> BandEnergies {
        ema(&mut self.fast, raw, params.fast_smooth);
        ema(&mut self.slow, raw, params.slow_smooth);

        let mix = BandEnergies {
            bass: (self.slow.bass * SLOW_WEIGHTS.bass + self.fast.bass * FAST_WEIGHTS.bass)
                * params.gain,
            mid: (self.slow.mid * SLOW_WEIGHTS.mid + self.fast.mid * FAST_WEIGHTS.mid)
                * params.gain,
            high: (self.slow.high * SLOW_WEIGHTS.high + self.fast.high * FAST_WEIGHTS.high)
                * params.gain,
            energy: (self.slow.energy * SLOW_WEIGHTS.energy + self.fast.energy * FAST_WEIGHTS.energy)
                * params.gain,
        };

        ema(&mut self.published, &mix, params.master_smooth);

        let mut out = self.published;
        out.energy += pulse * PULSE_GAIN;
        out
    }

    /// The current published values, without any pulse layered on.
    pub fn published(&self) -> &BandEnergies {
        &self.published
    }

    /// Zeroes all three accumulators (track reload).
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for DualRateMixer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: MixerParams = MixerParams {
        gain: 1.0,
        fast_smooth: 1.0,
        slow_smooth: 1.0,
        master_smooth: 1.0,
    };

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_unit_coefficients_converge_in_one_frame() {
        let mut mixer = DualRateMixer::new();
        let raw = BandEnergies {
            bass: 0.5,
            mid: 0.5,
            high: 0.5,
            energy: 0.5,
        };
        let out = mixer.update(&raw, 0.0, &UNIT);
        // With every stage wide open the output is exactly the fixed-weight
        // blend of the raw value.
        assert!(approx(out.bass, 0.5 * (0.8 + 0.4)));
        assert!(approx(out.mid, 0.5 * (0.7 + 0.5)));
        assert!(approx(out.high, 0.5 * (0.6 + 0.7)));
        assert!(approx(out.energy, 0.5 * (0.7 + 0.3)));
    }

    #[test]
    fn test_gain_scales_the_mix() {
        let mut mixer = DualRateMixer::new();
        let raw = BandEnergies {
            bass: 0.5,
            mid: 0.0,
            high: 0.0,
            energy: 0.0,
        };
        let params = MixerParams { gain: 2.0, ..UNIT };
        let out = mixer.update(&raw, 0.0, &params);
        assert!(approx(out.bass, 0.5 * (0.8 + 0.4) * 2.0));
    }

    #[test]
    fn test_zero_coefficient_freezes_stage() {
        let mut mixer = DualRateMixer::new();
        let raw = BandEnergies {
            bass: 1.0,
            mid: 1.0,
            high: 1.0,
            energy: 1.0,
        };
        let params = MixerParams {
            master_smooth: 0.0,
            ..UNIT
        };
        for _ in 0..10 {
            let out = mixer.update(&raw, 0.0, &params);
            assert_eq!(out, BandEnergies::default());
        }
    }

    #[test]
    fn test_pulse_layers_on_energy_only() {
        let mut mixer = DualRateMixer::new();
        let raw = BandEnergies {
            bass: 0.2,
            mid: 0.2,
            high: 0.2,
            energy: 0.2,
        };
        let quiet = mixer.update(&raw, 0.0, &UNIT);
        let boosted = mixer.update(&raw, 1.0, &UNIT);
        assert!(approx(boosted.energy, quiet.energy + 0.25));
        assert!(approx(boosted.bass, quiet.bass));
        assert!(approx(boosted.mid, quiet.mid));
        assert!(approx(boosted.high, quiet.high));
    }

    #[test]
    fn test_pulse_never_contaminates_published_state() {
        let mut mixer = DualRateMixer::new();
        let raw = BandEnergies {
            bass: 0.2,
            mid: 0.2,
            high: 0.2,
            energy: 0.2,
        };
        mixer.update(&raw, 1.0, &UNIT);
        let base = mixer.published().energy;
        let out = mixer.update(&raw, 0.0, &UNIT);
        // Once the pulse is gone the output is back to the clean envelope.
        assert!(approx(out.energy, base));
    }

    #[test]
    fn test_slow_stage_lags_fast_stage() {
        let mut mixer = DualRateMixer::new();
        let raw = BandEnergies {
            bass: 1.0,
            mid: 1.0,
            high: 1.0,
            energy: 1.0,
        };
        let params = MixerParams::default();
        mixer.update(&raw, 0.0, &params);
        assert!(mixer.fast.bass > mixer.slow.bass);
    }

    #[test]
    fn test_reset_zeroes_accumulators() {
        let mut mixer = DualRateMixer::new();
        let raw = BandEnergies {
            bass: 1.0,
            mid: 1.0,
            high: 1.0,
            energy: 1.0,
        };
        mixer.update(&raw, 1.0, &UNIT);
        mixer.reset();
        assert_eq!(*mixer.published(), BandEnergies::default());
        let out = mixer.update(&BandEnergies::default(), 0.0, &UNIT);
        assert_eq!(out, BandEnergies::default());
    }
}
