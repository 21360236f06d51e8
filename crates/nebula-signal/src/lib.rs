//! Signal-processing core for the nebula-viz background engine.
//!
//! Turns a scroll-progress scalar and live audio spectrum data into the
//! stable per-frame values a rendering surface consumes: five crossfading
//! state weights plus four smoothed band energies with a beat pulse.
//! Platform concerns (clock, decoder, playback, FFT) stay behind the
//! collaborator traits defined here.

pub mod bands;
pub mod beat;
pub mod frame;
pub mod mixer;
pub mod playback;
pub mod scroll;

pub use bands::{BandEnergies, SpectrumSampler, SpectrumTap};
pub use beat::{BeatConfig, BeatDetector};
pub use frame::{FrameUniforms, VisualPipeline};
pub use mixer::{DualRateMixer, MixerParams};
pub use playback::{
    AudioDecoder, DecodeError, LoadTicket, PlaybackController, PlaybackDeck, PlaybackState,
    PlaybackUnit, TransportClock,
};
pub use scroll::{state_weights, ScrollSource, StateWeights};
