mod analyzer;
mod deck;
mod decoder;
mod tap;

pub use analyzer::{SpectrumAnalyzer, BIN_COUNT, FFT_SIZE};
pub use deck::{CpalDeck, CpalUnit};
pub use decoder::{PcmBuffer, WavDecoder};
pub use tap::SampleTap;
