//! Playback transport.
//!
//! State machine over a decoded audio buffer. Platform pieces stay behind
//! traits: a monotonic clock, a byte decoder, and a deck that mints
//! single-use playback units. The controller owns at most one live unit at
//! a time and tracks the transport offset through wall-clock deltas rather
//! than continuous position queries.

use thiserror::Error;

/// Decoding failed; the transport keeps whatever buffer it already had.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed or unsupported audio data: {0}")]
    Malformed(String),
    #[error("audio data contains no samples")]
    Empty,
}

/// Monotonically increasing clock in seconds. Read-only shared state.
pub trait TransportClock {
    fn now(&self) -> f64;
}

/// Decodes raw bytes into a playable buffer.
pub trait AudioDecoder {
    type Buffer;

    fn decode(&mut self, bytes: &[u8]) -> Result<Self::Buffer, DecodeError>;
}

/// A started playback unit. Single-use: once stopped it is discarded.
pub trait PlaybackUnit {
    /// Idempotent; stopping a unit that already ran out must not fault.
    fn stop(&mut self);
}

/// Mints playback units bound to a decoded buffer.
pub trait PlaybackDeck {
    type Buffer;
    type Unit: PlaybackUnit;

    /// Makes sure the underlying audio clock is running.
    fn resume(&mut self);

    /// Starts a fresh unit at `offset` seconds into the buffer.
    ///
    /// `None` means the platform refused; the transport stays put.
    fn start(&mut self, buffer: &Self::Buffer, offset: f64) -> Option<Self::Unit>;
}

/// Transport lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Empty,
    Loaded,
    Playing,
    Paused,
}

/// Identifies one load attempt. A ticket older than the newest
/// `begin_load` commits nothing.
#[derive(Debug)]
pub struct LoadTicket(u64);

/// Transport over a decoded buffer: load, play, pause, reset.
pub struct PlaybackController<C: TransportClock, D: PlaybackDeck> {
    clock: C,
    deck: D,
    buffer: Option<D::Buffer>,
    unit: Option<D::Unit>,
    state: PlaybackState,
    start_time: f64,
    paused_offset: f64,
    load_generation: u64,
}

impl<C: TransportClock, D: PlaybackDeck> PlaybackController<C, D> {
    pub fn new(clock: C, deck: D) -> Self {
        Self {
            clock,
            deck,
            buffer: None,
            unit: None,
            state: PlaybackState::Empty,
            start_time: 0.0,
            paused_offset: 0.0,
            load_generation: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn buffer(&self) -> Option<&D::Buffer> {
        self.buffer.as_ref()
    }

    /// Current offset into the track in seconds.
    pub fn position(&self) -> f64 {
        match self.state {
            PlaybackState::Playing => self.clock.now() - self.start_time,
            _ => self.paused_offset,
        }
    }

    /// Marks the start of a load. Any load begun earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket(self.load_generation)
    }

    /// Installs a decoded buffer if `ticket` is still the newest load.
    ///
    /// Returns false when a newer load superseded this one; the decoded
    /// result is dropped and the transport is untouched.
    pub fn commit_load(&mut self, ticket: LoadTicket, buffer: D::Buffer) -> bool {
        if ticket.0 != self.load_generation {
            log::debug!(
                "discarding stale decode (load {} superseded by {})",
                ticket.0,
                self.load_generation
            );
            return false;
        }
        self.stop_unit();
        self.buffer = Some(buffer);
        self.paused_offset = 0.0;
        self.state = PlaybackState::Loaded;
        true
    }

    /// Decodes and installs `bytes` in one step.
    ///
    /// On decode failure the previous buffer and state survive untouched.
    pub fn load<E>(&mut self, decoder: &mut E, bytes: &[u8]) -> Result<(), DecodeError>
    where
        E: AudioDecoder<Buffer = D::Buffer>,
    {
        let ticket = self.begin_load();
        let buffer = decoder.decode(bytes)?;
        self.commit_load(ticket, buffer);
        Ok(())
    }

    /// Starts (or resumes) playback from the current offset.
    ///
    /// No-op without a buffer. Playback controls are expected to be gated
    /// externally, but an ungated call must not fault.
    pub fn play(&mut self) {
        if self.buffer.is_none() {
            return;
        }
        self.deck.resume();
        self.stop_unit();

        let Some(buffer) = self.buffer.as_ref() else {
            return;
        };
        match self.deck.start(buffer, self.paused_offset) {
            Some(unit) => {
                self.unit = Some(unit);
                self.start_time = self.clock.now() - self.paused_offset;
                self.state = PlaybackState::Playing;
            }
            None => log::warn!("playback unit refused to start"),
        }
    }

    /// Freezes the transport at the current offset. No-op unless playing.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.paused_offset = self.clock.now() - self.start_time;
        self.stop_unit();
        self.state = PlaybackState::Paused;
    }

    /// Stops playback and rewinds to the start. The buffer stays loaded.
    pub fn reset(&mut self) {
        self.stop_unit();
        self.paused_offset = 0.0;
        self.state = if self.buffer.is_some() {
            PlaybackState::Loaded
        } else {
            PlaybackState::Empty
        };
    }

    fn stop_unit(&mut self) {
        if let Some(mut unit) = self.unit.take() {
            unit.stop();
        }
    }
}
