//! Shared sample ring between the playback callback and the analyzer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Most recent mono samples rendered to the output device.
///
/// The playback callback pushes, the analyzer copies the newest window out
/// without draining. Capacity is bounded; old samples fall off the front.
#[derive(Clone)]
pub struct SampleTap {
    inner: Arc<Mutex<VecDeque<f32>>>,
    capacity: usize,
}

impl SampleTap {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Appends rendered samples, dropping the oldest past capacity.
    pub fn push(&self, samples: &[f32]) {
        let mut ring = self.inner.lock().unwrap();
        for &s in samples {
            if ring.len() == self.capacity {
                ring.pop_front();
            }
            ring.push_back(s);
        }
    }

    /// Copies the newest `out.len()` samples into `out`, oldest first,
    /// zero-filling the front when fewer samples have been rendered.
    pub fn latest(&self, out: &mut [f32]) {
        let ring = self.inner.lock().unwrap();
        let n = out.len().min(ring.len());
        let lead = out.len() - n;
        out[..lead].fill(0.0);
        for (dst, src) in out[lead..].iter_mut().zip(ring.iter().skip(ring.len() - n)) {
            *dst = *src;
        }
    }
}
