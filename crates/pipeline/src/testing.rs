//! Scriptable face processor for exercising the pool without real models.
//!
//! [`StubProcessor`] treats the raw job bytes as the "image"; the first
//! byte is a seed that determines the produced embedding, so tests can
//! assert that each caller received exactly its own result.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use enrolld_core::{BoundingBox, FeatureVector, EMBEDDING_DIM};
use enrolld_face::{FaceError, FaceProcessor};

/// Deterministic embedding derived from an image's seed byte.
pub fn embedding_for(seed: u8) -> FeatureVector {
    let mut values = [0.0f32; EMBEDDING_DIM];
    for (i, value) in values.iter_mut().enumerate() {
        *value = f32::from(seed) + i as f32 * 0.25;
    }
    FeatureVector::new(values)
}

/// Manually-opened gate that stalls embedding generation until released.
#[derive(Clone, Default)]
pub struct Gate {
    inner: Arc<GateInner>,
}

#[derive(Default)]
struct GateInner {
    tickets: Mutex<usize>,
    released: Condvar,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `n` stalled (or future) embeddings through.
    pub fn open(&self, n: usize) {
        let mut tickets = self.inner.tickets.lock().unwrap();
        *tickets += n;
        self.inner.released.notify_all();
    }

    fn pass(&self) {
        let mut tickets = self.inner.tickets.lock().unwrap();
        while *tickets == 0 {
            tickets = self.inner.released.wait(tickets).unwrap();
        }
        *tickets -= 1;
    }
}

/// Configurable fake [`FaceProcessor`].
///
/// Cloning yields a processor sharing the same detection counter, gate, and
/// notification channel, which is how a pool factory hands "the same" stub
/// to every worker.
#[derive(Clone, Default)]
pub struct StubProcessor {
    detect_calls: Arc<AtomicUsize>,
    fail_detection: bool,
    panic_seed: Option<u8>,
    reverse_delay: bool,
    gate: Option<Gate>,
    started: Option<Sender<()>>,
}

impl StubProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared counter of `detect_face` invocations.
    pub fn detect_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.detect_calls)
    }

    /// Make automatic detection fail with [`FaceError::NoFaceFound`].
    pub fn failing_detection(mut self) -> Self {
        self.fail_detection = true;
        self
    }

    /// Panic mid-job when the seed byte matches, simulating a dying worker.
    pub fn panicking_on(mut self, seed: u8) -> Self {
        self.panic_seed = Some(seed);
        self
    }

    /// Sleep longer for smaller seeds, so earlier submissions finish later.
    pub fn with_reversed_delays(mut self) -> Self {
        self.reverse_delay = true;
        self
    }

    /// Stall embedding generation until the gate is opened.
    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Emit one unit on `started` when a job reaches embedding generation.
    pub fn notifying(mut self, started: Sender<()>) -> Self {
        self.started = Some(started);
        self
    }
}

impl FaceProcessor for StubProcessor {
    type Image = Vec<u8>;

    fn decode_jpeg(&self, bytes: &[u8]) -> Result<Vec<u8>, FaceError> {
        if bytes.is_empty() {
            return Err(FaceError::ImageDecode("empty image".into()));
        }
        Ok(bytes.to_vec())
    }

    fn detect_face(&self, _image: &Vec<u8>) -> Result<BoundingBox, FaceError> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_detection {
            return Err(FaceError::NoFaceFound);
        }
        Ok(BoundingBox::new((1, 1), (2, 2)))
    }

    fn extract_face(&self, image: &Vec<u8>, _region: &BoundingBox) -> Result<Vec<u8>, FaceError> {
        Ok(image.clone())
    }

    fn generate_embedding(&self, face: &Vec<u8>) -> Result<FeatureVector, FaceError> {
        let seed = face.first().copied().unwrap_or(0);

        if let Some(started) = &self.started {
            let _ = started.send(());
        }
        if let Some(gate) = &self.gate {
            gate.pass();
        }
        if self.panic_seed == Some(seed) {
            panic!("stub processor panicked on seed {seed}");
        }
        if self.reverse_delay {
            let delay = (16 - u64::from(seed.min(15))) * 15;
            std::thread::sleep(Duration::from_millis(delay));
        }

        Ok(embedding_for(seed))
    }
}
