//! Test-only mock embedder.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::embed::{Embedder, normalize_input};
use crate::error::EmbeddingError;

/// Deterministic bag-of-words embedder.
///
/// Each lowercase word is hashed into one of `dimensions` buckets, so texts
/// sharing vocabulary score higher under cosine similarity.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    pub dimensions: usize,
    pub fail: bool,
    /// Fail only for inputs containing this substring.
    pub fail_on: Option<String>,
    /// Milliseconds to sleep before returning a vector.
    pub delay_ms: u64,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self {
            dimensions: 64,
            fail: false,
            fail_on: None,
            delay_ms: 0,
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockEmbedder {
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_on = Some(needle.into());
        self
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent `embed` calls observed.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Normalized inputs received so far, in call order.
    #[must_use]
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().map(|g| g.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimensions.max(1)];
        let buckets = v.len();
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let idx = fnv1a(&word.to_lowercase()) % buckets;
            v[idx] += 1.0;
        }
        if v.iter().all(|x| *x == 0.0) {
            v[0] = 1.0;
        }
        v
    }
}

#[allow(clippy::cast_possible_truncation)]
fn fnv1a(s: &str) -> usize {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in s.bytes() {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash as usize
}

impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let input = normalize_input(text);
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut inputs) = self.inputs.lock() {
            inputs.push(input.clone());
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let fail_here = self
            .fail_on
            .as_deref()
            .is_some_and(|needle| input.contains(needle));
        if self.fail || fail_here {
            return Err(EmbeddingError::Other("mock embedding error".into()));
        }
        Ok(self.vector_for(&input))
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn model(&self) -> &str {
        "mock-embedding"
    }
}
