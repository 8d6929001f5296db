//! The [`SimRng`] source.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use reprise_core::DrawRecord;

/// Seedable pseudo-random source with a labelled draw log.
///
/// Backed by a ChaCha8 stream seeded from a 32-bit seed. Each draw is
/// appended to the call log, so `call_count() == call_log().len()` at
/// every point in time.
///
/// # Examples
///
/// ```
/// use reprise_rng::SimRng;
///
/// let mut a = SimRng::seeded(42);
/// let mut b = SimRng::seeded(42);
///
/// // Labels are diagnostic only: they never change the value drawn.
/// assert_eq!(a.random("layout.jitter"), b.random("something.else"));
/// assert_eq!(a.call_count(), 1);
/// assert_eq!(a.call_log()[0].label, "layout.jitter");
/// ```
#[derive(Clone, Debug)]
pub struct SimRng {
    seed: Option<u32>,
    inner: ChaCha8Rng,
    log: Vec<DrawRecord>,
}

impl SimRng {
    /// Create a reproducible instance from an explicit seed.
    pub fn seeded(seed: u32) -> Self {
        Self {
            seed: Some(seed),
            inner: ChaCha8Rng::seed_from_u64(u64::from(seed)),
            log: Vec::new(),
        }
    }

    /// Create a non-seeded instance for normal, unrecorded use.
    pub fn live() -> Self {
        Self {
            seed: None,
            inner: ChaCha8Rng::seed_from_u64(rand::random::<u64>()),
            log: Vec::new(),
        }
    }

    /// The seed, or `None` for a live instance.
    pub fn seed(&self) -> Option<u32> {
        self.seed
    }

    /// Whether this instance is reproducible.
    pub fn is_seeded(&self) -> bool {
        self.seed.is_some()
    }

    /// Upgrade a live instance to a freshly seeded one and return the seed.
    ///
    /// The upgraded instance starts with an empty call log. A seeded
    /// instance is left untouched and its existing seed is returned.
    pub fn ensure_seeded(&mut self) -> u32 {
        if let Some(seed) = self.seed {
            return seed;
        }
        let seed = rand::random::<u32>();
        *self = Self::seeded(seed);
        seed
    }

    /// Draw a value in `[0, 1)`.
    pub fn random(&mut self, label: &str) -> f64 {
        let value: f64 = self.inner.random();
        let index = self.log.len() as u64;
        self.log.push(DrawRecord {
            label: label.to_string(),
            value,
            index,
        });
        value
    }

    /// Pick one element uniformly.
    ///
    /// Consumes exactly one draw for a non-empty slice. An empty slice
    /// returns `None` without drawing, so it never shifts the sequence.
    pub fn pick_random<'a, T>(&mut self, items: &'a [T], label: &str) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let v = self.random(label);
        let index = ((v * items.len() as f64) as usize).min(items.len() - 1);
        items.get(index)
    }

    /// Number of draws made so far.
    pub fn call_count(&self) -> u64 {
        self.log.len() as u64
    }

    /// Every draw made so far, in order.
    pub fn call_log(&self) -> &[DrawRecord] {
        &self.log
    }

    /// Draws made after the first `count` draws.
    ///
    /// Returns an empty slice when `count` is at or past the end.
    pub fn draws_since(&self, count: u64) -> &[DrawRecord] {
        let start = usize::try_from(count).unwrap_or(usize::MAX);
        self.log.get(start..).unwrap_or(&[])
    }
}
