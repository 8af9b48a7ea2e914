//! Capabilities the engine consumes but does not own: randomness, time and
//! record id allocation.

use super::commodity::RecordId;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// A source of uniform draws in `[0,1)`.
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// `StdRng`-backed source. Seed it to replay a run.
pub struct StdRandom {
    rng: Mutex<StdRng>,
}

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for StdRandom {
    fn next_unit(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0.0..1.0)
    }
}

/// Replays a fixed list of draws, cycling when it runs out.
pub struct ScriptedRandom {
    draws: Vec<f64>,
    cursor: AtomicUsize,
}

impl ScriptedRandom {
    pub fn new(draws: Vec<f64>) -> Self {
        assert!(!draws.is_empty(), "ScriptedRandom needs at least one draw");
        Self {
            draws,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of values handed out so far.
    pub fn draws(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&self) -> f64 {
        let n = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.draws[n % self.draws.len()]
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Hands out unique record ids in increasing order.
pub trait IdAllocator: Send + Sync {
    fn next_id(&self) -> RecordId;
}

/// Ids seeded from the wall clock in milliseconds and then strictly
/// incremented, so two records created in the same millisecond still get
/// distinct, ordered ids.
pub struct MonotonicIds {
    next: AtomicU64,
}

impl MonotonicIds {
    pub fn new() -> Self {
        let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        Self::starting_at(millis)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Continues after the highest id a store already holds, or from the
    /// wall clock if that is further ahead.
    pub fn resuming_after(stored_max: Option<RecordId>) -> Self {
        let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let after_stored = stored_max.map_or(0, |id| id.0.saturating_add(1));
        Self::starting_at(millis.max(after_stored))
    }
}

impl Default for MonotonicIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator for MonotonicIds {
    fn next_id(&self) -> RecordId {
        RecordId(self.next.fetch_add(1, Ordering::SeqCst))
    }
}
