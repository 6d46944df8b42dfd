//! Log sampling for high-volume scenarios
//!
//! Within each tick, the first `initial` records with a given level and
//! message are kept, after that only every `thereafter`-th one. Counters live
//! in a fixed table of hashed buckets; colliding messages share a budget.
//!
//! Production loggers sample with the defaults; development loggers don't.

use super::log_level::LogLevel;
use serde::Deserialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};

const BUCKETS_PER_LEVEL: usize = 4096;

/// Configuration for log sampling
///
/// # Example
///
/// ```
/// use leveled_logger::SamplingConfig;
/// use std::time::Duration;
///
/// let config = SamplingConfig {
///     initial: 10,
///     thereafter: 50,
///     tick: Duration::from_secs(1),
/// };
/// assert_eq!(SamplingConfig::default().initial, 100);
/// # let _ = config;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Records per (level, message) kept unconditionally in each tick
    pub initial: u64,
    /// After `initial`, keep one in every `thereafter`; 0 drops the rest
    pub thereafter: u64,
    /// Length of the counting window
    pub tick: Duration,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            initial: 100,
            thereafter: 100,
            tick: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Default)]
struct Counter {
    reset_at: AtomicI64,
    count: AtomicU64,
}

impl Counter {
    /// Increment, restarting the count when the tick has elapsed.
    fn inc_check_reset(&self, now: i64, tick: i64) -> u64 {
        let reset_after = self.reset_at.load(Ordering::Relaxed);
        if reset_after > now {
            return self.count.fetch_add(1, Ordering::Relaxed) + 1;
        }

        self.count.store(1, Ordering::Relaxed);
        let new_reset = now.saturating_add(tick);
        if self
            .reset_at
            .compare_exchange(reset_after, new_reset, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            // Lost the race to another resetter, which also stored 1.
            return self.count.fetch_add(1, Ordering::Relaxed) + 1;
        }
        1
    }
}

/// Per-message rate limiter shared by all loggers of one configuration
pub struct LogSampler {
    config: SamplingConfig,
    epoch: Instant,
    counters: Box<[Counter]>,
}

impl LogSampler {
    pub fn new(config: SamplingConfig) -> Self {
        let counters = (0..LogLevel::ALL.len() * BUCKETS_PER_LEVEL)
            .map(|_| Counter::default())
            .collect();
        Self {
            config,
            epoch: Instant::now(),
            counters,
        }
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Whether a record with this level and message should be written.
    pub fn should_sample(&self, level: LogLevel, message: &str) -> bool {
        let level_index = LogLevel::ALL
            .iter()
            .position(|l| *l == level)
            .unwrap_or_default();

        let mut hasher = DefaultHasher::new();
        message.hash(&mut hasher);
        let bucket = (hasher.finish() as usize) % BUCKETS_PER_LEVEL;
        let counter = &self.counters[level_index * BUCKETS_PER_LEVEL + bucket];

        let now = i64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(i64::MAX);
        let tick = i64::try_from(self.config.tick.as_nanos()).unwrap_or(i64::MAX);
        let n = counter.inc_check_reset(now, tick);

        if n <= self.config.initial {
            return true;
        }
        self.config.thereafter > 0 && (n - self.config.initial) % self.config.thereafter == 0
    }
}

impl std::fmt::Debug for LogSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSampler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
