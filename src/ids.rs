use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Sequential ids wrap around at this value.
pub const COUNTER_MODULUS: u64 = 1_000_000_000_000;

/// How record identifiers are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Random per-process prefix plus an atomic counter: `<prefix>-<n>`.
    #[default]
    Sequential,
    /// A fresh UUID v4 per record.
    Uuid,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown id strategy `{0}` (expected `sequential` or `uuid`)")]
pub struct ParseIdStrategyError(pub String);

impl FromStr for IdStrategy {
    type Err = ParseIdStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(IdStrategy::Sequential),
            "uuid" => Ok(IdStrategy::Uuid),
            _ => Err(ParseIdStrategyError(s.to_string())),
        }
    }
}

/// Generates record identifiers that stay unique across the processes
/// sharing one output directory.
///
/// Construct one per sink at startup. The sequential strategy seeds both
/// prefix and counter randomly, so two processes started at the same
/// moment still diverge.
#[derive(Debug)]
pub struct RecordIdGenerator {
    strategy: IdStrategy,
    prefix: String,
    counter: AtomicU64,
}

impl RecordIdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        let mut rng = rand::thread_rng();
        let prefix = format!("{:016x}", rng.gen::<u64>());
        let start = rng.gen_range(0..COUNTER_MODULUS);
        Self::with_seed(strategy, prefix, start)
    }

    /// Generator with a fixed prefix and counter start.
    pub fn with_seed(strategy: IdStrategy, prefix: impl Into<String>, start: u64) -> Self {
        RecordIdGenerator {
            strategy,
            prefix: prefix.into(),
            counter: AtomicU64::new(start % COUNTER_MODULUS),
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Next identifier. Safe to call from any number of threads.
    pub fn next_id(&self) -> String {
        match self.strategy {
            IdStrategy::Sequential => {
                let n = self.counter.fetch_add(1, Ordering::Relaxed) % COUNTER_MODULUS;
                format!("{}-{}", self.prefix, n)
            }
            IdStrategy::Uuid => Uuid::new_v4().to_string(),
        }
    }
}
