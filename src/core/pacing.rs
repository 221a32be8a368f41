//! Pause policies applied between consecutive lookups.
//!
//! The resolver awaits [`PacingPolicy::pause`] after every request it makes,
//! whether the request succeeded or not.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_DELAY_MS: u64 = 100;

pub trait PacingPolicy: Send + Sync {
    fn pause(&self) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum PacingConfig {
    None,
    Fixed {
        delay_ms: u64,
    },
    TokenBucket {
        requests_per_minute: u32,
        #[serde(default = "default_burst")]
        burst: u32,
    },
}

fn default_burst() -> u32 {
    1
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig::Fixed {
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl PacingPolicy for NoDelay {
    async fn pause(&self) {}
}

#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl PacingPolicy for FixedDelay {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_update: Instant,
}

/// Token bucket with reservation: a pause takes one token and sleeps for as
/// long as the balance is negative.
#[derive(Debug)]
pub struct TokenBucket {
    bucket: Mutex<Bucket>,
    rate_per_sec: f64,
    capacity: f64,
}

impl TokenBucket {
    pub fn new(requests_per_minute: u32, burst: u32) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_update: Instant::now(),
            }),
            rate_per_sec: f64::from(requests_per_minute.max(1)) / 60.0,
            capacity,
        }
    }

    /// Takes one token at `now` and returns how long the caller must wait.
    fn reserve(&self, now: Instant) -> Duration {
        let mut bucket = self.bucket.lock().unwrap_or_else(|e| e.into_inner());

        let elapsed = now.saturating_duration_since(bucket.last_update).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate_per_sec).min(self.capacity);
        bucket.last_update = now;

        bucket.tokens -= 1.0;
        if bucket.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-bucket.tokens / self.rate_per_sec)
        }
    }
}

impl PacingPolicy for TokenBucket {
    async fn pause(&self) {
        let wait = self.reserve(Instant::now());
        if !wait.is_zero() {
            tracing::debug!("Rate limit reached, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }
}

/// Runtime-selected policy built from [`PacingConfig`].
#[derive(Debug)]
pub enum Pacer {
    NoDelay(NoDelay),
    Fixed(FixedDelay),
    TokenBucket(TokenBucket),
}

impl Pacer {
    pub fn from_config(config: &PacingConfig) -> Self {
        match config {
            PacingConfig::None => Pacer::NoDelay(NoDelay),
            PacingConfig::Fixed { delay_ms } => {
                Pacer::Fixed(FixedDelay::new(Duration::from_millis(*delay_ms)))
            }
            PacingConfig::TokenBucket {
                requests_per_minute,
                burst,
            } => Pacer::TokenBucket(TokenBucket::new(*requests_per_minute, *burst)),
        }
    }
}

impl PacingPolicy for Pacer {
    async fn pause(&self) {
        match self {
            Pacer::NoDelay(p) => p.pause().await,
            Pacer::Fixed(p) => p.pause().await,
            Pacer::TokenBucket(p) => p.pause().await,
        }
    }
}
