//! Injectable pieces of the simulated backend: latency, wall clock and id minting.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// Simulated network latency awaited inside every backend-like operation.
#[async_trait]
pub trait Latency: Send + Sync {
    async fn wait(&self);
}

/// Sleeps on the tokio timer for a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }
}

#[async_trait]
impl Latency for FixedDelay {
    async fn wait(&self) {
        tokio::time::sleep(self.0).await;
    }
}

/// Resumes immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

#[async_trait]
impl Latency for Immediate {
    async fn wait(&self) {}
}

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Unix timestamp in milliseconds.
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Always returns the same instant.
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Mints unique tokens derived from the wall clock.
///
/// Ids are the decimal millisecond timestamp, bumped past the last minted value
/// so two mints in the same millisecond (or a clock step backwards) never
/// collide within one process.
pub struct IdMint {
    clock: Arc<dyn Clock>,
    last: AtomicI64,
}

impl IdMint {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicI64::new(i64::MIN),
        }
    }

    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    pub fn mint(&self) -> String {
        let now = self.clock.now_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(current.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next.to_string(),
                Err(observed) => current = observed,
            }
        }
    }

    /// Mint until `taken` rejects nothing. Guards against ids persisted by an
    /// earlier process whose clock ran ahead of ours.
    pub fn mint_unique(&self, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = self.mint();
            if !taken(&id) {
                return id;
            }
        }
    }
}

impl Default for IdMint {
    fn default() -> Self {
        Self::system()
    }
}
