use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Instant;

/// Opaque gate consulted before every resolve. The service only learns
/// allow/deny; policy lives entirely behind this trait.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn allow(&self, key: &str) -> bool;
}

// ── Token-bucket implementation ────────────────────────────────────────────

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Per-key token bucket. Each key gets its own bucket, created full on first
/// sight and refilled lazily on access, so keys never interfere.
pub struct TokenBucketLimiter {
    buckets: DashMap<String, Bucket>,
    capacity: u32,
    refill_per_sec: f64,
}

impl TokenBucketLimiter {
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity,
            refill_per_sec,
        }
    }
}

#[async_trait]
impl RateLimiter for TokenBucketLimiter {
    async fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut bucket = self
            .buckets
            .entry(key.to_owned())
            .or_insert_with(|| Bucket {
                tokens: self.capacity as f64,
                last_refill: now,
            });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity as f64);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod doubles {
    use super::*;

    /// Limiter that admits everything.
    pub struct AllowAll;

    #[async_trait]
    impl RateLimiter for AllowAll {
        async fn allow(&self, _key: &str) -> bool {
            true
        }
    }

    /// Limiter that rejects everything.
    pub struct DenyAll;

    #[async_trait]
    impl RateLimiter for DenyAll {
        async fn allow(&self, _key: &str) -> bool {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_up_to_capacity_then_rejects() {
        // No refill, so the bucket only ever drains.
        let limiter = TokenBucketLimiter::new(2, 0.0);
        assert!(limiter.allow("abcd1234").await);
        assert!(limiter.allow("abcd1234").await);
        assert!(!limiter.allow("abcd1234").await);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let limiter = TokenBucketLimiter::new(1, 0.0);
        assert!(limiter.allow("aaaa0000").await);
        assert!(!limiter.allow("aaaa0000").await);
        // A different token still has a full bucket.
        assert!(limiter.allow("bbbb1111").await);
    }
}
