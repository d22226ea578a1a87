//! Per-client rate limiting.
//!
//! Each client key owns a governor GCRA limiter allowing `burst` requests at
//! once and refilling at `per_second` requests per second. Entries live in a
//! sharded map so unrelated clients never contend; requests from one client
//! serialize on that client's entry.
//!
//! A rate of zero, or one too slow for governor's nanosecond clock, never
//! refills: the client gets `burst` admissions for the life of its entry.
//!
//! A background sweep evicts entries idle longer than the configured
//! threshold for the life of the process.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as Gcra};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::RateLimitConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// `retry_after` is `None` when the budget never refills.
    Rejected { retry_after: Option<Duration> },
}

impl Admission {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

enum Budget {
    Refilling(DefaultDirectRateLimiter),
    Fixed { remaining: u32 },
}

struct Bucket {
    budget: Budget,
    last_seen: Instant,
}

impl Bucket {
    fn take(&mut self, now: Instant, clock: &DefaultClock) -> Admission {
        self.last_seen = now;
        match &mut self.budget {
            Budget::Refilling(limiter) => match limiter.check() {
                Ok(()) => Admission::Allowed,
                Err(not_until) => Admission::Rejected {
                    retry_after: Some(not_until.wait_time_from(clock.now())),
                },
            },
            Budget::Fixed { remaining } => match remaining.checked_sub(1) {
                Some(left) => {
                    *remaining = left;
                    Admission::Allowed
                }
                None => Admission::Rejected { retry_after: None },
            },
        }
    }
}

/// Quota replenishing one request every `1 / per_second` seconds, or `None`
/// when the budget should never refill.
fn refill_quota(per_second: f64, burst: NonZeroU32) -> Option<Quota> {
    if per_second.is_nan() || per_second <= 0.0 {
        return None;
    }
    let period = Duration::try_from_secs_f64(per_second.recip())
        .ok()?
        .max(Duration::from_nanos(1));
    // governor tracks the full burst window in u64 nanoseconds.
    let window = period.checked_mul(burst.get())?;
    if window.as_nanos() >= u128::from(u64::MAX) {
        return None;
    }
    Quota::with_period(period).map(|quota| quota.allow_burst(burst))
}

/// Shared rate limiter. Cheap to clone.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

struct Inner {
    buckets: DashMap<String, Arc<Mutex<Bucket>>>,
    quota: Option<Quota>,
    burst: NonZeroU32,
    clock: DefaultClock,
    idle_timeout: Duration,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        let burst = NonZeroU32::new(config.burst).unwrap_or(NonZeroU32::MIN);
        Self {
            inner: Arc::new(Inner {
                buckets: DashMap::new(),
                quota: refill_quota(config.per_second, burst),
                burst,
                clock: DefaultClock::default(),
                idle_timeout: config.idle_timeout,
            }),
        }
    }

    fn bucket(&self, now: Instant) -> Bucket {
        let budget = match self.inner.quota {
            Some(quota) => {
                Budget::Refilling(Gcra::direct_with_clock(quota, self.inner.clock.clone()))
            }
            None => Budget::Fixed {
                remaining: self.inner.burst.get(),
            },
        };
        Bucket {
            budget,
            last_seen: now,
        }
    }

    /// Spend one request from `key`'s budget, creating a full bucket on first
    /// sight. Lookup and insertion are one atomic map operation.
    #[must_use]
    pub fn admit(&self, key: &str) -> Admission {
        let now = Instant::now();
        let bucket = Arc::clone(
            self.inner
                .buckets
                .entry(key.to_owned())
                .or_insert_with(|| Arc::new(Mutex::new(self.bucket(now))))
                .value(),
        );

        let mut bucket = bucket.lock();
        bucket.take(now, &self.inner.clock)
    }

    /// Drop buckets idle for longer than the idle timeout. Returns how many
    /// were removed.
    pub fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.buckets.len();
        self.inner.buckets.retain(|_, bucket| {
            now.saturating_duration_since(bucket.lock().last_seen) <= self.inner.idle_timeout
        });
        before.saturating_sub(self.inner.buckets.len())
    }

    /// Number of tracked clients.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.inner.buckets.len()
    }

    /// Run [`Self::evict_idle`] every `every` until the runtime shuts down.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = limiter.evict_idle();
                if evicted > 0 {
                    tracing::debug!(evicted, remaining = limiter.tracked(), "Evicted idle rate-limit buckets");
                }
            }
        })
    }
}

/// Client key for rate limiting.
///
/// Checks Cloudflare's `CF-Connecting-IP` first, then the first hop of
/// `X-Forwarded-For`, then `X-Real-IP`, then the socket peer address.
#[must_use]
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header_ip = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };

    header_ip("cf-connecting-ip")
        .or_else(|| header_ip("x-forwarded-for"))
        .or_else(|| header_ip("x-real-ip"))
        .or_else(|| peer.map(|addr| addr.ip()))
        .map_or_else(|| "unknown".to_string(), |ip| ip.to_string())
}

/// Reject requests over the client's budget with 429 before anything else
/// runs.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer);

    match state.rate_limiter().admit(&key) {
        Admission::Allowed => next.run(request).await,
        Admission::Rejected { retry_after } => {
            tracing::warn!(client = %key, "Rate limit exceeded");
            AppError::RateLimited {
                retry_after: retry_after.map(whole_seconds),
            }
            .into_response()
        }
    }
}

/// `Retry-After` takes whole seconds; round up so clients never retry early.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds(wait: Duration) -> u64 {
    wait.as_secs_f64().ceil().max(1.0) as u64
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Barrier;

    use axum::http::HeaderValue;

    use super::*;

    fn limiter(per_second: f64, burst: u32) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            per_second,
            burst,
            idle_timeout: Duration::from_secs(180),
            sweep_interval: Duration::from_secs(60),
        })
    }

    #[tokio::test]
    async fn test_zero_rate_admits_burst_then_rejects() {
        let limiter = limiter(0.0, 1);
        assert_eq!(limiter.admit("10.0.0.1"), Admission::Allowed);
        assert_eq!(
            limiter.admit("10.0.0.1"),
            Admission::Rejected { retry_after: None }
        );
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter(0.0, 1);
        assert!(limiter.admit("10.0.0.1").is_allowed());
        assert!(limiter.admit("10.0.0.2").is_allowed());
        assert_eq!(limiter.tracked(), 2);
    }

    #[tokio::test]
    async fn test_bucket_refills_over_time() {
        let limiter = limiter(20.0, 2);
        assert!(limiter.admit("a").is_allowed());
        assert!(limiter.admit("a").is_allowed());
        let Admission::Rejected { retry_after } = limiter.admit("a") else {
            panic!("expected rejection");
        };
        let wait = retry_after.unwrap();
        assert!(wait > Duration::ZERO && wait <= Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(limiter.admit("a").is_allowed());
        assert!(!limiter.admit("a").is_allowed());
    }

    #[tokio::test]
    async fn test_refill_is_capped_at_burst() {
        let limiter = limiter(100.0, 2);
        assert!(limiter.admit("a").is_allowed());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(limiter.admit("a").is_allowed());
        assert!(limiter.admit("a").is_allowed());
        assert!(!limiter.admit("a").is_allowed());
    }

    #[test]
    fn test_rate_too_slow_to_schedule_never_refills() {
        let limiter = limiter(1e-20, 1);
        assert_eq!(limiter.admit("a"), Admission::Allowed);
        assert_eq!(
            limiter.admit("a"),
            Admission::Rejected { retry_after: None }
        );
    }

    #[test]
    fn test_refill_quota_bounds() {
        let burst = NonZeroU32::new(3).unwrap();
        assert!(refill_quota(0.0, burst).is_none());
        assert!(refill_quota(f64::NAN, burst).is_none());
        assert!(refill_quota(1e-20, burst).is_none());
        assert_eq!(
            refill_quota(4.0, burst).unwrap().replenish_interval(),
            Duration::from_millis(250)
        );
        assert!(refill_quota(f64::MAX, burst).is_some());
    }

    #[test]
    fn test_simultaneous_first_requests_admit_once() {
        const CLIENTS: usize = 16;
        let limiter = limiter(0.0, 1);
        let barrier = Arc::new(Barrier::new(CLIENTS));

        let handles: Vec<_> = (0..CLIENTS)
            .map(|_| {
                let limiter = limiter.clone();
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    limiter.admit("k")
                })
            })
            .collect();
        let allowed = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|admission| admission.is_allowed())
            .count();

        assert_eq!(allowed, 1);
        assert_eq!(limiter.tracked(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_idle_keeps_recent_clients() {
        let limiter = limiter(1.0, 1);
        let _ = limiter.admit("old");
        tokio::time::advance(Duration::from_secs(120)).await;
        let _ = limiter.admit("recent");
        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(limiter.evict_idle(), 1);
        assert_eq!(limiter.tracked(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_in_background() {
        let limiter = limiter(1.0, 1);
        let _ = limiter.admit("a");
        let sweeper = limiter.spawn_sweeper(Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(241)).await;
        assert_eq!(limiter.tracked(), 0);
        sweeper.abort();
    }

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(whole_seconds(Duration::from_millis(1)), 1);
        assert_eq!(whole_seconds(Duration::from_millis(1500)), 2);
    }

    #[test]
    fn test_client_key_precedence() {
        let peer: SocketAddr = "192.0.2.9:4000".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers, Some(peer)), "192.0.2.9");
        assert_eq!(client_key(&headers, None), "unknown");

        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.3"));
        assert_eq!(client_key(&headers, Some(peer)), "198.51.100.3");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_key(&headers, Some(peer)), "203.0.113.7");

        headers.insert("cf-connecting-ip", HeaderValue::from_static("2001:db8::1"));
        assert_eq!(client_key(&headers, Some(peer)), "2001:db8::1");
    }
}
