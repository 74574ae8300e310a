use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Number of tracked clients above which stale buckets are swept
const SWEEP_THRESHOLD: usize = 10_000;

/// A request budget: at most `max_requests` within any `window`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: usize,
    pub window: Duration,
}

impl RateLimit {
    pub const fn per_hour(max_requests: usize) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(3600),
        }
    }

    pub const fn per_minute(max_requests: usize) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }
}

/// 100 requests per hour per client, applied to every route
pub const DEFAULT_LIMIT: RateLimit = RateLimit::per_hour(100);
/// Live data endpoint
pub const CURRENT_DATA_LIMIT: RateLimit = RateLimit::per_hour(50);
/// News endpoint
pub const NEWS_LIMIT: RateLimit = RateLimit::per_minute(10);

type BucketKey = (IpAddr, &'static str);

/// Request times for one client in one bucket, with the window they are judged against
struct Bucket {
    window: Duration,
    times: VecDeque<Instant>,
}

impl Bucket {
    fn is_stale(&self, now: Instant) -> bool {
        self.times
            .back()
            .map_or(true, |&last| now.duration_since(last) >= self.window)
    }
}

/// Sliding-window limiter keyed by client address and bucket name
#[derive(Default)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<BucketKey, Bucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if `ip` may make another request in `bucket`
    /// Returns Ok(()) and records the request if under the limit
    /// Returns Err(wait) with the time until the oldest request leaves the window otherwise
    pub async fn check(&self, ip: IpAddr, bucket: &'static str, limit: RateLimit) -> Result<(), Duration> {
        let mut buckets = self.buckets.lock().await;
        let now = Instant::now();

        if buckets.len() > SWEEP_THRESHOLD {
            buckets.retain(|_, b| !b.is_stale(now));
        }

        let entry = buckets.entry((ip, bucket)).or_insert_with(|| Bucket {
            window: limit.window,
            times: VecDeque::new(),
        });
        entry.window = limit.window;
        check_and_record(&mut entry.times, limit, now)
    }
}

fn check_and_record(times: &mut VecDeque<Instant>, limit: RateLimit, now: Instant) -> Result<(), Duration> {
    // Remove old timestamps outside the window
    while let Some(&front) = times.front() {
        if now.duration_since(front) >= limit.window {
            times.pop_front();
        } else {
            break;
        }
    }

    if times.len() >= limit.max_requests {
        let wait = times
            .front()
            .map(|&oldest| limit.window.saturating_sub(now.duration_since(oldest)))
            .unwrap_or(limit.window);
        return Err(wait);
    }

    times.push_back(now);
    Ok(())
}
