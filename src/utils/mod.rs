pub mod cache;
pub mod errors;
pub mod ratelimit;

pub use cache::ResponseCache;
pub use errors::extract_clean_error;
pub use ratelimit::RateLimiter;
