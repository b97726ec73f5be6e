//! Standard middleware.
//!
//! - [`Logger`] - one structured log event per request
//! - [`Recoverer`] - turns a panicking handler into a `500`
//! - [`NoCache`] - forces clients and proxies not to cache the response
//! - [`Heartbeat`] - answers a liveness check path before routing
//! - `Timeout` - bounds handler run time (feature `timeout`)
//!
//! All of them are plain [`Middleware`](trellis_core::Middleware) values and
//! go through [`Router::use_middleware`](crate::Router::use_middleware) like
//! any user middleware.

mod heartbeat;
mod logger;
mod no_cache;
mod recoverer;
#[cfg(feature = "timeout")]
mod timeout;

pub use heartbeat::Heartbeat;
pub use logger::Logger;
pub use no_cache::NoCache;
pub use recoverer::Recoverer;
#[cfg(feature = "timeout")]
pub use timeout::Timeout;

/// Narrow a `Duration::as_*` count for a log field, saturating at `u64::MAX`.
pub(crate) fn saturating_u64(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_saturating_u64() {
        assert_eq!(saturating_u64(Duration::from_millis(1500).as_micros()), 1_500_000);
        assert_eq!(saturating_u64(u128::from(u64::MAX) + 1), u64::MAX);
        assert_eq!(saturating_u64(Duration::MAX.as_micros()), u64::MAX);
    }
}
