//! Time sources.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// A source of the current time, used by retry and backoff logic.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Monotonic nanoseconds. Only differences between readings are
    /// meaningful.
    fn nano_time(&self) -> u64;

    /// Wall-clock milliseconds since the UNIX epoch.
    fn millis_time(&self) -> u64;
}

/// Clock backed by the operating system.
///
/// [`nano_time`](Clock::nano_time) is measured from a process-wide origin
/// fixed the first time any `SystemClock` is read.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

static ORIGIN: OnceLock<Instant> = OnceLock::new();
static SHARED: OnceLock<Arc<SystemClock>> = OnceLock::new();

impl SystemClock {
    /// The process-wide default clock.
    ///
    /// Every call returns a clone of the same `Arc`.
    pub fn shared() -> Arc<SystemClock> {
        SHARED.get_or_init(|| Arc::new(SystemClock)).clone()
    }
}

impl Clock for SystemClock {
    fn nano_time(&self) -> u64 {
        let origin = ORIGIN.get_or_init(Instant::now);
        u64::try_from(origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn millis_time(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_is_single_instance() {
        assert!(Arc::ptr_eq(&SystemClock::shared(), &SystemClock::shared()));
    }

    #[test]
    fn test_nano_time_is_monotonic() {
        let clock = SystemClock;
        let first = clock.nano_time();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = clock.nano_time();
        assert!(second > first);
    }

    #[test]
    fn test_millis_time_is_wall_clock() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.millis_time() > 1_577_836_800_000);
    }
}
