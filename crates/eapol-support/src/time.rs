use std::time::{Duration, Instant, SystemTime};

/// Returns the current unix timestamp (seconds elapsed since 1970-01-01).
#[inline]
pub fn timestamp_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs()
}

/// Converts a "seconds, negative means disabled" delay into an optional
/// [`Duration`]: `seconds < 0` means the caller should not schedule anything.
#[inline]
pub fn delay_secs(seconds: i64) -> Option<Duration> {
    if seconds < 0 {
        None
    } else {
        Some(Duration::from_secs(seconds as u64))
    }
}

/// A monotonic deadline, used by the scan scheduler to compute "has this
/// one-shot timer fired yet" without re-reading the wall clock twice per tick.
#[derive(Debug, Copy, Clone)]
pub struct Deadline(Instant);

impl Deadline {
    #[inline]
    pub fn after(duration: Duration) -> Deadline {
        Deadline(Instant::now() + duration)
    }

    #[inline]
    pub fn has_elapsed(&self, now: Instant) -> bool {
        now >= self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_delay_disables() {
        assert!(delay_secs(-1).is_none());
    }

    #[test]
    fn zero_delay_is_immediate() {
        assert_eq!(delay_secs(0), Some(Duration::from_secs(0)));
    }

    #[test]
    fn timestamp_is_plausible() {
        // Any time after this crate was written.
        assert!(timestamp_secs() > 1_700_000_000);
    }
}
