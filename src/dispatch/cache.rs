//! Time-limited single-value cache (default printer, printer lists).

use std::time::{Duration, Instant};

/// A value and when it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub fetched_at: Instant,
}

/// Holds at most one [`Cached`] value and treats it as absent once `ttl` has
/// elapsed.
#[derive(Debug, Clone)]
pub struct TtlCache<T> {
    ttl: Duration,
    entry: Option<Cached<T>>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value, if any.
    pub fn get(&self) -> Option<&T> {
        self.get_at(Instant::now())
    }

    pub fn get_at(&self, now: Instant) -> Option<&T> {
        self.entry
            .as_ref()
            .filter(|c| now.saturating_duration_since(c.fetched_at) < self.ttl)
            .map(|c| &c.value)
    }

    /// Last stored entry regardless of age.
    pub fn entry(&self) -> Option<&Cached<T>> {
        self.entry.as_ref()
    }

    pub fn set(&mut self, value: T) {
        self.set_at(value, Instant::now());
    }

    pub fn set_at(&mut self, value: T, fetched_at: Instant) {
        self.entry = Some(Cached { value, fetched_at });
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_after_ttl() {
        let mut cache = TtlCache::new(Duration::from_secs(30));
        let start = Instant::now();
        cache.set_at("Zebra_ZD410", start);

        assert_eq!(cache.get_at(start + Duration::from_secs(29)), Some(&"Zebra_ZD410"));
        assert_eq!(cache.get_at(start + Duration::from_secs(30)), None);
        // stale entry is still inspectable
        assert_eq!(cache.entry().map(|c| c.value), Some("Zebra_ZD410"));
    }

    #[test]
    fn test_invalidate() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.set(1);
        assert_eq!(cache.get(), Some(&1));
        cache.invalidate();
        assert_eq!(cache.get(), None);
    }
}
