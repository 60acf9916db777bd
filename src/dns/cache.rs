//! # Record Cache (C2)
//!
//! A bounded, short-TTL memo from hostname to address. Churn is low and
//! lookups dominate, so a plain mutex-guarded map is enough — expiry does
//! the work of invalidating stale container addresses, there is no need
//! for an explicit invalidation path.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const DEFAULT_CAPACITY: usize = 1000;
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

struct CacheEntry {
    address: IpAddr,
    expires_at: Instant,
}

pub struct DnsCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    capacity: usize,
    ttl: Duration,
}

impl DnsCache {
    pub fn new(ttl: Duration) -> Self {
        DnsCache {
            entries: Mutex::new(HashMap::new()),
            capacity: DEFAULT_CAPACITY,
            ttl,
        }
    }

    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        DnsCache {
            entries: Mutex::new(HashMap::new()),
            capacity,
            ttl,
        }
    }

    /// Returns the cached address only if it has not yet expired. An
    /// expired entry is evicted on read.
    pub fn get(&self, hostname: &str) -> Option<IpAddr> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("dns cache lock poisoned");
        match entries.get(hostname) {
            Some(entry) if entry.expires_at > now => Some(entry.address),
            Some(_) => {
                entries.remove(hostname);
                None
            }
            None => None,
        }
    }

    /// Insert `address` for `hostname`, evicting the entry with the
    /// earliest expiry if the cache is at capacity.
    pub fn set(&self, hostname: &str, address: IpAddr) {
        let mut entries = self.entries.lock().expect("dns cache lock poisoned");
        if entries.len() >= self.capacity && !entries.contains_key(hostname) {
            if let Some(victim) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&victim);
            }
        }
        entries.insert(
            hostname.to_string(),
            CacheEntry {
                address,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::thread;

    fn addr(n: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, n))
    }

    #[test]
    fn set_then_get_within_ttl() {
        let cache = DnsCache::new(Duration::from_secs(30));
        cache.set("api-abc123.space.local", addr(1));
        assert_eq!(cache.get("api-abc123.space.local"), Some(addr(1)));
    }

    #[test]
    fn get_returns_none_after_ttl_expires() {
        let cache = DnsCache::new(Duration::from_millis(10));
        cache.set("api-abc123.space.local", addr(1));
        thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get("api-abc123.space.local"), None);
    }

    #[test]
    fn get_returns_none_for_unknown_key() {
        let cache = DnsCache::new(Duration::from_secs(30));
        assert_eq!(cache.get("nope.space.local"), None);
    }

    #[test]
    fn capacity_eviction_drops_the_oldest_entry() {
        let cache = DnsCache::with_capacity(Duration::from_secs(30), 2);
        cache.set("a.space.local", addr(1));
        thread::sleep(Duration::from_millis(5));
        cache.set("b.space.local", addr(2));
        thread::sleep(Duration::from_millis(5));
        cache.set("c.space.local", addr(3));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a.space.local"), None);
        assert_eq!(cache.get("b.space.local"), Some(addr(2)));
        assert_eq!(cache.get("c.space.local"), Some(addr(3)));
    }
}
