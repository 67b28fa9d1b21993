use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How long the front page context stays cached.
pub const INDEX_CACHE_TTL: Duration = Duration::from_secs(20);

/// A small time-based page-context cache, keyed by request path.
///
/// Expiry is purely time-based, nothing invalidates an entry on write.
/// A freshly published post can therefore stay invisible on the front
/// page until the window closes.
pub struct PageCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, Value)>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> PageCache {
        PageCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn store(&self, key: String, value: Value) {
        self.entries
            .lock()
            .unwrap()
            .insert(key, (Instant::now(), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    #[test]
    fn entries_expire() {
        let cache = PageCache::new(Duration::from_millis(20));
        cache.store("/?page=1".to_owned(), json!({ "posts": [] }));
        assert_eq!(cache.get("/?page=1"), Some(json!({ "posts": [] })));

        sleep(Duration::from_millis(30));
        assert_eq!(cache.get("/?page=1"), None);
    }

    #[test]
    fn keys_are_independent() {
        let cache = PageCache::new(Duration::from_secs(20));
        cache.store("/?page=1".to_owned(), json!(1));

        assert_eq!(cache.get("/?page=2"), None);
        assert_eq!(cache.get("/?page=1"), Some(json!(1)));
    }
}
