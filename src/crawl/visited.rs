// src/crawl/visited.rs
// =============================================================================
// The set of URLs already handed to a worker.
//
// Checking and inserting happen in ONE step (`claim`). A separate
// "contains?" followed by "insert" would let two workers that discover the
// same link at the same moment both see "not yet visited" and both fetch it.
//
// DashSet shards its entries behind per-shard locks, so `insert` is atomic
// and returns whether the value was new.
// =============================================================================

use dashmap::DashSet;
use std::sync::Arc;
use url::Url;

// Cheap to clone: all clones share the same set
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    urls: Arc<DashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Marks a URL as dispatched
    //
    // Returns: true if this call claimed it, false if someone already had
    pub fn claim(&self, url: &Url) -> bool {
        self.urls.insert(url.as_str().to_owned())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_claim_once() {
        let visited = VisitedSet::new();
        let url = Url::parse("http://x/a").unwrap();

        assert!(visited.claim(&url));
        assert!(!visited.claim(&url));
        assert_eq!(visited.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_have_one_winner() {
        let visited = VisitedSet::new();
        let winners = Arc::new(AtomicUsize::new(0));
        let url = Url::parse("http://x/contested").unwrap();

        let mut handles = Vec::new();
        for _ in 0..64 {
            let visited = visited.clone();
            let winners = Arc::clone(&winners);
            let url = url.clone();
            handles.push(tokio::spawn(async move {
                if visited.claim(&url) {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}
