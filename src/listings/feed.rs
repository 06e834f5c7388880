use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use super::repo::Listing;

/// Version-stamped slot for filter results. Overlapping filter requests race:
/// without a stamp, a slow early response can overwrite a faster later one.
/// Callers take a ticket with `begin()` before issuing the fetch and offer
/// the response through `apply(ticket, ..)`; only the latest issued ticket is
/// accepted, everything else is discarded (last-write-wins on the visible
/// result set).
pub struct ResultFeed<T> {
    issued: AtomicU64,
    slot: Mutex<Applied<T>>,
}

struct Applied<T> {
    seq: u64,
    items: Option<Vec<T>>,
}

impl<T> Default for ResultFeed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResultFeed<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            slot: Mutex::new(Applied {
                seq: 0,
                items: None,
            }),
        }
    }

    /// Issue the next request ticket. Supersedes every earlier ticket.
    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install results for `seq`. Returns false (and drops the results) when
    /// a newer ticket has been issued since.
    pub fn apply(&self, seq: u64, items: Vec<T>) -> bool {
        let mut slot = self.slot.lock().expect("feed lock poisoned");
        if seq != self.issued.load(Ordering::SeqCst) {
            return false;
        }
        slot.seq = seq;
        slot.items = Some(items);
        true
    }

    pub fn latest_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Ticket of the installed result set; 0 when nothing landed yet.
    pub fn applied_seq(&self) -> u64 {
        self.slot.lock().expect("feed lock poisoned").seq
    }
}

impl<T: Clone> ResultFeed<T> {
    /// The currently visible result set, if any request has landed.
    pub fn current(&self) -> Option<Vec<T>> {
        self.slot.lock().expect("feed lock poisoned").items.clone()
    }
}

/// Per-user search feeds. Each authenticated user gets one feed holding the
/// result set of their most recent filter request.
#[derive(Default)]
pub struct SearchFeeds {
    users: tokio::sync::Mutex<HashMap<Uuid, Arc<ResultFeed<Listing>>>>,
}

impl SearchFeeds {
    pub async fn for_user(&self, user_id: Uuid) -> Arc<ResultFeed<Listing>> {
        let mut users = self.users.lock().await;
        users.entry(user_id).or_default().clone()
    }

    pub async fn clear(&self, user_id: Uuid) {
        self.users.lock().await.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn accepts_only_latest_ticket() {
        let feed = ResultFeed::new();
        let first = feed.begin();
        let second = feed.begin();

        // the later request resolves first
        assert!(feed.apply(second, vec!["fast"]));
        // the earlier, slower response must not clobber it
        assert!(!feed.apply(first, vec!["slow"]));

        assert_eq!(feed.current(), Some(vec!["fast"]));
        assert_eq!(feed.applied_seq(), second);
    }

    #[test]
    fn in_order_responses_apply_normally() {
        let feed = ResultFeed::new();
        let first = feed.begin();
        assert!(feed.apply(first, vec![1]));
        let second = feed.begin();
        assert!(feed.apply(second, vec![2]));
        assert_eq!(feed.current(), Some(vec![2]));
        assert_eq!(feed.latest_issued(), 2);
    }

    #[test]
    fn empty_feed_has_no_results() {
        let feed: ResultFeed<u8> = ResultFeed::new();
        assert_eq!(feed.current(), None);
    }

    #[tokio::test]
    async fn slow_early_request_loses_to_fast_late_one() {
        let feed = Arc::new(ResultFeed::new());

        let slow_ticket = feed.begin();
        let slow = {
            let feed = Arc::clone(&feed);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                feed.apply(slow_ticket, vec!["stale"])
            })
        };

        let fast_ticket = feed.begin();
        let fast = {
            let feed = Arc::clone(&feed);
            tokio::spawn(async move { feed.apply(fast_ticket, vec!["fresh"]) })
        };

        assert!(fast.await.unwrap());
        assert!(!slow.await.unwrap());
        assert_eq!(feed.current(), Some(vec!["fresh"]));
    }
}
