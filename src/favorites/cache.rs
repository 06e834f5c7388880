use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::store::FavoriteStore;
use crate::listings::repo::Listing;

type Slot = Arc<Mutex<Option<HashSet<Uuid>>>>;

/// Per-user favorite ID set layered over the authoritative store. The set is
/// loaded once on first touch and annotated onto result sets without
/// per-item round trips. Staleness across processes is resolved only by
/// `invalidate` (full reload); there is no cross-instance invalidation.
pub struct FavoriteCache {
    store: Arc<dyn FavoriteStore>,
    users: Mutex<HashMap<Uuid, Slot>>,
}

impl FavoriteCache {
    pub fn new(store: Arc<dyn FavoriteStore>) -> Self {
        Self {
            store,
            users: Mutex::new(HashMap::new()),
        }
    }

    async fn slot(&self, user_id: Uuid) -> Slot {
        let mut users = self.users.lock().await;
        users.entry(user_id).or_default().clone()
    }

    /// Flip the favorite state of one listing. The store mutation happens
    /// first; the cached set changes only once the store call succeeded, so a
    /// failed mutation leaves local state untouched. The per-user lock is
    /// held across the whole operation, so two toggles on the same listing
    /// from one user cannot interleave and the second always observes the
    /// first (no lost update). Returns the new membership state.
    pub async fn toggle(&self, user_id: Uuid, listing_id: Uuid) -> anyhow::Result<bool> {
        let slot = self.slot(user_id).await;
        let mut guard = slot.lock().await;
        if guard.is_none() {
            let ids = self.store.ids_for_user(user_id).await?;
            *guard = Some(ids.into_iter().collect());
        }
        let set = guard.as_mut().expect("set was just loaded");

        let favorited = if set.contains(&listing_id) {
            self.store.remove(user_id, listing_id).await?;
            set.remove(&listing_id);
            false
        } else {
            self.store.add(user_id, listing_id).await?;
            set.insert(listing_id);
            true
        };
        debug!(%user_id, %listing_id, favorited, "favorite toggled");
        Ok(favorited)
    }

    /// Snapshot of the user's favorited listing IDs, loading on first use.
    pub async fn ids(&self, user_id: Uuid) -> anyhow::Result<HashSet<Uuid>> {
        let slot = self.slot(user_id).await;
        let mut guard = slot.lock().await;
        match guard.as_ref() {
            Some(set) => Ok(set.clone()),
            None => {
                let ids: HashSet<Uuid> =
                    self.store.ids_for_user(user_id).await?.into_iter().collect();
                *guard = Some(ids.clone());
                Ok(ids)
            }
        }
    }

    /// Drop the cached set; the next touch reloads from the store.
    pub async fn invalidate(&self, user_id: Uuid) {
        self.users.lock().await.remove(&user_id);
    }
}

/// Subset of `results` whose id is favorited, in the original relative
/// order. Pure; combined with a fresh fetch this makes the favorites view
/// the intersection of currently fetchable listings and favorited IDs.
pub fn filter_to_favorites(ids: &HashSet<Uuid>, results: &[Listing]) -> Vec<Listing> {
    results
        .iter()
        .filter(|l| ids.contains(&l.id))
        .cloned()
        .collect()
}
