use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Deserialize;
use uuid::Uuid;

use crate::api::WishlistApi;
use crate::notify::Notifier;
use crate::storage::{GuestStorage, WISHLIST_KEY};

/// Historical guest blobs held a mix of bare ids and embedded product
/// objects; anything that is neither is dropped on load.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PersistedEntry {
    Id(Uuid),
    Product {
        #[serde(alias = "_id")]
        id: Uuid,
    },
    Other(serde_json::Value),
}

fn normalize(entries: Vec<PersistedEntry>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for entry in entries {
        let id = match entry {
            PersistedEntry::Id(id) => id,
            PersistedEntry::Product { id } => id,
            PersistedEntry::Other(value) => {
                tracing::warn!(?value, "dropping unrecognized wishlist entry");
                continue;
            }
        };
        if seen.insert(id) {
            ids.push(id);
        }
    }
    ids
}

struct WishlistState {
    authenticated: bool,
    items: Vec<Uuid>,
    /// Ids with an add/remove currently in flight. Guards against rapid
    /// double toggles (two heart icons wired to the same product) issuing
    /// overlapping remote calls.
    in_flight: HashSet<Uuid>,
}

/// Set of favorited product ids, mirrored between local storage (guest) and
/// the remote wishlist (authenticated).
pub struct WishlistStore {
    api: Arc<dyn WishlistApi>,
    storage: Arc<dyn GuestStorage>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<WishlistState>,
}

impl WishlistStore {
    pub fn new(
        api: Arc<dyn WishlistApi>,
        storage: Arc<dyn GuestStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let items = storage
            .read_json::<Vec<PersistedEntry>>(WISHLIST_KEY)
            .map(normalize)
            .unwrap_or_default();
        Self {
            api,
            storage,
            notifier,
            state: Mutex::new(WishlistState {
                authenticated: false,
                items,
                in_flight: HashSet::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WishlistState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, items: &[Uuid]) {
        if let Err(err) = self.storage.write_json(WISHLIST_KEY, &items) {
            tracing::warn!(error = %err, "failed to persist guest wishlist");
        }
    }

    pub fn items(&self) -> Vec<Uuid> {
        self.lock().items.clone()
    }

    pub fn count(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_in_wishlist(&self, product_id: Uuid) -> bool {
        self.lock().items.contains(&product_id)
    }

    /// True while an add or remove for this id is in flight; the view layer
    /// disables the control meanwhile.
    pub fn is_processing(&self, product_id: Uuid) -> bool {
        self.lock().in_flight.contains(&product_id)
    }

    pub async fn add_to_wishlist(&self, product_id: Uuid) -> bool {
        let authenticated = {
            let mut state = self.lock();
            if state.in_flight.contains(&product_id) || state.items.contains(&product_id) {
                return false;
            }
            state.in_flight.insert(product_id);
            state.authenticated
        };

        let remote = if authenticated {
            self.api.add_to_wishlist(product_id).await
        } else {
            Ok(())
        };
        if let Err(err) = &remote {
            tracing::error!(error = %err, product = %product_id, "wishlist add failed");
        }

        // The in-flight mark comes off on every exit path.
        let ok = remote.is_ok();
        {
            let mut state = self.lock();
            state.in_flight.remove(&product_id);
            if ok {
                if !state.items.contains(&product_id) {
                    state.items.push(product_id);
                }
                if !state.authenticated {
                    self.persist(&state.items);
                }
            }
        }
        if ok {
            self.notifier.success("Added to wishlist!");
        } else {
            self.notifier.error("Failed to add to wishlist");
        }
        ok
    }

    pub async fn remove_from_wishlist(&self, product_id: Uuid) -> bool {
        let authenticated = {
            let mut state = self.lock();
            if state.in_flight.contains(&product_id) || !state.items.contains(&product_id) {
                return false;
            }
            state.in_flight.insert(product_id);
            state.authenticated
        };

        let remote = if authenticated {
            self.api.remove_from_wishlist(product_id).await
        } else {
            Ok(())
        };
        if let Err(err) = &remote {
            tracing::error!(error = %err, product = %product_id, "wishlist remove failed");
        }

        let ok = remote.is_ok();
        {
            let mut state = self.lock();
            state.in_flight.remove(&product_id);
            if ok {
                state.items.retain(|id| *id != product_id);
                if !state.authenticated {
                    self.persist(&state.items);
                }
            }
        }
        if ok {
            self.notifier.success("Removed from wishlist");
        } else {
            self.notifier.error("Failed to remove from wishlist");
        }
        ok
    }

    /// Adds or removes based on current membership. A toggle for an id that
    /// is still in flight is a no-op.
    pub async fn toggle_wishlist(&self, product_id: Uuid) -> bool {
        let in_wishlist = {
            let state = self.lock();
            if state.in_flight.contains(&product_id) {
                return false;
            }
            state.items.contains(&product_id)
        };
        if in_wishlist {
            self.remove_from_wishlist(product_id).await
        } else {
            self.add_to_wishlist(product_id).await
        }
    }

    pub async fn clear_wishlist(&self) {
        let authenticated = self.lock().authenticated;
        if authenticated {
            if let Err(err) = self.api.clear_wishlist().await {
                tracing::warn!(error = %err, "remote wishlist clear failed");
            }
        } else {
            self.persist(&[]);
        }
        self.lock().items.clear();
    }

    /// Replaces the local set with the server's, reducing the populated
    /// product list to ids. A failed fetch falls back to an empty list
    /// rather than keeping stale state.
    pub async fn fetch_wishlist(&self) {
        if !self.lock().authenticated {
            return;
        }
        match self.api.fetch_wishlist().await {
            Ok(products) => {
                let mut seen = HashSet::new();
                let ids = products
                    .into_iter()
                    .map(|product| product.id)
                    .filter(|id| seen.insert(*id))
                    .collect();
                self.lock().items = ids;
            }
            Err(err) => {
                tracing::warn!(error = %err, "wishlist fetch failed, resetting to empty");
                self.lock().items.clear();
            }
        }
    }

    /// Login transition: replay the guest wishlist as sequential remote
    /// adds, discard the guest blob, then refetch authoritative state.
    pub async fn handle_login(&self) {
        self.lock().authenticated = true;

        let guest = self
            .storage
            .read_json::<Vec<PersistedEntry>>(WISHLIST_KEY)
            .map(normalize)
            .unwrap_or_default();
        for product_id in &guest {
            if let Err(err) = self.api.add_to_wishlist(*product_id).await {
                tracing::warn!(error = %err, product = %product_id, "failed to merge guest wishlist entry");
            }
        }
        if let Err(err) = self.storage.remove(WISHLIST_KEY) {
            tracing::warn!(error = %err, "failed to drop persisted guest wishlist");
        }
        self.fetch_wishlist().await;
    }

    pub fn handle_logout(&self) {
        let mut state = self.lock();
        state.authenticated = false;
        state.items.clear();
    }

    pub async fn resume_session(&self) {
        self.lock().authenticated = true;
        self.fetch_wishlist().await;
    }
}
