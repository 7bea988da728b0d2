//! The favorites store.
//!
//! Owns the ordered list of tracked users, mirrors it to a durable slot after
//! every mutation and enriches new entries through a remote profile lookup.
//! Readers get snapshots or a `watch` subscription; only the store mutates
//! the list.

use crate::confirm::Confirm;
use crate::github::ProfileLookup;
use crate::models::{AddOutcome, FavoritesList, LookupFailure, StoreState, UserRecord};
use crate::storage::KeyValueStore;
use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

pub const DEFAULT_STORAGE_KEY: &str = "users";
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Slot holding the serialized list
    pub storage_key: String,
    /// Upper bound for a single profile lookup
    pub lookup_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

pub struct FavoritesStore<L, S> {
    lookup: L,
    storage: S,
    options: StoreOptions,
    users: Mutex<FavoritesList>,
    // Logins with a lookup in flight. Never held across an await.
    pending: StdMutex<BTreeSet<String>>,
    dirty: AtomicBool,
    updates: watch::Sender<FavoritesList>,
}

/// Clears a pending login when the add finishes or its future is dropped
struct PendingGuard<'a> {
    pending: &'a StdMutex<BTreeSet<String>>,
    login: String,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.login);
    }
}

impl<L, S> FavoritesStore<L, S>
where
    L: ProfileLookup,
    S: KeyValueStore,
{
    /// Load the saved list and return a ready store.
    ///
    /// A missing slot, a failed read or malformed contents all start from an
    /// empty list. Nothing is written back until the list is mutated.
    pub async fn initialize(lookup: L, storage: S, options: StoreOptions) -> Self {
        let users = load_list(&storage, &options.storage_key).await;
        let (updates, _) = watch::channel(users.clone());

        Self {
            lookup,
            storage,
            options,
            users: Mutex::new(users),
            pending: StdMutex::new(BTreeSet::new()),
            dirty: AtomicBool::new(false),
            updates,
        }
    }

    /// Fetch `candidate_login`'s profile and append it to the list.
    ///
    /// Duplicates are rejected before any network call, including logins
    /// whose lookup is still in flight, so concurrent adds of one login
    /// insert it at most once.
    pub async fn add(&self, candidate_login: &str) -> AddOutcome {
        let login = candidate_login.trim();
        if login.is_empty() {
            return AddOutcome::LookupFailed(LookupFailure::InvalidLogin);
        }

        let _pending = {
            let users = self.users.lock().await;
            if users.iter().any(|u| u.login == login) {
                info!(login, "User already in favorites");
                return AddOutcome::AlreadyExists;
            }
            match self.mark_pending(login) {
                Some(guard) => guard,
                None => {
                    info!(login, "Lookup for user already in progress");
                    return AddOutcome::AlreadyExists;
                }
            }
        };

        debug!(login, "Looking up user profile");
        let lookup =
            tokio::time::timeout(self.options.lookup_timeout, self.lookup.lookup_user(login));
        let profile = match lookup.await {
            Ok(Ok(profile)) => profile,
            Ok(Err(e)) => {
                warn!(login, error = %e, "Profile lookup failed");
                return AddOutcome::LookupFailed(e.into());
            }
            Err(_) => {
                warn!(login, timeout = ?self.options.lookup_timeout, "Profile lookup timed out");
                return AddOutcome::LookupFailed(LookupFailure::Timeout);
            }
        };

        let record = UserRecord::from(profile);
        let mut users = self.users.lock().await;

        // GitHub answers with the canonical login, which may differ in case
        if users.iter().any(|u| u.login == record.login) {
            info!(login = %record.login, "User already in favorites");
            return AddOutcome::AlreadyExists;
        }

        users.push(record.clone());
        self.persist(&users).await;
        self.updates.send_replace(users.clone());

        info!(login = %record.login, total = users.len(), "Added user to favorites");
        AddOutcome::Added(record)
    }

    /// Remove every record with this login. Removing an unknown login is a
    /// no-op; the list is persisted either way. Returns how many were removed.
    pub async fn remove(&self, login: &str) -> usize {
        self.remove_where(|u| u.login == login).await
    }

    /// Remove every record whose display name equals `name`. A record
    /// without a name matches the empty string.
    pub async fn remove_by_name(&self, name: &str) -> usize {
        self.remove_where(|u| u.name_matches(name)).await
    }

    /// Ask before removing `login`. `None` when the user declined, otherwise
    /// the number of records removed (0 for an unknown login).
    pub async fn confirm_and_remove<C>(&self, login: &str, confirmer: &C) -> Option<usize>
    where
        C: Confirm + ?Sized,
    {
        let question = format!("Remove {} from favorites?", login);
        if !self.ask(confirmer, &question).await {
            return None;
        }
        Some(self.remove(login).await)
    }

    /// Name-keyed variant of [`confirm_and_remove`](Self::confirm_and_remove)
    pub async fn confirm_and_remove_by_name<C>(&self, name: &str, confirmer: &C) -> Option<usize>
    where
        C: Confirm + ?Sized,
    {
        let question = format!("Remove every favorite named {:?}?", name);
        if !self.ask(confirmer, &question).await {
            return None;
        }
        Some(self.remove_by_name(name).await)
    }

    /// Current list in display order
    pub fn snapshot(&self) -> FavoritesList {
        self.updates.borrow().clone()
    }

    /// Receiver that observes every committed change to the list
    pub fn subscribe(&self) -> watch::Receiver<FavoritesList> {
        self.updates.subscribe()
    }

    pub fn find(&self, login: &str) -> Option<UserRecord> {
        self.updates.borrow().iter().find(|u| u.login == login).cloned()
    }

    pub fn len(&self) -> usize {
        self.updates.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self) -> StoreState {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if pending.is_empty() {
            StoreState::Ready
        } else {
            StoreState::Busy {
                pending: pending.iter().cloned().collect(),
            }
        }
    }

    /// Whether the last write to the slot failed. The next mutation
    /// rewrites the whole list.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn mark_pending(&self, login: &str) -> Option<PendingGuard<'_>> {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if !pending.insert(login.to_string()) {
            return None;
        }
        Some(PendingGuard {
            pending: &self.pending,
            login: login.to_string(),
        })
    }

    async fn ask<C>(&self, confirmer: &C, question: &str) -> bool
    where
        C: Confirm + ?Sized,
    {
        match confirmer.confirm(question).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Confirmation prompt failed, treating as no");
                false
            }
        }
    }

    async fn remove_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&UserRecord) -> bool,
    {
        let mut users = self.users.lock().await;
        let before = users.len();
        users.retain(|u| !predicate(u));
        let removed = before - users.len();

        self.persist(&users).await;
        self.updates.send_replace(users.clone());

        info!(removed, total = users.len(), "Removed users from favorites");
        removed
    }

    async fn persist(&self, users: &FavoritesList) {
        let result = match serde_json::to_string(users) {
            Ok(json) => self.storage.set(&self.options.storage_key, &json).await,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => {
                self.dirty.store(false, Ordering::SeqCst);
                debug!(key = %self.options.storage_key, count = users.len(), "Persisted favorites");
            }
            Err(e) => {
                self.dirty.store(true, Ordering::SeqCst);
                warn!(key = %self.options.storage_key, error = %e, "Failed to persist favorites");
            }
        }
    }
}

async fn load_list<S: KeyValueStore>(storage: &S, key: &str) -> FavoritesList {
    let raw = match storage.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "No saved favorites");
            return FavoritesList::new();
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read saved favorites, starting empty");
            return FavoritesList::new();
        }
    };

    let parsed: FavoritesList = match serde_json::from_str(&raw) {
        Ok(list) => list,
        Err(e) => {
            warn!(key, error = %e, "Saved favorites are malformed, starting empty");
            return FavoritesList::new();
        }
    };

    // Slots written by racing adds may hold the same login twice
    let mut seen = HashSet::new();
    let total = parsed.len();
    let users: FavoritesList = parsed
        .into_iter()
        .filter(|u| seen.insert(u.login.clone()))
        .collect();
    if users.len() != total {
        warn!(key, dropped = total - users.len(), "Dropped duplicate logins from saved favorites");
    }

    info!(key, count = users.len(), "Loaded saved favorites");
    users
}
