//! Who is online, counted per identity.
//!
//! [`ConnectionRegistry`] maps each [`UserId`] with at least one open
//! session to its display name and session count. It is the single source
//! of truth for presence; rosters are always derived from it.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{Identity, UserId};

/// Result of a registry mutation, from the identity's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The identity had no sessions and now has one.
    CameOnline,
    /// The identity's last session closed and its entry was removed.
    /// Carries the display name the entry held at removal.
    WentOffline(String),
    /// The session count changed but the identity stayed online (or was
    /// never registered).
    Unchanged,
}

#[derive(Debug)]
struct RegistryEntry {
    display_name: String,
    session_count: usize,
    /// Registration sequence of the first session; orders the roster.
    online_since: u64,
}

#[derive(Debug, Default)]
struct RegistryInner {
    entries: HashMap<UserId, RegistryEntry>,
    next_seq: u64,
}

/// Concurrency-safe session counts keyed by identity.
///
/// All mutations take the write lock for their whole duration, so callers
/// observe a linearizable history: once `register` or `deregister` has
/// returned, every later [`snapshot`](Self::snapshot) reflects it.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more open session for `identity`.
    ///
    /// Inserts the entry when absent. A later token may carry a new display
    /// name; the latest one wins.
    pub async fn register(&self, identity: &Identity) -> Transition {
        let mut inner = self.inner.write().await;
        let seq = inner.next_seq;
        match inner.entries.get_mut(&identity.id) {
            Some(entry) => {
                entry.session_count = entry.session_count.saturating_add(1);
                entry.display_name.clone_from(&identity.display_name);
                tracing::debug!(
                    user_id = %identity.id,
                    sessions = entry.session_count,
                    "additional session registered"
                );
                Transition::Unchanged
            }
            None => {
                inner.entries.insert(
                    identity.id.clone(),
                    RegistryEntry {
                        display_name: identity.display_name.clone(),
                        session_count: 1,
                        online_since: seq,
                    },
                );
                inner.next_seq = seq.wrapping_add(1);
                Transition::CameOnline
            }
        }
    }

    /// Records that one session of `identity` closed.
    ///
    /// Removes the entry when its count reaches zero. Deregistering an
    /// identity that is not registered is a no-op.
    pub async fn deregister(&self, identity: &Identity) -> Transition {
        let mut inner = self.inner.write().await;
        let Some(entry) = inner.entries.get_mut(&identity.id) else {
            tracing::warn!(user_id = %identity.id, "deregister for unknown identity");
            return Transition::Unchanged;
        };
        entry.session_count = entry.session_count.saturating_sub(1);
        if entry.session_count > 0 {
            return Transition::Unchanged;
        }
        match inner.entries.remove(&identity.id) {
            Some(removed) => Transition::WentOffline(removed.display_name),
            None => Transition::Unchanged,
        }
    }

    /// Display names currently online, most recently registered first.
    pub async fn snapshot(&self) -> Vec<String> {
        let inner = self.inner.read().await;
        let mut entries: Vec<&RegistryEntry> = inner.entries.values().collect();
        entries.sort_by(|a, b| b.online_since.cmp(&a.online_since));
        entries.into_iter().map(|e| e.display_name.clone()).collect()
    }

    /// Number of open sessions for `id` (0 when offline).
    pub async fn session_count(&self, id: &UserId) -> usize {
        self.inner
            .read()
            .await
            .entries
            .get(id)
            .map_or(0, |e| e.session_count)
    }

    /// Returns the number of identities online.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Returns `true` if nobody is online.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn alice() -> Identity {
        Identity::new("u-alice", "alice")
    }

    fn bob() -> Identity {
        Identity::new("u-bob", "bob")
    }

    #[tokio::test]
    async fn first_register_comes_online() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.register(&alice()).await, Transition::CameOnline);
        assert_eq!(registry.session_count(&alice().id).await, 1);
        assert_eq!(registry.snapshot().await, vec!["alice"]);
    }

    #[tokio::test]
    async fn second_session_is_unchanged() {
        let registry = ConnectionRegistry::new();
        let _ = registry.register(&alice()).await;
        assert_eq!(registry.register(&alice()).await, Transition::Unchanged);
        assert_eq!(registry.session_count(&alice().id).await, 2);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn entry_removed_only_at_zero() {
        let registry = ConnectionRegistry::new();
        let _ = registry.register(&alice()).await;
        let _ = registry.register(&alice()).await;

        assert_eq!(registry.deregister(&alice()).await, Transition::Unchanged);
        assert_eq!(registry.session_count(&alice().id).await, 1);

        assert_eq!(
            registry.deregister(&alice()).await,
            Transition::WentOffline("alice".to_string())
        );
        assert_eq!(registry.session_count(&alice().id).await, 0);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn deregister_unknown_is_noop() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.deregister(&bob()).await, Transition::Unchanged);
        assert_eq!(registry.session_count(&bob().id).await, 0);
    }

    #[tokio::test]
    async fn snapshot_is_newest_first() {
        let registry = ConnectionRegistry::new();
        let _ = registry.register(&alice()).await;
        let _ = registry.register(&bob()).await;
        assert_eq!(registry.snapshot().await, vec!["bob", "alice"]);

        // Another alice session does not move her in the roster.
        let _ = registry.register(&alice()).await;
        assert_eq!(registry.snapshot().await, vec!["bob", "alice"]);

        // Rejoining after going offline does.
        let _ = registry.deregister(&alice()).await;
        let _ = registry.deregister(&alice()).await;
        let _ = registry.register(&alice()).await;
        assert_eq!(registry.snapshot().await, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn latest_display_name_wins() {
        let registry = ConnectionRegistry::new();
        let _ = registry.register(&alice()).await;
        let _ = registry
            .register(&Identity::new("u-alice", "alice.w"))
            .await;
        assert_eq!(registry.snapshot().await, vec!["alice.w"]);

        // The name reported on removal is the entry's, not the caller's.
        let _ = registry.deregister(&alice()).await;
        assert_eq!(
            registry.deregister(&alice()).await,
            Transition::WentOffline("alice.w".to_string())
        );
    }

    #[tokio::test]
    async fn concurrent_sessions_balance_out() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let _ = registry.register(&alice()).await;
                let _ = registry.deregister(&alice()).await;
            }));
        }
        for handle in handles {
            let Ok(()) = handle.await else {
                panic!("task failed");
            };
        }
        assert_eq!(registry.session_count(&alice().id).await, 0);
        assert!(registry.is_empty().await);
    }
}
