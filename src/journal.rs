/// The journal ties shared collaborators to per-scope managers.
///
/// Construct one explicitly at startup and pass it to whatever needs to
/// open a scope. Every manager it opens shares the same store and asset
/// releaser; each scope still gets its own list and writer task.

use std::sync::Arc;

use crate::catalog;
use crate::media::AssetReleaser;
use crate::state::{CommentManager, KeyValueStore, LoadReport, ObservableManager, Scope};

#[derive(Clone)]
pub struct Journal {
    store: Arc<dyn KeyValueStore>,
    releaser: Arc<dyn AssetReleaser>,
}

impl Journal {
    pub fn new(store: Arc<dyn KeyValueStore>, releaser: Arc<dyn AssetReleaser>) -> Self {
        Self { store, releaser }
    }

    /// Load the manager for `scope`
    pub async fn open(&self, scope: Scope) -> (CommentManager, LoadReport) {
        if let Scope::Item(id) = &scope {
            if catalog::find(id).is_none() {
                tracing::debug!(item = %id, "opening comments for an item outside the catalog");
            }
        }
        CommentManager::load(Arc::clone(&self.store), Arc::clone(&self.releaser), scope).await
    }

    /// Load the manager for `scope` wrapped for snapshot subscribers
    pub async fn open_observable(&self, scope: Scope) -> (ObservableManager, LoadReport) {
        let (manager, report) = self.open(scope).await;
        (ObservableManager::new(manager), report)
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::KeepAssets;
    use crate::state::MemoryStore;

    #[tokio::test]
    async fn test_scopes_are_independent() {
        let journal = Journal::new(Arc::new(MemoryStore::new()), Arc::new(KeepAssets));

        let (mut fox, _) = journal.open(Scope::item("discover-3")).await;
        let (mut profile, _) = journal.open(Scope::Profile).await;

        fox.add("fox by the river", None, None).unwrap();
        profile.add("first outing", None, None).unwrap();
        profile.add("second outing", None, None).unwrap();
        fox.flush().await.unwrap();
        profile.flush().await.unwrap();

        let (fox_again, _) = journal.open(Scope::item("discover-3")).await;
        let (panda, _) = journal.open(Scope::item("discover-2")).await;
        let (profile_again, _) = journal.open(Scope::Profile).await;

        assert_eq!(fox_again.len(), 1);
        assert!(panda.is_empty());
        assert_eq!(profile_again.len(), 2);
    }

    #[tokio::test]
    async fn test_open_observable() {
        let journal = Journal::new(Arc::new(MemoryStore::new()), Arc::new(KeepAssets));
        let (mut observable, report) = journal.open_observable(Scope::Profile).await;
        assert!(matches!(report, LoadReport::Loaded));

        let rx = observable.subscribe();
        observable.add("owl at night", None, None).unwrap();
        assert_eq!(rx.borrow().records.len(), 1);
    }
}
