use std::sync::Arc;

use tokio::sync::Mutex;

use crate::document::StateDocument;
use crate::store::{DocumentStore, StoreError};

/// The single writer over the shared state document.
///
/// Every mutation runs under one lock, on a scratch copy of the document:
/// the closure mutates the copy, the copy is persisted, and only a
/// successful persist swaps it into memory. A failed domain check persists
/// nothing; a failed persist leaves memory identical to what is on disk.
pub struct AppState {
    document: Mutex<StateDocument>,
    store: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Load the persisted document and wrap it.
    pub async fn load(store: Arc<dyn DocumentStore>) -> Result<Self, StoreError> {
        let document = store.load().await?;
        Ok(Self {
            document: Mutex::new(document),
            store,
        })
    }

    /// Read-only access to the current document.
    pub async fn read<R>(&self, f: impl FnOnce(&StateDocument) -> R) -> R {
        let guard = self.document.lock().await;
        f(&guard)
    }

    /// One read-check-mutate-persist critical section.
    ///
    /// The closure's error short-circuits before anything is persisted, so
    /// validation failures are free. `E` must absorb [`StoreError`] so a
    /// failed durable write surfaces through the same channel.
    pub async fn mutate<R, E>(
        &self,
        f: impl FnOnce(&mut StateDocument) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self.document.lock().await;
        let mut scratch = guard.clone();
        let out = f(&mut scratch)?;
        self.store.save(&scratch).await?;
        *guard = scratch;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use teahouse_core::{ChatId, DomainError};
    use thiserror::Error;

    #[derive(Debug, Error)]
    enum TestError {
        #[error(transparent)]
        Domain(#[from] DomainError),
        #[error(transparent)]
        Store(#[from] StoreError),
    }

    #[tokio::test]
    async fn mutate_persists_and_commits() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::load(store.clone()).await.unwrap();

        state
            .mutate(|doc| {
                doc.register_user(ChatId(1));
                Ok::<_, StoreError>(())
            })
            .await
            .unwrap();

        assert!(state.read(|doc| doc.users.contains(&ChatId(1))).await);
        assert!(store.snapshot().users.contains(&ChatId(1)));
    }

    #[tokio::test]
    async fn domain_failure_persists_nothing() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::load(store.clone()).await.unwrap();

        let result: Result<(), TestError> = state
            .mutate(|doc| {
                doc.register_user(ChatId(1));
                Err(DomainError::validation("nope").into())
            })
            .await;

        assert!(matches!(result, Err(TestError::Domain(_))));
        assert!(state.read(|doc| doc.users.is_empty()).await);
        assert!(store.snapshot().users.is_empty());
    }

    #[tokio::test]
    async fn persist_failure_leaves_memory_on_the_durable_state() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::load(store.clone()).await.unwrap();

        store.fail_saves(true);
        let result: Result<(), TestError> = state
            .mutate(|doc| {
                doc.register_user(ChatId(1));
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(TestError::Store(_))));
        // Memory did not run ahead of disk.
        assert!(state.read(|doc| doc.users.is_empty()).await);
        assert!(store.snapshot().users.is_empty());

        // The same mutation succeeds once the store recovers.
        store.fail_saves(false);
        state
            .mutate(|doc| {
                doc.register_user(ChatId(1));
                Ok::<_, StoreError>(())
            })
            .await
            .unwrap();
        assert!(store.snapshot().users.contains(&ChatId(1)));
    }
}
