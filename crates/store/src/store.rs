use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use crate::document::StateDocument;

/// Persistence-layer failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Whole-document persistence: one read, one atomic overwrite, nothing in
/// between.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load(&self) -> Result<StateDocument, StoreError>;
    async fn save(&self, document: &StateDocument) -> Result<(), StoreError>;
}

/// JSON file on disk.
///
/// Saves write a sibling temp file and rename it over the target, so a crash
/// mid-write never leaves a torn document behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self) -> Result<StateDocument, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no state file yet, starting empty");
                Ok(StateDocument::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, document: &StateDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// In-memory store for tests.
///
/// Saves can be made to fail on demand to exercise the persist-failure path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<StateDocument>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: StateDocument) -> Self {
        Self {
            document: Mutex::new(document),
            failing: AtomicBool::new(false),
        }
    }

    pub fn fail_saves(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// What the store currently holds, i.e. what would survive a restart.
    pub fn snapshot(&self) -> StateDocument {
        self.document.lock().expect("store poisoned").clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self) -> Result<StateDocument, StoreError> {
        Ok(self.snapshot())
    }

    async fn save(&self, document: &StateDocument) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Io(io::Error::other("simulated write failure")));
        }
        *self.document.lock().expect("store poisoned") = document.clone();
        Ok(())
    }
}
