use crate::cluster::AnalysisResult;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// One finished analysis, addressable by id until evicted or invalidated.
#[derive(Debug)]
pub struct StoredResult {
    pub id: Uuid,
    pub folder: PathBuf,
    pub created_at: DateTime<Utc>,
    pub analysis: AnalysisResult,
}

/// Bounded store of analysis results handed out to API callers.
///
/// Replaces a single process-wide "latest result": every export or delete names the
/// result it acts on. Oldest entries are evicted beyond `capacity`.
pub struct ResultStore {
    capacity: usize,
    entries: Mutex<VecDeque<Arc<StoredResult>>>,
}

impl ResultStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn insert(&self, folder: PathBuf, analysis: AnalysisResult) -> Arc<StoredResult> {
        let stored = Arc::new(StoredResult {
            id: Uuid::new_v4(),
            folder,
            created_at: Utc::now(),
            analysis,
        });
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_back(Arc::clone(&stored));
        while entries.len() > self.capacity {
            if let Some(evicted) = entries.pop_front() {
                debug!("Evicting result {} from {}", evicted.id, evicted.created_at);
            }
        }
        stored
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<StoredResult>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().find(|r| r.id == id).cloned()
    }

    pub fn remove(&self, id: Uuid) -> Option<Arc<StoredResult>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let pos = entries.iter().position(|r| r.id == id)?;
        entries.remove(pos)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
