use super::{RunId, RunRecord, SolutionStore};
use crate::errors::{Error, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Process-local store, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySolutionStore {
    runs: Mutex<BTreeMap<RunId, RunRecord>>,
}

impl MemorySolutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.runs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.lock().is_empty()
    }
}

impl SolutionStore for MemorySolutionStore {
    fn save(&self, record: &RunRecord) -> Result<RunId> {
        self.runs.lock().insert(record.id.clone(), record.clone());
        Ok(record.id.clone())
    }

    fn load(&self, id: &RunId) -> Result<RunRecord> {
        self.runs
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::store(format!("run '{}' not found", id), None))
    }

    fn list(&self) -> Result<Vec<RunId>> {
        Ok(self.runs.lock().keys().cloned().collect())
    }
}
