use super::{RunId, RunRecord, SolutionStore};
use crate::errors::{Error, Result};
use crate::solution::Solution;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const RECORD_EXTENSION: &str = "json";

/// One pretty-printed JSON file per run, named `<run-id>.json`.
#[derive(Debug, Clone)]
pub struct JsonSolutionStore {
    root: PathBuf,
}

impl JsonSolutionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, id: &RunId) -> Result<PathBuf> {
        let raw = id.as_str();
        if raw.is_empty() || raw.contains(['/', '\\']) || raw.starts_with('.') {
            return Err(Error::store(format!("invalid run id '{}'", raw), None));
        }
        Ok(self.root.join(format!("{}.{}", raw, RECORD_EXTENSION)))
    }

    /// Write to a sibling temp file, then rename over the target.
    fn write_atomically(target: &Path, data: &[u8]) -> Result<()> {
        let temp = target.with_extension("json.tmp");
        fs::write(&temp, data)
            .map_err(|e| Error::store(format!("failed to write run: {}", e), Some(temp.clone())))?;
        fs::rename(&temp, target).map_err(|e| {
            Error::store(
                format!("failed to move run into place: {}", e),
                Some(target.to_path_buf()),
            )
        })
    }
}

impl SolutionStore for JsonSolutionStore {
    fn save(&self, record: &RunRecord) -> Result<RunId> {
        fs::create_dir_all(&self.root).map_err(|e| {
            Error::store(
                format!("cannot create store directory: {}", e),
                Some(self.root.clone()),
            )
        })?;
        let path = self.record_path(&record.id)?;
        let json = serde_json::to_vec_pretty(record)?;
        Self::write_atomically(&path, &json)?;
        log::info!(
            "Saved {} solution(s) of run {} to {}",
            record.solutions.len(),
            record.id,
            path.display()
        );
        Ok(record.id.clone())
    }

    fn load(&self, id: &RunId) -> Result<RunRecord> {
        let path = self.record_path(id)?;
        if !path.is_file() {
            return Err(Error::store(format!("run '{}' not found", id), Some(path)));
        }
        let contents = fs::read_to_string(&path)?;
        serde_json::from_str(&contents).map_err(|e| {
            Error::store(format!("corrupt run record: {}", e), Some(path.clone()))
        })
    }

    fn list(&self) -> Result<Vec<RunId>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(RunId::from(stem));
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SolutionFile {
    Run(RunRecord),
    Single(Solution),
}

/// Read a solution from a stored run (picking `index`) or a bare solution file.
pub fn read_solution(path: &Path, index: usize) -> Result<Solution> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::store(format!("cannot read solution file: {}", e), Some(path.to_path_buf()))
    })?;
    let file: SolutionFile = serde_json::from_str(&contents).map_err(|e| {
        Error::store(format!("not a run or solution: {}", e), Some(path.to_path_buf()))
    })?;
    match file {
        SolutionFile::Single(solution) => Ok(solution),
        SolutionFile::Run(mut record) => {
            let available = record.solutions.len();
            if index >= available {
                return Err(Error::store(
                    format!(
                        "run '{}' has {} solution(s), index {} requested",
                        record.id, available, index
                    ),
                    Some(path.to_path_buf()),
                ));
            }
            Ok(record.solutions.swap_remove(index))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::Microservice;
    use tempfile::TempDir;

    fn record() -> RunRecord {
        RunRecord::new(
            "ahca",
            vec![Solution::new(vec![Microservice::new(0, vec!["a.A".into()])])],
        )
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonSolutionStore::new(dir.path().join("runs"));
        let record = record();

        let id = store.save(&record).unwrap();
        assert_eq!(store.load(&id).unwrap(), record);
        assert_eq!(store.list().unwrap(), vec![id.clone()]);
        assert!(!dir.path().join("runs").join(format!("{}.json.tmp", id)).exists());
    }

    #[test]
    fn test_missing_run_is_store_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonSolutionStore::new(dir.path());
        let err = store.load(&RunId::from("nope")).unwrap_err();
        assert!(matches!(err, Error::Store { path: Some(_), .. }));
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let store = JsonSolutionStore::new("runs");
        assert!(store.record_path(&RunId::from("../etc")).is_err());
        assert!(store.record_path(&RunId::from("")).is_err());
    }

    #[test]
    fn test_list_ignores_foreign_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let store = JsonSolutionStore::new(dir.path());
        assert!(store.list().unwrap().is_empty());
        assert!(JsonSolutionStore::new(dir.path().join("absent")).list().unwrap().is_empty());
    }

    #[test]
    fn test_read_solution_from_run_and_bare_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonSolutionStore::new(dir.path());
        let record = record();
        let id = store.save(&record).unwrap();
        let run_path = store.record_path(&id).unwrap();

        assert_eq!(read_solution(&run_path, 0).unwrap(), record.solutions[0]);
        assert!(matches!(read_solution(&run_path, 1), Err(Error::Store { .. })));

        let bare = dir.path().join("bare.json");
        fs::write(&bare, serde_json::to_string(&record.solutions[0]).unwrap()).unwrap();
        assert_eq!(read_solution(&bare, 0).unwrap(), record.solutions[0]);
    }
}
