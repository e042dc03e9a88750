//! Persistence of solver runs.
//!
//! A run is stored as one [`RunRecord`]: the solutions it produced plus a
//! free-form summary of the outcome. Stores hand out opaque [`RunId`]s.

mod json;
mod memory;

pub use json::{read_solution, JsonSolutionStore};
pub use memory::MemorySolutionStore;

use crate::errors::Result;
use crate::solution::Solution;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

static RUN_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Fresh id from the solver name, the current time and a process-wide counter.
    pub fn generate(solver: &str, at: DateTime<Utc>) -> Self {
        let counter = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!(
            "{}-{}-{:04}",
            at.format("%Y%m%dT%H%M%S%3fZ"),
            solver,
            counter
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RunId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RunId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: RunId,
    pub solver: String,
    pub created_at: DateTime<Utc>,
    pub solutions: Vec<Solution>,
    /// Solver-specific statistics (steps, evaluations, indicators, cache)
    #[serde(default)]
    pub summary: serde_json::Value,
}

impl RunRecord {
    pub fn new(solver: impl Into<String>, solutions: Vec<Solution>) -> Self {
        let solver = solver.into();
        let created_at = Utc::now();
        Self {
            id: RunId::generate(&solver, created_at),
            solver,
            created_at,
            solutions,
            summary: serde_json::Value::Null,
        }
    }

    pub fn with_summary(mut self, summary: serde_json::Value) -> Self {
        self.summary = summary;
        self
    }
}

pub trait SolutionStore: Send + Sync {
    fn save(&self, record: &RunRecord) -> Result<RunId>;

    fn load(&self, id: &RunId) -> Result<RunRecord>;

    /// Stored run ids in ascending order.
    fn list(&self) -> Result<Vec<RunId>>;
}
