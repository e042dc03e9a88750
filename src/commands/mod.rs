//! CLI command implementations.
//!
//! - **ahca**: greedy agglomerative run over a graph document
//! - **moeca**: evolutionary run over a graph document
//! - **evaluate**: metrics of a stored solution
//! - **runs**: list stored runs
//! - **init**: write a default `.servicemap.toml`
//!
//! Handlers own all I/O; the solvers themselves never print.

pub mod ahca;
pub mod evaluate;
pub mod init;
pub mod moeca;
pub mod report;
pub mod runs;

pub use ahca::{handle_ahca, AhcaOverrides};
pub use evaluate::handle_evaluate;
pub use init::init_config;
pub use moeca::{handle_moeca, MoecaOverrides};
pub use runs::list_runs;

use crate::cli::RunArgs;
use crate::config::{load_config, load_config_from_path, ServicemapConfig};
use crate::graph::{load_input, EvaluationInput};
use crate::observability::{set_phase, SolverPhase};
use crate::solution::Solution;
use crate::store::{read_solution, JsonSolutionStore, RunId, RunRecord, SolutionStore};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Store directory used when `--output` is not given.
pub const DEFAULT_STORE_DIR: &str = "servicemap-runs";

/// Everything a solver command needs before it can run.
pub struct Prepared {
    pub input: EvaluationInput,
    pub config: ServicemapConfig,
    pub seed: Option<Solution>,
}

pub fn resolve_config(path: Option<&Path>) -> Result<ServicemapConfig> {
    match path {
        Some(path) => load_config_from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(load_config()),
    }
}

pub fn load_graph(path: &Path) -> Result<EvaluationInput> {
    let _phase = set_phase(SolverPhase::GraphLoading);
    let input = load_input(path)
        .with_context(|| format!("Failed to load graph {}", path.display()))?;
    log::info!(
        "Loaded {} classes ({} behavioral) and {} relationships from {}",
        input.len(),
        input.other_classes().len(),
        input.relationships().len(),
        path.display()
    );
    Ok(input)
}

pub fn prepare_run(run: &RunArgs) -> Result<Prepared> {
    let config = resolve_config(run.config.as_deref())?;
    let input = load_graph(&run.graph)?;
    let seed = run
        .seed_solution
        .as_deref()
        .map(|path| {
            read_solution(path, 0)
                .with_context(|| format!("Failed to read seed solution {}", path.display()))
        })
        .transpose()?;
    Ok(Prepared {
        input,
        config,
        seed,
    })
}

pub fn store_dir(run: &RunArgs) -> PathBuf {
    run.output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR))
}

pub fn persist(run: &RunArgs, record: &RunRecord) -> Result<(RunId, PathBuf)> {
    let _phase = set_phase(SolverPhase::Persistence);
    let store = JsonSolutionStore::new(store_dir(run));
    let id = store
        .save(record)
        .with_context(|| format!("Failed to store run in {}", store.root().display()))?;
    let path = store.record_path(&id)?;
    Ok((id, path))
}
