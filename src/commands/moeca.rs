use super::report::{cache_line, print_heading, print_warning, solutions_table};
use super::{persist, prepare_run};
use crate::cli::RunArgs;
use crate::config::MoecaConfig;
use crate::solver::moeca::Encoding;
use crate::solver::{run_moeca, MoecaOutcome};
use crate::store::RunRecord;
use anyhow::{Context, Result};

#[derive(Debug, Clone, Default)]
pub struct MoecaOverrides {
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub encoding: Option<Encoding>,
    pub population: Option<usize>,
    pub evaluations: Option<usize>,
    pub max_time: Option<u64>,
    pub seed: Option<u64>,
    pub algorithm: Option<String>,
}

impl MoecaOverrides {
    pub fn apply(&self, mut config: MoecaConfig) -> MoecaConfig {
        if let Some(min) = self.min {
            config.min_cluster_amount = min;
        }
        if let Some(max) = self.max {
            config.max_cluster_amount = max;
        }
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        if let Some(population) = self.population {
            config.population_size = population;
        }
        if let Some(evaluations) = self.evaluations {
            config.max_evaluations = evaluations;
        }
        if self.max_time.is_some() {
            config.max_time_secs = self.max_time;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(algorithm) = &self.algorithm {
            config.algorithm = algorithm.clone();
        }
        config
    }
}

pub fn outcome_record(outcome: &MoecaOutcome, config: &MoecaConfig) -> Result<RunRecord> {
    let summary = serde_json::json!({
        "algorithm": config.algorithm,
        "encoding": config.encoding,
        "evaluations": outcome.evaluations,
        "generations": outcome.generations,
        "infeasible": outcome.infeasible,
        "elapsed_secs": outcome.elapsed_secs,
        "indicators": serde_json::to_value(&outcome.indicators)?,
        "cache": serde_json::to_value(outcome.cache)?,
    });
    Ok(RunRecord::new("moeca", outcome.solutions.clone()).with_summary(summary))
}

pub fn handle_moeca(run: RunArgs, overrides: MoecaOverrides) -> Result<()> {
    let prepared = prepare_run(&run)?;
    let config = overrides.apply(prepared.config.moeca.clone());

    let outcome = run_moeca(
        &prepared.input,
        &config,
        prepared.seed.into_iter().collect(),
        prepared.config.cache.memory_limit_bytes(),
    )
    .context("MOECA run failed")?;

    let record = outcome_record(&outcome, &config)?;
    let (id, path) = persist(&run, &record)?;

    if run.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    print_heading(&format!(
        "MOECA ({}, {}): {} evaluations over {} generations in {:.1}s",
        config.algorithm,
        config.encoding,
        outcome.evaluations,
        outcome.generations,
        outcome.elapsed_secs
    ));
    if outcome.solutions.is_empty() {
        print_warning(&format!(
            "No feasible decomposition between {} and {} services",
            config.min_cluster_amount, config.max_cluster_amount
        ));
    } else {
        println!("{}", solutions_table(&outcome.solutions));
        println!(
            "front: {} solutions, hypervolume {:.4}, spacing {:.4}",
            outcome.indicators.front_size,
            outcome.indicators.hypervolume,
            outcome.indicators.spacing
        );
    }
    println!("{}", cache_line(&outcome.cache));
    println!("run {} stored at {}", id, path.display());
    Ok(())
}
