use super::report::{cache_line, microservices_table, print_heading, print_warning, solutions_table};
use super::{persist, prepare_run};
use crate::cli::RunArgs;
use crate::config::AhcaConfig;
use crate::observability::set_cluster_count;
use crate::solver::{run_ahca, AhcaOutcome};
use crate::store::RunRecord;
use anyhow::{Context, Result};

/// Command-line values that replace configured ones.
#[derive(Debug, Clone, Default)]
pub struct AhcaOverrides {
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub shared_edges: Option<bool>,
    pub normalize: bool,
}

impl AhcaOverrides {
    pub fn apply(&self, mut config: AhcaConfig) -> AhcaConfig {
        if let Some(min) = self.min {
            config.min_cluster_amount = min;
        }
        if let Some(max) = self.max {
            config.max_cluster_amount = max;
        }
        if let Some(shared) = self.shared_edges {
            config.optimize_on_shared_edges = shared;
        }
        if self.normalize {
            config.normalize_metrics = true;
        }
        config
    }
}

pub fn outcome_record(outcome: &AhcaOutcome) -> Result<RunRecord> {
    let summary = serde_json::json!({
        "steps": outcome.steps,
        "retries": outcome.retries,
        "exhausted": outcome.exhausted,
        "cache": serde_json::to_value(outcome.cache)?,
    });
    Ok(RunRecord::new("ahca", outcome.solutions.clone()).with_summary(summary))
}

pub fn handle_ahca(run: RunArgs, overrides: AhcaOverrides) -> Result<()> {
    let prepared = prepare_run(&run)?;
    let config = overrides.apply(prepared.config.ahca.clone());
    set_cluster_count(prepared.input.other_classes().len());

    let outcome = run_ahca(
        &prepared.input,
        &config,
        prepared.seed,
        prepared.config.cache.memory_limit_bytes(),
    )
    .context("AHCA run failed")?;

    let record = outcome_record(&outcome)?;
    let (id, path) = persist(&run, &record)?;

    if run.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    print_heading(&format!(
        "AHCA: {} merges, {} widened steps, {} solutions",
        outcome.steps,
        outcome.retries,
        outcome.solutions.len()
    ));
    if outcome.exhausted {
        print_warning(&format!(
            "No merge remained before reaching {} clusters",
            config.min_cluster_amount
        ));
    }
    println!("{}", solutions_table(&outcome.solutions));
    if let Some(last) = outcome.solutions.last() {
        print_heading(&format!("Smallest decomposition ({} services)", last.cluster_count()));
        println!("{}", microservices_table(last));
    }
    println!("{}", cache_line(&outcome.cache));
    println!("run {} stored at {}", id, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_configured_values() {
        let overrides = AhcaOverrides {
            min: Some(3),
            shared_edges: Some(false),
            normalize: true,
            ..AhcaOverrides::default()
        };
        let config = overrides.apply(AhcaConfig::default());
        assert_eq!(config.min_cluster_amount, 3);
        assert_eq!(config.max_cluster_amount, AhcaConfig::default().max_cluster_amount);
        assert!(!config.optimize_on_shared_edges);
        assert!(config.normalize_metrics);
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let config = AhcaOverrides::default().apply(AhcaConfig::default());
        assert_eq!(config, AhcaConfig::default());
    }
}
