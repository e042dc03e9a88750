//! Validation of solver settings before a run starts.
//!
//! Every check runs and the messages are collected, so one error lists all
//! configuration problems at once.

use super::{AhcaConfig, MoecaConfig, ServicemapConfig};
use crate::errors::{Error, Result};
use crate::metrics::{flattened_len, MetricType};
use crate::solver::moeca::available_optimizers;

pub fn validate_config(config: &ServicemapConfig) -> Result<()> {
    let mut errors = ahca_errors(&config.ahca);
    errors.extend(moeca_errors(&config.moeca));
    if config.cache.memory_limit_mb == 0 {
        errors.push("cache.memory_limit_mb must be at least 1".to_string());
    }
    into_result(errors)
}

pub fn validate_ahca(config: &AhcaConfig) -> Result<()> {
    into_result(ahca_errors(config))
}

pub fn validate_moeca(config: &MoecaConfig) -> Result<()> {
    into_result(moeca_errors(config))
}

fn into_result(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::configuration(errors.join("; ")))
    }
}

fn ahca_errors(config: &AhcaConfig) -> Vec<String> {
    let mut errors = bounds_errors("ahca", config.min_cluster_amount, config.max_cluster_amount);
    errors.extend(metrics_errors("ahca", &config.metrics));

    if !config.weights.is_empty() {
        let expected = flattened_len(&config.metrics);
        if config.weights.len() != expected {
            errors.push(format!(
                "ahca.weights has {} entries but the metrics flatten to {}",
                config.weights.len(),
                expected
            ));
        }
        if let Some(bad) = config.weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            errors.push(format!("ahca.weights must be non-negative, got {}", bad));
        }
    }
    errors
}

fn moeca_errors(config: &MoecaConfig) -> Vec<String> {
    let mut errors = bounds_errors("moeca", config.min_cluster_amount, config.max_cluster_amount);
    errors.extend(metrics_errors("moeca", &config.metrics));

    if config.population_size < 2 {
        errors.push(format!(
            "moeca.population_size must be at least 2, got {}",
            config.population_size
        ));
    }
    if config.max_evaluations < config.population_size {
        errors.push(format!(
            "moeca.max_evaluations ({}) must cover one population ({})",
            config.max_evaluations, config.population_size
        ));
    }
    if config.max_time_secs == Some(0) {
        errors.push("moeca.max_time_secs must be positive".to_string());
    }
    let known = available_optimizers();
    if !known
        .iter()
        .any(|name| name.eq_ignore_ascii_case(config.algorithm.trim()))
    {
        errors.push(format!(
            "moeca.algorithm '{}' is not a known optimizer (available: {})",
            config.algorithm,
            known.join(", ")
        ));
    }
    errors
}

fn bounds_errors(section: &str, min: usize, max: usize) -> Vec<String> {
    let mut errors = Vec::new();
    if min < 1 {
        errors.push(format!("{}.min_cluster_amount must be at least 1", section));
    }
    if min > max {
        errors.push(format!(
            "{}.min_cluster_amount ({}) exceeds max_cluster_amount ({})",
            section, min, max
        ));
    }
    errors
}

fn metrics_errors(section: &str, metrics: &[MetricType]) -> Vec<String> {
    if metrics.is_empty() {
        vec![format!("{}.metrics must name at least one metric type", section)]
    } else {
        Vec::new()
    }
}
