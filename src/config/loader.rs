use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::ServicemapConfig;
use super::validation::validate_config;
use crate::errors::{Error, Result, ResultExt};

pub const CONFIG_FILE_NAME: &str = ".servicemap.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Commented configuration written by `servicemap init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# servicemap configuration

# Agglomerative search: merges the two clusters with the best weighted
# quality until min_cluster_amount clusters remain.
[ahca]
# data_autonomy, structural_behavior, carvalho, overhead, feature_modularization
metrics = ["data_autonomy", "structural_behavior", "carvalho", "overhead", "feature_modularization"]
# one weight per flattened metric; leave empty for equal weights
weights = []
min_cluster_amount = 2
max_cluster_amount = 20
optimize_on_shared_edges = true
normalize_metrics = false

# Evolutionary search over genomes of cluster assignments.
[moeca]
# nsga2 or archive-evolution
algorithm = "nsga2"
# cluster-label or graph-adjacency
encoding = "cluster-label"
max_evaluations = 10000
population_size = 100
metrics = ["data_autonomy", "structural_behavior", "carvalho"]
min_cluster_amount = 2
max_cluster_amount = 20
# max_time_secs = 600
# seed = 42

[cache]
memory_limit_mb = 256
"#;

pub(crate) fn read_config_file(path: &Path) -> std::io::Result<String> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse and validate a TOML configuration.
pub fn parse_config(contents: &str) -> Result<ServicemapConfig> {
    let config = toml::from_str::<ServicemapConfig>(contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load an explicitly named configuration file.
pub fn load_config_from_path(path: &Path) -> Result<ServicemapConfig> {
    let contents = read_config_file(path)
        .map_err(Error::from)
        .context(format!("Failed to read {}", path.display()))?;
    parse_config(&contents).context(format!("Invalid configuration in {}", path.display()))
}

fn try_load_config_from_path(path: &Path) -> Option<ServicemapConfig> {
    let contents = match read_config_file(path) {
        Ok(contents) => contents,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to read config file {}: {}", path.display(), e);
            }
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{} in {}. Using defaults.", e, path.display());
            None
        }
    }
}

/// `start` and up to `max_depth - 1` of its ancestors.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for `.servicemap.toml`.
pub fn load_config_from_dir(start: &Path) -> ServicemapConfig {
    directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            ServicemapConfig::default()
        })
}

pub fn load_config() -> ServicemapConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_from_dir(&dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            ServicemapConfig::default()
        }
    }
}

/// Write the default configuration into `dir`.
pub fn write_default_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        return Err(Error::configuration(format!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        )));
    }
    fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricType;
    use crate::solver::moeca::Encoding;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_template_parses_and_validates() {
        let config = parse_config(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.ahca, crate::config::AhcaConfig::default());
        assert_eq!(config.moeca.metrics.len(), 3);
        assert_eq!(config.cache.memory_limit_mb, 256);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse_config(indoc! {r#"
            [moeca]
            encoding = "graph-adjacency"
            seed = 7
        "#})
        .unwrap();

        assert_eq!(config.moeca.encoding, Encoding::GraphAdjacency);
        assert_eq!(config.moeca.seed, Some(7));
        assert_eq!(config.moeca.population_size, 100);
        assert_eq!(config.ahca.metrics, MetricType::ALL.to_vec());
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let result = parse_config(indoc! {r#"
            [ahca]
            min_cluster_amount = 8
            max_cluster_amount = 4
        "#});
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_unknown_metric_is_parse_error() {
        let result = parse_config(indoc! {r#"
            [ahca]
            metrics = ["lines_of_code"]
        "#});
        assert!(matches!(result, Err(Error::Toml(_))));
    }

    #[test]
    fn test_found_in_ancestor_directory() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            root.path().join(CONFIG_FILE_NAME),
            "[ahca]\nmin_cluster_amount = 3\n",
        )
        .unwrap();

        let config = load_config_from_dir(&nested);
        assert_eq!(config.ahca.min_cluster_amount, 3);
    }

    #[test]
    fn test_directory_ancestors_depth() {
        let dirs: Vec<PathBuf> = directory_ancestors(PathBuf::from("/a/b/c"), 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c"), PathBuf::from("/a/b")]);
    }

    #[test]
    fn test_write_default_config_respects_force() {
        let dir = TempDir::new().unwrap();
        let path = write_default_config(dir.path(), false).unwrap();
        assert!(path.exists());

        assert!(write_default_config(dir.path(), false).is_err());
        assert!(write_default_config(dir.path(), true).is_ok());
        assert!(load_config_from_path(&path).is_ok());
    }
}
