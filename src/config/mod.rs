//! Solver configuration, loaded from `.servicemap.toml`.

mod ahca;
mod core;
mod loader;
mod moeca;
pub mod validation;

pub use ahca::AhcaConfig;
pub use self::core::{CacheConfig, ServicemapConfig};
pub use loader::{
    directory_ancestors, load_config, load_config_from_dir, load_config_from_path, parse_config,
    write_default_config, CONFIG_FILE_NAME, DEFAULT_CONFIG_TEMPLATE,
};
pub use moeca::MoecaConfig;
pub use validation::{validate_ahca, validate_config, validate_moeca};
