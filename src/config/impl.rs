use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Falls back to defaults when `init_config`
/// was never called.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
        .load_full()
}

/// Initialize the global configuration
///
/// Loads configuration from `path` (or `headcounts.toml` in the current
/// directory). If the file doesn't exist, uses in-memory defaults plus
/// `HC__*` environment overrides.
pub fn init_config(path: Option<&str>) {
    let loaded = Arc::new(StaticConfig::load(path));
    CONFIG
        .get_or_init(|| ArcSwap::new(loaded.clone()))
        .store(loaded);
}
