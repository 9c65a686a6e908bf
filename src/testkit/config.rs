//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.
//! Avoids each test module defining its own slightly-different defaults.

use std::path::Path;

use crate::application::GeneratorConfig;
use crate::infrastructure::config::settings::Config;

/// Generator settings with zero retry delay.
pub fn generator() -> GeneratorConfig {
    GeneratorConfig {
        backoff_base_ms: 0,
        backoff_jitter_ms: 0,
        ..GeneratorConfig::default()
    }
}

/// Dry-run configuration writing to `database`, with no retry delays and
/// no pacing between market creations.
pub fn dry_run(database: &Path) -> Config {
    let mut config = Config {
        dry_run: true,
        database: database.display().to_string(),
        generator: generator(),
        ..Config::default()
    };
    config.schedule.creation_pacing_ms = 0;
    config
}
