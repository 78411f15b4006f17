//! Engine configuration loader.

use std::path::Path;

use attribute_core::EngineConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for engine configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Keys missing from the file keep their [`EngineConfig::default`] value.
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub(crate) fn parse(content: &str) -> LoadResult<EngineConfig> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if !(config.seed_epsilon.is_finite() && config.seed_epsilon >= 0.0) {
            anyhow::bail!("seed_epsilon must be a non-negative number, got {}", config.seed_epsilon);
        }
        if config.regeneration_interval_ms == 0 {
            anyhow::bail!("regeneration_interval_ms must be greater than zero");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config() {
        let config = ConfigLoader::parse(
            "regeneration_interval_ms = 1500\nseed_epsilon = 0.001\n",
        )
        .unwrap();
        assert_eq!(config.regeneration_interval_ms, 1500);
        assert_eq!(config.seed_epsilon, 0.001);
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config = ConfigLoader::parse("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(ConfigLoader::parse("seed_epsilon = -1.0").is_err());
        assert!(ConfigLoader::parse("regeneration_interval_ms = 0").is_err());
        assert!(ConfigLoader::parse("regeneration_interval_ms = \"soon\"").is_err());
    }
}
