//! `--config` file handling.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rebase_detect::DetectSettings;
use rebase_scad::{EvaluatorSettings, ScriptSettings};
use serde::{Deserialize, Serialize};

/// Everything the TOML config can set. Missing sections use defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebaseConfig {
    /// Base detection.
    pub detect: DetectSettings,
    /// Cut profile and import paths.
    pub script: ScriptSettings,
    /// How to launch OpenSCAD.
    pub evaluator: EvaluatorSettings,
}

impl RebaseConfig {
    /// Load from a file, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config {:?}", path))
    }

    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.detect.validate()?;
        self.script.validate()?;
        self.evaluator.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_config_is_default() {
        let config = RebaseConfig::from_toml("").unwrap();
        assert_eq!(config, RebaseConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = RebaseConfig::from_toml(
            r#"
            [detect]
            badness_threshold = 0.5

            [script.profile]
            inner_height = 6.0

            [evaluator]
            binary = "/opt/openscad/bin/openscad"
            extra_args = ["--enable=manifold"]
            "#,
        )
        .unwrap();

        assert_eq!(config.detect.badness_threshold, 0.5);
        assert_eq!(config.detect.expected_base_size, 35.6);
        assert_eq!(config.script.profile.inner_height, 6.0);
        assert_eq!(config.script.profile.outer_size, 42.0);
        assert_eq!(config.script.paths.subject, "/toFix.stl");
        assert_eq!(
            config.evaluator.binary,
            PathBuf::from("/opt/openscad/bin/openscad")
        );
        assert_eq!(config.evaluator.backend.as_deref(), Some("manifold"));
        assert_eq!(config.evaluator.extra_args, ["--enable=manifold"]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(RebaseConfig::from_toml("[detect]\nz_tolerance = -1.0\n").is_err());
        assert!(RebaseConfig::from_toml("[script.paths]\noutput = \"\"\n").is_err());
        assert!(RebaseConfig::from_toml("[detect\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rebase.toml");
        fs::write(&path, "[detect]\nexpected_base_size = 41.5\n").unwrap();

        let config = RebaseConfig::load(Some(&path)).unwrap();
        assert_eq!(config.detect.expected_base_size, 41.5);

        assert!(RebaseConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
        assert_eq!(RebaseConfig::load(None).unwrap(), RebaseConfig::default());
    }
}
