use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::knowledge::KnowledgeBase;

pub const ENV_KNOWLEDGE_BASE: &str = "RECAST_KNOWLEDGE_BASE";
pub const ENV_SEED: &str = "RECAST_SEED";
pub const ENV_STYLE_THRESHOLD: &str = "RECAST_STYLE_THRESHOLD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecastConfig {
    /// Knowledge-base JSON replacing the built-in tables.
    pub knowledge_base: Option<PathBuf>,
    /// Fixes the randomness source of the reintroducing operations.
    pub seed: Option<u64>,
    /// Threshold used by `style=<NAME>` when none is given.
    pub style_threshold: f64,
}

impl Default for RecastConfig {
    fn default() -> Self {
        Self {
            knowledge_base: None,
            seed: None,
            style_threshold: 1.0,
        }
    }
}

impl RecastConfig {
    pub const FILE_NAME: &'static str = "recast.json";

    /// Read config from `path`, or from `recast.json` in the working directory
    /// when no path is given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(Self::FILE_NAME).is_file() => {
                Self::from_file(Path::new(Self::FILE_NAME))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| CoreError::Config(format!("malformed {}: {e}", path.display())))
    }

    /// Override fields from `RECAST_*` variables as returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_KNOWLEDGE_BASE).filter(|v| !v.is_empty()) {
            self.knowledge_base = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(ENV_SEED) {
            let seed = raw
                .trim()
                .parse()
                .map_err(|_| CoreError::Config(format!("{ENV_SEED} must be an integer, got '{raw}'")))?;
            self.seed = Some(seed);
        }
        if let Some(raw) = lookup(ENV_STYLE_THRESHOLD) {
            self.style_threshold = raw.trim().parse().map_err(|_| {
                CoreError::Config(format!("{ENV_STYLE_THRESHOLD} must be a number, got '{raw}'"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.style_threshold.is_finite() || !(0.0..=1.0).contains(&self.style_threshold) {
            return Err(CoreError::Config(format!(
                "style_threshold must be between 0 and 1, got {}",
                self.style_threshold
            )));
        }
        Ok(())
    }

    /// The configured knowledge base, or the built-in one.
    pub fn knowledge_base(&self) -> Result<KnowledgeBase, CoreError> {
        match &self.knowledge_base {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading knowledge base");
                KnowledgeBase::load(path)
            }
            None => KnowledgeBase::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RecastConfig::default();
        assert_eq!(config.style_threshold, 1.0);
        assert!(config.seed.is_none());
        assert!(config.knowledge_base.is_none());
    }

    #[test]
    fn test_from_file_fills_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recast.json");
        std::fs::write(&path, r#"{"seed": 7}"#).unwrap();
        let config = RecastConfig::from_file(&path).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.style_threshold, 1.0);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = RecastConfig {
            seed: Some(1),
            ..RecastConfig::default()
        };
        config
            .apply_env(env(&[(ENV_SEED, "42"), (ENV_STYLE_THRESHOLD, "0.25")]))
            .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.style_threshold, 0.25);
    }

    #[test]
    fn test_bad_env_values_are_config_errors() {
        let mut config = RecastConfig::default();
        let err = config.apply_env(env(&[(ENV_SEED, "soon")])).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));

        config.style_threshold = 1.5;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RecastConfig::from_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
