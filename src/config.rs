use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMode {
    /// A candidate matches when any keyword matches.
    #[default]
    Any,
    /// A candidate matches only when every keyword matches.
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// |offset.x| above which a direction hint is shown.
    pub hint_threshold: f32,
    /// |offset.x| above which a release commits.
    pub commit_threshold: f32,
    /// |velocity.x| (units per second) above which a release commits.
    pub velocity_threshold: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            hint_threshold: 45.0,
            commit_threshold: 100.0,
            velocity_threshold: 450.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    pub window_size: usize,
    pub scale_step: f32,
    pub opacity_step: f32,
    pub offset_step: f32,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            window_size: 3,
            scale_step: 0.05,
            opacity_step: 0.15,
            offset_step: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub keyword_mode: KeywordMode,
    /// Allowed keywords. Empty means free-form keywords are accepted.
    pub vocabulary: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_backend_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_backend_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub gesture: GestureConfig,
    pub stack: StackConfig,
    pub filter: FilterConfig,
    pub backend: Option<BackendConfig>,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        let config: Self = toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let g = &self.gesture;
        if !(g.hint_threshold > 0.0) {
            return Err(EngineError::Config("gesture.hint_threshold must be > 0".into()));
        }
        if !(g.commit_threshold > g.hint_threshold) {
            return Err(EngineError::Config(
                "gesture.commit_threshold must exceed gesture.hint_threshold".into(),
            ));
        }
        if !(g.velocity_threshold > 0.0) {
            return Err(EngineError::Config("gesture.velocity_threshold must be > 0".into()));
        }
        if self.stack.window_size == 0 {
            return Err(EngineError::Config("stack.window_size must be >= 1".into()));
        }
        if let Some(backend) = &self.backend {
            if backend.base_url.trim().is_empty() {
                return Err(EngineError::Config("backend.base_url must be set".into()));
            }
        }
        Ok(())
    }
}
