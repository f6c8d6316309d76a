use crate::entity::{DEFAULT_MOVE_SPEED, DEFAULT_ROTATE_SPEED, EntityBuilder};
use antler_input::KeyBindings;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("frame.max_elapsed_ms must be finite and non-negative, got {0}")]
    MaxElapsed(f32),
}

/// Speeds applied to keyboard-controlled entities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Units per second.
    pub move_speed: f32,
    /// Radians per second.
    pub rotate_speed: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: DEFAULT_MOVE_SPEED,
            rotate_speed: DEFAULT_ROTATE_SPEED,
        }
    }
}

/// Frame pacing for interactive hosts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Upper bound on the elapsed time fed to a single update, so a stalled
    /// frame does not teleport controlled entities.
    pub max_elapsed_ms: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_elapsed_ms: 100.0,
        }
    }
}

impl FrameConfig {
    /// Bound `elapsed_ms` to `[0, max_elapsed_ms]`. Non-finite input maps to
    /// zero, and so does every input when the cap itself is negative or NaN.
    pub fn clamp_elapsed(&self, elapsed_ms: f32) -> f32 {
        if !elapsed_ms.is_finite() {
            return 0.0;
        }
        let cap = if self.max_elapsed_ms >= 0.0 {
            self.max_elapsed_ms
        } else {
            0.0
        };
        elapsed_ms.max(0.0).min(cap)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_elapsed_ms.is_finite() && self.max_elapsed_ms >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::MaxElapsed(self.max_elapsed_ms))
        }
    }
}

/// Top-level engine configuration, loaded from YAML.
///
/// Every section is optional; missing sections and fields take their
/// defaults.
///
/// ```yaml
/// movement:
///   move_speed: 5.0
/// bindings:
///   87: forward
///   32: up
/// frame:
///   max_elapsed_ms: 50
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub movement: MovementConfig,
    pub bindings: KeyBindings,
    pub frame: FrameConfig,
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.frame.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.display(), bindings = config.bindings.len(), "config loaded");
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Builder pre-loaded with the configured movement speeds.
    pub fn entity_builder(&self) -> EntityBuilder {
        EntityBuilder::new()
            .move_speed(self.movement.move_speed)
            .rotate_speed(self.movement.rotate_speed)
    }
}
