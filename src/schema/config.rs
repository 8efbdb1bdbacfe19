//! Configuration types for replay playback and rendering.

use serde::{Deserialize, Serialize};

use super::CellVocabulary;

/// Inclusive `[min, max]` range used to clamp user-supplied values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp `value` into the range.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// When the solution overlay becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealPolicy {
    /// Draw the solution on every frame as soon as it is loaded.
    #[default]
    Always,
    /// Hold the solution back until playback reaches the last frame.
    OnFinish,
}

impl RevealPolicy {
    /// Whether the solution is shown, given whether playback has reached the last frame.
    #[inline]
    pub fn shows(self, reached_end: bool) -> bool {
        match self {
            RevealPolicy::Always => true,
            RevealPolicy::OnFinish => reached_end,
        }
    }
}

fn default_speed() -> f64 {
    60.0
}

fn default_cell_size() -> f64 {
    10.0
}

fn default_speed_bounds() -> Bounds {
    Bounds::new(1.0, 60.0)
}

fn default_cell_size_bounds() -> Bounds {
    Bounds::new(1.0, 100.0)
}

/// Top-level replay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Initial playback rate in frames per second.
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Initial cell edge length in pixels.
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,
    /// Allowed playback rates.
    #[serde(default = "default_speed_bounds")]
    pub speed_bounds: Bounds,
    /// Allowed cell sizes.
    #[serde(default = "default_cell_size_bounds")]
    pub cell_size_bounds: Bounds,
    /// Solution overlay visibility.
    #[serde(default)]
    pub reveal: RevealPolicy,
    /// Token to cell mapping used when parsing frames.
    #[serde(default)]
    pub vocabulary: CellVocabulary,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            cell_size: default_cell_size(),
            speed_bounds: default_speed_bounds(),
            cell_size_bounds: default_cell_size_bounds(),
            reveal: RevealPolicy::default(),
            vocabulary: CellVocabulary::default(),
        }
    }
}

impl ReplayConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, bounds) in [
            ("speed", self.speed_bounds),
            ("cell_size", self.cell_size_bounds),
        ] {
            if !(bounds.min.is_finite() && bounds.max.is_finite())
                || bounds.min <= 0.0
                || bounds.min > bounds.max
            {
                return Err(ConfigError::InvalidBounds {
                    name,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }
        if !self.speed_bounds.contains(self.speed) {
            return Err(ConfigError::OutOfBounds {
                name: "speed",
                value: self.speed,
            });
        }
        if !self.cell_size_bounds.contains(self.cell_size) {
            return Err(ConfigError::OutOfBounds {
                name: "cell_size",
                value: self.cell_size,
            });
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Bounds for {name} must be positive and ordered, got [{min}, {max}]")]
    InvalidBounds {
        name: &'static str,
        min: f64,
        max: f64,
    },
    #[error("Default {name} {value} lies outside its bounds")]
    OutOfBounds { name: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ReplayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.speed_bounds, Bounds::new(1.0, 60.0));
        assert_eq!(config.cell_size_bounds, Bounds::new(1.0, 100.0));
        assert_eq!(config.reveal, RevealPolicy::Always);
    }

    #[test]
    fn test_reveal_policy_shows() {
        assert!(RevealPolicy::Always.shows(false));
        assert!(RevealPolicy::Always.shows(true));
        assert!(!RevealPolicy::OnFinish.shows(false));
        assert!(RevealPolicy::OnFinish.shows(true));
    }

    #[test]
    fn test_bounds_clamp() {
        let bounds = Bounds::new(1.0, 60.0);
        assert_eq!(bounds.clamp(0.0), 1.0);
        assert_eq!(bounds.clamp(60000.0), 60.0);
        assert_eq!(bounds.clamp(12.5), 12.5);
    }

    #[test]
    fn test_invalid_bounds() {
        let config = ReplayConfig {
            speed_bounds: Bounds::new(30.0, 1.0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBounds { name: "speed", .. })
        ));

        let config = ReplayConfig {
            cell_size_bounds: Bounds::new(0.0, 100.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_out_of_bounds() {
        let config = ReplayConfig {
            cell_size: 500.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfBounds {
                name: "cell_size",
                ..
            })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ReplayConfig =
            serde_json::from_str(r#"{"speed": 5, "reveal": "on_finish"}"#).unwrap();
        assert_eq!(config.speed, 5.0);
        assert_eq!(config.cell_size, 10.0);
        assert_eq!(config.reveal, RevealPolicy::OnFinish);
        assert!(config.validate().is_ok());
    }
}
