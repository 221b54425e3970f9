//! Lighting configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::Color;
use crate::error::{LightError, Result};

/// Scene-wide lighting settings shared by every light
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Colour of unlit areas, also the far colour of dynamic shadows
    pub ambient_light: Color,

    /// Height-based dynamic shadows instead of ray occlusion
    pub pseudo3d: bool,

    /// Blend dynamic shadow near colour toward ambient by overlap
    pub shadow_color_interpolation: bool,

    /// Points sampled along the far arc of circle casters
    pub circle_approx_points: usize,

    /// Soft edge length given to new lights
    pub soft_shadow_length: f32,

    /// Skip positional lights whose reach is outside the viewport
    pub culling: bool,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_light: Color::CLEAR,
            pseudo3d: false,
            shadow_color_interpolation: false,
            circle_approx_points: 32,
            soft_shadow_length: 2.5,
            culling: true,
        }
    }
}

impl LightingConfig {
    /// Dim night scene with ray-occluded lights
    pub fn night() -> Self {
        Self {
            ambient_light: Color::new(0.05, 0.05, 0.1, 0.4),
            ..Default::default()
        }
    }

    /// Daylight with height-based shadows
    pub fn pseudo3d() -> Self {
        Self {
            ambient_light: Color::new(0.1, 0.1, 0.1, 0.5),
            pseudo3d: true,
            shadow_color_interpolation: true,
            ..Default::default()
        }
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LightError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        log::info!("loaded lighting config from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Set ambient light
    pub fn with_ambient_light(mut self, color: Color) -> Self {
        self.ambient_light = color;
        self
    }

    /// Toggle pseudo-3D shadows
    pub fn with_pseudo3d(mut self, enabled: bool) -> Self {
        self.pseudo3d = enabled;
        self
    }

    pub fn with_shadow_color_interpolation(mut self, enabled: bool) -> Self {
        self.shadow_color_interpolation = enabled;
        self
    }

    pub fn with_culling(mut self, enabled: bool) -> Self {
        self.culling = enabled;
        self
    }

    pub fn with_circle_approx_points(mut self, points: usize) -> Self {
        self.circle_approx_points = points;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = LightingConfig::from_json_str(r#"{ "pseudo3d": true }"#).unwrap();
        assert!(config.pseudo3d);
        assert_eq!(config.circle_approx_points, 32);
        assert_eq!(config.soft_shadow_length, 2.5);
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let err = LightingConfig::from_json_str("{ pseudo3d: ").unwrap_err();
        assert!(matches!(err, LightError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = LightingConfig::from_json_file("/nonexistent/lights.json").unwrap_err();
        match err {
            LightError::ConfigIo { path, .. } => assert!(path.ends_with("lights.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn round_trips_through_json() {
        let config = LightingConfig::pseudo3d().with_circle_approx_points(12);
        let text = serde_json::to_string(&config).unwrap();
        let back = LightingConfig::from_json_str(&text).unwrap();
        assert_eq!(back.circle_approx_points, 12);
        assert_eq!(back.ambient_light, config.ambient_light);
    }
}
