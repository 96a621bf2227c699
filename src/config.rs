use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Runtime settings. Every field is optional in the JSON source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub frame_resources: usize,
    pub pass_count: usize,
    pub object_capacity: usize,
    pub ui_capacity: usize,
    /// In grid units.
    pub brush_radius: f32,
    /// World-space width of the map.
    pub map_extent: f32,
    pub camera_radius: f32,
    pub camera_radius_min: f32,
    pub camera_radius_max: f32,
    pub fov_y: f32,
    pub near_z: f32,
    pub far_z: f32,
    pub ambient_light: [f32; 4],
    pub fog_color: [f32; 4],
    pub fog_start: f32,
    pub fog_range: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_resources: 3,
            pass_count: 1,
            object_capacity: 32767,
            ui_capacity: 32767,
            brush_radius: 9.0,
            map_extent: 40.0,
            camera_radius: 50.0,
            camera_radius_min: 5.0,
            camera_radius_max: 150.0,
            fov_y: 0.25 * std::f32::consts::PI,
            near_z: 1.0,
            far_z: 1000.0,
            ambient_light: [0.25, 0.25, 0.35, 1.0],
            fog_color: [0.7, 0.7, 0.7, 1.0],
            fog_start: 5.0,
            fog_range: 150.0,
        }
    }
}

impl Config {
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };
        if self.frame_resources == 0 {
            return invalid("frame_resources", "at least one frame resource is required");
        }
        if self.pass_count == 0 {
            return invalid("pass_count", "must be at least 1");
        }
        if self.object_capacity == 0 {
            return invalid("object_capacity", "must be at least 1");
        }
        if self.ui_capacity == 0 {
            return invalid("ui_capacity", "must be at least 1");
        }
        if !(self.brush_radius.is_finite() && self.brush_radius > 0.0) {
            return invalid("brush_radius", "must be a positive number");
        }
        if !(self.map_extent.is_finite() && self.map_extent > 0.0) {
            return invalid("map_extent", "must be a positive number");
        }
        if !(self.camera_radius_min > 0.0 && self.camera_radius_min <= self.camera_radius_max) {
            return invalid("camera_radius_min", "must be positive and not above camera_radius_max");
        }
        if !(self.near_z > 0.0 && self.near_z < self.far_z) {
            return invalid("near_z", "must be positive and below far_z");
        }
        if !(self.fov_y > 0.0 && self.fov_y < std::f32::consts::PI) {
            return invalid("fov_y", "must be between 0 and pi");
        }
        Ok(())
    }

    /// Half-width of the map from its centre to the outermost vertex row.
    pub fn pan_limit(&self) -> f32 {
        127.5 / 256.0 * self.map_extent
    }
}
