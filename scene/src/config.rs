use embedviz::VizConfig;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::path::Path;

use crate::SceneError;
use crate::cloud::{DEFAULT_PALETTE, Rgb, parse_hex_color};
use crate::guides::guide_lines;

/// Orbit camera defaults and interaction limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// `phi` stays within `[phi_epsilon, PI - phi_epsilon]`.
    pub phi_epsilon: f32,
    /// Radians of orbit per pixel of drag.
    pub rotate_speed: f32,
    /// Relative radius change per wheel event.
    pub zoom_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            radius: 20.0,
            theta: FRAC_PI_4,
            phi: FRAC_PI_4,
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
            min_radius: 5.0,
            max_radius: 80.0,
            phi_epsilon: 0.001,
            rotate_speed: 0.005,
            zoom_step: 0.05,
        }
    }
}

impl CameraConfig {
    /// Rejects limits the orbit camera cannot honor.
    pub fn validate(&self) -> Result<(), SceneError> {
        let invalid = |reason: String| Err(SceneError::InvalidCamera(reason));
        let values = [
            self.radius,
            self.theta,
            self.phi,
            self.fov_y_degrees,
            self.near,
            self.far,
            self.min_radius,
            self.max_radius,
            self.phi_epsilon,
            self.rotate_speed,
            self.zoom_step,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return invalid("all camera values must be finite".to_string());
        }
        if self.min_radius <= 0.0 || self.radius <= 0.0 {
            return invalid(format!(
                "radius {} and min_radius {} must be positive",
                self.radius, self.min_radius
            ));
        }
        if self.min_radius > self.max_radius {
            return invalid(format!(
                "min_radius {} is larger than max_radius {}",
                self.min_radius, self.max_radius
            ));
        }
        if self.phi_epsilon <= 0.0 || self.phi_epsilon >= FRAC_PI_2 {
            return invalid(format!("phi_epsilon {} must lie in (0, pi/2)", self.phi_epsilon));
        }
        if self.near <= 0.0 || self.near >= self.far {
            return invalid(format!("near {} and far {} must satisfy 0 < near < far", self.near, self.far));
        }
        if self.fov_y_degrees <= 0.0 || self.fov_y_degrees >= 180.0 {
            return invalid(format!("fov_y_degrees {} must lie in (0, 180)", self.fov_y_degrees));
        }
        if self.zoom_step <= 0.0 || self.zoom_step >= 1.0 {
            return invalid(format!("zoom_step {} must lie in (0, 1)", self.zoom_step));
        }
        Ok(())
    }
}

/// Ground grid drawn under the cloud, in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub visible: bool,
    /// Side length of the square grid, centered on the Y axis.
    pub size: f32,
    pub divisions: u32,
    /// Height of the grid plane.
    pub y: f32,
    pub center_color: String,
    pub line_color: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            visible: true,
            size: 60.0,
            divisions: 30,
            y: -10.0,
            center_color: "#7c3aed".to_string(),
            line_color: "#2a2a3a".to_string(),
        }
    }
}

/// World axes from the origin: X red, Y green, Z blue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub visible: bool,
    pub length: f32,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            visible: true,
            length: 12.0,
        }
    }
}

/// Everything the mounted view needs: the embedding to compute and how to show it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub embedding: VizConfig,
    pub camera: CameraConfig,
    /// Largest distance from the pointer ray at which a point counts as hovered.
    pub pick_threshold: f32,
    /// Radians the point group turns about Y every frame.
    pub auto_rotate_speed: f32,
    /// Point diameter in world units.
    pub point_size: f32,
    /// `#rrggbb` colors, one per contiguous block of points.
    pub palette: Vec<String>,
    pub grid: GridConfig,
    pub axes: AxesConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            embedding: VizConfig::default(),
            camera: CameraConfig::default(),
            pick_threshold: 1.0,
            auto_rotate_speed: 0.0005,
            point_size: 0.25,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            grid: GridConfig::default(),
            axes: AxesConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the camera, the palette and the guide settings. The embedding
    /// config is checked when the pipeline runs.
    pub fn validate(&self) -> Result<(), SceneError> {
        self.camera.validate()?;
        self.palette_rgb()?;
        guide_lines(self)?;
        Ok(())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// The palette parsed into RGB triples.
    pub fn palette_rgb(&self) -> Result<Vec<Rgb>, SceneError> {
        if self.palette.is_empty() {
            return Err(SceneError::EmptyPalette);
        }
        self.palette.iter().map(|c| parse_hex_color(c)).collect()
    }
}
