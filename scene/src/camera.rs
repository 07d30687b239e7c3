use glam::{Mat4, Vec3};
use std::f32::consts::PI;

use crate::config::CameraConfig;
use crate::picking::Ray;
use crate::state::Viewport;

/// Perspective camera on a sphere around the origin, always looking at it.
///
/// `theta` is the azimuth in the XZ plane and `phi` the polar angle from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    min_radius: f32,
    max_radius: f32,
    phi_epsilon: f32,
    rotate_speed: f32,
    zoom_step: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 1.0)
    }
}

impl OrbitCamera {
    /// Builds a camera from a config that passed [`CameraConfig::validate`].
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            radius: config.radius,
            theta: config.theta,
            phi: config.phi,
            fov_y: config.fov_y_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
            min_radius: config.min_radius,
            max_radius: config.max_radius,
            phi_epsilon: config.phi_epsilon,
            rotate_speed: config.rotate_speed,
            zoom_step: config.zoom_step,
        };
        camera.clamp();
        camera
    }

    pub fn radius_bounds(&self) -> (f32, f32) {
        (self.min_radius, self.max_radius)
    }

    pub fn phi_bounds(&self) -> (f32, f32) {
        (self.phi_epsilon, PI - self.phi_epsilon)
    }

    /// World position from the spherical coordinates.
    pub fn position(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(
            self.radius * sin_phi * cos_theta,
            self.radius * cos_phi,
            self.radius * sin_phi * sin_theta,
        )
    }

    /// Applies a pointer drag of `(dx, dy)` pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.theta -= dx * self.rotate_speed;
        self.phi -= dy * self.rotate_speed;
        self.clamp();
    }

    /// Applies one wheel event: positive `delta_y` moves away, anything else closer.
    pub fn zoom(&mut self, delta_y: f32) {
        let factor = if delta_y > 0.0 { 1.0 + self.zoom_step } else { 1.0 - self.zoom_step };
        self.radius *= factor;
        self.clamp();
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    // Not `f32::clamp`, which panics on unordered bounds.
    fn clamp(&mut self) {
        let (lo, hi) = self.phi_bounds();
        self.phi = self.phi.max(lo).min(hi);
        self.radius = self.radius.max(self.min_radius).min(self.max_radius);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    /// OpenGL clip space: depth in `[-1, 1]`.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World point to normalized device coordinates and clip-space `w`.
    ///
    /// `None` when the point is at or behind the camera plane.
    pub fn project(&self, world: Vec3) -> Option<(Vec3, f32)> {
        project_with(&self.view_projection(), world)
    }

    /// Ray from the camera through a point given in normalized device coordinates.
    pub fn ray_through(&self, ndc: [f32; 2]) -> Ray {
        let origin = self.position();
        let inverse = self.view_projection().inverse();
        let target = inverse.project_point3(Vec3::new(ndc[0], ndc[1], 0.5));
        let direction = (target - origin).normalize_or_zero();
        Ray {
            origin,
            direction: if direction == Vec3::ZERO { -origin.normalize_or_zero() } else { direction },
        }
    }

    /// Pixel radius of a sphere of `world_size` diameter seen at clip-space depth `w`.
    pub fn screen_size(&self, world_size: f32, w: f32, viewport: Viewport) -> f32 {
        let f = 1.0 / (self.fov_y / 2.0).tan();
        world_size * f * viewport.height / (2.0 * w.max(1e-6))
    }
}

/// Projects `world` with a precomputed view-projection matrix.
pub fn project_with(view_projection: &Mat4, world: Vec3) -> Option<(Vec3, f32)> {
    let clip = *view_projection * world.extend(1.0);
    if clip.w <= 1e-6 {
        return None;
    }
    Some((clip.truncate() / clip.w, clip.w))
}

/// Normalized device coordinates to pixel coordinates with Y pointing down.
pub fn ndc_to_screen(ndc: [f32; 2], viewport: Viewport) -> [f32; 2] {
    [
        (ndc[0] * 0.5 + 0.5) * viewport.width,
        (-ndc[1] * 0.5 + 0.5) * viewport.height,
    ]
}
