//! Capability surface the host scene exposes to the reveal subsystem. The
//! subsystem never sees the host's renderer or scene graph directly; it only
//! asks for poses, the viewport and a handful of optional hooks.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("renderer capability '{0}' is not available")]
    Unavailable(&'static str),
    #[error("renderer capability query failed: {0}")]
    Query(String),
}

/// Camera pose for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
}

impl CameraPose {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Renderer viewport in CSS pixels, relative to the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
            device_pixel_ratio: 1.0,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    /// Backing-store size of an overlay covering the viewport.
    pub fn physical_size(&self) -> (u32, u32) {
        let ratio = self.device_pixel_ratio.max(1.0);
        (
            (self.width * ratio).round().max(0.0) as u32,
            (self.height * ratio).round().max(0.0) as u32,
        )
    }
}

/// Geometry of the host cube that sticker placement depends on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Distance between neighbouring cubie centers.
    pub spacing: f32,
    pub cube_size: f32,
    pub camera_distance: f32,
    pub vertical_shift: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            spacing: 0.75,
            cube_size: 0.7,
            camera_distance: 6.0,
            vertical_shift: 0.25,
        }
    }
}

pub trait PoseProvider {
    fn camera_pose(&self) -> Option<CameraPose>;
    /// World transform of the cube root the tiles are attached to.
    fn cube_transform(&self) -> Option<Mat4>;
}

pub trait ViewportProvider {
    fn viewport(&self) -> Option<Viewport>;
}

pub trait HostScene: PoseProvider + ViewportProvider {
    fn scene_config(&self) -> SceneConfig {
        SceneConfig::default()
    }

    fn max_anisotropy(&self) -> Result<u32, CapabilityError> {
        Err(CapabilityError::Unavailable("max_anisotropy"))
    }

    fn autospin(&self) -> bool {
        false
    }

    fn set_autospin(&mut self, _enabled: bool) {}

    fn aim_camera(&mut self, _eye: Vec3, _target: Vec3) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_never_scales_below_css_pixels() {
        let mut viewport = Viewport::new(801.0, 600.0);
        viewport.device_pixel_ratio = 0.5;
        assert_eq!(viewport.physical_size(), (801, 600));
        viewport.device_pixel_ratio = 1.5;
        assert_eq!(viewport.physical_size(), (1202, 900));
    }

    #[test]
    fn zero_sized_viewport_is_unusable() {
        assert!(!Viewport::new(0.0, 600.0).is_usable());
        assert!(Viewport::new(1.0, 1.0).is_usable());
    }
}
