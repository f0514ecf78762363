use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::Serialize;

use crate::host::{CameraPose, Viewport};

/// Point in viewport pixels (origin top-left) plus its NDC depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl ScreenPoint {
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Maps world points to viewport pixels for one camera pose and viewport.
/// Rebuild it whenever either changes.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    view_projection: Mat4,
    camera_position: Vec3,
    viewport: Viewport,
}

impl Projector {
    pub fn new(camera: &CameraPose, viewport: Viewport) -> Option<Self> {
        if !viewport.is_usable() {
            return None;
        }
        Some(Self {
            view_projection: camera.view_projection(),
            camera_position: camera.position,
            viewport,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn project(&self, position: Vec3) -> Option<ScreenPoint> {
        let clip = self.view_projection * position.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !ndc.x.is_finite() || !ndc.y.is_finite() {
            return None;
        }
        Some(ScreenPoint {
            x: (ndc.x * 0.5 + 0.5) * self.viewport.width,
            y: (-ndc.y * 0.5 + 0.5) * self.viewport.height,
            depth: ndc.z,
        })
    }

    /// Ray from the camera through a page-space pointer position.
    pub fn pointer_ray(&self, client_x: f32, client_y: f32) -> Option<Ray> {
        let x = (client_x - self.viewport.left) / self.viewport.width * 2.0 - 1.0;
        let y = -((client_y - self.viewport.top) / self.viewport.height) * 2.0 + 1.0;
        let inverse = self.view_projection.inverse();
        // NDC depth 0 is in front of the camera for both GL and zero-to-one depth ranges
        let probe = inverse * Vec4::new(x, y, 0.0, 1.0);
        if probe.w.abs() <= f32::EPSILON {
            return None;
        }
        let probe = probe.truncate() / probe.w;
        let direction = (probe - self.camera_position).normalize_or_zero();
        if direction == Vec3::ZERO || !direction.is_finite() {
            return None;
        }
        Some(Ray {
            origin: self.camera_position,
            direction,
        })
    }
}
