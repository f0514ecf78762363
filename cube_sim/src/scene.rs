use std::time::Duration;

use cube_reveal::{
    CameraPose, CapabilityError, HostScene, PoseProvider, SceneConfig, Viewport, ViewportProvider,
};
use glam::{Mat4, Quat, Vec3};

/// Largest frame delta the spin integrates, in seconds.
pub const MAX_FRAME_DELTA: f32 = 0.05;
pub const SPIN_SPEED: f32 = 0.52;
pub const FIELD_OF_VIEW_DEGREES: f32 = 45.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

pub fn spin_axis() -> Vec3 {
    Vec3::new(0.26, 1.0, -0.18).normalize()
}

/// Stand-in for the page's rotating cube: a spinning cube root, a fixed
/// perspective camera and a viewport, all of which only appear once the
/// scene has "loaded".
#[derive(Debug, Clone)]
pub struct SimulatedCube {
    scene: SceneConfig,
    viewport: Viewport,
    ready_at: Duration,
    elapsed: Duration,
    angle: f32,
    autospin: bool,
    eye: Vec3,
    target: Vec3,
    max_anisotropy: Option<u32>,
}

impl SimulatedCube {
    pub fn new(scene: SceneConfig, viewport: Viewport, ready_at: Duration) -> Self {
        let d = scene.camera_distance;
        Self {
            eye: Vec3::new(d, d + scene.vertical_shift, d),
            target: Vec3::new(0.0, scene.vertical_shift, 0.0),
            scene,
            viewport,
            ready_at,
            elapsed: Duration::ZERO,
            angle: 0.0,
            autospin: true,
            max_anisotropy: None,
        }
    }

    pub fn with_max_anisotropy(mut self, value: Option<u32>) -> Self {
        self.max_anisotropy = value;
        self
    }

    pub fn is_ready(&self) -> bool {
        self.elapsed >= self.ready_at
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Advances the clock and, while autospin is on, the cube rotation.
    pub fn step(&mut self, delta: Duration) {
        self.elapsed += delta;
        let dt = delta.as_secs_f32().clamp(0.0, MAX_FRAME_DELTA);
        if self.autospin {
            self.angle = (self.angle + SPIN_SPEED * dt) % std::f32::consts::TAU;
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    fn root_transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(
            Quat::from_axis_angle(spin_axis(), self.angle),
            Vec3::new(0.0, self.scene.vertical_shift, 0.0),
        )
    }
}

impl PoseProvider for SimulatedCube {
    fn camera_pose(&self) -> Option<CameraPose> {
        if !self.is_ready() {
            return None;
        }
        Some(CameraPose {
            position: self.eye,
            view: Mat4::look_at_rh(self.eye, self.target, Vec3::Y),
            projection: Mat4::perspective_rh_gl(
                FIELD_OF_VIEW_DEGREES.to_radians(),
                self.viewport.aspect_ratio(),
                NEAR,
                FAR,
            ),
        })
    }

    fn cube_transform(&self) -> Option<Mat4> {
        self.is_ready().then(|| self.root_transform())
    }
}

impl ViewportProvider for SimulatedCube {
    fn viewport(&self) -> Option<Viewport> {
        self.is_ready().then_some(self.viewport)
    }
}

impl HostScene for SimulatedCube {
    fn scene_config(&self) -> SceneConfig {
        self.scene
    }

    fn max_anisotropy(&self) -> Result<u32, CapabilityError> {
        self.max_anisotropy
            .ok_or(CapabilityError::Unavailable("max_anisotropy"))
    }

    fn autospin(&self) -> bool {
        self.autospin
    }

    fn set_autospin(&mut self, enabled: bool) {
        log::info!("autospin: {enabled}");
        self.autospin = enabled;
    }

    fn aim_camera(&mut self, eye: Vec3, target: Vec3) {
        self.eye = eye;
        self.target = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(ready_ms: u64) -> SimulatedCube {
        SimulatedCube::new(
            SceneConfig::default(),
            Viewport::new(1280.0, 720.0),
            Duration::from_millis(ready_ms),
        )
    }

    #[test]
    fn nothing_is_exposed_before_ready() {
        let mut cube = scene(500);
        assert!(cube.camera_pose().is_none());
        assert!(cube.cube_transform().is_none());
        cube.step(Duration::from_millis(500));
        assert!(cube.viewport().is_some());
        let root = cube.cube_transform().unwrap();
        assert!((root.transform_point3(Vec3::ZERO) - Vec3::new(0.0, 0.25, 0.0)).length() < 1e-6);
    }

    #[test]
    fn long_frames_are_clamped_and_autospin_can_stop() {
        let mut cube = scene(0);
        cube.step(Duration::from_secs(1));
        assert!((cube.angle() - SPIN_SPEED * MAX_FRAME_DELTA).abs() < 1e-6);
        cube.set_autospin(false);
        cube.step(Duration::from_millis(16));
        assert!((cube.angle() - SPIN_SPEED * MAX_FRAME_DELTA).abs() < 1e-6);
    }

    #[test]
    fn spin_keeps_the_axis_fixed() {
        let mut cube = scene(0);
        for _ in 0..40 {
            cube.step(Duration::from_millis(16));
        }
        let root = cube.cube_transform().unwrap();
        let moved = root.transform_vector3(spin_axis());
        assert!((moved - spin_axis()).length() < 1e-5);
    }

    #[test]
    fn camera_starts_above_the_cube() {
        let cube = scene(0);
        let pose = cube.camera_pose().unwrap();
        assert_eq!(pose.position, Vec3::new(6.0, 6.25, 6.0));
        assert!(cube.max_anisotropy().is_err());
    }
}
