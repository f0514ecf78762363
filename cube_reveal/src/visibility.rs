//! Per-frame facing estimate for every tile. Tiles turned toward the camera
//! fade in, everything else fades out; nothing persists beyond the smoothed
//! opacity of the previous frame.

use glam::{Mat4, Vec3};

use crate::config::VisibilityConfig;
use crate::tiles::{TileId, TileRegistry};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileVisibility {
    pub opacity: f32,
    pub scale: f32,
    pub facing: f32,
}

impl Default for TileVisibility {
    fn default() -> Self {
        Self {
            opacity: 0.0,
            scale: 1.0,
            facing: -1.0,
        }
    }
}

/// Cosine between the plane's outward normal and the direction to the camera.
pub fn facing_score(world: Mat4, camera_position: Vec3) -> f32 {
    let normal = world.transform_vector3(Vec3::Z).normalize_or_zero();
    let to_camera = (camera_position - world.transform_point3(Vec3::ZERO)).normalize_or_zero();
    normal.dot(to_camera)
}

/// One exponential smoothing step toward `target`, clamped to [0, 1].
pub fn step_opacity(current: f32, target: f32, rate: f32) -> f32 {
    let current = if current.is_finite() { current.clamp(0.0, 1.0) } else { 0.0 };
    (current + (target - current) * rate).clamp(0.0, 1.0)
}

#[derive(Debug, Clone)]
pub struct VisibilityEngine {
    config: VisibilityConfig,
    states: Vec<TileVisibility>,
}

impl VisibilityEngine {
    pub fn new(config: VisibilityConfig, tile_count: usize) -> Self {
        Self {
            config,
            states: vec![TileVisibility::default(); tile_count],
        }
    }

    pub fn update(&mut self, registry: &TileRegistry, cube: Mat4, camera_position: Vec3) {
        if self.states.len() != registry.len() {
            self.states.resize(registry.len(), TileVisibility::default());
        }
        for tile in registry.iter() {
            let state = &mut self.states[tile.id.0];
            let facing = facing_score(tile.world_transform(cube, 1.0), camera_position);
            let target = if facing > self.config.facing_threshold { 1.0 } else { 0.0 };
            let opacity = step_opacity(state.opacity, target, self.config.fade_rate);
            *state = TileVisibility {
                opacity,
                scale: 1.0 + self.config.scale_pulse * opacity,
                facing,
            };
        }
    }

    pub fn state(&self, id: TileId) -> TileVisibility {
        self.states.get(id.0).copied().unwrap_or_default()
    }

    pub fn opacity(&self, id: TileId) -> f32 {
        self.state(id).opacity
    }

    pub fn scale(&self, id: TileId) -> f32 {
        self.state(id).scale
    }

    /// Hidden tiles are skipped by rendering and hit testing.
    pub fn is_interactive(&self, id: TileId) -> bool {
        self.opacity(id) > self.config.interactive_floor
    }

    pub fn opacities(&self) -> impl ExactSizeIterator<Item = f32> + '_ {
        self.states.iter().map(|state| state.opacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TileConfig;
    use crate::host::SceneConfig;
    use cube_content::{ContentTable, Face};

    #[test]
    fn opacity_converges_to_one_without_overshoot() {
        let mut opacity = 0.0;
        let mut previous = opacity;
        for _ in 0..200 {
            opacity = step_opacity(opacity, 1.0, 0.22);
            assert!(opacity >= previous);
            assert!(opacity <= 1.0);
            previous = opacity;
        }
        assert!(opacity > 0.999);
    }

    #[test]
    fn opacity_is_clamped_even_from_bad_state() {
        assert_eq!(step_opacity(3.0, 1.0, 0.22), 1.0);
        assert_eq!(step_opacity(-2.0, 0.0, 0.22), 0.0);
        assert_eq!(step_opacity(f32::NAN, 0.0, 0.22), 0.0);
    }

    #[test]
    fn front_face_fades_in_and_back_face_stays_hidden() {
        let registry = TileRegistry::build(
            &ContentTable::builtin(),
            &SceneConfig::default(),
            &TileConfig::default(),
        );
        let mut engine = VisibilityEngine::new(VisibilityConfig::default(), registry.len());
        let camera = Vec3::new(0.0, 0.0, 6.0);
        for _ in 0..60 {
            engine.update(&registry, Mat4::IDENTITY, camera);
        }

        let front = registry.find(Face::Product, 4).unwrap().id;
        let back = registry.find(Face::Contact, 4).unwrap().id;
        let side = registry.find(Face::Tech, 4).unwrap().id;
        assert!(engine.opacity(front) > 0.99);
        assert!((engine.scale(front) - 1.06).abs() < 1e-3);
        assert!(engine.is_interactive(front));
        assert_eq!(engine.opacity(back), 0.0);
        assert!(!engine.is_interactive(back));
        // edge-on faces fall below the frontal threshold
        assert_eq!(engine.opacity(side), 0.0);
    }

    #[test]
    fn rotating_the_cube_swaps_visible_faces() {
        let registry = TileRegistry::build(
            &ContentTable::builtin(),
            &SceneConfig::default(),
            &TileConfig::default(),
        );
        let mut engine = VisibilityEngine::new(VisibilityConfig::default(), registry.len());
        let camera = Vec3::new(0.0, 0.0, 6.0);
        // +X face turned toward the camera
        let cube = Mat4::from_rotation_y(-std::f32::consts::FRAC_PI_2);
        for _ in 0..60 {
            engine.update(&registry, cube, camera);
        }
        let tech = registry.find(Face::Tech, 4).unwrap().id;
        let product = registry.find(Face::Product, 4).unwrap().id;
        assert!(engine.opacity(tech) > 0.99);
        assert!(engine.opacity(product) < 0.01);
    }
}
