use glam::{Mat4, Vec3};

use crate::projector::Ray;
use crate::tiles::{TileId, TileRegistry};
use crate::visibility::VisibilityEngine;

/// Distance along `dir` at which the ray crosses the front of a tile quad.
/// The quad lies in the local XY plane of `world`, facing local +Z, with
/// half-size `half_extent`. Rays arriving from behind miss.
pub fn ray_hits_quad(origin: Vec3, dir: Vec3, world: Mat4, half_extent: f32) -> Option<f32> {
    let inv = world.inverse();
    let o_local = inv.transform_point3(origin);
    let d_local = inv.transform_vector3(dir);
    if !o_local.is_finite() || !d_local.is_finite() {
        return None;
    }
    if o_local.z <= 0.0 || d_local.z >= 0.0 {
        return None;
    }
    let t = -o_local.z / d_local.z;
    if t < 0.0 {
        return None;
    }
    let hit = o_local + d_local * t;
    if hit.x.abs() <= half_extent && hit.y.abs() <= half_extent {
        Some(t)
    } else {
        None
    }
}

/// Nearest interactive tile under `ray`, at each tile's current scale.
pub fn pick_tile(
    ray: &Ray,
    registry: &TileRegistry,
    visibility: &VisibilityEngine,
    cube: Mat4,
    half_extent: f32,
) -> Option<TileId> {
    registry
        .iter()
        .filter(|tile| visibility.is_interactive(tile.id))
        .filter_map(|tile| {
            let world = tile.world_transform(cube, visibility.scale(tile.id));
            ray_hits_quad(ray.origin, ray.direction, world, half_extent).map(|t| (tile.id, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverChange {
    Entered(TileId),
    Left(TileId),
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    hovered: Option<TileId>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<TileId> {
        self.hovered
    }

    pub fn update_hover(&mut self, hit: Option<TileId>) -> HoverChange {
        if hit == self.hovered {
            return HoverChange::Unchanged;
        }
        let previous = std::mem::replace(&mut self.hovered, hit);
        match (hit, previous) {
            (Some(tile), _) => HoverChange::Entered(tile),
            (None, Some(tile)) => HoverChange::Left(tile),
            (None, None) => HoverChange::Unchanged,
        }
    }

    /// Action URI of the hovered tile, if it has one.
    pub fn click_action(&self, registry: &TileRegistry) -> Option<String> {
        let tile = registry.get(self.hovered?)?;
        tile.content.action.clone()
    }

    pub fn reset(&mut self) {
        self.hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TileConfig, VisibilityConfig};
    use crate::host::SceneConfig;
    use cube_content::{ContentTable, Face};

    #[test]
    fn quad_is_hit_from_the_front_only() {
        let world = Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0));
        let t = ray_hits_quad(Vec3::new(0.1, 0.1, 6.0), Vec3::NEG_Z, world, 0.25).unwrap();
        assert!((t - 5.0).abs() < 1e-5);
        assert!(ray_hits_quad(Vec3::new(0.0, 0.0, -6.0), Vec3::Z, world, 0.25).is_none());
        assert!(ray_hits_quad(Vec3::new(0.3, 0.0, 6.0), Vec3::NEG_Z, world, 0.25).is_none());
    }

    #[test]
    fn scaled_quad_grows_its_hit_area() {
        let world = Mat4::from_scale(Vec3::new(2.0, 2.0, 1.0));
        assert!(ray_hits_quad(Vec3::new(0.4, 0.0, 3.0), Vec3::NEG_Z, world, 0.25).is_some());
    }

    #[test]
    fn picks_the_front_center_tile() {
        let tiles = TileConfig::default();
        let registry = TileRegistry::build(&ContentTable::builtin(), &SceneConfig::default(), &tiles);
        let mut visibility = VisibilityEngine::new(VisibilityConfig::default(), registry.len());
        let camera = Vec3::new(0.0, 0.0, 6.0);
        let ray = Ray {
            origin: camera,
            direction: Vec3::NEG_Z,
        };
        // nothing is interactive before the first fade-in
        assert_eq!(pick_tile(&ray, &registry, &visibility, Mat4::IDENTITY, tiles.half_extent()), None);
        for _ in 0..30 {
            visibility.update(&registry, Mat4::IDENTITY, camera);
        }
        let hit = pick_tile(&ray, &registry, &visibility, Mat4::IDENTITY, tiles.half_extent());
        assert_eq!(hit, registry.find(Face::Product, 4).map(|tile| tile.id));
    }

    #[test]
    fn hover_reports_transitions_once() {
        let mut router = InputRouter::new();
        assert_eq!(router.update_hover(None), HoverChange::Unchanged);
        assert_eq!(router.update_hover(Some(TileId(3))), HoverChange::Entered(TileId(3)));
        assert_eq!(router.update_hover(Some(TileId(3))), HoverChange::Unchanged);
        assert_eq!(router.update_hover(Some(TileId(7))), HoverChange::Entered(TileId(7)));
        assert_eq!(router.update_hover(None), HoverChange::Left(TileId(7)));
        assert_eq!(router.update_hover(None), HoverChange::Unchanged);
    }

    #[test]
    fn click_returns_hovered_action() {
        let registry = TileRegistry::build(
            &ContentTable::builtin(),
            &SceneConfig::default(),
            &TileConfig::default(),
        );
        let with_action = registry
            .iter()
            .find(|tile| tile.content.action.is_some())
            .map(|tile| (tile.id, tile.content.action.clone()))
            .expect("builtin table has an action");
        let mut router = InputRouter::new();
        assert_eq!(router.click_action(&registry), None);
        router.update_hover(Some(with_action.0));
        assert_eq!(router.click_action(&registry), with_action.1);
    }
}
