//! Sticker placement. Tiles sit just outside the outer cubie faces, nine per
//! face, and keep their local transform for the whole session.

use std::f32::consts::FRAC_PI_2;
use std::f32::consts::PI;
use std::fmt;

use cube_content::{ContentEntry, ContentTable, Face};
use glam::{Mat4, Quat, Vec3};
use serde::Serialize;

use crate::config::TileConfig;
use crate::host::SceneConfig;

/// Index of a tile in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TileId(pub usize);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Tile {
    pub id: TileId,
    pub face: Face,
    pub column: i8,
    pub row: i8,
    pub slot: usize,
    pub content: ContentEntry,
    pub position: Vec3,
    pub rotation: Quat,
    local: Mat4,
}

impl Tile {
    /// World transform with the visibility pulse applied to the plane axes.
    pub fn world_transform(&self, cube: Mat4, scale: f32) -> Mat4 {
        cube * self.local * Mat4::from_scale(Vec3::new(scale, scale, 1.0))
    }

    pub fn world_position(&self, cube: Mat4) -> Vec3 {
        cube.transform_point3(self.position)
    }

    pub fn describe(&self) -> String {
        format!("{} slot {} ({})", self.face, self.slot, self.content.title)
    }
}

/// Slot order within a face: top row first, each row left to right.
pub fn slot_grid() -> impl Iterator<Item = (usize, i8, i8)> {
    (0..9).map(|slot| {
        let row = 1 - (slot / 3) as i8;
        let column = (slot % 3) as i8 - 1;
        (slot, column, row)
    })
}

/// Position and orientation of a sticker relative to the cube root. The
/// plane's +Z axis points away from the cube.
pub fn sticker_transform(
    face: Face,
    column: i8,
    row: i8,
    scene: &SceneConfig,
    tiles: &TileConfig,
) -> (Vec3, Quat) {
    let gap = scene.spacing;
    let out = scene.spacing + scene.cube_size * 0.5 + tiles.surface_gap;
    let c = column as f32 * gap;
    let r = row as f32 * gap;
    match face {
        Face::Product => (Vec3::new(c, r, out), Quat::IDENTITY),
        Face::Contact => (Vec3::new(-c, r, -out), Quat::from_rotation_y(PI)),
        Face::Tech => (Vec3::new(out, r, -c), Quat::from_rotation_y(FRAC_PI_2)),
        Face::Virtues => (Vec3::new(-out, r, c), Quat::from_rotation_y(-FRAC_PI_2)),
        Face::Up => (Vec3::new(c, out, -r), Quat::from_rotation_x(-FRAC_PI_2)),
        Face::Down => (Vec3::new(c, -out, r), Quat::from_rotation_x(FRAC_PI_2)),
    }
}

#[derive(Debug, Clone, Default)]
pub struct TileRegistry {
    tiles: Vec<Tile>,
}

impl TileRegistry {
    pub fn build(table: &ContentTable, scene: &SceneConfig, config: &TileConfig) -> Self {
        let mut tiles = Vec::with_capacity(Face::ALL.len() * 9);
        for face in Face::ALL {
            for (slot, column, row) in slot_grid() {
                let content = table
                    .entry(face, slot)
                    .cloned()
                    .unwrap_or_else(ContentEntry::placeholder);
                let (position, rotation) = sticker_transform(face, column, row, scene, config);
                tiles.push(Tile {
                    id: TileId(tiles.len()),
                    face,
                    column,
                    row,
                    slot,
                    content,
                    position,
                    rotation,
                    local: Mat4::from_rotation_translation(rotation, position),
                });
            }
        }
        Self { tiles }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn find(&self, face: Face, slot: usize) -> Option<&Tile> {
        self.tiles
            .iter()
            .find(|tile| tile.face == face && tile.slot == slot)
    }

    pub fn on_face(&self, face: Face) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(move |tile| tile.face == face)
    }
}
