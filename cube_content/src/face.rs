use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the six outward faces of the cube.
///
/// The declaration order is the face index used by the host geometry
/// (+X, -X, +Y, -Y, +Z, -Z) and therefore also the order in which tiles are
/// created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Face {
    Tech,
    Virtues,
    Up,
    Down,
    Product,
    Contact,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Tech,
        Face::Virtues,
        Face::Up,
        Face::Down,
        Face::Product,
        Face::Contact,
    ];

    /// Geometry index of the face: 0 = +X, 1 = -X, 2 = +Y, 3 = -Y, 4 = +Z, 5 = -Z.
    pub fn index(self) -> usize {
        match self {
            Face::Tech => 0,
            Face::Virtues => 1,
            Face::Up => 2,
            Face::Down => 3,
            Face::Product => 4,
            Face::Contact => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn key(self) -> &'static str {
        match self {
            Face::Tech => "TECH",
            Face::Virtues => "VIRTUES",
            Face::Up => "UP",
            Face::Down => "DOWN",
            Face::Product => "PRODUCT",
            Face::Contact => "CONTACT",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|face| face.key().eq_ignore_ascii_case(key))
    }

    /// Connector color used while a tile of this face is highlighted.
    pub fn thread_color(self) -> Rgba {
        match self {
            Face::Virtues => Rgba::new(143, 214, 203, 0.98),
            Face::Tech => Rgba::new(117, 184, 209, 0.98),
            Face::Product => Rgba::new(255, 205, 102, 0.95),
            Face::Contact => Rgba::new(205, 130, 255, 0.95),
            Face::Up => Rgba::new(180, 180, 180, 0.95),
            Face::Down => Rgba::new(120, 120, 120, 0.95),
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Fallback connector color when no face applies.
pub const DEFAULT_THREAD_COLOR: Rgba = Rgba::new(143, 214, 203, 0.98);

/// 8-bit RGB with a floating point alpha, matching CSS `rgba()` notation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_css(self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let alpha = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
        [self.r, self.g, self.b, alpha]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_through_all_faces() {
        for (position, face) in Face::ALL.into_iter().enumerate() {
            assert_eq!(face.index(), position);
            assert_eq!(Face::from_index(position), Some(face));
        }
        assert_eq!(Face::from_index(6), None);
    }

    #[test]
    fn keys_are_case_insensitive() {
        assert_eq!(Face::from_key("tech"), Some(Face::Tech));
        assert_eq!(Face::from_key("CONTACT"), Some(Face::Contact));
        assert_eq!(Face::from_key("sideways"), None);
    }

    #[test]
    fn css_color_matches_page_palette() {
        assert_eq!(Face::Tech.thread_color().to_css(), "rgba(117,184,209,0.98)");
        assert_eq!(DEFAULT_THREAD_COLOR.to_rgba8(), [143, 214, 203, 250]);
    }
}
