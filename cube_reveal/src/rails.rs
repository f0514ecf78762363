//! Side-docked history of recent highlights. Each of the four docks keeps a
//! bounded queue of cards, oldest evicted first, and the docks are laid out
//! around the page footer.

use std::collections::VecDeque;
use std::fmt;

use glam::Vec2;
use serde::Serialize;

use crate::config::RailConfig;
use crate::host::Viewport;
use crate::projector::ScreenPoint;
use crate::tiles::{Tile, TileId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RailSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl RailSide {
    pub const ALL: [RailSide; 4] = [RailSide::Left, RailSide::Right, RailSide::Top, RailSide::Bottom];

    fn index(self) -> usize {
        match self {
            RailSide::Left => 0,
            RailSide::Right => 1,
            RailSide::Top => 2,
            RailSide::Bottom => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RailSide::Left => "left",
            RailSide::Right => "right",
            RailSide::Top => "top",
            RailSide::Bottom => "bottom",
        }
    }
}

impl fmt::Display for RailSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dock for a tile projected at `screen`. The dominant axis of its offset
/// from the viewport center wins; ties go to top/bottom.
pub fn pick_side(screen: ScreenPoint, viewport: &Viewport) -> RailSide {
    let offset = screen.to_vec2() - Vec2::from(viewport.center());
    if offset.x.abs() > offset.y.abs() {
        if offset.x < 0.0 { RailSide::Left } else { RailSide::Right }
    } else if offset.y < 0.0 {
        RailSide::Top
    } else {
        RailSide::Bottom
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RailCard {
    pub tile: TileId,
    pub icon: String,
    pub title: String,
    pub subtitle: String,
}

impl RailCard {
    pub fn for_tile(tile: &Tile) -> Self {
        let icon = if tile.content.icon.is_empty() {
            "•".to_string()
        } else {
            tile.content.icon.clone()
        };
        Self {
            tile: tile.id,
            icon,
            title: tile.content.title.clone(),
            subtitle: tile.content.description.clone(),
        }
    }
}

/// Bounded FIFO of recent highlights for one side.
#[derive(Debug, Clone, Serialize)]
pub struct Rail {
    side: RailSide,
    capacity: usize,
    cards: VecDeque<RailCard>,
}

impl Rail {
    pub fn new(side: RailSide, capacity: usize) -> Self {
        Self {
            side,
            capacity: capacity.max(1),
            cards: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn side(&self) -> RailSide {
        self.side
    }

    /// Appends `card`, returning the evicted oldest card when over capacity.
    pub fn push(&mut self, card: RailCard) -> Option<RailCard> {
        self.cards.push_back(card);
        if self.cards.len() > self.capacity {
            self.cards.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> impl ExactSizeIterator<Item = &RailCard> {
        self.cards.iter()
    }

    pub fn newest(&self) -> Option<&RailCard> {
        self.cards.back()
    }
}

/// CSS offsets for the four docks so none of them overlaps the footer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DockLayout {
    pub footer_height: f32,
    /// Left/right docks sit at `50% - side_lift` from the top.
    pub side_lift: f32,
    pub bottom_offset: f32,
    pub top_offset: f32,
    pub side_max_height: f32,
}

#[derive(Debug, Clone)]
pub struct RailManager {
    config: RailConfig,
    rails: [Rail; 4],
    layout: DockLayout,
}

impl RailManager {
    pub fn new(config: RailConfig) -> Self {
        let rails = RailSide::ALL.map(|side| Rail::new(side, config.capacity));
        let layout = compute_layout(&config, config.default_footer_height, 0.0);
        Self {
            config,
            rails,
            layout,
        }
    }

    pub fn rail(&self, side: RailSide) -> &Rail {
        &self.rails[side.index()]
    }

    pub fn rails(&self) -> impl Iterator<Item = &Rail> {
        self.rails.iter()
    }

    pub fn push_to_side(&mut self, side: RailSide, card: RailCard) {
        if let Some(evicted) = self.rails[side.index()].push(card) {
            log::trace!("rail {side} evicted {}", evicted.title);
        }
    }

    pub fn layout(&self) -> DockLayout {
        self.layout
    }

    /// Re-lays out the docks for a measured footer height. `None` means the
    /// host has no footer and the default height is assumed.
    pub fn adjust_for_footer(&mut self, footer_height: Option<f32>, viewport_height: f32) -> DockLayout {
        let footer = footer_height
            .filter(|height| height.is_finite() && *height >= 0.0)
            .unwrap_or(self.config.default_footer_height);
        self.layout = compute_layout(&self.config, footer, viewport_height);
        self.layout
    }

    pub fn footer_height(&self) -> f32 {
        self.layout.footer_height
    }
}

fn compute_layout(config: &RailConfig, footer_height: f32, viewport_height: f32) -> DockLayout {
    let pad = config.min_footer_pad.max(footer_height + config.footer_gap);
    DockLayout {
        footer_height,
        side_lift: pad,
        bottom_offset: pad,
        top_offset: config.top_offset,
        side_max_height: (viewport_height - (footer_height + config.side_reserve)).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(n: usize) -> RailCard {
        RailCard {
            tile: TileId(n),
            icon: "•".into(),
            title: format!("card {n}"),
            subtitle: String::new(),
        }
    }

    fn at(x: f32, y: f32) -> ScreenPoint {
        ScreenPoint { x, y, depth: 0.0 }
    }

    #[test]
    fn seventh_push_evicts_the_oldest() {
        let mut rails = RailManager::new(RailConfig::default());
        for n in 0..7 {
            rails.push_to_side(RailSide::Left, card(n));
        }
        let left = rails.rail(RailSide::Left);
        assert_eq!(left.len(), 6);
        assert_eq!(left.cards().next().map(|c| c.tile), Some(TileId(1)));
        assert_eq!(left.newest().map(|c| c.tile), Some(TileId(6)));
        assert!(rails.rail(RailSide::Right).is_empty());
    }

    #[test]
    fn side_follows_dominant_axis() {
        let viewport = Viewport::new(800.0, 600.0);
        assert_eq!(pick_side(at(100.0, 320.0), &viewport), RailSide::Left);
        assert_eq!(pick_side(at(700.0, 280.0), &viewport), RailSide::Right);
        assert_eq!(pick_side(at(420.0, 50.0), &viewport), RailSide::Top);
        assert_eq!(pick_side(at(380.0, 590.0), &viewport), RailSide::Bottom);
        // equal offsets resolve vertically
        assert_eq!(pick_side(at(300.0, 200.0), &viewport), RailSide::Top);
    }

    #[test]
    fn docks_clear_the_footer() {
        let mut rails = RailManager::new(RailConfig::default());
        let layout = rails.adjust_for_footer(None, 900.0);
        assert_eq!(layout.footer_height, 76.0);
        assert_eq!(layout.side_lift, 92.0);
        assert_eq!(layout.bottom_offset, 92.0);
        assert_eq!(layout.top_offset, 24.0);
        assert_eq!(layout.side_max_height, 900.0 - 156.0);

        let layout = rails.adjust_for_footer(Some(0.0), 500.0);
        assert_eq!(layout.bottom_offset, 16.0);
        assert_eq!(layout.side_max_height, 420.0);
    }
}
