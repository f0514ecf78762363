//! Highlight panel placement. The panel follows the highlighted tile
//! loosely around a focal column and stays clear of the header and footer.

use glam::Vec2;
use serde::Serialize;

use crate::config::PanelConfig;
use crate::host::Viewport;
use crate::projector::ScreenPoint;
use crate::tiles::{Tile, TileId};

/// What the host should render in the highlight panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelState {
    pub tile: Option<TileId>,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub primary_action: Option<String>,
    pub secondary_action: Option<String>,
    pub visible: bool,
    pub left: f32,
    pub top: f32,
}

/// Where the connector should start and end for a highlighted tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorEndpoints {
    pub from: Vec2,
    pub to: Vec2,
}

/// `max(low, min(high, value))`: the lower bound wins on a cramped viewport.
fn clamp_low_wins(value: f32, low: f32, high: f32) -> f32 {
    value.min(high).max(low)
}

#[derive(Debug, Clone)]
pub struct PanelController {
    config: PanelConfig,
    state: PanelState,
}

impl PanelController {
    pub fn new(config: PanelConfig) -> Self {
        let state = PanelState {
            secondary_action: config.secondary_action.clone(),
            ..PanelState::default()
        };
        Self { config, state }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    /// Panel top-left corner for a tile projected at `screen`.
    pub fn position_for(&self, screen: ScreenPoint, viewport: &Viewport) -> (f32, f32) {
        let cfg = &self.config;
        let top = clamp_low_wins(
            screen.y - cfg.title_lift,
            cfg.top_min,
            viewport.height - cfg.bottom_reserve,
        );
        let focal = viewport.width * cfg.focal_column;
        let pulled = focal + (screen.x - focal) * cfg.follow;
        let left = clamp_low_wins(
            pulled,
            cfg.edge_margin,
            viewport.width - cfg.width - cfg.edge_margin,
        );
        (left, top)
    }

    /// Connector endpoints: the clamped tile point and an anchor just outside
    /// the panel's near edge, pushed away from the tile.
    pub fn endpoints_for(
        &self,
        screen: ScreenPoint,
        left: f32,
        top: f32,
        viewport: &Viewport,
    ) -> ConnectorEndpoints {
        let cfg = &self.config;
        let margin = cfg.screen_margin;
        let from = Vec2::new(
            clamp_low_wins(screen.x, margin, viewport.width - margin),
            clamp_low_wins(screen.y, margin, viewport.height - margin),
        );
        let anchor = Vec2::new(
            clamp_low_wins(left - cfg.anchor_gap, margin, viewport.width - margin),
            top + cfg.anchor_drop,
        );
        let delta = anchor - from;
        let length = delta.length();
        let direction = if length > f32::EPSILON { delta / length } else { delta };
        ConnectorEndpoints {
            from,
            to: anchor + direction * cfg.anchor_push,
        }
    }

    pub fn show(&mut self, tile: &Tile, screen: ScreenPoint, viewport: &Viewport) -> ConnectorEndpoints {
        let (left, top) = self.position_for(screen, viewport);
        self.state = PanelState {
            tile: Some(tile.id),
            title: tile.content.title.clone(),
            description: tile.content.description.clone(),
            icon: tile.content.icon.clone(),
            primary_action: tile.content.action.clone(),
            secondary_action: self.config.secondary_action.clone(),
            visible: true,
            left,
            top,
        };
        self.endpoints_for(screen, left, top, viewport)
    }

    pub fn hide(&mut self) {
        self.state.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f32, y: f32) -> ScreenPoint {
        ScreenPoint { x, y, depth: 0.5 }
    }

    #[test]
    fn panel_top_is_clamped_into_margins() {
        let panel = PanelController::new(PanelConfig::default());
        let viewport = Viewport::new(1280.0, 720.0);
        assert_eq!(panel.position_for(point(640.0, 10.0), &viewport).1, 72.0);
        assert_eq!(panel.position_for(point(640.0, 700.0), &viewport).1, 580.0);
        assert_eq!(panel.position_for(point(640.0, 300.0), &viewport).1, 280.0);
    }

    #[test]
    fn panel_is_pulled_toward_focal_column() {
        let panel = PanelController::new(PanelConfig::default());
        let viewport = Viewport::new(1000.0, 800.0);
        let (left, _) = panel.position_for(point(80.0, 300.0), &viewport);
        assert!((left - (580.0 + (80.0 - 580.0) * 0.28)).abs() < 1e-3);
        let (left, _) = panel.position_for(point(4000.0, 300.0), &viewport);
        assert_eq!(left, 1000.0 - 320.0 - 18.0);
    }

    #[test]
    fn tiny_viewport_prefers_lower_bounds() {
        let panel = PanelController::new(PanelConfig::default());
        let viewport = Viewport::new(200.0, 150.0);
        let (left, top) = panel.position_for(point(100.0, 100.0), &viewport);
        assert_eq!(top, 72.0);
        assert_eq!(left, 18.0);
    }

    #[test]
    fn anchor_is_pushed_outward_from_the_tile() {
        let panel = PanelController::new(PanelConfig::default());
        let viewport = Viewport::new(1280.0, 720.0);
        let screen = point(300.0, 300.0);
        let (left, top) = panel.position_for(screen, &viewport);
        let ends = panel.endpoints_for(screen, left, top, &viewport);
        assert_eq!(ends.from, Vec2::new(300.0, 300.0));
        let raw_anchor = Vec2::new(left - 12.0, top + 22.0);
        let pushed = ends.to - raw_anchor;
        assert!((pushed.length() - 36.0).abs() < 1e-3);
        assert!(pushed.dot(raw_anchor - ends.from) > 0.0);
    }

    #[test]
    fn tile_endpoint_is_kept_on_screen() {
        let panel = PanelController::new(PanelConfig::default());
        let viewport = Viewport::new(1280.0, 720.0);
        let screen = point(-50.0, 900.0);
        let ends = panel.endpoints_for(screen, 400.0, 200.0, &viewport);
        assert_eq!(ends.from, Vec2::new(8.0, 712.0));
    }
}
