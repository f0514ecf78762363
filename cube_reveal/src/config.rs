//! Tuned constants for the reveal subsystem. Every group deserializes with
//! defaults, so a JSON file only needs to name the values it overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cube_content::Face;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading reveal config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing reveal config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid reveal config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub tiles: TileConfig,
    pub visibility: VisibilityConfig,
    pub connector: ConnectorConfig,
    pub panel: PanelConfig,
    pub rails: RailConfig,
    pub staged: StagedConfig,
    pub auto_cycle: AutoCycleConfig,
    pub idle: IdleConfig,
    pub attach: AttachConfig,
}

impl RevealConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RevealConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rate_ok = |rate: f32| rate > 0.0 && rate <= 1.0;
        if !rate_ok(self.visibility.fade_rate) {
            return Err(ConfigError::Invalid(format!(
                "visibility.fade_rate must be in (0, 1], got {}",
                self.visibility.fade_rate
            )));
        }
        if !rate_ok(self.connector.ease_rate) {
            return Err(ConfigError::Invalid(format!(
                "connector.ease_rate must be in (0, 1], got {}",
                self.connector.ease_rate
            )));
        }
        if self.rails.capacity == 0 {
            return Err(ConfigError::Invalid("rails.capacity must be at least 1".into()));
        }
        for (name, value) in [
            ("staged.interval_ms", self.staged.interval_ms),
            ("auto_cycle.interval_ms", self.auto_cycle.interval_ms),
            ("attach.poll_interval_ms", self.attach.poll_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        if self.auto_cycle.fallback_slot >= cube_content::SLOTS_PER_FACE {
            return Err(ConfigError::Invalid(format!(
                "auto_cycle.fallback_slot {} is out of range",
                self.auto_cycle.fallback_slot
            )));
        }
        if self.tiles.texture_pixels == 0 {
            return Err(ConfigError::Invalid("tiles.texture_pixels must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Edge length of a sticker plane before `plane_fill` is applied.
    pub plane_size: f32,
    pub plane_fill: f32,
    /// Distance between the cubie surface and the sticker plane.
    pub surface_gap: f32,
    pub texture_pixels: u32,
}

impl TileConfig {
    pub fn half_extent(&self) -> f32 {
        self.plane_size * self.plane_fill * 0.5
    }
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            plane_size: 0.62,
            plane_fill: 0.92,
            surface_gap: 0.02,
            texture_pixels: cube_content::DEFAULT_TILE_PIXELS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Facing score above which a tile fades in.
    pub facing_threshold: f32,
    pub fade_rate: f32,
    pub scale_pulse: f32,
    /// Opacity at or below which a tile is hidden and ignored by hit tests.
    pub interactive_floor: f32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            facing_threshold: 0.48,
            fade_rate: 0.22,
            scale_pulse: 0.06,
            interactive_floor: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    pub ease_rate: f32,
    pub draw_floor: f32,
    pub arc_lift: f32,
    pub line_width: f32,
    pub marker_radius: f32,
    pub max_alpha: f32,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            ease_rate: 0.14,
            draw_floor: 0.001,
            arc_lift: 60.0,
            line_width: 2.6,
            marker_radius: 4.0,
            max_alpha: 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub width: f32,
    pub top_min: f32,
    pub bottom_reserve: f32,
    pub title_lift: f32,
    pub edge_margin: f32,
    /// Horizontal focal column as a fraction of the viewport width.
    pub focal_column: f32,
    /// How far the panel follows the tile away from the focal column.
    pub follow: f32,
    pub anchor_gap: f32,
    pub anchor_drop: f32,
    pub anchor_push: f32,
    pub screen_margin: f32,
    pub secondary_action: Option<String>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: 320.0,
            top_min: 72.0,
            bottom_reserve: 140.0,
            title_lift: 20.0,
            edge_margin: 18.0,
            focal_column: 0.58,
            follow: 0.28,
            anchor_gap: 12.0,
            anchor_drop: 22.0,
            anchor_push: 36.0,
            screen_margin: 8.0,
            secondary_action: Some("./Marko_P.pdf".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailConfig {
    pub capacity: usize,
    /// Footer height assumed until the host measures the real one.
    pub default_footer_height: f32,
    pub min_footer_pad: f32,
    pub footer_gap: f32,
    pub top_offset: f32,
    pub side_reserve: f32,
}

impl Default for RailConfig {
    fn default() -> Self {
        Self {
            capacity: 6,
            default_footer_height: 76.0,
            min_footer_pad: 12.0,
            footer_gap: 16.0,
            top_offset: 24.0,
            side_reserve: 80.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagedConfig {
    pub start_delay_ms: u64,
    pub interval_ms: u64,
    pub auto_clear_ms: u64,
    /// Start the auto-cycle as soon as every tile has been revealed.
    pub auto_cycle_on_complete: bool,
}

impl StagedConfig {
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn auto_clear(&self) -> Duration {
        Duration::from_millis(self.auto_clear_ms)
    }
}

impl Default for StagedConfig {
    fn default() -> Self {
        Self {
            start_delay_ms: 900,
            interval_ms: 2000,
            auto_clear_ms: 1600,
            auto_cycle_on_complete: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCycleConfig {
    pub enabled: bool,
    pub interval_ms: u64,
    /// Opacity a tile needs before the auto-cycle will pick it.
    pub legibility_threshold: f32,
    pub min_clear_ms: u64,
    pub clear_lead_ms: u64,
    pub fallback_face: Face,
    pub fallback_slot: usize,
    pub fallback_clear_ms: u64,
}

impl AutoCycleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// `max(min_clear, interval - clear_lead)`.
    pub fn auto_clear(&self) -> Duration {
        let lead = self.interval_ms.saturating_sub(self.clear_lead_ms);
        Duration::from_millis(self.min_clear_ms.max(lead))
    }

    pub fn fallback_clear(&self) -> Duration {
        Duration::from_millis(self.fallback_clear_ms)
    }
}

impl Default for AutoCycleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 3200,
            legibility_threshold: 0.55,
            min_clear_ms: 1400,
            clear_lead_ms: 600,
            fallback_face: Face::Tech,
            fallback_slot: 4,
            fallback_clear_ms: 1200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    pub resume_delay_ms: u64,
}

impl IdleConfig {
    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.resume_delay_ms)
    }
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            resume_delay_ms: 2500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachConfig {
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl AttachConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for AttachConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            max_attempts: 60,
        }
    }
}
