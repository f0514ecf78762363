use std::time::Duration;

use cube_content::Face;
use serde::Serialize;

use crate::rails::RailSide;
use crate::scheduler::ResumeOutcome;
use crate::tiles::TileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightSource {
    Staged,
    AutoCycle,
    Fallback,
    Hover,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevealEvent {
    Attached { tiles: usize, textures: usize },
    Highlighted {
        tile: TileId,
        face: Face,
        slot: usize,
        title: String,
        side: Option<RailSide>,
        source: HighlightSource,
    },
    Cleared { tile: Option<TileId> },
    Paused,
    Resumed { outcome: ResumeOutcome },
    StagedCompleted,
    AutoCycleStarted,
    ActionRequested { uri: String },
    AutospinToggled { enabled: bool },
    TornDown,
}

/// Event stamped with the session time it happened at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: RevealEvent,
}

impl TimedEvent {
    pub fn new(at: Duration, event: RevealEvent) -> Self {
        Self {
            at_ms: at.as_millis() as u64,
            event,
        }
    }
}
