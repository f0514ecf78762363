pub mod attach;
pub mod config;
pub mod connector;
pub mod context;
pub mod events;
pub mod host;
pub mod input;
pub mod panel;
pub mod projector;
pub mod rails;
pub mod scheduler;
pub mod texture;
pub mod tiles;
pub mod timers;
pub mod visibility;

pub use attach::{AttachError, AttachPoll, AttachPoller, HostReady, RevealSession, negotiate};
pub use config::{ConfigError, RevealConfig};
pub use connector::{ConnectorAnimator, ConnectorFrame, Thread};
pub use context::RevealContext;
pub use events::{HighlightSource, RevealEvent, TimedEvent};
pub use host::{
    CameraPose, CapabilityError, HostScene, PoseProvider, SceneConfig, Viewport, ViewportProvider,
};
pub use input::{HoverChange, InputRouter};
pub use panel::{PanelController, PanelState};
pub use projector::{Projector, ScreenPoint};
pub use rails::{DockLayout, RailCard, RailManager, RailSide};
pub use scheduler::{AutoPick, ResumeOutcome, RevealScheduler, StagedPhase};
pub use texture::{TextureCache, TileTexture};
pub use tiles::{Tile, TileId, TileRegistry};
pub use timers::{TimerRole, Timers};
pub use visibility::VisibilityEngine;
