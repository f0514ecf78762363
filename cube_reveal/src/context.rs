//! One attached reveal session: tiles, textures, per-frame animation state,
//! the highlight panel, rails and the scheduler, all owned in one place and
//! driven by the host's frame callback and a monotonic session clock.

use std::time::Duration;

use cube_content::ContentTable;
use glam::{Mat4, Vec3};

use crate::config::RevealConfig;
use crate::connector::{ConnectorAnimator, ConnectorFrame};
use crate::events::{HighlightSource, RevealEvent, TimedEvent};
use crate::host::{HostScene, Viewport};
use crate::input::{self, HoverChange, InputRouter};
use crate::panel::{PanelController, PanelState};
use crate::projector::{Projector, ScreenPoint};
use crate::rails::{self, RailCard, RailManager};
use crate::scheduler::{AutoPick, ResumeOutcome, RevealScheduler, StagedStep};
use crate::texture::{self, TextureCache};
use crate::tiles::{TileId, TileRegistry};
use crate::timers::TimerRole;
use crate::visibility::VisibilityEngine;

pub struct RevealContext {
    config: RevealConfig,
    registry: TileRegistry,
    textures: TextureCache,
    visibility: VisibilityEngine,
    connector: ConnectorAnimator,
    panel: PanelController,
    rails: RailManager,
    scheduler: RevealScheduler,
    input: InputRouter,
    projector: Option<Projector>,
    overlay_size: (u32, u32),
    footer_height: Option<f32>,
    highlighted: Option<TileId>,
    /// Bumped on every highlight; a pending auto-clear only applies to the
    /// highlight it was scheduled for.
    highlight_seq: u64,
    clear_for: Option<u64>,
    fallback: Option<TileId>,
    now: Duration,
    events: Vec<TimedEvent>,
}

impl RevealContext {
    /// Builds tiles and textures, frames the camera and arms the staged walk.
    pub fn new<H: HostScene + ?Sized>(
        table: &ContentTable,
        config: RevealConfig,
        host: &mut H,
        now: Duration,
    ) -> Self {
        let scene = host.scene_config();
        let registry = TileRegistry::build(table, &scene, &config.tiles);

        let mut textures = TextureCache::with_plate_rasterizer(
            config.tiles.texture_pixels,
            texture::query_anisotropy(&*host),
        );
        for tile in registry.iter() {
            textures.get_or_create(&tile.content.icon, &tile.content.title);
        }

        if let Some(cube) = host.cube_transform() {
            let target = cube.transform_point3(Vec3::ZERO);
            let d = scene.camera_distance;
            let eye = Vec3::new(d * 0.92, d * 0.7 + scene.vertical_shift, d * 0.92);
            host.aim_camera(eye, target);
        }

        let fallback = registry
            .find(config.auto_cycle.fallback_face, config.auto_cycle.fallback_slot)
            .map(|tile| tile.id);
        let mut scheduler = RevealScheduler::new(
            config.staged.clone(),
            config.auto_cycle.clone(),
            config.idle.clone(),
            registry.len(),
        );
        scheduler.start(now, config.staged.start_delay());

        let mut context = Self {
            visibility: VisibilityEngine::new(config.visibility.clone(), registry.len()),
            connector: ConnectorAnimator::new(config.connector.clone()),
            panel: PanelController::new(config.panel.clone()),
            rails: RailManager::new(config.rails.clone()),
            input: InputRouter::new(),
            projector: None,
            overlay_size: (0, 0),
            footer_height: None,
            highlighted: None,
            highlight_seq: 0,
            clear_for: None,
            fallback,
            now,
            events: Vec::new(),
            registry,
            textures,
            scheduler,
            config,
        };
        context.on_resize(&*host);

        log::info!(
            "reveal attached: {} tiles, {} textures, anisotropy {}",
            context.registry.len(),
            context.textures.len(),
            context.textures.anisotropy()
        );
        context.record(RevealEvent::Attached {
            tiles: context.registry.len(),
            textures: context.textures.len(),
        });
        context
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    pub fn registry(&self) -> &TileRegistry {
        &self.registry
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    pub fn visibility(&self) -> &VisibilityEngine {
        &self.visibility
    }

    pub fn connector(&self) -> &ConnectorAnimator {
        &self.connector
    }

    pub fn panel(&self) -> &PanelState {
        self.panel.state()
    }

    pub fn rails(&self) -> &RailManager {
        &self.rails
    }

    pub fn scheduler(&self) -> &RevealScheduler {
        &self.scheduler
    }

    pub fn highlighted(&self) -> Option<TileId> {
        self.highlighted
    }

    pub fn hovered(&self) -> Option<TileId> {
        self.input.hovered()
    }

    pub fn overlay_size(&self) -> (u32, u32) {
        self.overlay_size
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.timers().next_due()
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<TimedEvent> {
        std::mem::take(&mut self.events)
    }

    fn record(&mut self, event: RevealEvent) {
        self.events.push(TimedEvent::new(self.now, event));
    }

    fn touch(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Per-frame update: fade tiles by facing and ease the connector.
    pub fn on_frame<H: HostScene + ?Sized>(&mut self, host: &H) -> Option<ConnectorFrame> {
        if let (Some(cube), Some(camera)) = (host.cube_transform(), host.camera_pose()) {
            self.visibility.update(&self.registry, cube, camera.position);
        }
        self.connector.step()
    }

    /// Fires every timer due at or before `now`, in deadline order. Input
    /// handlers call this first so overdue work runs before they act.
    pub fn advance<H: HostScene + ?Sized>(&mut self, now: Duration, host: &H) {
        while let Some(fired) = self.scheduler.pop_due(now) {
            self.touch(fired.due);
            match fired.role {
                TimerRole::StagedStart => {
                    let step = self.scheduler.on_staged_start(fired.due);
                    self.apply_staged_step(step, host);
                }
                TimerRole::StagedTick => {
                    let step = self.scheduler.tick();
                    self.apply_staged_step(step, host);
                }
                TimerRole::AutoCycleTick => self.auto_cycle_tick(host),
                TimerRole::IdleResume => {
                    let outcome = self.scheduler.on_idle_resume(fired.due);
                    log::debug!("idle resume: {outcome:?}");
                    self.record(RevealEvent::Resumed { outcome });
                    if outcome == ResumeOutcome::StartedAutoCycle {
                        self.record(RevealEvent::AutoCycleStarted);
                    }
                }
                TimerRole::AutoClear => {
                    let current = self.clear_for.take() == Some(self.highlight_seq);
                    if current && self.connector.thread().is_engaged() {
                        self.clear_highlight();
                    }
                }
            }
        }
        self.touch(now);
    }

    fn apply_staged_step<H: HostScene + ?Sized>(&mut self, step: StagedStep, host: &H) {
        let StagedStep::Reveal { tile, completed } = step else {
            return;
        };
        if !self.highlight(tile, HighlightSource::Staged, host) {
            log::debug!("staged reveal of {tile} deferred");
            self.scheduler.defer_reveal(self.now, tile);
            return;
        }
        self.schedule_auto_clear(self.scheduler.staged_clear_delay());
        if completed {
            log::info!("staged reveal completed ({} tiles)", self.registry.len());
            self.record(RevealEvent::StagedCompleted);
            if self.scheduler.auto_cycle_on_complete() && self.scheduler.start_auto_cycle(self.now) {
                self.record(RevealEvent::AutoCycleStarted);
            }
        }
    }

    fn auto_cycle_tick<H: HostScene + ?Sized>(&mut self, host: &H) {
        let opacities: Vec<f32> = self.visibility.opacities().collect();
        let pick = self.scheduler.on_auto_cycle_tick(&opacities, self.fallback);
        let (tile, source) = match pick {
            AutoPick::Legible(tile) => (tile, HighlightSource::AutoCycle),
            AutoPick::Fallback(tile) => (tile, HighlightSource::Fallback),
            AutoPick::Nothing => return,
        };
        if self.highlight(tile, source, host) {
            if let Some(delay) = self.scheduler.clear_delay_for(pick) {
                self.schedule_auto_clear(delay);
            }
        }
    }

    fn schedule_auto_clear(&mut self, delay: Duration) {
        self.scheduler
            .timers_mut()
            .schedule(TimerRole::AutoClear, self.now + delay, None);
        self.clear_for = Some(self.highlight_seq);
    }

    fn refresh_projector<H: HostScene + ?Sized>(&mut self, host: &H) -> Option<Projector> {
        let camera = host.camera_pose()?;
        let viewport = host.viewport()?;
        self.projector = Projector::new(&camera, viewport);
        self.projector
    }

    /// Shows the panel for `id`, retargets the connector and pushes a rail
    /// card. Returns false when the host cannot place it on screen.
    pub fn highlight<H: HostScene + ?Sized>(
        &mut self,
        id: TileId,
        source: HighlightSource,
        host: &H,
    ) -> bool {
        let Some(projector) = self.refresh_projector(host) else {
            log::debug!("highlight {id} skipped: no camera or viewport");
            return false;
        };
        let Some(tile) = self.registry.get(id) else {
            return false;
        };
        let cube = host.cube_transform().unwrap_or(Mat4::IDENTITY);
        let viewport = projector.viewport();
        let screen = projector
            .project(tile.world_position(cube))
            .unwrap_or_else(|| center_of(&viewport));

        let ends = self.panel.show(tile, screen, &viewport);
        self.connector.retarget(ends.from, ends.to, tile.face.thread_color());
        let side = rails::pick_side(screen, &viewport);
        self.rails.push_to_side(side, RailCard::for_tile(tile));

        let event = RevealEvent::Highlighted {
            tile: id,
            face: tile.face,
            slot: tile.slot,
            title: tile.content.title.clone(),
            side: Some(side),
            source,
        };
        log::debug!("highlight {} via {source:?} on {side} rail", tile.describe());
        self.highlighted = Some(id);
        self.highlight_seq += 1;
        self.record(event);
        true
    }

    /// Hides the panel and lets the connector ease out.
    pub fn clear_highlight(&mut self) {
        self.panel.hide();
        self.connector.release();
        let tile = self.highlighted.take();
        self.record(RevealEvent::Cleared { tile });
    }

    fn pause(&mut self) {
        self.scheduler.pause(self.now);
        self.record(RevealEvent::Paused);
    }

    /// Hover handling: entering a tile pauses the autonomous reveal and
    /// highlights it; leaving every tile clears the highlight.
    pub fn on_pointer_move<H: HostScene + ?Sized>(
        &mut self,
        now: Duration,
        client_x: f32,
        client_y: f32,
        host: &H,
    ) -> HoverChange {
        self.advance(now, host);
        let hit = self.refresh_projector(host).and_then(|projector| {
            let ray = projector.pointer_ray(client_x, client_y)?;
            let cube = host.cube_transform()?;
            input::pick_tile(
                &ray,
                &self.registry,
                &self.visibility,
                cube,
                self.config.tiles.half_extent(),
            )
        });
        let change = self.input.update_hover(hit);
        match change {
            HoverChange::Entered(tile) => {
                self.pause();
                self.highlight(tile, HighlightSource::Hover, host);
            }
            HoverChange::Left(_) => self.clear_highlight(),
            HoverChange::Unchanged => {}
        }
        change
    }

    /// Action of the hovered tile, if any. The scheduler is left alone.
    pub fn on_click<H: HostScene + ?Sized>(&mut self, now: Duration, host: &H) -> Option<String> {
        self.advance(now, host);
        let uri = self.input.click_action(&self.registry)?;
        log::info!("opening {uri}");
        self.record(RevealEvent::ActionRequested { uri: uri.clone() });
        Some(uri)
    }

    pub fn toggle_autospin<H: HostScene + ?Sized>(&mut self, now: Duration, host: &mut H) -> bool {
        self.advance(now, &*host);
        let enabled = !host.autospin();
        host.set_autospin(enabled);
        self.record(RevealEvent::AutospinToggled { enabled });
        self.pause();
        enabled
    }

    pub fn restart<H: HostScene + ?Sized>(&mut self, now: Duration, host: &H) {
        self.advance(now, host);
        self.scheduler.restart(self.now, self.config.staged.start_delay());
    }

    /// Resizes the overlay backing store and re-lays out the rails.
    pub fn on_resize<H: HostScene + ?Sized>(&mut self, host: &H) {
        self.refresh_projector(host);
        if let Some(viewport) = host.viewport() {
            self.overlay_size = viewport.physical_size();
            self.rails.adjust_for_footer(self.footer_height, viewport.height);
        }
    }

    pub fn on_footer_resize<H: HostScene + ?Sized>(&mut self, footer_height: Option<f32>, host: &H) {
        if footer_height == self.footer_height {
            return;
        }
        self.footer_height = footer_height;
        let viewport_height = host.viewport().map_or(0.0, |viewport| viewport.height);
        self.rails.adjust_for_footer(footer_height, viewport_height);
    }

    pub fn teardown(&mut self, now: Duration) {
        self.touch(now);
        self.scheduler.stop_all();
        self.clear_for = None;
        self.panel.hide();
        self.connector.release();
        self.input.reset();
        self.highlighted = None;
        log::info!("reveal torn down");
        self.record(RevealEvent::TornDown);
    }
}

fn center_of(viewport: &Viewport) -> ScreenPoint {
    let (x, y) = viewport.center();
    ScreenPoint { x, y, depth: 0.0 }
}
