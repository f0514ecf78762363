//! Staged reveal and auto-cycle state machine.
//!
//! The staged walk highlights every tile once in creation order, then hands
//! over to the auto-cycle, which keeps picking legible tiles until teardown.
//! Interaction pauses both; a single idle-resume timer brings them back.
//! All timing goes through [`Timers`], so cancellation is a slot drop rather
//! than a flag the callbacks have to check.

use std::time::Duration;

use serde::Serialize;

use crate::config::{AutoCycleConfig, IdleConfig, StagedConfig};
use crate::tiles::TileId;
use crate::timers::{Fired, TimerRole, Timers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StagedPhase {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Progress of the one-pass walk over all tiles.
#[derive(Debug, Clone)]
pub struct StagedReveal {
    revealed: Vec<bool>,
    count: usize,
    cursor: Option<usize>,
}

impl StagedReveal {
    fn new(total: usize) -> Self {
        Self {
            revealed: vec![false; total],
            count: 0,
            cursor: None,
        }
    }

    fn reset(&mut self) {
        self.revealed.iter_mut().for_each(|flag| *flag = false);
        self.count = 0;
        self.cursor = None;
    }

    /// First unrevealed tile after the cursor, wrapping, at most one cycle.
    fn next_unrevealed(&mut self) -> Option<TileId> {
        let total = self.revealed.len();
        let start = self.cursor.map_or(0, |cursor| cursor + 1);
        for offset in 0..total {
            let index = (start + offset) % total;
            if !self.revealed[index] {
                self.revealed[index] = true;
                self.count += 1;
                self.cursor = Some(index);
                return Some(TileId(index));
            }
        }
        None
    }

    /// Puts `id` back in the walk. Returns false when it was not revealed.
    fn forget(&mut self, id: TileId) -> bool {
        match self.revealed.get_mut(id.0) {
            Some(flag) if *flag => {
                *flag = false;
                self.count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn total(&self) -> usize {
        self.revealed.len()
    }

    pub fn revealed_count(&self) -> usize {
        self.count
    }

    pub fn is_revealed(&self, id: TileId) -> bool {
        self.revealed.get(id.0).copied().unwrap_or(false)
    }

    pub fn is_complete(&self) -> bool {
        self.count >= self.revealed.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutoCycle {
    pub enabled: bool,
    /// Index of the last tile the scan examined.
    pub current_index: Option<usize>,
    pub active: bool,
}

/// Result of one staged tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedStep {
    Reveal { tile: TileId, completed: bool },
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResumeOutcome {
    ResumedStaged,
    StartedAutoCycle,
    /// Nothing was running before the pause.
    Dormant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoPick {
    Legible(TileId),
    Fallback(TileId),
    Nothing,
}

#[derive(Debug, Clone)]
pub struct RevealScheduler {
    staged_config: StagedConfig,
    auto_config: AutoCycleConfig,
    idle_config: IdleConfig,
    timers: Timers,
    phase: StagedPhase,
    staged: StagedReveal,
    auto: AutoCycle,
}

impl RevealScheduler {
    pub fn new(
        staged_config: StagedConfig,
        auto_config: AutoCycleConfig,
        idle_config: IdleConfig,
        tile_count: usize,
    ) -> Self {
        let auto = AutoCycle {
            enabled: auto_config.enabled,
            current_index: None,
            active: false,
        };
        Self {
            staged_config,
            auto_config,
            idle_config,
            timers: Timers::new(),
            phase: StagedPhase::Idle,
            staged: StagedReveal::new(tile_count),
            auto,
        }
    }

    pub fn phase(&self) -> StagedPhase {
        self.phase
    }

    pub fn staged(&self) -> &StagedReveal {
        &self.staged
    }

    pub fn auto_cycle(&self) -> AutoCycle {
        self.auto
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }

    pub fn pop_due(&mut self, now: Duration) -> Option<Fired> {
        self.timers.pop_due(now)
    }

    /// Arms the staged walk to begin `delay` from `now`. Ignored while a
    /// walk is already underway; use [`restart`](Self::restart) to force one.
    pub fn start(&mut self, now: Duration, delay: Duration) -> bool {
        if matches!(self.phase, StagedPhase::Running | StagedPhase::Paused)
            || self.timers.is_scheduled(TimerRole::StagedStart)
        {
            return false;
        }
        self.arm(now, delay);
        true
    }

    /// Forgets every revealed tile and walks them all again.
    pub fn restart(&mut self, now: Duration, delay: Duration) {
        self.arm(now, delay);
    }

    fn arm(&mut self, now: Duration, delay: Duration) {
        for role in [
            TimerRole::StagedStart,
            TimerRole::StagedTick,
            TimerRole::AutoCycleTick,
            TimerRole::IdleResume,
        ] {
            self.timers.cancel(role);
        }
        self.auto.active = false;
        self.phase = StagedPhase::Idle;
        self.staged.reset();
        self.timers.schedule(TimerRole::StagedStart, now + delay, None);
        log::debug!("staged reveal armed for {:?}", now + delay);
    }

    /// The start delay elapsed: enter Running, reveal the first tile now and
    /// tick every interval after that.
    pub fn on_staged_start(&mut self, now: Duration) -> StagedStep {
        self.phase = StagedPhase::Running;
        self.staged.reset();
        let interval = self.staged_config.interval();
        self.timers
            .schedule(TimerRole::StagedTick, now + interval, Some(interval));
        self.tick()
    }

    pub fn tick(&mut self) -> StagedStep {
        if self.phase != StagedPhase::Running {
            return StagedStep::Idle;
        }
        let Some(tile) = self.staged.next_unrevealed() else {
            self.complete();
            return StagedStep::Idle;
        };
        let completed = self.staged.is_complete();
        if completed {
            self.complete();
        }
        log::debug!(
            "staged reveal {tile} ({}/{})",
            self.staged.revealed_count(),
            self.staged.total()
        );
        StagedStep::Reveal { tile, completed }
    }

    /// The host could not show `tile`; a later tick retries it. A walk that
    /// this tile had completed goes back to Running.
    pub fn defer_reveal(&mut self, now: Duration, tile: TileId) {
        if !self.staged.forget(tile) {
            return;
        }
        if self.phase == StagedPhase::Completed {
            self.phase = StagedPhase::Running;
            let interval = self.staged_config.interval();
            self.timers
                .schedule(TimerRole::StagedTick, now + interval, Some(interval));
        }
    }

    fn complete(&mut self) {
        self.phase = StagedPhase::Completed;
        self.timers.cancel(TimerRole::StagedTick);
    }

    /// Interaction: stop every autonomous highlight and (re)arm the
    /// idle-resume. Repeated calls only push the resume further out.
    pub fn pause(&mut self, now: Duration) {
        let pending_start = self.timers.cancel(TimerRole::StagedStart);
        self.timers.cancel(TimerRole::StagedTick);
        self.timers.cancel(TimerRole::AutoCycleTick);
        self.timers.cancel(TimerRole::IdleResume);
        self.auto.active = false;
        if self.phase == StagedPhase::Running || (self.phase == StagedPhase::Idle && pending_start) {
            self.phase = StagedPhase::Paused;
        }
        self.timers.schedule(
            TimerRole::IdleResume,
            now + self.idle_config.resume_delay(),
            None,
        );
    }

    pub fn on_idle_resume(&mut self, now: Duration) -> ResumeOutcome {
        match self.phase {
            StagedPhase::Paused | StagedPhase::Running if !self.staged.is_complete() => {
                self.phase = StagedPhase::Running;
                let interval = self.staged_config.interval();
                self.timers
                    .schedule(TimerRole::StagedTick, now + interval, Some(interval));
                ResumeOutcome::ResumedStaged
            }
            StagedPhase::Paused | StagedPhase::Running | StagedPhase::Completed => {
                self.phase = StagedPhase::Completed;
                if self.start_auto_cycle(now) {
                    ResumeOutcome::StartedAutoCycle
                } else {
                    ResumeOutcome::Dormant
                }
            }
            StagedPhase::Idle => ResumeOutcome::Dormant,
        }
    }

    /// Whether the auto-cycle should take over as soon as the walk completes.
    pub fn auto_cycle_on_complete(&self) -> bool {
        self.staged_config.auto_cycle_on_complete
    }

    pub fn start_auto_cycle(&mut self, now: Duration) -> bool {
        if !self.auto.enabled {
            return false;
        }
        let interval = self.auto_config.interval();
        self.timers
            .schedule(TimerRole::AutoCycleTick, now + interval, Some(interval));
        self.auto.active = true;
        true
    }

    pub fn stop_auto_cycle(&mut self) {
        self.timers.cancel(TimerRole::AutoCycleTick);
        self.auto.active = false;
    }

    /// Scan forward from the last examined index for a legible tile; when
    /// none qualifies in a full cycle, fall back to the configured tile.
    pub fn on_auto_cycle_tick(&mut self, opacities: &[f32], fallback: Option<TileId>) -> AutoPick {
        let total = opacities.len();
        if total == 0 {
            return AutoPick::Nothing;
        }
        let threshold = self.auto_config.legibility_threshold;
        for _ in 0..total {
            let index = self.auto.current_index.map_or(0, |i| (i + 1) % total);
            self.auto.current_index = Some(index);
            if opacities[index] > threshold {
                return AutoPick::Legible(TileId(index));
            }
        }
        AutoPick::Fallback(fallback.unwrap_or(TileId(0)))
    }

    /// Auto-clear delay that goes with a pick.
    pub fn clear_delay_for(&self, pick: AutoPick) -> Option<Duration> {
        match pick {
            AutoPick::Legible(_) => Some(self.auto_config.auto_clear()),
            AutoPick::Fallback(_) => Some(self.auto_config.fallback_clear()),
            AutoPick::Nothing => None,
        }
    }

    pub fn staged_clear_delay(&self) -> Duration {
        self.staged_config.auto_clear()
    }

    /// Teardown: nothing scheduled survives.
    pub fn stop_all(&mut self) {
        self.timers.cancel_all();
        self.auto.active = false;
        if self.phase == StagedPhase::Running {
            self.phase = StagedPhase::Paused;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn scheduler(tiles: usize) -> RevealScheduler {
        RevealScheduler::new(
            StagedConfig::default(),
            AutoCycleConfig::default(),
            IdleConfig::default(),
            tiles,
        )
    }

    /// Runs due timers until `until`, feeding staged ticks and counting
    /// reveals and resume outcomes.
    fn drive(scheduler: &mut RevealScheduler, until: Duration) -> (Vec<TileId>, Vec<ResumeOutcome>) {
        let mut reveals = Vec::new();
        let mut resumes = Vec::new();
        while let Some(fired) = scheduler.pop_due(until) {
            let step = match fired.role {
                TimerRole::StagedStart => scheduler.on_staged_start(fired.due),
                TimerRole::StagedTick => scheduler.tick(),
                TimerRole::IdleResume => {
                    resumes.push(scheduler.on_idle_resume(fired.due));
                    StagedStep::Idle
                }
                _ => StagedStep::Idle,
            };
            if let StagedStep::Reveal { tile, .. } = step {
                reveals.push(tile);
            }
        }
        (reveals, resumes)
    }

    #[test]
    fn walk_reveals_every_tile_once_then_completes() {
        let mut scheduler = scheduler(54);
        assert!(scheduler.start(ms(0), ms(900)));
        let (reveals, _) = drive(&mut scheduler, ms(900 + 2000 * 60));
        assert_eq!(reveals.len(), 54);
        let mut sorted = reveals.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 54);
        assert_eq!(reveals[0], TileId(0));
        assert_eq!(scheduler.phase(), StagedPhase::Completed);
        assert!(!scheduler.timers().is_scheduled(TimerRole::StagedTick));
    }

    #[test]
    fn first_reveal_happens_at_the_start_delay() {
        let mut scheduler = scheduler(3);
        scheduler.start(ms(0), ms(900));
        assert!(drive(&mut scheduler, ms(899)).0.is_empty());
        assert_eq!(drive(&mut scheduler, ms(900)).0, vec![TileId(0)]);
        assert_eq!(drive(&mut scheduler, ms(2900)).0, vec![TileId(1)]);
    }

    #[test]
    fn start_is_ignored_while_running() {
        let mut scheduler = scheduler(3);
        assert!(scheduler.start(ms(0), ms(10)));
        assert!(!scheduler.start(ms(0), ms(10)));
        drive(&mut scheduler, ms(10));
        assert!(!scheduler.start(ms(20), ms(10)));
    }

    #[test]
    fn repeated_pause_yields_exactly_one_resume() {
        let mut scheduler = scheduler(54);
        scheduler.start(ms(0), ms(900));
        drive(&mut scheduler, ms(5000));
        scheduler.pause(ms(5000));
        scheduler.pause(ms(6000));
        assert_eq!(scheduler.phase(), StagedPhase::Paused);

        let (reveals, resumes) = drive(&mut scheduler, ms(8499));
        assert!(reveals.is_empty());
        assert!(resumes.is_empty());

        let (_, resumes) = drive(&mut scheduler, ms(20_000));
        assert_eq!(resumes, vec![ResumeOutcome::ResumedStaged]);
        assert_eq!(scheduler.phase(), StagedPhase::Running);
    }

    #[test]
    fn resume_after_pause_ticks_one_interval_later() {
        let mut scheduler = scheduler(54);
        scheduler.start(ms(0), ms(0));
        drive(&mut scheduler, ms(0));
        scheduler.pause(ms(100));
        drive(&mut scheduler, ms(2600));
        assert_eq!(scheduler.timers().due(TimerRole::StagedTick), Some(ms(4600)));
    }

    #[test]
    fn pause_before_the_walk_starts_cancels_the_start() {
        let mut scheduler = scheduler(4);
        scheduler.start(ms(0), ms(900));
        scheduler.pause(ms(100));
        assert!(!scheduler.timers().is_scheduled(TimerRole::StagedStart));
        let (reveals, resumes) = drive(&mut scheduler, ms(2600));
        assert!(reveals.is_empty());
        assert_eq!(resumes, vec![ResumeOutcome::ResumedStaged]);
        assert_eq!(drive(&mut scheduler, ms(4600)).0, vec![TileId(0)]);
    }

    #[test]
    fn resume_after_completion_starts_auto_cycle() {
        let mut scheduler = scheduler(2);
        scheduler.start(ms(0), ms(0));
        drive(&mut scheduler, ms(2000));
        assert_eq!(scheduler.phase(), StagedPhase::Completed);
        scheduler.pause(ms(3000));
        let (_, resumes) = drive(&mut scheduler, ms(5500));
        assert_eq!(resumes, vec![ResumeOutcome::StartedAutoCycle]);
        assert!(scheduler.auto_cycle().active);
        assert_eq!(scheduler.timers().due(TimerRole::AutoCycleTick), Some(ms(5500 + 3200)));
    }

    #[test]
    fn pause_from_idle_is_dormant() {
        let mut scheduler = scheduler(2);
        scheduler.pause(ms(0));
        let (_, resumes) = drive(&mut scheduler, ms(3000));
        assert_eq!(resumes, vec![ResumeOutcome::Dormant]);
        assert_eq!(scheduler.phase(), StagedPhase::Idle);
    }

    #[test]
    fn restart_walks_again() {
        let mut scheduler = scheduler(2);
        scheduler.start(ms(0), ms(0));
        drive(&mut scheduler, ms(2000));
        assert_eq!(scheduler.phase(), StagedPhase::Completed);
        scheduler.restart(ms(3000), ms(100));
        assert_eq!(scheduler.staged().revealed_count(), 0);
        let (reveals, _) = drive(&mut scheduler, ms(6000));
        assert_eq!(reveals, vec![TileId(0), TileId(1)]);
    }

    #[test]
    fn stopping_the_auto_cycle_drops_its_timer() {
        let mut scheduler = scheduler(2);
        scheduler.start(ms(0), ms(0));
        drive(&mut scheduler, ms(0));
        assert!(scheduler.staged().is_revealed(TileId(0)));
        assert!(!scheduler.staged().is_revealed(TileId(1)));
        assert!(scheduler.start_auto_cycle(ms(100)));
        scheduler.stop_auto_cycle();
        assert!(!scheduler.auto_cycle().active);
        assert!(!scheduler.timers().is_scheduled(TimerRole::AutoCycleTick));
    }

    #[test]
    fn deferred_last_tile_reopens_the_walk() {
        let mut scheduler = scheduler(2);
        scheduler.start(ms(0), ms(0));
        drive(&mut scheduler, ms(2000));
        assert_eq!(scheduler.phase(), StagedPhase::Completed);

        scheduler.defer_reveal(ms(2000), TileId(1));
        assert_eq!(scheduler.phase(), StagedPhase::Running);
        assert!(!scheduler.staged().is_revealed(TileId(1)));
        assert_eq!(scheduler.staged().revealed_count(), 1);
        assert_eq!(drive(&mut scheduler, ms(4000)).0, vec![TileId(1)]);
        assert_eq!(scheduler.phase(), StagedPhase::Completed);

        // unrevealed tiles are left alone
        scheduler.defer_reveal(ms(4000), TileId(7));
        assert_eq!(scheduler.phase(), StagedPhase::Completed);
    }

    #[test]
    fn auto_cycle_scans_forward_and_falls_back() {
        let mut scheduler = scheduler(6);
        let mut opacities = [0.0, 0.9, 0.0, 0.8, 0.0, 0.0];
        assert_eq!(scheduler.on_auto_cycle_tick(&opacities, Some(TileId(4))), AutoPick::Legible(TileId(1)));
        assert_eq!(scheduler.on_auto_cycle_tick(&opacities, Some(TileId(4))), AutoPick::Legible(TileId(3)));
        assert_eq!(scheduler.on_auto_cycle_tick(&opacities, Some(TileId(4))), AutoPick::Legible(TileId(1)));
        opacities = [0.55; 6];
        let pick = scheduler.on_auto_cycle_tick(&opacities, Some(TileId(4)));
        assert_eq!(pick, AutoPick::Fallback(TileId(4)));
        assert_eq!(scheduler.clear_delay_for(pick), Some(ms(1200)));
        assert_eq!(
            scheduler.clear_delay_for(AutoPick::Legible(TileId(1))),
            Some(ms(2600))
        );
        assert_eq!(scheduler.on_auto_cycle_tick(&[], None), AutoPick::Nothing);
    }
}
