//! The single "thread" linking the highlighted tile to the panel. Progress
//! eases exponentially toward its target, so retargeting mid-flight stays
//! continuous; the animator never terminates, it just idles near zero.

use cube_content::{DEFAULT_THREAD_COLOR, Rgba};
use glam::Vec2;
use serde::Serialize;

use crate::config::ConnectorConfig;

pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    pub from: Vec2,
    pub to: Vec2,
    pub progress: f32,
    pub target: f32,
    pub color: Rgba,
}

impl Default for Thread {
    fn default() -> Self {
        Self {
            from: Vec2::ZERO,
            to: Vec2::ZERO,
            progress: 0.0,
            target: 0.0,
            color: DEFAULT_THREAD_COLOR,
        }
    }
}

impl Thread {
    pub fn is_engaged(&self) -> bool {
        self.target > 0.5
    }
}

/// Everything an overlay needs to draw one frame of the thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorFrame {
    pub start: [f32; 2],
    pub control: [f32; 2],
    pub end: [f32; 2],
    pub marker: [f32; 2],
    pub marker_radius: f32,
    pub alpha: f32,
    pub line_width: f32,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct ConnectorAnimator {
    config: ConnectorConfig,
    thread: Thread,
}

impl ConnectorAnimator {
    pub fn new(config: ConnectorConfig) -> Self {
        Self {
            config,
            thread: Thread::default(),
        }
    }

    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    /// Overwrites endpoints and color immediately; progress keeps easing.
    pub fn retarget(&mut self, from: Vec2, to: Vec2, color: Rgba) {
        self.thread.from = from;
        self.thread.to = to;
        self.thread.color = color;
        self.thread.target = 1.0;
    }

    pub fn release(&mut self) {
        self.thread.target = 0.0;
    }

    /// Advance one frame and describe what to draw, if anything.
    pub fn step(&mut self) -> Option<ConnectorFrame> {
        let thread = &mut self.thread;
        thread.progress += (thread.target - thread.progress) * self.config.ease_rate;
        thread.progress = thread.progress.clamp(0.0, 1.0);
        self.frame()
    }

    pub fn frame(&self) -> Option<ConnectorFrame> {
        let thread = &self.thread;
        if thread.progress <= self.config.draw_floor {
            return None;
        }
        let eased = ease_out_cubic(thread.progress);
        let start = thread.from;
        let end = thread.to;
        let control = Vec2::new(
            start.x + (end.x - start.x) * 0.5,
            start.y.min(end.y) - self.config.arc_lift * (0.4 + 0.6 * eased),
        );
        let marker = quadratic_point(start, control, end, eased.min(1.0));
        Some(ConnectorFrame {
            start: start.to_array(),
            control: control.to_array(),
            end: end.to_array(),
            marker: marker.to_array(),
            marker_radius: self.config.marker_radius * (0.7 + 0.3 * eased),
            alpha: self.config.max_alpha * eased,
            line_width: self.config.line_width,
            color: thread.color.to_css(),
        })
    }
}

fn quadratic_point(start: Vec2, control: Vec2, end: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    start * (u * u) + control * (2.0 * u * t) + end * (t * t)
}
