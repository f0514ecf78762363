//! Readiness negotiation with the host scene. The host may come up after the
//! reveal subsystem is loaded, so attaching polls with a bounded number of
//! attempts and then gives up for good.

use std::time::Duration;

use cube_content::ContentTable;
use glam::Mat4;
use thiserror::Error;

use crate::config::{AttachConfig, RevealConfig};
use crate::context::RevealContext;
use crate::host::{CameraPose, HostScene, Viewport};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AttachError {
    #[error("host has no cube root yet")]
    MissingCubeRoot,
    #[error("host has no camera yet")]
    MissingCamera,
    #[error("host viewport is missing or empty")]
    MissingViewport,
}

/// Everything the subsystem needs from the host at attach time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostReady {
    pub cube: Mat4,
    pub camera: CameraPose,
    pub viewport: Viewport,
}

pub fn negotiate<H: HostScene + ?Sized>(host: &H) -> Result<HostReady, AttachError> {
    let cube = host.cube_transform().ok_or(AttachError::MissingCubeRoot)?;
    let camera = host.camera_pose().ok_or(AttachError::MissingCamera)?;
    let viewport = host
        .viewport()
        .filter(Viewport::is_usable)
        .ok_or(AttachError::MissingViewport)?;
    Ok(HostReady {
        cube,
        camera,
        viewport,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttachPoll {
    Ready(HostReady),
    Waiting,
    GaveUp,
}

/// Bounded polling schedule: one attempt per interval, first one at once.
#[derive(Debug, Clone)]
pub struct AttachPoller {
    config: AttachConfig,
    attempts: u32,
    next_at: Option<Duration>,
    last_error: Option<AttachError>,
}

impl AttachPoller {
    pub fn new(config: AttachConfig) -> Self {
        Self {
            config,
            attempts: 0,
            next_at: None,
            last_error: None,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_error(&self) -> Option<AttachError> {
        self.last_error
    }

    pub fn poll<H: HostScene + ?Sized>(&mut self, now: Duration, host: &H) -> AttachPoll {
        if self.attempts >= self.config.max_attempts {
            return AttachPoll::GaveUp;
        }
        if self.next_at.is_some_and(|at| now < at) {
            return AttachPoll::Waiting;
        }
        self.attempts += 1;
        match negotiate(host) {
            Ok(ready) => AttachPoll::Ready(ready),
            Err(err) => {
                self.last_error = Some(err);
                if self.attempts >= self.config.max_attempts {
                    log::warn!(
                        "giving up on attach after {} attempts: {err}",
                        self.attempts
                    );
                    return AttachPoll::GaveUp;
                }
                log::debug!("attach attempt {} failed: {err}", self.attempts);
                self.next_at = Some(now + self.config.poll_interval());
                AttachPoll::Waiting
            }
        }
    }
}

/// Lifetime of the subsystem inside one host page.
pub enum RevealSession {
    Pending {
        poller: AttachPoller,
        table: ContentTable,
        config: RevealConfig,
    },
    Active(Box<RevealContext>),
    Abandoned,
    TornDown,
}

impl RevealSession {
    pub fn new(table: ContentTable, config: RevealConfig) -> Self {
        RevealSession::Pending {
            poller: AttachPoller::new(config.attach.clone()),
            table,
            config,
        }
    }

    /// Drives attach. Once active or abandoned, further polls change nothing.
    pub fn poll<H: HostScene + ?Sized>(&mut self, now: Duration, host: &mut H) -> &mut Self {
        if let RevealSession::Pending {
            poller,
            table,
            config,
        } = self
        {
            match poller.poll(now, &*host) {
                AttachPoll::Waiting => {}
                AttachPoll::GaveUp => *self = RevealSession::Abandoned,
                AttachPoll::Ready(_) => {
                    let context = RevealContext::new(table, config.clone(), host, now);
                    *self = RevealSession::Active(Box::new(context));
                }
            }
        }
        self
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RevealSession::Pending { .. })
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RevealSession::Active(_))
    }

    pub fn is_abandoned(&self) -> bool {
        matches!(self, RevealSession::Abandoned)
    }

    pub fn context(&self) -> Option<&RevealContext> {
        match self {
            RevealSession::Active(context) => Some(context),
            _ => None,
        }
    }

    pub fn context_mut(&mut self) -> Option<&mut RevealContext> {
        match self {
            RevealSession::Active(context) => Some(context),
            _ => None,
        }
    }

    pub fn attempts(&self) -> Option<u32> {
        match self {
            RevealSession::Pending { poller, .. } => Some(poller.attempts()),
            _ => None,
        }
    }

    /// Stops every timer and releases the highlight. Pending sessions stop
    /// polling.
    pub fn teardown(&mut self, now: Duration) {
        if let RevealSession::Active(context) = self {
            context.teardown(now);
        }
        if !self.is_abandoned() {
            *self = RevealSession::TornDown;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{PoseProvider, ViewportProvider};
    use glam::Vec3;

    #[derive(Default)]
    struct LateHost {
        cube: Option<Mat4>,
        camera: Option<CameraPose>,
        viewport: Option<Viewport>,
    }

    impl PoseProvider for LateHost {
        fn camera_pose(&self) -> Option<CameraPose> {
            self.camera
        }

        fn cube_transform(&self) -> Option<Mat4> {
            self.cube
        }
    }

    impl ViewportProvider for LateHost {
        fn viewport(&self) -> Option<Viewport> {
            self.viewport
        }
    }

    impl HostScene for LateHost {}

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn negotiate_names_the_first_missing_piece() {
        let mut host = LateHost::default();
        assert_eq!(negotiate(&host).unwrap_err(), AttachError::MissingCubeRoot);
        host.cube = Some(Mat4::IDENTITY);
        assert_eq!(negotiate(&host).unwrap_err(), AttachError::MissingCamera);
        host.camera = Some(CameraPose {
            position: Vec3::Z,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        });
        host.viewport = Some(Viewport::new(0.0, 10.0));
        assert_eq!(negotiate(&host).unwrap_err(), AttachError::MissingViewport);
        host.viewport = Some(Viewport::new(10.0, 10.0));
        assert!(negotiate(&host).is_ok());
    }

    #[test]
    fn poller_waits_between_attempts_and_gives_up() {
        let host = LateHost::default();
        let mut poller = AttachPoller::new(AttachConfig {
            poll_interval_ms: 200,
            max_attempts: 3,
        });
        assert_eq!(poller.poll(ms(0), &host), AttachPoll::Waiting);
        assert_eq!(poller.poll(ms(100), &host), AttachPoll::Waiting);
        assert_eq!(poller.attempts(), 1);
        assert_eq!(poller.poll(ms(200), &host), AttachPoll::Waiting);
        assert_eq!(poller.poll(ms(400), &host), AttachPoll::GaveUp);
        assert_eq!(poller.attempts(), 3);
        assert_eq!(poller.poll(ms(10_000), &host), AttachPoll::GaveUp);
        assert_eq!(poller.last_error(), Some(AttachError::MissingCubeRoot));
    }

    #[test]
    fn abandoned_session_stays_abandoned() {
        let mut host = LateHost::default();
        let config = RevealConfig {
            attach: AttachConfig {
                poll_interval_ms: 200,
                max_attempts: 2,
            },
            ..RevealConfig::default()
        };
        let mut session = RevealSession::new(ContentTable::builtin(), config);
        session.poll(ms(0), &mut host);
        assert_eq!(session.attempts(), Some(1));
        session.poll(ms(200), &mut host);
        assert!(session.is_abandoned());
        session.teardown(ms(300));
        assert!(session.is_abandoned());
    }
}
