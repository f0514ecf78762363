use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, ensure};
use clap::Parser;

use crate::script::{self, InputAction, InputScript, ScriptedInput};

#[derive(Parser, Debug)]
#[command(
    about = "Headless host that spins the cube and drives the sticker reveal",
    version
)]
pub struct Args {
    /// Simulated session length in seconds
    #[arg(long, default_value_t = 20.0)]
    pub duration_secs: f32,

    /// Frame rate of the simulated render loop
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Viewport width in CSS pixels
    #[arg(long, default_value_t = 1280.0)]
    pub width: f32,

    /// Viewport height in CSS pixels
    #[arg(long, default_value_t = 720.0)]
    pub height: f32,

    /// Device pixel ratio used to size the overlay backing store
    #[arg(long, default_value_t = 1.0)]
    pub dpr: f32,

    /// Reveal tuning JSON (partial files keep the defaults for missing keys)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Content table JSON with nine entries per face
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// Delay before the simulated scene exposes its camera and cube root
    #[arg(long, default_value_t = 0)]
    pub attach_after_ms: u64,

    /// Renderer anisotropy limit; omit to simulate a failed capability query
    #[arg(long)]
    pub max_anisotropy: Option<u32>,

    /// Pointer position to deliver at a time, as AT_MS:X:Y (repeatable)
    #[arg(long = "pointer", value_name = "AT_MS:X:Y", value_parser = script::parse_pointer)]
    pub pointers: Vec<ScriptedInput>,

    /// Click at the given time in milliseconds (repeatable)
    #[arg(long = "click", value_name = "AT_MS", value_parser = script::parse_at)]
    pub clicks: Vec<Duration>,

    /// Toggle autospin at the given time in milliseconds (repeatable)
    #[arg(long = "toggle-autospin", value_name = "AT_MS", value_parser = script::parse_at)]
    pub toggles: Vec<Duration>,

    /// Restart the staged reveal at the given time in milliseconds (repeatable)
    #[arg(long = "restart", value_name = "AT_MS", value_parser = script::parse_at)]
    pub restarts: Vec<Duration>,

    /// Resize the viewport, as AT_MS:WIDTHxHEIGHT (repeatable)
    #[arg(long = "resize", value_name = "AT_MS:WxH", value_parser = script::parse_resize)]
    pub resizes: Vec<ScriptedInput>,

    /// Report a measured footer height, as AT_MS:HEIGHT (repeatable)
    #[arg(long = "footer", value_name = "AT_MS:HEIGHT", value_parser = script::parse_footer)]
    pub footers: Vec<ScriptedInput>,

    /// Path to write the reveal timeline report as JSON
    #[arg(long)]
    pub timeline_json: Option<PathBuf>,

    /// Directory to write every cached tile texture into as PNG
    #[arg(long)]
    pub dump_textures: Option<PathBuf>,

    /// Path to write the content table in use as JSON
    #[arg(long)]
    pub dump_content: Option<PathBuf>,

    /// Print every reveal event as it happens
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug)]
pub struct SimArgs {
    pub duration: Duration,
    pub frame: Duration,
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
    pub config: Option<PathBuf>,
    pub content: Option<PathBuf>,
    pub attach_after: Duration,
    pub max_anisotropy: Option<u32>,
    pub script: InputScript,
    pub timeline_json: Option<PathBuf>,
    pub dump_textures: Option<PathBuf>,
    pub dump_content: Option<PathBuf>,
    pub verbose: bool,
}

pub fn parse() -> Result<SimArgs> {
    let args = Args::parse();
    args.into_sim_args()
}

impl Args {
    fn into_sim_args(self) -> Result<SimArgs> {
        ensure!(
            self.duration_secs.is_finite() && self.duration_secs > 0.0,
            "--duration-secs must be positive (got {})",
            self.duration_secs
        );
        ensure!(self.fps > 0, "--fps must be positive");
        ensure!(
            self.width > 0.0 && self.height > 0.0,
            "viewport must be non-empty (got {}x{})",
            self.width,
            self.height
        );
        ensure!(
            self.dpr.is_finite() && self.dpr > 0.0,
            "--dpr must be positive (got {})",
            self.dpr
        );

        let timed = |times: Vec<Duration>, action: InputAction| {
            times
                .into_iter()
                .map(move |at| ScriptedInput { at, action })
                .collect::<Vec<_>>()
        };
        let script = InputScript::new(
            self.pointers
                .into_iter()
                .chain(timed(self.clicks, InputAction::Click))
                .chain(timed(self.toggles, InputAction::ToggleAutospin))
                .chain(timed(self.restarts, InputAction::Restart))
                .chain(self.resizes)
                .chain(self.footers),
        );

        Ok(SimArgs {
            duration: Duration::from_secs_f32(self.duration_secs),
            frame: Duration::from_secs_f64(1.0 / f64::from(self.fps)),
            width: self.width,
            height: self.height,
            dpr: self.dpr,
            config: self.config,
            content: self.content,
            attach_after: Duration::from_millis(self.attach_after_ms),
            max_anisotropy: self.max_anisotropy,
            script,
            timeline_json: self.timeline_json,
            dump_textures: self.dump_textures,
            dump_content: self.dump_content,
            verbose: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_scripted_inputs_in_order() {
        let args = Args::try_parse_from([
            "cube_sim",
            "--click",
            "4000",
            "--pointer",
            "1000:640:360",
            "--toggle-autospin",
            "2500",
        ])
        .expect("parse args");
        let mut sim = args.into_sim_args().expect("valid args");
        let actions: Vec<_> = sim
            .script
            .due(Duration::from_secs(10))
            .iter()
            .map(|input| input.action)
            .collect();
        assert_eq!(
            actions,
            vec![
                InputAction::Pointer { x: 640.0, y: 360.0 },
                InputAction::ToggleAutospin,
                InputAction::Click,
            ]
        );
        assert_eq!(sim.frame, Duration::from_secs_f64(1.0 / 60.0));
    }

    #[test]
    fn rejects_empty_viewport() {
        let args = Args::try_parse_from(["cube_sim", "--width", "0"]).expect("parse args");
        assert!(args.into_sim_args().is_err());
    }
}
