mod cli;
mod scene;
mod script;

use std::fs::{self, File};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use cube_content::ContentTable;
use cube_reveal::panel::PanelState;
use cube_reveal::rails::{DockLayout, Rail};
use cube_reveal::{
    ConnectorFrame, RevealConfig, RevealContext, RevealEvent, RevealSession, SceneConfig,
    StagedPhase, TimedEvent, Viewport,
};
use image::{ColorType, ImageEncoder, codecs::png::PngEncoder};
use serde::Serialize;

use crate::cli::SimArgs;
use crate::scene::SimulatedCube;
use crate::script::InputAction;

#[derive(Debug, Serialize)]
struct AttachSummary {
    status: &'static str,
    attempts: Option<u32>,
    attached_at_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ConnectorSummary {
    frames_drawn: usize,
    last: Option<ConnectorFrame>,
}

#[derive(Serialize)]
struct SimReport<'a> {
    duration_ms: u64,
    frames: u64,
    attach: AttachSummary,
    tiles: usize,
    textures: usize,
    anisotropy: u32,
    revealed: usize,
    staged_phase: StagedPhase,
    auto_cycle_active: bool,
    overlay_size: (u32, u32),
    dock_layout: DockLayout,
    panel: &'a PanelState,
    rails: Vec<&'a Rail>,
    connector: ConnectorSummary,
    events: &'a [TimedEvent],
}

#[derive(Debug, Serialize)]
struct AbandonedReport {
    duration_ms: u64,
    frames: u64,
    attach: AttachSummary,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = cli::parse()?;
    run(args)
}

fn run(mut args: SimArgs) -> Result<()> {
    let config = match args.config.as_deref() {
        Some(path) => RevealConfig::from_json_file(path)
            .with_context(|| format!("loading reveal config {}", path.display()))?,
        None => RevealConfig::default(),
    };
    let table = match args.content.as_deref() {
        Some(path) => ContentTable::from_json_file(path)
            .with_context(|| format!("loading content table {}", path.display()))?,
        None => ContentTable::builtin(),
    };
    if let Some(path) = args.dump_content.as_ref() {
        let json = table.to_json_pretty().context("serializing content table")?;
        fs::write(path, json)
            .with_context(|| format!("writing content JSON to {}", path.display()))?;
        println!("Saved content table to {}", path.display());
    }

    let viewport = Viewport {
        device_pixel_ratio: args.dpr,
        ..Viewport::new(args.width, args.height)
    };
    let mut host = SimulatedCube::new(SceneConfig::default(), viewport, args.attach_after)
        .with_max_anisotropy(args.max_anisotropy);
    let mut session = RevealSession::new(table, config);

    let mut now = Duration::ZERO;
    let mut frames = 0u64;
    let mut attached_at = None;
    let mut frames_drawn = 0usize;
    let mut last_frame = None;
    let mut printed = 0usize;

    while now <= args.duration {
        host.step(if frames == 0 { Duration::ZERO } else { args.frame });

        let was_pending = session.is_pending();
        session.poll(now, &mut host);
        if was_pending && session.is_active() {
            attached_at = Some(now);
        }

        if let Some(context) = session.context_mut() {
            context.advance(now, &host);
            for input in args.script.due(now).to_vec() {
                deliver(context, &mut host, now, input.action);
            }
            if let Some(frame) = context.on_frame(&host) {
                frames_drawn += 1;
                last_frame = Some(frame);
            }
            if args.verbose {
                for timed in &context.events()[printed..] {
                    println!("{:>7}ms {}", timed.at_ms, describe(&timed.event));
                }
                printed = context.events().len();
            }
        }

        frames += 1;
        now += args.frame;
    }
    if args.script.remaining() > 0 {
        log::warn!(
            "{} scripted inputs were never delivered",
            args.script.remaining()
        );
    }
    log::debug!("final cube angle {:.3} rad", host.angle());

    let attach = AttachSummary {
        status: if session.is_active() {
            "active"
        } else if session.is_abandoned() {
            "abandoned"
        } else {
            "pending"
        },
        attempts: session.attempts(),
        attached_at_ms: attached_at.map(|at: Duration| at.as_millis() as u64),
    };
    let duration_ms = args.duration.as_millis() as u64;

    let Some(context) = session.context_mut() else {
        println!("Reveal never attached ({})", attach.status);
        if let Some(path) = args.timeline_json.as_ref() {
            let report = AbandonedReport {
                duration_ms,
                frames,
                attach,
            };
            write_json(path, &report)?;
        }
        return Ok(());
    };
    context.teardown(now.min(args.duration));

    if let Some(dir) = args.dump_textures.as_ref() {
        let written = dump_textures(context, dir)?;
        println!("Wrote {written} tile textures to {}", dir.display());
    }

    let highlights = context
        .events()
        .iter()
        .filter(|timed| matches!(timed.event, RevealEvent::Highlighted { .. }))
        .count();
    println!(
        "Simulated {frames} frames over {duration_ms}ms: {highlights} highlights, {} of {} tiles revealed, phase {:?}",
        context.scheduler().staged().revealed_count(),
        context.registry().len(),
        context.scheduler().phase()
    );

    if let Some(path) = args.timeline_json.as_ref() {
        let report = SimReport {
            duration_ms,
            frames,
            attach,
            tiles: context.registry().len(),
            textures: context.textures().len(),
            anisotropy: context.textures().anisotropy(),
            revealed: context.scheduler().staged().revealed_count(),
            staged_phase: context.scheduler().phase(),
            auto_cycle_active: context.scheduler().auto_cycle().active,
            overlay_size: context.overlay_size(),
            dock_layout: context.rails().layout(),
            panel: context.panel(),
            rails: context.rails().rails().collect(),
            connector: ConnectorSummary {
                frames_drawn,
                last: last_frame,
            },
            events: context.events(),
        };
        write_json(path, &report)?;
        println!("Saved reveal timeline JSON to {}", path.display());
    }

    Ok(())
}

fn deliver(
    context: &mut RevealContext,
    host: &mut SimulatedCube,
    at: Duration,
    action: InputAction,
) {
    match action {
        InputAction::Pointer { x, y } => {
            context.on_pointer_move(at, x, y, &*host);
        }
        InputAction::Click => {
            if let Some(uri) = context.on_click(at, &*host) {
                println!("open {uri}");
            }
        }
        InputAction::ToggleAutospin => {
            context.toggle_autospin(at, host);
        }
        InputAction::Restart => context.restart(at, &*host),
        InputAction::Resize { width, height } => {
            host.resize(width, height);
            context.on_resize(&*host);
        }
        InputAction::Footer { height } => context.on_footer_resize(Some(height), &*host),
    }
}

fn describe(event: &RevealEvent) -> String {
    match event {
        RevealEvent::Highlighted {
            face,
            slot,
            title,
            source,
            side,
            ..
        } => match side {
            Some(side) => format!("highlight {face} slot {slot} '{title}' ({source:?}, {side} rail)"),
            None => format!("highlight {face} slot {slot} '{title}' ({source:?})"),
        },
        other => format!("{other:?}"),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing reveal report")?;
    fs::write(path, json).with_context(|| format!("writing report JSON to {}", path.display()))
}

fn dump_textures(context: &RevealContext, dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating texture directory {}", dir.display()))?;
    let mut textures: Vec<_> = context.textures().iter().collect();
    textures.sort_by(|a, b| (a.1, a.0).cmp(&(b.1, b.0)));
    for (index, (_, label, texture)) in textures.iter().enumerate() {
        let path = dir.join(format!("{index:02}_{}.png", file_stem(label)));
        let image = &texture.image;
        export_rgba_to_png(image.width(), image.height(), image.as_raw(), &path)
            .with_context(|| format!("writing texture {}", path.display()))?;
    }
    Ok(textures.len())
}

fn export_rgba_to_png(width: u32, height: u32, data: &[u8], destination: &Path) -> Result<()> {
    let expected_len = width as usize * height as usize * 4;
    ensure!(
        data.len() == expected_len,
        "RGBA buffer size {} does not match dimensions {}x{}",
        data.len(),
        width,
        height
    );
    let file = File::create(destination)?;
    let encoder = PngEncoder::new(file);
    encoder.write_image(data, width, height, ColorType::Rgba8.into())?;
    Ok(())
}

fn file_stem(label: &str) -> String {
    let stem: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let stem = stem.trim_matches('_').to_string();
    if stem.is_empty() { "tile".to_string() } else { stem }
}
