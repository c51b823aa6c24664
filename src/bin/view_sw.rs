//! First-person software view of a sector level.
//!
//! ```bash
//! cargo run --release -- [level.ron] [--config render.ron] [-v]
//! ```
//!
//! Arrows / WASD move, Alt+←/→ strafe, PgUp/PgDn look, Shift runs.
//! `R` reloads the level file, F1 toggles portal outlines, F2 distance
//! shading, F3 mip-mapping.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use sector_rs::{
    config::{RenderConfig, RenderFlags},
    level::{LoadedLevel, load_level_file, samples},
    renderer::{RendererExt, software::Software},
    sim::{InputCmd, TicRunner},
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Level description (RON); the built-in demo when omitted
    #[arg(value_name = "LEVEL")]
    level: Option<PathBuf>,

    /// Render settings (RON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 90.0)]
    fov: f32,

    /// Window pixel scale (1, 2 or 4)
    #[arg(long, default_value_t = 2)]
    scale: u8,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// -v debug, -vv trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    TermLogger::init(
        level,
        ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;
    Ok(())
}

fn load(path: Option<&PathBuf>) -> anyhow::Result<LoadedLevel> {
    Ok(match path {
        Some(p) => load_level_file(p).with_context(|| format!("loading {}", p.display()))?,
        None => samples::demo()?,
    })
}

/// Eye height above the start sector's floor.
fn eye_height(l: &LoadedLevel) -> f32 {
    l.start.height - l.level.sector(l.start.sector).floor.height
}

fn read_input(win: &Window) -> InputCmd {
    let mut cmd = InputCmd::default();

    if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
        cmd.forward += 1.0;
    }
    if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
        cmd.forward -= 1.0;
    }

    let alt = win.is_key_down(Key::LeftAlt) || win.is_key_down(Key::RightAlt);
    if alt {
        /* Alt + ←/→  = strafe */
        if win.is_key_down(Key::Left) {
            cmd.strafe -= 1.0;
        }
        if win.is_key_down(Key::Right) {
            cmd.strafe += 1.0;
        }
    } else {
        /* plain ←/→   = turn   */
        if win.is_key_down(Key::Left) {
            cmd.turn += 1.0;
        }
        if win.is_key_down(Key::Right) {
            cmd.turn -= 1.0;
        }
    }

    if win.is_key_down(Key::A) {
        cmd.strafe -= 1.0;
    }
    if win.is_key_down(Key::D) {
        cmd.strafe += 1.0;
    }
    if win.is_key_down(Key::PageUp) {
        cmd.look += 1.0;
    }
    if win.is_key_down(Key::PageDown) {
        cmd.look -= 1.0;
    }

    cmd.run = win.is_key_down(Key::LeftShift) || win.is_key_down(Key::RightShift);
    cmd
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logging(opts.verbose)?;

    let mut cfg = match &opts.config {
        Some(p) => RenderConfig::load(p).with_context(|| format!("loading {}", p.display()))?,
        None => RenderConfig::default(),
    };
    if let Some(w) = opts.width {
        cfg.width = w;
    }
    if let Some(h) = opts.height {
        cfg.height = h;
    }
    let fov = opts.fov.to_radians();

    let mut level = load(opts.level.as_ref())?;
    let mut sim = TicRunner::new(level.start.camera(fov), eye_height(&level));
    let mut renderer = Software::new(&cfg);

    let scale = match opts.scale {
        1 => Scale::X1,
        4 => Scale::X4,
        _ => Scale::X2,
    };
    let mut win = Window::new(
        &format!("sector_rs – {}", level.level.name),
        cfg.width,
        cfg.height,
        WindowOptions {
            scale,
            ..WindowOptions::default()
        },
    )?;
    win.set_target_fps(35);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();

        if win.is_key_pressed(Key::R, KeyRepeat::No) {
            match load(opts.level.as_ref()) {
                Ok(l) => {
                    sim.reset(l.start.camera(fov), eye_height(&l));
                    level = l;
                    log::info!("reloaded `{}`", level.level.name);
                }
                Err(e) => log::warn!("reload failed, keeping the current level: {e:#}"),
            }
        }
        if win.is_key_pressed(Key::F1, KeyRepeat::No) {
            renderer.flags.toggle(RenderFlags::PORTAL_OUTLINES);
        }
        if win.is_key_pressed(Key::F2, KeyRepeat::No) {
            renderer.flags.toggle(RenderFlags::DISTANCE_SHADING);
        }
        if win.is_key_pressed(Key::F3, KeyRepeat::No) {
            renderer.flags.toggle(RenderFlags::MIPMAPS);
        }

        sim.set_input(read_input(&win));
        sim.pump(&level.level);

        let mut shown = Ok(());
        let stats = renderer.draw_frame(
            cfg.width,
            cfg.height,
            &level.level,
            sim.camera(),
            &level.textures,
            |fb, w, h| shown = win.update_with_buffer(fb, w, h),
        );
        shown?;
        acc_time += t0.elapsed();
        acc_frames += 1;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            log::info!(
                "avg render: {:.2} ms ({:.1} FPS), {} sectors, depth {}",
                avg_ms,
                1000.0 / avg_ms,
                stats.sectors_visited,
                stats.max_depth
            );
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}
