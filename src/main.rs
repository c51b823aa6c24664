//! Top-down map of a sector level.
//!
//! ```bash
//! cargo run --bin map_view -- [level.ron]
//! ```
//!
//! Solid walls are white, portals grey, the camera's sector is outlined in
//! yellow.  Arrows / WASD drive the camera as in `view_sw`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glam::Vec2;
use minifb::{Key, Window, WindowOptions};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use sector_rs::{
    level::{load_level_file, samples},
    renderer::Rgba,
    sim::{InputCmd, TicRunner},
    world::Level,
};

const WIDTH: usize = 1024;
const HEIGHT: usize = 768;

const SOLID: Rgba = 0xFF_FFFFFF;
const PORTAL: Rgba = 0xFF_606060;
const CURRENT: Rgba = 0xFF_FFD800;
const PLAYER: Rgba = 0xFF_FF4040;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Level description (RON); the built-in demo when omitted
    #[arg(value_name = "LEVEL")]
    level: Option<PathBuf>,
}

/// Plan → screen transform fitting the whole level with a 10 % margin.
struct MapView {
    min: Vec2,
    scale: f32,
    offset: Vec2,
}

impl MapView {
    fn fit(level: &Level) -> Self {
        let (min, max) = level
            .vertices
            .iter()
            .fold((Vec2::MAX, Vec2::MIN), |(lo, hi), v| (lo.min(v.pos), hi.max(v.pos)));
        let size = (max - min).max(Vec2::ONE);
        let scale = (WIDTH as f32 / size.x).min(HEIGHT as f32 / size.y) * 0.9;
        let offset = (Vec2::new(WIDTH as f32, HEIGHT as f32) - size * scale) / 2.0;
        Self { min, scale, offset }
    }

    /// Invert z so +z is up on screen.
    fn to_screen(&self, p: Vec2) -> (i32, i32) {
        let s = (p - self.min) * self.scale + self.offset;
        (s.x as i32, HEIGHT as i32 - s.y as i32)
    }
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    TermLogger::init(
        log::LevelFilter::Info,
        ConfigBuilder::default().build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let level = match &opts.level {
        Some(p) => load_level_file(p).with_context(|| format!("loading {}", p.display()))?,
        None => samples::demo()?,
    };
    let eye = level.start.height - level.level.sector(level.start.sector).floor.height;
    let mut sim = TicRunner::new(level.start.camera(90f32.to_radians()), eye);
    let view = MapView::fit(&level.level);

    let mut window = Window::new(
        &format!("map – {}", level.level.name),
        WIDTH,
        HEIGHT,
        WindowOptions::default(),
    )?;
    window.set_target_fps(35);

    let mut buffer = vec![0u32; WIDTH * HEIGHT];
    while window.is_open() && !window.is_key_down(Key::Escape) {
        let mut cmd = InputCmd::default();
        if window.is_key_down(Key::Up) || window.is_key_down(Key::W) {
            cmd.forward += 1.0;
        }
        if window.is_key_down(Key::Down) || window.is_key_down(Key::S) {
            cmd.forward -= 1.0;
        }
        if window.is_key_down(Key::Left) {
            cmd.turn += 1.0;
        }
        if window.is_key_down(Key::Right) {
            cmd.turn -= 1.0;
        }
        if window.is_key_down(Key::A) {
            cmd.strafe -= 1.0;
        }
        if window.is_key_down(Key::D) {
            cmd.strafe += 1.0;
        }
        sim.set_input(cmd);
        sim.pump(&level.level);

        buffer.fill(0);
        let cam = sim.camera();
        for (sid, _) in level.level.sectors.iter().enumerate() {
            for wall in level.level.walls_of(sid as u16) {
                let (a, b) = level.level.wall_points(wall);
                let (x0, y0) = view.to_screen(a);
                let (x1, y1) = view.to_screen(b);
                let colour = if sid as u16 == cam.sector() {
                    CURRENT
                } else if wall.portal.is_some() {
                    PORTAL
                } else {
                    SOLID
                };
                draw_line(&mut buffer, WIDTH, HEIGHT, x0, y0, x1, y1, colour);
            }
        }

        // camera position and heading
        let (px, py) = view.to_screen(cam.pos());
        let (hx, hy) = view.to_screen(cam.pos() + cam.forward() * (12.0 / view.scale).max(1.0));
        draw_line(&mut buffer, WIDTH, HEIGHT, px, py, hx, hy, PLAYER);
        for (dx, dy) in [(-2, 0), (2, 0), (0, -2), (0, 2)] {
            draw_line(&mut buffer, WIDTH, HEIGHT, px, py, px + dx, py + dy, PLAYER);
        }

        window.update_with_buffer(&buffer, WIDTH, HEIGHT)?;
    }
    Ok(())
}

/// Integer Bresenham line‑drawing algorithm.
#[allow(clippy::too_many_arguments)]
fn draw_line(
    buf: &mut [u32],
    w: usize,
    h: usize,
    mut x0: i32,
    mut y0: i32,
    x1: i32,
    y1: i32,
    colour: u32,
) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if (0..w as i32).contains(&x0) && (0..h as i32).contains(&y0) {
            buf[y0 as usize * w + x0 as usize] = colour;
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
