use std::time::{Duration, Instant};

use glam::Vec2;

use super::input::InputCmd;
use crate::world::{Camera, Level};

pub const SIM_FPS: u32 = 35;
pub const DT: f32 = 1.0 / SIM_FPS as f32;
const TIC: Duration = Duration::from_micros(1_000_000 / SIM_FPS as u64);

pub const MOVE_SPEED: f32 = 12.0; // map-units / second
pub const RUN_FACTOR: f32 = 2.0;
pub const TURN_RATE: f32 = std::f32::consts::PI; // rad / second (180°/s)
pub const LOOK_RATE: f32 = 1.0; // rad / second

/// Fixed-rate driver that turns [`InputCmd`]s into camera motion.
///
/// The camera's sector is re-tracked after every move and its eye kept
/// `eye_height` above the floor it stands on.
pub struct TicRunner {
    camera: Camera,
    eye_height: f32,
    cmd: InputCmd,
    last: Instant,
}

impl TicRunner {
    pub fn new(camera: Camera, eye_height: f32) -> Self {
        Self {
            camera,
            eye_height,
            cmd: InputCmd::default(),
            last: Instant::now(),
        }
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Swap in a new camera, e.g. after a level reload.
    pub fn reset(&mut self, camera: Camera, eye_height: f32) {
        self.camera = camera;
        self.eye_height = eye_height;
        self.last = Instant::now();
    }

    /// Input applied by every following tic until replaced.
    pub fn set_input(&mut self, cmd: InputCmd) {
        self.cmd = cmd;
    }

    /// Advance enough tics to synchronise simulation with real time.
    /// Returns the number of tics run.
    pub fn pump(&mut self, level: &Level) -> u32 {
        let mut n = 0;
        while self.last.elapsed() >= TIC {
            self.tick(level, self.cmd);
            self.last += TIC;
            n += 1;
        }
        n
    }

    /// Run one fixed-rate game tic.
    pub fn tick(&mut self, level: &Level, cmd: InputCmd) {
        let cam = &mut self.camera;
        if cmd.turn != 0.0 {
            cam.turn(cmd.turn * TURN_RATE * DT);
        }
        if cmd.look != 0.0 {
            cam.look(cmd.look * LOOK_RATE * DT);
        }

        let speed = if cmd.run { MOVE_SPEED * RUN_FACTOR } else { MOVE_SPEED };
        let wish = Vec2::new(cmd.forward, cmd.strafe);
        if wish != Vec2::ZERO {
            // diagonal input is no faster than straight
            let wish = wish / wish.length().max(1.0) * speed * DT;
            let target = cam.stepped(wish.x, wish.y);
            match level.track_sector(cam.sector(), target) {
                Some(s) => {
                    cam.set_pos(target);
                    cam.set_sector(s);
                }
                None => log::trace!("move to {target} leaves the level, ignored"),
            }
        }

        if let Some(sector) = level.sectors.get(cam.sector() as usize) {
            cam.set_height(sector.floor.height + self.eye_height);
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::samples;

    fn runner() -> (Level, TicRunner) {
        let s = samples::step_rooms().unwrap();
        let cam = s.start.camera(1.2);
        (s.level, TicRunner::new(cam, 6.0))
    }

    fn forward() -> InputCmd {
        InputCmd {
            forward: 1.0,
            ..InputCmd::default()
        }
    }

    #[test]
    fn walking_through_a_portal_changes_sector_and_eye() {
        let (level, mut sim) = runner();
        assert_eq!(sim.camera().sector(), 0);
        // 12 u/s for 35 tics per second: one second reaches x = 12
        for _ in 0..SIM_FPS {
            sim.tick(&level, forward());
        }
        let cam = sim.camera();
        assert!((cam.pos().x - MOVE_SPEED).abs() < 1e-3);
        assert_eq!(cam.sector(), 1);
        assert_eq!(cam.height(), 4.0 + 6.0);
    }

    #[test]
    fn moves_leaving_the_level_are_rejected() {
        let (level, mut sim) = runner();
        let back = InputCmd {
            forward: -1.0,
            run: true,
            ..InputCmd::default()
        };
        for _ in 0..SIM_FPS * 2 {
            sim.tick(&level, back);
        }
        let cam = sim.camera();
        assert!(cam.pos().x >= -10.0);
        assert_eq!(level.locate_sector(cam.pos()), Some(cam.sector()));
    }

    #[test]
    fn turning_and_looking() {
        let (level, mut sim) = runner();
        let cmd = InputCmd {
            turn: 1.0,
            look: 1.0,
            ..InputCmd::default()
        };
        assert!(!cmd.is_idle());
        sim.tick(&level, cmd);
        assert!((sim.camera().yaw() - TURN_RATE * DT).abs() < 1e-5);
        assert!((sim.camera().pitch() - LOOK_RATE * DT).abs() < 1e-5);
        assert_eq!(sim.camera().pos(), Vec2::ZERO);
    }

    #[test]
    fn pump_runs_no_tics_immediately() {
        let (level, mut sim) = runner();
        sim.set_input(forward());
        assert_eq!(sim.pump(&level), 0);
    }
}
