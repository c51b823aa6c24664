use glam::{Vec2, vec2};

use super::geometry::SectorId;

/// Largest pitch the y-shear can fake before walls visibly lean.
pub const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_4;

/// Player view-point in world space.
///
/// * `pos` is the plan position `(x, z)`, `height` the absolute eye altitude.
/// * Pitch is simulated by shearing rows, never by rotating the view.
/// * `sector` is the traversal entry point; the sim keeps it current.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pos: Vec2,
    height: f32,
    yaw: f32,   // radians (0 = +x, counter-clockwise)
    pitch: f32, // radians, + looks up
    fov: f32,   // horizontal FoV (radians, typical 90–110°)
    sector: SectorId,
}

impl Camera {
    /// Create a level camera at `pos`, eye at `height`, facing `yaw`, with
    /// horizontal FoV `fov`, standing in `sector`.
    pub fn new(pos: Vec2, height: f32, yaw: f32, fov: f32, sector: SectorId) -> Self {
        Self {
            pos,
            height,
            yaw,
            pitch: 0.0,
            fov,
            sector,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    #[inline]
    pub fn sector(&self) -> SectorId {
        self.sector
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height;
    }

    pub fn set_sector(&mut self, sector: SectorId) {
        self.sector = sector;
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.look(pitch);
        self
    }

    pub fn turned(mut self, delta_yaw: f32) -> Self {
        self.turn(delta_yaw);
        self
    }

    /// Transform a plan point `p` into camera-local coords:
    ///  .x = lateral offset (+ right)
    ///  .y = depth along forward axis
    #[inline]
    pub fn to_view(&self, p: Vec2) -> Vec2 {
        let d = p - self.pos;
        vec2(d.dot(self.right()), d.dot(self.forward()))
    }

    /*──────────────────────── derived vectors ───────────────────────*/

    /// Unit vector pointing where the camera looks on the plan.
    #[inline(always)]
    pub fn forward(&self) -> Vec2 {
        let (s, c) = self.yaw.sin_cos();
        Vec2::new(c, s) // 0 rad = +x, CCW positive
    }

    /// Unit vector pointing to the camera's right on the plan.
    #[inline(always)]
    pub fn right(&self) -> Vec2 {
        // Perpendicular to forward: (x, z) -> (z, -x)
        let f = self.forward();
        Vec2::new(f.y, -f.x)
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Move by `forward` units and `side` (strafe, + right).
    pub fn step(&mut self, forward: f32, side: f32) {
        self.pos += self.forward() * forward + self.right() * side;
    }

    /// Position `step` would produce, without moving.
    pub fn stepped(&self, forward: f32, side: f32) -> Vec2 {
        self.pos + self.forward() * forward + self.right() * side
    }

    /// Rotate around the vertical axis (positive = turn left).
    pub fn turn(&mut self, delta_yaw: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
    }

    /// Tilt the view (positive = look up), clamped to ±[`MAX_PITCH`].
    pub fn look(&mut self, delta_pitch: f32) {
        self.pitch = (self.pitch + delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /*───────────────── projection / frustum helpers ─────────────────*/

    /// Pixel-per-map-unit scale for viewport width `w`.
    ///
    /// ```text
    /// focal = w / (2 * tan(fov/2))
    /// ```
    #[inline]
    pub fn screen_scale(&self, w: usize) -> f32 {
        (w as f32) * 0.5 / (self.fov * 0.5).tan()
    }

    /// Rows the horizon moves down the screen for the current pitch.
    ///
    /// Looking up (`pitch > 0`) pushes the horizon down, which is what a
    /// y-shear does to everything drawn at the eye height.
    #[inline]
    pub fn pitch_shear(&self, focal: f32) -> f32 {
        self.pitch.tan() * focal
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
