use glam::{Vec2, vec2};

use crate::world::Camera;

use super::occlusion::ScreenInterval;

/// Points closer than this along the view axis are not projectable.
pub const NEAR_EPSILON: f32 = 1e-5;

/// Slack on the wall parameter when casting column rays at a wall the eye
/// is standing on.
const TOUCH_SLACK: f32 = 1e-3;

/// Everything the projection needs for one frame, derived once from the
/// camera and the target resolution.
#[derive(Clone, Copy, Debug)]
pub struct View {
    pub width: usize,
    pub height: usize,
    pub half_w: f32,
    /// Row of the eye height after the pitch shear.
    pub horizon: f32,
    /// Pixels per unit at depth 1 (square pixels: same on both axes).
    pub focal: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec2,
    pub eye_z: f32,
    pub forward: Vec2,
    pub right: Vec2,
}

/// A wall clipped to the view frustum, ready for per-column evaluation.
///
/// `u` is measured in world units from the wall's screen-left end.
#[derive(Clone, Copy, Debug)]
pub struct ProjectedWall {
    pub sx_l: f32,
    pub sx_r: f32,
    pub inv_z_l: f32,
    pub inv_z_r: f32,
    pub uoz_l: f32,
    pub uoz_r: f32,
    /// Pixel columns whose centres fall inside `[sx_l, sx_r)`.
    pub columns: ScreenInterval,
}

impl View {
    pub fn new(camera: &Camera, width: usize, height: usize, near: f32, far: f32) -> Self {
        let focal = camera.screen_scale(width);
        Self {
            width,
            height,
            half_w: width as f32 * 0.5,
            horizon: height as f32 * 0.5 + camera.pitch_shear(focal),
            focal,
            near: near.max(NEAR_EPSILON),
            far,
            eye: camera.pos(),
            eye_z: camera.height(),
            forward: camera.forward(),
            right: camera.right(),
        }
    }

    /// Plan point → (lateral, depth).
    #[inline(always)]
    pub fn to_view(&self, p: Vec2) -> Vec2 {
        let d = p - self.eye;
        vec2(d.dot(self.right), d.dot(self.forward))
    }

    /// Screen column of a view-space point, `None` behind the eye.
    #[inline]
    pub fn column(&self, v: Vec2) -> Option<f32> {
        (v.y > 0.0).then(|| self.half_w + v.x / v.y * self.focal)
    }

    /// Screen row of world height `h` at inverse depth `inv_z`.
    #[inline(always)]
    pub fn row(&self, h: f32, inv_z: f32) -> f32 {
        self.horizon - (h - self.eye_z) * self.focal * inv_z
    }

    /// World height seen through the centre of row `y` at `depth`.
    #[inline(always)]
    pub fn height_at_row(&self, y: i32, depth: f32) -> f32 {
        self.eye_z - (y as f32 + 0.5 - self.horizon) * depth / self.focal
    }

    /// Project the wall running from screen-left `l` to screen-right `r`.
    ///
    /// Returns `None` when nothing of it is in front of the near plane,
    /// inside the horizontal field of view, or wide enough to own a column.
    pub fn project_wall(&self, l: Vec2, r: Vec2) -> Option<ProjectedWall> {
        let a = self.to_view(l);
        let b = self.to_view(r);
        let (t0, t1) = self.clip_segment(a, b)?;

        // Unclipped ends stay bit-exact so neighbours meet on the same column.
        let pl = if t0 > 0.0 { a.lerp(b, t0) } else { a };
        let pr = if t1 < 1.0 { a.lerp(b, t1) } else { b };
        let sx_l = self.column(pl)?;
        let sx_r = self.column(pr)?;
        if sx_r - sx_l <= f32::EPSILON {
            return None;
        }

        let len = (r - l).length();
        let (inv_z_l, inv_z_r) = (1.0 / pl.y, 1.0 / pr.y);
        let columns = pixel_span(sx_l, sx_r, self.width as i32);
        if columns.is_empty() {
            return None;
        }

        Some(ProjectedWall {
            sx_l,
            sx_r,
            inv_z_l,
            inv_z_r,
            uoz_l: t0 * len * inv_z_l,
            uoz_r: t1 * len * inv_z_r,
            columns,
        })
    }

    /// Columns looking through a wall the eye is standing on.
    ///
    /// `l → r` is too close to project (on the near plane or on the eye
    /// itself), so each column ray is cast directly: it must head out
    /// through the wall (`dir · out > 0`) and cross its line within the
    /// segment.  The result sits at the near plane with `u` fixed at the
    /// foot of the eye on the wall.
    pub fn project_touching(&self, l: Vec2, r: Vec2, out: Vec2) -> Option<ProjectedWall> {
        let e = r - l;
        let len2 = e.length_squared();
        if len2 <= f32::EPSILON {
            return None;
        }

        let crosses = |x: i32| {
            let lateral = (x as f32 + 0.5 - self.half_w) / self.focal;
            let dir = self.forward + self.right * lateral;
            let denom = dir.perp_dot(e);
            if dir.dot(out) <= 0.0 || denom.abs() <= f32::EPSILON {
                return false;
            }
            let t = (l - self.eye).perp_dot(e) / denom;
            let s = (self.eye + dir * t - l).dot(e) / len2;
            (-TOUCH_SLACK..=1.0 + TOUCH_SLACK).contains(&s)
        };

        let lo = (0..self.width as i32).find(|&x| crosses(x))?;
        let hi = (lo..self.width as i32)
            .find(|&x| !crosses(x))
            .unwrap_or(self.width as i32);

        let u = ((self.eye - l).dot(e) / len2).clamp(0.0, 1.0) * len2.sqrt();
        let inv_z = 1.0 / self.near;
        Some(ProjectedWall {
            sx_l: lo as f32,
            sx_r: hi as f32,
            inv_z_l: inv_z,
            inv_z_r: inv_z,
            uoz_l: u * inv_z,
            uoz_r: u * inv_z,
            columns: ScreenInterval::new(lo, hi),
        })
    }

    /// Parametric clip of `a → b` against the near, left and right
    /// half-planes; returns the surviving `[t0, t1]`.
    pub fn clip_segment(&self, a: Vec2, b: Vec2) -> Option<(f32, f32)> {
        // Each plane is `f(p) >= 0` with f linear, so it crosses zero at
        // t = fa / (fa - fb).
        let (f, h) = (self.focal, self.half_w);
        let planes = [
            (a.y - self.near, b.y - self.near),
            (h * a.y + f * a.x, h * b.y + f * b.x),
            (h * a.y - f * a.x, h * b.y - f * b.x),
        ];

        let mut t0 = 0.0f32;
        let mut t1 = 1.0f32;
        for (fa, fb) in planes {
            if fa < 0.0 && fb < 0.0 {
                return None;
            }
            if fa < 0.0 {
                t0 = t0.max(fa / (fa - fb));
            } else if fb < 0.0 {
                t1 = t1.min(fa / (fa - fb));
            }
        }
        (t0 < t1).then_some((t0, t1))
    }
}

impl ProjectedWall {
    /// `(inv_z, u)` at the centre of column `x`.
    ///
    /// Both `1/z` and `u/z` are affine in screen x; `u` is recovered by
    /// dividing, which is what keeps the texture perspective-correct.
    #[inline(always)]
    pub fn at(&self, x: i32) -> (f32, f32) {
        let s = (x as f32 + 0.5 - self.sx_l) / (self.sx_r - self.sx_l);
        let inv_z = self.inv_z_l + (self.inv_z_r - self.inv_z_l) * s;
        let uoz = self.uoz_l + (self.uoz_r - self.uoz_l) * s;
        (inv_z, uoz / inv_z)
    }
}

/// Pixels whose centres lie in `[a, b)`, clamped to `[0, limit)`.
#[inline(always)]
pub fn pixel_span(a: f32, b: f32, limit: i32) -> ScreenInterval {
    let lo = ((a - 0.5).ceil() as i32).clamp(0, limit);
    let hi = ((b - 0.5).ceil() as i32).clamp(0, limit);
    ScreenInterval::new(lo, hi)
}

/// First pixel row whose centre is at or below `y`.
#[inline(always)]
pub fn pixel_edge(y: f32) -> i32 {
    let e = (y - 0.5).ceil();
    // Rows far off screen saturate instead of wrapping.
    e.clamp(i16::MIN as f32, i16::MAX as f32) as i32
}

/// Screen row narrowed to the `i16` the per-column row tables store.
#[inline(always)]
pub fn clamp_row(y: i32) -> i16 {
    y.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn view(yaw: f32) -> View {
        let cam = Camera::new(Vec2::ZERO, 5.0, yaw, FRAC_PI_2, 0);
        View::new(&cam, 64, 48, 0.1, 100.0)
    }

    #[test]
    fn straight_ahead_projects_to_centre() {
        let v = view(0.0);
        let p = v.to_view(vec2(10.0, 0.0));
        assert!((v.column(p).unwrap() - 32.0).abs() < 1e-4);
        assert!(v.column(vec2(0.0, 0.0)).is_none());
        assert!(v.column(vec2(3.0, -1.0)).is_none());
        // ceiling 5 above the eye at depth 10 with focal 32
        assert!((v.row(10.0, 0.1) - 8.0).abs() < 1e-4);
        assert!((v.row(0.0, 0.1) - 40.0).abs() < 1e-4);
    }

    #[test]
    fn wall_behind_camera_is_rejected() {
        let v = view(0.0);
        assert!(v.project_wall(vec2(-10.0, 10.0), vec2(-10.0, -10.0)).is_none());
    }

    #[test]
    fn wall_crossing_near_plane_keeps_visible_part() {
        let v = view(0.0);
        // runs from behind-left to front-right; only the front part survives
        let (t0, t1) = v.clip_segment(vec2(-4.0, -5.0), vec2(4.0, 5.0)).unwrap();
        assert!(t0 > 0.5 && t1 <= 1.0);
        let hit = vec2(-4.0, -5.0).lerp(vec2(4.0, 5.0), t0);
        assert!(hit.y >= v.near - 1e-4);
    }

    #[test]
    fn full_width_wall_covers_every_column() {
        let v = view(0.0);
        // east wall of a ±10 box, seen from the centre: screen-left is +z
        let pw = v.project_wall(vec2(10.0, 10.0), vec2(10.0, -10.0)).unwrap();
        assert_eq!(pw.columns, ScreenInterval::new(0, 64));
    }

    #[test]
    fn neighbours_share_columns_without_overlap() {
        let v = view(0.3);
        let shared = vec2(10.0, 1.7);
        let a = v.project_wall(vec2(10.0, 10.0), shared).unwrap();
        let b = v.project_wall(shared, vec2(10.0, -10.0)).unwrap();
        assert_eq!(a.columns.right, b.columns.left);
    }

    /// Interpolated `u` matches re-projecting the ray through each column.
    #[test]
    fn perspective_u_round_trip() {
        let v = view(0.4);
        let l = vec2(14.0, 9.0);
        let r = vec2(6.0, -7.0);
        let pw = v.project_wall(l, r).unwrap();
        assert!(pw.columns.len() > 10);

        for x in pw.columns.columns() {
            let (inv_z, u) = pw.at(x);

            // ray through the column centre, intersected with the wall
            let lateral = (x as f32 + 0.5 - v.half_w) / v.focal;
            let dir = v.forward + v.right * lateral;
            let e = r - l;
            let denom = dir.perp_dot(e);
            let t = (l - v.eye).perp_dot(e) / denom;
            let hit = v.eye + dir * t;

            let expected_u = (hit - l).length();
            assert!((u - expected_u).abs() < 1e-2, "col {x}: {u} vs {expected_u}");
            assert!((1.0 / inv_z - t).abs() < 1e-2);
        }
    }

    #[test]
    fn standing_on_a_wall_opens_every_column_through_it() {
        let cam = Camera::new(vec2(10.0, 0.0), 5.0, 0.0, FRAC_PI_2, 0);
        let v = View::new(&cam, 64, 48, 0.1, 100.0);
        let (l, r) = (vec2(10.0, 20.0), vec2(10.0, -20.0));
        // every point of the wall is at depth 0
        assert!(v.project_wall(l, r).is_none());

        let pw = v.project_touching(l, r, vec2(1.0, 0.0)).unwrap();
        assert_eq!(pw.columns, ScreenInterval::new(0, 64));
        let (inv_z, u) = pw.at(40);
        assert!((inv_z - 1.0 / v.near).abs() < 1e-3);
        assert!((u - 20.0).abs() < 1e-3);

        // looking back into the sector nothing goes through
        assert!(v.project_touching(l, r, vec2(-1.0, 0.0)).is_none());
    }

    #[test]
    fn touching_keeps_only_rays_heading_out() {
        // on the line x = 10 looking along it (+z): only the right half
        // of the screen looks out through +x
        let cam = Camera::new(vec2(10.0, 0.0), 5.0, FRAC_PI_2, FRAC_PI_2, 0);
        let v = View::new(&cam, 64, 48, 0.1, 100.0);
        let pw = v
            .project_touching(vec2(10.0, 1.0), vec2(10.0, -1.0), vec2(1.0, 0.0))
            .unwrap();
        assert_eq!(pw.columns, ScreenInterval::new(32, 64));
    }

    #[test]
    fn pixel_centre_rule() {
        assert_eq!(pixel_span(0.0, 3.5, 10), ScreenInterval::new(0, 3));
        assert_eq!(pixel_span(0.6, 3.6, 10), ScreenInterval::new(1, 4));
        assert_eq!(pixel_span(-5.0, 50.0, 10), ScreenInterval::new(0, 10));
        assert_eq!(pixel_edge(7.5), 7);
        assert_eq!(pixel_edge(7.6), 8);
        assert_eq!(pixel_edge(f32::MAX), i16::MAX as i32);
        assert_eq!(clamp_row(40_000), i16::MAX);
        assert_eq!(clamp_row(-40_000), i16::MIN);
        assert_eq!(clamp_row(123), 123);
    }
}
