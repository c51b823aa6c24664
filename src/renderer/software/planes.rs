use crate::{
    renderer::software::{
        Software,
        lighting::shade,
        occlusion::ScreenInterval,
        projection::{View, clamp_row},
    },
    world::{Plane, Texture},
};

/// Per-column row extents `[top, bottom)` one plane covers during a sector
/// visit.  Empty columns have `top >= bottom`.
#[derive(Clone, Debug)]
pub struct PlaneExtents {
    interval: ScreenInterval,
    top: Vec<i16>,
    bottom: Vec<i16>,
}

impl PlaneExtents {
    pub fn new(interval: ScreenInterval) -> Self {
        let n = interval.len() as usize;
        Self {
            interval,
            top: vec![0; n],
            bottom: vec![0; n],
        }
    }

    #[inline(always)]
    pub fn set(&mut self, x: i32, top: i32, bottom: i32) {
        let i = (x - self.interval.left) as usize;
        self.top[i] = clamp_row(top);
        self.bottom[i] = clamp_row(bottom);
    }

    #[inline(always)]
    pub fn rows(&self, x: i32) -> (i32, i32) {
        let i = (x - self.interval.left) as usize;
        (self.top[i] as i32, self.bottom[i] as i32)
    }

    /// Smallest row range holding every non-empty column.
    pub fn row_bounds(&self) -> Option<(i32, i32)> {
        self.top
            .iter()
            .zip(&self.bottom)
            .filter(|(t, b)| t < b)
            .fold(None, |acc, (&t, &b)| {
                let (lo, hi) = acc.unwrap_or((t, b));
                Some((lo.min(t), hi.max(b)))
            })
            .map(|(lo, hi)| (lo as i32, hi as i32))
    }
}

impl Software {
    /// Turn per-column extents into horizontal runs and paint them.
    pub(super) fn flush_plane(
        &mut self,
        view: &View,
        ext: &PlaneExtents,
        plane: &Plane,
        tex: &Texture,
        light: f32,
    ) {
        let Some((y_min, y_max)) = ext.row_bounds() else {
            return;
        };
        for y in y_min..y_max {
            let mut xs = None; // start of the current run

            for x in ext.interval.columns() {
                let (t, b) = ext.rows(x);
                let inside = t <= y && y < b;
                match (inside, xs) {
                    (true, None) => xs = Some(x),
                    (false, Some(s)) => {
                        self.emit_span(view, y, ScreenInterval::new(s, x), plane, tex, light);
                        xs = None;
                    }
                    _ => {}
                }
            }

            if let Some(s) = xs {
                // tail-run
                let run = ScreenInterval::new(s, ext.interval.right);
                self.emit_span(view, y, run, plane, tex, light);
            }
        }
    }

    /// Paint one row of a floor or ceiling.
    ///
    /// Depth is constant along a row, so the world position is affine in x.
    /// Rows on the wrong side of the horizon for this plane
    /// (ceiling below the eye, floor above it) come out with a negative
    /// depth and are skipped.
    #[inline(always)]
    fn emit_span(
        &mut self,
        view: &View,
        y: i32,
        run: ScreenInterval,
        plane: &Plane,
        tex: &Texture,
        light: f32,
    ) {
        let dy = (y as f32 + 0.5) - view.horizon;
        // Depth per unit of height between the eye and the plane.
        let ratio = view.focal / dy;
        let depth = (view.eye_z - plane.height) * ratio;
        if !depth.is_finite() || depth <= view.near {
            return;
        }
        let light = self.light_at(light, depth);
        let mip = self.mip_at(depth, ratio);

        let scale = depth / view.focal; // world units per pixel
        let centre = view.eye + view.forward * depth;

        for x in run.columns() {
            let world = centre + view.right * ((x as f32 + 0.5 - view.half_w) * scale);
            let tc = plane.mapping.apply(world);
            self.put(x, y, shade(tex.sample_mip(tc.x, tc.y, mip), light));
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderFlags;
    use crate::renderer::Renderer;
    use crate::world::Camera;
    use glam::{Vec2, vec2};
    use std::f32::consts::FRAC_PI_2;

    fn setup(yaw: f32) -> (Software, View) {
        let mut sw = Software::default();
        sw.begin_frame(64, 48);
        let cam = Camera::new(vec2(3.0, -2.0), 5.0, yaw, FRAC_PI_2, 0);
        (sw, View::new(&cam, 64, 48, 0.1, 100.0))
    }

    fn full(top: i32, bottom: i32) -> PlaneExtents {
        let mut e = PlaneExtents::new(ScreenInterval::new(0, 64));
        for x in 0..64 {
            e.set(x, top, bottom);
        }
        e
    }

    #[test]
    fn bounds_skip_empty_columns() {
        let mut e = PlaneExtents::new(ScreenInterval::new(10, 14));
        assert_eq!(e.row_bounds(), None);
        e.set(11, 30, 40);
        e.set(13, 25, 33);
        e.set(12, 5, 5);
        assert_eq!(e.row_bounds(), Some((25, 40)));
    }

    /// Each floor pixel shows the texel under the ray through its centre.
    #[test]
    fn floor_texels_match_ray_hits() {
        let (mut sw, view) = setup(0.7);
        sw.flags.remove(RenderFlags::MIPMAPS);
        let tex = Texture::checker("C", 2, 2, 1, 0xFF_FFFFFF, 0xFF_000000);
        let floor = Plane::new(0.0, 1);
        sw.flush_plane(&view, &full(30, 48), &floor, &tex, 1.0);

        for (x, y) in [(3, 30), (40, 31), (63, 47), (20, 39)] {
            let lat = (x as f32 + 0.5 - view.half_w) / view.focal;
            let down = (y as f32 + 0.5 - view.horizon) / view.focal;
            let t = view.eye_z / down; // eye is 5 above the floor
            let hit: Vec2 = view.eye + (view.forward + view.right * lat) * t;
            assert_eq!(sw.scratch[y as usize * 64 + x as usize], tex.sample(hit.x, hit.y));
        }
    }

    #[test]
    fn rows_near_the_horizon_sample_coarser_levels() {
        let (mut sw, view) = setup(0.0);
        let tex = Texture::checker("C", 2, 2, 1, 0xFF_FFFFFF, 0xFF_000000);
        let floor = Plane::new(0.0, 1);
        sw.flush_plane(&view, &full(24, 48), &floor, &tex, 1.0);

        // row 24 is 320 units out at a grazing angle: averaged to grey
        assert!((0..64).all(|x| sw.scratch[24 * 64 + x] == 0xFF_7F7F7F));
        // the bottom row is 10 units out and keeps the full-size cells
        let bottom = &sw.scratch[47 * 64..48 * 64];
        assert!(bottom.contains(&0xFF_FFFFFF) && bottom.contains(&0xFF_000000));
        assert!(!bottom.contains(&0xFF_7F7F7F));
    }

    #[test]
    fn extents_saturate_rows_past_i16() {
        let mut e = PlaneExtents::new(ScreenInterval::new(0, 2));
        e.set(0, -70_000, 70_000);
        assert_eq!(e.rows(0), (i16::MIN as i32, i16::MAX as i32));
        e.set(1, 0, 40_000);
        assert_eq!(e.row_bounds(), Some((i16::MIN as i32, i16::MAX as i32)));
    }

    #[test]
    fn plane_on_the_wrong_side_is_not_drawn() {
        let (mut sw, view) = setup(0.0);
        let tex = Texture::solid("S", 1, 1, 0xFF_ABCDEF);
        // ceiling below the eye, asked to fill the upper half
        let low = Plane::new(2.0, 1);
        sw.flush_plane(&view, &full(0, 24), &low, &tex, 1.0);
        assert!(!sw.scratch.contains(&0xFF_ABCDEF));

        // the same plane is fine below the horizon
        sw.flush_plane(&view, &full(24, 48), &low, &tex, 1.0);
        assert_eq!(sw.scratch[40 * 64 + 5], 0xFF_ABCDEF);
    }
}
