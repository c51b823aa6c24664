use glam::vec2;

use crate::{
    config::RenderFlags,
    renderer::software::{
        Software,
        lighting::{diminish, mip_level, shade},
        occlusion::ScreenInterval,
        portal::SectorPass,
        projection::{ProjectedWall, View, clamp_row, pixel_edge},
    },
    world::{Level, Texture, TextureMapping, TextureProvider, Wall},
};

/// Everything needed to texture one wall column.
#[derive(Clone, Copy)]
pub(super) struct WallColumn<'t> {
    pub x: i32,
    pub depth: f32,
    /// Distance along the wall from its screen-left end.
    pub u: f32,
    /// Height where texture `v` is zero: the owning sector's ceiling, so
    /// upper strips, lower strips and solid walls share one texture.
    pub anchor: f32,
    pub mapping: TextureMapping,
    pub tex: &'t Texture,
    pub light: f32,
}

impl Software {
    /// Effective light of a surface `depth` units away in a sector lit `light`.
    #[inline(always)]
    pub(super) fn light_at(&self, light: f32, depth: f32) -> f32 {
        if self.flags.contains(RenderFlags::DISTANCE_SHADING) {
            light * diminish(depth, self.far)
        } else {
            light
        }
    }

    /// Mip level for a surface `depth` away; always 0 with mip-mapping off.
    #[inline(always)]
    pub(super) fn mip_at(&self, depth: f32, bias: f32) -> usize {
        if self.flags.contains(RenderFlags::MIPMAPS) {
            mip_level(depth, self.far, bias)
        } else {
            0
        }
    }

    /// Paint rows `[y0, y1)` of one wall column.
    ///
    /// Depth is constant down a column, so `v` advances by a fixed step.
    pub(super) fn draw_wall_rows(&mut self, view: &View, col: &WallColumn, y0: i32, y1: i32) {
        if y0 >= y1 {
            return;
        }
        let step = col.depth / view.focal * col.mapping.scale.y;
        let h = view.height_at_row(y0, col.depth);
        let mut tc = col.mapping.apply(vec2(col.u, col.anchor - h));
        let mip = self.mip_at(col.depth, 0.0);
        for y in y0..y1 {
            let c = col.tex.sample_mip(tc.x, tc.y, mip);
            self.put(col.x, y, shade(c, col.light));
            tc.y += step;
        }
    }

    /// Paint the visible columns `cols` of one facing wall of the sector
    /// being visited.
    ///
    /// A solid wall fills its column between the sector's ceiling and floor.
    /// A portal wall paints only the upper strip (neighbour ceiling lower)
    /// and lower strip (neighbour floor higher) and records the opening left
    /// in between in `pass.open_top` / `pass.open_bottom`.  Either way the
    /// rows above and below the wall are left to the sector's planes.
    pub(super) fn draw_wall<T>(
        &mut self,
        view: &View,
        level: &Level,
        pass: &mut SectorPass,
        wall: &Wall,
        pw: &ProjectedWall,
        cols: ScreenInterval,
        textures: &T,
    ) where
        T: TextureProvider + ?Sized,
    {
        let tex = self.resolve(textures, wall.texture);
        let front = pass.sector;
        let back = wall.portal.map(|s| level.sector(s));

        for x in cols.columns() {
            let i = pass.idx(x);
            pass.open_top[i] = 0;
            pass.open_bottom[i] = 0;
            if !pass.live[i] {
                continue;
            }

            let (inv_z, u) = pw.at(x);
            let depth = 1.0 / inv_z;
            let (wt, wb) = pass.window.rows(x);
            let top = pixel_edge(view.row(front.ceiling.height, inv_z)).clamp(wt, wb);
            let bottom = pixel_edge(view.row(front.floor.height, inv_z)).clamp(top, wb);
            pass.ceiling.set(x, wt, top);
            pass.floor.set(x, bottom, wb);

            let col = WallColumn {
                x,
                depth,
                u,
                anchor: front.ceiling.height,
                mapping: wall.mapping,
                tex,
                light: self.light_at(front.light, depth),
            };

            let Some(back) = back else {
                self.draw_wall_rows(view, &col, top, bottom);
                continue;
            };

            let mut open_top = top;
            let mut open_bottom = bottom;
            if back.ceiling.height < front.ceiling.height {
                open_top = pixel_edge(view.row(back.ceiling.height, inv_z)).clamp(top, bottom);
                self.draw_wall_rows(view, &col, top, open_top);
            }
            if back.floor.height > front.floor.height {
                open_bottom = pixel_edge(view.row(back.floor.height, inv_z)).clamp(open_top, bottom);
                self.draw_wall_rows(view, &col, open_bottom, bottom);
            }
            pass.open_top[i] = clamp_row(open_top);
            pass.open_bottom[i] = clamp_row(open_bottom);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Renderer;
    use crate::world::Camera;
    use glam::Vec2;
    use std::f32::consts::FRAC_PI_2;

    fn setup() -> (Software, View) {
        let mut sw = Software::default();
        sw.begin_frame(64, 48);
        let cam = Camera::new(Vec2::ZERO, 5.0, 0.0, FRAC_PI_2, 0);
        let view = View::new(&cam, 64, 48, 0.1, 100.0);
        (sw, view)
    }

    #[test]
    fn v_is_anchored_at_the_ceiling() {
        let (mut sw, view) = setup();
        // one texel per world unit, rows alternate every unit of height
        let tex = Texture::checker("H", 1, 2, 1, 1, 2);
        let col = WallColumn {
            x: 32,
            depth: 10.0,
            u: 0.0,
            anchor: 10.0,
            mapping: TextureMapping::IDENTITY,
            tex: &tex,
            light: 1.0,
        };
        // depth 10, focal 32: 3.2 rows per unit, ceiling at row 8
        sw.draw_wall_rows(&view, &col, 8, 40);
        let px = |y: usize| sw.scratch[y * 64 + 32];
        assert_eq!(px(8), 1); // v in [0, 1)
        assert_eq!(px(12), 2); // v in [1, 2)
        assert_eq!(px(15), 1); // v in [2, 3)
        assert_eq!(sw.scratch[7 * 64 + 32], sw.background);
    }

    #[test]
    fn far_walls_sample_a_coarser_level() {
        let (mut sw, view) = setup();
        let tex = Texture::checker("C", 4, 4, 1, 0xFF_FFFFFF, 0xFF_000000);
        let mut col = WallColumn {
            x: 10,
            depth: 10.0,
            u: 0.0,
            anchor: 10.0,
            mapping: TextureMapping::IDENTITY,
            tex: &tex,
            light: 1.0,
        };
        sw.draw_wall_rows(&view, &col, 20, 28);
        // up close the single-texel cells show through
        let near: Vec<_> = (20..28).map(|y| sw.scratch[y * 64 + 10]).collect();
        assert!(near.contains(&0xFF_FFFFFF));

        // 200 of 512 units away: level 1, where each cell pair is grey
        col.x = 11;
        col.depth = 200.0;
        sw.draw_wall_rows(&view, &col, 20, 28);
        assert!((20..28).all(|y| sw.scratch[y * 64 + 11] == 0xFF_7F7F7F));

        sw.flags.remove(RenderFlags::MIPMAPS);
        col.x = 12;
        sw.draw_wall_rows(&view, &col, 20, 28);
        assert!((20..28).all(|y| sw.scratch[y * 64 + 12] != 0xFF_7F7F7F));
    }

    #[test]
    fn distance_shading_darkens_far_walls() {
        let (mut sw, _) = setup();
        assert_eq!(sw.light_at(0.5, 400.0), 0.5);
        sw.flags |= RenderFlags::DISTANCE_SHADING;
        assert!(sw.light_at(1.0, 400.0) < 0.1);
        assert_eq!(sw.light_at(1.0, 0.0), 1.0);
    }
}
