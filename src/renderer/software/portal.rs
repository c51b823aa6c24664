//! Portal traversal: the visibility pass that replaces a depth buffer.
//!
//! Sectors are visited from an explicit LIFO work-list, starting at the
//! camera's sector with the whole screen as its window.  Each visit paints
//! the sector's facing walls, hands every portal opening to the neighbour
//! as a narrower window, paints its own floor and ceiling, and finally marks
//! every column it did not hand on as solid.
//!
//! Sibling windows never share a column, and a child window lies inside
//! its parent's, so the order in which the work-list drains does not matter
//! as long as every path is walked near to far.

use smallvec::{SmallVec, smallvec};

use crate::{
    config::RenderFlags,
    renderer::{
        Rgba, SectorVisit, VisitHook,
        software::{
            Software,
            occlusion::{OcclusionTracker, ScreenInterval},
            planes::PlaneExtents,
            projection::{View, clamp_row, pixel_edge},
            renderer::Outline,
        },
    },
    world::{Level, Sector, SectorId, TextureProvider},
};

/// Colour of the debug portal outlines.
pub const OUTLINE_COLOUR: Rgba = 0xFF_00_FF_00;

/// How close the eye must be to a portal to look through it without a
/// projectable segment.
const TOUCH_DISTANCE: f32 = 1e-3;

/// Screen region a sector visit may draw into: a column interval plus the
/// open rows `[top, bottom)` of every column in it.
#[derive(Clone, Debug, PartialEq)]
pub struct PortalWindow {
    pub interval: ScreenInterval,
    pub top: Vec<i16>,
    pub bottom: Vec<i16>,
}

impl PortalWindow {
    /// Whole screen.
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            interval: ScreenInterval::new(0, width as i32),
            top: vec![0; width],
            bottom: vec![clamp_row(height as i32); width],
        }
    }

    /// Open rows of column `x`.
    #[inline(always)]
    pub fn rows(&self, x: i32) -> (i32, i32) {
        let i = (x - self.interval.left) as usize;
        (self.top[i] as i32, self.bottom[i] as i32)
    }
}

/// One pending sector visit.
#[derive(Clone, Debug)]
pub struct WorkItem {
    pub sector: SectorId,
    pub window: PortalWindow,
    /// The camera sector is depth 1.
    pub depth: u16,
    /// Sectors from the camera down to and including `sector`.
    pub path: SmallVec<[SectorId; 16]>,
}

/// Per-visit scratch, indexed by `x - window.interval.left`.
pub(super) struct SectorPass<'a> {
    pub sector: &'a Sector,
    pub window: &'a PortalWindow,
    /// Column was still open when the visit started.
    pub live: Vec<bool>,
    pub ceiling: PlaneExtents,
    pub floor: PlaneExtents,
    /// Opening left by the portal wall currently being processed.
    pub open_top: Vec<i16>,
    pub open_bottom: Vec<i16>,
    /// Column now belongs to a child visit.
    pub handed: Vec<bool>,
}

impl<'a> SectorPass<'a> {
    fn new(
        sector: &'a Sector,
        window: &'a PortalWindow,
        occlusion: &OcclusionTracker,
        view: &View,
    ) -> Self {
        let iv = window.interval;
        let n = iv.len() as usize;
        let live: Vec<bool> = iv.columns().map(|x| !occlusion.is_solid(x)).collect();

        // Columns no wall reaches (near-clipped corners) split at the horizon.
        let horizon = pixel_edge(view.horizon);
        let mut ceiling = PlaneExtents::new(iv);
        let mut floor = PlaneExtents::new(iv);
        for x in iv.columns() {
            if live[(x - iv.left) as usize] {
                let (t, b) = window.rows(x);
                let h = horizon.clamp(t, b);
                ceiling.set(x, t, h);
                floor.set(x, h, b);
            }
        }

        Self {
            sector,
            window,
            live,
            ceiling,
            floor,
            open_top: vec![0; n],
            open_bottom: vec![0; n],
            handed: vec![false; n],
        }
    }

    #[inline(always)]
    pub fn idx(&self, x: i32) -> usize {
        (x - self.window.interval.left) as usize
    }

    #[inline(always)]
    fn is_open(&self, x: i32) -> bool {
        let i = self.idx(x);
        self.live[i] && self.open_top[i] < self.open_bottom[i]
    }

    fn child_window(&self, run: ScreenInterval) -> PortalWindow {
        PortalWindow {
            interval: run,
            top: run.columns().map(|x| self.open_top[self.idx(x)]).collect(),
            bottom: run.columns().map(|x| self.open_bottom[self.idx(x)]).collect(),
        }
    }
}

/// Maximal runs of `range` where `pred` holds, left to right.
fn runs_where(
    range: ScreenInterval,
    mut pred: impl FnMut(i32) -> bool,
) -> SmallVec<[ScreenInterval; 8]> {
    let mut runs = SmallVec::new();
    let mut start = None;
    for x in range.columns() {
        match (pred(x), start) {
            (true, None) => start = Some(x),
            (false, Some(s)) => {
                runs.push(ScreenInterval::new(s, x));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(ScreenInterval::new(s, range.right));
    }
    runs
}

impl Software {
    pub(super) fn traverse<T, H>(
        &mut self,
        level: &Level,
        view: &View,
        start: SectorId,
        textures: &T,
        hook: &mut H,
    ) where
        T: TextureProvider + ?Sized,
        H: VisitHook,
    {
        self.work.clear();
        self.work.push(WorkItem {
            sector: start,
            window: PortalWindow::full(self.width, self.height),
            depth: 1,
            path: smallvec![start],
        });

        while let Some(item) = self.work.pop() {
            // Everything this branch could show is already painted.
            if self.occlusion.is_range_fully_solid(item.window.interval) {
                continue;
            }
            self.visit_sector(level, view, item, textures, hook);
        }
    }

    fn visit_sector<T, H>(
        &mut self,
        level: &Level,
        view: &View,
        item: WorkItem,
        textures: &T,
        hook: &mut H,
    ) where
        T: TextureProvider + ?Sized,
        H: VisitHook,
    {
        let iv = item.window.interval;
        self.stats.sectors_visited += 1;
        self.stats.max_depth = self.stats.max_depth.max(item.depth);
        hook.sector_visited(&SectorVisit {
            sector: item.sector,
            interval: iv,
            depth: item.depth,
            solid_columns: self.occlusion.solid_count(),
        });

        let sector = level.sector(item.sector);
        let mut pass = SectorPass::new(sector, &item.window, &self.occlusion, view);

        /* walls, in winding order --------------------------------------*/
        for wall in level.walls_of(item.sector) {
            let (a, b) = level.wall_points(wall);
            // Seen from inside, v2 is the screen-left end.
            let projected = if wall.faces(level, view.eye) {
                view.project_wall(b, a)
            } else {
                None
            };
            // An eye on (or nearer than the near plane to) a portal still
            // looks through it.
            let projected = projected.or_else(|| {
                (wall.portal.is_some() && wall.touches(level, view.eye, TOUCH_DISTANCE))
                    .then(|| view.project_touching(b, a, wall.outward_normal(level)))
                    .flatten()
            });
            let Some(pw) = projected else {
                continue;
            };
            let cols = pw.columns.intersect(iv);
            if self.occlusion.is_range_fully_solid(cols) {
                continue;
            }

            self.stats.walls_drawn += 1;
            self.draw_wall(view, level, &mut pass, wall, &pw, cols, textures);

            match wall.portal {
                None => self.occlusion.mark_solid(cols),
                Some(next) => self.open_portal(&item, next, cols, &mut pass),
            }
        }

        /* floor and ceiling ---------------------------------------------*/
        let tex = self.resolve(textures, sector.ceiling.texture);
        self.flush_plane(view, &pass.ceiling, &sector.ceiling, tex, sector.light);
        let tex = self.resolve(textures, sector.floor.texture);
        self.flush_plane(view, &pass.floor, &sector.floor, tex, sector.light);

        /* whatever was not handed on is finished ------------------------*/
        for run in runs_where(iv, |x| !pass.handed[pass.idx(x)]) {
            self.occlusion.mark_solid(run);
        }
    }

    /// Queue the neighbour behind a portal wall for every run of columns
    /// with a non-empty opening.  Columns whose opening closed are finished.
    fn open_portal(
        &mut self,
        item: &WorkItem,
        next: SectorId,
        cols: ScreenInterval,
        pass: &mut SectorPass,
    ) {
        for run in runs_where(cols, |x| !pass.is_open(x)) {
            self.occlusion.mark_solid(run);
        }

        let guarded = item.path.contains(&next) || item.depth >= self.max_depth;
        for run in runs_where(cols, |x| pass.is_open(x)) {
            let window = pass.child_window(run);

            if guarded {
                self.stats.guard_trips += 1;
                log::trace!(
                    "portal {} -> {} cut at depth {} over columns {}..{}",
                    item.sector,
                    next,
                    item.depth,
                    run.left,
                    run.right
                );
                for x in run.columns() {
                    let (t, b) = window.rows(x);
                    for y in t..b {
                        self.put(x, y, self.void_colour);
                    }
                }
                self.occlusion.mark_solid(run);
                continue;
            }

            if self.flags.contains(RenderFlags::PORTAL_OUTLINES) {
                for x in [run.left, run.right - 1] {
                    let (top, bottom) = window.rows(x);
                    self.outlines.push(Outline { x, top, bottom });
                }
            }
            for x in run.columns() {
                let i = pass.idx(x);
                pass.handed[i] = true;
            }

            let mut path = item.path.clone();
            path.push(next);
            self.work.push(WorkItem {
                sector: next,
                window,
                depth: item.depth + 1,
                path,
            });
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::RenderConfig,
        level::{LoadedLevel, samples},
        renderer::{FrameBuffer, NoHook, Renderer, RendererExt},
        world::Camera,
    };

    fn render(
        sample: &LoadedLevel,
        cfg: &RenderConfig,
        cam: &Camera,
    ) -> (FrameBuffer, crate::renderer::FrameStats, Vec<SectorVisit>) {
        let mut sw = Software::new(cfg);
        let mut fb = FrameBuffer::new(64, 48);
        let mut visits = Vec::new();
        let mut hook = |v: &SectorVisit| visits.push(*v);
        let stats = sw.render_into(&sample.level, cam, &sample.textures, &mut hook, &mut fb);
        assert!(sw.occlusion.all_solid(), "frame left open columns");
        (fb, stats, visits)
    }

    #[test]
    fn runs_split_on_predicate() {
        let runs = runs_where(ScreenInterval::new(0, 10), |x| x % 4 != 0);
        assert_eq!(
            runs.as_slice(),
            &[
                ScreenInterval::new(1, 4),
                ScreenInterval::new(5, 8),
                ScreenInterval::new(9, 10)
            ]
        );
        assert!(runs_where(ScreenInterval::new(3, 3), |_| true).is_empty());
    }

    #[test]
    fn full_window_saturates_tall_screens() {
        let w = PortalWindow::full(3, 40_000);
        assert_eq!(w.rows(2), (0, i16::MAX as i32));
        assert_eq!(PortalWindow::full(3, 48).rows(0), (0, 48));
    }

    #[test]
    fn camera_on_a_portal_line_looks_through_it() {
        let s = samples::corridor(3).unwrap();
        // exactly on the shared wall of sectors 0 and 1, still in sector 0
        let cam = Camera::new(glam::vec2(10.0, 0.0), 4.0, 0.0, 1.2, 0);
        let (fb, stats, visits) = render(&s, &RenderConfig::default(), &cam);
        assert_eq!(visits.iter().map(|v| v.sector).collect::<Vec<_>>(), [0, 1, 2]);
        assert_eq!(stats.guard_trips, 0);
        assert_eq!(visits[1].interval, ScreenInterval::new(0, 64));
        assert_eq!(fb.get(32, 24), samples::WALL);

        // backing onto the same line shows nothing of sector 1
        let back = Camera::new(glam::vec2(10.0, 0.0), 4.0, std::f32::consts::PI, 1.2, 0);
        let (_, stats, _) = render(&s, &RenderConfig::default(), &back);
        assert_eq!(stats.sectors_visited, 1);
    }

    #[test]
    fn corridor_depth_matches_chain_length() {
        let s = samples::corridor(4).unwrap();
        let (_, stats, visits) = render(&s, &RenderConfig::default(), &s.start.camera(1.2));
        assert_eq!(stats.max_depth, 4);
        assert_eq!(stats.guard_trips, 0);
        // one visit per sector along the single chain
        let sectors: Vec<_> = visits.iter().map(|v| v.sector).collect();
        assert_eq!(sectors, [0, 1, 2, 3]);
        // windows only ever narrow
        for pair in visits.windows(2) {
            assert!(pair[1].interval.left >= pair[0].interval.left);
            assert!(pair[1].interval.right <= pair[0].interval.right);
        }
    }

    #[test]
    fn depth_guard_truncates_long_chains() {
        let s = samples::corridor(6).unwrap();
        let cfg = RenderConfig {
            max_depth: 3,
            void_colour: 0xFF_0000AB,
            ..RenderConfig::default()
        };
        let (fb, stats, _) = render(&s, &cfg, &s.start.camera(1.2));
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.guard_trips, 1);
        assert!(fb.pixels.contains(&0xFF_0000AB));
    }

    #[test]
    fn self_portal_terminates_on_the_visited_guard() {
        let s = samples::self_portal().unwrap();
        let (fb, stats, _) = render(&s, &RenderConfig::default(), &s.start.camera(1.2));
        assert_eq!(stats.max_depth, 1);
        assert!(stats.guard_trips >= 1);
        assert!(fb.pixels.contains(&RenderConfig::default().void_colour));
    }

    #[test]
    fn solid_count_never_drops_between_visits() {
        let s = samples::demo().unwrap();
        for yaw in [0.0f32, 0.9, 2.1, 3.7, 5.3] {
            let (_, _, visits) = render(&s, &RenderConfig::default(), &s.start.camera(1.3).turned(yaw));
            for pair in visits.windows(2) {
                assert!(pair[1].solid_columns >= pair[0].solid_columns);
            }
        }
    }

    #[test]
    fn outlines_mark_portal_edges() {
        let s = samples::corridor(2).unwrap();
        let cfg = RenderConfig {
            portal_outlines: true,
            ..RenderConfig::default()
        };
        let mut sw = Software::new(&cfg);
        sw.begin_frame(64, 48);
        let stats = sw.draw_level(&s.level, &s.start.camera(1.2), &s.textures, &mut NoHook);
        assert_eq!(stats.max_depth, 2);
        let mut green = 0;
        sw.end_frame(|fb, _, _| green = fb.iter().filter(|&&p| p == OUTLINE_COLOUR).count());
        assert!(green > 0);
    }
}
