use crate::{
    config::{RenderConfig, RenderFlags},
    renderer::{
        FrameStats, Renderer, Rgba, VisitHook,
        software::{occlusion::OcclusionTracker, portal::WorkItem, projection::View},
    },
    world::{Camera, FALLBACK, Level, Texture, TextureId, TextureProvider},
};

/// One vertical edge of a portal window, kept for the debug overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outline {
    pub x: i32,
    pub top: i32,
    pub bottom: i32,
}

pub struct Software {
    pub scratch: Vec<Rgba>,
    pub width: usize,
    pub height: usize,

    pub occlusion: OcclusionTracker,
    pub(super) work: Vec<WorkItem>,
    pub(super) outlines: Vec<Outline>,
    pub(super) stats: FrameStats,

    pub near: f32,
    pub far: f32,
    pub max_depth: u16,
    pub background: Rgba,
    pub void_colour: Rgba,
    pub flags: RenderFlags,
}

impl Default for Software {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

impl Software {
    pub fn new(cfg: &RenderConfig) -> Self {
        Self {
            scratch: Vec::new(),
            width: 0,
            height: 0,
            occlusion: OcclusionTracker::default(),
            work: Vec::new(),
            outlines: Vec::new(),
            stats: FrameStats::default(),
            near: cfg.near,
            far: cfg.far,
            max_depth: cfg.max_depth.max(1),
            background: cfg.background,
            void_colour: cfg.void_colour,
            flags: cfg.flags(),
        }
    }

    /// Swap in new settings between frames.
    pub fn configure(&mut self, cfg: &RenderConfig) {
        let keep = std::mem::take(&mut self.scratch);
        *self = Self {
            scratch: keep,
            width: self.width,
            height: self.height,
            ..Self::new(cfg)
        };
    }

    /// Stats of the last finished frame.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    #[inline(always)]
    pub(super) fn put(&mut self, x: i32, y: i32, c: Rgba) {
        self.scratch[y as usize * self.width + x as usize] = c;
    }

    /// Borrow texture `id`, falling back to the checkerboard on a miss.
    pub(super) fn resolve<'t, T>(&mut self, textures: &'t T, id: TextureId) -> &'t Texture
    where
        T: TextureProvider + ?Sized,
    {
        match textures.texture(id) {
            Ok(t) => t,
            Err(_) => {
                self.stats.texture_misses += 1;
                &*FALLBACK
            }
        }
    }
}

impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        // (re)allocate if resolution changed
        if w != self.width || h != self.height {
            if h > i16::MAX as usize {
                log::warn!("frame height {h} exceeds {}; lower rows stay background", i16::MAX);
            }
            self.width = w;
            self.height = h;
            self.scratch.resize(w * h, 0);
        }
        self.scratch.fill(self.background);

        self.occlusion.reset(w);
        self.work.clear();
        self.outlines.clear();
        self.stats = FrameStats::default();
    }

    fn draw_level<T, H>(
        &mut self,
        level: &Level,
        camera: &Camera,
        textures: &T,
        hook: &mut H,
    ) -> FrameStats
    where
        T: TextureProvider + ?Sized,
        H: VisitHook,
    {
        if self.width == 0 || self.height == 0 {
            return self.stats;
        }
        if camera.sector() as usize >= level.sectors.len() {
            log::warn!("camera sector {} not in level `{}`", camera.sector(), level.name);
            return self.stats;
        }

        let view = View::new(camera, self.width, self.height, self.near, self.far);
        self.traverse(level, &view, camera.sector(), textures, hook);

        if self.flags.contains(RenderFlags::PORTAL_OUTLINES) {
            for o in std::mem::take(&mut self.outlines) {
                self.draw_line(o.x, o.top, o.x, o.bottom - 1, super::portal::OUTLINE_COLOUR);
            }
        }

        let s = self.stats;
        if s.guard_trips > 0 || s.texture_misses > 0 {
            log::debug!(
                "frame: {} sectors, depth {}, {} guard trips, {} texture misses",
                s.sectors_visited,
                s.max_depth,
                s.guard_trips,
                s.texture_misses
            );
        }
        s
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, col: u32) {
        let mut x0 = x0;
        let mut y0 = y0;
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            if (0..self.width as i32).contains(&x0) && (0..self.height as i32).contains(&y0) {
                self.put(x0, y0, col);
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

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        submit(&self.scratch, self.width, self.height);
    }
}
