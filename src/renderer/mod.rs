//! Rendering abstraction layer.
//!
//! *The rest of the engine never touches a pixel buffer directly.*
//! It hands a [`Level`], a [`Camera`] and a [`TextureProvider`] to a type
//! that implements [`Renderer`] and gets a finished frame back through the
//! `end_frame` closure.
//!
//! * You can plug multiple back-ends (`renderer::software`, …) without
//!   changing game logic.
//! * A helper blanket-impl [`RendererExt`] adds `draw_frame` / `render_into`
//!   so call-sites stay short.

use crate::world::{Camera, Level, SectorId, TextureProvider};

pub use software::ScreenInterval;

/// Pixel format of the software frame-buffer (0xAARRGGBB).
pub type Rgba = u32;

/// Caller-owned pixel storage, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Rgba>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.width + x]
    }

    /// Column `x`, top to bottom.
    pub fn column(&self, x: usize) -> impl Iterator<Item = Rgba> + '_ {
        (0..self.height).map(move |y| self.get(x, y))
    }
}

/// Per-frame counters returned by every render call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub sectors_visited: u32,
    /// Deepest work item processed; the camera sector is depth 1.
    pub max_depth: u16,
    /// Portals truncated by the cycle or depth guard.
    pub guard_trips: u32,
    pub walls_drawn: u32,
    /// Surfaces drawn with the fallback pattern.
    pub texture_misses: u32,
}

/// Read-only snapshot handed to a [`VisitHook`] when a sector is entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectorVisit {
    pub sector: SectorId,
    /// Screen columns this visit may draw into.
    pub interval: ScreenInterval,
    pub depth: u16,
    /// Columns already solid when the visit started.
    pub solid_columns: i32,
}

/// Per-visit callback, the extension point for sprites or decals that must
/// respect portal windows.
pub trait VisitHook {
    fn sector_visited(&mut self, _visit: &SectorVisit) {}
}

/// Hook that ignores every visit.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHook;

impl VisitHook for NoHook {}

impl<F: FnMut(&SectorVisit)> VisitHook for F {
    fn sector_visited(&mut self, visit: &SectorVisit) {
        self(visit)
    }
}

/// A renderer that owns an internal scratch buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
/// Software callers typically forward it to their window-manager.
pub trait Renderer {
    /// (Re)allocate internal scratch for the requested resolution and clear it.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// Paint everything visible from `camera` into the scratch buffer.
    fn draw_level<T, H>(
        &mut self,
        level: &Level,
        camera: &Camera,
        textures: &T,
        hook: &mut H,
    ) -> FrameStats
    where
        T: TextureProvider + ?Sized,
        H: VisitHook;

    /// Plot a clipped line in screen space.
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, col: Rgba);

    /// Finish the frame and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Rgba], w, h)` is run exactly once per frame.
    /// * Software caller passes `|fb, w, h| window.update_with_buffer(fb, w, h)`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}

/// Convenience blanket-impl with one-liner frame adaptors.
pub trait RendererExt: Renderer {
    fn draw_frame<T, F>(
        &mut self,
        width: usize,
        height: usize,
        level: &Level,
        camera: &Camera,
        textures: &T,
        submit: F,
    ) -> FrameStats
    where
        T: TextureProvider + ?Sized,
        F: FnOnce(&[Rgba], usize, usize),
    {
        self.begin_frame(width, height);
        let stats = self.draw_level(level, camera, textures, &mut NoHook);
        self.end_frame(submit);
        stats
    }

    /// Render one frame at the size of `out` and copy it there.
    fn render_into<T, H>(
        &mut self,
        level: &Level,
        camera: &Camera,
        textures: &T,
        hook: &mut H,
        out: &mut FrameBuffer,
    ) -> FrameStats
    where
        T: TextureProvider + ?Sized,
        H: VisitHook,
    {
        self.begin_frame(out.width, out.height);
        let stats = self.draw_level(level, camera, textures, hook);
        self.end_frame(|fb, _, _| out.pixels.copy_from_slice(fb));
        stats
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}

pub mod software;
