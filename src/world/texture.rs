// Format-agnostic repository of textures built by the level loader.
// The renderer and world logic interact through `TextureId` only.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::renderer::Rgba;

/// Runtime handle for a texture in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type TextureId = u16;

/// `TextureId` whose pixels are the checkerboard fallback.
/// Always = 0 because `TextureBank::new()` inserts it first.
pub const NO_TEXTURE: TextureId = 0;

/// Pattern substituted whenever a lookup misses.
pub static FALLBACK: Lazy<Texture> = Lazy::new(Texture::default);

/// Levels kept per texture, full size first, each half the one before.
pub const MIP_LEVELS: usize = 3;

/// One resolution of a texture: 32-bit **ARGB** (0xAARRGGBB), row-major.
#[derive(Clone, Debug, PartialEq)]
struct MipLevel {
    w: usize,
    h: usize,
    pixels: Vec<Rgba>,
}

impl MipLevel {
    /// Box-filtered half-size copy; odd edges repeat their last texel.
    fn halved(&self) -> Self {
        let (w, h) = ((self.w / 2).max(1), (self.h / 2).max(1));
        let mut pixels = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                let mut sum = [0u32; 4];
                for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                    let sx = (2 * x + dx).min(self.w - 1);
                    let sy = (2 * y + dy).min(self.h - 1);
                    let c = self.pixels[sy * self.w + sx];
                    for (k, acc) in sum.iter_mut().enumerate() {
                        *acc += c >> (24 - 8 * k) & 0xFF;
                    }
                }
                pixels.push(sum.iter().fold(0, |c, ch| c << 8 | ch / 4));
            }
        }
        Self { w, h, pixels }
    }
}

/// An immutable texture with its mip chain.
///
/// Every level is at least 1×1, so sampling never divides by zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    name: String,
    mips: Vec<MipLevel>,
}

/// Convenience checkerboard 8×8 (magenta/black), the classic "missing" look.
impl Default for Texture {
    fn default() -> Self {
        Texture::checker("CHECKER", 8, 8, 1, 0xFF_FF00FF, 0xFF_000000)
    }
}

impl Texture {
    /// Wrap `w × h` row-major pixels.
    pub fn from_pixels(
        name: impl Into<String>,
        w: usize,
        h: usize,
        pixels: Vec<Rgba>,
    ) -> Result<Self, TextureError> {
        let name = name.into();
        if w == 0 || h == 0 || pixels.len() != w * h {
            return Err(TextureError::BadSize {
                name,
                w,
                h,
                len: pixels.len(),
            });
        }
        Ok(Self::with_mips(name, MipLevel { w, h, pixels }))
    }

    fn with_mips(name: String, base: MipLevel) -> Self {
        let mut mips = vec![base];
        while mips.len() < MIP_LEVELS {
            let next = mips[mips.len() - 1].halved();
            mips.push(next);
        }
        Self { name, mips }
    }

    /// Texture whose texel at `(x, y)` is `f(x, y)`; sizes below 1 become 1.
    fn generate(name: impl Into<String>, w: usize, h: usize, f: impl Fn(usize, usize) -> Rgba) -> Self {
        let (w, h) = (w.max(1), h.max(1));
        let pixels = (0..h).flat_map(|y| (0..w).map(move |x| (x, y))).map(|(x, y)| f(x, y)).collect();
        Self::with_mips(name.into(), MipLevel { w, h, pixels })
    }

    /// Single-colour texture of the given size.
    pub fn solid(name: impl Into<String>, w: usize, h: usize, colour: Rgba) -> Self {
        Self::generate(name, w, h, |_, _| colour)
    }

    /// Checkerboard with square cells of `cell` texels.
    pub fn checker(name: impl Into<String>, w: usize, h: usize, cell: usize, a: Rgba, b: Rgba) -> Self {
        let cell = cell.max(1);
        Self::generate(name, w, h, |x, y| if ((x / cell) ^ (y / cell)) & 1 == 0 { a } else { b })
    }

    /// Running-bond brick wall: courses of `brick_h` texels separated by one
    /// texel of mortar, every other course offset by half a brick.
    pub fn bricks(
        name: impl Into<String>,
        w: usize,
        h: usize,
        brick_w: usize,
        brick_h: usize,
        brick: Rgba,
        mortar: Rgba,
    ) -> Self {
        let (bw, bh) = (brick_w.max(2), brick_h.max(2));
        Self::generate(name, w, h, |x, y| {
            let shift = if (y / bh) % 2 == 0 { 0 } else { bw / 2 };
            let joint = y % bh == 0 || (x + shift) % bw == 0;
            if joint { mortar } else { brick }
        })
    }

    /// Vertical stripes `stripe` texels wide.
    pub fn stripes(name: impl Into<String>, w: usize, h: usize, stripe: usize, a: Rgba, b: Rgba) -> Self {
        let stripe = stripe.max(1);
        Self::generate(name, w, h, |x, _| if (x / stripe) % 2 == 0 { a } else { b })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.mips[0].w
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.mips[0].h
    }

    /// Full-size pixels.
    pub fn pixels(&self) -> &[Rgba] {
        &self.mips[0].pixels
    }

    /// Size of mip `level`, clamped to the coarsest one.
    pub fn mip_size(&self, level: usize) -> (usize, usize) {
        let m = &self.mips[level.min(self.mips.len() - 1)];
        (m.w, m.h)
    }

    /// Wrapped lookup: any `(u, v)` tiles rather than clamps.
    #[inline(always)]
    pub fn sample(&self, u: f32, v: f32) -> Rgba {
        self.sample_mip(u, v, 0)
    }

    /// Wrapped lookup in mip `level`.  `(u, v)` stay in full-size texels.
    #[inline(always)]
    pub fn sample_mip(&self, u: f32, v: f32, level: usize) -> Rgba {
        let level = level.min(self.mips.len() - 1);
        let m = &self.mips[level];
        let scale = 1.0 / (1u32 << level) as f32;
        let x = ((u * scale).floor() as i32).rem_euclid(m.w as i32) as usize;
        let y = ((v * scale).floor() as i32).rem_euclid(m.h as i32) as usize;
        m.pixels[y * m.w + x]
    }
}

/// Lookup and insertion failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    #[error("texture `{0}` defined twice")]
    Duplicate(String),

    #[error("no texture with id {0}")]
    BadId(TextureId),

    #[error("texture `{name}` is {w}×{h} but has {len} pixels")]
    BadSize {
        name: String,
        w: usize,
        h: usize,
        len: usize,
    },
}

/// Anything the renderer can pull texels from.
///
/// A miss is not fatal: the renderer substitutes [`FALLBACK`] and keeps going.
pub trait TextureProvider {
    fn texture(&self, id: TextureId) -> Result<&Texture, TextureError>;
}

/// Named textures addressed by dense ids.
///
/// Slot [`NO_TEXTURE`] always holds the fallback pattern under the name
/// `"MISSING"`, so every id the loader hands out for an unknown name still
/// resolves.
pub struct TextureBank {
    ids: HashMap<String, TextureId>,
    textures: Vec<Texture>,
}

impl Default for TextureBank {
    fn default() -> Self {
        Self::default_with_checker()
    }
}

impl TextureBank {
    pub fn new(fallback: Texture) -> Self {
        Self {
            ids: HashMap::from([("MISSING".to_owned(), NO_TEXTURE)]),
            textures: vec![fallback],
        }
    }

    pub fn default_with_checker() -> Self {
        Self::new(Texture::default())
    }

    /// Stored textures, fallback included.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// True while only the fallback is present.
    pub fn is_empty(&self) -> bool {
        self.textures.len() <= 1
    }

    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.ids.get(name).copied()
    }

    /// Like [`id`](Self::id) but unknown names map to [`NO_TEXTURE`].
    pub fn id_or_missing(&self, name: &str) -> TextureId {
        self.id(name).unwrap_or(NO_TEXTURE)
    }

    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.textures.get(id as usize).ok_or(TextureError::BadId(id))
    }

    /// Add `tex` under `name` and return its id.
    pub fn insert(&mut self, name: impl Into<String>, tex: Texture) -> Result<TextureId, TextureError> {
        let name = name.into();
        if self.ids.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        let id = self.textures.len() as TextureId;
        self.textures.push(tex);
        self.ids.insert(name, id);
        Ok(id)
    }
}

impl TextureProvider for TextureBank {
    #[inline]
    fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        TextureBank::texture(self, id)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
