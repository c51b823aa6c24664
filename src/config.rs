//! Render configuration, loadable from a RON file.
//!
//! ```ron
//! (
//!     width: 800,
//!     height: 500,
//!     max_depth: 48,
//!     distance_shading: true,
//! )
//! ```
//!
//! Missing fields fall back to [`RenderConfig::default`].

use std::{fs, io, path::Path};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::renderer::Rgba;

bitflags! {
    /// Optional per-frame features of the software renderer.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RenderFlags: u8 {
        const NONE             = 0x00;
        /// Darken surfaces towards `far`.
        const DISTANCE_SHADING = 0x01;
        /// Outline every portal window after the frame is drawn.
        const PORTAL_OUTLINES  = 0x02;
        /// Sample coarser texture levels for distant and grazing surfaces.
        const MIPMAPS          = 0x04;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] io::Error),

    #[error("bad config: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Near clip plane, world units in front of the eye.
    pub near: f32,
    /// Distance at which distance shading reaches black.
    pub far: f32,
    /// Longest portal chain followed from the camera sector (which counts as 1).
    pub max_depth: u16,
    pub background: Rgba,
    /// Fill for portal openings cut off by the traversal guard.
    pub void_colour: Rgba,
    pub distance_shading: bool,
    pub portal_outlines: bool,
    pub mipmaps: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
            near: 1e-5,
            far: 512.0,
            max_depth: 32,
            background: 0xFF_20_20_20,
            void_colour: 0xFF_00_00_00,
            distance_shading: false,
            portal_outlines: false,
            mipmaps: true,
        }
    }
}

impl RenderConfig {
    pub fn from_ron(src: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(src)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_ron(&fs::read_to_string(path)?)
    }

    pub fn flags(&self) -> RenderFlags {
        let mut f = RenderFlags::NONE;
        f.set(RenderFlags::DISTANCE_SHADING, self.distance_shading);
        f.set(RenderFlags::PORTAL_OUTLINES, self.portal_outlines);
        f.set(RenderFlags::MIPMAPS, self.mipmaps);
        f
    }
}
