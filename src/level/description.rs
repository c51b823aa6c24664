//! On-disk level description (RON).
//!
//! ```ron
//! (
//!     name: "two rooms",
//!     textures: [
//!         (name: "STONE", pattern: Bricks(w: 32, h: 32, brick_w: 16, brick_h: 8,
//!                                         brick: 0xFF8A4B38, mortar: 0xFF5A5A5A)),
//!     ],
//!     vertices: [(-8.0, -8.0), (8.0, -8.0), (8.0, 8.0), (-8.0, 8.0)],
//!     sectors: [
//!         (
//!             floor: (height: 0.0, texture: "STONE"),
//!             ceiling: (height: 12.0, texture: "STONE"),
//!             corners: [0, 1, 2, 3],
//!             walls: [(texture: "STONE"), (texture: "STONE"),
//!                     (texture: "STONE"), (texture: "STONE")],
//!         ),
//!     ],
//!     start: (pos: (0.0, 0.0), angle: 0.0, eye_height: 6.0),
//! )
//! ```
//!
//! Texture names are resolved by the loader; the types here are plain data.

use serde::{Deserialize, Serialize};

use crate::renderer::Rgba;
use crate::world::SectorId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDesc {
    pub name: String,
    #[serde(default)]
    pub textures: Vec<TextureDesc>,
    /// Plan positions `(x, z)`.
    pub vertices: Vec<(f32, f32)>,
    pub sectors: Vec<SectorDesc>,
    pub start: StartDesc,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureDesc {
    pub name: String,
    pub pattern: Pattern,
}

/// Procedural texture recipes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Solid {
        colour: Rgba,
    },
    Checker {
        w: usize,
        h: usize,
        cell: usize,
        a: Rgba,
        b: Rgba,
    },
    Bricks {
        w: usize,
        h: usize,
        brick_w: usize,
        brick_h: usize,
        brick: Rgba,
        mortar: Rgba,
    },
    Stripes {
        w: usize,
        h: usize,
        stripe: usize,
        a: Rgba,
        b: Rgba,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingDesc {
    pub offset: (f32, f32),
    pub scale: (f32, f32),
}

impl Default for MappingDesc {
    fn default() -> Self {
        Self {
            offset: (0.0, 0.0),
            scale: (1.0, 1.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaneDesc {
    pub height: f32,
    pub texture: String,
    #[serde(default)]
    pub mapping: MappingDesc,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallDesc {
    pub texture: String,
    #[serde(default)]
    pub portal: Option<SectorId>,
    #[serde(default)]
    pub mapping: MappingDesc,
}

fn full_light() -> f32 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectorDesc {
    pub floor: PlaneDesc,
    pub ceiling: PlaneDesc,
    #[serde(default = "full_light")]
    pub light: f32,
    /// Indices into `LevelDesc::vertices`, counter-clockwise.
    pub corners: Vec<usize>,
    /// One per edge, `corners[i] → corners[i + 1]`.
    pub walls: Vec<WallDesc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StartDesc {
    pub pos: (f32, f32),
    /// Degrees, 0 = +x, counter-clockwise.
    pub angle: f32,
    /// Eye height above the floor of the start sector.
    pub eye_height: f32,
}
