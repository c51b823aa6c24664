mod builder;
mod camera;
mod geometry;
mod helpers;
pub mod texture;

pub use geometry::{
    GeometryError, Level, Plane, Sector, SectorId, TextureMapping, Vertex, VertexId, Wall, WallId,
};

pub use builder::{LevelBuilder, SectorDef, WallDef};

pub use camera::{Camera, MAX_PITCH};

pub use texture::{
    FALLBACK, MIP_LEVELS, NO_TEXTURE, Texture, TextureBank, TextureError, TextureId,
    TextureProvider,
};
