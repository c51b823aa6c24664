use std::{fs, io, path::Path};

use glam::{Vec2, vec2};

use crate::{
    level::description::{LevelDesc, MappingDesc, Pattern, PlaneDesc},
    world::{
        Camera, GeometryError, Level, LevelBuilder, NO_TEXTURE, Plane, SectorDef, SectorId,
        Texture, TextureBank, TextureError, TextureId, TextureMapping, WallDef,
    },
};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read level: {0}")]
    Io(#[from] io::Error),

    #[error("bad level description: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("sector {sector} has {corners} corners but {walls} walls")]
    WallCount {
        sector: usize,
        corners: usize,
        walls: usize,
    },

    #[error("sector {sector} uses vertex {vertex}, only {total} defined")]
    UnknownCorner {
        sector: usize,
        vertex: usize,
        total: usize,
    },

    #[error("start position ({0}, {1}) is outside every sector")]
    StartOutside(f32, f32),
}

/// Where the player begins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Start {
    pub pos: Vec2,
    /// Radians, 0 = +x, counter-clockwise.
    pub yaw: f32,
    /// Absolute eye altitude.
    pub height: f32,
    pub sector: SectorId,
}

impl Start {
    pub fn camera(&self, fov: f32) -> Camera {
        Camera::new(self.pos, self.height, self.yaw, fov, self.sector)
    }
}

/// A ready-to-render level with its textures.
pub struct LoadedLevel {
    pub level: Level,
    pub textures: TextureBank,
    pub start: Start,
}

impl LoadedLevel {
    /// Resolve the start sector for a plan position and eye height above
    /// its floor.
    pub fn new(
        level: Level,
        textures: TextureBank,
        pos: Vec2,
        yaw: f32,
        eye_height: f32,
    ) -> Result<Self, LoadError> {
        let sector = level
            .locate_sector(pos)
            .ok_or(LoadError::StartOutside(pos.x, pos.y))?;
        let height = level.sector(sector).floor.height + eye_height;
        Ok(Self {
            level,
            textures,
            start: Start {
                pos,
                yaw,
                height,
                sector,
            },
        })
    }
}

impl Pattern {
    pub fn build(&self, name: &str) -> Texture {
        match *self {
            Pattern::Solid { colour } => Texture::solid(name, 1, 1, colour),
            Pattern::Checker { w, h, cell, a, b } => Texture::checker(name, w, h, cell, a, b),
            Pattern::Bricks {
                w,
                h,
                brick_w,
                brick_h,
                brick,
                mortar,
            } => Texture::bricks(name, w, h, brick_w, brick_h, brick, mortar),
            Pattern::Stripes { w, h, stripe, a, b } => Texture::stripes(name, w, h, stripe, a, b),
        }
    }
}

impl From<MappingDesc> for TextureMapping {
    fn from(m: MappingDesc) -> Self {
        TextureMapping::new(vec2(m.offset.0, m.offset.1), vec2(m.scale.0, m.scale.1))
    }
}

/// Name → id, warning once per unknown name.
fn lookup(bank: &TextureBank, missing: &mut Vec<String>, name: &str) -> TextureId {
    match bank.id(name) {
        Some(id) => id,
        None => {
            if !missing.iter().any(|m| m == name) {
                log::warn!("unknown texture `{name}`, using the fallback pattern");
                missing.push(name.to_owned());
            }
            NO_TEXTURE
        }
    }
}

fn plane(bank: &TextureBank, missing: &mut Vec<String>, p: &PlaneDesc) -> Plane {
    Plane {
        height: p.height,
        texture: lookup(bank, missing, &p.texture),
        mapping: p.mapping.into(),
    }
}

/// Build a validated level from its description.
pub fn build_level(desc: &LevelDesc) -> Result<LoadedLevel, LoadError> {
    let mut bank = TextureBank::default_with_checker();
    for t in &desc.textures {
        bank.insert(t.name.clone(), t.pattern.build(&t.name))?;
    }

    let mut b = LevelBuilder::new(desc.name.clone());
    let ids: Vec<_> = desc
        .vertices
        .iter()
        .map(|&(x, z)| b.vertex(vec2(x, z)))
        .collect();

    let mut missing = Vec::new();
    for (si, s) in desc.sectors.iter().enumerate() {
        if s.corners.len() != s.walls.len() {
            return Err(LoadError::WallCount {
                sector: si,
                corners: s.corners.len(),
                walls: s.walls.len(),
            });
        }
        let corners = s
            .corners
            .iter()
            .map(|&c| {
                ids.get(c).copied().ok_or(LoadError::UnknownCorner {
                    sector: si,
                    vertex: c,
                    total: ids.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let walls: Vec<_> = s
            .walls
            .iter()
            .map(|w| WallDef {
                texture: lookup(&bank, &mut missing, &w.texture),
                mapping: w.mapping.into(),
                portal: w.portal,
            })
            .collect();
        let def = SectorDef {
            floor: plane(&bank, &mut missing, &s.floor),
            ceiling: plane(&bank, &mut missing, &s.ceiling),
            light: s.light,
        };
        b.sector(def, &corners, &walls);
    }

    let level = b.build()?;
    log::info!(
        "level `{}`: {} sectors, {} walls, {} textures",
        level.name,
        level.sectors.len(),
        level.walls.len(),
        bank.len()
    );

    let st = &desc.start;
    LoadedLevel::new(
        level,
        bank,
        vec2(st.pos.0, st.pos.1),
        st.angle.to_radians(),
        st.eye_height,
    )
}

pub fn load_level_str(src: &str) -> Result<LoadedLevel, LoadError> {
    let desc: LevelDesc = ron::from_str(src)?;
    build_level(&desc)
}

pub fn load_level_file(path: impl AsRef<Path>) -> Result<LoadedLevel, LoadError> {
    load_level_str(&fs::read_to_string(path)?)
}

/*──────────────────────────────── Tests ───────────────────────────────*/
