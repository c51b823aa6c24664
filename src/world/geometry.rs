use glam::Vec2;

use crate::world::texture::TextureId;

/// Distance a corner may stray outside a wall line before the sector
/// counts as non-convex.
const CONVEX_SLACK: f32 = 1e-4;

pub type VertexId = u16;
pub type WallId = u16;
pub type SectorId = u16;

/// Runtime snapshot of one map (immutable after load).
///
/// Construct through [`LevelBuilder`](super::LevelBuilder) or the level
/// loader; both run [`Level::validate`] so the renderer never has to.
#[derive(Clone, Debug)]
pub struct Level {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub walls: Vec<Wall>,
    pub sectors: Vec<Sector>,
}

/*----------------------- simple primitives --------------------------*/

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub pos: Vec2, // (x, z) on the floor plan
}

/// Texture placement on a surface, in world units.
///
/// `texel = (world + offset) * scale`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureMapping {
    pub offset: Vec2,
    pub scale: Vec2,
}

impl TextureMapping {
    pub const IDENTITY: Self = Self {
        offset: Vec2::ZERO,
        scale: Vec2::ONE,
    };

    pub fn new(offset: Vec2, scale: Vec2) -> Self {
        Self { offset, scale }
    }

    #[inline(always)]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        (p + self.offset) * self.scale
    }
}

impl Default for TextureMapping {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/*--------------------------- walls ----------------------------------*/

/// One edge of a sector, `v1 → v2` in the sector's counter-clockwise
/// winding.  The sector interior lies on the left of that direction.
#[derive(Clone, Debug, PartialEq)]
pub struct Wall {
    pub v1: VertexId,
    pub v2: VertexId,
    pub texture: TextureId,
    pub mapping: TextureMapping,
    /// Neighbour seen through this wall; `None` for a solid wall.
    pub portal: Option<SectorId>,
}

/*--------------------------- sectors --------------------------------*/

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub height: f32,
    pub texture: TextureId,
    pub mapping: TextureMapping,
}

impl Plane {
    pub fn new(height: f32, texture: TextureId) -> Self {
        Self {
            height,
            texture,
            mapping: TextureMapping::IDENTITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sector {
    pub first_wall: WallId,
    pub wall_count: u16,
    pub floor: Plane,
    pub ceiling: Plane,
    /// Static brightness, 0.0 (black) ..= 1.0 (full).
    pub light: f32,
}

/*-------------------------- validation ------------------------------*/

/// Why a level was rejected at load time.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GeometryError {
    #[error("sector {0} has fewer than three walls")]
    TooFewWalls(SectorId),

    #[error("sector {sector} wall range {first}..{end} exceeds {total} walls")]
    WallRange {
        sector: SectorId,
        first: usize,
        end: usize,
        total: usize,
    },

    #[error("wall {wall} references unknown vertex {vertex}")]
    UnknownVertex { wall: WallId, vertex: VertexId },

    #[error("sector {sector}: wall {wall} does not start where the previous one ends")]
    OpenLoop { sector: SectorId, wall: WallId },

    #[error("wall {0} has zero length")]
    Degenerate(WallId),

    #[error("sector {sector} is not convex and counter-clockwise at wall {wall}")]
    NotConvex { sector: SectorId, wall: WallId },

    #[error("sector {sector}: floor {floor} is not below ceiling {ceiling}")]
    InvertedPlanes {
        sector: SectorId,
        floor: f32,
        ceiling: f32,
    },

    #[error("wall {wall} links to unknown sector {target}")]
    UnknownPortal { wall: WallId, target: SectorId },

    #[error("sector {sector} light {light} outside 0..=1")]
    BadLight { sector: SectorId, light: f32 },
}

impl Level {
    /// Walls of `sector` in winding order.
    #[inline]
    pub fn walls_of(&self, sector: SectorId) -> &[Wall] {
        let s = &self.sectors[sector as usize];
        let first = s.first_wall as usize;
        &self.walls[first..first + s.wall_count as usize]
    }

    #[inline(always)]
    pub fn sector(&self, id: SectorId) -> &Sector {
        &self.sectors[id as usize]
    }

    /// Both endpoints of `wall`.
    #[inline(always)]
    pub fn wall_points(&self, wall: &Wall) -> (Vec2, Vec2) {
        (
            self.vertices[wall.v1 as usize].pos,
            self.vertices[wall.v2 as usize].pos,
        )
    }

    /// Check every invariant the renderer relies on: closed, convex,
    /// counter-clockwise sectors with sane heights and resolvable links.
    pub fn validate(&self) -> Result<(), GeometryError> {
        for (sid, sector) in self.sectors.iter().enumerate() {
            let sid = sid as SectorId;

            if sector.wall_count < 3 {
                return Err(GeometryError::TooFewWalls(sid));
            }
            let first = sector.first_wall as usize;
            let end = first + sector.wall_count as usize;
            if end > self.walls.len() {
                return Err(GeometryError::WallRange {
                    sector: sid,
                    first,
                    end,
                    total: self.walls.len(),
                });
            }
            if !(sector.floor.height < sector.ceiling.height) {
                return Err(GeometryError::InvertedPlanes {
                    sector: sid,
                    floor: sector.floor.height,
                    ceiling: sector.ceiling.height,
                });
            }
            if !(0.0..=1.0).contains(&sector.light) {
                return Err(GeometryError::BadLight {
                    sector: sid,
                    light: sector.light,
                });
            }

            let walls = &self.walls[first..end];
            for (i, wall) in walls.iter().enumerate() {
                let wid = (first + i) as WallId;
                for v in [wall.v1, wall.v2] {
                    if v as usize >= self.vertices.len() {
                        return Err(GeometryError::UnknownVertex { wall: wid, vertex: v });
                    }
                }
                if let Some(target) = wall.portal {
                    if target as usize >= self.sectors.len() {
                        return Err(GeometryError::UnknownPortal { wall: wid, target });
                    }
                }
            }

            for (i, wall) in walls.iter().enumerate() {
                let wid = (first + i) as WallId;
                let next = &walls[(i + 1) % walls.len()];
                if wall.v2 != next.v1 {
                    return Err(GeometryError::OpenLoop {
                        sector: sid,
                        wall: (first + (i + 1) % walls.len()) as WallId,
                    });
                }

                let (a, b) = self.wall_points(wall);
                let (_, c) = self.wall_points(next);
                if (b - a).length_squared() <= f32::EPSILON {
                    return Err(GeometryError::Degenerate(wid));
                }
                // Left turn (or straight) at every corner ⇔ convex + CCW.
                if (b - a).perp_dot(c - b) < 0.0 {
                    return Err(GeometryError::NotConvex {
                        sector: sid,
                        wall: wid,
                    });
                }
            }

            // Left turns alone still admit loops that wind more than once
            // (a pentagram): every corner must also sit left of every wall.
            for (i, wall) in walls.iter().enumerate() {
                let (a, b) = self.wall_points(wall);
                let d = b - a;
                let slack = CONVEX_SLACK * d.length();
                let outside = walls
                    .iter()
                    .any(|w| d.perp_dot(self.vertices[w.v1 as usize].pos - a) < -slack);
                if outside {
                    return Err(GeometryError::NotConvex {
                        sector: sid,
                        wall: (first + i) as WallId,
                    });
                }
            }

            // All-straight loops have no area; also catches reversed
            // windings whose corners happen to be collinear.
            if self.signed_area(sid) <= 0.0 {
                return Err(GeometryError::NotConvex {
                    sector: sid,
                    wall: sector.first_wall,
                });
            }
        }
        Ok(())
    }

    /// Shoelace area, positive for counter-clockwise loops.
    pub fn signed_area(&self, sector: SectorId) -> f32 {
        self.walls_of(sector)
            .iter()
            .map(|w| {
                let (a, b) = self.wall_points(w);
                a.perp_dot(b)
            })
            .sum::<f32>()
            * 0.5
    }
}
