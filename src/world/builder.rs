//! Validating factory for [`Level`].
//!
//! Sectors are described as a counter-clockwise list of corner vertices plus
//! one [`WallDef`] per edge (`corners[i] → corners[i + 1]`).  Nothing reaches
//! the renderer until [`LevelBuilder::build`] has checked convexity and
//! winding, so the hot path never re-checks geometry.

use glam::Vec2;

use super::geometry::{
    GeometryError, Level, Plane, Sector, SectorId, TextureMapping, Vertex, VertexId, Wall, WallId,
};
use super::texture::TextureId;

/// Per-edge wall description.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallDef {
    pub texture: TextureId,
    pub mapping: TextureMapping,
    pub portal: Option<SectorId>,
}

impl WallDef {
    pub fn solid(texture: TextureId) -> Self {
        Self {
            texture,
            mapping: TextureMapping::IDENTITY,
            portal: None,
        }
    }

    pub fn portal(texture: TextureId, to: SectorId) -> Self {
        Self {
            texture,
            mapping: TextureMapping::IDENTITY,
            portal: Some(to),
        }
    }

    pub fn with_mapping(mut self, mapping: TextureMapping) -> Self {
        self.mapping = mapping;
        self
    }
}

/// Floor, ceiling and light of a sector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectorDef {
    pub floor: Plane,
    pub ceiling: Plane,
    pub light: f32,
}

#[derive(Default)]
pub struct LevelBuilder {
    name: String,
    vertices: Vec<Vertex>,
    walls: Vec<Wall>,
    sectors: Vec<Sector>,
}

impl LevelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a vertex, reusing an existing one at exactly the same spot so
    /// neighbouring sectors share their portal endpoints.
    pub fn vertex(&mut self, pos: Vec2) -> VertexId {
        if let Some(i) = self.vertices.iter().position(|v| v.pos == pos) {
            return i as VertexId;
        }
        self.vertices.push(Vertex { pos });
        (self.vertices.len() - 1) as VertexId
    }

    /// Id the next [`sector`](Self::sector) call will return; handy for
    /// portals that point forward.
    pub fn next_sector_id(&self) -> SectorId {
        self.sectors.len() as SectorId
    }

    /// Append a sector.  `walls.len()` must equal `corners.len()`; surplus
    /// entries on either side are ignored and reported by `build` as a
    /// too-short loop when fewer than three remain.
    pub fn sector(&mut self, def: SectorDef, corners: &[VertexId], walls: &[WallDef]) -> SectorId {
        let first_wall = self.walls.len() as WallId;
        let n = corners.len().min(walls.len());
        for i in 0..n {
            let w = walls[i];
            self.walls.push(Wall {
                v1: corners[i],
                v2: corners[(i + 1) % n],
                texture: w.texture,
                mapping: w.mapping,
                portal: w.portal,
            });
        }
        self.sectors.push(Sector {
            first_wall,
            wall_count: n as u16,
            floor: def.floor,
            ceiling: def.ceiling,
            light: def.light,
        });
        (self.sectors.len() - 1) as SectorId
    }

    /// Axis-aligned box sector `[min, max]`, walls given south, east,
    /// north, west.
    pub fn box_sector(&mut self, def: SectorDef, min: Vec2, max: Vec2, walls: [WallDef; 4]) -> SectorId {
        let corners = [
            self.vertex(min),
            self.vertex(Vec2::new(max.x, min.y)),
            self.vertex(max),
            self.vertex(Vec2::new(min.x, max.y)),
        ];
        self.sector(def, &corners, &walls)
    }

    pub fn build(self) -> Result<Level, GeometryError> {
        let level = Level {
            name: self.name,
            vertices: self.vertices,
            walls: self.walls,
            sectors: self.sectors,
        };
        level.validate()?;
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    fn def() -> SectorDef {
        SectorDef {
            floor: Plane::new(0.0, 1),
            ceiling: Plane::new(10.0, 2),
            light: 1.0,
        }
    }

    #[test]
    fn box_sector_is_ccw_and_valid() {
        let mut b = LevelBuilder::new("box");
        let s = b.box_sector(def(), vec2(-5.0, -5.0), vec2(5.0, 5.0), [WallDef::solid(3); 4]);
        let level = b.build().unwrap();
        assert_eq!(s, 0);
        assert!(level.signed_area(s) > 0.0);
        assert_eq!(level.walls_of(s).len(), 4);
    }

    #[test]
    fn shared_corners_are_deduplicated() {
        let mut b = LevelBuilder::new("pair");
        b.box_sector(def(), vec2(0.0, 0.0), vec2(10.0, 10.0), [WallDef::solid(3); 4]);
        b.box_sector(def(), vec2(10.0, 0.0), vec2(20.0, 10.0), [WallDef::solid(3); 4]);
        let level = b.build().unwrap();
        assert_eq!(level.vertices.len(), 6);
    }

    #[test]
    fn clockwise_sector_rejected() {
        let mut b = LevelBuilder::new("cw");
        let c = [
            b.vertex(vec2(0.0, 0.0)),
            b.vertex(vec2(0.0, 10.0)),
            b.vertex(vec2(10.0, 10.0)),
            b.vertex(vec2(10.0, 0.0)),
        ];
        b.sector(def(), &c, &[WallDef::solid(3); 4]);
        assert!(matches!(b.build(), Err(GeometryError::NotConvex { sector: 0, .. })));
    }

    #[test]
    fn concave_sector_rejected() {
        let mut b = LevelBuilder::new("dart");
        let c = [
            b.vertex(vec2(0.0, 0.0)),
            b.vertex(vec2(10.0, 0.0)),
            b.vertex(vec2(5.0, 2.0)), // dent
            b.vertex(vec2(10.0, 10.0)),
            b.vertex(vec2(0.0, 10.0)),
        ];
        b.sector(def(), &c, &[WallDef::solid(3); 5]);
        assert!(matches!(b.build(), Err(GeometryError::NotConvex { .. })));
    }

    #[test]
    fn self_intersecting_sector_rejected() {
        // pentagram: every corner turns left, but the loop winds twice
        let star: Vec<_> = (0..5)
            .map(|k| {
                let a = std::f32::consts::FRAC_PI_2 + k as f32 * 72f32.to_radians();
                vec2(a.cos(), a.sin()) * 10.0
            })
            .collect();
        let mut b = LevelBuilder::new("star");
        let c: Vec<_> = [0, 2, 4, 1, 3].iter().map(|&i| b.vertex(star[i])).collect();
        b.sector(def(), &c, &[WallDef::solid(3); 5]);
        assert!(matches!(b.build(), Err(GeometryError::NotConvex { sector: 0, .. })));

        // the same points in order make a valid pentagon
        let mut b = LevelBuilder::new("pentagon");
        let c: Vec<_> = star.iter().map(|&p| b.vertex(p)).collect();
        b.sector(def(), &c, &[WallDef::solid(3); 5]);
        assert!(b.build().is_ok());
    }

    #[test]
    fn collinear_split_walls_stay_convex() {
        let mut b = LevelBuilder::new("split");
        let c = [
            b.vertex(vec2(0.0, 0.0)),
            b.vertex(vec2(5.0, 0.0)),
            b.vertex(vec2(10.0, 0.0)),
            b.vertex(vec2(10.0, 10.0)),
            b.vertex(vec2(0.0, 10.0)),
        ];
        b.sector(def(), &c, &[WallDef::solid(3); 5]);
        assert!(b.build().is_ok());
    }

    #[test]
    fn inverted_planes_rejected() {
        let mut b = LevelBuilder::new("flat");
        let mut d = def();
        d.ceiling.height = d.floor.height;
        b.box_sector(d, vec2(0.0, 0.0), vec2(1.0, 1.0), [WallDef::solid(3); 4]);
        assert!(matches!(b.build(), Err(GeometryError::InvertedPlanes { .. })));
    }

    #[test]
    fn dangling_portal_rejected() {
        let mut b = LevelBuilder::new("dangling");
        let mut walls = [WallDef::solid(3); 4];
        walls[1] = WallDef::portal(3, 7);
        b.box_sector(def(), vec2(0.0, 0.0), vec2(1.0, 1.0), walls);
        assert_eq!(
            b.build().unwrap_err(),
            GeometryError::UnknownPortal { wall: 1, target: 7 }
        );
    }

    #[test]
    fn too_few_walls_rejected() {
        let mut b = LevelBuilder::new("line");
        let c = [b.vertex(vec2(0.0, 0.0)), b.vertex(vec2(1.0, 0.0))];
        b.sector(def(), &c, &[WallDef::solid(3); 2]);
        assert_eq!(b.build().unwrap_err(), GeometryError::TooFewWalls(0));
    }

    #[test]
    fn open_loop_rejected() {
        let mut b = LevelBuilder::new("open");
        b.box_sector(def(), vec2(0.0, 0.0), vec2(1.0, 1.0), [WallDef::solid(3); 4]);
        let mut level = b.build().unwrap();
        level.walls[2].v1 = level.walls[0].v1;
        assert!(matches!(level.validate(), Err(GeometryError::OpenLoop { .. })));
    }
}
