//! Built-in levels for tests and for the viewer when no file is given.
//!
//! Every surface uses a flat 1×1 texture at full light, so a pixel's colour
//! tells exactly which surface it came from.

use glam::{Vec2, vec2};

use crate::{
    level::loader::{LoadError, LoadedLevel, load_level_str},
    renderer::Rgba,
    world::{LevelBuilder, Plane, SectorDef, Texture, TextureBank, TextureId, WallDef},
};

pub const WALL: Rgba = 0xFF_8A_4B_38;
pub const FLOOR: Rgba = 0xFF_4A_6A_3A;
pub const CEILING: Rgba = 0xFF_5A_5A_7A;
/// Texture of the step-up portal wall, seen as the lower strip.
pub const STEP: Rgba = 0xFF_E0_C0_20;
/// Far wall of the upper room in [`step_rooms`].
pub const FAR_WALL: Rgba = 0xFF_C0_20_20;
/// Floor of the upper room in [`step_rooms`].
pub const STEP_FLOOR: Rgba = 0xFF_3A_5A_8A;

struct Palette {
    wall: TextureId,
    floor: TextureId,
    ceiling: TextureId,
    step: TextureId,
    far_wall: TextureId,
    step_floor: TextureId,
}

impl Palette {
    fn install(bank: &mut TextureBank) -> Result<Self, LoadError> {
        let mut add = |name: &str, c: Rgba| bank.insert(name, Texture::solid(name, 1, 1, c));
        Ok(Self {
            wall: add("WALL", WALL)?,
            floor: add("FLOOR", FLOOR)?,
            ceiling: add("CEILING", CEILING)?,
            step: add("STEP", STEP)?,
            far_wall: add("FAR_WALL", FAR_WALL)?,
            step_floor: add("STEP_FLOOR", STEP_FLOOR)?,
        })
    }

    fn room(&self, floor: f32, ceiling: f32) -> SectorDef {
        SectorDef {
            floor: Plane::new(floor, self.floor),
            ceiling: Plane::new(ceiling, self.ceiling),
            light: 1.0,
        }
    }
}

/// One 20×20 box, floor 0, ceiling 10, eye at 5 in the middle facing +x.
pub fn single_room() -> Result<LoadedLevel, LoadError> {
    let mut bank = TextureBank::default();
    let p = Palette::install(&mut bank)?;
    let mut b = LevelBuilder::new("single room");
    let w = WallDef::solid(p.wall);
    b.box_sector(p.room(0.0, 10.0), vec2(-10.0, -10.0), vec2(10.0, 10.0), [w; 4]);
    LoadedLevel::new(b.build()?, bank, Vec2::ZERO, 0.0, 5.0)
}

/// Room A `[-10, 10]²` at floor 0 opening east onto room B `[10, 30]×[-10, 10]`
/// at floor 4; both ceilings at 20.  The camera starts in A facing B with
/// the eye 6 above A's floor.
pub fn step_rooms() -> Result<LoadedLevel, LoadError> {
    let mut bank = TextureBank::default();
    let p = Palette::install(&mut bank)?;
    let mut b = LevelBuilder::new("step rooms");
    let w = WallDef::solid(p.wall);

    let a = b.next_sector_id();
    let upper = a + 1;
    b.box_sector(
        p.room(0.0, 20.0),
        vec2(-10.0, -10.0),
        vec2(10.0, 10.0),
        [w, WallDef::portal(p.step, upper), w, w],
    );
    let mut def = p.room(4.0, 20.0);
    def.floor.texture = p.step_floor;
    b.box_sector(
        def,
        vec2(10.0, -10.0),
        vec2(30.0, 10.0),
        [w, WallDef::solid(p.far_wall), w, WallDef::portal(p.step, a)],
    );
    LoadedLevel::new(b.build()?, bank, Vec2::ZERO, 0.0, 6.0)
}

/// `n` boxes of 10×8 in a row along +x, each linked to its neighbours.
/// The camera stands in the middle of the first one facing down the chain.
pub fn corridor(n: usize) -> Result<LoadedLevel, LoadError> {
    let mut bank = TextureBank::default();
    let p = Palette::install(&mut bank)?;
    let mut b = LevelBuilder::new(format!("corridor {n}"));
    let w = WallDef::solid(p.wall);

    for i in 0..n {
        let id = b.next_sector_id();
        let east = if i + 1 < n { WallDef::portal(p.wall, id + 1) } else { w };
        let west = if i > 0 { WallDef::portal(p.wall, id - 1) } else { w };
        let x = 10.0 * i as f32;
        b.box_sector(
            p.room(0.0, 8.0),
            vec2(x, -4.0),
            vec2(x + 10.0, 4.0),
            [w, east, w, west],
        );
    }
    LoadedLevel::new(b.build()?, bank, vec2(5.0, 0.0), 0.0, 4.0)
}

/// A box whose east wall is a portal back into itself.
pub fn self_portal() -> Result<LoadedLevel, LoadError> {
    let mut bank = TextureBank::default();
    let p = Palette::install(&mut bank)?;
    let mut b = LevelBuilder::new("self portal");
    let w = WallDef::solid(p.wall);
    let id = b.next_sector_id();
    b.box_sector(
        p.room(0.0, 10.0),
        vec2(-10.0, -10.0),
        vec2(10.0, 10.0),
        [w, WallDef::portal(p.wall, id), w, w],
    );
    LoadedLevel::new(b.build()?, bank, Vec2::ZERO, 0.0, 5.0)
}

/// Multi-room layout shipped with the viewer.
pub fn demo() -> Result<LoadedLevel, LoadError> {
    load_level_str(include_str!("../../levels/demo.ron"))
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_build() {
        assert_eq!(single_room().unwrap().level.sectors.len(), 1);
        assert_eq!(corridor(5).unwrap().level.sectors.len(), 5);
        assert!(self_portal().unwrap().level.walls.iter().any(|w| w.portal == Some(0)));

        let s = step_rooms().unwrap();
        assert_eq!(s.start.sector, 0);
        assert_eq!(s.start.height, 6.0);
        // the portal pair shares both endpoints
        let (a, b) = s.level.wall_points(&s.level.walls[1]);
        let (c, d) = s.level.wall_points(&s.level.walls[7]);
        assert_eq!((a, b), (d, c));
    }

    #[test]
    fn demo_is_connected() {
        let d = demo().unwrap();
        assert!(d.level.sectors.len() >= 4);
        // every portal is answered by a wall pointing back
        for (sid, _) in d.level.sectors.iter().enumerate() {
            for w in d.level.walls_of(sid as u16) {
                if let Some(to) = w.portal {
                    let back = d.level.walls_of(to).iter().any(|o| {
                        o.portal == Some(sid as u16) && o.v1 == w.v2 && o.v2 == w.v1
                    });
                    assert!(back, "sector {sid} portal to {to} has no twin");
                }
            }
        }
    }
}
