use glam::Vec2;

use super::geometry::{Level, SectorId, Wall};

/// Slack for points lying exactly on a wall.
const ON_WALL_EPS: f32 = 1e-4;

// ──────────────────────────────────────────────────────────────────────────
//                       Level – public helpers
// ──────────────────────────────────────────────────────────────────────────
impl Level {
    /// Is `p` inside (or on the boundary of) convex `sector`?
    pub fn sector_contains(&self, sector: SectorId, p: Vec2) -> bool {
        self.walls_of(sector).iter().all(|w| {
            let (a, b) = self.wall_points(w);
            (b - a).perp_dot(p - a) >= -ON_WALL_EPS
        })
    }

    /// First sector containing `p`, by linear scan.
    pub fn locate_sector(&self, p: Vec2) -> Option<SectorId> {
        (0..self.sectors.len() as SectorId).find(|&s| self.sector_contains(s, p))
    }

    /// Sector containing `p` given it was in `current` a moment ago.
    ///
    /// Checks `current`, then its portal neighbours, then everything.
    /// `None` means `p` is outside the level.
    pub fn track_sector(&self, current: SectorId, p: Vec2) -> Option<SectorId> {
        if (current as usize) < self.sectors.len() {
            if self.sector_contains(current, p) {
                return Some(current);
            }
            if let Some(n) = self
                .walls_of(current)
                .iter()
                .filter_map(|w| w.portal)
                .find(|&n| self.sector_contains(n, p))
            {
                return Some(n);
            }
        }
        self.locate_sector(p)
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Wall geometry helpers
// ──────────────────────────────────────────────────────────────────────────
impl Wall {
    /// Front-face test: `p` strictly on the interior (left) side.
    #[inline(always)]
    pub fn faces(&self, level: &Level, p: Vec2) -> bool {
        let (a, b) = level.wall_points(self);
        (b - a).perp_dot(p - a) > 0.0
    }

    /// Is `p` within `eps` of the wall segment?  Used for an eye standing on
    /// a portal, where the facing test and the near plane both give up.
    #[inline]
    pub fn touches(&self, level: &Level, p: Vec2, eps: f32) -> bool {
        let (a, b) = level.wall_points(self);
        let d = b - a;
        let t = ((p - a).dot(d) / d.length_squared()).clamp(0.0, 1.0);
        (a + d * t).distance_squared(p) <= eps * eps
    }

    /// Unit normal pointing out of the owning sector.
    #[inline]
    pub fn outward_normal(&self, level: &Level) -> Vec2 {
        let (a, b) = level.wall_points(self);
        let d = b - a;
        Vec2::new(d.y, -d.x).normalize_or_zero()
    }
}
