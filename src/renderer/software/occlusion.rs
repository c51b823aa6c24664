//! Per-column "already painted" bookkeeping that stands in for a depth
//! buffer.  Solid columns are kept as a sorted list of coalesced spans.

use smallvec::SmallVec;

/// Half-open column range `[left, right)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenInterval {
    pub left: i32,
    pub right: i32,
}

impl ScreenInterval {
    #[inline(always)]
    pub const fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.left >= self.right
    }

    #[inline(always)]
    pub fn len(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    #[inline(always)]
    pub fn contains(&self, x: i32) -> bool {
        self.left <= x && x < self.right
    }

    #[inline]
    pub fn intersect(&self, other: ScreenInterval) -> ScreenInterval {
        ScreenInterval::new(self.left.max(other.left), self.right.min(other.right))
    }

    #[inline]
    pub fn columns(&self) -> std::ops::Range<i32> {
        self.left..self.right.max(self.left)
    }
}

#[derive(Debug, Default)]
pub struct OcclusionTracker {
    width: i32,
    solid: Vec<ScreenInterval>,
}

impl OcclusionTracker {
    pub fn new(width: usize) -> Self {
        let mut t = Self::default();
        t.reset(width);
        t
    }

    /// Open every column of a `width`-wide screen.
    pub fn reset(&mut self, width: usize) {
        let w = width as i32;
        self.width = w;
        self.solid.clear();
        // Two sentinels so the merge never has to worry about running off
        // the ends of the array.
        self.solid.push(ScreenInterval::new(-w.max(1), 0));
        self.solid.push(ScreenInterval::new(w, 2 * w.max(1)));
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn mark_solid(&mut self, range: ScreenInterval) {
        let r = range.intersect(ScreenInterval::new(0, self.width));
        if r.is_empty() {
            return;
        }

        // 1) skip all spans that end before ours starts
        let mut i = self.solid.partition_point(|s| s.right < r.left);

        // swallowed by an existing span
        if self.solid[i].left <= r.left && r.right <= self.solid[i].right {
            return;
        }

        // 2) merge any overlapping or touching spans
        let mut merged = r;
        while i < self.solid.len() && self.solid[i].left <= merged.right {
            merged.left = merged.left.min(self.solid[i].left);
            merged.right = merged.right.max(self.solid[i].right);
            self.solid.remove(i);
        }

        // 3) insert the coalesced span in its sorted place
        self.solid.insert(i, merged);
    }

    /// Off-screen columns count as solid.
    #[inline]
    pub fn is_solid(&self, x: i32) -> bool {
        if x < 0 || x >= self.width {
            return true;
        }
        let i = self.solid.partition_point(|s| s.right <= x);
        self.solid[i].left <= x
    }

    pub fn is_range_fully_solid(&self, range: ScreenInterval) -> bool {
        let r = range.intersect(ScreenInterval::new(0, self.width));
        if r.is_empty() {
            return true;
        }
        let i = self.solid.partition_point(|s| s.right <= r.left);
        self.solid[i].left <= r.left && r.right <= self.solid[i].right
    }

    /// Maximal open sub-ranges of `range`, left to right.
    pub fn open_runs(&self, range: ScreenInterval) -> SmallVec<[ScreenInterval; 8]> {
        let mut runs = SmallVec::new();
        let r = range.intersect(ScreenInterval::new(0, self.width));
        if r.is_empty() {
            return runs;
        }
        let mut x = r.left;
        let mut i = self.solid.partition_point(|s| s.right <= x);
        while x < r.right {
            let s = self.solid[i];
            if s.left > x {
                runs.push(ScreenInterval::new(x, s.left.min(r.right)));
            }
            x = x.max(s.right);
            i += 1;
        }
        runs
    }

    /// Number of on-screen solid columns.
    pub fn solid_count(&self) -> i32 {
        let screen = ScreenInterval::new(0, self.width);
        self.solid.iter().map(|s| s.intersect(screen).len()).sum()
    }

    #[inline]
    pub fn all_solid(&self) -> bool {
        self.is_range_fully_solid(ScreenInterval::new(0, self.width))
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;

    fn iv(l: i32, r: i32) -> ScreenInterval {
        ScreenInterval::new(l, r)
    }

    #[test]
    fn merge_chain_of_touching_spans() {
        let mut t = OcclusionTracker::new(32);
        t.mark_solid(iv(2, 6));
        t.mark_solid(iv(8, 13));
        t.mark_solid(iv(13, 20));
        assert_eq!(t.open_runs(iv(0, 32)).as_slice(), &[iv(0, 2), iv(6, 8), iv(20, 32)]);

        // bridging span closes the 6..8 gap
        t.mark_solid(iv(5, 9));
        assert_eq!(t.open_runs(iv(0, 32)).as_slice(), &[iv(0, 2), iv(20, 32)]);
        assert!(t.is_range_fully_solid(iv(2, 20)));
        assert!(!t.is_range_fully_solid(iv(2, 21)));
        assert_eq!(t.solid_count(), 18);
    }

    #[test]
    fn edges_merge_with_sentinels() {
        let mut t = OcclusionTracker::new(10);
        t.mark_solid(iv(-5, 3));
        t.mark_solid(iv(7, 40));
        assert!(t.is_solid(0) && t.is_solid(2) && t.is_solid(9));
        assert!(!t.is_solid(3) && !t.is_solid(6));
        assert!(t.is_solid(-1) && t.is_solid(10));
        t.mark_solid(iv(3, 7));
        assert!(t.all_solid());
        assert_eq!(t.solid_count(), 10);
    }

    #[test]
    fn empty_range_counts_as_solid() {
        let t = OcclusionTracker::new(10);
        assert!(t.is_range_fully_solid(iv(4, 4)));
        assert!(t.is_range_fully_solid(iv(12, 20)));
        assert!(!t.is_range_fully_solid(iv(0, 1)));
        assert!(t.open_runs(iv(5, 5)).is_empty());
    }

    #[test]
    fn reset_reopens_everything() {
        let mut t = OcclusionTracker::new(8);
        t.mark_solid(iv(0, 8));
        assert!(t.all_solid());
        t.reset(8);
        assert_eq!(t.solid_count(), 0);
        assert_eq!(t.open_runs(iv(0, 8)).as_slice(), &[iv(0, 8)]);
    }

    /// Random marks never reopen a column and agree with a plain bitmap.
    #[test]
    fn monotonic_under_random_marks() {
        const W: usize = 97;
        let mut t = OcclusionTracker::new(W);
        let mut shadow = [false; W];
        let mut seed = 0x2545_f491_u32;
        let mut next = || {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (seed >> 8) as i32
        };

        let mut prev = 0;
        for _ in 0..200 {
            let a = next().rem_euclid(W as i32 + 10) - 5;
            let len = next().rem_euclid(12);
            t.mark_solid(iv(a, a + len));
            for x in a.max(0)..(a + len).min(W as i32) {
                shadow[x as usize] = true;
            }

            let count = t.solid_count();
            assert!(count >= prev);
            prev = count;
            for (x, &s) in shadow.iter().enumerate() {
                assert_eq!(t.is_solid(x as i32), s, "column {x}");
            }
        }
    }
}
