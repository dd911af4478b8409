//! Surface registry ("visplane" table) and column-interval merger.
//!
//! Every floor or ceiling fragment visible in a frame is interned here,
//! keyed by (height, flat, light level).  The wall traversal claims
//! horizontal column ranges against an entry; ranges merge in place when the
//! touched columns are still unclaimed and split into a sibling entry when
//! they are not.  Handles are plain indices into a growable arena, so
//! registry growth never invalidates them.

use crate::fixed::Fixed;
use crate::world::flats::{self, FlatId};

pub type PlaneId = usize;

/// "Column not yet claimed" sentinel in the occlusion arrays.
pub const UNCLAIMED: u16 = u16::MAX;

/// One dedup'd floor/ceiling surface with its per-column visibility bounds.
pub struct VisPlane {
    pub height: Fixed,
    pub flat: FlatId,
    pub light: i32,

    /// Inclusive horizontal range claimed so far; empty when `min_x > max_x`.
    pub min_x: i32,
    pub max_x: i32,

    // Stored with one pad column at each edge so the span sweep may read and
    // write `min_x - 1` and `max_x + 1` without bounds games.
    top: Vec<u16>,
    bottom: Vec<u16>,
}

impl VisPlane {
    fn with_width(width: usize) -> Self {
        Self {
            height: 0,
            flat: flats::NO_FLAT,
            light: 0,
            min_x: width as i32,
            max_x: -1,
            top: vec![UNCLAIMED; width + 2],
            bottom: vec![0; width + 2],
        }
    }

    fn reinit(&mut self, width: usize, height: Fixed, flat: FlatId, light: i32) {
        self.height = height;
        self.flat = flat;
        self.light = light;
        self.min_x = width as i32;
        self.max_x = -1;
        self.top.clear();
        self.top.resize(width + 2, UNCLAIMED);
        self.bottom.clear();
        self.bottom.resize(width + 2, 0);
    }

    /// Valid for `x` in `-1 ..= width`.
    #[inline(always)]
    pub fn top(&self, x: i32) -> u16 {
        self.top[(x + 1) as usize]
    }

    #[inline(always)]
    pub fn bottom(&self, x: i32) -> u16 {
        self.bottom[(x + 1) as usize]
    }

    /// Record the visible rows of column `x` and fold it into the range.
    #[inline]
    pub fn set_column(&mut self, x: i32, top: u16, bottom: u16) {
        self.top[(x + 1) as usize] = top;
        self.bottom[(x + 1) as usize] = bottom;
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
    }

    /// Force one column back to the unclaimed sentinel (used on the range
    /// boundaries before span emission).
    #[inline]
    pub fn clear_column(&mut self, x: i32) {
        self.top[(x + 1) as usize] = UNCLAIMED;
    }
}

/// Growable arena of [`VisPlane`]s, reset (not freed) every frame.
pub struct PlaneSet {
    planes: Vec<VisPlane>,
    /// Entries `0 .. live` belong to the current frame.
    live: usize,
    width: usize,
    initial_capacity: usize,
}

impl PlaneSet {
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            planes: Vec::with_capacity(initial_capacity.max(1)),
            live: 0,
            width: 0,
            initial_capacity: initial_capacity.max(1),
        }
    }

    /// Frame start: rewind the live cursor.  Storage is kept; entries are
    /// reinitialized lazily as they are handed out again.
    pub fn reset(&mut self, width: usize) {
        self.live = 0;
        self.width = width;
    }

    /// Number of surfaces interned so far this frame.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[inline]
    pub fn get(&self, id: PlaneId) -> &VisPlane {
        &self.planes[id]
    }

    #[inline]
    pub fn get_mut(&mut self, id: PlaneId) -> &mut VisPlane {
        &mut self.planes[id]
    }

    /// Look up the surface for this identity triple, interning a fresh entry
    /// if no live one matches.  Sky surfaces collapse height and light to a
    /// canonical value first: every sky fragment renders identically.
    pub fn find_or_create(&mut self, height: Fixed, flat: FlatId, light: i32) -> PlaneId {
        let (height, light) = if flats::is_sky(flat) {
            (0, 0)
        } else {
            (height, light)
        };

        for id in 0..self.live {
            let pl = &self.planes[id];
            if pl.height == height && pl.flat == flat && pl.light == light {
                return id;
            }
        }

        self.alloc(height, flat, light)
    }

    /// Claim columns `start ..= stop` (inclusive) on `id`.
    ///
    /// Returns `id` unchanged when the intersection of the new range with the
    /// entry's current extent is still unclaimed (the extent widens to the
    /// union), otherwise interns a sibling entry with the same identity and
    /// exactly the requested range.
    ///
    /// `keep_shared` is the self-occlusion policy hook: the caller sets it
    /// when floor and ceiling resolved to this same entry and the ceiling is
    /// being marked, in which case the entry is reused unconditionally.
    pub fn claim_range(
        &mut self,
        id: PlaneId,
        start: i32,
        stop: i32,
        keep_shared: bool,
    ) -> PlaneId {
        debug_assert!(start <= stop, "inverted claim range {start}..{stop}");
        debug_assert!(id < self.live, "claim on a stale plane handle");

        let pl = &self.planes[id];
        let (union_lo, intersect_lo) = if start < pl.min_x {
            (start, pl.min_x)
        } else {
            (pl.min_x, start)
        };
        let (union_hi, intersect_hi) = if stop > pl.max_x {
            (stop, pl.max_x)
        } else {
            (pl.max_x, stop)
        };

        let free = keep_shared
            || (intersect_lo..=intersect_hi).all(|x| pl.top(x) == UNCLAIMED);
        if free {
            let pl = &mut self.planes[id];
            pl.min_x = union_lo;
            pl.max_x = union_hi;
            // use the same one
            return id;
        }

        // Conflicting claim: bisect into a sibling with identical identity.
        let (height, flat, light) = (pl.height, pl.flat, pl.light);
        let new_id = self.alloc(height, flat, light);
        let pl = &mut self.planes[new_id];
        pl.min_x = start;
        pl.max_x = stop;
        new_id
    }

    fn alloc(&mut self, height: Fixed, flat: FlatId, light: i32) -> PlaneId {
        if self.live == self.planes.len() {
            if self.planes.len() == self.planes.capacity() {
                let old = self.planes.capacity();
                let grown = if old == 0 { self.initial_capacity } else { old * 2 };
                self.planes.reserve_exact(grown - self.planes.len());
                if old > 0 {
                    eprintln!("PlaneSet: hit capacity {old}, raised to {grown}");
                }
            }
            self.planes.push(VisPlane::with_width(self.width));
            let id = self.live;
            self.live += 1;
            let pl = &mut self.planes[id];
            pl.height = height;
            pl.flat = flat;
            pl.light = light;
            return id;
        }

        let id = self.live;
        self.live += 1;
        self.planes[id].reinit(self.width, height, flat, light);
        id
    }
}
