//! Liquid-flat distortion (the SMMU "swirl" effect).
//!
//! Surfaces whose flat is marked swirling are rasterized from a remapped
//! copy of the source tile.  The 64x64 remap table is a fixed sinusoidal
//! offset function of texel coordinates and the game tick; it is rebuilt
//! once when the tick advances and shared by every flat distorted during
//! that tick.  Distorted copies are memoized per (tick, flat).

use std::collections::HashMap;

use crate::fixed::{FRACBITS, fine_sine};
use crate::world::flats::{FLAT_DIM, FLAT_LEN, FlatId};

const SWIRL_FACTOR: i32 = 8192 / 64;
const SWIRL_FACTOR2: i32 = 8192 / 32;
const AMP: i32 = 2;
const AMP2: i32 = 2;
const SPEED: i32 = 40;

pub struct SwirlCache {
    tick: Option<u32>,
    offsets: Box<[u16; FLAT_LEN]>,
    distorted: HashMap<FlatId, Box<[u8; FLAT_LEN]>>,
}

impl SwirlCache {
    pub fn new() -> Self {
        Self {
            tick: None,
            offsets: Box::new([0; FLAT_LEN]),
            distorted: HashMap::new(),
        }
    }

    /// Distorted copy of `source` for this tick, computed at most once per
    /// (tick, flat) pair.
    pub fn distorted(&mut self, id: FlatId, source: &[u8; FLAT_LEN], tick: u32) -> &[u8; FLAT_LEN] {
        if self.tick != Some(tick) {
            self.rebuild_offsets(tick);
            self.distorted.clear();
            self.tick = Some(tick);
        }

        self.distorted.entry(id).or_insert_with(|| {
            let mut out = Box::new([0u8; FLAT_LEN]);
            for (i, slot) in out.iter_mut().enumerate() {
                *slot = source[self.offsets[i] as usize];
            }
            out
        })
    }

    /// Already memoized for this tick?  (Diagnostics and tests.)
    pub fn is_cached(&self, id: FlatId, tick: u32) -> bool {
        self.tick == Some(tick) && self.distorted.contains_key(&id)
    }

    fn rebuild_offsets(&mut self, tick: u32) {
        let t = tick as i32;
        for y in 0..FLAT_DIM as i32 {
            for x in 0..FLAT_DIM as i32 {
                let sin1 = (y * SWIRL_FACTOR + t * SPEED * 5 + 900) & 8191;
                let sin2 = (x * SWIRL_FACTOR2 + t * SPEED * 4 + 300) & 8191;
                let x1 = x
                    + 128
                    + ((fine_sine(sin1 as usize) * AMP) >> FRACBITS)
                    + ((fine_sine(sin2 as usize) * AMP2) >> FRACBITS);

                let sin1 = (x * SWIRL_FACTOR + t * SPEED * 3 + 700) & 8191;
                let sin2 = (y * SWIRL_FACTOR2 + t * SPEED * 4 + 1200) & 8191;
                let y1 = y
                    + 128
                    + ((fine_sine(sin1 as usize) * AMP) >> FRACBITS)
                    + ((fine_sine(sin2 as usize) * AMP2) >> FRACBITS);

                let (x1, y1) = (x1 & 63, y1 & 63);
                self.offsets[(y as usize) * FLAT_DIM + x as usize] =
                    ((y1 as usize) * FLAT_DIM + x1 as usize) as u16;
            }
        }
    }
}

impl Default for SwirlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_flat() -> [u8; FLAT_LEN] {
        let mut f = [0u8; FLAT_LEN];
        for (i, v) in f.iter_mut().enumerate() {
            *v = (i % 251) as u8;
        }
        f
    }

    #[test]
    fn memoizes_within_one_tick() {
        let mut cache = SwirlCache::new();
        let src = numbered_flat();

        assert!(!cache.is_cached(7, 10));
        let first = *cache.distorted(7, &src, 10);
        assert!(cache.is_cached(7, 10));
        let second = *cache.distorted(7, &src, 10);
        assert_eq!(first, second);
    }

    #[test]
    fn tick_advance_invalidates() {
        let mut cache = SwirlCache::new();
        let src = numbered_flat();

        let at10 = *cache.distorted(7, &src, 10);
        assert!(!cache.is_cached(7, 11));
        let at11 = *cache.distorted(7, &src, 11);
        assert!(!cache.is_cached(7, 10));
        // the water has to actually move
        assert_ne!(at10, at11);
    }

    #[test]
    fn remap_only_permutes_source_texels() {
        let mut cache = SwirlCache::new();
        let mut src = [0u8; FLAT_LEN];
        src[0] = 200; // everything else 0
        let out = cache.distorted(3, &src, 42);
        for &v in out.iter() {
            assert!(v == 0 || v == 200);
        }
    }

    #[test]
    fn distinct_flats_cached_independently() {
        let mut cache = SwirlCache::new();
        let a = numbered_flat();
        let mut b = numbered_flat();
        b.reverse();

        let out_a = *cache.distorted(1, &a, 5);
        let out_b = *cache.distorted(2, &b, 5);
        assert!(cache.is_cached(1, 5) && cache.is_cached(2, 5));
        assert_ne!(out_a, out_b);
    }
}
