//! Diminishing-light tables.
//!
//! Brightness is not computed per pixel: a surface's sector light level picks
//! a row of `zlight`, the span's distance picks the column, and the resulting
//! shade index selects one of 32 precomputed 256-byte palette remaps.

use crate::fixed::{FRACUNIT, Fixed, fixed_div};

pub const LIGHTLEVELS: usize = 16;
pub const LIGHTSEGSHIFT: u32 = 4;
pub const MAXLIGHTZ: usize = 128;
pub const LIGHTZSHIFT: u32 = 20;
pub const NUMCOLORMAPS: usize = 32;
const LIGHTSCALESHIFT: u32 = 12;
const DISTMAP: Fixed = 2;

pub type Colormap = [u8; 256];

#[derive(Debug, thiserror::Error)]
pub enum LightError {
    #[error("need at least {NUMCOLORMAPS} colormap shades, got {0}")]
    TooFewShades(usize),
}

pub struct LightTables {
    shades: Vec<Colormap>,
    /// `zlight[light][distance bucket]` = shade index.
    zlight: [[u8; MAXLIGHTZ]; LIGHTLEVELS],
    view_width: usize,
}

impl LightTables {
    /// Build the distance-banding table for `view_width` screen columns over
    /// the caller's colormap shades (shade 0 = brightest).
    pub fn new(shades: Vec<Colormap>, view_width: usize) -> Result<Self, LightError> {
        if shades.len() < NUMCOLORMAPS {
            return Err(LightError::TooFewShades(shades.len()));
        }
        let mut tables = Self {
            shades,
            zlight: [[0; MAXLIGHTZ]; LIGHTLEVELS],
            view_width: 0,
        };
        tables.rebuild(view_width);
        Ok(tables)
    }

    /// Grayscale ramp used by the demo and tests: shade `s` maps index `i`
    /// to `i` darkened by `s` steps.
    pub fn grayscale(view_width: usize) -> Self {
        let mut shades = Vec::with_capacity(NUMCOLORMAPS);
        for s in 0..NUMCOLORMAPS {
            let mut map = [0u8; 256];
            for (i, out) in map.iter_mut().enumerate() {
                let dimmed = i * (NUMCOLORMAPS - s) / NUMCOLORMAPS;
                *out = dimmed as u8;
            }
            shades.push(map);
        }
        Self::new(shades, view_width).expect("ramp has NUMCOLORMAPS shades")
    }

    /// Recompute the z-banding; cheap, only needed when the view width
    /// changes (the scale term is anchored to half the screen width).
    pub fn rebuild(&mut self, view_width: usize) {
        if view_width == self.view_width {
            return;
        }
        self.view_width = view_width;
        for (i, row) in self.zlight.iter_mut().enumerate() {
            let startmap = ((LIGHTLEVELS - 1 - i) * 2 * NUMCOLORMAPS / LIGHTLEVELS) as i32;
            for (j, slot) in row.iter_mut().enumerate() {
                let scale = fixed_div(
                    (view_width as Fixed / 2) * FRACUNIT,
                    ((j + 1) << LIGHTZSHIFT) as Fixed,
                ) >> LIGHTSCALESHIFT;
                let level = (startmap - scale / DISTMAP).clamp(0, NUMCOLORMAPS as i32 - 1);
                *slot = level as u8;
            }
        }
    }

    /// Collapse a sector light level plus the powerup bonus into a zlight row.
    #[inline]
    pub fn plane_light_row(&self, light_level: i32, extra_light: i32) -> usize {
        ((light_level >> LIGHTSEGSHIFT) + extra_light).clamp(0, LIGHTLEVELS as i32 - 1) as usize
    }

    /// Distance bucket for a 16.16 plane distance, clamped to the table.
    #[inline]
    pub fn distance_bucket(distance: Fixed) -> usize {
        ((distance >> LIGHTZSHIFT).max(0) as usize).min(MAXLIGHTZ - 1)
    }

    /// Remap table for one (light row, distance bucket) pair.
    #[inline]
    pub fn z_light(&self, row: usize, bucket: usize) -> &Colormap {
        &self.shades[self.zlight[row][bucket] as usize]
    }

    /// Shade 0 — used for sky and anything drawn full-bright.
    #[inline]
    pub fn fullbright(&self) -> &Colormap {
        &self.shades[0]
    }

    /// Direct shade access for the fixed-colormap override (invulnerability,
    /// light-amp goggles).  Out-of-range indices clamp to the darkest shade.
    #[inline]
    pub fn shade(&self, idx: usize) -> &Colormap {
        &self.shades[idx.min(self.shades.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_row_clamps_both_ends() {
        let lt = LightTables::grayscale(320);
        assert_eq!(lt.plane_light_row(-50, 0), 0);
        assert_eq!(lt.plane_light_row(255, 0), LIGHTLEVELS - 1);
        assert_eq!(lt.plane_light_row(255, 4), LIGHTLEVELS - 1);
        assert_eq!(lt.plane_light_row(128, 0), 8);
    }

    #[test]
    fn distance_bucket_clamps_to_table() {
        assert_eq!(LightTables::distance_bucket(0), 0);
        assert_eq!(LightTables::distance_bucket(Fixed::MAX), MAXLIGHTZ - 1);
    }

    #[test]
    fn nearer_is_never_darker() {
        let lt = LightTables::grayscale(320);
        for row in 0..LIGHTLEVELS {
            for j in 1..MAXLIGHTZ {
                assert!(
                    lt.zlight[row][j] >= lt.zlight[row][j - 1],
                    "row {row} bucket {j} got brighter with distance"
                );
            }
        }
    }

    #[test]
    fn brighter_sector_uses_brighter_shades() {
        let lt = LightTables::grayscale(320);
        // brightest row at the far bucket must not be darker than the
        // darkest row at the same bucket
        assert!(lt.zlight[LIGHTLEVELS - 1][MAXLIGHTZ - 1] <= lt.zlight[0][MAXLIGHTZ - 1]);
    }

    #[test]
    fn rebuild_is_a_noop_for_same_width() {
        let mut lt = LightTables::grayscale(320);
        let before = lt.zlight;
        lt.rebuild(320);
        assert_eq!(before, lt.zlight);
    }
}
