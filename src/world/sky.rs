//! Sky textures and per-linedef sky transfers.
//!
//! A surface tagged with the global sky sentinel samples the default sky by
//! screen-space view angle.  A surface tagged with `SKY_TRANSFER_BIT` instead
//! resolves the low bits of its id to a [`SkyTransfer`] record, which may
//! rotate the sky, shift it vertically and mirror it — the MBF "transfer sky"
//! line special.

use crate::fixed::{Angle, FRACUNIT, Fixed};
use crate::world::flats::{FlatId, SKY_TRANSFER_BIT};

/// Vertical anchor of the default sky in texels (16.16).
pub const SKY_TEXTURE_MID: Fixed = 100 * FRACUNIT;

/// Column-major sky texture so the rasterizer can hand whole columns to the
/// sink without copying.
#[derive(Clone, Debug)]
pub struct SkyTexture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    texels: Vec<u8>,
}

impl SkyTexture {
    pub fn new<S: Into<String>>(name: S, w: usize, h: usize, texels: Vec<u8>) -> Self {
        assert_eq!(texels.len(), w * h, "column-major texel buffer size");
        Self {
            name: name.into(),
            w,
            h,
            texels,
        }
    }

    /// Column `i`, wrapped horizontally.
    #[inline]
    pub fn column(&self, i: usize) -> &[u8] {
        let c = i % self.w;
        &self.texels[c * self.h..(c + 1) * self.h]
    }
}

/// One linedef-driven sky override.
#[derive(Clone, Copy, Debug)]
pub struct SkyTransfer {
    /// Index into the sky-box texture list.
    pub texture: usize,
    /// Vertical shift in texels (16.16); the renderer subtracts the classic
    /// 28-texel fudge itself.
    pub row_offset: Fixed,
    /// Added to the view angle before column selection.
    pub angle_offset: Angle,
    /// Mirror the sky horizontally (line special 271 vs 272).
    pub flip: bool,
}

/// Fully resolved parameters for drawing one sky surface.
pub struct SkyParams<'a> {
    pub texture: &'a SkyTexture,
    pub texture_mid: Fixed,
    /// XOR mask applied to the column angle: 0 = normal, !0 = mirrored.
    pub flip_mask: Angle,
    pub angle_offset: Angle,
}

/// Owns every sky texture plus the transfer table for the current level.
pub struct SkyBox {
    textures: Vec<SkyTexture>,
    default_texture: usize,
    transfers: Vec<SkyTransfer>,
}

impl SkyBox {
    pub fn new(default_sky: SkyTexture) -> Self {
        Self {
            textures: vec![default_sky],
            default_texture: 0,
            transfers: Vec::new(),
        }
    }

    /// Register an additional sky texture; returns its index for transfers.
    pub fn add_texture(&mut self, tex: SkyTexture) -> usize {
        self.textures.push(tex);
        self.textures.len() - 1
    }

    /// Register a transfer record; returns the `FlatId` encoding it.
    pub fn add_transfer(&mut self, t: SkyTransfer) -> FlatId {
        debug_assert!(t.texture < self.textures.len());
        self.transfers.push(t);
        SKY_TRANSFER_BIT | (self.transfers.len() as FlatId - 1)
    }

    /// Resolve a sky-tagged surface id to concrete draw parameters.
    /// Ids with an out-of-range transfer index fall back to the default sky.
    pub fn params_for(&self, id: FlatId) -> SkyParams<'_> {
        if id & SKY_TRANSFER_BIT != 0 {
            let idx = (id & !SKY_TRANSFER_BIT) as usize;
            if let Some(t) = self.transfers.get(idx) {
                return SkyParams {
                    texture: &self.textures[t.texture],
                    texture_mid: t.row_offset - 28 * FRACUNIT,
                    flip_mask: if t.flip { !0 } else { 0 },
                    angle_offset: t.angle_offset,
                };
            }
        }
        SkyParams {
            texture: &self.textures[self.default_texture],
            texture_mid: SKY_TEXTURE_MID,
            flip_mask: 0,
            angle_offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::ANG90;
    use crate::world::flats::SKY_FLAT;

    fn tiny_sky(w: usize, h: usize) -> SkyTexture {
        let texels = (0..w * h).map(|i| i as u8).collect();
        SkyTexture::new("SKY1", w, h, texels)
    }

    #[test]
    fn column_wraps_horizontally() {
        let sky = tiny_sky(4, 2);
        assert_eq!(sky.column(1), sky.column(5));
        assert_eq!(sky.column(3), &[6, 7]);
    }

    #[test]
    fn default_params_for_global_sky() {
        let sky = SkyBox::new(tiny_sky(4, 2));
        let p = sky.params_for(SKY_FLAT);
        assert_eq!(p.texture_mid, SKY_TEXTURE_MID);
        assert_eq!(p.flip_mask, 0);
        assert_eq!(p.angle_offset, 0);
    }

    #[test]
    fn transfer_overrides_rotation_and_flip() {
        let mut sky = SkyBox::new(tiny_sky(4, 2));
        let alt = sky.add_texture(tiny_sky(8, 2));
        let id = sky.add_transfer(SkyTransfer {
            texture: alt,
            row_offset: 40 * FRACUNIT,
            angle_offset: ANG90,
            flip: true,
        });
        assert_ne!(id & SKY_TRANSFER_BIT, 0);

        let p = sky.params_for(id);
        assert_eq!(p.texture.w, 8);
        assert_eq!(p.texture_mid, (40 - 28) * FRACUNIT);
        assert_eq!(p.flip_mask, !0);
        assert_eq!(p.angle_offset, ANG90);
    }

    #[test]
    fn dangling_transfer_falls_back_to_default() {
        let sky = SkyBox::new(tiny_sky(4, 2));
        let p = sky.params_for(SKY_TRANSFER_BIT | 7);
        assert_eq!(p.texture.w, 4);
        assert_eq!(p.texture_mid, SKY_TEXTURE_MID);
    }
}
