//! Rendering abstraction layer.
//!
//! *The plane engine never touches a pixel buffer directly.*
//! It resolves visibility, texture coordinates and lighting, then hands one
//! [`SpanArgs`] per horizontal run (or one [`SkyColumnArgs`] per sky column)
//! to a type that implements [`SpanSink`].
//!
//! * You can plug multiple back-ends (paletted software buffer, a recording
//!   double in tests, …) without changing engine logic.
//! * The engine never reads pixels back.

use crate::fixed::Fixed;
use crate::world::flats::FLAT_LEN;
use crate::world::lights::Colormap;

/// Pixel format of the resolved software frame-buffer (0x00RRGGBB).
pub type Rgba = u32;

/// Everything needed to sample one horizontal flat run.
///
/// `x_frac`/`y_frac` are 16.16 world texel coordinates at `x1`; each pixel to
/// the right advances by the step pair.  The sink wraps them into the 64x64
/// tile and remaps the texel through `colormap`.
pub struct SpanArgs<'a> {
    pub row: i32,
    pub x1: i32,
    pub x2: i32,

    pub x_frac: Fixed,
    pub y_frac: Fixed,
    pub x_step: Fixed,
    pub y_step: Fixed,

    pub source: &'a [u8; FLAT_LEN],
    pub colormap: &'a Colormap,
}

/// One vertical sky strip: `source` is a whole texture column, sampled at
/// `iscale` texels per screen pixel starting from `frac` at row `y1`.
/// Sampling wraps at the column length (no Tutti-Frutti).
pub struct SkyColumnArgs<'a> {
    pub x: i32,
    pub y1: i32,
    pub y2: i32,

    pub frac: Fixed,
    pub iscale: Fixed,

    pub source: &'a [u8],
    pub colormap: &'a Colormap,
}

/// Destination for rasterized pixels — the framebuffer/compositor seam.
pub trait SpanSink {
    /// Blend one textured horizontal run into the target.
    fn draw_span(&mut self, span: &SpanArgs);

    /// Blend one sky column into the target.
    fn draw_sky_column(&mut self, col: &SkyColumnArgs);
}

pub mod software;
