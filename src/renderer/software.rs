//! Paletted software back-end.
//!
//! Owns an 8-bit indexed scratch buffer for the whole frame; `resolve` turns
//! it into displayable RGB once per frame.  Sampling matches the classic
//! span/column inner loops: flats wrap in a 64x64 tile, sky columns wrap at
//! the texture height.

use crate::fixed::FRACBITS;
use crate::renderer::{Rgba, SkyColumnArgs, SpanArgs, SpanSink};

pub struct SoftBuffer {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
}

impl SoftBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
        }
    }

    /// (Re)allocate for the requested resolution and clear to palette index 0.
    pub fn begin_frame(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pixels.resize(width * height, 0);
        }
        self.pixels.fill(0);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Palette index at (x, y); handy for tests and debug dumps.
    pub fn index_at(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }

    /// Expand the indexed buffer through `palette` into `out`.
    pub fn resolve(&self, palette: &[Rgba; 256], out: &mut Vec<Rgba>) {
        out.clear();
        out.extend(self.pixels.iter().map(|&i| palette[i as usize]));
    }
}

impl SpanSink for SoftBuffer {
    fn draw_span(&mut self, span: &SpanArgs) {
        debug_assert!(
            span.x1 >= 0
                && span.x1 <= span.x2
                && (span.x2 as usize) < self.width
                && (span.row as usize) < self.height,
            "draw_span: {}, {} at {}",
            span.x1,
            span.x2,
            span.row
        );

        let row = &mut self.pixels[span.row as usize * self.width..][..self.width];
        let mut x_frac = span.x_frac;
        let mut y_frac = span.y_frac;

        for slot in &mut row[span.x1 as usize..=span.x2 as usize] {
            // 64x64 tile: whole-texel bits, six of each
            let spot = ((y_frac >> (FRACBITS - 6)) & (63 * 64)) | ((x_frac >> FRACBITS) & 63);
            *slot = span.colormap[span.source[spot as usize] as usize];
            x_frac = x_frac.wrapping_add(span.x_step);
            y_frac = y_frac.wrapping_add(span.y_step);
        }
    }

    fn draw_sky_column(&mut self, col: &SkyColumnArgs) {
        debug_assert!(
            col.y1 >= 0 && col.y1 <= col.y2 && (col.y2 as usize) < self.height,
            "draw_sky_column: {}, {} at {}",
            col.y1,
            col.y2,
            col.x
        );

        let tex_h = col.source.len() as i32;
        let mut frac = col.frac;
        let mut dest = col.y1 as usize * self.width + col.x as usize;

        for _ in col.y1..=col.y2 {
            let texel = col.source[(frac >> FRACBITS).rem_euclid(tex_h) as usize];
            self.pixels[dest] = col.colormap[texel as usize];
            dest += self.width;
            frac = frac.wrapping_add(col.iscale);
        }
    }
}
