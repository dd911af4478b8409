use crate::fixed::{Angle, Fixed};

/// Everything the plane pipeline needs to know about one frame's viewpoint.
/// Produced by whoever drives the renderer (demo camera, game loop) and
/// consumed by `PlaneRenderer::begin_frame`.
#[derive(Clone, Copy, Debug)]
pub struct ViewSetup {
    /// Eye position in map units (16.16).
    pub x: Fixed,
    pub y: Fixed,
    pub z: Fixed,
    /// Heading; 0 = east, counter-clockwise.
    pub angle: Angle,

    pub width: usize,
    pub height: usize,
    /// Projection center column, normally `width / 2`.
    pub center_x: usize,

    /// Low-detail mode doubles the texel step (0 = full detail).
    pub detail_shift: u32,
    /// Powerup light bonus added to every sector light level.
    pub extra_light: i32,
    /// When set, every surface uses this colormap shade verbatim
    /// (invulnerability / light-amp), bypassing distance banding.
    pub fixed_colormap: Option<usize>,
}

impl ViewSetup {
    #[inline]
    pub fn center_y(&self) -> i32 {
        (self.height / 2) as i32
    }
}
