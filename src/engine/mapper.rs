//! Perspective mapping for one horizontal plane span, plus the per-row
//! geometry cache that makes it cheap.
//!
//! For a given surface height, every screen row sees the plane at one fixed
//! distance, so the reciprocal-perspective coefficients (distance and the
//! texel step pair) are cached per row and recomputed only when a surface
//! with a different height lands on that row.  The cache is invalidated
//! wholesale at frame start.

use crate::engine::planes::VisPlane;
use crate::engine::types::ViewSetup;
use crate::fixed::{
    ANG90, ANGLETOFINESHIFT, ANGLETOSKYSHIFT, Angle, FRACBITS, FRACUNIT, Fixed, cos_angle,
    fine_cosine, fine_sine, fixed_div, fixed_mul, sin_angle,
};
use crate::renderer::{SkyColumnArgs, SpanArgs, SpanSink};
use crate::world::flats::FLAT_LEN;
use crate::world::lights::{Colormap, LightTables};
use crate::world::sky::SkyParams;

/// Sentinel for "no geometry computed for this row yet".  An actual plane
/// height of `Fixed::MIN` cannot occur: heights are absolute distances from
/// the eye.
const UNCOMPUTED: Fixed = Fixed::MIN;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowGeometry {
    pub distance: Fixed,
    pub x_step: Fixed,
    pub y_step: Fixed,
}

pub struct PlaneMapper {
    cached_height: Vec<Fixed>,
    cached_distance: Vec<Fixed>,
    cached_x_step: Vec<Fixed>,
    cached_y_step: Vec<Fixed>,
    y_slope: Vec<Fixed>,

    width: usize,
    height: usize,
    center_x: i32,
    center_y: i32,
    detail_shift: u32,

    view_x: Fixed,
    view_y: Fixed,
    view_sin: Fixed,
    view_cos: Fixed,

    /// Texel step per screen column at unit distance, derived from the view
    /// angle; row steps scale these by the row's distance.
    base_x_scale: Fixed,
    base_y_scale: Fixed,

    /// Height of the surface currently being rasterized, as a distance from
    /// the eye (always >= 0).
    plane_height: Fixed,
}

impl PlaneMapper {
    pub fn new() -> Self {
        Self {
            cached_height: Vec::new(),
            cached_distance: Vec::new(),
            cached_x_step: Vec::new(),
            cached_y_step: Vec::new(),
            y_slope: Vec::new(),
            width: 0,
            height: 0,
            center_x: 0,
            center_y: 0,
            detail_shift: 0,
            view_x: 0,
            view_y: 0,
            view_sin: 0,
            view_cos: FRACUNIT,
            base_x_scale: 0,
            base_y_scale: 0,
            plane_height: 0,
        }
    }

    /// Frame start: adopt the view, invalidate every cached row, and rebuild
    /// the slope table if the view size changed.
    pub fn begin_frame(&mut self, view: &ViewSetup) {
        let resized = view.width != self.width
            || view.height != self.height
            || view.detail_shift != self.detail_shift;
        self.width = view.width;
        self.height = view.height;
        self.center_x = view.center_x as i32;
        self.center_y = view.center_y();
        self.detail_shift = view.detail_shift;

        self.view_x = view.x;
        self.view_y = view.y;
        self.view_sin = sin_angle(view.angle);
        self.view_cos = cos_angle(view.angle);

        // left-to-right mapping basis; unit scale at center_x distance
        let angle = (view.angle.wrapping_sub(ANG90) >> ANGLETOFINESHIFT) as usize;
        let center_x_frac = (view.center_x as Fixed) << FRACBITS;
        self.base_x_scale = fixed_div(fine_cosine(angle), center_x_frac);
        self.base_y_scale = -fixed_div(fine_sine(angle), center_x_frac);

        if resized {
            self.rebuild_y_slope();
            self.cached_distance.resize(self.height, 0);
            self.cached_x_step.resize(self.height, 0);
            self.cached_y_step.resize(self.height, 0);
        }
        self.cached_height.clear();
        self.cached_height.resize(self.height, UNCOMPUTED);
    }

    /// Per-frame perspective basis derived from the view angle; the wall
    /// traversal seeds its own mapping from these.
    pub fn base_scales(&self) -> (Fixed, Fixed) {
        (self.base_x_scale, self.base_y_scale)
    }

    /// Set the eye-relative height of the surface about to be rasterized.
    pub fn set_plane_height(&mut self, h: Fixed) {
        debug_assert!(h >= 0, "plane height is a distance from the eye");
        self.plane_height = h;
    }

    fn rebuild_y_slope(&mut self) {
        self.y_slope.clear();
        let half_span = ((self.width << self.detail_shift) / 2) as Fixed * FRACUNIT;
        for y in 0..self.height as i32 {
            // sample at the row center
            let dy = (((y - self.center_y) << FRACBITS) + FRACUNIT / 2).abs();
            self.y_slope.push(fixed_div(half_span, dy));
        }
    }

    /// Distance and texel steps for `row`, recomputed only when the cached
    /// height differs from the current plane height.  The half-texel offset
    /// in the slope table keeps the horizon row finite; its distance merely
    /// saturates the light bucket.
    pub fn geometry(&mut self, row: i32) -> RowGeometry {
        let r = row as usize;
        if self.cached_height[r] != self.plane_height {
            self.cached_height[r] = self.plane_height;
            let distance = fixed_mul(self.plane_height, self.y_slope[r]);
            self.cached_distance[r] = distance;
            self.cached_x_step[r] = fixed_mul(distance, self.base_x_scale) << self.detail_shift;
            self.cached_y_step[r] = fixed_mul(distance, self.base_y_scale) << self.detail_shift;
        }
        RowGeometry {
            distance: self.cached_distance[r],
            x_step: self.cached_x_step[r],
            y_step: self.cached_y_step[r],
        }
    }

    /// Rasterize columns `x1 ..= x2` of `row` from `source`, picking the
    /// light remap by distance bucket (or the fixed override).
    #[allow(clippy::too_many_arguments)]
    pub fn map_row<S: SpanSink>(
        &mut self,
        row: i32,
        x1: i32,
        x2: i32,
        source: &[u8; FLAT_LEN],
        lights: &LightTables,
        light_row: usize,
        fixed_colormap: Option<usize>,
        sink: &mut S,
    ) {
        #[cfg(debug_assertions)]
        if x2 < x1 || x1 < 0 || x2 >= self.width as i32 || row < 0 || row >= self.height as i32 {
            panic!("map_row: {x1}, {x2} at {row}");
        }

        let g = self.geometry(row);

        let dx = x1 - self.center_x;
        let x_frac = self.view_x + fixed_mul(self.view_cos, g.distance) + dx * g.x_step;
        let y_frac = -self.view_y - fixed_mul(self.view_sin, g.distance) + dx * g.y_step;

        let colormap = match fixed_colormap {
            Some(shade) => lights.shade(shade),
            None => lights.z_light(light_row, LightTables::distance_bucket(g.distance)),
        };

        sink.draw_span(&SpanArgs {
            row,
            x1,
            x2,
            x_frac,
            y_frac,
            x_step: g.x_step,
            y_step: g.y_step,
            source,
            colormap,
        });
    }

    /// Sky surfaces map by screen angle, not world position: one column at a
    /// time, always full-bright, honoring the transfer's rotation and flip.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_sky<S: SpanSink>(
        &self,
        plane: &VisPlane,
        sky: &SkyParams,
        view_angle: Angle,
        x_to_view_angle: &[Angle],
        iscale: Fixed,
        colormap: &Colormap,
        sink: &mut S,
    ) {
        let base = view_angle.wrapping_add(sky.angle_offset);
        for x in plane.min_x..=plane.max_x {
            let (top, bottom) = (plane.top(x), plane.bottom(x));
            // unclaimed columns have top == u16::MAX and fail this test
            if top > bottom {
                continue;
            }
            let angle =
                (base.wrapping_add(x_to_view_angle[x as usize]) ^ sky.flip_mask) >> ANGLETOSKYSHIFT;
            let frac = sky.texture_mid + (top as i32 - self.center_y) * iscale;
            sink.draw_sky_column(&SkyColumnArgs {
                x,
                y1: top as i32,
                y2: bottom as i32,
                frac,
                iscale,
                source: sky.texture.column(angle as usize),
                colormap,
            });
        }
    }
}

impl Default for PlaneMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::ANG90;
    use crate::world::lights::MAXLIGHTZ;

    fn view(width: usize, height: usize) -> ViewSetup {
        ViewSetup {
            x: 100 * FRACUNIT,
            y: -50 * FRACUNIT,
            z: 41 * FRACUNIT,
            angle: ANG90,
            width,
            height,
            center_x: width / 2,
            detail_shift: 0,
            extra_light: 0,
            fixed_colormap: None,
        }
    }

    struct Recorder {
        spans: Vec<(i32, i32, i32, Fixed, Fixed, Fixed, Fixed)>,
        colormaps: Vec<Colormap>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                spans: Vec::new(),
                colormaps: Vec::new(),
            }
        }
    }

    impl SpanSink for Recorder {
        fn draw_span(&mut self, s: &SpanArgs) {
            self.spans
                .push((s.row, s.x1, s.x2, s.x_frac, s.y_frac, s.x_step, s.y_step));
            self.colormaps.push(*s.colormap);
        }
        fn draw_sky_column(&mut self, _c: &SkyColumnArgs) {}
    }

    #[test]
    fn geometry_is_stable_for_same_height_and_row() {
        let mut m = PlaneMapper::new();
        m.begin_frame(&view(320, 200));

        m.set_plane_height(32 * FRACUNIT);
        let g1 = m.geometry(150);

        // intervening rows and heights must not disturb the answer
        m.geometry(180);
        m.set_plane_height(64 * FRACUNIT);
        m.geometry(150);

        m.set_plane_height(32 * FRACUNIT);
        assert_eq!(m.geometry(150), g1);
    }

    #[test]
    fn horizon_row_still_renders() {
        let mut m = PlaneMapper::new();
        m.begin_frame(&view(320, 200));
        m.set_plane_height(32 * FRACUNIT);
        // the center row sits a half texel off the vanishing point, so its
        // distance is finite (if enormous) and the light bucket saturates
        let g = m.geometry(100);
        assert_eq!(LightTables::distance_bucket(g.distance), MAXLIGHTZ - 1);

        let lights = LightTables::grayscale(320);
        let flat = [0u8; FLAT_LEN];
        let mut rec = Recorder::new();
        m.map_row(100, 10, 80, &flat, &lights, 8, None, &mut rec);
        assert_eq!(rec.spans.len(), 1);
        let (row, x1, x2, ..) = rec.spans[0];
        assert_eq!((row, x1, x2), (100, 10, 80));
    }

    #[test]
    fn farther_rows_are_farther_away() {
        let mut m = PlaneMapper::new();
        m.begin_frame(&view(320, 200));
        m.set_plane_height(32 * FRACUNIT);
        // approaching the horizon from below = receding into the distance
        let near = m.geometry(199).distance;
        let far = m.geometry(110).distance;
        assert!(far > near, "far {far} near {near}");
    }

    #[test]
    fn map_row_emits_one_span_with_row_steps() {
        let mut m = PlaneMapper::new();
        m.begin_frame(&view(320, 200));
        m.set_plane_height(32 * FRACUNIT);
        let lights = LightTables::grayscale(320);
        let flat = [0u8; FLAT_LEN];
        let mut rec = Recorder::new();

        m.map_row(150, 10, 80, &flat, &lights, 8, None, &mut rec);
        assert_eq!(rec.spans.len(), 1);
        let (row, x1, x2, _, _, xs, ys) = rec.spans[0];
        assert_eq!((row, x1, x2), (150, 10, 80));
        let g = m.geometry(150);
        assert_eq!((xs, ys), (g.x_step, g.y_step));
    }

    #[test]
    fn fixed_colormap_overrides_distance_banding() {
        let mut m = PlaneMapper::new();
        m.begin_frame(&view(320, 200));
        m.set_plane_height(32 * FRACUNIT);
        let lights = LightTables::grayscale(320);
        let flat = [0u8; FLAT_LEN];
        let mut rec = Recorder::new();

        m.map_row(150, 0, 10, &flat, &lights, 8, Some(5), &mut rec);
        assert_eq!(&rec.colormaps[0], lights.shade(5));
    }

    #[test]
    fn distance_bucket_saturates_near_horizon() {
        let mut m = PlaneMapper::new();
        m.begin_frame(&view(320, 200));
        m.set_plane_height(100 * FRACUNIT);
        let g = m.geometry(101);
        assert_eq!(LightTables::distance_bucket(g.distance), MAXLIGHTZ - 1);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "map_row")]
    fn inverted_range_is_fatal_in_debug() {
        let mut m = PlaneMapper::new();
        m.begin_frame(&view(320, 200));
        m.set_plane_height(FRACUNIT);
        let lights = LightTables::grayscale(320);
        let flat = [0u8; FLAT_LEN];
        let mut rec = Recorder::new();
        m.map_row(150, 50, 10, &flat, &lights, 0, None, &mut rec);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "map_row")]
    fn row_past_view_bottom_is_fatal_in_debug() {
        let mut m = PlaneMapper::new();
        m.begin_frame(&view(320, 200));
        m.set_plane_height(FRACUNIT);
        let lights = LightTables::grayscale(320);
        let flat = [0u8; FLAT_LEN];
        let mut rec = Recorder::new();
        m.map_row(200, 0, 10, &flat, &lights, 0, None, &mut rec);
    }
}
