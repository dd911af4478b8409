//! Frame lifecycle for the plane pipeline.
//!
//! [`PlaneRenderer`] owns every piece of per-frame state: the clip arrays the
//! wall traversal writes into, the visplane registry, the span emitter, the
//! scanline geometry cache and the swirl memo.  One frame is fully resolved
//! before the next begins; `begin_frame` must run exactly once before any
//! surface lookup, `end_frame` drains the registry into a [`SpanSink`].

pub mod mapper;
pub mod planes;
pub mod spans;
pub mod swirl;
pub mod types;

use crate::engine::mapper::PlaneMapper;
use crate::engine::planes::{PlaneId, PlaneSet, VisPlane};
use crate::engine::spans::SpanEmitter;
use crate::engine::swirl::SwirlCache;
use crate::engine::types::ViewSetup;
use crate::fixed::{Angle, FRACBITS, FRACUNIT, Fixed, angle_from_radians, fixed_div};
use crate::renderer::SpanSink;
use crate::world::flats::{self, FlatBank, FlatId};
use crate::world::lights::LightTables;
use crate::world::sky::SkyBox;

/// Default number of registry slots allocated up front.
pub const DEFAULT_PLANE_CAPACITY: usize = 128;

/// Per-column openings allowance; the traversal's scratch buffer growing
/// past this within one frame indicates a runaway clip list.
const OPENINGS_PER_COLUMN: usize = 64 * 4;

pub struct PlaneRenderer {
    view: ViewSetup,
    planes: PlaneSet,
    emitter: SpanEmitter,
    mapper: PlaneMapper,
    swirl: SwirlCache,

    /// Solid-pixel bounds per column, written by the wall traversal.
    /// `floor_clip` starts at the bottom view edge, `ceiling_clip` at -1.
    floor_clip: Vec<i32>,
    ceiling_clip: Vec<i32>,

    /// View angle of each screen column, for sky column selection.
    x_to_view_angle: Vec<Angle>,

    openings_high_water: usize,
}

impl PlaneRenderer {
    pub fn new(initial_planes: usize) -> Self {
        Self {
            view: ViewSetup {
                x: 0,
                y: 0,
                z: 0,
                angle: 0,
                width: 0,
                height: 0,
                center_x: 0,
                detail_shift: 0,
                extra_light: 0,
                fixed_colormap: None,
            },
            planes: PlaneSet::new(initial_planes),
            emitter: SpanEmitter::new(),
            mapper: PlaneMapper::new(),
            swirl: SwirlCache::new(),
            floor_clip: Vec::new(),
            ceiling_clip: Vec::new(),
            x_to_view_angle: Vec::new(),
            openings_high_water: 0,
        }
    }

    /// Reset all per-frame state and adopt this frame's viewpoint.
    pub fn begin_frame(&mut self, view: ViewSetup) {
        let resized = view.width != self.view.width || view.center_x != self.view.center_x;
        self.view = view;

        self.floor_clip.clear();
        self.floor_clip.resize(view.width, view.height as i32);
        self.ceiling_clip.clear();
        self.ceiling_clip.resize(view.width, -1);

        self.planes.reset(view.width);
        self.emitter.resize(view.height);
        self.mapper.begin_frame(&view);
        self.openings_high_water = 0;

        if resized {
            self.rebuild_x_to_view_angle();
        }
    }

    fn rebuild_x_to_view_angle(&mut self) {
        let focal = self.view.center_x as f32; // 90-degree horizontal FoV
        self.x_to_view_angle.clear();
        for x in 0..self.view.width {
            let dx = self.view.center_x as f32 - (x as f32 + 0.5);
            self.x_to_view_angle
                .push(angle_from_radians((dx / focal).atan()));
        }
    }

    /// Per-frame perspective basis derived from the view angle; the wall
    /// traversal seeds its own mapping from these.
    pub fn base_scales(&self) -> (Fixed, Fixed) {
        self.mapper.base_scales()
    }

    pub fn view(&self) -> &ViewSetup {
        &self.view
    }

    /// Look up or intern the surface for this identity triple.
    pub fn find_plane(&mut self, height: Fixed, flat: FlatId, light: i32) -> PlaneId {
        self.planes.find_or_create(height, flat, light)
    }

    /// Claim columns `start ..= stop` on `id`, splitting on conflict.
    /// See [`PlaneSet::claim_range`] for the `keep_shared` policy hook.
    pub fn check_plane(&mut self, id: PlaneId, start: i32, stop: i32, keep_shared: bool) -> PlaneId {
        self.planes.claim_range(id, start, stop, keep_shared)
    }

    pub fn plane(&self, id: PlaneId) -> &VisPlane {
        self.planes.get(id)
    }

    pub fn plane_mut(&mut self, id: PlaneId) -> &mut VisPlane {
        self.planes.get_mut(id)
    }

    /// Number of surfaces interned so far this frame.
    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    pub fn floor_clip(&self) -> &[i32] {
        &self.floor_clip
    }

    pub fn floor_clip_mut(&mut self) -> &mut [i32] {
        &mut self.floor_clip
    }

    pub fn ceiling_clip(&self) -> &[i32] {
        &self.ceiling_clip
    }

    pub fn ceiling_clip_mut(&mut self) -> &mut [i32] {
        &mut self.ceiling_clip
    }

    /// The traversal reports its openings-buffer length after each claim;
    /// only the high-water mark is kept, for the end-of-frame overflow check.
    pub fn note_openings(&mut self, len: usize) {
        self.openings_high_water = self.openings_high_water.max(len);
    }

    /// Largest openings-buffer length reported this frame.
    pub fn openings_high_water(&self) -> usize {
        self.openings_high_water
    }

    /// Draw every live surface.  Surfaces are processed in registry order;
    /// all columns of one surface are rasterized before the next begins.
    pub fn end_frame<S: SpanSink>(
        &mut self,
        flats: &FlatBank,
        lights: &LightTables,
        sky: &SkyBox,
        tick: u32,
        sink: &mut S,
    ) {
        #[cfg(debug_assertions)]
        {
            let limit = self.view.width * OPENINGS_PER_COLUMN;
            if self.openings_high_water > limit {
                panic!(
                    "end_frame: opening overflow ({} > {limit})",
                    self.openings_high_water
                );
            }
        }

        let Self {
            view,
            planes,
            emitter,
            mapper,
            swirl,
            x_to_view_angle,
            ..
        } = self;

        // sky texels per screen pixel, anchored to the classic 200-row view
        let sky_iscale =
            fixed_div(200 * FRACUNIT, (view.height as Fixed) << FRACBITS) >> view.detail_shift;

        for id in 0..planes.len() {
            let (min_x, max_x, height, flat_id, light) = {
                let pl = planes.get(id);
                (pl.min_x, pl.max_x, pl.height, pl.flat, pl.light)
            };
            if min_x > max_x {
                continue;
            }

            if flats::is_sky(flat_id) {
                let params = sky.params_for(flat_id);
                mapper.draw_sky(
                    planes.get(id),
                    &params,
                    view.angle,
                    x_to_view_angle,
                    sky_iscale,
                    lights.fullbright(),
                    sink,
                );
                continue;
            }

            // swirling flats bypass animation translation, like the original
            let swirling = flats.swirling(flat_id);
            let lump = if swirling {
                flat_id
            } else {
                flats.translate(flat_id)
            };
            let guard = flats.acquire(lump);
            let source = if swirling {
                swirl.distorted(lump, guard.texels(), tick)
            } else {
                guard.texels()
            };

            mapper.set_plane_height((height - view.z).abs());
            let light_row = lights.plane_light_row(light, view.extra_light);

            emitter.emit(planes.get_mut(id), |row, x1, x2| {
                mapper.map_row(
                    row,
                    x1,
                    x2,
                    source,
                    lights,
                    light_row,
                    view.fixed_colormap,
                    sink,
                );
            });
            // guard drops here: the lump is released as soon as the surface
            // finishes rasterizing
        }
    }
}

impl Default for PlaneRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_PLANE_CAPACITY)
    }
}
