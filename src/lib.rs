//! Visible-surface determination and plane rasterization for a classic
//! column/span software renderer.
//!
//! The pipeline per frame:
//!
//! 1. [`engine::PlaneRenderer::begin_frame`] resets clip arrays, the surface
//!    registry and the scanline geometry cache.
//! 2. The caller's wall/BSP traversal discovers visible floor/ceiling column
//!    runs and claims them via `find_plane` / `check_plane`, writing the
//!    per-column occlusion bounds it computed.
//! 3. [`engine::PlaneRenderer::end_frame`] merges the claims into maximal
//!    horizontal spans and rasterizes them — perspective-correct fixed-point
//!    texture mapping, distance-banded lighting, angle-mapped sky columns —
//!    into any [`renderer::SpanSink`].
//!
//! The crate deliberately stops at the sink seam: wall drawing, sprites and
//! asset loading belong to the caller.

pub mod engine;
pub mod fixed;
pub mod renderer;
pub mod world;
