//! Span emitter: turns a surface's per-column occlusion bounds into the
//! minimal set of maximal horizontal runs.
//!
//! The sweep walks columns left to right holding the previous column's open
//! interval in (`t1`, `b1`) and the current one in (`t2`, `b2`).  Rows that
//! fall out of the interval are flushed as finished spans; rows that newly
//! enter it record their starting column in `span_start`.  Each visible
//! (row, column) pair is covered by exactly one emitted span.

use crate::engine::planes::VisPlane;

pub struct SpanEmitter {
    /// Per-row column where the currently open span began.
    span_start: Vec<i32>,
    height: usize,
}

impl SpanEmitter {
    pub fn new() -> Self {
        Self {
            span_start: Vec::new(),
            height: 0,
        }
    }

    /// Size the start table for the current view height.
    pub fn resize(&mut self, height: usize) {
        if height != self.height {
            self.height = height;
            self.span_start.clear();
            self.span_start.resize(height, 0);
        }
    }

    /// Walk `plane` and call `map_row(row, x1, x2)` for every maximal
    /// horizontal run.  The boundary columns are forced back to the
    /// unclaimed sentinel so every open span closes at the edges.
    pub fn emit<F>(&mut self, plane: &mut VisPlane, mut map_row: F)
    where
        F: FnMut(i32, i32, i32),
    {
        if plane.min_x > plane.max_x {
            return;
        }

        plane.clear_column(plane.max_x + 1);
        plane.clear_column(plane.min_x - 1);

        let stop = plane.max_x + 1;
        for x in plane.min_x..=stop {
            self.make_spans(
                x,
                plane.top(x - 1),
                plane.bottom(x - 1),
                plane.top(x),
                plane.bottom(x),
                &mut map_row,
            );
        }
    }

    fn make_spans<F>(&mut self, x: i32, mut t1: u16, mut b1: u16, mut t2: u16, mut b2: u16, map_row: &mut F)
    where
        F: FnMut(i32, i32, i32),
    {
        // rows open in the previous column but not this one: flush
        while t1 < t2 && t1 <= b1 {
            debug_assert!((t1 as usize) < self.height, "row {t1} beyond view height");
            map_row(t1 as i32, self.span_start[t1 as usize], x - 1);
            t1 += 1;
        }
        while b1 > b2 && b1 >= t1 {
            debug_assert!((b1 as usize) < self.height, "row {b1} beyond view height");
            map_row(b1 as i32, self.span_start[b1 as usize], x - 1);
            b1 -= 1;
        }

        // rows open in this column but not the previous one: start pending
        while t2 < t1 && t2 <= b2 {
            self.span_start[t2 as usize] = x;
            t2 += 1;
        }
        while b2 > b1 && b2 >= t2 {
            self.span_start[b2 as usize] = x;
            b2 -= 1;
        }
    }
}

impl Default for SpanEmitter {
    fn default() -> Self {
        Self::new()
    }
}
