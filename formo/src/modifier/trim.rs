// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trimming the accumulated geometries to an arc-length window.

use peniko::kurbo::{BezPath, ParamCurveArclen};

use crate::context::EvaluationContext;
use crate::layer::{LayerHandle, Node};
use crate::path::{self, ARCLEN_ACCURACY};

/// How the trim window distributes over multiple geometries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrimMode {
    /// The same normalized window applies to every geometry's own
    /// boundary.
    #[default]
    Simultaneous,
    /// All geometries lie on one concatenated ruler; each receives its
    /// own local sub-window.
    Individual,
}

/// Trims every accumulated geometry to the window `[start, end]`,
/// shifted by `offset` (a fraction of a full turn) and normalized into
/// [0, 1) with wrap-around.
///
/// A window with `start > end` is inverted: traversal direction flips
/// and every output piece is emitted reversed, the first piece nearest
/// the post-offset start.
#[derive(Clone, Debug)]
pub struct TrimPath {
    base: Node,
    start: f64,
    end: f64,
    offset: f64,
    mode: TrimMode,
}

impl Default for TrimPath {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl TrimPath {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            base: Node::default(),
            start,
            end,
            offset: 0.0,
            mode: TrimMode::default(),
        }
    }

    pub fn set_start(&mut self, start: f64) {
        self.start = start;
        self.base.invalidate();
    }

    pub fn set_end(&mut self, end: f64) {
        self.end = end;
        self.base.invalidate();
    }

    /// Angular offset as a fraction of a full turn.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
        self.base.invalidate();
    }

    pub fn set_mode(&mut self, mode: TrimMode) {
        self.mode = mode;
        self.base.invalidate();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.base.set_enabled(enabled);
    }

    pub(crate) fn node(&self) -> &Node {
        &self.base
    }

    pub(crate) fn attach(&mut self, layer: &LayerHandle) {
        self.base.attach(layer);
    }

    pub(crate) fn detach(&mut self) {
        self.base.detach();
    }

    pub(crate) fn apply(&mut self, ctx: &mut EvaluationContext) {
        if ctx.is_empty() {
            return;
        }
        let Some(window) = Window::new(self.start, self.end, self.offset) else {
            // Zero-length window: everything trims away.
            for index in 0..ctx.len() {
                if let Some(geometry) = ctx.geometry_mut(index) {
                    geometry.set_shape_path(BezPath::new());
                }
            }
            return;
        };
        if window.is_full() {
            if window.reversed {
                for index in 0..ctx.len() {
                    if let Some(path) = ctx.geometry_mut(index).and_then(|g| g.shape_path_mut()) {
                        *path = path::reverse(path);
                    }
                }
            }
            return;
        }
        match self.mode {
            TrimMode::Simultaneous => self.apply_simultaneous(ctx, &window),
            TrimMode::Individual => self.apply_individual(ctx, &window),
        }
    }

    fn apply_simultaneous(&self, ctx: &mut EvaluationContext, window: &Window) {
        for index in 0..ctx.len() {
            let Some(path) = ctx.geometry_mut(index).and_then(|g| g.shape_path_mut()) else {
                continue;
            };
            let mut out = path::trim_wrapped(path, window.start, window.end);
            if window.reversed {
                out = path::reverse(&out);
            }
            *path = out;
        }
    }

    fn apply_individual(&self, ctx: &mut EvaluationContext, window: &Window) {
        // One ruler across the concatenated arc lengths.
        let mut lengths = Vec::with_capacity(ctx.len());
        for index in 0..ctx.len() {
            let len = match ctx.geometry_mut(index).and_then(|g| g.shape_path_mut()) {
                Some(path) => path
                    .segments()
                    .map(|seg| seg.arclen(ARCLEN_ACCURACY))
                    .sum::<f64>(),
                None => 0.0,
            };
            lengths.push(len);
        }
        let total: f64 = lengths.iter().sum();
        if total <= 0.0 {
            return;
        }
        let abs_start = window.start * total;
        let abs_end = window.end * total;
        // The window on the circular ruler, as up to two linear spans.
        let spans: [(f64, f64); 2] = if abs_end <= total {
            [(abs_start, abs_end), (0.0, 0.0)]
        } else {
            [(abs_start, total), (0.0, abs_end - total)]
        };
        let mut cum = 0.0;
        for (index, len) in lengths.iter().enumerate() {
            let (geo_start, geo_end) = (cum, cum + len);
            cum = geo_end;
            let Some(path) = ctx.geometry_mut(index).and_then(|g| g.shape_path_mut()) else {
                continue;
            };
            if *len <= 0.0 {
                continue;
            }
            let mut local = Vec::new();
            for &(a, b) in &spans {
                let lo = a.max(geo_start);
                let hi = b.min(geo_end);
                if hi - lo > 1e-9 {
                    local.push(((lo - geo_start) / len, (hi - geo_start) / len));
                }
            }
            let mut out = match local.as_slice() {
                [] => BezPath::new(),
                [(a, b)] => path::trim(path, *a, *b),
                // A cut reaching this geometry's end and another
                // starting at its beginning is one continuous cut
                // across the seam.
                [(a1, b1), (a2, b2)] if (*b1 - 1.0).abs() < 1e-9 && *a2 < 1e-9 => {
                    path::trim_wrapped(path, *a1, 1.0 + *b2)
                }
                windows => {
                    let mut out = BezPath::new();
                    for (a, b) in windows {
                        out.extend(path::trim(path, *a, *b));
                    }
                    out
                }
            };
            if window.reversed {
                out = path::reverse(&out);
            }
            *path = out;
        }
    }
}

/// A normalized trim window: `start` in [0, 1), `end` in
/// (start, start + 1], `reversed` when the declared start exceeded the
/// end.
struct Window {
    start: f64,
    end: f64,
    reversed: bool,
}

impl Window {
    fn new(start: f64, end: f64, offset: f64) -> Option<Self> {
        let reversed = start > end;
        let (lo, hi) = if reversed { (end, start) } else { (start, end) };
        let span = (hi - lo).min(1.0);
        if span <= 1e-9 {
            return None;
        }
        let lo = lo + offset;
        let shifted = lo - lo.floor();
        Some(Self {
            start: shifted,
            end: shifted + span,
            reversed,
        })
    }

    fn is_full(&self) -> bool {
        self.end - self.start >= 1.0 - 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use peniko::kurbo::{Affine, PathEl, Point, Rect, Shape};

    fn line_ctx(spans: &[(f64, f64)]) -> EvaluationContext {
        let mut ctx = EvaluationContext::new();
        for &(x0, x1) in spans {
            let mut p = BezPath::new();
            p.move_to((x0, 0.0));
            p.line_to((x1, 0.0));
            ctx.push_geometry(Geometry::from_path(p), Affine::IDENTITY);
        }
        ctx
    }

    fn endpoints(path: &BezPath) -> (Point, Point) {
        let mut first = Point::ZERO;
        let mut last = Point::ZERO;
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    if path.elements().first() == Some(el) {
                        first = p;
                    }
                    last = p;
                }
                PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => last = p,
                PathEl::ClosePath => {}
            }
        }
        (first, last)
    }

    #[test]
    fn full_window_is_identity() {
        let mut ctx = line_ctx(&[(0.0, 100.0)]);
        TrimPath::new(0.0, 1.0).apply(&mut ctx);
        let path = ctx.geometry_mut(0).unwrap().shape_path_mut().unwrap().clone();
        let (first, last) = endpoints(&path);
        assert_eq!(first, Point::new(0.0, 0.0));
        assert_eq!(last, Point::new(100.0, 0.0));
    }

    #[test]
    fn degenerate_window_empties() {
        let mut ctx = line_ctx(&[(0.0, 100.0)]);
        TrimPath::new(0.4, 0.4).apply(&mut ctx);
        assert!(ctx
            .geometry_mut(0)
            .unwrap()
            .shape_path_mut()
            .unwrap()
            .elements()
            .is_empty());
    }

    #[test]
    fn simultaneous_applies_same_window_to_each() {
        let mut ctx = line_ctx(&[(0.0, 100.0), (0.0, 50.0)]);
        let mut trim = TrimPath::new(0.0, 0.5);
        trim.set_mode(TrimMode::Simultaneous);
        trim.apply(&mut ctx);
        let a = ctx.geometry_mut(0).unwrap().shape_path_mut().unwrap().clone();
        let b = ctx.geometry_mut(1).unwrap().shape_path_mut().unwrap().clone();
        assert_eq!(endpoints(&a).1, Point::new(50.0, 0.0));
        assert_eq!(endpoints(&b).1, Point::new(25.0, 0.0));
    }

    #[test]
    fn individual_lays_geometries_on_one_ruler() {
        let mut ctx = line_ctx(&[(0.0, 100.0), (0.0, 100.0)]);
        let mut trim = TrimPath::new(0.25, 0.75);
        trim.set_mode(TrimMode::Individual);
        trim.apply(&mut ctx);
        let a = ctx.geometry_mut(0).unwrap().shape_path_mut().unwrap().clone();
        let b = ctx.geometry_mut(1).unwrap().shape_path_mut().unwrap().clone();
        // First geometry keeps its second half, second keeps its first.
        assert_eq!(endpoints(&a).0, Point::new(50.0, 0.0));
        assert_eq!(endpoints(&a).1, Point::new(100.0, 0.0));
        assert_eq!(endpoints(&b).0, Point::new(0.0, 0.0));
        assert_eq!(endpoints(&b).1, Point::new(50.0, 0.0));
    }

    #[test]
    fn offset_wraps_window() {
        let mut ctx = line_ctx(&[(0.0, 100.0)]);
        let mut trim = TrimPath::new(0.0, 0.5);
        trim.set_offset(0.75);
        trim.apply(&mut ctx);
        // Window [0.75, 1.25): two pieces on an open line.
        let path = ctx.geometry_mut(0).unwrap().shape_path_mut().unwrap().clone();
        let moves = path
            .elements()
            .iter()
            .filter(|el| matches!(el, PathEl::MoveTo(_)))
            .count();
        assert_eq!(moves, 2);
    }

    #[test]
    fn wrapped_window_on_closed_contour_stitches() {
        let mut ctx = EvaluationContext::new();
        ctx.push_geometry(
            Geometry::from_path(Rect::new(0.0, 0.0, 10.0, 10.0).to_path(1e-3)),
            Affine::IDENTITY,
        );
        let mut trim = TrimPath::new(0.0, 0.5);
        trim.set_offset(0.75);
        trim.apply(&mut ctx);
        let path = ctx.geometry_mut(0).unwrap().shape_path_mut().unwrap().clone();
        let moves = path
            .elements()
            .iter()
            .filter(|el| matches!(el, PathEl::MoveTo(_)))
            .count();
        assert_eq!(moves, 1);
    }

    #[test]
    fn inverted_window_reverses_direction() {
        let mut ctx = line_ctx(&[(0.0, 100.0)]);
        TrimPath::new(0.5, 0.0).apply(&mut ctx);
        let path = ctx.geometry_mut(0).unwrap().shape_path_mut().unwrap().clone();
        let (first, last) = endpoints(&path);
        // Same window as [0, 0.5], walked backward.
        assert_eq!(first, Point::new(50.0, 0.0));
        assert_eq!(last, Point::new(0.0, 0.0));
    }

    #[test]
    fn inverted_trim_composes_by_post_offset_start() {
        // Trimming twice: the first piece of an inverted output is the
        // piece nearer the post-offset start.
        let mut ctx = line_ctx(&[(0.0, 100.0)]);
        let mut first = TrimPath::new(0.75, 0.25);
        first.set_offset(0.25);
        first.apply(&mut ctx);
        // Window: declared [0.25(end), 0.75(start)] + 0.25 offset ->
        // [0.5, 1.0], reversed. Output walks from 100 back to 50.
        TrimPath::new(0.0, 0.5).apply(&mut ctx);
        let path = ctx.geometry_mut(0).unwrap().shape_path_mut().unwrap().clone();
        let (first_pt, last_pt) = endpoints(&path);
        assert_eq!(first_pt, Point::new(100.0, 0.0));
        assert_eq!(last_pt, Point::new(75.0, 0.0));
    }
}
