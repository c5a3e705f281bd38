// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path-level building blocks consumed by the modifiers and styles:
//! arc-length measurement, normalized trimming, corner rounding, and
//! boolean combination.

mod boolean;
mod measure;
mod rounding;
mod trim;

pub use boolean::{combine, BooleanOp};
pub use measure::PathMeasure;
pub use rounding::CornerRounder;
pub use trim::{reverse, trim, trim_wrapped};

use peniko::kurbo::{BezPath, ParamCurve, PathEl, PathSeg, Point};

pub(crate) const ARCLEN_ACCURACY: f64 = 1e-6;

/// One contiguous run of segments from a path, with its closed flag.
pub(crate) struct SubPath {
    pub(crate) segs: Vec<PathSeg>,
    pub(crate) closed: bool,
}

/// Splits a path into its subpaths. A `ClosePath` element contributes
/// the implicit closing line segment when the endpoints differ.
pub(crate) fn subpaths(path: &BezPath) -> Vec<SubPath> {
    let mut out: Vec<SubPath> = Vec::new();
    let mut start = Point::ZERO;
    let mut current = Point::ZERO;
    let mut segs: Vec<PathSeg> = Vec::new();
    let flush = |segs: &mut Vec<PathSeg>, closed: bool, out: &mut Vec<SubPath>| {
        if !segs.is_empty() {
            out.push(SubPath {
                segs: std::mem::take(segs),
                closed,
            });
        }
    };
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                flush(&mut segs, false, &mut out);
                start = p;
                current = p;
            }
            PathEl::LineTo(p) => {
                segs.push(PathSeg::Line(peniko::kurbo::Line::new(current, p)));
                current = p;
            }
            PathEl::QuadTo(p1, p2) => {
                segs.push(PathSeg::Quad(peniko::kurbo::QuadBez::new(current, p1, p2)));
                current = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                segs.push(PathSeg::Cubic(peniko::kurbo::CubicBez::new(
                    current, p1, p2, p3,
                )));
                current = p3;
            }
            PathEl::ClosePath => {
                if (current - start).hypot() > 1e-12 {
                    segs.push(PathSeg::Line(peniko::kurbo::Line::new(current, start)));
                }
                flush(&mut segs, true, &mut out);
                current = start;
            }
        }
    }
    flush(&mut segs, false, &mut out);
    out
}

/// Appends a segment to a path that already ends at the segment's start.
pub(crate) fn append_seg(out: &mut BezPath, seg: &PathSeg) {
    match *seg {
        PathSeg::Line(l) => out.line_to(l.p1),
        PathSeg::Quad(q) => out.quad_to(q.p1, q.p2),
        PathSeg::Cubic(c) => out.curve_to(c.p1, c.p2, c.p3),
    }
}

/// Rebuilds a path from subpaths, restoring `MoveTo`/`ClosePath`
/// structure.
pub(crate) fn from_subpaths(subs: &[SubPath]) -> BezPath {
    let mut out = BezPath::new();
    for sub in subs {
        let Some(first) = sub.segs.first() else {
            continue;
        };
        out.move_to(first.start());
        for seg in &sub.segs {
            append_seg(&mut out, seg);
        }
        if sub.closed {
            out.close_path();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::kurbo::{Rect, Shape};

    #[test]
    fn subpath_split_and_rebuild() {
        let mut path = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(1e-3);
        path.move_to((20.0, 0.0));
        path.line_to((30.0, 0.0));
        let subs = subpaths(&path);
        assert_eq!(subs.len(), 2);
        assert!(subs[0].closed);
        assert_eq!(subs[0].segs.len(), 4);
        assert!(!subs[1].closed);
        assert_eq!(subs[1].segs.len(), 1);
        let rebuilt = from_subpaths(&subs);
        assert_eq!(subpaths(&rebuilt).len(), 2);
    }

    #[test]
    fn close_adds_implicit_segment() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 10.0));
        path.close_path();
        let subs = subpaths(&path);
        assert_eq!(subs[0].segs.len(), 3);
    }
}
