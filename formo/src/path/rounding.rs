// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Corner rounding as a reusable path effect.

use peniko::kurbo::{BezPath, ParamCurve, PathSeg, Point};

use super::{append_seg, subpaths, SubPath};

/// A corner-rounding effect for a fixed radius.
///
/// Rounds joints where two line segments meet, replacing the vertex
/// with a quadratic arc whose tangent length is derived from the joint
/// angle. Curve-to-curve and curve-to-line joints pass through
/// untouched. Operates in the path's own coordinate space.
#[derive(Clone, Copy, Debug)]
pub struct CornerRounder {
    radius: f64,
}

impl CornerRounder {
    pub fn new(radius: f64) -> Self {
        Self {
            radius: radius.max(0.0),
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn apply(&self, path: &BezPath) -> BezPath {
        if self.radius <= 0.0 {
            return path.clone();
        }
        let mut out = BezPath::new();
        for sub in subpaths(path) {
            self.round_subpath(&sub, &mut out);
        }
        out
    }

    fn round_subpath(&self, sub: &SubPath, out: &mut BezPath) {
        let n = sub.segs.len();
        if n == 0 {
            return;
        }
        // cuts[i] is the rounding cut at the vertex starting segment i.
        let mut cuts = vec![None; n];
        for i in 0..n {
            if i == 0 && !sub.closed {
                continue;
            }
            let prev = &sub.segs[(i + n - 1) % n];
            let next = &sub.segs[i];
            cuts[i] = self.corner_cut(prev, next);
        }
        let start = match cuts[0] {
            Some(cut) => cut.outgoing,
            None => sub.segs[0].start(),
        };
        out.move_to(start);
        for i in 0..n {
            let seg = &sub.segs[i];
            let end_cut = if sub.closed || i + 1 < n {
                cuts[(i + 1) % n]
            } else {
                None
            };
            match (seg, cuts[i], end_cut) {
                (PathSeg::Line(line), start_cut, end_cut) => {
                    let from = start_cut.map_or(line.p0, |c| c.outgoing);
                    let to = end_cut.map_or(line.p1, |c| c.incoming);
                    if (to - from).hypot() > 1e-12 {
                        out.line_to(to);
                    }
                    if let Some(cut) = end_cut {
                        out.quad_to(cut.vertex, cut.outgoing);
                    }
                }
                (seg, _, _) => {
                    // Only line-line joints get cut, so this segment keeps
                    // its original endpoints.
                    append_seg(out, seg);
                }
            }
        }
        if sub.closed {
            out.close_path();
        }
    }

    /// Cut geometry for the joint between two line segments, or `None`
    /// if the joint is not roundable.
    fn corner_cut(&self, prev: &PathSeg, next: &PathSeg) -> Option<Cut> {
        let (PathSeg::Line(prev), PathSeg::Line(next)) = (prev, next) else {
            return None;
        };
        let vertex = prev.p1;
        let v1 = prev.p0 - vertex;
        let v2 = next.p1 - vertex;
        let (len1, len2) = (v1.hypot(), v2.hypot());
        if len1 < 1e-9 || len2 < 1e-9 {
            return None;
        }
        let u1 = v1 / len1;
        let u2 = v2 / len2;
        let angle = u1.dot(u2).clamp(-1.0, 1.0).acos();
        if angle < 1e-3 || (std::f64::consts::PI - angle) < 1e-3 {
            // Degenerate or straight-through joint; nothing to round.
            return None;
        }
        let tangent = self.radius / (angle / 2.0).tan();
        let d = tangent.min(len1 * 0.5).min(len2 * 0.5);
        Some(Cut {
            vertex,
            incoming: vertex + u1 * d,
            outgoing: vertex + u2 * d,
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct Cut {
    vertex: Point,
    /// Point on the incoming edge where the straight run ends.
    incoming: Point,
    /// Point on the outgoing edge where the straight run resumes.
    outgoing: Point,
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::kurbo::{PathEl, Rect, Shape};

    #[test]
    fn zero_radius_is_identity() {
        let path = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(1e-3);
        let out = CornerRounder::new(0.0).apply(&path);
        assert_eq!(out.elements(), path.elements());
    }

    #[test]
    fn negative_radius_clamps_to_zero() {
        assert_eq!(CornerRounder::new(-4.0).radius(), 0.0);
    }

    #[test]
    fn square_corners_become_quads() {
        let path = Rect::new(0.0, 0.0, 100.0, 100.0).to_path(1e-3);
        let out = CornerRounder::new(10.0).apply(&path);
        let quads = out
            .elements()
            .iter()
            .filter(|el| matches!(el, PathEl::QuadTo(..)))
            .count();
        assert_eq!(quads, 4);
        // Rounding strictly shrinks a convex shape.
        assert!(out.area().abs() < path.area().abs());
        assert!(out.area().abs() > 0.9 * path.area().abs());
    }

    #[test]
    fn open_polyline_rounds_interior_vertices_only() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((50.0, 0.0));
        path.line_to((50.0, 50.0));
        let out = CornerRounder::new(5.0).apply(&path);
        let quads = out
            .elements()
            .iter()
            .filter(|el| matches!(el, PathEl::QuadTo(..)))
            .count();
        assert_eq!(quads, 1);
        // Endpoints stay put.
        assert!(matches!(out.elements()[0], PathEl::MoveTo(p) if (p - Point::ZERO).hypot() < 1e-9));
    }
}
