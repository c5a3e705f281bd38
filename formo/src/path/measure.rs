// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arc-length measurement and position/tangent queries over a path.

use peniko::kurbo::{
    BezPath, ParamCurve, ParamCurveArclen, ParamCurveDeriv, PathEl, PathSeg, Point, Vec2,
};

use super::ARCLEN_ACCURACY;

/// Cumulative arc-length table for a path.
///
/// All subpaths lie on one ruler, in element order. Closed paths wrap
/// queries modulo the total length; open paths clamp to the endpoints
/// and extrapolate linearly along the end tangents.
#[derive(Clone, Debug)]
pub struct PathMeasure {
    segments: Vec<MeasuredSeg>,
    total: f64,
    closed: bool,
}

#[derive(Clone, Copy, Debug)]
struct MeasuredSeg {
    seg: PathSeg,
    start: f64,
    len: f64,
}

impl PathMeasure {
    pub fn new(path: &BezPath) -> Self {
        let mut segments = Vec::new();
        let mut total = 0.0;
        for seg in path.segments() {
            let len = seg.arclen(ARCLEN_ACCURACY);
            segments.push(MeasuredSeg {
                seg,
                start: total,
                len,
            });
            total += len;
        }
        let explicitly_closed = path
            .elements()
            .iter()
            .any(|el| matches!(el, PathEl::ClosePath));
        let seam_closed = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (first.seg.start() - last.seg.end()).hypot() < 1e-9,
            _ => false,
        };
        Self {
            segments,
            total,
            closed: explicitly_closed || seam_closed,
        }
    }

    /// Total arc length over all subpaths.
    pub fn length(&self) -> f64 {
        self.total
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() || self.total <= 0.0
    }

    /// Position and unit tangent at `distance` along the path.
    pub fn point_tangent(&self, distance: f64) -> (Point, Vec2) {
        if self.is_empty() {
            return (Point::ZERO, Vec2::new(1.0, 0.0));
        }
        let d = if self.closed {
            distance.rem_euclid(self.total)
        } else if distance < 0.0 {
            let (p, t) = self.at(0.0);
            return (p + t * distance, t);
        } else if distance > self.total {
            let (p, t) = self.at(self.total);
            return (p + t * (distance - self.total), t);
        } else {
            distance
        };
        self.at(d)
    }

    fn at(&self, d: f64) -> (Point, Vec2) {
        let ix = match self
            .segments
            .binary_search_by(|m| m.start.total_cmp(&d))
        {
            Ok(ix) => ix,
            Err(ix) => ix.saturating_sub(1),
        };
        let m = &self.segments[ix.min(self.segments.len() - 1)];
        let t = if m.len > 0.0 {
            m.seg.inv_arclen((d - m.start).clamp(0.0, m.len), ARCLEN_ACCURACY)
        } else {
            0.0
        };
        (m.seg.eval(t), seg_tangent(&m.seg, t))
    }
}

/// Unit tangent of a segment at parameter `t`.
pub(crate) fn seg_tangent(seg: &PathSeg, t: f64) -> Vec2 {
    let d = match seg {
        PathSeg::Line(l) => l.p1 - l.p0,
        PathSeg::Quad(q) => q.deriv().eval(t).to_vec2(),
        PathSeg::Cubic(c) => c.deriv().eval(t).to_vec2(),
    };
    let len = d.hypot();
    if len > 1e-12 {
        d / len
    } else {
        // Degenerate derivative (e.g. a cusp); fall back to the chord.
        let chord = seg.end() - seg.start();
        let chord_len = chord.hypot();
        if chord_len > 1e-12 {
            chord / chord_len
        } else {
            Vec2::new(1.0, 0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::kurbo::{Circle, Shape};

    #[test]
    fn line_length_and_midpoint() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((100.0, 0.0));
        let measure = PathMeasure::new(&path);
        assert!((measure.length() - 100.0).abs() < 1e-9);
        let (p, t) = measure.point_tangent(50.0);
        assert!((p.x - 50.0).abs() < 1e-6);
        assert!((p.y).abs() < 1e-6);
        assert!((t.x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn open_path_extrapolates() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        let measure = PathMeasure::new(&path);
        let (p, _) = measure.point_tangent(15.0);
        assert!((p.x - 15.0).abs() < 1e-6);
        let (p, _) = measure.point_tangent(-5.0);
        assert!((p.x + 5.0).abs() < 1e-6);
    }

    #[test]
    fn closed_path_wraps() {
        let path = Circle::new((0.0, 0.0), 10.0).to_path(1e-4);
        let measure = PathMeasure::new(&path);
        assert!(measure.is_closed());
        let (a, _) = measure.point_tangent(1.0);
        let (b, _) = measure.point_tangent(1.0 + measure.length());
        assert!((a - b).hypot() < 1e-6);
    }

    #[test]
    fn circle_perimeter() {
        let path = Circle::new((0.0, 0.0), 10.0).to_path(1e-5);
        let measure = PathMeasure::new(&path);
        assert!((measure.length() - 2.0 * std::f64::consts::PI * 10.0).abs() < 1e-2);
    }
}
