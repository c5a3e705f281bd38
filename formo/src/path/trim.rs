// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cutting paths down to normalized arc-length windows.

use peniko::kurbo::{BezPath, ParamCurve, ParamCurveArclen, PathEl, PathSeg, Point};

use super::{append_seg, subpaths, ARCLEN_ACCURACY};

const EPS: f64 = 1e-9;

/// Cuts `path` to the window `[start, end]`, both normalized against
/// the total arc length over all subpaths.
///
/// `[0, 1]` returns the path unchanged; an empty window returns an
/// empty path. Subpath boundaries are preserved; a closed subpath that
/// survives only partially becomes an open piece.
pub fn trim(path: &BezPath, start: f64, end: f64) -> BezPath {
    let start = start.clamp(0.0, 1.0);
    let end = end.clamp(0.0, 1.0);
    let mut out = BezPath::new();
    if end - start <= EPS {
        return out;
    }
    if start <= EPS && end >= 1.0 - EPS {
        return path.clone();
    }
    let subs = subpaths(path);
    let seg_lens: Vec<Vec<f64>> = subs
        .iter()
        .map(|s| s.segs.iter().map(|g| g.arclen(ARCLEN_ACCURACY)).collect())
        .collect();
    let total: f64 = seg_lens.iter().flatten().sum();
    if total <= 0.0 {
        return out;
    }
    let ws = start * total;
    let we = end * total;
    let mut cum = 0.0;
    for (sub, lens) in subs.iter().zip(&seg_lens) {
        let sub_len: f64 = lens.iter().sum();
        let sub_start = cum;
        let sub_end = cum + sub_len;
        if ws <= sub_start + EPS && we >= sub_end - EPS {
            if let Some(first) = sub.segs.first() {
                out.move_to(first.start());
                for seg in &sub.segs {
                    append_seg(&mut out, seg);
                }
                if sub.closed {
                    out.close_path();
                }
            }
            cum = sub_end;
            continue;
        }
        let mut last: Option<Point> = None;
        for (seg, &len) in sub.segs.iter().zip(lens) {
            let a = cum;
            let b = cum + len;
            cum = b;
            if len <= 0.0 {
                continue;
            }
            let lo = ws.max(a);
            let hi = we.min(b);
            if hi - lo <= EPS {
                last = None;
                continue;
            }
            let t0 = if lo <= a + EPS {
                0.0
            } else {
                seg.inv_arclen(lo - a, ARCLEN_ACCURACY)
            };
            let t1 = if hi >= b - EPS {
                1.0
            } else {
                seg.inv_arclen(hi - a, ARCLEN_ACCURACY)
            };
            let piece = seg.subsegment(t0..t1);
            let piece_start = piece.start();
            match last {
                Some(lp) if (lp - piece_start).hypot() < 1e-9 => {}
                _ => out.move_to(piece_start),
            }
            append_seg(&mut out, &piece);
            last = Some(piece.end());
        }
    }
    out
}

/// Like [`trim`], but the window may extend past 1.0 to express a cut
/// that wraps around the path's seam. The two resulting pieces are
/// stitched into one continuous piece when they meet at the seam.
pub fn trim_wrapped(path: &BezPath, start: f64, end: f64) -> BezPath {
    if end <= 1.0 + EPS {
        return trim(path, start, end.min(1.0));
    }
    let head = trim(path, start, 1.0);
    let tail = trim(path, 0.0, end - 1.0);
    stitch(head, tail)
}

/// Reverses traversal direction: subpath order, segment order, and
/// per-segment direction all invert, flipping winding.
pub fn reverse(path: &BezPath) -> BezPath {
    let subs = subpaths(path);
    let mut out = BezPath::new();
    for sub in subs.iter().rev() {
        if sub.segs.is_empty() {
            continue;
        }
        let rev: Vec<PathSeg> = sub.segs.iter().rev().map(|s| s.reverse()).collect();
        out.move_to(rev[0].start());
        for seg in &rev {
            append_seg(&mut out, seg);
        }
        if sub.closed {
            out.close_path();
        }
    }
    out
}

fn stitch(head: BezPath, tail: BezPath) -> BezPath {
    let Some(head_end) = last_point(&head) else {
        return tail;
    };
    let Some(tail_start) = first_point(&tail) else {
        return head;
    };
    let mut out = head;
    if (head_end - tail_start).hypot() < 1e-6 {
        let mut first_move_skipped = false;
        for el in tail.elements() {
            match el {
                PathEl::MoveTo(_) if !first_move_skipped => first_move_skipped = true,
                el => out.push(*el),
            }
        }
    } else {
        for el in tail.elements() {
            out.push(*el);
        }
    }
    out
}

fn first_point(path: &BezPath) -> Option<Point> {
    match path.elements().first() {
        Some(PathEl::MoveTo(p)) => Some(*p),
        _ => None,
    }
}

fn last_point(path: &BezPath) -> Option<Point> {
    let mut start = None;
    let mut current = None;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                start = Some(p);
                current = Some(p);
            }
            PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
                current = Some(p);
            }
            PathEl::ClosePath => current = start,
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::kurbo::{Rect, Shape};

    fn line(x0: f64, x1: f64) -> BezPath {
        let mut p = BezPath::new();
        p.move_to((x0, 0.0));
        p.line_to((x1, 0.0));
        p
    }

    #[test]
    fn full_window_is_identity() {
        let path = line(0.0, 100.0);
        let out = trim(&path, 0.0, 1.0);
        assert_eq!(out.elements(), path.elements());
    }

    #[test]
    fn empty_window_yields_empty_path() {
        let path = line(0.0, 100.0);
        assert!(trim(&path, 0.3, 0.3).elements().is_empty());
    }

    #[test]
    fn middle_window() {
        let path = line(0.0, 100.0);
        let out = trim(&path, 0.25, 0.75);
        assert_eq!(first_point(&out), Some(Point::new(25.0, 0.0)));
        assert_eq!(last_point(&out), Some(Point::new(75.0, 0.0)));
    }

    #[test]
    fn wrapped_window_stitches_at_seam() {
        let path = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(1e-3);
        let out = trim_wrapped(&path, 0.75, 1.25);
        let moves = out
            .elements()
            .iter()
            .filter(|el| matches!(el, PathEl::MoveTo(_)))
            .count();
        assert_eq!(moves, 1);
    }

    #[test]
    fn reverse_flips_endpoints() {
        let path = line(0.0, 100.0);
        let out = reverse(&path);
        assert_eq!(first_point(&out), Some(Point::new(100.0, 0.0)));
        assert_eq!(last_point(&out), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn reverse_inverts_winding() {
        let path = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(1e-3);
        let out = reverse(&path);
        assert!((path.area() + out.area()).abs() < 1e-9);
    }

    #[test]
    fn multiple_subpaths_share_one_ruler() {
        let mut path = line(0.0, 100.0);
        path.move_to((0.0, 50.0));
        path.line_to((100.0, 50.0));
        // Second half of the ruler is entirely the second subpath.
        let out = trim(&path, 0.5, 1.0);
        assert_eq!(first_point(&out), Some(Point::new(0.0, 50.0)));
        assert_eq!(last_point(&out), Some(Point::new(100.0, 50.0)));
    }
}
