// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boolean path combination, bridged to the `path-bool` kernel.

use path_bool::{path_boolean, path_from_path_data, path_to_path_data, FillRule,
    PathBooleanOperation};
use peniko::kurbo::BezPath;

use crate::Error;

/// Binary boolean operators over filled outlines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BooleanOp {
    #[default]
    Union,
    Difference,
    Intersect,
    /// Symmetric difference.
    Xor,
}

impl BooleanOp {
    fn to_kernel(self) -> PathBooleanOperation {
        match self {
            Self::Union => PathBooleanOperation::Union,
            Self::Difference => PathBooleanOperation::Difference,
            Self::Intersect => PathBooleanOperation::Intersection,
            Self::Xor => PathBooleanOperation::Exclusion,
        }
    }
}

/// Output tolerance when converting kernel results back to Bézier form.
const PATH_DATA_EPS: f64 = 1e-3;

/// Combines two filled outlines. Both operands are interpreted with the
/// non-zero fill rule; the result is one path holding every output
/// contour.
pub fn combine(a: &BezPath, b: &BezPath, op: BooleanOp) -> Result<BezPath, Error> {
    if a.elements().is_empty() {
        return Ok(match op {
            BooleanOp::Union | BooleanOp::Xor => b.clone(),
            BooleanOp::Difference | BooleanOp::Intersect => BezPath::new(),
        });
    }
    if b.elements().is_empty() {
        return Ok(match op {
            BooleanOp::Union | BooleanOp::Xor | BooleanOp::Difference => a.clone(),
            BooleanOp::Intersect => BezPath::new(),
        });
    }
    let pa = path_from_path_data(&a.to_svg());
    let pb = path_from_path_data(&b.to_svg());
    let parts = path_boolean(
        &pa,
        FillRule::NonZero,
        &pb,
        FillRule::NonZero,
        op.to_kernel(),
    )
    .map_err(|_| Error::Boolean)?;
    let mut merged = BezPath::new();
    for part in &parts {
        let data = path_to_path_data(part, PATH_DATA_EPS);
        let piece = BezPath::from_svg(&data).map_err(|_| Error::PathData)?;
        merged.extend(piece);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::kurbo::{Rect, Shape};

    fn square(x: f64, y: f64, size: f64) -> BezPath {
        Rect::new(x, y, x + size, y + size).to_path(1e-3)
    }

    #[test]
    fn union_covers_both_operands() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(5.0, 5.0, 10.0);
        let u = combine(&a, &b, BooleanOp::Union).unwrap();
        assert!(u.area().abs() >= a.area().abs().max(b.area().abs()) - 1e-6);
        // Two 10x10 squares overlapping by a 5x5 corner.
        assert!((u.area().abs() - 175.0).abs() < 1e-3);
    }

    #[test]
    fn intersect_is_bounded_by_operands() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(5.0, 5.0, 10.0);
        let i = combine(&a, &b, BooleanOp::Intersect).unwrap();
        assert!(i.area().abs() <= a.area().abs().min(b.area().abs()) + 1e-6);
        assert!((i.area().abs() - 25.0).abs() < 1e-3);
    }

    #[test]
    fn xor_plus_intersect_reconstructs_union() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(5.0, 5.0, 10.0);
        let u = combine(&a, &b, BooleanOp::Union).unwrap();
        let i = combine(&a, &b, BooleanOp::Intersect).unwrap();
        let x = combine(&a, &b, BooleanOp::Xor).unwrap();
        assert!((x.area().abs() + i.area().abs() - u.area().abs()).abs() < 1e-2);
    }

    #[test]
    fn empty_operands_degrade() {
        let a = square(0.0, 0.0, 10.0);
        let empty = BezPath::new();
        assert_eq!(
            combine(&a, &empty, BooleanOp::Union).unwrap().elements(),
            a.elements()
        );
        assert!(combine(&empty, &a, BooleanOp::Intersect)
            .unwrap()
            .elements()
            .is_empty());
    }
}
