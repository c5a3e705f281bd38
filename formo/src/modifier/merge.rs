// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collapsing the geometry sequence through a boolean operator.

use peniko::kurbo::{Affine, BezPath};
use peniko::Fill;

use crate::context::EvaluationContext;
use crate::geometry::{Geometry, SHAPE_TOLERANCE};
use crate::layer::{LayerHandle, Node};
use crate::path::{combine, BooleanOp};

/// The merge operator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeOp {
    /// Concatenate contours without combining them.
    #[default]
    Append,
    Union,
    Difference,
    Intersect,
    /// Symmetric difference.
    Xor,
}

/// Collapses the entire current geometry sequence into one
/// shape-geometry by folding shapes pairwise through the operator.
///
/// Each geometry's own transform is applied to its shape first, since
/// boolean operators need a common coordinate space. Every painter
/// accumulated before the merge is discarded: styles before a merge in
/// the element list are nullified, only styles after it can paint the
/// merged result.
#[derive(Clone, Debug, Default)]
pub struct MergePaths {
    base: Node,
    op: MergeOp,
}

impl MergePaths {
    pub fn new(op: MergeOp) -> Self {
        Self {
            base: Node::default(),
            op,
        }
    }

    pub fn op(&self) -> MergeOp {
        self.op
    }

    pub fn set_op(&mut self, op: MergeOp) {
        self.op = op;
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
        ctx.painters.clear();
        if ctx.is_empty() {
            return;
        }
        let mut paths = Vec::with_capacity(ctx.len());
        for index in 0..ctx.len() {
            let transform = ctx.transform(index).unwrap_or(Affine::IDENTITY);
            let Some(geometry) = ctx.geometry_mut(index) else {
                continue;
            };
            let Some(source) = geometry.shape() else {
                paths.push(BezPath::new());
                continue;
            };
            paths.push(transform * source.to_bez(SHAPE_TOLERANCE));
        }
        let mut iter = paths.into_iter();
        let Some(mut acc) = iter.next() else {
            return;
        };
        for path in iter {
            match self.op {
                MergeOp::Append => acc.extend(path),
                _ => match combine(&acc, &path, self.boolean_op()) {
                    Ok(merged) => acc = merged,
                    Err(err) => {
                        log::warn!("path merge degraded to append: {err}");
                        acc.extend(path);
                    }
                },
            }
        }
        ctx.clear_all();
        let mut geometry = Geometry::from_path(acc);
        if self.op == MergeOp::Xor {
            // A symmetric difference resolves with even-odd filling; a
            // later fill style must not override this.
            geometry.set_fill(Fill::EvenOdd);
        }
        ctx.push_geometry(geometry, Affine::IDENTITY);
    }

    fn boolean_op(&self) -> BooleanOp {
        match self.op {
            MergeOp::Append | MergeOp::Union => BooleanOp::Union,
            MergeOp::Difference => BooleanOp::Difference,
            MergeOp::Intersect => BooleanOp::Intersect,
            MergeOp::Xor => BooleanOp::Xor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::painter::{Paint, PainterKind};
    use peniko::kurbo::{Rect, Shape};
    use peniko::Color;

    fn two_squares() -> EvaluationContext {
        let mut ctx = EvaluationContext::new();
        ctx.push_geometry(
            Geometry::from_path(Rect::new(0.0, 0.0, 10.0, 10.0).to_path(1e-3)),
            Affine::IDENTITY,
        );
        ctx.push_geometry(
            Geometry::from_path(Rect::new(0.0, 0.0, 10.0, 10.0).to_path(1e-3)),
            Affine::translate((5.0, 5.0)),
        );
        ctx
    }

    #[test]
    fn merge_discards_prior_painters() {
        let mut ctx = two_squares();
        ctx.push_painter(
            Paint::solid(Color::rgba8(255, 0, 0, 255)),
            PainterKind::Fill {
                rule: Fill::NonZero,
            },
        );
        MergePaths::new(MergeOp::Union).apply(&mut ctx);
        assert!(ctx.painters().is_empty());
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn merge_applies_transforms_before_combining() {
        let mut ctx = two_squares();
        MergePaths::new(MergeOp::Union).apply(&mut ctx);
        let path = ctx.geometry_mut(0).unwrap().shape_path_mut().unwrap().clone();
        // Union of [0,10]^2 and [5,15]^2: 175 square units.
        assert!((path.area().abs() - 175.0).abs() < 1e-2);
        assert_eq!(
            ctx.transform(0).map(|t| t.as_coeffs()),
            Some(Affine::IDENTITY.as_coeffs())
        );
    }

    #[test]
    fn append_concatenates_contours() {
        let mut ctx = two_squares();
        MergePaths::new(MergeOp::Append).apply(&mut ctx);
        assert_eq!(ctx.len(), 1);
        let path = ctx.geometry_mut(0).unwrap().shape_path_mut().unwrap().clone();
        // Overlap double-counts under non-zero winding.
        assert!((path.area().abs() - 200.0).abs() < 1e-6);
    }

    #[test]
    fn xor_sets_explicit_even_odd_fill() {
        let mut ctx = two_squares();
        MergePaths::new(MergeOp::Xor).apply(&mut ctx);
        let geometry = ctx.geometry_mut(0).unwrap();
        assert_eq!(geometry.fill(), Some(Fill::EvenOdd));
    }

    #[test]
    fn empty_context_is_a_no_op() {
        let mut ctx = EvaluationContext::new();
        MergePaths::new(MergeOp::Union).apply(&mut ctx);
        assert!(ctx.is_empty());
    }
}
