// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rounding the corners of every accumulated geometry.

use crate::context::EvaluationContext;
use crate::layer::{LayerHandle, Node};
use crate::path::CornerRounder;

/// Rounds corners of everything accumulated so far.
///
/// The rounding effect is built lazily and cached until the radius
/// changes. It runs in each shape's local space, before the transform
/// that positions the shape, so non-uniform ancestor scale will
/// visibly distort the rounding unless an earlier merge baked that
/// scale into the path.
#[derive(Clone, Debug, Default)]
pub struct RoundCorners {
    base: Node,
    radius: f64,
    effect: Option<CornerRounder>,
}

impl RoundCorners {
    pub fn new(radius: f64) -> Self {
        Self {
            base: Node::default(),
            radius: radius.max(0.0),
            effect: None,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) {
        let radius = radius.max(0.0);
        if radius != self.radius {
            self.radius = radius;
            self.effect = None;
        }
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
        if self.radius <= 0.0 {
            return;
        }
        let effect = *self
            .effect
            .get_or_insert_with(|| CornerRounder::new(self.radius));
        for index in 0..ctx.len() {
            let Some(path) = ctx.geometry_mut(index).and_then(|g| g.shape_path_mut()) else {
                continue;
            };
            *path = effect.apply(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use peniko::kurbo::{Affine, PathEl, Rect, Shape};

    #[test]
    fn rounds_accumulated_shapes() {
        let mut ctx = EvaluationContext::new();
        ctx.push_geometry(
            Geometry::from_path(Rect::new(0.0, 0.0, 100.0, 100.0).to_path(1e-3)),
            Affine::IDENTITY,
        );
        RoundCorners::new(8.0).apply(&mut ctx);
        let path = ctx.geometry_mut(0).unwrap().shape_path_mut().unwrap().clone();
        assert!(path
            .elements()
            .iter()
            .any(|el| matches!(el, PathEl::QuadTo(..))));
    }

    #[test]
    fn zero_radius_is_a_no_op() {
        let mut ctx = EvaluationContext::new();
        let original = Rect::new(0.0, 0.0, 100.0, 100.0);
        ctx.push_geometry(Geometry::from_shape(crate::geometry::ShapeSource::Rect(original)), Affine::IDENTITY);
        RoundCorners::new(0.0).apply(&mut ctx);
        // The primitive survives untouched.
        assert!(matches!(
            ctx.geometry_mut(0).unwrap().shape(),
            Some(crate::geometry::ShapeSource::Rect(_))
        ));
    }

    #[test]
    fn effect_cache_invalidates_on_radius_change() {
        let mut modifier = RoundCorners::new(4.0);
        let mut ctx = EvaluationContext::new();
        ctx.push_geometry(
            Geometry::from_path(Rect::new(0.0, 0.0, 10.0, 10.0).to_path(1e-3)),
            Affine::IDENTITY,
        );
        modifier.apply(&mut ctx);
        assert!(modifier.effect.is_some());
        modifier.set_radius(6.0);
        assert!(modifier.effect.is_none());
        modifier.set_radius(6.0);
    }
}
