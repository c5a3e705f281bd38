// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::{BlendMode, Fill};

use super::ColorSource;
use crate::context::EvaluationContext;
use crate::layer::{LayerHandle, Node};
use crate::painter::{Paint, PainterKind};

/// Fills every geometry present in the context when the style runs.
///
/// Without a color source the style does nothing. The fill rule is
/// advisory: a geometry whose fill type was set explicitly (by a
/// boolean merge) keeps it.
#[derive(Clone, Debug)]
pub struct FillStyle {
    base: Node,
    source: Option<ColorSource>,
    alpha: f32,
    rule: Fill,
    blend: BlendMode,
}

impl FillStyle {
    pub fn new(source: impl Into<ColorSource>) -> Self {
        Self {
            base: Node::default(),
            source: Some(source.into()),
            alpha: 1.0,
            rule: Fill::NonZero,
            blend: BlendMode::default(),
        }
    }

    /// A fill with no color source; evaluates to nothing until one is
    /// set.
    pub fn empty() -> Self {
        Self {
            base: Node::default(),
            source: None,
            alpha: 1.0,
            rule: Fill::NonZero,
            blend: BlendMode::default(),
        }
    }

    pub fn set_source(&mut self, source: Option<ColorSource>) {
        self.source = source;
        if let (Some(source), Some(layer)) = (&mut self.source, self.base.layer().cloned()) {
            source.attach(&layer);
        }
        self.base.invalidate();
    }

    pub fn source_mut(&mut self) -> Option<&mut ColorSource> {
        self.source.as_mut()
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
        self.base.invalidate();
    }

    pub fn set_rule(&mut self, rule: Fill) {
        self.rule = rule;
        self.base.invalidate();
    }

    pub fn set_blend(&mut self, blend: BlendMode) {
        self.blend = blend;
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
        if let Some(source) = &mut self.source {
            source.attach(layer);
        }
    }

    pub(crate) fn detach(&mut self) {
        self.base.detach();
        if let Some(source) = &mut self.source {
            source.detach();
        }
    }

    pub(crate) fn apply(&mut self, ctx: &mut EvaluationContext) {
        let Some(source) = &self.source else {
            return;
        };
        if ctx.is_empty() {
            return;
        }
        ctx.push_painter(
            Paint {
                brush: source.brush(),
                alpha: self.alpha,
                blend: self.blend,
            },
            PainterKind::Fill { rule: self.rule },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use peniko::kurbo::{Affine, BezPath};
    use peniko::Color;

    #[test]
    fn absent_source_records_nothing() {
        let mut ctx = EvaluationContext::new();
        ctx.push_geometry(Geometry::from_path(BezPath::new()), Affine::IDENTITY);
        FillStyle::empty().apply(&mut ctx);
        assert!(ctx.painters().is_empty());
    }

    #[test]
    fn records_painter_over_present_geometries() {
        let mut ctx = EvaluationContext::new();
        ctx.push_geometry(Geometry::from_path(BezPath::new()), Affine::IDENTITY);
        ctx.push_geometry(Geometry::from_path(BezPath::new()), Affine::IDENTITY);
        let mut style = FillStyle::new(Color::rgba8(255, 0, 0, 255));
        style.set_alpha(0.5);
        style.apply(&mut ctx);
        assert_eq!(ctx.painters().len(), 1);
        assert_eq!(ctx.painters()[0].geometry_range(), 0..2);
        assert_eq!(ctx.painters()[0].paint().alpha, 0.5);
    }

    #[test]
    fn style_before_any_geometry_sees_nothing() {
        let mut ctx = EvaluationContext::new();
        FillStyle::new(Color::rgba8(255, 0, 0, 255)).apply(&mut ctx);
        assert!(ctx.painters().is_empty());
    }
}
