// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::{Cap, Dashes, Join};
use peniko::BlendMode;

use super::ColorSource;
use crate::context::EvaluationContext;
use crate::layer::{LayerHandle, Node};
use crate::painter::{Paint, PainterKind, StrokeAlign, StrokeProps};

/// Strokes every geometry present in the context when the style runs.
///
/// Whether the stroke can ride the scale-correct fast path or must be
/// outlined as a fill is decided per geometry at draw time, where the
/// accumulated transform is known; see the painter. A non-positive
/// width or an absent color source records nothing.
#[derive(Clone, Debug)]
pub struct StrokeStyle {
    base: Node,
    source: Option<ColorSource>,
    alpha: f32,
    blend: BlendMode,
    width: f64,
    cap: Cap,
    join: Join,
    miter_limit: f64,
    dash_pattern: Dashes,
    dash_offset: f64,
    align: StrokeAlign,
}

impl StrokeStyle {
    pub fn new(source: impl Into<ColorSource>, width: f64) -> Self {
        Self {
            base: Node::default(),
            source: Some(source.into()),
            alpha: 1.0,
            blend: BlendMode::default(),
            width,
            cap: Cap::Butt,
            join: Join::Miter,
            miter_limit: 4.0,
            dash_pattern: Dashes::new(),
            dash_offset: 0.0,
            align: StrokeAlign::Center,
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

    pub fn set_blend(&mut self, blend: BlendMode) {
        self.blend = blend;
        self.base.invalidate();
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
        self.base.invalidate();
    }

    pub fn set_cap(&mut self, cap: Cap) {
        self.cap = cap;
        self.base.invalidate();
    }

    pub fn set_join(&mut self, join: Join) {
        self.join = join;
        self.base.invalidate();
    }

    pub fn set_miter_limit(&mut self, miter_limit: f64) {
        self.miter_limit = miter_limit;
        self.base.invalidate();
    }

    pub fn set_dash(&mut self, offset: f64, pattern: impl IntoIterator<Item = f64>) {
        self.dash_offset = offset;
        self.dash_pattern = pattern.into_iter().collect();
        self.base.invalidate();
    }

    pub fn set_align(&mut self, align: StrokeAlign) {
        self.align = align;
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
        if self.width <= 0.0 || ctx.is_empty() {
            return;
        }
        ctx.push_painter(
            Paint {
                brush: source.brush(),
                alpha: self.alpha,
                blend: self.blend,
            },
            PainterKind::Stroke(StrokeProps {
                width: self.width,
                cap: self.cap,
                join: self.join,
                miter_limit: self.miter_limit,
                dash_pattern: self.dash_pattern.clone(),
                dash_offset: self.dash_offset,
                align: self.align,
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::sink::{Command, Recording};
    use peniko::kurbo::{Affine, Rect, Shape};
    use peniko::Color;

    fn square_ctx() -> EvaluationContext {
        let mut ctx = EvaluationContext::new();
        ctx.push_geometry(
            Geometry::from_path(Rect::new(0.0, 0.0, 100.0, 100.0).to_path(1e-3)),
            Affine::IDENTITY,
        );
        ctx
    }

    #[test]
    fn zero_width_records_nothing() {
        let mut ctx = square_ctx();
        StrokeStyle::new(Color::rgba8(0, 0, 255, 255), 0.0).apply(&mut ctx);
        assert!(ctx.painters().is_empty());
    }

    #[test]
    fn centered_uniform_stroke_takes_fast_path() {
        let mut ctx = square_ctx();
        StrokeStyle::new(Color::rgba8(0, 0, 255, 255), 8.0).apply(&mut ctx);
        let mut sink = Recording::new();
        ctx.draw(Affine::scale(2.0), 1.0, &mut sink);
        let Command::Stroke { stroke, .. } = &sink.commands()[0] else {
            panic!("expected a stroke command");
        };
        assert_eq!(stroke.width, 8.0);
    }

    #[test]
    fn non_uniform_scale_outlines_as_fill() {
        let mut ctx = square_ctx();
        StrokeStyle::new(Color::rgba8(0, 0, 255, 255), 8.0).apply(&mut ctx);
        let mut sink = Recording::new();
        ctx.draw(Affine::scale_non_uniform(3.0, 1.0), 1.0, &mut sink);
        assert!(matches!(sink.commands()[0], Command::Fill { .. }));
    }

    #[test]
    fn dashed_stroke_outlines_as_fill() {
        let mut ctx = square_ctx();
        let mut style = StrokeStyle::new(Color::rgba8(0, 0, 255, 255), 4.0);
        style.set_dash(0.0, [10.0, 5.0]);
        style.apply(&mut ctx);
        let mut sink = Recording::new();
        ctx.draw(Affine::IDENTITY, 1.0, &mut sink);
        let Command::Fill { path, .. } = &sink.commands()[0] else {
            panic!("expected an outlined fill");
        };
        assert!(!path.elements().is_empty());
    }

    #[test]
    fn inside_alignment_stays_within_the_shape() {
        let mut ctx = square_ctx();
        let mut style = StrokeStyle::new(Color::rgba8(0, 0, 255, 255), 10.0);
        style.set_align(StrokeAlign::Inside);
        style.apply(&mut ctx);
        let mut sink = Recording::new();
        ctx.draw(Affine::IDENTITY, 1.0, &mut sink);
        let Command::Fill { path, .. } = &sink.commands()[0] else {
            panic!("expected an outlined fill");
        };
        let bbox = path.bounding_box();
        assert!(bbox.min_x() >= -1e-6);
        assert!(bbox.max_x() <= 100.0 + 1e-6);
    }

    #[test]
    fn outside_alignment_stays_outside_the_shape() {
        let mut ctx = square_ctx();
        let mut style = StrokeStyle::new(Color::rgba8(0, 0, 255, 255), 10.0);
        style.set_align(StrokeAlign::Outside);
        style.apply(&mut ctx);
        let mut sink = Recording::new();
        ctx.draw(Affine::IDENTITY, 1.0, &mut sink);
        let Command::Fill { path, .. } = &sink.commands()[0] else {
            panic!("expected an outlined fill");
        };
        let bbox = path.bounding_box();
        // Expands a 100x100 square by the full width on each side.
        assert!(bbox.min_x() <= -10.0 + 1e-3);
        assert!(bbox.max_x() >= 110.0 - 1e-3);
    }
}
