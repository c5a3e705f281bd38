// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mutable accumulator threaded through one tree walk.

use peniko::kurbo::Affine;

use crate::geometry::Geometry;
use crate::painter::{Paint, Painter, PainterKind};
use crate::sink::DrawSink;

/// Evaluation state for one walk over an element list: an ordered
/// geometry sequence, a parallel sequence of per-geometry transforms,
/// and the painters accumulated so far.
///
/// `transforms.len() == geometries.len()` holds at every observation
/// point; painters address geometries by index range so later group
/// merges can shift them with a plain offset.
#[derive(Debug, Default)]
pub struct EvaluationContext {
    pub(crate) geometries: Vec<Geometry>,
    pub(crate) transforms: Vec<Affine>,
    pub(crate) painters: Vec<Painter>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(
            self.geometries.len(),
            self.transforms.len(),
            "geometry/transform sequences diverged"
        );
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a geometry with its transform.
    pub fn push_geometry(&mut self, geometry: Geometry, transform: Affine) {
        self.geometries.push(geometry);
        self.transforms.push(transform);
    }

    /// Records a painter over every geometry currently in the context.
    /// Styles see only what already ran; later producers are invisible
    /// to them, while later modifiers still are not (the painter reads
    /// its geometries at draw time).
    pub fn push_painter(&mut self, paint: Paint, kind: PainterKind) {
        let range = 0..self.len();
        self.painters.push(Painter {
            paint,
            kind,
            geometry: range,
        });
    }

    pub fn geometry_mut(&mut self, index: usize) -> Option<&mut Geometry> {
        self.geometries.get_mut(index)
    }

    pub fn transform(&self, index: usize) -> Option<Affine> {
        self.transforms.get(index).copied()
    }

    pub fn painters(&self) -> &[Painter] {
        &self.painters
    }

    /// Drops every accumulated geometry, transform, and painter.
    pub fn clear_all(&mut self) {
        self.geometries.clear();
        self.transforms.clear();
        self.painters.clear();
    }

    /// Merges a group's sub-context: child transforms are composed with
    /// the group matrix, painter index windows are shifted past the
    /// geometries already present, and painter alpha picks up the group
    /// alpha.
    pub fn merge(&mut self, child: EvaluationContext, transform: Affine, alpha: f32) {
        let offset = self.len();
        debug_assert_eq!(child.geometries.len(), child.transforms.len());
        self.geometries.extend(child.geometries);
        self.transforms
            .extend(child.transforms.into_iter().map(|t| transform * t));
        for mut painter in child.painters {
            painter.geometry = painter.geometry.start + offset..painter.geometry.end + offset;
            painter.paint.alpha *= alpha;
            self.painters.push(painter);
        }
    }

    /// Resolves every painter, in accumulation order, against the final
    /// geometry sequence. Consumes the context; geometries and painters
    /// share one lifetime by construction.
    pub fn draw(mut self, transform: Affine, alpha: f32, sink: &mut impl DrawSink) {
        debug_assert_eq!(
            self.geometries.len(),
            self.transforms.len(),
            "geometry/transform sequences diverged"
        );
        let painters = std::mem::take(&mut self.painters);
        for painter in &painters {
            painter.draw(&mut self.geometries, &self.transforms, transform, alpha, sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{Command, Recording};
    use peniko::kurbo::{Rect, Shape};
    use peniko::{Color, Fill};

    fn rect_geometry() -> Geometry {
        Geometry::from_path(Rect::new(0.0, 0.0, 10.0, 10.0).to_path(1e-3))
    }

    fn red_fill() -> (Paint, PainterKind) {
        (
            Paint::solid(Color::rgba8(255, 0, 0, 255)),
            PainterKind::Fill {
                rule: Fill::NonZero,
            },
        )
    }

    #[test]
    fn painter_covers_only_existing_geometries() {
        let mut ctx = EvaluationContext::new();
        ctx.push_geometry(rect_geometry(), Affine::IDENTITY);
        let (paint, kind) = red_fill();
        ctx.push_painter(paint, kind);
        // A geometry produced after the style is not covered.
        ctx.push_geometry(rect_geometry(), Affine::IDENTITY);
        assert_eq!(ctx.painters()[0].geometry_range(), 0..1);
        let mut sink = Recording::new();
        ctx.draw(Affine::IDENTITY, 1.0, &mut sink);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn merge_offsets_painter_ranges_and_alpha() {
        let mut parent = EvaluationContext::new();
        parent.push_geometry(rect_geometry(), Affine::IDENTITY);

        let mut child = EvaluationContext::new();
        child.push_geometry(rect_geometry(), Affine::translate((5.0, 0.0)));
        let (paint, kind) = red_fill();
        child.push_painter(paint, kind);

        parent.merge(child, Affine::translate((0.0, 7.0)), 0.5);
        assert_eq!(parent.len(), 2);
        assert_eq!(parent.painters()[0].geometry_range(), 1..2);
        assert_eq!(parent.painters()[0].paint().alpha, 0.5);
        let expected = Affine::translate((0.0, 7.0)) * Affine::translate((5.0, 0.0));
        assert_eq!(
            parent.transform(1).map(|t| t.as_coeffs()),
            Some(expected.as_coeffs())
        );
    }

    #[test]
    fn draw_applies_outer_transform_and_alpha() {
        let mut ctx = EvaluationContext::new();
        ctx.push_geometry(rect_geometry(), Affine::translate((1.0, 0.0)));
        let (paint, kind) = red_fill();
        ctx.push_painter(paint, kind);
        let mut sink = Recording::new();
        ctx.draw(Affine::translate((0.0, 2.0)), 0.25, &mut sink);
        let Command::Fill {
            paint, transform, ..
        } = &sink.commands()[0]
        else {
            panic!("expected a fill");
        };
        assert_eq!(paint.alpha, 0.25);
        let expected = Affine::translate((0.0, 2.0)) * Affine::translate((1.0, 0.0));
        assert_eq!(transform.as_coeffs(), expected.as_coeffs());
    }

    #[test]
    fn empty_context_draws_nothing() {
        let ctx = EvaluationContext::new();
        let mut sink = Recording::new();
        ctx.draw(Affine::IDENTITY, 1.0, &mut sink);
        assert!(sink.is_empty());
    }
}
