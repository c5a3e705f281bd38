// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred paint operations, resolved against the geometry sequence
//! only when the draw pass runs.

use std::ops::Range;

use peniko::kurbo::{self, Affine, BezPath, Cap, Dashes, Join, PathEl, Stroke};
use peniko::{BlendMode, Brush, Fill};

use crate::geometry::{Geometry, ShapeSource, SHAPE_TOLERANCE};
use crate::path::{combine, BooleanOp};
use crate::sink::DrawSink;
use crate::text::ColorBlend;

/// A resolved paint description: brush, alpha, and blend mode.
#[derive(Clone, Debug)]
pub struct Paint {
    pub brush: Brush,
    pub alpha: f32,
    pub blend: BlendMode,
}

impl Paint {
    pub fn solid(brush: impl Into<Brush>) -> Self {
        Self {
            brush: brush.into(),
            alpha: 1.0,
            blend: BlendMode::default(),
        }
    }

    /// The brush with this paint's alpha folded in.
    pub fn brush_with_alpha(&self) -> Brush {
        brush_with_alpha(&self.brush, self.alpha)
    }

    fn with_extra_alpha(&self, alpha: f32) -> Self {
        Self {
            brush: self.brush.clone(),
            alpha: self.alpha * alpha,
            blend: self.blend,
        }
    }

    fn with_brush(&self, brush: Brush) -> Self {
        Self {
            brush,
            alpha: self.alpha,
            blend: self.blend,
        }
    }
}

/// Multiplies a brush's effective alpha.
pub(crate) fn brush_with_alpha(brush: &Brush, alpha: f32) -> Brush {
    if alpha == 1.0 {
        return brush.clone();
    }
    match brush {
        Brush::Solid(color) => color.with_alpha_factor(alpha).into(),
        Brush::Gradient(gradient) => {
            let mut gradient = gradient.clone();
            for stop in &mut gradient.stops {
                *stop = stop.with_alpha_factor(alpha);
            }
            Brush::Gradient(gradient)
        }
        Brush::Image(image) => Brush::Image(image.clone()),
    }
}

/// Blends a brush toward an override color.
pub(crate) fn tint_brush(brush: &Brush, blend: ColorBlend) -> Brush {
    match brush {
        Brush::Solid(color) => Brush::Solid(blend.over(*color)),
        Brush::Gradient(gradient) => {
            let mut gradient = gradient.clone();
            for stop in &mut gradient.stops {
                stop.color = blend.over(stop.color);
            }
            Brush::Gradient(gradient)
        }
        Brush::Image(image) => Brush::Image(image.clone()),
    }
}

/// Side of the boundary a stroke hugs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrokeAlign {
    #[default]
    Center,
    Inside,
    Outside,
}

/// Stroke parameters carried by a stroke painter.
#[derive(Clone, Debug)]
pub struct StrokeProps {
    pub width: f64,
    pub cap: Cap,
    pub join: Join,
    pub miter_limit: f64,
    pub dash_pattern: Dashes,
    pub dash_offset: f64,
    pub align: StrokeAlign,
}

impl Default for StrokeProps {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: Cap::Butt,
            join: Join::Miter,
            miter_limit: 4.0,
            dash_pattern: Dashes::new(),
            dash_offset: 0.0,
            align: StrokeAlign::Center,
        }
    }
}

impl StrokeProps {
    fn plain_stroke(&self, width: f64) -> Stroke {
        Stroke::new(width)
            .with_caps(self.cap)
            .with_join(self.join)
            .with_miter_limit(self.miter_limit)
    }

    fn has_dash(&self) -> bool {
        !self.dash_pattern.is_empty() && self.dash_pattern.iter().sum::<f64>() > 0.0
    }
}

/// Whether a painter fills or strokes, with per-kind parameters.
#[derive(Clone, Debug)]
pub enum PainterKind {
    Fill { rule: Fill },
    Stroke(StrokeProps),
}

/// A deferred draw: a paint description plus references (an index
/// range, not copies) into the context's geometry sequence.
///
/// Because the painter holds references, a modifier that runs after the
/// style that recorded it still changes what gets drawn: the shape is
/// read only here, at draw time.
#[derive(Clone, Debug)]
pub struct Painter {
    pub(crate) paint: Paint,
    pub(crate) kind: PainterKind,
    pub(crate) geometry: Range<usize>,
}

impl Painter {
    pub fn paint(&self) -> &Paint {
        &self.paint
    }

    pub fn geometry_range(&self) -> Range<usize> {
        self.geometry.clone()
    }

    pub(crate) fn draw(
        &self,
        geometries: &mut [Geometry],
        transforms: &[Affine],
        outer: Affine,
        outer_alpha: f32,
        sink: &mut impl DrawSink,
    ) {
        debug_assert!(
            self.geometry.end <= geometries.len(),
            "painter geometry range out of bounds"
        );
        let end = self.geometry.end.min(geometries.len());
        for index in self.geometry.start..end {
            let transform = outer * transforms[index];
            let paint = self.paint.with_extra_alpha(outer_alpha);
            if paint.alpha <= 0.0 {
                continue;
            }
            match &self.kind {
                PainterKind::Fill { rule } => {
                    draw_fill(&mut geometries[index], *rule, paint, transform, sink);
                }
                PainterKind::Stroke(props) => {
                    draw_stroke(&mut geometries[index], props, paint, transform, sink);
                }
            }
        }
    }
}

fn draw_fill(
    geometry: &mut Geometry,
    rule: Fill,
    paint: Paint,
    transform: Affine,
    sink: &mut impl DrawSink,
) {
    if let Some(records) = geometry.glyph_records() {
        for record in records {
            let mut paint = paint.with_extra_alpha(record.style.alpha);
            if paint.alpha <= 0.0 {
                continue;
            }
            if let Some(blend) = record.style.fill {
                paint = paint.with_brush(tint_brush(&paint.brush, blend));
            }
            sink.glyph_run(
                &paint,
                &record.font,
                record.font_size,
                std::slice::from_ref(&record.glyph),
                transform * record.transform,
            );
        }
        return;
    }
    if let Some(run) = geometry.text_run() {
        // An unconverted run draws as text for rendering fidelity.
        sink.glyph_run(&paint, &run.font, run.font_size, &run.glyphs, transform);
        return;
    }
    // An explicit fill type (set by a boolean merge) wins over the
    // style's rule.
    let rule = geometry.fill().unwrap_or(rule);
    let Some(source) = geometry.shape() else {
        return;
    };
    match source {
        ShapeSource::Rect(r) => sink.fill_shape(&paint, rule, transform, r),
        ShapeSource::RoundedRect(r) => sink.fill_shape(&paint, rule, transform, r),
        ShapeSource::Ellipse(e) => sink.fill_shape(&paint, rule, transform, e),
        ShapeSource::Path(p) => sink.fill_shape(&paint, rule, transform, p),
    }
}

fn draw_stroke(
    geometry: &mut Geometry,
    props: &StrokeProps,
    paint: Paint,
    transform: Affine,
    sink: &mut impl DrawSink,
) {
    if props.width <= 0.0 {
        return;
    }
    if let Some(records) = geometry.glyph_records() {
        for record in records {
            let mut paint = paint.with_extra_alpha(record.style.alpha);
            if paint.alpha <= 0.0 {
                continue;
            }
            if let Some(blend) = record.style.stroke {
                paint = paint.with_brush(tint_brush(&paint.brush, blend));
            }
            let width = record
                .style
                .stroke_width
                .map_or(props.width, |blend| blend.over(props.width));
            if width <= 0.0 {
                continue;
            }
            let Some(outline) = record.outline() else {
                continue;
            };
            let mut props = props.clone();
            props.width = width;
            stroke_path(&props, paint, transform * record.transform, &outline, sink);
        }
        return;
    }
    let Some(source) = geometry.shape() else {
        return;
    };
    // The cheap path: a uniform net scale keeps a center-aligned,
    // undashed stroke width correct under the sink's transform.
    if is_uniform_scale(transform) && props.align == StrokeAlign::Center && !props.has_dash() {
        let stroke = props.plain_stroke(props.width);
        match source {
            ShapeSource::Rect(r) => sink.stroke_shape(&paint, &stroke, transform, r),
            ShapeSource::RoundedRect(r) => sink.stroke_shape(&paint, &stroke, transform, r),
            ShapeSource::Ellipse(e) => sink.stroke_shape(&paint, &stroke, transform, e),
            ShapeSource::Path(p) => sink.stroke_shape(&paint, &stroke, transform, p),
        }
        return;
    }
    let path = source.to_bez(SHAPE_TOLERANCE);
    stroke_path(props, paint, transform, &path, sink);
}

/// Outline-as-fill stroking in the path's local space: dash first, then
/// expand, then align to one side of the boundary with a boolean op.
fn stroke_path(
    props: &StrokeProps,
    paint: Paint,
    transform: Affine,
    path: &BezPath,
    sink: &mut impl DrawSink,
) {
    if is_uniform_scale(transform) && props.align == StrokeAlign::Center && !props.has_dash() {
        sink.stroke_shape(&paint, &props.plain_stroke(props.width), transform, path);
        return;
    }
    let dashed: BezPath;
    let outline_source: &BezPath = if props.has_dash() {
        let elements: Vec<PathEl> = kurbo::dash(
            path.elements().iter().copied(),
            props.dash_offset,
            &props.dash_pattern,
        )
        .collect();
        dashed = BezPath::from_vec(elements);
        &dashed
    } else {
        path
    };
    // Inside/outside alignment expands at double width so the surviving
    // half after the boolean has the requested width.
    let expand_width = match props.align {
        StrokeAlign::Center => props.width,
        StrokeAlign::Inside | StrokeAlign::Outside => props.width * 2.0,
    };
    let mut outline = kurbo::stroke(
        outline_source.elements().iter().copied(),
        &props.plain_stroke(expand_width),
        &Default::default(),
        SHAPE_TOLERANCE,
    );
    let clip = match props.align {
        StrokeAlign::Center => None,
        StrokeAlign::Inside => Some(BooleanOp::Intersect),
        StrokeAlign::Outside => Some(BooleanOp::Difference),
    };
    if let Some(op) = clip {
        match combine(&outline, path, op) {
            Ok(aligned) => outline = aligned,
            Err(err) => log::warn!("stroke alignment degraded to center: {err}"),
        }
    }
    sink.fill_shape(&paint, Fill::NonZero, transform, &outline);
}

/// True when the transform's net scale is uniform (equal-length,
/// orthogonal columns).
pub(crate) fn is_uniform_scale(transform: Affine) -> bool {
    let [a, b, c, d, _, _] = transform.as_coeffs();
    let len0 = (a * a + b * b).sqrt();
    let len1 = (c * c + d * d).sqrt();
    let scale = len0.max(len1).max(1e-12);
    (len0 - len1).abs() <= 1e-9 * scale && (a * c + b * d).abs() <= 1e-9 * scale * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::Color;

    #[test]
    fn uniform_scale_detection() {
        assert!(is_uniform_scale(Affine::IDENTITY));
        assert!(is_uniform_scale(Affine::scale(3.0)));
        assert!(is_uniform_scale(Affine::rotate(0.7) * Affine::scale(2.0)));
        assert!(!is_uniform_scale(Affine::scale_non_uniform(2.0, 1.0)));
        assert!(!is_uniform_scale(Affine::new([
            1.0, 0.5, 0.0, 1.0, 0.0, 0.0
        ])));
    }

    #[test]
    fn solid_brush_alpha_modulation() {
        let brush = Brush::Solid(Color::rgba8(10, 20, 30, 200));
        let Brush::Solid(color) = brush_with_alpha(&brush, 0.5) else {
            panic!("expected a solid brush");
        };
        assert_eq!(color.a, 100);
    }

    #[test]
    fn tint_blends_toward_target() {
        let brush = Brush::Solid(Color::rgba8(0, 0, 0, 255));
        let blend = ColorBlend {
            color: Color::rgba8(255, 0, 0, 255),
            amount: 1.0,
        };
        let Brush::Solid(color) = tint_brush(&brush, blend) else {
            panic!("expected a solid brush");
        };
        assert_eq!(color.r, 255);
    }

    #[test]
    fn zero_alpha_paint_is_skipped() {
        use crate::sink::Recording;
        let mut sink = Recording::default();
        let painter = Painter {
            paint: Paint {
                brush: Color::rgba8(255, 0, 0, 255).into(),
                alpha: 0.0,
                blend: BlendMode::default(),
            },
            kind: PainterKind::Fill {
                rule: Fill::NonZero,
            },
            geometry: 0..1,
        };
        let mut geometries = vec![Geometry::from_path(BezPath::new())];
        let transforms = vec![Affine::IDENTITY];
        painter.draw(&mut geometries, &transforms, Affine::IDENTITY, 1.0, &mut sink);
        assert!(sink.commands().is_empty());
    }
}
