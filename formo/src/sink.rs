// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw sinks: consumers of the final paint-and-geometry call sequence.

use peniko::kurbo::{Affine, BezPath, Shape, Stroke};
use peniko::{Fill, Font};

use crate::painter::Paint;
use crate::text::Glyph;

/// Receives the resolved draw calls produced by a render pass.
///
/// Shapes arrive as their typed primitives (rectangles, rounded
/// rectangles, ellipses) when no modifier touched them, and as free
/// paths otherwise; the sink owns rasterization and caching decisions.
pub trait DrawSink {
    /// Fills a shape.
    fn fill_shape(&mut self, paint: &Paint, rule: Fill, transform: Affine, shape: &impl Shape);

    /// Strokes a shape. Only reached on the scale-correct fast path;
    /// dashed and aligned strokes arrive pre-outlined via `fill_shape`.
    fn stroke_shape(&mut self, paint: &Paint, stroke: &Stroke, transform: Affine, shape: &impl Shape);

    /// Draws a positioned glyph run.
    fn glyph_run(
        &mut self,
        paint: &Paint,
        font: &Font,
        font_size: f32,
        glyphs: &[Glyph],
        transform: Affine,
    );
}

/// Tolerance used when recording shapes as paths.
const RECORD_TOLERANCE: f64 = 0.1;

/// One recorded draw call.
#[derive(Clone, Debug)]
pub enum Command {
    Fill {
        paint: Paint,
        rule: Fill,
        transform: Affine,
        path: BezPath,
    },
    Stroke {
        paint: Paint,
        stroke: Stroke,
        transform: Affine,
        path: BezPath,
    },
    GlyphRun {
        paint: Paint,
        font_size: f32,
        glyph_count: usize,
        transform: Affine,
    },
}

impl Command {
    /// The paint of any command variant.
    pub fn paint(&self) -> &Paint {
        match self {
            Self::Fill { paint, .. } | Self::Stroke { paint, .. } | Self::GlyphRun { paint, .. } => {
                paint
            }
        }
    }
}

/// A sink that records draw calls for inspection; the reference sink
/// used by the test suite and by headless consumers.
#[derive(Clone, Debug, Default)]
pub struct Recording {
    commands: Vec<Command>,
}

static_assertions::assert_impl_all!(Recording: Send, Sync);

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl DrawSink for Recording {
    fn fill_shape(&mut self, paint: &Paint, rule: Fill, transform: Affine, shape: &impl Shape) {
        self.commands.push(Command::Fill {
            paint: paint.clone(),
            rule,
            transform,
            path: shape.to_path(RECORD_TOLERANCE),
        });
    }

    fn stroke_shape(&mut self, paint: &Paint, stroke: &Stroke, transform: Affine, shape: &impl Shape) {
        self.commands.push(Command::Stroke {
            paint: paint.clone(),
            stroke: stroke.clone(),
            transform,
            path: shape.to_path(RECORD_TOLERANCE),
        });
    }

    fn glyph_run(
        &mut self,
        paint: &Paint,
        _font: &Font,
        font_size: f32,
        glyphs: &[Glyph],
        transform: Affine,
    ) {
        self.commands.push(Command::GlyphRun {
            paint: paint.clone(),
            font_size,
            glyph_count: glyphs.len(),
            transform,
        });
    }
}

/// Draws into a vello scene. Blend modes other than the default are
/// ignored here; they require explicit layer management, which belongs
/// to the caller.
#[cfg(feature = "vello")]
impl DrawSink for vello::Scene {
    fn fill_shape(&mut self, paint: &Paint, rule: Fill, transform: Affine, shape: &impl Shape) {
        self.fill(rule, transform, &paint.brush_with_alpha(), None, shape);
    }

    fn stroke_shape(&mut self, paint: &Paint, stroke: &Stroke, transform: Affine, shape: &impl Shape) {
        self.stroke(stroke, transform, &paint.brush_with_alpha(), None, shape);
    }

    fn glyph_run(
        &mut self,
        paint: &Paint,
        font: &Font,
        font_size: f32,
        glyphs: &[Glyph],
        transform: Affine,
    ) {
        let brush = paint.brush_with_alpha();
        self.draw_glyphs(font)
            .font_size(font_size)
            .transform(transform)
            .brush(&brush)
            .draw(
                Fill::NonZero,
                glyphs.iter().map(|g| vello::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                }),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::kurbo::Rect;
    use peniko::Color;

    #[test]
    fn recording_captures_calls_in_order() {
        let mut sink = Recording::new();
        let paint = Paint::solid(Color::rgba8(1, 2, 3, 255));
        sink.fill_shape(
            &paint,
            Fill::NonZero,
            Affine::IDENTITY,
            &Rect::new(0.0, 0.0, 1.0, 1.0),
        );
        sink.stroke_shape(
            &paint,
            &Stroke::new(2.0),
            Affine::IDENTITY,
            &Rect::new(0.0, 0.0, 1.0, 1.0),
        );
        assert_eq!(sink.len(), 2);
        assert!(matches!(sink.commands()[0], Command::Fill { .. }));
        assert!(matches!(sink.commands()[1], Command::Stroke { .. }));
        sink.clear();
        assert!(sink.is_empty());
    }
}
