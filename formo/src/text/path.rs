// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Laying glyphs along a guide curve.

use peniko::kurbo::{Affine, BezPath, Point, Vec2};

use crate::context::EvaluationContext;
use crate::layer::{LayerHandle, Node};
use crate::path::PathMeasure;

/// Lays the glyphs of every text geometry along a guide curve.
///
/// Normal mode decomposes each glyph's displacement from the baseline
/// origin into a tangential part (arc length along the curve) and a
/// normal part (perpendicular offset). Force-alignment ignores the
/// original positions and spaces glyphs by advance, stretched so the
/// run exactly fills `[first_margin, length + last_margin]`.
#[derive(Clone, Debug)]
pub struct TextPath {
    base: Node,
    curve: Option<BezPath>,
    origin: Point,
    first_margin: f64,
    last_margin: f64,
    force_alignment: bool,
    perpendicular: bool,
    reversed: bool,
    measure: Option<PathMeasure>,
}

impl Default for TextPath {
    fn default() -> Self {
        Self {
            base: Node::default(),
            curve: None,
            origin: Point::ZERO,
            first_margin: 0.0,
            last_margin: 0.0,
            force_alignment: false,
            perpendicular: true,
            reversed: false,
            measure: None,
        }
    }
}

impl TextPath {
    pub fn new(curve: BezPath) -> Self {
        Self {
            curve: Some(curve),
            ..Self::default()
        }
    }

    pub fn set_curve(&mut self, curve: Option<BezPath>) {
        self.curve = curve;
        self.measure = None;
        self.base.invalidate();
    }

    /// The declared baseline origin that tangential displacement is
    /// measured from.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
        self.base.invalidate();
    }

    pub fn set_margins(&mut self, first: f64, last: f64) {
        self.first_margin = first;
        self.last_margin = last;
        self.base.invalidate();
    }

    pub fn set_force_alignment(&mut self, force: bool) {
        self.force_alignment = force;
        self.base.invalidate();
    }

    /// Whether glyphs rotate to track the curve's tangent.
    pub fn set_perpendicular(&mut self, perpendicular: bool) {
        self.perpendicular = perpendicular;
        self.base.invalidate();
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
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
        let Some(curve) = &self.curve else {
            return;
        };
        if self.measure.is_none() {
            self.measure = Some(PathMeasure::new(curve));
        }
        let Some(measure) = self.measure.as_ref() else {
            return;
        };
        if measure.is_empty() {
            return;
        }
        for index in 0..ctx.len() {
            let Some(geometry) = ctx.geometry_mut(index) else {
                continue;
            };
            if !geometry.has_text() {
                continue;
            }
            let Some(records) = geometry.glyphs_mut() else {
                continue;
            };
            if self.force_alignment {
                let count = records.len();
                let total_advance: f64 =
                    records.iter().map(|r| r.glyph.advance as f64).sum();
                let span = measure.length() + self.last_margin - self.first_margin;
                let gap = if count > 1 {
                    (span - total_advance) / (count - 1) as f64
                } else {
                    0.0
                };
                let mut arc = self.first_margin;
                for record in records.iter_mut() {
                    self.place(measure, record, arc, 0.0);
                    arc += record.glyph.advance as f64 + gap;
                }
            } else {
                for record in records.iter_mut() {
                    let displacement = record.origin - self.origin;
                    let arc = self.first_margin + displacement.x;
                    self.place(measure, record, arc, displacement.y);
                }
            }
        }
    }

    fn place(
        &self,
        measure: &PathMeasure,
        record: &mut super::GlyphRecord,
        arc: f64,
        normal_offset: f64,
    ) {
        let arc = if self.reversed {
            measure.length() - arc
        } else {
            arc
        };
        let (point, mut tangent) = measure.point_tangent(arc);
        if self.reversed {
            tangent = -tangent;
        }
        let normal = Vec2::new(-tangent.y, tangent.x);
        let position = point + normal * normal_offset;
        let rotation = if self.perpendicular {
            tangent.y.atan2(tangent.x)
        } else {
            0.0
        };
        // Preserve whatever non-positional part earlier modifiers left.
        let local = Affine::translate(-record.origin.to_vec2()) * record.transform;
        record.transform =
            Affine::translate(position.to_vec2()) * Affine::rotate(rotation) * local;
    }
}
