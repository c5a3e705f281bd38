// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-character animation: applying combined selector factors to
//! expanded glyphs.

use peniko::kurbo::{Affine, Vec2};
use peniko::Color;
use smallvec::SmallVec;

use super::selector::{combined_factor, TextSelector};
use super::{ColorBlend, WidthBlend};
use crate::context::EvaluationContext;
use crate::layer::{LayerHandle, Node};

const SKEW_LIMIT: f64 = 85.0;

/// Applies transform, alpha, and color offsets to each glyph of every
/// text geometry, weighted per character by the combined selector
/// factor.
///
/// With no selectors every character is fully selected.
#[derive(Debug)]
pub struct TextModifier {
    base: Node,
    selectors: SmallVec<[Box<dyn TextSelector>; 2]>,
    position: Vec2,
    scale: Vec2,
    /// Rotation offset in degrees.
    rotation: f64,
    /// Skew offset in degrees, along `skew_angle`.
    skew: f64,
    skew_angle: f64,
    anchor: Vec2,
    /// Target alpha at full selection.
    alpha: f32,
    fill_color: Option<Color>,
    stroke_color: Option<Color>,
    stroke_width: Option<f64>,
}

impl Default for TextModifier {
    fn default() -> Self {
        Self {
            base: Node::default(),
            selectors: SmallVec::new(),
            position: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            skew: 0.0,
            skew_angle: 0.0,
            anchor: Vec2::ZERO,
            alpha: 1.0,
            fill_color: None,
            stroke_color: None,
            stroke_width: None,
        }
    }
}

impl TextModifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_selector(&mut self, mut selector: Box<dyn TextSelector>) {
        if let Some(layer) = self.base.layer().cloned() {
            selector.attach(&layer);
        }
        self.selectors.push(selector);
        self.base.invalidate();
    }

    pub fn clear_selectors(&mut self) {
        for selector in &mut self.selectors {
            selector.detach();
        }
        self.selectors.clear();
        self.base.invalidate();
    }

    pub fn selectors(&self) -> &[Box<dyn TextSelector>] {
        &self.selectors
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.base.invalidate();
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.base.invalidate();
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
        self.base.invalidate();
    }

    pub fn set_skew(&mut self, skew: f64, skew_angle: f64) {
        self.skew = skew;
        self.skew_angle = skew_angle;
        self.base.invalidate();
    }

    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
        self.base.invalidate();
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
        self.base.invalidate();
    }

    pub fn set_fill_color(&mut self, color: Option<Color>) {
        self.fill_color = color;
        self.base.invalidate();
    }

    pub fn set_stroke_color(&mut self, color: Option<Color>) {
        self.stroke_color = color;
        self.base.invalidate();
    }

    pub fn set_stroke_width(&mut self, width: Option<f64>) {
        self.stroke_width = width;
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
        for selector in &mut self.selectors {
            selector.attach(layer);
        }
    }

    pub(crate) fn detach(&mut self) {
        self.base.detach();
        for selector in &mut self.selectors {
            selector.detach();
        }
    }

    pub(crate) fn apply(&mut self, ctx: &mut EvaluationContext) {
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
            let total = records.len();
            for (char_index, record) in records.iter_mut().enumerate() {
                let f = combined_factor(&self.selectors, char_index, total);
                if f == 0.0 {
                    continue;
                }
                let fa = f.abs();
                // Default anchor sits at half the advance, on the
                // baseline.
                let anchor = Vec2::new(record.glyph.advance as f64 * 0.5, 0.0)
                    + record.anchor
                    + self.anchor * f;
                let scale = Vec2::new(
                    1.0 + (self.scale.x - 1.0) * f,
                    1.0 + (self.scale.y - 1.0) * f,
                );
                let delta = Affine::translate(self.position * f)
                    * Affine::translate(anchor)
                    * Affine::rotate((self.rotation * f).to_radians())
                    * skew_matrix(self.skew * f, self.skew_angle)
                    * Affine::scale_non_uniform(scale.x, scale.y)
                    * Affine::translate(-anchor);
                record.transform *= delta;
                record.style.alpha *=
                    (1.0 + (self.alpha as f64 - 1.0) * fa).max(0.0) as f32;
                if let Some(color) = self.fill_color {
                    record.style.fill =
                        ColorBlend::accumulate(record.style.fill, color, fa as f32);
                }
                if let Some(color) = self.stroke_color {
                    record.style.stroke =
                        ColorBlend::accumulate(record.style.stroke, color, fa as f32);
                }
                if let Some(width) = self.stroke_width {
                    record.style.stroke_width =
                        WidthBlend::accumulate(record.style.stroke_width, width, fa);
                }
            }
        }
    }
}

/// Skew about an axis, clamped the way group transforms clamp.
fn skew_matrix(skew: f64, axis_deg: f64) -> Affine {
    if skew == 0.0 {
        return Affine::IDENTITY;
    }
    let skew = -skew.clamp(-SKEW_LIMIT, SKEW_LIMIT);
    let angle = axis_deg.to_radians();
    let shear = Affine::new([1.0, skew.to_radians().tan(), 0.0, 1.0, 0.0, 0.0]);
    Affine::rotate(angle) * shear * Affine::rotate(-angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::text::selector::{RangeSelector, RangeUnits};
    use crate::text::{Glyph, TextRun};
    use peniko::kurbo::Point;
    use peniko::{Blob, Font};
    use std::sync::Arc;

    fn text_ctx(glyph_count: usize) -> EvaluationContext {
        let font = Font::new(Blob::new(Arc::new(Vec::<u8>::new())), 0);
        let glyphs = (0..glyph_count)
            .map(|i| Glyph {
                id: i as u32,
                x: i as f32 * 10.0,
                y: 0.0,
                advance: 10.0,
            })
            .collect();
        let run = TextRun {
            font,
            font_size: 16.0,
            glyphs,
        };
        let mut ctx = EvaluationContext::new();
        ctx.push_geometry(Geometry::from_text(run), Affine::IDENTITY);
        ctx
    }

    fn record_position(ctx: &mut EvaluationContext, index: usize) -> Point {
        let records = ctx.geometry_mut(0).unwrap().glyphs_mut().unwrap();
        records[index].transform * Point::ZERO
    }

    #[test]
    fn no_selectors_move_every_glyph_fully() {
        let mut ctx = text_ctx(3);
        let mut modifier = TextModifier::new();
        modifier.set_position(Vec2::new(0.0, -4.0));
        modifier.apply(&mut ctx);
        for i in 0..3 {
            let p = record_position(&mut ctx, i);
            assert!((p.y + 4.0).abs() < 1e-9);
            assert!((p.x - i as f64 * 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn selector_window_limits_the_effect() {
        let mut ctx = text_ctx(4);
        let mut modifier = TextModifier::new();
        modifier.set_position(Vec2::new(0.0, -4.0));
        modifier.push_selector(Box::new(RangeSelector::new(RangeUnits::Index, 0.0, 2.0)));
        modifier.apply(&mut ctx);
        assert!((record_position(&mut ctx, 0).y + 4.0).abs() < 1e-9);
        assert!((record_position(&mut ctx, 3).y).abs() < 1e-9);
    }

    #[test]
    fn scale_pivots_on_the_half_advance_anchor() {
        let mut ctx = text_ctx(1);
        let mut modifier = TextModifier::new();
        modifier.set_scale(Vec2::new(2.0, 2.0));
        modifier.apply(&mut ctx);
        let records = ctx.geometry_mut(0).unwrap().glyphs_mut().unwrap();
        // The anchor (5, 0) in glyph space stays fixed.
        let anchored = records[0].transform * Point::new(5.0, 0.0);
        assert!((anchored.x - 5.0).abs() < 1e-9);
        let origin = records[0].transform * Point::ZERO;
        assert!((origin.x + 5.0).abs() < 1e-9);
    }

    #[test]
    fn alpha_blends_by_absolute_factor() {
        let mut ctx = text_ctx(2);
        let mut modifier = TextModifier::new();
        modifier.set_alpha(0.0);
        modifier.apply(&mut ctx);
        let records = ctx.geometry_mut(0).unwrap().glyphs_mut().unwrap();
        assert!(records[0].style.alpha.abs() < 1e-6);
    }

    #[test]
    fn color_override_accumulates() {
        let mut ctx = text_ctx(1);
        let mut modifier = TextModifier::new();
        modifier.set_fill_color(Some(Color::rgba8(255, 0, 0, 255)));
        modifier.apply(&mut ctx);
        let records = ctx.geometry_mut(0).unwrap().glyphs_mut().unwrap();
        let blend = records[0].style.fill.unwrap();
        assert!((blend.amount - 1.0).abs() < 1e-6);
        assert_eq!(blend.color.r, 255);
    }
}
