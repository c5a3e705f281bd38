// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cloning the accumulated geometries and painters into transformed
//! copies.

use peniko::kurbo::{Affine, Point, Vec2};

use crate::context::EvaluationContext;
use crate::layer::{LayerHandle, Node};

/// Where the copies stack relative to the original.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stacking {
    /// Higher-progress copies draw underneath lower-progress ones.
    Below,
    /// Higher-progress copies draw on top.
    #[default]
    Above,
}

/// Clones everything accumulated so far `copies` times.
///
/// A fractional copy count emits one extra copy whose alpha is scaled
/// by the fractional remainder. Zero copies clears the context;
/// negative copies is a no-op. Cloned painters are rewritten to
/// reference the matching clones of their geometries.
#[derive(Clone, Debug)]
pub struct Repeater {
    base: Node,
    copies: f64,
    offset: f64,
    anchor: Point,
    position: Vec2,
    /// Per-copy rotation increment in degrees.
    rotation: f64,
    /// Per-copy scale factors, compounded per copy.
    scale: Vec2,
    start_alpha: f32,
    end_alpha: f32,
    stacking: Stacking,
}

impl Repeater {
    pub fn new(copies: f64) -> Self {
        Self {
            base: Node::default(),
            copies,
            offset: 0.0,
            anchor: Point::ZERO,
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            start_alpha: 1.0,
            end_alpha: 1.0,
            stacking: Stacking::default(),
        }
    }

    pub fn set_copies(&mut self, copies: f64) {
        self.copies = copies;
        self.base.invalidate();
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
        self.base.invalidate();
    }

    pub fn set_anchor(&mut self, anchor: Point) {
        self.anchor = anchor;
        self.base.invalidate();
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.base.invalidate();
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
        self.base.invalidate();
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.base.invalidate();
    }

    pub fn set_alpha_range(&mut self, start: f32, end: f32) {
        self.start_alpha = start.clamp(0.0, 1.0);
        self.end_alpha = end.clamp(0.0, 1.0);
        self.base.invalidate();
    }

    pub fn set_stacking(&mut self, stacking: Stacking) {
        self.stacking = stacking;
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

    /// The transform for one copy at `progress` (copy index plus
    /// offset): translate(-anchor), compounded scale, rotation and
    /// position scaled by progress, translate back.
    pub fn copy_transform(&self, progress: f64) -> Affine {
        Affine::translate(self.anchor.to_vec2() + self.position * progress)
            * Affine::rotate((self.rotation * progress).to_radians())
            * Affine::scale_non_uniform(
                self.scale.x.powf(progress),
                self.scale.y.powf(progress),
            )
            * Affine::translate(-self.anchor.to_vec2())
    }

    pub(crate) fn apply(&mut self, ctx: &mut EvaluationContext) {
        if self.copies < 0.0 {
            return;
        }
        if self.copies == 0.0 {
            ctx.clear_all();
            return;
        }
        let count = self.copies.ceil() as usize;
        let fraction = self.copies - self.copies.floor();
        let geometries = std::mem::take(&mut ctx.geometries);
        let transforms = std::mem::take(&mut ctx.transforms);
        let painters = std::mem::take(&mut ctx.painters);
        let per_copy = geometries.len();

        let alpha_for = |copy: usize| -> f32 {
            let t = if count > 1 {
                copy as f32 / (count - 1) as f32
            } else {
                0.0
            };
            let mut alpha = self.start_alpha + (self.end_alpha - self.start_alpha) * t;
            if copy == count - 1 && fraction > 0.0 {
                alpha *= fraction as f32;
            }
            alpha
        };
        let order: Vec<usize> = match self.stacking {
            Stacking::Above => (0..count).collect(),
            Stacking::Below => (0..count).rev().collect(),
        };
        // Copy-major layout: every clone set is contiguous, so painter
        // ranges shift by whole multiples of the original count.
        for &copy in &order {
            let delta = self.copy_transform(self.offset + copy as f64);
            for (geometry, transform) in geometries.iter().zip(&transforms) {
                ctx.geometries.push(geometry.clone());
                ctx.transforms.push(*transform * delta);
            }
        }
        for (slot, &copy) in order.iter().enumerate() {
            let alpha = alpha_for(copy);
            if alpha <= 0.0 {
                continue;
            }
            let base = slot * per_copy;
            for painter in &painters {
                let mut painter = painter.clone();
                painter.geometry =
                    base + painter.geometry.start..base + painter.geometry.end;
                painter.paint.alpha *= alpha;
                ctx.painters.push(painter);
            }
        }
    }
}
