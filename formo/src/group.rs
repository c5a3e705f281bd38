// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The group container: children evaluated in a private sub-context,
//! then merged.

use peniko::kurbo::{Affine, Point, Vec2};

use crate::context::EvaluationContext;
use crate::element::Element;
use crate::layer::{LayerHandle, Node};

const SKEW_LIMIT: f64 = 85.0;

/// Transform properties composed as anchor, scale, skew, rotation,
/// translation.
#[derive(Clone, Copy, Debug)]
pub struct GroupTransform {
    pub anchor: Point,
    pub position: Point,
    /// Rotation in degrees.
    pub rotation: f64,
    pub scale: Vec2,
    /// Skew in degrees, along `skew_angle`.
    pub skew: f64,
    pub skew_angle: f64,
}

impl Default for GroupTransform {
    fn default() -> Self {
        Self {
            anchor: Point::ZERO,
            position: Point::ZERO,
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            skew: 0.0,
            skew_angle: 0.0,
        }
    }
}

impl GroupTransform {
    /// Composes the transform matrix.
    pub fn matrix(&self) -> Affine {
        let skew_matrix = if self.skew != 0.0 {
            let skew = -self.skew.clamp(-SKEW_LIMIT, SKEW_LIMIT);
            let angle = self.skew_angle.to_radians();
            let shear = Affine::new([1.0, skew.to_radians().tan(), 0.0, 1.0, 0.0, 0.0]);
            Affine::rotate(angle) * shear * Affine::rotate(-angle)
        } else {
            Affine::IDENTITY
        };
        Affine::translate((self.position.x, self.position.y))
            * Affine::rotate(self.rotation.to_radians())
            * skew_matrix
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate((-self.anchor.x, -self.anchor.y))
    }
}

/// A container element.
///
/// Children evaluate in an isolated sub-context; the group then merges
/// their geometries (transforms composed with the group matrix) and
/// painters (index windows shifted, alpha multiplied) into the parent.
/// The composed matrix is cached and recomputed only after one of the
/// group's own transform setters runs, not when children change.
#[derive(Debug)]
pub struct Group {
    base: Node,
    children: Vec<Element>,
    transform: GroupTransform,
    alpha: f32,
    matrix: Option<Affine>,
}

impl Default for Group {
    fn default() -> Self {
        Self {
            base: Node::default(),
            children: Vec::new(),
            transform: GroupTransform::default(),
            alpha: 1.0,
            matrix: None,
        }
    }
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a child, attaching it to this group's layer if the
    /// group is attached.
    pub fn push(&mut self, element: impl Into<Element>) {
        let mut element = element.into();
        if let Some(layer) = self.base.layer().cloned() {
            element.attach(&layer);
        }
        self.base.invalidate();
        self.children.push(element);
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.children.get_mut(index)
    }

    pub fn transform(&self) -> &GroupTransform {
        &self.transform
    }

    pub fn set_anchor(&mut self, anchor: Point) {
        self.transform.anchor = anchor;
        self.matrix = None;
        self.base.invalidate();
    }

    pub fn set_position(&mut self, position: Point) {
        self.transform.position = position;
        self.matrix = None;
        self.base.invalidate();
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.transform.rotation = rotation;
        self.matrix = None;
        self.base.invalidate();
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.transform.scale = scale;
        self.matrix = None;
        self.base.invalidate();
    }

    pub fn set_skew(&mut self, skew: f64, skew_angle: f64) {
        self.transform.skew = skew;
        self.transform.skew_angle = skew_angle;
        self.matrix = None;
        self.base.invalidate();
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
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
        for child in &mut self.children {
            child.attach(layer);
        }
    }

    pub(crate) fn detach(&mut self) {
        self.base.detach();
        for child in &mut self.children {
            child.detach();
        }
    }

    pub(crate) fn apply(&mut self, ctx: &mut EvaluationContext) {
        let matrix = match self.matrix {
            Some(matrix) => matrix,
            None => {
                let matrix = self.transform.matrix();
                self.matrix = Some(matrix);
                matrix
            }
        };
        let mut sub = EvaluationContext::new();
        for child in &mut self.children {
            child.apply(&mut sub);
        }
        ctx.merge(sub, matrix, self.alpha);
    }
}
