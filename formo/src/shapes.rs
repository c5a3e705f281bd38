// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry-producing elements: the geometric primitives and text.

use peniko::kurbo::{self, Affine, BezPath, Point, Rect, RoundedRect, Size, Vec2};
use peniko::Font;

use crate::context::EvaluationContext;
use crate::geometry::{Geometry, ShapeSource, SHAPE_TOLERANCE};
use crate::layer::{LayerHandle, Node};
use crate::path;
use crate::text::TextRun;

/// Winding direction of a produced contour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Normal,
    Reversed,
}

/// An axis-aligned rectangle, optionally with rounded corners,
/// centered on its position.
#[derive(Clone, Debug)]
pub struct Rectangle {
    base: Node,
    position: Point,
    size: Size,
    corner_radius: f64,
    direction: Direction,
}

impl Rectangle {
    pub fn new(position: Point, size: Size) -> Self {
        Self {
            base: Node::default(),
            position,
            size,
            corner_radius: 0.0,
            direction: Direction::default(),
        }
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
        self.base.invalidate();
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.base.invalidate();
    }

    pub fn set_corner_radius(&mut self, radius: f64) {
        self.corner_radius = radius.max(0.0);
        self.base.invalidate();
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
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
        let rect = Rect::from_center_size(self.position, self.size);
        let source = if self.corner_radius > 0.0 {
            ShapeSource::RoundedRect(RoundedRect::from_rect(rect, self.corner_radius))
        } else {
            ShapeSource::Rect(rect)
        };
        ctx.push_geometry(directed(source, self.direction), Affine::IDENTITY);
    }
}

/// An ellipse centered on its position.
#[derive(Clone, Debug)]
pub struct Ellipse {
    base: Node,
    position: Point,
    size: Size,
    direction: Direction,
}

impl Ellipse {
    pub fn new(position: Point, size: Size) -> Self {
        Self {
            base: Node::default(),
            position,
            size,
            direction: Direction::default(),
        }
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
        self.base.invalidate();
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.base.invalidate();
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
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
        let radii = (self.size.width * 0.5, self.size.height * 0.5);
        let source = ShapeSource::Ellipse(kurbo::Ellipse::new(self.position, radii, 0.0));
        ctx.push_geometry(directed(source, self.direction), Affine::IDENTITY);
    }
}

/// Star or regular polygon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PolystarKind {
    #[default]
    Star,
    Polygon,
}

/// A star or polygon around its position.
///
/// Roundness values are fractions in [0, 1] controlling how far the
/// outline bulges along the tangents at each vertex.
#[derive(Clone, Debug)]
pub struct Polystar {
    base: Node,
    kind: PolystarKind,
    position: Point,
    points: f64,
    rotation: f64,
    inner_radius: f64,
    outer_radius: f64,
    inner_roundness: f64,
    outer_roundness: f64,
    direction: Direction,
}

impl Polystar {
    pub fn new(kind: PolystarKind, position: Point, points: f64, outer_radius: f64) -> Self {
        Self {
            base: Node::default(),
            kind,
            position,
            points,
            rotation: 0.0,
            inner_radius: outer_radius * 0.5,
            outer_radius,
            inner_roundness: 0.0,
            outer_roundness: 0.0,
            direction: Direction::default(),
        }
    }

    pub fn set_points(&mut self, points: f64) {
        self.points = points;
        self.base.invalidate();
    }

    /// Rotation in degrees.
    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
        self.base.invalidate();
    }

    pub fn set_inner_radius(&mut self, radius: f64) {
        self.inner_radius = radius.max(0.0);
        self.base.invalidate();
    }

    pub fn set_outer_radius(&mut self, radius: f64) {
        self.outer_radius = radius.max(0.0);
        self.base.invalidate();
    }

    pub fn set_roundness(&mut self, inner: f64, outer: f64) {
        self.inner_roundness = inner.clamp(0.0, 1.0);
        self.outer_roundness = outer.clamp(0.0, 1.0);
        self.base.invalidate();
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
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
        let path = self.build_path();
        if path.elements().is_empty() {
            return;
        }
        ctx.push_geometry(
            directed(ShapeSource::Path(path), self.direction),
            Affine::IDENTITY,
        );
    }

    fn build_path(&self) -> BezPath {
        let mut out = BezPath::new();
        let num_points = self.points.round();
        if num_points < 3.0 {
            return out;
        }
        let is_star = self.kind == PolystarKind::Star;
        let total = if is_star {
            num_points * 2.0
        } else {
            num_points
        } as usize;
        // Vertex 0 points straight up.
        let start_angle = (self.rotation - 90.0).to_radians();
        let step = std::f64::consts::TAU / total as f64;

        struct Vertex {
            point: Point,
            radius: f64,
            roundness: f64,
            angle: f64,
        }
        let mut vertices = Vec::with_capacity(total);
        for i in 0..total {
            let (radius, roundness) = if is_star && i % 2 == 1 {
                (self.inner_radius, self.inner_roundness)
            } else {
                (self.outer_radius, self.outer_roundness)
            };
            let angle = start_angle + step * i as f64;
            vertices.push(Vertex {
                point: self.position + Vec2::new(radius * angle.cos(), radius * angle.sin()),
                radius,
                roundness,
                angle,
            });
        }
        let rounded = vertices.iter().any(|v| v.roundness > 0.0);
        out.move_to(vertices[0].point);
        if !rounded {
            for vertex in vertices.iter().skip(1) {
                out.line_to(vertex.point);
            }
        } else {
            // Conventional polystar approximation: cubic handles along
            // the tangent at each vertex, scaled by its roundness.
            let handle = |v: &Vertex| -> Vec2 {
                let tangent = Vec2::new(-v.angle.sin(), v.angle.cos());
                tangent * (v.radius * v.roundness * std::f64::consts::TAU / (total as f64 * 4.0))
            };
            for i in 0..total {
                let from = &vertices[i];
                let to = &vertices[(i + 1) % total];
                let c1 = from.point + handle(from);
                let c2 = to.point - handle(to);
                out.curve_to(c1, c2, to.point);
            }
        }
        out.close_path();
        out
    }
}

/// A free-form Bézier path.
#[derive(Clone, Debug, Default)]
pub struct FreePath {
    base: Node,
    path: BezPath,
    direction: Direction,
}

impl FreePath {
    pub fn new(path: BezPath) -> Self {
        Self {
            base: Node::default(),
            path,
            direction: Direction::default(),
        }
    }

    pub fn set_path(&mut self, path: BezPath) {
        self.path = path;
        self.base.invalidate();
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
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
        ctx.push_geometry(
            directed(ShapeSource::Path(self.path.clone()), self.direction),
            Affine::IDENTITY,
        );
    }
}

/// A shaped text run positioned at a baseline origin.
#[derive(Clone, Debug)]
pub struct Text {
    base: Node,
    font: Option<Font>,
    font_size: f32,
    tracking: f32,
    origin: Point,
    text: String,
}

impl Text {
    pub fn new(font: Font, font_size: f32, text: impl Into<String>) -> Self {
        Self {
            base: Node::default(),
            font: Some(font),
            font_size,
            tracking: 0.0,
            origin: Point::ZERO,
            text: text.into(),
        }
    }

    /// A text element with no font; evaluates to nothing until one is
    /// set.
    pub fn empty() -> Self {
        Self {
            base: Node::default(),
            font: None,
            font_size: 16.0,
            tracking: 0.0,
            origin: Point::ZERO,
            text: String::new(),
        }
    }

    pub fn set_font(&mut self, font: Font) {
        self.font = Some(font);
        self.base.invalidate();
    }

    pub fn set_font_size(&mut self, font_size: f32) {
        self.font_size = font_size;
        self.base.invalidate();
    }

    pub fn set_tracking(&mut self, tracking: f32) {
        self.tracking = tracking;
        self.base.invalidate();
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
        self.base.invalidate();
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
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
        let Some(font) = &self.font else {
            return;
        };
        let mut run = TextRun::shape(font, self.font_size, self.tracking, &self.text);
        for glyph in &mut run.glyphs {
            glyph.x += self.origin.x as f32;
            glyph.y += self.origin.y as f32;
        }
        ctx.push_geometry(Geometry::from_text(run), Affine::IDENTITY);
    }
}

fn directed(source: ShapeSource, direction: Direction) -> Geometry {
    match direction {
        Direction::Normal => Geometry::from_shape(source),
        Direction::Reversed => {
            Geometry::from_path(path::reverse(&source.to_bez(SHAPE_TOLERANCE)))
        }
    }
}
