// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The element tree node: a closed sum over every variant, with one
//! evaluation operation.

use crate::context::EvaluationContext;
use crate::group::Group;
use crate::layer::{LayerHandle, Node};
use crate::modifier::{MergePaths, Repeater, RoundCorners, TrimPath};
use crate::shapes::{Ellipse, FreePath, Polystar, Rectangle, Text};
use crate::style::{FillStyle, StrokeStyle};
use crate::text::{TextModifier, TextPath};

/// One node of a shape tree.
///
/// The variant set is fixed; dispatch is an exhaustive match, so a new
/// capability cannot be forgotten at any call site.
#[derive(Debug)]
pub enum Element {
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Polystar(Polystar),
    Path(FreePath),
    Text(Text),
    Trim(TrimPath),
    RoundCorners(RoundCorners),
    Merge(MergePaths),
    Repeater(Repeater),
    Fill(FillStyle),
    Stroke(StrokeStyle),
    TextModifier(TextModifier),
    TextPath(TextPath),
    Group(Group),
}

impl Element {
    /// Evaluates the element against the context. Disabled elements are
    /// skipped entirely, with no side effects.
    pub fn apply(&mut self, ctx: &mut EvaluationContext) {
        if !self.node().enabled() {
            return;
        }
        match self {
            Self::Rectangle(e) => e.apply(ctx),
            Self::Ellipse(e) => e.apply(ctx),
            Self::Polystar(e) => e.apply(ctx),
            Self::Path(e) => e.apply(ctx),
            Self::Text(e) => e.apply(ctx),
            Self::Trim(e) => e.apply(ctx),
            Self::RoundCorners(e) => e.apply(ctx),
            Self::Merge(e) => e.apply(ctx),
            Self::Repeater(e) => e.apply(ctx),
            Self::Fill(e) => e.apply(ctx),
            Self::Stroke(e) => e.apply(ctx),
            Self::TextModifier(e) => e.apply(ctx),
            Self::TextPath(e) => e.apply(ctx),
            Self::Group(e) => e.apply(ctx),
        }
    }

    pub fn enabled(&self) -> bool {
        self.node().enabled()
    }

    /// Attaches the element, and anything it owns, to a layer.
    /// Idempotent under repeated attach of the same layer.
    pub fn attach(&mut self, layer: &LayerHandle) {
        match self {
            Self::Rectangle(e) => e.attach(layer),
            Self::Ellipse(e) => e.attach(layer),
            Self::Polystar(e) => e.attach(layer),
            Self::Path(e) => e.attach(layer),
            Self::Text(e) => e.attach(layer),
            Self::Trim(e) => e.attach(layer),
            Self::RoundCorners(e) => e.attach(layer),
            Self::Merge(e) => e.attach(layer),
            Self::Repeater(e) => e.attach(layer),
            Self::Fill(e) => e.attach(layer),
            Self::Stroke(e) => e.attach(layer),
            Self::TextModifier(e) => e.attach(layer),
            Self::TextPath(e) => e.attach(layer),
            Self::Group(e) => e.attach(layer),
        }
    }

    pub fn detach(&mut self) {
        match self {
            Self::Rectangle(e) => e.detach(),
            Self::Ellipse(e) => e.detach(),
            Self::Polystar(e) => e.detach(),
            Self::Path(e) => e.detach(),
            Self::Text(e) => e.detach(),
            Self::Trim(e) => e.detach(),
            Self::RoundCorners(e) => e.detach(),
            Self::Merge(e) => e.detach(),
            Self::Repeater(e) => e.detach(),
            Self::Fill(e) => e.detach(),
            Self::Stroke(e) => e.detach(),
            Self::TextModifier(e) => e.detach(),
            Self::TextPath(e) => e.detach(),
            Self::Group(e) => e.detach(),
        }
    }

    fn node(&self) -> &Node {
        match self {
            Self::Rectangle(e) => e.node(),
            Self::Ellipse(e) => e.node(),
            Self::Polystar(e) => e.node(),
            Self::Path(e) => e.node(),
            Self::Text(e) => e.node(),
            Self::Trim(e) => e.node(),
            Self::RoundCorners(e) => e.node(),
            Self::Merge(e) => e.node(),
            Self::Repeater(e) => e.node(),
            Self::Fill(e) => e.node(),
            Self::Stroke(e) => e.node(),
            Self::TextModifier(e) => e.node(),
            Self::TextPath(e) => e.node(),
            Self::Group(e) => e.node(),
        }
    }
}

macro_rules! element_from {
    ($($variant:ident: $ty:ty),* $(,)?) => {
        $(impl From<$ty> for Element {
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        })*
    };
}

element_from! {
    Rectangle: Rectangle,
    Ellipse: Ellipse,
    Polystar: Polystar,
    Path: FreePath,
    Text: Text,
    Trim: TrimPath,
    RoundCorners: RoundCorners,
    Merge: MergePaths,
    Repeater: Repeater,
    Fill: FillStyle,
    Stroke: StrokeStyle,
    TextModifier: TextModifier,
    TextPath: TextPath,
    Group: Group,
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::kurbo::{Point, Size};

    #[test]
    fn disabled_element_has_no_side_effects() {
        let mut element: Element =
            crate::shapes::Rectangle::new(Point::ZERO, Size::new(10.0, 10.0)).into();
        let mut ctx = EvaluationContext::new();
        element.apply(&mut ctx);
        assert_eq!(ctx.len(), 1);

        let Element::Rectangle(rect) = &mut element else {
            panic!("expected a rectangle");
        };
        rect.set_enabled(false);
        let mut ctx = EvaluationContext::new();
        element.apply(&mut ctx);
        assert!(ctx.is_empty());
    }

    #[test]
    fn attach_reaches_the_node() {
        let layer = crate::layer::LayerHandle::new();
        let mut element: Element =
            crate::shapes::Rectangle::new(Point::ZERO, Size::new(1.0, 1.0)).into();
        element.attach(&layer);
        layer.clear_dirty();
        let Element::Rectangle(rect) = &mut element else {
            panic!("expected a rectangle");
        };
        rect.set_position(Point::new(1.0, 1.0));
        assert!(layer.is_dirty());
    }
}
