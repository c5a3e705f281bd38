// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Formo is the vector-shape animation core of a 2D rendering engine:
//! a tree of declarative elements — geometric primitives, text, path
//! modifiers, paint styles, and groups — evaluated into a flat list of
//! drawable geometries and deferred paint operations.
//!
//! The design centers on one contract: a paint style records a
//! [`Painter`] holding *references* into the evaluation context's
//! geometry sequence, not copies. Modifiers that run after the style in
//! the same element list therefore still change what the style draws,
//! because the painter resolves its geometry only at final-draw time.
//!
//! ## Getting started
//!
//! Build an element list on a [`ShapeLayer`], then render it into a
//! [`DrawSink`]:
//!
//! ```
//! use formo::kurbo::{Affine, Point, Size};
//! use formo::peniko::Color;
//! use formo::{FillStyle, Recording, Rectangle, ShapeLayer, StrokeStyle};
//!
//! let mut layer = ShapeLayer::new();
//! layer.push(Rectangle::new(Point::new(50.0, 50.0), Size::new(100.0, 100.0)));
//! layer.push(FillStyle::new(Color::rgba8(255, 0, 0, 255)));
//! layer.push(StrokeStyle::new(Color::rgba8(0, 0, 255, 255), 8.0));
//!
//! let mut sink = Recording::new();
//! layer.render(Affine::IDENTITY, 1.0, &mut sink);
//! assert_eq!(sink.len(), 2);
//! ```
//!
//! Evaluation is single-threaded and synchronous; property setters are
//! expected to run between passes, reporting through the owning
//! layer's [`LayerHandle`]. Rasterization, GPU resources, and keyframe
//! timing live outside this crate: the path kernel is `kurbo` plus the
//! `path-bool` boolean library, text access is `skrifa`, and the final
//! output goes to whatever implements [`DrawSink`].

#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod context;
mod element;
mod geometry;
mod group;
mod layer;
mod modifier;
mod painter;
mod shapes;
mod sink;
mod style;

pub mod path;
pub mod text;

pub use peniko;
pub use peniko::kurbo;
pub use skrifa;

pub use context::EvaluationContext;
pub use element::Element;
pub use geometry::{Geometry, ShapeSource};
pub use group::{Group, GroupTransform};
pub use layer::{LayerHandle, ShapeLayer};
pub use modifier::{MergeOp, MergePaths, Repeater, RoundCorners, Stacking, TrimMode, TrimPath};
pub use painter::{Paint, Painter, PainterKind, StrokeAlign, StrokeProps};
pub use shapes::{Direction, Ellipse, FreePath, Polystar, PolystarKind, Rectangle, Text};
pub use sink::{Command, DrawSink, Recording};
pub use style::{ColorSource, FillStyle, StrokeStyle};
pub use text::{
    RangeSelector, RangeUnits, SelectorMode, SelectorShape, TextModifier, TextPath, TextRun,
    TextSelector,
};

use thiserror::Error;

/// Errors surfaced by the geometry-kernel bridges.
///
/// Everything else in this crate degrades to a no-op instead of
/// failing: absent inputs are legitimate states, and malformed numeric
/// ranges are normalized defensively.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The boolean path kernel rejected its input.
    #[error("boolean path operation failed")]
    Boolean,
    /// Path data produced by the kernel could not be parsed back.
    #[error("malformed path data from the boolean kernel")]
    PathData,
}
