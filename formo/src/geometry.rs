// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable geometry: a path shape or text content, with lazy, cached
//! conversion between the two representations.

use peniko::kurbo::{BezPath, Ellipse, Rect, RoundedRect, Shape};
use peniko::Fill;

use crate::text::{GlyphRecord, TextRun};

/// Flattening tolerance when a typed primitive must become a path.
pub(crate) const SHAPE_TOLERANCE: f64 = 0.01;

/// The path-shape representation of a geometry.
///
/// Unmodified primitives keep their typed form so the draw sink
/// receives them as primitives; any path modifier collapses the source
/// to `Path`.
#[derive(Clone, Debug)]
pub enum ShapeSource {
    Rect(Rect),
    RoundedRect(RoundedRect),
    Ellipse(Ellipse),
    Path(BezPath),
}

impl ShapeSource {
    /// The source as a Bézier path.
    pub fn to_bez(&self, tolerance: f64) -> BezPath {
        match self {
            Self::Rect(r) => r.to_path(tolerance),
            Self::RoundedRect(r) => r.to_path(tolerance),
            Self::Ellipse(e) => e.to_path(tolerance),
            Self::Path(p) => p.clone(),
        }
    }
}

/// A drawable unit: at most one of a path shape or text content, plus
/// an optional expanded set of individually addressable glyphs.
///
/// Exactly one canonical representation is authoritative at a time.
/// Querying the path of a text geometry converts once and caches;
/// path-to-text is never meaningful and never happens. Mutating the
/// path clears the text identity.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    shape: Option<ShapeSource>,
    text: Option<TextRun>,
    glyphs: Option<Vec<GlyphRecord>>,
    fill: Option<Fill>,
}

impl Geometry {
    pub fn from_shape(shape: ShapeSource) -> Self {
        Self {
            shape: Some(shape),
            ..Self::default()
        }
    }

    pub fn from_path(path: BezPath) -> Self {
        Self::from_shape(ShapeSource::Path(path))
    }

    pub fn from_text(run: TextRun) -> Self {
        Self {
            text: Some(run),
            ..Self::default()
        }
    }

    /// True when the geometry carries text content, shaped or expanded.
    pub fn has_text(&self) -> bool {
        self.text.is_some() || self.glyphs.is_some()
    }

    /// The unconverted text run, if the geometry still has one.
    pub fn text_run(&self) -> Option<&TextRun> {
        self.text.as_ref()
    }

    /// The path representation, converting (and caching) from text on
    /// first use. Text conversion flattens every glyph outline into one
    /// path; outline-less glyphs are skipped.
    pub fn shape(&mut self) -> Option<&ShapeSource> {
        if self.shape.is_none() {
            let path = if let Some(records) = &self.glyphs {
                let mut out = BezPath::new();
                for record in records {
                    if let Some(outline) = record.outline() {
                        out.extend(record.transform * outline);
                    }
                }
                out
            } else if let Some(run) = &self.text {
                run.to_path()
            } else {
                return None;
            };
            self.shape = Some(ShapeSource::Path(path));
        }
        self.shape.as_ref()
    }

    /// The path representation as a mutable Bézier path. This commits
    /// the geometry to its path identity: text content is dropped, and
    /// a typed primitive is rewritten as a free path.
    pub fn shape_path_mut(&mut self) -> Option<&mut BezPath> {
        self.shape()?;
        self.text = None;
        self.glyphs = None;
        let source = self.shape.take()?;
        let path = match source {
            ShapeSource::Path(p) => p,
            other => other.to_bez(SHAPE_TOLERANCE),
        };
        self.shape = Some(ShapeSource::Path(path));
        match self.shape.as_mut() {
            Some(ShapeSource::Path(p)) => Some(p),
            _ => None,
        }
    }

    /// Replaces the shape outright, clearing any text identity.
    pub fn set_shape_path(&mut self, path: BezPath) {
        self.shape = Some(ShapeSource::Path(path));
        self.text = None;
        self.glyphs = None;
    }

    /// Expanded glyph records, expanding lazily from the text run on
    /// first use. `None` for geometries without text.
    pub fn glyphs_mut(&mut self) -> Option<&mut Vec<GlyphRecord>> {
        if self.glyphs.is_none() {
            let run = self.text.as_ref()?;
            let records = run
                .glyphs
                .iter()
                .map(|&glyph| GlyphRecord::from_shaped(glyph, &run.font, run.font_size))
                .collect();
            self.glyphs = Some(records);
            // A cached conversion of the unexpanded run is now stale.
            self.shape = None;
        }
        self.glyphs.as_mut()
    }

    pub fn glyph_records(&self) -> Option<&[GlyphRecord]> {
        self.glyphs.as_deref()
    }

    /// Explicit fill rule, if one was set by a boolean merge.
    pub fn fill(&self) -> Option<Fill> {
        self.fill
    }

    pub fn set_fill(&mut self, fill: Fill) {
        self.fill = Some(fill);
    }
}
