// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text content: shaped runs, per-glyph records, and outline access.

mod modifier;
mod path;
mod selector;

pub use modifier::TextModifier;
pub use path::TextPath;
pub use selector::{
    combined_factor, RangeSelector, RangeUnits, SelectorMode, SelectorShape, TextSelector,
};

use peniko::kurbo::{Affine, BezPath, Point, Rect, Vec2};
use peniko::{Color, Font};
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{FontRef, GlyphId, MetadataProvider};

/// A single positioned glyph in a run.
#[derive(Clone, Copy, Debug, Default)]
pub struct Glyph {
    pub id: u32,
    /// X offset of the baseline origin in run space.
    pub x: f32,
    /// Y offset of the baseline origin in run space.
    pub y: f32,
    /// Advance width, including tracking.
    pub advance: f32,
}

/// A shaped run of glyphs sharing one font and size.
#[derive(Clone, Debug)]
pub struct TextRun {
    pub font: Font,
    pub font_size: f32,
    pub glyphs: Vec<Glyph>,
}

impl TextRun {
    /// Shapes `text` with a simple charmap-and-advance pass.
    ///
    /// Newlines are skipped; line breaking belongs to the owning layer.
    pub fn shape(font: &Font, font_size: f32, tracking: f32, text: &str) -> Self {
        let mut glyphs = Vec::new();
        let Ok(font_ref) = FontRef::from_index(font.data.as_ref(), font.index) else {
            log::warn!("text run not shaped: font data could not be read");
            return Self {
                font: font.clone(),
                font_size,
                glyphs,
            };
        };
        let charmap = font_ref.charmap();
        let glyph_metrics = font_ref.glyph_metrics(Size::new(font_size), LocationRef::default());
        let mut pen_x = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let gid = charmap.map(ch).unwrap_or_default();
            let advance = glyph_metrics.advance_width(gid).unwrap_or_default() + tracking;
            glyphs.push(Glyph {
                id: gid.to_u32(),
                x: pen_x,
                y: 0.0,
                advance,
            });
            pen_x += advance;
        }
        Self {
            font: font.clone(),
            font_size,
            glyphs,
        }
    }

    /// Total advance width of the run.
    pub fn width(&self) -> f32 {
        self.glyphs.iter().map(|g| g.advance).sum()
    }

    /// Bounds from the vertical font metrics and the run's advances.
    pub fn bounds(&self) -> Rect {
        let (ascent, descent) = match FontRef::from_index(self.font.data.as_ref(), self.font.index)
        {
            Ok(font_ref) => {
                let metrics = font_ref.metrics(Size::new(self.font_size), LocationRef::default());
                (metrics.ascent as f64, metrics.descent as f64)
            }
            Err(_) => (self.font_size as f64, 0.0),
        };
        let x0 = self.glyphs.first().map_or(0.0, |g| g.x as f64);
        Rect::new(x0, -ascent, x0 + self.width() as f64, -descent)
    }

    /// Flattens every glyph outline into one path, each translated to
    /// its position. Glyphs without an outline (bitmap or color glyphs)
    /// are skipped.
    pub fn to_path(&self) -> BezPath {
        let mut out = BezPath::new();
        for glyph in &self.glyphs {
            let Some(outline) = glyph_outline(&self.font, self.font_size, glyph.id) else {
                continue;
            };
            let transform = Affine::translate((glyph.x as f64, glyph.y as f64));
            out.extend(transform * outline);
        }
        out
    }
}

/// Extracts a glyph outline scaled to `font_size`, y-down, anchored at
/// the baseline origin. Returns `None` for outline-less glyphs or
/// unreadable fonts.
pub fn glyph_outline(font: &Font, font_size: f32, glyph_id: u32) -> Option<BezPath> {
    let font_ref = FontRef::from_index(font.data.as_ref(), font.index).ok()?;
    let upem = font_ref
        .metrics(Size::unscaled(), LocationRef::default())
        .units_per_em as f64;
    if upem <= 0.0 {
        return None;
    }
    let outline = font_ref
        .outline_glyphs()
        .get(GlyphId::new((glyph_id as u16).into()))?;
    let mut pen = BezPathPen::default();
    outline
        .draw(
            DrawSettings::unhinted(Size::unscaled(), LocationRef::default()),
            &mut pen,
        )
        .ok()?;
    // Glyph space is y-up; flip while scaling to pixels.
    let scale = font_size as f64 / upem;
    Some(Affine::scale_non_uniform(scale, -scale) * pen.0)
}

#[derive(Default)]
struct BezPathPen(BezPath);

impl OutlinePen for BezPathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(Point::new(x.into(), y.into()));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(Point::new(x.into(), y.into()));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.0.quad_to(
            Point::new(cx0.into(), cy0.into()),
            Point::new(x.into(), y.into()),
        );
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.0.curve_to(
            Point::new(cx0.into(), cy0.into()),
            Point::new(cx1.into(), cy1.into()),
            Point::new(x.into(), y.into()),
        );
    }

    fn close(&mut self) {
        self.0.close_path();
    }
}

/// A color target blended toward by a normalized amount, composited
/// with straight alpha.
#[derive(Clone, Copy, Debug)]
pub struct ColorBlend {
    pub color: Color,
    pub amount: f32,
}

impl ColorBlend {
    /// Resolves the blend over a base color.
    pub fn over(self, base: Color) -> Color {
        mix(base, self.color, self.amount)
    }

    /// Folds a further blend step onto an accumulated one.
    pub fn accumulate(current: Option<Self>, color: Color, amount: f32) -> Option<Self> {
        let amount = amount.clamp(0.0, 1.0);
        if amount <= 0.0 {
            return current;
        }
        match current {
            None => Some(Self { color, amount }),
            Some(prev) => {
                let total = amount + prev.amount * (1.0 - amount);
                if total <= 0.0 {
                    return None;
                }
                // Weighted mix of the two targets, normalized so the
                // resolved result matches sequential compositing.
                let w = amount / total;
                Some(Self {
                    color: mix(prev.color, color, w),
                    amount: total,
                })
            }
        }
    }
}

pub(crate) fn mix(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let lerp = |x: u8, y: u8| -> u8 {
        (x as f32 + (y as f32 - x as f32) * t).round().clamp(0.0, 255.0) as u8
    };
    Color::rgba8(
        lerp(a.r, b.r),
        lerp(a.g, b.g),
        lerp(a.b, b.b),
        lerp(a.a, b.a),
    )
}

/// A stroke-width target blended toward by a normalized amount.
#[derive(Clone, Copy, Debug)]
pub struct WidthBlend {
    pub width: f64,
    pub amount: f64,
}

impl WidthBlend {
    pub fn over(self, base: f64) -> f64 {
        base + (self.width - base) * self.amount.clamp(0.0, 1.0)
    }

    pub fn accumulate(current: Option<Self>, width: f64, amount: f64) -> Option<Self> {
        let amount = amount.clamp(0.0, 1.0);
        if amount <= 0.0 {
            return current;
        }
        match current {
            None => Some(Self { width, amount }),
            Some(prev) => {
                let total = amount + prev.amount * (1.0 - amount);
                if total <= 0.0 {
                    return None;
                }
                let w = amount / total;
                Some(Self {
                    width: prev.width + (width - prev.width) * w,
                    amount: total,
                })
            }
        }
    }
}

/// Per-glyph paint overrides accumulated by text modifiers.
#[derive(Clone, Debug)]
pub struct GlyphStyle {
    /// Multiplies the painter's alpha.
    pub alpha: f32,
    pub fill: Option<ColorBlend>,
    pub stroke: Option<ColorBlend>,
    pub stroke_width: Option<WidthBlend>,
}

impl Default for GlyphStyle {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            fill: None,
            stroke: None,
            stroke_width: None,
        }
    }
}

/// One expanded, individually addressable glyph.
///
/// `transform` maps glyph-local space (baseline origin at zero) into
/// run space; on expansion it is the pure translation to the glyph's
/// shaped position.
#[derive(Clone, Debug)]
pub struct GlyphRecord {
    pub glyph: Glyph,
    pub font: Font,
    pub font_size: f32,
    /// Original shaped baseline position in run space.
    pub origin: Point,
    /// Extra per-glyph anchor offset on top of the half-advance default.
    pub anchor: Vec2,
    pub transform: Affine,
    pub style: GlyphStyle,
}

impl GlyphRecord {
    pub(crate) fn from_shaped(glyph: Glyph, font: &Font, font_size: f32) -> Self {
        let origin = Point::new(glyph.x as f64, glyph.y as f64);
        Self {
            glyph: Glyph {
                x: 0.0,
                y: 0.0,
                ..glyph
            },
            font: font.clone(),
            font_size,
            origin,
            anchor: Vec2::ZERO,
            transform: Affine::translate(origin.to_vec2()),
            style: GlyphStyle::default(),
        }
    }

    /// The glyph's outline in glyph-local space.
    pub fn outline(&self) -> Option<BezPath> {
        glyph_outline(&self.font, self.font_size, self.glyph.id)
    }
}
