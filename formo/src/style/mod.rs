// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint styles: elements that record painters over the accumulated
//! geometries.

mod fill;
mod stroke;

pub use fill::FillStyle;
pub use stroke::StrokeStyle;

use peniko::{Brush, Color, Gradient};

use crate::layer::LayerHandle;

/// A resolvable color source shared by fill and stroke styles.
///
/// Attachment propagates here so externally driven invalidation (an
/// animated color) reaches the owning layer.
#[derive(Clone, Debug)]
pub struct ColorSource {
    kind: ColorKind,
    layer: Option<LayerHandle>,
}

#[derive(Clone, Debug)]
enum ColorKind {
    Solid(Color),
    Gradient(Gradient),
}

impl ColorSource {
    pub fn solid(color: Color) -> Self {
        Self {
            kind: ColorKind::Solid(color),
            layer: None,
        }
    }

    pub fn gradient(gradient: Gradient) -> Self {
        Self {
            kind: ColorKind::Gradient(gradient),
            layer: None,
        }
    }

    pub fn set_color(&mut self, color: Color) {
        self.kind = ColorKind::Solid(color);
        self.invalidate();
    }

    pub fn set_gradient(&mut self, gradient: Gradient) {
        self.kind = ColorKind::Gradient(gradient);
        self.invalidate();
    }

    /// Resolves to a paint shader.
    pub fn brush(&self) -> Brush {
        match &self.kind {
            ColorKind::Solid(color) => Brush::Solid(*color),
            ColorKind::Gradient(gradient) => Brush::Gradient(gradient.clone()),
        }
    }

    fn invalidate(&self) {
        if let Some(layer) = &self.layer {
            layer.invalidate();
        }
    }

    pub(crate) fn attach(&mut self, layer: &LayerHandle) {
        self.layer = Some(layer.clone());
    }

    pub(crate) fn detach(&mut self) {
        self.layer = None;
    }
}

impl From<Color> for ColorSource {
    fn from(color: Color) -> Self {
        Self::solid(color)
    }
}

impl From<Gradient> for ColorSource {
    fn from(gradient: Gradient) -> Self {
        Self::gradient(gradient)
    }
}
