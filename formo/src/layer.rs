// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The owning-layer surface: content invalidation and the root walk.

use std::cell::Cell;
use std::rc::Rc;

use peniko::kurbo::Affine;

use crate::context::EvaluationContext;
use crate::element::Element;
use crate::sink::DrawSink;

/// Shared handle to an owning layer's invalidation state.
///
/// Every property setter in the tree reports through this handle so the
/// layer knows its content must be rebuilt. Clones share one flag.
/// Evaluation is single-threaded by design; setters run between
/// evaluation passes, never concurrently with one.
#[derive(Clone, Debug, Default)]
pub struct LayerHandle {
    state: Rc<LayerState>,
}

#[derive(Debug, Default)]
struct LayerState {
    content_dirty: Cell<bool>,
}

impl LayerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the layer's content as needing a rebuild.
    pub fn invalidate(&self) {
        self.state.content_dirty.set(true);
    }

    pub fn is_dirty(&self) -> bool {
        self.state.content_dirty.get()
    }

    pub fn clear_dirty(&self) {
        self.state.content_dirty.set(false);
    }

    /// Whether two handles refer to the same layer.
    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

/// Attachment state shared by every element variant.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    enabled: bool,
    layer: Option<LayerHandle>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            enabled: true,
            layer: None,
        }
    }
}

impl Node {
    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.invalidate();
    }

    pub(crate) fn invalidate(&self) {
        if let Some(layer) = &self.layer {
            layer.invalidate();
        }
    }

    pub(crate) fn attach(&mut self, layer: &LayerHandle) {
        // Repeated attach of the same layer is idempotent.
        if self.layer.as_ref().is_some_and(|l| l.same(layer)) {
            return;
        }
        self.layer = Some(layer.clone());
    }

    pub(crate) fn detach(&mut self) {
        self.layer = None;
    }

    pub(crate) fn layer(&self) -> Option<&LayerHandle> {
        self.layer.as_ref()
    }
}

/// The root of one shape tree: an ordered element list owned by a
/// layer, evaluated and drawn as a unit.
#[derive(Debug, Default)]
pub struct ShapeLayer {
    handle: LayerHandle,
    elements: Vec<Element>,
}

impl ShapeLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The invalidation handle shared with every attached element.
    pub fn handle(&self) -> &LayerHandle {
        &self.handle
    }

    /// Appends an element, attaching it (and its nested color sources
    /// and selectors) to this layer.
    pub fn push(&mut self, element: impl Into<Element>) {
        let mut element = element.into();
        element.attach(&self.handle);
        self.handle.invalidate();
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.elements.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Runs one full evaluate-then-draw pass: walks the element list in
    /// order against a fresh context, then resolves every accumulated
    /// painter, in accumulation order, into `sink`.
    pub fn render(&mut self, transform: Affine, alpha: f32, sink: &mut impl DrawSink) {
        let mut ctx = EvaluationContext::new();
        for element in &mut self.elements {
            element.apply(&mut ctx);
        }
        ctx.draw(transform, alpha, sink);
        self.handle.clear_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_dirty_roundtrip() {
        let handle = LayerHandle::new();
        assert!(!handle.is_dirty());
        handle.invalidate();
        assert!(handle.is_dirty());
        handle.clear_dirty();
        assert!(!handle.is_dirty());
    }

    #[test]
    fn clones_share_state() {
        let a = LayerHandle::new();
        let b = a.clone();
        b.invalidate();
        assert!(a.is_dirty());
        assert!(a.same(&b));
        assert!(!a.same(&LayerHandle::new()));
    }

    #[test]
    fn node_defaults_enabled_and_detached() {
        let node = Node::default();
        assert!(node.enabled());
        assert!(node.layer().is_none());
    }
}
