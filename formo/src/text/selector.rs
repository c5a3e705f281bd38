// Copyright 2026 the Formo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-character selection: the selector capability, its combination
//! algebra, and the range selector.

use crate::layer::LayerHandle;

/// How a selector's factor folds into the running combination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectorMode {
    #[default]
    Add,
    Subtract,
    Intersect,
    Min,
    Max,
    /// Absolute difference.
    Difference,
}

/// A per-character weighting function.
///
/// Implementations return a raw factor for a character index; the
/// modifier folds all of its selectors left-to-right with
/// [`combined_factor`].
pub trait TextSelector: std::fmt::Debug {
    /// Selection factor for the character at `index` of `total`.
    fn factor(&self, index: usize, total: usize) -> f64;

    fn mode(&self) -> SelectorMode {
        SelectorMode::Add
    }

    /// Weight multiplier applied to the raw factor.
    fn weight(&self) -> f64 {
        1.0
    }

    fn attach(&mut self, _layer: &LayerHandle) {}

    fn detach(&mut self) {}
}

/// Folds the selectors' factors for one character, left to right.
///
/// The running total starts from the first selector's weighted factor,
/// or from zero if the first selector is subtractive. The result is
/// clamped to [-1, 1]; an empty selector list selects fully.
pub fn combined_factor(
    selectors: &[Box<dyn TextSelector>],
    index: usize,
    total: usize,
) -> f64 {
    let Some(first) = selectors.first() else {
        return 1.0;
    };
    let mut combined = if first.mode() == SelectorMode::Subtract {
        0.0
    } else {
        first.factor(index, total) * first.weight()
    };
    for selector in &selectors[1..] {
        let f = selector.factor(index, total) * selector.weight();
        combined = match selector.mode() {
            SelectorMode::Add => combined + f,
            SelectorMode::Subtract => {
                if f >= 0.0 {
                    combined * (1.0 - f)
                } else {
                    combined * (-1.0 - f)
                }
            }
            SelectorMode::Intersect => combined * f,
            SelectorMode::Min => combined.min(f),
            SelectorMode::Max => combined.max(f),
            SelectorMode::Difference => (combined - f).abs(),
        };
    }
    combined.clamp(-1.0, 1.0)
}

/// Units for a range selector's start/end/offset values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RangeUnits {
    /// Character indices.
    #[default]
    Index,
    /// Percentage of the run, 0-100.
    Percent,
}

/// The falloff shape of a range selector's window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectorShape {
    #[default]
    Square,
    RampUp,
    RampDown,
    Triangle,
    /// Circular falloff.
    Round,
    /// Cubic ease.
    Smooth,
}

/// Selects a window of characters with a falloff shape, optional edge
/// easing, and an optional seeded randomization of processing order.
#[derive(Clone, Debug)]
pub struct RangeSelector {
    units: RangeUnits,
    shape: SelectorShape,
    mode: SelectorMode,
    start: f64,
    end: f64,
    offset: f64,
    ease_in: f64,
    ease_out: f64,
    weight: f64,
    random_seed: Option<u64>,
    layer: Option<LayerHandle>,
}

impl Default for RangeSelector {
    fn default() -> Self {
        Self {
            units: RangeUnits::Percent,
            shape: SelectorShape::Square,
            mode: SelectorMode::Add,
            start: 0.0,
            end: 100.0,
            offset: 0.0,
            ease_in: 0.0,
            ease_out: 0.0,
            weight: 1.0,
            random_seed: None,
            layer: None,
        }
    }
}

impl RangeSelector {
    pub fn new(units: RangeUnits, start: f64, end: f64) -> Self {
        Self {
            units,
            start,
            end,
            ..Self::default()
        }
    }

    pub fn set_start(&mut self, start: f64) {
        self.start = start;
        self.invalidate();
    }

    pub fn set_end(&mut self, end: f64) {
        self.end = end;
        self.invalidate();
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
        self.invalidate();
    }

    pub fn set_shape(&mut self, shape: SelectorShape) {
        self.shape = shape;
        self.invalidate();
    }

    pub fn set_mode(&mut self, mode: SelectorMode) {
        self.mode = mode;
        self.invalidate();
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
        self.invalidate();
    }

    /// Edge easing, both in [0, 1].
    pub fn set_easing(&mut self, ease_in: f64, ease_out: f64) {
        self.ease_in = ease_in.clamp(0.0, 1.0);
        self.ease_out = ease_out.clamp(0.0, 1.0);
        self.invalidate();
    }

    /// Randomizes which characters the window reaches first. The
    /// permutation is stable for a given seed and character count.
    pub fn set_random_seed(&mut self, seed: Option<u64>) {
        self.random_seed = seed;
        self.invalidate();
    }

    fn invalidate(&self) {
        if let Some(layer) = &self.layer {
            layer.invalidate();
        }
    }

    /// Normalized window over the run, after offset.
    fn window(&self, total: usize) -> (f64, f64) {
        let scale = match self.units {
            RangeUnits::Index => total.max(1) as f64,
            RangeUnits::Percent => 100.0,
        };
        let s = (self.start + self.offset) / scale;
        let e = (self.end + self.offset) / scale;
        (s.min(e), s.max(e))
    }
}

impl TextSelector for RangeSelector {
    fn factor(&self, index: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let index = match self.random_seed {
            Some(seed) => stable_permutation(seed, total)[index.min(total - 1)],
            None => index,
        };
        let p = (index as f64 + 0.5) / total as f64;
        let (s, e) = self.window(total);
        if e - s <= 0.0 {
            return 0.0;
        }
        let mid = (s + e) * 0.5;
        let half = (e - s) * 0.5;
        let raw = match self.shape {
            SelectorShape::Square => {
                if p >= s && p < e {
                    1.0
                } else {
                    0.0
                }
            }
            SelectorShape::RampUp => ((p - s) / (e - s)).clamp(0.0, 1.0),
            SelectorShape::RampDown => (1.0 - (p - s) / (e - s)).clamp(0.0, 1.0),
            SelectorShape::Triangle => (1.0 - ((p - mid) / half).abs()).max(0.0),
            SelectorShape::Round => {
                let t = ((p - mid) / half).abs();
                if t < 1.0 {
                    (1.0 - t * t).sqrt()
                } else {
                    0.0
                }
            }
            SelectorShape::Smooth => {
                let t = 1.0 - ((p - mid) / half).abs();
                if t > 0.0 {
                    t * t * (3.0 - 2.0 * t)
                } else {
                    0.0
                }
            }
        };
        self.soften(raw, p, mid)
    }

    fn mode(&self) -> SelectorMode {
        self.mode
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn attach(&mut self, layer: &LayerHandle) {
        self.layer = Some(layer.clone());
    }

    fn detach(&mut self) {
        self.layer = None;
    }
}

impl RangeSelector {
    /// Blends the raw factor toward its smoothstepped value on the
    /// entering (ease-in) and leaving (ease-out) side of the window.
    fn soften(&self, raw: f64, p: f64, mid: f64) -> f64 {
        let ease = if p < mid { self.ease_in } else { self.ease_out };
        if ease <= 0.0 {
            return raw;
        }
        let smooth = raw * raw * (3.0 - 2.0 * raw);
        raw + (smooth - raw) * ease
    }
}

/// A stable pseudo-random permutation of `0..n`, keyed by `seed`.
pub(crate) fn stable_permutation(seed: u64, n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    let mut state = seed ^ 0x9e37_79b9_7f4a_7c15;
    for i in (1..n).rev() {
        let j = (splitmix64(&mut state) % (i as u64 + 1)) as usize;
        order.swap(i, j);
    }
    order
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
