//! Predicate recording for step-by-step visualization
//!
//! [`Recorder`] wraps a region predicate and keeps every rectangle it was
//! asked about, whether it merged, and the value that paints it: the merged
//! value when accepted, the predicate's
//! [`representative`](RegionPredicate::representative) otherwise. Grouped by
//! square size, the evaluations replay a bulk build coarse-to-fine, one
//! frame per level.
//!
//! Recording is explicit state of the wrapper value; the wrapped predicate
//! and the tree are unaware of it.

use crate::predicate::RegionPredicate;
use crate::raster::{Raster, Sample};
use crate::rect::{Quad, Rect};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// One recorded predicate call
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation<V> {
    /// Evaluated square and the value that paints it
    pub quad: Quad<V>,
    /// Whether the square collapsed into a leaf
    pub accepted: bool,
}

/// Evaluations of one square size
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<V> {
    /// Side length of every square in this frame
    pub size: u32,
    /// Evaluated squares, sorted by `(y_min, x_min)`
    pub evaluations: Vec<Evaluation<V>>,
}

/// Region predicate wrapper that records every evaluation
///
/// Safe to share across the parallel build tasks.
#[derive(Debug)]
pub struct Recorder<P, V> {
    inner: P,
    evaluations: Mutex<BTreeMap<u32, Vec<Evaluation<V>>>>,
}

impl<P, V> Recorder<P, V> {
    /// Wrap a predicate
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            evaluations: Mutex::new(BTreeMap::new()),
        }
    }

    /// Get the wrapped predicate
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of evaluations recorded so far
    pub fn len(&self) -> usize {
        self.evaluations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Check if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, evaluation: Evaluation<V>) {
        let size = evaluation.quad.x_max - evaluation.quad.x_min;
        let mut evaluations = self
            .evaluations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        evaluations.entry(size).or_default().push(evaluation);
    }

    /// Consume the recorder, returning frames from the largest size down
    pub fn into_frames(self) -> Vec<Frame<V>> {
        let evaluations = self
            .evaluations
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        evaluations
            .into_iter()
            .rev()
            .map(|(size, mut evaluations)| {
                evaluations.sort_by_key(|e| (e.quad.y_min, e.quad.x_min));
                Frame { size, evaluations }
            })
            .collect()
    }
}

impl<T, V, P> RegionPredicate<T, V> for Recorder<P, V>
where
    T: Sample,
    V: Clone,
    P: RegionPredicate<T, V>,
{
    fn evaluate(&self, raster: &Raster<T>, rect: Rect) -> Option<V> {
        let result = self.inner.evaluate(raster, rect);
        let evaluation = match &result {
            Some(value) => Evaluation {
                quad: Quad::new(rect, Some(value.clone())),
                accepted: true,
            },
            None => Evaluation {
                quad: Quad::new(rect, self.inner.representative(raster, rect)),
                accepted: false,
            },
        };
        self.record(evaluation);
        result
    }

    fn cell_value(&self, raster: &Raster<T>, x: u32, y: u32) -> Option<V> {
        self.inner.cell_value(raster, x, y)
    }

    fn representative(&self, raster: &Raster<T>, rect: Rect) -> Option<V> {
        self.inner.representative(raster, rect)
    }
}
