//! Bounded pass over a stream that remembers a recent window.

use super::stream::Instance;
use crate::error::{DriftError, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of recent instances retained.
pub const DEFAULT_DECAY_HORIZON: usize = 1000;

/// Retained window split into attributes and labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecayDataset {
    /// Attribute rows, oldest first.
    pub x: Vec<Vec<f64>>,
    /// Labels aligned with `x`.
    pub y: Vec<usize>,
}

/// Yields `(features, label)` pairs from an instance source, up to
/// `total_instances`, keeping the last `decay_horizon` of them.
///
/// # Examples
///
/// ```
/// use driftmix::drift::{ConceptDriftStream, StreamLoader};
/// use driftmix::mixture::GaussianMixture;
///
/// let pre = GaussianMixture::new(2, 2, 1, 1).expect("valid");
/// let post = GaussianMixture::new(2, 2, 2, 2).expect("valid");
/// let stream = ConceptDriftStream::from_densities(pre, post, 10, 10, 3).expect("valid");
///
/// let mut loader = StreamLoader::new(stream, 50, 8).expect("valid");
/// assert_eq!(loader.by_ref().count(), 50);
/// assert_eq!(loader.timestamp(), 50);
/// assert_eq!(loader.decay_dataset().x.len(), 8);
/// ```
#[derive(Debug)]
pub struct StreamLoader<I> {
    source: I,
    total_instances: u64,
    decay_horizon: usize,
    window: VecDeque<(Vec<f64>, usize)>,
    timestamp: u64,
}

impl<I: Iterator<Item = Instance>> StreamLoader<I> {
    /// Wrap `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if `decay_horizon` is zero.
    pub fn new(source: I, total_instances: u64, decay_horizon: usize) -> Result<Self> {
        if decay_horizon == 0 {
            return Err(DriftError::invalid("decay_horizon", decay_horizon, ">= 1"));
        }
        Ok(Self {
            source,
            total_instances,
            decay_horizon,
            window: VecDeque::with_capacity(decay_horizon),
            timestamp: 0,
        })
    }

    /// Wrap `source` with [`DEFAULT_DECAY_HORIZON`].
    pub fn with_default_horizon(source: I, total_instances: u64) -> Self {
        Self {
            source,
            total_instances,
            decay_horizon: DEFAULT_DECAY_HORIZON,
            window: VecDeque::with_capacity(DEFAULT_DECAY_HORIZON),
            timestamp: 0,
        }
    }

    /// Instances yielded so far.
    #[must_use]
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Configured number of instances to yield.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.total_instances
    }

    /// Whether the loader is configured to yield nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_instances == 0
    }

    /// Window capacity.
    #[must_use]
    pub fn decay_horizon(&self) -> usize {
        self.decay_horizon
    }

    /// `i`-th retained instance, oldest first.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&(Vec<f64>, usize)> {
        self.window.get(i)
    }

    /// Copy of the retained window.
    #[must_use]
    pub fn decay_dataset(&self) -> DecayDataset {
        let (x, y): (Vec<Vec<f64>>, Vec<usize>) = self.window.iter().cloned().unzip();
        DecayDataset { x, y }
    }

    /// The wrapped source.
    pub fn into_inner(self) -> I {
        self.source
    }
}

impl<I: Iterator<Item = Instance>> Iterator for StreamLoader<I> {
    type Item = (Vec<f64>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.timestamp >= self.total_instances {
            return None;
        }
        let pair = self.source.next()?.into_pair();
        if self.window.len() == self.decay_horizon {
            self.window.pop_front();
        }
        self.window.push_back(pair.clone());
        self.timestamp += 1;
        Some(pair)
    }
}
