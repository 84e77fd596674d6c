//! Fixed-capacity FIFO window over recent samples.
//!
//! Index 0 is the most recently added sample; index `len - 1` the oldest.
//! Adding to a full window evicts the oldest sample first.

use std::collections::VecDeque;
use std::ops::Index;

#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow<T> {
    capacity: usize,
    samples: VecDeque<T>,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, sample: T) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() >= self.capacity {
            self.samples.pop_back();
        }
        self.samples.push_front(sample);
    }

    /// Add samples in chronological order, oldest first.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, samples: I) {
        for sample in samples {
            self.add(sample);
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.capacity > 0 && self.samples.len() == self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.samples.get(index)
    }

    /// Most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }
}

impl<T> Index<usize> for RollingWindow<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.samples[index]
    }
}
