//! Aggregation of multi-line reply bursts.
//!
//! A burst is a run of numbered replies closed by an end marker, such as
//! RPL_NAMREPLY lines closed by RPL_ENDOFNAMES. [`Burst`] buffers the
//! per-line items and hands them back as one batch when the marker arrives.

use std::mem;

/// Aggregation state for one burst family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Burst<T> {
    /// No burst in progress.
    Idle,
    /// Buffering items until the end marker.
    Collecting(Vec<T>),
}

impl<T> Default for Burst<T> {
    fn default() -> Self {
        Burst::Idle
    }
}

impl<T> Burst<T> {
    pub fn new() -> Self {
        Burst::Idle
    }

    /// Buffer one reply line, starting a burst if none is in progress.
    pub fn push(&mut self, item: T) {
        match self {
            Burst::Idle => *self = Burst::Collecting(vec![item]),
            Burst::Collecting(items) => items.push(item),
        }
    }

    /// Close the burst on its end marker.
    ///
    /// Returns the buffered items in arrival order, or `None` when nothing
    /// was buffered: an empty burst produces no aggregate.
    pub fn finish(&mut self) -> Option<Vec<T>> {
        match mem::take(self) {
            Burst::Collecting(items) if !items.is_empty() => Some(items),
            _ => None,
        }
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self, Burst::Collecting(_))
    }
}
