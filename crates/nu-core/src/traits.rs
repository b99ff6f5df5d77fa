//! Core traits for NuSight
//!
//! The analysis engines never see a storage format. Event records and
//! cross-section tables arrive through these two traits, so the decoding
//! layer can be swapped without touching the physics.

use crate::types::{CrossSectionCurve, EventRecord};
use crate::Result;

/// Finite, indexable sequence of event records.
///
/// `Sync` so that a parallel pass can read disjoint index ranges from
/// several workers.
pub trait EventSource: Send + Sync {
    /// Number of events.
    fn count(&self) -> usize;

    /// Event at `index` (0-based). Out-of-range indices are an error.
    fn get(&self, index: usize) -> Result<EventRecord>;

    /// Sequential iterator over all events.
    fn iter(&self) -> EventIter<'_, Self>
    where
        Self: Sized,
    {
        EventIter { source: self, next: 0 }
    }
}

/// Iterator returned by [`EventSource::iter`].
pub struct EventIter<'a, S: EventSource> {
    source: &'a S,
    next: usize,
}

impl<S: EventSource> Iterator for EventIter<'_, S> {
    type Item = Result<EventRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.source.count() {
            return None;
        }
        let item = self.source.get(self.next);
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.source.count().saturating_sub(self.next);
        (left, Some(left))
    }
}

/// Named cross-section curves grouped by directory (one directory per
/// probe/target combination, e.g. `nu_mu_Ar40`).
pub trait CrossSectionSource: Send + Sync {
    /// Directory names available.
    fn directories(&self) -> Vec<String>;

    /// Curve `channel` in `directory`.
    fn curve(&self, directory: &str, channel: &str) -> Result<CrossSectionCurve>;
}
