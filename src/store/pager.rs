//! Bounded windows over the store's current ordering.

use std::iter::FusedIterator;
use std::slice;

use crate::models::Record;

/// Lazy iterator over the titles at positions `[skip, skip + max)` of a table,
/// clamped to its length. It borrows the table, so it is consumed before the
/// next mutation and a fresh call always sees the current ordering.
#[derive(Debug, Clone)]
pub struct Pager<'a> {
    inner: slice::Iter<'a, Record>,
}

impl<'a> Pager<'a> {
    pub fn new(records: &'a [Record], skip: usize, max: usize) -> Self {
        let start = skip.min(records.len());
        let end = skip.saturating_add(max).min(records.len());
        Self {
            inner: records[start..end].iter(),
        }
    }
}

impl<'a> Iterator for Pager<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|record| record.title.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Pager<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|record| record.title.as_str())
    }
}

impl ExactSizeIterator for Pager<'_> {}

impl FusedIterator for Pager<'_> {}

/// Number of pages needed to show `len` entries, never less than one so an
/// empty catalog still renders a first page.
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    len.div_ceil(page_size).max(1)
}
