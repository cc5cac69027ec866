//! The pending range model shared by the collector and applicator.
//!
//! Collection produces [`RangeEntry`] values describing deferred shadow-memory
//! work and parks them in a [`RangeQueue`]. The queue is a plain FIFO value: it is
//! created fresh for one container cycle, handed from the collector to the
//! applicator by move, and drained from the front until empty. Nothing about it
//! is shared or concurrent.

use std::collections::VecDeque;

/// One unit of deferred shadow-memory work.
///
/// The entry describes a byte range `[address, address + len)` and whether it
/// should become inaccessible or accessible when applied. Entries targeting the
/// same bytes are legal; the applicator's strict FIFO order makes the
/// last-enqueued entry win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeEntry {
    /// Address of the first byte of the range
    pub address: u64,
    /// Length of the range in bytes
    pub len: usize,
    /// `true` to mark the range no-access, `false` to mark it defined
    pub should_poison: bool,
}

impl RangeEntry {
    /// An entry that marks `[address, address + len)` no-access when applied
    #[must_use]
    pub fn poison(address: u64, len: usize) -> Self {
        RangeEntry {
            address,
            len,
            should_poison: true,
        }
    }

    /// An entry that marks `[address, address + len)` defined when applied
    #[must_use]
    pub fn unpoison(address: u64, len: usize) -> Self {
        RangeEntry {
            address,
            len,
            should_poison: false,
        }
    }
}

/// FIFO queue of pending range entries for one container cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RangeQueue {
    entries: VecDeque<RangeEntry>,
}

impl RangeQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        RangeQueue {
            entries: VecDeque::new(),
        }
    }

    /// Append an entry at the back of the queue.
    pub fn push(&mut self, entry: RangeEntry) {
        self.entries.push_back(entry);
    }

    /// Remove and return the oldest entry, or `None` when the queue is drained.
    pub fn pop(&mut self) -> Option<RangeEntry> {
        self.entries.pop_front()
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no entries are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate the pending entries in application order without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &RangeEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a RangeQueue {
    type Item = &'a RangeEntry;
    type IntoIter = std::collections::vec_deque::Iter<'a, RangeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
