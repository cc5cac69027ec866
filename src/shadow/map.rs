//! A bookkeeping [`MemoryTool`] tracking poisoned ranges in an ordered map.
//!
//! [`ShadowMemory`] records which byte ranges have been marked inaccessible without
//! touching real page permissions or a sanitizer runtime. The map keys are range
//! start addresses and the values their exclusive ends; neighboring entries are
//! always coalesced, so the map holds the minimal set of disjoint ranges and a
//! containment query is a single ordered lookup.
//!
//! This is the backend used by tests and by callers that want to audit what a
//! poisoning pass would do before wiring up a real tool.

use std::collections::BTreeMap;

use crate::shadow::tool::MemoryTool;

/// An ordered map of poisoned byte ranges.
///
/// # Examples
///
/// ```rust
/// use dexshadow::{MemoryTool, ShadowMemory};
///
/// let mut shadow = ShadowMemory::new();
/// shadow.mark_no_access(0x1000, 0x100);
/// shadow.mark_defined(0x1040, 0x10);
///
/// assert!(shadow.is_poisoned(0x1000));
/// assert!(shadow.is_defined(0x1040, 0x10));
/// assert_eq!(shadow.poisoned_len(), 0xF0);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ShadowMemory {
    /// Disjoint poisoned ranges, keyed by start with exclusive end as value
    ranges: BTreeMap<u64, u64>,
}

impl ShadowMemory {
    /// Create an empty shadow map with no poisoned ranges.
    #[must_use]
    pub fn new() -> Self {
        ShadowMemory {
            ranges: BTreeMap::new(),
        }
    }

    /// Returns `true` if the byte at `address` is poisoned.
    #[must_use]
    pub fn is_poisoned(&self, address: u64) -> bool {
        match self.ranges.range(..=address).next_back() {
            Some((_, &end)) => end > address,
            None => false,
        }
    }

    /// Returns `true` if no byte in `[address, address + len)` is poisoned.
    ///
    /// An empty window is always defined.
    #[must_use]
    pub fn is_defined(&self, address: u64, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        let end = address.saturating_add(len as u64);

        if let Some((_, &prev_end)) = self.ranges.range(..=address).next_back() {
            if prev_end > address {
                return false;
            }
        }

        self.ranges.range(address..end).next().is_none()
    }

    /// Iterate the poisoned ranges in address order as `(start, exclusive_end)` pairs.
    pub fn poisoned_ranges(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.ranges.iter().map(|(&start, &end)| (start, end))
    }

    /// Total number of poisoned bytes.
    #[must_use]
    pub fn poisoned_len(&self) -> u64 {
        self.ranges.iter().map(|(&start, &end)| end - start).sum()
    }

    /// Remove all poisoned ranges.
    pub fn clear(&mut self) {
        self.ranges.clear();
    }
}

impl MemoryTool for ShadowMemory {
    fn mark_no_access(&mut self, address: u64, len: usize) {
        if len == 0 {
            return;
        }

        let mut start = address;
        let mut end = address.saturating_add(len as u64);

        // Absorb a predecessor that overlaps or touches the new range
        if let Some((&prev_start, &prev_end)) = self.ranges.range(..=start).next_back() {
            if prev_end >= start {
                start = prev_start;
                end = end.max(prev_end);
                self.ranges.remove(&prev_start);
            }
        }

        // Absorb every successor starting inside or adjacent to the new range
        while let Some((&next_start, &next_end)) = self.ranges.range(start..=end).next() {
            end = end.max(next_end);
            self.ranges.remove(&next_start);
        }

        self.ranges.insert(start, end);
    }

    fn mark_defined(&mut self, address: u64, len: usize) {
        if len == 0 {
            return;
        }

        let start = address;
        let end = address.saturating_add(len as u64);

        // A predecessor spanning into the window gets truncated, and split when
        // it extends past the window's end
        if let Some((&prev_start, &prev_end)) = self.ranges.range(..start).next_back() {
            if prev_end > start {
                self.ranges.insert(prev_start, start);
                if prev_end > end {
                    self.ranges.insert(end, prev_end);
                }
            }
        }

        // Ranges starting inside the window are dropped, keeping any tail that
        // extends past it
        while let Some((&next_start, &next_end)) = self.ranges.range(start..end).next() {
            self.ranges.remove(&next_start);
            if next_end > end {
                self.ranges.insert(end, next_end);
            }
        }
    }
}
