//! The range applicator, the FIFO flush of pending work into a memory tool.

use crate::{shadow::MemoryTool, tracking::range::RangeQueue};

/// Apply every pending entry to `tool`, draining the queue front to back.
///
/// Each entry is popped before it is applied, so an interrupted run leaves
/// exactly the unapplied suffix in the queue. Strict enqueue order is what
/// gives overlapping entries their last-write-wins semantics; the applicator
/// itself never reorders, validates, or retries. Applying an already-drained
/// queue does nothing.
///
/// # Examples
///
/// ```rust
/// use dexshadow::{apply_ranges, RangeEntry, RangeQueue, ShadowMemory};
///
/// let mut queue = RangeQueue::new();
/// queue.push(RangeEntry::poison(0x1000, 0x100));
/// queue.push(RangeEntry::unpoison(0x1040, 0x10));
///
/// let mut shadow = ShadowMemory::new();
/// apply_ranges(&mut queue, &mut shadow);
///
/// assert!(queue.is_empty());
/// assert!(shadow.is_defined(0x1040, 0x10));
/// assert!(shadow.is_poisoned(0x1000));
/// ```
pub fn apply_ranges<T: MemoryTool + ?Sized>(queue: &mut RangeQueue, tool: &mut T) {
    while let Some(entry) = queue.pop() {
        if entry.should_poison {
            tool.mark_no_access(entry.address, entry.len);
        } else {
            tool.mark_defined(entry.address, entry.len);
        }
    }
}
