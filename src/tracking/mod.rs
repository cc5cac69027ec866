//! Access tracking for loaded DEX containers.
//!
//! This module turns a parsed [`crate::DexFile`] into shadow-memory protection
//! state in two decoupled phases:
//!
//! 1. **Collection** - [`collect_ranges`] walks the container according to a
//!    [`TrackingConfig`] and records every byte range that should change
//!    protection state as a [`RangeEntry`] in a [`RangeQueue`]. No memory is
//!    touched during this phase.
//! 2. **Application** - [`apply_ranges`] drains the queue in FIFO order and
//!    forwards each entry to a [`crate::MemoryTool`] implementation.
//!
//! Keeping the phases separate means the traversal logic can be tested without
//! a real memory backend, and entries for overlapping ranges resolve by queue
//! order alone: whatever was enqueued last decides the final protection state
//! of a byte.
//!
//! [`register_dex_file`] and [`TrackingRegistrar`] tie both phases together
//! for callers that just want "track this container with this policy".
//!
//! # Examples
//!
//! ```rust,no_run
//! use dexshadow::{register_dex_file, DexFile, ShadowMemory, TrackingConfig};
//!
//! # fn example() -> dexshadow::Result<()> {
//! let dex = DexFile::from_file("classes.dex")?;
//! let config = TrackingConfig::code_items_except_insns();
//! let mut shadow = ShadowMemory::new();
//!
//! register_dex_file(Some(&dex), &config, &mut shadow)?;
//! # Ok(())
//! # }
//! ```

mod applicator;
mod collector;
mod policy;
mod range;
mod registrar;

pub use applicator::apply_ranges;
pub use collector::{collect_ranges, RangeCollector};
pub use policy::{TrackingConfig, TrackingPolicy, DEFAULT_EXEMPT_METHOD};
pub use range::{RangeEntry, RangeQueue};
pub use registrar::{register_dex_file, TrackingRegistrar};
