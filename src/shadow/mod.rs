//! Memory access control backends.
//!
//! The poisoning passes in [`crate::tracking`] compute which byte ranges of a
//! container should become inaccessible; this module defines where those decisions
//! land. [`MemoryTool`] is the seam a real sanitizer runtime plugs into, and
//! [`ShadowMemory`] is the built-in bookkeeping backend that records ranges in an
//! ordered map for queries and tests.
//!
//! # Usage Examples
//!
//! ```rust
//! use dexshadow::{MemoryTool, ShadowMemory};
//!
//! let mut shadow = ShadowMemory::new();
//! shadow.mark_no_access(0x7000, 0x1000);
//! assert!(!shadow.is_defined(0x7800, 0x10));
//! ```

mod map;
mod tool;

pub use map::ShadowMemory;
pub use tool::MemoryTool;
