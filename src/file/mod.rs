//! File abstraction and raw data access for DEX containers.
//!
//! This module provides the data-access foundation for parsing DEX files. It abstracts over
//! different data sources (disk files, memory buffers) and provides bounds-checked access to
//! the raw bytes that the higher-level [`crate::dex`] structures are decoded from.
//!
//! # Architecture
//!
//! The module is built around a small set of components that work together:
//!
//! - **Backend system** - Pluggable data sources (disk files, memory buffers)
//! - **Cursor parsing** - Sequential decoding of DEX structures and encodings
//! - **Primitive I/O** - Endian-aware reading and writing of fixed-width values
//!
//! # Key Components
//!
//! ## Core Types
//! - [`crate::file::Backend`] - Trait for different data sources (disk files, memory buffers)
//!
//! ## Parsing Infrastructure
//! - [`crate::file::parser::Parser`] - Cursor-based parsing interface for DEX structures
//! - [`crate::file::io`] - Low-level I/O utilities for reading and writing primitives
//!
//! ## Backend Implementations
//! - [`crate::file::Physical`] - Memory-mapped file backend for disk access
//! - [`crate::file::Memory`] - In-memory buffer backend for already-loaded data
//!
//! # Data Sources
//!
//! The module supports multiple data sources through the [`crate::file::Backend`] trait:
//! - **Physical files** - Memory-mapped files for efficient disk access
//! - **Memory buffers** - In-memory DEX data, for example extracted from an APK in memory
//!
//! # Examples
//!
//! ```rust,no_run
//! use dexshadow::file::{Backend, Memory};
//!
//! let memory = Memory::new(vec![0x64, 0x65, 0x78, 0x0A]);
//! assert_eq!(memory.len(), 4);
//! assert_eq!(memory.data_slice(0, 3)?, b"dex");
//! # Ok::<(), dexshadow::Error>(())
//! ```
//!
//! # Integration
//!
//! This module integrates with:
//! - [`crate::dex`] - Uses backends and the parser for container decoding
//! - [`crate::builder`] - Uses the I/O utilities for container generation
//!
//! The file module provides low-level data access. For high-level container analysis, use the
//! [`DexFile`](crate::DexFile) interface which builds upon these primitives.
//!
//! # Thread Safety
//!
//! All components are designed to be thread-safe and can be shared across threads
//! for concurrent analysis of the same container.
//!
//! # References
//!
//! - Dalvik Executable format, Android Open Source Project

pub mod io;
pub mod parser;

mod memory;
mod physical;

pub use memory::Memory;
pub use physical::Physical;

use crate::Result;

/// Backend trait for file data sources.
///
/// This trait abstracts over the source of DEX data, allowing for both in-memory and on-disk
/// representations. All implementations must be thread-safe.
///
/// The trait provides a common interface for accessing container data regardless of whether
/// it's loaded from a file on disk or from a memory buffer. This enables flexible handling
/// of different data sources while maintaining performance.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// This method provides bounds-checked access to the underlying data.
    /// It's used internally by [`DexFile`](crate::DexFile) to safely read
    /// portions of the container data.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    ///
    /// This provides access to the complete container data as a single slice.
    /// For file-based backends, this typically maps the entire file into memory.
    /// For memory-based backends, this returns the underlying buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    ///
    /// This is equivalent to `self.data().len()` but may be more efficient
    /// for some backend implementations.
    fn len(&self) -> usize;
}
