// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
//#![deny(unsafe_code)]
// - 'file/io.rs' uses a raw-parts view for writing primitives into byte buffers
// - 'file/physical.rs' uses mmap to map a file into memory

//! # dexshadow
//!
//! [![Crates.io](https://img.shields.io/crates/v/dexshadow.svg)](https://crates.io/crates/dexshadow)
//! [![Documentation](https://docs.rs/dexshadow/badge.svg)](https://docs.rs/dexshadow)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/dexshadow/dexshadow/blob/main/LICENSE-APACHE)
//!
//! A cross-platform library for byte-granular access tracking of Android DEX containers.
//! Built in pure Rust, `dexshadow` parses the structural spine of a DEX file (header, class
//! definitions, class data, code items), computes which byte ranges of the loaded container
//! should be reachable under a configurable policy, and drives those decisions into a
//! shadow-memory backend, all without requiring a device or the Android runtime.
//!
//! ## Features
//!
//! - **📦 Efficient memory access** - Memory-mapped container access with minimal allocations and reference-based parsing
//! - **🔍 Structural DEX parsing** - Headers, class definitions, member lists and code item extents
//! - **🎯 Policy-driven tracking** - Five marking policies, from sealing the whole file down to sparing instruction arrays
//! - **🔧 Cross-platform** - Works on Windows, Linux, macOS, and any Rust-supported platform
//! - **🛡️ Memory safe** - Built in Rust with comprehensive error handling
//! - **🧩 Extensible architecture** - Pluggable memory backends and composable marking passes
//!
//! ## Quick Start
//!
//! Add `dexshadow` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! dexshadow = "0.2"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust,no_run
//! use dexshadow::prelude::*;
//!
//! // Load a container and seal its code items
//! let dex = DexFile::from_file("classes.dex")?;
//! let mut shadow = ShadowMemory::new();
//! register_dex_file(Some(&dex), &TrackingConfig::code_items(), &mut shadow)?;
//! println!("{} bytes poisoned", shadow.poisoned_len());
//! # Ok::<(), dexshadow::Error>(())
//! ```
//!
//! ### Basic Usage
//!
//! ```rust,no_run
//! use dexshadow::DexFile;
//!
//! // Load and parse a DEX container
//! let dex = DexFile::from_file("classes.dex")?;
//!
//! // Walk its classes and method bodies
//! for class in dex.class_defs() {
//!     println!("class {}", dex.type_descriptor(class.class_idx)?);
//!     let Some(class_data) = &class.class_data else { continue };
//!     for method in &class_data.direct_methods {
//!         if let Some(code) = &method.code {
//!             let name = dex.method_name(method.method_idx)?;
//!             println!("  {name}: {} code units", code.insns_size);
//!         }
//!     }
//! }
//! # Ok::<(), dexshadow::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `dexshadow` is organized into several key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`dex`] - DEX container parsing and structural access
//! - [`tracking`] - Policy-driven range collection and application
//! - [`shadow`] - Memory access control backends
//! - [`builder`] - Programmatic construction of small DEX containers
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! ### Container Parsing
//!
//! The [`DexFile`] is the main entry point for loading DEX containers. It provides
//! access to:
//!
//! - **Header**: The validated `header_item` with table offsets and digests
//! - **Classes**: Every `class_def_item` with its decoded class data
//! - **Code**: Per-method `code_item` extents, including exception tables
//! - **Identifiers**: Lazy string, type and method table lookups
//!
//! ### Access Tracking
//!
//! The [`tracking`] module splits tracking into two phases that never overlap:
//!
//! - **Collection**: [`collect_ranges`] walks the container under a [`TrackingConfig`]
//!   and enqueues every byte range whose protection should change
//! - **Application**: [`apply_ranges`] drains the queue in order into any [`MemoryTool`]
//!
//! Later entries win over earlier ones for the same bytes, so exemptions are
//! expressed by enqueue order instead of by filtering during the walk.
//!
//! ## Advanced Usage
//!
//! ### Custom Marking Schemes
//!
//! ```rust,no_run
//! use dexshadow::{apply_ranges, DexFile, RangeCollector, ShadowMemory};
//!
//! fn seal_all_but_insns(dex: &DexFile, shadow: &mut ShadowMemory) {
//!     let mut collector = RangeCollector::new(dex);
//!     collector.mark_whole_file(true);
//!     collector.mark_all_insns(false);
//!
//!     let mut queue = collector.into_queue();
//!     apply_ranges(&mut queue, shadow);
//! }
//! ```
//!
//! ### Memory-based Analysis
//!
//! ```rust,no_run
//! use dexshadow::DexFile;
//!
//! // Track a container that was already loaded, for example out of an APK
//! let data: Vec<u8> = std::fs::read("classes.dex")?;
//! let dex = DexFile::from_mem(data, "classes.dex")?;
//!
//! // Same API as file-based analysis
//! println!("{} classes loaded from memory", dex.class_defs().len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Standards Compliance
//!
//! `dexshadow` implements the **Dalvik Executable format** as published by the Android
//! Open Source Project, covering container versions `035` through `041`.
//!
//! ### References
//!
//! - [Dalvik Executable format](https://source.android.com/docs/core/runtime/dex-format) - Official format specification
//! - [ART](https://android.googlesource.com/platform/art/) - The Android runtime's reference implementation
//!
//! ## Performance
//!
//! `dexshadow` is designed for tracking containers at load time:
//!
//! - **Efficient memory access** - Memory-mapped files with reference-based parsing where possible
//! - **Lazy evaluation** of string and identifier tables
//! - **Single-pass collection** over the class structures per container
//! - **Minimal allocations** through careful memory management
//!
//! Collection and application together stay well under a millisecond for typical
//! application containers.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result) with comprehensive error information:
//!
//! ```rust,no_run
//! use dexshadow::{DexFile, Error};
//!
//! match DexFile::from_file("classes.dex") {
//!     Ok(dex) => println!("Loaded {} classes", dex.class_defs().len()),
//!     Err(Error::NotSupported) => println!("Container version not supported"),
//!     Err(Error::Malformed { message, .. }) => println!("Malformed container: {}", message),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! The crate includes comprehensive fuzzing support for security and robustness:
//!
//! ### Fuzzing
//!
//! ```bash
//! # Install fuzzing tools
//! cargo install cargo-fuzz cargo-llvm-cov cargo-binutils
//!
//! # Run fuzzer
//! cargo +nightly fuzz run dexfile --release
//!
//! # Multi-core fuzzing
//! cargo +nightly fuzz run dexfile --release -- -jobs=4 -fork=1
//!
//! # Coverage analysis
//! RUSTFLAGS="-C instrument-coverage" cargo +nightly fuzz coverage dexfile --release
//! ```
//!
//! ### Testing
//!
//! The test suite builds its containers programmatically and covers format edge cases:
//!
//! ```bash
//! cargo test
//! cargo test --release  # For performance tests
//! ```
#[macro_use]
pub(crate) mod error;

/// Shared container factories and recording tools for the unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the dexshadow library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust,no_run
/// use dexshadow::prelude::*;
///
/// // Now you have access to the most common types
/// let dex = DexFile::from_file("classes.dex")?;
/// let queue = collect_ranges(&dex, &TrackingConfig::whole_file())?;
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub mod prelude;

/// File abstraction and raw data access for DEX containers.
///
/// This module provides the data-access layer everything else decodes from:
///
/// - [`file::Backend`] - Trait over data sources (memory-mapped files, owned buffers)
/// - [`file::Physical`] / [`file::Memory`] - The two backend implementations
/// - [`file::parser::Parser`] - Cursor-based decoding of DEX structures and encodings
/// - [`file::io`] - Endian-aware primitive reads and writes
///
/// # Examples
///
/// ```rust
/// use dexshadow::Parser;
///
/// let mut parser = Parser::new(&[0x80, 0x7F]);
/// assert_eq!(parser.read_uleb128()?, 16256);
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub mod file;

/// DEX container parsing based on the Dalvik Executable format.
///
/// This module decodes the structural spine of a container: the `header_item`,
/// every `class_def_item` with its `class_data_item` member lists, and the
/// `code_item` extent of each method that has a body. String, type and method
/// identifier tables are exposed as lazy views.
///
/// # Key Types
///
/// - [`DexFile`] - Main entry point for loading and querying containers
/// - [`dex::ClassDef`] / [`dex::ClassData`] - Class definitions and member lists
/// - [`dex::EncodedMethod`] / [`dex::CodeItem`] - Methods and their measured bodies
/// - [`DexHeader`] - The validated 112-byte container header
///
/// # Examples
///
/// ```rust,no_run
/// use dexshadow::DexFile;
///
/// let dex = DexFile::from_file("classes.dex")?;
/// dex.verify_checksum()?;
/// println!("{} class definitions", dex.class_defs().len());
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub mod dex;

/// Memory access control backends for the tracking passes.
///
/// # Key Types
///
/// - [`MemoryTool`] - The trait a real sanitizer runtime plugs into
/// - [`ShadowMemory`] - The built-in bookkeeping backend over an ordered range map
///
/// # Examples
///
/// ```rust
/// use dexshadow::{MemoryTool, ShadowMemory};
///
/// let mut shadow = ShadowMemory::new();
/// shadow.mark_no_access(0x7000, 0x100);
/// shadow.mark_defined(0x7040, 0x10);
/// assert!(shadow.is_poisoned(0x7000));
/// assert!(shadow.is_defined(0x7040, 0x10));
/// ```
pub mod shadow;

/// Policy-driven access tracking over loaded DEX containers.
///
/// Tracking is split into collection ([`collect_ranges`], [`RangeCollector`])
/// and application ([`apply_ranges`]), joined by a FIFO [`RangeQueue`] whose
/// order resolves overlaps: the entry enqueued last decides the final state of
/// a byte. [`register_dex_file`] and [`TrackingRegistrar`] run both phases in
/// one call.
///
/// # Examples
///
/// ```rust,no_run
/// use dexshadow::{register_dex_file, DexFile, ShadowMemory, TrackingConfig};
///
/// let dex = DexFile::from_file("classes.dex")?;
/// let mut shadow = ShadowMemory::new();
/// register_dex_file(Some(&dex), &TrackingConfig::code_items_except_insns(), &mut shadow)?;
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub mod tracking;

/// Programmatic construction of small DEX containers.
///
/// [`DexBuilder`] assembles a complete, digest-correct container image from
/// class and method descriptions. The builder exists for tests, fuzzing seeds
/// and tooling that needs containers with known shapes; it emits the
/// structures the parser consumes and nothing more.
///
/// # Examples
///
/// ```rust
/// use dexshadow::{ClassBuilder, DexBuilder, DexFile, MethodBuilder};
///
/// let image = DexBuilder::new()
///     .class(ClassBuilder::new("LApp;").direct_method(MethodBuilder::new("<clinit>").insns(8)))
///     .build()?;
/// let dex = DexFile::from_mem(image, "built.dex")?;
/// assert_eq!(dex.class_defs().len(), 1);
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub mod builder;

/// `dexshadow` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
///
/// # Examples
///
/// ```rust,no_run
/// use dexshadow::{DexFile, Result};
///
/// fn load_container(path: &str) -> Result<DexFile> {
///     DexFile::from_file(path)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `dexshadow` Error type
///
/// The main error type for all operations in this crate. Provides detailed error information
/// for container parsing, digest verification, and range collection.
///
/// # Examples
///
/// ```rust,no_run
/// use dexshadow::{DexFile, Error};
///
/// match DexFile::from_file("classes.dex") {
///     Ok(dex) => println!("Loaded successfully"),
///     Err(Error::NotSupported) => println!("Container version not supported"),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// Main entry point for working with DEX containers.
///
/// See [`dex::DexFile`] for loading, verification and structural access.
///
/// # Example
///
/// ```rust,no_run
/// use dexshadow::DexFile;
/// let dex = DexFile::from_file("classes.dex")?;
/// println!("Found {} classes", dex.class_defs().len());
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub use dex::{DexFile, DexHeader};

/// Memory access control: the backend trait and the built-in range map.
///
/// - [`MemoryTool`] - Implemented by anything that can mark address ranges
/// - [`ShadowMemory`] - Ordered-map bookkeeping backend with range queries
pub use shadow::{MemoryTool, ShadowMemory};

/// Access tracking entry points and supporting types.
///
/// [`register_dex_file`] is the one-call form; [`collect_ranges`] and
/// [`apply_ranges`] expose the two phases separately, with [`RangeCollector`]
/// and [`RangeQueue`] as the pieces for custom schemes.
///
/// # Example
///
/// ```rust,no_run
/// use dexshadow::{register_dex_file, DexFile, ShadowMemory, TrackingConfig};
///
/// let dex = DexFile::from_file("classes.dex")?;
/// let mut shadow = ShadowMemory::new();
/// register_dex_file(Some(&dex), &TrackingConfig::whole_file(), &mut shadow)?;
/// assert_eq!(shadow.poisoned_len(), dex.size() as u64);
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub use tracking::{
    apply_ranges, collect_ranges, register_dex_file, RangeCollector, RangeEntry, RangeQueue,
    TrackingConfig, TrackingPolicy, TrackingRegistrar, DEFAULT_EXEMPT_METHOD,
};

/// Builders for assembling DEX containers with known shapes.
///
/// # Example
///
/// ```rust
/// use dexshadow::{ClassBuilder, DexBuilder};
///
/// let image = DexBuilder::new().class(ClassBuilder::new("LEmpty;")).build()?;
/// assert_eq!(&image[0..4], b"dex\n");
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub use builder::{ClassBuilder, DexBuilder, FieldBuilder, MethodBuilder};

/// Provides access to low-level parsing utilities.
///
/// The [`Parser`] type is used for decoding DEX structures and the variable
/// length encodings of the format.
///
/// # Example
///
/// ```rust
/// use dexshadow::Parser;
/// let mut parser = Parser::new(&[0x2A, 0x00]);
/// assert_eq!(parser.read_le::<u16>()?, 42);
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub use file::{parser::Parser, Backend};
