//! # dexshadow Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dexshadow library. Import this module to get quick access to the essential
//! types for DEX container parsing and access tracking.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dexshadow operations
pub use crate::Error;

/// The result type used throughout dexshadow
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Main entry point for loading and querying DEX containers
pub use crate::DexFile;

/// One-call tracking: collect ranges for a container and apply them to a tool
pub use crate::register_dex_file;

// ================================================================================================
// Container Structures
// ================================================================================================

/// The validated container header
pub use crate::DexHeader;

/// Class definitions, member lists and code items
pub use crate::dex::{ClassData, ClassDef, CodeItem, EncodedField, EncodedMethod};

/// Lazy identifier table views
pub use crate::dex::{MethodId, MethodIds, StringIds, TypeIds};

/// Member access flags
pub use crate::dex::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};

// ================================================================================================
// Access Tracking
// ================================================================================================

/// Tracking configuration and the policy it selects
pub use crate::{TrackingConfig, TrackingPolicy, DEFAULT_EXEMPT_METHOD};

/// The two tracking phases as free functions
pub use crate::{apply_ranges, collect_ranges};

/// The pieces for composing custom marking schemes
pub use crate::{RangeCollector, RangeEntry, RangeQueue};

/// Stateful registrar owning a config and a memory tool
pub use crate::TrackingRegistrar;

// ================================================================================================
// Memory Backends
// ================================================================================================

/// The access control backend trait and the built-in range map
pub use crate::{MemoryTool, ShadowMemory};

// ================================================================================================
// Container Construction
// ================================================================================================

/// Builders for assembling containers with known shapes
pub use crate::{ClassBuilder, DexBuilder, FieldBuilder, MethodBuilder};

// ================================================================================================
// Low-Level Access
// ================================================================================================

/// Cursor-based parsing of DEX structures and encodings
pub use crate::Parser;

/// Pluggable data sources backing a loaded container
pub use crate::file::{Backend, Memory, Physical};
