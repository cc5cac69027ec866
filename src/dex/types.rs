//! Format constants and access flags for DEX containers.
//!
//! This module defines the magic values, layout constants, and access-flag bitflags shared by
//! the structure parsers in [`crate::dex`]. The values follow the Dalvik executable format as
//! published by the Android Open Source Project.
//!
//! # Key Types
//! - [`ClassAccessFlags`]: `access_flags` bits valid on a `class_def_item`
//! - [`FieldAccessFlags`]: `access_flags` bits valid on an `encoded_field`
//! - [`MethodAccessFlags`]: `access_flags` bits valid on an `encoded_method`

use bitflags::bitflags;

/// The four-byte file type tag that opens every DEX container
pub const DEX_MAGIC: [u8; 4] = *b"dex\n";

/// Total size of `header_item` in bytes
pub const HEADER_SIZE: u32 = 0x70;

/// Marker value stored in the `endian_tag` header field by little-endian producers
pub const ENDIAN_CONSTANT: u32 = 0x1234_5678;

/// Byte-swapped [`ENDIAN_CONSTANT`], reserved for big-endian producers
pub const REVERSE_ENDIAN_CONSTANT: u32 = 0x7856_3412;

/// Sentinel for absent index values such as a missing superclass
pub const NO_INDEX: u32 = 0xFFFF_FFFF;

/// Size of one `string_id_item` in bytes
pub const STRING_ID_ITEM_SIZE: u32 = 4;
/// Size of one `type_id_item` in bytes
pub const TYPE_ID_ITEM_SIZE: u32 = 4;
/// Size of one `proto_id_item` in bytes
pub const PROTO_ID_ITEM_SIZE: u32 = 12;
/// Size of one `field_id_item` in bytes
pub const FIELD_ID_ITEM_SIZE: u32 = 8;
/// Size of one `method_id_item` in bytes
pub const METHOD_ID_ITEM_SIZE: u32 = 8;
/// Size of one `class_def_item` in bytes
pub const CLASS_DEF_ITEM_SIZE: u32 = 32;

/// Returns `true` for the DEX version digits this library can parse.
///
/// Version 036 was never shipped and is deliberately absent. Versions beyond
/// 041 would need a format review before being accepted here.
#[must_use]
pub fn is_supported_version(version: u32) -> bool {
    matches!(version, 35 | 37 | 38 | 39 | 40 | 41)
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Access flags valid on a `class_def_item`
    pub struct ClassAccessFlags: u32 {
        /// Visible everywhere
        const PUBLIC = 0x0001;
        /// Only visible to the defining class (inner classes)
        const PRIVATE = 0x0002;
        /// Visible to the package and subclasses (inner classes)
        const PROTECTED = 0x0004;
        /// Not constructed with an outer `this` reference (inner classes)
        const STATIC = 0x0008;
        /// Not subclassable
        const FINAL = 0x0010;
        /// Multiply-implementable abstract class
        const INTERFACE = 0x0200;
        /// Not directly instantiable
        const ABSTRACT = 0x0400;
        /// Not directly defined in source code
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation class
        const ANNOTATION = 0x2000;
        /// Declared as an enumerated type
        const ENUM = 0x4000;
    }
}

impl ClassAccessFlags {
    /// Extract class access flags from a raw `access_flags` value, dropping undefined bits
    #[must_use]
    pub fn from_raw(flags: u32) -> Self {
        Self::from_bits_truncate(flags)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Access flags valid on an `encoded_field`
    pub struct FieldAccessFlags: u32 {
        /// Visible everywhere
        const PUBLIC = 0x0001;
        /// Only visible to the defining class
        const PRIVATE = 0x0002;
        /// Visible to the package and subclasses
        const PROTECTED = 0x0004;
        /// Per-class rather than per-instance
        const STATIC = 0x0008;
        /// Immutable after construction
        const FINAL = 0x0010;
        /// Special access rules to help with thread safety
        const VOLATILE = 0x0040;
        /// Not saved by default serialization
        const TRANSIENT = 0x0080;
        /// Not directly defined in source code
        const SYNTHETIC = 0x1000;
        /// Declared as an enumerated value
        const ENUM = 0x4000;
    }
}

impl FieldAccessFlags {
    /// Extract field access flags from a raw `access_flags` value, dropping undefined bits
    #[must_use]
    pub fn from_raw(flags: u32) -> Self {
        Self::from_bits_truncate(flags)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Access flags valid on an `encoded_method`
    pub struct MethodAccessFlags: u32 {
        /// Visible everywhere
        const PUBLIC = 0x0001;
        /// Only visible to the defining class
        const PRIVATE = 0x0002;
        /// Visible to the package and subclasses
        const PROTECTED = 0x0004;
        /// Per-class rather than per-instance
        const STATIC = 0x0008;
        /// Not overridable
        const FINAL = 0x0010;
        /// Associated lock automatically acquired around calls
        const SYNCHRONIZED = 0x0020;
        /// Compiler-generated bridge method
        const BRIDGE = 0x0040;
        /// Last argument should be treated as a rest argument
        const VARARGS = 0x0080;
        /// Implemented in native code
        const NATIVE = 0x0100;
        /// Unimplemented by this class
        const ABSTRACT = 0x0400;
        /// Strict rules for floating-point arithmetic
        const STRICT = 0x0800;
        /// Not directly defined in source code
        const SYNTHETIC = 0x1000;
        /// Constructor method (class or instance initializer)
        const CONSTRUCTOR = 0x10000;
        /// Declared `synchronized` in source
        const DECLARED_SYNCHRONIZED = 0x20000;
    }
}

impl MethodAccessFlags {
    /// Extract method access flags from a raw `access_flags` value, dropping undefined bits
    #[must_use]
    pub fn from_raw(flags: u32) -> Self {
        Self::from_bits_truncate(flags)
    }
}
