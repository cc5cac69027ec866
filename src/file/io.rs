//! Low-level byte order and safe reading/writing utilities for DEX parsing.
//!
//! This module provides endian-aware binary data reading and writing functionality for parsing
//! DEX files and their internal structures. It implements safe, bounds-checked operations for
//! reading and writing primitive types from/to byte buffers, ensuring data integrity and
//! preventing buffer overruns during binary analysis and generation.
//!
//! DEX files are always little-endian on disk. The format reserves a byte-swapped endian tag
//! for big-endian producers, but such files do not occur in practice and are rejected during
//! header validation, so this module only implements the little-endian paths.
//!
//! # Architecture
//!
//! The module is built around the [`crate::file::io::DexIO`] trait which provides a unified
//! interface for reading and writing binary data in a type-safe manner. The architecture
//! includes:
//!
//! - Generic trait-based reading and writing for all primitive integer types
//! - Automatic bounds checking to prevent buffer overruns
//! - Consistent error handling through the [`crate::Result`] type
//!
//! # Key Components
//!
//! ## Core Trait
//! - [`crate::file::io::DexIO`] - Trait defining endian-aware reading and writing capabilities for primitive types
//!
//! ## Reading Functions
//! - [`crate::file::io::read_le`] - Read values from buffer start in little-endian format
//! - [`crate::file::io::read_le_at`] - Read values at specific offset with auto-advance in little-endian
//!
//! ## Writing Functions
//! - [`crate::file::io::write_le`] - Write values to buffer start in little-endian format
//! - [`crate::file::io::write_le_at`] - Write values at specific offset with auto-advance in little-endian
//!
//! ## Supported Types
//! The [`crate::file::io::DexIO`] trait is implemented for:
//! - **Unsigned integers**: `u8`, `u16`, `u32`, `u64`
//! - **Signed integers**: `i8`, `i16`, `i32`, `i64`
//!
//! # Usage Examples
//!
//! ## Basic Value Reading
//!
//! ```rust,ignore
//! use dexshadow::file::io::read_le;
//!
//! let data = [0x01, 0x00, 0x00, 0x00]; // u32 value: 1
//! let value: u32 = read_le(&data)?;
//! assert_eq!(value, 1);
//! # Ok::<(), dexshadow::Error>(())
//! ```
//!
//! ## Sequential Reading with Offset Tracking
//!
//! ```rust,ignore
//! use dexshadow::file::io::read_le_at;
//!
//! let data = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00];
//! let mut offset = 0;
//!
//! // Read multiple values sequentially
//! let first: u16 = read_le_at(&data, &mut offset)?;  // offset: 0 -> 2
//! let second: u16 = read_le_at(&data, &mut offset)?; // offset: 2 -> 4
//! let third: u32 = read_le_at(&data, &mut offset)?;  // offset: 4 -> 8
//!
//! assert_eq!(first, 1);
//! assert_eq!(second, 2);
//! assert_eq!(third, 3);
//! assert_eq!(offset, 8);
//! # Ok::<(), dexshadow::Error>(())
//! ```
//!
//! ## Sequential Writing with Offset Tracking
//!
//! ```rust,ignore
//! use dexshadow::file::io::write_le_at;
//!
//! let mut data = [0u8; 8];
//! let mut offset = 0;
//!
//! write_le_at(&mut data, &mut offset, 1u16)?;  // offset: 0 -> 2
//! write_le_at(&mut data, &mut offset, 2u16)?;  // offset: 2 -> 4
//! write_le_at(&mut data, &mut offset, 3u32)?;  // offset: 4 -> 8
//!
//! assert_eq!(data, [0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00]);
//! assert_eq!(offset, 8);
//! # Ok::<(), dexshadow::Error>(())
//! ```
//!
//! # Error Handling
//!
//! All reading and writing functions return [`crate::Result<T>`] and will return
//! [`crate::Error::OutOfBounds`] if there are insufficient bytes in the buffer to complete the
//! operation. This ensures memory safety and prevents buffer overruns during parsing and
//! generation.
//!
//! # Thread Safety
//!
//! All functions and types in this module are thread-safe. The [`crate::file::io::DexIO`] trait
//! implementations are based on primitive types and standard library functions that are
//! inherently thread-safe. All reading and writing functions are pure operations that don't
//! modify shared state, making them safe to call concurrently from multiple threads.
//!
//! # Integration
//!
//! This module integrates with:
//! - [`crate::file::parser`] - Uses I/O functions for parsing DEX file structures
//! - [`crate::dex`] - Reads header fields, index tables and item structures from binary data
//! - [`crate::builder`] - Uses writing functions for container generation
//!
//! The module is designed to be the foundational layer for all binary data access throughout
//! the dexshadow library, ensuring consistent and safe parsing and generation behavior across
//! all components.

use crate::{Error::OutOfBounds, Result};

/// Trait for implementing type-specific safe binary data reading and writing operations.
///
/// This trait provides a unified interface for reading primitive types from byte slices
/// in a safe and endian-aware manner. It abstracts over the conversion from byte arrays
/// to typed values for the little-endian encoding used by all DEX file structures.
///
/// # Implementation Details
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array required for that particular type (e.g., `[u8; 4]` for `u32`). The trait
/// methods then convert these byte arrays to the target type.
///
/// # Thread Safety
///
/// All implementations of [`DexIO`] are thread-safe as they only work with primitive types
/// and perform pure conversion operations without any shared state modification.
pub trait DexIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    ///
    /// This type must be convertible from a byte slice and is used for reading
    /// binary data in little-endian format.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
}

// Implement DexIO support for u64
impl DexIO for u64 {
    type Bytes = [u8; 8];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u64::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u64::to_le_bytes(self)
    }
}

// Implement DexIO support for i64
impl DexIO for i64 {
    type Bytes = [u8; 8];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        i64::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        i64::to_le_bytes(self)
    }
}

// Implement DexIO support for u32
impl DexIO for u32 {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u32::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u32::to_le_bytes(self)
    }
}

// Implement DexIO support for i32
impl DexIO for i32 {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        i32::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        i32::to_le_bytes(self)
    }
}

// Implement DexIO support for u16
impl DexIO for u16 {
    type Bytes = [u8; 2];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u16::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u16::to_le_bytes(self)
    }
}

// Implement DexIO support for i16
impl DexIO for i16 {
    type Bytes = [u8; 2];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        i16::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        i16::to_le_bytes(self)
    }
}

// Implement DexIO support for u8
impl DexIO for u8 {
    type Bytes = [u8; 1];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u8::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u8::to_le_bytes(self)
    }
}

// Implement DexIO support for i8
impl DexIO for i8 {
    type Bytes = [u8; 1];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        i8::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        i8::to_le_bytes(self)
    }
}

/// Safely reads a value of type `T` in little-endian byte order from a data buffer.
///
/// This function reads from the beginning of the buffer and supports all types that implement
/// the [`crate::file::io::DexIO`] trait (u8, i8, u16, i16, u32, i32, u64, i64).
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
///
/// # Returns
///
/// Returns the decoded value or [`crate::Error::OutOfBounds`] if there are insufficient bytes.
///
/// # Examples
///
/// ```rust,ignore
/// use dexshadow::file::io::read_le;
///
/// let data = [0x78, 0x56, 0x34, 0x12]; // Little-endian u32: 0x12345678
/// let value: u32 = read_le(&data)?;
/// assert_eq!(value, 0x12345678);
/// # Ok::<(), dexshadow::Error>(())
/// ```
///
/// # Thread Safety
///
/// This function is thread-safe and can be called concurrently from multiple threads.
pub fn read_le<T: DexIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads a value of type `T` in little-endian byte order from a data buffer at a specific offset.
///
/// This function reads from the specified offset and automatically advances the offset by the
/// number of bytes read. Supports all types that implement the [`crate::file::io::DexIO`] trait.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (will be advanced after reading)
///
/// # Returns
///
/// Returns the decoded value or [`crate::Error::OutOfBounds`] if there are insufficient bytes.
///
/// # Examples
///
/// ```rust,ignore
/// use dexshadow::file::io::read_le_at;
///
/// let data = [0x01, 0x00, 0x02, 0x00]; // Two u16 values: 1, 2
/// let mut offset = 0;
///
/// let first: u16 = read_le_at(&data, &mut offset)?;
/// assert_eq!(first, 1);
/// assert_eq!(offset, 2);
///
/// let second: u16 = read_le_at(&data, &mut offset)?;
/// assert_eq!(second, 2);
/// assert_eq!(offset, 4);
/// # Ok::<(), dexshadow::Error>(())
/// ```
///
/// # Thread Safety
///
/// This function is thread-safe and can be called concurrently from multiple threads.
/// Note that the offset parameter is modified, so each thread should use its own offset variable.
pub fn read_le_at<T: DexIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(OutOfBounds);
    };

    *offset += type_len;

    Ok(T::from_le_bytes(read))
}

/// Safely writes a value of type `T` in little-endian byte order to a data buffer.
///
/// This function writes to the beginning of the buffer and supports all types that implement
/// the [`crate::file::io::DexIO`] trait (u8, i8, u16, i16, u32, i32, u64, i64).
///
/// # Arguments
///
/// * `data` - The mutable byte buffer to write to
/// * `value` - The value to write
///
/// # Returns
///
/// Returns `Ok(())` on success or [`crate::Error::OutOfBounds`] if there are insufficient bytes.
///
/// # Examples
///
/// ```rust,ignore
/// use dexshadow::file::io::write_le;
///
/// let mut data = [0u8; 4];
/// write_le(&mut data, 0x12345678u32)?;
/// assert_eq!(data, [0x78, 0x56, 0x34, 0x12]);
/// # Ok::<(), dexshadow::Error>(())
/// ```
///
/// # Thread Safety
///
/// This function is thread-safe and can be called concurrently from multiple threads.
pub fn write_le<T: DexIO>(data: &mut [u8], value: T) -> Result<()> {
    let mut offset = 0_usize;
    write_le_at(data, &mut offset, value)
}

/// Safely writes a value of type `T` in little-endian byte order to a data buffer at a specific offset.
///
/// This function writes at the specified offset and automatically advances the offset by the
/// number of bytes written. Supports all types that implement the [`crate::file::io::DexIO`] trait.
///
/// # Arguments
///
/// * `data` - The mutable byte buffer to write to
/// * `offset` - Mutable reference to the offset position (will be advanced after writing)
/// * `value` - The value to write
///
/// # Returns
///
/// Returns `Ok(())` on success or [`crate::Error::OutOfBounds`] if there are insufficient bytes.
///
/// # Examples
///
/// ```rust,ignore
/// use dexshadow::file::io::write_le_at;
///
/// let mut data = [0u8; 4];
/// let mut offset = 0;
///
/// write_le_at(&mut data, &mut offset, 1u16)?;
/// assert_eq!(offset, 2);
///
/// write_le_at(&mut data, &mut offset, 2u16)?;
/// assert_eq!(offset, 4);
/// assert_eq!(data, [0x01, 0x00, 0x02, 0x00]); // Two u16 values: 1, 2
/// # Ok::<(), dexshadow::Error>(())
/// ```
///
/// # Thread Safety
///
/// This function is thread-safe and can be called concurrently from multiple threads.
/// Note that the offset parameter is modified, so each thread should use its own offset variable.
pub fn write_le_at<T: DexIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(OutOfBounds);
    }

    let bytes = value.to_le_bytes();
    let bytes_ref: &[u8] =
        unsafe { std::slice::from_raw_parts(&bytes as *const _ as *const u8, type_len) };

    data[*offset..*offset + type_len].copy_from_slice(bytes_ref);
    *offset += type_len;

    Ok(())
}
