//! Low-level byte stream parser for DEX structure decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary data
//! parser specifically designed for reading DEX file structures. It offers bounds-checked access
//! to binary data with support for the little-endian primitives, LEB128 variable-length
//! encodings, and the modified UTF-8 string format defined by the Dalvik executable
//! specification.
//!
//! # Architecture
//!
//! The parser is built around a simple cursor-based model that maintains a position within
//! a byte slice. The architecture provides:
//!
//! - **Position tracking** - Maintains current offset for sequential parsing operations
//! - **Bounds checking** - All operations validate data availability before reading
//! - **Type-safe reading** - Strongly typed methods for common data types
//! - **DEX encodings** - Specialized methods for LEB128 values and MUTF-8 string data
//!
//! # Key Components
//!
//! ## Core Type
//! - [`crate::file::parser::Parser`] - Main parser struct for binary data reading
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::seek`] - Move to specific position
//! - [`crate::file::parser::Parser::advance`] - Move forward by one byte
//! - [`crate::file::parser::Parser::advance_by`] - Move forward by specified bytes
//! - [`crate::file::parser::Parser::pos`] - Get current position
//! - [`crate::file::parser::Parser::align`] - Align to byte boundaries
//!
//! ## Data Access Methods
//! - [`crate::file::parser::Parser::read_le`] - Read primitive types (little-endian)
//! - [`crate::file::parser::Parser::read_bytes`] - Read raw byte slices
//! - [`crate::file::parser::Parser::peek_byte`] - Peek at current byte without advancing
//! - [`crate::file::parser::Parser::data`] - Access the underlying data slice
//!
//! ## DEX Encoding Methods
//! - [`crate::file::parser::Parser::read_uleb128`] - Read unsigned LEB128 integers
//! - [`crate::file::parser::Parser::read_sleb128`] - Read signed LEB128 integers
//! - [`crate::file::parser::Parser::read_string_mutf8`] - Read a `string_data_item` payload
//!
//! # Usage Examples
//!
//! ## Basic Value Reading
//!
//! ```rust
//! use dexshadow::Parser;
//!
//! let data = [0x01, 0x02, 0x03, 0x04];
//! let mut parser = Parser::new(&data);
//!
//! // Read little-endian values
//! let value = parser.read_le::<u16>()?;
//! assert_eq!(value, 0x0201);
//! # Ok::<(), dexshadow::Error>(())
//! ```
//!
//! ## Sequential Parsing with Navigation
//!
//! ```rust
//! use dexshadow::Parser;
//!
//! let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
//! let mut parser = Parser::new(&data);
//!
//! // Read sequentially
//! let first = parser.read_le::<u32>()?;
//! assert_eq!(first, 0x04030201);
//!
//! // Seek to specific position
//! parser.seek(6)?;
//! let last_bytes = parser.read_le::<u16>()?;
//! assert_eq!(last_bytes, 0x0807);
//! # Ok::<(), dexshadow::Error>(())
//! ```
//!
//! ## LEB128 Decoding
//!
//! ```rust
//! use dexshadow::Parser;
//!
//! // Two-byte unsigned LEB128 followed by a one-byte signed LEB128
//! let data = [0x80, 0x01, 0x7F];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_uleb128()?, 128);
//! assert_eq!(parser.read_sleb128()?, -1);
//! # Ok::<(), dexshadow::Error>(())
//! ```

use widestring::U16String;

use crate::{
    file::io::{read_le_at, DexIO},
    Error::OutOfBounds,
    Result,
};

/// A generic binary data parser for reading DEX file structures.
///
/// `Parser` provides a cursor-based interface for reading the little-endian binary data that
/// makes up a DEX file: fixed-width header fields and index tables, LEB128-encoded item bodies
/// such as `class_data_item`, and MUTF-8 string payloads.
///
/// The parser maintains an internal position cursor and provides bounds checking
/// to prevent buffer overruns when reading malformed or truncated data.
///
/// # Features
///
/// - **Bounds checking**: All read operations validate data availability
/// - **Position tracking**: Maintains current offset for sequential parsing
/// - **Flexible seeking**: Random access to any position within the data
/// - **Type safety**: Strongly typed reading methods for common data types
///
/// # Examples
///
/// ```rust,no_run
/// use dexshadow::Parser;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut parser = Parser::new(&data);
///
/// // Read little-endian values
/// let first = parser.read_le::<u32>()?;
/// assert_eq!(first, 0x04030201);
///
/// // Seek to a specific position
/// parser.seek(6)?;
/// let last_bytes = parser.read_le::<u16>()?;
/// assert_eq!(last_bytes, 0x0807);
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use dexshadow::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let parser = Parser::new(&data);
    /// assert_eq!(parser.len(), 4);
    /// ```
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    ///
    /// This checks if the current position is before the end of the data buffer.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the current position to the specified index.
    ///
    /// # Arguments
    /// * `pos` - The position to move the cursor to
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is beyond the data length.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use dexshadow::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let mut parser = Parser::new(&data);
    ///
    /// parser.seek(2)?;
    /// assert_eq!(parser.pos(), 2);
    /// let value = parser.read_le::<u8>()?;
    /// assert_eq!(value, 0x03);
    /// # Ok::<(), dexshadow::Error>(())
    /// ```
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos >= self.data.len() {
            return Err(OutOfBounds);
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by one byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing would exceed the data length.
    pub fn advance(&mut self) -> Result<()> {
        self.advance_by(1)
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Arguments
    /// * `step` - Amount of bytes to advance
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        let end = self.position.checked_add(step).ok_or(OutOfBounds)?;
        if end > self.data.len() {
            return Err(OutOfBounds);
        }

        self.position = end;
        Ok(())
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Peek at the next byte without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is at or beyond the data length.
    pub fn peek_byte(&self) -> Result<u8> {
        if self.position >= self.data.len() {
            return Err(OutOfBounds);
        }
        Ok(self.data[self.position])
    }

    /// Align the position to a specific boundary.
    ///
    /// This advances the position to the next multiple of the specified alignment. DEX
    /// requires four-byte alignment for several item types, for example the `try_item`
    /// array that follows an odd-length instruction array within a `code_item`.
    ///
    /// # Arguments
    /// * `alignment` - The boundary to align to (must be a power of 2)
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if aligning would exceed the data length.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use dexshadow::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
    /// let mut parser = Parser::new(&data);
    ///
    /// parser.advance()?; // Position is now 1
    /// parser.align(4)?;  // Align to 4-byte boundary
    /// assert_eq!(parser.pos(), 4);
    /// # Ok::<(), dexshadow::Error>(())
    /// ```
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let padding = (alignment - (self.position % alignment)) % alignment;
        if self.position + padding > self.data.len() {
            return Err(OutOfBounds);
        }
        self.position += padding;
        Ok(())
    }

    /// Returns the number of bytes remaining from the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Ensures that at least `needed` bytes are available from the current position.
    ///
    /// # Arguments
    /// * `needed` - The number of bytes required from the current position
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `needed` bytes remain.
    pub fn ensure_remaining(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(OutOfBounds);
        }
        Ok(())
    }

    /// Calculates an end position safely with overflow checking.
    ///
    /// Computes `self.position + length` while checking for arithmetic overflow
    /// and ensuring the result doesn't exceed the data bounds.
    ///
    /// # Arguments
    /// * `length` - The length to add to the current position
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the calculation would overflow
    /// or if the resulting position exceeds the data length.
    pub fn calc_end_position(&self, length: usize) -> Result<usize> {
        let end = self.position.checked_add(length).ok_or(OutOfBounds)?;

        if end > self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(end)
    }

    /// Reads a slice of bytes of the specified length from the current position.
    ///
    /// This method performs bounds checking and advances the position after reading.
    /// It's useful when you need to read a chunk of raw bytes rather than a specific type.
    ///
    /// # Arguments
    /// * `length` - The number of bytes to read
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading `length` bytes would exceed the data.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use dexshadow::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04, 0x05];
    /// let mut parser = Parser::new(&data);
    ///
    /// let chunk = parser.read_bytes(3)?;
    /// assert_eq!(chunk, &[0x01, 0x02, 0x03]);
    /// assert_eq!(parser.pos(), 3);
    /// # Ok::<(), dexshadow::Error>(())
    /// ```
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.calc_end_position(length)?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Read a type `T` from the current position in little-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use dexshadow::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let mut parser = Parser::new(&data);
    ///
    /// let value: u16 = parser.read_le()?;
    /// assert_eq!(value, 0x0201); // Little-endian interpretation
    /// assert_eq!(parser.pos(), 2);
    /// # Ok::<(), dexshadow::Error>(())
    /// ```
    pub fn read_le<T: DexIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read an unsigned LEB128 value as used throughout the DEX data section.
    ///
    /// LEB128 uses the most significant bit of each byte as a continuation flag.
    /// If set, the next byte is part of the value. The value is reconstructed by
    /// concatenating the lower 7 bits of each byte in little-endian order. DEX caps
    /// LEB128 values at 32 bits, which bounds the encoding at five bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] for an encoding that exceeds the u32 range.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use dexshadow::Parser;
    ///
    /// // Single byte: 127 (0x7F)
    /// let data = [0x7F];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_uleb128()?, 127);
    ///
    /// // Two bytes: 128 (0x80 0x01)
    /// let data = [0x80, 0x01];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_uleb128()?, 128);
    /// # Ok::<(), dexshadow::Error>(())
    /// ```
    pub fn read_uleb128(&mut self) -> Result<u32> {
        let mut value = 0_u64;
        let mut shift = 0;

        loop {
            if self.position >= self.data.len() {
                return Err(OutOfBounds);
            }

            let byte = self.data[self.position];
            self.position += 1;

            value |= u64::from(byte & 0x7F) << shift;
            shift += 7;

            if (byte & 0x80) == 0 {
                break;
            }

            // Five bytes carry 35 payload bits; a sixth byte can never be valid.
            if shift >= 35 {
                return Err(malformed_error!(
                    "ULEB128 encoding exceeds the five-byte maximum"
                ));
            }
        }

        if value > u64::from(u32::MAX) {
            return Err(malformed_error!(
                "ULEB128 value {:#x} exceeds the u32 range",
                value
            ));
        }

        #[allow(clippy::cast_possible_truncation)]
        Ok(value as u32)
    }

    /// Read a signed LEB128 value as used in DEX `encoded_catch_handler` counts.
    ///
    /// The encoding matches [`read_uleb128`](Parser::read_uleb128) except that the final
    /// byte's bit 6 is a sign bit which is extended through the remaining high bits.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] for an encoding that exceeds the i32 range.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use dexshadow::Parser;
    ///
    /// // Single byte: -1 (0x7F)
    /// let data = [0x7F];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_sleb128()?, -1);
    /// # Ok::<(), dexshadow::Error>(())
    /// ```
    pub fn read_sleb128(&mut self) -> Result<i32> {
        let mut value = 0_u64;
        let mut shift = 0;

        loop {
            if self.position >= self.data.len() {
                return Err(OutOfBounds);
            }

            let byte = self.data[self.position];
            self.position += 1;

            value |= u64::from(byte & 0x7F) << shift;
            shift += 7;

            if (byte & 0x80) == 0 {
                if shift < 64 && (byte & 0x40) != 0 {
                    value |= u64::MAX << shift;
                }
                break;
            }

            if shift >= 35 {
                return Err(malformed_error!(
                    "SLEB128 encoding exceeds the five-byte maximum"
                ));
            }
        }

        #[allow(clippy::cast_possible_wrap)]
        let signed = value as i64;
        if signed > i64::from(i32::MAX) || signed < i64::from(i32::MIN) {
            return Err(malformed_error!(
                "SLEB128 value {} exceeds the i32 range",
                signed
            ));
        }

        #[allow(clippy::cast_possible_truncation)]
        Ok(signed as i32)
    }

    /// Read a `string_data_item` payload from the current position.
    ///
    /// The item consists of a ULEB128 UTF-16 code unit count, followed by the string content
    /// in modified UTF-8 (MUTF-8), followed by a single NUL byte. MUTF-8 differs from
    /// standard UTF-8 in two ways: U+0000 is encoded as the two-byte sequence `C0 80` so
    /// that a raw zero byte always terminates the string, and supplementary characters are
    /// encoded as surrogate pairs of three bytes each rather than as four-byte sequences.
    ///
    /// The decoded UTF-16 code units are validated against the declared count and then
    /// converted to a [`String`], pairing surrogates in the process.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] for invalid MUTF-8 sequences, a code unit count that
    /// does not match the decoded content, or unpaired surrogates.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use dexshadow::Parser;
    ///
    /// // Code unit count 3, "abc", NUL terminator
    /// let data = [0x03, b'a', b'b', b'c', 0x00];
    /// let mut parser = Parser::new(&data);
    ///
    /// let result = parser.read_string_mutf8()?;
    /// assert_eq!(result, "abc");
    /// # Ok::<(), dexshadow::Error>(())
    /// ```
    pub fn read_string_mutf8(&mut self) -> Result<String> {
        let utf16_len = self.read_uleb128()? as usize;

        let mut units: Vec<u16> = Vec::with_capacity(utf16_len.min(self.remaining()));
        loop {
            if self.position >= self.data.len() {
                return Err(OutOfBounds);
            }

            let b0 = self.data[self.position];
            self.position += 1;

            if b0 == 0 {
                break;
            }

            let unit = match b0 {
                0x01..=0x7F => u16::from(b0),
                0xC0..=0xDF => {
                    let b1 = self.read_continuation_byte()?;
                    (u16::from(b0 & 0x1F) << 6) | u16::from(b1 & 0x3F)
                }
                0xE0..=0xEF => {
                    let b1 = self.read_continuation_byte()?;
                    let b2 = self.read_continuation_byte()?;
                    (u16::from(b0 & 0x0F) << 12)
                        | (u16::from(b1 & 0x3F) << 6)
                        | u16::from(b2 & 0x3F)
                }
                _ => {
                    return Err(malformed_error!(
                        "Invalid MUTF-8 lead byte {:#04x} at offset {}",
                        b0,
                        self.position - 1
                    ))
                }
            };

            units.push(unit);
        }

        if units.len() != utf16_len {
            return Err(malformed_error!(
                "MUTF-8 code unit count mismatch - header says {}, decoded {}",
                utf16_len,
                units.len()
            ));
        }

        U16String::from_vec(units)
            .to_string()
            .map_err(|_| malformed_error!("Unpaired surrogate in MUTF-8 string data"))
    }

    /// Read a single MUTF-8 continuation byte, validating the `10xxxxxx` bit pattern.
    fn read_continuation_byte(&mut self) -> Result<u8> {
        if self.position >= self.data.len() {
            return Err(OutOfBounds);
        }

        let byte = self.data[self.position];
        if (byte & 0xC0) != 0x80 {
            return Err(malformed_error!(
                "Invalid MUTF-8 continuation byte {:#04x} at offset {}",
                byte,
                self.position
            ));
        }

        self.position += 1;
        Ok(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_read_uleb128_single_byte() {
        {
            let input = &[0x00]; // Represents 0
            let mut parser = Parser::new(input);
            assert_eq!(parser.read_uleb128().unwrap(), 0);
            assert_eq!(parser.pos(), 1);
        }

        {
            let input = &[0x7F]; // Represents 127 (max for single byte)
            let mut parser = Parser::new(input);
            assert_eq!(parser.read_uleb128().unwrap(), 127);
            assert_eq!(parser.pos(), 1);
        }
    }

    #[test]
    fn test_read_uleb128_two_bytes() {
        {
            let input = &[0x80, 0x01]; // Represents 128
            let mut parser = Parser::new(input);
            assert_eq!(parser.read_uleb128().unwrap(), 128);
            assert_eq!(parser.pos(), 2);
        }

        {
            let input = &[0xFF, 0x7F]; // Represents 16383 (max for two bytes)
            let mut parser = Parser::new(input);
            assert_eq!(parser.read_uleb128().unwrap(), 16383);
            assert_eq!(parser.pos(), 2);
        }
    }

    #[test]
    fn test_read_uleb128_five_bytes() {
        {
            let input = &[0x80, 0x80, 0x80, 0x80, 0x01]; // Represents 268435456
            let mut parser = Parser::new(input);
            assert_eq!(parser.read_uleb128().unwrap(), 268_435_456);
            assert_eq!(parser.pos(), 5);
        }

        {
            let input = &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]; // Represents max u32
            let mut parser = Parser::new(input);
            assert_eq!(parser.read_uleb128().unwrap(), 4_294_967_295);
            assert_eq!(parser.pos(), 5);
        }
    }

    #[test]
    fn test_read_uleb128_truncated() {
        let input = &[0x80];
        let mut parser = Parser::new(input);
        assert!(matches!(parser.read_uleb128(), Err(Error::OutOfBounds)));
    }

    #[test]
    fn test_read_uleb128_overflow() {
        // Six continuation bytes can never be valid
        let input = &[0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        let mut parser = Parser::new(input);
        assert!(matches!(parser.read_uleb128(), Err(Error::Malformed { .. })));

        // Five bytes whose payload exceeds 32 bits
        let input = &[0xFF, 0xFF, 0xFF, 0xFF, 0x1F];
        let mut parser = Parser::new(input);
        assert!(matches!(parser.read_uleb128(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_read_sleb128() {
        let test_cases: Vec<(Vec<u8>, i32)> = vec![
            (vec![0x00], 0),
            (vec![0x01], 1),
            (vec![0x7F], -1),
            (vec![0x3F], 63),
            (vec![0x40], -64),
            (vec![0x80, 0x01], 128),
            (vec![0x80, 0x7F], -128),
            (vec![0xFF, 0xFF, 0xFF, 0xFF, 0x07], i32::MAX),
            (vec![0x80, 0x80, 0x80, 0x80, 0x78], i32::MIN),
        ];

        for (input, expected) in test_cases {
            let mut parser = Parser::new(&input);
            assert_eq!(parser.read_sleb128().unwrap(), expected, "input {input:02X?}");
        }
    }

    #[test]
    fn test_read_sleb128_truncated() {
        let input = &[0x80];
        let mut parser = Parser::new(input);
        assert!(matches!(parser.read_sleb128(), Err(Error::OutOfBounds)));
    }

    #[test]
    fn test_read_string_mutf8_ascii() {
        let data = [0x03, b'a', b'b', b'c', 0x00];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_string_mutf8().unwrap(), "abc");
        assert_eq!(parser.pos(), 5);
    }

    #[test]
    fn test_read_string_mutf8_empty() {
        let data = [0x00, 0x00];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_string_mutf8().unwrap(), "");
        assert_eq!(parser.pos(), 2);
    }

    #[test]
    fn test_read_string_mutf8_two_byte_sequence() {
        // U+00E9 (e acute) encodes as C3 A9
        let data = [0x01, 0xC3, 0xA9, 0x00];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_string_mutf8().unwrap(), "\u{e9}");
    }

    #[test]
    fn test_read_string_mutf8_three_byte_sequence() {
        // U+4E2D encodes as E4 B8 AD
        let data = [0x01, 0xE4, 0xB8, 0xAD, 0x00];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_string_mutf8().unwrap(), "\u{4e2d}");
    }

    #[test]
    fn test_read_string_mutf8_embedded_nul() {
        // U+0000 within the string encodes as C0 80, not as a raw zero byte
        let data = [0x03, b'a', 0xC0, 0x80, b'b', 0x00];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_string_mutf8().unwrap(), "a\u{0}b");
    }

    #[test]
    fn test_read_string_mutf8_surrogate_pair() {
        // U+10400 encodes as the surrogate pair D801 DC00: ED A0 81 ED B0 80
        let data = [0x02, 0xED, 0xA0, 0x81, 0xED, 0xB0, 0x80, 0x00];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_string_mutf8().unwrap(), "\u{10400}");
    }

    #[test]
    fn test_read_string_mutf8_unpaired_surrogate() {
        // A lone high surrogate decodes as a code unit but cannot form a String
        let data = [0x01, 0xED, 0xA0, 0x81, 0x00];
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_string_mutf8(),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_string_mutf8_count_mismatch() {
        let data = [0x05, b'a', b'b', b'c', 0x00];
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_string_mutf8(),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_string_mutf8_invalid_lead_byte() {
        // Four-byte UTF-8 sequences do not exist in MUTF-8
        let data = [0x02, 0xF0, 0x90, 0x90, 0x80, 0x00];
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_string_mutf8(),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_string_mutf8_invalid_continuation() {
        let data = [0x01, 0xC3, 0x29, 0x00];
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_string_mutf8(),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_string_mutf8_missing_terminator() {
        let data = [0x03, b'a', b'b', b'c'];
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_string_mutf8(),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn test_align() {
        let data = [0u8; 16];
        let mut parser = Parser::new(&data);

        parser.align(4).unwrap();
        assert_eq!(parser.pos(), 0); // Already aligned

        parser.advance().unwrap();
        parser.align(4).unwrap();
        assert_eq!(parser.pos(), 4);

        parser.advance_by(3).unwrap();
        parser.align(2).unwrap();
        assert_eq!(parser.pos(), 8);
    }

    #[test]
    fn test_seek_and_advance_bounds() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut parser = Parser::new(&data);

        assert!(parser.seek(3).is_ok());
        assert!(matches!(parser.seek(4), Err(Error::OutOfBounds)));

        parser.seek(0).unwrap();
        assert!(parser.advance_by(4).is_ok());
        assert!(!parser.has_more_data());
        assert!(matches!(parser.advance(), Err(Error::OutOfBounds)));
    }

    #[test]
    fn test_read_bytes() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut parser = Parser::new(&data);

        let chunk = parser.read_bytes(3).unwrap();
        assert_eq!(chunk, &[0x01, 0x02, 0x03]);
        assert_eq!(parser.pos(), 3);

        assert!(matches!(parser.read_bytes(3), Err(Error::OutOfBounds)));
        assert_eq!(parser.pos(), 3);
    }

    #[test]
    fn test_remaining_and_ensure() {
        let data = [0x01, 0x02, 0x03];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.remaining(), 3);
        parser.ensure_remaining(3).unwrap();

        parser.advance().unwrap();
        assert_eq!(parser.remaining(), 2);
        assert!(matches!(
            parser.ensure_remaining(3),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn test_peek_byte() {
        let data = [0xAB, 0xCD];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.peek_byte().unwrap(), 0xAB);
        assert_eq!(parser.pos(), 0); // Position unchanged

        parser.advance_by(2).unwrap();
        assert!(matches!(parser.peek_byte(), Err(Error::OutOfBounds)));
    }
}
