//! Lazy view over the DEX string identifiers table.
//!
//! `string_ids` is a table of little-endian `u32` offsets, each locating a
//! `string_data_item` somewhere in the data section. Strings are decoded on demand
//! rather than up front; the tracking passes only ever resolve the handful of method
//! names they compare against, so eager decoding of every string would be wasted work
//! on real containers.

use crate::{dex::types::STRING_ID_ITEM_SIZE, file::parser::Parser, Error::OutOfBounds, Result};

/// Borrowed view over the `string_ids` table of a DEX container.
pub struct StringIds<'a> {
    /// The full container contents, since string data may live anywhere in it
    data: &'a [u8],
    /// Byte offset of the first `string_id_item`
    offset: usize,
    /// Number of entries in the table
    count: u32,
}

impl<'a> StringIds<'a> {
    /// Create a view over the `string_ids` table.
    ///
    /// # Arguments
    /// * `data` - The full container contents
    /// * `offset` - Byte offset of the table, from `string_ids_off` in the header
    /// * `count` - Number of entries, from `string_ids_size` in the header
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the table does not fit in `data`.
    pub fn new(data: &'a [u8], offset: u32, count: u32) -> Result<StringIds<'a>> {
        let end = u64::from(offset) + u64::from(count) * u64::from(STRING_ID_ITEM_SIZE);
        if end > data.len() as u64 {
            return Err(OutOfBounds);
        }

        Ok(StringIds {
            data,
            offset: offset as usize,
            count,
        })
    }

    /// Number of entries in the table
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Decode the string at `index`.
    ///
    /// Follows the `string_id_item` offset into the data section and decodes the
    /// MUTF-8 payload it finds there.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `index` is out of range or the string
    /// data is invalid, and [`crate::Error::OutOfBounds`] if the referenced offset
    /// lies outside the container.
    pub fn get(&self, index: u32) -> Result<String> {
        if index >= self.count {
            return Err(malformed_error!(
                "String index {} out of range, table has {} entries",
                index,
                self.count
            ));
        }

        let mut parser = Parser::new(self.data);
        parser.seek(self.offset + index as usize * STRING_ID_ITEM_SIZE as usize)?;

        let data_off = parser.read_le::<u32>()?;
        parser.seek(data_off as usize)?;
        parser.read_string_mutf8()
    }
}
