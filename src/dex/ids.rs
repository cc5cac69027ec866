//! Lazy views over the DEX type and method identifier tables.
//!
//! Both tables are fixed-stride arrays in the container. [`TypeIds`] entries are a
//! single `u32` index into the string table holding a type descriptor, and
//! [`MethodIds`] entries pack the defining class, prototype, and name of one method.
//! The views resolve entries on demand; [`crate::DexFile`] composes them with the
//! string table for full name lookups.

use crate::{
    dex::types::{METHOD_ID_ITEM_SIZE, TYPE_ID_ITEM_SIZE},
    file::parser::Parser,
    Error::OutOfBounds,
    Result,
};

/// Borrowed view over the `type_ids` table of a DEX container.
pub struct TypeIds<'a> {
    data: &'a [u8],
    offset: usize,
    count: u32,
}

impl<'a> TypeIds<'a> {
    /// Create a view over the `type_ids` table.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the table does not fit in `data`.
    pub fn new(data: &'a [u8], offset: u32, count: u32) -> Result<TypeIds<'a>> {
        let end = u64::from(offset) + u64::from(count) * u64::from(TYPE_ID_ITEM_SIZE);
        if end > data.len() as u64 {
            return Err(OutOfBounds);
        }

        Ok(TypeIds {
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

    /// String table index of the descriptor for the type at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `index` is out of range.
    pub fn descriptor_idx(&self, index: u32) -> Result<u32> {
        if index >= self.count {
            return Err(malformed_error!(
                "Type index {} out of range, table has {} entries",
                index,
                self.count
            ));
        }

        let mut parser = Parser::new(self.data);
        parser.seek(self.offset + index as usize * TYPE_ID_ITEM_SIZE as usize)?;
        parser.read_le::<u32>()
    }
}

/// One `method_id_item`, identifying a method by class, prototype, and name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodId {
    /// Index into `type_ids` for the defining class
    pub class_idx: u16,
    /// Index into `proto_ids` for the method prototype
    pub proto_idx: u16,
    /// Index into `string_ids` for the method name
    pub name_idx: u32,
}

/// Borrowed view over the `method_ids` table of a DEX container.
pub struct MethodIds<'a> {
    data: &'a [u8],
    offset: usize,
    count: u32,
}

impl<'a> MethodIds<'a> {
    /// Create a view over the `method_ids` table.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the table does not fit in `data`.
    pub fn new(data: &'a [u8], offset: u32, count: u32) -> Result<MethodIds<'a>> {
        let end = u64::from(offset) + u64::from(count) * u64::from(METHOD_ID_ITEM_SIZE);
        if end > data.len() as u64 {
            return Err(OutOfBounds);
        }

        Ok(MethodIds {
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

    /// Read the `method_id_item` at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `index` is out of range.
    pub fn get(&self, index: u32) -> Result<MethodId> {
        if index >= self.count {
            return Err(malformed_error!(
                "Method index {} out of range, table has {} entries",
                index,
                self.count
            ));
        }

        let mut parser = Parser::new(self.data);
        parser.seek(self.offset + index as usize * METHOD_ID_ITEM_SIZE as usize)?;

        Ok(MethodId {
            class_idx: parser.read_le::<u16>()?,
            proto_idx: parser.read_le::<u16>()?,
            name_idx: parser.read_le::<u32>()?,
        })
    }
}
