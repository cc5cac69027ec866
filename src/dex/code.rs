//! DEX `code_item` parsing.
//!
//! A `code_item` holds the bytecode of one method along with its register frame
//! description and exception tables. The layout is a 16-byte fixed header, then
//! `insns_size` 16-bit code units, then (only when `tries_size > 0`) an optional
//! 2-byte pad to realign, `tries_size` 8-byte `try_item` entries, and a variable
//! length `encoded_catch_handler_list`.
//!
//! The tracking passes need two things from a code item: where its instruction
//! array lives and how many bytes the whole item spans. Try blocks and catch
//! handlers are therefore traversed only to measure the item's full extent, their
//! contents are not retained.

use crate::{file::parser::Parser, Result};

/// Byte offset of the instruction array from the start of a `code_item`
const INSNS_OFFSET: u32 = 16;

/// One parsed `code_item`, retaining its container offset and measured extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeItem {
    /// Byte offset of this item in the container, always 4-byte aligned
    pub offset: u32,
    /// Number of registers used by the method
    pub registers_size: u16,
    /// Number of words of incoming arguments
    pub ins_size: u16,
    /// Number of words of outgoing argument space
    pub outs_size: u16,
    /// Number of `try_item` entries
    pub tries_size: u16,
    /// Offset of the debug info stream, 0 if absent
    pub debug_info_off: u32,
    /// Size of the instruction array in 16-bit code units
    pub insns_size: u32,
    /// Total byte size of the item, including tries and catch handlers
    pub size: usize,
}

impl CodeItem {
    /// Parse the `code_item` at `offset` and measure its full extent.
    ///
    /// # Arguments
    /// * `data` - The full container contents
    /// * `offset` - Byte offset of the item, from an `encoded_method`'s `code_off`
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `offset` is not 4-byte aligned and
    /// [`crate::Error::OutOfBounds`] if the item extends past the container.
    pub fn read(data: &[u8], offset: u32) -> Result<CodeItem> {
        if offset % 4 != 0 {
            return Err(malformed_error!(
                "Code item at {:#x} is not 4-byte aligned",
                offset
            ));
        }

        let mut parser = Parser::new(data);
        parser.seek(offset as usize)?;

        let registers_size = parser.read_le::<u16>()?;
        let ins_size = parser.read_le::<u16>()?;
        let outs_size = parser.read_le::<u16>()?;
        let tries_size = parser.read_le::<u16>()?;
        let debug_info_off = parser.read_le::<u32>()?;
        let insns_size = parser.read_le::<u32>()?;

        parser.advance_by(insns_size as usize * 2)?;

        if tries_size > 0 {
            // The pad word exists only when the instruction array ends misaligned
            parser.align(4)?;
            parser.advance_by(usize::from(tries_size) * 8)?;

            let handlers_size = parser.read_uleb128()?;
            for _ in 0..handlers_size {
                let size = parser.read_sleb128()?;
                for _ in 0..size.unsigned_abs() {
                    let _type_idx = parser.read_uleb128()?;
                    let _addr = parser.read_uleb128()?;
                }
                if size <= 0 {
                    let _catch_all_addr = parser.read_uleb128()?;
                }
            }
        }

        Ok(CodeItem {
            offset,
            registers_size,
            ins_size,
            outs_size,
            tries_size,
            debug_info_off,
            insns_size,
            size: parser.pos() - offset as usize,
        })
    }

    /// Byte offset of the instruction array in the container
    #[must_use]
    pub fn insns_offset(&self) -> u32 {
        self.offset + INSNS_OFFSET
    }

    /// Byte length of the instruction array, two bytes per code unit
    #[must_use]
    pub fn insns_byte_len(&self) -> usize {
        self.insns_size as usize * 2
    }
}
