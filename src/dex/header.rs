//! DEX `header_item` parsing and validation.
//!
//! The header occupies the first 112 bytes of every DEX container and carries the magic,
//! integrity digests, and the offset/count pairs locating every top-level table. Parsing
//! validates the structural fields eagerly so that later table readers can trust the
//! offsets they are handed; the checksum and signature digests are deliberately NOT
//! verified here, callers opt in via [`crate::DexFile::verify_checksum`] and
//! [`crate::DexFile::verify_signature`].
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use dexshadow::DexFile;
//!
//! let dex = DexFile::from_file("classes.dex")?;
//! let header = dex.header();
//! println!("version {}, {} classes", header.version, header.class_defs_size);
//! # Ok::<(), dexshadow::Error>(())
//! ```

use crate::{
    dex::types::{
        CLASS_DEF_ITEM_SIZE, DEX_MAGIC, ENDIAN_CONSTANT, FIELD_ID_ITEM_SIZE, HEADER_SIZE,
        METHOD_ID_ITEM_SIZE, PROTO_ID_ITEM_SIZE, REVERSE_ENDIAN_CONSTANT, STRING_ID_ITEM_SIZE,
        TYPE_ID_ITEM_SIZE,
    },
    file::parser::Parser,
    Error::OutOfBounds,
    Result,
};

/// The `header_item` structure that opens every DEX container.
///
/// All multi-byte fields are little-endian. Offsets are relative to the start of the
/// container, and a `*_off` of zero means the corresponding table is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexHeader {
    /// Format version parsed from the magic digits (35, 37, 38, 39, 40 or 41)
    pub version: u32,
    /// Adler-32 checksum over everything after this field (bytes 12 through `file_size`)
    pub checksum: u32,
    /// SHA-1 digest over everything after this field (bytes 32 through `file_size`)
    pub signature: [u8; 20],
    /// Size of the entire container in bytes
    pub file_size: u32,
    /// Size of this header, always 0x70
    pub header_size: u32,
    /// Endianness marker, [`ENDIAN_CONSTANT`] for the little-endian files parsed here
    pub endian_tag: u32,
    /// Size of the link section, 0 in unlinked files
    pub link_size: u32,
    /// Offset of the link section, 0 in unlinked files
    pub link_off: u32,
    /// Offset of the map list in the data section
    pub map_off: u32,
    /// Number of entries in the string identifiers table
    pub string_ids_size: u32,
    /// Offset of the string identifiers table
    pub string_ids_off: u32,
    /// Number of entries in the type identifiers table
    pub type_ids_size: u32,
    /// Offset of the type identifiers table
    pub type_ids_off: u32,
    /// Number of entries in the prototype identifiers table
    pub proto_ids_size: u32,
    /// Offset of the prototype identifiers table
    pub proto_ids_off: u32,
    /// Number of entries in the field identifiers table
    pub field_ids_size: u32,
    /// Offset of the field identifiers table
    pub field_ids_off: u32,
    /// Number of entries in the method identifiers table
    pub method_ids_size: u32,
    /// Offset of the method identifiers table
    pub method_ids_off: u32,
    /// Number of entries in the class definitions table
    pub class_defs_size: u32,
    /// Offset of the class definitions table
    pub class_defs_off: u32,
    /// Size of the data section in bytes
    pub data_size: u32,
    /// Offset of the data section
    pub data_off: u32,
}

impl DexHeader {
    /// Parse the DEX header from a byte slice.
    ///
    /// Validates the magic, version digits, endian tag, declared header size, and that
    /// every table the header advertises lies within `file_size`.
    ///
    /// # Arguments
    /// * `data` - The byte slice containing at least the first 112 bytes of the container
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the slice is shorter than the header,
    /// [`crate::Error::NotSupported`] for an unknown version or a reverse-endian file,
    /// and [`crate::Error::Malformed`] for structural violations.
    pub fn read(data: &[u8]) -> Result<DexHeader> {
        if data.len() < HEADER_SIZE as usize {
            return Err(OutOfBounds);
        }

        if data[0..4] != DEX_MAGIC {
            return Err(malformed_error!("Invalid DEX magic"));
        }

        if data[7] != 0 {
            return Err(malformed_error!("DEX magic is missing its NUL terminator"));
        }

        let mut version = 0_u32;
        for &digit in &data[4..7] {
            if !digit.is_ascii_digit() {
                return Err(malformed_error!(
                    "Non-digit byte {:#04x} in DEX version",
                    digit
                ));
            }
            version = version * 10 + u32::from(digit - b'0');
        }

        if !crate::dex::types::is_supported_version(version) {
            return Err(crate::Error::NotSupported);
        }

        let mut parser = Parser::new(data);
        parser.seek(8)?;

        let checksum = parser.read_le::<u32>()?;
        let signature: [u8; 20] = parser
            .read_bytes(20)?
            .try_into()
            .map_err(|_| OutOfBounds)?;

        let file_size = parser.read_le::<u32>()?;
        if file_size < HEADER_SIZE {
            return Err(malformed_error!(
                "Declared file size {:#x} is smaller than the header",
                file_size
            ));
        }

        let header_size = parser.read_le::<u32>()?;
        if header_size != HEADER_SIZE {
            return Err(malformed_error!(
                "Invalid header size {:#x}, expected {:#x}",
                header_size,
                HEADER_SIZE
            ));
        }

        let endian_tag = parser.read_le::<u32>()?;
        if endian_tag == REVERSE_ENDIAN_CONSTANT {
            // Byte-swapped files were legal in early format revisions but never produced
            return Err(crate::Error::NotSupported);
        }
        if endian_tag != ENDIAN_CONSTANT {
            return Err(malformed_error!("Invalid endian tag {:#010x}", endian_tag));
        }

        let header = DexHeader {
            version,
            checksum,
            signature,
            file_size,
            header_size,
            endian_tag,
            link_size: parser.read_le::<u32>()?,
            link_off: parser.read_le::<u32>()?,
            map_off: parser.read_le::<u32>()?,
            string_ids_size: parser.read_le::<u32>()?,
            string_ids_off: parser.read_le::<u32>()?,
            type_ids_size: parser.read_le::<u32>()?,
            type_ids_off: parser.read_le::<u32>()?,
            proto_ids_size: parser.read_le::<u32>()?,
            proto_ids_off: parser.read_le::<u32>()?,
            field_ids_size: parser.read_le::<u32>()?,
            field_ids_off: parser.read_le::<u32>()?,
            method_ids_size: parser.read_le::<u32>()?,
            method_ids_off: parser.read_le::<u32>()?,
            class_defs_size: parser.read_le::<u32>()?,
            class_defs_off: parser.read_le::<u32>()?,
            data_size: parser.read_le::<u32>()?,
            data_off: parser.read_le::<u32>()?,
        };

        let tables = [
            ("string_ids", header.string_ids_off, header.string_ids_size, STRING_ID_ITEM_SIZE),
            ("type_ids", header.type_ids_off, header.type_ids_size, TYPE_ID_ITEM_SIZE),
            ("proto_ids", header.proto_ids_off, header.proto_ids_size, PROTO_ID_ITEM_SIZE),
            ("field_ids", header.field_ids_off, header.field_ids_size, FIELD_ID_ITEM_SIZE),
            ("method_ids", header.method_ids_off, header.method_ids_size, METHOD_ID_ITEM_SIZE),
            ("class_defs", header.class_defs_off, header.class_defs_size, CLASS_DEF_ITEM_SIZE),
            ("data", header.data_off, header.data_size, 1),
        ];
        for (name, offset, count, element_size) in tables {
            header.check_table(name, offset, count, element_size)?;
        }

        Ok(header)
    }

    /// Validate that a table declared by the header fits inside `file_size`
    fn check_table(&self, name: &str, offset: u32, count: u32, element_size: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        if offset < HEADER_SIZE {
            return Err(malformed_error!(
                "Table '{}' overlaps the header at offset {:#x}",
                name,
                offset
            ));
        }

        let end = u64::from(offset) + u64::from(count) * u64::from(element_size);
        if end > u64::from(self.file_size) {
            return Err(malformed_error!(
                "Table '{}' extends to {:#x}, beyond the declared file size {:#x}",
                name,
                end,
                self.file_size
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_header() -> Vec<u8> {
        #[rustfmt::skip]
        let data = vec![
            // magic: "dex\n035\0"
            0x64, 0x65, 0x78, 0x0A, 0x30, 0x33, 0x35, 0x00,
            // checksum: 0x11223344
            0x44, 0x33, 0x22, 0x11,
            // signature: 20 bytes
            0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9,
            0xAA, 0xAB, 0xAC, 0xAD, 0xAE, 0xAF, 0xB0, 0xB1, 0xB2, 0xB3,
            // file_size: 0x200
            0x00, 0x02, 0x00, 0x00,
            // header_size: 0x70
            0x70, 0x00, 0x00, 0x00,
            // endian_tag: ENDIAN_CONSTANT
            0x78, 0x56, 0x34, 0x12,
            // link_size: 0
            0x00, 0x00, 0x00, 0x00,
            // link_off: 0
            0x00, 0x00, 0x00, 0x00,
            // map_off: 0x1F0
            0xF0, 0x01, 0x00, 0x00,
            // string_ids_size: 4
            0x04, 0x00, 0x00, 0x00,
            // string_ids_off: 0x70
            0x70, 0x00, 0x00, 0x00,
            // type_ids_size: 2
            0x02, 0x00, 0x00, 0x00,
            // type_ids_off: 0x80
            0x80, 0x00, 0x00, 0x00,
            // proto_ids_size: 1
            0x01, 0x00, 0x00, 0x00,
            // proto_ids_off: 0x88
            0x88, 0x00, 0x00, 0x00,
            // field_ids_size: 0
            0x00, 0x00, 0x00, 0x00,
            // field_ids_off: 0
            0x00, 0x00, 0x00, 0x00,
            // method_ids_size: 2
            0x02, 0x00, 0x00, 0x00,
            // method_ids_off: 0x94
            0x94, 0x00, 0x00, 0x00,
            // class_defs_size: 1
            0x01, 0x00, 0x00, 0x00,
            // class_defs_off: 0xA4
            0xA4, 0x00, 0x00, 0x00,
            // data_size: 0x13C
            0x3C, 0x01, 0x00, 0x00,
            // data_off: 0xC4
            0xC4, 0x00, 0x00, 0x00,
        ];
        data
    }

    #[test]
    fn crafted() {
        let data = valid_header();
        assert_eq!(data.len(), HEADER_SIZE as usize);

        let header = DexHeader::read(&data).unwrap();
        assert_eq!(header.version, 35);
        assert_eq!(header.checksum, 0x1122_3344);
        assert_eq!(header.signature[0], 0xA0);
        assert_eq!(header.signature[19], 0xB3);
        assert_eq!(header.file_size, 0x200);
        assert_eq!(header.header_size, 0x70);
        assert_eq!(header.endian_tag, ENDIAN_CONSTANT);
        assert_eq!(header.link_size, 0);
        assert_eq!(header.link_off, 0);
        assert_eq!(header.map_off, 0x1F0);
        assert_eq!(header.string_ids_size, 4);
        assert_eq!(header.string_ids_off, 0x70);
        assert_eq!(header.type_ids_size, 2);
        assert_eq!(header.type_ids_off, 0x80);
        assert_eq!(header.proto_ids_size, 1);
        assert_eq!(header.proto_ids_off, 0x88);
        assert_eq!(header.field_ids_size, 0);
        assert_eq!(header.field_ids_off, 0);
        assert_eq!(header.method_ids_size, 2);
        assert_eq!(header.method_ids_off, 0x94);
        assert_eq!(header.class_defs_size, 1);
        assert_eq!(header.class_defs_off, 0xA4);
        assert_eq!(header.data_size, 0x13C);
        assert_eq!(header.data_off, 0xC4);
    }

    #[test]
    fn test_truncated_header() {
        let data = valid_header();
        assert!(matches!(
            DexHeader::read(&data[..64]),
            Err(crate::Error::OutOfBounds)
        ));
        assert!(matches!(
            DexHeader::read(&[]),
            Err(crate::Error::OutOfBounds)
        ));
    }

    #[test]
    fn test_invalid_magic() {
        let mut data = valid_header();
        data[0] = b'c';
        assert!(matches!(
            DexHeader::read(&data),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_unsupported_version() {
        // 036 was never a shipped format revision
        let mut data = valid_header();
        data[6] = b'6';
        assert!(matches!(
            DexHeader::read(&data),
            Err(crate::Error::NotSupported)
        ));
    }

    #[test]
    fn test_version_missing_terminator() {
        let mut data = valid_header();
        data[7] = b'x';
        assert!(matches!(
            DexHeader::read(&data),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_reverse_endian_rejected() {
        let mut data = valid_header();
        data[0x28..0x2C].copy_from_slice(&REVERSE_ENDIAN_CONSTANT.to_le_bytes());
        assert!(matches!(
            DexHeader::read(&data),
            Err(crate::Error::NotSupported)
        ));
    }

    #[test]
    fn test_invalid_endian_tag() {
        let mut data = valid_header();
        data[0x28..0x2C].copy_from_slice(&0xDEAD_BEEF_u32.to_le_bytes());
        assert!(matches!(
            DexHeader::read(&data),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_invalid_header_size() {
        let mut data = valid_header();
        data[0x24..0x28].copy_from_slice(&0x71_u32.to_le_bytes());
        assert!(matches!(
            DexHeader::read(&data),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_file_size_smaller_than_header() {
        let mut data = valid_header();
        data[0x20..0x24].copy_from_slice(&0x40_u32.to_le_bytes());
        assert!(matches!(
            DexHeader::read(&data),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_table_out_of_bounds() {
        // Push string_ids past the declared file size
        let mut data = valid_header();
        data[0x3C..0x40].copy_from_slice(&0x1FC_u32.to_le_bytes());
        assert!(matches!(
            DexHeader::read(&data),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_table_overlapping_header() {
        let mut data = valid_header();
        data[0x3C..0x40].copy_from_slice(&0x10_u32.to_le_bytes());
        assert!(matches!(
            DexHeader::read(&data),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_empty_table_skips_bounds_check() {
        // field_ids has size 0, so a nonsense offset is ignored
        let mut data = valid_header();
        data[0x54..0x58].copy_from_slice(&0xFFFF_FFFF_u32.to_le_bytes());
        let header = DexHeader::read(&data).unwrap();
        assert_eq!(header.field_ids_size, 0);
    }
}
