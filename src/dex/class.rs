//! DEX class definitions and their encoded member lists.
//!
//! A `class_def_item` is a fixed 32-byte record in the `class_defs` table. Its
//! `class_data_off` field points at a `class_data_item` in the data section, a
//! ULEB128-encoded structure listing the class's fields and methods. Member indices
//! are delta-encoded: each entry stores the difference from the previous entry's
//! index, with every one of the four lists restarting its accumulator at zero.
//!
//! Method entries carry a `code_off` locating the method's [`CodeItem`]; a zero
//! offset marks abstract and native methods, which have no bytecode. Code items are
//! parsed eagerly here so that the tracking passes can walk fully resolved classes
//! without touching the parser again.

use crate::{
    dex::{
        code::CodeItem,
        types::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags, CLASS_DEF_ITEM_SIZE},
    },
    file::parser::Parser,
    Result,
};

/// One field entry from a `class_data_item`, with its index delta already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedField {
    /// Absolute index into the `field_ids` table
    pub field_idx: u32,
    /// Declared access flags
    pub access_flags: FieldAccessFlags,
}

/// One method entry from a `class_data_item`, with its index delta already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMethod {
    /// Absolute index into the `method_ids` table
    pub method_idx: u32,
    /// Declared access flags
    pub access_flags: MethodAccessFlags,
    /// Offset of the method's `code_item`, 0 for abstract and native methods
    pub code_off: u32,
    /// The parsed code item, `None` when `code_off` is 0
    pub code: Option<CodeItem>,
}

/// The member lists of one class, parsed from its `class_data_item`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassData {
    /// Static fields declared by the class
    pub static_fields: Vec<EncodedField>,
    /// Instance fields declared by the class
    pub instance_fields: Vec<EncodedField>,
    /// Direct methods: static methods, private methods, and constructors
    pub direct_methods: Vec<EncodedMethod>,
    /// Virtual methods, dispatched through the vtable
    pub virtual_methods: Vec<EncodedMethod>,
}

impl ClassData {
    /// Parse the `class_data_item` at `offset`, resolving each method's code item.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the item extends past the container
    /// and [`crate::Error::Malformed`] for invalid member encodings.
    pub fn read(data: &[u8], offset: u32) -> Result<ClassData> {
        let mut parser = Parser::new(data);
        parser.seek(offset as usize)?;

        let static_fields_size = parser.read_uleb128()?;
        let instance_fields_size = parser.read_uleb128()?;
        let direct_methods_size = parser.read_uleb128()?;
        let virtual_methods_size = parser.read_uleb128()?;

        Ok(ClassData {
            static_fields: Self::read_fields(&mut parser, static_fields_size)?,
            instance_fields: Self::read_fields(&mut parser, instance_fields_size)?,
            direct_methods: Self::read_methods(&mut parser, direct_methods_size, data)?,
            virtual_methods: Self::read_methods(&mut parser, virtual_methods_size, data)?,
        })
    }

    fn read_fields(parser: &mut Parser, count: u32) -> Result<Vec<EncodedField>> {
        let mut fields = Vec::new();
        let mut field_idx = 0_u32;

        for _ in 0..count {
            let diff = parser.read_uleb128()?;
            field_idx = field_idx
                .checked_add(diff)
                .ok_or_else(|| malformed_error!("Field index delta overflows"))?;
            let access_flags = parser.read_uleb128()?;

            fields.push(EncodedField {
                field_idx,
                access_flags: FieldAccessFlags::from_raw(access_flags),
            });
        }

        Ok(fields)
    }

    fn read_methods(parser: &mut Parser, count: u32, data: &[u8]) -> Result<Vec<EncodedMethod>> {
        let mut methods = Vec::new();
        let mut method_idx = 0_u32;

        for _ in 0..count {
            let diff = parser.read_uleb128()?;
            method_idx = method_idx
                .checked_add(diff)
                .ok_or_else(|| malformed_error!("Method index delta overflows"))?;
            let access_flags = parser.read_uleb128()?;
            let code_off = parser.read_uleb128()?;

            let code = if code_off == 0 {
                None
            } else {
                Some(CodeItem::read(data, code_off)?)
            };

            methods.push(EncodedMethod {
                method_idx,
                access_flags: MethodAccessFlags::from_raw(access_flags),
                code_off,
                code,
            });
        }

        Ok(methods)
    }
}

/// One `class_def_item` with its class data resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    /// Index into `type_ids` for this class
    pub class_idx: u32,
    /// Declared access flags
    pub access_flags: ClassAccessFlags,
    /// Index into `type_ids` for the superclass, [`crate::dex::types::NO_INDEX`] for none
    pub superclass_idx: u32,
    /// Offset of the interfaces list, 0 if the class implements none
    pub interfaces_off: u32,
    /// Index into `string_ids` for the source file name, [`crate::dex::types::NO_INDEX`] if unknown
    pub source_file_idx: u32,
    /// Offset of the annotations directory, 0 if absent
    pub annotations_off: u32,
    /// Offset of the `class_data_item`, 0 for classes with no members
    pub class_data_off: u32,
    /// Offset of the static field initializers, 0 if absent
    pub static_values_off: u32,
    /// The parsed member lists, `None` when `class_data_off` is 0
    pub class_data: Option<ClassData>,
}

impl ClassDef {
    /// Parse the `class_def_item` at `offset`, along with its class data.
    ///
    /// # Arguments
    /// * `data` - The full container contents
    /// * `offset` - Byte offset of the item within the `class_defs` table
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the item or any structure it
    /// references extends past the container and [`crate::Error::Malformed`] for
    /// invalid encodings.
    pub fn read(data: &[u8], offset: usize) -> Result<ClassDef> {
        let mut parser = Parser::new(data);
        parser.seek(offset)?;
        parser.ensure_remaining(CLASS_DEF_ITEM_SIZE as usize)?;

        let class_idx = parser.read_le::<u32>()?;
        let access_flags = ClassAccessFlags::from_raw(parser.read_le::<u32>()?);
        let superclass_idx = parser.read_le::<u32>()?;
        let interfaces_off = parser.read_le::<u32>()?;
        let source_file_idx = parser.read_le::<u32>()?;
        let annotations_off = parser.read_le::<u32>()?;
        let class_data_off = parser.read_le::<u32>()?;
        let static_values_off = parser.read_le::<u32>()?;

        let class_data = if class_data_off == 0 {
            None
        } else {
            Some(ClassData::read(data, class_data_off)?)
        };

        Ok(ClassDef {
            class_idx,
            access_flags,
            superclass_idx,
            interfaces_off,
            source_file_idx,
            annotations_off,
            class_data_off,
            static_values_off,
            class_data,
        })
    }
}
