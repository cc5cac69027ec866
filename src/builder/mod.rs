//! In-memory DEX container construction.
//!
//! This module provides [`DexBuilder`] for generating small, well-formed DEX
//! images without an Android toolchain. It exists so that tests, benchmarks
//! and embedders can produce containers with a known class and method layout
//! and feed them straight back into [`crate::DexFile`].
//!
//! The builder assembles every structure the parser consumes: the header with
//! a genuine Adler-32 checksum and SHA-1 signature, sorted identifier pools,
//! `class_def_item` entries, `class_data_item` member lists and `code_item`
//! bodies filled with `nop` instructions. All methods share a single `()V`
//! prototype, and the optional map list is left out (`map_off` is zero), which
//! keeps generated images minimal while remaining fully parseable.
//!
//! # Examples
//!
//! ```rust
//! use dexshadow::{ClassBuilder, DexBuilder, DexFile, MethodBuilder};
//!
//! let image = DexBuilder::new()
//!     .class(
//!         ClassBuilder::new("LExample;")
//!             .direct_method(MethodBuilder::new("<clinit>").insns(8)),
//!     )
//!     .build()?;
//!
//! let dex = DexFile::from_mem(image, "generated")?;
//! assert_eq!(dex.class_defs().len(), 1);
//! dex.verify_checksum()?;
//! dex.verify_signature()?;
//! # Ok::<(), dexshadow::Error>(())
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

use sha1::{Digest, Sha1};

use crate::{
    dex::{
        types::{
            CLASS_DEF_ITEM_SIZE, DEX_MAGIC, ENDIAN_CONSTANT, FIELD_ID_ITEM_SIZE, HEADER_SIZE,
            METHOD_ID_ITEM_SIZE, NO_INDEX, PROTO_ID_ITEM_SIZE, STRING_ID_ITEM_SIZE,
            TYPE_ID_ITEM_SIZE,
        },
        ClassAccessFlags, FieldAccessFlags, MethodAccessFlags,
    },
    file::io::write_le_at,
    Error, Result,
};

/// Builder for complete in-memory DEX images.
///
/// `DexBuilder` collects class declarations and assembles them into a byte
/// vector laid out as header, identifier tables and data section. String and
/// type pools are deduplicated and sorted, member references are emitted in
/// index order with the delta encoding `class_data_item` requires, and the
/// header digests are computed over the final bytes so that
/// [`crate::DexFile::verify_checksum`] and [`crate::DexFile::verify_signature`]
/// accept the result.
///
/// # Examples
///
/// ```rust
/// use dexshadow::{ClassBuilder, DexBuilder, MethodBuilder};
///
/// let image = DexBuilder::new()
///     .version(39)
///     .class(
///         ClassBuilder::new("LAlpha;")
///             .direct_method(MethodBuilder::new("<clinit>").insns(6))
///             .direct_method(MethodBuilder::new("run").insns(12)),
///     )
///     .class(ClassBuilder::new("LBeta;"))
///     .build()?;
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub struct DexBuilder {
    /// Format version encoded into the magic, `35` unless overridden
    version: u32,

    /// Class declarations in the order their `class_def_item` entries appear
    classes: Vec<ClassBuilder>,
}

/// Builder for a single class definition.
///
/// Classes are identified by their type descriptor (for example `LFoo;`) and
/// carry four member lists matching the `class_data_item` layout: static
/// fields, instance fields, direct methods and virtual methods. A class with
/// no members at all is emitted with a zero `class_data_off`.
pub struct ClassBuilder {
    descriptor: String,
    access_flags: Option<ClassAccessFlags>,
    static_fields: Vec<FieldBuilder>,
    instance_fields: Vec<FieldBuilder>,
    direct_methods: Vec<MethodBuilder>,
    virtual_methods: Vec<MethodBuilder>,
}

/// Builder for a single method.
///
/// A method without a body (no [`MethodBuilder::insns`] call) is emitted with
/// a zero `code_off`, the way abstract and native methods are encoded. When
/// access flags are not set explicitly they are derived from the method name
/// and position: `<clinit>` becomes `STATIC | CONSTRUCTOR`, `<init>` becomes
/// `PUBLIC | CONSTRUCTOR`, other direct methods default to `PUBLIC | STATIC`
/// (plus `NATIVE` when bodyless) and virtual methods to `PUBLIC` (plus
/// `ABSTRACT` when bodyless).
pub struct MethodBuilder {
    name: String,
    units: Option<u32>,
    with_try: bool,
    access_flags: Option<MethodAccessFlags>,
}

/// Builder for a single field.
///
/// Fields carry a name and a type descriptor. Static fields default to
/// `PUBLIC | STATIC` access flags, instance fields to `PUBLIC`.
pub struct FieldBuilder {
    name: String,
    descriptor: String,
    access_flags: Option<FieldAccessFlags>,
}

impl DexBuilder {
    /// Create a new builder producing a version `035` container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: 35,
            classes: Vec::new(),
        }
    }

    /// Set the format version encoded into the magic.
    ///
    /// Accepts the versions the parser accepts: 35, 37, 38, 39, 40 and 41.
    /// [`DexBuilder::build`] rejects anything else.
    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Add a class to the container.
    ///
    /// Classes appear in `class_defs` in the order they are added. Their
    /// type descriptors must be unique within one container.
    #[must_use]
    pub fn class(mut self, class: ClassBuilder) -> Self {
        self.classes.push(class);
        self
    }

    /// Assemble the container and return its bytes.
    ///
    /// The returned image carries a genuine Adler-32 checksum and SHA-1
    /// signature and can be handed to [`crate::DexFile::from_mem`] directly.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configured version is not a supported DEX version
    /// - Two classes share a type descriptor
    /// - One class declares two methods or two fields with the same identity
    /// - The assembled layout exceeds the u32 offset range of the format
    pub fn build(self) -> Result<Vec<u8>> {
        let DexBuilder { version, classes } = self;

        if !crate::dex::types::is_supported_version(version) {
            return Err(Error::Error(format!(
                "DEX version {:03} is not supported",
                version
            )));
        }

        let mut seen_classes = HashSet::new();
        for class in &classes {
            if !seen_classes.insert(class.descriptor.as_str()) {
                return Err(Error::Error(format!(
                    "Duplicate class descriptor '{}'",
                    class.descriptor
                )));
            }
        }

        let pools = Pools::collect(&classes)?;
        let members = MemberIndices::resolve(&classes, &pools)?;

        // Fixed-size region layout; every table element size is a multiple of
        // four, so the data section starts 4-aligned and code items can be
        // aligned relative to it.
        let string_ids_off = HEADER_SIZE as usize;
        let type_ids_off = string_ids_off + pools.strings.len() * STRING_ID_ITEM_SIZE as usize;
        let proto_ids_off = type_ids_off + pools.types.len() * TYPE_ID_ITEM_SIZE as usize;
        let field_ids_off = proto_ids_off + PROTO_ID_ITEM_SIZE as usize;
        let method_ids_off = field_ids_off + members.fields.len() * FIELD_ID_ITEM_SIZE as usize;
        let class_defs_off = method_ids_off + members.methods.len() * METHOD_ID_ITEM_SIZE as usize;
        let data_off = class_defs_off + classes.len() * CLASS_DEF_ITEM_SIZE as usize;

        // Data section, one chunk per class: code items first so their
        // offsets are known when the class data referencing them is encoded.
        let mut data: Vec<u8> = Vec::new();
        let mut class_records: Vec<(u32, u32, u32)> = Vec::with_capacity(classes.len());

        for class in &classes {
            let class_idx = pools.type_idx(&class.descriptor)?;
            let mut code_offsets: HashMap<u32, u32> = HashMap::new();

            let direct = members.sorted_methods(&pools, class_idx, &class.direct_methods)?;
            let virtuals = members.sorted_methods(&pools, class_idx, &class.virtual_methods)?;
            let statics = members.sorted_fields(&pools, class_idx, &class.static_fields)?;
            let instances = members.sorted_fields(&pools, class_idx, &class.instance_fields)?;

            for &(method_idx, method) in direct.iter().chain(&virtuals) {
                if let Some(units) = method.units {
                    align4(&mut data);
                    code_offsets.insert(method_idx, offset_u32(data_off + data.len())?);
                    emit_code_item(&mut data, units, method.with_try);
                }
            }

            let has_members = !(statics.is_empty()
                && instances.is_empty()
                && direct.is_empty()
                && virtuals.is_empty());

            let class_data_off = if has_members {
                let off = offset_u32(data_off + data.len())?;
                push_uleb128(&mut data, count_u32(statics.len())?);
                push_uleb128(&mut data, count_u32(instances.len())?);
                push_uleb128(&mut data, count_u32(direct.len())?);
                push_uleb128(&mut data, count_u32(virtuals.len())?);

                emit_encoded_fields(&mut data, &statics, true);
                emit_encoded_fields(&mut data, &instances, false);
                emit_encoded_methods(&mut data, &direct, true, &code_offsets);
                emit_encoded_methods(&mut data, &virtuals, false, &code_offsets);
                off
            } else {
                0
            };

            let access = class
                .access_flags
                .unwrap_or(ClassAccessFlags::PUBLIC)
                .bits();
            class_records.push((class_idx, access, class_data_off));
        }

        // String data items, in pool order.
        let mut string_offsets = Vec::with_capacity(pools.strings.len());
        for value in &pools.strings {
            string_offsets.push(offset_u32(data_off + data.len())?);
            let (unit_count, bytes) = encode_mutf8(value);
            push_uleb128(&mut data, unit_count);
            data.extend_from_slice(&bytes);
            data.push(0);
        }

        let file_size = offset_u32(data_off + data.len())?;
        let data_size = count_u32(data.len())?;

        // Header.
        let mut out = Vec::with_capacity(file_size as usize);
        out.extend_from_slice(&DEX_MAGIC);
        out.extend_from_slice(format!("{:03}\0", version).as_bytes());
        push_u32(&mut out, 0); // checksum, patched below
        out.extend_from_slice(&[0_u8; 20]); // signature, patched below
        push_u32(&mut out, file_size);
        push_u32(&mut out, HEADER_SIZE);
        push_u32(&mut out, ENDIAN_CONSTANT);
        push_u32(&mut out, 0); // link_size
        push_u32(&mut out, 0); // link_off
        push_u32(&mut out, 0); // map_off, no map list is emitted
        push_u32(&mut out, count_u32(pools.strings.len())?);
        push_u32(&mut out, offset_u32(string_ids_off)?);
        push_u32(&mut out, count_u32(pools.types.len())?);
        push_u32(&mut out, offset_u32(type_ids_off)?);
        push_u32(&mut out, 1); // proto_ids_size, the shared ()V prototype
        push_u32(&mut out, offset_u32(proto_ids_off)?);
        push_u32(&mut out, count_u32(members.fields.len())?);
        push_u32(
            &mut out,
            if members.fields.is_empty() {
                0
            } else {
                offset_u32(field_ids_off)?
            },
        );
        push_u32(&mut out, count_u32(members.methods.len())?);
        push_u32(
            &mut out,
            if members.methods.is_empty() {
                0
            } else {
                offset_u32(method_ids_off)?
            },
        );
        push_u32(&mut out, count_u32(classes.len())?);
        push_u32(
            &mut out,
            if classes.is_empty() {
                0
            } else {
                offset_u32(class_defs_off)?
            },
        );
        push_u32(&mut out, data_size);
        push_u32(&mut out, offset_u32(data_off)?);

        // Identifier tables.
        for &offset in &string_offsets {
            push_u32(&mut out, offset);
        }
        for descriptor in &pools.types {
            push_u32(&mut out, pools.string_idx(descriptor)?);
        }
        push_u32(&mut out, pools.string_idx("V")?); // shorty_idx
        push_u32(&mut out, pools.type_idx("V")?); // return_type_idx
        push_u32(&mut out, 0); // parameters_off
        for &(class_idx, name_idx, type_idx) in &members.fields {
            push_u16(&mut out, class_idx);
            push_u16(&mut out, type_idx);
            push_u32(&mut out, name_idx);
        }
        for &(class_idx, name_idx) in &members.methods {
            push_u16(&mut out, class_idx);
            push_u16(&mut out, 0); // proto_idx
            push_u32(&mut out, name_idx);
        }
        for &(class_idx, access_flags, class_data_off) in &class_records {
            push_u32(&mut out, class_idx);
            push_u32(&mut out, access_flags);
            push_u32(&mut out, NO_INDEX); // superclass_idx
            push_u32(&mut out, 0); // interfaces_off
            push_u32(&mut out, NO_INDEX); // source_file_idx
            push_u32(&mut out, 0); // annotations_off
            push_u32(&mut out, class_data_off);
            push_u32(&mut out, 0); // static_values_off
        }
        out.extend_from_slice(&data);
        debug_assert_eq!(out.len(), file_size as usize);

        // Digests: the signature covers everything after itself and is in
        // turn covered by the checksum, so it must be computed first.
        let mut hasher = Sha1::new();
        hasher.update(&out[32..]);
        let signature: [u8; 20] = hasher.finalize().into();
        out[12..32].copy_from_slice(&signature);

        let checksum = adler::adler32_slice(&out[12..]);
        let mut checksum_offset = 8;
        write_le_at(&mut out, &mut checksum_offset, checksum)?;

        Ok(out)
    }
}

impl Default for DexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassBuilder {
    /// Create a class with the given type descriptor, for example `LFoo;`.
    #[must_use]
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            access_flags: None,
            static_fields: Vec::new(),
            instance_fields: Vec::new(),
            direct_methods: Vec::new(),
            virtual_methods: Vec::new(),
        }
    }

    /// Override the class access flags, `PUBLIC` when not set.
    #[must_use]
    pub fn access_flags(mut self, flags: ClassAccessFlags) -> Self {
        self.access_flags = Some(flags);
        self
    }

    /// Add a direct method (static, private or constructor).
    #[must_use]
    pub fn direct_method(mut self, method: MethodBuilder) -> Self {
        self.direct_methods.push(method);
        self
    }

    /// Add a virtual method.
    #[must_use]
    pub fn virtual_method(mut self, method: MethodBuilder) -> Self {
        self.virtual_methods.push(method);
        self
    }

    /// Add a static field.
    #[must_use]
    pub fn static_field(mut self, field: FieldBuilder) -> Self {
        self.static_fields.push(field);
        self
    }

    /// Add an instance field.
    #[must_use]
    pub fn instance_field(mut self, field: FieldBuilder) -> Self {
        self.instance_fields.push(field);
        self
    }
}

impl MethodBuilder {
    /// Create a method with the given name and no body.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: None,
            with_try: false,
            access_flags: None,
        }
    }

    /// Give the method a body of `units` 16-bit code units, filled with
    /// `nop` instructions.
    ///
    /// The resulting `code_item` occupies `16 + 2 * units` bytes unless a try
    /// block is added as well.
    #[must_use]
    pub fn insns(mut self, units: u32) -> Self {
        self.units = Some(units);
        self
    }

    /// Append a try block covering the whole body with a single catch-all
    /// handler.
    ///
    /// This extends the `code_item` past its instruction array with the
    /// 4-aligned `try_item` and the encoded handler list. Only takes effect
    /// for methods that have a body.
    #[must_use]
    pub fn with_try_handler(mut self) -> Self {
        self.with_try = true;
        self
    }

    /// Override the derived access flags.
    #[must_use]
    pub fn access_flags(mut self, flags: MethodAccessFlags) -> Self {
        self.access_flags = Some(flags);
        self
    }
}

impl FieldBuilder {
    /// Create a field with the given name and type descriptor, for example
    /// `FieldBuilder::new("count", "I")`.
    #[must_use]
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access_flags: None,
        }
    }

    /// Override the derived access flags.
    #[must_use]
    pub fn access_flags(mut self, flags: FieldAccessFlags) -> Self {
        self.access_flags = Some(flags);
        self
    }
}

/// Deduplicated, sorted string and type pools with index lookup.
///
/// The pools are sorted by content, which for the identifiers used here
/// matches the code-point ordering the format mandates, and type indices
/// stay monotone in their descriptor string indices.
struct Pools {
    strings: Vec<String>,
    types: Vec<String>,
    string_index: HashMap<String, u32>,
    type_index: HashMap<String, u32>,
}

impl Pools {
    fn collect(classes: &[ClassBuilder]) -> Result<Self> {
        let mut strings: BTreeSet<String> = BTreeSet::new();
        let mut types: BTreeSet<String> = BTreeSet::new();

        // "V" backs the shared ()V prototype as both shorty and return type.
        types.insert("V".to_string());

        for class in classes {
            types.insert(class.descriptor.clone());
            for method in class.direct_methods.iter().chain(&class.virtual_methods) {
                strings.insert(method.name.clone());
            }
            for field in class.static_fields.iter().chain(&class.instance_fields) {
                strings.insert(field.name.clone());
                types.insert(field.descriptor.clone());
            }
        }
        for descriptor in &types {
            strings.insert(descriptor.clone());
        }

        let strings: Vec<String> = strings.into_iter().collect();
        let types: Vec<String> = types.into_iter().collect();

        let mut string_index = HashMap::with_capacity(strings.len());
        for (index, value) in strings.iter().enumerate() {
            string_index.insert(value.clone(), count_u32(index)?);
        }
        let mut type_index = HashMap::with_capacity(types.len());
        for (index, value) in types.iter().enumerate() {
            type_index.insert(value.clone(), count_u32(index)?);
        }

        Ok(Self {
            strings,
            types,
            string_index,
            type_index,
        })
    }

    fn string_idx(&self, value: &str) -> Result<u32> {
        self.string_index
            .get(value)
            .copied()
            .ok_or_else(|| malformed_error!("String '{}' missing from the pool", value))
    }

    fn type_idx(&self, descriptor: &str) -> Result<u32> {
        self.type_index
            .get(descriptor)
            .copied()
            .ok_or_else(|| malformed_error!("Type '{}' missing from the pool", descriptor))
    }

    /// Type index narrowed to the u16 width of member references.
    fn class_idx_u16(&self, descriptor: &str) -> Result<u16> {
        u16::try_from(self.type_idx(descriptor)?).map_err(|_| {
            Error::Error(format!(
                "Type index for '{}' exceeds the u16 range of member references",
                descriptor
            ))
        })
    }
}

/// Sorted `method_ids` and `field_ids` tables with lookup maps.
///
/// Methods sort by (defining class, name), fields by (defining class, name,
/// type), matching the table ordering the format mandates. Since member lists
/// in `class_data_item` are delta-encoded they must be emitted in ascending
/// index order, which [`MemberIndices::sorted_methods`] and
/// [`MemberIndices::sorted_fields`] provide.
struct MemberIndices {
    /// (class_idx, name_idx) per method, table order
    methods: Vec<(u16, u32)>,
    /// (class_idx, name_idx, type_idx) per field, table order
    fields: Vec<(u16, u32, u16)>,
    method_index: HashMap<(u16, u32), u32>,
    field_index: HashMap<(u16, u32, u16), u32>,
}

impl MemberIndices {
    fn resolve(classes: &[ClassBuilder], pools: &Pools) -> Result<Self> {
        let mut methods = Vec::new();
        let mut fields = Vec::new();

        for class in classes {
            let mut method_names = HashSet::new();
            let mut field_keys = HashSet::new();

            for method in class.direct_methods.iter().chain(&class.virtual_methods) {
                if !method_names.insert(method.name.as_str()) {
                    return Err(Error::Error(format!(
                        "Duplicate method '{}' in class '{}'",
                        method.name, class.descriptor
                    )));
                }
                let class_idx = pools.class_idx_u16(&class.descriptor)?;
                methods.push((class_idx, pools.string_idx(&method.name)?));
            }

            for field in class.static_fields.iter().chain(&class.instance_fields) {
                if !field_keys.insert((field.name.as_str(), field.descriptor.as_str())) {
                    return Err(Error::Error(format!(
                        "Duplicate field '{}:{}' in class '{}'",
                        field.name, field.descriptor, class.descriptor
                    )));
                }
                let class_idx = pools.class_idx_u16(&class.descriptor)?;
                let type_idx = u16::try_from(pools.type_idx(&field.descriptor)?).map_err(|_| {
                    Error::Error(format!(
                        "Type index for '{}' exceeds the u16 range of member references",
                        field.descriptor
                    ))
                })?;
                fields.push((class_idx, pools.string_idx(&field.name)?, type_idx));
            }
        }

        methods.sort_unstable();
        fields.sort_unstable();

        let mut method_index = HashMap::with_capacity(methods.len());
        for (index, &key) in methods.iter().enumerate() {
            method_index.insert(key, count_u32(index)?);
        }
        let mut field_index = HashMap::with_capacity(fields.len());
        for (index, &key) in fields.iter().enumerate() {
            field_index.insert(key, count_u32(index)?);
        }

        Ok(Self {
            methods,
            fields,
            method_index,
            field_index,
        })
    }

    /// Resolve one member list to (index, builder) pairs in ascending index
    /// order.
    fn sorted_methods<'a>(
        &self,
        pools: &Pools,
        class_idx: u32,
        list: &'a [MethodBuilder],
    ) -> Result<Vec<(u32, &'a MethodBuilder)>> {
        let class_idx = u16::try_from(class_idx)
            .map_err(|_| malformed_error!("Class index {} exceeds the u16 range", class_idx))?;
        let mut resolved = Vec::with_capacity(list.len());
        for method in list {
            let name_idx = pools.string_idx(&method.name)?;
            let index = self
                .method_index
                .get(&(class_idx, name_idx))
                .copied()
                .ok_or_else(|| {
                    malformed_error!("Method '{}' missing from the index", method.name)
                })?;
            resolved.push((index, method));
        }
        resolved.sort_unstable_by_key(|&(index, _)| index);
        Ok(resolved)
    }

    fn sorted_fields<'a>(
        &self,
        pools: &Pools,
        class_idx: u32,
        list: &'a [FieldBuilder],
    ) -> Result<Vec<(u32, &'a FieldBuilder)>> {
        let class_idx = u16::try_from(class_idx)
            .map_err(|_| malformed_error!("Class index {} exceeds the u16 range", class_idx))?;
        let mut resolved = Vec::with_capacity(list.len());
        for field in list {
            let name_idx = pools.string_idx(&field.name)?;
            let type_idx = u16::try_from(pools.type_idx(&field.descriptor)?)
                .map_err(|_| malformed_error!("Type index exceeds the u16 range"))?;
            let index = self
                .field_index
                .get(&(class_idx, name_idx, type_idx))
                .copied()
                .ok_or_else(|| malformed_error!("Field '{}' missing from the index", field.name))?;
            resolved.push((index, field));
        }
        resolved.sort_unstable_by_key(|&(index, _)| index);
        Ok(resolved)
    }
}

fn emit_encoded_fields(data: &mut Vec<u8>, fields: &[(u32, &FieldBuilder)], is_static: bool) {
    let mut previous = 0;
    for &(field_idx, field) in fields {
        push_uleb128(data, field_idx - previous);
        previous = field_idx;
        let flags = field.access_flags.unwrap_or(if is_static {
            FieldAccessFlags::PUBLIC | FieldAccessFlags::STATIC
        } else {
            FieldAccessFlags::PUBLIC
        });
        push_uleb128(data, flags.bits());
    }
}

fn emit_encoded_methods(
    data: &mut Vec<u8>,
    methods: &[(u32, &MethodBuilder)],
    direct: bool,
    code_offsets: &HashMap<u32, u32>,
) {
    let mut previous = 0;
    for &(method_idx, method) in methods {
        push_uleb128(data, method_idx - previous);
        previous = method_idx;
        let flags = method
            .access_flags
            .unwrap_or_else(|| default_method_flags(&method.name, direct, method.units.is_some()));
        push_uleb128(data, flags.bits());
        push_uleb128(data, code_offsets.get(&method_idx).copied().unwrap_or(0));
    }
}

fn default_method_flags(name: &str, direct: bool, has_code: bool) -> MethodAccessFlags {
    if name == "<clinit>" {
        MethodAccessFlags::STATIC | MethodAccessFlags::CONSTRUCTOR
    } else if name == "<init>" {
        MethodAccessFlags::PUBLIC | MethodAccessFlags::CONSTRUCTOR
    } else if direct {
        if has_code {
            MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC
        } else {
            MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC | MethodAccessFlags::NATIVE
        }
    } else if has_code {
        MethodAccessFlags::PUBLIC
    } else {
        MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT
    }
}

/// Emit one `code_item`: the 16-byte header, `units` zeroed code units
/// (`nop`), and when requested a whole-body try block with a catch-all
/// handler.
fn emit_code_item(out: &mut Vec<u8>, units: u32, with_try: bool) {
    push_u16(out, 1); // registers_size
    push_u16(out, 0); // ins_size
    push_u16(out, 0); // outs_size
    push_u16(out, u16::from(with_try)); // tries_size
    push_u32(out, 0); // debug_info_off
    push_u32(out, units); // insns_size
    out.resize(out.len() + units as usize * 2, 0);
    if with_try {
        if units % 2 != 0 {
            push_u16(out, 0); // alignment pad before try_items
        }
        // try_item: the span clamps at the u16 width of insn_count.
        push_u32(out, 0); // start_addr
        push_u16(out, u16::try_from(units).unwrap_or(u16::MAX)); // insn_count
        push_u16(out, 1); // handler_off
        out.push(1); // handlers list size
        out.push(0); // handler with catch-all only (sleb128 size 0)
        out.push(0); // catch_all_addr
    }
}

/// MUTF-8 encode a string, returning its UTF-16 code unit count and bytes.
///
/// Embedded NUL encodes as `C0 80`, everything else as the 1 to 3 byte forms
/// of standard UTF-8 applied per UTF-16 code unit, so supplementary
/// characters become encoded surrogate pairs.
#[allow(clippy::cast_possible_truncation)]
fn encode_mutf8(value: &str) -> (u32, Vec<u8>) {
    let mut bytes = Vec::with_capacity(value.len());
    let mut unit_count = 0_u32;
    let mut buffer = [0_u16; 2];

    for ch in value.chars() {
        for &unit in ch.encode_utf16(&mut buffer).iter() {
            unit_count += 1;
            match unit {
                0 => bytes.extend_from_slice(&[0xC0, 0x80]),
                0x01..=0x7F => bytes.push(unit as u8),
                0x80..=0x7FF => {
                    bytes.push(0xC0 | (unit >> 6) as u8);
                    bytes.push(0x80 | (unit & 0x3F) as u8);
                }
                _ => {
                    bytes.push(0xE0 | (unit >> 12) as u8);
                    bytes.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                    bytes.push(0x80 | (unit & 0x3F) as u8);
                }
            }
        }
    }

    (unit_count, bytes)
}

#[allow(clippy::cast_possible_truncation)]
fn push_uleb128(out: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn align4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

fn offset_u32(value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| malformed_error!("Container layout exceeds the u32 offset range"))
}

fn count_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| malformed_error!("Item count exceeds the u32 range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DexFile, Error};

    #[test]
    fn test_build_memberless_class() {
        let image = DexBuilder::new()
            .class(ClassBuilder::new("LEmpty;"))
            .build()
            .unwrap();
        let dex = DexFile::from_mem(image, "built").unwrap();

        assert_eq!(dex.header().version, 35);
        assert_eq!(dex.header().class_defs_size, 1);
        assert_eq!(dex.header().proto_ids_size, 1);
        assert_eq!(dex.header().method_ids_size, 0);
        assert_eq!(dex.header().map_off, 0);

        let class = &dex.class_defs()[0];
        assert_eq!(class.access_flags, ClassAccessFlags::PUBLIC);
        assert_eq!(class.superclass_idx, NO_INDEX);
        assert_eq!(class.source_file_idx, NO_INDEX);
        assert_eq!(class.class_data_off, 0);
        assert!(class.class_data.is_none());

        assert_eq!(dex.type_descriptor(class.class_idx).unwrap(), "LEmpty;");
        dex.verify_checksum().unwrap();
        dex.verify_signature().unwrap();
    }

    #[test]
    fn test_build_round_trips_methods() {
        let image = DexBuilder::new()
            .class(
                ClassBuilder::new("LAlpha;")
                    .direct_method(MethodBuilder::new("<clinit>").insns(6))
                    .direct_method(MethodBuilder::new("compute").insns(8))
                    .virtual_method(MethodBuilder::new("render").insns(5))
                    .virtual_method(MethodBuilder::new("frobnicate")),
            )
            .build()
            .unwrap();
        let dex = DexFile::from_mem(image, "built").unwrap();

        let class_data = dex.class_defs()[0].class_data.as_ref().unwrap();
        assert_eq!(class_data.direct_methods.len(), 2);
        assert_eq!(class_data.virtual_methods.len(), 2);

        // Member lists come back sorted by member index, so by name here.
        let clinit = &class_data.direct_methods[0];
        assert_eq!(dex.method_name(clinit.method_idx).unwrap(), "<clinit>");
        assert_eq!(
            clinit.access_flags,
            MethodAccessFlags::STATIC | MethodAccessFlags::CONSTRUCTOR
        );
        assert_eq!(clinit.code.as_ref().unwrap().size, 28);
        assert_eq!(clinit.code.as_ref().unwrap().insns_size, 6);

        let compute = &class_data.direct_methods[1];
        assert_eq!(dex.method_name(compute.method_idx).unwrap(), "compute");
        assert_eq!(
            compute.access_flags,
            MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC
        );
        assert_eq!(compute.code.as_ref().unwrap().size, 32);

        let frobnicate = &class_data.virtual_methods[0];
        assert_eq!(
            dex.method_name(frobnicate.method_idx).unwrap(),
            "frobnicate"
        );
        assert_eq!(
            frobnicate.access_flags,
            MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT
        );
        assert_eq!(frobnicate.code_off, 0);
        assert!(frobnicate.code.is_none());

        let render = &class_data.virtual_methods[1];
        assert_eq!(dex.method_name(render.method_idx).unwrap(), "render");
        assert_eq!(render.code.as_ref().unwrap().size, 26);
    }

    #[test]
    fn test_build_emits_fields() {
        let image = DexBuilder::new()
            .class(
                ClassBuilder::new("LHolder;")
                    .static_field(FieldBuilder::new("count", "I"))
                    .instance_field(FieldBuilder::new("label", "Ljava/lang/String;"))
                    .direct_method(MethodBuilder::new("<clinit>").insns(4)),
            )
            .build()
            .unwrap();
        let dex = DexFile::from_mem(image, "built").unwrap();

        assert_eq!(dex.header().field_ids_size, 2);
        let class_data = dex.class_defs()[0].class_data.as_ref().unwrap();
        assert_eq!(class_data.static_fields.len(), 1);
        assert_eq!(class_data.instance_fields.len(), 1);
        assert_eq!(
            class_data.static_fields[0].access_flags,
            FieldAccessFlags::PUBLIC | FieldAccessFlags::STATIC
        );
        assert_eq!(
            class_data.instance_fields[0].access_flags,
            FieldAccessFlags::PUBLIC
        );
    }

    #[test]
    fn test_try_handler_extends_code_item() {
        let image = DexBuilder::new()
            .class(
                ClassBuilder::new("LGuarded;")
                    .direct_method(MethodBuilder::new("odd").insns(3).with_try_handler())
                    .direct_method(MethodBuilder::new("even").insns(6).with_try_handler()),
            )
            .build()
            .unwrap();
        let dex = DexFile::from_mem(image, "built").unwrap();

        let class_data = dex.class_defs()[0].class_data.as_ref().unwrap();
        // "even" sorts before "odd".
        let even = class_data.direct_methods[0].code.as_ref().unwrap();
        assert_eq!(even.tries_size, 1);
        assert_eq!(even.size, 39); // 16 header + 12 insns + try_item + handlers
        let odd = class_data.direct_methods[1].code.as_ref().unwrap();
        assert_eq!(odd.tries_size, 1);
        assert_eq!(odd.size, 35); // 16 header + 6 insns + 2 pad + try_item + handlers
    }

    #[test]
    fn test_build_two_classes_in_declaration_order() {
        let image = DexBuilder::new()
            .class(ClassBuilder::new("LZulu;").direct_method(MethodBuilder::new("go").insns(2)))
            .class(ClassBuilder::new("LAlpha;"))
            .build()
            .unwrap();
        let dex = DexFile::from_mem(image, "built").unwrap();

        // class_defs keeps declaration order even though type indices sort.
        assert_eq!(
            dex.type_descriptor(dex.class_defs()[0].class_idx).unwrap(),
            "LZulu;"
        );
        assert_eq!(
            dex.type_descriptor(dex.class_defs()[1].class_idx).unwrap(),
            "LAlpha;"
        );
    }

    #[test]
    fn test_string_pool_sorted() {
        let image = DexBuilder::new()
            .class(
                ClassBuilder::new("LFoo;")
                    .direct_method(MethodBuilder::new("zebra").insns(1))
                    .direct_method(MethodBuilder::new("<clinit>").insns(1))
                    .direct_method(MethodBuilder::new("aardvark").insns(1)),
            )
            .build()
            .unwrap();
        let dex = DexFile::from_mem(image, "built").unwrap();

        let strings = dex.strings().unwrap();
        let mut decoded = Vec::new();
        for index in 0..strings.count() {
            decoded.push(strings.get(index).unwrap());
        }
        assert!(decoded.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(decoded.contains(&"aardvark".to_string()));
        assert!(decoded.contains(&"V".to_string()));
    }

    #[test]
    fn test_build_version_round_trip() {
        let image = DexBuilder::new()
            .version(39)
            .class(ClassBuilder::new("LFoo;"))
            .build()
            .unwrap();
        let dex = DexFile::from_mem(image, "built").unwrap();
        assert_eq!(dex.header().version, 39);
    }

    #[test]
    fn test_build_rejects_unsupported_version() {
        let result = DexBuilder::new()
            .version(36)
            .class(ClassBuilder::new("LFoo;"))
            .build();
        assert!(matches!(result, Err(Error::Error(_))));
    }

    #[test]
    fn test_build_rejects_duplicate_class() {
        let result = DexBuilder::new()
            .class(ClassBuilder::new("LFoo;"))
            .class(ClassBuilder::new("LFoo;"))
            .build();
        assert!(matches!(result, Err(Error::Error(_))));
    }

    #[test]
    fn test_build_rejects_duplicate_method() {
        let result = DexBuilder::new()
            .class(
                ClassBuilder::new("LFoo;")
                    .direct_method(MethodBuilder::new("run").insns(1))
                    .virtual_method(MethodBuilder::new("run").insns(1)),
            )
            .build();
        assert!(matches!(result, Err(Error::Error(_))));
    }

    #[test]
    fn test_mutf8_encoding_forms() {
        let (units, bytes) = encode_mutf8("ab");
        assert_eq!(units, 2);
        assert_eq!(bytes, vec![b'a', b'b']);

        // U+00E9 uses the two-byte form.
        let (units, bytes) = encode_mutf8("\u{e9}");
        assert_eq!(units, 1);
        assert_eq!(bytes, vec![0xC3, 0xA9]);

        // U+4E2D uses the three-byte form.
        let (units, bytes) = encode_mutf8("\u{4e2d}");
        assert_eq!(units, 1);
        assert_eq!(bytes, vec![0xE4, 0xB8, 0xAD]);

        // U+10400 encodes as a surrogate pair, three bytes per unit.
        let (units, bytes) = encode_mutf8("\u{10400}");
        assert_eq!(units, 2);
        assert_eq!(bytes, vec![0xED, 0xA0, 0x81, 0xED, 0xB0, 0x80]);

        // Embedded NUL uses the two-byte C0 80 form.
        let (units, bytes) = encode_mutf8("a\u{0}b");
        assert_eq!(units, 3);
        assert_eq!(bytes, vec![b'a', 0xC0, 0x80, b'b']);
    }

    #[test]
    fn test_uleb128_encoding() {
        let mut out = Vec::new();
        push_uleb128(&mut out, 0);
        push_uleb128(&mut out, 0x7F);
        push_uleb128(&mut out, 0x80);
        push_uleb128(&mut out, 0x4000);
        assert_eq!(out, vec![0x00, 0x7F, 0x80, 0x01, 0x80, 0x80, 0x01]);
    }

    #[test]
    fn test_built_image_passes_both_digests() {
        let image = DexBuilder::new()
            .class(
                ClassBuilder::new("LFoo;")
                    .direct_method(MethodBuilder::new("<clinit>").insns(10))
                    .virtual_method(MethodBuilder::new("run").insns(4)),
            )
            .build()
            .unwrap();
        let dex = DexFile::from_mem(image, "built").unwrap();
        dex.verify_checksum().unwrap();
        dex.verify_signature().unwrap();
    }
}
