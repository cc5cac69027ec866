//! The top-level DEX container type.
//!
//! [`DexFile`] owns its backing bytes through a [`crate::file::Backend`] and eagerly
//! parses the structures the tracking passes walk: the header, every class
//! definition, and each method's code item. String, type, and method identifier
//! tables are exposed as lazy views resolved on demand.
//!
//! Integrity digests are deliberately not checked at load time. A container parses
//! successfully with a stale checksum; callers that need the guarantee opt in via
//! [`DexFile::verify_checksum`] and [`DexFile::verify_signature`].

use std::path::Path;

use sha1::{Digest, Sha1};

use crate::{
    dex::{
        class::ClassDef,
        header::DexHeader,
        ids::{MethodIds, TypeIds},
        strings::StringIds,
        types::CLASS_DEF_ITEM_SIZE,
    },
    file::{Backend, Memory, Physical},
    Result,
};

/// A parsed DEX container.
///
/// The container keeps its raw bytes alive for the lifetime of the value, so range
/// addresses computed from [`DexFile::base`] stay valid for as long as the `DexFile`
/// exists.
///
/// # Examples
///
/// ```rust,no_run
/// use dexshadow::DexFile;
///
/// let dex = DexFile::from_file("classes.dex")?;
/// println!(
///     "{} spans {:#x} bytes at {:#x}",
///     dex.location(),
///     dex.size(),
///     dex.base()
/// );
///
/// for class in dex.class_defs() {
///     println!("class type index {}", class.class_idx);
/// }
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub struct DexFile {
    /// Backing storage, either memory-mapped or an owned buffer
    data: Box<dyn Backend>,
    /// Human-readable origin, a file path or a caller-supplied label
    location: String,
    /// The parsed header
    header: DexHeader,
    /// All class definitions with their members and code items resolved
    class_defs: Vec<ClassDef>,
}

impl DexFile {
    /// Load and parse a DEX container from disk via memory mapping.
    ///
    /// The file's path becomes the container's [`DexFile::location`].
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened, and the
    /// parse errors described on [`DexFile::from_mem`] for invalid content.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<DexFile> {
        let location = path.as_ref().display().to_string();
        let backend = Physical::new(path)?;
        Self::from_backend(Box::new(backend), location)
    }

    /// Parse a DEX container from an in-memory buffer.
    ///
    /// # Arguments
    /// * `data` - The container contents, which the `DexFile` takes ownership of
    /// * `location` - A label identifying the container's origin in log output
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for an empty buffer,
    /// [`crate::Error::OutOfBounds`] for truncated content,
    /// [`crate::Error::NotSupported`] for unknown format versions, and
    /// [`crate::Error::Malformed`] for structural violations.
    pub fn from_mem(data: Vec<u8>, location: impl Into<String>) -> Result<DexFile> {
        if data.is_empty() {
            return Err(crate::Error::Empty);
        }

        Self::from_backend(Box::new(Memory::new(data)), location.into())
    }

    fn from_backend(data: Box<dyn Backend>, location: String) -> Result<DexFile> {
        let bytes = data.data();
        let header = DexHeader::read(bytes)?;

        if header.file_size as usize > bytes.len() {
            return Err(malformed_error!(
                "Declared file size {:#x} exceeds the {:#x} byte container",
                header.file_size,
                bytes.len()
            ));
        }

        let mut class_defs = Vec::with_capacity(header.class_defs_size as usize);
        for index in 0..header.class_defs_size {
            let offset =
                header.class_defs_off as usize + index as usize * CLASS_DEF_ITEM_SIZE as usize;
            class_defs.push(ClassDef::read(bytes, offset)?);
        }

        Ok(DexFile {
            data,
            location,
            header,
            class_defs,
        })
    }

    /// Address of the first byte of the container in this process
    #[must_use]
    pub fn base(&self) -> u64 {
        self.data.data().as_ptr() as usize as u64
    }

    /// Size of the container in bytes, from the header's `file_size`
    #[must_use]
    pub fn size(&self) -> usize {
        self.header.file_size as usize
    }

    /// Human-readable origin of this container
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The container contents, trimmed to the declared file size
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data.data()[..self.header.file_size as usize]
    }

    /// The parsed header
    #[must_use]
    pub fn header(&self) -> &DexHeader {
        &self.header
    }

    /// All class definitions in the container
    #[must_use]
    pub fn class_defs(&self) -> &[ClassDef] {
        &self.class_defs
    }

    /// View over the string identifiers table.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the header's table bounds are invalid.
    pub fn strings(&self) -> Result<StringIds<'_>> {
        StringIds::new(
            self.data(),
            self.header.string_ids_off,
            self.header.string_ids_size,
        )
    }

    /// View over the type identifiers table.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the header's table bounds are invalid.
    pub fn type_ids(&self) -> Result<TypeIds<'_>> {
        TypeIds::new(
            self.data(),
            self.header.type_ids_off,
            self.header.type_ids_size,
        )
    }

    /// View over the method identifiers table.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the header's table bounds are invalid.
    pub fn method_ids(&self) -> Result<MethodIds<'_>> {
        MethodIds::new(
            self.data(),
            self.header.method_ids_off,
            self.header.method_ids_size,
        )
    }

    /// Resolve the declared name of the method at `method_idx`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index or the name it references
    /// is invalid.
    pub fn method_name(&self, method_idx: u32) -> Result<String> {
        let method_id = self.method_ids()?.get(method_idx)?;
        self.strings()?.get(method_id.name_idx)
    }

    /// Resolve the descriptor string of the type at `type_idx`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index or the descriptor it
    /// references is invalid.
    pub fn type_descriptor(&self, type_idx: u32) -> Result<String> {
        let descriptor_idx = self.type_ids()?.descriptor_idx(type_idx)?;
        self.strings()?.get(descriptor_idx)
    }

    /// Verify the header's Adler-32 checksum against the container contents.
    ///
    /// The digest covers everything after the checksum field itself, bytes 12
    /// through `file_size`.
    ///
    /// # Errors
    /// Returns [`crate::Error::ChecksumMismatch`] carrying both digests on failure.
    pub fn verify_checksum(&self) -> Result<()> {
        let computed = adler::adler32_slice(&self.data()[12..]);
        if computed != self.header.checksum {
            return Err(crate::Error::ChecksumMismatch {
                expected: self.header.checksum,
                computed,
            });
        }

        Ok(())
    }

    /// Verify the header's SHA-1 signature against the container contents.
    ///
    /// The digest covers everything after the signature field itself, bytes 32
    /// through `file_size`.
    ///
    /// # Errors
    /// Returns [`crate::Error::SignatureMismatch`] on failure.
    pub fn verify_signature(&self) -> Result<()> {
        let mut hasher = Sha1::new();
        hasher.update(&self.data()[32..]);
        let computed = hasher.finalize();

        if computed[..] != self.header.signature {
            return Err(crate::Error::SignatureMismatch);
        }

        Ok(())
    }
}

impl std::fmt::Debug for DexFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DexFile")
            .field("location", &self.location)
            .field("version", &self.header.version)
            .field("file_size", &self.header.file_size)
            .field("class_defs", &self.class_defs.len())
            .finish()
    }
}
