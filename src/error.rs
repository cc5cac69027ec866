use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all possible error conditions that can occur during DEX file parsing,
/// integrity verification, and access-tracking range collection. Each variant provides specific
/// context about the failure mode to enable appropriate error handling.
///
/// # Error Categories
///
/// ## File Parsing Errors
/// - [`Error::Malformed`] - Corrupted or invalid file structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond file boundaries
/// - [`Error::NotSupported`] - Unsupported file format or feature
/// - [`Error::Empty`] - Empty input provided
///
/// ## Integrity Errors
/// - [`Error::ChecksumMismatch`] - Header Adler-32 checksum does not match file contents
/// - [`Error::SignatureMismatch`] - Header SHA-1 signature does not match file contents
///
/// ## I/O and External Errors
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// # Examples
///
/// ```rust
/// use dexshadow::{DexFile, Error};
/// use std::path::Path;
///
/// match DexFile::from_file(Path::new("classes.dex")) {
///     Ok(dex) => {
///         println!("Successfully loaded {}", dex.location());
///     }
///     Err(Error::NotSupported) => {
///         eprintln!("File format is not supported");
///     }
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed file: {} ({}:{})", message, file, line);
///     }
///     Err(Error::FileError(io_err)) => {
///         eprintln!("I/O error: {}", io_err);
///     }
///     Err(e) => {
///         eprintln!("Other error: {}", e);
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // File parsing Errors
    /// The file is damaged and could not be parsed.
    ///
    /// This error indicates that the file structure is corrupted or doesn't
    /// conform to the expected DEX format. The error includes the source
    /// location where the malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the file.
    ///
    /// This error occurs when trying to read data beyond the end of the file
    /// or stream. It's a safety check to prevent buffer overruns during parsing.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// This file type is not supported.
    ///
    /// Indicates that the input file is not a supported DEX file, or uses a
    /// format revision (such as big-endian encoding or compact DEX) that is
    /// not implemented in this library.
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    ///
    /// This error occurs when an empty file or buffer is provided where
    /// actual DEX data was expected.
    #[error("Provided input was empty")]
    Empty,

    /// The header checksum does not match the file contents.
    ///
    /// The DEX header carries an Adler-32 checksum over everything following
    /// the checksum field itself. This error reports both the stored and the
    /// recomputed value.
    #[error("Adler-32 checksum mismatch - header {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// The checksum stored in the header
        expected: u32,
        /// The checksum computed over the file contents
        computed: u32,
    },

    /// The header SHA-1 signature does not match the file contents.
    ///
    /// The DEX header carries a SHA-1 digest over everything following the
    /// signature field itself. A mismatch means the file was truncated or
    /// modified after it was produced.
    #[error("SHA-1 signature does not match file contents")]
    SignatureMismatch,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations
    /// such as reading from disk, permission issues, or filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories, such as
    /// invalid input handed to the container builder.
    #[error("{0}")]
    Error(String),
}
