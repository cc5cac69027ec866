//! DEX container parsing.
//!
//! This module turns raw container bytes into the structures the tracking passes
//! walk. Parsing is eager for the spine of the format and lazy for the leaves:
//! loading a [`DexFile`] resolves the header, every class definition, each class's
//! member lists, and each method's code item extent, while strings and identifier
//! tables are decoded only when a lookup asks for them.
//!
//! # Key Components
//!
//! - [`DexFile`] - The owning container, loadable from disk or memory
//! - [`DexHeader`] - The validated 112-byte `header_item`
//! - [`ClassDef`] / [`ClassData`] - Class definitions with resolved member lists
//! - [`EncodedMethod`] / [`EncodedField`] - Individual class members
//! - [`CodeItem`] - A method body with its measured byte extent
//! - [`StringIds`] / [`TypeIds`] / [`MethodIds`] - Lazy identifier table views
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use dexshadow::DexFile;
//!
//! let dex = DexFile::from_file("classes.dex")?;
//! for class in dex.class_defs() {
//!     let Some(class_data) = &class.class_data else { continue };
//!     for method in &class_data.direct_methods {
//!         if let Some(code) = &method.code {
//!             let name = dex.method_name(method.method_idx)?;
//!             println!("{name}: {} code units at {:#x}", code.insns_size, code.offset);
//!         }
//!     }
//! }
//! # Ok::<(), dexshadow::Error>(())
//! ```

mod class;
mod code;
mod dexfile;
mod header;
mod ids;
mod strings;
pub mod types;

pub use class::{ClassData, ClassDef, EncodedField, EncodedMethod};
pub use code::CodeItem;
pub use dexfile::DexFile;
pub use header::DexHeader;
pub use ids::{MethodId, MethodIds, TypeIds};
pub use strings::StringIds;
pub use types::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
