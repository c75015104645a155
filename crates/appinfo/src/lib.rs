//! # Appinfo - Binary VDF Codec
//!
//! Decodes and encodes the binary key-value format used to store
//! per-application metadata (`appinfo.vdf`). A decoded [`Document`] encodes
//! back to byte-identical output, so files can be edited and written back
//! without disturbing anything the caller did not touch.
//!
//! The codec is pure: [`decode`] and [`encode`] work on in-memory buffers,
//! hold no state between calls and never log. The [`io`] module adds
//! stream and file wrappers.
//!
//! ## File layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ HEADER  version (u32) | universe (u32)                        │
//! ├───────────────────────────────────────────────────────────────┤
//! │ APP     app_id (u32)                                          │
//! │         size (u32) | state (u32) | last_update (u32)          │
//! │         access_token (u64) | checksum (20 B)                  │
//! │         change_number (u32)                                   │
//! │         SECTIONS (dialect-specific, see below)                │
//! │                                                               │
//! │ ... repeated for each app ...                                 │
//! ├───────────────────────────────────────────────────────────────┤
//! │ END     app_id = 0 (u32)                                      │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! A section tree is a run of `[tag: u8][key\0][payload]` entries closed by
//! a `0x08` tag:
//!
//! | Tag    | Payload                        |
//! |--------|--------------------------------|
//! | `0x00` | nested section tree            |
//! | `0x01` | NUL-terminated byte string     |
//! | `0x02` | u32                            |
//! | `0x07` | u64                            |
//! | `0x08` | none; ends the tree            |
//!
//! The root tree of an app's payload is followed by a second `0x08`.
//!
//! All integers are little-endian.
//!
//! ## Dialects
//!
//! | Magic        | Dialect | Sections per app                                    |
//! |--------------|---------|-----------------------------------------------------|
//! | `0x07564427` | A       | one root tree                                       |
//! | `0x07564426` | B       | `[id: u8][0x00][name\0][root tree]`... then `0x00`  |
//!
//! ## Example
//!
//! ```rust
//! use appinfo::{AppRecord, Document, FormatVersion, SectionTree, Sections, Value};
//!
//! let mut tree = SectionTree::new();
//! tree.insert("name", "Example");
//! tree.insert("gameid", Value::Int64(440));
//!
//! let mut doc = Document::new(FormatVersion::DialectA);
//! doc.insert(440, AppRecord::new(Sections::Single(tree))).unwrap();
//!
//! let bytes = appinfo::encode(&doc).unwrap();
//! assert_eq!(appinfo::decode(&bytes).unwrap(), doc);
//! ```

mod cursor;
mod decoder;
mod encoder;
mod error;
mod format;
pub mod io;
mod model;

pub use cursor::Cursor;
pub use decoder::decode;
pub use encoder::{encode, encode_into};
pub use error::{CodecError, KeyRef, Result};
pub use format::{
    FormatVersion, APP_HEADER_BYTES, APP_LIST_END, CHECKSUM_LEN, HEADER_BYTES, MAX_DEPTH,
    SECTION_LIST_END, TAG_END, TAG_INT32, TAG_INT64, TAG_SECTION, TAG_STRING, UNIVERSE,
    VERSION_DIALECT_A, VERSION_DIALECT_B,
};
pub use model::{AppRecord, Document, NamedSection, NamedSections, SectionTree, Sections, Value};

#[cfg(test)]
mod tests;
