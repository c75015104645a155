//! Appinfo binary format constants and the version (dialect) enum.
//!
//! ## Header (8 bytes)
//!
//! ```text
//! [version: u32 LE][universe: u32 LE]
//! ```
//!
//! ## App header (44 bytes, after the 4-byte app id)
//!
//! ```text
//! [size: u32][state: u32][last_update: u32][access_token: u64][checksum: 20 B][change_number: u32]
//! ```
//!
//! The version magic selects the dialect. `0x07564427` (dialect A) stores a
//! single section tree per app, `0x07564426` (dialect B) stores a list of
//! named sections each tagged with a one-byte id.

/// Magic of the older dialect (named, id-tagged sections per app).
pub const VERSION_DIALECT_B: u32 = 0x0756_4426;

/// Magic of the newer dialect (one section tree per app).
pub const VERSION_DIALECT_A: u32 = 0x0756_4427;

/// The only universe value the producer writes.
pub const UNIVERSE: u32 = 0x0000_0001;

/// Tag: nested section.
pub const TAG_SECTION: u8 = 0x00;
/// Tag: NUL-terminated byte string.
pub const TAG_STRING: u8 = 0x01;
/// Tag: little-endian u32.
pub const TAG_INT32: u8 = 0x02;
/// Tag: little-endian u64.
pub const TAG_INT64: u8 = 0x07;
/// Tag: end of a section tree's entries.
pub const TAG_END: u8 = 0x08;

/// Terminates a dialect-B per-app section list.
pub const SECTION_LIST_END: u8 = 0x00;

/// App id that terminates the document.
pub const APP_LIST_END: u32 = 0;

/// Width of the opaque per-app checksum.
pub const CHECKSUM_LEN: usize = 20;

/// Size of the document header: 4 (`version`) + 4 (`universe`).
pub const HEADER_BYTES: usize = 4 + 4;

/// Size of the fixed app header that follows the app id:
/// 4 (`size`) + 4 (`state`) + 4 (`last_update`) + 8 (`access_token`)
/// + 20 (`checksum`) + 4 (`change_number`).
pub const APP_HEADER_BYTES: usize = 4 + 4 + 4 + 8 + CHECKSUM_LEN + 4;

/// Deepest section nesting the decoder and encoder accept.
pub const MAX_DEPTH: usize = 512;

/// On-disk dialect, selected by the header's version magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatVersion {
    /// `0x07564427`: each app carries a single section tree.
    DialectA,
    /// `0x07564426`: each app carries named sections with opaque ids.
    DialectB,
}

impl FormatVersion {
    /// Maps a header magic to its dialect, `None` if unrecognized.
    #[must_use]
    pub fn from_magic(magic: u32) -> Option<Self> {
        match magic {
            VERSION_DIALECT_A => Some(FormatVersion::DialectA),
            VERSION_DIALECT_B => Some(FormatVersion::DialectB),
            _ => None,
        }
    }

    /// Returns the header magic for this dialect.
    #[must_use]
    pub fn magic(&self) -> u32 {
        match self {
            FormatVersion::DialectA => VERSION_DIALECT_A,
            FormatVersion::DialectB => VERSION_DIALECT_B,
        }
    }

    /// Returns `true` if apps carry a list of named sections (dialect B).
    #[must_use]
    pub fn has_named_sections(&self) -> bool {
        matches!(self, FormatVersion::DialectB)
    }
}
