//! Error types for the appinfo codec.

use std::fmt;
use std::io;

use thiserror::Error;

/// Identifies the key that was repeated in a [`CodecError::DuplicateKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRef {
    /// A repeated application id.
    AppId(u32),
    /// A repeated dialect-B section name or section tree key.
    Name(Vec<u8>),
}

impl fmt::Display for KeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRef::AppId(id) => write!(f, "app id {}", id),
            KeyRef::Name(name) => write!(f, "{:?}", String::from_utf8_lossy(name)),
        }
    }
}

/// Errors produced while decoding or encoding an appinfo document.
///
/// Offsets are byte positions in the input buffer at which the problem was
/// detected.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The buffer ended before a fixed-width field or a C-string terminator.
    #[error("truncated input at offset {offset}")]
    TruncatedInput { offset: usize },

    /// The 8-byte document header is missing or short.
    #[error("invalid header: need 8 bytes, found {len}")]
    InvalidHeader { len: usize },

    /// The header's version magic is not one of the known dialects.
    #[error("unsupported version: {0:#010x}")]
    UnsupportedVersion(u32),

    /// The header's universe is not the recognized constant.
    #[error("unsupported universe: {0:#010x}")]
    UnsupportedUniverse(u32),

    /// A section tag byte outside the known set.
    #[error("unknown value type {tag:#04x} at offset {offset}")]
    UnknownValueType { tag: u8, offset: usize },

    /// A key repeated where uniqueness is required.
    #[error("duplicate key {key} at offset {offset}")]
    DuplicateKey { key: KeyRef, offset: usize },

    /// Sections nested deeper than [`MAX_DEPTH`](crate::MAX_DEPTH).
    #[error("sections nested too deeply at offset {offset}")]
    NestingTooDeep { offset: usize },

    /// The encoder was handed content the format cannot represent.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// An I/O error from the stream or file wrappers.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A convenience `Result` alias using [`CodecError`].
pub type Result<T> = std::result::Result<T, CodecError>;
