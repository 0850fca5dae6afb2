//! Error types for wire encoding and decoding
//!
//! Decode errors are always fatal to the decode call and carry the byte
//! offset or identifier that triggered them. Registration errors are
//! programming bugs surfaced immediately.

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Wire codec errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Input ended before the required number of bytes could be read
    #[error("not enough bytes at offset {offset}: need {needed}, have {available}")]
    UnexpectedEof {
        /// Byte offset at which the read was attempted
        offset: usize,
        /// Number of bytes the read required
        needed: usize,
        /// Number of bytes remaining in the buffer
        available: usize,
    },

    /// A boolean field held a byte other than 0 or 1
    #[error("invalid boolean byte {value:#04x} at offset {offset}")]
    InvalidBool {
        /// Byte offset of the offending byte
        offset: usize,
        /// The byte that was read
        value: u8,
    },

    /// A string field was not valid UTF-8
    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 {
        /// Byte offset of the string payload
        offset: usize,
    },

    /// A type-id prefix had no registered constructor
    #[error("unknown wire type id {id}")]
    UnknownTypeId {
        /// The type id read from the wire
        id: u32,
    },

    /// A codec version prefix had no registered codec
    #[error("unknown codec version {version}")]
    UnknownVersion {
        /// The version read from the wire
        version: u16,
    },

    /// A value's type was not registered with the codec used to encode it
    #[error("cannot encode unregistered type {tag:?}")]
    UnregisteredType {
        /// Stable tag of the unregistered type
        tag: &'static str,
    },

    /// A codec version was registered twice
    #[error("codec version {version} already registered")]
    DuplicateVersion {
        /// The duplicated version
        version: u16,
    },

    /// A type tag was registered twice within one registry
    #[error("type tag {tag:?} already registered")]
    DuplicateTag {
        /// The duplicated tag
        tag: &'static str,
    },

    /// A string exceeds what its 2-byte length prefix can describe
    #[error("string of {len} bytes exceeds the {max}-byte wire limit")]
    StringTooLong {
        /// Length of the offending string
        len: usize,
        /// Maximum encodable length
        max: usize,
    },

    /// A whole-message decode left unconsumed bytes
    #[error("{remaining} trailing bytes after decode")]
    TrailingBytes {
        /// Number of bytes left unconsumed
        remaining: usize,
    },
}
