//! Short code encoding
//!
//! Short codes are the Base62 rendering of a record's numeric id.

pub mod base62;

pub use base62::{
    code_for_id, decode_base62, encode_base62, validate_code, ALPHABET, MAX_CODE_LEN,
    RESERVED_CODES,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Empty code")]
    Empty,
    #[error("Invalid character '{0}' in code")]
    InvalidCharacter(char),
    #[error("Code overflows a 64-bit id: {0}")]
    Overflow(String),
}
