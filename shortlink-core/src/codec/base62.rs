//! Base62 codec over the alphabet `0-9A-Za-z`

use super::CodecError;

pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const BASE: u64 = 62;

/// Longest code accepted by [`validate_code`]
pub const MAX_CODE_LEN: usize = 16;

/// Encode a number as Base62, most significant digit first
///
/// `0` encodes to `"0"`.
pub fn encode_base62(mut num: u64) -> String {
    if num == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut digits = Vec::with_capacity(11); // u64::MAX is 11 digits
    while num > 0 {
        digits.push(ALPHABET[(num % BASE) as usize]);
        num /= BASE;
    }
    digits.reverse();

    // Every byte comes from ALPHABET, which is ASCII
    digits.into_iter().map(char::from).collect()
}

/// Decode a Base62 code back into its number
pub fn decode_base62(code: &str) -> Result<u64, CodecError> {
    if code.is_empty() {
        return Err(CodecError::Empty);
    }

    code.chars().try_fold(0u64, |acc, c| {
        let digit = digit_value(c).ok_or(CodecError::InvalidCharacter(c))?;
        acc.checked_mul(BASE)
            .and_then(|n| n.checked_add(digit))
            .ok_or_else(|| CodecError::Overflow(code.to_string()))
    })
}

/// Single-segment paths served by a fixed route instead of a redirect
pub const RESERVED_CODES: &[&str] = &["health", "shorten"];

/// Short code for a record id, or `None` when the code is reserved
pub fn code_for_id(id: u64) -> Option<String> {
    let code = encode_base62(id);
    (!RESERVED_CODES.contains(&code.as_str())).then_some(code)
}

/// Check that a code has 1 to 16 characters, all from the Base62 alphabet
pub fn validate_code(code: &str) -> bool {
    (1..=MAX_CODE_LEN).contains(&code.len()) && code.chars().all(|c| digit_value(c).is_some())
}

#[inline]
fn digit_value(c: char) -> Option<u64> {
    match c {
        '0'..='9' => Some(c as u64 - '0' as u64),
        'A'..='Z' => Some(c as u64 - 'A' as u64 + 10),
        'a'..='z' => Some(c as u64 - 'a' as u64 + 36),
        _ => None,
    }
}
