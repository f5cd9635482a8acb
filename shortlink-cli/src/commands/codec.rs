use shortlink_core::codec::{decode_base62, encode_base62};

pub fn encode(number: u64) -> String {
    encode_base62(number)
}

pub fn decode(code: &str) -> Result<u64, String> {
    decode_base62(code).map_err(|e| format!("cannot decode \"{}\": {}", code, e))
}
