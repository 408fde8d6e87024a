//! Parser module - shared decoding primitives and the transaction classifier
//!
//! Raw RPC values are loosely typed: numbers may arrive as JSON strings or
//! numbers, addresses in short or long hex form. The helpers here are the
//! single place where those values are coerced.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub mod encoding;
pub mod effects;
pub mod layout;
pub mod transaction;

// Re-export key types
pub use effects::{ObjectCategory, find_created_object, find_created_or_mutated_object};
pub use transaction::{AuctionTransaction, AuctionTxInputs, AuctionTxKind, AuctionTxParser};

/// Address used on-chain to mean "nobody", e.g. an auction without a leader
pub const ZERO_ADDRESS: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000";

/// Module holding the auction entry functions in the standard deployment
pub const DEFAULT_MODULE: &str = "auction";

/// Hex digits in a full-width address
const ADDRESS_HEX_LEN: usize = 64;

/// Normalize an address to lowercase, 0x-prefixed, 64 hex digits
pub fn normalize_address(addr: &str) -> String {
    let trimmed = addr.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
        .to_lowercase();
    format!("0x{:0>width$}", hex, width = ADDRESS_HEX_LEN)
}

pub fn is_zero_address(addr: &str) -> bool {
    normalize_address(addr) == ZERO_ADDRESS
}

/// Extract the single generic argument of a type descriptor
///
/// `0xPKG::auction::Auction<0xPKG::token::TOKEN>` → `0xPKG::token::TOKEN`.
/// Auction types never nest generics, so plain slicing is enough.
pub fn currency_type_from_descriptor(descriptor: &str) -> Option<String> {
    let (_, after) = descriptor.split_once('<')?;
    let (inner, _) = after.split_once('>')?;
    if inner.is_empty() {
        return None;
    }
    Some(inner.to_string())
}

/// Coerce a JSON string or number into a `u64`
pub fn json_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a JSON string or number into a `u128`
pub fn json_u128(value: &Value) -> Option<u128> {
    match value {
        Value::Number(n) => n.as_u64().map(u128::from),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn json_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Read a JSON array of strings; any non-string element fails the whole read
pub fn json_string_vec(value: &Value) -> Option<Vec<String>> {
    value.as_array()?.iter().map(json_string).collect()
}

/// Read a JSON array of byte values (raw pure input bytes)
pub fn json_bytes(value: &Value) -> Option<Vec<u8>> {
    value
        .as_array()?
        .iter()
        .map(|b| b.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}

// serde helpers for string-or-number fields

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Number(u64),
    String(String),
}

impl StringOrNumber {
    fn parse<T: std::str::FromStr + From<u64>>(self) -> Result<T, String> {
        match self {
            StringOrNumber::Number(n) => Ok(T::from(n)),
            StringOrNumber::String(s) => s
                .trim()
                .parse()
                .map_err(|_| format!("invalid integer {:?}", s)),
        }
    }
}

pub fn de_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    StringOrNumber::deserialize(deserializer)?
        .parse()
        .map_err(serde::de::Error::custom)
}

pub fn de_u128<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    StringOrNumber::deserialize(deserializer)?
        .parse()
        .map_err(serde::de::Error::custom)
}

pub fn de_opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Option::<StringOrNumber>::deserialize(deserializer)?
        .map(|v| v.parse().map_err(serde::de::Error::custom))
        .transpose()
}
