//! BCS decoding of raw pure-input bytes

use crate::error::DecodeError;

/// On-chain address width in bytes
pub const ADDRESS_LENGTH: usize = 32;

/// Decode a BCS `vector<address>` into 0x-prefixed 64-hex strings
pub fn bcs_addresses(bytes: &[u8]) -> Result<Vec<String>, DecodeError> {
    let raw: Vec<[u8; ADDRESS_LENGTH]> = bcs::from_bytes(bytes)?;
    Ok(raw
        .iter()
        .map(|addr| format!("0x{}", hex::encode(addr)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u8) -> [u8; ADDRESS_LENGTH] {
        let mut a = [0u8; ADDRESS_LENGTH];
        a[ADDRESS_LENGTH - 1] = last;
        a
    }

    #[test]
    fn test_decode_address_vector() {
        let bytes = bcs::to_bytes(&vec![addr(1), addr(0xab)]).unwrap();
        assert_eq!(bytes[0], 2); // ULEB128 length prefix
        assert_eq!(bytes.len(), 1 + 2 * ADDRESS_LENGTH);

        let decoded = bcs_addresses(&bytes).unwrap();
        assert_eq!(
            decoded,
            vec![
                "0x0000000000000000000000000000000000000000000000000000000000000001",
                "0x00000000000000000000000000000000000000000000000000000000000000ab",
            ]
        );
    }

    #[test]
    fn test_decode_empty_vector() {
        assert!(bcs_addresses(&[0]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_truncated_bytes() {
        // Claims two addresses but carries one
        let mut bytes = vec![2u8];
        bytes.extend_from_slice(&addr(1));
        assert!(matches!(bcs_addresses(&bytes), Err(DecodeError::Bcs(_))));
    }
}
