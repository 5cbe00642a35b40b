//! Hashing utilities
//!
//! SHA-256 helpers used to derive account-style addresses for the
//! launchpad and for every token it creates.

use sha2::{Digest, Sha256};

/// Length of a derived address in hex characters (20 bytes)
pub const ADDRESS_HEX_LEN: usize = 40;

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Derive a `0x`-prefixed address from a list of seed parts.
///
/// Parts are joined with `:` before hashing, and the first 20 bytes of the
/// digest form the address.
pub fn derive_address(parts: &[&str]) -> String {
    let input = parts.join(":");
    let hex = sha256_hex(input.as_bytes());
    format!("0x{}", &hex[..ADDRESS_HEX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let data = b"hello world";
        let hash = sha256(data);
        assert_eq!(hash.len(), 32);
        assert_eq!(
            sha256_hex(data),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_derive_address_shape() {
        let address = derive_address(&["owner", "launchpad"]);
        assert!(address.starts_with("0x"));
        assert_eq!(address.len(), 2 + ADDRESS_HEX_LEN);
    }

    #[test]
    fn test_derive_address_depends_on_every_part() {
        let a = derive_address(&["creator", "TST", "0"]);
        let b = derive_address(&["creator", "TST", "1"]);
        let c = derive_address(&["creator", "TST", "0"]);
        assert_ne!(a, b);
        assert_eq!(a, c);
    }
}
