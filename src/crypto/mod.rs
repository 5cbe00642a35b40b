//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 hashing
//! - Address derivation for the launchpad and created tokens

pub mod hash;

pub use hash::{derive_address, sha256, sha256_hex, ADDRESS_HEX_LEN};
