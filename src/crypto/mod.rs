//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 and hash160 hashing
//! - ECDSA key management (secp256k1) and account derivation

pub mod hash;
pub mod keys;

pub use hash::{hash160, sha256};
pub use keys::{public_key_to_account, KeyError, KeyPair};
