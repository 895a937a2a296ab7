//! Token Ledger: a fungible token ledger in Rust
//!
//! This crate provides a single fixed-supply token featuring:
//! - Balances and allowances keyed by 20-byte account identifiers
//! - 256-bit amounts with checked arithmetic on every update
//! - Transfer, approve and delegated transfer with all-or-nothing semantics
//! - An append-only Transfer/Approval notification log with subscribers
//! - A lock-guarded shared handle for concurrent callers
//! - secp256k1 wallets for local account identities
//! - JSON persistence with backups
//! - REST API and WebSocket notifications
//!
//! # Example
//!
//! ```rust
//! use alloy_primitives::U256;
//! use token_ledger::token::{SharedLedger, TokenLedger, TokenMetadata};
//! use token_ledger::wallet::Wallet;
//!
//! let creator = Wallet::new();
//! let recipient = Wallet::new();
//!
//! let metadata = TokenMetadata::new("My Token".to_string(), "MTK".to_string(), 18).unwrap();
//! let supply = metadata.parse_amount("1000").unwrap();
//! let ledger = SharedLedger::new(TokenLedger::new(metadata, supply, creator.account()).unwrap());
//!
//! let amount = U256::from(10u64).pow(U256::from(20u64));
//! ledger.transfer(creator.account(), recipient.account(), amount).unwrap();
//! assert_eq!(ledger.balance_of(&recipient.account()), amount);
//! ```

pub mod api;
pub mod cli;
pub mod crypto;
pub mod storage;
pub mod token;
pub mod wallet;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use crypto::KeyPair;
pub use storage::{Storage, StorageConfig};
pub use token::{
    AccountId, Amount, LedgerEvent, SharedLedger, TokenError, TokenLedger, TokenMetadata,
    NULL_ACCOUNT,
};
pub use wallet::{Wallet, WalletManager};
