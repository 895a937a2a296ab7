//! ERC-20 style fungible token ledger
//!
//! Provides a single fixed-supply token with:
//! - Balances per account
//! - Allowances for delegated transfers
//! - Transfer, approve and transfer-from operations
//! - An append-only notification log with pluggable subscribers
//!
//! # Example
//!
//! ```rust
//! use alloy_primitives::{Address, U256};
//! use token_ledger::token::{TokenLedger, TokenMetadata};
//!
//! let creator = Address::repeat_byte(0x11);
//! let recipient = Address::repeat_byte(0x22);
//!
//! let metadata = TokenMetadata::new("My Token".to_string(), "MTK".to_string(), 18).unwrap();
//! let supply = metadata.parse_amount("1000").unwrap();
//! let mut ledger = TokenLedger::new(metadata, supply, creator).unwrap();
//!
//! ledger.transfer(creator, recipient, U256::from(1000u64)).unwrap();
//! assert_eq!(ledger.balance_of(&recipient), U256::from(1000u64));
//! ```

pub mod events;
pub mod ledger;
pub mod shared;
pub mod units;

pub use events::{
    ApprovalEvent, EventLog, EventRecord, EventSink, LedgerEvent, LogSink, TransferEvent,
};
pub use ledger::{AccountId, Amount, TokenError, TokenLedger, TokenMetadata, NULL_ACCOUNT};
pub use shared::SharedLedger;
