//! Wallet module for account key management

pub mod wallet;

pub use wallet::{Wallet, WalletError, WalletInfo, WalletManager};
