//! Local keystore for ledger accounts
//!
//! A wallet holds the key behind an account identifier. The CLI only issues
//! operations on behalf of accounts whose wallet file is present.

use crate::crypto::KeyPair;
use crate::token::AccountId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Wallet-related errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet not found for account {0}")]
    NotFound(AccountId),
    #[error("Wallet file does not match account {0}")]
    AccountMismatch(AccountId),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Crypto error: {0}")]
    CryptoError(#[from] crate::crypto::KeyError),
}

/// Serializable wallet data for persistence
#[derive(Debug, Serialize, Deserialize)]
struct WalletData {
    private_key_hex: String,
    account: AccountId,
    label: Option<String>,
}

/// The key pair behind one ledger account
pub struct Wallet {
    key_pair: KeyPair,
    pub label: Option<String>,
}

impl Wallet {
    /// Create a new wallet with a fresh key pair
    pub fn new() -> Self {
        Self {
            key_pair: KeyPair::generate(),
            label: None,
        }
    }

    /// Create a wallet with a label
    pub fn with_label(label: &str) -> Self {
        Self {
            key_pair: KeyPair::generate(),
            label: Some(label.to_string()),
        }
    }

    /// Import a wallet from a private key
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, WalletError> {
        let key_pair = KeyPair::from_private_key_hex(private_key_hex)?;
        Ok(Self {
            key_pair,
            label: None,
        })
    }

    /// Account identifier controlled by this wallet
    pub fn account(&self) -> AccountId {
        self.key_pair.account_id()
    }

    /// Compressed public key (hex)
    pub fn public_key(&self) -> String {
        self.key_pair.public_key_hex()
    }

    /// Private key (hex). Keep this secret!
    pub fn private_key(&self) -> String {
        self.key_pair.private_key_hex()
    }

    /// Save wallet to file
    pub fn save(&self, path: &Path) -> Result<(), WalletError> {
        let data = WalletData {
            private_key_hex: self.private_key(),
            account: self.account(),
            label: self.label.clone(),
        };

        let json = serde_json::to_string_pretty(&data)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load wallet from file, checking the stored account against the key
    pub fn load(path: &Path) -> Result<Self, WalletError> {
        let json = fs::read_to_string(path)?;
        let data: WalletData = serde_json::from_str(&json)?;

        let mut wallet = Self::from_private_key(&data.private_key_hex)?;
        if wallet.account() != data.account {
            return Err(WalletError::AccountMismatch(data.account));
        }
        wallet.label = data.label;
        Ok(wallet)
    }

    /// Export wallet info (without private key)
    pub fn export_public_info(&self) -> WalletInfo {
        WalletInfo {
            account: self.account(),
            public_key: self.public_key(),
            label: self.label.clone(),
        }
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

/// Public wallet information (safe to share)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletInfo {
    pub account: AccountId,
    pub public_key: String,
    pub label: Option<String>,
}

/// Directory of wallet files, one per account
pub struct WalletManager {
    wallets_dir: PathBuf,
}

impl WalletManager {
    /// Create a new wallet manager
    pub fn new(wallets_dir: &Path) -> Result<Self, WalletError> {
        fs::create_dir_all(wallets_dir)?;
        Ok(Self {
            wallets_dir: wallets_dir.to_path_buf(),
        })
    }

    fn wallet_path(&self, account: &AccountId) -> PathBuf {
        self.wallets_dir
            .join(format!("{}.json", hex::encode(account.as_slice())))
    }

    /// Create and save a new wallet
    pub fn create_wallet(&self, label: Option<&str>) -> Result<Wallet, WalletError> {
        let wallet = match label {
            Some(l) => Wallet::with_label(l),
            None => Wallet::new(),
        };

        wallet.save(&self.wallet_path(&wallet.account()))?;
        log::info!("Wallet created for {}", wallet.account());

        Ok(wallet)
    }

    /// Whether a wallet file exists for `account`
    pub fn has_wallet(&self, account: &AccountId) -> bool {
        self.wallet_path(account).exists()
    }

    /// List all wallets (unreadable files are skipped)
    pub fn list_wallets(&self) -> Result<Vec<WalletInfo>, WalletError> {
        let mut wallets = Vec::new();

        for entry in fs::read_dir(&self.wallets_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match Wallet::load(&path) {
                    Ok(wallet) => wallets.push(wallet.export_public_info()),
                    Err(e) => log::warn!("Skipping wallet file {:?}: {}", path, e),
                }
            }
        }

        wallets.sort_by(|a, b| a.account.cmp(&b.account));
        Ok(wallets)
    }

    /// Load a specific wallet by account
    pub fn load_wallet(&self, account: &AccountId) -> Result<Wallet, WalletError> {
        let path = self.wallet_path(account);
        if !path.exists() {
            return Err(WalletError::NotFound(*account));
        }
        Wallet::load(&path)
    }
}
