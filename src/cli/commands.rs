//! CLI commands for the token ledger
//!
//! Implements all command handlers for the CLI interface.

use crate::storage::{Storage, StorageConfig};
use crate::token::{
    AccountId, Amount, EventRecord, LedgerEvent, TokenLedger, TokenMetadata,
};
use crate::wallet::WalletManager;
use std::path::Path;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn storage_for(data_dir: &Path) -> CliResult<Storage> {
    let storage_config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };
    Ok(Storage::new(storage_config)?)
}

fn wallets_for(data_dir: &Path) -> CliResult<WalletManager> {
    Ok(WalletManager::new(&data_dir.join("wallets"))?)
}

/// Parse a `0x`-prefixed account identifier
pub fn parse_account(value: &str) -> CliResult<AccountId> {
    value
        .trim()
        .parse::<AccountId>()
        .map_err(|_| format!("Invalid account: {}", value).into())
}

/// Application state
pub struct AppState {
    pub ledger: TokenLedger,
    pub storage: Storage,
    pub wallet_manager: WalletManager,
}

impl AppState {
    /// Load an initialized ledger from `data_dir`
    pub fn new(data_dir: &Path) -> CliResult<Self> {
        let storage = storage_for(data_dir)?;
        if !storage.exists() {
            return Err(format!(
                "No ledger found in {:?}. Create one with: ledger init",
                data_dir
            )
            .into());
        }

        let ledger = storage.load()?;
        log::debug!("Loaded ledger {} from {:?}", ledger.symbol(), data_dir);

        Ok(Self {
            ledger,
            storage,
            wallet_manager: wallets_for(data_dir)?,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.ledger)?;
        Ok(())
    }

    /// The CLI only acts for accounts whose key is held locally
    fn require_wallet(&self, account: &AccountId) -> CliResult<()> {
        self.wallet_manager.load_wallet(account)?;
        Ok(())
    }

    fn parse_amount(&self, amount: &str) -> CliResult<Amount> {
        Ok(self.ledger.metadata().parse_amount(amount)?)
    }

    fn display(&self, amount: Amount) -> String {
        format!(
            "{} {}",
            self.ledger.metadata().format_amount(amount),
            self.ledger.symbol()
        )
    }
}

/// Create a new ledger with the whole supply credited to the creator
pub fn cmd_init(
    data_dir: &Path,
    name: &str,
    symbol: &str,
    decimals: u8,
    supply: &str,
    creator: Option<&str>,
) -> CliResult<()> {
    let storage = storage_for(data_dir)?;

    if storage.exists() {
        println!("⚠️  A ledger already exists at {:?}", data_dir);
        println!("   Remove the data directory to start over.");
        return Ok(());
    }

    let metadata = TokenMetadata::new(name.to_string(), symbol.to_string(), decimals)?;
    let initial_supply = metadata.parse_amount(supply)?;

    let creator = match creator {
        Some(c) => parse_account(c)?,
        None => {
            let wallet = wallets_for(data_dir)?.create_wallet(Some("creator"))?;
            println!("🔐 Created creator wallet {}", wallet.account());
            wallet.account()
        }
    };

    let ledger = TokenLedger::new(metadata, initial_supply, creator)?;
    storage.save(&ledger)?;

    println!("✅ Ledger initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🪙 Token: {} ({})", ledger.name(), ledger.symbol());
    println!(
        "   💰 Supply: {} {} ({} minimal units)",
        ledger.metadata().format_amount(ledger.total_supply()),
        ledger.symbol(),
        ledger.total_supply()
    );
    println!("   👤 Creator: {}", creator);

    Ok(())
}

/// Create a new account wallet
pub fn cmd_account_new(data_dir: &Path, label: Option<&str>) -> CliResult<()> {
    let wallet = wallets_for(data_dir)?.create_wallet(label)?;

    println!("🔐 New account created!");
    println!("   📍 Account: {}", wallet.account());
    println!("   🔑 Public Key: {}", wallet.public_key());
    if let Some(l) = &wallet.label {
        println!("   🏷️  Label: {}", l);
    }
    println!("\n   ⚠️  IMPORTANT: Your private key is stored in the wallets directory.");
    println!("   Back up this directory to avoid losing access to your funds!");

    Ok(())
}

/// List local accounts, with balances when a ledger exists
pub fn cmd_account_list(data_dir: &Path) -> CliResult<()> {
    let wallets = wallets_for(data_dir)?.list_wallets()?;

    if wallets.is_empty() {
        println!("📭 No accounts found. Create one with: ledger account new");
        return Ok(());
    }

    let ledger = match storage_for(data_dir)? {
        storage if storage.exists() => Some(storage.load()?),
        _ => None,
    };

    println!("📋 Accounts:");
    for info in &wallets {
        let label = info.label.as_deref().unwrap_or("-");
        match &ledger {
            Some(ledger) => println!(
                "   {} ({}) - {} {}",
                info.account,
                label,
                ledger.metadata().format_amount(ledger.balance_of(&info.account)),
                ledger.symbol()
            ),
            None => println!("   {} ({})", info.account, label),
        }
    }

    Ok(())
}

/// Display ledger information
pub fn cmd_info(state: &AppState) -> CliResult<()> {
    let ledger = &state.ledger;
    let stats = state.storage.stats()?;

    println!("🪙 Token Info");
    println!("   ├─ Name: {}", ledger.name());
    println!("   ├─ Symbol: {}", ledger.symbol());
    println!("   ├─ Decimals: {}", ledger.decimals());
    println!("   ├─ Total supply: {}", state.display(ledger.total_supply()));
    println!("   ├─ Creator: {}", ledger.creator());
    println!("   ├─ Holders: {}", ledger.holder_count());
    println!("   ├─ Notifications: {}", ledger.events().len());
    println!(
        "   └─ Storage: {} bytes, {} backup(s)",
        stats.file_size, stats.backup_count
    );

    Ok(())
}

/// Show the balance of an account
pub fn cmd_balance(state: &AppState, account: &str) -> CliResult<()> {
    let account = parse_account(account)?;
    let balance = state.ledger.balance_of(&account);

    println!("💰 Balance for {}", account);
    println!("   {} ({} minimal units)", state.display(balance), balance);

    Ok(())
}

/// Show the remaining allowance of a spender
pub fn cmd_allowance(state: &AppState, owner: &str, spender: &str) -> CliResult<()> {
    let owner = parse_account(owner)?;
    let spender = parse_account(spender)?;
    let allowance = state.ledger.allowance(&owner, &spender);

    println!("🔓 Allowance {} -> {}", owner, spender);
    println!("   {} ({} minimal units)", state.display(allowance), allowance);

    Ok(())
}

/// Direct transfer from a local account
pub fn cmd_transfer(state: &mut AppState, from: &str, to: &str, amount: &str) -> CliResult<()> {
    let caller = parse_account(from)?;
    let to = parse_account(to)?;
    let amount = state.parse_amount(amount)?;
    state.require_wallet(&caller)?;

    state.ledger.transfer(caller, to, amount)?;
    state.save()?;

    println!("📤 Transfer applied");
    println!("   From: {}", caller);
    println!("   To: {}", to);
    println!("   Amount: {}", state.display(amount));

    Ok(())
}

/// Set an allowance for a spender
pub fn cmd_approve(
    state: &mut AppState,
    owner: &str,
    spender: &str,
    amount: &str,
) -> CliResult<()> {
    let caller = parse_account(owner)?;
    let spender = parse_account(spender)?;
    let amount = state.parse_amount(amount)?;
    state.require_wallet(&caller)?;

    state.ledger.approve(caller, spender, amount)?;
    state.save()?;

    println!("🔓 Allowance set");
    println!("   Owner: {}", caller);
    println!("   Spender: {}", spender);
    println!("   Amount: {}", state.display(amount));

    Ok(())
}

/// Delegated transfer by a local spender account
pub fn cmd_transfer_from(
    state: &mut AppState,
    spender: &str,
    from: &str,
    to: &str,
    amount: &str,
) -> CliResult<()> {
    let caller = parse_account(spender)?;
    let from = parse_account(from)?;
    let to = parse_account(to)?;
    let amount = state.parse_amount(amount)?;
    state.require_wallet(&caller)?;

    state.ledger.transfer_from(caller, from, to, amount)?;
    state.save()?;

    println!("📤 Delegated transfer applied");
    println!("   Spender: {}", caller);
    println!("   From: {}", from);
    println!("   To: {}", to);
    println!("   Amount: {}", state.display(amount));
    println!(
        "   Remaining allowance: {}",
        state.display(state.ledger.allowance(&from, &caller))
    );

    Ok(())
}

fn describe(state: &AppState, record: &EventRecord) -> String {
    match &record.event {
        LedgerEvent::Transfer(e) => format!(
            "Transfer {} -> {} : {}",
            e.from,
            e.to,
            state.display(e.amount)
        ),
        LedgerEvent::Approval(e) => format!(
            "Approval {} -> {} : {}",
            e.owner,
            e.spender,
            state.display(e.amount)
        ),
    }
}

/// List recent notifications, optionally for one account
pub fn cmd_events(state: &AppState, count: usize, account: Option<&str>) -> CliResult<()> {
    let records: Vec<&EventRecord> = match account {
        Some(a) => state.ledger.events().involving(&parse_account(a)?),
        None => state.ledger.events().records().iter().collect(),
    };

    if records.is_empty() {
        println!("📭 No notifications");
        return Ok(());
    }

    println!("📜 Notifications:");
    let skip = records.len().saturating_sub(count);
    for record in records.iter().skip(skip) {
        println!(
            "   #{} | {} | {}",
            record.sequence,
            record.emitted_at.format("%Y-%m-%d %H:%M:%S"),
            describe(state, record)
        );
    }

    Ok(())
}

/// Export the ledger to a file
pub fn cmd_export(state: &AppState, path: &Path) -> CliResult<()> {
    crate::storage::save_to_file(&state.ledger, path)?;
    println!("📦 Ledger exported to {:?}", path);
    Ok(())
}

/// Replace the stored ledger with one read from a file
pub fn cmd_import(state: &mut AppState, path: &Path) -> CliResult<()> {
    state.ledger = crate::storage::load_from_file(path)?;
    state.save()?;

    println!("📥 Ledger imported from {:?}", path);
    println!("   Token: {} ({})", state.ledger.name(), state.ledger.symbol());
    println!("   Notifications: {}", state.ledger.events().len());

    Ok(())
}

/// List the backups kept next to the ledger file
pub fn cmd_backups(state: &AppState) -> CliResult<()> {
    let backups = state.storage.list_backups();
    if backups.is_empty() {
        println!("📭 No backups yet");
        return Ok(());
    }

    println!("🗄️  Backups (0 is the most recent):");
    for index in backups {
        println!("   {}", index);
    }
    Ok(())
}

/// Replace the current ledger with a backup; the replaced state becomes backup 0
pub fn cmd_restore(state: &mut AppState, backup: usize) -> CliResult<()> {
    let restored = state.storage.restore_backup(backup)?;
    state.ledger = restored;
    state.save()?;

    log::info!("Ledger restored from backup {}", backup);
    println!("♻️  Ledger restored from backup {}", backup);
    println!("   Total supply: {}", state.display(state.ledger.total_supply()));
    println!("   Notifications: {}", state.ledger.events().len());
    Ok(())
}
