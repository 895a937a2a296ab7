//! ERC-20 style token ledger
//!
//! One fixed supply, minted once to the creator, moved around by `transfer`,
//! `approve` and `transfer_from`. Every operation either applies in full or
//! returns an error with the ledger untouched.

use crate::token::events::{ApprovalEvent, EventLog, LedgerEvent, TransferEvent};
use crate::token::units::{self, MAX_DECIMALS};
use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Account identifier. `Address::ZERO` is the null identifier.
pub type AccountId = Address;

/// Amount in minimal units
pub type Amount = U256;

/// The identifier that can never hold, receive or spend funds
pub const NULL_ACCOUNT: AccountId = Address::ZERO;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid recipient: cannot send to the null account")]
    InvalidRecipient,
    #[error("Invalid spender: cannot approve the null account")]
    InvalidSpender,
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },
    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: Amount, need: Amount },
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
    #[error("Supply mismatch: total supply {expected}, balances sum to {actual}")]
    SupplyMismatch { expected: Amount, actual: Amount },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Invalid name: must be 1-50 characters")]
    InvalidName,
    #[error("Invalid symbol: must be 1-10 characters")]
    InvalidSymbol,
    #[error("Invalid decimals: must be 0-77")]
    InvalidDecimals,
}

/// Token metadata (informational, fixed at creation)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenMetadata {
    /// Display name (e.g., "My Token")
    pub name: String,
    /// Short symbol (e.g., "MTK")
    pub symbol: String,
    /// Minimal units per display unit, as a power of ten
    pub decimals: u8,
    pub created_at: DateTime<Utc>,
}

impl TokenMetadata {
    /// Create new token metadata with validation
    pub fn new(name: String, symbol: String, decimals: u8) -> Result<Self, TokenError> {
        if name.is_empty() || name.chars().count() > 50 {
            return Err(TokenError::InvalidName);
        }

        if symbol.is_empty() || symbol.chars().count() > 10 {
            return Err(TokenError::InvalidSymbol);
        }

        if decimals > MAX_DECIMALS {
            return Err(TokenError::InvalidDecimals);
        }

        Ok(Self {
            name,
            symbol,
            decimals,
            created_at: Utc::now(),
        })
    }

    /// Minimal units to display units
    pub fn format_amount(&self, amount: Amount) -> String {
        units::format_units(amount, self.decimals)
    }

    /// Display units to minimal units
    pub fn parse_amount(&self, text: &str) -> Result<Amount, TokenError> {
        units::parse_units(text, self.decimals)
            .ok_or_else(|| TokenError::InvalidAmount(text.to_string()))
    }
}

/// Balance writes computed ahead of a move, applied only once all checks pass
struct BalanceMove {
    from: (AccountId, Amount),
    to: Option<(AccountId, Amount)>,
}

/// A fungible token ledger
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenLedger {
    metadata: TokenMetadata,
    total_supply: Amount,
    creator: AccountId,
    /// Balances: account -> amount (zero entries are not stored)
    balances: HashMap<AccountId, Amount>,
    /// Allowances: owner -> (spender -> amount) (zero entries are not stored)
    allowances: HashMap<AccountId, HashMap<AccountId, Amount>>,
    events: EventLog,
}

impl TokenLedger {
    /// Create a ledger with the whole supply credited to `creator`
    pub fn new(
        metadata: TokenMetadata,
        initial_supply: Amount,
        creator: AccountId,
    ) -> Result<Self, TokenError> {
        if creator == NULL_ACCOUNT {
            return Err(TokenError::InvalidRecipient);
        }

        let mut balances = HashMap::new();
        if !initial_supply.is_zero() {
            balances.insert(creator, initial_supply);
        }

        log::info!(
            "Ledger created: {} ({}) supply {} to {}",
            metadata.name,
            metadata.symbol,
            initial_supply,
            creator
        );

        Ok(Self {
            metadata,
            total_supply: initial_supply,
            creator,
            balances,
            allowances: HashMap::new(),
            events: EventLog::new(),
        })
    }

    // =========================================================================
    // View Functions
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    /// Account that received the initial supply
    pub fn creator(&self) -> AccountId {
        self.creator
    }

    /// Total supply, fixed at construction
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Balance of an account (0 if never credited)
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(U256::ZERO)
    }

    /// Remaining amount `spender` may move out of `owner`'s balance
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// All accounts holding a non-zero balance
    pub fn holders(&self) -> Vec<(AccountId, Amount)> {
        self.balances.iter().map(|(a, b)| (*a, *b)).collect()
    }

    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Notification log
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Check that balances add up to the total supply
    pub fn verify_supply(&self) -> Result<(), TokenError> {
        let mut actual = U256::ZERO;
        for balance in self.balances.values() {
            actual = actual
                .checked_add(*balance)
                .ok_or(TokenError::ArithmeticOverflow)?;
        }

        if actual != self.total_supply {
            return Err(TokenError::SupplyMismatch {
                expected: self.total_supply,
                actual,
            });
        }
        Ok(())
    }

    /// Check every invariant a well-formed ledger holds: valid metadata, a
    /// non-null creator, no entry keyed by the null account, no zero-valued
    /// entry and balances that add up to the total supply
    pub fn verify_state(&self) -> Result<(), TokenError> {
        let metadata = &self.metadata;
        TokenMetadata::new(metadata.name.clone(), metadata.symbol.clone(), metadata.decimals)?;

        if self.creator == NULL_ACCOUNT {
            return Err(TokenError::InvalidState("creator is the null account".to_string()));
        }

        for (account, balance) in &self.balances {
            if *account == NULL_ACCOUNT {
                return Err(TokenError::InvalidState(
                    "null account holds a balance".to_string(),
                ));
            }
            if balance.is_zero() {
                return Err(TokenError::InvalidState(format!(
                    "zero balance stored for {}",
                    account
                )));
            }
        }

        for (owner, spenders) in &self.allowances {
            if *owner == NULL_ACCOUNT {
                return Err(TokenError::InvalidState(
                    "null account owns an allowance".to_string(),
                ));
            }
            if spenders.is_empty() {
                return Err(TokenError::InvalidState(format!(
                    "empty allowance table stored for {}",
                    owner
                )));
            }
            for (spender, amount) in spenders {
                if *spender == NULL_ACCOUNT {
                    return Err(TokenError::InvalidState(
                        "null account holds an allowance".to_string(),
                    ));
                }
                if amount.is_zero() {
                    return Err(TokenError::InvalidState(format!(
                        "zero allowance stored for {} -> {}",
                        owner, spender
                    )));
                }
            }
        }

        self.verify_supply()
    }

    // =========================================================================
    // Mutating Functions
    // =========================================================================

    /// Move `amount` from the caller to `to`
    ///
    /// # Arguments
    /// * `caller` - Account invoking the transfer (the sender)
    /// * `to` - Recipient, must not be the null account
    /// * `amount` - Amount in minimal units (0 is allowed)
    pub fn transfer(
        &mut self,
        caller: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<bool, TokenError> {
        if to == NULL_ACCOUNT {
            return Err(TokenError::InvalidRecipient);
        }

        let staged = self.stage_move(caller, to, amount)?;
        self.apply_move(staged);

        log::debug!("transfer {} -> {}: {}", caller, to, amount);
        self.events.append(LedgerEvent::Transfer(TransferEvent {
            from: caller,
            to,
            amount,
        }));

        Ok(true)
    }

    /// Set the allowance of `spender` over the caller's balance
    ///
    /// Overwrites any previous allowance; 0 revokes it. No balance check.
    pub fn approve(
        &mut self,
        caller: AccountId,
        spender: AccountId,
        amount: Amount,
    ) -> Result<bool, TokenError> {
        if spender == NULL_ACCOUNT {
            return Err(TokenError::InvalidSpender);
        }

        self.set_allowance(caller, spender, amount);

        log::debug!("approve {} -> {}: {}", caller, spender, amount);
        self.events.append(LedgerEvent::Approval(ApprovalEvent {
            owner: caller,
            spender,
            amount,
        }));

        Ok(true)
    }

    /// Move `amount` from `from` to `to` on the authority of an allowance
    ///
    /// # Arguments
    /// * `caller` - Spender performing the transfer
    /// * `from` - Owner whose balance and allowance are consumed
    /// * `to` - Recipient, must not be the null account
    /// * `amount` - Amount in minimal units
    pub fn transfer_from(
        &mut self,
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<bool, TokenError> {
        if to == NULL_ACCOUNT {
            return Err(TokenError::InvalidRecipient);
        }

        let current_allowance = self.allowance(&from, &caller);
        let remaining = current_allowance.checked_sub(amount).ok_or(
            TokenError::InsufficientAllowance {
                have: current_allowance,
                need: amount,
            },
        )?;

        let staged = self.stage_move(from, to, amount)?;

        self.set_allowance(from, caller, remaining);
        self.apply_move(staged);

        log::debug!(
            "transfer_from {} -> {} by {}: {}",
            from,
            to,
            caller,
            amount
        );
        self.events.append(LedgerEvent::Transfer(TransferEvent {
            from,
            to,
            amount,
        }));

        Ok(true)
    }

    /// Compute the new balances for a move without writing them
    fn stage_move(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<BalanceMove, TokenError> {
        let from_balance = self.balance_of(&from);
        let new_from = from_balance
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                have: from_balance,
                need: amount,
            })?;

        if from == to {
            return Ok(BalanceMove {
                from: (from, from_balance),
                to: None,
            });
        }

        let new_to = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(TokenError::ArithmeticOverflow)?;

        Ok(BalanceMove {
            from: (from, new_from),
            to: Some((to, new_to)),
        })
    }

    fn apply_move(&mut self, staged: BalanceMove) {
        self.set_balance(staged.from.0, staged.from.1);
        if let Some((to, balance)) = staged.to {
            self.set_balance(to, balance);
        }
    }

    fn set_balance(&mut self, account: AccountId, balance: Amount) {
        if balance.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, balance);
        }
    }

    fn set_allowance(&mut self, owner: AccountId, spender: AccountId, amount: Amount) {
        if amount.is_zero() {
            if let Some(spenders) = self.allowances.get_mut(&owner) {
                spenders.remove(&spender);
                if spenders.is_empty() {
                    self.allowances.remove(&owner);
                }
            }
        } else {
            self.allowances
                .entry(owner)
                .or_default()
                .insert(spender, amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: Address = Address::repeat_byte(0xd0);
    const A: Address = Address::repeat_byte(0xa0);
    const B: Address = Address::repeat_byte(0xb0);

    fn tokens(n: u64) -> Amount {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    fn create_test_ledger() -> TokenLedger {
        let metadata =
            TokenMetadata::new("Test Token".to_string(), "TST".to_string(), 18).unwrap();
        TokenLedger::new(metadata, tokens(1000), D).unwrap()
    }

    fn last_event(ledger: &TokenLedger) -> LedgerEvent {
        ledger.events().last().unwrap().event.clone()
    }

    #[test]
    fn test_ledger_creation() {
        let ledger = create_test_ledger();

        assert_eq!(ledger.name(), "Test Token");
        assert_eq!(ledger.symbol(), "TST");
        assert_eq!(ledger.decimals(), 18);
        assert_eq!(ledger.total_supply(), tokens(1000));
        assert_eq!(ledger.balance_of(&D), tokens(1000));
        assert_eq!(ledger.balance_of(&A), U256::ZERO);
        assert_eq!(ledger.holder_count(), 1);
        assert_eq!(ledger.creator(), D);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_creation_edge_supplies() {
        let metadata = TokenMetadata::new("Empty".to_string(), "E".to_string(), 0).unwrap();
        let empty = TokenLedger::new(metadata.clone(), U256::ZERO, D).unwrap();
        assert_eq!(empty.total_supply(), U256::ZERO);
        assert_eq!(empty.holder_count(), 0);
        assert!(empty.verify_supply().is_ok());

        let full = TokenLedger::new(metadata.clone(), U256::MAX, D).unwrap();
        assert_eq!(full.balance_of(&D), U256::MAX);
        assert!(full.verify_supply().is_ok());

        assert_eq!(
            TokenLedger::new(metadata, U256::from(1u64), NULL_ACCOUNT).unwrap_err(),
            TokenError::InvalidRecipient
        );
    }

    #[test]
    fn test_metadata_validation() {
        assert_eq!(
            TokenMetadata::new("".to_string(), "TST".to_string(), 18).unwrap_err(),
            TokenError::InvalidName
        );
        assert_eq!(
            TokenMetadata::new("Test".to_string(), "TOOLONGSYMBOL".to_string(), 18).unwrap_err(),
            TokenError::InvalidSymbol
        );
        assert_eq!(
            TokenMetadata::new("Test".to_string(), "TST".to_string(), 78).unwrap_err(),
            TokenError::InvalidDecimals
        );
    }

    #[test]
    fn test_transfer() {
        let mut ledger = create_test_ledger();

        assert!(ledger.transfer(D, A, tokens(100)).unwrap());

        assert_eq!(ledger.balance_of(&D), tokens(900));
        assert_eq!(ledger.balance_of(&A), tokens(100));
        assert_eq!(
            last_event(&ledger),
            LedgerEvent::Transfer(TransferEvent {
                from: D,
                to: A,
                amount: tokens(100)
            })
        );
        assert!(ledger.verify_supply().is_ok());
    }

    #[test]
    fn test_transfer_to_self() {
        let mut ledger = create_test_ledger();

        assert!(ledger.transfer(D, D, tokens(10)).unwrap());
        assert_eq!(ledger.balance_of(&D), tokens(1000));
        assert_eq!(
            last_event(&ledger),
            LedgerEvent::Transfer(TransferEvent {
                from: D,
                to: D,
                amount: tokens(10)
            })
        );
    }

    #[test]
    fn test_self_transfer_still_checks_balance() {
        let mut ledger = create_test_ledger();

        let result = ledger.transfer(D, D, tokens(1001));
        assert!(matches!(result, Err(TokenError::InsufficientBalance { .. })));
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_transfer_zero_amount() {
        let mut ledger = create_test_ledger();

        assert!(ledger.transfer(A, B, U256::ZERO).unwrap());
        assert_eq!(ledger.balance_of(&A), U256::ZERO);
        assert_eq!(ledger.balance_of(&B), U256::ZERO);
        assert_eq!(ledger.holder_count(), 1);
        assert_eq!(ledger.events().len(), 1);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut ledger = create_test_ledger();

        let result = ledger.transfer(A, B, U256::from(1u64));
        assert_eq!(
            result,
            Err(TokenError::InsufficientBalance {
                have: U256::ZERO,
                need: U256::from(1u64)
            })
        );
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_transfer_to_null_account() {
        let mut ledger = create_test_ledger();

        let result = ledger.transfer(D, NULL_ACCOUNT, tokens(1));
        assert_eq!(result, Err(TokenError::InvalidRecipient));
        assert_eq!(ledger.balance_of(&D), tokens(1000));

        // Recipient check comes before the balance check
        let result = ledger.transfer(A, NULL_ACCOUNT, tokens(5000));
        assert_eq!(result, Err(TokenError::InvalidRecipient));
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_transfer_entire_balance_removes_holder() {
        let mut ledger = create_test_ledger();

        ledger.transfer(D, A, tokens(1000)).unwrap();
        assert_eq!(ledger.holder_count(), 1);
        assert_eq!(ledger.holders(), vec![(A, tokens(1000))]);
    }

    #[test]
    fn test_approve_and_allowance() {
        let mut ledger = create_test_ledger();

        assert_eq!(ledger.allowance(&D, &A), U256::ZERO);

        assert!(ledger.approve(D, A, tokens(50)).unwrap());
        assert_eq!(ledger.allowance(&D, &A), tokens(50));

        // Overwrites, does not add
        ledger.approve(D, A, tokens(30)).unwrap();
        assert_eq!(ledger.allowance(&D, &A), tokens(30));

        // More than the balance is fine
        ledger.approve(D, A, tokens(5000)).unwrap();
        assert_eq!(ledger.allowance(&D, &A), tokens(5000));

        // Revoke
        ledger.approve(D, A, U256::ZERO).unwrap();
        assert_eq!(ledger.allowance(&D, &A), U256::ZERO);

        assert_eq!(ledger.events().len(), 4);
        assert_eq!(
            last_event(&ledger),
            LedgerEvent::Approval(ApprovalEvent {
                owner: D,
                spender: A,
                amount: U256::ZERO
            })
        );
        assert_eq!(ledger.balance_of(&D), tokens(1000));
    }

    #[test]
    fn test_approve_null_spender() {
        let mut ledger = create_test_ledger();

        assert_eq!(
            ledger.approve(D, NULL_ACCOUNT, tokens(1)),
            Err(TokenError::InvalidSpender)
        );
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_transfer_from() {
        let mut ledger = create_test_ledger();

        ledger.approve(D, A, tokens(100)).unwrap();
        assert!(ledger.transfer_from(A, D, B, tokens(100)).unwrap());

        assert_eq!(ledger.balance_of(&B), tokens(100));
        assert_eq!(ledger.balance_of(&D), tokens(900));
        assert_eq!(ledger.balance_of(&A), U256::ZERO);
        assert_eq!(ledger.allowance(&D, &A), U256::ZERO);

        // Payload names owner and recipient, not the spender
        assert_eq!(
            last_event(&ledger),
            LedgerEvent::Transfer(TransferEvent {
                from: D,
                to: B,
                amount: tokens(100)
            })
        );
    }

    #[test]
    fn test_transfer_from_partial_spend() {
        let mut ledger = create_test_ledger();

        ledger.approve(D, A, tokens(100)).unwrap();
        ledger.transfer_from(A, D, B, tokens(40)).unwrap();
        assert_eq!(ledger.allowance(&D, &A), tokens(60));

        ledger.transfer_from(A, D, A, tokens(60)).unwrap();
        assert_eq!(ledger.allowance(&D, &A), U256::ZERO);
        assert_eq!(ledger.balance_of(&A), tokens(60));
        assert!(ledger.verify_supply().is_ok());
    }

    #[test]
    fn test_transfer_from_insufficient_allowance() {
        let mut ledger = create_test_ledger();

        ledger.approve(D, A, tokens(100)).unwrap();
        let before = ledger.events().len();

        let result = ledger.transfer_from(A, D, B, tokens(101));
        assert_eq!(
            result,
            Err(TokenError::InsufficientAllowance {
                have: tokens(100),
                need: tokens(101)
            })
        );
        assert_eq!(ledger.allowance(&D, &A), tokens(100));
        assert_eq!(ledger.balance_of(&D), tokens(1000));
        assert_eq!(ledger.balance_of(&B), U256::ZERO);
        assert_eq!(ledger.events().len(), before);
    }

    #[test]
    fn test_transfer_from_without_approval() {
        let mut ledger = create_test_ledger();

        let result = ledger.transfer_from(A, D, B, tokens(1));
        assert!(matches!(
            result,
            Err(TokenError::InsufficientAllowance { .. })
        ));
    }

    #[test]
    fn test_transfer_from_insufficient_balance_keeps_allowance() {
        let mut ledger = create_test_ledger();

        ledger.approve(D, A, tokens(2000)).unwrap();
        let result = ledger.transfer_from(A, D, B, tokens(1500));
        assert!(matches!(result, Err(TokenError::InsufficientBalance { .. })));
        assert_eq!(ledger.allowance(&D, &A), tokens(2000));
        assert_eq!(ledger.balance_of(&D), tokens(1000));
    }

    #[test]
    fn test_transfer_from_check_order() {
        let mut ledger = create_test_ledger();

        // Null recipient wins over missing allowance
        assert_eq!(
            ledger.transfer_from(A, D, NULL_ACCOUNT, tokens(1)),
            Err(TokenError::InvalidRecipient)
        );

        // Missing allowance wins over missing balance
        assert!(matches!(
            ledger.transfer_from(D, A, B, tokens(1)),
            Err(TokenError::InsufficientAllowance { .. })
        ));
    }

    #[test]
    fn test_transfer_from_to_owner() {
        let mut ledger = create_test_ledger();

        ledger.approve(D, A, tokens(10)).unwrap();
        ledger.transfer_from(A, D, D, tokens(10)).unwrap();

        assert_eq!(ledger.balance_of(&D), tokens(1000));
        assert_eq!(ledger.allowance(&D, &A), U256::ZERO);
    }

    #[test]
    fn test_supply_conserved_across_operations() {
        let mut ledger = create_test_ledger();

        ledger.transfer(D, A, tokens(300)).unwrap();
        ledger.transfer(A, B, tokens(120)).unwrap();
        ledger.approve(B, D, tokens(50)).unwrap();
        ledger.transfer_from(D, B, A, tokens(50)).unwrap();
        let _ = ledger.transfer(B, A, tokens(1000));
        let _ = ledger.transfer_from(D, B, A, tokens(1));

        assert!(ledger.verify_supply().is_ok());
        assert_eq!(ledger.total_supply(), tokens(1000));
        assert_eq!(ledger.balance_of(&D), tokens(700));
        assert_eq!(ledger.balance_of(&A), tokens(230));
        assert_eq!(ledger.balance_of(&B), tokens(70));
    }

    #[test]
    fn test_max_supply_moves_without_overflow() {
        let metadata = TokenMetadata::new("Max".to_string(), "MAX".to_string(), 0).unwrap();
        let mut ledger = TokenLedger::new(metadata, U256::MAX, D).unwrap();

        ledger.transfer(D, A, U256::MAX - U256::from(1u64)).unwrap();
        ledger.transfer(D, A, U256::from(1u64)).unwrap();
        assert_eq!(ledger.balance_of(&A), U256::MAX);
        assert!(ledger.verify_supply().is_ok());
    }

    #[test]
    fn test_display_amounts() {
        let ledger = create_test_ledger();
        let metadata = ledger.metadata();

        assert_eq!(metadata.format_amount(tokens(1000)), "1000");
        assert_eq!(metadata.parse_amount("100").unwrap(), tokens(100));
        assert!(matches!(
            metadata.parse_amount("abc"),
            Err(TokenError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip_keeps_state() {
        let mut ledger = create_test_ledger();
        ledger.transfer(D, A, tokens(1)).unwrap();
        ledger.approve(A, B, tokens(1)).unwrap();

        let json = serde_json::to_string(&ledger).unwrap();
        let loaded: TokenLedger = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.balance_of(&A), tokens(1));
        assert_eq!(loaded.allowance(&A, &B), tokens(1));
        assert_eq!(loaded.events().len(), 2);
        assert!(loaded.verify_supply().is_ok());
    }

    #[test]
    fn test_verify_state_rejects_malformed_ledgers() {
        let mut ledger = create_test_ledger();
        ledger.transfer(D, A, tokens(1)).unwrap();
        ledger.approve(A, B, tokens(1)).unwrap();
        assert!(ledger.verify_state().is_ok());

        let mut null_creator = ledger.clone();
        null_creator.creator = NULL_ACCOUNT;
        assert!(matches!(null_creator.verify_state(), Err(TokenError::InvalidState(_))));

        let mut null_holder = ledger.clone();
        let moved = null_holder.balances.remove(&A).unwrap();
        null_holder.balances.insert(NULL_ACCOUNT, moved);
        assert!(null_holder.verify_supply().is_ok());
        assert!(matches!(null_holder.verify_state(), Err(TokenError::InvalidState(_))));

        let mut zero_balance = ledger.clone();
        zero_balance.balances.insert(B, U256::ZERO);
        assert!(matches!(zero_balance.verify_state(), Err(TokenError::InvalidState(_))));

        let mut zero_allowance = ledger.clone();
        zero_allowance.allowances.entry(D).or_default().insert(B, U256::ZERO);
        assert!(matches!(zero_allowance.verify_state(), Err(TokenError::InvalidState(_))));

        let mut null_spender = ledger.clone();
        null_spender.allowances.entry(A).or_default().insert(NULL_ACCOUNT, tokens(1));
        assert!(matches!(null_spender.verify_state(), Err(TokenError::InvalidState(_))));

        let mut bad_decimals = ledger;
        bad_decimals.metadata.decimals = MAX_DECIMALS + 1;
        assert_eq!(bad_decimals.verify_state(), Err(TokenError::InvalidDecimals));
    }
}
