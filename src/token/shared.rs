//! Shared handle to a single ledger
//!
//! All mutations go through one write lock so interleaved read-modify-write
//! sequences on the same balance cannot happen. Reads share a read lock and
//! always observe a fully applied state.

use crate::token::events::{EventRecord, EventSink};
use crate::token::ledger::{AccountId, Amount, TokenError, TokenLedger, TokenMetadata};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cloneable, thread-safe ledger handle with notification fan-out
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<TokenLedger>>,
    sinks: Arc<RwLock<Vec<Arc<dyn EventSink>>>>,
}

impl SharedLedger {
    pub fn new(ledger: TokenLedger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
            sinks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register a sink for every notification appended from now on
    pub fn subscribe(&self, sink: Arc<dyn EventSink>) {
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sink);
    }

    // Operations never panic between their first and last write, so a
    // poisoned lock still guards a consistent ledger.
    fn read(&self) -> RwLockReadGuard<'_, TokenLedger> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TokenLedger> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.read().balance_of(account)
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.read().allowance(owner, spender)
    }

    pub fn total_supply(&self) -> Amount {
        self.read().total_supply()
    }

    pub fn metadata(&self) -> TokenMetadata {
        self.read().metadata().clone()
    }

    /// Records with `sequence >= from`
    pub fn events_since(&self, from: u64) -> Vec<EventRecord> {
        self.read().events().since(from).to_vec()
    }

    /// Run a read-only closure against one consistent view of the ledger
    pub fn with<R>(&self, f: impl FnOnce(&TokenLedger) -> R) -> R {
        f(&*self.read())
    }

    /// Clone of the complete ledger state
    pub fn snapshot(&self) -> TokenLedger {
        self.read().clone()
    }

    pub fn transfer(
        &self,
        caller: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<bool, TokenError> {
        self.mutate("transfer", |ledger| ledger.transfer(caller, to, amount))
    }

    pub fn approve(
        &self,
        caller: AccountId,
        spender: AccountId,
        amount: Amount,
    ) -> Result<bool, TokenError> {
        self.mutate("approve", |ledger| ledger.approve(caller, spender, amount))
    }

    pub fn transfer_from(
        &self,
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<bool, TokenError> {
        self.mutate("transfer_from", |ledger| {
            ledger.transfer_from(caller, from, to, amount)
        })
    }

    /// Apply one operation under the write lock and deliver its notifications
    fn mutate(
        &self,
        operation: &str,
        op: impl FnOnce(&mut TokenLedger) -> Result<bool, TokenError>,
    ) -> Result<bool, TokenError> {
        let mut ledger = self.write();
        let before = ledger.events().len() as u64;

        match op(&mut *ledger) {
            Ok(result) => {
                let sinks = self.sinks.read().unwrap_or_else(PoisonError::into_inner);
                for record in ledger.events().since(before) {
                    for sink in sinks.iter() {
                        sink.on_event(record);
                    }
                }
                Ok(result)
            }
            Err(e) => {
                log::warn!("{} rejected: {}", operation, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::events::LedgerEvent;
    use alloy_primitives::{Address, U256};
    use std::sync::Mutex;
    use std::thread;

    const D: Address = Address::repeat_byte(0xd0);
    const A: Address = Address::repeat_byte(0xa0);
    const B: Address = Address::repeat_byte(0xb0);

    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<EventRecord>>,
    }

    impl EventSink for RecordingSink {
        fn on_event(&self, record: &EventRecord) {
            self.seen.lock().unwrap().push(record.clone());
        }
    }

    fn create_shared(supply: u64) -> SharedLedger {
        let metadata = TokenMetadata::new("Shared".to_string(), "SHR".to_string(), 0).unwrap();
        SharedLedger::new(TokenLedger::new(metadata, U256::from(supply), D).unwrap())
    }

    #[test]
    fn test_operations_through_handle() {
        let shared = create_shared(1000);

        shared.transfer(D, A, U256::from(100u64)).unwrap();
        shared.approve(A, B, U256::from(40u64)).unwrap();
        shared.transfer_from(B, A, B, U256::from(40u64)).unwrap();

        assert_eq!(shared.balance_of(&D), U256::from(900u64));
        assert_eq!(shared.balance_of(&A), U256::from(60u64));
        assert_eq!(shared.balance_of(&B), U256::from(40u64));
        assert_eq!(shared.allowance(&A, &B), U256::ZERO);
        assert_eq!(shared.total_supply(), U256::from(1000u64));
        assert_eq!(shared.events_since(0).len(), 3);
        assert_eq!(shared.events_since(2).len(), 1);
    }

    #[test]
    fn test_sinks_receive_only_successful_events() {
        let shared = create_shared(10);
        let sink = Arc::new(RecordingSink::default());
        shared.subscribe(sink.clone());

        shared.transfer(D, A, U256::from(5u64)).unwrap();
        assert!(shared.transfer(A, B, U256::from(6u64)).is_err());
        shared.approve(A, B, U256::from(1u64)).unwrap();

        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].sequence, 0);
        assert!(matches!(seen[0].event, LedgerEvent::Transfer(_)));
        assert!(matches!(seen[1].event, LedgerEvent::Approval(_)));
    }

    #[test]
    fn test_concurrent_transfers_conserve_supply() {
        let shared = create_shared(10_000);
        shared.transfer(D, A, U256::from(5_000u64)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let (from, to) = if i % 2 == 0 { (D, A) } else { (A, D) };
                    for _ in 0..200 {
                        let _ = shared.transfer(from, to, U256::from(7u64));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = shared.snapshot();
        assert!(snapshot.verify_supply().is_ok());
        assert_eq!(
            snapshot.balance_of(&D) + snapshot.balance_of(&A),
            U256::from(10_000u64)
        );
    }

    #[test]
    fn test_concurrent_spenders_never_overdraw_allowance() {
        let shared = create_shared(1_000);
        shared.approve(D, A, U256::from(100u64)).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let mut moved = 0u64;
                    for _ in 0..50 {
                        if shared.transfer_from(A, D, B, U256::from(3u64)).is_ok() {
                            moved += 3;
                        }
                    }
                    moved
                })
            })
            .collect();

        let moved: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(moved, 99);
        assert_eq!(shared.balance_of(&B), U256::from(99u64));
        assert_eq!(shared.allowance(&D, &A), U256::from(1u64));
    }
}
