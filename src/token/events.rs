//! Ledger notifications
//!
//! Every successful mutation appends exactly one record to the ledger's
//! [`EventLog`]. Subscribers hook in through [`EventSink`] without the ledger
//! knowing how records are delivered.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transfer notification (emitted by `transfer` and `transfer_from`)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}

/// Approval notification (emitted by `approve`)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalEvent {
    pub owner: Address,
    pub spender: Address,
    pub amount: U256,
}

/// A notification produced by the ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LedgerEvent {
    Transfer(TransferEvent),
    Approval(ApprovalEvent),
}

impl LedgerEvent {
    /// Whether `account` appears anywhere in the payload
    pub fn involves(&self, account: &Address) -> bool {
        match self {
            LedgerEvent::Transfer(e) => e.from == *account || e.to == *account,
            LedgerEvent::Approval(e) => e.owner == *account || e.spender == *account,
        }
    }
}

/// A logged notification with its position in the log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub emitted_at: DateTime<Utc>,
    pub event: LedgerEvent,
}

/// Append-only notification log
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return the stored record
    pub fn append(&mut self, event: LedgerEvent) -> &EventRecord {
        let record = EventRecord {
            sequence: self.records.len() as u64,
            emitted_at: Utc::now(),
            event,
        };
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    /// Records with `sequence >= from`
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = (from as usize).min(self.records.len());
        &self.records[start..]
    }

    /// Records whose payload mentions `account`
    pub fn involving(&self, account: &Address) -> Vec<&EventRecord> {
        self.records
            .iter()
            .filter(|r| r.event.involves(account))
            .collect()
    }
}

/// Receives ledger notifications as they are appended
pub trait EventSink: Send + Sync {
    fn on_event(&self, record: &EventRecord);
}

/// Writes notifications through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn on_event(&self, record: &EventRecord) {
        match &record.event {
            LedgerEvent::Transfer(e) => log::info!(
                "#{} Transfer {} -> {} ({})",
                record.sequence,
                e.from,
                e.to,
                e.amount
            ),
            LedgerEvent::Approval(e) => log::info!(
                "#{} Approval {} -> {} ({})",
                record.sequence,
                e.owner,
                e.spender,
                e.amount
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(from: u8, to: u8, amount: u64) -> LedgerEvent {
        LedgerEvent::Transfer(TransferEvent {
            from: Address::repeat_byte(from),
            to: Address::repeat_byte(to),
            amount: U256::from(amount),
        })
    }

    #[test]
    fn test_sequence_numbers() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        assert_eq!(log.append(transfer(1, 2, 10)).sequence, 0);
        assert_eq!(log.append(transfer(2, 3, 5)).sequence, 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.last().unwrap().sequence, 1);
    }

    #[test]
    fn test_since() {
        let mut log = EventLog::new();
        for i in 0..5 {
            log.append(transfer(1, 2, i));
        }

        assert_eq!(log.since(0).len(), 5);
        assert_eq!(log.since(3).len(), 2);
        assert_eq!(log.since(3)[0].sequence, 3);
        assert!(log.since(99).is_empty());
    }

    #[test]
    fn test_involving() {
        let mut log = EventLog::new();
        log.append(transfer(1, 2, 10));
        log.append(transfer(3, 4, 10));
        log.append(LedgerEvent::Approval(ApprovalEvent {
            owner: Address::repeat_byte(4),
            spender: Address::repeat_byte(1),
            amount: U256::from(7u64),
        }));

        let account = Address::repeat_byte(1);
        let hits: Vec<u64> = log.involving(&account).iter().map(|r| r.sequence).collect();
        assert_eq!(hits, vec![0, 2]);
    }

    #[test]
    fn test_event_json_is_tagged() {
        let json = serde_json::to_value(transfer(1, 2, 3)).unwrap();
        assert_eq!(json["type"], "Transfer");
    }
}
