// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

pub mod scenarios;

use anyhow::Result;
use daybook::application::LedgerService;
use daybook::domain::{NewTransaction, Timestamp, TransactionType, UserId, parse_timestamp};
use daybook::storage::{LedgerStore, MemoryStore};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to create a test service backed by memory
pub fn memory_service() -> LedgerService<MemoryStore> {
    LedgerService::new(MemoryStore::new())
}

/// Helper to parse a timestamp string
pub fn ts(s: &str) -> Timestamp {
    parse_timestamp(s).unwrap()
}

pub fn user(id: i64) -> UserId {
    UserId::new(id).unwrap()
}

/// Record a transaction and return its id
pub async fn record<S: LedgerStore>(
    service: &LedgerService<S>,
    transaction_type: TransactionType,
    amount_cents: i64,
    description: &str,
    user_id: i64,
    datetime: &str,
) -> Result<i64> {
    let tx = NewTransaction::new(
        transaction_type,
        amount_cents,
        description,
        user(user_id),
        ts(datetime),
    )?;
    Ok(service.record_transaction(&tx).await?)
}
