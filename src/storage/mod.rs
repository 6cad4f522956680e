mod memory;
mod repository;

use anyhow::Result;

use crate::domain::{Cents, NewTransaction, Timestamp, Transaction, TransactionId, UserId};

pub use memory::*;
pub use repository::*;

/// SQL migration for the transactions table
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// SQL migration padding `YYYY-MM-DDTHH:MM` datetimes with `:00` seconds
pub const MIGRATION_002_NORMALIZE_DATETIMES: &str =
    include_str!("migrations/002_normalize_datetimes.sql");

/// Statistics for ledger integrity verification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityStats {
    pub transaction_count: i64,
    pub user_count: i64,
    /// Rows whose type is neither credit nor debit
    pub invalid_types: i64,
    pub negative_amounts: i64,
    /// Rows whose datetime is not in the canonical `YYYY-MM-DDTHH:MM:SS` form
    pub invalid_datetimes: i64,
}

/// Append-only persistence for ledger transactions.
///
/// Each call is a single unit of work against the backing store; there are no
/// update or delete operations.
#[allow(async_fn_in_trait)]
pub trait LedgerStore {
    /// Append a transaction and return its newly assigned id.
    async fn record(&self, transaction: &NewTransaction) -> Result<TransactionId>;

    /// Credits minus debits for `user_id` over all transactions at or before `cutoff`.
    async fn balance_as_of(&self, user_id: UserId, cutoff: Timestamp) -> Result<Cents>;

    /// Transactions for `user_id` with `start <= datetime <= end`, ordered by
    /// datetime then id.
    async fn list_in_range(
        &self,
        user_id: UserId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Transaction>>;

    async fn integrity_stats(&self) -> Result<IntegrityStats>;
}
