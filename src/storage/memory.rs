use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use tracing::debug;

use crate::domain::{
    self, Cents, NewTransaction, Timestamp, Transaction, TransactionId, UserId,
};

use super::{IntegrityStats, LedgerStore};

#[derive(Default)]
struct MemoryState {
    transactions: Vec<Transaction>,
    last_id: TransactionId,
}

/// In-process store holding transactions in a vector. Nothing is persisted.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))
    }
}

impl LedgerStore for MemoryStore {
    async fn record(&self, transaction: &NewTransaction) -> Result<TransactionId> {
        let mut state = self.lock()?;
        state.last_id += 1;
        let id = state.last_id;
        state
            .transactions
            .push(transaction.clone().into_transaction(id));
        debug!(id, "recorded transaction in memory");
        Ok(id)
    }

    async fn balance_as_of(&self, user_id: UserId, cutoff: Timestamp) -> Result<Cents> {
        let state = self.lock()?;
        Ok(domain::balance_as_of(user_id, cutoff, &state.transactions)?)
    }

    async fn list_in_range(
        &self,
        user_id: UserId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Transaction>> {
        let state = self.lock()?;
        Ok(domain::in_range(user_id, start, end, &state.transactions))
    }

    async fn integrity_stats(&self) -> Result<IntegrityStats> {
        let state = self.lock()?;
        let mut users: Vec<UserId> = state.transactions.iter().map(|t| t.user_id).collect();
        users.sort();
        users.dedup();

        // Every row went through NewTransaction, so only the counts can be non-zero.
        Ok(IntegrityStats {
            transaction_count: state.transactions.len() as i64,
            user_count: users.len() as i64,
            ..IntegrityStats::default()
        })
    }
}
