use tracing::{debug, info, warn};

use crate::domain::{
    Cents, NewTransaction, Timestamp, Transaction, TransactionId, TransactionInput, UserId,
    ValidationError,
};
use crate::storage::{LedgerStore, Repository};

use super::{AppError, IntegrityReport, build_integrity_report};

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, web form, etc.).
/// The store is owned by the service and chosen by the caller.
pub struct LedgerService<S = Repository> {
    store: S,
}

impl LedgerService<Repository> {
    /// Create the database file if needed, then bring the schema up to date.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database. Fails if the file does not exist.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }
}

impl<S: LedgerStore> LedgerService<S> {
    /// Create a new ledger service on top of the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append a validated transaction and return its new id.
    pub async fn record_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> Result<TransactionId, AppError> {
        let id = self.store.record(transaction).await?;
        info!(id, user_id = %transaction.user_id(), "transaction recorded");
        Ok(id)
    }

    /// Validate raw input fields and record the result.
    pub async fn record_input(&self, input: &TransactionInput) -> Result<Transaction, AppError> {
        let transaction = input.validate().inspect_err(|e| {
            debug!(field = e.field(), "rejected transaction input: {}", e);
        })?;
        let id = self.record_transaction(&transaction).await?;
        Ok(transaction.into_transaction(id))
    }

    /// Net balance (credits minus debits) for a user at an inclusive cutoff.
    /// A user with no transactions has a balance of zero.
    pub async fn balance_as_of(&self, user_id: UserId, cutoff: Timestamp) -> Result<Cents, AppError> {
        Ok(self.store.balance_as_of(user_id, cutoff).await?)
    }

    /// Transactions for a user within the inclusive window `[start, end]`,
    /// oldest first, ties broken by id.
    pub async fn list_in_range(
        &self,
        user_id: UserId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Transaction>, AppError> {
        if start > end {
            return Err(ValidationError::out_of_domain(
                "start",
                format!("range start {} is after end {}", start, end),
            )
            .into());
        }
        Ok(self.store.list_in_range(user_id, start, end).await?)
    }

    /// Check ledger integrity and return a report.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        let stats = self.store.integrity_stats().await?;
        let report = build_integrity_report(&stats);
        for issue in &report.issues {
            warn!("integrity issue: {}", issue);
        }
        Ok(report)
    }
}
