use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::domain::{
    BalanceTotals, Cents, NewTransaction, Timestamp, Transaction, TransactionId, TransactionType,
    UserId, cents_to_real, format_timestamp, parse_timestamp, real_to_cents,
};

use super::{IntegrityStats, LedgerStore, MIGRATION_001_INITIAL, MIGRATION_002_NORMALIZE_DATETIMES};

/// SQLite-backed ledger store.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database {}", database_url))?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run against an existing database.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        let normalized = sqlx::query(MIGRATION_002_NORMALIZE_DATETIMES)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 002")?
            .rows_affected();
        if normalized > 0 {
            info!(normalized, "normalized minute-precision datetimes");
        }
        info!("database schema is up to date");
        Ok(())
    }

    /// Connect and migrate.
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close the underlying pool, waiting for open connections to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let id: TransactionId = row.get("id");
        let type_str: String = row.get("transaction_type");
        let amount: f64 = row.get("amount");
        let user_id: i64 = row.get("user_id");
        let datetime_str: String = row.get("datetime");

        Ok(Transaction {
            id,
            transaction_type: TransactionType::from_stored(&type_str).ok_or_else(|| {
                anyhow::anyhow!("Invalid transaction type in row {}: {}", id, type_str)
            })?,
            amount_cents: real_to_cents(amount),
            description: row.get("description"),
            user_id: UserId::new(user_id)
                .with_context(|| format!("Invalid user_id in row {}", id))?,
            datetime: parse_timestamp(&datetime_str).ok_or_else(|| {
                anyhow::anyhow!("Invalid datetime in row {}: {}", id, datetime_str)
            })?,
        })
    }
}

impl LedgerStore for Repository {
    async fn record(&self, transaction: &NewTransaction) -> Result<TransactionId> {
        let row = sqlx::query(
            r#"
            INSERT INTO transactions (transaction_type, amount, description, user_id, datetime)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(transaction.transaction_type().as_str())
        .bind(cents_to_real(transaction.amount_cents()))
        .bind(transaction.description())
        .bind(transaction.user_id().get())
        .bind(format_timestamp(&transaction.datetime()))
        .fetch_one(&self.pool)
        .await
        .context("Failed to save transaction")?;

        let id: TransactionId = row.get("id");
        info!(
            id,
            user_id = transaction.user_id().get(),
            transaction_type = transaction.transaction_type().as_str(),
            "recorded transaction"
        );
        Ok(id)
    }

    async fn balance_as_of(&self, user_id: UserId, cutoff: Timestamp) -> Result<Cents> {
        // Summing cents as integers keeps the REAL column's rounding out of the total.
        let rows = sqlx::query(
            r#"
            SELECT transaction_type, SUM(CAST(ROUND(amount * 100) AS INTEGER)) AS total
            FROM transactions
            WHERE user_id = ? AND datetime <= ?
            GROUP BY transaction_type
            "#,
        )
        .bind(user_id.get())
        .bind(format_timestamp(&cutoff))
        .fetch_all(&self.pool)
        .await
        .context("Failed to compute balance")?;

        let mut totals = BalanceTotals::default();
        for row in rows {
            let type_str: String = row.get("transaction_type");
            let total: Cents = row.get("total");
            let transaction_type = TransactionType::from_stored(&type_str).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid transaction type in storage for user {}: {}",
                    user_id,
                    type_str
                )
            })?;
            totals
                .add(transaction_type, total)
                .with_context(|| format!("Balance overflow for user {}", user_id))?;
        }

        debug!(%user_id, %cutoff, credit = totals.credit, debit = totals.debit, "computed balance");
        totals
            .balance()
            .with_context(|| format!("Balance overflow for user {}", user_id))
    }

    async fn list_in_range(
        &self,
        user_id: UserId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, transaction_type, amount, description, user_id, datetime
            FROM transactions
            WHERE user_id = ? AND datetime BETWEEN ? AND ?
            ORDER BY datetime ASC, id ASC
            "#,
        )
        .bind(user_id.get())
        .bind(format_timestamp(&start))
        .bind(format_timestamp(&end))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        debug!(%user_id, %start, %end, count = rows.len(), "listed transactions");
        rows.iter().map(Self::row_to_transaction).collect()
    }

    async fn integrity_stats(&self) -> Result<IntegrityStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS transaction_count,
                COUNT(DISTINCT user_id) AS user_count,
                COALESCE(SUM(CASE WHEN transaction_type NOT IN ('credit', 'debit') THEN 1 ELSE 0 END), 0) AS invalid_types,
                COALESCE(SUM(CASE WHEN amount < 0 THEN 1 ELSE 0 END), 0) AS negative_amounts,
                COALESCE(SUM(CASE WHEN datetime NOT GLOB '[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]T[0-9][0-9]:[0-9][0-9]:[0-9][0-9]' THEN 1 ELSE 0 END), 0) AS invalid_datetimes
            FROM transactions
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to collect integrity statistics")?;

        Ok(IntegrityStats {
            transaction_count: row.get("transaction_count"),
            user_count: row.get("user_count"),
            invalid_types: row.get("invalid_types"),
            negative_amounts: row.get("negative_amounts"),
            invalid_datetimes: row.get("invalid_datetimes"),
        })
    }
}
