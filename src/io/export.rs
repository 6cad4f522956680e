use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{Timestamp, Transaction, UserId, format_cents, format_timestamp};
use crate::storage::LedgerStore;

/// Output format for exported listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

/// Flat view of a transaction, with the column names of the transactions table.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub transaction_type: String,
    pub amount: String,
    pub description: String,
    pub user_id: i64,
    pub datetime: String,
}

impl From<&Transaction> for TransactionRecord {
    fn from(t: &Transaction) -> Self {
        Self {
            id: t.id,
            transaction_type: t.transaction_type.as_str().to_string(),
            amount: format_cents(t.amount_cents),
            description: t.description.clone(),
            user_id: t.user_id.get(),
            datetime: format_timestamp(&t.datetime),
        }
    }
}

/// Write transactions as a pretty-printed JSON array.
pub fn write_json<W: Write>(transactions: &[Transaction], mut writer: W) -> Result<usize> {
    let records: Vec<TransactionRecord> = transactions.iter().map(Into::into).collect();
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(records.len())
}

/// Write transactions as CSV with a header row.
pub fn write_csv<W: Write>(transactions: &[Transaction], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut count = 0;
    for transaction in transactions {
        csv_writer.serialize(TransactionRecord::from(transaction))?;
        count += 1;
    }

    // An empty listing still gets its header
    if count == 0 {
        csv_writer.write_record([
            "id",
            "transaction_type",
            "amount",
            "description",
            "user_id",
            "datetime",
        ])?;
    }

    csv_writer.flush()?;
    Ok(count)
}

/// Exporter for a user's transactions over a time window
pub struct Exporter<'a, S> {
    service: &'a LedgerService<S>,
}

impl<'a, S: LedgerStore> Exporter<'a, S> {
    pub fn new(service: &'a LedgerService<S>) -> Self {
        Self { service }
    }

    /// Export the transactions in `[start, end]` in the given format.
    pub async fn export_range<W: Write>(
        &self,
        user_id: UserId,
        start: Timestamp,
        end: Timestamp,
        format: ExportFormat,
        writer: W,
    ) -> Result<usize> {
        let transactions = self.service.list_in_range(user_id, start, end).await?;
        match format {
            ExportFormat::Json => write_json(&transactions, writer),
            ExportFormat::Csv => write_csv(&transactions, writer),
        }
    }
}
