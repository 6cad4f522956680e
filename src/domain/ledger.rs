use std::fmt;

use super::{Cents, Timestamp, Transaction, TransactionType, UserId};

/// Per-type totals for one user up to a cutoff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceTotals {
    pub credit: Cents,
    pub debit: Cents,
}

impl BalanceTotals {
    pub fn add(
        &mut self,
        transaction_type: TransactionType,
        amount_cents: Cents,
    ) -> Result<(), BalanceOverflow> {
        let side = match transaction_type {
            TransactionType::Credit => &mut self.credit,
            TransactionType::Debit => &mut self.debit,
        };
        *side = side
            .checked_add(amount_cents)
            .ok_or(BalanceOverflow { transaction_type })?;
        Ok(())
    }

    /// Credits minus debits. An empty side contributes zero.
    pub fn balance(&self) -> Result<Cents, BalanceOverflow> {
        self.credit
            .checked_sub(self.debit)
            .ok_or(BalanceOverflow {
                transaction_type: TransactionType::Debit,
            })
    }
}

/// A running total left the range of `Cents`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceOverflow {
    pub transaction_type: TransactionType,
}

impl fmt::Display for BalanceOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} total overflows the balance range", self.transaction_type)
    }
}

impl std::error::Error for BalanceOverflow {}

/// Compute a user's balance at `cutoff` (inclusive) from a list of transactions.
pub fn balance_as_of(
    user_id: UserId,
    cutoff: Timestamp,
    transactions: &[Transaction],
) -> Result<Cents, BalanceOverflow> {
    let mut totals = BalanceTotals::default();
    for t in transactions
        .iter()
        .filter(|t| t.user_id == user_id && t.datetime <= cutoff)
    {
        totals.add(t.transaction_type, t.amount_cents)?;
    }
    totals.balance()
}

/// A user's transactions within `[start, end]`, ordered by datetime then id.
pub fn in_range(
    user_id: UserId,
    start: Timestamp,
    end: Timestamp,
    transactions: &[Transaction],
) -> Vec<Transaction> {
    let mut matching: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.user_id == user_id && t.datetime >= start && t.datetime <= end)
        .cloned()
        .collect();
    matching.sort_by_key(|t| (t.datetime, t.id));
    matching
}
