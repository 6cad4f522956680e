use crate::storage::IntegrityStats;

/// Outcome of a ledger integrity check.
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub transaction_count: i64,
    pub user_count: i64,
    pub issues: Vec<String>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Turn raw store statistics into a report with human-readable issues.
pub fn build_integrity_report(stats: &IntegrityStats) -> IntegrityReport {
    let mut issues = Vec::new();

    if stats.invalid_types > 0 {
        issues.push(format!(
            "{} transaction(s) with a type other than credit or debit",
            stats.invalid_types
        ));
    }
    if stats.negative_amounts > 0 {
        issues.push(format!(
            "{} transaction(s) with a negative amount",
            stats.negative_amounts
        ));
    }
    if stats.invalid_datetimes > 0 {
        issues.push(format!(
            "{} transaction(s) with a malformed datetime",
            stats.invalid_datetimes
        ));
    }

    IntegrityReport {
        transaction_count: stats.transaction_count,
        user_count: stats.user_count,
        issues,
    }
}
