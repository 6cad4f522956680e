use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    Cents, MAX_AMOUNT_CENTS, Timestamp, ValidationError, format_cents, parse_cents,
    parse_timestamp_field, truncate_to_seconds,
};

/// Store-assigned identifier. Strictly increasing in creation order, never reused.
pub type TransactionId = i64;

/// Direction of a ledger movement. The amount itself is always a magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Increases the balance
    Credit,
    /// Decreases the balance
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Debit => "debit",
        }
    }

    /// Lenient parse for user input; case is ignored.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "credit" => Some(TransactionType::Credit),
            "debit" => Some(TransactionType::Debit),
            _ => None,
        }
    }

    /// Exact parse for values read back from storage. Only the canonical
    /// lowercase spelling written by `as_str` is accepted.
    pub fn from_stored(s: &str) -> Option<Self> {
        match s {
            "credit" => Some(TransactionType::Credit),
            "debit" => Some(TransactionType::Debit),
            _ => None,
        }
    }

    /// Apply this direction to a magnitude.
    pub fn signed(&self, amount_cents: Cents) -> Cents {
        match self {
            TransactionType::Credit => amount_cents,
            TransactionType::Debit => -amount_cents,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque positive partition key identifying the owner of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Result<Self, ValidationError> {
        if id <= 0 {
            return Err(ValidationError::out_of_domain(
                "user_id",
                format!("must be a positive integer, got {}", id),
            ));
        }
        Ok(Self(id))
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let id: i64 = input
            .trim()
            .parse()
            .map_err(|e| ValidationError::wrong_type("user_id", input, e))?;
        Self::new(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recorded, immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub transaction_type: TransactionType,
    /// Magnitude in cents (never negative)
    pub amount_cents: Cents,
    pub description: String,
    pub user_id: UserId,
    pub datetime: Timestamp,
}

impl Transaction {
    /// Amount with the sign implied by the transaction type.
    pub fn signed_amount(&self) -> Cents {
        self.transaction_type.signed(self.amount_cents)
    }
}

/// A validated transaction waiting to be recorded. The only way to build one
/// is through `new` (or `TransactionInput::validate`), so every store can trust it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    transaction_type: TransactionType,
    amount_cents: Cents,
    description: String,
    user_id: UserId,
    datetime: Timestamp,
}

impl NewTransaction {
    pub fn new(
        transaction_type: TransactionType,
        amount_cents: Cents,
        description: impl Into<String>,
        user_id: UserId,
        datetime: Timestamp,
    ) -> Result<Self, ValidationError> {
        if amount_cents < 0 {
            return Err(ValidationError::out_of_domain(
                "amount",
                "must not be negative; use a debit instead",
            ));
        }
        if amount_cents > MAX_AMOUNT_CENTS {
            return Err(ValidationError::out_of_domain(
                "amount",
                format!("must not exceed {}", format_cents(MAX_AMOUNT_CENTS)),
            ));
        }

        let description = description.into();
        if description.trim().is_empty() {
            return Err(ValidationError::MissingField("description"));
        }

        Ok(Self {
            transaction_type,
            amount_cents,
            description,
            user_id,
            datetime: truncate_to_seconds(datetime),
        })
    }

    pub fn credit(
        amount_cents: Cents,
        description: impl Into<String>,
        user_id: UserId,
        datetime: Timestamp,
    ) -> Result<Self, ValidationError> {
        Self::new(TransactionType::Credit, amount_cents, description, user_id, datetime)
    }

    pub fn debit(
        amount_cents: Cents,
        description: impl Into<String>,
        user_id: UserId,
        datetime: Timestamp,
    ) -> Result<Self, ValidationError> {
        Self::new(TransactionType::Debit, amount_cents, description, user_id, datetime)
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn amount_cents(&self) -> Cents {
        self.amount_cents
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn datetime(&self) -> Timestamp {
        self.datetime
    }

    /// Attach the identifier assigned by a store.
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            transaction_type: self.transaction_type,
            amount_cents: self.amount_cents,
            description: self.description,
            user_id: self.user_id,
            datetime: self.datetime,
        }
    }
}

/// Raw, untyped transaction fields as they arrive from a form or command line.
/// Empty strings count as missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionInput {
    pub transaction_type: Option<String>,
    pub amount: Option<String>,
    pub description: Option<String>,
    pub user_id: Option<String>,
    pub datetime: Option<String>,
}

impl TransactionInput {
    pub fn validate(&self) -> Result<NewTransaction, ValidationError> {
        let type_str = required("transaction_type", &self.transaction_type)?;
        let amount_str = required("amount", &self.amount)?;
        let description = required("description", &self.description)?;
        let user_id_str = required("user_id", &self.user_id)?;
        let datetime_str = required("datetime", &self.datetime)?;

        let transaction_type = TransactionType::from_str(type_str).ok_or_else(|| {
            ValidationError::out_of_domain(
                "transaction_type",
                format!("expected credit or debit, got {:?}", type_str),
            )
        })?;
        let amount_cents = parse_cents(amount_str)
            .map_err(|e| ValidationError::wrong_type("amount", amount_str, e))?;
        let user_id = UserId::parse(user_id_str)?;
        let datetime = parse_timestamp_field("datetime", datetime_str)?;

        NewTransaction::new(transaction_type, amount_cents, description, user_id, datetime)
    }
}

fn required<'a>(
    field: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}
