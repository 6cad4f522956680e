use std::fmt;

/// Money is represented as integer cents to avoid floating-point drift in balances.
/// 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

/// Largest single amount a transaction may carry: 1,000,000,000,000.00.
/// Amounts are written to a REAL column as `cents / 100`; below this bound the
/// conversion back to cents is exact.
pub const MAX_AMOUNT_CENTS: Cents = 100_000_000_000_000;

/// Format cents as a decimal string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
///
/// More than two decimal places is rejected rather than rounded.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let digits = input.strip_prefix('-').unwrap_or(input);

    if digits.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }

    let (units_str, decimal_str) = match digits.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (digits, ""),
    };

    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !decimal_str.chars().all(|c| c.is_ascii_digit())
        || (units_str.is_empty() && decimal_str.is_empty())
    {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| ParseCentsError::Overflow)?
    };

    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        // "12.5" means 50 cents
        1 => decimal_str.parse::<i64>().map_err(|_| ParseCentsError::InvalidFormat)? * 10,
        2 => decimal_str.parse().map_err(|_| ParseCentsError::InvalidFormat)?,
        _ => return Err(ParseCentsError::TooManyDecimals),
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(ParseCentsError::Overflow)?;

    Ok(if negative { -cents } else { cents })
}

/// Convert cents into the value written to the REAL `amount` column.
pub fn cents_to_real(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

/// Convert a REAL `amount` column value back into cents.
pub fn real_to_cents(amount: f64) -> Cents {
    (amount * 100.0).round() as Cents
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    TooManyDecimals,
    Overflow,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::TooManyDecimals => write!(f, "more than two decimal places"),
            ParseCentsError::Overflow => write!(f, "amount too large"),
        }
    }
}

impl std::error::Error for ParseCentsError {}
