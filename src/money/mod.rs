//! Currency and amount helpers shared by the ledger engines.
//!
//! Amounts are stored as `f64` magnitudes but every calculation that must be
//! exact (installment splitting, cycle totals) goes through integer cents.

use chrono::NaiveDate;

/// Number of cents in one currency unit.
const CENTS: f64 = 100.0;

/// Converts a decimal amount to integer cents, rounding half away from zero.
pub fn to_cents(amount: f64) -> i64 {
    (amount * CENTS).round() as i64
}

/// Converts integer cents back to a decimal amount.
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / CENTS
}

/// Rounds an amount to cent precision.
pub fn round2(amount: f64) -> f64 {
    from_cents(to_cents(amount))
}

/// Splits `total` into `count` parts that sum to `total` exactly.
///
/// The split happens in integer cents: the remainder after an even division
/// is distributed one cent at a time across the leading parts, so no part is
/// ever more than one cent away from any other. Negative totals (purchase
/// reversals) split the same way.
pub fn split_installments(total: f64, count: u32) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let cents = to_cents(total);
    let count = count as i64;
    let base = cents.div_euclid(count);
    let remainder = cents - base * count;
    (0..count)
        .map(|i| {
            let part = if i < remainder { base + 1 } else { base };
            from_cents(part)
        })
        .collect()
}

/// Parses a locale-formatted amount string (thousands ".", decimal ",").
///
/// Currency symbols and other noise are stripped. Unparseable input yields
/// `0.0`; this helper never errors because it sits behind free-form UI input.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    let normalized = cleaned.replace('.', "").replace(',', ".");
    normalized.parse::<f64>().unwrap_or(0.0)
}

/// Formats an amount using the locale conventions `parse_amount` accepts.
pub fn format_amount(amount: f64) -> String {
    let cents = to_cents(amount);
    let negative = cents < 0;
    let cents = cents.abs();
    let units = cents / 100;
    let frac = cents % 100;

    let digits = units.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}{},{:02}", sign, grouped, frac)
}

/// Parses a `DD/MM/YYYY` date, returning `None` when malformed or out of
/// range.
pub fn parse_date_br(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().splitn(3, '/');
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
