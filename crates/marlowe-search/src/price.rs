//! Price-string parsing
//!
//! Providers report prices as display strings ("$1,249.00", "EUR 89,95");
//! downstream scoring needs numeric amounts.

/// A parsed price: numeric amount plus currency code
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedPrice {
    /// Numeric amount
    pub amount: f64,
    /// ISO-ish currency code; "USD" when nothing identifiable is present
    pub currency: &'static str,
}

static SYMBOL_CURRENCIES: &[(&str, &str)] = &[
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("₹", "INR"),
];

static CODE_CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "JPY", "CAD", "AUD", "INR", "CHF"];

/// Parse a display price string into an amount and currency
///
/// Handles currency symbols or ISO codes on either side, thousands
/// separators, and both `1,249.00` and `1.249,00` decimal conventions.
pub fn parse_price(raw: &str) -> Option<ParsedPrice> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut currency = "USD";
    for (symbol, code) in SYMBOL_CURRENCIES {
        if trimmed.contains(symbol) {
            currency = code;
            break;
        }
    }
    let upper = trimmed.to_uppercase();
    for code in CODE_CURRENCIES {
        if upper.contains(code) {
            currency = code;
            break;
        }
    }

    let numeric: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if numeric.is_empty() {
        return None;
    }

    let amount = normalize_separators(&numeric).parse::<f64>().ok()?;
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    Some(ParsedPrice { amount, currency })
}

/// Resolve thousands vs. decimal separators: whichever of `.`/`,` appears
/// last is the decimal point, the other is grouping.
fn normalize_separators(numeric: &str) -> String {
    let last_dot = numeric.rfind('.');
    let last_comma = numeric.rfind(',');
    match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => {
            if dot > comma {
                numeric.replace(',', "")
            } else {
                numeric.replace('.', "").replace(',', ".")
            }
        }
        (None, Some(comma)) => {
            // A lone comma is decimal when it groups exactly two digits
            let decimals = numeric.len() - comma - 1;
            if decimals == 2 {
                numeric.replace(',', ".")
            } else {
                numeric.replace(',', "")
            }
        }
        _ => numeric.to_string(),
    }
}
