//! Currency parsing and formatting.
//!
//! Parsing is deliberately lossy: `"1,234"` reads as one thousand two hundred
//! thirty-four, never as 1.234. Hosts that need exact locale parsing must
//! normalize before handing rows to the engine.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

/// Rendered for missing or non-finite amounts.
pub const PLACEHOLDER: &str = "—";

static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9,.\-]").unwrap());
static THOUSANDS_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",(\d{3})\b").unwrap());
static LEADING_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(\d+(\.\d*)?|\.\d+)").unwrap());

/// Parse a currency-like JSON value.
///
/// Finite numbers pass through, strings go through [`parse_currency_str`],
/// everything else is `None`.
pub fn parse_currency(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_currency_str(s),
        _ => None,
    }
}

pub fn parse_currency_str(input: &str) -> Option<f64> {
    let stripped = NON_NUMERIC.replace_all(input, "");
    let without_thousands = THOUSANDS_COMMA.replace_all(&stripped, "$1");
    let normalized = without_thousands.replace(',', ".");

    // Longest leading decimal literal; trailing garbage such as a second
    // decimal point is ignored.
    let literal = LEADING_DECIMAL.find(&normalized)?.as_str();
    literal.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    #[default]
    Prefix,
    Suffix,
}

/// Fixed target format for rendered amounts.
///
/// Formatting never consults the process locale, so the same amount renders
/// to the same bytes on every host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub symbol_position: SymbolPosition,
    pub decimal_separator: char,
    pub group_separator: char,
    pub fraction_digits: u32,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "€".to_string(),
            symbol_position: SymbolPosition::Prefix,
            decimal_separator: '.',
            group_separator: ',',
            fraction_digits: 2,
        }
    }
}

impl CurrencyFormat {
    pub fn format(&self, amount: Option<f64>) -> String {
        let Some(amount) = amount.filter(|v| v.is_finite()) else {
            return PLACEHOLDER.to_string();
        };

        let fraction_digits = self.fraction_digits.min(9) as usize;
        // Rounding happens once, on a count of minor units, carried as a
        // decimal digit string so no magnitude overflows.
        let minor = (amount.abs() * 10f64.powi(fraction_digits as i32)).round();
        let mut digits = if minor.is_finite() {
            format!("{minor:.0}")
        } else {
            format!("{:.*}", fraction_digits, amount.abs()).replace('.', "")
        };
        if digits.len() <= fraction_digits {
            digits = format!("{digits:0>width$}", width = fraction_digits + 1);
        }
        let negative = amount < 0.0 && digits.bytes().any(|b| b != b'0');

        let (whole, fraction) = digits.split_at(digits.len() - fraction_digits);
        let mut number = group_digits(whole, self.group_separator);
        if fraction_digits > 0 {
            number.push(self.decimal_separator);
            number.push_str(fraction);
        }

        let sign = if negative { "-" } else { "" };
        match self.symbol_position {
            SymbolPosition::Prefix => format!("{}{}{}", sign, self.symbol, number),
            SymbolPosition::Suffix => format!("{}{}\u{a0}{}", sign, number, self.symbol),
        }
    }
}

/// Render with the default format (`€1,234.50`).
pub fn format_currency(amount: Option<f64>) -> String {
    CurrencyFormat::default().format(amount)
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}
