//! Display formatting for monetary amounts
//!
//! Amounts are rendered with the currency symbol prefixed and a `,` inserted
//! every three digits of the integer part. VND and JPY are shown as whole
//! units, USD and EUR with exactly two decimals.

use crate::currency::Currency;
use crate::error::Result;

const GROUPING_SEPARATOR: char = ',';

/// Shown in place of an amount whose conversion failed
pub const CONVERSION_UNAVAILABLE: &str = "conversion unavailable";

/// Format an amount with its currency symbol
///
/// ```
/// use finmate_fx::{format_currency, Currency};
///
/// assert_eq!(format_currency(1234567.0, Currency::VND), "₫1,234,567");
/// assert_eq!(format_currency(1234.5, Currency::USD), "$1,234.50");
/// ```
pub fn format_currency(amount: f64, currency: Currency) -> String {
    let symbol = currency.symbol();
    if !amount.is_finite() {
        return format!("{}-", symbol);
    }

    let body = match currency.display_decimals() {
        0 => format!("{:.0}", round_half_up(amount)),
        precision => format!("{:.*}", precision, amount),
    };

    format!("{}{}", symbol, group_integer_part(&body))
}

/// Format a conversion outcome, substituting a fixed indicator on failure
pub fn format_conversion(result: &Result<f64>, currency: Currency) -> String {
    match result {
        Ok(amount) => format_currency(*amount, currency),
        Err(e) => {
            log::debug!("Rendering unavailable conversion to {}: {}", currency, e);
            CONVERSION_UNAVAILABLE.to_string()
        }
    }
}

/// Nearest integer, with halves going toward positive infinity
fn round_half_up(value: f64) -> f64 {
    // `value + 0.5` is inexact near 0.5 and above 2^52, compare the fraction instead
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    // avoid rendering "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn group_integer_part(body: &str) -> String {
    let (int_part, frac_part) = match body.find('.') {
        Some(pos) => body.split_at(pos),
        None => (body, ""),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };
    format!("{}{}{}", sign, group_digits(digits), frac_part)
}

fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(GROUPING_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped
}
