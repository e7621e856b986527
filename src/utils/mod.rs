//! Utility functions for formatting and common operations
//!
//! This module provides centralized formatting utilities for consistent
//! display of currency amounts and return rates throughout the application.

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "$" prefix
    Dollar,
    /// No currency symbol (for table cells)
    None,
}

/// Core formatting function with full control over output.
///
/// Rounds to cents and groups thousands with `,`.
///
/// # Examples
/// ```
/// use folio::utils::{format_currency_with_width, CurrencySymbol};
///
/// assert_eq!(
///     format_currency_with_width(1234.56, 0, CurrencySymbol::Dollar),
///     "$1,234.56"
/// );
///
/// assert_eq!(
///     format_currency_with_width(1234.0, 12, CurrencySymbol::None),
///     "    1,234.00"
/// );
/// ```
pub fn format_currency_with_width(value: f64, width: usize, symbol: CurrencySymbol) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    // "-0.00" would be noise
    let is_negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::Dollar => "$",
        CurrencySymbol::None => "",
    };

    let result = format!("{}{}{}.{}", sign, prefix, with_separators, decimal_part);

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// Format as dollars: "$1,234.56"
///
/// # Examples
/// ```
/// use folio::utils::format_currency;
///
/// assert_eq!(format_currency(1234.56), "$1,234.56");
/// assert_eq!(format_currency(-500.0), "-$500.00");
/// ```
pub fn format_currency(value: f64) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::Dollar)
}

/// Format a return fraction as a signed percentage: `0.0125` → "+1.25%"
pub fn format_percent(rate: f64) -> String {
    let pct = rate * 100.0;
    if format!("{:.2}", pct.abs()) == "0.00" {
        "0.00%".to_string()
    } else if pct > 0.0 {
        format!("+{:.2}%", pct)
    } else {
        format!("{:.2}%", pct)
    }
}
