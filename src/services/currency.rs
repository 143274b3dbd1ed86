// src/services/currency.rs
use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::{FipeError, Result};

/// Parse a Brazilian-formatted amount such as `R$ 10.500,75`.
///
/// `.` groups thousands and `,` separates decimals. The currency symbol and
/// any whitespace (including non-breaking spaces) are ignored.
pub fn parse_brl(raw: &str) -> Result<Decimal> {
    let cleaned: String = raw
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let re = Regex::new(r"^-?(\d{1,3}(\.\d{3})+|\d+)(,\d+)?$")
        .map_err(|e| FipeError::InvalidPrice(e.to_string()))?;
    if !re.is_match(&cleaned) {
        return Err(FipeError::InvalidPrice(raw.to_string()));
    }

    let normalized = cleaned.replace('.', "").replace(',', ".");
    Decimal::from_str(&normalized).map_err(|_| FipeError::InvalidPrice(raw.to_string()))
}

/// `R$ 10.500,75`
pub fn format_brl(value: Decimal) -> String {
    let sign = if value.is_sign_negative() && !value.round_dp(2).is_zero() { "-" } else { "" };
    format!("{}R$ {}", sign, group_digits(value))
}

/// `+1.234,00` / `-50,00`
pub fn format_signed_brl(value: Decimal) -> String {
    let sign = if value.is_sign_negative() && !value.round_dp(2).is_zero() { "-" } else { "+" };
    format!("{}{}", sign, group_digits(value))
}

/// `+10,00%`
pub fn format_percent(value: Option<Decimal>) -> String {
    match value {
        Some(v) => {
            let sign = if v.is_sign_negative() && !v.round_dp(2).is_zero() { "-" } else { "+" };
            format!("{}{:.2}%", sign, v.round_dp(2).abs()).replace('.', ",")
        }
        None => "n/a".to_string(),
    }
}

fn group_digits(value: Decimal) -> String {
    let fixed = format!("{:.2}", value.round_dp(2).abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{},{}", grouped, frac_part)
}
