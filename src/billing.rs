//! Billing aggregates shown on the case pages.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::database::models::Work;

/// Sum of work fees; a missing fee counts as zero
pub fn total_billing(works: &[Work]) -> Decimal {
    works
        .iter()
        .fold(Decimal::ZERO, |acc, w| acc + w.fee_amt.unwrap_or(Decimal::ZERO))
}

/// `1234.5` -> `1,234.5`: en-US grouping, at most three decimals, no trailing zeros
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Peso amount as displayed on the case page
pub fn format_php(amount: Decimal) -> String {
    format!("Php {}", format_amount(amount))
}
