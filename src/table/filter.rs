//! Column filter predicates.
//!
//! Malformed input never raises: an unparsable bound is simply unset.

use serde_json::Value;

use super::types::{ColumnFilter, FilterKind};

/// Display string of a cell value; null and missing values are empty
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Case-sensitive substring match; empty needle passes everything
pub fn text_matches(value: &Value, needle: &str) -> bool {
    needle.is_empty() || stringify(value).contains(needle)
}

/// Bound from raw input; empty, unparsable or non-finite input is unset
pub fn parse_bound(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Numeric reading of a row value; numeric strings count as numbers
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_bound(s),
        _ => None,
    }
}

pub fn in_range(value: &Value, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(v) = numeric_value(value) else {
        return false;
    };
    min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m)
}

/// Filter kind guessed from a sample value
pub fn infer_kind(sample: Option<&Value>) -> FilterKind {
    match sample {
        Some(Value::Number(_)) => FilterKind::NumericRange,
        _ => FilterKind::Text,
    }
}

impl ColumnFilter {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ColumnFilter::Text(needle) => text_matches(value, needle),
            ColumnFilter::Range { min, max } => in_range(value, parse_bound(min), parse_bound(max)),
        }
    }

    /// Whether the filter no longer constrains anything
    pub fn is_empty(&self) -> bool {
        match self {
            ColumnFilter::Text(needle) => needle.is_empty(),
            ColumnFilter::Range { min, max } => min.trim().is_empty() && max.trim().is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_is_case_sensitive_substring() {
        assert!(text_matches(&json!("Santos v. Dela Cruz"), "Dela"));
        assert!(!text_matches(&json!("Santos v. Dela Cruz"), "dela"));
        assert!(text_matches(&json!(1500), "50"));
        assert!(text_matches(&Value::Null, ""));
        assert!(!text_matches(&Value::Null, "a"));
    }

    #[test]
    fn bounds_ignore_garbage() {
        assert_eq!(parse_bound(" 10 "), Some(10.0));
        assert_eq!(parse_bound(""), None);
        assert_eq!(parse_bound("ten"), None);
        assert_eq!(parse_bound("NaN"), None);
        assert_eq!(parse_bound("inf"), None);
    }

    #[test]
    fn range_is_inclusive_and_rejects_non_numbers() {
        assert!(in_range(&json!(10), Some(10.0), Some(10.0)));
        assert!(!in_range(&json!(9.99), Some(10.0), None));
        assert!(in_range(&json!("15"), Some(10.0), None));
        assert!(!in_range(&Value::Null, Some(0.0), None));
        assert!(!in_range(&json!("n/a"), None, Some(5.0)));
        assert!(in_range(&json!("n/a"), None, None));
    }

    #[test]
    fn infers_kind_from_sample() {
        assert_eq!(infer_kind(Some(&json!(3))), FilterKind::NumericRange);
        assert_eq!(infer_kind(Some(&json!("3"))), FilterKind::Text);
        assert_eq!(infer_kind(None), FilterKind::Text);
    }
}
