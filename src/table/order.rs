use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::cmp::Ordering;

use crate::database::schema::parse_timestamp;

use super::types::SortDirection;

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Dates as stored (`2023-01-12T00:00:00Z`) or as displayed (`1/12/2023`)
fn date_like(raw: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(raw).or_else(|| {
        NaiveDate::parse_from_str(raw.trim(), "%m/%d/%Y")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|n| n.and_utc())
    })
}

/// Natural ordering of cell values: null lowest, numbers numerically, mixed
/// types by type rank. Among strings, date-like values come first in
/// chronological order, then the rest lexicographically.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => match (date_like(x), date_like(y)) {
            (Some(dx), Some(dy)) => dx.cmp(&dy),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => x.cmp(y),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Comparator for a direction; descending swaps operands so ties keep input order
pub fn compare_directed(a: &Value, b: &Value, dir: SortDirection) -> Ordering {
    match dir {
        SortDirection::Asc => compare(a, b),
        SortDirection::Desc => compare(b, a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sorted(mut values: Vec<Value>) -> Vec<Value> {
        values.sort_by(compare);
        values
    }

    #[test]
    fn numbers_sort_numerically() {
        assert_eq!(sorted(vec![json!(10), json!(9), json!(1.5)]), vec![json!(1.5), json!(9), json!(10)]);
    }

    #[test]
    fn dates_sort_chronologically() {
        let values = vec![json!("2023-02-01T00:00:00Z"), json!("2022-12-31T00:00:00Z"), json!("2023-01-15")];
        assert_eq!(
            sorted(values),
            vec![json!("2022-12-31T00:00:00Z"), json!("2023-01-15"), json!("2023-02-01T00:00:00Z")]
        );
        assert_eq!(compare(&json!("2/1/2023"), &json!("12/31/2022")), Ordering::Greater);
    }

    #[test]
    fn nulls_sort_lowest_and_strings_lexicographic() {
        assert_eq!(
            sorted(vec![json!("Cy"), Value::Null, json!("Amy"), json!("Bo")]),
            vec![Value::Null, json!("Amy"), json!("Bo"), json!("Cy")]
        );
        assert_eq!(compare(&json!(5), &json!("5")), Ordering::Less);
    }

    #[test]
    fn mixed_date_and_text_columns_order_consistently() {
        let (a, b, c) = (json!("2/1/2023"), json!("10/1/2023"), json!("1x"));
        assert_eq!(compare(&a, &b), Ordering::Less);
        assert_eq!(compare(&b, &c), Ordering::Less);
        assert_eq!(compare(&a, &c), Ordering::Less);

        let values = vec![c.clone(), b.clone(), a.clone()];
        let mut asc = values.clone();
        asc.sort_by(|x, y| compare_directed(x, y, SortDirection::Asc));
        assert_eq!(asc, vec![a, b, c]);
        let mut desc = values;
        desc.sort_by(|x, y| compare_directed(x, y, SortDirection::Desc));
        asc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn descending_reverses_distinct_values() {
        let values = [json!(3), json!(1), json!(2)];
        let mut asc = values.to_vec();
        asc.sort_by(|a, b| compare_directed(a, b, SortDirection::Asc));
        let mut desc = values.to_vec();
        desc.sort_by(|a, b| compare_directed(a, b, SortDirection::Desc));
        asc.reverse();
        assert_eq!(asc, desc);
    }
}
