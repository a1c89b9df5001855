//! Stock cell renderers.

use chrono::Datelike;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;

use crate::billing::format_amount;
use crate::database::schema::parse_timestamp;
use crate::types::Row;

use super::filter::stringify;
use super::query::path_segment;
use super::types::{Cell, CellRenderer};

/// `M/D/YYYY`; unparsable values are shown as-is
pub fn format_date(value: &Value) -> String {
    match value {
        Value::String(s) => parse_timestamp(s)
            .map(|dt| format!("{}/{}/{}", dt.month(), dt.day(), dt.year()))
            .unwrap_or_else(|| s.clone()),
        other => stringify(other),
    }
}

pub fn date() -> CellRenderer {
    Arc::new(|value: &Value, _: &Row| Cell::text(format_date(value)))
}

/// Grouped amount (`1,234.5`); blank when absent
pub fn money() -> CellRenderer {
    Arc::new(|value: &Value, _: &Row| {
        let amount = match value {
            Value::Number(n) => n.as_f64().and_then(Decimal::from_f64),
            Value::String(s) => s.trim().parse::<Decimal>().ok(),
            _ => None,
        };
        match amount {
            Some(a) => Cell::text(format_amount(a)),
            None => Cell::text(stringify(value)),
        }
    })
}

/// Cell linking to a path built from another column, e.g. `link("/case/{}", "CaseNum")`
pub fn link(template: &'static str, key: &'static str) -> CellRenderer {
    Arc::new(move |value: &Value, row: &Row| {
        let target = row.get(key).map(stringify).unwrap_or_default();
        if target.is_empty() {
            return Cell::text(stringify(value));
        }
        Cell::Link {
            text: stringify(value),
            href: template.replace("{}", &path_segment(&target)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Row;
    use serde_json::json;

    #[test]
    fn dates_render_month_day_year() {
        assert_eq!(format_date(&json!("2023-01-12T00:00:00Z")), "1/12/2023");
        assert_eq!(format_date(&json!("2023-11-05T00:00:00+00:00")), "11/5/2023");
        assert_eq!(format_date(&json!("someday")), "someday");
        assert_eq!(format_date(&Value::Null), "");
    }

    #[test]
    fn money_and_links() {
        let row: Row = json!({"CaseNum": "C1"}).as_object().cloned().unwrap();
        assert_eq!(money()(&json!(2500.5), &row), Cell::text("2,500.5"));
        assert_eq!(money()(&Value::Null, &row), Cell::text(""));
        assert_eq!(
            link("/case/{}", "CaseNum")(&json!("Santos"), &row),
            Cell::Link { text: "Santos".into(), href: "/case/C1".into() }
        );
    }
}
