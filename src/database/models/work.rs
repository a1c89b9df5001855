use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Work {
    #[serde(rename = "WorkID")]
    pub work_id: i64,
    #[serde(rename = "CaseNum")]
    pub case_num: String,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Date", default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "FeeAmt", default, with = "rust_decimal::serde::float_option")]
    pub fee_amt: Option<Decimal>,
}
