use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "PaymentID")]
    pub payment_id: i64,
    #[serde(rename = "ClientID")]
    pub client_id: i64,
    #[serde(rename = "Amount", default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    #[serde(rename = "Date", default)]
    pub date: Option<DateTime<Utc>>,
}
