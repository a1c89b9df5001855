use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    #[serde(rename = "ContractID")]
    pub contract_id: i64,
    #[serde(rename = "ClientID", default)]
    pub client_id: Option<i64>,
    #[serde(rename = "Terms", default)]
    pub terms: Option<String>,
    #[serde(rename = "DateSigned", default)]
    pub date_signed: Option<DateTime<Utc>>,
}
