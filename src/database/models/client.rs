use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "ClientID")]
    pub client_id: i64,
    #[serde(rename = "ContractID", default)]
    pub contract_id: Option<i64>,
    #[serde(rename = "LastName", default)]
    pub last_name: Option<String>,
    #[serde(rename = "FirstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "MiddleName", default)]
    pub middle_name: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "TelNum", default)]
    pub tel_num: Option<String>,
    #[serde(rename = "CellNum", default)]
    pub cell_num: Option<String>,
    #[serde(rename = "CityAdd", default)]
    pub city_add: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default, skip_serializing)]
    pub pass: Option<String>,
}

impl Client {
    pub fn display_name(&self) -> String {
        super::display_name(
            self.last_name.as_deref(),
            self.first_name.as_deref(),
            self.middle_name.as_deref(),
        )
    }

    /// "tel | cell" with whichever numbers are present
    pub fn phone_line(&self) -> String {
        [self.tel_num.as_deref(), self.cell_num.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
