use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lawyer {
    #[serde(rename = "LawyerID")]
    pub lawyer_id: i64,
    #[serde(rename = "LastName", default)]
    pub last_name: Option<String>,
    #[serde(rename = "FirstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "MiddleName", default)]
    pub middle_name: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "isManager", default)]
    pub is_manager: Option<bool>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default, skip_serializing)]
    pub pass: Option<String>,
}

impl Lawyer {
    pub fn display_name(&self) -> String {
        super::display_name(
            self.last_name.as_deref(),
            self.first_name.as_deref(),
            self.middle_name.as_deref(),
        )
    }
}
