use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    #[serde(rename = "CaseNum")]
    pub case_num: String,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Type", default)]
    pub case_type: Option<String>,
    #[serde(rename = "ClientID")]
    pub client_id: i64,
    #[serde(rename = "ContractID")]
    pub contract_id: i64,
}

impl Case {
    /// Title when set, otherwise the case number
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.case_num)
    }
}
