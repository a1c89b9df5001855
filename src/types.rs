/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A record as handed around between the store, the table and the form
pub type Row = Map<String, Value>;

/// Entity type discriminator used in routes (`/api/:kind/:id`) and store calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Client,
    Case,
    Work,
    Lawyer,
    Payment,
    Contract,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Client,
        EntityKind::Case,
        EntityKind::Work,
        EntityKind::Lawyer,
        EntityKind::Payment,
        EntityKind::Contract,
    ];

    /// Route segment, e.g. `case`
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Client => "client",
            EntityKind::Case => "case",
            EntityKind::Work => "work",
            EntityKind::Lawyer => "lawyer",
            EntityKind::Payment => "payment",
            EntityKind::Contract => "contract",
        }
    }

    /// Human label, e.g. `Case`
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Client => "Client",
            EntityKind::Case => "Case",
            EntityKind::Work => "Work",
            EntityKind::Lawyer => "Lawyer",
            EntityKind::Payment => "Payment",
            EntityKind::Contract => "Contract",
        }
    }

    /// Database table name
    pub fn table_name(&self) -> &'static str {
        self.label()
    }

    /// Primary key column
    pub fn primary_key(&self) -> &'static str {
        match self {
            EntityKind::Client => "ClientID",
            EntityKind::Case => "CaseNum",
            EntityKind::Work => "WorkID",
            EntityKind::Lawyer => "LawyerID",
            EntityKind::Payment => "PaymentID",
            EntityKind::Contract => "ContractID",
        }
    }

    /// Whether the primary key is a text key (Case) rather than a serial integer
    pub fn has_text_key(&self) -> bool {
        matches!(self, EntityKind::Case)
    }

    /// Parse a raw path segment into an id of the right shape for this kind
    pub fn parse_id(&self, raw: &str) -> Result<RecordId, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(format!("empty {} identifier", self.as_str()));
        }
        if self.has_text_key() {
            Ok(RecordId::Text(raw.to_string()))
        } else {
            raw.parse::<i64>()
                .map(RecordId::Int)
                .map_err(|_| format!("invalid {} identifier: {}", self.as_str(), raw))
        }
    }

    /// Read this kind's primary key out of a row
    pub fn id_of(&self, row: &Row) -> Option<RecordId> {
        match row.get(self.primary_key())? {
            Value::Number(n) => n.as_i64().map(RecordId::Int),
            Value::String(s) => self.parse_id(s).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown record type: {}", s))
    }
}

/// Primary key value of a record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Int(i) => Value::from(*i),
            RecordId::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(i) => write!(f, "{}", i),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}
