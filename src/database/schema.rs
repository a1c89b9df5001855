//! Static column definitions for every entity table.
//!
//! The store uses these to validate column names and cast bound values, the
//! form uses them as the default field descriptors.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::types::{EntityKind, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Text,
    Numeric,
    Boolean,
    Timestamp,
}

impl SqlType {
    pub fn cast(&self) -> &'static str {
        match self {
            SqlType::Integer => "integer",
            SqlType::Text => "text",
            SqlType::Numeric => "numeric",
            SqlType::Boolean => "boolean",
            SqlType::Timestamp => "timestamptz",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub label: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
    /// Credential columns; never shown in tables, hidden in forms by default
    pub secret: bool,
    /// Money columns reject values below zero
    pub non_negative: bool,
}

const fn col(name: &'static str, label: &'static str, sql_type: SqlType) -> ColumnDef {
    ColumnDef { name, label, sql_type, nullable: true, secret: false, non_negative: false }
}

const fn key(name: &'static str, label: &'static str, sql_type: SqlType) -> ColumnDef {
    ColumnDef { name, label, sql_type, nullable: false, secret: false, non_negative: false }
}

const fn money(name: &'static str, label: &'static str) -> ColumnDef {
    ColumnDef { name, label, sql_type: SqlType::Numeric, nullable: true, secret: false, non_negative: true }
}

const fn secret(name: &'static str, label: &'static str) -> ColumnDef {
    ColumnDef { name, label, sql_type: SqlType::Text, nullable: true, secret: true, non_negative: false }
}

const CLIENT: &[ColumnDef] = &[
    key("ClientID", "Client ID", SqlType::Integer),
    col("ContractID", "Contract ID", SqlType::Integer),
    col("LastName", "Last Name", SqlType::Text),
    col("FirstName", "First Name", SqlType::Text),
    col("MiddleName", "Middle Name", SqlType::Text),
    col("Email", "Email", SqlType::Text),
    col("TelNum", "Telephone", SqlType::Text),
    col("CellNum", "Cellphone", SqlType::Text),
    col("CityAdd", "City Address", SqlType::Text),
    col("user", "Username", SqlType::Text),
    secret("pass", "Password"),
];

const CASE: &[ColumnDef] = &[
    key("CaseNum", "Case Number", SqlType::Text),
    col("Title", "Title", SqlType::Text),
    col("Status", "Status", SqlType::Text),
    col("Type", "Type", SqlType::Text),
    key("ClientID", "Client ID", SqlType::Integer),
    key("ContractID", "Contract ID", SqlType::Integer),
];

const WORK: &[ColumnDef] = &[
    key("WorkID", "Work ID", SqlType::Integer),
    key("CaseNum", "Case Number", SqlType::Text),
    col("Title", "Title", SqlType::Text),
    col("Date", "Date", SqlType::Timestamp),
    money("FeeAmt", "Fee Amount"),
];

const LAWYER: &[ColumnDef] = &[
    key("LawyerID", "Lawyer ID", SqlType::Integer),
    col("LastName", "Last Name", SqlType::Text),
    col("FirstName", "First Name", SqlType::Text),
    col("MiddleName", "Middle Name", SqlType::Text),
    col("Email", "Email", SqlType::Text),
    col("isManager", "Manager", SqlType::Boolean),
    col("user", "Username", SqlType::Text),
    secret("pass", "Password"),
];

const PAYMENT: &[ColumnDef] = &[
    key("PaymentID", "Reference Number", SqlType::Integer),
    key("ClientID", "Client ID", SqlType::Integer),
    money("Amount", "Amount"),
    col("Date", "Date", SqlType::Timestamp),
];

const CONTRACT: &[ColumnDef] = &[
    key("ContractID", "Contract ID", SqlType::Integer),
    col("ClientID", "Client ID", SqlType::Integer),
    col("Terms", "Terms", SqlType::Text),
    col("DateSigned", "Date Signed", SqlType::Timestamp),
];

pub fn columns(kind: EntityKind) -> &'static [ColumnDef] {
    match kind {
        EntityKind::Client => CLIENT,
        EntityKind::Case => CASE,
        EntityKind::Work => WORK,
        EntityKind::Lawyer => LAWYER,
        EntityKind::Payment => PAYMENT,
        EntityKind::Contract => CONTRACT,
    }
}

pub fn column(kind: EntityKind, name: &str) -> Option<&'static ColumnDef> {
    columns(kind).iter().find(|c| c.name == name)
}

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("Unknown column '{column}' for {kind}")]
    UnknownColumn { kind: EntityKind, column: String },

    #[error("Invalid value for '{column}': {message}")]
    InvalidValue { column: String, message: String },

    #[error("Column '{0}' is required")]
    Required(String),
}

/// Coerce a raw JSON value into the shape the column stores.
///
/// Strings from HTML inputs become numbers/booleans/timestamps; an empty string
/// on a nullable column becomes null.
pub fn coerce_value(def: &ColumnDef, value: Value) -> Result<Value, SchemaError> {
    let invalid = |message: String| SchemaError::InvalidValue { column: def.name.to_string(), message };

    let value = match value {
        Value::String(s) if s.trim().is_empty() && def.sql_type != SqlType::Text => Value::Null,
        other => other,
    };

    if value.is_null() {
        return if def.nullable || def.sql_type == SqlType::Boolean {
            Ok(if def.sql_type == SqlType::Boolean { Value::Bool(false) } else { Value::Null })
        } else {
            Err(SchemaError::Required(def.name.to_string()))
        };
    }

    match def.sql_type {
        SqlType::Text => match value {
            Value::String(s) => Ok(Value::String(s)),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            other => Err(invalid(format!("expected text, got {}", other))),
        },
        SqlType::Integer => match value {
            Value::Number(n) if n.is_i64() => Ok(Value::Number(n)),
            Value::Number(n) => Err(invalid(format!("expected integer, got {}", n))),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| invalid(format!("expected integer, got '{}'", s))),
            other => Err(invalid(format!("expected integer, got {}", other))),
        },
        SqlType::Numeric => {
            let number = match value {
                Value::Number(n) => Value::Number(n),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(normalize_number)
                    .ok_or_else(|| invalid(format!("expected number, got '{}'", s)))?,
                other => return Err(invalid(format!("expected number, got {}", other))),
            };
            match number.as_f64() {
                Some(f) if def.non_negative && f < 0.0 => Err(invalid(format!("must not be negative, got {}", number))),
                _ => Ok(number),
            }
        }
        SqlType::Boolean => match value {
            Value::Bool(b) => Ok(Value::Bool(b)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "on" | "1" | "yes" => Ok(Value::Bool(true)),
                "false" | "off" | "0" | "no" => Ok(Value::Bool(false)),
                _ => Err(invalid(format!("expected boolean, got '{}'", s))),
            },
            other => Err(invalid(format!("expected boolean, got {}", other))),
        },
        SqlType::Timestamp => match value {
            Value::String(s) => parse_timestamp(&s)
                .map(|dt| Value::String(dt.to_rfc3339_opts(SecondsFormat::Secs, true)))
                .ok_or_else(|| invalid(format!("expected date, got '{}'", s))),
            other => Err(invalid(format!("expected date, got {}", other))),
        },
    }
}

/// Keep whole-valued numbers integral so `5` does not become `5.0`
pub fn normalize_number(n: Number) -> Value {
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(f as i64),
        _ => Value::Number(n),
    }
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM[:SS]` (HTML datetime-local) and bare dates
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Coerce every key of a record, rejecting columns the table does not have
pub fn coerce_record(kind: EntityKind, record: Row) -> Result<Row, SchemaError> {
    let mut out = Row::new();
    for (name, value) in record {
        let def = column(kind, &name).ok_or_else(|| SchemaError::UnknownColumn {
            kind,
            column: name.clone(),
        })?;
        out.insert(name, coerce_value(def, value)?);
    }
    Ok(out)
}

/// Copy of the row without credential columns
pub fn without_secrets(kind: EntityKind, row: &Row) -> Row {
    row.iter()
        .filter(|(name, _)| !column(kind, name).map(|c| c.secret).unwrap_or(false))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
