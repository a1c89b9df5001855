use chrono::SecondsFormat;
use serde::Serialize;
use serde_json::{Number, Value};
use tracing::error;

use crate::database::schema::{normalize_number, parse_timestamp};
use crate::table::filter::stringify;
use crate::types::{EntityKind, RecordId, Row};

use super::error::FormError;
use super::spec::{FieldKind, FormSpec};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormOptions {
    /// Creating a new record: identifiers are editable and submit creates
    pub adding: bool,
    /// Stay on the page after submit instead of navigating back
    pub stay: bool,
    pub authorized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", content = "id", rename_all = "lowercase")]
pub enum SubmissionTarget {
    Create,
    Update(RecordId),
}

/// Whole-record write emitted by a form; never partial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub kind: EntityKind,
    pub target: SubmissionTarget,
    pub record: Row,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Stay,
    NavigateBack,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: String,
    pub checked: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub kind: EntityKind,
    pub adding: bool,
    pub disabled: bool,
    pub fields: Vec<FieldView>,
    pub error: Option<String>,
}

/// Draft editor over one record
#[derive(Debug, Clone)]
pub struct FieldForm {
    kind: EntityKind,
    spec: FormSpec,
    options: FormOptions,
    original: Row,
    draft: Row,
    error: Option<String>,
}

impl FieldForm {
    pub fn new(kind: EntityKind, record: Row, spec: FormSpec, options: FormOptions) -> Self {
        Self {
            kind,
            spec,
            options,
            draft: record.clone(),
            original: record,
            error: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn draft(&self) -> &Row {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    pub fn changed_keys(&self) -> Vec<String> {
        self.draft
            .iter()
            .filter(|(k, v)| self.original.get(*k) != Some(*v))
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn can_edit(&self, key: &str) -> Result<FieldKind, FormError> {
        if !self.options.authorized {
            return Err(FormError::Unauthorized);
        }
        let field = self
            .spec
            .field(key)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))?;
        if !field.editable || (field.identifier && !self.options.adding) {
            return Err(FormError::ReadOnly(key.to_string()));
        }
        Ok(field.kind)
    }

    /// Merge one key into the draft, coerced for its widget
    pub fn edit(&mut self, key: &str, raw: impl Into<Value>) -> Result<(), FormError> {
        let kind = self.can_edit(key)?;
        let value = coerce(key, kind, raw.into())?;
        self.draft.insert(key.to_string(), value);
        Ok(())
    }

    /// Apply an HTML form post: editable fields only; an absent checkbox means unchecked
    pub fn apply_posted(&mut self, posted: &[(String, String)]) -> Result<(), FormError> {
        if !self.options.authorized {
            return Err(FormError::Unauthorized);
        }
        let editable: Vec<(String, FieldKind)> = self
            .spec
            .fields
            .iter()
            .filter(|f| f.editable && (!f.identifier || self.options.adding))
            .map(|f| (f.key.clone(), f.kind))
            .collect();

        for (key, kind) in editable {
            let raw = posted.iter().rev().find(|(k, _)| *k == key).map(|(_, v)| v.clone());
            match (kind, raw) {
                (_, Some(raw)) => self.edit(&key, raw)?,
                (FieldKind::Checkbox, None) => self.edit(&key, false)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// The entire merged draft, addressed by the record's identifier
    pub fn submit(&self) -> Result<Submission, FormError> {
        if !self.options.authorized {
            return Err(FormError::Unauthorized);
        }
        let target = if self.options.adding {
            SubmissionTarget::Create
        } else {
            let id = self
                .kind
                .id_of(&self.original)
                .ok_or(FormError::MissingIdentifier(self.kind))?;
            SubmissionTarget::Update(id)
        };
        Ok(Submission {
            kind: self.kind,
            target,
            record: self.draft.clone(),
        })
    }

    pub fn outcome(&self) -> FormOutcome {
        if self.options.stay {
            FormOutcome::Stay
        } else {
            FormOutcome::NavigateBack
        }
    }

    /// Record a failed submission; the draft stays as typed for re-rendering
    pub fn reject(&mut self, reason: impl std::fmt::Display) {
        error!("Failed to save {} form: {}", self.kind, reason);
        self.error = Some(reason.to_string());
    }

    pub fn view(&self) -> FormView {
        let fields = self
            .spec
            .fields
            .iter()
            .filter(|f| f.kind != FieldKind::Hidden)
            .map(|f| {
                let value = self.draft.get(&f.key).unwrap_or(&Value::Null);
                FieldView {
                    key: f.key.clone(),
                    label: f.label.clone(),
                    kind: f.kind,
                    value: display_value(f.kind, value),
                    checked: matches!(value, Value::Bool(true)),
                    disabled: !self.options.authorized
                        || !f.editable
                        || (f.identifier && !self.options.adding),
                }
            })
            .collect();
        FormView {
            kind: self.kind,
            adding: self.options.adding,
            disabled: !self.options.authorized,
            fields,
            error: self.error.clone(),
        }
    }
}

fn coerce(key: &str, kind: FieldKind, raw: Value) -> Result<Value, FormError> {
    match (kind, raw) {
        (FieldKind::Number, Value::Number(n)) => Ok(Value::Number(n)),
        (FieldKind::Number, Value::String(s)) if s.trim().is_empty() => Ok(Value::Null),
        (FieldKind::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(normalize_number)
            .ok_or(FormError::InvalidNumber { key: key.to_string(), raw: s }),
        (FieldKind::Number, Value::Null) => Ok(Value::Null),
        (FieldKind::Number, other) => Err(FormError::InvalidNumber { key: key.to_string(), raw: stringify(&other) }),

        (FieldKind::Checkbox, Value::Bool(b)) => Ok(Value::Bool(b)),
        (FieldKind::Checkbox, Value::String(s)) => Ok(Value::Bool(matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "on" | "true" | "1" | "yes"
        ))),
        (FieldKind::Checkbox, other) => Ok(Value::Bool(!other.is_null())),

        (FieldKind::Date, Value::String(s)) if s.trim().is_empty() => Ok(Value::Null),
        (FieldKind::Date, Value::String(s)) => parse_timestamp(&s)
            .map(|dt| Value::String(dt.to_rfc3339_opts(SecondsFormat::Secs, true)))
            .ok_or(FormError::InvalidDate { key: key.to_string(), raw: s }),
        (FieldKind::Date, Value::Null) => Ok(Value::Null),
        (FieldKind::Date, other) => Err(FormError::InvalidDate { key: key.to_string(), raw: stringify(&other) }),

        (_, Value::String(s)) => Ok(Value::String(s)),
        (_, Value::Null) => Ok(Value::Null),
        (_, other) => Ok(Value::String(stringify(&other))),
    }
}

/// Input value as the widget expects it; dates as `YYYY-MM-DD`
fn display_value(kind: FieldKind, value: &Value) -> String {
    match (kind, value) {
        (FieldKind::Date, Value::String(s)) => parse_timestamp(s)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| s.clone()),
        _ => stringify(value),
    }
}
