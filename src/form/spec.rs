use serde::Serialize;

use crate::database::schema::{self, SqlType};
use crate::types::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Textarea,
    Hidden,
    Checkbox,
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub editable: bool,
    /// Identifier fields are fixed once the record exists
    pub identifier: bool,
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            editable: kind != FieldKind::Hidden,
            identifier: false,
        }
    }
}

/// Ordered field descriptors for one form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSpec {
    pub fields: Vec<FieldDescriptor>,
}

impl FormSpec {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    /// One field per column; the primary key is the identifier, credentials are hidden
    pub fn for_entity(kind: EntityKind) -> Self {
        let fields = schema::columns(kind)
            .iter()
            .map(|col| {
                let widget = if col.secret {
                    FieldKind::Hidden
                } else {
                    match col.sql_type {
                        SqlType::Integer | SqlType::Numeric => FieldKind::Number,
                        SqlType::Boolean => FieldKind::Checkbox,
                        SqlType::Timestamp => FieldKind::Date,
                        SqlType::Text => FieldKind::Text,
                    }
                };
                let mut field = FieldDescriptor::new(col.name, col.label, widget);
                field.identifier = col.name == kind.primary_key();
                field
            })
            .collect();
        Self { fields }
    }

    fn update(mut self, keys: &[&str], f: impl Fn(&mut FieldDescriptor)) -> Self {
        for field in self.fields.iter_mut().filter(|f| keys.contains(&f.key.as_str())) {
            f(field);
        }
        self
    }

    /// Mark additional identifier fields (e.g. a case's ClientID)
    pub fn identifiers(self, keys: &[&str]) -> Self {
        self.update(keys, |f| f.identifier = true)
    }

    pub fn hidden(self, keys: &[&str]) -> Self {
        self.update(keys, |f| {
            f.kind = FieldKind::Hidden;
            f.editable = false;
        })
    }

    /// Show credential fields as plain inputs, for records being created
    pub fn reveal(self, keys: &[&str]) -> Self {
        self.update(keys, |f| {
            f.kind = FieldKind::Text;
            f.editable = true;
        })
    }

    pub fn textarea(self, keys: &[&str]) -> Self {
        self.update(keys, |f| f.kind = FieldKind::Textarea)
    }

    pub fn read_only(self, keys: &[&str]) -> Self {
        self.update(keys, |f| f.editable = false)
    }

    /// Drop fields entirely; their values still pass through the draft
    pub fn without(mut self, keys: &[&str]) -> Self {
        self.fields.retain(|f| !keys.contains(&f.key.as_str()));
        self
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_widgets_from_schema() {
        let spec = FormSpec::for_entity(EntityKind::Lawyer);
        assert!(spec.field("LawyerID").unwrap().identifier);
        assert_eq!(spec.field("LawyerID").unwrap().kind, FieldKind::Number);
        assert_eq!(spec.field("isManager").unwrap().kind, FieldKind::Checkbox);
        assert_eq!(spec.field("pass").unwrap().kind, FieldKind::Hidden);
        assert!(!spec.field("pass").unwrap().editable);

        let spec = FormSpec::for_entity(EntityKind::Work);
        assert_eq!(spec.field("Date").unwrap().kind, FieldKind::Date);
    }

    #[test]
    fn adjusts_fields_by_key() {
        let spec = FormSpec::for_entity(EntityKind::Case)
            .identifiers(&["ClientID", "ContractID"])
            .textarea(&["Status"])
            .without(&["Type"]);
        assert!(spec.field("ClientID").unwrap().identifier);
        assert_eq!(spec.field("Status").unwrap().kind, FieldKind::Textarea);
        assert!(spec.field("Type").is_none());
    }

    #[test]
    fn reveals_credentials_for_new_records() {
        let spec = FormSpec::for_entity(EntityKind::Client).reveal(&["pass"]);
        let pass = spec.field("pass").unwrap();
        assert_eq!(pass.kind, FieldKind::Text);
        assert!(pass.editable);
    }
}
