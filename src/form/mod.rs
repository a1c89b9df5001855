//! Field form: stages edits to one record and emits a whole-record submission.

pub mod error;
pub mod field_form;
pub mod spec;

pub use error::FormError;
pub use field_form::{FieldForm, FieldView, FormOptions, FormOutcome, FormView, Submission, SubmissionTarget};
pub use spec::{FieldDescriptor, FieldKind, FormSpec};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityKind, RecordId, Row};
    use serde_json::{json, Value};

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    fn editor(record: Value, options: FormOptions) -> FieldForm {
        FieldForm::new(EntityKind::Case, row(record), FormSpec::for_entity(EntityKind::Case), options)
    }

    const AUTHORIZED: FormOptions = FormOptions { adding: false, stay: false, authorized: true };

    #[test]
    fn edit_then_submit_sends_whole_record() {
        let mut form = editor(json!({"CaseNum": "C1", "Status": "Open"}), AUTHORIZED);
        form.edit("Status", "Closed").unwrap();
        let submission = form.submit().unwrap();
        assert_eq!(submission.kind, EntityKind::Case);
        assert_eq!(submission.target, SubmissionTarget::Update(RecordId::Text("C1".into())));
        assert_eq!(submission.record, row(json!({"CaseNum": "C1", "Status": "Closed"})));
        assert_eq!(form.outcome(), FormOutcome::NavigateBack);
    }

    #[test]
    fn edits_merge_shallowly_and_track_changes() {
        let mut form = editor(json!({"CaseNum": "C1", "Title": "A", "Status": "Open", "ClientID": 1}), AUTHORIZED);
        assert!(!form.is_dirty());
        form.edit("Title", "B").unwrap();
        form.edit("Status", "Open").unwrap();
        assert!(form.is_dirty());
        assert_eq!(form.changed_keys(), vec!["Title".to_string()]);
        assert_eq!(form.draft()["ClientID"], json!(1));
    }

    #[test]
    fn identifiers_are_fixed_unless_adding() {
        let mut form = editor(json!({"CaseNum": "C1"}), AUTHORIZED);
        assert_eq!(form.edit("CaseNum", "C2"), Err(FormError::ReadOnly("CaseNum".into())));

        let mut form = editor(json!({}), FormOptions { adding: true, ..AUTHORIZED });
        form.edit("CaseNum", "C9").unwrap();
        form.edit("ClientID", "3").unwrap();
        let submission = form.submit().unwrap();
        assert_eq!(submission.target, SubmissionTarget::Create);
        assert_eq!(submission.record["ClientID"], json!(3));
    }

    #[test]
    fn numbers_are_coerced_and_garbage_rejected() {
        let mut form = FieldForm::new(
            EntityKind::Work,
            row(json!({"WorkID": 1, "CaseNum": "C1", "FeeAmt": 100})),
            FormSpec::for_entity(EntityKind::Work),
            AUTHORIZED,
        );
        form.edit("FeeAmt", "1500.50").unwrap();
        assert_eq!(form.draft()["FeeAmt"], json!(1500.5));
        form.edit("FeeAmt", "").unwrap();
        assert_eq!(form.draft()["FeeAmt"], Value::Null);
        assert!(matches!(form.edit("FeeAmt", "lots"), Err(FormError::InvalidNumber { .. })));
        assert_eq!(form.draft()["FeeAmt"], Value::Null);

        form.edit("Date", "2023-04-05").unwrap();
        assert_eq!(form.draft()["Date"], json!("2023-04-05T00:00:00Z"));
        assert_eq!(form.view().fields.iter().find(|f| f.key == "Date").unwrap().value, "2023-04-05");
    }

    #[test]
    fn posted_forms_keep_hidden_fields() {
        let mut form = FieldForm::new(
            EntityKind::Lawyer,
            row(json!({"LawyerID": 2, "LastName": "Garcia", "isManager": true, "user": "jose", "pass": "secret"})),
            FormSpec::for_entity(EntityKind::Lawyer),
            AUTHORIZED,
        );
        let posted = vec![("LastName".to_string(), "Garcia-Cruz".to_string()), ("pass".to_string(), "x".to_string())];
        form.apply_posted(&posted).unwrap();
        let record = form.submit().unwrap().record;
        assert_eq!(record["LastName"], json!("Garcia-Cruz"));
        assert_eq!(record["isManager"], json!(false));
        assert_eq!(record["pass"], json!("secret"));
        assert!(form.view().fields.iter().all(|f| f.key != "pass"));
    }

    #[test]
    fn unauthorized_forms_are_disabled() {
        let mut form = editor(json!({"CaseNum": "C1", "Status": "Open"}), FormOptions::default());
        assert_eq!(form.edit("Status", "Closed"), Err(FormError::Unauthorized));
        assert_eq!(form.submit(), Err(FormError::Unauthorized));
        let view = form.view();
        assert!(view.disabled);
        assert!(view.fields.iter().all(|f| f.disabled));
    }

    #[test]
    fn rejected_submission_keeps_draft() {
        let mut form = editor(json!({"CaseNum": "C1", "Status": "Open"}), FormOptions { stay: true, ..AUTHORIZED });
        form.edit("Status", "Closed").unwrap();
        form.reject("connection reset");
        assert_eq!(form.draft()["Status"], json!("Closed"));
        assert_eq!(form.view().error.as_deref(), Some("connection reset"));
        assert_eq!(form.outcome(), FormOutcome::Stay);
    }
}
