use crate::workflows::registration::domain::{MaritalStatus, ModeOfEntry, SubmissionForm};
use crate::workflows::registration::FormValidator;

use super::common::form;

#[test]
fn accepts_complete_form_and_trims_values() {
    let mut raw = form();
    raw.surname = "  Adeyemi ".to_string();
    raw.next_of_kin_name = Some("   ".to_string());
    raw.next_of_kin_phone = Some("08012345678".to_string());

    let validated = FormValidator.validate(raw).expect("form is valid");

    assert_eq!(validated.details.surname, "Adeyemi");
    assert_eq!(validated.details.date_of_birth.to_string(), "2001-07-09");
    assert_eq!(validated.details.marital_status, Some(MaritalStatus::Single));
    assert_eq!(validated.details.mode_of_entry, Some(ModeOfEntry::Utme));
    assert_eq!(validated.details.next_of_kin_name, None);
    assert_eq!(
        validated.details.next_of_kin_phone.as_deref(),
        Some("08012345678")
    );
    let passport = validated.passport.expect("passport accepted");
    assert_eq!(passport.extension(), "jpg");
}

#[test]
fn empty_form_reports_every_required_field() {
    let errors = FormValidator
        .validate(SubmissionForm::default())
        .expect_err("empty form rejected");

    for field in [
        "surname",
        "firstname",
        "sex",
        "date_of_birth",
        "email",
        "phone_number",
        "nationality",
        "faculty",
        "department",
        "level_of_study",
        "matric_number",
        "permanent_address",
        "accommodation_type",
        "residential_address",
        "state_of_residence",
        "lga_of_residence",
        "guardian_name",
        "guardian_phone_number",
        "religion",
        "state_of_origin",
        "local_government",
        "extracurricular_activities",
    ] {
        assert_eq!(
            errors.get(field),
            Some(&["This field is required.".to_string()][..]),
            "field {field}"
        );
    }

    for optional in ["othername", "skills", "passport", "marital_status", "jamb_reg_number"] {
        assert!(errors.get(optional).is_none(), "field {optional}");
    }
}

#[test]
fn rejects_malformed_contact_details() {
    let raw = SubmissionForm {
        email: "not-an-email".to_string(),
        phone_number: "0803-123".to_string(),
        second_phone_number: "abc".to_string(),
        date_of_birth: "09/07/2001".to_string(),
        ..form()
    };

    let errors = FormValidator.validate(raw).expect_err("rejected");

    assert_eq!(
        errors.get("email"),
        Some(&["Enter a valid email address.".to_string()][..])
    );
    assert_eq!(
        errors.get("phone_number"),
        Some(&["Phone number must contain only digits.".to_string()][..])
    );
    assert!(errors.get("second_phone_number").is_some());
    assert_eq!(
        errors.get("date_of_birth"),
        Some(
            &["Date has wrong format. Use one of these formats instead: YYYY-MM-DD.".to_string()]
                [..]
        )
    );
}

#[test]
fn matric_number_needs_three_digits() {
    let raw = SubmissionForm {
        matric_number: "CSC/12".to_string(),
        ..form()
    };

    let errors = FormValidator.validate(raw).expect_err("rejected");
    assert_eq!(
        errors.get("matric_number"),
        Some(&["Matric number must contain at least 3 digits.".to_string()][..])
    );
}

#[test]
fn passport_must_be_jpeg_or_png() {
    let raw = SubmissionForm {
        passport: Some("scan.pdf".to_string()),
        ..form()
    };
    let errors = FormValidator.validate(raw).expect_err("rejected");
    assert_eq!(
        errors.get("passport"),
        Some(&["Only JPG and PNG files are allowed.".to_string()][..])
    );

    let raw = SubmissionForm {
        passport: None,
        ..form()
    };
    let validated = FormValidator.validate(raw).expect("passport optional");
    assert!(validated.passport.is_none());
}

#[test]
fn rejects_unknown_choices_and_overlong_values() {
    let raw = SubmissionForm {
        marital_status: Some("Divorced".to_string()),
        mode_of_entry: Some("Direct Entry".to_string()),
        sex: "Not specified here".to_string(),
        ..form()
    };

    let errors = FormValidator.validate(raw).expect_err("rejected");
    assert_eq!(
        errors.get("marital_status"),
        Some(&["\"Divorced\" is not a valid choice.".to_string()][..])
    );
    assert!(errors.get("mode_of_entry").is_none());
    assert_eq!(
        errors.get("sex"),
        Some(&["Ensure this field has no more than 10 characters.".to_string()][..])
    );
}

#[test]
fn errors_serialize_as_field_map() {
    let raw = SubmissionForm {
        surname: String::new(),
        ..form()
    };
    let errors = FormValidator.validate(raw).expect_err("rejected");
    let value = serde_json::to_value(&errors).expect("serializes");
    assert_eq!(value["surname"][0], "This field is required.");
    assert_eq!(errors.to_string(), "invalid fields: surname");
}
