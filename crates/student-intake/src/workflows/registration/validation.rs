use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{MaritalStatus, ModeOfEntry, StudentDetails, SubmissionForm};
use super::media::PassportUpload;

const REQUIRED: &str = "This field is required.";

/// Per-field validation messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Form that passed validation, paired with its optional passport upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub details: StudentDetails,
    pub passport: Option<PassportUpload>,
}

/// Field rules for the public registration form.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormValidator;

impl FormValidator {
    pub fn validate(&self, form: SubmissionForm) -> Result<ValidatedSubmission, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let mut check = FieldCheck {
            errors: &mut errors,
        };

        let surname = check.required("surname", &form.surname, 100);
        let firstname = check.required("firstname", &form.firstname, 100);
        let othername = check.optional("othername", &form.othername, 100);
        let sex = check.required("sex", &form.sex, 10);
        let date_of_birth = check.date("date_of_birth", &form.date_of_birth);
        let email = check.email("email", &form.email);
        let phone_number = check.phone("phone_number", &form.phone_number, true);
        let whatsapp_name = check.optional("whatsapp_name", &form.whatsapp_name, 100);
        let nationality = check.required("nationality", &form.nationality, 100);
        let faculty = check.required("faculty", &form.faculty, 100);
        let department = check.required("department", &form.department, 100);
        let level_of_study = check.required("level_of_study", &form.level_of_study, 20);
        let matric_number = check.matric("matric_number", &form.matric_number);
        let permanent_address = check.required("permanent_address", &form.permanent_address, 0);
        let accommodation_type =
            check.required("accommodation_type", &form.accommodation_type, 20);
        let residential_address =
            check.required("residential_address", &form.residential_address, 0);
        let state_of_residence =
            check.required("state_of_residence", &form.state_of_residence, 100);
        let lga_of_residence = check.required("lga_of_residence", &form.lga_of_residence, 100);
        let guardian_name = check.required("guardian_name", &form.guardian_name, 200);
        let guardian_phone_number =
            check.phone("guardian_phone_number", &form.guardian_phone_number, true);
        let religion = check.required("religion", &form.religion, 20);
        let state_of_origin = check.required("state_of_origin", &form.state_of_origin, 100);
        let local_government = check.required("local_government", &form.local_government, 100);
        let skills = check.optional("skills", &form.skills, 0);
        let extracurricular_activities = check.required(
            "extracurricular_activities",
            &form.extracurricular_activities,
            0,
        );
        let second_phone_number =
            check.phone("second_phone_number", &form.second_phone_number, false);
        let marital_status = check.choice(
            "marital_status",
            form.marital_status.as_deref(),
            &MaritalStatus::ordered(),
            MaritalStatus::label,
        );
        let mode_of_entry = check.choice(
            "mode_of_entry",
            form.mode_of_entry.as_deref(),
            &ModeOfEntry::ordered(),
            ModeOfEntry::label,
        );
        let jamb_reg_number = check.optional("jamb_reg_number", &form.jamb_reg_number, 50);
        let next_of_kin_name = check
            .optional("next_of_kin_name", form.next_of_kin_name.as_deref().unwrap_or(""), 200);
        let next_of_kin_phone = check.phone(
            "next_of_kin_phone",
            form.next_of_kin_phone.as_deref().unwrap_or(""),
            false,
        );
        let next_of_kin_relationship = check.optional(
            "next_of_kin_relationship",
            form.next_of_kin_relationship.as_deref().unwrap_or(""),
            100,
        );
        let passport = check.passport("passport", form.passport.as_deref());

        let date_of_birth = match date_of_birth {
            Some(date) if errors.is_empty() => date,
            _ => return Err(errors),
        };

        Ok(ValidatedSubmission {
            details: StudentDetails {
                surname,
                firstname,
                othername,
                sex,
                date_of_birth,
                email,
                phone_number,
                whatsapp_name,
                nationality,
                faculty,
                department,
                level_of_study,
                matric_number,
                permanent_address,
                accommodation_type,
                residential_address,
                state_of_residence,
                lga_of_residence,
                guardian_name,
                guardian_phone_number,
                religion,
                state_of_origin,
                local_government,
                skills,
                extracurricular_activities,
                second_phone_number,
                marital_status,
                mode_of_entry,
                jamb_reg_number,
                next_of_kin_name: non_empty(next_of_kin_name),
                next_of_kin_phone: non_empty(next_of_kin_phone),
                next_of_kin_relationship: non_empty(next_of_kin_relationship),
            },
            passport,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

struct FieldCheck<'a> {
    errors: &'a mut ValidationErrors,
}

impl FieldCheck<'_> {
    /// `max_len` of zero means unbounded (free text).
    fn text(&mut self, field: &str, raw: &str, max_len: usize, required: bool) -> String {
        let value = raw.trim();
        if value.is_empty() {
            if required {
                self.errors.add(field, REQUIRED);
            }
            return String::new();
        }

        if max_len > 0 && value.chars().count() > max_len {
            self.errors.add(
                field,
                format!("Ensure this field has no more than {max_len} characters."),
            );
        }
        value.to_string()
    }

    fn required(&mut self, field: &str, raw: &str, max_len: usize) -> String {
        self.text(field, raw, max_len, true)
    }

    fn optional(&mut self, field: &str, raw: &str, max_len: usize) -> String {
        self.text(field, raw, max_len, false)
    }

    fn date(&mut self, field: &str, raw: &str) -> Option<NaiveDate> {
        let value = raw.trim();
        if value.is_empty() {
            self.errors.add(field, REQUIRED);
            return None;
        }

        match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.errors.add(
                    field,
                    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
                );
                None
            }
        }
    }

    fn email(&mut self, field: &str, raw: &str) -> String {
        let value = self.required(field, raw, 254);
        if !value.is_empty() && !looks_like_email(&value) {
            self.errors.add(field, "Enter a valid email address.");
        }
        value
    }

    fn phone(&mut self, field: &str, raw: &str, required: bool) -> String {
        let value = self.text(field, raw, 20, required);
        if !value.is_empty() && !value.chars().all(|c| c.is_ascii_digit()) {
            self.errors.add(field, "Phone number must contain only digits.");
        }
        value
    }

    fn matric(&mut self, field: &str, raw: &str) -> String {
        let value = self.required(field, raw, 50);
        let digits = value.chars().filter(char::is_ascii_digit).count();
        if !value.is_empty() && digits < 3 {
            self.errors
                .add(field, "Matric number must contain at least 3 digits.");
        }
        value
    }

    fn choice<T: Copy>(
        &mut self,
        field: &str,
        raw: Option<&str>,
        options: &[T],
        label: fn(T) -> &'static str,
    ) -> Option<T> {
        let value = raw.map(str::trim).filter(|value| !value.is_empty())?;
        let found = options.iter().copied().find(|option| label(*option) == value);
        if found.is_none() {
            self.errors
                .add(field, format!("\"{value}\" is not a valid choice."));
        }
        found
    }

    fn passport(&mut self, field: &str, raw: Option<&str>) -> Option<PassportUpload> {
        let name = raw.map(str::trim).filter(|name| !name.is_empty())?;
        let upload = PassportUpload::from_file_name(name);
        if upload.is_none() {
            self.errors.add(field, "Only JPG and PNG files are allowed.");
        }
        upload
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}
