use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub u64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public tracking code handed to the student as a receipt (e.g. `EMT345`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionCode(pub String);

impl SubmissionCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaritalStatus {
    Single,
    Married,
}

impl MaritalStatus {
    pub const fn ordered() -> [Self; 2] {
        [Self::Single, Self::Married]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Married => "Married",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeOfEntry {
    #[serde(rename = "UTME")]
    Utme,
    #[serde(rename = "Direct Entry")]
    DirectEntry,
    Transfer,
}

impl ModeOfEntry {
    pub const fn ordered() -> [Self; 3] {
        [Self::Utme, Self::DirectEntry, Self::Transfer]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Utme => "UTME",
            Self::DirectEntry => "Direct Entry",
            Self::Transfer => "Transfer",
        }
    }
}

/// Raw registration form exactly as posted by the intake page. Every value is untrusted text
/// until it passes through [`FormValidator`](super::validation::FormValidator).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionForm {
    pub surname: String,
    pub firstname: String,
    pub othername: String,
    pub sex: String,
    pub date_of_birth: String,
    pub email: String,
    pub phone_number: String,
    pub whatsapp_name: String,
    pub nationality: String,
    /// Name of the uploaded passport photograph, if one was attached.
    pub passport: Option<String>,
    pub faculty: String,
    pub department: String,
    pub level_of_study: String,
    #[serde(alias = "matricNumber")]
    pub matric_number: String,
    pub permanent_address: String,
    pub accommodation_type: String,
    pub residential_address: String,
    pub state_of_residence: String,
    pub lga_of_residence: String,
    pub guardian_name: String,
    pub guardian_phone_number: String,
    pub religion: String,
    pub state_of_origin: String,
    pub local_government: String,
    pub skills: String,
    pub extracurricular_activities: String,
    pub second_phone_number: String,
    pub marital_status: Option<String>,
    pub mode_of_entry: Option<String>,
    pub jamb_reg_number: String,
    pub next_of_kin_name: Option<String>,
    pub next_of_kin_phone: Option<String>,
    pub next_of_kin_relationship: Option<String>,
}

/// Validated student fields. Field order is the export order for JSON documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDetails {
    pub surname: String,
    pub firstname: String,
    pub othername: String,
    pub sex: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub phone_number: String,
    pub whatsapp_name: String,
    pub nationality: String,
    pub faculty: String,
    pub department: String,
    pub level_of_study: String,
    pub matric_number: String,
    pub permanent_address: String,
    pub accommodation_type: String,
    pub residential_address: String,
    pub state_of_residence: String,
    pub lga_of_residence: String,
    pub guardian_name: String,
    pub guardian_phone_number: String,
    pub religion: String,
    pub state_of_origin: String,
    pub local_government: String,
    pub skills: String,
    pub extracurricular_activities: String,
    pub second_phone_number: String,
    pub marital_status: Option<MaritalStatus>,
    pub mode_of_entry: Option<ModeOfEntry>,
    pub jamb_reg_number: String,
    pub next_of_kin_name: Option<String>,
    pub next_of_kin_phone: Option<String>,
    pub next_of_kin_relationship: Option<String>,
}

/// Submission ready for insertion; the store assigns `id` and `submission_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub details: StudentDetails,
    pub passport: Option<String>,
    pub submission_code: SubmissionCode,
}

impl NewSubmission {
    pub fn into_submission(self, id: SubmissionId, submission_date: DateTime<Utc>) -> Submission {
        Submission {
            id,
            details: self.details,
            passport: self.passport,
            submission_code: self.submission_code,
            submission_date,
        }
    }
}

/// Stored registration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    #[serde(flatten)]
    pub details: StudentDetails,
    /// Storage path of the passport photograph relative to the media root.
    pub passport: Option<String>,
    pub submission_code: SubmissionCode,
    pub submission_date: DateTime<Utc>,
}

impl Submission {
    /// Case-insensitive substring match over the fields staff search by.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [
            self.details.surname.as_str(),
            self.details.firstname.as_str(),
            self.details.matric_number.as_str(),
            self.submission_code.as_str(),
            self.details.email.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn display_name(&self) -> String {
        format!(
            "{} {} ({})",
            self.details.firstname, self.details.surname, self.submission_code
        )
    }
}
