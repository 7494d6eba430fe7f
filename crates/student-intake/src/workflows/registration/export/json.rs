use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::super::domain::{MaritalStatus, ModeOfEntry, Submission, SubmissionCode, SubmissionId};
use super::super::media::MediaLocator;

/// One exported record. Keys follow the stored field order; `passport` is the public URL.
#[derive(Serialize)]
struct JsonRecord<'a> {
    id: SubmissionId,
    surname: &'a str,
    firstname: &'a str,
    othername: &'a str,
    sex: &'a str,
    date_of_birth: NaiveDate,
    email: &'a str,
    phone_number: &'a str,
    whatsapp_name: &'a str,
    nationality: &'a str,
    passport: Option<String>,
    faculty: &'a str,
    department: &'a str,
    level_of_study: &'a str,
    matric_number: &'a str,
    permanent_address: &'a str,
    accommodation_type: &'a str,
    residential_address: &'a str,
    state_of_residence: &'a str,
    lga_of_residence: &'a str,
    guardian_name: &'a str,
    guardian_phone_number: &'a str,
    religion: &'a str,
    state_of_origin: &'a str,
    local_government: &'a str,
    skills: &'a str,
    extracurricular_activities: &'a str,
    second_phone_number: &'a str,
    marital_status: Option<MaritalStatus>,
    mode_of_entry: Option<ModeOfEntry>,
    jamb_reg_number: &'a str,
    next_of_kin_name: Option<&'a str>,
    next_of_kin_phone: Option<&'a str>,
    next_of_kin_relationship: Option<&'a str>,
    submission_code: &'a SubmissionCode,
    submission_date: DateTime<Utc>,
}

impl<'a> JsonRecord<'a> {
    fn new(submission: &'a Submission, media: &MediaLocator) -> Self {
        let details = &submission.details;
        Self {
            id: submission.id,
            surname: &details.surname,
            firstname: &details.firstname,
            othername: &details.othername,
            sex: &details.sex,
            date_of_birth: details.date_of_birth,
            email: &details.email,
            phone_number: &details.phone_number,
            whatsapp_name: &details.whatsapp_name,
            nationality: &details.nationality,
            passport: submission.passport.as_deref().map(|path| media.url_for(path)),
            faculty: &details.faculty,
            department: &details.department,
            level_of_study: &details.level_of_study,
            matric_number: &details.matric_number,
            permanent_address: &details.permanent_address,
            accommodation_type: &details.accommodation_type,
            residential_address: &details.residential_address,
            state_of_residence: &details.state_of_residence,
            lga_of_residence: &details.lga_of_residence,
            guardian_name: &details.guardian_name,
            guardian_phone_number: &details.guardian_phone_number,
            religion: &details.religion,
            state_of_origin: &details.state_of_origin,
            local_government: &details.local_government,
            skills: &details.skills,
            extracurricular_activities: &details.extracurricular_activities,
            second_phone_number: &details.second_phone_number,
            marital_status: details.marital_status,
            mode_of_entry: details.mode_of_entry,
            jamb_reg_number: &details.jamb_reg_number,
            next_of_kin_name: details.next_of_kin_name.as_deref(),
            next_of_kin_phone: details.next_of_kin_phone.as_deref(),
            next_of_kin_relationship: details.next_of_kin_relationship.as_deref(),
            submission_code: &submission.submission_code,
            submission_date: submission.submission_date,
        }
    }
}

pub(super) fn encode(
    records: &[Submission],
    media: &MediaLocator,
) -> Result<Vec<u8>, serde_json::Error> {
    let rows: Vec<JsonRecord<'_>> = records
        .iter()
        .map(|record| JsonRecord::new(record, media))
        .collect();

    let mut bytes = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(b"    "));
    rows.serialize(&mut serializer)?;
    Ok(bytes)
}
