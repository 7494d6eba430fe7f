use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::registration::domain::{
    NewSubmission, StudentDetails, Submission, SubmissionCode, SubmissionForm, SubmissionId,
};
use crate::workflows::registration::repository::{
    sort_newest_first, RepositoryError, SubmissionRepository,
};
use crate::workflows::registration::{
    registration_router, AdminAccess, MediaLocator, RegistrationService, RegistrationSettings,
};

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn media() -> MediaLocator {
    MediaLocator::new("https://intake.example.edu", "/media/")
}

pub(super) fn settings() -> RegistrationSettings {
    RegistrationSettings {
        media: media(),
        ..RegistrationSettings::default()
    }
}

pub(super) fn form() -> SubmissionForm {
    SubmissionForm {
        surname: "Adeyemi".to_string(),
        firstname: "Tolu".to_string(),
        othername: "Grace".to_string(),
        sex: "Female".to_string(),
        date_of_birth: "2001-07-09".to_string(),
        email: "tolu.adeyemi@example.edu".to_string(),
        phone_number: "08031234567".to_string(),
        whatsapp_name: "Tolu A".to_string(),
        nationality: "Nigerian".to_string(),
        passport: Some("tolu.JPG".to_string()),
        faculty: "Science".to_string(),
        department: "Computer Science".to_string(),
        level_of_study: "200".to_string(),
        matric_number: "CSC/2019/12345".to_string(),
        permanent_address: "12 Allen Avenue, Ikeja".to_string(),
        accommodation_type: "Hostel".to_string(),
        residential_address: "Block C, Room 14".to_string(),
        state_of_residence: "Lagos".to_string(),
        lga_of_residence: "Ikeja".to_string(),
        guardian_name: "Mrs. Adeyemi".to_string(),
        guardian_phone_number: "08029876543".to_string(),
        religion: "Christianity".to_string(),
        state_of_origin: "Ogun".to_string(),
        local_government: "Abeokuta South".to_string(),
        skills: "Python, Drawing".to_string(),
        extracurricular_activities: "Debate club".to_string(),
        second_phone_number: String::new(),
        marital_status: Some("Single".to_string()),
        mode_of_entry: Some("UTME".to_string()),
        jamb_reg_number: "12345678AB".to_string(),
        next_of_kin_name: None,
        next_of_kin_phone: None,
        next_of_kin_relationship: None,
    }
}

pub(super) fn form_with_matric(matric: &str, surname: &str) -> SubmissionForm {
    SubmissionForm {
        matric_number: matric.to_string(),
        surname: surname.to_string(),
        email: format!("{}@example.edu", surname.to_lowercase()),
        ..form()
    }
}

pub(super) fn details() -> StudentDetails {
    StudentDetails {
        surname: "Okafor".to_string(),
        firstname: "Chidi".to_string(),
        othername: String::new(),
        sex: "Male".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 31).expect("valid date"),
        email: "chidi@example.edu".to_string(),
        phone_number: "08030000000".to_string(),
        whatsapp_name: String::new(),
        nationality: "Nigerian".to_string(),
        faculty: "Engineering".to_string(),
        department: "Civil".to_string(),
        level_of_study: "300".to_string(),
        matric_number: "ENG/2018/0456".to_string(),
        permanent_address: "4 Marina Road, Lagos".to_string(),
        accommodation_type: "Off-campus".to_string(),
        residential_address: "7 Unity Close".to_string(),
        state_of_residence: "Lagos".to_string(),
        lga_of_residence: "Eti-Osa".to_string(),
        guardian_name: "Mr. Okafor".to_string(),
        guardian_phone_number: "08031111111".to_string(),
        religion: "Christianity".to_string(),
        state_of_origin: "Anambra".to_string(),
        local_government: "Awka South".to_string(),
        skills: String::new(),
        extracurricular_activities: "Football".to_string(),
        second_phone_number: String::new(),
        marital_status: None,
        mode_of_entry: None,
        jamb_reg_number: String::new(),
        next_of_kin_name: None,
        next_of_kin_phone: None,
        next_of_kin_relationship: None,
    }
}

pub(super) fn stored_submission(id: u64, code: &str, passport: Option<&str>) -> Submission {
    Submission {
        id: SubmissionId(id),
        details: details(),
        passport: passport.map(str::to_string),
        submission_code: SubmissionCode(code.to_string()),
        submission_date: base_time(),
    }
}

/// In-memory store stamping each insert one minute after the previous one.
#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<BTreeMap<SubmissionId, Submission>>>,
}

impl MemoryRepository {
    pub(super) fn seeded(codes: &[&str]) -> Self {
        let repository = Self::default();
        for code in codes {
            repository
                .insert(NewSubmission {
                    details: details(),
                    passport: None,
                    submission_code: SubmissionCode(code.to_string()),
                })
                .expect("seed insert");
        }
        repository
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl SubmissionRepository for MemoryRepository {
    fn insert(&self, submission: NewSubmission) -> Result<Submission, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard
            .values()
            .any(|record| record.submission_code == submission.submission_code)
        {
            return Err(RepositoryError::Conflict(submission.submission_code.0));
        }

        let next = guard.keys().next_back().map_or(1, |id| id.0 + 1);
        let minutes = i64::try_from(next).expect("small id");
        let record = submission.into_submission(
            SubmissionId(next),
            base_time() + Duration::minutes(minutes),
        );
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, submission: Submission) -> Result<Submission, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&submission.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(submission.id, submission.clone());
        Ok(submission)
    }

    fn fetch(&self, id: SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn delete(&self, id: SubmissionId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn all(&self) -> Result<Vec<Submission>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<Submission> = guard.values().cloned().collect();
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn search(&self, query: &str) -> Result<Vec<Submission>, RepositoryError> {
        let mut records = self.all()?;
        records.retain(|record| record.matches(query));
        Ok(records)
    }

    fn codes(&self) -> Result<BTreeSet<String>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .map(|record| record.submission_code.0.clone())
            .collect())
    }
}

/// Simulates a concurrent writer claiming the code between snapshot and insert.
#[derive(Default)]
pub(super) struct RacingRepository {
    pub(super) inner: MemoryRepository,
    pub(super) conflicts_remaining: AtomicUsize,
}

impl RacingRepository {
    pub(super) fn with_conflicts(conflicts: usize) -> Self {
        Self {
            inner: MemoryRepository::default(),
            conflicts_remaining: AtomicUsize::new(conflicts),
        }
    }
}

impl SubmissionRepository for RacingRepository {
    fn insert(&self, submission: NewSubmission) -> Result<Submission, RepositoryError> {
        let remaining = self.conflicts_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(RepositoryError::Conflict(submission.submission_code.0));
        }
        self.inner.insert(submission)
    }

    fn update(&self, submission: Submission) -> Result<Submission, RepositoryError> {
        self.inner.update(submission)
    }

    fn fetch(&self, id: SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn delete(&self, id: SubmissionId) -> Result<(), RepositoryError> {
        self.inner.delete(id)
    }

    fn all(&self) -> Result<Vec<Submission>, RepositoryError> {
        self.inner.all()
    }

    fn search(&self, query: &str) -> Result<Vec<Submission>, RepositoryError> {
        self.inner.search(query)
    }

    fn codes(&self) -> Result<BTreeSet<String>, RepositoryError> {
        self.inner.codes()
    }
}

pub(super) struct UnavailableRepository;

impl SubmissionRepository for UnavailableRepository {
    fn insert(&self, _submission: NewSubmission) -> Result<Submission, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _submission: Submission) -> Result<Submission, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: SubmissionId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn search(&self, _query: &str) -> Result<Vec<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn codes(&self) -> Result<BTreeSet<String>, RepositoryError> {
        Ok(BTreeSet::new())
    }
}

pub(super) fn build_service() -> (RegistrationService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = RegistrationService::new(repository.clone(), settings());
    (service, repository)
}

pub(super) fn router_with<R>(repository: Arc<R>, access: AdminAccess) -> axum::Router
where
    R: SubmissionRepository + 'static,
{
    let service = RegistrationService::new(repository, settings());
    registration_router(Arc::new(service), access)
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_slice(&body).expect("json payload")
}

/// Cell read back from a written workbook: reference, style index, resolved text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SheetCell {
    pub(super) reference: String,
    pub(super) style: Option<String>,
    pub(super) text: Option<String>,
}

impl SheetCell {
    pub(super) fn row(&self) -> u32 {
        self.reference
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .parse()
            .expect("numeric row")
    }
}

/// Raw parts of a generated `.xlsx` needed to check layout and styling.
pub(super) struct Workbook {
    pub(super) sheet_xml: String,
    pub(super) styles_xml: String,
    pub(super) cells: Vec<SheetCell>,
}

impl Workbook {
    pub(super) fn open(bytes: &[u8]) -> Self {
        let mut archive =
            zip::ZipArchive::new(std::io::Cursor::new(bytes)).expect("xlsx is a zip archive");
        let mut read = |name: &str| {
            let mut entry = archive.by_name(name).expect("workbook part present");
            let mut text = String::new();
            std::io::Read::read_to_string(&mut entry, &mut text).expect("utf8 part");
            text
        };

        let sheet_xml = read("xl/worksheets/sheet1.xml");
        let styles_xml = read("xl/styles.xml");
        let shared = read("xl/sharedStrings.xml");

        let strings: Vec<String> = shared
            .split("<si>")
            .skip(1)
            .map(|item| {
                let start = item.find("<t").expect("text node");
                let body = &item[start..];
                let open_end = body.find('>').expect("text tag end") + 1;
                let close = body.find("</t>").expect("text close");
                body[open_end..close].to_string()
            })
            .collect();

        let cells = sheet_xml
            .split("<c ")
            .skip(1)
            .map(|chunk| {
                let tag_end = chunk.find('>').expect("cell tag end");
                let attrs = &chunk[..tag_end];
                let value = (!attrs.ends_with('/'))
                    .then(|| between(chunk, "<v>", "</v>"))
                    .flatten();
                let text = match (attribute(attrs, "t").as_deref(), value) {
                    (Some("s"), Some(index)) => {
                        Some(strings[index.parse::<usize>().expect("string index")].clone())
                    }
                    (_, value) => value,
                };
                SheetCell {
                    reference: attribute(attrs, "r").expect("cell reference"),
                    style: attribute(attrs, "s"),
                    text,
                }
            })
            .collect();

        Self {
            sheet_xml,
            styles_xml,
            cells,
        }
    }

    pub(super) fn row_text(&self, row: u32) -> Vec<String> {
        self.cells
            .iter()
            .filter(|cell| cell.row() == row)
            .map(|cell| cell.text.clone().unwrap_or_default())
            .collect()
    }
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
    let needle = format!(" {name}=\"");
    let padded = format!(" {attrs}");
    let start = padded.find(&needle)? + needle.len();
    let end = padded[start..].find('"')?;
    Some(padded[start..start + end].to_string())
}

fn between(haystack: &str, open: &str, close: &str) -> Option<String> {
    let start = haystack.find(open)? + open.len();
    let end = haystack[start..].find(close)?;
    Some(haystack[start..start + end].to_string())
}
