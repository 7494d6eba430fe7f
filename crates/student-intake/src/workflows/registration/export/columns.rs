use super::super::domain::{StudentDetails, Submission};
use super::super::media::MediaLocator;

/// Bump on any change to column labels or order.
pub const COLUMN_SET_VERSION: u32 = 1;

pub const SUBMISSION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_OF_BIRTH_FORMAT: &str = "%Y-%m-%d";

type Accessor = fn(&Submission, &MediaLocator) -> String;

/// One tabular export column: header label plus the accessor producing its cell text.
#[derive(Clone, Copy)]
pub struct Column {
    pub label: &'static str,
    value: Accessor,
}

impl Column {
    const fn new(label: &'static str, value: Accessor) -> Self {
        Self { label, value }
    }

    pub fn render(&self, submission: &Submission, media: &MediaLocator) -> String {
        (self.value)(submission, media)
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Column").field(&self.label).finish()
    }
}

fn details(submission: &Submission) -> &StudentDetails {
    &submission.details
}

fn submission_date(submission: &Submission) -> String {
    submission
        .submission_date
        .format(SUBMISSION_DATE_FORMAT)
        .to_string()
}

fn date_of_birth(submission: &Submission) -> String {
    details(submission)
        .date_of_birth
        .format(DATE_OF_BIRTH_FORMAT)
        .to_string()
}

fn passport_url(submission: &Submission, media: &MediaLocator) -> String {
    submission
        .passport
        .as_deref()
        .map(|path| media.url_for(path))
        .unwrap_or_default()
}

fn optional(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// Registration export layout shared by the CSV and spreadsheet encodings.
pub const REGISTRATION_COLUMNS: &[Column] = &[
    Column::new("Submission Code", |s, _| s.submission_code.to_string()),
    Column::new("Submission Date", |s, _| submission_date(s)),
    Column::new("Surname", |s, _| details(s).surname.clone()),
    Column::new("Firstname", |s, _| details(s).firstname.clone()),
    Column::new("Other Name", |s, _| details(s).othername.clone()),
    Column::new("Sex", |s, _| details(s).sex.clone()),
    Column::new("Date of Birth", |s, _| date_of_birth(s)),
    Column::new("Email", |s, _| details(s).email.clone()),
    Column::new("Phone Number", |s, _| details(s).phone_number.clone()),
    Column::new("WhatsApp Name", |s, _| details(s).whatsapp_name.clone()),
    Column::new("Nationality", |s, _| details(s).nationality.clone()),
    Column::new("Faculty", |s, _| details(s).faculty.clone()),
    Column::new("Department", |s, _| details(s).department.clone()),
    Column::new("Level of Study", |s, _| details(s).level_of_study.clone()),
    Column::new("Matric Number", |s, _| details(s).matric_number.clone()),
    Column::new("Permanent Address", |s, _| details(s).permanent_address.clone()),
    Column::new("Accommodation Type", |s, _| details(s).accommodation_type.clone()),
    Column::new("Residential Address", |s, _| details(s).residential_address.clone()),
    Column::new("State of Residence", |s, _| details(s).state_of_residence.clone()),
    Column::new("LGA of Residence", |s, _| details(s).lga_of_residence.clone()),
    Column::new("Guardian Name", |s, _| details(s).guardian_name.clone()),
    Column::new("Guardian Phone Number", |s, _| {
        details(s).guardian_phone_number.clone()
    }),
    Column::new("Religion", |s, _| details(s).religion.clone()),
    Column::new("State of Origin", |s, _| details(s).state_of_origin.clone()),
    Column::new("Local Government", |s, _| details(s).local_government.clone()),
    Column::new("Skills", |s, _| details(s).skills.clone()),
    Column::new("Extracurricular Activities", |s, _| {
        details(s).extracurricular_activities.clone()
    }),
    Column::new("Passport Image", passport_url),
];

/// Every stored field, labelled by field name, for the administrative full-table export.
pub const FULL_COLUMNS: &[Column] = &[
    Column::new("id", |s, _| s.id.to_string()),
    Column::new("surname", |s, _| details(s).surname.clone()),
    Column::new("firstname", |s, _| details(s).firstname.clone()),
    Column::new("othername", |s, _| details(s).othername.clone()),
    Column::new("sex", |s, _| details(s).sex.clone()),
    Column::new("date_of_birth", |s, _| date_of_birth(s)),
    Column::new("email", |s, _| details(s).email.clone()),
    Column::new("phone_number", |s, _| details(s).phone_number.clone()),
    Column::new("whatsapp_name", |s, _| details(s).whatsapp_name.clone()),
    Column::new("nationality", |s, _| details(s).nationality.clone()),
    Column::new("passport", |s, _| optional(s.passport.as_deref())),
    Column::new("faculty", |s, _| details(s).faculty.clone()),
    Column::new("department", |s, _| details(s).department.clone()),
    Column::new("level_of_study", |s, _| details(s).level_of_study.clone()),
    Column::new("matric_number", |s, _| details(s).matric_number.clone()),
    Column::new("permanent_address", |s, _| details(s).permanent_address.clone()),
    Column::new("accommodation_type", |s, _| details(s).accommodation_type.clone()),
    Column::new("residential_address", |s, _| details(s).residential_address.clone()),
    Column::new("state_of_residence", |s, _| details(s).state_of_residence.clone()),
    Column::new("lga_of_residence", |s, _| details(s).lga_of_residence.clone()),
    Column::new("guardian_name", |s, _| details(s).guardian_name.clone()),
    Column::new("guardian_phone_number", |s, _| {
        details(s).guardian_phone_number.clone()
    }),
    Column::new("religion", |s, _| details(s).religion.clone()),
    Column::new("state_of_origin", |s, _| details(s).state_of_origin.clone()),
    Column::new("local_government", |s, _| details(s).local_government.clone()),
    Column::new("skills", |s, _| details(s).skills.clone()),
    Column::new("extracurricular_activities", |s, _| {
        details(s).extracurricular_activities.clone()
    }),
    Column::new("second_phone_number", |s, _| {
        details(s).second_phone_number.clone()
    }),
    Column::new("marital_status", |s, _| {
        optional(details(s).marital_status.map(|status| status.label()))
    }),
    Column::new("mode_of_entry", |s, _| {
        optional(details(s).mode_of_entry.map(|mode| mode.label()))
    }),
    Column::new("jamb_reg_number", |s, _| details(s).jamb_reg_number.clone()),
    Column::new("next_of_kin_name", |s, _| {
        optional(details(s).next_of_kin_name.as_deref())
    }),
    Column::new("next_of_kin_phone", |s, _| {
        optional(details(s).next_of_kin_phone.as_deref())
    }),
    Column::new("next_of_kin_relationship", |s, _| {
        optional(details(s).next_of_kin_relationship.as_deref())
    }),
    Column::new("submission_code", |s, _| s.submission_code.to_string()),
    Column::new("submission_date", |s, _| submission_date(s)),
];

/// Which tabular layout an export uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnSet {
    #[default]
    Registration,
    Full,
}

impl ColumnSet {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "registration" | "standard" => Some(Self::Registration),
            "full" | "all" => Some(Self::Full),
            _ => None,
        }
    }

    pub fn columns(self) -> &'static [Column] {
        match self {
            Self::Registration => REGISTRATION_COLUMNS,
            Self::Full => FULL_COLUMNS,
        }
    }
}

/// Header plus rendered rows; the single source for both tabular encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

pub fn tabulate(records: &[Submission], columns: &[Column], media: &MediaLocator) -> Table {
    let header = columns.iter().map(|column| column.label).collect();
    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| column.render(record, media))
                .collect()
        })
        .collect();

    Table { header, rows }
}
