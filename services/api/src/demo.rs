use crate::infra::InMemorySubmissionRepository;
use clap::Args;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use student_intake::error::AppError;
use student_intake::workflows::registration::{
    ColumnSet, ExportFormat, ExportOptions, RegistrationError, RegistrationService,
    RegistrationSettings, SubmissionForm,
};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Directory receiving the JSON, CSV, and XLSX exports.
    #[arg(long, default_value = "demo-output")]
    pub(crate) out_dir: PathBuf,
}

const DEMO_STUDENTS: [(&str, &str, &str); 4] = [
    ("Okafor", "Chidi", "ENG/2019/12345"),
    ("Bello", "Aisha", "SCI/2020/00345"),
    ("Adeyemi", "Tolu", "CSC/2021/345"),
    ("Musa", "Ibrahim", "ART/2022/678"),
];

pub(crate) fn demo_form(surname: &str, matric_number: &str) -> SubmissionForm {
    SubmissionForm {
        surname: surname.to_string(),
        firstname: "Demo".to_string(),
        sex: "Female".to_string(),
        date_of_birth: "2002-05-17".to_string(),
        email: format!("{}@students.example.edu", surname.to_lowercase()),
        phone_number: "08031234567".to_string(),
        whatsapp_name: surname.to_string(),
        nationality: "Nigerian".to_string(),
        passport: Some(format!("{}.jpg", surname.to_lowercase())),
        faculty: "Science".to_string(),
        department: "Computer Science".to_string(),
        level_of_study: "100".to_string(),
        matric_number: matric_number.to_string(),
        permanent_address: "12 Allen Avenue, Ikeja".to_string(),
        accommodation_type: "Hostel".to_string(),
        residential_address: "Block C, Room 14".to_string(),
        state_of_residence: "Lagos".to_string(),
        lga_of_residence: "Ikeja".to_string(),
        guardian_name: format!("Mr. {surname}"),
        guardian_phone_number: "08029876543".to_string(),
        religion: "Christianity".to_string(),
        state_of_origin: "Ogun".to_string(),
        local_government: "Abeokuta South".to_string(),
        skills: "Spreadsheets, Public speaking".to_string(),
        extracurricular_activities: "Debate club".to_string(),
        marital_status: Some("Single".to_string()),
        mode_of_entry: Some("UTME".to_string()),
        ..SubmissionForm::default()
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemorySubmissionRepository::default());
    let service = RegistrationService::new(repository, RegistrationSettings::default());

    println!("Student intake demo");
    println!("Submissions (three matric numbers share the digits 345):");
    for (surname, firstname, matric) in DEMO_STUDENTS {
        let form = SubmissionForm {
            firstname: firstname.to_string(),
            ..demo_form(surname, matric)
        };
        let record = service.submit(form)?;
        println!("- {} <- {}", record.display_name(), matric);
    }

    let rejected = SubmissionForm {
        email: "not-an-email".to_string(),
        phone_number: "0803-CALL-ME".to_string(),
        ..demo_form("Invalid", "XYZ/01")
    };
    match service.submit(rejected) {
        Err(RegistrationError::Validation(errors)) => {
            println!("Rejected submission:");
            for field in errors.fields() {
                for message in errors.get(field).unwrap_or_default() {
                    println!("  - {field}: {message}");
                }
            }
        }
        Err(err) => return Err(err.into()),
        Ok(record) => println!("Unexpectedly accepted {}", record.display_name()),
    }

    fs::create_dir_all(&args.out_dir)?;
    println!("\nExports written to {}:", args.out_dir.display());
    for format in ExportFormat::ordered() {
        let document = service.export(format, &ExportOptions::default())?;
        let path = args.out_dir.join(document.filename);
        fs::write(&path, &document.bytes)?;
        println!(
            "- {} ({} bytes, {})",
            path.display(),
            document.bytes.len(),
            document.content_type
        );
    }

    let full = service.export(
        ExportFormat::Csv,
        &ExportOptions {
            columns: ColumnSet::Full,
            search: Some("345".to_string()),
        },
    )?;
    let path = args.out_dir.join("student_submissions_full_345.csv");
    fs::write(&path, &full.bytes)?;
    println!("- {} (full columns, matric search \"345\")", path.display());

    Ok(())
}
