use crate::demo::{run_demo, DemoArgs};
use crate::infra::{parse_columns, parse_format, InMemorySubmissionRepository};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use student_intake::config::AppConfig;
use student_intake::error::AppError;
use student_intake::workflows::registration::{
    ColumnSet, ExportFormat, ExportOptions, RegistrationService,
};

#[derive(Parser, Debug)]
#[command(
    name = "Student Intake",
    about = "Run the student registration intake service and export its records",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Export stored submissions from a data file as JSON, CSV, or XLSX
    Export(ExportArgs),
    /// Register sample students with colliding matric numbers and write every export
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON snapshot file holding submissions between restarts
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// json, csv, or excel
    #[arg(long, value_parser = parse_format)]
    pub(crate) format: ExportFormat,
    /// JSON snapshot file written by `serve --data-file`
    #[arg(long)]
    pub(crate) data_file: PathBuf,
    /// Destination path (defaults to the format's download filename)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// registration (default) or full
    #[arg(long, value_parser = parse_columns, default_value = "registration")]
    pub(crate) columns: ColumnSet,
    /// Only export submissions matching this search term
    #[arg(long)]
    pub(crate) search: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Export(args) => run_export(args),
        Command::Demo(args) => run_demo(args),
    }
}

fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        format,
        data_file,
        output,
        columns,
        search,
    } = args;

    let config = AppConfig::load()?;
    let repository = Arc::new(InMemorySubmissionRepository::open(data_file)?);
    let service = RegistrationService::new(repository, config.registration_settings());

    let document = service.export(format, &ExportOptions { columns, search })?;
    let output = output.unwrap_or_else(|| PathBuf::from(document.filename));
    fs::write(&output, &document.bytes)?;

    println!(
        "Wrote {} ({} bytes, {})",
        output.display(),
        document.bytes.len(),
        document.content_type
    );
    Ok(())
}
