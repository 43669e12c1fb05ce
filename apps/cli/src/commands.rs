use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use patient_directory_cell::{
    classify_named_vital, DirectoryError, DirectoryService, ExportFormat, ExportRequest, FilterCriteria,
    FilterForm, JsonFixtureStore, PdfLayoutOptions,
};
use shared_config::AppConfig;
use shared_models::{AppError, PatientRecord};

#[derive(Parser, Debug)]
#[command(name = "patient-directory")]
#[command(about = "Search and export the patient directory")]
pub struct Cli {
    /// Patient fixture (JSON array); defaults to PATIENT_FIXTURE_PATH
    #[arg(long, global = true)]
    pub fixture: Option<PathBuf>,

    /// Reference date for last-visit windows (YYYY-MM-DD); defaults to today
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Matches name or email (case-insensitive) or contact number
    #[arg(long, short = 'q')]
    pub query: Option<String>,
    /// Male, Female or Other
    #[arg(long)]
    pub gender: Option<String>,
    /// A+, A-, B+, B-, AB+, AB-, O+ or O-
    #[arg(long)]
    pub blood_group: Option<String>,
    /// Inclusive range such as 19-30
    #[arg(long)]
    pub age_range: Option<String>,
    /// Only patients seen within this many days
    #[arg(long)]
    pub last_visit_days: Option<String>,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        FilterCriteria::from(FilterForm {
            search: args.query.unwrap_or_default(),
            gender: args.gender.unwrap_or_default(),
            blood_group: args.blood_group.unwrap_or_default(),
            age_range: args.age_range.unwrap_or_default(),
            last_visit: args.last_visit_days.unwrap_or_default(),
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List patients matching the filters
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show one patient's record and reports
    Show {
        /// Patient id
        patient_id: String,
    },
    /// Export matching patients to CSV or PDF
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// csv or pdf
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        /// Export only these patient ids (repeatable)
        #[arg(long = "select")]
        selected_ids: Vec<String>,
        /// Output directory; defaults to EXPORT_OUTPUT_DIR
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Classify a vital sign reading
    Vitals {
        /// heartRate, oxygenLevel, temperature or respiratoryRate
        parameter: String,
        value: f64,
    },
}

pub fn run(cli: Cli, config: &AppConfig, out: &mut impl Write) -> Result<()> {
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    match cli.command {
        Commands::List { filters } => {
            let service = open_directory(cli.fixture, config)?;
            let patients = service.search(&filters.into(), today)?;
            write_listing(out, &patients)?;
        }
        Commands::Show { patient_id } => {
            let service = open_directory(cli.fixture, config)?;
            let patient = service.patient(&patient_id)?;
            write_patient(out, &patient)?;
        }
        Commands::Export {
            filters,
            format,
            selected_ids,
            out_dir,
        } => {
            let service = open_directory(cli.fixture, config)?;
            let request = ExportRequest::new(format).with_selection(selected_ids);
            let export_date = chrono::Local::now().date_naive();
            let artifact = service.export(&filters.into(), &request, today, export_date)?;
            let dir = out_dir.unwrap_or_else(|| PathBuf::from(&config.export_output_dir));
            let path = service.exporter().write_artifact(&artifact, &dir)?;
            info!("Export complete: {}", path.display());
            writeln!(out, "Exported {} patients to {}", artifact.record_count, path.display())?;
        }
        Commands::Vitals { parameter, value } => {
            let status = classify_named_vital(&parameter, value);
            writeln!(out, "{}: {} ({:?})", parameter, value, status)?;
        }
    }

    Ok(())
}

fn open_directory(fixture: Option<PathBuf>, config: &AppConfig) -> Result<DirectoryService<JsonFixtureStore>> {
    let fixture = match fixture {
        Some(path) => path,
        None if config.is_configured() => PathBuf::from(&config.patient_fixture_path),
        None => {
            return Err(AppError::BadRequest(
                "no patient fixture given: pass --fixture or set PATIENT_FIXTURE_PATH".to_string(),
            )
            .into())
        }
    };

    let pdf_options = PdfLayoutOptions {
        generated_on: Some(chrono::Local::now().format("%Y-%m-%d %H:%M").to_string()),
        ..PdfLayoutOptions::from_config(config)
    };
    Ok(DirectoryService::with_pdf_options(JsonFixtureStore::new(fixture), pdf_options))
}

/// Maps a command failure onto the error category that decides the exit code.
pub fn into_app_error(err: anyhow::Error) -> AppError {
    let err = match err.downcast::<DirectoryError>() {
        Ok(directory_error) => return directory_error.into(),
        Err(err) => err,
    };
    match err.downcast::<AppError>() {
        Ok(app_error) => app_error,
        Err(other) => AppError::Internal(format!("{:#}", other)),
    }
}

fn write_listing(out: &mut impl Write, patients: &[PatientRecord]) -> Result<()> {
    if patients.is_empty() {
        writeln!(out, "No patients found.")?;
        return Ok(());
    }

    for patient in patients {
        writeln!(
            out,
            "ID: {}, Name: {}, Age: {}, Gender: {}, Blood Group: {}, Last Visit: {}",
            patient.id, patient.name, patient.age, patient.gender, patient.blood_group, patient.last_visit
        )?;
    }
    writeln!(out, "{} patients", patients.len())?;
    Ok(())
}

fn write_patient(out: &mut impl Write, patient: &PatientRecord) -> Result<()> {
    writeln!(out, "{} ({})", patient.name, patient.id)?;
    writeln!(out, "  Age: {}  Gender: {}  Blood Group: {}", patient.age, patient.gender, patient.blood_group)?;
    writeln!(out, "  Contact: {}  Email: {}", patient.contact_number, patient.email)?;
    writeln!(out, "  Address: {}", patient.address)?;
    writeln!(out, "  Last Visit: {}", patient.last_visit)?;
    writeln!(out, "  Medical History:")?;
    for condition in &patient.medical_history {
        writeln!(out, "    - {}", condition)?;
    }
    writeln!(
        out,
        "  Reports ({}, {} pending):",
        patient.report_count(),
        patient.pending_reports().count()
    )?;
    for report in &patient.medical_reports {
        writeln!(out, "    - {} [{}] {} by {} ({:?})", report.date, report.report_type, report.title, report.doctor, report.status)?;
    }
    Ok(())
}
