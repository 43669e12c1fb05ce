use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use shared_config::AppConfig;
use shared_models::PatientRecord;

use crate::error::DirectoryError;
use crate::models::{ExportArtifact, ExportFormat, ExportRequest, PdfLayoutOptions};
use crate::services::csv_export::render_csv;
use crate::services::pdf_export::{layout_pdf, render_pdf};

pub struct ExportService {
    pdf_options: PdfLayoutOptions,
}

impl ExportService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            pdf_options: PdfLayoutOptions::from_config(config),
        }
    }

    pub fn with_pdf_options(pdf_options: PdfLayoutOptions) -> Self {
        Self { pdf_options }
    }

    /// Renders `patients` (narrowed to the request's selection, if any) in the
    /// requested format. `export_date` only names the file.
    #[instrument(skip(self, patients), fields(format = %request.format, total = patients.len()))]
    pub fn export(
        &self,
        patients: &[PatientRecord],
        request: &ExportRequest,
        export_date: NaiveDate,
    ) -> Result<ExportArtifact, DirectoryError> {
        let selected = select_for_export(patients, &request.selected_ids);
        debug!("Exporting {} of {} patients", selected.len(), patients.len());

        let content = match request.format {
            ExportFormat::Csv => render_csv(selected.iter().copied())?.into_bytes(),
            ExportFormat::Pdf => {
                let layout = layout_pdf(selected.iter().copied(), &self.pdf_options);
                render_pdf(&layout)?
            }
        };

        Ok(ExportArtifact {
            format: request.format,
            file_name: export_file_name(request.format, export_date),
            record_count: selected.len(),
            content,
        })
    }

    /// Writes the artifact into `dir`, creating the directory if needed.
    pub fn write_artifact(&self, artifact: &ExportArtifact, dir: &Path) -> Result<PathBuf, DirectoryError> {
        let path = dir.join(&artifact.file_name);

        fs::create_dir_all(dir).map_err(|source| DirectoryError::ExportWrite {
            path: dir.to_path_buf(),
            source,
        })?;
        fs::write(&path, &artifact.content).map_err(|source| DirectoryError::ExportWrite {
            path: path.clone(),
            source,
        })?;

        info!(
            "Wrote {} export of {} patients to {}",
            artifact.format,
            artifact.record_count,
            path.display()
        );
        Ok(path)
    }
}

/// The records to export: those whose id is in `selected_ids`, or all of
/// them when the selection is empty. Order follows `patients`.
pub fn select_for_export<'a>(patients: &'a [PatientRecord], selected_ids: &[String]) -> Vec<&'a PatientRecord> {
    if selected_ids.is_empty() {
        return patients.iter().collect();
    }

    let wanted: HashSet<&str> = selected_ids.iter().map(String::as_str).collect();
    patients
        .iter()
        .filter(|p| wanted.contains(p.id.as_str()))
        .collect()
}

pub fn export_file_name(format: ExportFormat, export_date: NaiveDate) -> String {
    format!(
        "patients_export_{}.{}",
        export_date.format("%Y-%m-%d"),
        format.extension()
    )
}
