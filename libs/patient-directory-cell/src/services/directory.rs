use chrono::NaiveDate;
use tracing::debug;

use shared_config::AppConfig;
use shared_models::PatientRecord;

use crate::error::DirectoryError;
use crate::models::{ExportArtifact, ExportRequest, FilterCriteria, PdfLayoutOptions};
use crate::services::export::ExportService;
use crate::services::filter::filter_patients;
use crate::services::store::PatientStore;

/// Search and export over a patient store. Each call reloads the store, so
/// the service holds no state besides its collaborators.
pub struct DirectoryService<S: PatientStore> {
    store: S,
    exporter: ExportService,
}

impl<S: PatientStore> DirectoryService<S> {
    pub fn new(store: S, config: &AppConfig) -> Self {
        Self {
            store,
            exporter: ExportService::new(config),
        }
    }

    pub fn with_pdf_options(store: S, pdf_options: PdfLayoutOptions) -> Self {
        Self {
            store,
            exporter: ExportService::with_pdf_options(pdf_options),
        }
    }

    pub fn exporter(&self) -> &ExportService {
        &self.exporter
    }

    pub fn search(&self, criteria: &FilterCriteria, today: NaiveDate) -> Result<Vec<PatientRecord>, DirectoryError> {
        let patients = self.store.load_patients()?;
        debug!("Searching {} patients with {:?}", patients.len(), criteria);
        Ok(filter_patients(&patients, criteria, today))
    }

    pub fn patient(&self, patient_id: &str) -> Result<PatientRecord, DirectoryError> {
        self.store.find_patient(patient_id)
    }

    /// Filters the store and exports the result, narrowed to the request's
    /// selection when one is given. `today` anchors the last-visit window and
    /// `export_date` names the file.
    pub fn export(
        &self,
        criteria: &FilterCriteria,
        request: &ExportRequest,
        today: NaiveDate,
        export_date: NaiveDate,
    ) -> Result<ExportArtifact, DirectoryError> {
        let filtered = self.search(criteria, today)?;
        self.exporter.export(&filtered, request, export_date)
    }
}
