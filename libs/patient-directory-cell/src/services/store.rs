use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::PatientRecord;

use crate::error::DirectoryError;

/// Read-only source of patient records. Filtering and export only ever see
/// the materialised list, so any backing store can sit behind this trait.
#[cfg_attr(test, mockall::automock)]
pub trait PatientStore {
    fn load_patients(&self) -> Result<Vec<PatientRecord>, DirectoryError>;

    fn find_patient(&self, patient_id: &str) -> Result<PatientRecord, DirectoryError> {
        self.load_patients()?
            .into_iter()
            .find(|p| p.id == patient_id)
            .ok_or_else(|| DirectoryError::PatientNotFound(patient_id.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryPatientStore {
    patients: Vec<PatientRecord>,
}

impl InMemoryPatientStore {
    pub fn new(patients: Vec<PatientRecord>) -> Self {
        Self {
            patients: assign_missing_ids(patients),
        }
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

impl PatientStore for InMemoryPatientStore {
    fn load_patients(&self) -> Result<Vec<PatientRecord>, DirectoryError> {
        Ok(self.patients.clone())
    }
}

/// Patients read from a JSON array on disk, re-read on every load.
#[derive(Debug, Clone)]
pub struct JsonFixtureStore {
    path: PathBuf,
}

impl JsonFixtureStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PatientStore for JsonFixtureStore {
    fn load_patients(&self) -> Result<Vec<PatientRecord>, DirectoryError> {
        debug!("Loading patient fixture from {}", self.path.display());

        let raw = fs::read_to_string(&self.path).map_err(|source| DirectoryError::FixtureIo {
            path: self.path.clone(),
            source,
        })?;

        let patients: Vec<PatientRecord> =
            serde_json::from_str(&raw).map_err(|source| DirectoryError::FixtureFormat {
                path: self.path.clone(),
                source,
            })?;

        info!("Loaded {} patients from {}", patients.len(), self.path.display());
        Ok(assign_missing_ids(patients))
    }
}

/// Gives every record without an id a UUID v5 derived from its position and
/// identifying fields, so repeated loads of the same fixture agree on it.
/// Duplicate ids are kept but reported, since selection-by-id would then
/// export both.
fn assign_missing_ids(mut patients: Vec<PatientRecord>) -> Vec<PatientRecord> {
    let mut seen = HashSet::new();
    for (index, patient) in patients.iter_mut().enumerate() {
        if patient.id.trim().is_empty() {
            patient.id = generated_id(index, patient);
            debug!("Assigned id {} to patient {}", patient.id, patient.name);
        }
        if !seen.insert(patient.id.clone()) {
            warn!("Duplicate patient id in store: {}", patient.id);
        }
    }
    patients
}

fn generated_id(index: usize, patient: &PatientRecord) -> String {
    let key = format!(
        "{}\u{1f}{}\u{1f}{}\u{1f}{}",
        index, patient.name, patient.email, patient.contact_number
    );
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_utils::test_utils::{scenario_patients, TestPatient};

    #[test]
    fn test_in_memory_store_preserves_order() {
        let store = InMemoryPatientStore::new(scenario_patients());
        let names: Vec<String> = store.load_patients().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Rajesh Kumar", "Priya Sharma"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_missing_ids_are_assigned() {
        let store = InMemoryPatientStore::new(vec![TestPatient::new("No Id").id("").build()]);
        let patient = &store.load_patients().unwrap()[0];
        assert!(Uuid::parse_str(&patient.id).is_ok());
    }

    #[test]
    fn test_generated_ids_are_stable_across_loads() {
        let records = vec![
            TestPatient::new("First").id("").build(),
            TestPatient::new("Second").id("").build(),
        ];
        let first = InMemoryPatientStore::new(records.clone()).load_patients().unwrap();
        let second = InMemoryPatientStore::new(records).load_patients().unwrap();

        assert_eq!(first[0].id, second[0].id);
        assert_eq!(first[1].id, second[1].id);
        assert_ne!(first[0].id, first[1].id);
    }

    #[test]
    fn test_identical_records_get_distinct_ids() {
        let twin = TestPatient::new("Twin").id("").build();
        let patients = InMemoryPatientStore::new(vec![twin.clone(), twin]).load_patients().unwrap();
        assert_ne!(patients[0].id, patients[1].id);
    }

    #[test]
    fn test_find_patient_reports_unknown_id() {
        let store = InMemoryPatientStore::new(scenario_patients());
        assert_eq!(store.find_patient("p-priya").unwrap().name, "Priya Sharma");
        assert_matches!(
            store.find_patient("p-nobody"),
            Err(DirectoryError::PatientNotFound(id)) if id == "p-nobody"
        );
    }
}
