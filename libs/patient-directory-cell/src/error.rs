use std::path::PathBuf;

use thiserror::Error;

use shared_models::AppError;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Failed to read patient fixture {path}: {source}")]
    FixtureIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Patient fixture {path} is not a valid patient list: {source}")]
    FixtureFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV export produced invalid UTF-8: {0}")]
    CsvEncoding(#[from] std::string::FromUtf8Error),

    #[error("PDF export failed: {0}")]
    Pdf(String),

    #[error("Failed to write export to {path}: {source}")]
    ExportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::PatientNotFound(id) => AppError::NotFound(format!("patient {}", id)),
            DirectoryError::FixtureIo { .. } | DirectoryError::FixtureFormat { .. } => {
                AppError::Storage(err.to_string())
            }
            DirectoryError::Csv(_)
            | DirectoryError::CsvEncoding(_)
            | DirectoryError::Pdf(_)
            | DirectoryError::ExportWrite { .. } => AppError::Export(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_not_found_maps_to_not_found() {
        let app: AppError = DirectoryError::PatientNotFound("p-1".to_string()).into();
        assert_matches!(app, AppError::NotFound(msg) if msg == "patient p-1");
    }

    #[test]
    fn test_fixture_errors_map_to_storage() {
        let err = DirectoryError::FixtureIo {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let app: AppError = err.into();
        assert_matches!(app, AppError::Storage(msg) if msg.contains("missing.json"));
    }

    #[test]
    fn test_pdf_errors_map_to_export() {
        let app: AppError = DirectoryError::Pdf("font".to_string()).into();
        assert_matches!(app, AppError::Export(_));
    }
}
