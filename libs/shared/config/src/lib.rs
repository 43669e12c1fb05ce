use std::env;
use tracing::warn;

pub const DEFAULT_EXPORT_OUTPUT_DIR: &str = ".";
pub const DEFAULT_PDF_ROWS_PER_PAGE: usize = 25;
pub const DEFAULT_PDF_TITLE: &str = "Patient Data Export";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub patient_fixture_path: String,
    pub export_output_dir: String,
    pub export_pdf_rows_per_page: usize,
    pub export_pdf_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            patient_fixture_path: String::new(),
            export_output_dir: DEFAULT_EXPORT_OUTPUT_DIR.to_string(),
            export_pdf_rows_per_page: DEFAULT_PDF_ROWS_PER_PAGE,
            export_pdf_title: DEFAULT_PDF_TITLE.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            patient_fixture_path: env::var("PATIENT_FIXTURE_PATH")
                .unwrap_or_else(|_| {
                    warn!("PATIENT_FIXTURE_PATH not set, using empty value");
                    String::new()
                }),
            export_output_dir: env::var("EXPORT_OUTPUT_DIR")
                .unwrap_or_else(|_| {
                    warn!("EXPORT_OUTPUT_DIR not set, using default");
                    DEFAULT_EXPORT_OUTPUT_DIR.to_string()
                }),
            export_pdf_rows_per_page: parse_rows_per_page(env::var("EXPORT_PDF_ROWS_PER_PAGE").ok()),
            export_pdf_title: env::var("EXPORT_PDF_TITLE")
                .unwrap_or_else(|_| DEFAULT_PDF_TITLE.to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.patient_fixture_path.is_empty()
    }
}

fn parse_rows_per_page(raw: Option<String>) -> usize {
    match raw {
        None => DEFAULT_PDF_ROWS_PER_PAGE,
        Some(value) => match value.trim().parse::<usize>() {
            Ok(rows) if rows > 0 => rows,
            _ => {
                warn!("EXPORT_PDF_ROWS_PER_PAGE={} is not a positive integer, using default", value);
                DEFAULT_PDF_ROWS_PER_PAGE
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_per_page_defaults_when_unset() {
        assert_eq!(parse_rows_per_page(None), DEFAULT_PDF_ROWS_PER_PAGE);
    }

    #[test]
    fn test_rows_per_page_rejects_zero_and_garbage() {
        assert_eq!(parse_rows_per_page(Some("0".to_string())), DEFAULT_PDF_ROWS_PER_PAGE);
        assert_eq!(parse_rows_per_page(Some("many".to_string())), DEFAULT_PDF_ROWS_PER_PAGE);
        assert_eq!(parse_rows_per_page(Some(" 40 ".to_string())), 40);
    }

    #[test]
    fn test_default_config_is_not_configured() {
        let config = AppConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.export_pdf_title, "Patient Data Export");
    }
}
