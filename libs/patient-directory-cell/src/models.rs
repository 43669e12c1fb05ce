use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use shared_models::{BloodGroup, Gender};

// ==============================================================================
// FILTER CRITERIA
// ==============================================================================

/// Active constraints for a directory search. `None` (or an empty string)
/// means the field does not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub text_query: Option<String>,
    pub gender: Option<Gender>,
    pub blood_group: Option<BloodGroup>,
    /// Inclusive `"min-max"` range, kept in its raw form so that a malformed
    /// value can be dropped at evaluation time instead of rejected up front.
    pub age_range: Option<String>,
    pub last_visit_within_days: Option<u32>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_query(mut self, query: impl Into<String>) -> Self {
        self.text_query = Some(query.into());
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_blood_group(mut self, blood_group: BloodGroup) -> Self {
        self.blood_group = Some(blood_group);
        self
    }

    pub fn with_age_range(mut self, range: impl Into<String>) -> Self {
        self.age_range = Some(range.into());
        self
    }

    pub fn with_last_visit_within_days(mut self, days: u32) -> Self {
        self.last_visit_within_days = Some(days);
        self
    }

    /// True when no field would constrain a search.
    pub fn is_empty(&self) -> bool {
        self.active_text_query().is_none()
            && self.gender.is_none()
            && self.blood_group.is_none()
            && self.age_range.as_deref().map_or(true, |r| r.trim().is_empty())
            && self.last_visit_within_days.is_none()
    }

    pub fn active_text_query(&self) -> Option<&str> {
        self.text_query.as_deref().filter(|q| !q.is_empty())
    }
}

/// Raw values as they arrive from a search box and filter drop-downs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterForm {
    pub search: String,
    pub gender: String,
    pub blood_group: String,
    pub age_range: String,
    pub last_visit: String,
}

impl From<FilterForm> for FilterCriteria {
    /// Unrecognised drop-down values are dropped with a warning, leaving the
    /// remaining fields in force.
    fn from(form: FilterForm) -> Self {
        let gender = non_empty(&form.gender).and_then(|raw| match raw.parse::<Gender>() {
            Ok(gender) => Some(gender),
            Err(e) => {
                warn!("Ignoring gender filter: {}", e);
                None
            }
        });

        let blood_group = non_empty(&form.blood_group).and_then(|raw| match raw.parse::<BloodGroup>() {
            Ok(group) => Some(group),
            Err(e) => {
                warn!("Ignoring blood group filter: {}", e);
                None
            }
        });

        let last_visit_within_days = non_empty(&form.last_visit).and_then(|raw| match raw.trim().parse::<u32>() {
            Ok(days) => Some(days),
            Err(_) => {
                warn!("Ignoring last visit filter: {:?} is not a day count", raw);
                None
            }
        });

        FilterCriteria {
            text_query: non_empty(&form.search).map(str::to_string),
            gender,
            blood_group,
            age_range: non_empty(&form.age_range).map(str::to_string),
            last_visit_within_days,
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

// ==============================================================================
// AGE RANGE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

fn age_range_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\s*(\d+)\s*-\s*(\d+)\s*$"))
        .as_ref()
        .ok()
}

impl AgeRange {
    /// Parses `"min-max"`. Returns `None` for anything that is not two
    /// non-negative integers with `min <= max`.
    pub fn parse(raw: &str) -> Option<Self> {
        let captures = age_range_pattern()?.captures(raw)?;
        let min = captures.get(1)?.as_str().parse::<u32>().ok()?;
        let max = captures.get(2)?.as_str().parse::<u32>().ok()?;

        if min > max {
            return None;
        }

        Some(Self { min, max })
    }

    pub fn contains(&self, age: u32) -> bool {
        self.min <= age && age <= self.max
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

// ==============================================================================
// EXPORT
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("unsupported export format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub format: ExportFormat,
    /// When non-empty, only these records are exported.
    #[serde(default)]
    pub selected_ids: Vec<String>,
}

impl ExportRequest {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            selected_ids: Vec::new(),
        }
    }

    pub fn with_selection<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_ids = ids.into_iter().map(Into::into).collect();
        self
    }
}

/// A rendered export, ready to be written or offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub file_name: String,
    pub record_count: usize,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfLayoutOptions {
    pub title: String,
    pub rows_per_page: usize,
    /// Rendered as a "Generated on" line under the title when present.
    pub generated_on: Option<String>,
}

impl Default for PdfLayoutOptions {
    fn default() -> Self {
        Self {
            title: shared_config::DEFAULT_PDF_TITLE.to_string(),
            rows_per_page: shared_config::DEFAULT_PDF_ROWS_PER_PAGE,
            generated_on: None,
        }
    }
}

impl PdfLayoutOptions {
    pub fn from_config(config: &shared_config::AppConfig) -> Self {
        Self {
            title: config.export_pdf_title.clone(),
            rows_per_page: config.export_pdf_rows_per_page,
            generated_on: None,
        }
    }
}

// ==============================================================================
// VITAL SIGNS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VitalParameter {
    HeartRate,
    OxygenLevel,
    Temperature,
    RespiratoryRate,
}

impl FromStr for VitalParameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "heartrate" => Ok(VitalParameter::HeartRate),
            "oxygenlevel" | "oxygensaturation" | "spo2" => Ok(VitalParameter::OxygenLevel),
            "temperature" => Ok(VitalParameter::Temperature),
            "respiratoryrate" => Ok(VitalParameter::RespiratoryRate),
            _ => Err(format!("unknown vital sign parameter: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VitalStatus {
    Normal,
    Warning,
    Critical,
}

/// Inclusive bands; the warning band sits inside the critical band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalThresholds {
    pub warning: (f64, f64),
    pub critical: (f64, f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_range_parsing() {
        assert_eq!(AgeRange::parse("19-30"), Some(AgeRange { min: 19, max: 30 }));
        assert_eq!(AgeRange::parse(" 0 - 18 "), Some(AgeRange { min: 0, max: 18 }));
        assert_eq!(AgeRange::parse("abc-30"), None);
        assert_eq!(AgeRange::parse("30"), None);
        assert_eq!(AgeRange::parse("50-20"), None);
        assert_eq!(AgeRange::parse(""), None);
    }

    #[test]
    fn test_age_range_bounds_are_inclusive() {
        let range = AgeRange::parse("31-50").unwrap();
        assert!(range.contains(31));
        assert!(range.contains(50));
        assert!(!range.contains(30));
        assert!(!range.contains(51));
        assert_eq!(range.to_string(), "31-50");
    }

    #[test]
    fn test_form_values_fail_soft() {
        let form = FilterForm {
            search: "priya".to_string(),
            gender: "Unknown".to_string(),
            blood_group: "ab+".to_string(),
            age_range: "19-30".to_string(),
            last_visit: "a week".to_string(),
        };

        let criteria = FilterCriteria::from(form);
        assert_eq!(criteria.text_query.as_deref(), Some("priya"));
        assert_eq!(criteria.gender, None);
        assert_eq!(criteria.blood_group, Some(BloodGroup::AbPositive));
        assert_eq!(criteria.age_range.as_deref(), Some("19-30"));
        assert_eq!(criteria.last_visit_within_days, None);
    }

    #[test]
    fn test_empty_form_produces_empty_criteria() {
        let criteria = FilterCriteria::from(FilterForm::default());
        assert!(criteria.is_empty());
        assert_eq!(criteria, FilterCriteria::default());
    }

    #[test]
    fn test_criteria_with_blank_query_is_empty() {
        assert!(FilterCriteria::new().with_text_query("").is_empty());
        assert!(!FilterCriteria::new().with_last_visit_within_days(0).is_empty());
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_vital_parameter_accepts_dashboard_names() {
        assert_eq!("heartRate".parse::<VitalParameter>().unwrap(), VitalParameter::HeartRate);
        assert_eq!("respiratory_rate".parse::<VitalParameter>().unwrap(), VitalParameter::RespiratoryRate);
        assert!("bloodPressure".parse::<VitalParameter>().is_err());
    }
}
