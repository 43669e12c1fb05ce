use chrono::NaiveDate;
use tracing::{debug, instrument, warn};

use shared_models::{BloodGroup, Gender, PatientRecord};

use crate::models::{AgeRange, FilterCriteria};

/// A FilterCriteria resolved against a reference date, ready to test records.
///
/// Resolution happens once per search so that a malformed age range is
/// reported a single time rather than once per record.
#[derive(Debug, Clone)]
pub struct PatientFilter {
    text_query: Option<String>,
    text_query_lower: Option<String>,
    gender: Option<Gender>,
    blood_group: Option<BloodGroup>,
    age_range: Option<AgeRange>,
    last_visit_within_days: Option<u32>,
    today: NaiveDate,
}

impl PatientFilter {
    pub fn new(criteria: &FilterCriteria, today: NaiveDate) -> Self {
        let age_range = criteria
            .age_range
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| {
                let parsed = AgeRange::parse(raw);
                if parsed.is_none() {
                    warn!("Ignoring malformed age range filter: {:?}", raw);
                }
                parsed
            });

        Self {
            text_query: criteria.active_text_query().map(str::to_string),
            text_query_lower: criteria.active_text_query().map(str::to_lowercase),
            gender: criteria.gender,
            blood_group: criteria.blood_group,
            age_range,
            last_visit_within_days: criteria.last_visit_within_days,
            today,
        }
    }

    pub fn matches(&self, patient: &PatientRecord) -> bool {
        self.matches_text(patient)
            && self.gender.map_or(true, |g| patient.gender == g)
            && self.blood_group.map_or(true, |b| patient.blood_group == b)
            && self.age_range.map_or(true, |r| r.contains(patient.age))
            && self.matches_last_visit(patient)
    }

    /// Records that satisfy every active constraint, in their original order.
    pub fn select<'a>(&'a self, patients: &'a [PatientRecord]) -> impl Iterator<Item = &'a PatientRecord> + 'a {
        patients.iter().filter(move |p| self.matches(p))
    }

    fn matches_text(&self, patient: &PatientRecord) -> bool {
        match (&self.text_query, &self.text_query_lower) {
            (Some(raw), Some(lower)) => {
                patient.name.to_lowercase().contains(lower.as_str())
                    || patient.email.to_lowercase().contains(lower.as_str())
                    || patient.contact_number.contains(raw.as_str())
            }
            _ => true,
        }
    }

    fn matches_last_visit(&self, patient: &PatientRecord) -> bool {
        let Some(window) = self.last_visit_within_days else {
            return true;
        };

        match patient.last_visit_date() {
            Some(visit) => (self.today - visit).num_days() <= i64::from(window),
            None => {
                debug!(
                    "Excluding patient {} from recency filter: unparsable last visit {:?}",
                    patient.id, patient.last_visit
                );
                false
            }
        }
    }
}

/// Applies `criteria` to `patients`, returning the matching records in their
/// original relative order. `today` anchors the last-visit window.
#[instrument(skip(patients), fields(total = patients.len()))]
pub fn filter_patients(
    patients: &[PatientRecord],
    criteria: &FilterCriteria,
    today: NaiveDate,
) -> Vec<PatientRecord> {
    if criteria.is_empty() {
        return patients.to_vec();
    }

    let filter = PatientFilter::new(criteria, today);
    let matched: Vec<PatientRecord> = filter.select(patients).cloned().collect();

    debug!("Filter matched {} of {} patients", matched.len(), patients.len());
    matched
}
