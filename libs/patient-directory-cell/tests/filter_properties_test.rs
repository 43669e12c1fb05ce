use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use patient_directory_cell::{filter_patients, layout_pdf, render_csv, FilterCriteria, PdfLayoutOptions};
use shared_models::{BloodGroup, Gender, PatientRecord};
use shared_utils::test_utils::TestPatient;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 5).unwrap()
}

fn gender_strategy() -> impl Strategy<Value = Gender> {
    prop::sample::select(Gender::ALL.to_vec())
}

fn blood_group_strategy() -> impl Strategy<Value = BloodGroup> {
    prop::sample::select(BloodGroup::ALL.to_vec())
}

fn last_visit_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (0i64..400).prop_map(|days_ago| (today() - Duration::days(days_ago)).format("%Y-%m-%d").to_string()),
        1 => Just("unknown".to_string()),
    ]
}

prop_compose! {
    fn patient_strategy()(
        index in 0u32..10_000,
        first in prop::sample::select(vec!["Asha", "Vikram", "Meera", "Rohan", "Li \"Lee\""]),
        age in 0u32..100,
        gender in gender_strategy(),
        blood_group in blood_group_strategy(),
        last_visit in last_visit_strategy(),
        history in prop::collection::vec("[A-Za-z ,]{1,12}", 0..3),
    ) -> PatientRecord {
        let refs: Vec<&str> = history.iter().map(String::as_str).collect();
        TestPatient::new(&format!("{} {}", first, index))
            .id(&format!("p-{}", index))
            .age(age)
            .gender(gender)
            .blood_group(blood_group)
            .contact(&format!("+91 98{:08}", index))
            .history(&refs)
            .last_visit(&last_visit)
            .build()
    }
}

prop_compose! {
    fn criteria_strategy()(
        text_query in prop::option::of(prop::sample::select(vec!["asha", "MEERA", "98000", "@example", "zzz"])),
        gender in prop::option::of(gender_strategy()),
        blood_group in prop::option::of(blood_group_strategy()),
        age_range in prop::option::of(prop::sample::select(vec!["0-18", "19-30", "31-50", "51-70", "71-100", "bad"])),
        last_visit_within_days in prop::option::of(prop::sample::select(vec![7u32, 30, 90, 180, 365])),
    ) -> FilterCriteria {
        FilterCriteria {
            text_query: text_query.map(str::to_string),
            gender,
            blood_group,
            age_range: age_range.map(str::to_string),
            last_visit_within_days,
        }
    }
}

fn renumbered(mut patients: Vec<PatientRecord>) -> Vec<PatientRecord> {
    for (index, patient) in patients.iter_mut().enumerate() {
        patient.id = format!("p-{}", index);
    }
    patients
}

fn ids(patients: &[PatientRecord]) -> Vec<String> {
    patients.iter().map(|p| p.id.clone()).collect()
}

/// Splits criteria into two halves with disjoint active fields.
fn split(criteria: &FilterCriteria) -> (FilterCriteria, FilterCriteria) {
    let first = FilterCriteria {
        text_query: criteria.text_query.clone(),
        gender: criteria.gender,
        age_range: criteria.age_range.clone(),
        ..FilterCriteria::default()
    };
    let second = FilterCriteria {
        blood_group: criteria.blood_group,
        last_visit_within_days: criteria.last_visit_within_days,
        ..FilterCriteria::default()
    };
    (first, second)
}

proptest! {
    #[test]
    fn empty_criteria_is_identity(patients in prop::collection::vec(patient_strategy(), 0..20)) {
        prop_assert_eq!(filter_patients(&patients, &FilterCriteria::default(), today()), patients);
    }

    #[test]
    fn filtering_is_idempotent(
        patients in prop::collection::vec(patient_strategy(), 0..20),
        criteria in criteria_strategy(),
    ) {
        let once = filter_patients(&patients, &criteria, today());
        let twice = filter_patients(&once, &criteria, today());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn result_is_ordered_subsequence(
        patients in prop::collection::vec(patient_strategy(), 0..20),
        criteria in criteria_strategy(),
    ) {
        let result = filter_patients(&patients, &criteria, today());
        let mut source = patients.iter();
        for kept in &result {
            prop_assert!(source.any(|p| p == kept));
        }
    }

    #[test]
    fn conjunction_is_intersection(
        patients in prop::collection::vec(patient_strategy(), 0..20),
        criteria in criteria_strategy(),
    ) {
        let patients = renumbered(patients);
        let (first, second) = split(&criteria);
        let both = ids(&filter_patients(&patients, &criteria, today()));
        let a = ids(&filter_patients(&patients, &first, today()));
        let b = ids(&filter_patients(&patients, &second, today()));

        let intersection: Vec<String> = ids(&patients)
            .into_iter()
            .filter(|id| a.contains(id) && b.contains(id))
            .collect();
        prop_assert_eq!(both, intersection);
    }

    #[test]
    fn csv_has_one_row_per_patient(patients in prop::collection::vec(patient_strategy(), 0..20)) {
        let output = render_csv(&patients).unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(output.as_bytes());
        let rows = reader.records().collect::<Result<Vec<_>, _>>().unwrap();
        prop_assert_eq!(rows.len(), patients.len() + 1);
        for (row, patient) in rows.iter().skip(1).zip(&patients) {
            prop_assert_eq!(&row[0], patient.name.as_str());
            prop_assert_eq!(&row[8], patient.last_visit.as_str());
        }
    }

    #[test]
    fn pdf_has_detail_page_per_patient(patients in prop::collection::vec(patient_strategy(), 0..60)) {
        let layout = layout_pdf(&patients, &PdfLayoutOptions::default());
        prop_assert!(layout.summary_pages().count() >= 1);
        prop_assert_eq!(layout.detail_pages().count(), patients.len());
        prop_assert!(layout.page_count() >= 1 + patients.len());
    }
}
