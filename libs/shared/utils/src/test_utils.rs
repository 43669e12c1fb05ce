use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{BloodGroup, Gender, MedicalReport, PatientRecord, ReportStatus};

pub struct TestConfig {
    pub patient_fixture_path: String,
    pub export_output_dir: String,
    pub rows_per_page: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            patient_fixture_path: "fixtures/patients.json".to_string(),
            export_output_dir: "target/test-exports".to_string(),
            rows_per_page: 25,
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            patient_fixture_path: self.patient_fixture_path.clone(),
            export_output_dir: self.export_output_dir.clone(),
            export_pdf_rows_per_page: self.rows_per_page,
            ..AppConfig::default()
        }
    }
}

/// Builder for patient records used across cell tests.
pub struct TestPatient {
    record: PatientRecord,
}

impl Default for TestPatient {
    fn default() -> Self {
        Self {
            record: PatientRecord {
                id: Uuid::new_v4().to_string(),
                name: "Test Patient".to_string(),
                age: 40,
                gender: Gender::Other,
                blood_group: BloodGroup::OPositive,
                contact_number: "+91 0000000000".to_string(),
                email: "test.patient@example.com".to_string(),
                address: "1 Test Street".to_string(),
                medical_history: Vec::new(),
                last_visit: "2024-12-01".to_string(),
                medical_reports: Vec::new(),
            },
        }
    }
}

impl TestPatient {
    pub fn new(name: &str) -> Self {
        let mut patient = Self::default();
        patient.record.name = name.to_string();
        patient.record.email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        patient
    }

    pub fn id(mut self, id: &str) -> Self {
        self.record.id = id.to_string();
        self
    }

    pub fn age(mut self, age: u32) -> Self {
        self.record.age = age;
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.record.gender = gender;
        self
    }

    pub fn blood_group(mut self, blood_group: BloodGroup) -> Self {
        self.record.blood_group = blood_group;
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        self.record.email = email.to_string();
        self
    }

    pub fn contact(mut self, contact: &str) -> Self {
        self.record.contact_number = contact.to_string();
        self
    }

    pub fn address(mut self, address: &str) -> Self {
        self.record.address = address.to_string();
        self
    }

    pub fn history(mut self, conditions: &[&str]) -> Self {
        self.record.medical_history = conditions.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn last_visit(mut self, date: &str) -> Self {
        self.record.last_visit = date.to_string();
        self
    }

    pub fn report(mut self, title: &str, status: ReportStatus) -> Self {
        self.record.medical_reports.push(MedicalReport {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            report_type: "General Health".to_string(),
            date: "2024-01-15".to_string(),
            doctor: "Dr. Sarah Johnson".to_string(),
            hospital: None,
            findings: None,
            recommendations: None,
            summary: format!("{} summary", title),
            file_url: None,
            status,
        });
        self
    }

    pub fn build(self) -> PatientRecord {
        self.record
    }
}

/// The two-patient roster used by the directory scenarios.
pub fn scenario_patients() -> Vec<PatientRecord> {
    vec![
        TestPatient::new("Rajesh Kumar")
            .id("p-rajesh")
            .age(45)
            .gender(Gender::Male)
            .blood_group(BloodGroup::OPositive)
            .contact("+91 9876543210")
            .email("rajesh.kumar@email.com")
            .address("123 Gandhi Road, Mumbai")
            .history(&["Hypertension", "Type 2 Diabetes"])
            .last_visit("2024-12-01")
            .report("Annual Health Checkup", ReportStatus::Completed)
            .report("Blood Test Results", ReportStatus::Completed)
            .build(),
        TestPatient::new("Priya Sharma")
            .id("p-priya")
            .age(32)
            .gender(Gender::Female)
            .blood_group(BloodGroup::APositive)
            .contact("+91 9876543211")
            .email("priya.sharma@email.com")
            .address("456 Nehru Street, Delhi")
            .history(&["Asthma"])
            .last_visit("2024-11-15")
            .report("MRI Scan", ReportStatus::Pending)
            .build(),
    ]
}

/// A larger roster covering every gender, several blood groups and ages.
pub fn roster_patients() -> Vec<PatientRecord> {
    let mut patients = scenario_patients();
    patients.extend([
        TestPatient::new("Amit Patel")
            .id("p-amit")
            .age(28)
            .gender(Gender::Male)
            .blood_group(BloodGroup::BPositive)
            .contact("+91 9876543212")
            .history(&["Migraine"])
            .last_visit("2024-12-04")
            .build(),
        TestPatient::new("Sneha Reddy")
            .id("p-sneha")
            .age(17)
            .gender(Gender::Female)
            .blood_group(BloodGroup::AbNegative)
            .contact("+91 9876543213")
            .last_visit("2024-06-30")
            .build(),
        TestPatient::new("Kiran \"KJ\" Joshi")
            .id("p-kiran")
            .age(71)
            .gender(Gender::Other)
            .blood_group(BloodGroup::ONegative)
            .contact("+91 9876543214")
            .address("9 Lake View, Pune, MH")
            .history(&["Arthritis", "Cataract"])
            .last_visit("not recorded")
            .build(),
    ]);
    patients
}

pub fn scenario_fixture_json() -> serde_json::Value {
    json!([
        {
            "id": "p-rajesh",
            "name": "Rajesh Kumar",
            "age": 45,
            "gender": "Male",
            "bloodGroup": "O+",
            "contactNumber": "+91 9876543210",
            "email": "rajesh.kumar@email.com",
            "address": "123 Gandhi Road, Mumbai",
            "medicalHistory": ["Hypertension", "Type 2 Diabetes"],
            "lastVisit": "2024-12-01",
            "medicalReports": []
        },
        {
            "name": "Priya Sharma",
            "age": 32,
            "gender": "Female",
            "bloodGroup": "A+",
            "contactNumber": "+91 9876543211",
            "email": "priya.sharma@email.com",
            "address": "456 Nehru Street, Delhi",
            "medicalHistory": ["Asthma"],
            "lastVisit": "2024-11-15"
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default().to_app_config();

        assert!(config.is_configured());
        assert_eq!(config.export_pdf_rows_per_page, 25);
    }

    #[test]
    fn test_patient_builder() {
        let patient = TestPatient::new("Jane Roe")
            .age(51)
            .gender(Gender::Female)
            .report("ECG Report", ReportStatus::Pending)
            .build();

        assert_eq!(patient.email, "jane.roe@example.com");
        assert_eq!(patient.age, 51);
        assert_eq!(patient.report_count(), 1);
        assert_matches!(patient.pending_reports().next(), Some(r) if r.title == "ECG Report");
    }

    #[test]
    fn test_fixture_json_matches_scenario_roster() {
        let parsed: Vec<PatientRecord> = serde_json::from_value(scenario_fixture_json()).unwrap();
        let expected = scenario_patients();

        assert_eq!(parsed.len(), expected.len());
        for (a, b) in parsed.iter().zip(expected.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.last_visit, b.last_visit);
        }
        assert!(parsed[1].id.is_empty());
    }
}
