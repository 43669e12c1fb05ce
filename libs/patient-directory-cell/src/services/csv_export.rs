use csv::{QuoteStyle, Terminator, WriterBuilder};

use shared_models::PatientRecord;

use crate::error::DirectoryError;

pub const CSV_HEADERS: [&str; 9] = [
    "Name",
    "Age",
    "Gender",
    "Blood Group",
    "Email",
    "Contact",
    "Address",
    "Medical History",
    "Last Visit",
];

pub const MEDICAL_HISTORY_SEPARATOR: &str = "; ";

/// Renders patients as CSV: a bare header line, then one `\n`-terminated
/// row per patient with every field double-quoted (embedded quotes doubled).
pub fn render_csv<'a, I>(patients: I) -> Result<String, DirectoryError>
where
    I: IntoIterator<Item = &'a PatientRecord>,
{
    let mut header = CSV_HEADERS.join(",").into_bytes();
    header.push(b'\n');

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(header);

    for patient in patients {
        let age = patient.age.to_string();
        let history = patient.medical_history.join(MEDICAL_HISTORY_SEPARATOR);
        writer.write_record([
            patient.name.as_str(),
            age.as_str(),
            patient.gender.as_str(),
            patient.blood_group.as_str(),
            patient.email.as_str(),
            patient.contact_number.as_str(),
            patient.address.as_str(),
            history.as_str(),
            patient.last_visit.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DirectoryError::Csv(e.into_error().into()))?;

    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_utils::test_utils::{roster_patients, scenario_patients};

    const HEADER_ROW: &str = "Name,Age,Gender,Blood Group,Email,Contact,Address,Medical History,Last Visit\n";

    #[test]
    fn test_empty_export_is_header_only() {
        let csv = render_csv(&Vec::<PatientRecord>::new()).unwrap();
        assert_eq!(csv, HEADER_ROW);
    }

    #[test]
    fn test_row_layout_is_exact() {
        let patients = scenario_patients();
        let csv = render_csv(&patients[..1]).unwrap();

        let expected = format!(
            "{}{}",
            HEADER_ROW,
            "\"Rajesh Kumar\",\"45\",\"Male\",\"O+\",\"rajesh.kumar@email.com\",\"+91 9876543210\",\
             \"123 Gandhi Road, Mumbai\",\"Hypertension; Type 2 Diabetes\",\"2024-12-01\"\n"
        );
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let patients = roster_patients();
        let kiran: Vec<_> = patients.iter().filter(|p| p.id == "p-kiran").collect();
        let csv = render_csv(kiran).unwrap();

        assert!(csv.contains("\"Kiran \"\"KJ\"\" Joshi\""));
        assert!(csv.ends_with("\"not recorded\"\n"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let patients = roster_patients();
        assert_eq!(render_csv(&patients).unwrap(), render_csv(&patients).unwrap());
    }
}
