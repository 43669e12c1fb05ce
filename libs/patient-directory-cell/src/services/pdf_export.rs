use std::io::BufWriter;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use tracing::debug;

use shared_models::PatientRecord;

use crate::error::DirectoryError;
use crate::models::PdfLayoutOptions;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MAX_ROWS_PER_PAGE: usize = 38;

const MARGIN_X: f32 = 15.0;
const TOP_Y: f32 = 282.0;
const ROW_HEIGHT: f32 = 6.0;
const BULLET_STEP: f32 = 7.0;
const DETAIL_FLOOR_Y: f32 = 40.0;
const WRAP_CHARS: usize = 90;

pub const SUMMARY_HEADERS: [&str; 7] = ["Name", "Age", "Gender", "Blood Group", "Email", "Contact", "Address"];

/// Column widths in millimetres, matching `SUMMARY_HEADERS`.
const COLUMN_WIDTHS: [f32; 7] = [32.0, 10.0, 16.0, 20.0, 45.0, 28.0, 34.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// A single positioned run of text. Coordinates are millimetres from the
/// bottom-left corner of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfText {
    pub content: String,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub weight: FontWeight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    Summary { first_row: usize, row_count: usize },
    Detail { patient_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfPage {
    pub kind: PageKind,
    pub texts: Vec<PdfText>,
}

impl PdfPage {
    fn new(kind: PageKind) -> Self {
        Self {
            kind,
            texts: Vec::new(),
        }
    }

    fn text(&mut self, content: impl Into<String>, size: f32, x: f32, y: f32, weight: FontWeight) {
        self.texts.push(PdfText {
            content: content.into(),
            size,
            x,
            y,
            weight,
        });
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|t| t.content.contains(needle))
    }
}

/// The page structure of a patient export, independent of the PDF encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLayout {
    pub title: String,
    pub pages: Vec<PdfPage>,
}

impl PdfLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn summary_pages(&self) -> impl Iterator<Item = &PdfPage> {
        self.pages
            .iter()
            .filter(|p| matches!(p.kind, PageKind::Summary { .. }))
    }

    pub fn detail_pages(&self) -> impl Iterator<Item = &PdfPage> {
        self.pages
            .iter()
            .filter(|p| matches!(p.kind, PageKind::Detail { .. }))
    }
}

/// Lays out the summary table (one or more pages) followed by one detail
/// page per patient, in input order.
pub fn layout_pdf<'a, I>(patients: I, options: &PdfLayoutOptions) -> PdfLayout
where
    I: IntoIterator<Item = &'a PatientRecord>,
{
    let patients: Vec<&PatientRecord> = patients.into_iter().collect();
    let rows_per_page = options.rows_per_page.clamp(1, MAX_ROWS_PER_PAGE);

    let mut pages = Vec::new();

    if patients.is_empty() {
        pages.push(summary_page(&[], 0, options, true));
    } else {
        for (index, chunk) in patients.chunks(rows_per_page).enumerate() {
            pages.push(summary_page(chunk, index * rows_per_page, options, index == 0));
        }
    }

    pages.extend(patients.iter().map(|p| detail_page(p)));

    debug!(
        "Laid out PDF export: {} patients, {} pages",
        patients.len(),
        pages.len()
    );

    PdfLayout {
        title: options.title.clone(),
        pages,
    }
}

fn summary_page(
    rows: &[&PatientRecord],
    first_row: usize,
    options: &PdfLayoutOptions,
    is_first: bool,
) -> PdfPage {
    let mut page = PdfPage::new(PageKind::Summary {
        first_row,
        row_count: rows.len(),
    });
    let mut y = TOP_Y;

    if is_first {
        page.text(options.title.as_str(), 16.0, MARGIN_X, y, FontWeight::Bold);
        y -= 7.0;
        if let Some(generated_on) = &options.generated_on {
            page.text(format!("Generated on: {}", generated_on), 10.0, MARGIN_X, y, FontWeight::Regular);
        }
        y -= 10.0;
    }

    table_row(&mut page, &SUMMARY_HEADERS.map(str::to_string), y, FontWeight::Bold);
    y -= ROW_HEIGHT;

    for patient in rows {
        let cells = [
            patient.name.clone(),
            patient.age.to_string(),
            patient.gender.to_string(),
            patient.blood_group.to_string(),
            patient.email.clone(),
            patient.contact_number.clone(),
            patient.address.clone(),
        ];
        table_row(&mut page, &cells, y, FontWeight::Regular);
        y -= ROW_HEIGHT;
    }

    page
}

fn table_row(page: &mut PdfPage, cells: &[String; 7], y: f32, weight: FontWeight) {
    let mut x = MARGIN_X;
    for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
        page.text(fit_to_width(cell, width), 8.0, x, y, weight);
        x += width;
    }
}

fn detail_page(patient: &PatientRecord) -> PdfPage {
    let mut page = PdfPage::new(PageKind::Detail {
        patient_id: patient.id.clone(),
    });
    let mut y = TOP_Y;

    page.text(format!("Medical History - {}", patient.name), 14.0, MARGIN_X, y, FontWeight::Bold);
    y -= 10.0;
    page.text("Medical History:", 10.0, MARGIN_X, y, FontWeight::Regular);
    y -= BULLET_STEP;

    if patient.medical_history.is_empty() {
        page.text("- None recorded", 10.0, MARGIN_X + 5.0, y, FontWeight::Regular);
        y -= BULLET_STEP;
    }

    'history: for (index, condition) in patient.medical_history.iter().enumerate() {
        for (line_no, line) in wrap_text(condition, WRAP_CHARS).into_iter().enumerate() {
            if y < DETAIL_FLOOR_Y {
                // A condition cut mid-way is marked but not counted as remaining.
                let remaining = patient.medical_history.len() - index - usize::from(line_no > 0);
                let note = if remaining > 0 {
                    format!("... and {} more", remaining)
                } else {
                    "...".to_string()
                };
                page.text(note, 10.0, MARGIN_X + 5.0, y, FontWeight::Regular);
                y -= BULLET_STEP;
                break 'history;
            }
            let prefix = if line_no == 0 { "- " } else { "  " };
            page.text(format!("{}{}", prefix, line), 10.0, MARGIN_X + 5.0, y, FontWeight::Regular);
            y -= BULLET_STEP;
        }
    }

    y -= 5.0;
    page.text(format!("Last Visit: {}", patient.last_visit), 10.0, MARGIN_X, y, FontWeight::Regular);
    y -= BULLET_STEP;
    page.text(format!("Total Reports: {}", patient.report_count()), 10.0, MARGIN_X, y, FontWeight::Regular);

    page
}

/// Shortens `text` so that it fits a column of `width_mm` at 8pt.
fn fit_to_width(text: &str, width_mm: f32) -> String {
    let max_chars = ((width_mm - 2.0) / 1.6).max(3.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encodes a layout as a PDF document.
pub fn render_pdf(layout: &PdfLayout) -> Result<Vec<u8>, DirectoryError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        &layout.title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| DirectoryError::Pdf(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| DirectoryError::Pdf(format!("font error: {e}")))?;

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for text in &page.texts {
            let font: &IndirectFontRef = match text.weight {
                FontWeight::Regular => &regular,
                FontWeight::Bold => &bold,
            };
            layer.use_text(text.content.clone(), text.size, Mm(text.x), Mm(text.y), font);
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| DirectoryError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| DirectoryError::Pdf(format!("buffer error: {e}")))
}
