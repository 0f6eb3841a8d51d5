pub mod pdf;

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::domain::Incident;
use crate::error::AppError;
use crate::normalize::dates::{format_display, format_display_opt, format_file_date};
use pdf::{write_document, Font, PdfInfo, PdfPage, Rgb, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

pub const ORGANIZATION: &str = "InfraTech S.A";
pub const DESCRIPTION_MAX_LINES: usize = 6;
pub const RESOLUTION_MAX_LINES: usize = 8;

const PRIMARY: Rgb = Rgb(26, 115, 232);
const TEXT: Rgb = Rgb(51, 51, 51);
const FOOTER: Rgb = Rgb(100, 100, 100);

const MARGIN_MM: f32 = 20.0;
const TEXT_BLOCK_WIDTH_MM: f32 = 170.0;
const BODY_SIZE: f32 = 9.0;
const LINE_STEP_MM: f32 = 5.0;
const ROW_STEP_MM: f32 = 8.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabeledField {
    pub label: String,
    pub value: String,
}

fn field(label: &str, value: impl Into<String>) -> LabeledField {
    LabeledField {
        label: label.to_string(),
        value: value.into(),
    }
}

/// Text of an incident report, already wrapped and truncated, independent of PDF output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportContent {
    pub left_fields: Vec<LabeledField>,
    pub right_fields: Vec<LabeledField>,
    pub title_lines: Vec<String>,
    pub description_lines: Vec<String>,
    /// `None` when the incident has no resolution; the section is then omitted.
    pub resolution_lines: Option<Vec<String>>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

fn or_default(v: &str, default: &str) -> String {
    if v.trim().is_empty() {
        default.to_string()
    } else {
        v.to_string()
    }
}

/// Greedy word wrap so that each line fits in `max_width_mm` at `size` points.
///
/// Explicit newlines start a new line; words wider than the block are split by character.
pub fn wrap_text(text: &str, size: f32, max_width_mm: f32) -> Vec<String> {
    let fits = |s: &str| pdf::text_width_mm(s, size) <= max_width_mm;
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if fits(&candidate) {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for c in word.chars() {
                current.push(c);
                if !fits(&current) && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

pub fn report_file_name(
    incident: &Incident,
    generated_at: OffsetDateTime,
) -> Result<String, AppError> {
    Ok(format!(
        "Informe_Incidente_{}_{}.pdf",
        incident.id,
        format_file_date(generated_at)?
    ))
}

pub fn build_report_content(incident: &Incident, generated_at: OffsetDateTime) -> ReportContent {
    let left_fields = vec![
        field("ID:", format!("#{}", incident.id)),
        field("Estado:", or_default(&incident.status, "N/A")),
        field("Prioridad:", or_default(&incident.priority, "N/A")),
        field(
            "Responsable:",
            incident
                .assigned_to
                .clone()
                .unwrap_or_else(|| "Sin asignar".to_string()),
        ),
        field("Fecha Creación:", format_display(incident.created_at)),
    ];
    let right_fields = vec![
        field("Categoría:", or_default(&incident.category, "N/A")),
        field("Fecha Apertura:", format_display_opt(incident.opening_time)),
        field("Fecha Cierre:", format_display_opt(incident.closing_time)),
        field("Fecha Informe:", format_display(generated_at)),
    ];

    let title_lines = wrap_text(
        &or_default(&incident.title, "Sin título"),
        BODY_SIZE,
        TEXT_BLOCK_WIDTH_MM,
    );
    let mut description_lines = wrap_text(
        &or_default(&incident.description, "Sin descripción"),
        BODY_SIZE,
        TEXT_BLOCK_WIDTH_MM,
    );
    description_lines.truncate(DESCRIPTION_MAX_LINES);

    let resolution_lines = incident
        .resolution
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .map(|r| {
            let mut lines = wrap_text(r, BODY_SIZE, TEXT_BLOCK_WIDTH_MM);
            lines.truncate(RESOLUTION_MAX_LINES);
            lines
        });

    ReportContent {
        left_fields,
        right_fields,
        title_lines,
        description_lines,
        resolution_lines,
        footer: format!("Generado el {}", format_display(generated_at)),
    }
}

fn draw_block(page: &mut PdfPage, y: &mut f32, heading: &str, lines: &[String]) {
    page.text(MARGIN_MM, *y, Font::Bold, 10.0, TEXT, heading);
    *y += LINE_STEP_MM;
    for (i, line) in lines.iter().enumerate() {
        page.text(
            MARGIN_MM,
            *y + i as f32 * LINE_STEP_MM,
            Font::Regular,
            BODY_SIZE,
            TEXT,
            line,
        );
    }
    *y += lines.len() as f32 * LINE_STEP_MM + 8.0;
}

fn layout_page(content: &ReportContent) -> PdfPage {
    let center = PAGE_WIDTH_MM / 2.0;
    let mut page = PdfPage::new();

    page.fill_rect(0.0, 0.0, PAGE_WIDTH_MM, 25.0, PRIMARY);
    page.text_centered(center, 12.0, Font::Bold, 18.0, Rgb::WHITE, "INFORME DE INCIDENTE");
    page.text_centered(center, 20.0, Font::Regular, 10.0, Rgb::WHITE, ORGANIZATION);

    page.text(MARGIN_MM, 35.0, Font::Bold, 12.0, TEXT, "INFORMACIÓN DEL INCIDENTE");

    for (column, (label_x, value_x)) in [
        (&content.left_fields, (MARGIN_MM, 55.0)),
        (&content.right_fields, (110.0, 145.0)),
    ] {
        for (i, f) in column.iter().enumerate() {
            let row_y = 43.0 + i as f32 * ROW_STEP_MM;
            page.text(label_x, row_y, Font::Bold, BODY_SIZE, TEXT, &f.label);
            page.text(value_x, row_y, Font::Regular, BODY_SIZE, TEXT, &f.value);
        }
    }

    let mut y = 85.0;
    draw_block(&mut page, &mut y, "TÍTULO:", &content.title_lines);
    draw_block(&mut page, &mut y, "DESCRIPCIÓN:", &content.description_lines);
    if let Some(lines) = &content.resolution_lines {
        draw_block(&mut page, &mut y, "RESOLUCIÓN/COMENTARIOS:", lines);
    }

    page.text_centered(
        center,
        PAGE_HEIGHT_MM - 17.0,
        Font::Regular,
        8.0,
        FOOTER,
        &content.footer,
    );
    page
}

/// Render the one-page PDF report for `incident`.
pub fn render_incident_report(
    incident: &Incident,
    generated_at: OffsetDateTime,
) -> Result<IncidentReport, AppError> {
    let file_name = report_file_name(incident, generated_at)?;
    let content = build_report_content(incident, generated_at);
    let page = layout_page(&content);

    let utc = generated_at.to_offset(UtcOffset::UTC);
    let stamp = utc
        .format(format_description!("[year][month][day][hour][minute][second]"))
        .map_err(|e| {
            AppError::new("REPORT_PDF_FAILED", "Error al generar el informe PDF")
                .with_details(e.to_string())
        })?;
    let info = PdfInfo {
        title: format!("Informe de incidente #{}", incident.id),
        producer: ORGANIZATION.to_string(),
        creation_date: format!("D:{stamp}Z"),
    };

    Ok(IncidentReport {
        file_name,
        bytes: write_document(&page, &info),
    })
}
