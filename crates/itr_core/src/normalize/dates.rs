use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, UtcOffset};

use crate::error::AppError;

pub const UNSPECIFIED_DATE: &str = "No especificado";

/// Parse a date-only form input (`YYYY-MM-DD`).
pub fn parse_date_input(field: &str, raw: &str) -> Result<Date, AppError> {
    let trimmed = raw.trim();
    Date::parse(trimmed, format_description!("[year]-[month]-[day]")).map_err(|e| {
        AppError::new(
            "VALIDATION_INVALID_DATE",
            format!("Fecha inválida para {field}; use AAAA-MM-DD"),
        )
        .with_details(format!("value={trimmed}; err={e}"))
    })
}

/// `dd-mm-yyyy HH:MM` in UTC, the format used on screen and in reports.
pub fn format_display(dt: OffsetDateTime) -> String {
    dt.to_offset(UtcOffset::UTC)
        .format(format_description!("[day]-[month]-[year] [hour]:[minute]"))
        .unwrap_or_else(|_| "Fecha inválida".to_string())
}

pub fn format_display_opt(dt: Option<OffsetDateTime>) -> String {
    match dt {
        Some(dt) => format_display(dt),
        None => UNSPECIFIED_DATE.to_string(),
    }
}

/// `YYYYMMDD` of the UTC calendar date, used in generated file names.
pub fn format_file_date(dt: OffsetDateTime) -> Result<String, AppError> {
    dt.to_offset(UtcOffset::UTC)
        .format(format_description!("[year][month][day]"))
        .map_err(|e| {
            AppError::new("REPORT_PDF_FAILED", "Failed to format report date")
                .with_details(e.to_string())
        })
}

pub fn month_name_es(month: Month) -> &'static str {
    match month {
        Month::January => "Enero",
        Month::February => "Febrero",
        Month::March => "Marzo",
        Month::April => "Abril",
        Month::May => "Mayo",
        Month::June => "Junio",
        Month::July => "Julio",
        Month::August => "Agosto",
        Month::September => "Septiembre",
        Month::October => "Octubre",
        Month::November => "Noviembre",
        Month::December => "Diciembre",
    }
}
