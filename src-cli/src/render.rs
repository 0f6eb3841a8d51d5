//! Plain-text views for the terminal. Everything here is pure so it can be tested without a
//! backend.

use std::fmt::Write as _;

use itr_core::analytics::{CountBucket, Dashboard};
use itr_core::classify::is_stale;
use itr_core::domain::Incident;
use itr_core::normalize::dates::{format_display, format_display_opt};
use itr_core::session::User;
use time::OffsetDateTime;

/// Marker shown next to incidents that have been open for more than 48 hours.
pub const STALE_MARKER: &str = "+48h";

const TITLE_WIDTH: usize = 32;

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn incident_row(incident: &Incident, now: OffsetDateTime) -> String {
    let marker = if is_stale(incident, now) { STALE_MARKER } else { "" };
    format!(
        "{:>5}  {:<4}  {:<width$}  {:<12}  {:<8}  {:<11}  {}",
        format!("#{}", incident.id),
        marker,
        clip(&incident.title, TITLE_WIDTH),
        clip(&incident.category, 12),
        clip(&incident.priority, 8),
        incident.status,
        format_display(incident.created_at),
        width = TITLE_WIDTH,
    )
}

pub fn incident_table(incidents: &[Incident], now: OffsetDateTime) -> String {
    if incidents.is_empty() {
        return "No hay incidentes que mostrar.\n".to_string();
    }
    let mut out = format!(
        "{:>5}  {:<4}  {:<width$}  {:<12}  {:<8}  {:<11}  {}\n",
        "ID",
        "",
        "Título",
        "Categoría",
        "Prioridad",
        "Estado",
        "Creado",
        width = TITLE_WIDTH,
    );
    for incident in incidents {
        out.push_str(&incident_row(incident, now));
        out.push('\n');
    }
    let _ = writeln!(out, "{} incidente(s)", incidents.len());
    out
}

pub fn incident_detail(incident: &Incident, now: OffsetDateTime) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Incidente #{}: {}", incident.id, incident.title);
    if is_stale(incident, now) {
        let _ = writeln!(out, "Abierto hace más de 48 horas");
    }
    let rows = [
        ("Estado", incident.status.clone()),
        ("Prioridad", incident.priority.clone()),
        ("Categoría", incident.category.clone()),
        (
            "Responsable",
            incident
                .assigned_to
                .clone()
                .unwrap_or_else(|| "Sin asignar".to_string()),
        ),
        ("Creado", format_display(incident.created_at)),
        ("Apertura", format_display_opt(incident.opening_time)),
        ("Cierre", format_display_opt(incident.closing_time)),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "  {label:<12} {value}");
    }
    let _ = writeln!(out, "\n{}", incident.description);
    if let Some(resolution) = &incident.resolution {
        let _ = writeln!(out, "\nResolución: {resolution}");
    }
    out
}

fn bucket_lines(out: &mut String, heading: &str, buckets: &[CountBucket]) {
    let _ = writeln!(out, "{heading}");
    if buckets.is_empty() {
        let _ = writeln!(out, "  (sin datos)");
    }
    for b in buckets {
        let _ = writeln!(out, "  {:<16} {:>4}", b.label, b.count);
    }
}

pub fn dashboard_text(dashboard: &Dashboard) -> String {
    let c = &dashboard.counters;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Total: {}  Resueltos: {}  Abiertos: {}  En progreso: {}",
        c.total, c.resolved, c.open, c.in_progress
    );
    out.push('\n');
    bucket_lines(&mut out, "Distribución por Categoría", &dashboard.by_category);
    out.push('\n');
    bucket_lines(&mut out, "Incidentes por Mes", &dashboard.by_month);
    out.push('\n');
    let _ = writeln!(
        out,
        "Estado de Resolución\n  {:<16} {:>4}\n  {:<16} {:>4}",
        "Resueltos", dashboard.resolution.resolved, "No Resueltos", dashboard.resolution.unresolved
    );
    out
}

pub fn user_line(user: Option<&User>) -> String {
    match user {
        Some(u) => format!("{} <{}> (id {})", u.name, u.email, u.id),
        None => "Sin sesión iniciada".to_string(),
    }
}
