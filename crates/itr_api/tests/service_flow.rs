use std::cell::RefCell;

use itr_api::service::{check_connection, ConnectionStatus, IncidentService};
use itr_api::store::IncidentStore;
use itr_core::board::RefreshOutcome;
use itr_core::domain::{Incident, STATUS_CLOSED, STATUS_OPEN};
use itr_core::draft::{CreatedAtChoice, IncidentDraft};
use itr_core::error::AppError;
use itr_core::sort::SortMode;
use pretty_assertions::assert_eq;
use time::macros::{date, datetime};
use time::OffsetDateTime;

const NOW: OffsetDateTime = datetime!(2026-05-20 10:00 UTC);

#[derive(Default)]
struct MemoryStore {
    rows: RefCell<Vec<Incident>>,
    next_id: RefCell<i64>,
}

impl IncidentStore for MemoryStore {
    fn list(&self) -> Result<Vec<Incident>, AppError> {
        Ok(self.rows.borrow().clone())
    }

    fn list_by_status(&self, status: &str) -> Result<Vec<Incident>, AppError> {
        Ok(self.list()?.into_iter().filter(|i| i.status == status).collect())
    }

    fn list_by_priority(&self, priority: &str) -> Result<Vec<Incident>, AppError> {
        Ok(self.list()?.into_iter().filter(|i| i.priority == priority).collect())
    }

    fn get(&self, id: i64) -> Result<Incident, AppError> {
        self.rows
            .borrow()
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| AppError::incident_not_found(id))
    }

    fn create(&self, incident: &Incident) -> Result<Incident, AppError> {
        let mut next = self.next_id.borrow_mut();
        *next += 1;
        let mut stored = incident.clone();
        stored.id = *next;
        self.rows.borrow_mut().push(stored.clone());
        Ok(stored)
    }

    fn update(&self, incident: &Incident) -> Result<Incident, AppError> {
        let mut rows = self.rows.borrow_mut();
        let slot = rows
            .iter_mut()
            .find(|i| i.id == incident.id)
            .ok_or_else(|| AppError::incident_not_found(incident.id))?;
        *slot = incident.clone();
        Ok(slot.clone())
    }

    fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|i| i.id != id);
        if rows.len() == before {
            return Err(AppError::incident_not_found(id));
        }
        Ok(())
    }
}

struct DownStore;

impl IncidentStore for DownStore {
    fn list(&self) -> Result<Vec<Incident>, AppError> {
        Err(
            AppError::new("API_UNREACHABLE", "No se pudo conectar con el servidor")
                .with_retryable(true),
        )
    }
    fn list_by_status(&self, _status: &str) -> Result<Vec<Incident>, AppError> {
        self.list()
    }
    fn list_by_priority(&self, _priority: &str) -> Result<Vec<Incident>, AppError> {
        self.list()
    }
    fn get(&self, _id: i64) -> Result<Incident, AppError> {
        Err(self.list().unwrap_err())
    }
    fn create(&self, _incident: &Incident) -> Result<Incident, AppError> {
        Err(self.list().unwrap_err())
    }
    fn update(&self, _incident: &Incident) -> Result<Incident, AppError> {
        Err(self.list().unwrap_err())
    }
    fn delete(&self, _id: i64) -> Result<(), AppError> {
        Err(self.list().unwrap_err())
    }
}

fn draft(title: &str, on: CreatedAtChoice) -> IncidentDraft {
    IncidentDraft {
        title: title.to_string(),
        description: "Detalle del problema".to_string(),
        category: "Red".to_string(),
        priority: "Media".to_string(),
        created_at: on,
    }
}

fn view_titles<S: IncidentStore>(svc: &IncidentService<S>) -> Vec<String> {
    svc.board().view().iter().map(|i| i.title.clone()).collect()
}

#[test]
fn submitted_draft_gets_first_id_and_lands_among_peers() {
    let mut svc = IncidentService::new(MemoryStore::default());

    let created = svc
        .submit_draft(draft("Nuevo", CreatedAtChoice::Now), NOW)
        .expect("submit");
    assert_eq!(created.id, 1);
    assert_eq!(created.status, STATUS_OPEN);
    assert_eq!(created.opening_time, Some(NOW));

    svc.submit_draft(draft("Antiguo", CreatedAtChoice::OnDate(date!(2026-05-10))), NOW)
        .expect("submit older");
    svc.submit_draft(draft("Reciente", CreatedAtChoice::OnDate(date!(2026-05-19))), NOW)
        .expect("submit recent");

    // Priority view: stale "Antiguo" first, then fresh ones newest first.
    assert_eq!(view_titles(&svc), vec!["Antiguo", "Nuevo", "Reciente"]);

    svc.board_mut().set_sort_mode(SortMode::Id, NOW);
    let ids: Vec<i64> = svc.board().view().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn invalid_draft_never_reaches_store() {
    let mut svc = IncidentService::new(MemoryStore::default());
    let mut bad = draft("", CreatedAtChoice::Now);
    bad.priority = " ".to_string();

    let err = svc.submit_draft(bad, NOW).unwrap_err();
    assert_eq!(err.code, "VALIDATION_REQUIRED_FIELD");
    assert!(svc.store().list().expect("list").is_empty());
}

#[test]
fn status_edits_round_trip_through_store() {
    let mut svc = IncidentService::new(MemoryStore::default());
    let created = svc
        .submit_draft(draft("Caída de red", CreatedAtChoice::Now), NOW)
        .expect("submit");

    let later = NOW + time::Duration::hours(3);
    let closed = svc
        .update_status(created.id, STATUS_CLOSED, later)
        .expect("close");
    assert_eq!(closed.closing_time, Some(later));
    assert_eq!(svc.board().incidents()[0].closing_time, Some(later));

    let reopened = svc
        .update_status(created.id, STATUS_OPEN, later)
        .expect("reopen");
    assert_eq!(reopened.closing_time, None);
    assert_eq!(svc.store().get(created.id).expect("get").closing_time, None);
}

#[test]
fn assign_and_resolve_are_saved() {
    let mut svc = IncidentService::new(MemoryStore::default());
    let created = svc
        .submit_draft(draft("Impresora", CreatedAtChoice::Now), NOW)
        .expect("submit");

    svc.assign(created.id, Some("Carlos Sánchez"), NOW)
        .expect("assign");
    svc.resolve(created.id, Some("  Cambio de tóner  "), NOW)
        .expect("resolve");

    let stored = svc.store().get(created.id).expect("get");
    assert_eq!(stored.assigned_to.as_deref(), Some("Carlos Sánchez"));
    assert_eq!(stored.resolution.as_deref(), Some("Cambio de tóner"));

    let err = svc.assign(created.id, Some("Desconocido"), NOW).unwrap_err();
    assert_eq!(err.code, "VALIDATION_UNKNOWN_TECHNICIAN");
}

#[test]
fn detail_navigation_forces_id_order_and_reports_missing() {
    let mut svc = IncidentService::new(MemoryStore::default());
    svc.submit_draft(draft("Uno", CreatedAtChoice::Now), NOW)
        .expect("submit");

    let inc = svc.load_detail(1, NOW).expect("detail");
    assert_eq!(inc.title, "Uno");
    assert_eq!(svc.board().sort_mode(), SortMode::Id);

    let err = svc.load_detail(77, NOW).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn delete_refreshes_the_board() {
    let mut svc = IncidentService::new(MemoryStore::default());
    svc.submit_draft(draft("Uno", CreatedAtChoice::Now), NOW)
        .expect("submit");
    svc.submit_draft(draft("Dos", CreatedAtChoice::Now), NOW)
        .expect("submit");

    svc.delete(1, NOW).expect("delete");
    assert_eq!(svc.board().available_ids(), vec![2]);
    assert!(svc.delete(1, NOW).unwrap_err().is_not_found());
}

#[test]
fn refresh_reports_applied_count() {
    let mut svc = IncidentService::new(MemoryStore::default());
    assert_eq!(
        svc.refresh(NOW).expect("refresh"),
        RefreshOutcome::Applied { count: 0 }
    );
}

#[test]
fn export_report_writes_named_pdf() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut svc = IncidentService::new(MemoryStore::default());
    svc.submit_draft(draft("Servidor", CreatedAtChoice::Now), NOW)
        .expect("submit");

    let path = svc
        .export_report(1, &dir.path().join("informes"), NOW)
        .expect("export");
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("Informe_Incidente_1_20260520.pdf")
    );
    let bytes = std::fs::read(&path).expect("read");
    assert!(bytes.starts_with(b"%PDF-"));

    assert!(svc
        .export_report(9, dir.path(), NOW)
        .unwrap_err()
        .is_not_found());
}

#[test]
fn dashboard_covers_loaded_incidents() {
    let mut svc = IncidentService::new(MemoryStore::default());
    svc.submit_draft(draft("Uno", CreatedAtChoice::Now), NOW)
        .expect("submit");
    svc.submit_draft(draft("Dos", CreatedAtChoice::Now), NOW)
        .expect("submit");
    svc.update_status(2, STATUS_CLOSED, NOW).expect("close");

    let dash = svc.dashboard();
    assert_eq!(dash.counters.total, 2);
    assert_eq!(dash.counters.resolved, 1);
    assert_eq!(dash.by_month[0].label, "Mayo");
}

#[test]
fn connection_check_reports_failure_message() {
    assert_eq!(
        check_connection(&MemoryStore::default()),
        ConnectionStatus::Connected
    );
    assert_eq!(
        check_connection(&DownStore),
        ConnectionStatus::Unreachable("No se pudo conectar con el servidor".to_string())
    );
}
