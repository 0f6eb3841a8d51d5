use std::fs;
use std::path::{Path, PathBuf};

use itr_core::analytics::{build_dashboard, Dashboard};
use itr_core::auth::{LoginForm, RegistrationForm};
use itr_core::board::{IncidentBoard, RefreshOutcome};
use itr_core::domain::Incident;
use itr_core::draft::IncidentDraft;
use itr_core::error::AppError;
use itr_core::report::render_incident_report;
use itr_core::session::{Session, User};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::auth::AuthApi;
use crate::store::IncidentStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Unreachable(String),
}

/// Probe the backend with a list request.
pub fn check_connection<S: IncidentStore + ?Sized>(store: &S) -> ConnectionStatus {
    match store.list() {
        Ok(_) => ConnectionStatus::Connected,
        Err(e) => {
            warn!(code = %e.code, "connection check failed");
            ConnectionStatus::Unreachable(e.message)
        }
    }
}

/// Incident store plus the board that presents it.
#[derive(Debug)]
pub struct IncidentService<S> {
    store: S,
    board: IncidentBoard,
}

impl<S: IncidentStore> IncidentService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            board: IncidentBoard::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn board(&self) -> &IncidentBoard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut IncidentBoard {
        &mut self.board
    }

    /// Reload the full list into the board. Fetch and apply run back to back here, so the outcome
    /// is always `Applied`; the board's ticket only discards anything when a caller splits
    /// `begin_refresh` and `complete_refresh` around a fetch of its own.
    pub fn refresh(&mut self, now: OffsetDateTime) -> Result<RefreshOutcome, AppError> {
        let ticket = self.board.begin_refresh();
        let incidents = self.store.list()?;
        let outcome = self.board.complete_refresh(ticket, incidents, now);
        match outcome {
            RefreshOutcome::Applied { count } => debug!(count, "incident list refreshed"),
            RefreshOutcome::Superseded { ticket, latest } => {
                debug!(ticket, latest, "stale refresh discarded")
            }
        }
        Ok(outcome)
    }

    /// Navigate to one incident: the board falls back to id order and the record is fetched
    /// directly from the store.
    pub fn load_detail(&mut self, id: i64, now: OffsetDateTime) -> Result<Incident, AppError> {
        self.board.open_detail(id, now);
        let incident = self.store.get(id)?;
        self.board.replace_incident(incident.clone(), now);
        Ok(incident)
    }

    /// Push local edits to the store and adopt the record it returns.
    pub fn save_changes(
        &mut self,
        incident: &Incident,
        now: OffsetDateTime,
    ) -> Result<Incident, AppError> {
        let saved = self.store.update(incident)?;
        if !self.board.replace_incident(saved.clone(), now) {
            debug!(id = saved.id, "saved incident not loaded on board");
        }
        Ok(saved)
    }

    /// Fetch, modify with `edit`, and save in one step.
    pub fn edit_incident(
        &mut self,
        id: i64,
        now: OffsetDateTime,
        edit: impl FnOnce(&mut Incident) -> Result<(), AppError>,
    ) -> Result<Incident, AppError> {
        let mut incident = self.store.get(id)?;
        edit(&mut incident)?;
        self.save_changes(&incident, now)
    }

    pub fn update_status(
        &mut self,
        id: i64,
        status: &str,
        now: OffsetDateTime,
    ) -> Result<Incident, AppError> {
        self.edit_incident(id, now, |inc| {
            inc.set_status(status, now);
            Ok(())
        })
    }

    pub fn assign(
        &mut self,
        id: i64,
        technician: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<Incident, AppError> {
        self.edit_incident(id, now, |inc| inc.assign(technician))
    }

    pub fn resolve(
        &mut self,
        id: i64,
        resolution: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<Incident, AppError> {
        self.edit_incident(id, now, |inc| {
            inc.set_resolution(resolution);
            Ok(())
        })
    }

    /// Validate and submit a new incident, then refresh so it shows up in the list.
    pub fn submit_draft(
        &mut self,
        draft: IncidentDraft,
        now: OffsetDateTime,
    ) -> Result<Incident, AppError> {
        let incident = draft.into_incident(now)?;
        let created = self.store.create(&incident)?;
        self.refresh(now)?;
        Ok(created)
    }

    pub fn delete(&mut self, id: i64, now: OffsetDateTime) -> Result<(), AppError> {
        self.store.delete(id)?;
        self.refresh(now)?;
        Ok(())
    }

    /// Statistics over everything currently loaded, ignoring the board's filter.
    pub fn dashboard(&self) -> Dashboard {
        build_dashboard(self.board.incidents())
    }

    /// Render the PDF report for incident `id` into `out_dir`; returns the written path.
    pub fn export_report(
        &self,
        id: i64,
        out_dir: &Path,
        now: OffsetDateTime,
    ) -> Result<PathBuf, AppError> {
        let incident = self.store.get(id)?;
        let report = render_incident_report(&incident, now)?;

        fs::create_dir_all(out_dir).map_err(|e| {
            AppError::new("REPORT_WRITE_FAILED", "No se pudo crear la carpeta del informe")
                .with_details(format!("path={}; err={e}", out_dir.display()))
        })?;
        let path = out_dir.join(&report.file_name);
        fs::write(&path, &report.bytes).map_err(|e| {
            AppError::new("REPORT_WRITE_FAILED", "No se pudo guardar el informe")
                .with_details(format!("path={}; err={e}", path.display()))
        })?;
        Ok(path)
    }
}

/// Login, registration and logout against the auth API, reflected in the session.
#[derive(Debug)]
pub struct AuthService<A> {
    api: A,
    session: Session,
}

impl<A: AuthApi> AuthService<A> {
    pub fn new(api: A, session: Session) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn login(&mut self, form: &LoginForm) -> Result<User, AppError> {
        form.validate()?;
        let user = self.api.login(form)?.into_login_user()?;
        self.session.login(user.clone())?;
        debug!(user_id = user.id, "session started");
        Ok(user)
    }

    /// Create an account. The session is left untouched; the user logs in afterwards.
    pub fn register(&mut self, form: &RegistrationForm) -> Result<Option<User>, AppError> {
        let request = form.validate()?;
        self.api.register(&request)?.into_registration()
    }

    pub fn logout(&mut self) -> Result<(), AppError> {
        self.session.logout()?;
        debug!("session ended");
        Ok(())
    }
}
