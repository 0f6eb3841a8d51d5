use itr_core::domain::Incident;
use itr_core::error::AppError;

use crate::http::{ApiClient, Reply};

const INCIDENTS_PATH: &str = "/incidentes/";

/// Authoritative incident storage. The backend behind it assigns ids and owns persistence.
pub trait IncidentStore {
    fn list(&self) -> Result<Vec<Incident>, AppError>;
    /// Server-side filtered listings. The board filters a full `list()` locally; these serve
    /// callers that want the backend to narrow the result.
    fn list_by_status(&self, status: &str) -> Result<Vec<Incident>, AppError>;
    fn list_by_priority(&self, priority: &str) -> Result<Vec<Incident>, AppError>;
    fn get(&self, id: i64) -> Result<Incident, AppError>;
    /// Persist a new incident (`id == 0`); returns the stored record with its assigned id.
    fn create(&self, incident: &Incident) -> Result<Incident, AppError>;
    /// Replace a persisted incident; returns the canonical stored record.
    fn update(&self, incident: &Incident) -> Result<Incident, AppError>;
    fn delete(&self, id: i64) -> Result<(), AppError>;
}

/// REST implementation against `/incidentes/`.
#[derive(Debug, Clone)]
pub struct HttpIncidentStore {
    client: ApiClient,
}

fn item_path(id: i64) -> String {
    format!("{INCIDENTS_PATH}{id}/")
}

/// 404 on an item endpoint means the incident does not exist.
fn expect_found(reply: Reply, id: i64) -> Result<Reply, AppError> {
    if reply.status == 404 {
        return Err(AppError::incident_not_found(id));
    }
    Ok(reply)
}

impl HttpIncidentStore {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn list_with(&self, query: &[(&str, &str)]) -> Result<Vec<Incident>, AppError> {
        self.client.get(INCIDENTS_PATH, query)?.success_json()
    }
}

impl IncidentStore for HttpIncidentStore {
    fn list(&self) -> Result<Vec<Incident>, AppError> {
        self.list_with(&[])
    }

    fn list_by_status(&self, status: &str) -> Result<Vec<Incident>, AppError> {
        self.list_with(&[("status", status)])
    }

    fn list_by_priority(&self, priority: &str) -> Result<Vec<Incident>, AppError> {
        self.list_with(&[("priority", priority)])
    }

    fn get(&self, id: i64) -> Result<Incident, AppError> {
        expect_found(self.client.get(&item_path(id), &[])?, id)?.success_json()
    }

    fn create(&self, incident: &Incident) -> Result<Incident, AppError> {
        self.client.post(INCIDENTS_PATH, incident)?.success_json()
    }

    fn update(&self, incident: &Incident) -> Result<Incident, AppError> {
        if !incident.is_persisted() {
            return Err(AppError::new(
                "VALIDATION_REQUIRED_FIELD",
                "El incidente aún no tiene ID",
            ));
        }
        let id = incident.id;
        expect_found(self.client.put(&item_path(id), incident)?, id)?.success_json()
    }

    fn delete(&self, id: i64) -> Result<(), AppError> {
        let reply = expect_found(self.client.delete(&item_path(id))?, id)?;
        if !reply.is_success() {
            return Err(reply.status_error());
        }
        Ok(())
    }
}
