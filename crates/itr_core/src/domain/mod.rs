use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppError;

pub const STATUS_OPEN: &str = "Abierto";
pub const STATUS_IN_PROGRESS: &str = "En progreso";
pub const STATUS_CLOSED: &str = "Cerrado";

/// Technicians an incident can be assigned to.
pub const TECHNICIANS: [&str; 3] = ["Carlos Sánchez", "Eduardo Rojas", "Camila Campos"];

/// Incident record as exchanged with the backend store.
///
/// Notes:
/// - `id == 0` means "not yet persisted"; the store assigns the real id on create and the zero id
///   is never sent on the wire.
/// - `category`, `priority` and `status` are open enumerations: whatever the backend accepts.
/// - `closing_time` is present iff `status == "Cerrado"`. Use [`Incident::set_status`] to keep that
///   invariant instead of assigning `status` directly.
/// - Timestamps are RFC3339 on the wire. An unparseable timestamp fails decoding at the HTTP
///   boundary; nothing downstream has to cope with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    #[serde(default, skip_serializing_if = "is_unpersisted_id")]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub priority: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub opening_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub closing_time: Option<OffsetDateTime>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub status: String,
    #[serde(default)]
    pub resolution: Option<String>,
}

fn is_unpersisted_id(id: &i64) -> bool {
    *id == 0
}

pub fn is_known_technician(name: &str) -> bool {
    TECHNICIANS.contains(&name)
}

impl Incident {
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    pub fn is_closed(&self) -> bool {
        self.status == STATUS_CLOSED
    }

    /// Change the status, keeping `closing_time` consistent with it.
    ///
    /// Entering `Cerrado` stamps `closing_time = now`; any other status clears it. Re-applying
    /// `Cerrado` to an already closed incident keeps the original closing time.
    pub fn set_status(&mut self, status: impl Into<String>, now: OffsetDateTime) {
        let status = status.into();
        if status == STATUS_CLOSED {
            if !self.is_closed() || self.closing_time.is_none() {
                self.closing_time = Some(now);
            }
        } else {
            self.closing_time = None;
        }
        self.status = status;
    }

    /// Assign (or with `None`, unassign) a technician from [`TECHNICIANS`].
    pub fn assign(&mut self, technician: Option<&str>) -> Result<(), AppError> {
        match technician {
            None => {
                self.assigned_to = None;
                Ok(())
            }
            Some(name) if is_known_technician(name) => {
                self.assigned_to = Some(name.to_string());
                Ok(())
            }
            Some(name) => Err(AppError::new(
                "VALIDATION_UNKNOWN_TECHNICIAN",
                "El técnico indicado no existe",
            )
            .with_details(format!("technician={name}; allowed={}", TECHNICIANS.join(", ")))),
        }
    }

    pub fn set_resolution(&mut self, text: Option<&str>) {
        self.resolution = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }
}
