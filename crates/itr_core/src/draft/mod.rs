use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::domain::{Incident, STATUS_OPEN};
use crate::error::AppError;

/// How the creation timestamp of a new incident is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "date")]
pub enum CreatedAtChoice {
    #[default]
    Now,
    /// A user-picked calendar date, combined with the current time of day.
    OnDate(Date),
}

impl CreatedAtChoice {
    pub fn resolve(self, now: OffsetDateTime) -> OffsetDateTime {
        match self {
            CreatedAtChoice::Now => now,
            CreatedAtChoice::OnDate(date) => now.replace_date(date),
        }
    }
}

/// Fields entered when reporting a new incident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub created_at: CreatedAtChoice,
}

impl IncidentDraft {
    pub fn validate(&self) -> Result<(), AppError> {
        let missing: Vec<&str> = [
            ("title", &self.title),
            ("description", &self.description),
            ("category", &self.category),
            ("priority", &self.priority),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            return Ok(());
        }
        Err(
            AppError::new("VALIDATION_REQUIRED_FIELD", "Todos los campos son obligatorios")
                .with_details(format!("missing={}", missing.join(", "))),
        )
    }

    /// Build the record to submit: no id, status `Abierto`, opening time equal to creation time.
    pub fn into_incident(self, now: OffsetDateTime) -> Result<Incident, AppError> {
        self.validate()?;
        let created_at = self.created_at.resolve(now);
        Ok(Incident {
            id: 0,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            priority: self.priority.trim().to_string(),
            created_at,
            opening_time: Some(created_at),
            closing_time: None,
            assigned_to: None,
            status: STATUS_OPEN.to_string(),
            resolution: None,
        })
    }
}
