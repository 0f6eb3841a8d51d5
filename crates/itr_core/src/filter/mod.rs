use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::domain::Incident;

/// Conjunction of optional constraints applied before sorting.
///
/// Empty strings behave like `None` so form inputs can be passed through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterSpec {
    pub category: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    /// Inclusive lower bound on `created_at`.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub min_created_at: Option<OffsetDateTime>,
}

impl FilterSpec {
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_min_created_at(mut self, at: OffsetDateTime) -> Self {
        self.min_created_at = Some(at);
        self
    }

    /// Lower bound at the start of `date` (UTC), as a date-only picker means it.
    pub fn with_min_date(self, date: Date) -> Self {
        self.with_min_created_at(date.midnight().assume_utc())
    }

    pub fn is_empty(&self) -> bool {
        active(&self.category).is_none()
            && active(&self.status).is_none()
            && active(&self.priority).is_none()
            && self.min_created_at.is_none()
    }

    pub fn matches(&self, incident: &Incident) -> bool {
        let field_ok = |want: &Option<String>, have: &str| match active(want) {
            Some(w) => w == have,
            None => true,
        };
        let date_ok = match self.min_created_at {
            Some(min) => incident.created_at >= min,
            None => true,
        };
        field_ok(&self.category, &incident.category)
            && field_ok(&self.status, &incident.status)
            && field_ok(&self.priority, &incident.priority)
            && date_ok
    }
}

fn active(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

/// Stable filter: the result keeps the relative order of `incidents`.
pub fn apply_filters(incidents: &[Incident], spec: &FilterSpec) -> Vec<Incident> {
    incidents
        .iter()
        .filter(|inc| spec.matches(inc))
        .cloned()
        .collect()
}
