use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::classify::is_stale;
use crate::domain::Incident;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Stale incidents first, newest first inside each group.
    #[default]
    Priority,
    Newest,
    Oldest,
    Id,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Priority,
        SortMode::Newest,
        SortMode::Oldest,
        SortMode::Id,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Priority => "priority",
            SortMode::Newest => "newest",
            SortMode::Oldest => "oldest",
            SortMode::Id => "id",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| {
                AppError::new("VALIDATION_INVALID_SORT_MODE", "Orden no reconocido")
                    .with_details(format!("value={s}; allowed=priority, newest, oldest, id"))
            })
    }
}

/// Order `incidents` in place according to `mode`.
///
/// All modes use a stable sort, so incidents with equal keys keep their incoming order.
/// `now` only matters for [`SortMode::Priority`]; staleness is evaluated once per incident.
pub fn sort_incidents(incidents: &mut [Incident], mode: SortMode, now: OffsetDateTime) {
    match mode {
        SortMode::Id => incidents.sort_by_key(|inc| inc.id),
        SortMode::Newest => incidents.sort_by_key(|inc| Reverse(inc.created_at)),
        SortMode::Oldest => incidents.sort_by_key(|inc| inc.created_at),
        SortMode::Priority => {
            incidents.sort_by_cached_key(|inc| (Reverse(is_stale(inc, now)), Reverse(inc.created_at)))
        }
    }
}

/// Convenience for callers holding a borrowed list.
pub fn sorted(incidents: &[Incident], mode: SortMode, now: OffsetDateTime) -> Vec<Incident> {
    let mut out = incidents.to_vec();
    sort_incidents(&mut out, mode, now);
    out
}
