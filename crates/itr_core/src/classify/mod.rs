use time::{Duration, OffsetDateTime};

use crate::domain::Incident;

/// How long a non-closed incident may stay unresolved before it is flagged.
pub const STALE_AFTER: Duration = Duration::hours(48);

/// An incident is stale when it is not closed and has been open for strictly more than
/// [`STALE_AFTER`] of real elapsed time at `now`.
pub fn is_stale(incident: &Incident, now: OffsetDateTime) -> bool {
    if incident.is_closed() {
        return false;
    }
    now - incident.created_at > STALE_AFTER
}
