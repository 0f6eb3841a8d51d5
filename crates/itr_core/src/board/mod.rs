use time::OffsetDateTime;

use crate::domain::Incident;
use crate::filter::{apply_filters, FilterSpec};
use crate::sort::{sort_incidents, SortMode};

/// Identifies one list fetch. Only the most recently issued ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { count: usize },
    /// A newer refresh was started after this one; its data was dropped.
    Superseded { ticket: u64, latest: u64 },
}

/// In-memory incident list plus the derived, user-visible view.
///
/// Every input change re-runs filter then sort over the full list; sorting is only ever applied
/// to the filtered subset.
#[derive(Debug, Clone, Default)]
pub struct IncidentBoard {
    incidents: Vec<Incident>,
    filter: FilterSpec,
    sort_mode: SortMode,
    view: Vec<Incident>,
    issued: u64,
}

impl IncidentBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    /// Filtered and sorted incidents, in display order.
    pub fn view(&self) -> &[Incident] {
        &self.view
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn set_filter(&mut self, filter: FilterSpec, now: OffsetDateTime) {
        self.filter = filter;
        self.recompute(now);
    }

    pub fn clear_filter(&mut self, now: OffsetDateTime) {
        self.set_filter(FilterSpec::default(), now);
    }

    pub fn set_sort_mode(&mut self, mode: SortMode, now: OffsetDateTime) {
        self.sort_mode = mode;
        self.recompute(now);
    }

    /// Start a list fetch. The returned ticket must be handed back with the fetched data.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Apply fetched data unless a newer refresh has been started since `ticket` was issued.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        incidents: Vec<Incident>,
        now: OffsetDateTime,
    ) -> RefreshOutcome {
        if ticket.0 != self.issued {
            return RefreshOutcome::Superseded {
                ticket: ticket.0,
                latest: self.issued,
            };
        }
        self.incidents = incidents;
        self.recompute(now);
        RefreshOutcome::Applied {
            count: self.incidents.len(),
        }
    }

    /// Swap in the canonical record returned by the store after an update.
    ///
    /// Returns `false` when no incident with that id is loaded (the list is left untouched).
    pub fn replace_incident(&mut self, updated: Incident, now: OffsetDateTime) -> bool {
        let Some(slot) = self.incidents.iter_mut().find(|i| i.id == updated.id) else {
            return false;
        };
        *slot = updated;
        self.recompute(now);
        true
    }

    /// Navigation to a detail view: the list falls back to id order and the incident, if
    /// loaded, is returned.
    pub fn open_detail(&mut self, id: i64, now: OffsetDateTime) -> Option<&Incident> {
        self.set_sort_mode(SortMode::Id, now);
        self.incidents.iter().find(|i| i.id == id)
    }

    /// Ids currently loaded, ascending. Used by detail pickers.
    pub fn available_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.incidents.iter().map(|i| i.id).collect();
        ids.sort_unstable();
        ids
    }

    fn recompute(&mut self, now: OffsetDateTime) {
        let mut view = apply_filters(&self.incidents, &self.filter);
        sort_incidents(&mut view, self.sort_mode, now);
        self.view = view;
    }
}
