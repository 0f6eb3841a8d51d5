//! Dashboard statistics. Chart rendering happens elsewhere; this only produces numbers and labels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{Month, UtcOffset};

use crate::domain::{Incident, STATUS_CLOSED, STATUS_IN_PROGRESS, STATUS_OPEN};
use crate::normalize::dates::month_name_es;

pub const DASHBOARD_VERSION: u32 = 1;

const CATEGORY_COLORS: [&str; 5] = ["#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#FF9F40"];
const MONTH_COLOR: &str = "#36A2EB";
const RESOLVED_COLOR: &str = "#28a745";
const UNRESOLVED_COLOR: &str = "#dc3545";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Doughnut,
    Bar,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountBucket {
    pub label: String,
    pub count: i64,
    pub incident_ids: Vec<i64>,
}

/// Everything a chart renderer needs for one chart. `labels`, `values` and `colors` are
/// index-aligned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartDataset {
    pub title: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<i64>,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounters {
    pub total: i64,
    pub resolved: i64,
    pub open: i64,
    pub in_progress: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolutionSplit {
    pub resolved: i64,
    pub unresolved: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dashboard {
    pub version: u32,
    pub counters: StatusCounters,
    pub by_category: Vec<CountBucket>,
    pub by_month: Vec<CountBucket>,
    pub resolution: ResolutionSplit,
    pub charts: Vec<ChartDataset>,
}

fn count_status(incidents: &[Incident], status: &str) -> i64 {
    incidents.iter().filter(|i| i.status == status).count() as i64
}

fn buckets_from_map<K>(map: BTreeMap<K, (String, Vec<i64>)>) -> Vec<CountBucket> {
    map.into_values()
        .map(|(label, mut ids)| {
            ids.sort();
            CountBucket {
                label,
                count: ids.len() as i64,
                incident_ids: ids,
            }
        })
        .collect()
}

/// Incidents per category, ordered by category name.
pub fn category_distribution(incidents: &[Incident]) -> Vec<CountBucket> {
    let mut map: BTreeMap<String, (String, Vec<i64>)> = BTreeMap::new();
    for inc in incidents {
        map.entry(inc.category.clone())
            .or_insert_with(|| (inc.category.clone(), Vec::new()))
            .1
            .push(inc.id);
    }
    buckets_from_map(map)
}

/// Incidents per calendar month of `created_at` (UTC), January first.
///
/// Years are folded together and empty months are omitted.
pub fn monthly_distribution(incidents: &[Incident]) -> Vec<CountBucket> {
    let mut map: BTreeMap<u8, (String, Vec<i64>)> = BTreeMap::new();
    for inc in incidents {
        let month: Month = inc.created_at.to_offset(UtcOffset::UTC).month();
        map.entry(month as u8)
            .or_insert_with(|| (month_name_es(month).to_string(), Vec::new()))
            .1
            .push(inc.id);
    }
    buckets_from_map(map)
}

pub fn resolution_split(incidents: &[Incident]) -> ResolutionSplit {
    let resolved = incidents.iter().filter(|i| i.is_closed()).count() as i64;
    ResolutionSplit {
        resolved,
        unresolved: incidents.len() as i64 - resolved,
    }
}

fn dataset(
    title: &str,
    kind: ChartKind,
    buckets: &[CountBucket],
    colors: Vec<String>,
) -> ChartDataset {
    ChartDataset {
        title: title.to_string(),
        kind,
        labels: buckets.iter().map(|b| b.label.clone()).collect(),
        values: buckets.iter().map(|b| b.count).collect(),
        colors,
    }
}

pub fn build_dashboard(incidents: &[Incident]) -> Dashboard {
    let counters = StatusCounters {
        total: incidents.len() as i64,
        resolved: count_status(incidents, STATUS_CLOSED),
        open: count_status(incidents, STATUS_OPEN),
        in_progress: count_status(incidents, STATUS_IN_PROGRESS),
    };
    let by_category = category_distribution(incidents);
    let by_month = monthly_distribution(incidents);
    let resolution = resolution_split(incidents);

    let category_colors = (0..by_category.len())
        .map(|i| CATEGORY_COLORS[i % CATEGORY_COLORS.len()].to_string())
        .collect();
    let month_colors = vec![MONTH_COLOR.to_string(); by_month.len()];

    let charts = vec![
        dataset(
            "Distribución por Categoría",
            ChartKind::Doughnut,
            &by_category,
            category_colors,
        ),
        dataset("Incidentes por Mes", ChartKind::Bar, &by_month, month_colors),
        ChartDataset {
            title: "Estado de Resolución".to_string(),
            kind: ChartKind::Bar,
            labels: vec!["Resueltos".to_string(), "No Resueltos".to_string()],
            values: vec![resolution.resolved, resolution.unresolved],
            colors: vec![RESOLVED_COLOR.to_string(), UNRESOLVED_COLOR.to_string()],
        },
    ];

    Dashboard {
        version: DASHBOARD_VERSION,
        counters,
        by_category,
        by_month,
        resolution,
        charts,
    }
}
