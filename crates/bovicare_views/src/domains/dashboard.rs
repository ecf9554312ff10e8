use bovicare_client::{ActivityRecord, AnimalRecord, DashboardResponse};
use serde::Serialize;

use crate::domains::activity::weighing_activities;

/// Headline counters of the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_cattle: u64,
    pub excellent_cattle: u64,
    pub reasonable_cattle: u64,
    pub alert_cattle: u64,
    pub last_registration: String,
    pub active_farm: String,
}

/// Build the summary from whichever calls succeeded.
///
/// Without a dashboard response only the animal count is known.
pub fn summarize(
    dashboard: Option<&DashboardResponse>,
    animals: Option<&[AnimalRecord]>,
) -> DashboardSummary {
    let Some(d) = dashboard else {
        return DashboardSummary {
            total_cattle: animals.map_or(0, |a| a.len() as u64),
            ..DashboardSummary::default()
        };
    };
    let last_registration = d
        .recent_weighings
        .first()
        .and_then(|w| {
            w.created_at
                .clone()
                .filter(|s| !s.is_empty())
                .or_else(|| w.date.clone())
        })
        .unwrap_or_default();
    let active_farm = d
        .herds_distribution
        .iter()
        .flatten()
        .find_map(|h| h.name.clone().filter(|n| !n.is_empty()))
        .unwrap_or_default();
    DashboardSummary {
        total_cattle: d.total_animals.unwrap_or(0),
        excellent_cattle: d.active_animals.unwrap_or(0),
        reasonable_cattle: 0,
        alert_cattle: 0,
        last_registration,
        active_farm,
    }
}

/// Weighings act as the primary activity source only for anonymous views.
pub fn primary_activities(
    dashboard: Option<&DashboardResponse>,
    identity_known: bool,
) -> Vec<ActivityRecord> {
    match dashboard {
        Some(d) if !identity_known => weighing_activities(&d.recent_weighings),
        _ => Vec::new(),
    }
}
