//! Activity reconciliation.
//!
//! Two sources feed the recent-activity list: weighings from the dashboard
//! summary (primary) and the activity feed (secondary). Feed records are
//! normalised, then appended unless their id is already present.

use std::collections::HashSet;
use std::sync::LazyLock;

use bovicare_client::{ActivityAction, ActivityRecord, ObjectType, RecentWeighing};
use regex::Regex;

/// Icons the backend uses as "no particular icon".
pub const GENERIC_ICONS: [&str; 3] = ["Cadastro", "cadastrargado", "vaca"];
pub const DEFAULT_ICON: &str = "vaca";

static DAIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)leite").expect("dairy regex"));

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

/// `created_at`, then `date`, then `datetime`, else empty.
pub fn resolve_timestamp(record: &ActivityRecord) -> String {
    non_empty(&record.created_at)
        .or_else(|| non_empty(&record.date))
        .or_else(|| non_empty(&record.datetime))
        .unwrap_or_default()
        .to_string()
}

/// Explicit icon unless it is a generic placeholder, else one per object type.
pub fn derive_icon(record: &ActivityRecord) -> String {
    if let Some(icon) = non_empty(&record.icon).filter(|i| !GENERIC_ICONS.contains(i)) {
        return icon.to_string();
    }
    match record.object_type {
        ObjectType::Animal => "vaca".into(),
        ObjectType::Herd => "herd".into(),
        ObjectType::Weighing => "scale".into(),
        ObjectType::Other => non_empty(&record.icon).unwrap_or(DEFAULT_ICON).to_string(),
    }
}

/// Description used when the record carries none.
pub fn build_description(record: &ActivityRecord) -> String {
    let name = non_empty(&record.object_name)
        .or_else(|| non_empty(&record.object_id))
        .unwrap_or_default();
    match record.object_type {
        ObjectType::Animal => format!("Novo gado cadastrado: {name}"),
        ObjectType::Herd => format!("Fazenda cadastrada: {name}"),
        ObjectType::Weighing => {
            format!("Peso de {} Kg registrado", record.weight_label().unwrap_or_default())
        }
        ObjectType::Other => non_empty(&record.description)
            .unwrap_or("Atividade registrada")
            .to_string(),
    }
}

/// The record's own description, else [`build_description`].
pub fn describe(record: &ActivityRecord) -> String {
    non_empty(&record.description)
        .map(str::to_string)
        .unwrap_or_else(|| build_description(record))
}

/// Weighings from the dashboard summary as activity records.
pub fn weighing_activities(weighings: &[RecentWeighing]) -> Vec<ActivityRecord> {
    weighings
        .iter()
        .enumerate()
        .map(|(idx, w)| {
            let key = non_empty(&w.id)
                .map(str::to_string)
                .unwrap_or_else(|| idx.to_string());
            let animal = w.animal_id.clone().unwrap_or_default();
            let weight = w.weight.map(|v| v.to_string()).unwrap_or_default();
            ActivityRecord {
                id: Some(format!("weigh-{key}")),
                object_type: ObjectType::Weighing,
                object_id: w.animal_id.clone(),
                action: ActivityAction::Create,
                description: Some(format!(
                    "Peso de {weight} Kg adicionado para GADO {animal}"
                )),
                icon: Some(DEFAULT_ICON.into()),
                date: Some(
                    non_empty(&w.date)
                        .or_else(|| non_empty(&w.created_at))
                        .unwrap_or_default()
                        .to_string(),
                ),
                weight: w.weight,
                ..ActivityRecord::default()
            }
        })
        .collect()
}

/// Fill timestamp, icon and description on feed records.
pub fn normalize_feed(records: Vec<ActivityRecord>) -> Vec<ActivityRecord> {
    records
        .into_iter()
        .map(|mut r| {
            r.date = Some(resolve_timestamp(&r));
            r.icon = Some(derive_icon(&r));
            r.description = Some(describe(&r));
            r
        })
        .collect()
}

/// Id-based union: `secondary` records are appended only when their id is new.
/// Records without an id are always kept.
pub fn merge_activities(
    primary: Vec<ActivityRecord>,
    secondary: Vec<ActivityRecord>,
) -> Vec<ActivityRecord> {
    let mut seen: HashSet<String> = primary.iter().filter_map(|r| r.id.clone()).collect();
    let mut merged = primary;
    for record in secondary {
        let duplicate = record
            .id
            .as_ref()
            .is_some_and(|id| !seen.insert(id.clone()));
        if !duplicate {
            merged.push(record);
        }
    }
    merged
}

/// Combine both sources. A failed feed (`None`) leaves the weighings alone.
pub fn reconcile_activities(
    weighings: Vec<ActivityRecord>,
    feed: Option<Vec<ActivityRecord>>,
) -> Vec<ActivityRecord> {
    match feed {
        Some(feed) => merge_activities(weighings, normalize_feed(feed)),
        None => weighings,
    }
}

/// Activities shown in the recent list; dairy production entries are hidden.
pub fn visible_activities(records: &[ActivityRecord]) -> Vec<ActivityRecord> {
    records
        .iter()
        .filter(|r| !r.description.as_deref().is_some_and(|d| DAIRY_RE.is_match(d)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str) -> ActivityRecord {
        ActivityRecord {
            id: Some(id.into()),
            ..ActivityRecord::default()
        }
    }

    fn ids(v: &[ActivityRecord]) -> Vec<&str> {
        v.iter().filter_map(|r| r.id.as_deref()).collect()
    }

    #[test]
    fn merge_is_union_by_id() {
        let merged = merge_activities(vec![rec("weigh-1")], vec![rec("weigh-1"), rec("act-9")]);
        assert_eq!(ids(&merged), ["weigh-1", "act-9"]);
    }

    #[test]
    fn merge_dedupes_within_secondary_and_keeps_anonymous() {
        let anon = ActivityRecord::default();
        let merged = merge_activities(
            vec![],
            vec![rec("a"), rec("a"), anon.clone(), anon],
        );
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn timestamp_resolution_order() {
        let mut r = ActivityRecord::default();
        assert_eq!(resolve_timestamp(&r), "");
        r.datetime = Some("2024-01-03".into());
        assert_eq!(resolve_timestamp(&r), "2024-01-03");
        r.date = Some("".into());
        assert_eq!(resolve_timestamp(&r), "2024-01-03");
        r.date = Some("2024-01-02".into());
        assert_eq!(resolve_timestamp(&r), "2024-01-02");
        r.created_at = Some("2024-01-01".into());
        assert_eq!(resolve_timestamp(&r), "2024-01-01");
    }

    #[test]
    fn icons_skip_generic_placeholders() {
        let mut r = ActivityRecord {
            object_type: ObjectType::Herd,
            icon: Some("cadastrargado".into()),
            ..ActivityRecord::default()
        };
        assert_eq!(derive_icon(&r), "herd");
        r.icon = Some("warning".into());
        assert_eq!(derive_icon(&r), "warning");
        r.icon = None;
        r.object_type = ObjectType::Weighing;
        assert_eq!(derive_icon(&r), "scale");
        r.object_type = ObjectType::Other;
        assert_eq!(derive_icon(&r), "vaca");
        r.icon = Some("Cadastro".into());
        assert_eq!(derive_icon(&r), "Cadastro");
    }

    #[test]
    fn descriptions_by_object_type() {
        let mut r = ActivityRecord {
            object_type: ObjectType::Animal,
            object_id: Some("12".into()),
            ..ActivityRecord::default()
        };
        assert_eq!(build_description(&r), "Novo gado cadastrado: 12");
        r.object_name = Some("Mimosa".into());
        assert_eq!(build_description(&r), "Novo gado cadastrado: Mimosa");
        r.object_type = ObjectType::Herd;
        assert_eq!(build_description(&r), "Fazenda cadastrada: Mimosa");
        r.object_type = ObjectType::Weighing;
        r.weight = Some(410.0);
        assert_eq!(build_description(&r), "Peso de 410 Kg registrado");
        r.object_type = ObjectType::Other;
        assert_eq!(build_description(&r), "Atividade registrada");
    }

    #[test]
    fn weighings_become_activities() {
        let w = vec![
            RecentWeighing {
                id: Some("5".into()),
                weight: Some(420.5),
                animal_id: Some("A1".into()),
                date: None,
                created_at: Some("2024-03-01T10:00:00Z".into()),
            },
            RecentWeighing::default(),
        ];
        let acts = weighing_activities(&w);
        assert_eq!(ids(&acts), ["weigh-5", "weigh-1"]);
        assert_eq!(
            acts[0].description.as_deref(),
            Some("Peso de 420.5 Kg adicionado para GADO A1")
        );
        assert_eq!(acts[0].date.as_deref(), Some("2024-03-01T10:00:00Z"));
        assert_eq!(acts[0].object_type, ObjectType::Weighing);
    }

    #[test]
    fn failed_feed_keeps_weighings() {
        let weighings = vec![rec("weigh-1")];
        assert_eq!(ids(&reconcile_activities(weighings.clone(), None)), ["weigh-1"]);
        let feed = vec![ActivityRecord {
            id: Some("act-2".into()),
            object_type: ObjectType::Animal,
            object_name: Some("Mimosa".into()),
            created_at: Some("2024-02-02".into()),
            ..ActivityRecord::default()
        }];
        let all = reconcile_activities(weighings, Some(feed));
        assert_eq!(ids(&all), ["weigh-1", "act-2"]);
        assert_eq!(all[1].date.as_deref(), Some("2024-02-02"));
        assert_eq!(all[1].icon.as_deref(), Some("vaca"));
        assert_eq!(
            all[1].description.as_deref(),
            Some("Novo gado cadastrado: Mimosa")
        );
    }

    #[test]
    fn dairy_entries_are_hidden() {
        let mut milk = rec("m");
        milk.description = Some("Produção de LEITE registrada".into());
        let shown = visible_activities(&[milk, rec("x")]);
        assert_eq!(ids(&shown), ["x"]);
    }
}
