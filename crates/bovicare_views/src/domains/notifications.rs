//! Notification list derived from recent activities, plus the read set.

use std::collections::HashSet;
use std::sync::LazyLock;

use bovicare_client::{ActivityAction, ActivityRecord, ObjectType};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domains::activity::{describe, resolve_timestamp};
use crate::transforms::parse_timestamp;

static ALERT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)alerta").expect("alert regex"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Animal,
    Farm,
    Weight,
    Alert,
    Default,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    pub id: String,
    pub title: String,
    pub message: String,
    pub date: Option<DateTime<Utc>>,
    pub raw_date: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
}

/// Title and type from `(object_type, action, description)`.
pub fn classify(
    object_type: ObjectType,
    action: ActivityAction,
    description: Option<&str>,
) -> (&'static str, NotificationType) {
    let update = action == ActivityAction::Update;
    match object_type {
        ObjectType::Animal => (
            if update { "Animal atualizado" } else { "Novo gado cadastrado" },
            NotificationType::Animal,
        ),
        ObjectType::Herd => (
            if update { "Fazenda atualizada" } else { "Fazenda cadastrada" },
            NotificationType::Farm,
        ),
        ObjectType::Weighing => (
            "Peso registrado",
            if action == ActivityAction::Alert {
                NotificationType::Alert
            } else {
                NotificationType::Weight
            },
        ),
        ObjectType::Other => {
            if description.is_some_and(|d| ALERT_RE.is_match(d)) {
                ("Alerta do rebanho", NotificationType::Alert)
            } else if update {
                ("Atualização realizada", NotificationType::Default)
            } else {
                ("Atividade registrada", NotificationType::Default)
            }
        }
    }
}

fn object_type_key(t: ObjectType) -> &'static str {
    match t {
        ObjectType::Animal => "animal",
        ObjectType::Herd => "herd",
        ObjectType::Weighing => "weighing",
        ObjectType::Other => "activity",
    }
}

/// Id that survives recomputation from the same data.
///
/// The record's own id wins; then `{type}-{object_id}`; otherwise a digest of
/// type, timestamp and description.
pub fn notification_id(record: &ActivityRecord, raw_date: &str) -> String {
    if let Some(id) = record.id.as_deref().filter(|s| !s.is_empty()) {
        return id.to_string();
    }
    let key = object_type_key(record.object_type);
    if let Some(object_id) = record.object_id.as_deref().filter(|s| !s.is_empty()) {
        return format!("{key}-{object_id}");
    }
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(b"|");
    hasher.update(raw_date.as_bytes());
    hasher.update(b"|");
    hasher.update(record.description.as_deref().unwrap_or_default().as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{key}-{}", &digest[..12])
}

pub fn to_notification(record: &ActivityRecord) -> NotificationItem {
    let raw_date = resolve_timestamp(record);
    let (title, kind) = classify(record.object_type, record.action, record.description.as_deref());
    NotificationItem {
        id: notification_id(record, &raw_date),
        title: title.to_string(),
        message: describe(record),
        date: parse_timestamp(&raw_date),
        raw_date,
        kind,
    }
}

pub fn to_notifications(records: &[ActivityRecord]) -> Vec<NotificationItem> {
    records.iter().map(to_notification).collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEntry {
    #[serde(flatten)]
    pub item: NotificationItem,
    pub read: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsView {
    pub items: Vec<NotificationEntry>,
    pub unread_count: usize,
    pub subtitle: String,
}

/// Current notifications and the ids the user has dismissed this session.
#[derive(Clone, Debug, Default)]
pub struct NotificationCenter {
    items: Vec<NotificationItem>,
    read: HashSet<String>,
}

impl NotificationCenter {
    /// Replace the list; read ids no longer present are forgotten.
    pub fn set_items(&mut self, items: Vec<NotificationItem>) {
        let ids: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
        self.read.retain(|id| ids.contains(id.as_str()));
        self.items = items;
    }

    pub fn items(&self) -> &[NotificationItem] {
        &self.items
    }

    pub fn is_read(&self, id: &str) -> bool {
        self.read.contains(id)
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|i| !self.read.contains(&i.id)).count()
    }

    pub fn mark_all_read(&mut self) {
        self.read = self.items.iter().map(|i| i.id.clone()).collect();
    }

    /// Returns `false` when no notification has that id.
    pub fn mark_read(&mut self, id: &str) -> bool {
        if self.items.iter().any(|i| i.id == id) {
            self.read.insert(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn view(&self) -> NotificationsView {
        let unread_count = self.unread_count();
        NotificationsView {
            items: self
                .items
                .iter()
                .map(|item| NotificationEntry {
                    read: self.is_read(&item.id),
                    item: item.clone(),
                })
                .collect(),
            unread_count,
            subtitle: if unread_count > 0 {
                format!("{unread_count} não lida(s)")
            } else {
                "Tudo em dia".to_string()
            },
        }
    }
}
