//! Boundary adapters for list-shaped responses.
//!
//! The backend answers the same resource as a bare array on some endpoints and
//! wrapped under a key on others. Each adapter is an untagged enum that
//! captures every accepted shape and collapses it to one canonical form right
//! after deserialization, so nothing downstream has to guess.

use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::Value;

use crate::models::{ActivityRecord, AnimalRecord, Herd, RawWeightEntry, User};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum AnimalsEnvelope {
    Bare(Vec<AnimalRecord>),
    Animals { animals: Vec<AnimalRecord> },
    Cattle { cattle: Vec<AnimalRecord> },
    Other(IgnoredAny),
}

impl AnimalsEnvelope {
    /// `None` when the payload matched none of the known shapes.
    pub(crate) fn into_animals(self) -> Option<Vec<AnimalRecord>> {
        match self {
            AnimalsEnvelope::Bare(v)
            | AnimalsEnvelope::Animals { animals: v }
            | AnimalsEnvelope::Cattle { cattle: v } => Some(v),
            AnimalsEnvelope::Other(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum HerdsEnvelope {
    Bare(Vec<Herd>),
    Wrapped { herds: Vec<Herd> },
    Other(IgnoredAny),
}

impl HerdsEnvelope {
    pub(crate) fn into_herds(self) -> Vec<Herd> {
        match self {
            HerdsEnvelope::Bare(v) | HerdsEnvelope::Wrapped { herds: v } => v,
            HerdsEnvelope::Other(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum HerdEnvelope {
    Wrapped { herd: Herd },
    Bare(Herd),
}

impl HerdEnvelope {
    pub(crate) fn into_herd(self) -> Herd {
        match self {
            HerdEnvelope::Wrapped { herd } | HerdEnvelope::Bare(herd) => herd,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ActivitiesEnvelope {
    Bare(Vec<ActivityRecord>),
    Wrapped { activities: Vec<ActivityRecord> },
    Other(IgnoredAny),
}

impl ActivitiesEnvelope {
    pub(crate) fn into_activities(self) -> Vec<ActivityRecord> {
        match self {
            ActivitiesEnvelope::Bare(v) | ActivitiesEnvelope::Wrapped { activities: v } => v,
            ActivitiesEnvelope::Other(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum UserEnvelope {
    Wrapped { user: User },
    Bare(User),
}

impl UserEnvelope {
    pub(crate) fn into_user(self) -> User {
        match self {
            UserEnvelope::Wrapped { user } | UserEnvelope::Bare(user) => user,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum UsersEnvelope {
    Bare(Vec<User>),
    Wrapped { users: Vec<User> },
    Other(IgnoredAny),
}

impl UsersEnvelope {
    pub(crate) fn into_users(self) -> Vec<User> {
        match self {
            UsersEnvelope::Bare(v) | UsersEnvelope::Wrapped { users: v } => v,
            UsersEnvelope::Other(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HistoryEnvelope {
    Bare(Vec<Value>),
    Wrapped { history: Vec<Value> },
    Other(IgnoredAny),
}

/// An element that is not an entry object keeps its slot with no weight.
fn coerce_entry(value: Value) -> RawWeightEntry {
    serde_json::from_value(value).unwrap_or_default()
}

/// Weight history as returned by `GET /api/weight/{id}`.
#[derive(Clone, Debug, PartialEq)]
pub enum WeightHistory {
    /// Entries in source order (most recent first as sent by the backend).
    Entries(Vec<RawWeightEntry>),
    /// The payload was not a list of entries in any accepted shape.
    Unrecognized,
}

impl WeightHistory {
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value::<HistoryEnvelope>(value) {
            Ok(HistoryEnvelope::Bare(v)) | Ok(HistoryEnvelope::Wrapped { history: v }) => {
                WeightHistory::Entries(v.into_iter().map(coerce_entry).collect())
            }
            Ok(HistoryEnvelope::Other(_)) | Err(_) => WeightHistory::Unrecognized,
        }
    }

    pub fn entries(&self) -> Option<&[RawWeightEntry]> {
        match self {
            WeightHistory::Entries(v) => Some(v),
            WeightHistory::Unrecognized => None,
        }
    }

    /// Weight of the first entry, when it is numeric.
    pub fn first_weight(&self) -> Option<f64> {
        self.entries()
            .and_then(|e| e.first())
            .and_then(|e| e.weight)
    }
}
