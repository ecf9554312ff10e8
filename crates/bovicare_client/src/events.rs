//! Change notifications published after successful mutations.
//!
//! Subscribers (dashboards, caches) listen on a broadcast channel instead of a
//! process-wide string-keyed event.

use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MutationMethod {
    Post,
    Put,
    Patch,
    Delete,
}

impl MutationMethod {
    pub fn from_http(method: &reqwest::Method) -> Option<Self> {
        match *method {
            reqwest::Method::POST => Some(MutationMethod::Post),
            reqwest::Method::PUT => Some(MutationMethod::Put),
            reqwest::Method::PATCH => Some(MutationMethod::Patch),
            reqwest::Method::DELETE => Some(MutationMethod::Delete),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DataChange {
    pub method: MutationMethod,
    pub path: String,
}

#[derive(Clone, Debug)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<DataChange>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataChange> {
        self.tx.subscribe()
    }

    /// Publish a change; having no subscribers is not an error.
    pub fn publish(&self, change: DataChange) {
        let receivers = self.tx.send(change).unwrap_or(0);
        tracing::debug!(receivers, "published data change");
    }
}
