//! Weight history normalization and the per-animal fetch+transform step.

use bovicare_client::{AnimalRecord, BovicareClient, BovicareError, WeightHistory};
use futures_util::future::join_all;
use serde::Serialize;

use crate::transforms::{format_date_label, round1, today_label};

pub const HISTORY_FALLBACKS_TOTAL: &str = "bovicare_views_history_fallbacks_total";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeightSample {
    pub date: String,
    pub weight: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AnimalMeta {
    pub breed: String,
    pub gender: String,
    pub status: String,
}

impl AnimalMeta {
    fn from_record(animal: &AnimalRecord) -> Self {
        Self {
            breed: animal.breed.clone().unwrap_or_default(),
            gender: animal.gender.clone().unwrap_or_default(),
            status: animal.status.clone().unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalViewModel {
    pub id: String,
    pub name: String,
    pub current_weight: f64,
    /// Most recent first, in source order.
    pub weight_history: Vec<WeightSample>,
    pub chart_data: Vec<WeightSample>,
    pub meta: AnimalMeta,
}

impl AnimalViewModel {
    fn new(animal: &AnimalRecord, history: Vec<WeightSample>) -> Self {
        let current_weight = history.first().map(|s| s.weight).unwrap_or(0.0);
        Self {
            id: animal.id.clone(),
            name: animal.display_name(),
            current_weight,
            chart_data: history.clone(),
            weight_history: history,
            meta: AnimalMeta::from_record(animal),
        }
    }
}

/// Single sample dated today; an invalid weight becomes 0.
pub fn fallback_history(weight: Option<f64>) -> Vec<WeightSample> {
    let weight = weight.filter(|w| w.is_finite()).unwrap_or(0.0);
    vec![WeightSample {
        date: today_label(),
        weight: round1(weight),
    }]
}

/// Turn a raw history into display samples.
///
/// Entries whose weight is not numeric are dropped. When nothing survives, or
/// the payload was not a list at all, the result is [`fallback_history`].
pub fn normalize_history(raw: &WeightHistory, fallback: Option<f64>) -> Vec<WeightSample> {
    let samples: Vec<WeightSample> = raw
        .entries()
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| {
            let weight = entry.weight.filter(|w| w.is_finite())?;
            Some(WeightSample {
                date: format_date_label(entry.date.as_deref()),
                weight: round1(weight),
            })
        })
        .collect();
    if samples.is_empty() {
        fallback_history(fallback)
    } else {
        samples
    }
}

/// First raw history weight, then latest, entry and current weight, then 0.
pub fn fallback_weight(raw: &WeightHistory, animal: &AnimalRecord) -> f64 {
    raw.first_weight()
        .or(animal.latest_weight)
        .or(animal.entry_weight)
        .or(animal.current_weight)
        .unwrap_or(0.0)
}

pub fn build_view_model(animal: &AnimalRecord, raw: &WeightHistory) -> AnimalViewModel {
    let fallback = fallback_weight(raw, animal);
    AnimalViewModel::new(animal, normalize_history(raw, Some(fallback)))
}

/// View model for an animal whose history could not be fetched.
pub fn failed_view_model(animal: &AnimalRecord) -> AnimalViewModel {
    AnimalViewModel::new(animal, fallback_history(animal.entry_weight))
}

/// Fetch every animal's history concurrently and build one view model each.
///
/// A failed history fetch is logged and replaced by [`failed_view_model`];
/// the batch still succeeds. The only error returned is an authentication
/// failure, which ends the session for every item alike. Output order matches
/// input order.
pub async fn fetch_animal_data(
    client: &dyn BovicareClient,
    animals: &[AnimalRecord],
) -> Result<Vec<AnimalViewModel>, BovicareError> {
    let results = join_all(animals.iter().map(|animal| async move {
        (animal, client.get_weight_history(&animal.id).await)
    }))
    .await;

    let mut auth_error = None;
    let models: Vec<AnimalViewModel> = results
        .into_iter()
        .map(|(animal, res)| match res {
            Ok(raw) => build_view_model(animal, &raw),
            Err(e) => {
                tracing::warn!(
                    animal_id = %animal.id,
                    name = %animal.display_name(),
                    transport = e.is_transport(),
                    error = %e,
                    "weight history unavailable; using fallback"
                );
                metrics::counter!(HISTORY_FALLBACKS_TOTAL).increment(1);
                if e.is_auth() && auth_error.is_none() {
                    auth_error = Some(e);
                }
                failed_view_model(animal)
            }
        })
        .collect();

    match auth_error {
        Some(e) => Err(e),
        None => Ok(models),
    }
}
