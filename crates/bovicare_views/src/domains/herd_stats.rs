use serde::Serialize;

use crate::domains::weight::AnimalViewModel;
use crate::transforms::{EMPTY_LABEL, round1};

/// Average, max and min current weight. `None` means no valid samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightStats {
    pub average_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub min_weight: Option<f64>,
}

impl WeightStats {
    pub fn labels(&self) -> StatLabels {
        StatLabels {
            average_weight: stat_label(self.average_weight),
            max_weight: stat_label(self.max_weight),
            min_weight: stat_label(self.min_weight),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatLabels {
    pub average_weight: String,
    pub max_weight: String,
    pub min_weight: String,
}

pub fn update_stats(animals: &[AnimalViewModel]) -> WeightStats {
    let weights: Vec<f64> = animals
        .iter()
        .map(|a| a.current_weight)
        .filter(|w| w.is_finite())
        .collect();
    if weights.is_empty() {
        return WeightStats::default();
    }
    let total: f64 = weights.iter().sum();
    WeightStats {
        average_weight: Some(round1(total / weights.len() as f64)),
        max_weight: weights.iter().copied().reduce(f64::max),
        min_weight: weights.iter().copied().reduce(f64::min),
    }
}

/// `"{v} Kg"`, or the placeholder when absent.
pub fn stat_label(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v} Kg"),
        None => EMPTY_LABEL.to_string(),
    }
}
