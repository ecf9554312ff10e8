//! Weight-board filters: the client-side predicate and the server-side criteria.

use std::collections::BTreeMap;

use bovicare_client::FilterCriteria;
use serde::{Deserialize, Serialize};

use crate::domains::weight::AnimalViewModel;
use crate::transforms::today_iso;

pub const BREED_KEYS: [&str; 4] = ["nelore", "girolando", "angus", "outro"];
pub const SITUATION_KEYS: [&str; 4] = ["aboveAverage", "belowAverage", "rapidGrowth", "stable"];

pub const DEFAULT_MIN_WEIGHT: f64 = 200.0;
pub const DEFAULT_MAX_WEIGHT: f64 = 700.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeightFilters {
    pub start_date: String,
    pub end_date: String,
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
    /// Breed keyword → checked.
    pub breeds: BTreeMap<String, bool>,
    pub situations: BTreeMap<String, bool>,
}

impl Default for WeightFilters {
    fn default() -> Self {
        let today = today_iso();
        Self {
            start_date: today.clone(),
            end_date: today,
            min_weight: Some(DEFAULT_MIN_WEIGHT),
            max_weight: Some(DEFAULT_MAX_WEIGHT),
            breeds: BREED_KEYS.iter().map(|k| (k.to_string(), false)).collect(),
            situations: SITUATION_KEYS
                .iter()
                .map(|k| (k.to_string(), false))
                .collect(),
        }
    }
}

impl WeightFilters {
    /// Checked breed keywords, lowercased.
    pub fn active_breeds(&self) -> Vec<String> {
        self.breeds
            .iter()
            .filter(|(_, on)| **on)
            .map(|(k, _)| k.to_lowercase())
            .collect()
    }

    /// Body for `POST /api/cattle/filter`.
    pub fn to_criteria(&self, herd_id: Option<&str>) -> FilterCriteria {
        FilterCriteria {
            herd_id: herd_id.map(str::to_string),
            min_weight: self.min_weight,
            max_weight: self.max_weight,
            breeds: self.breeds.clone(),
            situations: self.situations.clone(),
            start_date: Some(self.start_date.clone()).filter(|s| !s.is_empty()),
            end_date: Some(self.end_date.clone()).filter(|s| !s.is_empty()),
            user_id: None,
        }
    }
}

/// Narrow `all` by weight bounds and breed keywords. `all` is left untouched.
///
/// A non-finite current weight fails any active bound. Breed matching is a
/// case-insensitive substring test against any checked keyword.
pub fn apply_filters(all: &[AnimalViewModel], filters: &WeightFilters) -> Vec<AnimalViewModel> {
    let min = filters.min_weight.filter(|v| v.is_finite());
    let max = filters.max_weight.filter(|v| v.is_finite());
    let breeds = filters.active_breeds();

    all.iter()
        .filter(|a| min.is_none_or(|min| a.current_weight >= min))
        .filter(|a| max.is_none_or(|max| a.current_weight <= max))
        .filter(|a| {
            if breeds.is_empty() {
                return true;
            }
            let breed = a.meta.breed.to_lowercase();
            breeds.iter().any(|b| breed.contains(b.as_str()))
        })
        .cloned()
        .collect()
}

pub fn situation_label(key: &str) -> &str {
    match key {
        "aboveAverage" => "Acima da média",
        "belowAverage" => "Abaixo da média",
        "rapidGrowth" => "Crescimento rápido",
        "stable" => "Estável",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::weight::{AnimalMeta, WeightSample};

    fn vm(id: &str, weight: f64, breed: &str) -> AnimalViewModel {
        let history = vec![WeightSample {
            date: "01/01/2024".into(),
            weight,
        }];
        AnimalViewModel {
            id: id.into(),
            name: id.into(),
            current_weight: weight,
            weight_history: history.clone(),
            chart_data: history,
            meta: AnimalMeta {
                breed: breed.into(),
                ..AnimalMeta::default()
            },
        }
    }

    fn ids(v: &[AnimalViewModel]) -> Vec<&str> {
        v.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn defaults() {
        let f = WeightFilters::default();
        assert_eq!(f.min_weight, Some(200.0));
        assert_eq!(f.max_weight, Some(700.0));
        assert_eq!(f.start_date, f.end_date);
        assert!(f.active_breeds().is_empty());
        assert_eq!(f.situations.len(), 4);
    }

    #[test]
    fn weight_bounds_are_inclusive() {
        let all = vec![vm("a", 200.0, ""), vm("b", 700.0, ""), vm("c", 701.0, ""), vm("d", 150.0, "")];
        let out = apply_filters(&all, &WeightFilters::default());
        assert_eq!(ids(&out), ["a", "b"]);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn invalid_weight_is_excluded_under_bounds() {
        let all = vec![vm("a", f64::NAN, "")];
        assert!(apply_filters(&all, &WeightFilters::default()).is_empty());
        let open = WeightFilters {
            min_weight: None,
            max_weight: None,
            ..WeightFilters::default()
        };
        assert_eq!(apply_filters(&all, &open).len(), 1);
    }

    #[test]
    fn breed_matches_substring_case_insensitively() {
        let all = vec![
            vm("a", 300.0, "Nelore PO"),
            vm("b", 300.0, "Angus"),
            vm("c", 300.0, "Girolando"),
            vm("d", 300.0, ""),
        ];
        let mut f = WeightFilters::default();
        f.breeds.insert("nelore".into(), true);
        f.breeds.insert("Angus".into(), true);
        assert_eq!(ids(&apply_filters(&all, &f)), ["a", "b"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let all = vec![vm("a", 300.0, "Nelore"), vm("b", 800.0, "Angus")];
        let mut f = WeightFilters::default();
        f.breeds.insert("nelore".into(), true);
        let once = apply_filters(&all, &f);
        let twice = apply_filters(&all, &f);
        assert_eq!(once, twice);
        assert_eq!(apply_filters(&once, &f), once);
    }

    #[test]
    fn criteria_carry_all_fields() {
        let f = WeightFilters::default();
        let c = f.to_criteria(Some("h1"));
        assert_eq!(c.herd_id.as_deref(), Some("h1"));
        assert_eq!(c.min_weight, Some(200.0));
        let v = serde_json::to_value(&c).expect("json");
        assert!(v.get("herdId").is_some());
        assert!(v.get("startDate").is_some());
    }

    #[test]
    fn situation_labels() {
        assert_eq!(situation_label("aboveAverage"), "Acima da média");
        assert_eq!(situation_label("stable"), "Estável");
        assert_eq!(situation_label("other"), "other");
    }

    #[test]
    fn partial_json_uses_defaults() {
        let f: WeightFilters = serde_json::from_str(r#"{"minWeight": 350}"#).expect("filters");
        assert_eq!(f.min_weight, Some(350.0));
        assert_eq!(f.max_weight, Some(700.0));
    }
}
