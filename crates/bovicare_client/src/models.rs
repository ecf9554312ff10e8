//! Wire models for the BoviCare backend.
//!
//! Every optional field is tolerant: absent keys, `null`, or a badly typed
//! value all land as `None` rather than failing the whole payload.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::BovicareError;
use crate::utils::{
    deserialize_id, deserialize_lenient_f64, deserialize_opt_string, to_number, value_to_string,
};

fn deserialize_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

fn deserialize_lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(to_number)
        .filter(|n| *n >= 0.0)
        .map(|n| n as u64))
}

// === Users ===

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct User {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: User,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryMethod {
    Email,
    Sms,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ForgotPasswordRequest {
    pub method: RecoveryMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VerifyCodeRequest {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
    #[serde(skip_serializing)]
    pub confirm_password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

// === Animals ===

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AnimalRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub earring: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub breed: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub entry_weight: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub target_weight: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub latest_weight: Option<f64>,
    #[serde(
        default,
        alias = "currentWeight",
        deserialize_with = "deserialize_lenient_f64"
    )]
    pub current_weight: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub birth_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub herd_id: Option<String>,
}

impl AnimalRecord {
    /// A record carrying only an id; every other field absent.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            earring: None,
            breed: None,
            gender: None,
            status: None,
            entry_weight: None,
            target_weight: None,
            latest_weight: None,
            current_weight: None,
            birth_date: None,
            herd_id: None,
        }
    }

    /// Name, then ear tag, then a generated placeholder.
    pub fn display_name(&self) -> String {
        [&self.name, &self.earring]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("Gado {}", self.id))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimalQuery {
    pub herd_id: Option<String>,
    pub status: Option<String>,
    pub breed: Option<String>,
}

impl AnimalQuery {
    pub fn for_herd(herd_id: impl Into<String>) -> Self {
        Self {
            herd_id: Some(herd_id.into()),
            ..Self::default()
        }
    }

    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("per_page", "1000".to_string()), ("page", "1".to_string())];
        if let Some(h) = self.herd_id.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("herd_id", h.clone()));
        }
        if let Some(s) = self.status.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("status", s.clone()));
        }
        if let Some(b) = self.breed.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("breed", b.clone()));
        }
        pairs
    }
}

/// Animal registration form as entered by the user.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct AnimalInput {
    pub earring: Option<String>,
    pub name: Option<String>,
    pub breed: Option<String>,
    pub birth_date: Option<String>,
    pub origin: Option<String>,
    pub gender: Option<String>,
    pub status: Option<String>,
    pub mother_id: Option<String>,
    pub father_id: Option<String>,
    pub herd_id: Option<String>,
    pub entry_weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub user_id: Option<String>,
    /// Herds offered in the form; a single option fills a missing `herd_id` on create.
    #[serde(default)]
    pub herd_options: Vec<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AnimalPayload {
    pub earring: Option<String>,
    pub name: Option<String>,
    pub breed: Option<String>,
    pub birth_date: Option<String>,
    pub origin: Option<String>,
    pub gender: Option<String>,
    pub status: String,
    pub mother_id: Option<String>,
    pub father_id: Option<String>,
    pub herd_id: Option<String>,
    pub entry_weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub user_id: String,
}

impl AnimalInput {
    /// Build the request body, filling defaults and the owning user.
    pub fn to_payload(
        &self,
        session_user_id: Option<String>,
        for_create: bool,
    ) -> Result<AnimalPayload, BovicareError> {
        let user_id = self
            .user_id
            .clone()
            .filter(|s| !s.is_empty())
            .or(session_user_id)
            .ok_or_else(|| {
                BovicareError::Session(
                    "Usuário não identificado para cadastro de gado. Faça login novamente.".into(),
                )
            })?;
        let mut herd_id = self.herd_id.clone().filter(|s| !s.is_empty());
        if for_create && herd_id.is_none() && self.herd_options.len() == 1 {
            herd_id = self.herd_options.first().cloned();
        }
        Ok(AnimalPayload {
            earring: self
                .earring
                .clone()
                .filter(|s| !s.is_empty())
                .or_else(|| self.name.clone()),
            name: self.name.clone(),
            breed: self.breed.clone(),
            birth_date: self.birth_date.clone(),
            origin: self.origin.clone(),
            gender: self.gender.clone(),
            status: self
                .status
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "ativo".into()),
            mother_id: self.mother_id.clone(),
            father_id: self.father_id.clone(),
            herd_id,
            entry_weight: self.entry_weight,
            target_weight: self.target_weight,
            user_id,
        })
    }
}

// === Herds ===

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Herd {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct HerdInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    pub city: String,
    pub area: Option<f64>,
    pub capacity: Option<u32>,
    pub owner_name: Option<String>,
    pub employees_count: Option<u32>,
}

impl HerdInput {
    pub fn validate(&self) -> Result<(), BovicareError> {
        let missing = [&self.name, &self.city, &self.location]
            .iter()
            .any(|s| s.trim().is_empty());
        if missing {
            return Err(BovicareError::InvalidInput(
                "Por favor, preencha todos os campos obrigatórios".into(),
            ));
        }
        Ok(())
    }
}

// === Weights ===

/// One raw history entry; `weight` is `None` when the source value is not numeric.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct RawWeightEntry {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub weight: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewWeight {
    #[serde(rename = "cattleId")]
    pub animal_id: String,
    pub weight: f64,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Criteria for the server-side cattle filter; serialized in camelCase.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub herd_id: Option<String>,
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub breeds: BTreeMap<String, bool>,
    pub situations: BTreeMap<String, bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<String>,
}

// === Dashboard & activity ===

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct HerdDistribution {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_count")]
    pub count: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct RecentWeighing {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub animal_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct DashboardResponse {
    #[serde(default, deserialize_with = "deserialize_lenient_count")]
    pub total_animals: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_lenient_count")]
    pub active_animals: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub herds_distribution: Vec<Option<HerdDistribution>>,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub recent_weighings: Vec<RecentWeighing>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Animal,
    Herd,
    Weighing,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Create,
    Update,
    Alert,
    #[default]
    #[serde(other)]
    Unspecified,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ActivityRecord {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub object_type: ObjectType,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub object_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub object_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub action: ActivityAction,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub datetime: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub extra: Option<Value>,
}

impl ActivityRecord {
    /// Weight carried by a weighing record, preferring `extra.weight`.
    pub fn weight_label(&self) -> Option<String> {
        self.extra
            .as_ref()
            .and_then(|e| e.get("weight"))
            .and_then(value_to_string)
            .or_else(|| self.weight.map(|w| w.to_string()))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActivityFilter {
    pub user_id: Option<String>,
    pub username: Option<String>,
}

impl ActivityFilter {
    pub fn is_empty(&self) -> bool {
        self.user_id.as_deref().is_none_or(str::is_empty)
            && self.username.as_deref().is_none_or(str::is_empty)
    }
}

// === Chat ===

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ChatReply {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub reply: Option<String>,
    #[serde(default)]
    pub sources: Vec<Value>,
}
