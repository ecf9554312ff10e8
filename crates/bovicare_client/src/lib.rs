//! Typed async client for the BoviCare REST backend.
//!
//! The [`BovicareClient`] trait is the seam consumers program against;
//! [`http_client::ReqwestBovicareClient`] is the reqwest-based implementation.

use async_trait::async_trait;
use thiserror::Error;

pub mod config;
pub mod envelope;
pub mod events;
pub mod http_client;
pub mod models;
pub mod observability;
pub mod session;
pub mod utils;
pub mod validation;

pub use envelope::WeightHistory;
pub use events::{ChangeNotifier, DataChange};
pub use models::*;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};

#[derive(Debug, Error)]
pub enum BovicareError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("decoding error: {0}")]
    Decode(String),
    #[error("unexpected response shape from {0}")]
    UnexpectedShape(String),
    #[error("session error: {0}")]
    Session(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl BovicareError {
    pub fn from_status(status: u16, message: String) -> Self {
        BovicareError::Api { status, message }
    }

    /// True for failures that end the session (HTTP 401 outside the login call).
    pub fn is_auth(&self) -> bool {
        matches!(self, BovicareError::Auth(_))
    }

    /// True for transport-level failures, including the client-side timeout.
    pub fn is_transport(&self) -> bool {
        match self {
            BovicareError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

#[async_trait]
pub trait BovicareClient: Send + Sync + 'static {
    /// The injected session this client attaches to every request.
    fn session(&self) -> &Session;

    /// Change notifications published after successful mutations.
    fn changes(&self) -> &ChangeNotifier;

    // === Auth & users ===

    async fn register_user(&self, user: &NewUser) -> Result<serde_json::Value, BovicareError>;

    /// Log in and store the returned token and user in the session.
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BovicareError>;

    /// Clear the stored token and user.
    async fn logout(&self) -> Result<(), BovicareError>;

    async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> Result<serde_json::Value, BovicareError>;

    async fn verify_reset_code(
        &self,
        request: &VerifyCodeRequest,
    ) -> Result<serde_json::Value, BovicareError>;

    async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<serde_json::Value, BovicareError>;

    /// Current user; falls back to the session user id when `user_id` is `None`.
    async fn get_current_user(&self, user_id: Option<&str>) -> Result<User, BovicareError>;

    async fn update_profile(
        &self,
        fields: &serde_json::Value,
    ) -> Result<serde_json::Value, BovicareError>;

    async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<serde_json::Value, BovicareError>;

    async fn get_profile_data(
        &self,
        user_id: Option<&str>,
    ) -> Result<serde_json::Value, BovicareError>;

    async fn get_user_stats(&self, user_id: Option<&str>)
    -> Result<serde_json::Value, BovicareError>;

    // === Admin users ===

    async fn list_users(&self) -> Result<Vec<User>, BovicareError>;

    async fn get_user(&self, user_id: &str) -> Result<User, BovicareError>;

    async fn create_user(&self, user: &NewUser) -> Result<serde_json::Value, BovicareError>;

    async fn update_user(
        &self,
        user_id: &str,
        fields: &serde_json::Value,
    ) -> Result<serde_json::Value, BovicareError>;

    async fn delete_user(&self, user_id: &str) -> Result<(), BovicareError>;

    // === Animals ===

    async fn list_animals(&self, query: &AnimalQuery) -> Result<Vec<AnimalRecord>, BovicareError>;

    async fn create_animal(&self, animal: &AnimalInput) -> Result<serde_json::Value, BovicareError>;

    async fn update_animal(
        &self,
        animal_id: &str,
        animal: &AnimalInput,
    ) -> Result<serde_json::Value, BovicareError>;

    async fn delete_animal(&self, animal_id: &str) -> Result<(), BovicareError>;

    // === Herds ===

    async fn list_herds(&self) -> Result<Vec<Herd>, BovicareError>;

    async fn get_herd(&self, herd_id: &str) -> Result<Herd, BovicareError>;

    async fn create_herd(&self, herd: &HerdInput) -> Result<serde_json::Value, BovicareError>;

    async fn update_herd(
        &self,
        herd_id: &str,
        herd: &HerdInput,
    ) -> Result<serde_json::Value, BovicareError>;

    async fn delete_herd(&self, herd_id: &str) -> Result<(), BovicareError>;

    // === Weights ===

    /// Raw weight history for one animal, normalised to one canonical shape.
    async fn get_weight_history(&self, animal_id: &str) -> Result<WeightHistory, BovicareError>;

    async fn add_weight(&self, weight: &NewWeight) -> Result<serde_json::Value, BovicareError>;

    /// Server-side filter; unknown response shapes yield an empty list.
    async fn filter_cattle(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<AnimalRecord>, BovicareError>;

    async fn get_weight_stats(&self) -> Result<serde_json::Value, BovicareError>;

    /// Aggregate report; consumed as an opaque document.
    async fn get_weight_report(&self) -> Result<serde_json::Value, BovicareError>;

    // === Dashboard ===

    async fn get_dashboard(&self) -> Result<DashboardResponse, BovicareError>;

    async fn get_recent_activities(
        &self,
        filter: &ActivityFilter,
    ) -> Result<Vec<ActivityRecord>, BovicareError>;

    // === Chat ===

    async fn chat_diagnose(&self, message: &str) -> Result<ChatReply, BovicareError>;
}
