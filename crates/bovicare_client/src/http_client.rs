//! HTTP client implementation for the BoviCare API.
//!
//! This module provides a reqwest-based implementation of the [`BovicareClient`](crate::BovicareClient) trait.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Method;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::envelope::{
    ActivitiesEnvelope, AnimalsEnvelope, HerdEnvelope, HerdsEnvelope, UserEnvelope, UsersEnvelope,
};
use crate::events::{ChangeNotifier, DataChange, MutationMethod};
use crate::models::*;
use crate::observability::{record_request, record_session_reset};
use crate::session::{FileSessionStore, Session};
use crate::utils::body_snippet;
use crate::validation::{
    DEFAULT_MIN_PASSWORD_LENGTH, validate_forgot_password_code,
    validate_forgot_password_selection, validate_new_password,
};
use crate::{BovicareClient, BovicareError, WeightHistory};

const LOGIN_PATH: &str = "/users/login";
const REGISTER_PATH: &str = "/users/register";
const ANIMALS_PATH: &str = "/api/v1/animals";
const HERDS_PATH: &str = "/api/v1/herds";
const WEIGHT_PATH: &str = "/api/weight";
const CATTLE_FILTER_PATH: &str = "/api/cattle/filter";
const CHAT_PATH: &str = "/api/chat/diagnose";

/// POST endpoints that read or authenticate rather than change stored data.
const NON_MUTATING_POSTS: &[&str] = &[
    LOGIN_PATH,
    CATTLE_FILTER_PATH,
    CHAT_PATH,
    "/auth/forgot-password",
    "/auth/verify-code",
    "/auth/reset-password",
];

/// Client for the BoviCare API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestBovicareClient {
    base_url: String,
    session: Arc<Session>,
    changes: ChangeNotifier,
    client: reqwest::Client,
}

impl ReqwestBovicareClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - Root of the REST API (e.g., "http://localhost:5003")
    /// * `session` - Auth context whose token and user are attached to every request
    /// * `timeout` - Client-side timeout applied to every request
    pub fn new(
        base_url: &str,
        session: Arc<Session>,
        timeout: Duration,
    ) -> Result<Self, BovicareError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            changes: ChangeNotifier::default(),
            client,
        })
    }

    /// Build a client and its session from configuration, restoring any stored session.
    pub async fn from_config(config: &Config) -> Result<Self, BovicareError> {
        let session = match &config.session_file {
            Some(path) => Session::new(Arc::new(FileSessionStore::new(path))),
            None => Session::in_memory(),
        };
        if let Err(e) = session.restore().await {
            tracing::warn!(error = %e, "could not restore stored session");
        }
        Self::new(&config.base_url, Arc::new(session), config.timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request with the session's credentials attached.
    async fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .client
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(token) = self.session.token().await {
            req = req.bearer_auth(token.expose_secret());
        }
        if let Some(user) = self.session.user().await {
            if let Some(id) = user.id.filter(|s| !s.is_empty()) {
                req = req.header("X-User-Id", id);
            }
            if let Some(name) = user.username.filter(|s| !s.is_empty()) {
                req = req.header("X-User-Name", name);
            }
        }
        req
    }

    /// Send a request, record metrics, convert failures and publish mutations.
    async fn send(
        &self,
        method: Method,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, BovicareError> {
        let started = Instant::now();
        let resp = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                record_request(&method, "error", started.elapsed());
                tracing::warn!(%method, path, error = %e, "request failed");
                return Err(e.into());
            }
        };
        record_request(&method, resp.status().as_str(), started.elapsed());
        if !resp.status().is_success() {
            return Err(self.error_from_response(path, resp).await);
        }
        if let Some(m) = MutationMethod::from_http(&method) {
            if !NON_MUTATING_POSTS.contains(&path) {
                self.changes.publish(DataChange {
                    method: m,
                    path: path.to_string(),
                });
            }
        }
        Ok(resp)
    }

    /// Execute a request and decode the JSON body.
    async fn execute_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BovicareError> {
        let resp = self.send(method, path, request).await?;
        // Read body as text first so decode errors can carry a snippet.
        let text = resp.text().await?;
        serde_json::from_str::<T>(&text).map_err(|e| {
            BovicareError::Decode(format!("{path}: {e} - body: {}", body_snippet(&text, 512)))
        })
    }

    /// Execute a request whose body is not needed.
    async fn execute_empty(
        &self,
        method: Method,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<(), BovicareError> {
        self.send(method, path, request).await.map(|_| ())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BovicareError> {
        let req = self.request(Method::GET, path).await.query(query);
        self.execute_json(Method::GET, path, req).await
    }

    async fn send_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, BovicareError> {
        let req = self.request(method.clone(), path).await.json(body);
        self.execute_json(method, path, req).await
    }

    /// Extract error information from a failed response.
    ///
    /// A 401 from anything but the login call ends the session.
    async fn error_from_response(&self, path: &str, resp: reqwest::Response) -> BovicareError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body_snippet(&body, 256));

        match status {
            401 => {
                if path != LOGIN_PATH {
                    tracing::warn!(path, "authentication rejected; clearing session");
                    self.session.clear().await;
                    record_session_reset();
                }
                BovicareError::Auth(message)
            }
            404 => BovicareError::NotFound(message),
            400 | 422 => BovicareError::InvalidInput(message),
            _ => BovicareError::from_status(status, message),
        }
    }

    /// Explicit id, else the session user's id.
    async fn resolve_user_id(&self, user_id: Option<&str>) -> Option<String> {
        match user_id.filter(|s| !s.is_empty()) {
            Some(id) => Some(id.to_string()),
            None => self.session.user_id().await,
        }
    }

    async fn require_user_id(&self, user_id: Option<&str>) -> Result<String, BovicareError> {
        self.resolve_user_id(user_id)
            .await
            .ok_or_else(|| BovicareError::Session("ID do usuário não encontrado".into()))
    }

    async fn user_query(&self) -> Vec<(&'static str, String)> {
        self.session
            .user_id()
            .await
            .map(|id| vec![("user_id", id)])
            .unwrap_or_default()
    }
}

#[async_trait]
impl BovicareClient for ReqwestBovicareClient {
    fn session(&self) -> &Session {
        &self.session
    }

    fn changes(&self) -> &ChangeNotifier {
        &self.changes
    }

    async fn register_user(&self, user: &NewUser) -> Result<serde_json::Value, BovicareError> {
        self.send_json(Method::POST, REGISTER_PATH, user).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BovicareError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(BovicareError::InvalidInput(
                "Informe e-mail e senha".into(),
            ));
        }
        let resp: LoginResponse = self
            .send_json(Method::POST, LOGIN_PATH, credentials)
            .await?;
        self.session.set(&resp.token, resp.user.clone()).await?;
        tracing::info!(user_id = ?resp.user.id, "logged in");
        Ok(resp)
    }

    async fn logout(&self) -> Result<(), BovicareError> {
        self.session.clear().await;
        Ok(())
    }

    async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> Result<serde_json::Value, BovicareError> {
        let v = validate_forgot_password_selection(
            Some(request.method),
            request.email.as_deref(),
            request.phone.as_deref(),
        );
        if !v.is_valid() {
            return Err(BovicareError::InvalidInput(v.summary()));
        }
        self.send_json(Method::POST, "/auth/forgot-password", request)
            .await
    }

    async fn verify_reset_code(
        &self,
        request: &VerifyCodeRequest,
    ) -> Result<serde_json::Value, BovicareError> {
        let v = validate_forgot_password_code(&request.code);
        if !v.is_valid() {
            return Err(BovicareError::InvalidInput(v.summary()));
        }
        let body = VerifyCodeRequest {
            code: request.code.trim().to_string(),
            email: request.email.clone(),
        };
        self.send_json(Method::POST, "/auth/verify-code", &body)
            .await
    }

    async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<serde_json::Value, BovicareError> {
        let v = validate_new_password(
            &request.new_password,
            &request.confirm_password,
            DEFAULT_MIN_PASSWORD_LENGTH,
        );
        if !v.is_valid() {
            return Err(BovicareError::InvalidInput(v.summary()));
        }
        self.send_json(Method::POST, "/auth/reset-password", request)
            .await
    }

    async fn get_current_user(&self, user_id: Option<&str>) -> Result<User, BovicareError> {
        let id = self.require_user_id(user_id).await?;
        let env: UserEnvelope = self
            .get_json("/api/user/current", &[("user_id", id)])
            .await?;
        Ok(env.into_user())
    }

    async fn update_profile(
        &self,
        fields: &serde_json::Value,
    ) -> Result<serde_json::Value, BovicareError> {
        self.send_json(Method::PUT, "/api/user/profile", fields)
            .await
    }

    async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<serde_json::Value, BovicareError> {
        let body = ChangePasswordRequest {
            user_id: self.resolve_user_id(request.user_id.as_deref()).await,
            ..request.clone()
        };
        self.send_json(Method::PUT, "/api/user/change-password", &body)
            .await
    }

    async fn get_profile_data(
        &self,
        user_id: Option<&str>,
    ) -> Result<serde_json::Value, BovicareError> {
        let id = self.require_user_id(user_id).await?;
        self.get_json("/api/profile", &[("user_id", id)]).await
    }

    async fn get_user_stats(
        &self,
        user_id: Option<&str>,
    ) -> Result<serde_json::Value, BovicareError> {
        let id = self.require_user_id(user_id).await?;
        self.get_json("/api/user/stats", &[("user_id", id)]).await
    }

    async fn list_users(&self) -> Result<Vec<User>, BovicareError> {
        let env: UsersEnvelope = self.get_json("/users", &[]).await?;
        Ok(env.into_users())
    }

    async fn get_user(&self, user_id: &str) -> Result<User, BovicareError> {
        let env: UserEnvelope = self.get_json(&format!("/users/{user_id}"), &[]).await?;
        Ok(env.into_user())
    }

    async fn create_user(&self, user: &NewUser) -> Result<serde_json::Value, BovicareError> {
        self.send_json(Method::POST, REGISTER_PATH, user).await
    }

    async fn update_user(
        &self,
        user_id: &str,
        fields: &serde_json::Value,
    ) -> Result<serde_json::Value, BovicareError> {
        self.send_json(Method::PUT, &format!("/users/{user_id}"), fields)
            .await
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), BovicareError> {
        let path = format!("/users/{user_id}");
        let req = self.request(Method::DELETE, &path).await;
        self.execute_empty(Method::DELETE, &path, req).await
    }

    async fn list_animals(&self, query: &AnimalQuery) -> Result<Vec<AnimalRecord>, BovicareError> {
        let env: AnimalsEnvelope = self.get_json(ANIMALS_PATH, &query.to_pairs()).await?;
        env.into_animals()
            .ok_or_else(|| BovicareError::UnexpectedShape(ANIMALS_PATH.to_string()))
    }

    async fn create_animal(&self, animal: &AnimalInput) -> Result<serde_json::Value, BovicareError> {
        let payload = animal.to_payload(self.session.user_id().await, true)?;
        self.send_json(Method::POST, ANIMALS_PATH, &payload).await
    }

    async fn update_animal(
        &self,
        animal_id: &str,
        animal: &AnimalInput,
    ) -> Result<serde_json::Value, BovicareError> {
        let payload = animal.to_payload(self.session.user_id().await, false)?;
        self.send_json(Method::PUT, &format!("{ANIMALS_PATH}/{animal_id}"), &payload)
            .await
    }

    async fn delete_animal(&self, animal_id: &str) -> Result<(), BovicareError> {
        let path = format!("{ANIMALS_PATH}/{animal_id}");
        let query = self.user_query().await;
        let req = self.request(Method::DELETE, &path).await.query(&query);
        self.execute_empty(Method::DELETE, &path, req).await
    }

    async fn list_herds(&self) -> Result<Vec<Herd>, BovicareError> {
        let query = self.user_query().await;
        let env: HerdsEnvelope = self.get_json(HERDS_PATH, &query).await?;
        Ok(env.into_herds())
    }

    async fn get_herd(&self, herd_id: &str) -> Result<Herd, BovicareError> {
        let env: HerdEnvelope = self
            .get_json(&format!("{HERDS_PATH}/{herd_id}"), &[])
            .await?;
        Ok(env.into_herd())
    }

    async fn create_herd(&self, herd: &HerdInput) -> Result<serde_json::Value, BovicareError> {
        herd.validate()?;
        self.send_json(Method::POST, HERDS_PATH, herd).await
    }

    async fn update_herd(
        &self,
        herd_id: &str,
        herd: &HerdInput,
    ) -> Result<serde_json::Value, BovicareError> {
        herd.validate()?;
        self.send_json(Method::PUT, &format!("{HERDS_PATH}/{herd_id}"), herd)
            .await
    }

    async fn delete_herd(&self, herd_id: &str) -> Result<(), BovicareError> {
        let path = format!("{HERDS_PATH}/{herd_id}");
        let req = self.request(Method::DELETE, &path).await;
        self.execute_empty(Method::DELETE, &path, req).await
    }

    async fn get_weight_history(&self, animal_id: &str) -> Result<WeightHistory, BovicareError> {
        let query = self.user_query().await;
        let value: serde_json::Value = self
            .get_json(&format!("{WEIGHT_PATH}/{animal_id}"), &query)
            .await?;
        Ok(WeightHistory::from_value(value))
    }

    async fn add_weight(&self, weight: &NewWeight) -> Result<serde_json::Value, BovicareError> {
        if weight.animal_id.trim().is_empty() {
            return Err(BovicareError::InvalidInput(
                "Selecione um gado para registrar o peso.".into(),
            ));
        }
        if !weight.weight.is_finite() {
            return Err(BovicareError::InvalidInput("peso inválido".into()));
        }
        let body = NewWeight {
            user_id: self.resolve_user_id(weight.user_id.as_deref()).await,
            ..weight.clone()
        };
        self.send_json(Method::POST, WEIGHT_PATH, &body).await
    }

    async fn filter_cattle(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<AnimalRecord>, BovicareError> {
        let body = FilterCriteria {
            user_id: self.resolve_user_id(criteria.user_id.as_deref()).await,
            ..criteria.clone()
        };
        let env: AnimalsEnvelope = self
            .send_json(Method::POST, CATTLE_FILTER_PATH, &body)
            .await?;
        Ok(env.into_animals().unwrap_or_default())
    }

    async fn get_weight_stats(&self) -> Result<serde_json::Value, BovicareError> {
        self.get_json("/api/weight/stats", &[]).await
    }

    async fn get_weight_report(&self) -> Result<serde_json::Value, BovicareError> {
        let query = self.user_query().await;
        self.get_json("/api/weight/report", &query).await
    }

    async fn get_dashboard(&self) -> Result<DashboardResponse, BovicareError> {
        let query = self.user_query().await;
        self.get_json("/api/v1/dashboard", &query).await
    }

    async fn get_recent_activities(
        &self,
        filter: &ActivityFilter,
    ) -> Result<Vec<ActivityRecord>, BovicareError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(id) = filter.user_id.as_ref().filter(|s| !s.is_empty()) {
            query.push(("user_id", id.clone()));
        }
        if let Some(name) = filter.username.as_ref().filter(|s| !s.is_empty()) {
            query.push(("username", name.clone()));
        }
        let env: ActivitiesEnvelope = self.get_json("/api/v1/activities", &query).await?;
        Ok(env.into_activities())
    }

    async fn chat_diagnose(&self, message: &str) -> Result<ChatReply, BovicareError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(BovicareError::InvalidInput("mensagem vazia".into()));
        }
        self.send_json(
            Method::POST,
            CHAT_PATH,
            &serde_json::json!({ "message": message }),
        )
        .await
    }
}
