//! JSON surface of the views service.

use std::sync::Arc;

use axum::debug_handler;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use bovicare_client::{BovicareError, Credentials, Herd, NewWeight, User};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};

use crate::BovicareViews;
use crate::domains::chart::ChartView;
use crate::domains::chat::{ChatMessage, ReplySection, Sender, split_reply_sections};
use crate::domains::filters::WeightFilters;
use crate::domains::notifications::NotificationsView;
use crate::error::ViewError;
use crate::services::{DashboardView, WeightBoard};
use crate::state::ViewScope;
use crate::transforms::today_iso;

pub struct AppState {
    pub views: BovicareViews,
    pub metrics: PrometheusHandle,
}

type HandlerResult<T> = Result<T, (StatusCode, String)>;

pub fn map_err(e: ViewError) -> (StatusCode, String) {
    let status = match &e {
        ViewError::Api(api) => match api {
            BovicareError::Auth(_) | BovicareError::Session(_) => StatusCode::UNAUTHORIZED,
            BovicareError::NotFound(_) => StatusCode::NOT_FOUND,
            BovicareError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        },
        ViewError::Validation(_) => StatusCode::BAD_REQUEST,
        ViewError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ViewError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(%status, error = %e, "request failed");
    }
    (status, e.to_string())
}

#[derive(Serialize)]
struct SessionDto {
    authenticated: bool,
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct ChartParams {
    pub herd_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeightRequest {
    pub herd_id: String,
    pub animal_id: String,
    pub weight: f64,
    /// Defaults to today.
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub animal_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
struct ChatDto {
    messages: Vec<ChatMessage>,
    /// Sections of the latest assistant message.
    sections: Vec<ReplySection>,
}

impl ChatDto {
    fn from_messages(messages: &[ChatMessage]) -> Self {
        let sections = messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Assistant)
            .map(|m| split_reply_sections(&m.text))
            .unwrap_or_default();
        Self {
            messages: messages.to_vec(),
            sections,
        }
    }
}

#[debug_handler]
async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[debug_handler]
async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.metrics.render();
    ([("content-type", "text/plain; version=0.0.4")], body)
}

#[debug_handler]
async fn login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> HandlerResult<Json<SessionDto>> {
    let resp = state.views.session.login(&credentials).await.map_err(map_err)?;
    state.views.reset().await;
    tracing::info!(user_id = ?resp.user.id, "signed in");
    Ok(Json(SessionDto {
        authenticated: true,
        user: Some(resp.user),
    }))
}

#[debug_handler]
async fn logout(State(state): State<Arc<AppState>>) -> HandlerResult<StatusCode> {
    state.views.session.logout().await.map_err(map_err)?;
    state.views.reset().await;
    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler]
async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionDto> {
    let session = state.views.client().session();
    Json(SessionDto {
        authenticated: session.is_authenticated().await,
        user: session.user().await,
    })
}

#[debug_handler]
async fn list_herds(State(state): State<Arc<AppState>>) -> HandlerResult<Json<Vec<Herd>>> {
    let scope = ViewScope::new();
    let herds = state.views.boards.herds(&scope).await;
    state.views.guard(herds).await.map(Json).map_err(map_err)
}

#[debug_handler]
async fn get_board(
    State(state): State<Arc<AppState>>,
    Path(herd_id): Path<String>,
) -> HandlerResult<Json<WeightBoard>> {
    let scope = ViewScope::new();
    let board = state.views.boards.load_board(&scope, &herd_id).await;
    let board = state.views.guard(board).await.map_err(map_err)?;
    Ok(Json(state.views.store_board(board).await))
}

#[debug_handler]
async fn filter_board(
    State(state): State<Arc<AppState>>,
    Path(herd_id): Path<String>,
    Json(filters): Json<WeightFilters>,
) -> HandlerResult<Json<WeightBoard>> {
    let scope = ViewScope::new();
    let mut board = state.views.board(&scope, &herd_id).await.map_err(map_err)?;
    board.apply_client_filters(filters);
    Ok(Json(state.views.store_board(board).await))
}

#[debug_handler]
async fn clear_board_filters(
    State(state): State<Arc<AppState>>,
    Path(herd_id): Path<String>,
) -> HandlerResult<Json<WeightBoard>> {
    let scope = ViewScope::new();
    let mut board = state.views.board(&scope, &herd_id).await.map_err(map_err)?;
    board.clear_filters();
    Ok(Json(state.views.store_board(board).await))
}

#[debug_handler]
async fn server_filter_board(
    State(state): State<Arc<AppState>>,
    Path(herd_id): Path<String>,
    Json(filters): Json<WeightFilters>,
) -> HandlerResult<Json<WeightBoard>> {
    let scope = ViewScope::new();
    let board = state.views.board(&scope, &herd_id).await.map_err(map_err)?;
    let board = state.views.boards.server_filter(&scope, &board, filters).await;
    let board = state.views.guard(board).await.map_err(map_err)?;
    Ok(Json(state.views.store_board(board).await))
}

#[debug_handler]
async fn select_main_animal(
    State(state): State<Arc<AppState>>,
    Path(herd_id): Path<String>,
    Json(req): Json<SelectRequest>,
) -> HandlerResult<Json<WeightBoard>> {
    let scope = ViewScope::new();
    let mut board = state.views.board(&scope, &herd_id).await.map_err(map_err)?;
    if !board.select(&req.animal_id) {
        return Err((
            StatusCode::NOT_FOUND,
            format!("animal {} is not on the board", req.animal_id),
        ));
    }
    Ok(Json(state.views.store_board(board).await))
}

#[debug_handler]
async fn animal_chart(
    State(state): State<Arc<AppState>>,
    Path(animal_id): Path<String>,
    Query(params): Query<ChartParams>,
) -> HandlerResult<Json<ChartView>> {
    let scope = ViewScope::new();
    let cached = match params.herd_id.as_deref() {
        Some(herd_id) => state.views.cached_board(herd_id).await,
        None => None,
    };
    let vm = cached.as_ref().and_then(|b| b.find(&animal_id));
    let chart = state.views.boards.animal_chart(&scope, vm, &animal_id).await;
    state.views.guard(chart).await.map(Json).map_err(map_err)
}

#[debug_handler]
async fn add_weight(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WeightRequest>,
) -> HandlerResult<Json<WeightBoard>> {
    let scope = ViewScope::new();
    let weight = NewWeight {
        animal_id: req.animal_id,
        weight: req.weight,
        date: req
            .date
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(today_iso),
        user_id: None,
    };
    let board = state.views.boards.add_weight(&scope, &req.herd_id, &weight).await;
    let board = state.views.guard(board).await.map_err(map_err)?;
    Ok(Json(state.views.store_board(board).await))
}

#[debug_handler]
async fn dashboard(State(state): State<Arc<AppState>>) -> HandlerResult<Json<DashboardView>> {
    let scope = ViewScope::new();
    state
        .views
        .load_dashboard(&scope)
        .await
        .map(Json)
        .map_err(map_err)
}

#[debug_handler]
async fn notifications(State(state): State<Arc<AppState>>) -> Json<NotificationsView> {
    Json(state.views.notifications().await)
}

#[debug_handler]
async fn read_all(State(state): State<Arc<AppState>>) -> Json<NotificationsView> {
    Json(state.views.mark_all_read().await)
}

#[debug_handler]
async fn read_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult<Json<NotificationsView>> {
    state
        .views
        .mark_read(&id)
        .await
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("notification {id} not found")))
}

#[debug_handler]
async fn report(State(state): State<Arc<AppState>>) -> HandlerResult<Json<serde_json::Value>> {
    let report = state
        .views
        .client()
        .get_weight_report()
        .await
        .map_err(ViewError::from);
    state.views.guard(report).await.map(Json).map_err(map_err)
}

#[debug_handler]
async fn chat_transcript(State(state): State<Arc<AppState>>) -> Json<ChatDto> {
    let transcript = state.views.transcript().await;
    Json(ChatDto::from_messages(transcript.messages()))
}

#[debug_handler]
async fn send_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> HandlerResult<Json<ChatDto>> {
    let transcript = state.views.send_chat(&req.message).await.map_err(map_err)?;
    Ok(Json(ChatDto::from_messages(transcript.messages())))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/session", get(get_session).post(login).delete(logout))
        .route("/herds", get(list_herds))
        .route("/herds/{id}/board", get(get_board))
        .route(
            "/herds/{id}/board/filter",
            post(filter_board).delete(clear_board_filters),
        )
        .route("/herds/{id}/board/server-filter", post(server_filter_board))
        .route("/herds/{id}/board/main", post(select_main_animal))
        .route("/animals/{id}/chart", get(animal_chart))
        .route("/weights", post(add_weight))
        .route("/dashboard", get(dashboard))
        .route("/notifications", get(notifications))
        .route("/notifications/read-all", post(read_all))
        .route("/notifications/{id}/read", post(read_one))
        .route("/report", get(report))
        .route("/chat", get(chat_transcript).post(send_chat))
        .with_state(state)
}
