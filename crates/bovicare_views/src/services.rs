//! Services composing the client with the view-model domains.
//!
//! Every load takes the caller's [`ViewScope`]; results from a closed scope
//! are discarded with [`ViewError::Cancelled`].

use std::sync::Arc;

use bovicare_client::{
    ActivityFilter, ActivityRecord, AnimalQuery, BovicareClient, BovicareError, Credentials,
    Herd, LoginResponse, NewWeight, User,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::domains::activity::{reconcile_activities, visible_activities};
use crate::domains::chart::{ChartView, chart_view};
use crate::domains::chat::ChatTranscript;
use crate::domains::dashboard::{DashboardSummary, primary_activities, summarize};
use crate::domains::filters::{WeightFilters, apply_filters};
use crate::domains::herd_stats::{StatLabels, WeightStats, update_stats};
use crate::domains::notifications::{NotificationItem, to_notifications};
use crate::domains::weight::{AnimalViewModel, build_view_model, fetch_animal_data};
use crate::error::{ViewError, ViewResult};
use crate::state::ViewScope;

/// Errors that must reach the caller instead of degrading to a fallback.
fn is_fatal(e: &BovicareError) -> bool {
    e.is_auth()
}

/// State of the weight-tracking screen for one herd.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightBoard {
    pub herd_id: String,
    /// Unfiltered view models as loaded.
    pub all_animals: Vec<AnimalViewModel>,
    /// What is currently shown.
    pub animals: Vec<AnimalViewModel>,
    pub main_animal: Option<AnimalViewModel>,
    pub stats: WeightStats,
    pub stat_labels: StatLabels,
    pub filters: WeightFilters,
}

impl WeightBoard {
    pub fn new(herd_id: impl Into<String>, all_animals: Vec<AnimalViewModel>) -> Self {
        let mut board = Self {
            herd_id: herd_id.into(),
            animals: Vec::new(),
            main_animal: None,
            stats: WeightStats::default(),
            stat_labels: WeightStats::default().labels(),
            filters: WeightFilters::default(),
            all_animals,
        };
        board.show(board.all_animals.clone());
        board
    }

    /// Replace the shown set; main animal and stats follow it.
    fn show(&mut self, animals: Vec<AnimalViewModel>) {
        self.main_animal = animals.first().cloned();
        self.stats = update_stats(&animals);
        self.stat_labels = self.stats.labels();
        self.animals = animals;
    }

    /// Client-side filter over the unfiltered set.
    pub fn apply_client_filters(&mut self, filters: WeightFilters) {
        let shown = apply_filters(&self.all_animals, &filters);
        self.filters = filters;
        self.show(shown);
    }

    /// Back to default filters and the unfiltered set.
    pub fn clear_filters(&mut self) {
        self.filters = WeightFilters::default();
        self.show(self.all_animals.clone());
    }

    /// Make `animal_id` the main animal when it is shown.
    pub fn select(&mut self, animal_id: &str) -> bool {
        match self.animals.iter().find(|a| a.id == animal_id) {
            Some(a) => {
                self.main_animal = Some(a.clone());
                true
            }
            None => false,
        }
    }

    pub fn find(&self, animal_id: &str) -> Option<&AnimalViewModel> {
        self.all_animals
            .iter()
            .chain(self.animals.iter())
            .find(|a| a.id == animal_id)
    }
}

#[derive(Clone)]
pub struct WeightBoardService {
    client: Arc<dyn BovicareClient>,
}

impl WeightBoardService {
    pub fn new(client: Arc<dyn BovicareClient>) -> Self {
        Self { client }
    }

    pub async fn herds(&self, scope: &ViewScope) -> ViewResult<Vec<Herd>> {
        let herds = scope
            .run(async { self.client.list_herds().await.map_err(ViewError::from) })
            .await?;
        Ok(herds)
    }

    /// Animals of a herd, each with its history, plus stats.
    ///
    /// A failed listing gives an empty board; only an auth failure propagates.
    pub async fn load_board(&self, scope: &ViewScope, herd_id: &str) -> ViewResult<WeightBoard> {
        let client = self.client.as_ref();
        let animals = scope
            .run(async {
                let listed = client.list_animals(&AnimalQuery::for_herd(herd_id)).await;
                match listed {
                    Ok(animals) => fetch_animal_data(client, &animals)
                        .await
                        .map_err(ViewError::from),
                    Err(e) if is_fatal(&e) => Err(ViewError::from(e)),
                    Err(e) => {
                        tracing::error!(herd_id, transport = e.is_transport(), error = %e, "failed to load animals");
                        Ok(Vec::new())
                    }
                }
            })
            .await?;
        tracing::debug!(herd_id, count = animals.len(), "weight board loaded");
        scope.apply(|| WeightBoard::new(herd_id, animals))
    }

    /// Server-side filter. On failure the board keeps its current shown set.
    pub async fn server_filter(
        &self,
        scope: &ViewScope,
        board: &WeightBoard,
        filters: WeightFilters,
    ) -> ViewResult<WeightBoard> {
        let client = self.client.as_ref();
        let criteria = filters.to_criteria(Some(&board.herd_id));
        let outcome = scope
            .run(async {
                match client.filter_cattle(&criteria).await {
                    Ok(list) => fetch_animal_data(client, &list)
                        .await
                        .map(Some)
                        .map_err(ViewError::from),
                    Err(e) if is_fatal(&e) => Err(ViewError::from(e)),
                    Err(e) => {
                        tracing::error!(
                            herd_id = %board.herd_id,
                            transport = e.is_transport(),
                            error = %e,
                            "server-side filter failed"
                        );
                        Ok(None)
                    }
                }
            })
            .await?;
        scope.apply(|| {
            let mut next = board.clone();
            if let Some(animals) = outcome {
                next.filters = filters;
                next.show(animals);
            }
            next
        })
    }

    /// Record a weighing, then reload the board.
    pub async fn add_weight(
        &self,
        scope: &ViewScope,
        herd_id: &str,
        weight: &NewWeight,
    ) -> ViewResult<WeightBoard> {
        if weight.animal_id.trim().is_empty() {
            return Err(ViewError::Validation(
                "Selecione um gado para registrar o peso.".into(),
            ));
        }
        scope
            .run(async { self.client.add_weight(weight).await.map_err(ViewError::from) })
            .await?;
        tracing::info!(herd_id, animal_id = %weight.animal_id, "weight recorded");
        self.load_board(scope, herd_id).await
    }

    /// Chart for one animal, fetched fresh when it is not on a cached board.
    pub async fn animal_chart(
        &self,
        scope: &ViewScope,
        cached: Option<&AnimalViewModel>,
        animal_id: &str,
    ) -> ViewResult<ChartView> {
        if let Some(vm) = cached {
            return Ok(chart_view(&vm.chart_data));
        }
        let raw = scope
            .run(async {
                self.client
                    .get_weight_history(animal_id)
                    .await
                    .map_err(ViewError::from)
            })
            .await?;
        let vm = build_view_model(&bovicare_client::AnimalRecord::with_id(animal_id), &raw);
        Ok(chart_view(&vm.chart_data))
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub summary: DashboardSummary,
    /// Recent activities as listed on the dashboard.
    pub activities: Vec<ActivityRecord>,
    /// Every reconciled activity mapped to a notification.
    pub notifications: Vec<NotificationItem>,
    pub user: Option<User>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Clone)]
pub struct DashboardService {
    client: Arc<dyn BovicareClient>,
}

impl DashboardService {
    pub fn new(client: Arc<dyn BovicareClient>) -> Self {
        Self { client }
    }

    /// Four concurrent calls, each failure logged and isolated.
    pub async fn load(&self, scope: &ViewScope) -> ViewResult<DashboardView> {
        let client = self.client.as_ref();
        let session = client.session();
        let filter = ActivityFilter {
            user_id: session.user_id().await,
            username: session.username().await,
        };
        let identity_known = !filter.is_empty();
        let all_query = AnimalQuery::default();

        let (animals, dashboard, feed, user) = scope
            .run(async {
                Ok::<_, ViewError>(tokio::join!(
                    client.list_animals(&all_query),
                    client.get_dashboard(),
                    client.get_recent_activities(&filter),
                    client.get_current_user(None),
                ))
            })
            .await?;

        for (what, err) in [
            ("animals", animals.as_ref().err()),
            ("dashboard", dashboard.as_ref().err()),
            ("activities", feed.as_ref().err()),
            ("current user", user.as_ref().err()),
        ] {
            if let Some(e) = err {
                tracing::error!(endpoint = what, transport = e.is_transport(), error = %e, "dashboard call failed");
            }
        }
        let session_lost = [
            animals.as_ref().err(),
            dashboard.as_ref().err(),
            feed.as_ref().err(),
            user.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .find_map(|e| match e {
            BovicareError::Auth(msg) => Some(msg.clone()),
            _ => None,
        });
        if let Some(msg) = session_lost {
            return Err(BovicareError::Auth(msg).into());
        }

        let dashboard = dashboard.ok();
        let summary = summarize(dashboard.as_ref(), animals.as_ref().ok().map(Vec::as_slice));
        let primary = primary_activities(dashboard.as_ref(), identity_known);
        let reconciled = reconcile_activities(primary, feed.ok());

        scope.apply(|| DashboardView {
            summary,
            activities: visible_activities(&reconciled),
            notifications: to_notifications(&reconciled),
            user: user.ok(),
            last_updated: Utc::now(),
        })
    }
}

/// Login, logout and the startup session check.
#[derive(Clone)]
pub struct SessionService {
    client: Arc<dyn BovicareClient>,
}

impl SessionService {
    pub fn new(client: Arc<dyn BovicareClient>) -> Self {
        Self { client }
    }

    pub async fn login(&self, credentials: &Credentials) -> ViewResult<LoginResponse> {
        Ok(self.client.login(credentials).await?)
    }

    pub async fn logout(&self) -> ViewResult<()> {
        Ok(self.client.logout().await?)
    }

    /// Confirm a restored session against the backend; drop it when rejected.
    pub async fn verify(&self) -> bool {
        let session = self.client.session();
        if !session.is_authenticated().await {
            return false;
        }
        match self.client.get_current_user(None).await {
            Ok(user) => {
                if let Err(e) = session.update_user(user).await {
                    tracing::warn!(error = %e, "could not persist refreshed user");
                }
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored session rejected; logging out");
                session.clear().await;
                false
            }
        }
    }
}

/// Assistant conversation.
#[derive(Clone)]
pub struct ChatService {
    client: Arc<dyn BovicareClient>,
}

impl ChatService {
    pub fn new(client: Arc<dyn BovicareClient>) -> Self {
        Self { client }
    }

    /// Send `text` and record both sides. Blank input is rejected.
    ///
    /// The transcript is not held locked while the assistant answers.
    pub async fn send(
        &self,
        transcript: &Mutex<ChatTranscript>,
        text: &str,
    ) -> ViewResult<ChatTranscript> {
        if text.trim().is_empty() {
            return Err(ViewError::Validation("mensagem vazia".into()));
        }
        transcript.lock().await.push_user(text);
        let reply = self.client.chat_diagnose(text).await;
        let mut transcript = transcript.lock().await;
        match reply {
            Err(e) if is_fatal(&e) => Err(e.into()),
            reply => {
                transcript.push_reply(reply);
                Ok(transcript.clone())
            }
        }
    }
}
