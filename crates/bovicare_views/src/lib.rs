//! View models for the BoviCare herd-management screens.
//!
//! [`BovicareViews`] owns the shared state behind the HTTP surface: cached
//! weight boards per herd, the notification center and the chat transcript.
//! Loads go through the services in [`services`]; the pure transforms live in
//! [`domains`].

use std::collections::HashMap;
use std::sync::Arc;

use bovicare_client::{BovicareClient, DataChange};
use tokio::sync::{Mutex, broadcast};

pub mod domains;
pub mod error;
pub mod http;
pub mod services;
pub mod state;
pub mod transforms;

use domains::chat::ChatTranscript;
use domains::notifications::{NotificationCenter, NotificationsView};
use error::ViewResult;
use services::{
    ChatService, DashboardService, DashboardView, SessionService, WeightBoard, WeightBoardService,
};
use state::ViewScope;

pub use error::ViewError;

#[derive(Clone)]
pub struct BovicareViews {
    client: Arc<dyn BovicareClient>,
    pub boards: WeightBoardService,
    pub dashboard: DashboardService,
    pub session: SessionService,
    pub chat: ChatService,
    board_cache: Arc<Mutex<HashMap<String, WeightBoard>>>,
    notifications: Arc<Mutex<NotificationCenter>>,
    last_dashboard: Arc<Mutex<Option<DashboardView>>>,
    transcript: Arc<Mutex<ChatTranscript>>,
}

impl BovicareViews {
    pub fn new(client: Arc<dyn BovicareClient>) -> Self {
        Self {
            boards: WeightBoardService::new(client.clone()),
            dashboard: DashboardService::new(client.clone()),
            session: SessionService::new(client.clone()),
            chat: ChatService::new(client.clone()),
            client,
            board_cache: Arc::new(Mutex::new(HashMap::new())),
            notifications: Arc::new(Mutex::new(NotificationCenter::default())),
            last_dashboard: Arc::new(Mutex::new(None)),
            transcript: Arc::new(Mutex::new(ChatTranscript::default())),
        }
    }

    pub fn client(&self) -> &Arc<dyn BovicareClient> {
        &self.client
    }

    /// Cached board for `herd_id`; nothing is served from cache without a session.
    pub async fn cached_board(&self, herd_id: &str) -> Option<WeightBoard> {
        if !self.client.session().is_authenticated().await {
            return None;
        }
        self.board_cache.lock().await.get(herd_id).cloned()
    }

    pub async fn store_board(&self, board: WeightBoard) -> WeightBoard {
        self.board_cache
            .lock()
            .await
            .insert(board.herd_id.clone(), board.clone());
        board
    }

    /// Cached board, loading it first when absent.
    pub async fn board(&self, scope: &ViewScope, herd_id: &str) -> ViewResult<WeightBoard> {
        if let Some(board) = self.cached_board(herd_id).await {
            return Ok(board);
        }
        let board = self.guard(self.boards.load_board(scope, herd_id).await).await?;
        Ok(self.store_board(board).await)
    }

    /// Load the dashboard and refresh the notification list from it.
    pub async fn load_dashboard(&self, scope: &ViewScope) -> ViewResult<DashboardView> {
        let view = self.guard(self.dashboard.load(scope).await).await?;
        self.notifications
            .lock()
            .await
            .set_items(view.notifications.clone());
        *self.last_dashboard.lock().await = Some(view.clone());
        Ok(view)
    }

    pub async fn last_dashboard(&self) -> Option<DashboardView> {
        self.last_dashboard.lock().await.clone()
    }

    pub async fn notifications(&self) -> NotificationsView {
        self.notifications.lock().await.view()
    }

    pub async fn mark_all_read(&self) -> NotificationsView {
        let mut center = self.notifications.lock().await;
        center.mark_all_read();
        center.view()
    }

    /// `None` when no notification has that id.
    pub async fn mark_read(&self, id: &str) -> Option<NotificationsView> {
        let mut center = self.notifications.lock().await;
        center.mark_read(id).then(|| center.view())
    }

    pub async fn transcript(&self) -> ChatTranscript {
        self.transcript.lock().await.clone()
    }

    pub async fn send_chat(&self, text: &str) -> ViewResult<ChatTranscript> {
        self.guard(self.chat.send(&self.transcript, text).await).await
    }

    /// Pass `result` through, dropping all per-user state when it reports that
    /// the backend rejected the session.
    pub async fn guard<T>(&self, result: ViewResult<T>) -> ViewResult<T> {
        if let Err(ViewError::Api(e)) = &result {
            if e.is_auth() {
                tracing::info!("session ended by backend; clearing cached views");
                self.reset().await;
            }
        }
        result
    }

    /// Forget everything tied to the signed-in user.
    pub async fn reset(&self) {
        self.board_cache.lock().await.clear();
        *self.notifications.lock().await = NotificationCenter::default();
        *self.last_dashboard.lock().await = None;
        *self.transcript.lock().await = ChatTranscript::default();
    }

    /// Reload the dashboard whenever the client reports a mutation.
    ///
    /// Bursts are coalesced into one reload. Returns when the channel closes.
    pub async fn follow_changes(self, mut rx: broadcast::Receiver<DataChange>) {
        loop {
            match rx.recv().await {
                Ok(change) => {
                    tracing::debug!(method = ?change.method, path = %change.path, "data changed");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "change listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
            while rx.try_recv().is_ok() {}

            self.board_cache.lock().await.clear();
            if !self.client.session().is_authenticated().await {
                continue;
            }
            let scope = ViewScope::new();
            if let Err(e) = self.load_dashboard(&scope).await {
                tracing::warn!(error = %e, "dashboard refresh after change failed");
            }
        }
    }
}
