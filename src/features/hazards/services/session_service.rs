use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::feature_store::FeatureStore;
use super::orchestrator::{lock, ClickOutcome, HazardOrchestrator, MouseButton, PendingSubmission};
use super::wizard::{HazardWizard, MediaBatchOutcome};
use crate::core::error::Result;
use crate::features::auth::model::SessionUser;
use crate::features::auth::SessionObserver;
use crate::features::hazards::dtos::HazardSessionDto;
use crate::features::hazards::errors::WizardError;
use crate::features::hazards::events::{EventBus, HazardEvent};
use crate::features::hazards::models::{IncomingFile, PreviewContent, PreviewRegistry, WizardStep};
use crate::features::map::models::{MapPoint, MapView};
use crate::features::map::services::LayerCatalog;
use crate::shared::constants::EVENT_CHANNEL_CAPACITY;

/// All hazard-reporting state of one signed-in user
pub struct HazardSession {
    user_id: String,
    wizard: tokio::sync::Mutex<HazardWizard>,
    orchestrator: Arc<HazardOrchestrator>,
    view: Arc<Mutex<MapView>>,
    previews: PreviewRegistry,
    bus: EventBus,
    catalog: Arc<LayerCatalog>,
    last_active: Mutex<Instant>,
}

impl HazardSession {
    pub fn new(user_id: &str, catalog: Arc<LayerCatalog>, store: Arc<dyn FeatureStore>) -> Self {
        let bus = EventBus::new(EVENT_CHANNEL_CAPACITY);
        let previews = PreviewRegistry::new();
        let view = Arc::new(Mutex::new(MapView::new(catalog.all())));
        let orchestrator = Arc::new(HazardOrchestrator::new(
            Arc::clone(&catalog),
            store,
            Arc::clone(&view),
            bus.clone(),
        ));

        Self {
            user_id: user_id.to_string(),
            wizard: tokio::sync::Mutex::new(HazardWizard::new(previews.clone(), bus.clone())),
            orchestrator,
            view,
            previews,
            bus,
            catalog,
            last_active: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *lock(&self.last_active) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        lock(&self.last_active).elapsed()
    }

    /// An open event stream or a write in flight keeps the session alive
    fn is_busy(&self) -> bool {
        self.bus.subscriber_count() > 0 || self.orchestrator.is_submitting()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HazardEvent> {
        self.bus.subscribe()
    }

    pub async fn snapshot(&self) -> HazardSessionDto {
        let wizard = self.wizard.lock().await.snapshot();
        HazardSessionDto {
            wizard,
            capture: self.orchestrator.snapshot(),
            view: self.map_view(),
        }
    }

    pub fn map_view(&self) -> MapView {
        lock(&self.view).clone()
    }

    pub fn set_layer_visibility(&self, layer_id: i64, visible: bool) -> Result<()> {
        lock(&self.view).set_layer_visibility(layer_id, visible)?;
        self.bus
            .publish(HazardEvent::LayerVisibilityChanged { layer_id, visible });
        Ok(())
    }

    pub fn arm_capture(&self) {
        self.orchestrator.arm();
    }

    pub fn disarm_capture(&self) {
        self.orchestrator.disarm();
    }

    /// Route a map click; a captured point opens the wizard
    pub async fn map_click(&self, button: MouseButton, point: MapPoint) -> ClickOutcome {
        let outcome = self.orchestrator.on_map_click(button, point);
        if let ClickOutcome::Captured(_) = outcome {
            self.wizard.lock().await.open();
        }
        outcome
    }

    /// Pick a hazard layer; its subcategory vocabulary is fetched before advancing
    pub async fn select_category(&self, layer_id: i64) -> Result<()> {
        let mut wizard = self.wizard.lock().await;
        wizard.ensure_step(&[WizardStep::PickCategory])?;

        let layer = self
            .catalog
            .find_hazard_layer(layer_id)
            .cloned()
            .ok_or(WizardError::UnknownCategory(layer_id))?;

        let options = self.catalog.subcategories(&layer).await;
        wizard.select_category(layer, options)?;
        Ok(())
    }

    pub async fn select_subcategory(&self, code: &str) -> Result<()> {
        Ok(self.wizard.lock().await.select_subcategory(code)?)
    }

    pub async fn set_description(&self, text: &str) -> Result<()> {
        Ok(self.wizard.lock().await.set_description(text)?)
    }

    pub async fn add_media(&self, files: Vec<IncomingFile>) -> Result<(MediaBatchOutcome, HazardSessionDto)> {
        let outcome = self.wizard.lock().await.add_media(files)?;
        Ok((outcome, self.snapshot().await))
    }

    pub async fn remove_media(&self, index: usize) -> Result<()> {
        Ok(self.wizard.lock().await.remove_media(index)?)
    }

    pub async fn dismiss_media_error(&self) {
        self.wizard.lock().await.dismiss_media_error();
    }

    pub async fn next(&self) -> Result<()> {
        Ok(self.wizard.lock().await.next()?)
    }

    pub async fn back(&self) -> Result<()> {
        Ok(self.wizard.lock().await.back()?)
    }

    /// Close the wizard and leave capture mode
    pub async fn close_wizard(&self) {
        self.wizard.lock().await.close();
        self.orchestrator.disarm();
    }

    /// Hand the completed report to the orchestrator and start the write.
    ///
    /// The wizard moves to its confirmation step straight away; the write
    /// result arrives later as `submission_completed` or `submission_failed`.
    pub async fn submit(&self, user: &SessionUser) -> Result<()> {
        let mut wizard = self.wizard.lock().await;
        wizard.ensure_ready_to_submit()?;

        let point = self.orchestrator.begin_submission()?;
        let report = match wizard.submit() {
            Ok(report) => report,
            Err(e) => {
                self.orchestrator.abandon_submission();
                return Err(e.into());
            }
        };

        tracing::info!(
            "User {} submitted a {} hazard",
            user.username,
            report.category
        );

        let pending = PendingSubmission {
            point,
            report,
            submitted_by: user.username.clone(),
        };
        let orchestrator = Arc::clone(&self.orchestrator);
        tokio::spawn(async move {
            orchestrator.dispatch(pending).await;
        });

        Ok(())
    }

    pub fn preview(&self, id: &Uuid) -> Option<PreviewContent> {
        self.previews.get(id)
    }

    /// Discard the draft (releasing previews) and leave capture mode
    pub async fn shutdown(&self) {
        self.close_wizard().await;
        tracing::debug!(
            "Hazard session for {} shut down, {} preview(s) still held by in-flight writes",
            self.user_id,
            self.previews.len()
        );
    }
}

/// Registry of per-user hazard sessions.
///
/// Sessions are created on first use and torn down on sign-out, after sitting
/// idle, or at process shutdown. Once shut down the registry hands out
/// detached sessions that are dropped with the request.
pub struct HazardSessionService {
    sessions: RwLock<HashMap<String, Arc<HazardSession>>>,
    catalog: Arc<LayerCatalog>,
    store: Arc<dyn FeatureStore>,
    closed: AtomicBool,
}

impl HazardSessionService {
    pub fn new(catalog: Arc<LayerCatalog>, store: Arc<dyn FeatureStore>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            catalog,
            store,
            closed: AtomicBool::new(false),
        }
    }

    pub fn catalog(&self) -> &Arc<LayerCatalog> {
        &self.catalog
    }

    pub fn session_for(&self, user: &SessionUser) -> Arc<HazardSession> {
        if let Some(session) = self.get(&user.id) {
            session.touch();
            return session;
        }

        if self.closed.load(Ordering::Acquire) {
            tracing::debug!("Registry closed, detached session for {}", user.username);
            return Arc::new(self.new_session(&user.id));
        }

        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let session = sessions.entry(user.id.clone()).or_insert_with(|| {
            tracing::info!("Starting hazard session for {}", user.username);
            Arc::new(self.new_session(&user.id))
        });
        session.touch();
        Arc::clone(session)
    }

    fn new_session(&self, user_id: &str) -> HazardSession {
        HazardSession::new(user_id, Arc::clone(&self.catalog), Arc::clone(&self.store))
    }

    pub fn get(&self, user_id: &str) -> Option<Arc<HazardSession>> {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(user_id)
            .cloned()
    }

    fn remove(&self, user_id: &str) -> Option<Arc<HazardSession>> {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(user_id)
    }

    /// Tear down sessions untouched for `max_idle` that have no open event
    /// stream and no write in flight. Returns how many were removed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let evicted: Vec<Arc<HazardSession>> = {
            let mut sessions = self
                .sessions
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let idle: Vec<String> = sessions
                .iter()
                .filter(|(_, session)| session.idle_for() >= max_idle && !session.is_busy())
                .map(|(user_id, _)| user_id.clone())
                .collect();
            idle.iter()
                .filter_map(|user_id| sessions.remove(user_id))
                .collect()
        };

        for session in &evicted {
            session.shutdown().await;
        }
        evicted.len()
    }

    /// Tear down every session and stop registering new ones.
    ///
    /// Dropping the sessions drops their event channels, which ends any open
    /// event streams.
    pub async fn shutdown_all(&self) {
        self.closed.store(true, Ordering::Release);
        let sessions: Vec<Arc<HazardSession>> = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .drain()
            .map(|(_, session)| session)
            .collect();

        tracing::info!("Shutting down {} hazard session(s)", sessions.len());
        for session in sessions {
            session.shutdown().await;
        }
    }
}

#[async_trait]
impl SessionObserver for HazardSessionService {
    async fn on_sign_out(&self, user_id: &str) {
        if let Some(session) = self.remove(user_id) {
            session.shutdown().await;
        }
    }
}
