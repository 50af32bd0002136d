use futures::future::join_all;
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard};
use utoipa::ToSchema;

use super::feature_store::FeatureStore;
use crate::features::hazards::dtos::CaptureSnapshotDto;
use crate::features::hazards::errors::OrchestratorError;
use crate::features::hazards::events::{EventBus, HazardEvent};
use crate::features::hazards::models::{CompletedReport, HazardAttributes, HazardFeature};
use crate::features::map::models::{LayerDescriptor, MapPoint, MapView};
use crate::features::map::services::LayerCatalog;

/// Mouse button of a map click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// Point stored; the wizard should open
    Captured(MapPoint),
    /// Capture cancelled by a secondary click
    Disarmed,
    /// Not armed, or a submission is in flight
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Completed {
        layer_id: i64,
        object_id: i64,
        attachments: usize,
    },
    Failed(String),
}

/// A report paired with its point, ready to be written
#[derive(Debug)]
pub struct PendingSubmission {
    pub point: MapPoint,
    pub report: CompletedReport,
    pub submitted_by: String,
}

#[derive(Debug, Default)]
struct CaptureState {
    armed: bool,
    point: Option<MapPoint>,
    in_flight: bool,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Point capture and write dispatch for one user.
///
/// Holds the captured point and the in-flight guard. Locks are never held
/// across an await.
pub struct HazardOrchestrator {
    state: Mutex<CaptureState>,
    catalog: Arc<LayerCatalog>,
    store: Arc<dyn FeatureStore>,
    view: Arc<Mutex<MapView>>,
    bus: EventBus,
}

impl HazardOrchestrator {
    pub fn new(
        catalog: Arc<LayerCatalog>,
        store: Arc<dyn FeatureStore>,
        view: Arc<Mutex<MapView>>,
        bus: EventBus,
    ) -> Self {
        Self {
            state: Mutex::new(CaptureState::default()),
            catalog,
            store,
            view,
            bus,
        }
    }

    pub fn arm(&self) {
        let mut state = lock(&self.state);
        if !state.armed {
            state.armed = true;
            self.bus.publish(HazardEvent::CaptureArmed);
        }
    }

    /// Leave capture mode and drop any point not yet submitted
    pub fn disarm(&self) {
        let mut state = lock(&self.state);
        let was_armed = state.armed;
        state.armed = false;
        if !state.in_flight {
            state.point = None;
        }
        if was_armed {
            self.bus.publish(HazardEvent::CaptureDisarmed);
        }
    }

    pub fn on_map_click(&self, button: MouseButton, point: MapPoint) -> ClickOutcome {
        let mut state = lock(&self.state);

        if state.in_flight {
            tracing::debug!("Map click ignored, submission in flight");
            return ClickOutcome::Ignored;
        }
        if !state.armed {
            return ClickOutcome::Ignored;
        }

        match button {
            MouseButton::Primary => {
                state.point = Some(point);
                self.bus.publish(HazardEvent::PointCaptured { point });
                ClickOutcome::Captured(point)
            }
            MouseButton::Secondary => {
                state.armed = false;
                state.point = None;
                self.bus.publish(HazardEvent::CaptureDisarmed);
                ClickOutcome::Disarmed
            }
        }
    }

    pub fn snapshot(&self) -> CaptureSnapshotDto {
        let state = lock(&self.state);
        CaptureSnapshotDto {
            armed: state.armed,
            point: state.point,
            submission_in_flight: state.in_flight,
        }
    }

    pub fn is_submitting(&self) -> bool {
        lock(&self.state).in_flight
    }

    /// Set the in-flight guard and return the captured point
    pub fn begin_submission(&self) -> Result<MapPoint, OrchestratorError> {
        let mut state = lock(&self.state);

        if state.in_flight {
            return Err(OrchestratorError::SubmissionInFlight);
        }
        let point = state.point.ok_or(OrchestratorError::NoCapturedPoint)?;

        state.in_flight = true;
        state.armed = false;
        Ok(point)
    }

    /// Release a guard taken by `begin_submission` when nothing was dispatched
    pub fn abandon_submission(&self) {
        lock(&self.state).in_flight = false;
    }

    /// Write the feature, then its attachments, then refresh and recentre.
    ///
    /// The guard and the point are cleared whatever the outcome; failures are
    /// logged and published, never retried.
    pub async fn dispatch(self: Arc<Self>, pending: PendingSubmission) -> SubmissionOutcome {
        self.bus.publish(HazardEvent::SubmissionStarted {
            category: pending.report.category.clone(),
        });

        let outcome = match self.write(&pending).await {
            Ok((layer_id, object_id, attachments)) => {
                tracing::info!(
                    "Hazard submitted to layer {} as feature {} with {} attachment(s)",
                    layer_id,
                    object_id,
                    attachments
                );
                SubmissionOutcome::Completed {
                    layer_id,
                    object_id,
                    attachments,
                }
            }
            Err(reason) => {
                tracing::error!("Hazard submission failed: {}", reason);
                SubmissionOutcome::Failed(reason)
            }
        };

        {
            let mut state = lock(&self.state);
            state.in_flight = false;
            state.point = None;
        }

        match &outcome {
            SubmissionOutcome::Completed {
                layer_id,
                object_id,
                attachments,
            } => self.bus.publish(HazardEvent::SubmissionCompleted {
                layer_id: *layer_id,
                object_id: *object_id,
                attachments: *attachments,
            }),
            SubmissionOutcome::Failed(reason) => self.bus.publish(HazardEvent::SubmissionFailed {
                reason: reason.clone(),
            }),
        }

        outcome
    }

    async fn write(&self, pending: &PendingSubmission) -> Result<(i64, i64, usize), String> {
        let report = &pending.report;

        let layer: LayerDescriptor = self
            .catalog
            .find_by_name(&report.category)
            .cloned()
            .ok_or_else(|| format!("No layer named '{}'", report.category))?;

        let feature = HazardFeature {
            point: pending.point,
            attributes: HazardAttributes {
                subcategory: report.subcategory.clone(),
                description: report.description.clone(),
                date_reported: report.occurred_at,
                submitted_by: pending.submitted_by.clone(),
            },
        };

        let object_id = self
            .store
            .add_feature(&layer, &feature)
            .await
            .map_err(|e| format!("Feature write rejected: {}", e))?;

        self.bus.publish(HazardEvent::FeatureCreated {
            layer_id: layer.id,
            object_id,
        });

        if !report.media.is_empty() {
            let uploads = report
                .media
                .iter()
                .map(|file| self.store.add_attachment(&layer, object_id, file));
            let results = join_all(uploads).await;

            let failed: Vec<String> = results
                .into_iter()
                .zip(report.media.iter())
                .filter_map(|(result, file)| {
                    result
                        .err()
                        .map(|e| format!("{} ({})", file.file_name, e))
                })
                .collect();

            if !failed.is_empty() {
                return Err(format!(
                    "{} of {} attachment upload(s) failed: {}",
                    failed.len(),
                    report.media.len(),
                    failed.join(", ")
                ));
            }
        }

        {
            let mut view = lock(&self.view);
            if let Ok(revision) = view.refresh_layer(layer.id) {
                self.bus.publish(HazardEvent::LayerRefreshed {
                    layer_id: layer.id,
                    revision,
                });
            }
            view.go_to(pending.point);
        }
        self.bus.publish(HazardEvent::ViewRecentred {
            center: pending.point,
        });

        Ok((layer.id, object_id, report.media.len()))
    }
}
