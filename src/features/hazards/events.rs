//! Per-session event bus.
//!
//! The wizard, the orchestrator and the map view publish every state change
//! here; renderers subscribe (over SSE) and redraw from the events alone.

use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;

use super::models::WizardStep;
use crate::features::map::models::MapPoint;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HazardEvent {
    CaptureArmed,
    CaptureDisarmed,
    PointCaptured {
        point: MapPoint,
    },
    WizardOpened,
    WizardClosed,
    StepChanged {
        step: WizardStep,
        title: String,
    },
    DraftUpdated,
    MediaRejected {
        message: String,
        file_names: Vec<String>,
    },
    SubmissionStarted {
        category: String,
    },
    FeatureCreated {
        layer_id: i64,
        object_id: i64,
    },
    SubmissionCompleted {
        layer_id: i64,
        object_id: i64,
        attachments: usize,
    },
    SubmissionFailed {
        reason: String,
    },
    LayerRefreshed {
        layer_id: i64,
        revision: u64,
    },
    ViewRecentred {
        center: MapPoint,
    },
    LayerVisibilityChanged {
        layer_id: i64,
        visible: bool,
    },
}

impl HazardEvent {
    /// SSE event name, same as the serialized `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            HazardEvent::CaptureArmed => "capture_armed",
            HazardEvent::CaptureDisarmed => "capture_disarmed",
            HazardEvent::PointCaptured { .. } => "point_captured",
            HazardEvent::WizardOpened => "wizard_opened",
            HazardEvent::WizardClosed => "wizard_closed",
            HazardEvent::StepChanged { .. } => "step_changed",
            HazardEvent::DraftUpdated => "draft_updated",
            HazardEvent::MediaRejected { .. } => "media_rejected",
            HazardEvent::SubmissionStarted { .. } => "submission_started",
            HazardEvent::FeatureCreated { .. } => "feature_created",
            HazardEvent::SubmissionCompleted { .. } => "submission_completed",
            HazardEvent::SubmissionFailed { .. } => "submission_failed",
            HazardEvent::LayerRefreshed { .. } => "layer_refreshed",
            HazardEvent::ViewRecentred { .. } => "view_recentred",
            HazardEvent::LayerVisibilityChanged { .. } => "layer_visibility_changed",
        }
    }
}

/// Broadcast channel of [`HazardEvent`]s; clones publish to the same subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<HazardEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishing with no subscribers is not an error
    pub fn publish(&self, event: HazardEvent) {
        tracing::debug!("Publishing hazard event: {}", event.name());
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HazardEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers, such as open event streams
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(HazardEvent::CaptureArmed);
        bus.publish(HazardEvent::PointCaptured {
            point: MapPoint::new(-77.6, 43.15),
        });

        assert_eq!(rx.recv().await.unwrap(), HazardEvent::CaptureArmed);
        assert!(matches!(
            rx.recv().await.unwrap(),
            HazardEvent::PointCaptured { .. }
        ));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(8);
        bus.publish(HazardEvent::WizardClosed);
    }

    #[test]
    fn test_subscriber_count_tracks_receivers() {
        let bus = EventBus::new(8);
        assert_eq!(bus.subscriber_count(), 0);
        let rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_name_matches_tag() {
        let event = HazardEvent::SubmissionFailed {
            reason: "boom".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
    }
}
