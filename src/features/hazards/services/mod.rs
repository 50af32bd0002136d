pub mod feature_store;
pub mod orchestrator;
pub mod session_service;
pub mod wizard;

pub use feature_store::FeatureStore;
pub use orchestrator::{ClickOutcome, MouseButton};
pub use session_service::{HazardSession, HazardSessionService};
