pub mod dtos;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod workers;

pub use services::{FeatureStore, HazardSessionService};
pub use workers::SessionSweeper;
