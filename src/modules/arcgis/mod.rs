//! ArcGIS REST feature-service integration

pub mod client;
pub mod types;

pub use client::FeatureServiceClient;
