pub mod auth;
pub mod hazards;
pub mod map;
