pub mod layer_catalog;

pub use layer_catalog::{LayerCatalog, LayerSource};
