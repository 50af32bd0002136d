mod layer;
mod point;
mod view;
mod widget;

pub use layer::{LayerDescriptor, LayerField, LayerSchema, SubcategoryOption};
pub use point::MapPoint;
pub use view::{LayerViewState, MapView};
pub use widget::MapWidget;
