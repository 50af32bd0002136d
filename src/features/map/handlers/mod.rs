pub mod layer_handler;
pub mod view_handler;

pub use layer_handler::{
    __path_get_layer_schema, __path_list_layers, __path_list_subcategories, get_layer_schema,
    list_layers, list_subcategories,
};
pub use view_handler::{
    __path_get_map_config, __path_get_map_view, __path_set_layer_visibility, get_map_config,
    get_map_view, set_layer_visibility,
};
