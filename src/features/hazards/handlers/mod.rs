pub mod capture_handler;
pub mod session_handler;
pub mod wizard_handler;

pub use capture_handler::{
    __path_arm_capture, __path_disarm_capture, __path_map_click, arm_capture, disarm_capture,
    map_click,
};
pub use session_handler::{
    __path_get_preview, __path_get_session, __path_stream_events, get_preview, get_session,
    stream_events,
};
pub use wizard_handler::{
    __path_add_media, __path_close_wizard, __path_dismiss_media_error, __path_next_step,
    __path_previous_step, __path_remove_media, __path_select_category, __path_select_subcategory,
    __path_set_description, __path_submit, add_media, close_wizard, dismiss_media_error,
    next_step, previous_step, remove_media, select_category, select_subcategory, set_description,
    submit,
};
