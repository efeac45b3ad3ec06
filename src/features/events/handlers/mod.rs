pub mod event_handler;

pub use event_handler::{
    __path_create_event, __path_delete_event, __path_get_event, __path_list_events,
    __path_list_registrations, __path_register_for_event, __path_unregister_from_event,
    __path_update_event, create_event, delete_event, get_event, list_events,
    list_registrations, register_for_event, unregister_from_event, update_event,
};
