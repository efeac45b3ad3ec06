pub mod dashboard_handler;

pub use dashboard_handler::{
    __path_get_admin_stats, __path_get_writer_dashboard, get_admin_stats, get_writer_dashboard,
};
