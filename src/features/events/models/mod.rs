pub mod event;
pub mod registration;

pub use event::{Event, EVENT_COLUMNS};
pub use registration::RegistrantRow;
