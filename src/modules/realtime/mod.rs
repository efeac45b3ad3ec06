//! In-process change feed
//!
//! Services publish a [`ChangeEvent`] after each committed mutation; admin
//! list views subscribe (SSE) and re-fetch on any change to a table.

mod feed;

pub use feed::{ChangeAction, ChangeEvent, ChangeFeed};
