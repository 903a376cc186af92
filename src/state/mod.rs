//! Persistent state: catalog entries, lifecycle records, layouts.

mod catalog;
mod layouts;
mod lifecycle;
mod sqlite;
mod types;

pub use sqlite::Store;
pub use types::{CoarseStatus, Layout, LifecycleRecord, NewLayout};
