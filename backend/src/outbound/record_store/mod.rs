//! Record store adapters.
//!
//! `FirebaseRecordStore` talks to the Realtime Database REST API;
//! `InMemoryRecordStore` keeps records in process for local runs and tests.
//! Both share the wire DTOs in `dto`.

pub mod dto;
mod firebase;
mod memory;

pub use dto::StoreSnapshot;
pub use firebase::{FirebaseRecordStore, FirebaseStoreBuildError};
pub use memory::{InMemoryRecordStore, SnapshotLoadError, load_snapshot};
