//! edgegrid-state: embedded state store for EdgeGrid.
//!
//! Backed by [redb](https://docs.rs/redb), holds the registered nodes and
//! workloads and the associations that assign workloads to nodes.
//!
//! # Architecture
//!
//! All records are JSON-serialized into redb's `&[u8]` value columns.
//! Associations are keyed by a monotonically increasing sequence number so
//! that table order is creation order; two side tables index them by id
//! and by `{node_id}/{workload_id}` pair. Every association write runs in a
//! single redb write transaction, and redb admits one writer at a time, so
//! the duplicate-pair check and the insert cannot interleave.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across async tasks.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;
