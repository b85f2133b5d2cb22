//! redb table definitions for the EdgeGrid state store.
//!
//! Record tables use `&[u8]` values (JSON-serialized domain types). Index
//! tables store plain keys so lookups never deserialize a record.

use redb::TableDefinition;

/// Registered nodes keyed by `{node_id}`.
pub const NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("nodes");

/// Registered workloads keyed by `{workload_id}`.
pub const WORKLOADS: TableDefinition<&str, &[u8]> = TableDefinition::new("workloads");

/// Associations keyed by creation sequence number.
pub const ASSOCIATIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("associations");

/// Association id → creation sequence number.
pub const ASSOCIATION_IDS: TableDefinition<&str, u64> = TableDefinition::new("association_ids");

/// `{node_id}/{workload_id}` → association id.
pub const ASSOCIATION_PAIRS: TableDefinition<&str, &str> =
    TableDefinition::new("association_pairs");

/// Named counters.
pub const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

/// Counter holding the last issued association sequence number.
pub const ASSOCIATION_SEQ: &str = "association_seq";
