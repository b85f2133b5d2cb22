//! edgegrid-lifecycle: the workload instance state machine.
//!
//! A deployed workload instance is `Ready`, `Running` or `Stopped`; an
//! instance with no record is undeployed. [`machine`] holds the pure
//! transition rules and [`table`] the concurrent instance table that applies
//! them. Whoever hosts an `InstanceTable` is authoritative for the instances
//! in it: node agents serve one over gRPC, tests and single-process setups
//! use one directly.

pub mod error;
pub mod machine;
pub mod table;

pub use error::{LifecycleError, LifecycleResult};
pub use machine::WorkloadInstance;
pub use table::InstanceTable;
