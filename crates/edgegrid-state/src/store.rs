//! StateStore: redb-backed state persistence for EdgeGrid.
//!
//! Provides typed operations over nodes, workloads, and node/workload
//! associations. All values are JSON-serialized into redb's `&[u8]` value
//! columns. The store supports both on-disk and in-memory backends (the
//! latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use edge_core::id;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(NODES).map_err(map_err!(Table))?;
        txn.open_table(WORKLOADS).map_err(map_err!(Table))?;
        txn.open_table(ASSOCIATIONS).map_err(map_err!(Table))?;
        txn.open_table(ASSOCIATION_IDS).map_err(map_err!(Table))?;
        txn.open_table(ASSOCIATION_PAIRS).map_err(map_err!(Table))?;
        txn.open_table(META).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Nodes ──────────────────────────────────────────────────────

    /// Insert or update a node.
    pub fn put_node(&self, node: &Node) -> StateResult<()> {
        let value = serde_json::to_vec(node).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(NODES).map_err(map_err!(Table))?;
            table
                .insert(node.id.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(node_id = %node.id, "node stored");
        Ok(())
    }

    /// Get a node by ID.
    pub fn get_node(&self, node_id: &str) -> StateResult<Option<Node>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(NODES).map_err(map_err!(Table))?;
        match table.get(node_id).map_err(map_err!(Read))? {
            Some(guard) => {
                let node: Node =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(node))
            }
            None => Ok(None),
        }
    }

    /// List all nodes.
    pub fn list_nodes(&self) -> StateResult<Vec<Node>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(NODES).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let node: Node =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(node);
        }
        Ok(results)
    }

    /// Delete a node by ID. Returns true if it existed.
    ///
    /// Associations referencing the node are left in place.
    ///
    /// Fails with `InUse` while any association names the node.
    pub fn delete_node(&self, node_id: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let pairs = txn.open_table(ASSOCIATION_PAIRS).map_err(map_err!(Table))?;
            let prefix = pair_key(node_id, "");
            let referenced = match pairs.range(prefix.as_str()..).map_err(map_err!(Read))?.next() {
                Some(entry) => entry.map_err(map_err!(Read))?.0.value().starts_with(&prefix),
                None => false,
            };
            if referenced {
                return Err(StateError::InUse(format!("node {node_id} has associations")));
            }

            let mut table = txn.open_table(NODES).map_err(map_err!(Table))?;
            existed = table.remove(node_id).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%node_id, existed, "node deleted");
        Ok(existed)
    }

    // ── Workloads ──────────────────────────────────────────────────

    /// Insert or update a workload.
    pub fn put_workload(&self, workload: &Workload) -> StateResult<()> {
        let value = serde_json::to_vec(workload).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(WORKLOADS).map_err(map_err!(Table))?;
            table
                .insert(workload.id.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(workload_id = %workload.id, kind = %workload.spec.kind, "workload stored");
        Ok(())
    }

    /// Get a workload by ID.
    pub fn get_workload(&self, workload_id: &str) -> StateResult<Option<Workload>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(WORKLOADS).map_err(map_err!(Table))?;
        match table.get(workload_id).map_err(map_err!(Read))? {
            Some(guard) => {
                let workload: Workload =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(workload))
            }
            None => Ok(None),
        }
    }

    /// List all workloads.
    pub fn list_workloads(&self) -> StateResult<Vec<Workload>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(WORKLOADS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let workload: Workload =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(workload);
        }
        Ok(results)
    }

    /// Delete a workload by ID. Returns true if it existed.
    ///
    /// Fails with `InUse` while any association names the workload.
    pub fn delete_workload(&self, workload_id: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let pairs = txn.open_table(ASSOCIATION_PAIRS).map_err(map_err!(Table))?;
            let suffix = format!("/{workload_id}");
            for entry in pairs.iter().map_err(map_err!(Read))? {
                let (key, _) = entry.map_err(map_err!(Read))?;
                if key.value().ends_with(&suffix) {
                    return Err(StateError::InUse(format!(
                        "workload {workload_id} has associations"
                    )));
                }
            }

            let mut table = txn.open_table(WORKLOADS).map_err(map_err!(Table))?;
            existed = table.remove(workload_id).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%workload_id, existed, "workload deleted");
        Ok(existed)
    }

    // ── Associations ───────────────────────────────────────────────

    /// Assign a workload to a node.
    ///
    /// Fails with `NotFound` if either record is missing and with
    /// `Duplicate` if the pair is already associated. The checks and the
    /// insert share one write transaction.
    pub fn create_association(
        &self,
        node_id: &str,
        workload_id: &str,
    ) -> StateResult<Association> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let association;
        {
            let nodes = txn.open_table(NODES).map_err(map_err!(Table))?;
            if nodes.get(node_id).map_err(map_err!(Read))?.is_none() {
                return Err(StateError::node_not_found(node_id));
            }
            let workloads = txn.open_table(WORKLOADS).map_err(map_err!(Table))?;
            if workloads.get(workload_id).map_err(map_err!(Read))?.is_none() {
                return Err(StateError::workload_not_found(workload_id));
            }

            let key = pair_key(node_id, workload_id);
            let mut pairs = txn.open_table(ASSOCIATION_PAIRS).map_err(map_err!(Table))?;
            if pairs.get(key.as_str()).map_err(map_err!(Read))?.is_some() {
                return Err(StateError::Duplicate {
                    node_id: node_id.to_string(),
                    workload_id: workload_id.to_string(),
                });
            }

            let mut meta = txn.open_table(META).map_err(map_err!(Table))?;
            let seq = meta
                .get(ASSOCIATION_SEQ)
                .map_err(map_err!(Read))?
                .map(|guard| guard.value())
                .unwrap_or(0)
                + 1;
            meta.insert(ASSOCIATION_SEQ, seq).map_err(map_err!(Write))?;

            association = Association {
                id: id::new_id(),
                node_id: node_id.to_string(),
                workload_id: workload_id.to_string(),
            };
            let value = serde_json::to_vec(&association).map_err(map_err!(Serialize))?;

            let mut records = txn.open_table(ASSOCIATIONS).map_err(map_err!(Table))?;
            records
                .insert(seq, value.as_slice())
                .map_err(map_err!(Write))?;
            let mut ids = txn.open_table(ASSOCIATION_IDS).map_err(map_err!(Table))?;
            ids.insert(association.id.as_str(), seq)
                .map_err(map_err!(Write))?;
            pairs
                .insert(key.as_str(), association.id.as_str())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(
            association_id = %association.id,
            %node_id,
            %workload_id,
            "association created"
        );
        Ok(association)
    }

    /// Get an association by ID.
    pub fn get_association(&self, association_id: &str) -> StateResult<Association> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let ids = txn.open_table(ASSOCIATION_IDS).map_err(map_err!(Table))?;
        let seq = match ids.get(association_id).map_err(map_err!(Read))? {
            Some(guard) => guard.value(),
            None => return Err(StateError::association_not_found(association_id)),
        };
        let records = txn.open_table(ASSOCIATIONS).map_err(map_err!(Table))?;
        match records.get(seq).map_err(map_err!(Read))? {
            Some(guard) => {
                serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))
            }
            // Index and record tables are only written together.
            None => Err(StateError::Read(format!(
                "association {association_id} indexed at {seq} but record missing"
            ))),
        }
    }

    /// List associations in creation order, optionally only those for one node.
    pub fn list_associations(&self, node_id: Option<&str>) -> StateResult<Vec<Association>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(ASSOCIATIONS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let association: Association =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            if node_id.is_none_or(|n| n == association.node_id) {
                results.push(association);
            }
        }
        Ok(results)
    }

    /// Delete an association by ID.
    ///
    /// Not idempotent: a second delete of the same ID fails with `NotFound`.
    pub fn delete_association(&self, association_id: &str) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut ids = txn.open_table(ASSOCIATION_IDS).map_err(map_err!(Table))?;
            let seq = match ids.remove(association_id).map_err(map_err!(Write))? {
                Some(guard) => guard.value(),
                None => return Err(StateError::association_not_found(association_id)),
            };

            let mut records = txn.open_table(ASSOCIATIONS).map_err(map_err!(Table))?;
            let removed: Option<Association> = match records.remove(seq).map_err(map_err!(Write))? {
                Some(guard) => Some(
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?,
                ),
                None => None,
            };

            if let Some(association) = removed {
                let mut pairs = txn.open_table(ASSOCIATION_PAIRS).map_err(map_err!(Table))?;
                pairs
                    .remove(association.pair_key().as_str())
                    .map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%association_id, "association deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            address: "10.0.0.1".to_string(),
            port: 50051,
            labels: HashMap::new(),
        }
    }

    fn test_workload(id: &str) -> Workload {
        Workload {
            id: id.to_string(),
            spec: WorkloadSpec {
                kind: WorkloadKind::Container,
                name: format!("app-{id}"),
                image: "registry.local/app:1.0".to_string(),
                command: vec![],
            },
        }
    }

    /// Store with nodes `n1`, `n2` and workloads `w1`..`w3`.
    fn seeded_store() -> StateStore {
        let store = StateStore::open_in_memory().unwrap();
        for n in ["n1", "n2"] {
            store.put_node(&test_node(n)).unwrap();
        }
        for w in ["w1", "w2", "w3"] {
            store.put_workload(&test_workload(w)).unwrap();
        }
        store
    }

    // ── Node / workload CRUD ───────────────────────────────────────

    #[test]
    fn node_put_and_get() {
        let store = StateStore::open_in_memory().unwrap();
        let node = test_node("node-1");

        store.put_node(&node).unwrap();
        assert_eq!(store.get_node("node-1").unwrap(), Some(node));
        assert!(store.get_node("node-2").unwrap().is_none());
    }

    #[test]
    fn node_list_and_delete() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_node(&test_node("node-1")).unwrap();
        store.put_node(&test_node("node-2")).unwrap();
        assert_eq!(store.list_nodes().unwrap().len(), 2);

        assert!(store.delete_node("node-1").unwrap());
        assert!(!store.delete_node("node-1").unwrap());
        assert_eq!(store.list_nodes().unwrap().len(), 1);
    }

    #[test]
    fn associated_records_cannot_be_deleted() {
        let store = seeded_store();
        let association = store.create_association("n1", "w1").unwrap();

        assert!(matches!(store.delete_node("n1"), Err(StateError::InUse(_))));
        assert!(matches!(store.delete_workload("w1"), Err(StateError::InUse(_))));
        assert!(store.get_node("n1").unwrap().is_some());
        assert!(store.get_workload("w1").unwrap().is_some());

        // Prefix and suffix matches must be whole ids.
        store.put_node(&test_node("n")).unwrap();
        store.put_workload(&test_workload("1")).unwrap();
        assert!(store.delete_node("n").unwrap());
        assert!(store.delete_workload("1").unwrap());
        assert!(store.delete_node("n2").unwrap());
        assert!(store.delete_workload("w2").unwrap());

        store.delete_association(&association.id).unwrap();
        assert!(store.delete_node("n1").unwrap());
        assert!(store.delete_workload("w1").unwrap());
    }

    #[test]
    fn workload_put_get_delete() {
        let store = StateStore::open_in_memory().unwrap();
        let workload = test_workload("w1");

        store.put_workload(&workload).unwrap();
        assert_eq!(store.get_workload("w1").unwrap(), Some(workload));
        assert_eq!(store.list_workloads().unwrap().len(), 1);

        assert!(store.delete_workload("w1").unwrap());
        assert!(store.get_workload("w1").unwrap().is_none());
    }

    // ── Associations ───────────────────────────────────────────────

    #[test]
    fn create_then_get_association() {
        let store = seeded_store();
        let created = store.create_association("n1", "w1").unwrap();

        assert!(id::is_valid(&created.id));
        assert_eq!(created.node_id, "n1");
        assert_eq!(created.workload_id, "w1");

        let fetched = store.get_association(&created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn create_association_generates_fresh_ids() {
        let store = seeded_store();
        let a = store.create_association("n1", "w1").unwrap();
        let b = store.create_association("n1", "w2").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn duplicate_pair_rejected() {
        let store = seeded_store();
        store.create_association("n1", "w1").unwrap();

        let err = store.create_association("n1", "w1").unwrap_err();
        assert!(matches!(err, StateError::Duplicate { .. }));
        assert_eq!(
            err.to_string(),
            "duplicate record detected for node_id n1 and workload_id w1"
        );

        // Same workload on another node is a different pair.
        store.create_association("n2", "w1").unwrap();
    }

    #[test]
    fn missing_references_rejected() {
        let store = seeded_store();

        let err = store.create_association("nope", "w1").unwrap_err();
        assert_eq!(err.to_string(), "node nope not found");

        let err = store.create_association("n1", "nope").unwrap_err();
        assert_eq!(err.to_string(), "workload nope not found");

        assert!(store.list_associations(None).unwrap().is_empty());
    }

    #[test]
    fn list_preserves_creation_order() {
        let store = seeded_store();
        let a = store.create_association("n2", "w3").unwrap();
        let b = store.create_association("n1", "w1").unwrap();
        let c = store.create_association("n2", "w1").unwrap();
        let d = store.create_association("n1", "w2").unwrap();

        let all = store.list_associations(None).unwrap();
        assert_eq!(all, vec![a.clone(), b.clone(), c.clone(), d.clone()]);

        let n1 = store.list_associations(Some("n1")).unwrap();
        assert_eq!(n1, vec![b, d]);

        let n2 = store.list_associations(Some("n2")).unwrap();
        assert_eq!(n2, vec![a, c]);

        assert!(store.list_associations(Some("n3")).unwrap().is_empty());
    }

    #[test]
    fn delete_is_not_idempotent() {
        let store = seeded_store();
        let created = store.create_association("n1", "w1").unwrap();

        store.delete_association(&created.id).unwrap();
        assert!(matches!(
            store.get_association(&created.id),
            Err(StateError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_association(&created.id),
            Err(StateError::NotFound(_))
        ));
    }

    #[test]
    fn delete_frees_pair() {
        let store = seeded_store();
        let first = store.create_association("n1", "w1").unwrap();
        store.delete_association(&first.id).unwrap();

        let second = store.create_association("n1", "w1").unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn order_survives_deleting_newest() {
        let store = seeded_store();
        let a = store.create_association("n1", "w1").unwrap();
        let b = store.create_association("n1", "w2").unwrap();
        store.delete_association(&b.id).unwrap();
        let c = store.create_association("n1", "w3").unwrap();

        assert_eq!(store.list_associations(None).unwrap(), vec![a, c]);
    }

    #[test]
    fn concurrent_identical_creates_yield_one_record() {
        let store = seeded_store();
        let results: Vec<StateResult<Association>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    let store = store.clone();
                    s.spawn(move || store.create_association("n1", "w1"))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let ok = results.iter().filter(|r| r.is_ok()).count();
        let dup = results
            .iter()
            .filter(|r| matches!(r, Err(StateError::Duplicate { .. })))
            .count();
        assert_eq!(ok, 1);
        assert_eq!(dup, 15);
        assert_eq!(store.list_associations(None).unwrap().len(), 1);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edgegrid.redb");

        let created = {
            let store = StateStore::open(&path).unwrap();
            store.put_node(&test_node("n1")).unwrap();
            store.put_workload(&test_workload("w1")).unwrap();
            store.create_association("n1", "w1").unwrap()
        };

        let store = StateStore::open(&path).unwrap();
        assert_eq!(store.get_association(&created.id).unwrap(), created);
        assert!(matches!(
            store.create_association("n1", "w1"),
            Err(StateError::Duplicate { .. })
        ));
    }
}
