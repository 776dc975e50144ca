//! Tree builder for turning flat parent-linked records into a forest.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::arena::{NodeData, RecordArena};
use crate::domain::error::DomainError;
use crate::domain::record::RecordKey;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

pub const DEFAULT_ID_FIELD: &str = "id";
pub const DEFAULT_PARENT_ID_FIELD: &str = "parentId";
pub const DEFAULT_CHILDREN_FIELD: &str = "children";

/// Attribute names the builder reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFields {
    pub id: String,
    pub parent_id: String,
    pub children: String,
}

impl Default for TreeFields {
    fn default() -> Self {
        Self {
            id: DEFAULT_ID_FIELD.to_string(),
            parent_id: DEFAULT_PARENT_ID_FIELD.to_string(),
            children: DEFAULT_CHILDREN_FIELD.to_string(),
        }
    }
}

impl TreeFields {
    /// Missing or empty names fall back to the defaults.
    pub fn new(id: Option<&str>, parent_id: Option<&str>, children: Option<&str>) -> Self {
        fn pick(name: Option<&str>, default: &str) -> String {
            name.filter(|n| !n.is_empty()).unwrap_or(default).to_string()
        }
        Self {
            id: pick(id, DEFAULT_ID_FIELD),
            parent_id: pick(parent_id, DEFAULT_PARENT_ID_FIELD),
            children: pick(children, DEFAULT_CHILDREN_FIELD),
        }
    }
}

/// Constructs record forests from flat, parent-linked input.
pub struct TreeBuilder {
    fields: TreeFields,
    /// parent identifier -> positions of the records referencing it, input order
    relationship_cache: HashMap<RecordKey, Vec<usize>>,
    /// identifier -> position of the last record carrying it
    id_index: HashMap<RecordKey, usize>,
    visited: HashSet<usize>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::with_fields(TreeFields::default())
    }

    pub fn with_fields(fields: TreeFields) -> Self {
        Self {
            fields,
            relationship_cache: HashMap::new(),
            id_index: HashMap::new(),
            visited: HashSet::new(),
        }
    }

    pub fn fields(&self) -> &TreeFields {
        &self.fields
    }

    /// Build the forest for `records`.
    ///
    /// Roots are the records whose parent identifier matches no record's identifier,
    /// in input order. Fails with `CycleDetected` when some records can only reach
    /// each other through their parent links and never a root.
    #[instrument(level = "debug", skip(self, records), fields(records = records.len()))]
    pub fn build(&mut self, records: &[Value]) -> TreeResult<RecordArena> {
        // Reset state for a fresh build
        self.relationship_cache.clear();
        self.id_index.clear();
        self.visited.clear();

        self.index_records(records);

        let roots = self.find_root_nodes(records);
        debug!("found {} root(s)", roots.len());

        let mut forest = RecordArena::new();
        for root in roots {
            self.build_tree(records, root, &mut forest)?;
        }

        // Anything not reached from a root hangs off a parent loop
        if let Some(stray) = (0..records.len()).find(|pos| !self.visited.contains(pos)) {
            let key = RecordKey::of(&records[stray], &self.fields.id);
            return Err(DomainError::CycleDetected(key));
        }

        Ok(forest)
    }

    fn index_records(&mut self, records: &[Value]) {
        for (pos, record) in records.iter().enumerate() {
            let parent_key = RecordKey::of(record, &self.fields.parent_id);
            self.relationship_cache.entry(parent_key).or_default().push(pos);

            let id_key = RecordKey::of(record, &self.fields.id);
            if !id_key.is_absent() {
                // Duplicate identifiers: last write wins
                self.id_index.insert(id_key, pos);
            }
        }
    }

    fn find_root_nodes(&self, records: &[Value]) -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                let parent_key = RecordKey::of(record, &self.fields.parent_id);
                !self.id_index.contains_key(&parent_key)
            })
            .map(|(pos, _)| pos)
            .collect()
    }

    fn build_tree(
        &mut self,
        records: &[Value],
        root: usize,
        forest: &mut RecordArena,
    ) -> TreeResult<()> {
        let mut stack = vec![(root, None)];

        while let Some((pos, parent_idx)) = stack.pop() {
            let record = &records[pos];
            let key = RecordKey::of(record, &self.fields.id);

            // Cycle detection
            if !self.visited.insert(pos) {
                return Err(DomainError::CycleDetected(key));
            }

            // Only the record the identifier index resolves to adopts the bucket
            let owns_key = self.id_index.get(&key) == Some(&pos);
            let node_data = NodeData {
                key: key.clone(),
                record: record.clone(),
            };
            let current_idx = forest.insert_node(node_data, parent_idx);

            if owns_key {
                if let Some(children) = self.relationship_cache.get(&key) {
                    // Reverse so children are inserted in input order
                    for &child in children.iter().rev() {
                        stack.push((child, Some(current_idx)));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_empty_names_when_creating_fields_then_uses_defaults() {
        let fields = TreeFields::new(Some(""), None, Some("kids"));
        assert_eq!(fields.id, "id");
        assert_eq!(fields.parent_id, "parentId");
        assert_eq!(fields.children, "kids");
    }

    #[test]
    fn given_builder_reused_when_building_then_state_is_reset() {
        let mut builder = TreeBuilder::new();
        let first = builder
            .build(&[json!({"id": 1}), json!({"id": 2, "parentId": 1})])
            .unwrap();
        assert_eq!(first.len(), 2);

        let second = builder.build(&[json!({"id": 7})]).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second.roots().len(), 1);
    }

    #[test]
    fn given_self_parent_when_building_then_cycle_detected() {
        let mut builder = TreeBuilder::new();
        let result = builder.build(&[json!({"id": 1, "parentId": 1})]);
        assert!(matches!(
            result,
            Err(DomainError::CycleDetected(RecordKey::Int(1)))
        ));
    }
}
