use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use serde_json::Value;
use tracing::instrument;

use crate::domain::record::{Record, RecordKey};

/// Data payload for tree nodes: the record plus its resolved identifier.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Identifier under the configured id field
    pub key: RecordKey,
    /// Clone of the input record, without any children attribute attached
    pub record: Record,
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// Tree node in the arena-based forest.
#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in input order
    pub children: Vec<Index>,
}

/// Arena-based forest built from flat records.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Roots are kept in input order; so are the children of every node.
#[derive(Debug)]
pub struct RecordArena {
    arena: Arena<TreeNode>,
    roots: Vec<Index>,
}

impl Default for RecordArena {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.roots.push(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal over all trees, roots in input order.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Number of levels of the deepest tree, 0 for an empty forest.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(Index, usize)> = self.roots.iter().map(|&r| (r, 1)).collect();

        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.get_node(idx) {
                stack.extend(node.children.iter().map(|&c| (c, depth + 1)));
            }
        }
        max_depth
    }

    /// Records without children, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<&Record> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| &node.data.record)
            .collect()
    }

    /// Every root-to-leaf path as a list of identifiers.
    #[instrument(level = "debug", skip(self))]
    pub fn branches(&self) -> Vec<Vec<RecordKey>> {
        let mut branches = Vec::new();
        let mut stack: Vec<(Index, Vec<RecordKey>)> = self
            .roots
            .iter()
            .rev()
            .map(|&r| (r, Vec::new()))
            .collect();

        while let Some((idx, mut path)) = stack.pop() {
            let Some(node) = self.get_node(idx) else {
                continue;
            };
            path.push(node.data.key.clone());
            if node.children.is_empty() {
                branches.push(path);
            } else {
                for &child in node.children.iter().rev() {
                    stack.push((child, path.clone()));
                }
            }
        }
        branches
    }

    /// Assemble nested records, attaching children under `children_field`.
    ///
    /// Works bottom-up over the post-order traversal, so no recursion depth is
    /// involved. Nodes without children get no `children_field` attribute.
    #[instrument(level = "debug", skip(self))]
    pub fn to_records(&self, children_field: &str) -> Vec<Record> {
        let mut assembled: HashMap<Index, Record> = HashMap::with_capacity(self.len());

        for (idx, node) in self.iter_postorder() {
            let mut record = node.data.record.clone();
            if !node.children.is_empty() {
                let children: Vec<Record> = node
                    .children
                    .iter()
                    .filter_map(|child| assembled.remove(child))
                    .collect();
                if let Value::Object(map) = &mut record {
                    map.insert(children_field.to_string(), Value::Array(children));
                }
            }
            assembled.insert(idx, record);
        }

        self.roots
            .iter()
            .filter_map(|root| assembled.remove(root))
            .collect()
    }
}

pub struct TreeIterator<'a> {
    arena: &'a RecordArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a RecordArena) -> Self {
        // Reverse so the first root is popped first
        let stack = arena.roots.iter().rev().copied().collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a RecordArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a RecordArena) -> Self {
        let stack = arena.roots.iter().rev().map(|&r| (r, false)).collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: i64) -> NodeData {
        let record = json!({ "id": id });
        NodeData {
            key: RecordKey::of(&record, "id"),
            record,
        }
    }

    //      1        4
    //     / \
    //    2   3
    fn sample() -> RecordArena {
        let mut arena = RecordArena::new();
        let root = arena.insert_node(node(1), None);
        arena.insert_node(node(2), Some(root));
        arena.insert_node(node(3), Some(root));
        arena.insert_node(node(4), None);
        arena
    }

    #[test]
    fn given_forest_when_iterating_then_yields_preorder_across_roots() {
        let arena = sample();
        let keys: Vec<String> = arena.iter().map(|(_, n)| n.data.to_string()).collect();
        assert_eq!(keys, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn given_forest_when_iterating_postorder_then_children_come_first() {
        let arena = sample();
        let keys: Vec<String> = arena
            .iter_postorder()
            .map(|(_, n)| n.data.to_string())
            .collect();
        assert_eq!(keys, vec!["2", "3", "1", "4"]);
    }

    #[test]
    fn given_forest_when_measuring_then_reports_depth_and_leaves() {
        let arena = sample();
        assert_eq!(arena.depth(), 2);
        assert_eq!(arena.leaf_nodes().len(), 3);
        assert_eq!(
            arena.branches(),
            vec![
                vec![RecordKey::Int(1), RecordKey::Int(2)],
                vec![RecordKey::Int(1), RecordKey::Int(3)],
                vec![RecordKey::Int(4)],
            ]
        );
    }

    #[test]
    fn given_empty_arena_when_measuring_then_everything_is_empty() {
        let arena = RecordArena::new();
        assert!(arena.is_empty());
        assert_eq!(arena.depth(), 0);
        assert!(arena.to_records("children").is_empty());
    }

    #[test]
    fn given_forest_when_assembling_then_only_parents_get_children() {
        let records = sample().to_records("kids");
        assert_eq!(
            records,
            vec![
                json!({"id": 1, "kids": [{"id": 2}, {"id": 3}]}),
                json!({"id": 4}),
            ]
        );
    }
}
