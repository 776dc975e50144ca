use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::RecordArena;
use crate::domain::record::record_label;

/// Conversion of a built forest into printable trees.
pub trait TreeNodeConvert {
    /// One display tree per root, nodes labelled by `label_field`.
    fn to_tree_strings(&self, label_field: &str) -> Vec<Tree<String>>;
}

impl TreeNodeConvert for RecordArena {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_strings(&self, label_field: &str) -> Vec<Tree<String>> {
        fn build_tree(arena: &RecordArena, node_idx: Index, label_field: &str) -> Tree<String> {
            let Some(node) = arena.get_node(node_idx) else {
                return Tree::new(String::new());
            };
            let leaves: Vec<_> = node
                .children
                .iter()
                .map(|&child| build_tree(arena, child, label_field))
                .collect();
            Tree::new(record_label(&node.data.record, label_field)).with_leaves(leaves)
        }

        self.roots()
            .iter()
            .map(|&root| build_tree(self, root, label_field))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::TreeBuilder;
    use serde_json::json;

    #[test]
    fn given_forest_when_rendering_then_labels_follow_hierarchy() {
        let records = [
            json!({"id": 1, "name": "root"}),
            json!({"id": 2, "parentId": 1, "name": "leaf"}),
        ];
        let forest = TreeBuilder::new().build(&records).unwrap();
        let trees = forest.to_tree_strings("name");

        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].root, "root");
        assert_eq!(trees[0].leaves.len(), 1);
        assert_eq!(trees[0].leaves[0].root, "leaf");
    }
}
