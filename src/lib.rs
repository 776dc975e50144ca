//! Record trees and grouping over open JSON records, plus color, date,
//! validation and data-URL helpers.
//!
//! The two core entry points are lenient: input that is not a JSON array
//! yields an empty result instead of an error.
//!
//! ```
//! use serde_json::json;
//!
//! let data = json!([
//!     {"id": 1, "parentId": null, "name": "a"},
//!     {"id": 2, "parentId": 1, "name": "b"},
//! ]);
//! let tree = rsutil::build_tree(&data, None, None, None).unwrap();
//! assert_eq!(tree[0]["children"][0]["name"], "b");
//!
//! let groups = rsutil::group_by(&data, "name");
//! assert_eq!(groups.len(), 2);
//! ```

use serde_json::Value;
use tracing::{debug, instrument};

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    group_records, groups_to_value, DomainError, Group, RecordArena, RecordKey, TreeBuilder,
    TreeFields, TreeResult,
};

/// Nest the records of a JSON array under their parents.
///
/// Field names default to `id`, `parentId` and `children`. Roots keep input
/// order, and so do the children of each record. A non-array `data` yields an
/// empty forest; a parent chain that loops is reported as
/// [`DomainError::CycleDetected`].
#[instrument(level = "debug", skip(data))]
pub fn build_tree(
    data: &Value,
    id: Option<&str>,
    parent_id: Option<&str>,
    children: Option<&str>,
) -> TreeResult<Vec<Value>> {
    let Some(records) = data.as_array() else {
        debug!("build_tree: input is not an array");
        return Ok(Vec::new());
    };
    let fields = TreeFields::new(id, parent_id, children);
    let forest = TreeBuilder::with_fields(fields.clone()).build(records)?;
    Ok(forest.to_records(&fields.children))
}

/// Partition the records of a JSON array by the value of `key`.
///
/// Groups appear in order of first occurrence; records keep input order
/// within a group. A non-array `data` or an empty `key` yields no groups.
#[instrument(level = "debug", skip(data))]
pub fn group_by(data: &Value, key: &str) -> Vec<Group> {
    match data.as_array() {
        Some(records) => group_records(records, key),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_object_input_when_building_tree_then_returns_empty() {
        let result = build_tree(&json!({"id": 1}), None, None, None).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn given_string_input_when_grouping_then_returns_empty() {
        assert!(group_by(&json!("not records"), "type").is_empty());
        assert!(group_by(&json!([{"type": "a"}]), "").is_empty());
    }

    #[test]
    fn given_custom_field_names_when_building_tree_then_uses_them() {
        let data = json!([
            {"key": "root"},
            {"key": "leaf", "up": "root"},
        ]);

        let tree = build_tree(&data, Some("key"), Some("up"), Some("items")).unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0]["items"][0]["key"], "leaf");
        assert!(tree[0].get("children").is_none());
    }
}
