//! Record loading and shaping service
//!
//! Reads a JSON array of records from a file or stdin and runs the
//! tree and grouping operations on it.

use std::path::Path;
use std::sync::Arc;

use itertools::Itertools;
use serde_json::Value;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    group_records, groups_to_value, RecordArena, TreeBuilder, TreeFields, TreeNodeConvert,
};
use crate::infrastructure::traits::{FileSystem, StdinReader};

/// Source name that selects standard input.
pub const STDIN_SOURCE: &str = "-";

/// Service for loading records and shaping them into trees or groups.
pub struct DataService {
    fs: Arc<dyn FileSystem>,
    stdin: Arc<dyn StdinReader>,
}

impl DataService {
    pub fn new(fs: Arc<dyn FileSystem>, stdin: Arc<dyn StdinReader>) -> Self {
        Self { fs, stdin }
    }

    /// Load a JSON array of records from `source` (`-` reads stdin).
    #[instrument(level = "debug", skip(self))]
    pub fn load_records(&self, source: &str) -> ApplicationResult<Vec<Value>> {
        let content = if source == STDIN_SOURCE {
            self.stdin
                .read_all()
                .map_err(|e| ApplicationError::OperationFailed {
                    context: "read records from stdin".to_string(),
                    source: Box::new(e),
                })?
        } else {
            let path = Path::new(source);
            if !self.fs.exists(path) {
                return Err(ApplicationError::InvalidInput {
                    message: format!("file not found: {}", path.display()),
                });
            }
            self.fs
                .read_to_string(path)
                .with_path_context("read records", path)?
        };

        let value: Value =
            serde_json::from_str(&content).map_err(|e| ApplicationError::InvalidInput {
                message: format!("{source}: not valid JSON: {e}"),
            })?;
        match value {
            Value::Array(records) => {
                debug!("load_records: {} records from {}", records.len(), source);
                Ok(records)
            }
            other => Err(ApplicationError::InvalidInput {
                message: format!("{source}: expected a JSON array, found {}", kind(&other)),
            }),
        }
    }

    /// Build the forest for `records`.
    pub fn forest(&self, records: &[Value], fields: &TreeFields) -> ApplicationResult<RecordArena> {
        let mut builder = TreeBuilder::with_fields(fields.clone());
        Ok(builder.build(records)?)
    }

    /// Nested JSON trees, children linked through `fields.children`.
    #[instrument(level = "debug", skip(self, records))]
    pub fn tree(&self, records: &[Value], fields: &TreeFields) -> ApplicationResult<Value> {
        let forest = self.forest(records, fields)?;
        Ok(Value::Array(forest.to_records(&fields.children)))
    }

    /// Printable trees labelled by `label_field`.
    pub fn tree_display(
        &self,
        records: &[Value],
        fields: &TreeFields,
        label_field: &str,
    ) -> ApplicationResult<Vec<Tree<String>>> {
        let forest = self.forest(records, fields)?;
        Ok(forest.to_tree_strings(label_field))
    }

    /// Root-to-leaf identifier paths, one line each, e.g. `1 -> 2 -> 4`.
    pub fn branches(&self, records: &[Value], fields: &TreeFields) -> ApplicationResult<Vec<String>> {
        let forest = self.forest(records, fields)?;
        Ok(forest
            .branches()
            .iter()
            .map(|branch| branch.iter().join(" -> "))
            .collect())
    }

    /// JSON group descriptors keyed by `key`.
    #[instrument(level = "debug", skip(self, records))]
    pub fn group(&self, records: &[Value], key: &str) -> ApplicationResult<Value> {
        if key.is_empty() {
            return Err(ApplicationError::InvalidInput {
                message: "group key must not be empty".to_string(),
            });
        }
        let groups = group_records(records, key);
        debug!("group: {} groups for key {}", groups.len(), key);
        Ok(groups_to_value(&groups, key))
    }

    /// Write `value` as pretty JSON to `path`.
    pub fn write_json(&self, value: &Value, path: &Path) -> ApplicationResult<()> {
        let content = to_pretty(value)?;
        self.fs
            .write(path, &content)
            .with_path_context("write output", path)
    }
}

/// Pretty-printed JSON text.
pub fn to_pretty(value: &Value) -> ApplicationResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| ApplicationError::OperationFailed {
        context: "serialize JSON".to_string(),
        source: Box::new(e),
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::infrastructure::traits::RealFileSystem;
    use crate::util::testing;
    use serde_json::json;
    use std::io;
    use tempfile::TempDir;

    struct FixedStdin(&'static str);

    impl StdinReader for FixedStdin {
        fn read_all(&self) -> io::Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn service(stdin: &'static str) -> DataService {
        DataService::new(Arc::new(RealFileSystem), Arc::new(FixedStdin(stdin)))
    }

    #[test]
    fn given_stdin_array_when_loading_then_returns_records() {
        testing::init_test_setup();
        let svc = service(r#"[{"id": 1}, {"id": 2, "parentId": 1}]"#);

        let records = svc.load_records(STDIN_SOURCE).unwrap();

        assert_eq!(records.len(), 2);
    }

    #[test]
    fn given_object_input_when_loading_then_rejects() {
        let svc = service(r#"{"id": 1}"#);

        let err = svc.load_records(STDIN_SOURCE).unwrap_err();

        assert!(matches!(err, ApplicationError::InvalidInput { .. }));
        assert!(err.to_string().contains("expected a JSON array, found an object"));
    }

    #[test]
    fn given_missing_file_when_loading_then_reports_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");

        let err = service("")
            .load_records(missing.to_str().unwrap())
            .unwrap_err();

        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn given_records_when_building_tree_then_nests_children() {
        let svc = service("");
        let records = testing::sample_records();

        let tree = svc.tree(&records, &TreeFields::default()).unwrap();

        assert_eq!(tree[0]["name"], json!("Engineering"));
        assert_eq!(tree[0]["children"][0]["children"][0]["name"], json!("Storage"));
        assert_eq!(tree[1]["name"], json!("Sales"));
        assert!(tree[1].get("children").is_none());
    }

    #[test]
    fn given_records_when_listing_branches_then_joins_ids() {
        let svc = service("");
        let records = testing::sample_records();

        let branches = svc.branches(&records, &TreeFields::default()).unwrap();

        assert_eq!(branches, vec!["1 -> 2 -> 4", "1 -> 3", "5"]);
    }

    #[test]
    fn given_cycle_when_building_tree_then_surfaces_domain_error() {
        let svc = service("");
        let records = vec![json!({"id": "a", "parentId": "b"}), json!({"id": "b", "parentId": "a"})];

        let err = svc.tree(&records, &TreeFields::default()).unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::CycleDetected(_))
        ));
    }

    #[test]
    fn given_empty_key_when_grouping_then_rejects() {
        let svc = service("");

        let result = svc.group(&testing::sample_records(), "");

        assert!(matches!(result, Err(ApplicationError::InvalidInput { .. })));
    }

    #[test]
    fn given_output_path_when_writing_json_then_file_holds_pretty_json() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("groups.json");
        let svc = service("");
        let groups = svc.group(&testing::sample_records(), "site").unwrap();

        svc.write_json(&groups, &out).unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written.as_array().unwrap().len(), 3);
        assert_eq!(written[0]["site"], json!("Berlin"));
        assert!(written[2].get("site").is_none());
    }
}
