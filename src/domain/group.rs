//! Partition records into groups keyed by one attribute.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::instrument;

use crate::domain::record::{Record, RecordKey};

/// Attribute holding the member records in the JSON form of a group.
pub const ALL_DATA_FIELD: &str = "allData";

/// One group descriptor: the shared key value and its records in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: RecordKey,
    /// The attribute value; `None` for records lacking the attribute
    pub value: Option<Value>,
    pub all_data: Vec<Record>,
}

impl Group {
    /// `{ <key_field>: value, "allData": [...] }`, omitting `key_field` for the absent group.
    pub fn to_value(&self, key_field: &str) -> Value {
        let mut map = Map::new();
        if let Some(value) = &self.value {
            map.insert(key_field.to_string(), value.clone());
        }
        map.insert(
            ALL_DATA_FIELD.to_string(),
            Value::Array(self.all_data.clone()),
        );
        Value::Object(map)
    }
}

/// Group `records` by `key` in a single pass.
///
/// Group order follows the first occurrence of each distinct value.
/// An empty `key` yields no groups.
#[instrument(level = "debug", skip(records), fields(records = records.len()))]
pub fn group_records(records: &[Value], key: &str) -> Vec<Group> {
    if key.is_empty() {
        return Vec::new();
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut positions: HashMap<RecordKey, usize> = HashMap::new();

    for record in records {
        let record_key = RecordKey::of(record, key);
        match positions.get(&record_key) {
            Some(&pos) => groups[pos].all_data.push(record.clone()),
            None => {
                positions.insert(record_key.clone(), groups.len());
                groups.push(Group {
                    key: record_key,
                    value: record.get(key).cloned(),
                    all_data: vec![record.clone()],
                });
            }
        }
    }

    groups
}

/// JSON array form of `groups`.
pub fn groups_to_value(groups: &[Group], key_field: &str) -> Value {
    Value::Array(groups.iter().map(|g| g.to_value(key_field)).collect())
}
