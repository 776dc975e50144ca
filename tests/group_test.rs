//! Integration tests for grouping records by an attribute value.

use serde_json::{json, Value};

use rsutil::util::testing;
use rsutil::{group_by, groups_to_value, RecordKey};

#[test]
fn given_typed_records_when_grouping_then_matches_first_seen_order() {
    testing::init_test_setup();
    // Arrange
    let data = json!([
        {"type": "a", "v": 1},
        {"type": "b", "v": 2},
        {"type": "a", "v": 3},
    ]);

    // Act
    let groups = group_by(&data, "type");

    // Assert
    assert_eq!(
        groups_to_value(&groups, "type"),
        json!([
            {"type": "a", "allData": [{"type": "a", "v": 1}, {"type": "a", "v": 3}]},
            {"type": "b", "allData": [{"type": "b", "v": 2}]},
        ])
    );
}

#[test]
fn given_interleaved_keys_when_grouping_then_group_order_is_first_occurrence() {
    let keys = ["z", "m", "z", "a", "m", "q", "a", "z"];
    let data = Value::Array(keys.iter().map(|k| json!({"k": k})).collect());

    let groups = group_by(&data, "k");

    let order: Vec<RecordKey> = groups.iter().map(|g| g.key.clone()).collect();
    let expected: Vec<RecordKey> = ["z", "m", "a", "q"]
        .iter()
        .map(|k| RecordKey::Str(k.to_string()))
        .collect();
    assert_eq!(order, expected);
    let total: usize = groups.iter().map(|g| g.all_data.len()).sum();
    assert_eq!(total, keys.len());
}

#[test]
fn given_missing_null_and_empty_values_when_grouping_then_groups_stay_distinct() {
    // Arrange
    let data = json!([
        {"name": "no-key"},
        {"tag": null, "name": "null"},
        {"tag": "", "name": "empty"},
        {"name": "no-key-2"},
    ]);

    // Act
    let groups = group_by(&data, "tag");

    // Assert
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].key, RecordKey::Absent);
    assert_eq!(groups[0].value, None);
    assert_eq!(groups[0].all_data.len(), 2);
    assert_eq!(groups[1].value, Some(Value::Null));
    assert_eq!(groups[2].value, Some(json!("")));

    let rendered = groups_to_value(&groups, "tag");
    assert!(rendered[0].get("tag").is_none());
    assert_eq!(rendered[1]["tag"], Value::Null);
    assert!(rendered[1].as_object().unwrap().contains_key("tag"));
}

#[test]
fn given_numeric_spellings_when_grouping_then_integral_values_merge() {
    let data = json!([
        {"n": 1},
        {"n": 1.0},
        {"n": "1"},
        {"n": 1.5},
    ]);

    let groups = group_by(&data, "n");

    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].all_data.len(), 2);
    assert_eq!(groups[0].value, Some(json!(1)));
    assert_eq!(groups[1].key, RecordKey::Str("1".to_string()));
}

#[test]
fn given_composite_values_when_grouping_then_equal_structures_share_group() {
    let data = json!([
        {"loc": {"city": "Berlin", "zip": "10115"}},
        {"loc": ["a", "b"]},
        {"loc": {"zip": "10115", "city": "Berlin"}},
    ]);

    let groups = group_by(&data, "loc");

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].all_data.len(), 2);
}

#[test]
fn given_undefined_input_or_empty_key_when_grouping_then_returns_empty() {
    assert!(group_by(&Value::Null, "x").is_empty());
    assert!(group_by(&Value::Array(testing::sample_records()), "").is_empty());
}
