//! Domain layer: record trees and grouping
//!
//! This layer is independent of external concerns (no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod error;
pub mod group;
pub mod record;
pub mod tree_traits;

pub use arena::{NodeData, RecordArena, TreeNode};
pub use builder::{TreeBuilder, TreeFields, TreeResult};
pub use error::DomainError;
pub use group::{group_records, groups_to_value, Group, ALL_DATA_FIELD};
pub use record::{record_label, Record, RecordKey};
pub use tree_traits::TreeNodeConvert;
