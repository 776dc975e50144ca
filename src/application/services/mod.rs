//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, StdinReader)
//! but are themselves concrete structs, not traits.

mod data;

pub use data::{to_pretty, DataService, STDIN_SOURCE};
