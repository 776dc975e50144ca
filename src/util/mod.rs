//! Standalone helpers: colors, dates, validators and file/data-URL handling.

pub mod color;
pub mod file;
pub mod testing;
pub mod time;
pub mod validate;
