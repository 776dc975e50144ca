//! Shared test setup: one global tracing subscriber for all tests in a binary.

use std::env;
use std::sync::Once;

use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    // the arena logs every insert at trace level
    let noisy_modules = ["rsutil::domain::arena"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_test_writer()
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Flat department list used across tree and grouping tests.
///
/// Two roots (`1` with children `2`, `3`; `5`), `4` under `2`.
pub fn sample_records() -> Vec<Value> {
    vec![
        json!({"id": 1, "parentId": null, "name": "Engineering", "site": "Berlin"}),
        json!({"id": 2, "parentId": 1, "name": "Platform", "site": "Berlin"}),
        json!({"id": 3, "parentId": 1, "name": "Apps", "site": "Zurich"}),
        json!({"id": 4, "parentId": 2, "name": "Storage", "site": "Zurich"}),
        json!({"id": 5, "parentId": null, "name": "Sales"}),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_repeated_calls_when_initializing_then_sets_up_once() {
        init_test_setup();
        init_test_setup();
        assert_eq!(sample_records().len(), 5);
    }
}
