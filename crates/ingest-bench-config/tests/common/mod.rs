// crates/ingest-bench-config/tests/common/mod.rs
// ============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config and catalog validation tests.
// Purpose: Reduce duplication across ingest-bench-config integration tests.
// ============================================================================

#![allow(
    dead_code,
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only helpers shared across test binaries."
)]

use std::path::PathBuf;

use ingest_bench_config::BenchConfig;
use ingest_bench_config::ConfigError;

/// Result type for tests that report failures as messages.
pub type TestResult = Result<(), String>;

/// Minimal valid config: one `SQLite` relational backend.
pub const MINIMAL_TOML: &str = r#"
[relational_store]
engine = "sqlite"
url = ":memory:"
"#;

/// Parses TOML into a config without validating it.
pub fn config_from_toml(toml_str: &str) -> Result<BenchConfig, ConfigError> {
    BenchConfig::from_toml(toml_str)
}

/// Returns the minimal config.
pub fn minimal_config() -> BenchConfig {
    config_from_toml(MINIMAL_TOML).expect("minimal config parses")
}

/// Asserts that a validation result is an error containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

/// Path of the catalog shipped at the repository root.
pub fn shipped_catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../catalog/queries.toml")
}

/// Path of the example config shipped at the repository root.
pub fn shipped_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../ingest-bench.toml")
}
