// crates/ingest-bench-cli/src/lib.rs
// ============================================================================
// Module: Ingest Bench CLI Library
// Description: Driver and backend wiring behind the `ingest-bench` binary.
// Purpose: Keep run orchestration testable without spawning the binary.
// Dependencies: ingest-bench-*
// ============================================================================

//! ## Overview
//! [`driver`] runs stage-by-stage writes and catalog reads over injected
//! adapters. [`wiring`] builds those adapters, the metrics sink, and the
//! event log from a validated configuration.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod driver;
pub mod wiring;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use driver::BackendOutcome;
pub use driver::BenchTargets;
pub use driver::Driver;
pub use driver::DriverError;
pub use driver::READ_REPETITIONS;
pub use driver::ReadOutcome;
pub use driver::RoundReport;
pub use driver::RunReport;
pub use wiring::Bench;
pub use wiring::SampleSource;
pub use wiring::WiringError;
pub use wiring::build_bench;
