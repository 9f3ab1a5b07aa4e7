//! `vansah_binding` reports test runs, step logs, and screenshot evidence
//! from automated tests to Vansah Test Management.
//!
//! ```no_run
//! use vansah_binding::{config, VansahClient};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = VansahClient::new(config::from_env()?)?;
//! let mut session = client.add_test_run_from_jira_issue("TF-C72")?;
//! client.add_test_log(&mut session, "PASSED", "Homepage title is correct", 1, None)?;
//! # Ok(())
//! # }
//! ```

/// Client configuration holder, config file loading, and environment overrides.
pub mod config;
/// Logging helpers used throughout the crate.
pub mod logging;
/// Per-client reporting counters.
pub mod metrics;
/// JSON request bodies for runs and step logs.
pub mod payload;
/// Identifiers of an in-progress run.
pub mod session;
/// Result labels and their numeric API codes.
pub mod status;
/// Vansah REST client.
pub mod vansah;

pub use config::ClientConfig;
pub use session::RunSession;
pub use status::{result_to_id, ResultStatus};
pub use vansah::{VansahClient, VansahError};
