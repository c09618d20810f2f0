//! Test utilities for cms-content
//!
//! Shared helpers for unit and integration tests:
//! - [`SubSectionBuilder`] and [`element`] for building CMS payloads
//! - [`MockContentApi`], an in-memory [`ContentApi`](crate::api::ContentApi)
//!   with call counters and failure injection
//! - [`init_test_logging`] to see `tracing` output from tests
//!
//! # Example
//!
//! ```rust,no_run
//! use cms_content::test_utils::{MockContentApi, SubSectionBuilder};
//!
//! let api = MockContentApi::new()
//!     .with_item("s1", "i1")
//!     .with_subsection("i1", SubSectionBuilder::new("a").order(1).text("Title", "Hello").build());
//! assert_eq!(api.subsection_calls(), 0);
//! ```

pub mod fixtures;
pub mod mock_api;

pub use fixtures::{SubSectionBuilder, element, sample_theme};
pub use mock_api::MockContentApi;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=cms_content=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
