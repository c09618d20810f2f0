//! Unit test suite for cms-content
//!
//! Fast tests of the public API against in-memory data. Nothing here opens a
//! socket; the content API is [`MockContentApi`](cms_content::test_utils::MockContentApi).
//!
//! # Running Unit Tests
//!
//! ```bash
//! cargo test --test unit
//! ```
//!
//! # Test Organization
//!
//! - **content_properties**: resolution, mapping and aggregation properties
//! - **loader_cache**: cached loading, language keys, deduplication, observers
//! - **theme_render**: theme records rendered onto a document root

mod content_properties;
mod loader_cache;
