//! cms-content - multilingual content resolution for a CMS-backed website
//!
//! A CMS stores page content as sections, section items and subsections. Each
//! subsection carries named content elements with a default value and
//! per-language translations. This crate turns that raw data into ordered,
//! language-resolved view models that page code can render directly, caches
//! the results per language, and converts theme records into CSS variables.
//!
//! # Architecture Overview
//!
//! ```text
//!   ContentApi (HTTP)                                   ThemeRecord
//!         │                                                  │
//!         ▼                                                  ▼
//!   SectionContentLoader ──▶ QueryCache ──▶ aggregate   apply_theme ──▶ StyleTarget
//!                           (stale-while-   ├ map_fields
//!                            revalidate)    └ resolve
//! ```
//!
//! - The resolver, mapper and aggregator are pure and synchronous; the
//!   language is always passed explicitly.
//! - The only suspension points are API fetches, which go through the query
//!   cache: concurrent callers share one in-flight request, results stay fresh
//!   for a stale window, and a slow request never overwrites newer data.
//!
//! # Core Modules
//!
//! ## Content pipeline
//! - [`models`] - wire data model of the content API
//! - [`content`] - translation resolution, field mapping, aggregation, language selection
//! - [`theme`] - theme variable injection and color shades
//!
//! ## Data access
//! - [`api`] - the content API trait and its HTTP client
//! - [`cache`] - keyed query cache with de-duplication and garbage collection
//! - [`loader`] - cached section loading built on the API and the cache
//!
//! ## Supporting modules
//! - [`cli`] - command-line interface
//! - [`config`] - client configuration file
//! - [`core`] - error types and user-facing error formatting
//! - [`constants`] - timing defaults and fallback values
//!
//! # Example
//!
//! ```rust
//! use cms_content::content::{aggregate, FieldMapping};
//! use cms_content::models::{ContentElement, SubSection};
//!
//! let subsections = vec![SubSection::new(
//!     "s1",
//!     1,
//!     vec![ContentElement::text("Title", "Hello").with_translation("ar", "مرحبا")],
//! )];
//! let mapping = FieldMapping::new().field("title", "Title");
//!
//! let items = aggregate(&subsections, &mapping, 1, None, "ar");
//! assert_eq!(items[0].text("title"), "مرحبا");
//! ```

// Content pipeline
pub mod content;
pub mod models;
pub mod theme;

// Data access
pub mod api;
pub mod cache;
pub mod loader;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
