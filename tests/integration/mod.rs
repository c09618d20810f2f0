//! Integration test suite for cms-content
//!
//! End-to-end tests that talk HTTP to an in-process server and run the
//! `cms-content` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **http_api**: `HttpContentApi` request shapes, envelopes and error mapping
//! - **loader_http**: section loading through the cache against a live server
//! - **cli**: the command-line interface

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod http_api;
