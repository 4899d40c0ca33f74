//! Shared test utilities for reportify integration tests.
//!
//! - `TestHarness`: a file-backed database in a temp directory
//! - Builders for student profiles, reports and evaluations

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
