//! Shared test utilities for t1250 integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated runs against a temp database and flag directory
//! - `RecordBuilder` for fixed-width T1250 lines

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
