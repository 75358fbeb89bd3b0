//! Integration test entry point

mod common;
mod fetch_tests;
mod sync_tests;
