//! Integration tests for Rental-Harvest
//!
//! These tests use wiremock to stand up a mock marketplace and drive the real
//! HTTP client, orchestrators, and SQLite storage end-to-end.

mod client_tests;
mod common;
mod search_tests;
