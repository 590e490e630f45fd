//! Tests for the executor
//!
//! Organized by feature area

mod assign_tests;
mod helpers;
mod if_tests;
mod session_tests;
