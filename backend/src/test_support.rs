//! Test utilities for the studio crate.
//!
//! Shared doubles for unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and with the `test-support` feature.

pub mod generation_controller;
