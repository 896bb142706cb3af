//! Shared test helpers for `costledger-core` integration tests.
//!
//! These helpers provide an in-memory ledger implementing every repository
//! port plus fixtures, so scenario tests can focus on behaviour instead of
//! boilerplate.

#![allow(dead_code)]

pub mod fixtures;
pub mod repositories;
