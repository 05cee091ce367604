//! PathStore integration tests
//!
//! Tests are organized by operation, with the end-to-end scenarios kept
//! together in `scenarios`.

mod read_operations;
mod reentrancy;
