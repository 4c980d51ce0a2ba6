//! # Proof-of-Existence Test Suite
//!
//! Integration flows that exercise the Document Registry and the Certificate
//! Ledger together, deployed the way the node runtime deploys them.
//!
//! ## Running
//!
//! ```bash
//! cargo test -p poe-tests
//! ```

pub mod integration;
