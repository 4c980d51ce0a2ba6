//! # Integration Tests
//!
//! Cross-component flows over a `LedgerContainer` driven by a manual clock.

pub mod flows;
