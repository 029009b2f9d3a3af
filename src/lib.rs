//! voltimer: volatility-timing backtester.
//!
//! Compares a strategy that holds a single instrument only on low-volatility
//! days against buy and hold. Hexagonal architecture: domain logic in
//! [`domain`], port traits in [`ports`], concrete implementations in
//! [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
