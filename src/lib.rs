//! # Bridger
//!
//! Keeps a fixed amount of ETH moving between Arbitrum and Base through one-way bridge contracts.

pub mod balance;
pub mod chain;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod transactions;
pub mod wallet;
