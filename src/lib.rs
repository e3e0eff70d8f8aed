//! Tactician engine library.
//!
//! Exposes the board representation, move generation, evaluation, search,
//! playback and protocol modules for use by integration tests, benchmarks
//! and the binary entry point.

pub mod board;
pub mod config;
pub mod engine;
pub mod eval;
pub mod movegen;
pub mod playback;
pub mod protocol;
pub mod search;

#[cfg(test)]
mod testkit;
