//! End-to-end tests for the compiled store and scan engine.
//!
//! Run with: `cargo test --test integration`

mod compile_scan;
mod concurrency;
mod filters;
mod normalize;
