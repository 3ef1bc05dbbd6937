//! Scenario benchmarks.
//!
//! These model what one frame of the running program costs: advancing the
//! engine with notes held, and drawing a snapshot in each visual mode.

mod engine;
mod styles;

pub use engine::bench_engine;
pub use styles::bench_styles;
