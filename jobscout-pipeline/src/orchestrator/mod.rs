//! Run orchestration: phase sequencing, fan-out and result shaping.

mod dedup;
mod pipeline;

pub use pipeline::{Pipeline, RunOutput};
