//! Pyramid indexing module
//!
//! This module validates the parsed page table and orders it into the plan
//! that drives both metadata synthesis and page writing.

mod plan;

#[cfg(test)]
mod tests;

pub use plan::{ChannelPyramid, PlanPosition, PyramidPlan};
