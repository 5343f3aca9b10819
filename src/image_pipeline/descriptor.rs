//! Layout descriptor module
//!
//! This module turns the textual descriptor embedded in the first page of the
//! source container into a table of channel names and page assignments.

mod error;
mod lexer;
mod parser;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::DescriptorError;
pub use parser::parse_descriptor;
pub use types::{ChannelLevelEntry, PageTable};
