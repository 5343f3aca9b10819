use thiserror::Error;

/// Grammar violations in the embedded layout descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("missing {0} segment")]
    MissingSegment(&'static str),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("line {line}: {field} is not a non-negative integer: {value:?}")]
    InvalidInteger {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: channel index {index} out of range ({declared} channels declared)")]
    ChannelOutOfRange {
        line: usize,
        index: usize,
        declared: usize,
    },
}
