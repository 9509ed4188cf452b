//! Error types for the frame packer.

/// Result alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, PackerError>;

/// A named invariant violated during normalization. Kept as a separate enum
/// (rather than formatting the rule into the message up front) so callers
/// can match on which invariant failed without parsing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationRule {
    #[error("size_bits must be between 0 and frame_size_bits")]
    SizeWithinFrame,
    #[error("start_frame must be in [0, num_frames)")]
    StartFrameInRange,
    #[error("offset_bits must be non-negative and offset_bits + size_bits <= frame_size_bits")]
    OffsetWithinFrame,
    #[error("period must divide num_frames")]
    PeriodDividesNumFrames,
    #[error("period must be positive")]
    PeriodPositive,
    #[error("size_bits must be positive")]
    SizePositive,
    #[error("group must contain at least one member")]
    GroupNonEmpty,
}

#[derive(Debug, thiserror::Error)]
pub enum PackerError {
    #[error("validation failed for object '{object}': {rule}")]
    Validation {
        object: String,
        rule: ValidationRule,
    },

    #[error("stage 1 (maximize utilization) failed: {reason}")]
    Stage1Infeasible { reason: String },

    #[error("stage 2 (minimize peak end) failed: {reason}")]
    Stage2Infeasible { reason: String },

    #[error("workbook I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("workbook error: {0}")]
    Workbook(String),
}
