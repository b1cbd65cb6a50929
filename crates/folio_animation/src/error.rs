//! Animation error types

use thiserror::Error;

/// Errors raised while building or attaching animations.
///
/// Only construction-time misconfiguration is reported. Runtime conditions
/// such as a removed target or a torn-down scope degrade to no-ops.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// `require_match` was set and the query matched nothing
    #[error("no targets matched `{0}`")]
    InvalidTarget(String),

    /// A scroll binding's end resolves before its start
    #[error("scroll range ends before it starts (start {start}px, end {end}px)")]
    InvalidTimeRange { start: f32, end: f32 },

    /// Operation attempted on a scope after `revert()`
    #[error("scope has already been reverted")]
    AlreadyReverted,

    /// Duration is negative or not finite
    #[error("invalid duration: {0}")]
    InvalidDuration(f64),

    /// Delay is negative or not finite
    #[error("invalid delay: {0}")]
    InvalidDelay(f64),

    /// Easing name not recognized
    #[error("unknown easing `{0}`")]
    UnknownEasing(String),

    /// Scroll condition string could not be parsed
    #[error("invalid scroll condition `{0}`")]
    InvalidCondition(String),

    /// Timeline position string could not be parsed
    #[error("invalid timeline position `{0}`")]
    InvalidPosition(String),

    /// Property endpoint could not be parsed
    #[error("invalid value `{value}` for property `{property}`")]
    InvalidProperty { property: String, value: String },

    /// Repeat count is negative (other than -1) or not a keyword
    #[error("invalid repeat `{0}`")]
    InvalidRepeat(String),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
