use thiserror::Error;

pub type Result<T> = std::result::Result<T, AllocationError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    /// Target percentages do not add up to 1.
    #[error("The percentages must sum to 1 (got {sum})")]
    TargetSum { sum: f64 },

    /// Any other malformed portfolio or simulation input.
    #[error("Invalid input: {0}")]
    Invalid(String),

    /// A per-asset result went missing between two engine steps.
    #[error("Internal consistency error: {0}")]
    Inconsistent(String),
}

impl AllocationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::Inconsistent(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::TargetSum { .. } | Self::Invalid(_))
    }
}
