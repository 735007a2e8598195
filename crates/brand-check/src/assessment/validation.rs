use super::category::Category;

/// Input rejected before any store, notification, or model call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("12 category scores are required, received {found}")]
    ScoreCount { found: usize },
    #[error("score for {} must be between 1 and 5, received {value}", .category.label())]
    ScoreOutOfRange { category: Category, value: i64 },
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("the privacy policy must be accepted before submitting")]
    PrivacyNotAccepted,
}
