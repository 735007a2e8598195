//! Score model shared by the survey form, the prompt builder, and the admin views.

pub mod category;
pub mod scores;
pub mod validation;

pub use category::{Category, CATEGORIES, CATEGORY_COUNT};
pub use scores::{rating_label, ScoreSet, MAX_SCORE, MIN_SCORE};
pub use validation::ValidationError;
