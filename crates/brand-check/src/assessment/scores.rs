use serde::{Deserialize, Serialize};

use super::category::{Category, CATEGORIES, CATEGORY_COUNT};
use super::validation::ValidationError;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// Twelve Likert scores, one per category in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<u8>")]
pub struct ScoreSet {
    scores: [u8; CATEGORY_COUNT],
}

impl ScoreSet {
    pub fn new(raw: &[i64]) -> Result<Self, ValidationError> {
        if raw.len() != CATEGORY_COUNT {
            return Err(ValidationError::ScoreCount { found: raw.len() });
        }

        let mut scores = [0u8; CATEGORY_COUNT];
        for ((slot, &value), category) in scores.iter_mut().zip(raw).zip(CATEGORIES) {
            if value < i64::from(MIN_SCORE) || value > i64::from(MAX_SCORE) {
                return Err(ValidationError::ScoreOutOfRange { category, value });
            }
            *slot = value as u8;
        }

        Ok(Self { scores })
    }

    pub fn uniform(score: u8) -> Result<Self, ValidationError> {
        Self::new(&[i64::from(score); CATEGORY_COUNT])
    }

    pub fn get(&self, category: Category) -> u8 {
        self.scores[category as usize]
    }

    pub fn pairs(&self) -> impl Iterator<Item = (Category, u8)> + '_ {
        CATEGORIES.into_iter().zip(self.scores.iter().copied())
    }

    pub fn values(&self) -> &[u8; CATEGORY_COUNT] {
        &self.scores
    }

    pub fn total(&self) -> u32 {
        self.scores.iter().map(|&score| u32::from(score)).sum()
    }

    /// Mean in tenths, rounded half up. Integer math keeps .25/.75 means stable.
    pub fn average_tenths(&self) -> u32 {
        let count = CATEGORY_COUNT as u32;
        (self.total() * 20 + count) / (count * 2)
    }

    /// Mean rounded to one decimal place.
    pub fn average(&self) -> f64 {
        f64::from(self.average_tenths()) / 10.0
    }

    /// One-decimal rendering used in prompts, views, and exports ("2.0").
    pub fn average_display(&self) -> String {
        let tenths = self.average_tenths();
        format!("{}.{}", tenths / 10, tenths % 10)
    }
}

impl TryFrom<Vec<i64>> for ScoreSet {
    type Error = ValidationError;

    fn try_from(value: Vec<i64>) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ScoreSet> for Vec<u8> {
    fn from(value: ScoreSet) -> Self {
        value.scores.to_vec()
    }
}

/// Display band for an average or an individual score.
pub fn rating_label(score: f64) -> &'static str {
    if score >= 4.5 {
        "優秀"
    } else if score >= 4.0 {
        "良好"
    } else if score >= 3.0 {
        "普通"
    } else if score >= 2.0 {
        "要改善"
    } else {
        "要注意"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            ScoreSet::new(&[3; 11]),
            Err(ValidationError::ScoreCount { found: 11 })
        );
        assert_eq!(
            ScoreSet::new(&[3; 13]),
            Err(ValidationError::ScoreCount { found: 13 })
        );
        assert!(matches!(
            ScoreSet::new(&[]),
            Err(ValidationError::ScoreCount { found: 0 })
        ));
    }

    #[test]
    fn rejects_out_of_range_scores() {
        let mut raw = [4i64; 12];
        raw[7] = 6;
        match ScoreSet::new(&raw) {
            Err(ValidationError::ScoreOutOfRange { category, value }) => {
                assert_eq!(category, Category::InnerBranding);
                assert_eq!(value, 6);
            }
            other => panic!("expected range error, got {other:?}"),
        }

        raw[7] = 0;
        assert!(ScoreSet::new(&raw).is_err());
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        let scores = ScoreSet::uniform(2).expect("valid scores");
        assert_eq!(scores.average_display(), "2.0");
        assert!((scores.average() - 2.0).abs() < f64::EPSILON);

        // 39 / 12 = 3.25 rounds half up
        let scores = ScoreSet::new(&[4, 4, 4, 3, 3, 3, 3, 3, 3, 3, 3, 3]).expect("valid");
        assert_eq!(scores.total(), 39);
        assert_eq!(scores.average_display(), "3.3");

        // 41 / 12 = 3.4166...
        let scores = ScoreSet::new(&[5, 5, 4, 4, 3, 3, 3, 3, 3, 3, 3, 2]).expect("valid");
        assert_eq!(scores.average_display(), "3.4");
    }

    #[test]
    fn average_matches_mean_for_every_total() {
        for total in 12u32..=60 {
            let mut raw = [1i64; 12];
            let mut remaining = total - 12;
            for slot in raw.iter_mut() {
                let add = remaining.min(4);
                *slot += i64::from(add);
                remaining -= add;
            }
            let scores = ScoreSet::new(&raw).expect("valid scores");
            let expected = (f64::from(total) / 12.0 * 10.0 + 1e-9).round() / 10.0;
            assert!(
                (scores.average() - expected).abs() < 1e-9,
                "total {total}: {} vs {expected}",
                scores.average()
            );
        }
    }

    #[test]
    fn pairs_follow_category_order() {
        let scores = ScoreSet::new(&[1, 2, 3, 4, 5, 1, 2, 3, 4, 5, 1, 2]).expect("valid");
        let pairs: Vec<_> = scores.pairs().collect();
        assert_eq!(pairs[0], (Category::MarketUnderstanding, 1));
        assert_eq!(pairs[4], (Category::Uniqueness, 5));
        assert_eq!(scores.get(Category::GrowthIntent), 2);
    }

    #[test]
    fn deserializes_through_validation() {
        let parsed: Result<ScoreSet, _> = serde_json::from_str("[1,2,3]");
        assert!(parsed.is_err());

        let parsed: ScoreSet =
            serde_json::from_str("[5,5,5,5,5,5,5,5,5,5,5,5]").expect("valid scores");
        assert_eq!(parsed.average_display(), "5.0");
        assert_eq!(
            serde_json::to_string(&parsed).expect("serializes"),
            "[5,5,5,5,5,5,5,5,5,5,5,5]"
        );
    }

    #[test]
    fn rating_labels_follow_bands() {
        assert_eq!(rating_label(4.6), "優秀");
        assert_eq!(rating_label(4.0), "良好");
        assert_eq!(rating_label(3.2), "普通");
        assert_eq!(rating_label(2.0), "要改善");
        assert_eq!(rating_label(1.5), "要注意");
    }
}
