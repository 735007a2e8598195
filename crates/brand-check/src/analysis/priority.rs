//! Priority markers for improvement recommendations.
//!
//! Each recommendation is tied to the first category label it mentions (table
//! order) and weighted by that category's score. Text naming no category gets the
//! mid-range default, so the result is an approximation rather than a classifier.

use super::report::AnalysisReport;
use crate::assessment::{Category, ScoreSet};

pub const MARKER: char = '★';

/// Score assumed for a recommendation that names no category.
pub const DEFAULT_SCORE: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Priority {
    pub const fn from_score(score: u8) -> Self {
        if score <= 2 {
            Self::High
        } else if score <= 3 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    const fn from_marker_count(count: usize) -> Self {
        match count {
            0 | 1 => Self::Low,
            2 => Self::Medium,
            _ => Self::High,
        }
    }

    pub const fn weight(self) -> u8 {
        self as u8
    }

    pub fn marker(self) -> String {
        std::iter::repeat(MARKER)
            .take(usize::from(self.weight()))
            .collect()
    }
}

/// Priority of a recommendation that already starts with ★ markers.
pub fn existing_priority(text: &str) -> Option<Priority> {
    let count = text
        .trim_start()
        .chars()
        .take_while(|&ch| ch == MARKER)
        .count();
    (count > 0).then(|| Priority::from_marker_count(count))
}

/// Priority derived from the first category named in `text`.
pub fn classify(text: &str, scores: &ScoreSet) -> Priority {
    let score = Category::first_mentioned_in(text)
        .map(|category| scores.get(category))
        .unwrap_or(DEFAULT_SCORE);
    Priority::from_score(score)
}

/// Prefix unmarked recommendations with their marker, then stable-sort by weight.
///
/// Entries that already carry a marker keep it, so re-running on annotated output
/// only reorders.
pub fn annotate(recommendations: Vec<String>, scores: &ScoreSet) -> Vec<String> {
    let mut weighted: Vec<(Priority, String)> = recommendations
        .into_iter()
        .map(|text| match existing_priority(&text) {
            Some(priority) => (priority, text),
            None => {
                let priority = classify(&text, scores);
                (priority, format!("{} {}", priority.marker(), text))
            }
        })
        .collect();

    weighted.sort_by(|left, right| right.0.cmp(&left.0));
    weighted.into_iter().map(|(_, text)| text).collect()
}

/// Annotate the improvement list of a prioritized report; legacy reports pass through.
pub fn annotate_report(report: AnalysisReport, scores: &ScoreSet) -> AnalysisReport {
    match report {
        AnalysisReport::Prioritized(mut inner) => {
            inner.improvements = annotate(std::mem::take(&mut inner.improvements), scores);
            AnalysisReport::Prioritized(inner)
        }
        legacy @ AnalysisReport::Legacy(_) => legacy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> ScoreSet {
        // 市場理解=2, 競合分析=3, 自社分析=5, rest 4
        ScoreSet::new(&[2, 3, 5, 4, 4, 4, 4, 4, 4, 4, 4, 4]).expect("valid scores")
    }

    #[test]
    fn weights_follow_score_thresholds() {
        assert_eq!(Priority::from_score(1), Priority::High);
        assert_eq!(Priority::from_score(2), Priority::High);
        assert_eq!(Priority::from_score(3), Priority::Medium);
        assert_eq!(Priority::from_score(4), Priority::Low);
        assert_eq!(Priority::from_score(5), Priority::Low);
        assert_eq!(Priority::High.marker(), "★★★");
        assert_eq!(Priority::Low.marker(), "★");
    }

    #[test]
    fn marks_by_referenced_category() {
        let scores = scores();
        assert_eq!(classify("市場理解を深めましょう", &scores), Priority::High);
        assert_eq!(classify("競合分析を定期化しましょう", &scores), Priority::Medium);
        assert_eq!(classify("自社分析の結果を共有しましょう", &scores), Priority::Low);
        assert_eq!(classify("採用サイトを刷新しましょう", &scores), Priority::Medium);
    }

    #[test]
    fn annotate_prefixes_and_sorts_descending() {
        let input = vec![
            "自社分析の結果を共有しましょう".to_string(),
            "採用サイトを刷新しましょう".to_string(),
            "市場理解を深めましょう".to_string(),
            "競合分析を定期化しましょう".to_string(),
        ];

        let output = annotate(input, &scores());

        assert_eq!(
            output,
            vec![
                "★★★ 市場理解を深めましょう".to_string(),
                "★★ 採用サイトを刷新しましょう".to_string(),
                "★★ 競合分析を定期化しましょう".to_string(),
                "★ 自社分析の結果を共有しましょう".to_string(),
            ]
        );
    }

    #[test]
    fn output_never_places_lower_weight_first() {
        let input: Vec<String> = [
            "成果の可視化",
            "知財保護の検討",
            "市場理解の再定義",
            "その他の施策",
            "競合分析の更新",
        ]
        .iter()
        .map(|text| text.to_string())
        .collect();

        let output = annotate(input, &scores());
        let weights: Vec<_> = output
            .iter()
            .map(|text| existing_priority(text).expect("annotated"))
            .collect();
        assert!(weights.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn annotation_is_idempotent() {
        let input = vec![
            "自社分析の結果を共有しましょう".to_string(),
            "市場理解を深めましょう".to_string(),
        ];
        let once = annotate(input, &scores());
        let twice = annotate(once.clone(), &scores());
        assert_eq!(once, twice);
    }

    #[test]
    fn existing_markers_are_kept_and_only_resorted() {
        let input = vec![
            "★ 自社分析の結果を共有しましょう".to_string(),
            "★★★ 市場理解を深めましょう".to_string(),
            "★★★★ KPI管理を導入しましょう".to_string(),
        ];
        let output = annotate(input, &scores());
        assert_eq!(output[0], "★★★ 市場理解を深めましょう");
        assert_eq!(output[1], "★★★★ KPI管理を導入しましょう");
        assert_eq!(output[2], "★ 自社分析の結果を共有しましょう");
    }

    #[test]
    fn legacy_reports_pass_through() {
        let report = AnalysisReport::Legacy(Default::default());
        assert_eq!(annotate_report(report.clone(), &scores()), report);
    }
}
