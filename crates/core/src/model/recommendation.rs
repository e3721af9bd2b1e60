use serde::Serialize;

use crate::model::assessment::Mistake;

/// Follow-up study suggestions for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub category: String,
    pub count: usize,
    pub recommendations: Vec<String>,
}

/// Group mistakes by category in first-seen order.
///
/// Each group starts with a review prompt for the category, followed by the
/// group's distinct explanations in order of first appearance.
#[must_use]
pub fn summarize_mistakes(mistakes: &[Mistake]) -> Vec<Recommendation> {
    let mut groups: Vec<(&str, Vec<&Mistake>)> = Vec::new();
    for mistake in mistakes {
        match groups.iter_mut().find(|(c, _)| *c == mistake.category) {
            Some((_, group)) => group.push(mistake),
            None => groups.push((mistake.category.as_str(), vec![mistake])),
        }
    }

    groups
        .into_iter()
        .map(|(category, group)| {
            let mut recommendations = vec![review_prompt(category)];
            let mut explanations: Vec<&str> = Vec::new();
            for mistake in &group {
                if !explanations.contains(&mistake.explanation.as_str()) {
                    explanations.push(&mistake.explanation);
                }
            }
            recommendations.extend(explanations.into_iter().map(str::to_owned));
            Recommendation {
                category: category.to_owned(),
                count: group.len(),
                recommendations,
            }
        })
        .collect()
}

fn review_prompt(category: &str) -> String {
    format!("Review {category} fundamentals in the Learning Hub")
}

/// Coarse verdict on a final percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceBand {
    Excellent,
    Good,
    OnTrack,
    NeedsReview,
}

impl PerformanceBand {
    #[must_use]
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => PerformanceBand::Excellent,
            70..=89 => PerformanceBand::Good,
            50..=69 => PerformanceBand::OnTrack,
            _ => PerformanceBand::NeedsReview,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            PerformanceBand::Excellent => {
                "Excellent! You have a strong understanding of PMO leadership principles."
            }
            PerformanceBand::Good => "Good job! You have a solid foundation in PMO concepts.",
            PerformanceBand::OnTrack => {
                "You're on the right track, but there's room for improvement."
            }
            PerformanceBand::NeedsReview => {
                "Consider reviewing the learning materials to strengthen your PMO knowledge."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mistake(category: &str, explanation: &str) -> Mistake {
        Mistake {
            category: category.into(),
            question_text: format!("{category}?"),
            correct_option: 0,
            chosen_option: 1,
            explanation: explanation.into(),
        }
    }

    #[test]
    fn empty_mistakes_yield_no_recommendations() {
        assert!(summarize_mistakes(&[]).is_empty());
    }

    #[test]
    fn groups_in_first_seen_order_and_dedups_explanations() {
        let mistakes = vec![
            mistake("Risk Management", "assess impact"),
            mistake("Governance", "define decision rights"),
            mistake("Risk Management", "assess impact"),
            mistake("Risk Management", "engage stakeholders"),
        ];

        let recs = summarize_mistakes(&mistakes);
        assert_eq!(recs.len(), 2);

        assert_eq!(recs[0].category, "Risk Management");
        assert_eq!(recs[0].count, 3);
        assert_eq!(
            recs[0].recommendations,
            vec![
                "Review Risk Management fundamentals in the Learning Hub".to_string(),
                "assess impact".to_string(),
                "engage stakeholders".to_string(),
            ]
        );

        assert_eq!(recs[1].category, "Governance");
        assert_eq!(recs[1].count, 1);
        assert_eq!(recs[1].recommendations.len(), 2);
    }

    #[test]
    fn dedup_is_exact_string_equality() {
        let mistakes = vec![mistake("Governance", "Scope"), mistake("Governance", "scope")];
        let recs = summarize_mistakes(&mistakes);
        assert_eq!(recs[0].recommendations.len(), 3);
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(PerformanceBand::from_percentage(100), PerformanceBand::Excellent);
        assert_eq!(PerformanceBand::from_percentage(90), PerformanceBand::Excellent);
        assert_eq!(PerformanceBand::from_percentage(89), PerformanceBand::Good);
        assert_eq!(PerformanceBand::from_percentage(70), PerformanceBand::Good);
        assert_eq!(PerformanceBand::from_percentage(50), PerformanceBand::OnTrack);
        assert_eq!(PerformanceBand::from_percentage(49), PerformanceBand::NeedsReview);
        assert!(PerformanceBand::from_percentage(0).message().starts_with("Consider"));
    }
}
