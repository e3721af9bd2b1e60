use trainer_core::model::{
    AssessmentRun, Mistake, PerformanceBand, PrimaryAction, Recommendation, rounded_percentage,
};

/// Aggregated view of run progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentProgress {
    /// 1-based number of the question on screen.
    pub question_number: usize,
    pub total: usize,
    /// Share of the run reached, counting the current question.
    pub progress_percent: u32,
    pub answered: usize,
    pub score: u32,
    pub running_percent: u32,
    pub primary_action: PrimaryAction,
    pub is_complete: bool,
}

impl AssessmentProgress {
    #[must_use]
    pub fn of(run: &AssessmentRun) -> Self {
        let question_number = run.position() + 1;
        Self {
            question_number,
            total: run.total(),
            progress_percent: rounded_percentage(question_number, run.total()),
            answered: run.answered_count(),
            score: run.score(),
            running_percent: run.running_percentage(),
            primary_action: run.primary_action(),
            is_complete: run.is_complete(),
        }
    }
}

/// End-of-run results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentSummary {
    pub score: u32,
    pub total: usize,
    pub percentage: u32,
    pub band: PerformanceBand,
    pub mistakes: Vec<Mistake>,
    pub recommendations: Vec<Recommendation>,
}

impl AssessmentSummary {
    /// Summarize a run. Returns `None` until the run is complete.
    #[must_use]
    pub fn of(run: &AssessmentRun) -> Option<Self> {
        if !run.is_complete() {
            return None;
        }
        let percentage = run.score_percentage();
        Some(Self {
            score: run.score(),
            total: run.total(),
            percentage,
            band: PerformanceBand::from_percentage(percentage),
            mistakes: run.mistakes().to_vec(),
            recommendations: run.summarize_mistakes(),
        })
    }
}
