use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use trainer_core::model::{AssessmentRun, Question, QuestionBank, Step};

use super::progress::{AssessmentProgress, AssessmentSummary};
use crate::error::AssessmentServiceError;

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Drives one assessment run over a shared question bank.
///
/// Owns the run and the RNG used to shuffle it; restarting draws a fresh
/// order from the same RNG.
pub struct AssessmentService {
    bank: Arc<QuestionBank>,
    run: AssessmentRun,
    rng: StdRng,
}

impl AssessmentService {
    /// Start a run seeded from the thread RNG.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentServiceError::Assessment` if the bank is empty.
    pub fn new(bank: Arc<QuestionBank>) -> Result<Self, AssessmentServiceError> {
        Self::with_rng(bank, StdRng::from_rng(&mut rand::rng()))
    }

    /// Start a run with a deterministic RNG seed.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentServiceError::Assessment` if the bank is empty.
    pub fn with_seed(bank: Arc<QuestionBank>, seed: u64) -> Result<Self, AssessmentServiceError> {
        Self::with_rng(bank, StdRng::seed_from_u64(seed))
    }

    /// Start a run shuffled by `rng`.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentServiceError::Assessment` if the bank is empty.
    pub fn with_rng(
        bank: Arc<QuestionBank>,
        mut rng: StdRng,
    ) -> Result<Self, AssessmentServiceError> {
        let run = AssessmentRun::start(&bank, &mut rng)?;
        tracing::info!(questions = run.total(), "assessment started");
        Ok(Self { bank, run, rng })
    }

    /// Drop the current run and start a freshly shuffled one.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentServiceError::Assessment` if the bank is empty.
    pub fn restart(&mut self) -> Result<(), AssessmentServiceError> {
        let previous_score = self.run.score();
        self.run = AssessmentRun::start(&self.bank, &mut self.rng)?;
        tracing::info!(previous_score, "assessment restarted");
        Ok(())
    }

    /// Tentatively choose an option for the current question.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentServiceError::Assessment` when the answer is locked,
    /// the run is complete or the option does not exist.
    pub fn select_option(&mut self, option: usize) -> Result<(), AssessmentServiceError> {
        self.run.select_option(&self.bank, option)?;
        Ok(())
    }

    /// Press the primary button: check the answer or move on.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentServiceError::Assessment` when nothing is selected
    /// or the run is already complete.
    pub fn advance(&mut self) -> Result<Step, AssessmentServiceError> {
        let step = self.run.advance(&self.bank)?;
        match &step {
            Step::Checked(outcome) => tracing::debug!(
                position = self.run.position(),
                correct = outcome.is_correct,
                "answer checked"
            ),
            Step::Moved { position } => tracing::debug!(position, "next question"),
            Step::Finished => tracing::info!(
                score = self.run.score(),
                total = self.run.total(),
                percentage = self.run.score_percentage(),
                "assessment completed"
            ),
        }
        Ok(step)
    }

    /// The question on screen.
    ///
    /// # Errors
    ///
    /// Only fails if the run and bank disagree, which the service never allows.
    pub fn current_question(&self) -> Result<&Question, AssessmentServiceError> {
        Ok(self.run.current_question(&self.bank)?)
    }

    #[must_use]
    pub fn progress(&self) -> AssessmentProgress {
        AssessmentProgress::of(&self.run)
    }

    /// Final results, once the run is complete.
    #[must_use]
    pub fn summary(&self) -> Option<AssessmentSummary> {
        AssessmentSummary::of(&self.run)
    }

    #[must_use]
    pub fn run(&self) -> &AssessmentRun {
        &self.run
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trainer_core::model::{AssessmentError, PrimaryAction, QuestionDraft};

    fn draft(category: &str, correct: usize) -> QuestionDraft {
        QuestionDraft {
            category: category.into(),
            prompt: format!("{category} question"),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_option: correct,
            explanation: format!("{category} explanation"),
            ..QuestionDraft::default()
        }
    }

    fn bank() -> Arc<QuestionBank> {
        Arc::new(
            QuestionBank::from_drafts(vec![
                draft("Governance", 0),
                draft("Risk Management", 1),
                draft("Governance", 2),
            ])
            .unwrap(),
        )
    }

    fn answer_current(service: &mut AssessmentService, correctly: bool) {
        let question = service.current_question().unwrap();
        let correct = question.correct_option();
        let option = if correctly { correct } else { (correct + 1) % 3 };
        service.select_option(option).unwrap();
        assert!(matches!(service.advance().unwrap(), Step::Checked(_)));
        service.advance().unwrap();
    }

    #[test]
    fn progress_tracks_primary_action() {
        let mut service = AssessmentService::with_seed(bank(), 7).unwrap();
        let progress = service.progress();
        assert_eq!(progress.question_number, 1);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.progress_percent, 33);
        assert_eq!(progress.running_percent, 0);
        assert_eq!(progress.primary_action, PrimaryAction::CheckAnswer);

        let correct = service.current_question().unwrap().correct_option();
        service.select_option(correct).unwrap();
        service.advance().unwrap();
        let progress = service.progress();
        assert_eq!(progress.primary_action, PrimaryAction::NextQuestion);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.running_percent, 100);

        service.advance().unwrap();
        assert_eq!(service.progress().question_number, 2);
        assert_eq!(service.progress().progress_percent, 67);
    }

    #[test]
    fn missing_selection_is_recoverable() {
        let mut service = AssessmentService::with_seed(bank(), 1).unwrap();
        let err = service.advance().unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Please select an answer before proceeding."
        );
        assert_eq!(service.progress().answered, 0);
    }

    #[test]
    fn summary_is_available_only_when_complete() {
        let mut service = AssessmentService::with_seed(bank(), 3).unwrap();
        answer_current(&mut service, true);
        assert!(service.summary().is_none());
        answer_current(&mut service, false);
        answer_current(&mut service, true);

        let summary = service.summary().unwrap();
        assert_eq!(summary.score, 2);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.percentage, 67);
        assert_eq!(summary.mistakes.len(), 1);
        assert_eq!(summary.recommendations.len(), 1);
        assert_eq!(summary.recommendations[0].count, 1);

        let err = service.advance().unwrap_err();
        assert!(matches!(
            err,
            AssessmentServiceError::Assessment(AssessmentError::Completed)
        ));
    }

    #[test]
    fn restart_resets_the_run() {
        let mut service = AssessmentService::with_seed(bank(), 11).unwrap();
        answer_current(&mut service, true);
        answer_current(&mut service, true);
        answer_current(&mut service, false);
        assert!(service.run().is_complete());

        service.restart().unwrap();
        let run = service.run();
        assert_eq!(run.score(), 0);
        assert!(run.mistakes().is_empty());
        assert!(!run.is_complete());
        assert_eq!(run.position(), 0);

        let mut order = run.order().to_vec();
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2]);
    }
}
