use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;

use crate::model::question::{Question, QuestionBank};
use crate::model::recommendation::{Recommendation, summarize_mistakes};

/// Explanation recorded for a mistake when the question has none.
pub const FALLBACK_EXPLANATION: &str = "Review this topic in the learning materials.";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssessmentError {
    /// The learner pressed check without choosing an option. Recoverable.
    #[error("Please select an answer before proceeding.")]
    NoOptionSelected,

    #[error("the answer to the current question is already locked in")]
    AnswerLocked,

    #[error("option {option} is out of range for {len} options")]
    OptionOutOfRange { option: usize, len: usize },

    #[error("assessment already completed")]
    Completed,

    #[error("question bank is empty")]
    EmptyBank,

    #[error("run was started on a bank of {expected} questions, got {actual}")]
    BankMismatch { expected: usize, actual: usize },
}

impl AssessmentError {
    /// True for errors the learner can fix by retrying the same action.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AssessmentError::NoOptionSelected)
    }
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// An incorrectly answered question, kept for end-of-run remediation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mistake {
    pub category: String,
    pub question_text: String,
    pub correct_option: usize,
    pub chosen_option: usize,
    pub explanation: String,
}

impl Mistake {
    fn record(question: &Question, chosen_option: usize) -> Self {
        let explanation = if question.explanation().is_empty() {
            FALLBACK_EXPLANATION.to_owned()
        } else {
            question.explanation().to_owned()
        };
        Self {
            category: question.category().to_owned(),
            question_text: question.prompt().to_owned(),
            correct_option: question.correct_option(),
            chosen_option,
            explanation,
        }
    }
}

/// Feedback produced by the check phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub is_correct: bool,
    pub chosen_option: usize,
    pub correct_option: usize,
    pub explanation: String,
    pub guidance: String,
}

/// What a call to [`AssessmentRun::advance`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The selected answer was locked in and scored.
    Checked(CheckOutcome),
    /// Moved on to the question at `position`.
    Moved { position: usize },
    /// Proceeded past the last question.
    Finished,
}

/// What the single primary button does in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    CheckAnswer,
    NextQuestion,
    ShowResults,
}

impl PrimaryAction {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PrimaryAction::CheckAnswer => "Check Answer",
            PrimaryAction::NextQuestion => "Next Question",
            PrimaryAction::ShowResults => "Show Results",
        }
    }
}

//
// ─── RUN ───────────────────────────────────────────────────────────────────────
//

/// One traversal of a shuffled question bank.
///
/// Each question is answered exactly once: the first [`advance`](Self::advance)
/// on a question checks the selection, the second moves on. The bank is passed
/// to every call and must be the one the run was started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentRun {
    order: Vec<usize>,
    position: usize,
    selected_option: Option<usize>,
    is_answered: bool,
    score: u32,
    mistakes: Vec<Mistake>,
    is_complete: bool,
}

impl AssessmentRun {
    /// Start a run over a uniformly shuffled order of the whole bank.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::EmptyBank` if the bank has no questions.
    pub fn start<R: Rng + ?Sized>(bank: &QuestionBank, rng: &mut R) -> Result<Self, AssessmentError> {
        if bank.is_empty() {
            return Err(AssessmentError::EmptyBank);
        }
        let mut order: Vec<usize> = (0..bank.len()).collect();
        order.shuffle(rng);
        Ok(Self::with_order(order))
    }

    /// Start a run with a fixed question order.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::EmptyBank` for an empty bank and
    /// `AssessmentError::BankMismatch` if `order` is not a permutation of the
    /// bank's indices.
    pub fn start_in_order(bank: &QuestionBank, order: Vec<usize>) -> Result<Self, AssessmentError> {
        if bank.is_empty() {
            return Err(AssessmentError::EmptyBank);
        }
        let mut seen = vec![false; bank.len()];
        let is_permutation = order.len() == bank.len()
            && order
                .iter()
                .all(|&i| i < seen.len() && !std::mem::replace(&mut seen[i], true));
        if !is_permutation {
            return Err(AssessmentError::BankMismatch {
                expected: bank.len(),
                actual: order.len(),
            });
        }
        Ok(Self::with_order(order))
    }

    fn with_order(order: Vec<usize>) -> Self {
        Self {
            order,
            position: 0,
            selected_option: None,
            is_answered: false,
            score: 0,
            mistakes: Vec::new(),
            is_complete: false,
        }
    }

    /// Tentatively choose an option for the current question.
    ///
    /// # Errors
    ///
    /// Returns `Completed`, `AnswerLocked` or `OptionOutOfRange`; none of
    /// them change the run.
    pub fn select_option(
        &mut self,
        bank: &QuestionBank,
        option: usize,
    ) -> Result<(), AssessmentError> {
        if self.is_complete {
            return Err(AssessmentError::Completed);
        }
        if self.is_answered {
            return Err(AssessmentError::AnswerLocked);
        }
        let question = self.current_in(bank)?;
        if option >= question.option_count() {
            return Err(AssessmentError::OptionOutOfRange {
                option,
                len: question.option_count(),
            });
        }
        self.selected_option = Some(option);
        Ok(())
    }

    /// Check the current answer, or move on if it is already checked.
    ///
    /// # Errors
    ///
    /// Returns `NoOptionSelected` when checking without a selection and
    /// `Completed` once the run has finished. The run is unchanged on error.
    pub fn advance(&mut self, bank: &QuestionBank) -> Result<Step, AssessmentError> {
        if self.is_complete {
            return Err(AssessmentError::Completed);
        }
        if self.is_answered {
            return Ok(self.proceed());
        }

        let question = self.current_in(bank)?;
        let chosen = self
            .selected_option
            .ok_or(AssessmentError::NoOptionSelected)?;
        let is_correct = question.is_correct(chosen);
        let outcome = CheckOutcome {
            is_correct,
            chosen_option: chosen,
            correct_option: question.correct_option(),
            explanation: question.explanation().to_owned(),
            guidance: question.guidance().to_owned(),
        };

        if is_correct {
            self.score += 1;
        } else {
            self.mistakes.push(Mistake::record(question, chosen));
        }
        self.is_answered = true;
        Ok(Step::Checked(outcome))
    }

    fn proceed(&mut self) -> Step {
        if self.is_last() {
            self.is_complete = true;
            return Step::Finished;
        }
        self.position += 1;
        self.selected_option = None;
        self.is_answered = false;
        Step::Moved {
            position: self.position,
        }
    }

    /// The question at the current position.
    ///
    /// # Errors
    ///
    /// Returns `BankMismatch` if `bank` is not the bank this run was started on.
    pub fn current_question<'a>(
        &self,
        bank: &'a QuestionBank,
    ) -> Result<&'a Question, AssessmentError> {
        self.current_in(bank)
    }

    fn current_in<'a>(&self, bank: &'a QuestionBank) -> Result<&'a Question, AssessmentError> {
        let mismatch = || AssessmentError::BankMismatch {
            expected: self.order.len(),
            actual: bank.len(),
        };
        if bank.len() != self.order.len() {
            return Err(mismatch());
        }
        self.order
            .get(self.position)
            .and_then(|&index| bank.get(index))
            .ok_or_else(mismatch)
    }

    /// Group mistakes by category into study recommendations.
    #[must_use]
    pub fn summarize_mistakes(&self) -> Vec<Recommendation> {
        summarize_mistakes(&self.mistakes)
    }

    /// Final percentage: `round(100 * score / total)`.
    #[must_use]
    pub fn score_percentage(&self) -> u32 {
        rounded_percentage(self.score as usize, self.order.len())
    }

    /// Percentage over the questions answered so far; 0 before the first answer.
    #[must_use]
    pub fn running_percentage(&self) -> u32 {
        rounded_percentage(self.score as usize, self.answered_count())
    }

    #[must_use]
    pub fn primary_action(&self) -> PrimaryAction {
        if !self.is_answered {
            PrimaryAction::CheckAnswer
        } else if self.is_last() {
            PrimaryAction::ShowResults
        } else {
            PrimaryAction::NextQuestion
        }
    }

    fn is_last(&self) -> bool {
        self.position + 1 >= self.order.len()
    }

    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<usize> {
        self.selected_option
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.is_answered
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn mistakes(&self) -> &[Mistake] {
        &self.mistakes
    }

    /// Number of questions whose answer has been checked.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.score as usize + self.mistakes.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }
}

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
#[must_use]
pub fn rounded_percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = part as u64;
    let whole = whole as u64;
    u32::try_from((200 * part + whole) / (2 * whole)).unwrap_or(u32::MAX)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
