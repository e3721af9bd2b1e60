use std::sync::Arc;

use services::{AppServices, AssessmentService, Clock};
use storage::repository::Storage;
use trainer_core::model::{
    PerformanceBand, PrimaryAction, QuestionBank, QuestionDraft, ResourceKind, Step,
};
use trainer_core::time::fixed_now;

fn two_question_bank() -> Arc<QuestionBank> {
    let draft = |category: &str, correct: usize| QuestionDraft {
        category: category.into(),
        prompt: format!("Which {category} practice applies?"),
        options: vec!["first".into(), "second".into()],
        correct_option: correct,
        explanation: format!("{category} explanation"),
        ..QuestionDraft::default()
    };
    Arc::new(
        QuestionBank::from_drafts(vec![draft("Governance", 1), draft("Risk Management", 0)])
            .unwrap(),
    )
}

#[test]
fn one_wrong_one_right_scores_fifty_percent() {
    let mut service = AssessmentService::with_seed(two_question_bank(), 42).unwrap();

    // Answer the Governance question wrong and the other one right, in
    // whatever order the shuffle produced.
    for _ in 0..2 {
        let question = service.current_question().unwrap();
        let option = if question.category() == "Governance" {
            0
        } else {
            question.correct_option()
        };
        service.select_option(option).unwrap();
        assert!(matches!(service.advance().unwrap(), Step::Checked(_)));
        service.advance().unwrap();
    }

    let summary = service.summary().expect("run complete");
    assert_eq!(summary.score, 1);
    assert_eq!(summary.percentage, 50);
    assert_eq!(summary.band, PerformanceBand::OnTrack);
    assert_eq!(summary.mistakes.len(), 1);
    assert_eq!(summary.mistakes[0].category, "Governance");
    assert_eq!(summary.mistakes[0].chosen_option, 0);
    assert_eq!(summary.mistakes[0].correct_option, 1);
    assert_eq!(
        summary.recommendations[0].recommendations,
        vec![
            "Review Governance fundamentals in the Learning Hub".to_string(),
            "Governance explanation".to_string(),
        ]
    );
}

#[tokio::test]
async fn bundled_assessment_runs_end_to_end_and_restarts() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now())).unwrap();
    services.seed(false).await.unwrap();
    services.users().login("admin", "admin123").await.unwrap();

    let mut assessment = services.start_assessment().unwrap();
    let total = assessment.bank().len();
    assert_eq!(total, 13);

    loop {
        let correct = assessment.current_question().unwrap().correct_option();
        assessment.select_option(correct).unwrap();
        assessment.advance().unwrap();
        if assessment.progress().primary_action == PrimaryAction::ShowResults {
            assert_eq!(assessment.advance().unwrap(), Step::Finished);
            break;
        }
        assert!(matches!(
            assessment.advance().unwrap(),
            Step::Moved { .. }
        ));
    }

    let summary = assessment.summary().unwrap();
    assert_eq!(summary.score as usize, total);
    assert_eq!(summary.percentage, 100);
    assert_eq!(summary.band, PerformanceBand::Excellent);
    assert!(summary.recommendations.is_empty());

    assessment.restart().unwrap();
    let progress = assessment.progress();
    assert_eq!(progress.score, 0);
    assert_eq!(progress.question_number, 1);
    assert!(!progress.is_complete);
    assert!(assessment.run().mistakes().is_empty());
}

#[tokio::test]
async fn learning_hub_reflects_category_changes() {
    let storage = Storage::in_memory();
    let services = AppServices::from_storage(&storage, Clock::fixed(fixed_now())).unwrap();
    services.seed(false).await.unwrap();

    let catalog = services.catalog();
    catalog.add_category("Agile Delivery").await.unwrap();
    for kind in ResourceKind::ALL {
        assert!(catalog.resources("Agile Delivery", kind).await.unwrap().is_empty());
    }

    // A second bundle over the same storage sees the change.
    let reopened = AppServices::from_storage(&storage, Clock::fixed(fixed_now())).unwrap();
    let categories = reopened.catalog().categories().await.unwrap();
    assert!(categories.contains("Agile Delivery"));
}
