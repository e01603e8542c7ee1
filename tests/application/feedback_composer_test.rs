use std::sync::Arc;

use orator::application::services::{
    FeedbackComposer, FeedbackError, build_prompt, parse_rubric_response,
};
use orator::domain::{Feedback, RubricCriterion, Transcript};

use crate::helpers::{LlmBehavior, SCORED_REPLY, StubLlm};

fn composer(behavior: LlmBehavior) -> (FeedbackComposer<StubLlm>, Arc<StubLlm>) {
    let llm = Arc::new(StubLlm::new(behavior));
    (FeedbackComposer::new(Arc::clone(&llm)), llm)
}

#[tokio::test]
async fn given_structured_reply_when_composing_then_returns_scores_in_rubric_order() {
    let (composer, llm) = composer(LlmBehavior::Reply(SCORED_REPLY));

    let feedback = composer
        .compose(&Transcript::new("I led the migration"), &RubricCriterion::ALL)
        .await
        .unwrap();

    let score = match feedback {
        Feedback::Scored(score) => score,
        other => panic!("expected scored feedback, got {other:?}"),
    };
    let order: Vec<_> = score.criteria.iter().map(|c| c.criterion).collect();
    assert_eq!(order, RubricCriterion::ALL.to_vec());
    assert_eq!(score.score_for(RubricCriterion::Conciseness), Some(5));
    assert_eq!(score.criteria[0].comment, "Clear.");
    assert_eq!(score.criteria[2].comment, "");
    assert_eq!(score.summary.as_deref(), Some("Solid answer."));
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn given_fenced_reply_when_composing_then_parses_inner_json() {
    let reply: &'static str = "```json\n{\"scores\":{\"logic\":\"4\"}}\n```";
    let (composer, _) = composer(LlmBehavior::Reply(reply));

    let feedback = composer
        .compose(&Transcript::new("answer"), &[RubricCriterion::Logic])
        .await
        .unwrap();

    assert!(matches!(
        feedback,
        Feedback::Scored(ref s) if s.score_for(RubricCriterion::Logic) == Some(4)
    ));
}

#[tokio::test]
async fn given_prose_reply_when_composing_then_returns_raw_text() {
    let (composer, _) = composer(LlmBehavior::Reply("  Good answer, but slow down.  "));

    let feedback = composer
        .compose(&Transcript::new("answer"), &RubricCriterion::ALL)
        .await
        .unwrap();

    assert_eq!(
        feedback,
        Feedback::Unstructured {
            text: "Good answer, but slow down.".to_string()
        }
    );
}

#[tokio::test]
async fn given_failing_service_when_composing_then_returns_error() {
    let (composer, _) = composer(LlmBehavior::Fail);

    let result = composer
        .compose(&Transcript::new("answer"), &RubricCriterion::ALL)
        .await;

    assert!(matches!(result, Err(FeedbackError::Unavailable(_))));
}

#[tokio::test]
async fn given_empty_transcript_when_composing_then_skips_service_call() {
    let (composer, llm) = composer(LlmBehavior::Reply(SCORED_REPLY));

    let feedback = composer
        .compose(&Transcript::empty(), &RubricCriterion::ALL)
        .await
        .unwrap();

    assert!(!feedback.is_available());
    assert_eq!(llm.calls(), 0);
}

#[test]
fn given_missing_criterion_when_parsing_then_returns_none() {
    let raw = r#"{"scores":{"communication":4}}"#;

    let parsed = parse_rubric_response(raw, &[RubricCriterion::Communication, RubricCriterion::Logic]);

    assert!(parsed.is_none());
}

#[test]
fn given_out_of_range_score_when_parsing_then_returns_none() {
    let raw = r#"{"scores":{"logic":7}}"#;

    assert!(parse_rubric_response(raw, &[RubricCriterion::Logic]).is_none());
}

#[test]
fn given_legacy_keys_and_float_scores_when_parsing_then_accepts() {
    let raw = r#"{"scores":{"argument_quality":3.0,"concision":2}}"#;

    let parsed = parse_rubric_response(
        raw,
        &[RubricCriterion::Arguments, RubricCriterion::Conciseness],
    )
    .unwrap();

    assert_eq!(parsed.score_for(RubricCriterion::Arguments), Some(3));
    assert_eq!(parsed.score_for(RubricCriterion::Conciseness), Some(2));
}

#[test]
fn given_transcript_and_rubric_when_building_prompt_then_lists_every_criterion() {
    let prompt = build_prompt(&Transcript::new("Мен жобаны басқардым"), &RubricCriterion::ALL);

    assert!(prompt.contains("Мен жобаны басқардым"));
    for criterion in RubricCriterion::ALL {
        assert!(prompt.contains(criterion.as_str()));
    }
    assert!(prompt.contains("\"scores\""));
}
