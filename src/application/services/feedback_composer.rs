use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::application::ports::{LlmClient, LlmClientError};
use crate::domain::{
    CriterionScore, Feedback, MAX_SCORE, MIN_SCORE, RubricCriterion, RubricScore, Transcript,
};

pub const SYSTEM_PROMPT: &str = "You are an assistant that assesses spoken interview answers. \
Be brief and constructive. Reply with a single JSON object and nothing else.";

/// Scores a transcript against a rubric through a generative-text service.
pub struct FeedbackComposer<L>
where
    L: LlmClient,
{
    llm_client: Arc<L>,
}

impl<L> FeedbackComposer<L>
where
    L: LlmClient,
{
    pub fn new(llm_client: Arc<L>) -> Self {
        Self { llm_client }
    }

    /// Fails only when the service call itself fails. A reply that does not
    /// parse into a complete score comes back as [`Feedback::Unstructured`].
    pub async fn compose(
        &self,
        transcript: &Transcript,
        rubric: &[RubricCriterion],
    ) -> Result<Feedback, FeedbackError> {
        if transcript.is_empty() {
            return Ok(Feedback::unavailable("no speech detected"));
        }

        let prompt = build_prompt(transcript, rubric);
        let raw = self.llm_client.complete(SYSTEM_PROMPT, &prompt).await?;

        match parse_rubric_response(&raw, rubric) {
            Some(score) => {
                tracing::debug!(criteria = score.criteria.len(), "Rubric response parsed");
                Ok(Feedback::Scored(score))
            }
            None => {
                tracing::warn!(
                    chars = raw.len(),
                    "Rubric response was not structured, returning raw text"
                );
                Ok(Feedback::Unstructured {
                    text: raw.trim().to_string(),
                })
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("feedback unavailable: {0}")]
    Unavailable(#[from] LlmClientError),
    #[error("feedback timed out after {0} s")]
    TimedOut(u64),
}

pub fn build_prompt(transcript: &Transcript, rubric: &[RubricCriterion]) -> String {
    let criteria = rubric
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}) {}: {}", i + 1, c.as_str(), c.description()))
        .collect::<Vec<_>>()
        .join("\n");

    let keys = rubric
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>();
    let example_scores = keys
        .iter()
        .map(|k| format!("\"{}\":3", k))
        .collect::<Vec<_>>()
        .join(",");
    let example_feedback = keys
        .iter()
        .map(|k| format!("\"{}\":\"...\"", k))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "Candidate transcript: \"{transcript}\"\n\n\
         Give short, specific feedback on the answer for each criterion:\n\
         {criteria}\n\n\
         Score every criterion with an integer from {MIN_SCORE} to {MAX_SCORE}. \
         Answer in the language of the transcript. Return JSON only, in exactly this shape:\n\
         {{\"scores\":{{{example_scores}}},\"feedback\":{{{example_feedback}}},\"summary\":\"...\"}}"
    )
}

#[derive(Deserialize)]
struct RawRubricResponse {
    scores: HashMap<String, serde_json::Value>,
    #[serde(default)]
    feedback: HashMap<String, serde_json::Value>,
    #[serde(default)]
    summary: Option<String>,
}

/// Returns `None` unless every criterion in `rubric` has a score in range.
pub fn parse_rubric_response(raw: &str, rubric: &[RubricCriterion]) -> Option<RubricScore> {
    let json = outermost_object(raw)?;
    let parsed: RawRubricResponse = serde_json::from_str(json).ok()?;

    let scores: HashMap<RubricCriterion, u8> = parsed
        .scores
        .iter()
        .filter_map(|(key, value)| Some((key.parse().ok()?, as_score(value)?)))
        .collect();
    let comments: HashMap<RubricCriterion, String> = parsed
        .feedback
        .iter()
        .filter_map(|(key, value)| Some((key.parse().ok()?, value.as_str()?.trim().to_string())))
        .collect();

    let criteria = rubric
        .iter()
        .map(|criterion| {
            let score = *scores.get(criterion)?;
            Some(CriterionScore {
                criterion: *criterion,
                score,
                comment: comments.get(criterion).cloned().unwrap_or_default(),
            })
        })
        .collect::<Option<Vec<_>>>()?;

    Some(RubricScore {
        criteria,
        summary: parsed
            .summary
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    })
}

/// Slice from the first `{` to the last `}`, which also drops Markdown fences.
fn outermost_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

fn as_score(value: &serde_json::Value) -> Option<u8> {
    let n = match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as u64))?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    u8::try_from(n)
        .ok()
        .filter(|s| (MIN_SCORE..=MAX_SCORE).contains(s))
}
