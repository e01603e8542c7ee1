use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One dimension a spoken answer is scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RubricCriterion {
    Communication,
    Logic,
    Confidence,
    #[serde(alias = "argument_quality")]
    Arguments,
    #[serde(alias = "concision")]
    Conciseness,
}

impl RubricCriterion {
    pub const ALL: [RubricCriterion; 5] = [
        RubricCriterion::Communication,
        RubricCriterion::Logic,
        RubricCriterion::Confidence,
        RubricCriterion::Arguments,
        RubricCriterion::Conciseness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RubricCriterion::Communication => "communication",
            RubricCriterion::Logic => "logic",
            RubricCriterion::Confidence => "confidence",
            RubricCriterion::Arguments => "arguments",
            RubricCriterion::Conciseness => "conciseness",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RubricCriterion::Communication => "is the idea conveyed clearly",
            RubricCriterion::Logic => "is the answer logically structured",
            RubricCriterion::Confidence => "does the speaker sound confident",
            RubricCriterion::Arguments => "are the arguments well supported",
            RubricCriterion::Conciseness => "is the answer short and to the point",
        }
    }
}

impl FromStr for RubricCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "communication" => Ok(Self::Communication),
            "logic" => Ok(Self::Logic),
            "confidence" => Ok(Self::Confidence),
            "arguments" | "argument_quality" => Ok(Self::Arguments),
            "conciseness" | "concision" => Ok(Self::Conciseness),
            other => Err(format!("Invalid rubric criterion: {}", other)),
        }
    }
}

impl fmt::Display for RubricCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriterionScore {
    pub criterion: RubricCriterion,
    pub score: u8,
    pub comment: String,
}

/// Scores for every requested criterion, in rubric order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RubricScore {
    pub criteria: Vec<CriterionScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl RubricScore {
    pub fn score_for(&self, criterion: RubricCriterion) -> Option<u8> {
        self.criteria
            .iter()
            .find(|c| c.criterion == criterion)
            .map(|c| c.score)
    }
}

/// Qualitative feedback. Advisory, so it degrades instead of failing a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Feedback {
    Scored(RubricScore),
    Unstructured { text: String },
    Unavailable { reason: String },
}

impl Feedback {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable { .. })
    }
}
