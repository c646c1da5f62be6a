//! Decision tree model.
//!
//! The serialized form (`RawNode`/`RawChoice`) mirrors the data files, where an
//! option carries optional `recommendation` and `next` fields. Conversion into
//! [`DecisionNode`] validates that every option has exactly one outcome, so the
//! rest of the crate only ever sees the [`Outcome`] sum type.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// A question with its ordered answer options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionNode {
    pub question: String,
    /// Unique identifier of the question's input control
    pub key: String,
    pub options: Vec<Choice>,
}

/// One answer option of a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Answer label
    pub value: String,
    pub outcome: Outcome,
}

/// What selecting a [`Choice`] leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Leaf: a therapeutic recommendation
    Recommendation(Recommendation),
    /// Internal: a follow-up question, exclusively owned by its choice
    Next(Box<DecisionNode>),
}

/// Therapeutic recommendation with its citation references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub text: String,
    pub references: Vec<String>,
}

/// Number of structural elements in a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ElementCounts {
    pub questions: usize,
    pub options: usize,
    pub recommendations: usize,
}

impl ElementCounts {
    /// Total number of elements, i.e. the number of laid-out nodes.
    pub fn total(&self) -> usize {
        self.questions + self.options + self.recommendations
    }

    /// Number of parent/child relations, i.e. the number of laid-out edges.
    pub fn relations(&self) -> usize {
        self.total().saturating_sub(1)
    }
}

impl Choice {
    /// Leaf choice leading to a recommendation.
    pub fn recommendation(
        value: impl Into<String>,
        text: impl Into<String>,
        references: &[&str],
    ) -> Self {
        Self {
            value: value.into(),
            outcome: Outcome::Recommendation(Recommendation {
                text: text.into(),
                references: references.iter().map(|r| r.to_string()).collect(),
            }),
        }
    }

    /// Internal choice leading to a follow-up question.
    pub fn next(value: impl Into<String>, node: DecisionNode) -> Self {
        Self {
            value: value.into(),
            outcome: Outcome::Next(Box::new(node)),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.outcome, Outcome::Recommendation(_))
    }
}

impl DecisionNode {
    pub fn new(question: impl Into<String>, key: impl Into<String>, options: Vec<Choice>) -> Self {
        Self {
            question: question.into(),
            key: key.into(),
            options,
        }
    }

    /// Parse and validate a tree from TOML.
    pub fn from_toml_str(content: &str) -> DomainResult<Self> {
        let raw: RawNode = toml::from_str(content).map_err(|e| DomainError::Parse {
            format: "TOML",
            message: e.to_string(),
        })?;
        Self::try_from(raw)
    }

    /// Parse and validate a tree from JSON.
    pub fn from_json_str(content: &str) -> DomainResult<Self> {
        let raw: RawNode = serde_json::from_str(content).map_err(|e| DomainError::Parse {
            format: "JSON",
            message: e.to_string(),
        })?;
        Self::try_from(raw)
    }

    /// Find the option whose value matches `answer` (case-insensitive, trimmed).
    pub fn find_choice(&self, answer: &str) -> Option<&Choice> {
        self.options.iter().find(|c| same_label(&c.value, answer))
    }

    /// Values of this question's options, in order.
    pub fn option_values(&self) -> Vec<&str> {
        self.options.iter().map(|c| c.value.as_str()).collect()
    }

    pub fn counts(&self) -> ElementCounts {
        let mut counts = ElementCounts::default();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            counts.questions += 1;
            for choice in &node.options {
                counts.options += 1;
                match &choice.outcome {
                    Outcome::Recommendation(_) => counts.recommendations += 1,
                    Outcome::Next(next) => stack.push(next),
                }
            }
        }
        counts
    }

    /// Depth in questions along the longest branch.
    pub fn depth(&self) -> usize {
        1 + self
            .options
            .iter()
            .filter_map(|c| match &c.outcome {
                Outcome::Next(next) => Some(next.depth()),
                Outcome::Recommendation(_) => None,
            })
            .max()
            .unwrap_or(0)
    }
}

/// Label comparison used throughout: case-insensitive on trimmed text.
pub fn same_label(a: &str, b: &str) -> bool {
    normalize_label(a) == normalize_label(b)
}

pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Serialized question node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNode {
    pub question: String,
    pub key: String,
    #[serde(default)]
    pub options: Vec<RawChoice>,
}

/// Serialized option: exactly one of `recommendation` and `next` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawChoice {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<RawNode>,
}

impl TryFrom<RawNode> for DecisionNode {
    type Error = DomainError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        if raw.options.is_empty() {
            return Err(DomainError::MalformedQuestion {
                key: raw.key,
                reason: "question has no options".to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut options = Vec::with_capacity(raw.options.len());
        for choice in raw.options {
            if !seen.insert(normalize_label(&choice.value)) {
                return Err(DomainError::MalformedChoice {
                    question_key: raw.key,
                    value: choice.value,
                    reason: "duplicate option value".to_string(),
                });
            }
            let outcome = match (choice.recommendation, choice.next) {
                (Some(text), None) => Outcome::Recommendation(Recommendation {
                    text,
                    references: choice.references,
                }),
                (None, Some(next)) => Outcome::Next(Box::new(DecisionNode::try_from(next)?)),
                (Some(_), Some(_)) => {
                    return Err(DomainError::MalformedChoice {
                        question_key: raw.key,
                        value: choice.value,
                        reason: "has both 'recommendation' and 'next'".to_string(),
                    })
                }
                (None, None) => {
                    return Err(DomainError::MalformedChoice {
                        question_key: raw.key,
                        value: choice.value,
                        reason: "has neither 'recommendation' nor 'next'".to_string(),
                    })
                }
            };
            options.push(Choice {
                value: choice.value,
                outcome,
            });
        }

        Ok(Self {
            question: raw.question,
            key: raw.key,
            options,
        })
    }
}

impl From<&DecisionNode> for RawNode {
    fn from(node: &DecisionNode) -> Self {
        Self {
            question: node.question.clone(),
            key: node.key.clone(),
            options: node
                .options
                .iter()
                .map(|choice| match &choice.outcome {
                    Outcome::Recommendation(rec) => RawChoice {
                        value: choice.value.clone(),
                        recommendation: Some(rec.text.clone()),
                        references: rec.references.clone(),
                        next: None,
                    },
                    Outcome::Next(next) => RawChoice {
                        value: choice.value.clone(),
                        recommendation: None,
                        references: Vec::new(),
                        next: Some(RawNode::from(next.as_ref())),
                    },
                })
                .collect(),
        }
    }
}
