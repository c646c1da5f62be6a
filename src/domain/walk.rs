//! Questionnaire traversal.
//!
//! A [`Cursor`] points at the current question and owns the path taken so far.
//! Answering consumes the cursor and yields either the next cursor or the
//! final [`Resolution`], so the path is always threaded explicitly.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::tree::{DecisionNode, Outcome, Recommendation};

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub question: String,
    pub answer: String,
    /// 1-based position in the path
    pub step: usize,
}

/// Ordered sequence of answered questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DecisionPath {
    steps: Vec<PathStep>,
}

impl DecisionPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a path from `(question, answer)` pairs, numbering steps from 1.
    pub fn from_pairs<I, Q, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: Into<String>,
        A: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |path, (q, a)| path.extended(q, a))
    }

    /// Return this path with one more step appended.
    pub fn extended(mut self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        let step = self.steps.len() + 1;
        self.steps.push(PathStep {
            question: question.into(),
            answer: answer.into(),
            step,
        });
        self
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathStep> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn first(&self) -> Option<&PathStep> {
        self.steps.first()
    }

    /// Answers in order.
    pub fn answers(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.answer.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a DecisionPath {
    type Item = &'a PathStep;
    type IntoIter = std::slice::Iter<'a, PathStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// A reached leaf together with the path that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub recommendation: Recommendation,
    pub path: DecisionPath,
}

impl Resolution {
    /// The clinical situation, i.e. the first answer given.
    pub fn situation(&self) -> Option<&str> {
        self.path.first().map(|s| s.answer.as_str())
    }
}

/// Position in the tree while answering questions.
#[derive(Debug, Clone)]
pub struct Cursor<'t> {
    node: &'t DecisionNode,
    path: DecisionPath,
}

/// Result of answering the current question.
#[derive(Debug, Clone)]
pub enum Step<'t> {
    Ask(Cursor<'t>),
    Resolved(Resolution),
}

impl<'t> Cursor<'t> {
    /// Start at the root question with an empty path.
    pub fn start(tree: &'t DecisionNode) -> Self {
        Self {
            node: tree,
            path: DecisionPath::new(),
        }
    }

    /// The question awaiting an answer.
    pub fn question(&self) -> &'t DecisionNode {
        self.node
    }

    pub fn path(&self) -> &DecisionPath {
        &self.path
    }

    /// Answer the current question. The recorded answer is the option's own
    /// value, whatever casing was typed.
    pub fn answer(self, answer: &str) -> DomainResult<Step<'t>> {
        let node = self.node;
        let choice = node
            .find_choice(answer)
            .ok_or_else(|| DomainError::UnknownAnswer {
                question_key: node.key.clone(),
                answer: answer.to_string(),
                expected: node.option_values().join(", "),
            })?;
        debug!("answer: {} -> {}", node.key, choice.value);

        let path = self.path.extended(&node.question, &choice.value);
        Ok(match &choice.outcome {
            Outcome::Recommendation(rec) => Step::Resolved(Resolution {
                recommendation: rec.clone(),
                path,
            }),
            Outcome::Next(next) => Step::Ask(Cursor { node: next, path }),
        })
    }
}

/// Walk the tree with a complete answer sequence.
#[instrument(level = "debug", skip(tree, answers), fields(root = %tree.key))]
pub fn walk<I, S>(tree: &DecisionNode, answers: I) -> DomainResult<Resolution>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut answers = answers.into_iter();
    let mut cursor = Cursor::start(tree);
    loop {
        let Some(answer) = answers.next() else {
            return Err(DomainError::IncompleteAnswers {
                question_key: cursor.question().key.clone(),
            });
        };
        match cursor.answer(answer.as_ref())? {
            Step::Ask(next) => cursor = next,
            Step::Resolved(resolution) => {
                let count = answers.count();
                if count > 0 {
                    return Err(DomainError::TrailingAnswers { count });
                }
                return Ok(resolution);
            }
        }
    }
}
