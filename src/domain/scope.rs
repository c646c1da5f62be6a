//! Restriction of the tree to the clinical situation chosen first.

use std::borrow::Cow;

use tracing::{debug, warn};

use crate::domain::tree::{DecisionNode, Outcome};
use crate::domain::walk::DecisionPath;

/// Key of the synthetic question wrapping a situation that is itself a leaf.
pub const SITUATION_KEY: &str = "situation";

/// Subtree reachable from the top-level option `situation`.
///
/// A leaf option is wrapped in a single-option question so the result can be
/// laid out like any other tree. An unknown situation yields the whole tree.
pub fn extract_subtree<'t>(tree: &'t DecisionNode, situation: &str) -> Cow<'t, DecisionNode> {
    match tree.find_choice(situation) {
        Some(choice) => match &choice.outcome {
            Outcome::Next(next) => Cow::Borrowed(next.as_ref()),
            Outcome::Recommendation(_) => Cow::Owned(DecisionNode::new(
                format!("Situation: {}", choice.value),
                SITUATION_KEY,
                vec![choice.clone()],
            )),
        },
        None => {
            warn!("unknown clinical situation '{}', keeping the full tree", situation);
            Cow::Borrowed(tree)
        }
    }
}

/// Drop the situation step and renumber the remaining steps from 1.
pub fn filter_path(path: &DecisionPath) -> DecisionPath {
    DecisionPath::from_pairs(
        path.iter()
            .skip(1)
            .map(|s| (s.question.clone(), s.answer.clone())),
    )
}

/// A tree and path restricted to one clinical situation.
#[derive(Debug, Clone)]
pub struct SituationScope<'t> {
    /// The first answer, if any
    pub situation: Option<String>,
    /// Whether `situation` named a top-level option
    pub matched: bool,
    pub tree: Cow<'t, DecisionNode>,
    /// Path relative to `tree`, used for label highlighting
    pub path: DecisionPath,
    /// Answers leading from the root of `tree` to the resolved leaf
    pub route: Vec<String>,
}

impl<'t> SituationScope<'t> {
    /// Scope `tree` and `path` to the situation answered first.
    pub fn new(tree: &'t DecisionNode, path: &DecisionPath) -> Self {
        let Some(first) = path.first() else {
            return Self::unscoped(tree, path);
        };
        let situation = first.answer.clone();
        let Some(choice) = tree.find_choice(&situation) else {
            warn!("unknown clinical situation '{}', keeping the full tree", situation);
            return Self {
                situation: Some(situation),
                ..Self::unscoped(tree, path)
            };
        };

        let filtered = filter_path(path);
        let route = if choice.is_leaf() {
            vec![choice.value.clone()]
        } else {
            filtered.answers()
        };
        debug!(
            "scope: situation={} filtered_steps={} route={:?}",
            situation,
            filtered.len(),
            route
        );
        Self {
            tree: extract_subtree(tree, &situation),
            situation: Some(situation),
            matched: true,
            path: filtered,
            route,
        }
    }

    /// Scope to a situation without any answered path.
    pub fn for_situation(tree: &'t DecisionNode, situation: &str) -> Self {
        let matched = tree.find_choice(situation).is_some();
        Self {
            situation: Some(situation.to_string()),
            matched,
            tree: extract_subtree(tree, situation),
            path: DecisionPath::new(),
            route: Vec::new(),
        }
    }

    fn unscoped(tree: &'t DecisionNode, path: &DecisionPath) -> Self {
        Self {
            situation: None,
            matched: false,
            tree: Cow::Borrowed(tree),
            path: path.clone(),
            route: path.answers(),
        }
    }
}
