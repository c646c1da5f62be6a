//! Advisor service
//!
//! Runs the questionnaire, then scopes, lays out and highlights the decision
//! tree for the path that was taken.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    embedded_tree, layout, walk, Cursor, DecisionNode, DecisionPath, DomainError, Highlight,
    LayoutGraph, Resolution, SituationScope, Step,
};
use crate::infrastructure::traits::{FileSystem, SelectionItem, Selector};

/// A laid-out, highlighted view of the tree for one path.
#[derive(Debug)]
pub struct Visualization {
    /// Situation the tree was scoped to, if any
    pub situation: Option<String>,
    /// Whether the situation named a top-level option
    pub scoped: bool,
    pub tree: DecisionNode,
    /// Path relative to `tree`
    pub path: DecisionPath,
    pub graph: LayoutGraph,
    pub highlight: Highlight,
}

/// Outcome of a full consultation.
#[derive(Debug)]
pub struct Consultation {
    pub resolution: Resolution,
    pub visualization: Visualization,
}

/// Service for answering the questionnaire and visualizing the result.
pub struct AdvisorService {
    tree: Arc<DecisionNode>,
    settings: Arc<Settings>,
}

impl AdvisorService {
    /// Create a new advisor service.
    pub fn new(tree: Arc<DecisionNode>, settings: Arc<Settings>) -> Self {
        Self { tree, settings }
    }

    /// Load the decision tree: `settings.tree_file` when set, else the embedded one.
    pub fn load_tree(settings: &Settings, fs: &dyn FileSystem) -> ApplicationResult<DecisionNode> {
        match &settings.tree_file {
            Some(path) => Self::load_tree_file(path, fs),
            None => {
                debug!("using embedded decision tree");
                Ok(embedded_tree()?)
            }
        }
    }

    /// Load and validate a decision tree file (`.toml` or `.json`).
    pub fn load_tree_file(path: &Path, fs: &dyn FileSystem) -> ApplicationResult<DecisionNode> {
        if !fs.exists(path) {
            return Err(ApplicationError::TreeFileNotFound(path.to_path_buf()));
        }
        let content = fs
            .read_to_string(path)
            .with_path_context("read decision tree", path)?;
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let tree = match extension.as_str() {
            "toml" => DecisionNode::from_toml_str(&content)?,
            "json" => DecisionNode::from_json_str(&content)?,
            _ => return Err(ApplicationError::UnsupportedTreeFormat(path.to_path_buf())),
        };
        info!("loaded decision tree from {}", path.display());
        Ok(tree)
    }

    pub fn tree(&self) -> &DecisionNode {
        &self.tree
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Top-level clinical situations.
    pub fn situations(&self) -> Vec<&str> {
        self.tree.option_values()
    }

    /// Resolve a complete answer sequence.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(&self, answers: &[String]) -> ApplicationResult<Resolution> {
        Ok(walk(&self.tree, answers)?)
    }

    /// Ask every question through `selector` until a recommendation is reached.
    ///
    /// `preset` answers are applied first, without prompting.
    #[instrument(level = "debug", skip(self, selector))]
    pub fn interview(&self, selector: &dyn Selector, preset: &[String]) -> ApplicationResult<Resolution> {
        let mut cursor = Cursor::start(&self.tree);
        let mut preset = preset.iter();
        loop {
            let question = cursor.question();
            let answer = match preset.next() {
                Some(answer) => answer.clone(),
                None => {
                    let items: Vec<SelectionItem> = question
                        .options
                        .iter()
                        .map(|c| SelectionItem {
                            display: c.value.clone(),
                            value: c.value.clone(),
                        })
                        .collect();
                    let selected = selector
                        .select_one(&items, &question.question)
                        .map_err(|message| ApplicationError::Selection { message })?
                        .ok_or_else(|| ApplicationError::Cancelled {
                            question_key: question.key.clone(),
                        })?;
                    selected.value
                }
            };
            match cursor.answer(&answer)? {
                Step::Ask(next) => cursor = next,
                Step::Resolved(resolution) => {
                    if preset.next().is_some() {
                        return Err(DomainError::TrailingAnswers {
                            count: 1 + preset.count(),
                        }
                        .into());
                    }
                    return Ok(resolution);
                }
            }
        }
    }

    /// Scope, lay out and highlight the tree for `path`.
    #[instrument(level = "debug", skip(self, path), fields(steps = path.len()))]
    pub fn visualize(&self, path: &DecisionPath) -> Visualization {
        let scope = SituationScope::new(&self.tree, path);
        self.render_scope(scope)
    }

    /// Lay out the tree scoped to `situation`, without any path.
    pub fn visualize_situation(&self, situation: &str) -> Visualization {
        let scope = SituationScope::for_situation(&self.tree, situation);
        self.render_scope(scope)
    }

    /// Lay out the full tree, without any path.
    pub fn visualize_full(&self) -> Visualization {
        let graph = layout(&self.tree, &self.settings.layout.params());
        Visualization {
            situation: None,
            scoped: false,
            tree: self.tree.as_ref().clone(),
            path: DecisionPath::new(),
            highlight: Highlight::default(),
            graph,
        }
    }

    /// Pair a resolution with the visualization of its path.
    pub fn consult(&self, resolution: Resolution) -> Consultation {
        let visualization = self.visualize(&resolution.path);
        Consultation {
            resolution,
            visualization,
        }
    }

    fn render_scope(&self, scope: SituationScope<'_>) -> Visualization {
        let graph = layout(&scope.tree, &self.settings.layout.params());
        let highlight = Highlight::compute(&graph, &scope.path, &scope.route);
        debug!(
            "visualize: situation={:?} nodes={} highlighted={}",
            scope.situation,
            graph.len(),
            highlight.node_count()
        );
        Visualization {
            situation: scope.situation,
            scoped: scope.matched,
            tree: scope.tree.into_owned(),
            path: scope.path,
            graph,
            highlight,
        }
    }
}
