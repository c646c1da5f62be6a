//! Path highlighting over a laid-out graph.
//!
//! Questions and options are matched against the recorded path by label.
//! The final recommendation is not guessed from the path length: it is found
//! by following the answer route structurally from the graph root.

use std::collections::HashSet;

use generational_arena::Index;
use tracing::debug;

use crate::domain::layout::{Edge, LayoutGraph, LayoutNode, NodeKind};
use crate::domain::tree::{normalize_label, same_label};
use crate::domain::walk::DecisionPath;

/// Markers that identify a question even when its wording changed.
pub const KEYWORD_MARKERS: &[&str] = &[
    "severity",
    "complication",
    "pregnan",
    "recurren",
    "prophylaxis",
    "retention",
];

/// Whether a question label designates the same question as `question`.
pub fn question_matches(label: &str, question: &str) -> bool {
    let label = normalize_label(label);
    let question = normalize_label(question);
    label == question
        || KEYWORD_MARKERS
            .iter()
            .any(|marker| label.contains(marker) && question.contains(marker))
}

/// Whether a question or option node lies on `path`.
///
/// Recommendation nodes are never on the path by label; see
/// [`trace_route`].
pub fn is_node_on_path(node: &LayoutNode, path: &DecisionPath) -> bool {
    match node.kind {
        NodeKind::Question => path.iter().any(|s| question_matches(&node.label, &s.question)),
        NodeKind::Option => path.iter().any(|s| same_label(&node.label, &s.answer)),
        NodeKind::Recommendation => false,
    }
}

/// Whether `edge` lies on `path`: both endpoints on it, or the source on it
/// and the target being the final recommendation.
pub fn is_edge_on_path(
    edge: &Edge,
    path: &DecisionPath,
    graph: &LayoutGraph,
    final_recommendation: Option<Index>,
) -> bool {
    let Some((source, target)) = graph.endpoints(edge) else {
        return false;
    };
    if !is_node_on_path(source, path) {
        return false;
    }
    is_node_on_path(target, path) || final_recommendation == Some(edge.target)
}

/// Follow `route` (answers from the graph root) down to a recommendation.
///
/// Returns `None` unless the answers end exactly on a recommendation.
pub fn trace_route<S: AsRef<str>>(graph: &LayoutGraph, route: &[S]) -> Option<Index> {
    let mut current = graph.root()?;
    for (i, answer) in route.iter().enumerate() {
        let option = graph.children(current).iter().copied().find(|&idx| {
            graph
                .node(idx)
                .is_some_and(|n| n.kind == NodeKind::Option && same_label(&n.label, answer.as_ref()))
        })?;
        let next = graph.children(option).first().copied()?;
        let next_kind = graph.node(next)?.kind;
        let is_last = i + 1 == route.len();
        match (next_kind, is_last) {
            (NodeKind::Recommendation, true) => return Some(next),
            (NodeKind::Question, false) => current = next,
            _ => return None,
        }
    }
    None
}

/// Highlight sets for one rendering of a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlight {
    nodes: HashSet<Index>,
    edges: HashSet<Edge>,
    final_recommendation: Option<Index>,
}

impl Highlight {
    /// Compute which nodes and edges of `graph` lie on `path`; `route` is the
    /// answer sequence from the graph root to the resolved leaf.
    pub fn compute<S: AsRef<str>>(graph: &LayoutGraph, path: &DecisionPath, route: &[S]) -> Self {
        let final_recommendation = trace_route(graph, route);
        let nodes: HashSet<Index> = graph
            .nodes()
            .filter(|(_, node)| is_node_on_path(node, path))
            .map(|(idx, _)| idx)
            .collect();
        let edges: HashSet<Edge> = graph
            .edges()
            .iter()
            .filter(|edge| is_edge_on_path(edge, path, graph, final_recommendation))
            .copied()
            .collect();
        debug!(
            "highlight: {} nodes, {} edges, final recommendation found: {}",
            nodes.len(),
            edges.len(),
            final_recommendation.is_some()
        );
        Self {
            nodes,
            edges,
            final_recommendation,
        }
    }

    pub fn contains_node(&self, idx: Index) -> bool {
        self.nodes.contains(&idx)
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    pub fn is_final_recommendation(&self, idx: Index) -> bool {
        self.final_recommendation == Some(idx)
    }

    pub fn final_recommendation(&self) -> Option<Index> {
        self.final_recommendation
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout::{layout, LayoutParams};
    use crate::domain::tree::{Choice, DecisionNode};
    use rstest::rstest;

    fn node(kind: NodeKind, label: &str) -> LayoutNode {
        LayoutNode {
            id: "n".into(),
            label: label.into(),
            kind,
            level: 0.0,
            x: 0.0,
            y: 0.0,
            full_text: None,
            references: Vec::new(),
        }
    }

    #[rstest]
    #[case("Is the patient pregnant?", "  is the PATIENT pregnant? ", true)]
    #[case("Any signs of severity?", "Severity signs present?", true)]
    #[case("Is there a complication risk?", "Complication risk?", true)]
    #[case("Is the patient pregnant?", "Is prophylaxis needed?", false)]
    #[case("What type of infection is suspected?", "Is the patient pregnant?", false)]
    fn given_question_texts_when_matching_then_uses_normalized_text_or_markers(
        #[case] label: &str,
        #[case] question: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(question_matches(label, question), expected);
    }

    #[test]
    fn given_path_when_checking_nodes_then_matches_by_kind() {
        let path = DecisionPath::new().extended("Is the patient pregnant?", "non");

        assert!(is_node_on_path(&node(NodeKind::Question, "Is the patient pregnant?"), &path));
        assert!(is_node_on_path(&node(NodeKind::Option, " NON "), &path));
        assert!(!is_node_on_path(&node(NodeKind::Option, "oui"), &path));
        assert!(!is_node_on_path(&node(NodeKind::Recommendation, "non"), &path));
        assert!(!is_node_on_path(
            &node(NodeKind::Question, "Is the patient pregnant?"),
            &DecisionPath::new()
        ));
    }

    fn pregnancy_tree() -> DecisionNode {
        DecisionNode::new(
            "Is the patient pregnant?",
            "grossesse",
            vec![
                Choice::recommendation("oui", "Rec pregnant", &[]),
                Choice::next(
                    "non",
                    DecisionNode::new(
                        "Is there a complication risk?",
                        "risque_complication",
                        vec![
                            Choice::recommendation("oui", "Rec complicated", &[]),
                            Choice::recommendation("non", "Rec simple", &[]),
                        ],
                    ),
                ),
            ],
        )
    }

    #[test]
    fn given_route_when_tracing_then_finds_resolved_leaf() {
        let graph = layout(&pregnancy_tree(), &LayoutParams::default());

        let idx = trace_route(&graph, &["non", "non"]).unwrap();
        assert_eq!(graph.node(idx).unwrap().full_text.as_deref(), Some("Rec simple"));

        let idx = trace_route(&graph, &["oui"]).unwrap();
        assert_eq!(graph.node(idx).unwrap().full_text.as_deref(), Some("Rec pregnant"));
    }

    #[rstest]
    #[case(&[])]
    #[case(&["non"])]
    #[case(&["oui", "non"])]
    #[case(&["peut-être"])]
    fn given_incomplete_or_wrong_route_when_tracing_then_none(#[case] route: &[&str]) {
        let graph = layout(&pregnancy_tree(), &LayoutParams::default());
        assert!(trace_route(&graph, route).is_none());
    }

    #[test]
    fn given_resolved_path_when_computing_highlight_then_marks_exactly_one_final() {
        let graph = layout(&pregnancy_tree(), &LayoutParams::default());
        let path = DecisionPath::from_pairs([
            ("Is the patient pregnant?", "non"),
            ("Is there a complication risk?", "non"),
        ]);
        let highlight = Highlight::compute(&graph, &path, &path.answers());

        let finals: Vec<_> = graph
            .nodes_of_kind(NodeKind::Recommendation)
            .filter(|(idx, _)| highlight.is_final_recommendation(*idx))
            .map(|(_, n)| n.full_text.clone().unwrap_or_default())
            .collect();
        assert_eq!(finals, vec!["Rec simple"]);

        // both questions plus the two "non" options
        assert_eq!(highlight.node_count(), 4);

        let final_idx = highlight.final_recommendation().unwrap();
        let into_final = graph.edges().iter().find(|e| e.target == final_idx).unwrap();
        assert!(highlight.contains_edge(into_final));

        // option "oui" is off path, so neither its incoming nor outgoing edge is highlighted
        let oui_edges = graph
            .edges()
            .iter()
            .filter(|e| {
                graph.node(e.target).unwrap().label == "oui"
                    || graph.node(e.source).unwrap().label == "oui"
            })
            .count();
        assert_eq!(oui_edges, 4);
        assert_eq!(highlight.edge_count(), graph.edges().len() - oui_edges);
    }

    #[test]
    fn given_empty_path_when_computing_highlight_then_nothing_is_marked() {
        let graph = layout(&pregnancy_tree(), &LayoutParams::default());
        let highlight = Highlight::compute::<String>(&graph, &DecisionPath::new(), &[]);
        assert_eq!(highlight.node_count(), 0);
        assert_eq!(highlight.edge_count(), 0);
        assert!(highlight.final_recommendation().is_none());
    }
}
