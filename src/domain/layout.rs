//! Deterministic top-down layout of a decision tree.
//!
//! Questions sit on integer-ish levels, their options half a level below and
//! recommendations one more level below the option. Each question spreads its
//! options evenly over the width allotted to it; sub-questions receive a
//! contracted width centred on their option so sibling subtrees stay apart.

use generational_arena::{Arena, Index};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::tree::{DecisionNode, Outcome};
use crate::domain::wrap::shorten;

pub const DEFAULT_BRANCH_WIDTH: f64 = 8.0;
pub const BRANCH_CONTRACTION: f64 = 0.6;
pub const VERTICAL_SPACING: f64 = 3.0;
pub const RECOMMENDATION_LABEL_CHARS: usize = 40;

const OPTION_LEVEL_OFFSET: f64 = 0.5;
const SUBTREE_LEVEL_STEP: f64 = 1.5;

/// Kind of a laid-out node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Question,
    Option,
    Recommendation,
}

/// A positioned node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub level: f64,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

/// Directed parent → child edge between two nodes of a [`LayoutGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: Index,
    pub target: Index,
}

/// Parameters of a layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub level: f64,
    pub x_offset: f64,
    pub branch_width: f64,
    /// Width factor applied per nested question
    pub contraction: f64,
    pub vertical_spacing: f64,
    /// Recommendation labels longer than this are shortened
    pub label_chars: usize,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            level: 0.0,
            x_offset: 0.0,
            branch_width: DEFAULT_BRANCH_WIDTH,
            contraction: BRANCH_CONTRACTION,
            vertical_spacing: VERTICAL_SPACING,
            label_chars: RECOMMENDATION_LABEL_CHARS,
        }
    }
}

impl LayoutParams {
    pub fn with_branch_width(mut self, branch_width: f64) -> Self {
        self.branch_width = branch_width;
        self
    }
}

/// Axis-aligned extent of a layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

#[derive(Debug)]
struct GraphEntry {
    node: LayoutNode,
    parent: Option<Index>,
    children: Vec<Index>,
}

/// Arena-backed positioned graph.
///
/// Nodes keep their emission order (pre-order), which is also the order of
/// their textual ids.
#[derive(Debug, Default)]
pub struct LayoutGraph {
    arena: Arena<GraphEntry>,
    order: Vec<Index>,
    edges: Vec<Edge>,
    root: Option<Index>,
}

impl LayoutGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, linking it below `parent` when given.
    pub fn insert_node(&mut self, node: LayoutNode, parent: Option<Index>) -> Index {
        let idx = self.arena.insert(GraphEntry {
            node,
            parent,
            children: Vec::new(),
        });
        self.order.push(idx);

        match parent.and_then(|p| self.arena.get_mut(p).map(|entry| (p, entry))) {
            Some((p, entry)) => {
                entry.children.push(idx);
                self.edges.push(Edge {
                    source: p,
                    target: idx,
                });
            }
            None => {
                if self.root.is_none() {
                    self.root = Some(idx);
                }
            }
        }
        idx
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn node(&self, idx: Index) -> Option<&LayoutNode> {
        self.arena.get(idx).map(|entry| &entry.node)
    }

    pub fn parent(&self, idx: Index) -> Option<Index> {
        self.arena.get(idx).and_then(|entry| entry.parent)
    }

    pub fn children(&self, idx: Index) -> &[Index] {
        self.arena
            .get(idx)
            .map(|entry| entry.children.as_slice())
            .unwrap_or(&[])
    }

    /// Nodes in emission order.
    pub fn nodes(&self) -> impl Iterator<Item = (Index, &LayoutNode)> + '_ {
        self.order
            .iter()
            .filter_map(move |&idx| self.node(idx).map(|node| (idx, node)))
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = (Index, &LayoutNode)> + '_ {
        self.nodes().filter(move |(_, node)| node.kind == kind)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Both endpoints of an edge, if they belong to this graph.
    pub fn endpoints(&self, edge: &Edge) -> Option<(&LayoutNode, &LayoutNode)> {
        Some((self.node(edge.source)?, self.node(edge.target)?))
    }

    pub fn find_by_id(&self, id: &str) -> Option<Index> {
        self.nodes().find(|(_, node)| node.id == id).map(|(idx, _)| idx)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.nodes().map(|(_, n)| n).fold(None, |acc, n| {
            Some(match acc {
                None => Bounds {
                    min_x: n.x,
                    max_x: n.x,
                    min_y: n.y,
                    max_y: n.y,
                },
                Some(b) => Bounds {
                    min_x: b.min_x.min(n.x),
                    max_x: b.max_x.max(n.x),
                    min_y: b.min_y.min(n.y),
                    max_y: b.max_y.max(n.y),
                },
            })
        })
    }
}

/// Lay out `tree` starting at `params.level` / `params.x_offset`.
#[instrument(level = "debug", skip(tree), fields(root = %tree.key))]
pub fn layout(tree: &DecisionNode, params: &LayoutParams) -> LayoutGraph {
    let mut graph = LayoutGraph::new();
    let mut builder = Builder {
        graph: &mut graph,
        params,
        next_id: 0,
    };
    builder.place_question(tree, None, params.level, params.x_offset, params.branch_width);
    debug!(
        "layout: {} nodes, {} edges",
        graph.len(),
        graph.edges().len()
    );
    graph
}

/// Horizontal positions of `count` children spread over `width` around `center`.
///
/// A single child stays exactly on `center`.
pub fn child_positions(center: f64, width: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![center],
        n => {
            let spacing = width / (n - 1) as f64;
            let start = center - width / 2.0;
            (0..n).map(|i| start + i as f64 * spacing).collect()
        }
    }
}

struct Builder<'g, 'p> {
    graph: &'g mut LayoutGraph,
    params: &'p LayoutParams,
    next_id: usize,
}

impl Builder<'_, '_> {
    fn y_for(&self, level: f64) -> f64 {
        -level * self.params.vertical_spacing
    }

    fn take_id(&mut self, prefix: &str) -> String {
        let id = format!("{}_{}", prefix, self.next_id);
        self.next_id += 1;
        id
    }

    fn place_question(
        &mut self,
        question: &DecisionNode,
        parent: Option<Index>,
        level: f64,
        x: f64,
        branch_width: f64,
    ) {
        let id = self.take_id("node");
        let question_idx = self.graph.insert_node(
            LayoutNode {
                id,
                label: question.question.clone(),
                kind: NodeKind::Question,
                level,
                x,
                y: self.y_for(level),
                full_text: None,
                references: Vec::new(),
            },
            parent,
        );

        let option_level = level + OPTION_LEVEL_OFFSET;
        let xs = child_positions(x, branch_width, question.options.len());
        for (choice, option_x) in question.options.iter().zip(xs) {
            let id = self.take_id("option");
            let option_idx = self.graph.insert_node(
                LayoutNode {
                    id,
                    label: choice.value.clone(),
                    kind: NodeKind::Option,
                    level: option_level,
                    x: option_x,
                    y: self.y_for(option_level),
                    full_text: None,
                    references: Vec::new(),
                },
                Some(question_idx),
            );

            match &choice.outcome {
                Outcome::Recommendation(rec) => {
                    let rec_level = level + SUBTREE_LEVEL_STEP;
                    let id = self.take_id("rec");
                    self.graph.insert_node(
                        LayoutNode {
                            id,
                            label: shorten(&rec.text, self.params.label_chars),
                            kind: NodeKind::Recommendation,
                            level: rec_level,
                            x: option_x,
                            y: self.y_for(rec_level),
                            full_text: Some(rec.text.clone()),
                            references: rec.references.clone(),
                        },
                        Some(option_idx),
                    );
                }
                Outcome::Next(next) => {
                    self.place_question(
                        next,
                        Some(option_idx),
                        level + SUBTREE_LEVEL_STEP,
                        option_x,
                        branch_width * self.params.contraction,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tree::Choice;

    fn small_tree() -> DecisionNode {
        DecisionNode::new(
            "Root?",
            "root",
            vec![
                Choice::recommendation("a", "Rec A", &["p.1"]),
                Choice::next(
                    "b",
                    DecisionNode::new("Only?", "only", vec![Choice::recommendation("c", "Rec C", &[])]),
                ),
            ],
        )
    }

    #[test]
    fn given_small_tree_when_laying_out_then_ids_follow_preorder_counter() {
        let graph = layout(&small_tree(), &LayoutParams::default());
        let ids: Vec<_> = graph.nodes().map(|(_, n)| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["node_0", "option_1", "rec_2", "option_3", "node_4", "option_5", "rec_6"]
        );
    }

    #[test]
    fn given_small_tree_when_laying_out_then_positions_match_levels() {
        let graph = layout(&small_tree(), &LayoutParams::default());
        let by_id = |id: &str| graph.node(graph.find_by_id(id).unwrap()).unwrap().clone();

        let root = by_id("node_0");
        assert_eq!((root.x, root.y, root.level), (0.0, 0.0, 0.0));

        let a = by_id("option_1");
        let b = by_id("option_3");
        assert_eq!((a.x, a.level, a.y), (-4.0, 0.5, -1.5));
        assert_eq!((b.x, b.level), (4.0, 0.5));

        let rec_a = by_id("rec_2");
        assert_eq!((rec_a.x, rec_a.level, rec_a.y), (-4.0, 1.5, -4.5));
        assert_eq!(rec_a.full_text.as_deref(), Some("Rec A"));
        assert_eq!(rec_a.references, vec!["p.1"]);

        let inner = by_id("node_4");
        assert_eq!((inner.x, inner.level), (4.0, 1.5));

        // single option inherits the question's x exactly
        let c = by_id("option_5");
        assert_eq!((c.x, c.level), (4.0, 2.0));
        let rec_c = by_id("rec_6");
        assert_eq!((rec_c.x, rec_c.level, rec_c.y), (4.0, 3.0, -9.0));
    }

    #[test]
    fn given_nested_question_when_laying_out_then_width_contracts() {
        let tree = DecisionNode::new(
            "Root?",
            "root",
            vec![Choice::next(
                "only",
                DecisionNode::new(
                    "Inner?",
                    "inner",
                    vec![
                        Choice::recommendation("x", "X", &[]),
                        Choice::recommendation("y", "Y", &[]),
                    ],
                ),
            )],
        );
        let graph = layout(&tree, &LayoutParams::default().with_branch_width(10.0));
        let xs: Vec<f64> = graph
            .nodes_of_kind(NodeKind::Option)
            .map(|(_, n)| n.x)
            .collect();
        assert_eq!(xs, vec![0.0, -3.0, 3.0]);
    }

    #[test]
    fn given_edges_when_laying_out_then_link_parent_to_child() {
        let graph = layout(&small_tree(), &LayoutParams::default());
        assert_eq!(graph.edges().len(), graph.len() - 1);
        for edge in graph.edges() {
            assert_eq!(graph.parent(edge.target), Some(edge.source));
            assert!(graph.children(edge.source).contains(&edge.target));
        }
        let root = graph.root().unwrap();
        assert_eq!(graph.children(root).len(), 2);
    }

    #[test]
    fn given_long_recommendation_when_laying_out_then_label_is_shortened() {
        let text = "Hospitalisation + Ceftriaxone IV ou Ciprofloxacine IV";
        let tree = DecisionNode::new("Root?", "root", vec![Choice::recommendation("oui", text, &[])]);
        let graph = layout(&tree, &LayoutParams::default());
        let (_, rec) = graph.nodes_of_kind(NodeKind::Recommendation).next().unwrap();
        assert_eq!(rec.label, "Hospitalisation + Ceftriaxone IV ou Cipr...");
        assert_eq!(rec.full_text.as_deref(), Some(text));
    }

    #[test]
    fn given_child_counts_when_spreading_then_positions_are_even() {
        assert!(child_positions(1.0, 8.0, 0).is_empty());
        assert_eq!(child_positions(1.0, 8.0, 1), vec![1.0]);
        assert_eq!(child_positions(0.0, 8.0, 3), vec![-4.0, 0.0, 4.0]);
    }

    #[test]
    fn given_graph_when_computing_bounds_then_covers_all_nodes() {
        let graph = layout(&small_tree(), &LayoutParams::default());
        let b = graph.bounds().unwrap();
        assert_eq!((b.min_x, b.max_x, b.min_y, b.max_y), (-4.0, 4.0, -9.0, 0.0));
        assert!(LayoutGraph::new().bounds().is_none());
    }
}
