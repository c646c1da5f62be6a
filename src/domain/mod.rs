//! Domain layer: decision tree, traversal, layout and highlighting
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod catalog;
pub mod error;
pub mod highlight;
pub mod layout;
pub mod scope;
pub mod tree;
pub mod walk;
pub mod wrap;

pub use catalog::embedded_tree;
pub use error::{DomainError, DomainResult};
pub use highlight::{is_edge_on_path, is_node_on_path, trace_route, Highlight};
pub use layout::{layout, Edge, LayoutGraph, LayoutNode, LayoutParams, NodeKind};
pub use scope::{extract_subtree, filter_path, SituationScope};
pub use tree::{Choice, DecisionNode, ElementCounts, Outcome, Recommendation};
pub use walk::{walk, Cursor, DecisionPath, PathStep, Resolution, Step};
pub use wrap::{wrap_text, WrapBudget};
