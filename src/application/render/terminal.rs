//! Terminal tree rendering (termtree), with on-path nodes colored.

use colored::Colorize;
use generational_arena::Index;
use termtree::Tree;

use crate::application::services::Visualization;
use crate::domain::{DecisionNode, LayoutNode, NodeKind, Outcome};

/// Plain rendering of a decision tree.
pub fn decision_tree(tree: &DecisionNode) -> Tree<String> {
    let leaves = tree.options.iter().map(|choice| {
        let option = Tree::new(choice.value.clone());
        match &choice.outcome {
            Outcome::Recommendation(rec) => option.with_leaves([format!(
                "⇒ {} [{}]",
                rec.text,
                rec.references.join(", ")
            )]),
            Outcome::Next(next) => option.with_leaves([decision_tree(next)]),
        }
    });
    Tree::new(format!("{} ({})", tree.question, tree.key)).with_leaves(leaves)
}

/// Rendering of a laid-out graph with the highlighted path.
pub fn highlighted_tree(vis: &Visualization) -> Tree<String> {
    match vis.graph.root() {
        Some(root) => build(vis, root),
        None => Tree::new("(empty tree)".to_string()),
    }
}

fn build(vis: &Visualization, idx: Index) -> Tree<String> {
    let label = vis
        .graph
        .node(idx)
        .map(|node| styled_label(vis, idx, node))
        .unwrap_or_default();
    let leaves: Vec<Tree<String>> = vis
        .graph
        .children(idx)
        .iter()
        .map(|&child| build(vis, child))
        .collect();
    Tree::new(label).with_leaves(leaves)
}

fn styled_label(vis: &Visualization, idx: Index, node: &LayoutNode) -> String {
    let on_path = vis.highlight.contains_node(idx);
    match node.kind {
        NodeKind::Question if on_path => node.label.green().bold().to_string(),
        NodeKind::Question => node.label.clone(),
        NodeKind::Option if on_path => format!("{} {}", "●".green(), node.label.green().underline()),
        NodeKind::Option => format!("○ {}", node.label),
        NodeKind::Recommendation => {
            let text = node.full_text.as_deref().unwrap_or(&node.label);
            let refs = node.references.join(", ");
            if vis.highlight.is_final_recommendation(idx) {
                format!("{} {} [{}]", "✓".green(), text.yellow().bold(), refs)
            } else {
                format!("⇒ {} [{}]", text.dimmed(), refs)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedded_tree;

    #[test]
    fn given_tree_when_rendering_then_shows_questions_and_recommendations() {
        let tree = embedded_tree().unwrap();
        let rendered = decision_tree(&tree).to_string();
        assert!(rendered.starts_with("What type of infection is suspected? (type_infection)"));
        assert!(rendered.contains("Is prophylaxis needed? (prophylaxie)"));
        assert!(rendered.contains("⇒ Fosfomycine 3g dose unique [p.26]"));
        assert_eq!(rendered.matches('⇒').count(), 12);
    }
}
