//! Embedded reference decision tree.

use crate::domain::error::DomainResult;
use crate::domain::tree::DecisionNode;

const EMBEDDED_TREE: &str = include_str!("../../resources/decision_tree.toml");

/// The built-in urinary tract infection tree.
pub fn embedded_tree() -> DomainResult<DecisionNode> {
    DecisionNode::from_toml_str(EMBEDDED_TREE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_embedded_tree_when_loading_then_is_well_formed() {
        let tree = embedded_tree().unwrap();
        assert_eq!(tree.key, "type_infection");
        assert_eq!(
            tree.option_values(),
            vec![
                "colonisation",
                "cystite_aigue",
                "cystite_recidivante",
                "pyelonephrite_aigue",
                "infection_urinaire_masculine"
            ]
        );
        let counts = tree.counts();
        assert_eq!(counts.questions, 8);
        assert_eq!(counts.options, 19);
        assert_eq!(counts.recommendations, 12);
        assert_eq!(tree.depth(), 3);
    }
}
