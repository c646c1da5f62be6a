//! Plain-text transcript of the answered questions.

use crate::domain::DecisionPath;

/// Step-by-step text of the path taken.
pub fn transcript(path: &DecisionPath) -> Vec<String> {
    let mut lines = Vec::with_capacity(path.len() * 3);
    for (i, step) in path.iter().enumerate() {
        if i > 0 {
            lines.push("   ↓".to_string());
        }
        lines.push(format!("Step {}: {}", step.step, step.question));
        lines.push(format!("   ➜ Answer: {}", step.answer));
    }
    lines
}
