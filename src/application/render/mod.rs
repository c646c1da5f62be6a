//! Renderers for consultations: transcript, terminal tree, SVG and JSON.

pub mod report;
pub mod svg;
pub mod terminal;
pub mod transcript;

pub use report::{consultation_report, graph_report, to_json};
pub use svg::render_svg;
pub use terminal::{decision_tree, highlighted_tree};
pub use transcript::transcript;
