//! SVG export of a highlighted decision-tree layout.

use generational_arena::Index;
use svg::node::element::{Circle, Group, Line, Rectangle, Text};
use svg::Document;

use crate::application::services::Visualization;
use crate::config::{SvgSettings, WrapSettings};
use crate::domain::{LayoutNode, NodeKind, WrapBudget};

const QUESTION_COLOR: &str = "#4472C4";
const QUESTION_ON_PATH_COLOR: &str = "#1E5091";
const RECOMMENDATION_COLOR: &str = "#FF8C00";
const FINAL_RECOMMENDATION_COLOR: &str = "#FFD700";
const PATH_COLOR: &str = "#00AA00";
const EDGE_COLOR: &str = "#CCCCCC";
const OPTION_COLOR: &str = "#333333";

const EDGE_WIDTH: f64 = 2.0;
const PATH_EDGE_WIDTH: f64 = 5.0;
const QUESTION_RADIUS: f64 = 38.0;
const RECOMMENDATION_SIZE: f64 = 70.0;

const MARGIN: f64 = 50.0;
const TITLE_SPACE: f64 = 60.0;
const LEGEND_SPACE: f64 = 40.0;

/// Fixed plot area in layout coordinates, extended to fit the graph.
const X_RANGE: (f64, f64) = (-15.0, 15.0);
const Y_RANGE: (f64, f64) = (-20.0, 2.0);

/// Maps layout coordinates onto the canvas (y grows downward on canvas).
#[derive(Debug, Clone, Copy)]
struct Viewport {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    fn fit(vis: &Visualization, settings: &SvgSettings) -> Self {
        let (mut x_min, mut x_max) = X_RANGE;
        let (mut y_min, mut y_max) = Y_RANGE;
        if let Some(b) = vis.graph.bounds() {
            x_min = x_min.min(b.min_x - 2.0);
            x_max = x_max.max(b.max_x + 2.0);
            y_min = y_min.min(b.min_y - 2.0);
            y_max = y_max.max(b.max_y + 2.0);
        }
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            width: f64::from(settings.width),
            height: f64::from(settings.height),
        }
    }

    fn project(&self, x: f64, y: f64) -> (f64, f64) {
        let plot_w = self.width - 2.0 * MARGIN;
        let plot_h = self.height - TITLE_SPACE - LEGEND_SPACE - MARGIN;
        let px = MARGIN + (x - self.x_min) / (self.x_max - self.x_min) * plot_w;
        let py = TITLE_SPACE + (self.y_max - y) / (self.y_max - self.y_min) * plot_h;
        (px, py)
    }
}

/// Render `vis` as an SVG document.
pub fn render_svg(vis: &Visualization, settings: &SvgSettings, wrap: &WrapSettings) -> Document {
    let viewport = Viewport::fit(vis, settings);

    let mut document = Document::new()
        .set("width", settings.width)
        .set("height", settings.height)
        .set("viewBox", (0u32, 0u32, settings.width, settings.height))
        .add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", "white"),
        );

    let mut edges = Group::new().set("id", "edges");
    for edge in vis.graph.edges() {
        let Some((source, target)) = vis.graph.endpoints(edge) else {
            continue;
        };
        let (x1, y1) = viewport.project(source.x, source.y);
        let (x2, y2) = viewport.project(target.x, target.y);
        let on_path = vis.highlight.contains_edge(edge);
        edges = edges.add(
            Line::new()
                .set("x1", x1)
                .set("y1", y1)
                .set("x2", x2)
                .set("y2", y2)
                .set("stroke", if on_path { PATH_COLOR } else { EDGE_COLOR })
                .set("stroke-width", if on_path { PATH_EDGE_WIDTH } else { EDGE_WIDTH }),
        );
    }
    document = document.add(edges);

    let mut nodes = Group::new().set("id", "nodes");
    for (idx, node) in vis.graph.nodes() {
        nodes = nodes.add(node_group(vis, idx, node, &viewport, wrap));
    }
    document = document.add(nodes);

    document.add(title(&settings.title, vis, settings)).add(legend(settings))
}

fn node_group(
    vis: &Visualization,
    idx: Index,
    node: &LayoutNode,
    viewport: &Viewport,
    wrap: &WrapSettings,
) -> Group {
    let (cx, cy) = viewport.project(node.x, node.y);
    let on_path = vis.highlight.contains_node(idx);
    let group = Group::new().set("id", node.id.as_str());
    match node.kind {
        NodeKind::Question => {
            let mut circle = Circle::new()
                .set("cx", cx)
                .set("cy", cy)
                .set("r", QUESTION_RADIUS)
                .set("fill", if on_path { QUESTION_ON_PATH_COLOR } else { QUESTION_COLOR });
            if on_path {
                circle = circle.set("stroke", PATH_COLOR).set("stroke-width", 4);
            }
            group
                .add(circle)
                .add(label(&wrap.question, &node.label, cx, cy, 9.0, "white", on_path))
        }
        NodeKind::Option => {
            let color = if on_path { PATH_COLOR } else { OPTION_COLOR };
            let mut text = label(&wrap.option, &node.label, cx, cy, 10.0, color, on_path);
            if on_path {
                text = text.set("text-decoration", "underline");
            }
            group.add(text)
        }
        NodeKind::Recommendation => {
            let is_final = vis.highlight.is_final_recommendation(idx);
            let half = RECOMMENDATION_SIZE / 2.0;
            let mut square = Rectangle::new()
                .set("x", cx - half)
                .set("y", cy - half)
                .set("width", RECOMMENDATION_SIZE)
                .set("height", RECOMMENDATION_SIZE)
                .set("fill", if is_final { FINAL_RECOMMENDATION_COLOR } else { RECOMMENDATION_COLOR });
            if is_final {
                square = square.set("stroke", PATH_COLOR).set("stroke-width", 4);
            }
            let text = node.full_text.as_deref().unwrap_or(&node.label);
            let refs = node.references.join(", ");
            let group = group
                .add(square)
                .add(label(&wrap.recommendation, text, cx, cy, 8.0, "black", is_final));
            if refs.is_empty() {
                group
            } else {
                group.add(
                    Text::new(refs)
                        .set("x", cx)
                        .set("y", cy + half + 12.0)
                        .set("font-size", 8.0)
                        .set("font-style", "italic")
                        .set("text-anchor", "middle")
                        .set("fill", "#555555"),
                )
            }
        }
    }
}

/// Multi-line label centred on (cx, cy), one text element per line.
fn label(budget: &WrapBudget, text: &str, cx: f64, cy: f64, font_size: f64, color: &str, bold: bool) -> Group {
    let lines = budget.wrap(text);
    let line_height = font_size * 1.2;
    let top = cy - (lines.len().saturating_sub(1) as f64) * line_height / 2.0;
    let mut group = Group::new()
        .set("font-size", font_size)
        .set("font-family", "sans-serif")
        .set("text-anchor", "middle")
        .set("dominant-baseline", "middle")
        .set("fill", color);
    if bold {
        group = group.set("font-weight", "bold");
    }
    for (i, line) in lines.into_iter().enumerate() {
        group = group.add(
            Text::new(line)
                .set("x", cx)
                .set("y", top + i as f64 * line_height),
        );
    }
    group
}

fn title(text: &str, vis: &Visualization, settings: &SvgSettings) -> Text {
    let full = match &vis.situation {
        Some(situation) => format!("{text}: {situation}"),
        None => text.to_string(),
    };
    Text::new(full)
        .set("x", f64::from(settings.width) / 2.0)
        .set("y", TITLE_SPACE / 2.0)
        .set("font-size", 18.0)
        .set("font-weight", "bold")
        .set("font-family", "sans-serif")
        .set("text-anchor", "middle")
}

fn legend(settings: &SvgSettings) -> Group {
    let y = f64::from(settings.height) - LEGEND_SPACE / 2.0;
    let entries = [
        (QUESTION_COLOR, "Question"),
        (RECOMMENDATION_COLOR, "Recommendation"),
        (FINAL_RECOMMENDATION_COLOR, "Selected recommendation"),
        (PATH_COLOR, "Decision path"),
    ];
    let mut group = Group::new().set("id", "legend");
    for (i, (color, name)) in entries.into_iter().enumerate() {
        let x = MARGIN + i as f64 * 200.0;
        group = group
            .add(
                Rectangle::new()
                    .set("x", x)
                    .set("y", y - 6.0)
                    .set("width", 12)
                    .set("height", 12)
                    .set("fill", color),
            )
            .add(
                Text::new(name)
                    .set("x", x + 18.0)
                    .set("y", y)
                    .set("font-size", 11.0)
                    .set("font-family", "sans-serif")
                    .set("dominant-baseline", "middle"),
            );
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::AdvisorService;
    use crate::config::Settings;
    use crate::domain::embedded_tree;
    use std::sync::Arc;

    fn service() -> AdvisorService {
        AdvisorService::new(Arc::new(embedded_tree().unwrap()), Arc::new(Settings::default()))
    }

    #[test]
    fn given_resolved_path_when_rendering_svg_then_marks_final_recommendation() {
        let service = service();
        let answers: Vec<String> = ["cystite_aigue", "non", "non"].iter().map(|s| s.to_string()).collect();
        let resolution = service.resolve(&answers).unwrap();
        let vis = service.visualize(&resolution.path);
        let settings = Settings::default();

        let rendered = render_svg(&vis, &settings.svg, &settings.wrap).to_string();

        assert!(rendered.starts_with("<svg"));
        assert_eq!(rendered.matches(FINAL_RECOMMENDATION_COLOR).count(), 2, "one square plus legend");
        assert!(rendered.contains(PATH_COLOR));
        assert!(rendered.contains("cystite_aigue"));
    }

    #[test]
    fn given_full_tree_when_rendering_svg_then_nothing_is_highlighted() {
        let service = service();
        let vis = service.visualize_full();
        let settings = Settings::default();

        let rendered = render_svg(&vis, &settings.svg, &settings.wrap).to_string();

        assert_eq!(rendered.matches("stroke-width=\"5\"").count(), 0);
        assert_eq!(rendered.matches(RECOMMENDATION_COLOR).count(), 13, "12 squares plus legend");
    }

    #[test]
    fn given_width_beyond_i32_when_rendering_svg_then_view_box_keeps_it() {
        let vis = service().visualize_full();
        let settings = SvgSettings {
            width: 3_000_000_000,
            ..SvgSettings::default()
        };

        let rendered = render_svg(&vis, &settings, &WrapSettings::default()).to_string();

        assert!(rendered.contains("viewBox=\"0 0 3000000000 800\""));
    }

    #[test]
    fn given_point_inside_range_when_projecting_then_lands_inside_canvas() {
        let viewport = Viewport {
            x_min: -15.0,
            x_max: 15.0,
            y_min: -20.0,
            y_max: 2.0,
            width: 1200.0,
            height: 800.0,
        };
        let (x, y) = viewport.project(0.0, 0.0);
        assert!((x - 600.0).abs() < 1e-9);
        assert!(y > TITLE_SPACE && y < 800.0);
        let (left, _) = viewport.project(-15.0, 0.0);
        assert!((left - MARGIN).abs() < 1e-9);
    }
}
