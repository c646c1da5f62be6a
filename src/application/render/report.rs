//! Machine-readable JSON reports.

use serde::Serialize;

use crate::application::services::{Consultation, Visualization};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DecisionPath, LayoutNode, Recommendation};

#[derive(Debug, Serialize)]
pub struct NodeReport<'a> {
    #[serde(flatten)]
    pub node: &'a LayoutNode,
    pub on_path: bool,
    #[serde(rename = "final")]
    pub is_final: bool,
}

#[derive(Debug, Serialize)]
pub struct EdgeReport<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub on_path: bool,
}

#[derive(Debug, Serialize)]
pub struct GraphReport<'a> {
    pub situation: Option<&'a str>,
    pub scoped: bool,
    pub nodes: Vec<NodeReport<'a>>,
    pub edges: Vec<EdgeReport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ConsultationReport<'a> {
    pub recommendation: &'a Recommendation,
    pub path: &'a DecisionPath,
    /// Path relative to the scoped tree
    pub scoped_path: &'a DecisionPath,
    pub graph: GraphReport<'a>,
}

pub fn graph_report(vis: &Visualization) -> GraphReport<'_> {
    let nodes = vis
        .graph
        .nodes()
        .map(|(idx, node)| NodeReport {
            node,
            on_path: vis.highlight.contains_node(idx),
            is_final: vis.highlight.is_final_recommendation(idx),
        })
        .collect();
    let edges = vis
        .graph
        .edges()
        .iter()
        .filter_map(|edge| {
            let (source, target) = vis.graph.endpoints(edge)?;
            Some(EdgeReport {
                source: &source.id,
                target: &target.id,
                on_path: vis.highlight.contains_edge(edge),
            })
        })
        .collect();
    GraphReport {
        situation: vis.situation.as_deref(),
        scoped: vis.scoped,
        nodes,
        edges,
    }
}

pub fn consultation_report(consultation: &Consultation) -> ConsultationReport<'_> {
    ConsultationReport {
        recommendation: &consultation.resolution.recommendation,
        path: &consultation.resolution.path,
        scoped_path: &consultation.visualization.path,
        graph: graph_report(&consultation.visualization),
    }
}

/// Pretty-printed JSON.
pub fn to_json<T: Serialize>(value: &T) -> ApplicationResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| ApplicationError::OperationFailed {
        context: "serialize report".to_string(),
        source: Box::new(e),
    })
}
