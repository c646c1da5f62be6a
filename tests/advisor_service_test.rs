//! Tests for AdvisorService: questionnaire, consultation and tree loading

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rstest::rstest;
use tempfile::TempDir;

use uti_advisor::application::services::AdvisorService;
use uti_advisor::application::ApplicationError;
use uti_advisor::config::Settings;
use uti_advisor::domain::{embedded_tree, DomainError, NodeKind};
use uti_advisor::infrastructure::traits::{RealFileSystem, SelectionItem, Selector};

/// Mock selector answering from a script and recording the prompts it saw
struct ScriptedSelector {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedSelector {
    fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|s| s.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Selector for ScriptedSelector {
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.answers.lock().unwrap().pop_front() {
            Some(answer) => items
                .iter()
                .find(|item| item.value == answer)
                .cloned()
                .map(Some)
                .ok_or_else(|| format!("no item '{answer}'")),
            None => Ok(None), // User cancelled
        }
    }
}

fn service() -> AdvisorService {
    AdvisorService::new(
        Arc::new(embedded_tree().unwrap()),
        Arc::new(Settings::default()),
    )
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn given_scripted_answers_when_interviewing_then_reaches_fosfomycin() {
    // Arrange
    let service = service();
    let selector = ScriptedSelector::new(&["cystite_aigue", "non", "non"]);

    // Act
    let resolution = service.interview(&selector, &[]).unwrap();

    // Assert
    assert_eq!(resolution.recommendation.text, "Fosfomycine 3g dose unique");
    assert_eq!(resolution.recommendation.references, vec!["p.26"]);
    assert_eq!(resolution.path.len(), 3);
    assert_eq!(
        selector.prompts(),
        vec![
            "What type of infection is suspected?",
            "Is the patient pregnant?",
            "Is there a complication risk?",
        ]
    );
}

#[test]
fn given_preset_answers_when_interviewing_then_prompts_only_for_the_rest() {
    let service = service();
    let selector = ScriptedSelector::new(&["oui"]);

    let resolution = service
        .interview(&selector, &strings(&["pyelonephrite_aigue"]))
        .unwrap();

    assert_eq!(selector.prompts(), vec!["Any signs of severity?"]);
    assert_eq!(resolution.situation(), Some("pyelonephrite_aigue"));
    assert_eq!(resolution.recommendation.references, vec!["p.28"]);
}

#[test]
fn given_cancelled_selection_when_interviewing_then_reports_question() {
    let service = service();
    let selector = ScriptedSelector::new(&["cystite_aigue"]);

    let err = service.interview(&selector, &[]).unwrap_err();

    match err {
        ApplicationError::Cancelled { question_key } => assert_eq!(question_key, "grossesse"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn given_too_many_presets_when_interviewing_then_fails_with_trailing_answers() {
    let service = service();
    let selector = ScriptedSelector::new(&[]);

    let err = service
        .interview(&selector, &strings(&["colonisation", "non", "oui"]))
        .unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::TrailingAnswers { count: 2 })
    ));
    assert!(selector.prompts().is_empty());
}

#[test]
fn given_colonisation_when_consulting_then_final_recommendation_is_highlighted() {
    let service = service();

    let resolution = service.resolve(&strings(&["colonisation"])).unwrap();
    let consultation = service.consult(resolution);

    let vis = &consultation.visualization;
    assert_eq!(consultation.resolution.path.len(), 1);
    assert!(vis.path.is_empty());
    assert!(vis.scoped);
    assert_eq!(vis.graph.nodes_of_kind(NodeKind::Question).count(), 1);
    let final_idx = vis.highlight.final_recommendation().expect("final recommendation");
    assert_eq!(
        vis.graph.node(final_idx).and_then(|n| n.full_text.as_deref()),
        Some(consultation.resolution.recommendation.text.as_str())
    );
}

#[rstest]
#[case(&["cystite_aigue", "non", "non"], 2)]
#[case(&["cystite_recidivante", "répété", "oui"], 2)]
#[case(&["infection_urinaire_masculine", "oui"], 1)]
fn given_complete_answers_when_visualizing_then_exactly_one_final_node(
    #[case] answers: &[&str],
    #[case] scoped_steps: usize,
) {
    let service = service();

    let resolution = service.resolve(&strings(answers)).unwrap();
    let vis = service.visualize(&resolution.path);

    assert_eq!(vis.path.len(), scoped_steps);
    let finals = vis
        .graph
        .nodes()
        .filter(|(idx, _)| vis.highlight.is_final_recommendation(*idx))
        .count();
    assert_eq!(finals, 1);
    assert!(vis.highlight.edge_count() >= 1);
}

#[test]
fn given_unknown_answer_when_resolving_then_lists_expected_options() {
    let service = service();

    let err = service
        .resolve(&strings(&["cystite_aigue", "peut-être"]))
        .unwrap_err();

    match err {
        ApplicationError::Domain(DomainError::UnknownAnswer {
            question_key,
            answer,
            expected,
        }) => {
            assert_eq!(question_key, "grossesse");
            assert_eq!(answer, "peut-être");
            assert!(expected.contains("oui"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================
// Tree loading
// ============================================================

const SMALL_TREE_TOML: &str = r#"
question = "Fever?"
key = "fever"

[[options]]
value = "yes"
recommendation = "See a doctor"
references = ["p.1"]

[[options]]
value = "no"
recommendation = "Rest"
"#;

#[test]
fn given_toml_tree_file_when_loading_then_uses_it() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tree.toml");
    std::fs::write(&path, SMALL_TREE_TOML).unwrap();
    let settings = Settings {
        tree_file: Some(path),
        ..Settings::default()
    };

    let tree = AdvisorService::load_tree(&settings, &RealFileSystem).unwrap();

    assert_eq!(tree.key, "fever");
    assert_eq!(tree.counts().recommendations, 2);
}

#[test]
fn given_json_tree_file_when_loading_then_parses_it() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tree.json");
    let json = r#"{"question": "Fever?", "key": "fever", "options": [
        {"value": "yes", "recommendation": "See a doctor"},
        {"value": "no", "next": {"question": "Cough?", "key": "cough", "options": [
            {"value": "yes", "recommendation": "Syrup"}]}}]}"#;
    std::fs::write(&path, json).unwrap();

    let tree = AdvisorService::load_tree_file(&path, &RealFileSystem).unwrap();

    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.counts().questions, 2);
}

#[rstest]
#[case("tree.yaml", true)]
#[case("missing.toml", false)]
fn given_unusable_tree_file_when_loading_then_fails(#[case] name: &str, #[case] create: bool) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(name);
    if create {
        std::fs::write(&path, SMALL_TREE_TOML).unwrap();
    }

    let err = AdvisorService::load_tree_file(&path, &RealFileSystem).unwrap_err();

    if create {
        assert!(matches!(err, ApplicationError::UnsupportedTreeFormat(_)));
    } else {
        assert!(matches!(err, ApplicationError::TreeFileNotFound(_)));
    }
}

#[test]
fn given_choice_with_both_outcomes_when_loading_then_reports_malformed_choice() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.toml");
    std::fs::write(
        &path,
        r#"
question = "Fever?"
key = "fever"

[[options]]
value = "yes"
recommendation = "See a doctor"

[options.next]
question = "Cough?"
key = "cough"

[[options.next.options]]
value = "yes"
recommendation = "Syrup"
"#,
    )
    .unwrap();

    let err = AdvisorService::load_tree_file(&path, &RealFileSystem).unwrap_err();

    match err {
        ApplicationError::Domain(DomainError::MalformedChoice {
            question_key, value, ..
        }) => {
            assert_eq!(question_key, "fever");
            assert_eq!(value, "yes");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
