//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::render::{
    consultation_report, decision_tree, graph_report, highlighted_tree, render_svg, to_json,
    transcript,
};
use crate::application::services::{AdvisorService, Consultation, Visualization};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::{InfraError, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };
    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Validate { file } => validate(file),
        Commands::Config { command } => config(cli, command),
        Commands::Consult {
            answers,
            svg,
            json,
            no_graph,
        } => consult(&container(cli)?, answers, svg.as_deref(), *json, *no_graph),
        Commands::Tree { situation } => tree(&container(cli)?, situation.as_deref()),
        Commands::Situations => situations(&container(cli)?),
        Commands::Layout { situation, answers } => {
            layout(&container(cli)?, situation.as_deref(), answers)
        }
        Commands::Render { answers, output } => render(&container(cli)?, answers, output),
    }
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(tree) = &cli.tree {
        settings.tree_file = Some(tree.clone());
    }
    if let Some(selector) = cli.selector {
        settings.selector = selector;
    }
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings))
}

#[instrument(skip(container))]
fn consult(
    container: &ServiceContainer,
    answers: &[String],
    svg: Option<&Path>,
    json: bool,
    no_graph: bool,
) -> CliResult<()> {
    let advisor = container.advisor()?;
    let resolution = advisor.interview(container.selector.as_ref(), answers)?;
    let consultation = advisor.consult(resolution);

    if json {
        output::info(&to_json(&consultation_report(&consultation))?);
    } else {
        print_consultation(&consultation, no_graph);
    }
    if let Some(path) = svg {
        write_svg(container, &consultation.visualization, path)?;
    }
    Ok(())
}

fn print_consultation(consultation: &Consultation, no_graph: bool) {
    let resolution = &consultation.resolution;
    output::header("Recommendation");
    output::success(&resolution.recommendation.text);
    if !resolution.recommendation.references.is_empty() {
        output::detail(&format!(
            "References: {}",
            resolution.recommendation.references.join(", ")
        ));
    }
    if let Some(situation) = resolution.situation() {
        output::action("Clinical situation", situation);
    }

    output::info("");
    output::header("Decision path");
    for line in transcript(&resolution.path) {
        output::info(&line);
    }

    if !no_graph {
        output::info("");
        output::header("Decision tree");
        output::info(&highlighted_tree(&consultation.visualization));
    }
}

#[instrument(skip(container))]
fn tree(container: &ServiceContainer, situation: Option<&str>) -> CliResult<()> {
    let advisor = container.advisor()?;
    match situation {
        Some(situation) => {
            let vis = advisor.visualize_situation(situation);
            if !vis.scoped {
                output::warning(&format!(
                    "unknown situation '{}', showing the full tree",
                    situation
                ));
            }
            output::info(&decision_tree(&vis.tree));
        }
        None => output::info(&decision_tree(advisor.tree())),
    }
    Ok(())
}

fn situations(container: &ServiceContainer) -> CliResult<()> {
    let advisor = container.advisor()?;
    output::header(&advisor.tree().question);
    for situation in advisor.situations() {
        output::detail(situation);
    }
    Ok(())
}

#[instrument(skip(container))]
fn layout(container: &ServiceContainer, situation: Option<&str>, answers: &[String]) -> CliResult<()> {
    let advisor = container.advisor()?;
    let vis = match situation {
        _ if !answers.is_empty() => {
            let resolution = advisor.resolve(answers)?;
            advisor.visualize(&resolution.path)
        }
        Some(situation) => advisor.visualize_situation(situation),
        None => advisor.visualize_full(),
    };
    output::info(&to_json(&graph_report(&vis))?);
    Ok(())
}

#[instrument(skip(container))]
fn render(container: &ServiceContainer, answers: &[String], path: &Path) -> CliResult<()> {
    let advisor = container.advisor()?;
    let resolution = advisor.resolve(answers)?;
    let vis = advisor.visualize(&resolution.path);
    write_svg(container, &vis, path)?;
    output::success(&resolution.recommendation.text);
    Ok(())
}

fn write_svg(container: &ServiceContainer, vis: &Visualization, path: &Path) -> CliResult<()> {
    let settings = &container.settings;
    let document = render_svg(vis, &settings.svg, &settings.wrap);
    write_file(container.fs.as_ref(), path, &document.to_string())?;
    output::action("SVG written", &path.display());
    Ok(())
}

fn write_file(fs: &dyn FileSystem, path: &Path, content: &str) -> Result<(), InfraError> {
    fs.ensure_parent(path)
        .map_err(|e| InfraError::io(format!("create parent of {}", path.display()), e))?;
    fs.write(path, content)
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))
}

#[instrument]
fn validate(file: &Path) -> CliResult<()> {
    let tree = AdvisorService::load_tree_file(file, &RealFileSystem)?;
    let counts = tree.counts();
    output::success(&format!("{} is a valid decision tree", file.display()));
    output::detail(&format!("questions:       {}", counts.questions));
    output::detail(&format!("options:         {}", counts.options));
    output::detail(&format!("recommendations: {}", counts.recommendations));
    output::detail(&format!("depth:           {}", tree.depth()));
    Ok(())
}

fn config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "" } else { " (not found)" };
                    output::action("global", &format!("{}{}", path.display(), state));
                }
                None => output::warning("no home directory, global config unavailable"),
            }
            if let Some(path) = &cli.config {
                output::action("explicit", &path.display());
            }
        }
        ConfigCommands::Init { file, force } => {
            let target = file
                .clone()
                .or_else(global_config_path)
                .ok_or_else(|| CliError::Usage("no config path available, pass a file".into()))?;
            let fs = RealFileSystem;
            if fs.exists(&target) && !force {
                return Err(CliError::Usage(format!(
                    "{} already exists (use --force to overwrite)",
                    target.display()
                )));
            }
            write_file(&fs, &target, &Settings::template()?)?;
            output::success(&format!("created {}", target.display()));
        }
    }
    Ok(())
}
