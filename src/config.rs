//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/uti-advisor/uti-advisor.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `UTI_ADVISOR__*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::layout::{
    LayoutParams, BRANCH_CONTRACTION, RECOMMENDATION_LABEL_CHARS, VERTICAL_SPACING,
};
use crate::domain::WrapBudget;

const APP_NAME: &str = "uti-advisor";
const ENV_PREFIX: &str = "UTI_ADVISOR";

/// Interactive selection backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    /// Fuzzy picker
    #[default]
    Skim,
    /// Numbered list on stdin
    Prompt,
}

/// Layout engine settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutSettings {
    /// Width allotted to the root question's options
    pub branch_width: f64,
    /// Width factor applied per nested question
    pub contraction: f64,
    /// Distance between two levels
    pub vertical_spacing: f64,
    /// Recommendation labels are shortened beyond this many characters
    pub recommendation_label_chars: usize,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            branch_width: 10.0,
            contraction: BRANCH_CONTRACTION,
            vertical_spacing: VERTICAL_SPACING,
            recommendation_label_chars: RECOMMENDATION_LABEL_CHARS,
        }
    }
}

impl LayoutSettings {
    pub fn params(&self) -> LayoutParams {
        LayoutParams {
            branch_width: self.branch_width,
            contraction: self.contraction,
            vertical_spacing: self.vertical_spacing,
            label_chars: self.recommendation_label_chars,
            ..LayoutParams::default()
        }
    }
}

/// Wrapping budgets per node kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WrapSettings {
    pub question: WrapBudget,
    pub option: WrapBudget,
    pub recommendation: WrapBudget,
}

impl Default for WrapSettings {
    fn default() -> Self {
        Self {
            question: WrapBudget::new(30, 3),
            option: WrapBudget::new(20, 2),
            recommendation: WrapBudget::new(20, 4),
        }
    }
}

/// SVG export settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SvgSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for SvgSettings {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            title: "Decision tree - antibiotic therapy for urinary tract infections".into(),
        }
    }
}

/// Unified configuration for uti-advisor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    /// Decision tree file (TOML or JSON) replacing the embedded one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_file: Option<PathBuf>,
    /// Interactive selection backend
    pub selector: SelectorKind,
    pub layout: LayoutSettings,
    pub wrap: WrapSettings,
    pub svg: SvgSettings,
}

/// Get the XDG config directory for uti-advisor.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{APP_NAME}.toml")))
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; it must exist
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), explicit)
    }

    /// Load settings from the given global and explicit config files.
    ///
    /// The global file is optional, the explicit one is required when given.
    pub fn load_from(global: Option<&Path>, explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut builder = Self::seed_defaults(Config::builder()).map_err(config_err)?;

        if let Some(global_path) = global {
            debug!("global config: {}", global_path.display());
            builder = builder.add_source(
                File::from(global_path)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            debug!("explicit config: {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.expand_paths();
        settings.validate()?;
        Ok(settings)
    }

    /// Register the compiled defaults as the lowest layer, key by key, so a
    /// file or env var may override a single key of a section.
    fn seed_defaults(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Settings::default();
        let selector = match defaults.selector {
            SelectorKind::Skim => "skim",
            SelectorKind::Prompt => "prompt",
        };
        let mut builder = builder
            .set_default("selector", selector)?
            .set_default("layout.branch_width", defaults.layout.branch_width)?
            .set_default("layout.contraction", defaults.layout.contraction)?
            .set_default("layout.vertical_spacing", defaults.layout.vertical_spacing)?
            .set_default(
                "layout.recommendation_label_chars",
                defaults.layout.recommendation_label_chars as u64,
            )?
            .set_default("svg.width", u64::from(defaults.svg.width))?
            .set_default("svg.height", u64::from(defaults.svg.height))?
            .set_default("svg.title", defaults.svg.title.clone())?;

        let wrap = &defaults.wrap;
        for (kind, budget) in [
            ("question", wrap.question),
            ("option", wrap.option),
            ("recommendation", wrap.recommendation),
        ] {
            builder = builder
                .set_default(format!("wrap.{kind}.max_chars"), budget.max_chars as u64)?
                .set_default(format!("wrap.{kind}.max_lines"), budget.max_lines as u64)?;
        }
        Ok(builder)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(path) = &self.tree_file {
            let raw = path.to_string_lossy();
            let expanded = shellexpand::full(raw.as_ref())
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            self.tree_file = Some(PathBuf::from(expanded));
        }
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        let layout = &self.layout;
        if !(layout.branch_width.is_finite() && layout.branch_width > 0.0) {
            return Err(ApplicationError::Config {
                message: format!("layout.branch_width must be positive, got {}", layout.branch_width),
            });
        }
        if !(layout.contraction.is_finite() && layout.contraction > 0.0 && layout.contraction <= 1.0) {
            return Err(ApplicationError::Config {
                message: format!("layout.contraction must be in (0, 1], got {}", layout.contraction),
            });
        }
        if !(layout.vertical_spacing.is_finite() && layout.vertical_spacing > 0.0) {
            return Err(ApplicationError::Config {
                message: format!(
                    "layout.vertical_spacing must be positive, got {}",
                    layout.vertical_spacing
                ),
            });
        }
        for (kind, budget) in [
            ("question", &self.wrap.question),
            ("option", &self.wrap.option),
            ("recommendation", &self.wrap.recommendation),
        ] {
            if budget.max_chars == 0 || budget.max_lines == 0 {
                return Err(ApplicationError::Config {
                    message: format!("wrap.{kind} needs non-zero max_chars and max_lines"),
                });
            }
        }
        if self.svg.width == 0 || self.svg.height == 0 {
            return Err(ApplicationError::Config {
                message: "svg.width and svg.height must be non-zero".into(),
            });
        }
        Ok(())
    }

    /// Config file content with all defaults spelled out.
    pub fn template() -> Result<String, ApplicationError> {
        toml::to_string_pretty(&Self::default()).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }

    /// Current settings rendered as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}
