//! Antibiotic therapy advisor for urinary tract infections.
//!
//! Layers, innermost first: `domain` (decision tree, questionnaire, layout,
//! highlighting), `application` (advisor service and renderers),
//! `infrastructure` (filesystem, interactive selection, wiring) and `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
