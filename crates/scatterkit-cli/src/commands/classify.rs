//! Classify command implementation
//!
//! Prints the channel each image name classifies into.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use scatterkit_graph::{Channel, KeywordTable};
use serde::Serialize;

use crate::input::load_preferences;

/// One classified name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub name: String,
    pub channel: Channel,
    /// Lowercase tokens the name was split into.
    pub tokens: Vec<String>,
}

/// Classifies every name with `table`.
pub fn classify_names(names: &[String], table: &KeywordTable) -> Vec<Classification> {
    names
        .iter()
        .map(|name| Classification {
            name: name.clone(),
            channel: scatterkit_synth::classify(name, table),
            tokens: scatterkit_synth::classify::tokens(name, table),
        })
        .collect()
}

/// Run the classify command
///
/// # Arguments
/// * `names` - Image file names
/// * `prefs` - Optional preferences file supplying the keyword table
/// * `json_output` - Whether to print JSON instead of a table
pub fn run(names: &[String], prefs: Option<&Path>, json_output: bool) -> Result<ExitCode> {
    let preferences = load_preferences(prefs)?;
    let results = classify_names(names, &preferences.keywords);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(ExitCode::SUCCESS);
    }

    let width = results.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for result in &results {
        let channel = if result.channel == Channel::Image {
            result.channel.as_str().dimmed()
        } else {
            result.channel.as_str().green().bold()
        };
        println!(
            "{:width$}  {}  {}",
            result.name,
            channel,
            result.tokens.join(" ").dimmed(),
            width = width
        );
    }
    Ok(ExitCode::SUCCESS)
}
