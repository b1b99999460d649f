//! Templates command implementation
//!
//! Lists the builtin template library, or prints one template's graph.

use std::process::ExitCode;

use anyhow::{anyhow, Result};
use colored::Colorize;
use scatterkit_graph::{Direction, TemplateLibrary};
use scatterkit_synth::builtin_library;
use serde::Serialize;

use super::coded;
use crate::input::write_json;

/// Template entry for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateEntry {
    pub name: String,
    pub hash: String,
    pub inputs: usize,
    pub outputs: usize,
    pub nodes: usize,
}

/// Describes every template in `library`, sorted by name.
pub fn list_templates(library: &TemplateLibrary) -> Vec<TemplateEntry> {
    library
        .iter()
        .map(|t| {
            let count = |direction| t.schema().iter().filter(|p| p.direction == direction).count();
            TemplateEntry {
                name: t.name().to_string(),
                hash: t.hash().to_string(),
                inputs: count(Direction::Input),
                outputs: count(Direction::Output),
                nodes: t.graph().node_count(),
            }
        })
        .collect()
}

/// Run the templates command
///
/// # Arguments
/// * `show` - Template name or content hash to print as JSON
/// * `json_output` - Print the listing as JSON
pub fn run(show: Option<&str>, json_output: bool) -> Result<ExitCode> {
    let library = builtin_library().map_err(coded)?;

    if let Some(key) = show {
        let template = library
            .get(key)
            .or_else(|| library.get_by_hash(key))
            .ok_or_else(|| anyhow!("no template named or hashed '{}'", key))?;
        write_json(&template.instantiate(), None)?;
        return Ok(ExitCode::SUCCESS);
    }

    let entries = list_templates(&library);
    if json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(ExitCode::SUCCESS);
    }
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for entry in &entries {
        println!(
            "{:width$}  {}  {} in / {} out, {} nodes",
            entry.name.cyan(),
            entry.hash[..12].dimmed(),
            entry.inputs,
            entry.outputs,
            entry.nodes,
            width = width
        );
    }
    println!("\n{} template(s)", library.len());
    Ok(ExitCode::SUCCESS)
}
