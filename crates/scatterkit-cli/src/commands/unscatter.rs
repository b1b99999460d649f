//! Unscatter and rescatter command implementations
//!
//! `unscatter` lists the images a scatter graph samples, or replaces a
//! scatter node of a material graph with plain image nodes. `rescatter`
//! assembles a scatter graph's images again with new settings.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use colored::Colorize;
use scatterkit_graph::{Graph, KeywordTable, ScatterConfig, TextureDescriptor};
use scatterkit_synth::{
    builtin_library, extract_images, is_scatter_graph, rescatter, unscatter, Assembler,
    UnscatterOptions,
};

use super::assemble::{GraphSummary, Overrides};
use super::coded;
use crate::input::{load_graph, load_preferences, write_json, Job};

/// Images sampled by a scatter graph.
pub fn scatter_images(graph: &Graph) -> Result<Vec<TextureDescriptor>> {
    if !is_scatter_graph(graph) {
        return Err(anyhow!("'{}' is not a scatter graph", graph.name));
    }
    Ok(extract_images(graph))
}

/// Replaces the node named `node` in `host` with its images. Returns the
/// names of the created image nodes.
pub fn unscatter_node(host: &mut Graph, node: &str) -> Result<Vec<String>> {
    let id = host
        .find(node)
        .ok_or_else(|| anyhow!("graph '{}' has no node '{}'", host.name, node))?;
    let created = unscatter(host, id, &UnscatterOptions::default()).map_err(coded)?;
    Ok(created
        .iter()
        .filter_map(|&id| host.node(id).map(|n| n.name.clone()))
        .collect())
}

/// Reassembles `graph` under `config`.
pub fn rescatter_graph(graph: &Graph, config: &ScatterConfig, keywords: &KeywordTable) -> Result<Graph> {
    let library = builtin_library().map_err(coded)?;
    rescatter(graph, &Assembler::new(&library, keywords), config).map_err(coded)
}

/// Run the unscatter command
///
/// # Arguments
/// * `graph_path` - Scatter graph, or material graph when `node` is given
/// * `node` - Scatter node to replace inside the material graph
/// * `output` - Where to write the edited material graph (default: stdout)
/// * `json_output` - Print results as JSON
pub fn run(
    graph_path: &Path,
    node: Option<&str>,
    output: Option<&Path>,
    json_output: bool,
) -> Result<ExitCode> {
    let mut graph = load_graph(graph_path)?;

    let Some(node) = node else {
        let images = scatter_images(&graph)?;
        if json_output {
            println!("{}", serde_json::to_string_pretty(&images)?);
        } else {
            for tex in &images {
                println!("{}  {}", tex.image, tex.channel.as_str().dimmed());
            }
        }
        return Ok(ExitCode::SUCCESS);
    };

    let created = unscatter_node(&mut graph, node)?;
    write_json(&graph, output)?;
    if output.is_some() {
        if json_output {
            println!("{}", serde_json::to_string_pretty(&created)?);
        } else {
            println!(
                "{} Replaced '{}' with {} image node(s)",
                "SUCCESS".green().bold(),
                node,
                created.len()
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Run the rescatter command
///
/// # Arguments
/// * `graph_path` - Scatter graph to reassemble
/// * `overrides` - New configuration settings
/// * `output` - Output path (default: stdout)
/// * `prefs` - Optional preferences file
/// * `json_output` - Print the summary as JSON
pub fn run_rescatter(
    graph_path: &Path,
    overrides: &Overrides,
    output: Option<&Path>,
    prefs: Option<&Path>,
    json_output: bool,
) -> Result<ExitCode> {
    let graph = load_graph(graph_path)?;
    let preferences = load_preferences(prefs)?;
    let mut job = Job::default();
    overrides.apply(&mut job);
    let fresh = rescatter_graph(&graph, &job.config, &preferences.keywords)?;

    let Some(path) = output else {
        write_json(&fresh, None)?;
        return Ok(ExitCode::SUCCESS);
    };
    write_json(&fresh, Some(path))?;
    let summary = GraphSummary::of(&fresh, Some(path))?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print();
    }
    Ok(ExitCode::SUCCESS)
}
