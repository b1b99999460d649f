//! Blend command implementation
//!
//! Loads several graphs, places each as a group node in a new graph, and
//! merges their outputs with a noise blend node.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Result};
use colored::Colorize;
use scatterkit_graph::{Graph, MixBy, NodeKind, SocketRef};
use scatterkit_synth::{builtin_library, noise_blend};

use super::assemble::GraphSummary;
use super::coded;
use crate::input::{load_graph, write_json};

/// Name of the graph holding the blended groups.
pub const BLEND_GRAPH: &str = "Blend";

/// Blends `graphs` into a new graph whose outputs are the merged groups.
pub fn blend_graphs(graphs: Vec<Graph>, mix_by: MixBy) -> Result<Graph> {
    if graphs.len() < 2 {
        bail!("blend needs at least two graphs, got {}", graphs.len());
    }
    let library = builtin_library().map_err(coded)?;
    let mut host = Graph::new(BLEND_GRAPH);
    let mut nodes = Vec::with_capacity(graphs.len());
    for (index, graph) in graphs.into_iter().enumerate() {
        let name = host.unique_name(&graph.name);
        let id = host.add_node(&name, NodeKind::Group { graph: Box::new(graph) });
        host.place(id, [0.0, -400.0 * index as f32]);
        nodes.push(id);
    }

    let blend = noise_blend(&mut host, &library, &nodes, mix_by).map_err(coded)?;
    let outputs: Vec<_> = host
        .node(blend)
        .map(|n| n.outputs.iter().map(|s| (s.name.clone(), s.port_type)).collect())
        .unwrap_or_default();
    for (name, port_type) in outputs {
        host.add_output(name.as_str(), port_type).map_err(coded)?;
        host.connect(SocketRef::node(blend, name.as_str()), SocketRef::output(name.as_str()))
            .map_err(coded)?;
    }
    Ok(host)
}

/// Run the blend command
///
/// # Arguments
/// * `graph_paths` - Graph files to blend, in order
/// * `mix_by` - Output grouping policy
/// * `output` - Output path (default: stdout)
/// * `json_output` - Print the summary as JSON
pub fn run(
    graph_paths: &[PathBuf],
    mix_by: MixBy,
    output: Option<&Path>,
    json_output: bool,
) -> Result<ExitCode> {
    let graphs = graph_paths
        .iter()
        .map(|p| load_graph(p))
        .collect::<Result<Vec<_>>>()?;
    let blended = blend_graphs(graphs, mix_by)?;

    let Some(path) = output else {
        write_json(&blended, None)?;
        return Ok(ExitCode::SUCCESS);
    };
    write_json(&blended, Some(path))?;
    let summary = GraphSummary::of(&blended, Some(path))?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print();
        println!(
            "\n{} Blended {} graph(s) by {}",
            "SUCCESS".green().bold(),
            graph_paths.len(),
            mix_by.as_str()
        );
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::assemble::assemble_job;
    use crate::input::{Job, TextureEntry};
    use pretty_assertions::assert_eq;
    use scatterkit_graph::{Direction, Preferences};

    fn scatter(image: &str) -> Graph {
        let job = Job {
            textures: vec![TextureEntry::Name(image.to_string())],
            ..Job::default()
        };
        assemble_job(&job, &Preferences::default()).unwrap()
    }

    #[test]
    fn common_outputs_are_merged() {
        let g = blend_graphs(vec![scatter("a.png"), scatter("b.png")], MixBy::CommonName).unwrap();
        assert_eq!(g.port_names(Direction::Output), vec!["Image", "Random Color"]);
        assert!(g.find("Scatter simple").is_some());
        assert!(g.find("Scatter simple.001").is_some());
        assert!(g.validate().is_empty());
    }

    #[test]
    fn a_single_graph_is_rejected() {
        assert!(blend_graphs(vec![scatter("a.png")], MixBy::Name).is_err());
    }
}
