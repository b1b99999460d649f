//! Scatter command implementation
//!
//! Scatters image nodes of a material graph and wires the result into the
//! material's surface shader.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Result};
use colored::Colorize;
use scatterkit_graph::{Graph, KeywordTable, NodeId, ScatterConfig};
use scatterkit_synth::{builtin_library, scatter_into_material, Assembler, ShaderWiring};

use super::assemble::Overrides;
use super::coded;
use crate::input::{load_graph, load_job, load_preferences, write_json, Job};

/// Resolves node names to ids. An empty list selects every image node.
pub fn select_images(host: &Graph, names: &[String]) -> Result<Vec<NodeId>> {
    if names.is_empty() {
        let all: Vec<NodeId> = host
            .nodes()
            .filter(|n| n.kind.image().is_some())
            .map(|n| n.id)
            .collect();
        if all.is_empty() {
            bail!("material graph '{}' has no image nodes", host.name);
        }
        return Ok(all);
    }
    names
        .iter()
        .map(|name| {
            host.find(name)
                .ok_or_else(|| anyhow!("material graph '{}' has no node '{}'", host.name, name))
        })
        .collect()
}

/// Scatters `selection` inside `host`. Returns the scatter node's name.
pub fn scatter_material(
    host: &mut Graph,
    selection: &[NodeId],
    config: &ScatterConfig,
    keywords: &KeywordTable,
    options: &ShaderWiring,
) -> Result<String> {
    let library = builtin_library().map_err(coded)?;
    let assembler = Assembler::new(&library, keywords);
    let node = scatter_into_material(host, selection, &assembler, config, options).map_err(coded)?;
    host.node(node)
        .map(|n| n.name.clone())
        .ok_or_else(|| anyhow!("scatter node vanished from '{}'", host.name))
}

/// Run the scatter command
///
/// # Arguments
/// * `material_path` - Material graph file
/// * `select` - Image node names (default: every image node)
/// * `job_path` - Optional job file supplying the configuration
/// * `overrides` - Command-line configuration overrides
/// * `keep_images` - Keep the scattered image nodes in the material
/// * `output` - Output path (default: stdout)
/// * `prefs` - Optional preferences file
pub fn run(
    material_path: &Path,
    select: &[String],
    job_path: Option<&Path>,
    overrides: &Overrides,
    keep_images: bool,
    output: Option<&Path>,
    prefs: Option<&Path>,
) -> Result<ExitCode> {
    let mut host = load_graph(material_path)?;
    let mut job = match job_path {
        Some(path) => load_job(path)?,
        None => Job::default(),
    };
    overrides.apply(&mut job);
    let preferences = load_preferences(prefs)?;
    let selection = select_images(&host, select)?;
    let options = ShaderWiring {
        remove_images: !keep_images,
    };
    let name = scatter_material(&mut host, &selection, &job.config, &preferences.keywords, &options)?;

    write_json(&host, output)?;
    if output.is_some() {
        println!(
            "{} Scattered {} image(s) into '{}' as '{}'",
            "SUCCESS".green().bold(),
            selection.len(),
            host.name,
            name
        );
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scatterkit_graph::node::ImageNode;
    use scatterkit_graph::{NodeKind, TextureDescriptor};

    fn material() -> Graph {
        let mut host = Graph::new("Stone");
        let bsdf = host.add_node("Principled BSDF", NodeKind::PrincipledBsdf);
        let out = host.add_node("Material Output", NodeKind::MaterialOutput);
        host.link(bsdf, "BSDF", out, "Surface").unwrap();
        for name in ["a.png", "b.png"] {
            host.add_node(name, NodeKind::ImageTexture(ImageNode::from(&TextureDescriptor::new(name))));
        }
        host
    }

    #[test]
    fn empty_selection_takes_every_image() {
        let host = material();
        assert_eq!(select_images(&host, &[]).unwrap().len(), 2);
        assert!(select_images(&host, &["c.png".to_string()]).is_err());
        assert!(select_images(&Graph::new("Bare"), &[]).is_err());
    }

    #[test]
    fn scatter_replaces_selected_images() {
        let mut host = material();
        let selection = select_images(&host, &["a.png".to_string()]).unwrap();
        let name = scatter_material(
            &mut host,
            &selection,
            &ScatterConfig::default(),
            &KeywordTable::default(),
            &ShaderWiring::default(),
        )
        .unwrap();
        assert_eq!(name, "Scatter simple");
        assert!(host.find("a.png").is_none());
        assert!(host.find("b.png").is_some());
        assert!(host.validate().is_empty());
    }
}
