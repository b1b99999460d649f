//! Assemble command implementation
//!
//! Builds one scatter graph from a job file and writes it as JSON.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use scatterkit_graph::hash::canonical_hash;
use scatterkit_graph::{Direction, Graph, LayeringStrategy, Preferences};
use scatterkit_synth::{builtin_library, Assembler};
use serde::Serialize;

use super::coded;
use crate::input::{load_job, load_preferences, write_json, Job};

/// Overrides applied on top of the job's configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub layering: Option<LayeringStrategy>,
    pub seed: Option<u32>,
    pub pbr: bool,
}

impl Overrides {
    pub(crate) fn apply(&self, job: &mut Job) {
        if let Some(layering) = self.layering {
            job.config.layering = layering;
        }
        if let Some(seed) = self.seed {
            job.config.seed = seed;
        }
        if self.pbr {
            job.config.use_pbr = true;
        }
    }
}

/// Shape of an assembled graph, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub graph: String,
    pub hash: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub nodes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

impl GraphSummary {
    pub fn of(graph: &Graph, output_path: Option<&Path>) -> Result<Self> {
        Ok(Self {
            graph: graph.name.clone(),
            hash: canonical_hash(graph).context("Failed to hash graph")?,
            inputs: graph.port_names(Direction::Input),
            outputs: graph.port_names(Direction::Output),
            nodes: graph.node_count(),
            output_path: output_path.map(|p| p.display().to_string()),
        })
    }

    pub(crate) fn print(&self) {
        println!("{} {}", "Graph:".cyan().bold(), self.graph);
        println!("{} {}", "Hash:".dimmed(), &self.hash[..16.min(self.hash.len())]);
        println!("{} {}", "Nodes:".dimmed(), self.nodes);
        println!("{} {}", "Inputs:".dimmed(), self.inputs.join(", "));
        println!("{} {}", "Outputs:".dimmed(), self.outputs.join(", "));
        if let Some(path) = &self.output_path {
            println!("{} {}", "Wrote:".dimmed(), path);
        }
    }
}

/// Assembles a job with the builtin template library.
pub fn assemble_job(job: &Job, preferences: &Preferences) -> Result<Graph> {
    let library = builtin_library().map_err(coded)?;
    Assembler::new(&library, &preferences.keywords)
        .assemble(&job.descriptors(), &job.config)
        .map_err(coded)
}

/// Run the assemble command
///
/// # Arguments
/// * `job_path` - Job file with textures and configuration
/// * `overrides` - Command-line configuration overrides
/// * `output` - Graph output path (default: stdout)
/// * `prefs` - Optional preferences file
/// * `json_output` - Print the summary as JSON
pub fn run(
    job_path: &Path,
    overrides: &Overrides,
    output: Option<&Path>,
    prefs: Option<&Path>,
    json_output: bool,
) -> Result<ExitCode> {
    let mut job = load_job(job_path)?;
    overrides.apply(&mut job);
    let preferences = load_preferences(prefs)?;
    let graph = assemble_job(&job, &preferences)?;

    let Some(path) = output else {
        write_json(&graph, None)?;
        return Ok(ExitCode::SUCCESS);
    };
    write_json(&graph, Some(path))?;
    let summary = GraphSummary::of(&graph, Some(path))?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print();
        println!("\n{} Assembled {}", "SUCCESS".green().bold(), job.config.layering);
    }
    Ok(ExitCode::SUCCESS)
}
