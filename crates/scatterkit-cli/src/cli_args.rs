//! CLI argument definitions for the scatterkit command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use scatterkit_graph::{Channel, LayeringStrategy, MixBy};

/// scatterkit - Voronoi image-scatter graph synthesis
#[derive(Parser)]
#[command(name = "scatterkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Log pipeline stages (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Configuration overrides shared by assembling commands.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct OverrideArgs {
    /// Layering strategy (coordinates, simple, blended, simple_alpha, layered, overlapping)
    #[arg(short, long)]
    pub layering: Option<LayeringStrategy>,

    /// Seed for randomized parameters
    #[arg(long)]
    pub seed: Option<u32>,

    /// Classify images into PBR channels
    #[arg(long)]
    pub pbr: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Classify image names into channels
    Classify {
        /// Image file names
        #[arg(required = true)]
        names: Vec<String>,

        /// Preferences file supplying the keyword table
        #[arg(long)]
        prefs: Option<PathBuf>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Assemble a scatter graph from a job file
    Assemble {
        /// Job file (textures and configuration)
        #[arg(short, long)]
        job: PathBuf,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// Output graph file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preferences file supplying the keyword table
        #[arg(long)]
        prefs: Option<PathBuf>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Merge the outputs of several graphs with a noise blend
    Blend {
        /// Graph files, in order (at least two)
        #[arg(short, long = "graph", required = true)]
        graphs: Vec<PathBuf>,

        /// Output grouping policy (name, common_name, order, first)
        #[arg(long, default_value = "common_name")]
        mix_by: MixBy,

        /// Output graph file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Scatter image nodes of a material graph into its shader
    Scatter {
        /// Material graph file
        #[arg(short, long)]
        material: PathBuf,

        /// Image node names to scatter (default: every image node)
        #[arg(short, long)]
        select: Vec<String>,

        /// Job file supplying the configuration
        #[arg(short, long)]
        job: Option<PathBuf>,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// Keep the scattered image nodes
        #[arg(long)]
        keep_images: bool,

        /// Output material file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preferences file supplying the keyword table
        #[arg(long)]
        prefs: Option<PathBuf>,
    },

    /// List a scatter graph's images, or replace a scatter node with them
    Unscatter {
        /// Scatter graph, or material graph with --node
        #[arg(short, long)]
        graph: PathBuf,

        /// Scatter node to replace inside the material graph
        #[arg(short, long)]
        node: Option<String>,

        /// Output material file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Reassemble a scatter graph's images with new settings
    Rescatter {
        /// Scatter graph file
        #[arg(short, long)]
        graph: PathBuf,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// Output graph file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preferences file supplying the keyword table
        #[arg(long)]
        prefs: Option<PathBuf>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// List the builtin template library
    Templates {
        /// Print one template's graph (by name or content hash)
        #[arg(long)]
        show: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Show or edit classifier keywords and the bake name template
    Keywords {
        /// Preferences file
        #[arg(long)]
        prefs: PathBuf,

        /// Channel to edit
        #[arg(long, requires = "set")]
        channel: Option<Channel>,

        /// Comma separated keywords for --channel
        #[arg(long, requires = "channel")]
        set: Option<String>,

        /// Bake file name template ({C}, {G}, {L}, {M}, {N})
        #[arg(long)]
        bake_template: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}
