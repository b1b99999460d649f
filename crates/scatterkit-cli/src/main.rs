//! scatterkit CLI - Command-line interface for scatter graph synthesis
//!
//! This binary classifies images, assembles scatter graphs from job files,
//! wires them into material graphs, and lists the builtin templates.

mod cli_args;

use std::process::ExitCode;

use clap::Parser;

use cli_args::{Cli, Commands, OverrideArgs};
use scatterkit_cli::commands;
use scatterkit_cli::commands::assemble::Overrides;
use scatterkit_cli::commands::keywords::KeywordEdit;

impl From<OverrideArgs> for Overrides {
    fn from(args: OverrideArgs) -> Self {
        Overrides {
            layering: args.layering,
            seed: args.seed,
            pbr: args.pbr,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let json = matches!(
        cli.command,
        Commands::Classify { json: true, .. }
            | Commands::Assemble { json: true, .. }
            | Commands::Blend { json: true, .. }
            | Commands::Unscatter { json: true, .. }
            | Commands::Rescatter { json: true, .. }
            | Commands::Templates { json: true, .. }
            | Commands::Keywords { json: true, .. }
    );
    if json {
        colored::control::set_override(false);
    }

    let result = match cli.command {
        Commands::Classify { names, prefs, json } => {
            commands::classify::run(&names, prefs.as_deref(), json)
        }
        Commands::Assemble {
            job,
            overrides,
            output,
            prefs,
            json,
        } => commands::assemble::run(
            &job,
            &overrides.into(),
            output.as_deref(),
            prefs.as_deref(),
            json,
        ),
        Commands::Blend {
            graphs,
            mix_by,
            output,
            json,
        } => commands::blend::run(&graphs, mix_by, output.as_deref(), json),
        Commands::Scatter {
            material,
            select,
            job,
            overrides,
            keep_images,
            output,
            prefs,
        } => commands::scatter::run(
            &material,
            &select,
            job.as_deref(),
            &overrides.into(),
            keep_images,
            output.as_deref(),
            prefs.as_deref(),
        ),
        Commands::Unscatter {
            graph,
            node,
            output,
            json,
        } => commands::unscatter::run(&graph, node.as_deref(), output.as_deref(), json),
        Commands::Rescatter {
            graph,
            overrides,
            output,
            prefs,
            json,
        } => commands::unscatter::run_rescatter(
            &graph,
            &overrides.into(),
            output.as_deref(),
            prefs.as_deref(),
            json,
        ),
        Commands::Templates { show, json } => commands::templates::run(show.as_deref(), json),
        Commands::Keywords {
            prefs,
            channel,
            set,
            bake_template,
            json,
        } => commands::keywords::run(
            &prefs,
            &KeywordEdit {
                channel,
                keywords: set,
                bake_template,
            },
            json,
        ),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
