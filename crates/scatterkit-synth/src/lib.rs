//! Scatter graph synthesis.
//!
//! This crate turns a set of classified images plus a [`ScatterConfig`]
//! into one self-contained node graph that scatters those images across
//! Voronoi cells, and wires such graphs into host materials.
//!
//! # Overview
//!
//! - [`classify`] maps file names to PBR channels through an ordered
//!   keyword table; the rightmost matching token wins
//! - [`templates`] authors the builtin fragment library every assembly
//!   instantiates from
//! - [`assemble`] drives the six layering strategies (`coordinates`,
//!   `simple`, `blended`, `simple_alpha`, `layered`, `overlapping`)
//! - [`prune`] removes the nodes and ports of disabled features
//! - [`blend`] merges several finished graphs with a noise mask
//! - [`shader`] replaces image nodes in a material with a scatter group
//! - [`unscatter`] reverses that, and reassembles with new settings
//! - [`host`] declares the UV, bake and preference services a host provides
//! - [`bake`] wires bake results into a scatter group and clears them again
//!
//! # Determinism
//!
//! Assembly is deterministic. All randomness flows from
//! `ScatterConfig::seed` through PCG32 with BLAKE3-derived sub-seeds, so the
//! same textures and configuration give byte-identical graphs.
//!
//! # Example
//!
//! ```
//! use scatterkit_graph::{KeywordTable, ScatterConfig, TextureDescriptor};
//! use scatterkit_synth::{builtin_library, Assembler};
//!
//! let library = builtin_library().unwrap();
//! let keywords = KeywordTable::default();
//! let assembler = Assembler::new(&library, &keywords);
//! let graph = assembler
//!     .assemble(&[TextureDescriptor::new("pebble.png")], &ScatterConfig::default())
//!     .unwrap();
//! assert!(graph.validate().is_empty());
//! ```
//!
//! [`ScatterConfig`]: scatterkit_graph::ScatterConfig

pub mod alpha;
pub mod assemble;
pub mod bake;
pub mod blend;
pub mod classify;
pub mod defaults;
pub mod error;
pub mod host;
pub mod names;
pub mod normals;
pub mod prune;
pub mod randomize;
pub mod rng;
pub mod shader;
pub mod source;
pub mod templates;
pub mod unscatter;

#[cfg(test)]
mod eval;

pub use assemble::{assemble, texture_sets, Assembler, ChannelHeads, ChannelTextures};
pub use bake::{attach_baked, bake_coordinates, clear_bake};
pub use blend::{group_outputs, noise_blend};
pub use classify::{assign_channels, classify};
pub use error::{AssemblyError, AssemblyResult};
pub use host::{
    bake_channels, render_bake_name, BakeJob, BakeNaming, BakeRequest, BakeService,
    BakedChannel, HostError, PreferencesStore, UnwrapMethod, UnwrapSettings, UvProvider,
    UV_LAYER_NAME,
};
pub use prune::{prune, prune_feature, Feature};
pub use shader::{scatter_into_material, ShaderWiring};
pub use templates::builtin_library;
pub use unscatter::{extract_images, is_scatter_graph, rescatter, unscatter, UnscatterOptions};
