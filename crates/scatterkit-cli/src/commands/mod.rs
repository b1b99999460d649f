//! CLI command implementations

pub mod assemble;
pub mod blend;
pub mod classify;
pub mod keywords;
pub mod scatter;
pub mod templates;
pub mod unscatter;

use anyhow::anyhow;
use scatterkit_graph::CodedError;

/// Wraps a coded library error as `[CODE] message`.
pub(crate) fn coded(err: impl CodedError) -> anyhow::Error {
    anyhow!("[{}] {}", err.code(), err.message())
}
