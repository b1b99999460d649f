//! Job, graph, and preference files.
//!
//! A job file names the images to scatter and the configuration to use:
//!
//! ```json
//! {
//!   "textures": ["rock_albedo.png", {"image": "rock_n.png", "channel": "Normal"}],
//!   "config": {"layering": "blended", "use_pbr": true}
//! }
//! ```
//!
//! Textures may be plain file names or full descriptors. Missing fields
//! take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scatterkit_graph::{Graph, Preferences, ScatterConfig, TextureDescriptor};
use scatterkit_synth::{HostError, PreferencesStore};
use serde::{Deserialize, Serialize};

/// A texture as written in a job file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextureEntry {
    /// Bare image name.
    Name(String),
    /// Full descriptor.
    Descriptor(TextureDescriptor),
}

impl From<TextureEntry> for TextureDescriptor {
    fn from(entry: TextureEntry) -> Self {
        match entry {
            TextureEntry::Name(image) => TextureDescriptor::new(image),
            TextureEntry::Descriptor(tex) => tex,
        }
    }
}

/// One assembly request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Job {
    pub textures: Vec<TextureEntry>,
    pub config: ScatterConfig,
}

impl Job {
    /// Texture descriptors in file order.
    pub fn descriptors(&self) -> Vec<TextureDescriptor> {
        self.textures.iter().cloned().map(Into::into).collect()
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Loads a job file.
pub fn load_job(path: &Path) -> Result<Job> {
    let text = read(path)?;
    serde_json::from_str(&text).with_context(|| format!("Invalid job file: {}", path.display()))
}

/// Loads a serialized graph.
pub fn load_graph(path: &Path) -> Result<Graph> {
    let text = read(path)?;
    serde_json::from_str(&text).with_context(|| format!("Invalid graph file: {}", path.display()))
}

/// Writes `value` as pretty JSON to `path`, or to stdout when `path` is
/// `None`.
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    match path {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// Preferences kept in a JSON file. A missing file reads as defaults.
#[derive(Debug, Clone)]
pub struct JsonPreferences {
    path: PathBuf,
}

impl JsonPreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferencesStore for JsonPreferences {
    fn load(&self) -> Result<Preferences, HostError> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|e| HostError::Preferences(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| HostError::Preferences(format!("{}: {}", self.path.display(), e)))
    }

    fn save(&mut self, preferences: &Preferences) -> Result<(), HostError> {
        let json = serde_json::to_string_pretty(preferences)
            .map_err(|e| HostError::Preferences(e.to_string()))?;
        fs::write(&self.path, json)
            .map_err(|e| HostError::Preferences(format!("{}: {}", self.path.display(), e)))
    }
}

/// Loads preferences from `path`, or defaults when no path is given.
pub fn load_preferences(path: Option<&Path>) -> Result<Preferences> {
    match path {
        Some(path) => Ok(JsonPreferences::new(path).load()?),
        None => Ok(Preferences::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scatterkit_graph::{Channel, LayeringStrategy};

    #[test]
    fn job_accepts_names_and_descriptors() {
        let job: Job = serde_json::from_str(
            r#"{
                "textures": ["a.png", {"image": "b_n.png", "channel": "Normal"}],
                "config": {"layering": "blended"}
            }"#,
        )
        .unwrap();
        let textures = job.descriptors();
        assert_eq!(textures[0], TextureDescriptor::new("a.png"));
        assert_eq!(textures[1].channel, Channel::Normal);
        assert_eq!(job.config.layering, LayeringStrategy::Blended);
        assert!(job.config.use_edge_blur);
    }

    #[test]
    fn unknown_job_fields_are_rejected() {
        assert!(serde_json::from_str::<Job>(r#"{"images": []}"#).is_err());
    }

    #[test]
    fn missing_preferences_file_reads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPreferences::new(dir.path().join("prefs.json"));
        assert_eq!(store.load().unwrap(), Preferences::default());
    }

    #[test]
    fn preferences_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonPreferences::new(dir.path().join("prefs.json"));
        let prefs = Preferences {
            bake_name_template: "{N}_{C}".to_string(),
            ..Preferences::default()
        };
        store.save(&prefs).unwrap();
        assert_eq!(store.load().unwrap(), prefs);
    }

    #[test]
    fn broken_preferences_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{not json").unwrap();
        let err = JsonPreferences::new(&path).load().unwrap_err();
        assert!(matches!(err, HostError::Preferences(_)));
    }
}
