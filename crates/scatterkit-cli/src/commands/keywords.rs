//! Keywords command implementation
//!
//! Shows or edits the classifier keywords and bake name template kept in
//! a preferences file.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Result};
use colored::Colorize;
use scatterkit_graph::keywords::BAKE_NAME_TOKENS;
use scatterkit_graph::{Channel, Preferences};
use scatterkit_synth::PreferencesStore;

use crate::input::JsonPreferences;

/// An edit to apply to the stored preferences.
#[derive(Debug, Clone, Default)]
pub struct KeywordEdit {
    /// Channel whose keyword list is replaced with `keywords`.
    pub channel: Option<Channel>,
    /// Comma separated keywords.
    pub keywords: Option<String>,
    /// New bake name template.
    pub bake_template: Option<String>,
}

impl KeywordEdit {
    fn is_empty(&self) -> bool {
        self.channel.is_none() && self.keywords.is_none() && self.bake_template.is_none()
    }
}

/// Applies `edit` to `preferences`.
pub fn apply_edit(preferences: &mut Preferences, edit: &KeywordEdit) -> Result<()> {
    match (edit.channel, &edit.keywords) {
        (Some(channel), Some(list)) => preferences.keywords.set_keywords(channel, list),
        (None, None) => {}
        _ => bail!("--channel and --set must be given together"),
    }
    if let Some(template) = &edit.bake_template {
        if !BAKE_NAME_TOKENS.iter().any(|(token, _)| template.contains(token)) {
            log::warn!("bake name template '{}' uses no placeholder", template);
        }
        preferences.bake_name_template = template.clone();
    }
    Ok(())
}

/// Run the keywords command
///
/// # Arguments
/// * `prefs` - Preferences file (created on first edit)
/// * `edit` - Changes to save before printing
/// * `json_output` - Print the preferences as JSON
pub fn run(prefs: &Path, edit: &KeywordEdit, json_output: bool) -> Result<ExitCode> {
    let mut store = JsonPreferences::new(prefs);
    let mut preferences = store.load()?;
    if !edit.is_empty() {
        apply_edit(&mut preferences, edit)?;
        store.save(&preferences)?;
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&preferences)?);
        return Ok(ExitCode::SUCCESS);
    }
    for entry in &preferences.keywords.entries {
        println!(
            "{:12} {}",
            entry.channel.as_str().cyan(),
            entry.keywords.join(", ")
        );
    }
    println!(
        "{:12} {}",
        "extensions".dimmed(),
        preferences.keywords.extensions.join(", ")
    );
    println!("{:12} {}", "bake name".dimmed(), preferences.bake_name_template);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_replaces_channel_keywords() {
        let mut prefs = Preferences::default();
        let edit = KeywordEdit {
            channel: Some(Channel::Bump),
            keywords: Some("hgt, BMP".to_string()),
            bake_template: Some("{N}_{C}".to_string()),
        };
        apply_edit(&mut prefs, &edit).unwrap();
        assert_eq!(prefs.keywords.keywords(Channel::Bump), &["hgt", "bmp"]);
        assert_eq!(prefs.bake_name_template, "{N}_{C}");
    }

    #[test]
    fn keywords_need_a_channel() {
        let edit = KeywordEdit {
            keywords: Some("hgt".to_string()),
            ..KeywordEdit::default()
        };
        assert!(apply_edit(&mut Preferences::default(), &edit).is_err());
    }
}
