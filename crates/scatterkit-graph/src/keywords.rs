//! Classifier keyword tables and user preferences.

use serde::{Deserialize, Serialize};

use crate::channel::Channel;

/// Keywords for one channel, in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordEntry {
    /// Channel the keywords select.
    pub channel: Channel,
    /// Lowercase tokens.
    pub keywords: Vec<String>,
}

/// Ordered channel → keyword mapping plus the recognized file extensions.
///
/// Entry order is the tie-break: a token listed under two channels
/// resolves to the earlier entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct KeywordTable {
    /// Channel entries in priority order.
    pub entries: Vec<KeywordEntry>,
    /// Extensions (without dot) stripped before tokenizing.
    pub extensions: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordTable {
    fn default() -> Self {
        let entry = |channel, list: &[&str]| KeywordEntry {
            channel,
            keywords: words(list),
        };
        Self {
            entries: vec![
                entry(
                    Channel::Albedo,
                    &[
                        "albedo", "base_color", "basecolor", "base_col", "color", "diffuse",
                        "diff", "col", "d",
                    ],
                ),
                entry(Channel::Ao, &["ao", "ambient_occlusion", "occlusion"]),
                entry(
                    Channel::Metallic,
                    &["metal", "metallic", "metalness", "m", "met", "mt"],
                ),
                entry(Channel::Roughness, &["roughness", "rough", "r", "rgh"]),
                entry(Channel::Glossiness, &["gloss", "glossiness", "gls"]),
                entry(
                    Channel::Specular,
                    &["spec", "specular", "spc", "refl", "reflection"],
                ),
                entry(
                    Channel::Emission,
                    &["emit", "emission", "emissive", "glow", "glw", "e"],
                ),
                entry(
                    Channel::Alpha,
                    &["alpha", "transparent", "transparency", "opacity"],
                ),
                entry(Channel::Normal, &["normal", "nrm", "n", "nrlm"]),
                entry(Channel::Bump, &["bmp", "bump", "height", "h"]),
                entry(Channel::Displacement, &["displacement", "disp", "dp"]),
            ],
            extensions: words(&[
                "png", "jpg", "jpeg", "exr", "bmp", "tff", "tif", "tiff", "tga",
            ]),
        }
    }
}

impl KeywordTable {
    /// Channel selected by a lowercase token, if any.
    pub fn channel_for(&self, token: &str) -> Option<Channel> {
        self.entries
            .iter()
            .find(|e| e.keywords.iter().any(|k| k == token))
            .map(|e| e.channel)
    }

    /// Keywords registered for a channel.
    pub fn keywords(&self, channel: Channel) -> &[String] {
        self.entries
            .iter()
            .find(|e| e.channel == channel)
            .map(|e| e.keywords.as_slice())
            .unwrap_or(&[])
    }

    /// Replaces a channel's keywords from a comma separated list.
    ///
    /// Blank items are dropped and every keyword is lowercased. A channel
    /// without an entry is appended at the lowest priority.
    pub fn set_keywords(&mut self, channel: Channel, list: &str) {
        let keywords: Vec<String> = list
            .split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        match self.entries.iter_mut().find(|e| e.channel == channel) {
            Some(entry) => entry.keywords = keywords,
            None => self.entries.push(KeywordEntry { channel, keywords }),
        }
    }

    /// Strips one trailing recognized extension, case-insensitively.
    pub fn strip_extension<'a>(&self, name: &'a str) -> &'a str {
        let Some((stem, ext)) = name.rsplit_once('.') else {
            return name;
        };
        if self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            stem
        } else {
            name
        }
    }
}

/// Placeholder tokens accepted by [`Preferences::bake_name_template`].
pub const BAKE_NAME_TOKENS: &[(&str, &str)] = &[
    ("{C}", "channel"),
    ("{G}", "graph name"),
    ("{L}", "node label"),
    ("{M}", "material"),
    ("{N}", "node name"),
];

/// User preferences supplied by the host's preference store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Preferences {
    /// Classifier keywords.
    pub keywords: KeywordTable,
    /// File name template for baked channels.
    pub bake_name_template: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            keywords: KeywordTable::default(),
            bake_name_template: "{M}_{C}".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earlier_entries_win_shared_tokens() {
        let mut table = KeywordTable::default();
        table.set_keywords(Channel::Roughness, "rough, d");
        assert_eq!(table.channel_for("d"), Some(Channel::Albedo));
        assert_eq!(table.channel_for("rough"), Some(Channel::Roughness));
        assert_eq!(table.channel_for("r"), None);
    }

    #[test]
    fn set_keywords_normalizes_list() {
        let mut table = KeywordTable::default();
        table.set_keywords(Channel::Bump, " Height ,, BMP ");
        assert_eq!(table.keywords(Channel::Bump), &["height", "bmp"]);
    }

    #[test]
    fn strip_extension_only_removes_known_suffix() {
        let table = KeywordTable::default();
        assert_eq!(table.strip_extension("rock_n.PNG"), "rock_n");
        assert_eq!(table.strip_extension("rock.v2"), "rock.v2");
        assert_eq!(table.strip_extension("rock"), "rock");
    }

    #[test]
    fn preferences_default_from_empty_json() {
        let prefs: Preferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.keywords.entries.len(), 11);
    }
}
