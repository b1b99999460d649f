//! File-name based texture classification.
//!
//! A name is stripped of one recognized extension, lowercased, and split on
//! every non-alphabetic character. Each token is looked up in the keyword
//! table; the channel of the **rightmost** matching token wins, so a suffix
//! such as `_basecolor` overrides an earlier coincidental match. Names with
//! no matching token classify as [`Channel::Image`].

use std::sync::OnceLock;

use log::debug;
use regex::Regex;
use scatterkit_graph::{Channel, KeywordTable, TextureDescriptor};

fn separators() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new("[^a-z]+").expect("invalid regex pattern"))
}

/// Lowercase alphabetic tokens of a file name, extension removed.
pub fn tokens(name: &str, table: &KeywordTable) -> Vec<String> {
    let stem = table.strip_extension(name).to_lowercase();
    separators()
        .split(&stem)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Channels matched by each token, left to right.
pub fn matches(name: &str, table: &KeywordTable) -> Vec<Channel> {
    tokens(name, table)
        .iter()
        .filter_map(|t| table.channel_for(t))
        .collect()
}

/// Classifies one image name. Never fails.
pub fn classify(name: &str, table: &KeywordTable) -> Channel {
    let channel = matches(name, table).last().copied().unwrap_or(Channel::Image);
    debug!("classified '{}' as {}", name, channel);
    channel
}

/// Assigns channels to descriptors.
///
/// With `use_pbr` off every descriptor becomes [`Channel::Image`]. With it
/// on, descriptors still tagged `Image` are classified by name and
/// descriptors already carrying another channel keep it.
pub fn assign_channels(
    textures: &[TextureDescriptor],
    table: &KeywordTable,
    use_pbr: bool,
) -> Vec<TextureDescriptor> {
    textures
        .iter()
        .map(|tex| {
            let channel = match (use_pbr, tex.channel) {
                (false, _) => Channel::Image,
                (true, Channel::Image) => classify(&tex.image, table),
                (true, preset) => preset,
            };
            tex.clone().with_channel(channel)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> KeywordTable {
        KeywordTable::default()
    }

    #[test]
    fn base_color_suffix() {
        assert_eq!(classify("Rock_01_BaseColor.png", &table()), Channel::Albedo);
    }

    #[test]
    fn rightmost_token_wins() {
        assert_eq!(classify("metal_plate_R.exr", &table()), Channel::Roughness);
        assert_eq!(classify("rock_color_bump.png", &table()), Channel::Bump);
        assert_eq!(classify("rock_bump_color.png", &table()), Channel::Albedo);
    }

    #[test]
    fn unmatched_names_are_images() {
        assert_eq!(classify("swirl_pattern.png", &table()), Channel::Image);
        assert_eq!(classify("", &table()), Channel::Image);
        assert_eq!(classify("___.png", &table()), Channel::Image);
    }

    #[test]
    fn digits_and_punctuation_split_tokens() {
        assert_eq!(
            tokens("Brick-Wall 02_NRM.tga", &table()),
            vec!["brick", "wall", "nrm"]
        );
        assert_eq!(classify("Brick-Wall 02_NRM.tga", &table()), Channel::Normal);
    }

    #[test]
    fn unknown_extension_is_tokenized() {
        assert_eq!(tokens("leaf.albedo", &table()), vec!["leaf", "albedo"]);
    }

    #[test]
    fn custom_keywords_apply() {
        let mut table = table();
        table.set_keywords(Channel::Emission, "lava");
        assert_eq!(classify("rock_lava.png", &table), Channel::Emission);
        assert_eq!(classify("rock_glow.png", &table), Channel::Image);
    }

    #[test]
    fn assign_channels_respects_pbr_flag() {
        let textures = vec![
            TextureDescriptor::new("wood_rough.png"),
            TextureDescriptor::new("wood.png").with_channel(Channel::Bump),
        ];
        let off = assign_channels(&textures, &table(), false);
        assert!(off.iter().all(|t| t.channel == Channel::Image));
        let on = assign_channels(&textures, &table(), true);
        assert_eq!(on[0].channel, Channel::Roughness);
        assert_eq!(on[1].channel, Channel::Bump);
    }
}
