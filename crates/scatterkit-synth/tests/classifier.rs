//! Property tests for file-name classification.

use proptest::prelude::*;

use scatterkit_graph::{Channel, KeywordTable};
use scatterkit_synth::classify;

/// Single-token keywords of the default table.
fn keywords() -> Vec<String> {
    KeywordTable::default()
        .entries
        .iter()
        .flat_map(|e| e.keywords.iter().cloned())
        .filter(|k| k.chars().all(|c| c.is_ascii_lowercase()))
        .collect()
}

fn keyword() -> impl Strategy<Value = String> {
    prop::sample::select(keywords())
}

fn is_keyword(token: &str) -> bool {
    KeywordTable::default().channel_for(token).is_some()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn common_names_classify() {
    let table = KeywordTable::default();
    assert_eq!(classify("Rock_01_BaseColor.png", &table), Channel::Albedo);
    assert_eq!(classify("metal_plate_R.exr", &table), Channel::Roughness);
    assert_eq!(classify("swirl_pattern.png", &table), Channel::Image);
    assert_eq!(classify("rock_color_bump.png", &table), Channel::Bump);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// A name whose last token is a keyword takes that keyword's channel.
    #[test]
    fn trailing_keyword_selects_channel(
        stem in "[a-z]{3,8}",
        number in 0u32..100,
        kw in keyword(),
        upper in any::<bool>(),
    ) {
        let table = KeywordTable::default();
        let suffix = if upper { kw.to_uppercase() } else { kw.clone() };
        let name = format!("{}_{:02}_{}.png", stem, number, suffix);
        let expected = table.channel_for(&kw).unwrap_or(Channel::Image);
        prop_assert_eq!(classify(&name, &table), expected);
    }

    /// Of two keywords, the rightmost one decides.
    #[test]
    fn rightmost_keyword_wins(first in keyword(), last in keyword(), sep in "[-_. 0-9]{1,3}") {
        let table = KeywordTable::default();
        let name = format!("{}{}{}.tga", first, sep, last);
        prop_assert_eq!(classify(&name, &table), table.channel_for(&last).unwrap_or(Channel::Image));
    }

    /// Names without any keyword token fall back to `Image`.
    #[test]
    fn unmatched_names_are_images(words in prop::collection::vec("[a-z]{4,9}", 1..4)) {
        prop_assume!(words.iter().all(|w| !is_keyword(w)));
        let table = KeywordTable::default();
        let name = format!("{}.jpg", words.join("_"));
        prop_assert_eq!(classify(&name, &table), Channel::Image);
    }

    /// Classification never panics on arbitrary input.
    #[test]
    fn classification_is_total(name in ".{0,64}") {
        let _ = classify(&name, &KeywordTable::default());
    }
}
