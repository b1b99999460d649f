//! Source graph builder: per-cell pick among same-channel images.
//!
//! For `N` images the unit interval is split into `N` equal buckets. Stage
//! `i` (for `i` in `1..N`) compares the boundary `i / N` against the cell
//! fraction and mixes image `i` over the result of the previous stage:
//!
//! ```text
//! Bucket Select i = (Bucket Width * i) > Fraction
//! Color Mix i     = mix(Image i, previous, Bucket Select i)
//! ```
//!
//! A fraction of at least `i / N` therefore selects image `i`, and a
//! fraction exactly on a boundary goes to the higher-indexed bucket.

use log::debug;
use scatterkit_graph::node::{BlendMode, MathOp};
use scatterkit_graph::{
    Channel, ColorSpace, Direction, Extension, Graph, ImageProjection, Interpolation,
    LayeringStrategy, NodeKind, ScatterConfig, SocketRef, TemplateLibrary, TextureDescriptor,
    Value,
};

use crate::error::{AssemblyError, AssemblyResult};
use crate::names;
use crate::templates::{instantiate, Wiring};

/// Name of the source graph for a channel.
pub fn source_graph_name(channel: Channel) -> String {
    format!("{} {}", names::SOURCE, channel)
}

/// Sampling parameters for one image of a channel under a configuration.
pub fn sampling_for(
    tex: &TextureDescriptor,
    channel: Channel,
    config: &ScatterConfig,
) -> TextureDescriptor {
    let interpolation =
        if channel == Channel::Normal && config.layering != LayeringStrategy::Overlapping {
            Interpolation::Linear
        } else {
            config.texture_interpolation
        };
    let extension = if config.layering.is_transparent() {
        Extension::Clip
    } else {
        Extension::Repeat
    };
    let color_space = match (config.use_manage_color, channel.is_non_color()) {
        (true, true) => ColorSpace::NonColor,
        (true, false) => ColorSpace::Srgb,
        (false, _) => tex.color_space,
    };
    TextureDescriptor {
        image: tex.image.clone(),
        channel,
        color_space,
        interpolation,
        extension,
        projection: ImageProjection::Flat,
    }
}

/// Builds the source graph for one channel.
///
/// The `Image` output is renamed after the channel. Transparency nodes are
/// left in place; opaque strategies strip them when pruning.
pub fn build_source(
    library: &TemplateLibrary,
    channel: Channel,
    textures: &[TextureDescriptor],
    config: &ScatterConfig,
) -> AssemblyResult<Graph> {
    if textures.is_empty() {
        return Err(AssemblyError::EmptySelection);
    }
    let mut g = instantiate(library, names::SOURCE)?;
    g.name = source_graph_name(channel);
    let count = textures.len();

    let counter = g.require("Number of Images")?;
    if let Some(node) = g.node_mut(counter) {
        node.kind = NodeKind::Value {
            value: count as f32,
        };
        if let Some(out) = node.outputs.first_mut() {
            out.default = Value::Float(count as f32);
        }
    }
    let width = g.require("Bucket Width")?;
    let color_result = g.require("Color Result")?;
    let alpha_result = g.require("Alpha Result")?;

    let mut images = Vec::with_capacity(count);
    for (i, tex) in textures.iter().enumerate() {
        let sampling = sampling_for(tex, channel, config);
        let id = g.add_node(
            &format!("Image {}", i),
            NodeKind::ImageTexture((&sampling).into()),
        );
        if let Some(node) = g.node_mut(id) {
            node.label = Some(tex.image.clone());
        }
        g.place(id, [-600.0, -300.0 * i as f32]);
        g.feed(names::VECTOR, id, "Vector")?;
        images.push(id);
    }

    let mut color = SocketRef::node(images[0], "Color");
    let mut alpha = SocketRef::node(images[0], "Alpha");
    for (i, &image) in images.iter().enumerate().skip(1) {
        let boundary = g.math(&format!("Bucket Boundary {}", i), MathOp::Multiply);
        g.link(width, "Value", boundary, "A")?;
        g.set(boundary, "B", Value::Float(i as f32))?;
        let select = g.math(&format!("Bucket Select {}", i), MathOp::GreaterThan);
        g.link(boundary, "Value", select, "A")?;
        g.feed(names::FRACTION, select, "B")?;

        let color_mix = g.mix(&format!("Color Mix {}", i), BlendMode::Mix);
        g.link(select, "Value", color_mix, "Factor")?;
        g.link(image, "Color", color_mix, "A")?;
        g.connect(color, SocketRef::node(color_mix, "B"))?;
        color = SocketRef::node(color_mix, "Result");

        let alpha_mix = g.mix(&format!("Alpha Mix {}", i), BlendMode::Mix);
        g.link(select, "Value", alpha_mix, "Factor")?;
        g.link(image, "Alpha", alpha_mix, "A")?;
        g.connect(alpha, SocketRef::node(alpha_mix, "B"))?;
        alpha = SocketRef::node(alpha_mix, "Result");
    }
    g.connect(color, SocketRef::node(color_result, "Input"))?;
    g.connect(alpha, SocketRef::node(alpha_result, "Input"))?;

    if channel != Channel::Image {
        g.rename_port(Direction::Output, names::IMAGE, channel.as_str())?;
    }
    debug!(
        "built source graph '{}' with {} image(s)",
        g.name,
        textures.len()
    );
    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::PointEval;
    use crate::templates::builtin_library;

    fn textures(n: usize) -> Vec<TextureDescriptor> {
        (0..n)
            .map(|i| TextureDescriptor::new(format!("tile_{}.png", i)))
            .collect()
    }

    fn eval(n: usize) -> PointEval {
        let mut eval = PointEval::new();
        for i in 0..n {
            eval.sample(&format!("tile_{}.png", i), [i as f32, 0.0, 0.0, 1.0]);
        }
        eval
    }

    #[test]
    fn single_image_is_wired_directly() {
        let library = builtin_library().unwrap();
        let g = build_source(&library, Channel::Image, &textures(1), &ScatterConfig::default()).unwrap();
        assert!(g.find("Bucket Select 1").is_none());
        let mut p = eval(1);
        p.input(names::FRACTION, Value::Float(0.7));
        assert_eq!(p.output(&g, names::IMAGE)[0], 0.0);
        assert!(g.validate().is_empty());
    }

    #[test]
    fn each_bucket_selects_its_image() {
        let library = builtin_library().unwrap();
        for n in 2..6 {
            let g = build_source(&library, Channel::Image, &textures(n), &ScatterConfig::default())
                .unwrap();
            for k in 0..n {
                let mut p = eval(n);
                p.input(names::FRACTION, Value::Float((k as f32 + 0.5) / n as f32));
                assert_eq!(p.output(&g, names::IMAGE)[0], k as f32, "n={} k={}", n, k);
            }
        }
    }

    #[test]
    fn boundaries_go_to_higher_bucket() {
        let library = builtin_library().unwrap();
        let n = 4;
        let g = build_source(&library, Channel::Image, &textures(n), &ScatterConfig::default()).unwrap();
        for k in 1..n {
            let mut p = eval(n);
            p.input(names::FRACTION, Value::Float((1f32 / n as f32) * k as f32));
            assert_eq!(p.output(&g, names::IMAGE)[0], k as f32);
        }
    }

    proptest::proptest! {
        #[test]
        fn interior_fractions_pick_their_bucket(n in 1usize..8, pick in 0usize..8, offset in 0.05f32..0.95) {
            let k = pick % n;
            let library = builtin_library().unwrap();
            let g = build_source(&library, Channel::Image, &textures(n), &ScatterConfig::default())
                .unwrap();
            let mut p = eval(n);
            p.input(names::FRACTION, Value::Float((k as f32 + offset) / n as f32));
            proptest::prop_assert_eq!(p.output(&g, names::IMAGE)[0], k as f32);
        }
    }

    #[test]
    fn output_is_named_after_channel() {
        let library = builtin_library().unwrap();
        let g = build_source(&library, Channel::Roughness, &textures(2), &ScatterConfig::default())
            .unwrap();
        assert_eq!(g.name, "Scatter Source Roughness");
        assert!(g.has_port(Direction::Output, "Roughness"));
        assert!(!g.has_port(Direction::Output, names::IMAGE));
    }

    #[test]
    fn normal_images_sample_linearly() {
        let tex = TextureDescriptor::new("rock_n.png");
        let config = ScatterConfig::default();
        assert_eq!(sampling_for(&tex, Channel::Normal, &config).interpolation, Interpolation::Linear);
        assert_eq!(sampling_for(&tex, Channel::Albedo, &config).interpolation, Interpolation::Closest);
        let overlapping = ScatterConfig::with_layering(LayeringStrategy::Overlapping);
        let s = sampling_for(&tex, Channel::Normal, &overlapping);
        assert_eq!(s.interpolation, Interpolation::Closest);
        assert_eq!(s.extension, Extension::Clip);
    }

    #[test]
    fn data_channels_are_non_color() {
        let tex = TextureDescriptor::new("rock_r.png");
        let mut config = ScatterConfig::default();
        assert_eq!(sampling_for(&tex, Channel::Roughness, &config).color_space, ColorSpace::NonColor);
        assert_eq!(sampling_for(&tex, Channel::Albedo, &config).color_space, ColorSpace::Srgb);
        config.use_manage_color = false;
        let tagged = tex.with_color_space(ColorSpace::NonColor);
        assert_eq!(sampling_for(&tagged, Channel::Albedo, &config).color_space, ColorSpace::NonColor);
    }

    #[test]
    fn empty_texture_list_is_rejected() {
        let library = builtin_library().unwrap();
        assert_eq!(
            build_source(&library, Channel::Image, &[], &ScatterConfig::default()).unwrap_err(),
            AssemblyError::EmptySelection
        );
    }
}
