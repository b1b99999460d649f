//! End-to-end assembly scenarios and structural properties.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use scatterkit_graph::{
    Channel, Direction, Graph, KeywordTable, LayeringStrategy, PortSchema, ProjectionMethod,
    ScatterConfig, TemplateLibrary, TextureDescriptor,
};
use scatterkit_synth::names;
use scatterkit_synth::{builtin_library, prune_feature, AssemblyError, Assembler, Feature};

fn library() -> TemplateLibrary {
    builtin_library().expect("builtin templates register")
}

fn textures(images: &[&str]) -> Vec<TextureDescriptor> {
    images.iter().map(|i| TextureDescriptor::new(*i)).collect()
}

fn assemble(images: &[&str], config: &ScatterConfig) -> Graph {
    let library = library();
    let keywords = KeywordTable::default();
    Assembler::new(&library, &keywords)
        .assemble(&textures(images), config)
        .expect("assembly succeeds")
}

fn channel_outputs(g: &Graph) -> Vec<Channel> {
    g.port_names(Direction::Output)
        .iter()
        .filter_map(|p| p.parse().ok())
        .collect()
}

fn port_set(g: &Graph, direction: Direction) -> BTreeSet<String> {
    g.port_names(direction).into_iter().collect()
}

fn count_sources(g: &Graph) -> usize {
    g.nodes()
        .filter(|n| n.kind.group().is_some_and(|inner| inner.name.starts_with(names::SOURCE)))
        .count()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn single_image_simple_scatter() {
    let g = assemble(&["pebble.png"], &ScatterConfig::default());
    assert_eq!(channel_outputs(&g), vec![Channel::Image]);
    for port in [names::DENSITY, names::ALPHA_CLIP, "Background"] {
        assert!(!g.has_port(Direction::Input, port), "unexpected '{}'", port);
    }
    assert_eq!(count_sources(&g), 1);
}

#[test]
fn three_images_blended() {
    let config = ScatterConfig::with_layering(LayeringStrategy::Blended);
    let g = assemble(&["tile_a.png", "tile_b.png", "tile_c.png"], &config);
    assert_eq!(count_sources(&g), 3);
    assert_eq!(channel_outputs(&g), vec![Channel::Image]);
    let blending: Vec<_> = g
        .port_names(Direction::Input)
        .into_iter()
        .filter(|p| p.starts_with("Blending "))
        .collect();
    assert_eq!(
        blending,
        vec![
            names::BLENDING_SCALE,
            names::BLENDING_DETAIL,
            names::BLENDING_ROUGHNESS,
            names::BLENDING_BLUR
        ]
    );
}

#[test]
fn pbr_set_classifies_into_channels() {
    let config = ScatterConfig {
        use_pbr: true,
        ..ScatterConfig::default()
    };
    let g = assemble(
        &["Rock_01_BaseColor.png", "metal_plate_R.exr", "Rock_01_Normal.png"],
        &config,
    );
    assert_eq!(
        channel_outputs(&g),
        vec![Channel::Albedo, Channel::Roughness, Channel::Normal]
    );
}

#[test]
fn layered_sets_need_every_channel() {
    let library = library();
    let keywords = KeywordTable::default();
    let config = ScatterConfig {
        use_pbr: true,
        ..ScatterConfig::with_layering(LayeringStrategy::Layered)
    };
    let err = Assembler::new(&library, &keywords)
        .assemble(
            &textures(&["a_albedo.png", "b_albedo.png", "a_rough.png"]),
            &config,
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "texture set 1 has no 'Roughness' texture");
}

// ============================================================================
// Structural properties
// ============================================================================

fn every_config() -> Vec<ScatterConfig> {
    let mut configs = Vec::new();
    for &layering in LayeringStrategy::all() {
        for projection_method in [ProjectionMethod::Uv, ProjectionMethod::TriPlanar] {
            for flags in 0u8..32 {
                configs.push(ScatterConfig {
                    layering,
                    projection_method,
                    use_edge_blur: flags & 1 != 0,
                    use_edge_warp: flags & 2 != 0,
                    use_texture_warp: flags & 4 != 0,
                    use_random_col: flags & 8 != 0,
                    use_noise_col: flags & 16 != 0,
                    use_pbr: layering != LayeringStrategy::Overlapping,
                    ..ScatterConfig::default()
                });
            }
        }
    }
    configs
}

#[test]
fn no_configuration_leaves_dangling_links() {
    let images = ["set_a_albedo.png", "set_b_albedo.png", "set_a_normal.png", "set_b_normal.png"];
    for config in every_config() {
        let g = assemble(&images, &config);
        let issues = g.validate();
        assert!(issues.is_empty(), "{:?}: {:?}", config, issues);
    }
}

fn toggle_case(feature: Feature, on: &mut ScatterConfig, off: &mut ScatterConfig) {
    let (on_flag, off_flag) = match feature {
        Feature::EdgeBlur => (&mut on.use_edge_blur, &mut off.use_edge_blur),
        Feature::EdgeWarp => (&mut on.use_edge_warp, &mut off.use_edge_warp),
        Feature::TextureWarp => (&mut on.use_texture_warp, &mut off.use_texture_warp),
        Feature::RandomCellColor => (&mut on.use_random_col, &mut off.use_random_col),
        Feature::NoiseColor => (&mut on.use_noise_col, &mut off.use_noise_col),
        other => panic!("{} is not a configuration flag", other),
    };
    *on_flag = true;
    *off_flag = false;
}

#[test]
fn disabling_a_flag_matches_never_enabling_it() {
    let flags = [
        Feature::EdgeBlur,
        Feature::EdgeWarp,
        Feature::TextureWarp,
        Feature::RandomCellColor,
        Feature::NoiseColor,
    ];
    let strategies = [
        LayeringStrategy::Simple,
        LayeringStrategy::Blended,
        LayeringStrategy::SimpleAlpha,
        LayeringStrategy::Layered,
        LayeringStrategy::Overlapping,
    ];
    let images = ["moss_a.png", "moss_b.png"];
    for layering in strategies {
        for feature in flags {
            let color_stage = matches!(feature, Feature::RandomCellColor | Feature::NoiseColor);
            if color_stage && layering == LayeringStrategy::Overlapping {
                continue;
            }
            let mut on = ScatterConfig::with_layering(layering);
            let mut off = ScatterConfig::with_layering(layering);
            toggle_case(feature, &mut on, &mut off);

            let mut toggled = assemble(&images, &on);
            prune_feature(&mut toggled, feature).expect("prune succeeds");
            let never = assemble(&images, &off);

            let case = format!("{} / {}", layering, feature);
            assert!(toggled.validate().is_empty(), "{}", case);
            assert_eq!(
                port_set(&toggled, Direction::Input),
                port_set(&never, Direction::Input),
                "{}",
                case
            );
            assert_eq!(channel_outputs(&toggled), channel_outputs(&never), "{}", case);
        }
    }
}

#[test]
fn coordinates_ignores_texture_flags() {
    let config = ScatterConfig {
        use_noise_col: true,
        use_texture_warp: true,
        ..ScatterConfig::with_layering(LayeringStrategy::Coordinates)
    };
    let g = assemble(&[], &config);
    assert_eq!(
        g.port_names(Direction::Output),
        vec![names::VECTOR, names::RANDOM_COLOR]
    );
    assert!(!g.has_port(Direction::Input, names::TEXTURE_WARP));
}

// ============================================================================
// Template contracts
// ============================================================================

/// Copies the builtin library, letting `edit` change or drop each template.
fn edited_library(edit: impl Fn(&str, &mut Graph) -> bool) -> TemplateLibrary {
    let mut edited = TemplateLibrary::new();
    for template in library().iter() {
        let mut graph = template.instantiate();
        if !edit(template.name(), &mut graph) {
            continue;
        }
        let schema: Vec<PortSchema> = [Direction::Input, Direction::Output]
            .into_iter()
            .flat_map(|direction| {
                graph
                    .ports(direction)
                    .map(move |p| PortSchema {
                        name: p.name.clone(),
                        direction,
                        port_type: p.port_type,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        edited.register(graph, schema).expect("edited template registers");
    }
    edited
}

#[test]
fn template_without_an_expected_port_aborts_assembly() {
    let base = "Scatter Base simple_alpha";
    let library = edited_library(|name, graph| {
        if name == base {
            graph.remove_port(Direction::Input, names::DENSITY).unwrap();
        }
        true
    });
    let keywords = KeywordTable::default();
    let result = Assembler::new(&library, &keywords).assemble(
        &textures(&["leaf.png"]),
        &ScatterConfig::with_layering(LayeringStrategy::SimpleAlpha),
    );
    assert_eq!(
        result.unwrap_err(),
        AssemblyError::PortNotFound {
            graph: base.to_string(),
            port: names::DENSITY.to_string(),
        }
    );
}

#[test]
fn incomplete_library_aborts_assembly() {
    let library = edited_library(|name, _| name != names::SOURCE);
    let keywords = KeywordTable::default();
    let result = Assembler::new(&library, &keywords)
        .assemble(&textures(&["leaf.png"]), &ScatterConfig::default());
    assert_eq!(
        result.unwrap_err(),
        AssemblyError::MissingTemplate(names::SOURCE.to_string())
    );
}
