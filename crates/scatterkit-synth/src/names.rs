//! Template, node, and port names shared between the template authors and
//! the pipeline stages that address them.

// =========================================================================
// Templates
// =========================================================================

pub const COORDINATES: &str = "Scatter Coordinates";
pub const COORDINATES_OVERLAP: &str = "Scatter Coordinates Overlap";
pub const SOURCE: &str = "Scatter Source";
pub const TRI_PLANAR_MAPPING: &str = "Tri-Planar Mapping";
pub const RANDOMIZE_CELL_HSV: &str = "Randomize Cell HSV";
pub const RANDOMIZE_CELL_VALUE: &str = "Randomize Cell Value";
pub const RANDOMIZE_NOISE_HSV: &str = "Randomize Noise HSV";
pub const RANDOMIZE_NOISE_VALUE: &str = "Randomize Noise Value";
pub const NORMAL_CORRECTION_UV: &str = "Normal Correction UV";
pub const NORMAL_CORRECTION_TRI_PLANAR: &str = "Normal Correction Tri-Planar";
pub const BLEND_NOISE: &str = "Blend Noise";

// =========================================================================
// Sections
// =========================================================================

pub const SECTION_EDGE_BLUR: &str = "Edge Blur";
pub const SECTION_EDGE_WARP: &str = "Edge Warp";
pub const SECTION_TEXTURE_WARP: &str = "Texture Warp";
pub const SECTION_TRANSPARENCY: &str = "Transparency";
pub const SECTION_RANDOMIZE_LAYERS: &str = "Randomize Layers";
pub const SECTION_RANDOMIZE_CELLS: &str = "Randomize Cells";
pub const SECTION_RANDOMIZE_TEXTURES: &str = "Randomize Textures";
pub const SECTION_UV_PROJECTION: &str = "UV Projection";
pub const SECTION_TRI_PLANAR_PROJECTION: &str = "Tri-Planar Projection";

// =========================================================================
// Master nodes
// =========================================================================

pub const NODE_CENTERED_UVS: &str = "Centered UVs";
pub const NODE_PATTERN_SCALE: &str = "Pattern Scale";
pub const NODE_SCALED_COORDINATES: &str = "Scaled Coordinates";
pub const NODE_LAYER_OFFSET: &str = "Layer Offset";
pub const NODE_RANDOMIZE_LAYER: &str = "Randomize Layer";
pub const NODE_LAYER_COORDINATES: &str = "Layer Coordinates";
pub const NODE_SCATTER_COORDINATES: &str = "Scatter Coordinates";
pub const NODE_CELL_COORDINATES: &str = "Cell Coordinates";
pub const NODE_TEXTURE_WARP_MIX: &str = "Texture Warp Mix";
pub const NODE_WARPED_COORDINATES: &str = "Warped Coordinates";
pub const NODE_NORMAL_CORRECTION: &str = "Normal Correction";
pub const NODE_NOISE_BLEND: &str = "Noise Blend";

// =========================================================================
// Ports
// =========================================================================

pub const VECTOR: &str = "Vector";
pub const FRACTION: &str = "Fraction";
pub const RANDOM_COLOR: &str = "Random Color";
pub const CELL_ALPHA: &str = "Cell Alpha";
pub const SHIFT: &str = "Shift";
pub const IMAGE: &str = "Image";
pub const CELL_SCALE: &str = "Cell Scale";
pub const TEXTURE_SCALE: &str = "Texture Scale";
pub const TRI_PLANAR_BLENDING: &str = "Tri-Planar Blending";
pub const RANDOM_CELL_SHAPE: &str = "Random Cell Shape";
pub const RANDOM_LOCATION: &str = "Random Location";
pub const TEXTURE_ROTATION: &str = "Texture Rotation";
pub const RANDOM_ROTATION: &str = "Random Rotation";
pub const RANDOM_SCALE: &str = "Random Scale";
pub const EDGE_BLUR: &str = "Edge Blur";
pub const EDGE_WARP: &str = "Edge Warp";
pub const EDGE_WARP_SCALE: &str = "Edge Warp Scale";
pub const EDGE_WARP_DETAIL: &str = "Edge Warp Detail";
pub const TEXTURE_WARP: &str = "Texture Warp";
pub const TEXTURE_WARP_SCALE: &str = "Texture Warp Scale";
pub const NORMAL_STRENGTH: &str = "Normal Strength";
pub const LABEL_BLENDING: &str = "Blending";
pub const BLENDING_SCALE: &str = "Blending Scale";
pub const BLENDING_DETAIL: &str = "Blending Detail";
pub const BLENDING_ROUGHNESS: &str = "Blending Roughness";
pub const BLENDING_BLUR: &str = "Blending Blur";
pub const LABEL_RANDOMIZE_CELLS: &str = "Randomize Cells";
pub const RANDOM_CELL_HUE: &str = "Random Cell Hue";
pub const RANDOM_CELL_SATURATION: &str = "Random Cell Saturation";
pub const RANDOM_CELL_VALUE: &str = "Random Cell Value";
pub const LABEL_RANDOMIZE_TEXTURES: &str = "Randomize Textures";
pub const HUE_NOISE: &str = "Hue Noise";
pub const SATURATION_NOISE: &str = "Saturation Noise";
pub const VALUE_NOISE: &str = "Value Noise";
pub const COLOR_NOISE_SCALE: &str = "Color Noise Scale";
pub const COLOR_NOISE_DETAIL: &str = "Color Noise Detail";
pub const COLOR_NOISE_WARP: &str = "Color Noise Warp";
pub const LABEL_TRANSPARENCY: &str = "Transparency";
pub const DENSITY: &str = "Density";
pub const ALPHA_CLIP: &str = "Alpha Clip";

/// Per-cell randomization control for a data channel.
pub fn random_cell_port(channel: &str) -> String {
    format!("Random Cell {}", channel)
}

/// Noise randomization controls for a data channel: amount, scale, detail, warp.
pub fn noise_ports(channel: &str) -> [String; 4] {
    [
        format!("{} Noise", channel),
        format!("{} Noise Scale", channel),
        format!("{} Noise Detail", channel),
        format!("{} Noise Warp", channel),
    ]
}
