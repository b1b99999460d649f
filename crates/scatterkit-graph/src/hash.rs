//! Canonical hashing and seed derivation.
//!
//! Templates are content-addressed by the BLAKE3 hash of their canonical
//! JSON form (sorted object keys, no whitespace). Seeds for per-layer and
//! per-node randomness are derived from the base seed with BLAKE3 so that
//! identical inputs always produce identical graphs.

use serde::Serialize;

/// Hex BLAKE3 hash of the canonical JSON form of `value`.
///
/// ```
/// use scatterkit_graph::{hash::canonical_hash, Graph};
///
/// let hash = canonical_hash(&Graph::new("Empty")).unwrap();
/// assert_eq!(hash.len(), 64);
/// ```
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_value(value)?;
    Ok(canonical_value_hash(&json))
}

/// Hex BLAKE3 hash of an already-built JSON value.
pub fn canonical_value_hash(value: &serde_json::Value) -> String {
    let canonical = canonicalize_json(value);
    blake3::hash(canonical.as_bytes()).to_hex().to_string()
}

/// Renders a JSON value with sorted keys and no insignificant whitespace.
pub fn canonicalize_json(value: &serde_json::Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &serde_json::Value, out: &mut String) {
    match value {
        serde_json::Value::Null => out.push_str("null"),
        serde_json::Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        serde_json::Value::Number(n) => out.push_str(&format_number(n)),
        serde_json::Value::String(s) => write_string(s, out),
        serde_json::Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                if let Some(v) = map.get(key) {
                    write_canonical(v, out);
                }
            }
            out.push('}');
        }
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => {
            if f == 0.0 {
                "0".to_string()
            } else if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", f as i64)
            } else {
                format!("{}", f)
            }
        }
        _ => "null".to_string(),
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\x20' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn truncate_u32(hash: blake3::Hash) -> u32 {
    let bytes = hash.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Derives an independent seed for the `index`-th layer.
///
/// ```text
/// layer_seed = truncate_u32(BLAKE3(base_seed || index))
/// ```
pub fn derive_layer_seed(base_seed: u32, index: u32) -> u32 {
    let mut input = Vec::with_capacity(8);
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(&index.to_le_bytes());
    truncate_u32(blake3::hash(&input))
}

/// Derives a seed for a named purpose (e.g. a node path).
pub fn derive_named_seed(base_seed: u32, name: &str) -> u32 {
    let mut input = Vec::with_capacity(4 + name.len());
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(name.as_bytes());
    truncate_u32(blake3::hash(&input))
}
