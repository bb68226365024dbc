//! Shared fixtures: a tiny rig, synthetic clips and in-memory glTF documents.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use clipfade::animation::{Binding, Clip, Interpolation, Track, Values};
use clipfade::rig::{Joint, NodeTransform, Rig};

pub const EPSILON: f32 = 1e-4;

pub fn approx(
    a: f32,
    b: f32,
) -> bool {
    (a - b).abs() < EPSILON
}

/// `Root -> Hips -> Spine`, all at the identity.
pub fn rig() -> Rig {
    Rig::new(vec![
        Joint::new("Root", None, NodeTransform::default()),
        Joint::new("Hips", Some(0), NodeTransform::default()),
        Joint::new("Spine", Some(1), NodeTransform::default()),
    ])
}

pub fn scale_track(
    times: Vec<f32>,
    values: Vec<f32>,
) -> Track {
    Track {
        binding: Binding::Scale,
        times,
        values: Values::Scalar(values),
        interpolation: Interpolation::Linear,
    }
}

/// One second long, holds the hips at scale 2.
pub fn idle_clip() -> Clip {
    Clip::new("Idle", vec![(scale_track(vec![0.0, 1.0], vec![2.0, 2.0]), "Hips".to_string())])
}

/// Two seconds long, holds the hips at scale 4.
pub fn gesture_clip() -> Clip {
    Clip::new(
        "Pointing Gesture",
        vec![(scale_track(vec![0.0, 2.0], vec![4.0, 4.0]), "Hips".to_string())],
    )
}

/// Moves the hips from the origin to `x = 2` over one second.
pub fn walk_clip() -> Clip {
    let track = Track {
        binding: Binding::Position,
        times: vec![0.0, 1.0],
        values: Values::Vector3(vec![[0.0, 0.0, 0.0].into(), [2.0, 0.0, 0.0].into()]),
        interpolation: Interpolation::Linear,
    };
    Clip::new("Walk", vec![(track, "Hips".to_string())])
}

pub fn hips_scale(rig: &Rig) -> f32 {
    let hips = rig.find("Hips").expect("hips joint");
    rig.joint(hips).expect("hips joint").local.scale
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes().to_vec()).collect()
}

/// Wraps a JSON document and its binary buffer into a GLB container.
pub fn glb(
    json: &str,
    bin: &[u8],
) -> Vec<u8> {
    let mut json = json.as_bytes().to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }
    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin);
    out
}

const CHARACTER_JSON: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [{ "nodes": [0] }],
    "nodes": [
        { "name": "Armature", "children": [1] },
        { "name": "Hips", "translation": [0.0, 1.0, 0.0], "children": [2] },
        { "name": "Spine" }
    ],
    "skins": [{ "name": "Body", "joints": [1, 2] }],
    ANIMATIONS
    "buffers": [{ "byteLength": 64 }],
    "bufferViews": [
        { "buffer": 0, "byteOffset": 0, "byteLength": 8 },
        { "buffer": 0, "byteOffset": 8, "byteLength": 24 },
        { "buffer": 0, "byteOffset": 32, "byteLength": 32 }
    ],
    "accessors": [
        { "bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] },
        { "bufferView": 1, "componentType": 5126, "count": 2, "type": "VEC3" },
        { "bufferView": 2, "componentType": 5126, "count": 2, "type": "VEC4" }
    ]
}"#;

const IDLE_ANIMATION: &str = r#""animations": [{
        "name": "Idle",
        "channels": [
            { "sampler": 0, "target": { "node": 1, "path": "translation" } },
            { "sampler": 1, "target": { "node": 2, "path": "rotation" } }
        ],
        "samplers": [
            { "input": 0, "output": 1, "interpolation": "LINEAR" },
            { "input": 0, "output": 2, "interpolation": "LINEAR" }
        ]
    }],"#;

fn character_bin() -> Vec<u8> {
    f32_bytes(&[
        // times
        0.0, 1.0,
        // hips translation
        0.0, 1.0, 0.0,
        0.0, 2.0, 0.0,
        // spine rotation
        0.0, 0.0, 0.0, 1.0,
        0.0, 0.0, 0.0, 1.0,
    ])
}

/// A three node character with one skin and an embedded `Idle` animation.
pub fn character_glb() -> Vec<u8> {
    glb(&CHARACTER_JSON.replace("ANIMATIONS", IDLE_ANIMATION), &character_bin())
}

/// The same character without any animation.
pub fn still_character_glb() -> Vec<u8> {
    glb(&CHARACTER_JSON.replace("ANIMATIONS", ""), &character_bin())
}

const GESTURE_JSON: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [{ "nodes": [0] }],
    "nodes": [
        { "name": "Hips", "children": [1] },
        { "name": "Spine" }
    ],
    "animations": [{
        "name": "mixamo.com",
        "channels": [{ "sampler": 0, "target": { "node": 1, "path": "rotation" } }],
        "samplers": [{ "input": 0, "output": 1, "interpolation": "LINEAR" }]
    }],
    "buffers": [{ "byteLength": 40 }],
    "bufferViews": [
        { "buffer": 0, "byteOffset": 0, "byteLength": 8 },
        { "buffer": 0, "byteOffset": 8, "byteLength": 32 }
    ],
    "accessors": [
        { "bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [2.0] },
        { "bufferView": 1, "componentType": 5126, "count": 2, "type": "VEC4" }
    ]
}"#;

/// A clip file that turns the spine by 90 degrees around Y over two seconds.
pub fn gesture_glb() -> Vec<u8> {
    let half = std::f32::consts::FRAC_1_SQRT_2;
    let bin = f32_bytes(&[
        0.0, 2.0,
        0.0, 0.0, 0.0, 1.0,
        0.0, half, 0.0, half,
    ]);
    glb(GESTURE_JSON, &bin)
}

/// A fresh, empty directory under the system temp dir.
pub fn temp_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("clipfade-{}-{}", label, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

pub fn write(
    path: &Path,
    bytes: &[u8],
) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bytes).expect("write fixture");
}
