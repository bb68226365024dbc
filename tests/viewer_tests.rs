extern crate clipfade;
extern crate image;

mod support;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use clipfade::loader::{self, LoadEvent};
use clipfade::{ClipName, Viewer, ViewerConfig};

/// Lays out a complete asset tree and returns its root.
fn asset_root(label: &str) -> PathBuf {
    let root = support::temp_dir(label);
    support::write(&root.join("models/FireFighter/FireFighter.gltf"), &support::character_glb());
    support::write(
        &root.join("animations/Pointing Gesture/Pointing Gesture.gltf"),
        &support::gesture_glb(),
    );
    std::fs::create_dir_all(root.join("images")).unwrap();
    image::RgbaImage::from_pixel(4, 4, image::Rgba([90, 60, 30, 255]))
        .save(root.join("images/SimplePeople_FireFighter_Brown.png"))
        .unwrap();
    root
}

/// Runs frames until `done` holds, or gives up after a few seconds.
fn run_until<F: Fn(&Viewer) -> bool>(
    viewer: &mut Viewer,
    done: F,
) {
    for _ in 0 .. 1000 {
        viewer.frame(1.0 / 60.0);
        if done(viewer) {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("viewer did not settle");
}

fn settled(viewer: &Viewer) -> bool {
    viewer.is_visible() && viewer.registry().contains("Pointing Gesture") && viewer.pending_loads() == 0
}

fn current(viewer: &Viewer) -> &str {
    viewer.controller().map_or("", |controller| controller.current_clip_name())
}

#[test]
fn config_defaults() {
    let config = ViewerConfig::new("assets");
    assert_eq!(config.model_path(), Path::new("assets/models/FireFighter/FireFighter.gltf"));
    assert_eq!(config.model_name(), "FireFighter");
    assert_eq!(config.model_scale(), 50.0);
    assert_eq!(
        config.texture_path(),
        Some(PathBuf::from("assets/images/SimplePeople_FireFighter_Brown.png"))
    );
    assert_eq!(config.idle_clip().as_str(), "Idle");
    assert_eq!(config.gesture_clip().as_str(), "Pointing Gesture");
    assert_eq!(config.streamed_clips(), &[ClipName::from("Pointing Gesture")]);
    assert_eq!(
        config.clip_path(config.gesture_clip()),
        Path::new("assets/animations/Pointing Gesture/Pointing Gesture.gltf")
    );
    assert_eq!(config.blend_duration(), 0.5);
}

#[test]
fn config_builder_overrides() {
    let config = ViewerConfig::builder("data")
        .model("hero.glb")
        .model_scale(1.0)
        .no_texture()
        .gesture_clip("Wave")
        .streamed_clips(vec!["Wave", "Run"])
        .blend_duration(0.25)
        .build();
    assert_eq!(config.model_path(), Path::new("data/hero.glb"));
    assert_eq!(config.model_scale(), 1.0);
    assert!(config.texture_path().is_none());
    assert_eq!(config.gesture_clip().as_str(), "Wave");
    assert_eq!(config.streamed_clips().len(), 2);
    assert_eq!(config.blend_duration(), 0.25);
}

#[test]
fn loads_then_toggles() {
    let root = asset_root("viewer");
    let mut viewer = Viewer::new(ViewerConfig::new(&root));
    assert!(viewer.model().is_none());
    assert!(!viewer.is_visible());

    run_until(&mut viewer, settled);

    let model = viewer.model().unwrap();
    assert_eq!(model.name, "FireFighter");
    assert_eq!(model.transform.scale, 50.0);
    assert!(model.texture.is_some());
    assert_eq!(current(&viewer), "Idle");

    viewer.click();
    viewer.frame(1.0 / 60.0);
    assert_eq!(current(&viewer), "Pointing Gesture");

    viewer.click();
    viewer.frame(1.0 / 60.0);
    assert_eq!(current(&viewer), "Idle");

    // Two clicks in one frame cancel out.
    viewer.click();
    viewer.click();
    viewer.frame(1.0 / 60.0);
    assert_eq!(current(&viewer), "Idle");

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn posed_output_follows_model_placement() {
    let root = asset_root("pose");
    let mut viewer = Viewer::new(ViewerConfig::new(&root));
    run_until(&mut viewer, settled);

    let world = viewer.world_transforms();
    assert_eq!(world.len(), 3);
    assert!(support::approx(world[0].scale, 50.0));
    // Hips sit one unit above the armature at rest, scaled with the model.
    assert!(world[1].position.y > 49.0);

    let matrices = viewer.joint_matrices();
    assert_eq!(matrices.len(), 1);
    assert_eq!(matrices[0].len(), 2);

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn missing_gesture_keeps_idle() {
    let root = asset_root("no-gesture");
    std::fs::remove_dir_all(root.join("animations")).unwrap();
    let mut viewer = Viewer::new(ViewerConfig::new(&root));
    run_until(&mut viewer, |viewer| viewer.is_visible() && viewer.pending_loads() == 0);

    assert!(!viewer.registry().contains("Pointing Gesture"));
    viewer.click();
    viewer.frame(1.0 / 60.0);
    assert_eq!(current(&viewer), "Idle");

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn missing_model_never_shows() {
    let root = support::temp_dir("no-model");
    let mut viewer = Viewer::new(ViewerConfig::new(&root));
    run_until(&mut viewer, |viewer| viewer.pending_loads() == 0);

    viewer.click();
    viewer.frame(1.0 / 60.0);
    assert!(viewer.model().is_none());
    assert!(viewer.controller().is_none());
    assert!(!viewer.is_visible());
    assert!(viewer.world_transforms().is_empty());

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn clips_register_when_events_are_handled() {
    let root = support::temp_dir("handle");
    let config = ViewerConfig::builder(&root).no_texture().streamed_clips(Vec::<ClipName>::new()).build();
    let mut viewer = Viewer::new(config);

    let model = loader::model_from_slice("FireFighter", &support::character_glb());
    viewer.handle(LoadEvent::Model(PathBuf::from("FireFighter.gltf"), model));
    assert!(viewer.is_visible());
    assert!(viewer.registry().contains("Idle"));
    assert!(!viewer.registry().contains("Pointing Gesture"));
    assert_eq!(current(&viewer), "Idle");

    let clip = loader::clips_from_slice(&support::gesture_glb()).map(|mut clips| clips.remove(0));
    viewer.handle(LoadEvent::Clip(ClipName::from("Pointing Gesture"), clip));
    assert_eq!(viewer.registry().get("Pointing Gesture").unwrap().name, "Pointing Gesture");

    viewer.click();
    viewer.frame(0.25);
    assert_eq!(current(&viewer), "Pointing Gesture");

    let _ = std::fs::remove_dir_all(&root);
}
