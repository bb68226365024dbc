extern crate clipfade;
extern crate mint;

mod support;

use clipfade::animation::Mixer;
use clipfade::rig::{Joint, NodeTransform, Rig, Skin};

fn offset(
    x: f32,
    y: f32,
    z: f32,
) -> NodeTransform {
    NodeTransform {
        position: [x, y, z].into(),
        ..NodeTransform::default()
    }
}

fn quarter_turn_y() -> mint::Quaternion<f32> {
    let half = std::f32::consts::FRAC_1_SQRT_2;
    mint::Quaternion {
        v: [0.0, half, 0.0].into(),
        s: half,
    }
}

#[test]
fn concat_applies_parent_scale_and_rotation() {
    let parent = NodeTransform {
        orientation: quarter_turn_y(),
        scale: 2.0,
        ..offset(10.0, 0.0, 0.0)
    };
    let world = parent.concat(&offset(1.0, 0.0, 0.0));

    // +X turned a quarter around Y points to -Z.
    assert!(support::approx(world.position.x, 10.0));
    assert!(support::approx(world.position.z, -2.0));
    assert!(support::approx(world.scale, 2.0));
    assert!(support::approx(world.orientation.v.y, quarter_turn_y().v.y));
}

#[test]
fn invalid_parents_become_roots() {
    let rig = Rig::new(vec![
        Joint::new("A", None, NodeTransform::default()),
        Joint::new("B", Some(7), NodeTransform::default()),
        Joint::new("C", Some(2), NodeTransform::default()),
    ]);
    assert_eq!(rig.roots(), &[0, 1, 2]);
    assert!(rig.joints().iter().all(|joint| joint.parent.is_none()));
}

#[test]
fn world_transforms_follow_hierarchy() {
    let rig = Rig::new(vec![
        Joint::new("Root", None, offset(0.0, 1.0, 0.0)),
        Joint::new("Hips", Some(0), offset(0.0, 1.0, 0.0)),
        Joint::new("Spine", Some(1), offset(0.0, 0.5, 0.0)),
    ]);
    let world = rig.world_transforms(&NodeTransform::from_scale(10.0));
    assert_eq!(world.len(), 3);
    assert!(support::approx(world[0].position.y, 10.0));
    assert!(support::approx(world[1].position.y, 20.0));
    assert!(support::approx(world[2].position.y, 25.0));
    assert!(support::approx(world[2].scale, 10.0));
}

#[test]
fn joint_matrices_use_inverse_bind_matrices() {
    let rig = Rig::new(vec![Joint::new("Hips", None, offset(0.0, 2.0, 0.0))]);
    let undo_rest = mint::ColumnMatrix4::from([
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, -2.0, 0.0, 1.0,
    ]);
    let bound = Skin {
        name: None,
        joints: vec![0],
        inverse_bind_matrices: vec![undo_rest],
    };
    let unbound = Skin {
        name: None,
        joints: vec![0],
        inverse_bind_matrices: Vec::new(),
    };
    let world = rig.world_transforms(&NodeTransform::default());

    // At rest, joint * inverse bind is the identity.
    let m = bound.joint_matrices(&world)[0];
    assert!(support::approx(m.w.y, 0.0));
    assert!(support::approx(m.x.x, 1.0));

    let m = unbound.joint_matrices(&world)[0];
    assert!(support::approx(m.w.y, 2.0));
}

#[test]
fn reset_pose_restores_rest() {
    let mut mixer = Mixer::new(support::rig());
    mixer.clip_action(&support::walk_clip()).play();
    mixer.update(0.5);

    let mut rig = mixer.root().clone();
    let hips = rig.find("Hips").unwrap();
    assert!(support::approx(rig.joint(hips).unwrap().local.position.x, 1.0));
    rig.reset_pose();
    assert_eq!(rig.joint(hips).unwrap().local, rig.joint(hips).unwrap().rest);
}
