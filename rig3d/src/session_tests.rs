use crate::{Axis, Keyframe, Rig, Session, Track};

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-6,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

fn arm_rig() -> Rig {
    let mut rig = Rig::new();
    let root = rig.create_bone(None).unwrap();
    let arm = rig.create_bone(Some(root)).unwrap();
    rig.bone_mut(arm).unwrap().tracks[0] = Track {
        frames: vec![
            Keyframe {
                rotation: [0.0; 3],
                step: 1,
            },
            Keyframe {
                rotation: [0.0, 0.0, 40.0],
                step: 11,
            },
        ],
    };
    rig
}

#[test]
fn session_starts_at_the_first_frame() {
    let session = Session::new();
    assert_eq!(session.animation, 0);
    assert_eq!(session.frame, 1);
    assert_eq!(session.selected, None);
    assert!(!session.auto_key);
    assert!(!session.playing);
}

#[test]
fn tick_is_a_no_op_while_paused() {
    let mut rig = arm_rig();
    let mut session = Session::new();
    session.tick(&mut rig).unwrap();
    assert_eq!(session.frame, 1);
    assert_eq!(rig.bone(1).unwrap().rotation, [0.0; 3]);
}

#[test]
fn tick_advances_and_wraps() {
    let mut rig = arm_rig();
    rig.set_animation_length(0, 3).unwrap();
    let mut session = Session::new();
    session.playing = true;

    session.tick(&mut rig).unwrap();
    assert_eq!(session.frame, 2);
    session.tick(&mut rig).unwrap();
    assert_eq!(session.frame, 3);
    session.tick(&mut rig).unwrap();
    assert_eq!(session.frame, 1);
}

#[test]
fn tick_poses_the_rig() {
    let mut rig = arm_rig();
    let mut session = Session::new();
    session.playing = true;
    for _ in 0..5 {
        session.tick(&mut rig).unwrap();
    }
    assert_eq!(session.frame, 6);
    assert_approx(rig.bone(1).unwrap().rotation[2], 20.0);
}

#[test]
fn jump_to_clamps_into_the_timeline() {
    let mut rig = arm_rig();
    let mut session = Session::new();

    session.jump_to(&mut rig, 0).unwrap();
    assert_eq!(session.frame, 1);
    session.jump_to(&mut rig, 99).unwrap();
    assert_eq!(session.frame, 60);
    session.jump_to(&mut rig, 6).unwrap();
    assert_eq!(session.frame, 6);
    assert_approx(rig.bone(1).unwrap().rotation[2], 20.0);
}

#[test]
fn switching_animations_rewinds() {
    let mut rig = arm_rig();
    let mut session = Session::new();
    session.jump_to(&mut rig, 6).unwrap();

    let second = session.add_animation(&mut rig).unwrap();
    assert_eq!(second, 1);
    assert_eq!(session.animation, 1);
    assert_eq!(session.frame, 1);
    // the new animation's seeded tracks pose everything at zero
    assert_eq!(rig.bone(1).unwrap().rotation, [0.0; 3]);

    session.select_animation(&mut rig, 0).unwrap();
    assert_eq!(session.frame, 1);
}

#[test]
fn removing_an_animation_keeps_the_cursor_valid() {
    let mut rig = arm_rig();
    let mut session = Session::new();
    session.add_animation(&mut rig).unwrap();
    session.add_animation(&mut rig).unwrap();
    assert_eq!(session.animation, 2);

    session.remove_animation(&mut rig, 1).unwrap();
    assert_eq!(session.animation, 1);
    session.remove_animation(&mut rig, 1).unwrap();
    assert_eq!(session.animation, 0);
    // removing the last one lands on the auto-created default
    session.remove_animation(&mut rig, 0).unwrap();
    assert_eq!(session.animation, 0);
    assert_eq!(rig.animations().len(), 1);
}

#[test]
fn shortening_the_animation_pulls_the_cursor_back() {
    let mut rig = arm_rig();
    let mut session = Session::new();
    session.jump_to(&mut rig, 50).unwrap();

    session.set_animation_length(&mut rig, 10).unwrap();
    assert_eq!(session.frame, 10);
    assert_eq!(rig.animations()[0].length, 10);
}

#[test]
fn key_current_pose_records_the_selection() {
    let mut rig = arm_rig();
    let mut session = Session::new();
    session.select_bone(&rig, Some(1)).unwrap();
    session.jump_to(&mut rig, 6).unwrap();

    session.key_current_pose(&mut rig).unwrap();
    let frames = &rig.bone(1).unwrap().tracks[0].frames;
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[1].step, 6);
    assert_approx(frames[1].rotation[2], 20.0);
    // the unselected root pose matches its track and records nothing
    assert_eq!(rig.bone(0).unwrap().tracks[0].frames.len(), 1);
}

#[test]
fn rotate_selected_moves_the_pose_without_auto_key() {
    let mut rig = arm_rig();
    let mut session = Session::new();
    session.select_bone(&rig, Some(1)).unwrap();

    session.rotate_selected(&mut rig, Axis::Z, 15.0).unwrap();
    assert_approx(rig.bone(1).unwrap().rotation[2], 15.0);
    assert_eq!(rig.bone(1).unwrap().tracks[0].frames.len(), 2);
}

#[test]
fn rotate_selected_records_with_auto_key() {
    let mut rig = arm_rig();
    rig.bone_mut(1).unwrap().upper_limit[2] = 90.0;
    rig.bone_mut(1).unwrap().lower_limit[2] = -90.0;
    let mut session = Session::new();
    session.select_bone(&rig, Some(1)).unwrap();
    session.auto_key = true;
    session.jump_to(&mut rig, 5).unwrap();

    session.rotate_selected(&mut rig, Axis::Z, 120.0).unwrap();

    // the arm clamps at 90 and the excess lands on the root
    assert_approx(rig.bone(1).unwrap().rotation[2], 90.0);
    assert_approx(rig.bone(0).unwrap().rotation[2], 30.0);

    let arm = &rig.bone(1).unwrap().tracks[0].frames;
    assert_eq!(arm.len(), 3);
    assert_eq!(arm[1].step, 5);
    assert_approx(arm[1].rotation[2], 90.0);

    let root = &rig.bone(0).unwrap().tracks[0].frames;
    assert_eq!(root.len(), 2);
    assert_eq!(root[1].step, 5);
    assert_approx(root[1].rotation[2], 30.0);
}

#[test]
fn rotate_without_selection_is_a_no_op() {
    let mut rig = arm_rig();
    let mut session = Session::new();
    session.rotate_selected(&mut rig, Axis::X, 30.0).unwrap();
    assert_eq!(rig.bone(1).unwrap().rotation, [0.0; 3]);
}

#[test]
fn new_limits_retrofit_recorded_keyframes() {
    let mut rig = arm_rig();
    rig.bone_mut(1).unwrap().tracks[0].frames[1] = Keyframe {
        rotation: [0.0, 0.0, 120.0],
        step: 5,
    };
    rig.sort_track_frames(0).unwrap();
    let mut session = Session::new();
    session.select_bone(&rig, Some(1)).unwrap();

    session
        .set_rotation_limits(&mut rig, Axis::Z, -90.0, 90.0)
        .unwrap();

    // the over-limit keyframe is clamped and the excess keyed onto the root
    let arm = &rig.bone(1).unwrap().tracks[0].frames;
    assert_eq!(arm[1].step, 5);
    assert_approx(arm[1].rotation[2], 90.0);
    let root = &rig.bone(0).unwrap().tracks[0].frames;
    assert_eq!(root.len(), 2);
    assert_eq!(root[1].step, 5);
    assert_approx(root[1].rotation[2], 30.0);

    // the rig is back at the cursor's pose afterwards
    assert_approx(rig.bone(1).unwrap().rotation[2], 0.0);
}

#[test]
fn delete_selected_keyframe_reposes() {
    let mut rig = arm_rig();
    let mut session = Session::new();
    session.select_bone(&rig, Some(1)).unwrap();
    session.jump_to(&mut rig, 11).unwrap();
    assert_approx(rig.bone(1).unwrap().rotation[2], 40.0);

    assert!(session.delete_selected_keyframe(&mut rig).unwrap());
    assert_eq!(rig.bone(1).unwrap().tracks[0].frames.len(), 1);
    // with the keyframe gone the pose falls back to the remaining frame
    assert_approx(rig.bone(1).unwrap().rotation[2], 0.0);

    assert!(!session.delete_selected_keyframe(&mut rig).unwrap());
}

#[test]
fn deleting_the_selected_bone_clears_the_selection() {
    let mut rig = arm_rig();
    let mut session = Session::new();
    session.select_bone(&rig, Some(1)).unwrap();

    let remap = session.delete_selected_bone(&mut rig).unwrap();
    assert_eq!(remap.removed, vec![1]);
    assert_eq!(session.selected, None);
    assert_eq!(rig.bone_count(), 1);

    // nothing selected, nothing to delete
    let remap = session.delete_selected_bone(&mut rig).unwrap();
    assert!(remap.is_identity());
}
