use crate::{Axis, BoneRemap, Error, Rig};

/// Editing and playback cursor over a [`Rig`]: the current animation and
/// frame, the selected bone, and whether edits record keyframes as they
/// happen.
///
/// The session owns no skeleton data; every operation takes the rig it acts
/// on.
#[derive(Clone, Debug)]
pub struct Session {
    pub animation: usize,
    /// Current frame, 1-based, always within the current animation's length.
    pub frame: u32,
    pub selected: Option<usize>,
    pub auto_key: bool,
    pub playing: bool,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            animation: 0,
            frame: 1,
            selected: None,
            auto_key: false,
            playing: false,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances playback by one frame, wrapping at the animation's end, and
    /// poses the rig. Does nothing while paused.
    pub fn tick(&mut self, rig: &mut Rig) -> Result<(), Error> {
        if !self.playing {
            return Ok(());
        }
        let length = rig.animation(self.animation)?.length;
        self.frame += 1;
        if self.frame > length {
            self.frame = 1;
        }
        rig.apply_pose(self.animation, self.frame as f32)
    }

    /// Moves the cursor to `frame`, clamped into the animation's timeline,
    /// and poses the rig there.
    pub fn jump_to(&mut self, rig: &mut Rig, frame: u32) -> Result<(), Error> {
        let length = rig.animation(self.animation)?.length;
        self.frame = frame.clamp(1, length);
        rig.apply_pose(self.animation, self.frame as f32)
    }

    /// Switches to another animation, rewinding to frame 1.
    pub fn select_animation(&mut self, rig: &mut Rig, index: usize) -> Result<(), Error> {
        rig.animation(index)?;
        self.animation = index;
        self.frame = 1;
        rig.apply_pose(self.animation, 1.0)
    }

    pub fn select_bone(&mut self, rig: &Rig, id: Option<usize>) -> Result<(), Error> {
        if let Some(id) = id {
            rig.bone(id)?;
        }
        self.selected = id;
        Ok(())
    }

    /// Appends a new animation and switches to it.
    pub fn add_animation(&mut self, rig: &mut Rig) -> Result<usize, Error> {
        let index = rig.add_animation();
        self.select_animation(rig, index)?;
        Ok(index)
    }

    /// Removes an animation, keeping the cursor on a valid one.
    pub fn remove_animation(&mut self, rig: &mut Rig, index: usize) -> Result<(), Error> {
        rig.remove_animation(index)?;
        if self.animation >= index {
            self.animation = self.animation.saturating_sub(1);
        }
        self.animation = self.animation.min(rig.animations().len() - 1);
        let length = rig.animation(self.animation)?.length;
        self.frame = self.frame.clamp(1, length);
        rig.apply_pose(self.animation, self.frame as f32)
    }

    /// Resizes the current animation, pulling the cursor back inside it if
    /// needed.
    pub fn set_animation_length(&mut self, rig: &mut Rig, length: u32) -> Result<(), Error> {
        rig.set_animation_length(self.animation, length)?;
        let length = rig.animation(self.animation)?.length;
        self.frame = self.frame.clamp(1, length);
        rig.apply_pose(self.animation, self.frame as f32)
    }

    /// Records the rig's current pose at the cursor. The selected bone
    /// records unconditionally; others only where the pose actually differs
    /// from the track.
    pub fn key_current_pose(&mut self, rig: &mut Rig) -> Result<(), Error> {
        rig.sort_track_frames(self.animation)?;
        rig.set_keyframe(self.animation, self.frame, self.selected)?;
        rig.sort_track_frames(self.animation)
    }

    /// Rotates the selected bone by `delta` degrees around one axis,
    /// recording a keyframe when auto-key is on, then enforces its limits.
    /// Does nothing without a selection.
    pub fn rotate_selected(&mut self, rig: &mut Rig, axis: Axis, delta: f32) -> Result<(), Error> {
        let Some(bone) = self.selected else {
            return Ok(());
        };
        rig.animation(self.animation)?;
        rig.bone_mut(bone)?.rotation[axis.index()] += delta;
        if self.auto_key {
            rig.record_axis(self.animation, bone, self.frame, axis);
        }
        rig.enforce_limits(self.animation, bone, self.frame, self.auto_key)?;
        rig.sort_track_frames(self.animation)
    }

    /// Sets one axis' rotation limits on the selected bone and replays every
    /// keyframe of its current track through the constraint so already
    /// recorded poses obey the new bounds. Frames other than the cursor's
    /// always record the clamped result back; the cursor's frame only does
    /// with auto-key on.
    pub fn set_rotation_limits(
        &mut self,
        rig: &mut Rig,
        axis: Axis,
        lower: f32,
        upper: f32,
    ) -> Result<(), Error> {
        let Some(bone) = self.selected else {
            return Ok(());
        };
        rig.animation(self.animation)?;
        let i = axis.index();
        {
            let b = rig.bone_mut(bone)?;
            b.lower_limit[i] = lower;
            b.upper_limit[i] = upper;
        }

        let steps: Vec<u32> = rig.bone(bone)?.tracks[self.animation]
            .frames
            .iter()
            .map(|f| f.step)
            .collect();
        for step in steps {
            rig.apply_pose(self.animation, step as f32)?;
            let record = self.auto_key || step != self.frame;
            rig.enforce_limits(self.animation, bone, step, record)?;
        }
        rig.apply_pose(self.animation, self.frame as f32)?;
        rig.sort_track_frames(self.animation)
    }

    /// Deletes the selected bone's keyframe at the cursor, if any.
    pub fn delete_selected_keyframe(&mut self, rig: &mut Rig) -> Result<bool, Error> {
        let Some(bone) = self.selected else {
            return Ok(false);
        };
        let removed = rig.delete_keyframe(self.animation, bone, self.frame)?;
        if removed {
            rig.apply_pose(self.animation, self.frame as f32)?;
        }
        Ok(removed)
    }

    /// Deletes the selected bone's subtree and clears the selection. Returns
    /// the remap for any external per-vertex indexes.
    pub fn delete_selected_bone(&mut self, rig: &mut Rig) -> Result<BoneRemap, Error> {
        let Some(id) = self.selected else {
            return Ok(BoneRemap::default());
        };
        let remap = rig.delete_bone(id)?;
        self.selected = None;
        Ok(remap)
    }
}
