use crate::{Axis, Error, Keyframe, Rig, Track};

impl Track {
    /// Index of the keyframe recorded exactly at `step`, if any.
    pub fn frame_index(&self, step: u32) -> Option<usize> {
        self.frames.iter().position(|f| f.step == step)
    }

    pub fn frame_at(&self, step: u32) -> Option<&Keyframe> {
        self.frame_index(step).map(|i| &self.frames[i])
    }

    /// Samples the track at a (possibly fractional) frame.
    ///
    /// Frames before the first keyframe clamp to it, frames past the last
    /// clamp to the last, and a frame landing exactly on a keyframe returns
    /// it verbatim. In between, each axis interpolates linearly along the
    /// shorter way around the circle, so 170 to -170 passes through 180
    /// rather than sweeping back through 0.
    pub fn sample(&self, frame: f32) -> [f32; 3] {
        let Some(first) = self.frames.first() else {
            return [0.0; 3];
        };
        if frame <= first.step as f32 {
            return first.rotation;
        }
        let mut i = 1;
        while i < self.frames.len() && frame > self.frames[i].step as f32 {
            i += 1;
        }
        if i == self.frames.len() {
            return self.frames[i - 1].rotation;
        }
        let next = &self.frames[i];
        if frame == next.step as f32 {
            return next.rotation;
        }
        let prev = &self.frames[i - 1];
        let t = (frame - prev.step as f32) / (next.step as f32 - prev.step as f32);
        let mut out = [0.0; 3];
        for axis in 0..3 {
            let d = wrap_delta(prev.rotation[axis], next.rotation[axis]);
            out[axis] = prev.rotation[axis] + d * t;
        }
        out
    }
}

/// Signed per-axis delta from `prev` to `next`, taking the shorter way
/// around the ±180 circle.
pub(crate) fn wrap_delta(prev: f32, next: f32) -> f32 {
    let direct = next - prev;
    let wrapped = (360.0 - prev.abs()) - next.abs();
    if direct.abs() < wrapped {
        direct
    } else if prev < 0.0 {
        -wrapped
    } else {
        wrapped
    }
}

impl Rig {
    /// Brings every bone's track list back in lockstep with the animation
    /// list, seeding a default track for each missing slot.
    pub fn verify_track_counts(&mut self) {
        let count = self.animations.len();
        for bone in self.bones.iter_mut() {
            bone.tracks.truncate(count);
            while bone.tracks.len() < count {
                bone.tracks.push(Track::seeded());
            }
        }
    }

    /// Restores ascending step order in every bone's track for one
    /// animation. Keyframe insertion appends, so call this after a batch of
    /// edits.
    pub fn sort_track_frames(&mut self, animation: usize) -> Result<(), Error> {
        if animation >= self.animations.len() {
            return Err(Error::UnknownAnimation { index: animation });
        }
        for bone in self.bones.iter_mut() {
            bone.tracks[animation].frames.sort_by_key(|f| f.step);
        }
        Ok(())
    }

    /// Records the current pose as keyframes at `step`.
    ///
    /// A bone that already has a keyframe there gets it overwritten in
    /// place. Otherwise a keyframe is appended only when the live rotation
    /// differs from what the track already interpolates to at that step;
    /// `target` names one bone that records unconditionally.
    pub fn set_keyframe(
        &mut self,
        animation: usize,
        step: u32,
        target: Option<usize>,
    ) -> Result<(), Error> {
        if animation >= self.animations.len() {
            return Err(Error::UnknownAnimation { index: animation });
        }
        if let Some(t) = target {
            if t >= self.bones.len() {
                return Err(Error::UnknownBone { id: t });
            }
        }
        for bone in self.bones.iter_mut() {
            let rotation = bone.rotation;
            let track = &mut bone.tracks[animation];
            if let Some(i) = track.frame_index(step) {
                track.frames[i].rotation = rotation;
            } else if rotation != track.sample(step as f32) || target == Some(bone.id) {
                track.frames.push(Keyframe { rotation, step });
            }
        }
        Ok(())
    }

    /// Removes one bone's keyframe at `step`, if present. Returns whether a
    /// frame was removed; the last remaining frame of a track is never
    /// removed.
    pub fn delete_keyframe(
        &mut self,
        animation: usize,
        bone: usize,
        step: u32,
    ) -> Result<bool, Error> {
        if animation >= self.animations.len() {
            return Err(Error::UnknownAnimation { index: animation });
        }
        let bone = self.bone_mut(bone)?;
        let track = &mut bone.tracks[animation];
        if track.frames.len() <= 1 {
            return Ok(false);
        }
        match track.frame_index(step) {
            Some(i) => {
                track.frames.remove(i);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drops keyframes recorded past the animation's length, reseeding any
    /// track that ends up empty.
    pub(crate) fn remove_excess_keyframes(&mut self, animation: usize) {
        let length = self.animations[animation].length;
        for bone in self.bones.iter_mut() {
            let track = &mut bone.tracks[animation];
            track.frames.retain(|f| f.step <= length);
            if track.frames.is_empty() {
                *track = Track::seeded();
            }
        }
    }

    /// Poses every bone from its track at the given frame.
    pub fn apply_pose(&mut self, animation: usize, frame: f32) -> Result<(), Error> {
        if animation >= self.animations.len() {
            return Err(Error::UnknownAnimation { index: animation });
        }
        for bone in self.bones.iter_mut() {
            bone.rotation = bone.tracks[animation].sample(frame);
        }
        Ok(())
    }

    /// Zeroes every bone's live rotation without touching any track.
    pub fn reset_pose(&mut self) {
        for bone in self.bones.iter_mut() {
            bone.rotation = [0.0; 3];
        }
    }

    /// Writes one axis of a bone's live rotation into its track at `step`:
    /// in place when a keyframe exists there, otherwise as a new keyframe
    /// carrying the full live rotation. Callers have validated both indices.
    pub(crate) fn record_axis(&mut self, animation: usize, bone: usize, step: u32, axis: Axis) {
        let rotation = self.bones[bone].rotation;
        let track = &mut self.bones[bone].tracks[animation];
        if let Some(i) = track.frame_index(step) {
            track.frames[i].rotation[axis.index()] = rotation[axis.index()];
        } else {
            track.frames.push(Keyframe { rotation, step });
        }
    }
}
