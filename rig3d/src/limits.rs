use crate::{Axis, Error, ROTATION_LIMIT, Rig};

impl Rig {
    /// Clamps a bone's live rotation to its per-axis limits, pushing any
    /// excess onto the parent, and repeats up the chain until nothing
    /// overflows. The root clamps and discards.
    ///
    /// An axis whose limits sit at exactly ±[`ROTATION_LIMIT`] is
    /// unconstrained; its value is only normalized back into that range.
    /// With `record` set, every clamped bone and the parent absorbing its
    /// excess get the result written into their tracks at `frame`.
    pub fn enforce_limits(
        &mut self,
        animation: usize,
        bone: usize,
        frame: u32,
        record: bool,
    ) -> Result<(), Error> {
        if animation >= self.animations.len() {
            return Err(Error::UnknownAnimation { index: animation });
        }
        if bone >= self.bones.len() {
            return Err(Error::UnknownBone { id: bone });
        }

        let mut current = bone;
        loop {
            let parent = self.bones[current].parent;
            let mut overflowed = false;

            for axis in Axis::ALL {
                let i = axis.index();
                let upper = self.bones[current].upper_limit[i];
                let lower = self.bones[current].lower_limit[i];
                let value = self.bones[current].rotation[i];

                if upper == ROTATION_LIMIT && lower == -ROTATION_LIMIT {
                    let mut v = value;
                    while v > ROTATION_LIMIT {
                        v -= 360.0;
                    }
                    while v < -ROTATION_LIMIT {
                        v += 360.0;
                    }
                    self.bones[current].rotation[i] = v;
                    continue;
                }

                let excess = if value > upper {
                    self.bones[current].rotation[i] = upper;
                    value - upper
                } else if value < lower {
                    self.bones[current].rotation[i] = lower;
                    value - lower
                } else {
                    continue;
                };

                if record {
                    self.record_axis(animation, current, frame, axis);
                }
                let Some(p) = parent else { continue };
                self.bones[p].rotation[i] += excess;
                overflowed = true;
                if record {
                    self.record_axis(animation, p, frame, axis);
                }
            }

            match (overflowed, parent) {
                (true, Some(p)) => current = p,
                _ => break,
            }
        }
        Ok(())
    }
}
