use crate::{AnimationDesc, Error, ROTATION_LIMIT, Track};

/// Sentinel for external per-vertex bone assignment meaning "no bone".
pub const NO_BONE: i32 = -1;

/// One segment of the skeleton: a pivot, a tip offset relative to the pivot,
/// live rotation state, per-axis rotation limits and one [`Track`] per global
/// animation.
#[derive(Clone, Debug)]
pub struct Bone {
    pub(crate) id: usize,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,

    pub name: String,
    pub position: [f32; 3],
    pub end_offset: [f32; 3],

    /// Live rotation in degrees, indexed by [`crate::Axis`].
    pub rotation: [f32; 3],
    pub upper_limit: [f32; 3],
    pub lower_limit: [f32; 3],

    /// Parallel to [`Rig::animations`]; kept in lockstep by
    /// [`Rig::verify_track_counts`].
    pub tracks: Vec<Track>,
}

impl Bone {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// The bone's tip in model space: pivot plus end offset.
    pub fn tip(&self) -> [f32; 3] {
        [
            self.position[0] + self.end_offset[0],
            self.position[1] + self.end_offset[1],
            self.position[2] + self.end_offset[2],
        ]
    }

    pub fn track(&self, animation: usize) -> Option<&Track> {
        self.tracks.get(animation)
    }

    fn default_name(id: usize, is_root: bool) -> String {
        if is_root {
            "root".to_string()
        } else {
            format!("bone{id}")
        }
    }
}

#[cfg(feature = "glam")]
impl Bone {
    pub fn position_vec3(&self) -> glam::Vec3 {
        glam::Vec3::from_array(self.position)
    }

    pub fn tip_vec3(&self) -> glam::Vec3 {
        glam::Vec3::from_array(self.tip())
    }
}

/// Result of a bone deletion: which ids died and which surviving bones were
/// reassigned to keep ids densely packed. External indexes that store bone
/// ids by value (e.g. per-vertex paint buffers) translate through [`map`].
///
/// [`map`]: BoneRemap::map
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoneRemap {
    /// Deleted ids, sorted ascending. They map to [`NO_BONE`].
    pub removed: Vec<usize>,
    /// `(old id, new id)` pairs for bones that were reassigned.
    pub moved: Vec<(usize, usize)>,
}

impl BoneRemap {
    /// Translates an external bone reference through this remap. Negative
    /// values pass through as [`NO_BONE`].
    pub fn map(&self, id: i32) -> i32 {
        if id < 0 {
            return NO_BONE;
        }
        let id = id as usize;
        if self.removed.binary_search(&id).is_ok() {
            return NO_BONE;
        }
        for &(old, new) in &self.moved {
            if old == id {
                return new as i32;
            }
        }
        id as i32
    }

    pub fn is_identity(&self) -> bool {
        self.removed.is_empty() && self.moved.is_empty()
    }
}

/// The bone arena plus the global animation list.
///
/// Bones are indexed by id and ids stay densely packed in
/// `[0, bone_count())`: deletion recycles freed ids and reassigns any bone
/// whose id fell past the new count. At least one animation always exists.
#[derive(Clone, Debug)]
pub struct Rig {
    pub(crate) bones: Vec<Bone>,
    /// Recycling pool, sorted ascending.
    pub(crate) free_ids: Vec<usize>,
    pub(crate) next_id: usize,
    pub(crate) animations: Vec<AnimationDesc>,
}

impl Default for Rig {
    fn default() -> Self {
        Self::new()
    }
}

impl Rig {
    pub fn new() -> Self {
        Rig {
            bones: Vec::new(),
            free_ids: Vec::new(),
            next_id: 0,
            animations: vec![AnimationDesc::default_for(0)],
        }
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, id: usize) -> Result<&Bone, Error> {
        self.bones.get(id).ok_or(Error::UnknownBone { id })
    }

    pub fn bone_mut(&mut self, id: usize) -> Result<&mut Bone, Error> {
        self.bones.get_mut(id).ok_or(Error::UnknownBone { id })
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn root_id(&self) -> Option<usize> {
        self.bones.iter().position(|b| b.parent.is_none())
    }

    pub fn animations(&self) -> &[AnimationDesc] {
        &self.animations
    }

    pub fn animation(&self, index: usize) -> Result<&AnimationDesc, Error> {
        self.animations
            .get(index)
            .ok_or(Error::UnknownAnimation { index })
    }

    pub fn free_ids(&self) -> &[usize] {
        &self.free_ids
    }

    /// Creates a bone and returns its id (the lowest recycled id when the
    /// pool is non-empty, else a fresh one).
    ///
    /// An empty rig takes `None` and creates the root. A non-empty rig
    /// requires a parent; the new bone's pivot seeds to the parent's tip.
    pub fn create_bone(&mut self, parent: Option<usize>) -> Result<usize, Error> {
        let parent = match (self.bones.is_empty(), parent) {
            (true, None) => None,
            (true, Some(id)) => return Err(Error::UnknownBone { id }),
            (false, None) => return Err(Error::MissingParent),
            (false, Some(p)) => {
                if p >= self.bones.len() {
                    return Err(Error::UnknownBone { id: p });
                }
                Some(p)
            }
        };

        let id = self.allocate_id();
        let (name, position) = match parent {
            None => (Bone::default_name(id, true), [0.0; 3]),
            Some(p) => (Bone::default_name(id, false), self.bones[p].tip()),
        };

        self.bones.push(Bone {
            id,
            parent,
            children: Vec::new(),
            name,
            position,
            end_offset: [0.0; 3],
            rotation: [0.0; 3],
            upper_limit: [ROTATION_LIMIT; 3],
            lower_limit: [-ROTATION_LIMIT; 3],
            tracks: self.animations.iter().map(|_| Track::seeded()).collect(),
        });
        if let Some(p) = parent {
            self.bones[p].children.push(id);
        }
        Ok(id)
    }

    fn allocate_id(&mut self) -> usize {
        if self.free_ids.is_empty() {
            let id = self.next_id;
            self.next_id += 1;
            id
        } else {
            self.free_ids.remove(0)
        }
    }

    /// Deletes a bone and its whole subtree.
    ///
    /// Freed ids enter the recycling pool sorted ascending; surviving bones
    /// whose id is now past the new count are reassigned the lowest free ids
    /// (in ascending old-id order) so ids stay dense. The returned
    /// [`BoneRemap`] must be applied to any external index that references
    /// bone ids by value.
    pub fn delete_bone(&mut self, id: usize) -> Result<BoneRemap, Error> {
        if id >= self.bones.len() {
            return Err(Error::UnknownBone { id });
        }

        if let Some(p) = self.bones[id].parent {
            self.bones[p].children.retain(|&c| c != id);
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(b) = stack.pop() {
            removed.push(b);
            stack.extend_from_slice(&self.bones[b].children);
        }
        removed.sort_unstable();

        let old_len = self.bones.len();
        let new_len = old_len - removed.len();

        let mut doomed = vec![false; old_len];
        for &d in &removed {
            doomed[d] = true;
            insert_sorted(&mut self.free_ids, d);
        }

        // Old id -> new id for every survivor. Survivors below the new count
        // keep their id; the rest take the lowest free ids and hand their own
        // id back to the pool.
        let mut table: Vec<Option<usize>> = (0..old_len)
            .map(|i| if doomed[i] { None } else { Some(i) })
            .collect();
        let mut moved = Vec::new();
        for old in new_len..old_len {
            if doomed[old] {
                continue;
            }
            let new = self.free_ids.remove(0);
            insert_sorted(&mut self.free_ids, old);
            table[old] = Some(new);
            moved.push((old, new));
        }

        let mut slots: Vec<Option<Bone>> = (0..new_len).map(|_| None).collect();
        for (old, mut bone) in self.bones.drain(..).enumerate() {
            let Some(new) = table[old] else { continue };
            bone.id = new;
            bone.parent = bone.parent.and_then(|p| table[p]);
            for child in bone.children.iter_mut() {
                if let Some(c) = table[*child] {
                    *child = c;
                }
            }
            slots[new] = Some(bone);
        }
        self.bones = slots.into_iter().flatten().collect();

        Ok(BoneRemap { removed, moved })
    }

    /// Renames a bone; an empty name falls back to the default
    /// (`root` / `bone<id>`).
    pub fn rename_bone(&mut self, id: usize, name: &str) -> Result<(), Error> {
        let is_root = self.root_id() == Some(id);
        let bone = self.bone_mut(id)?;
        bone.name = if name.is_empty() {
            Bone::default_name(id, is_root)
        } else {
            name.to_string()
        };
        Ok(())
    }

    /// Recomputes pivot positions down the subtree so every bone sits at its
    /// parent's tip. Call after editing an end offset.
    pub fn update_bone_coords(&mut self, id: usize) -> Result<(), Error> {
        if id >= self.bones.len() {
            return Err(Error::UnknownBone { id });
        }
        let mut stack = vec![id];
        while let Some(b) = stack.pop() {
            if let Some(p) = self.bones[b].parent {
                let tip = self.bones[p].tip();
                self.bones[b].position = tip;
            }
            stack.extend_from_slice(&self.bones[b].children);
        }
        Ok(())
    }

    /// Appends a new default animation and returns its index. Every bone
    /// gains a seeded track.
    pub fn add_animation(&mut self) -> usize {
        let index = self.animations.len();
        self.animations.push(AnimationDesc::default_for(index));
        self.verify_track_counts();
        index
    }

    /// Removes an animation and every bone's matching track in lockstep.
    /// Removing the last animation immediately recreates a default one.
    pub fn remove_animation(&mut self, index: usize) -> Result<(), Error> {
        if index >= self.animations.len() {
            return Err(Error::UnknownAnimation { index });
        }
        self.animations.remove(index);
        for bone in self.bones.iter_mut() {
            if index < bone.tracks.len() {
                bone.tracks.remove(index);
            }
        }
        if self.animations.is_empty() {
            self.add_animation();
        }
        Ok(())
    }

    /// Renames an animation; an empty name falls back to `animation<index>`.
    pub fn rename_animation(&mut self, index: usize, name: &str) -> Result<(), Error> {
        if index >= self.animations.len() {
            return Err(Error::UnknownAnimation { index });
        }
        self.animations[index].name = if name.is_empty() {
            AnimationDesc::default_for(index).name
        } else {
            name.to_string()
        };
        Ok(())
    }

    /// Sets an animation's length (clamped to >= 1) and strips keyframes
    /// beyond it.
    pub fn set_animation_length(&mut self, index: usize, length: u32) -> Result<(), Error> {
        if index >= self.animations.len() {
            return Err(Error::UnknownAnimation { index });
        }
        self.animations[index].length = length.max(1);
        self.remove_excess_keyframes(index);
        Ok(())
    }

    /// Collapses the animation list back to a single default animation and
    /// reseeds every bone's tracks.
    pub fn reset_animations(&mut self) {
        self.animations.clear();
        self.animations.push(AnimationDesc::default_for(0));
        for bone in self.bones.iter_mut() {
            bone.tracks.clear();
        }
        self.verify_track_counts();
    }
}

fn insert_sorted(ids: &mut Vec<usize>, id: usize) {
    let at = ids.partition_point(|&f| f < id);
    ids.insert(at, id);
}
