//! Line-oriented text formats for skeletons and animations.
//!
//! Both documents carry one field per line. Lines starting with `//` are
//! comments and trailing blank lines are tolerated. Parsing goes through
//! temporaries and commits last, so a malformed document leaves the rig
//! untouched.

use std::fmt::Write as _;

use crate::{AnimationDesc, Bone, Error, Keyframe, Rig, Track};

struct Cursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        let mut lines: Vec<&str> = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.trim_start().starts_with("//"))
            .collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        Cursor { lines, pos: 0 }
    }

    fn next(&mut self, what: &str) -> Result<&'a str, String> {
        match self.lines.get(self.pos) {
            Some(&line) => {
                self.pos += 1;
                Ok(line.trim())
            }
            None => Err(format!("unexpected end of input, expected {what}")),
        }
    }

    fn next_f32(&mut self, what: &str) -> Result<f32, String> {
        let line = self.next(what)?;
        line.parse().map_err(|_| format!("invalid {what}: {line:?}"))
    }

    fn next_u32(&mut self, what: &str) -> Result<u32, String> {
        let line = self.next(what)?;
        line.parse().map_err(|_| format!("invalid {what}: {line:?}"))
    }

    fn next_i64(&mut self, what: &str) -> Result<i64, String> {
        let line = self.next(what)?;
        line.parse().map_err(|_| format!("invalid {what}: {line:?}"))
    }

    fn next_usize(&mut self, what: &str) -> Result<usize, String> {
        let line = self.next(what)?;
        line.parse().map_err(|_| format!("invalid {what}: {line:?}"))
    }

    fn next_triple(&mut self, what: &str) -> Result<[f32; 3], String> {
        Ok([
            self.next_f32(what)?,
            self.next_f32(what)?,
            self.next_f32(what)?,
        ])
    }
}

fn skeleton_err(message: String) -> Error {
    Error::SkeletonParse { message }
}

fn animation_err(message: String) -> Error {
    Error::AnimationParse { message }
}

/// Serializes the bone hierarchy. Live rotation and tracks are not part of
/// the skeleton document.
pub fn write_skeleton(rig: &Rig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", rig.bone_count());
    for bone in rig.bones() {
        let _ = writeln!(out, "{}", bone.id());
        let _ = writeln!(out, "{}", bone.name);
        for v in bone.position {
            let _ = writeln!(out, "{v}");
        }
        for v in bone.end_offset {
            let _ = writeln!(out, "{v}");
        }
        let parent = bone.parent().map(|p| p as i64).unwrap_or(-1);
        let _ = writeln!(out, "{parent}");
        for v in bone.upper_limit {
            let _ = writeln!(out, "{v}");
        }
        for v in bone.lower_limit {
            let _ = writeln!(out, "{v}");
        }
    }
    out
}

/// Parses a skeleton document into a fresh rig with zero live rotation, a
/// single default animation and seeded tracks.
///
/// Records must appear in id order with dense ids, each parent must precede
/// its children and at most one record may be the root.
pub fn parse_skeleton(text: &str) -> Result<Rig, Error> {
    let mut cur = Cursor::new(text);
    let count = cur.next_usize("bone count").map_err(skeleton_err)?;

    let mut bones = Vec::with_capacity(count);
    let mut roots = 0usize;
    for record in 0..count {
        let id = cur.next_usize("bone id").map_err(skeleton_err)?;
        if id != record {
            return Err(skeleton_err(format!(
                "bone ids must be dense and in order, got {id} at record {record}"
            )));
        }
        let name = cur.next("bone name").map_err(skeleton_err)?.to_string();
        let position = cur.next_triple("bone position").map_err(skeleton_err)?;
        let end_offset = cur.next_triple("bone end offset").map_err(skeleton_err)?;
        let parent = cur.next_i64("parent id").map_err(skeleton_err)?;
        let parent = if parent < 0 {
            roots += 1;
            None
        } else {
            let p = parent as usize;
            if p >= record {
                return Err(skeleton_err(format!(
                    "bone {id} names parent {p}, but parents must precede children"
                )));
            }
            Some(p)
        };
        let upper_limit = cur.next_triple("upper limit").map_err(skeleton_err)?;
        let lower_limit = cur.next_triple("lower limit").map_err(skeleton_err)?;

        bones.push(Bone {
            id,
            parent,
            children: Vec::new(),
            name,
            position,
            end_offset,
            rotation: [0.0; 3],
            upper_limit,
            lower_limit,
            tracks: Vec::new(),
        });
    }
    if count > 0 && roots != 1 {
        return Err(skeleton_err(format!(
            "expected exactly one root bone, found {roots}"
        )));
    }

    let links: Vec<(usize, Option<usize>)> =
        bones.iter().map(|b| (b.id, b.parent)).collect();
    for (id, parent) in links {
        if let Some(p) = parent {
            bones[p].children.push(id);
        }
    }

    let mut rig = Rig {
        bones,
        free_ids: Vec::new(),
        next_id: count,
        animations: vec![AnimationDesc::default_for(0)],
    };
    rig.verify_track_counts();
    Ok(rig)
}

/// Serializes one animation: every bone's track, with the animation's name
/// and length repeated per record.
pub fn write_animation(rig: &Rig, animation: usize) -> Result<String, Error> {
    let desc = rig.animation(animation)?;
    let mut out = String::new();
    let _ = writeln!(out, "{}", rig.bone_count());
    for bone in rig.bones() {
        let _ = writeln!(out, "{}", bone.id());
        let _ = writeln!(out, "{}", desc.name);
        let _ = writeln!(out, "{}", desc.length);
        let track = &bone.tracks[animation];
        let _ = writeln!(out, "{}", track.frames.len());
        for frame in &track.frames {
            for v in frame.rotation {
                let _ = writeln!(out, "{v}");
            }
            let _ = writeln!(out, "{}", frame.step);
        }
    }
    Ok(out)
}

/// Parses an animation document and appends it to the rig as a new
/// animation, returning its index.
///
/// Name and length come from the first record. Records naming a bone id the
/// rig does not have are skipped; bones the document does not mention keep a
/// seeded track, as does any record with an empty frame list.
pub fn parse_animation(rig: &mut Rig, text: &str) -> Result<usize, Error> {
    let mut cur = Cursor::new(text);
    let count = cur.next_usize("bone count").map_err(animation_err)?;

    let mut name: Option<String> = None;
    let mut length = 0u32;
    let mut records: Vec<(usize, Vec<Keyframe>)> = Vec::with_capacity(count);
    for _ in 0..count {
        let bone = cur.next_usize("bone id").map_err(animation_err)?;
        let record_name = cur.next("animation name").map_err(animation_err)?;
        let record_length = cur.next_u32("animation length").map_err(animation_err)?;
        let frame_count = cur.next_usize("keyframe count").map_err(animation_err)?;
        let mut frames = Vec::with_capacity(frame_count);
        for _ in 0..frame_count {
            let rotation = cur.next_triple("keyframe rotation").map_err(animation_err)?;
            let step = cur.next_u32("keyframe step").map_err(animation_err)?;
            frames.push(Keyframe { rotation, step });
        }
        if name.is_none() {
            name = Some(record_name.to_string());
            length = record_length;
        }
        records.push((bone, frames));
    }

    let index = rig.animations.len();
    let name = name.unwrap_or_else(|| AnimationDesc::default_for(index).name);
    rig.animations.push(AnimationDesc {
        name,
        length: length.max(1),
    });
    rig.verify_track_counts();
    for (bone, frames) in records {
        if bone >= rig.bone_count() {
            continue;
        }
        rig.bones[bone].tracks[index] = if frames.is_empty() {
            Track::seeded()
        } else {
            Track { frames }
        };
    }
    rig.sort_track_frames(index)?;
    Ok(index)
}
