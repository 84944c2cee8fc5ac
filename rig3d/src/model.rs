/// Default per-axis rotation bound in degrees. A bone whose upper and lower
/// limits both sit at ±`ROTATION_LIMIT` is treated as unconstrained.
pub const ROTATION_LIMIT: f32 = 180.0;

/// Length, in frames, of a freshly created animation.
pub const DEFAULT_ANIMATION_LENGTH: u32 = 60;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// One recorded rotation on a bone's timeline. `step` is 1-based and unique
/// within a track.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe {
    /// Rotation in degrees, indexed by [`Axis`].
    pub rotation: [f32; 3],
    pub step: u32,
}

/// The keyframes one bone holds for one animation. Kept sorted ascending by
/// step and never empty.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track {
    pub frames: Vec<Keyframe>,
}

impl Track {
    /// A new track anchored by the default frame at step 1.
    pub(crate) fn seeded() -> Self {
        Track {
            frames: vec![Keyframe {
                rotation: [0.0; 3],
                step: 1,
            }],
        }
    }
}

/// Global animation descriptor, shared by every bone: all bones hold exactly
/// one [`Track`] per descriptor, in the same order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationDesc {
    pub name: String,
    /// Timeline length in frames, always >= 1.
    pub length: u32,
}

impl AnimationDesc {
    pub(crate) fn default_for(index: usize) -> Self {
        AnimationDesc {
            name: format!("animation{index}"),
            length: DEFAULT_ANIMATION_LENGTH,
        }
    }
}
