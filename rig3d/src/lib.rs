//! Skeletal rigging and keyframe-animation core for 3D models.
//!
//! This crate is renderer- and UI-agnostic. Windowing, drawing, picking and
//! file dialogs live with the host application; the core owns the bone tree,
//! the per-bone rotation tracks, interpolation and rotation-limit
//! propagation.

#![forbid(unsafe_code)]

mod animation;
mod error;
mod limits;
mod model;
mod rig;
mod session;
mod text;

pub use error::*;
pub use model::*;
pub use rig::*;
pub use session::*;
pub use text::*;




#[cfg(test)]
mod session_tests;
