use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown bone id: {id}")]
    UnknownBone { id: usize },

    #[error("unknown animation index: {index}")]
    UnknownAnimation { index: usize },

    #[error("a root bone already exists; new bones need a parent")]
    MissingParent,

    #[error("failed to parse skeleton data: {message}")]
    SkeletonParse { message: String },

    #[error("failed to parse animation data: {message}")]
    AnimationParse { message: String },
}
