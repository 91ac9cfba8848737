use thiserror::Error;

pub type RigResult<T> = Result<T, RigError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RigError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}
