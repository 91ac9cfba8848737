//! rig-core: stable foundation for the rig builder.
//!
//! Contains:
//! - ids (stable compact IDs for scene graph entities)
//! - error (shared error types)
//! - xfo (local transform value carried by every scene item)

pub mod error;
pub mod ids;
pub mod xfo;

// Re-exports: nice ergonomics for downstream crates
pub use error::{RigError, RigResult};
pub use ids::*;
pub use xfo::Xfo;
