//! rig-builder: translates a rig scene graph into a host scene.
//!
//! The [`Builder`] walks a [`SceneGraph`](rig_graph::SceneGraph) in five
//! passes, each a full pre-order tree walk:
//!
//! 1. hierarchy: create every node's host item and decorate it
//! 2. constraints declared on nodes
//! 3. attribute driver links
//! 4. component IO connections (transform connections become pose constraints)
//! 5. component operators
//!
//! Later passes look up host items created by earlier ones through the
//! [`IdentityRegistry`] owned by the run. Hosts implement [`Backend`];
//! [`RecordingBackend`] records calls instead and is what the tests use.

pub mod backend;
pub mod connections;
pub mod constraints;
pub mod context;
pub mod error;
pub mod hierarchy;
pub mod naming;
pub mod operators;
pub mod orchestrator;
pub mod recording;
pub mod registry;
pub mod sync;

pub use backend::{
    AttributeGroupRequest, AttributeLink, AttributeRequest, Backend, ConstraintRequest,
    ItemRequest, OperatorRequest, ResolvedBinding, TargetHandle,
};
pub use context::{BuildContext, BuildOutput, BuildStats};
pub use error::{BuildError, BuildResult};
pub use naming::NameResolver;
pub use orchestrator::Builder;
pub use recording::{BackendCall, CreateOp, RecordingBackend};
pub use registry::{IdentityRegistry, Pairing, SourceId};
pub use sync::{SyncReport, synchronize};
