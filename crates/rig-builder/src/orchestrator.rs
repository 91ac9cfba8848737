//! Build orchestration: lifecycle hooks and pass sequencing.

use std::ops::{Deref, DerefMut};

use rig_config::RigConfig;
use rig_core::NodeId;
use rig_graph::{GraphError, SceneGraph};
use tracing::{debug, debug_span, info, warn};

use crate::backend::Backend;
use crate::connections::{build_attribute_connections, build_io_connections};
use crate::constraints::build_constraints;
use crate::context::{BuildContext, BuildOutput};
use crate::error::BuildResult;
use crate::hierarchy::build_hierarchy;
use crate::operators::build_operators;
use crate::registry::IdentityRegistry;
use crate::sync::{SyncReport, synchronize};

/// Drives a [`Backend`] through the five build passes.
///
/// # Example
///
/// ```
/// use rig_builder::{Builder, RecordingBackend};
/// use rig_graph::{GraphBuilder, NodeKind};
///
/// let mut graph = GraphBuilder::new();
/// let rig = graph.add_root("Bob", NodeKind::Container);
/// let leg = graph.add_component(rig, "leg", "L");
/// graph.add_child(leg, "femur", NodeKind::Joint);
/// let graph = graph.build().unwrap();
///
/// let mut builder = Builder::new(RecordingBackend::new());
/// let output = builder.build(&graph, rig).unwrap();
///
/// assert_eq!(output.stats.nodes, 3);
/// assert_eq!(builder.backend().post_build_count(), 1);
/// ```
#[derive(Debug)]
pub struct Builder<B> {
    backend: B,
    config: RigConfig,
}

impl<B: Backend> Builder<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, RigConfig::default())
    }

    pub fn with_config(backend: B, config: RigConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Build the subtree at `root`.
    ///
    /// `post_build` runs on every path out of this call once `pre_build` has
    /// been attempted. When both a pass and the hook fail, the pass error is
    /// returned and the hook error is logged.
    pub fn build(&mut self, graph: &SceneGraph, root: NodeId) -> BuildResult<BuildOutput> {
        graph
            .node(root)
            .ok_or(GraphError::InvalidNodeRef { node: root })?;
        info!(
            root = %graph.full_path(root),
            nodes = graph.nodes().len(),
            "starting rig build"
        );

        let mut backend = PostBuildGuard::new(&mut self.backend);
        let result = backend
            .pre_build(graph, root)
            .and_then(|()| run_passes(&mut *backend, graph, root, &self.config));
        let output = backend.finish(result)?;

        info!(
            built = output.stats.nodes,
            registered = output.registry.len(),
            synthesized = output.stats.synthesized,
            "rig build complete"
        );
        Ok(output)
    }

    /// Pull host-side state back into `graph` for a registry from a previous build.
    pub fn synchronize(
        &mut self,
        graph: &mut SceneGraph,
        registry: &IdentityRegistry,
    ) -> BuildResult<SyncReport> {
        let _span = debug_span!("synchronize").entered();
        synchronize(&mut self.backend, graph, registry)
    }
}

/// Runs the five passes in order against a fresh context.
pub fn run_passes<B: Backend + ?Sized>(
    backend: &mut B,
    graph: &SceneGraph,
    root: NodeId,
    config: &RigConfig,
) -> BuildResult<BuildOutput> {
    let mut ctx = BuildContext::new(graph, &config.naming, &config.palette);

    {
        let _span = debug_span!("hierarchy").entered();
        build_hierarchy(&mut ctx, backend, root, None, None)?;
        debug!(nodes = ctx.stats.nodes, attributes = ctx.stats.attributes, "pass done");
    }
    {
        let _span = debug_span!("constraints").entered();
        build_constraints(&mut ctx, backend, root)?;
        debug!(constraints = ctx.stats.constraints, "pass done");
    }
    {
        let _span = debug_span!("attribute_connections").entered();
        build_attribute_connections(&mut ctx, backend, root)?;
        debug!(links = ctx.stats.attribute_links, "pass done");
    }
    {
        let _span = debug_span!("io_connections").entered();
        build_io_connections(&mut ctx, backend, root)?;
        debug!(
            connections = ctx.stats.connections,
            synthesized = ctx.stats.synthesized,
            "pass done"
        );
    }
    {
        let _span = debug_span!("operators").entered();
        build_operators(&mut ctx, backend, root)?;
        debug!(operators = ctx.stats.operators, "pass done");
    }

    Ok(ctx.into_output())
}

/// Scope guard that calls `post_build` exactly once.
///
/// [`finish`](Self::finish) runs the hook and merges its result with the pass
/// result; if the guard is dropped without finishing (a panic in a pass or a
/// backend), the hook runs from `Drop`.
struct PostBuildGuard<'b, B: Backend + ?Sized> {
    backend: &'b mut B,
    armed: bool,
}

impl<'b, B: Backend + ?Sized> PostBuildGuard<'b, B> {
    fn new(backend: &'b mut B) -> Self {
        Self {
            backend,
            armed: true,
        }
    }

    fn finish<T>(mut self, result: BuildResult<T>) -> BuildResult<T> {
        self.armed = false;
        let hook = self.backend.post_build();
        match (result, hook) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(hook_err)) => Err(hook_err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(hook_err)) => {
                warn!(error = %hook_err, "post-build hook failed after a build error");
                Err(err)
            }
        }
    }
}

impl<B: Backend + ?Sized> Deref for PostBuildGuard<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        &*self.backend
    }
}

impl<B: Backend + ?Sized> DerefMut for PostBuildGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        &mut *self.backend
    }
}

impl<B: Backend + ?Sized> Drop for PostBuildGuard<'_, B> {
    fn drop(&mut self) {
        if self.armed {
            self.armed = false;
            if let Err(err) = self.backend.post_build() {
                warn!(error = %err, "post-build hook failed during unwind");
            }
        }
    }
}
