//! Capability abstraction shared by `GaussianBasis` and the Slater engine:
//! `{clone, num_mos, compute_mo(cube, state), compute_density(cube)}`.
//!
//! Modeled as a trait implemented by two concrete types rather than
//! inheritance with virtual mutators. `compute_mo`/`compute_density` take
//! `self: Arc<Self>` because dispatch hands ownership of a shared, read-only
//! snapshot of the basis to a background worker; the caller keeps evaluating
//! through its own `Arc` clone. This is what lets the loader façade return
//! one `Arc<dyn EvaluableBasis>` regardless of which concrete basis kind a
//! file format produced.

use std::sync::Arc;

use crate::cube::Cube;

/// Invoked exactly once, after the cube's write lock has been released.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

pub trait EvaluableBasis: Send + Sync {
    /// Total MO/AO column count: sum of component counts, not shell count.
    fn num_mos(&self) -> usize;

    /// Dispatches an MO evaluation over `cube`. Returns `true` iff work was
    /// actually dispatched; on `true`, `cube`'s tag has already been set
    /// before this call returns.
    fn compute_mo(self: Arc<Self>, cube: &Cube, state: usize, on_finished: CompletionCallback) -> bool;

    /// Dispatches a density evaluation over `cube`.
    fn compute_density(self: Arc<Self>, cube: &Cube, on_finished: CompletionCallback) -> bool;

    /// Independent deep copy, including the MO and density matrices,
    /// excluding any in-flight work.
    fn deep_clone(&self) -> Arc<dyn EvaluableBasis>;
}
