//! Minimal Slater-type-orbital basis container.
//!
//! The Slater engine's analytical kernels are a parallel concern with their
//! own kernel set; only the Gaussian engine is implemented here.
//! `SlaterBasis` exists only so the loader façade can be polymorphic over
//! basis kinds: it shares `GaussianBasis`'s capability set
//! (`EvaluableBasis`), but `compute_mo`/`compute_density` have nothing to
//! dispatch and report that by returning `false`, the same way
//! `GaussianBasis` reports an empty basis.

use std::sync::Arc;

use crate::basis::capability::{CompletionCallback, EvaluableBasis};
use crate::cube::Cube;
use crate::system::molecule::Molecule;

#[derive(Clone, Default)]
pub struct SlaterBasis {
    molecule: Molecule,
    num_mos: usize,
}

impl SlaterBasis {
    pub fn new() -> Self {
        Self {
            molecule: Molecule::new(),
            num_mos: 0,
        }
    }

    /// Forwarded to the embedded [`Molecule`], mirroring
    /// `GaussianBasis::add_atom`.
    pub fn add_atom(&mut self, position: [f64; 3], atomic_number: u32) -> usize {
        self.molecule.add_atom(position, atomic_number)
    }

    pub fn molecule(&self) -> &Molecule {
        &self.molecule
    }
}

impl EvaluableBasis for SlaterBasis {
    fn num_mos(&self) -> usize {
        self.num_mos
    }

    fn compute_mo(self: Arc<Self>, _cube: &Cube, _state: usize, _on_finished: CompletionCallback) -> bool {
        log::warn!(
            target: "gaussian_cube_engine",
            "Slater-orbital evaluation is out of scope for this engine; no work dispatched"
        );
        false
    }

    fn compute_density(self: Arc<Self>, _cube: &Cube, _on_finished: CompletionCallback) -> bool {
        log::warn!(
            target: "gaussian_cube_engine",
            "Slater-orbital evaluation is out of scope for this engine; no work dispatched"
        );
        false
    }

    fn deep_clone(&self) -> Arc<dyn EvaluableBasis> {
        Arc::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_mo_reports_not_dispatched() {
        let basis = Arc::new(SlaterBasis::new());
        let cube = Cube::new([0.0; 3], [1.0; 3], [1, 1, 1]);
        let dispatched = EvaluableBasis::compute_mo(basis, &cube, 1, Box::new(|| {}));
        assert!(!dispatched);
    }
}
