//! The authoritative in-memory Gaussian basis.
//!
//! Construction mutators (`add_atom`, `add_basis`, `add_gto`, `add_mos`,
//! `set_density_matrix`) all clear the lazily-computed normalization cache,
//! clearing it on any mutation. Evaluation
//! runs through `Arc<GaussianBasis>` (see [`crate::evaluator`]), so the
//! cache lives behind a `parking_lot::RwLock` rather than requiring `&mut
//! self` to refresh.

use std::sync::Arc;

use nalgebra::DMatrix;
use parking_lot::RwLock;

use crate::basis::capability::{CompletionCallback, EvaluableBasis};
use crate::basis::normalize::{normalize, NormalizedData};
use crate::basis::shell::{Shell, ShellKind};
use crate::cube::Cube;
use crate::evaluator;
use crate::system::molecule::Molecule;

pub struct GaussianBasis {
    molecule: Molecule,
    shells: Vec<Shell>,
    exponents: Vec<f64>,
    coefficients: Vec<f64>,
    mo: DMatrix<f64>,
    density: Option<DMatrix<f64>>,
    /// Sum of component counts over all shells added so far. This
    /// is tracked incrementally as shells are added, independent of
    /// normalization — the component-count law holds before the first
    /// evaluation too.
    num_mos: usize,
    norm_cache: RwLock<Option<Arc<NormalizedData>>>,
}

impl Default for GaussianBasis {
    fn default() -> Self {
        Self::new()
    }
}

impl GaussianBasis {
    pub fn new() -> Self {
        Self {
            molecule: Molecule::new(),
            shells: Vec::new(),
            exponents: Vec::new(),
            coefficients: Vec::new(),
            mo: DMatrix::zeros(0, 0),
            density: None,
            num_mos: 0,
            norm_cache: RwLock::new(None),
        }
    }

    fn invalidate(&mut self) {
        self.norm_cache = RwLock::new(None);
    }

    /// Forwarded to the embedded [`Molecule`].
    pub fn add_atom(&mut self, position: [f64; 3], atomic_number: u32) -> usize {
        self.invalidate();
        self.molecule.add_atom(position, atomic_number)
    }

    /// Appends a shell on `atom_index` and updates `num_mos` by `kind`'s
    /// component count. Unknown-to-the-kernels types (F and
    /// higher) still contribute their component count here — they are
    /// present and counted, only not evaluated.
    pub fn add_basis(&mut self, atom_index: usize, kind: ShellKind) -> usize {
        self.invalidate();
        let first_primitive = self.exponents.len();
        self.shells.push(Shell::new(atom_index, kind, first_primitive));
        self.num_mos += kind.components();
        self.shells.len() - 1
    }

    /// Appends one primitive to the most recently added shell.
    pub fn add_gto(&mut self, c: f64, alpha: f64) {
        self.invalidate();
        self.exponents.push(alpha);
        self.coefficients.push(c);
        if let Some(shell) = self.shells.last_mut() {
            shell.num_primitives += 1;
        }
    }

    /// Overwrites the MO matrix: square `num_mos x
    /// num_mos`, `flat` interpreted column-major with
    /// `flat.len() / num_mos` columns; columns beyond that remain zero.
    pub fn add_mos(&mut self, flat: &[f64]) {
        self.invalidate();
        let n = self.num_mos;
        let mut mo = DMatrix::<f64>::zeros(n, n);
        if n > 0 {
            let provided_cols = (flat.len() / n).min(n);
            for col in 0..provided_cols {
                for row in 0..n {
                    mo[(row, col)] = flat[col * n + row];
                }
            }
        }
        self.mo = mo;
    }

    /// Copies a symmetric density matrix of side `num_mos`,
    /// given column-major flat as `add_mos` takes its input.
    pub fn set_density_matrix(&mut self, flat: &[f64]) {
        self.invalidate();
        let n = self.num_mos;
        assert_eq!(
            flat.len(),
            n * n,
            "density matrix must be square of side num_mos ({n})"
        );
        self.density = Some(DMatrix::from_column_slice(n, n, flat));
    }

    pub fn num_mos(&self) -> usize {
        self.num_mos
    }

    pub fn has_shells(&self) -> bool {
        !self.shells.is_empty()
    }

    pub fn has_density_matrix(&self) -> bool {
        self.density.is_some()
    }

    pub(crate) fn molecule(&self) -> &Molecule {
        &self.molecule
    }

    pub(crate) fn shells(&self) -> &[Shell] {
        &self.shells
    }

    pub(crate) fn exponents(&self) -> &[f64] {
        &self.exponents
    }

    pub(crate) fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub(crate) fn mo_matrix(&self) -> &DMatrix<f64> {
        &self.mo
    }

    pub(crate) fn density_matrix(&self) -> Option<&DMatrix<f64>> {
        self.density.as_ref()
    }

    /// Returns the cached normalized coefficients, computing them first if
    /// this is the first evaluation since the last mutation.
    pub(crate) fn ensure_normalized(&self) -> Arc<NormalizedData> {
        if let Some(cached) = self.norm_cache.read().clone() {
            return cached;
        }
        let mut guard = self.norm_cache.write();
        if let Some(cached) = guard.clone() {
            return cached;
        }
        let data = Arc::new(normalize(&self.shells, &self.exponents, &self.coefficients));
        *guard = Some(Arc::clone(&data));
        data
    }
}

impl Clone for GaussianBasis {
    fn clone(&self) -> Self {
        Self {
            molecule: self.molecule.clone(),
            shells: self.shells.clone(),
            exponents: self.exponents.clone(),
            coefficients: self.coefficients.clone(),
            mo: self.mo.clone(),
            density: self.density.clone(),
            num_mos: self.num_mos,
            norm_cache: RwLock::new(self.norm_cache.read().clone()),
        }
    }
}

impl EvaluableBasis for GaussianBasis {
    fn num_mos(&self) -> usize {
        self.num_mos
    }

    fn compute_mo(self: Arc<Self>, cube: &Cube, state: usize, on_finished: CompletionCallback) -> bool {
        evaluator::compute_mo(self, cube, state, on_finished)
    }

    fn compute_density(self: Arc<Self>, cube: &Cube, on_finished: CompletionCallback) -> bool {
        evaluator::compute_density(self, cube, on_finished)
    }

    fn deep_clone(&self) -> Arc<dyn EvaluableBasis> {
        Arc::new(self.clone())
    }
}
