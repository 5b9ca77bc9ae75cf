//! Parallel dispatch driver behind `GaussianBasis::compute_mo`/`compute_density`.
//!
//! The call sequence is: validate preconditions, ensure normalization, take
//! the cube's write lock as an owned (`'static`) guard via
//! `parking_lot`'s `arc_lock` feature, set the cube's tag while still holding
//! that lock, then hand the guard to a `rayon::spawn`'d closure that fans the
//! per-sample work out over `rayon`'s global pool and releases the lock on
//! completion. Acquiring the write lock is the one blocking step on the
//! calling thread; everything after `rayon::spawn` runs off of it, which is
//! what makes `compute_mo`/`compute_density` return before the cube is full.
//!
//! The per-sample fan-out itself (`into_par_iter`) follows
//! `kobigurk-phase2-bn254`'s `phase2/src/polynomial.rs`, which parallelizes
//! its inner loops the same way. The outer `rayon::spawn` wrapper that makes
//! the whole dispatch non-blocking has no counterpart there — that crate's
//! `setup-utils/src/rayon_cfg.rs` only wraps the blocking `rayon::scope`/
//! `ScopeShim::spawn`; this crate needs fire-and-forget because the caller
//! (a renderer) must get its cube handle back immediately.

use std::sync::Arc;

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::basis::capability::CompletionCallback;
use crate::basis::gaussian_basis::GaussianBasis;
use crate::basis::kernels;
use crate::basis::normalize::NormalizedData;
use crate::basis::shell::Shell;
use crate::constants::ANGSTROM_TO_BOHR;
use crate::cube::{Cube, CubeType};
use crate::error::{log_diagnostic, EvalError};
use crate::system::molecule::Molecule;

/// Per-shell primitive/normalized-coefficient slices plus the atom position
/// (in Bohr) this shell is centered on, precomputed once per dispatch rather
/// than once per point.
struct ShellContext<'a> {
    shell: &'a Shell,
    exponents: &'a [f64],
    norm_coeff: &'a [f64],
    mo_offset: usize,
    atom_position_bohr: [f64; 3],
}

fn build_contexts<'a>(
    shells: &'a [Shell],
    exponents: &'a [f64],
    normalized: &'a NormalizedData,
    molecule: &Molecule,
) -> Vec<ShellContext<'a>> {
    shells
        .iter()
        .enumerate()
        .filter(|(_, shell)| shell.kind.is_evaluated())
        .map(|(shell_index, shell)| {
            let prim_start = shell.first_primitive;
            let prim_end = normalized.primitive_end[shell_index];
            let norm_start = normalized.norm_offset[shell_index];
            let norm_len = (prim_end - prim_start) * shell.kind.components();
            let position_angstrom = molecule.atom_position(shell.atom_index);
            ShellContext {
                shell,
                exponents: &exponents[prim_start..prim_end],
                norm_coeff: &normalized.norm_coeff[norm_start..norm_start + norm_len],
                mo_offset: normalized.mo_offset[shell_index],
                atom_position_bohr: [
                    position_angstrom[0] * ANGSTROM_TO_BOHR,
                    position_angstrom[1] * ANGSTROM_TO_BOHR,
                    position_angstrom[2] * ANGSTROM_TO_BOHR,
                ],
            }
        })
        .collect()
}

fn delta_and_dr2(atom_position_bohr: [f64; 3], r_bohr: [f64; 3]) -> ([f64; 3], f64) {
    let delta = [
        r_bohr[0] - atom_position_bohr[0],
        r_bohr[1] - atom_position_bohr[1],
        r_bohr[2] - atom_position_bohr[2],
    ];
    let dr2 = delta[0] * delta[0] + delta[1] * delta[1] + delta[2] * delta[2];
    (delta, dr2)
}

fn mo_value_at(contexts: &[ShellContext], mo_column: &[f64], r_bohr: [f64; 3]) -> f64 {
    contexts
        .iter()
        .map(|ctx| {
            let (delta, dr2) = delta_and_dr2(ctx.atom_position_bohr, r_bohr);
            kernels::shell_mo_contribution(
                ctx.shell.kind,
                ctx.exponents,
                ctx.norm_coeff,
                ctx.mo_offset,
                mo_column,
                delta,
                dr2,
            )
        })
        .sum()
}

fn density_value_at(contexts: &[ShellContext], density: &DMatrix<f64>, num_mos: usize, r_bohr: [f64; 3]) -> f64 {
    let mut v = vec![0.0; num_mos];
    for ctx in contexts {
        let (delta, dr2) = delta_and_dr2(ctx.atom_position_bohr, r_bohr);
        kernels::shell_basis_values(
            ctx.shell.kind,
            ctx.exponents,
            ctx.norm_coeff,
            ctx.mo_offset,
            delta,
            dr2,
            &mut v,
        );
    }
    kernels::density_from_basis_values(&|i, j| density[(i, j)], &v)
}

/// Dispatches an MO evaluation. `state` is 1-based, matching the
/// public `EvaluableBasis` contract.
pub fn compute_mo(basis: Arc<GaussianBasis>, cube: &Cube, state: usize, on_finished: CompletionCallback) -> bool {
    if !basis.has_shells() {
        log_diagnostic(&EvalError::EmptyBasis);
        return false;
    }
    let num_mos = basis.num_mos();
    if state == 0 || state > num_mos {
        log_diagnostic(&EvalError::MoOutOfRange {
            requested: state,
            num_mos,
        });
        return false;
    }

    let normalized = basis.ensure_normalized();
    let mo_column: Vec<f64> = basis.mo_matrix().column(state - 1).iter().copied().collect();
    let molecule = basis.molecule().clone();
    let shells: Vec<Shell> = basis.shells().to_vec();
    let exponents: Vec<f64> = basis.exponents().to_vec();

    let data_lock = cube.data_handle();
    let tag_lock = cube.tag_handle();
    let guard = data_lock.write_arc();
    *tag_lock.write() = CubeType::Mo;

    let cube_for_points = cube.clone();
    rayon::spawn(move || {
        let mut guard = guard;
        let contexts = build_contexts(&shells, &exponents, &normalized, &molecule);
        guard.par_iter_mut().enumerate().for_each(|(i, slot)| {
            let r_bohr = cube_for_points.position_bohr(i);
            *slot = mo_value_at(&contexts, &mo_column, r_bohr);
        });
        drop(guard);
        on_finished();
    });
    true
}

/// Dispatches an electron-density evaluation.
pub fn compute_density(basis: Arc<GaussianBasis>, cube: &Cube, on_finished: CompletionCallback) -> bool {
    if !basis.has_shells() {
        log_diagnostic(&EvalError::EmptyBasis);
        return false;
    }
    let Some(density) = basis.density_matrix().cloned() else {
        log_diagnostic(&EvalError::NoDensityMatrix);
        return false;
    };

    let normalized = basis.ensure_normalized();
    let num_mos = basis.num_mos();
    let molecule = basis.molecule().clone();
    let shells: Vec<Shell> = basis.shells().to_vec();
    let exponents: Vec<f64> = basis.exponents().to_vec();

    let data_lock = cube.data_handle();
    let tag_lock = cube.tag_handle();
    let guard = data_lock.write_arc();
    *tag_lock.write() = CubeType::ElectronDensity;

    let cube_for_points = cube.clone();
    rayon::spawn(move || {
        let mut guard = guard;
        let contexts = build_contexts(&shells, &exponents, &normalized, &molecule);
        guard.par_iter_mut().enumerate().for_each(|(i, slot)| {
            let r_bohr = cube_for_points.position_bohr(i);
            *slot = density_value_at(&contexts, &density, num_mos, r_bohr);
        });
        drop(guard);
        on_finished();
    });
    true
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc as StdArc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::basis::capability::EvaluableBasis;
    use crate::basis::shell::ShellKind;

    fn h_atom_one_s() -> GaussianBasis {
        let mut basis = GaussianBasis::new();
        let atom = basis.add_atom([0.0, 0.0, 0.0], 1);
        basis.add_basis(atom, ShellKind::S);
        basis.add_gto(1.0, 1.0);
        basis.add_mos(&[1.0]);
        basis
    }

    fn wait_for(flag: &AtomicBool) {
        let start = Instant::now();
        while !flag.load(Ordering::Acquire) {
            assert!(start.elapsed() < Duration::from_secs(5), "dispatched work never completed");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn compute_mo_tags_cube_before_returning() {
        let basis = StdArc::new(h_atom_one_s());
        let cube = Cube::new([0.0; 3], [0.5; 3], [2, 2, 2]);
        let done = StdArc::new(AtomicBool::new(false));
        let done_clone = StdArc::clone(&done);
        let dispatched = EvaluableBasis::compute_mo(
            basis,
            &cube,
            1,
            Box::new(move || done_clone.store(true, Ordering::Release)),
        );
        assert!(dispatched);
        assert_eq!(cube.cube_type(), CubeType::Mo);
        wait_for(&done);
    }

    #[test]
    fn compute_mo_rejects_out_of_range_state() {
        let basis = StdArc::new(h_atom_one_s());
        let cube = Cube::new([0.0; 3], [0.5; 3], [1, 1, 1]);
        let dispatched = EvaluableBasis::compute_mo(basis, &cube, 2, Box::new(|| {}));
        assert!(!dispatched);
        assert_eq!(cube.cube_type(), CubeType::Unset);
    }

    #[test]
    fn compute_density_requires_density_matrix() {
        let basis = StdArc::new(h_atom_one_s());
        let cube = Cube::new([0.0; 3], [0.5; 3], [1, 1, 1]);
        let dispatched = EvaluableBasis::compute_density(basis, &cube, Box::new(|| {}));
        assert!(!dispatched);
    }

    #[test]
    fn compute_density_matches_mo_for_single_occupied_orbital() {
        let mut basis = h_atom_one_s();
        basis.set_density_matrix(&[1.0]);
        let basis = StdArc::new(basis);

        let mo_cube = Cube::new([0.0; 3], [0.4; 3], [2, 2, 2]);
        let density_cube = Cube::new([0.0; 3], [0.4; 3], [2, 2, 2]);
        let done_mo = StdArc::new(AtomicBool::new(false));
        let done_density = StdArc::new(AtomicBool::new(false));

        let done_mo_clone = StdArc::clone(&done_mo);
        EvaluableBasis::compute_mo(
            StdArc::clone(&basis),
            &mo_cube,
            1,
            Box::new(move || done_mo_clone.store(true, Ordering::Release)),
        );
        let done_density_clone = StdArc::clone(&done_density);
        EvaluableBasis::compute_density(
            basis,
            &density_cube,
            Box::new(move || done_density_clone.store(true, Ordering::Release)),
        );
        wait_for(&done_mo);
        wait_for(&done_density);

        for i in 0..mo_cube.size() {
            let psi = mo_cube.value(i);
            assert!((density_cube.value(i) - psi * psi).abs() < 1e-10);
        }
    }

    fn wait_and_assert(cube: &Cube, done: &AtomicBool) {
        wait_for(done);
        let _ = cube;
    }

    /// One-atom one-S basis, MO=[1.0]; the center
    /// sample equals the analytic S value at r=0.
    #[test]
    fn scenario_a_center_sample_matches_analytic_value_at_r0() {
        let basis = StdArc::new(h_atom_one_s());
        let cube = Cube::new([-1.0, -1.0, -1.0], [1.0, 1.0, 1.0], [3, 3, 3]);
        let done = StdArc::new(AtomicBool::new(false));
        let done_clone = StdArc::clone(&done);
        EvaluableBasis::compute_mo(basis, &cube, 1, Box::new(move || done_clone.store(true, Ordering::Release)));
        wait_and_assert(&cube, &done);
        // center index: ix=iy=iz=1 in a 3x3x3 row-major grid -> i = 1*9+1*3+1
        let center = cube.value(13);
        let expected = 1f64.powf(0.75) * crate::constants::S_NORM;
        approx::assert_abs_diff_eq!(center, expected, epsilon = 1e-12);
    }

    /// Same basis, MO coefficient 0.0; every sample is 0.
    #[test]
    fn scenario_b_zero_mo_coefficient_yields_all_zero_cube() {
        let mut basis = GaussianBasis::new();
        let atom = basis.add_atom([0.0, 0.0, 0.0], 1);
        basis.add_basis(atom, crate::basis::shell::ShellKind::S);
        basis.add_gto(1.0, 1.0);
        basis.add_mos(&[0.0]);
        let basis = StdArc::new(basis);
        let cube = Cube::new([-1.0, -1.0, -1.0], [1.0, 1.0, 1.0], [3, 3, 3]);
        let done = StdArc::new(AtomicBool::new(false));
        let done_clone = StdArc::clone(&done);
        EvaluableBasis::compute_mo(basis, &cube, 1, Box::new(move || done_clone.store(true, Ordering::Release)));
        wait_and_assert(&cube, &done);
        for i in 0..cube.size() {
            assert_eq!(cube.value(i), 0.0);
        }
    }

    /// One P shell, MO=(1,0,0); sample at (1,0,0) Å
    /// equals the sample at (-1,0,0) Å negated.
    #[test]
    fn scenario_c_p_shell_is_antisymmetric_along_axis() {
        let mut basis = GaussianBasis::new();
        let atom = basis.add_atom([0.0, 0.0, 0.0], 6);
        basis.add_basis(atom, crate::basis::shell::ShellKind::P);
        basis.add_gto(1.0, 1.0);
        basis.add_mos(&[1.0, 0.0, 0.0]);
        let basis = StdArc::new(basis);
        let cube = Cube::new([-1.0, 0.0, 0.0], [2.0, 1.0, 1.0], [2, 1, 1]);
        let done = StdArc::new(AtomicBool::new(false));
        let done_clone = StdArc::clone(&done);
        EvaluableBasis::compute_mo(basis, &cube, 1, Box::new(move || done_clone.store(true, Ordering::Release)));
        wait_and_assert(&cube, &done);
        approx::assert_abs_diff_eq!(cube.value(0), -cube.value(1), epsilon = 1e-12);
    }

    /// Two dispatches of `compute_mo` on identical
    /// inputs produce byte-identical cube contents (kernels do no
    /// cross-point reductions, so FP associativity is never exercised).
    #[test]
    fn compute_mo_is_deterministic_across_runs() {
        let basis = StdArc::new(h_atom_one_s());
        let run = |basis: StdArc<GaussianBasis>| {
            let cube = Cube::new([-2.0, -2.0, -2.0], [0.3, 0.3, 0.3], [8, 8, 8]);
            let done = StdArc::new(AtomicBool::new(false));
            let done_clone = StdArc::clone(&done);
            EvaluableBasis::compute_mo(basis, &cube, 1, Box::new(move || done_clone.store(true, Ordering::Release)));
            wait_for(&done);
            cube.values()
        };
        let first = run(StdArc::clone(&basis));
        let second = run(basis);
        assert_eq!(first, second);
    }

    proptest::proptest! {
        /// Rotating the evaluation point from the x-axis
        /// to the z-axis leaves an S-only H atom's value unchanged.
        #[test]
        fn proptest_s_only_atom_is_rotation_invariant(x in -3.0f64..3.0) {
            let basis = StdArc::new(h_atom_one_s());
            let cube_x = Cube::new([x, 0.0, 0.0], [1.0; 3], [1, 1, 1]);
            let cube_z = Cube::new([0.0, 0.0, x], [1.0; 3], [1, 1, 1]);
            let done_x = StdArc::new(AtomicBool::new(false));
            let done_z = StdArc::new(AtomicBool::new(false));
            let done_x_clone = StdArc::clone(&done_x);
            let done_z_clone = StdArc::clone(&done_z);
            EvaluableBasis::compute_mo(StdArc::clone(&basis), &cube_x, 1, Box::new(move || done_x_clone.store(true, Ordering::Release)));
            EvaluableBasis::compute_mo(basis, &cube_z, 1, Box::new(move || done_z_clone.store(true, Ordering::Release)));
            wait_for(&done_x);
            wait_for(&done_z);
            proptest::prop_assert!((cube_x.value(0) - cube_z.value(0)).abs() < 1e-12);
        }

        /// Analytic S value at r (Bohr).
        #[test]
        fn proptest_s_value_matches_analytic_formula(x in -3.0f64..3.0) {
            let basis = StdArc::new(h_atom_one_s());
            let cube = Cube::new([x, 0.0, 0.0], [1.0; 3], [1, 1, 1]);
            let done = StdArc::new(AtomicBool::new(false));
            let done_clone = StdArc::clone(&done);
            EvaluableBasis::compute_mo(basis, &cube, 1, Box::new(move || done_clone.store(true, Ordering::Release)));
            wait_for(&done);
            let r_bohr = x / crate::constants::BOHR_TO_ANGSTROM;
            let expected = 1f64.powf(0.75) * crate::constants::S_NORM * (-r_bohr * r_bohr).exp();
            proptest::prop_assert!((cube.value(0) - expected).abs() < 1e-12);
        }

        /// Density from a diagonal, non-negative density
        /// matrix is non-negative everywhere.
        #[test]
        fn proptest_density_nonnegative_for_diagonal_nonnegative_matrix(
            p0 in 0.0f64..5.0,
            p1 in 0.0f64..5.0,
        ) {
            let mut basis = GaussianBasis::new();
            let atom = basis.add_atom([0.0, 0.0, 0.0], 6);
            basis.add_basis(atom, crate::basis::shell::ShellKind::S);
            basis.add_gto(1.0, 1.2);
            basis.add_basis(atom, crate::basis::shell::ShellKind::S);
            basis.add_gto(1.0, 0.6);
            basis.set_density_matrix(&[p0, 0.0, 0.0, p1]);
            let basis = StdArc::new(basis);
            let cube = Cube::new([-1.0, -1.0, -1.0], [0.5, 0.5, 0.5], [3, 3, 3]);
            let done = StdArc::new(AtomicBool::new(false));
            let done_clone = StdArc::clone(&done);
            EvaluableBasis::compute_density(basis, &cube, Box::new(move || done_clone.store(true, Ordering::Release)));
            wait_for(&done);
            for i in 0..cube.size() {
                proptest::prop_assert!(cube.value(i) >= 0.0);
            }
        }
    }
}
