//! Pure per-shell, per-point kernels.
//!
//! Each kernel is a function of `(exponents, norm_coeff)` for one shell's
//! primitive range, `delta = r - R_atom`, `dr2 = |delta|^2`, and either an
//! MO coefficient column (MO-value mode) or an output slice to fill with
//! unweighted basis-function values (density mode). Kernels never touch a
//! cube or a lock; the evaluator is the only caller.
//!
//! Follows the same sum-primitives-then-apply-an-angular-factor shape as
//! `basis::contracted::Contracted::value`, generalized from a single
//! Cartesian-polynomial path to a per-type table.

use crate::basis::shell::ShellKind;
use crate::constants::SMALL_COEFFICIENT_CUTOFF;

/// Per-primitive accumulators for one shell at one point, one slot per
/// angular component (at most 6, for Cartesian D). Unused trailing slots
/// are left at zero.
pub type ShellAccumulators = [f64; 6];

/// Sums primitives into the per-component accumulators for `kind`.
/// `exponents` and `norm_coeff` are already sliced to this shell's range;
/// `norm_coeff` has `exponents.len() * kind.components()` entries,
/// primitive-major, component-inner.
pub fn accumulate(kind: ShellKind, exponents: &[f64], norm_coeff: &[f64], dr2: f64) -> ShellAccumulators {
    let mut acc = [0.0; 6];
    match kind {
        ShellKind::S => {
            for (j, &alpha) in exponents.iter().enumerate() {
                acc[0] += norm_coeff[j] * (-alpha * dr2).exp();
            }
        }
        ShellKind::P => {
            for (j, &alpha) in exponents.iter().enumerate() {
                let e = (-alpha * dr2).exp();
                acc[0] += norm_coeff[3 * j] * e;
                acc[1] += norm_coeff[3 * j + 1] * e;
                acc[2] += norm_coeff[3 * j + 2] * e;
            }
        }
        ShellKind::Sp => {
            for (j, &alpha) in exponents.iter().enumerate() {
                let e = (-alpha * dr2).exp();
                acc[0] += norm_coeff[4 * j] * e;
                acc[1] += norm_coeff[4 * j + 1] * e;
                acc[2] += norm_coeff[4 * j + 2] * e;
                acc[3] += norm_coeff[4 * j + 3] * e;
            }
        }
        ShellKind::D => {
            for (j, &alpha) in exponents.iter().enumerate() {
                let e = (-alpha * dr2).exp();
                for k in 0..6 {
                    acc[k] += norm_coeff[6 * j + k] * e;
                }
            }
        }
        ShellKind::D5 => {
            for (j, &alpha) in exponents.iter().enumerate() {
                let e = (-alpha * dr2).exp();
                for k in 0..5 {
                    acc[k] += norm_coeff[5 * j + k] * e;
                }
            }
        }
        _ => {
            // Unhandled angular type: normalize() never populated
            // norm_coeff for these, so there is nothing to sum. The caller
            // already logged a diagnostic during normalization.
        }
    }
    acc
}

/// Combines this shell's accumulators with `delta` into a single scalar
/// per component, in the order the MO matrix and the density output vector
/// both use ({xx,yy,zz,xy,xz,yz} for D; {d0,d1+,d1-,d2+,d2-} for D5;
/// {s,px,py,pz} for SP).
fn angular_factors(kind: ShellKind, acc: &ShellAccumulators, delta: [f64; 3], dr2: f64) -> [f64; 6] {
    let [dx, dy, dz] = delta;
    match kind {
        ShellKind::S => [acc[0], 0.0, 0.0, 0.0, 0.0, 0.0],
        ShellKind::P => [dx * acc[0], dy * acc[1], dz * acc[2], 0.0, 0.0, 0.0],
        ShellKind::Sp => [acc[0], dx * acc[1], dy * acc[2], dz * acc[3], 0.0, 0.0],
        ShellKind::D => [
            dx * dx * acc[0],
            dy * dy * acc[1],
            dz * dz * acc[2],
            dx * dy * acc[3],
            dx * dz * acc[4],
            dy * dz * acc[5],
        ],
        ShellKind::D5 => [
            (dz * dz - dr2) * acc[0],
            dx * dz * acc[1],
            dy * dz * acc[2],
            (dx * dx - dy * dy) * acc[3],
            dx * dy * acc[4],
            0.0,
        ],
        _ => [0.0; 6],
    }
}

/// Contribution of one shell to psi_moIndex(r) in MO mode.
/// `mo_column` is the full MO column for the requested state; `mo_offset`
/// is this shell's first column index within it.
pub fn shell_mo_contribution(
    kind: ShellKind,
    exponents: &[f64],
    norm_coeff: &[f64],
    mo_offset: usize,
    mo_column: &[f64],
    delta: [f64; 3],
    dr2: f64,
) -> f64 {
    if !kind.is_evaluated() {
        return 0.0;
    }
    if kind == ShellKind::S && mo_column[mo_offset].abs() < SMALL_COEFFICIENT_CUTOFF {
        return 0.0;
    }
    let acc = accumulate(kind, exponents, norm_coeff, dr2);
    let factors = angular_factors(kind, &acc, delta, dr2);
    let components = kind.components();
    (0..components)
        .map(|k| mo_column[mo_offset + k] * factors[k])
        .sum()
}

/// Writes this shell's unweighted basis-function values into
/// `out[mo_offset..mo_offset + components]` in density mode.
pub fn shell_basis_values(
    kind: ShellKind,
    exponents: &[f64],
    norm_coeff: &[f64],
    mo_offset: usize,
    delta: [f64; 3],
    dr2: f64,
    out: &mut [f64],
) {
    if !kind.is_evaluated() {
        return;
    }
    let acc = accumulate(kind, exponents, norm_coeff, dr2);
    let factors = angular_factors(kind, &acc, delta, dr2);
    for k in 0..kind.components() {
        out[mo_offset + k] = factors[k];
    }
}

/// rho(r) from a symmetric density matrix (lower triangle only) and a
/// per-point basis-value vector:
/// `rho = sum_i D_ii * V_i^2 + 2 * sum_{i<j} D_ij * V_i * V_j`.
pub fn density_from_basis_values(density_lower: &dyn Fn(usize, usize) -> f64, v: &[f64]) -> f64 {
    let n = v.len();
    let mut rho = 0.0;
    for i in 0..n {
        rho += density_lower(i, i) * v[i] * v[i];
        for j in 0..i {
            rho += 2.0 * density_lower(i, j) * v[i] * v[j];
        }
    }
    rho
}
