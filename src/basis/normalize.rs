//! The one-time normalization pass.
//!
//! For each shell, in insertion order, this streams once through the
//! shell's primitive range and pushes `num_primitives * components` entries
//! onto a flat `norm_coeff` array, laid out primitive-major, component-inner.
//! `mo_offset[s]`/`norm_offset[s]` are recorded as parallel per-shell arrays
//! in the returned [`NormalizedData`] rather than mutated onto `Shell`
//! itself, so a `GaussianBasis` shared behind `Arc` can recompute/cache this
//! data through `&self` without needing `&mut` access to its shell list. A
//! shell whose `ShellKind` has no analytical kernel (F and higher) reserves
//! its MO-column slots, logs one diagnostic, and contributes nothing to
//! `norm_coeff`.
//!
//! Follows the same per-shell streaming style as `basis::shell`, generalized
//! from a single Cartesian normalization constant to a per-type table (those
//! constants are authoritative, not derived here).

use crate::basis::shell::{Shell, ShellKind};
use crate::constants::{D_DIAG_NORM, D_OFFDIAG_NORM, P_NORM, S_NORM};
use crate::error::{log_diagnostic, EvalError};

/// Output of one normalization pass.
#[derive(Clone, Debug, Default)]
pub struct NormalizedData {
    pub norm_coeff: Vec<f64>,
    /// `primitive_end[s]` is the exclusive end of shell `s`'s primitive
    /// range; a sentinel `primitive_end[num_shells] = total_primitives` is
    /// appended so shell `s` iterates primitives
    /// `[first_primitive[s], primitive_end[s])` uniformly.
    pub primitive_end: Vec<usize>,
    /// Per-shell first MO/AO column (`moOffset[s]`).
    pub mo_offset: Vec<usize>,
    /// Per-shell first normalized coefficient (`normOffset[s]`).
    pub norm_offset: Vec<usize>,
    pub num_mos: usize,
}

/// Runs the normalization pass over `shells`, returning the flat
/// coefficient array, the primitive-end sentinel array, and the per-shell
/// offset tables. Idempotent: calling this twice without an intervening
/// mutation of `shells`/`exponents`/`coeffs` produces byte-identical output.
pub fn normalize(shells: &[Shell], exponents: &[f64], coeffs: &[f64]) -> NormalizedData {
    let mut norm_coeff = Vec::new();
    let mut mo_offset = Vec::with_capacity(shells.len());
    let mut norm_offset = Vec::with_capacity(shells.len());
    let mut mo_running = 0usize;
    let mut norm_running = 0usize;

    for (shell_index, shell) in shells.iter().enumerate() {
        debug_assert!(
            shell.num_primitives > 0,
            "empty shell {shell_index}: primitive_end[s] == primitive_end[s+1] is forbidden"
        );

        mo_offset.push(mo_running);
        norm_offset.push(norm_running);
        mo_running += shell.kind.components();

        let range = shell.first_primitive..shell.first_primitive + shell.num_primitives;

        match shell.kind {
            ShellKind::S => {
                for j in range {
                    let alpha = exponents[j];
                    let c = coeffs[j];
                    norm_coeff.push(c * alpha.powf(0.75) * S_NORM);
                }
            }
            ShellKind::P => {
                for j in range {
                    let alpha = exponents[j];
                    let c = coeffs[j];
                    let v = c * alpha.powf(1.25) * P_NORM;
                    norm_coeff.push(v);
                    norm_coeff.push(v);
                    norm_coeff.push(v);
                }
            }
            ShellKind::D => {
                for j in range {
                    let alpha = exponents[j];
                    let c = coeffs[j];
                    let diag = c * alpha.powf(1.75) * D_DIAG_NORM;
                    let offdiag = c * alpha.powf(1.75) * D_OFFDIAG_NORM;
                    // xx, yy, zz
                    norm_coeff.push(diag);
                    norm_coeff.push(diag);
                    norm_coeff.push(diag);
                    // xy, xz, yz
                    norm_coeff.push(offdiag);
                    norm_coeff.push(offdiag);
                    norm_coeff.push(offdiag);
                }
            }
            ShellKind::D5 => {
                for j in range {
                    let alpha = exponents[j];
                    let c = coeffs[j];
                    let a7 = alpha.powi(7);
                    let d0 = c * (2048.0 * a7 / (9.0 * std::f64::consts::PI.powi(3))).powf(0.25);
                    let d1 = c * (2048.0 * a7 / std::f64::consts::PI.powi(3)).powf(0.25);
                    let d2_plus = c * (128.0 * a7 / std::f64::consts::PI.powi(3)).powf(0.25);
                    let d2_minus = c * (2048.0 * a7 / std::f64::consts::PI.powi(3)).powf(0.25);
                    // Push order matches the kernel's accumulator order:
                    // d0, d1+, d1-, d2+, d2-.
                    norm_coeff.push(d0);
                    norm_coeff.push(d1); // d1+
                    norm_coeff.push(d1); // d1-
                    norm_coeff.push(d2_plus);
                    norm_coeff.push(d2_minus);
                }
            }
            ShellKind::Sp => {
                // One set of exponents drives both the S-type and P-type
                // normalized coefficients; push order matches the kernel's
                // component order: s, px, py, pz.
                for j in range {
                    let alpha = exponents[j];
                    let c = coeffs[j];
                    let s_val = c * alpha.powf(0.75) * S_NORM;
                    let p_val = c * alpha.powf(1.25) * P_NORM;
                    norm_coeff.push(s_val);
                    norm_coeff.push(p_val);
                    norm_coeff.push(p_val);
                    norm_coeff.push(p_val);
                }
            }
            ShellKind::F
            | ShellKind::F7
            | ShellKind::G
            | ShellKind::G9
            | ShellKind::H
            | ShellKind::H11
            | ShellKind::I
            | ShellKind::I13 => {
                log_diagnostic(&EvalError::UnhandledAngularType {
                    shell_index,
                    kind: shell.kind,
                });
            }
        }

        if shell.kind.is_evaluated() {
            norm_running += shell.num_primitives * shell.kind.components();
        }
    }

    let mut primitive_end: Vec<usize> = shells
        .iter()
        .map(|s| s.first_primitive + s.num_primitives)
        .collect();
    primitive_end.push(exponents.len());

    NormalizedData {
        norm_coeff,
        primitive_end,
        mo_offset,
        norm_offset,
        num_mos: mo_running,
    }
}
