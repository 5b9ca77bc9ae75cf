//! Physical constants and analytical normalization coefficients.
//!
//! All internal geometry is handled in Bohr; callers (Molecule, Cube) speak
//! Angstrom at their boundary and convert on entry.

/// Bohr radius in Angstrom. Authoritative value per the evaluation interface.
pub const BOHR_TO_ANGSTROM: f64 = 0.529177249;

/// Reciprocal of [`BOHR_TO_ANGSTROM`].
pub const ANGSTROM_TO_BOHR: f64 = 1.0 / BOHR_TO_ANGSTROM;

/// S-shell normalization prefactor, applied as `c * alpha^(3/4) * S_NORM`.
pub const S_NORM: f64 = 0.71270547;

/// P-shell normalization prefactor, applied as `c * alpha^(5/4) * P_NORM`.
pub const P_NORM: f64 = 1.425410941;

/// Cartesian D-shell normalization prefactor for the diagonal components
/// (xx, yy, zz), applied as `c * alpha^(7/4) * D_DIAG_NORM`.
pub const D_DIAG_NORM: f64 = 1.645922781;

/// Cartesian D-shell normalization prefactor for the off-diagonal components
/// (xy, xz, yz), applied as `c * alpha^(7/4) * D_OFFDIAG_NORM`.
pub const D_OFFDIAG_NORM: f64 = 2.850821881;

/// Below this coefficient magnitude an S-kernel contribution is skipped
/// without touching any primitive. Performance-only; never changes results.
pub const SMALL_COEFFICIENT_CUTOFF: f64 = 1e-20;
