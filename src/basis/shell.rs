//! Shell definition: a contracted Gaussian basis function on one atom.
//!
//! Generalizes a Cartesian-only `ang: [usize; 3]` shell representation into
//! a named angular-type enumeration, since this crate must recognize (but
//! not evaluate) F, F7, G, G9, H, H11, I, I13 beyond S/P/Cartesian-D.

/// Stable angular-type enumeration, also used by file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShellKind {
    S,
    P,
    /// Combined S+P shell sharing one set of exponents (Pople-style SP).
    Sp,
    /// Cartesian D (6 components: xx, yy, zz, xy, xz, yz).
    D,
    /// Spherical D (5 real components: d0, d1+, d1-, d2+, d2-).
    D5,
    F,
    F7,
    G,
    G9,
    H,
    H11,
    I,
    I13,
}

impl ShellKind {
    /// Number of MO/AO columns this shell type contributes.
    pub fn components(self) -> usize {
        match self {
            ShellKind::S => 1,
            ShellKind::P => 3,
            ShellKind::Sp => 4,
            ShellKind::D => 6,
            ShellKind::D5 => 5,
            ShellKind::F => 8,
            ShellKind::F7 => 7,
            // Higher shells are recognized but not evaluated; their column
            // slots still have to be reserved so downstream offsets stay
            // consistent. Counts follow the same Cartesian (l+1)(l+2)/2 /
            // spherical 2l+1 pattern as S..F7.
            ShellKind::G => 15,
            ShellKind::G9 => 9,
            ShellKind::H => 21,
            ShellKind::H11 => 11,
            ShellKind::I => 28,
            ShellKind::I13 => 13,
        }
    }

    /// Whether this crate's kernels evaluate this shell type. F and higher
    /// are recognized but left zero.
    pub fn is_evaluated(self) -> bool {
        matches!(
            self,
            ShellKind::S | ShellKind::P | ShellKind::Sp | ShellKind::D | ShellKind::D5
        )
    }
}

/// A contracted Gaussian shell: an atom index plus a primitive range.
/// `mo_offset` and `norm_offset` are *not* stored here — they are derived
/// data the normalization pass recomputes into
/// [`crate::basis::normalize::NormalizedData`] each time it runs, so that
/// `GaussianBasis` can cache/invalidate them without needing `&mut` access
/// to the shell list itself (shells stay immutable post-construction).
#[derive(Clone, Debug)]
pub struct Shell {
    pub atom_index: usize,
    pub kind: ShellKind,
    pub first_primitive: usize,
    pub num_primitives: usize,
}

impl Shell {
    pub fn new(atom_index: usize, kind: ShellKind, first_primitive: usize) -> Self {
        Self {
            atom_index,
            kind,
            first_primitive,
            num_primitives: 0,
        }
    }
}
