//! Error kinds local to one basis or one computation.
//!
//! None of these are fatal to the process. `EvalError` is never surfaced
//! through a `Result` on the evaluation interface itself — `compute_mo` and
//! `compute_density` return `bool` — it exists so the diagnostic logged on
//! failure (see [`crate::error::log_diagnostic`]) carries structured detail
//! instead of a bare string, and so tests can assert on the kind.

use thiserror::Error;

use crate::basis::shell::ShellKind;

/// A failure local to one basis or one dispatched computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Evaluation was requested on a basis with no shells.
    #[error("basis has no shells loaded")]
    EmptyBasis,

    /// `compute_mo` was called with a state index outside `[1, num_mos]`.
    #[error("MO index {requested} out of range [1, {num_mos}]")]
    MoOutOfRange { requested: usize, num_mos: usize },

    /// `compute_density` was called before `set_density_matrix`.
    #[error("no density matrix installed")]
    NoDensityMatrix,

    /// A shell's angular type has no analytical kernel (F and higher).
    /// Non-fatal: the shell contributes zero and evaluation continues.
    #[error("shell {shell_index} has unhandled angular type {kind:?}; contributes zero")]
    UnhandledAngularType { shell_index: usize, kind: ShellKind },
}

/// Emits `err` on the `log` diagnostic channel at `warn` level. The core
/// never configures a subscriber itself; this is the single choke point
/// every non-fatal error passes through so embedding applications can filter
/// on the `gaussian_cube_engine` target.
pub fn log_diagnostic(err: &EvalError) {
    log::warn!(target: "gaussian_cube_engine", "{err}");
}

/// Failure surfaced by a parser or by the loader façade when no parser is
/// registered for the matched suffix. Parsers themselves live outside this
/// crate; this only captures what the façade itself can observe.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no parser registered for this basis-set format")]
    NoParserRegistered,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input: {0}")]
    Malformed(String),
}
