//! Basis-set loader façade.
//!
//! `match_basis_set` and `load_basis_set` are the only pieces of the loading
//! pipeline this crate specifies: which file a path should actually be read
//! from, and which concrete basis kind (Gaussian or Slater) that file's
//! extension implies. The parsers that actually walk an FCHK/GAMESS-UK/MOPAC
//! aux/Molden file and drive [`crate::basis::gaussian_basis::GaussianBasis`]'s
//! builder methods are external collaborators; this module only
//! specifies the contract they plug into ([`GaussianParser`], [`SlaterParser`]).

pub mod slater;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::basis::capability::EvaluableBasis;
use crate::basis::gaussian_basis::GaussianBasis;
use crate::error::ParseError;
use crate::loader::slater::SlaterBasis;

/// Recognized on-disk basis-set formats, in match priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BasisFormat {
    Fchk,
    GamessUk,
    Mopac,
    Molden,
}

/// Classifies a path's extension by case-insensitive substring test against
/// the complete suffix, in priority order.
fn classify(path: &Path) -> Option<BasisFormat> {
    let suffix = path.extension()?.to_str()?.to_ascii_lowercase();
    if ["fchk", "fch", "fck"].iter().any(|s| suffix.contains(s)) {
        Some(BasisFormat::Fchk)
    } else if suffix.contains("gukout") {
        Some(BasisFormat::GamessUk)
    } else if suffix.contains("aux") {
        Some(BasisFormat::Mopac)
    } else if ["molden", "mold", "molf"].iter().any(|s| suffix.contains(s)) {
        Some(BasisFormat::Molden)
    } else {
        None
    }
}

/// Sibling files of `path`, in directory-read order, excluding `path` itself.
fn siblings(path: &Path) -> Vec<PathBuf> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p != path)
        .collect()
}

/// Given a user-selected file, returns a sibling file (possibly `path`
/// itself) whose extension indicates a recognized format. Tries
/// `path` first, then its siblings in readable-file order. `None` if nothing
/// matches.
pub fn match_basis_set(path: &Path) -> Option<PathBuf> {
    if classify(path).is_some() {
        return Some(path.to_path_buf());
    }
    siblings(path).into_iter().find(|p| classify(p).is_some())
}

/// Drives an FCHK/GAMESS-UK/Molden file into a freshly constructed
/// [`GaussianBasis`]. A parser is any function `parse(path, &mut Basis)`.
/// Out-of-scope parsers register by implementing this trait;
/// with none registered, `load_basis_set` returns the basis unpopulated.
pub trait GaussianParser: Send + Sync {
    fn parse(&self, path: &Path, basis: &mut GaussianBasis) -> Result<(), ParseError>;
}

/// Drives a MOPAC aux file into a freshly constructed [`SlaterBasis`].
pub trait SlaterParser: Send + Sync {
    fn parse(&self, path: &Path, basis: &mut SlaterBasis) -> Result<(), ParseError>;
}

/// Parser hooks `load_basis_set_with` invokes per matched format. Any slot
/// left `None` means "construct the basis but don't populate it" rather than
/// a hard failure, since these parsers are genuinely out of this crate's
/// scope — only their interface is specified here.
#[derive(Default)]
pub struct ParserRegistry<'a> {
    pub fchk: Option<&'a dyn GaussianParser>,
    pub gamess_uk: Option<&'a dyn GaussianParser>,
    pub molden: Option<&'a dyn GaussianParser>,
    pub mopac: Option<&'a dyn SlaterParser>,
}

fn build_gaussian(path: &Path, parser: Option<&dyn GaussianParser>) -> Option<Arc<dyn EvaluableBasis>> {
    let mut basis = GaussianBasis::new();
    if let Some(parser) = parser {
        if let Err(err) = parser.parse(path, &mut basis) {
            log::warn!(target: "gaussian_cube_engine", "parser failed for {}: {err}", path.display());
            return None;
        }
    }
    Some(Arc::new(basis))
}

fn build_slater(path: &Path, parser: Option<&dyn SlaterParser>) -> Option<Arc<dyn EvaluableBasis>> {
    let mut basis = SlaterBasis::new();
    if let Some(parser) = parser {
        if let Err(err) = parser.parse(path, &mut basis) {
            log::warn!(target: "gaussian_cube_engine", "parser failed for {}: {err}", path.display());
            return None;
        }
    }
    Some(Arc::new(basis))
}

/// Dispatches on the same suffix classes `match_basis_set` uses: FCHK/
/// GAMESS-UK/Molden instantiate a Gaussian basis, `aux` instantiates a Slater
/// basis. Ownership of the returned basis transfers to the
/// caller. `None` if no format matched or the registered parser failed.
pub fn load_basis_set_with(path: &Path, registry: &ParserRegistry) -> Option<Arc<dyn EvaluableBasis>> {
    let matched = match_basis_set(path)?;
    match classify(&matched)? {
        BasisFormat::Fchk => build_gaussian(&matched, registry.fchk),
        BasisFormat::GamessUk => build_gaussian(&matched, registry.gamess_uk),
        BasisFormat::Molden => build_gaussian(&matched, registry.molden),
        BasisFormat::Mopac => build_slater(&matched, registry.mopac),
    }
}

/// Convenience form of [`load_basis_set_with`] with no parsers registered.
pub fn load_basis_set(path: &Path) -> Option<Arc<dyn EvaluableBasis>> {
    load_basis_set_with(path, &ParserRegistry::default())
}
