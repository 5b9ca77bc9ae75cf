//! Ordered atom list. Positions are stored in Angstrom; the evaluator
//! converts to Bohr on read.

use crate::system::atom::Atom;

#[derive(Clone, Debug, Default)]
pub struct Molecule {
    atoms: Vec<Atom>,
}

impl Molecule {
    pub fn new() -> Self {
        Self { atoms: Vec::new() }
    }

    /// Appends an atom and returns its zero-based index, the identity used
    /// by shells to refer back to this atom.
    pub fn add_atom(&mut self, position: [f64; 3], atomic_number: u32) -> usize {
        self.atoms.push(Atom::new(atomic_number, position));
        self.atoms.len() - 1
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Position of atom `i` in Angstrom.
    pub fn atom_position(&self, i: usize) -> [f64; 3] {
        self.atoms[i].position
    }

    pub fn atomic_number(&self, i: usize) -> u32 {
        self.atoms[i].atomic_number
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }
}
