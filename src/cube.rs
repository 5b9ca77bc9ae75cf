//! Regular 3-D sample grid.
//!
//! A `Cube` is owned by the caller. The evaluator takes its write lock for
//! the duration of a dispatched computation; readers (e.g. a renderer) block
//! until that computation's completion signal has fired and the lock is
//! released.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::constants::BOHR_TO_ANGSTROM;

/// What the samples in a cube represent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CubeType {
    /// No computation has set a tag yet.
    Unset,
    /// Samples are values of a molecular orbital.
    Mo,
    /// Samples are electron density.
    ElectronDensity,
}

/// A regular 3-D grid: origin, spacing, extents, and a linear array of N
/// scalar samples guarded by a read/write lock.
#[derive(Clone)]
pub struct Cube {
    origin: [f64; 3],
    spacing: [f64; 3],
    dims: [usize; 3],
    tag: Arc<RwLock<CubeType>>,
    data: Arc<RwLock<Vec<f64>>>,
}

impl Cube {
    /// `origin` and `spacing` are in Angstrom; `dims` is (nx, ny, nz).
    pub fn new(origin: [f64; 3], spacing: [f64; 3], dims: [usize; 3]) -> Self {
        let n = dims[0] * dims[1] * dims[2];
        Self {
            origin,
            spacing,
            dims,
            tag: Arc::new(RwLock::new(CubeType::Unset)),
            data: Arc::new(RwLock::new(vec![0.0; n])),
        }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total sample count `dim_x * dim_y * dim_z`.
    pub fn size(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Position of sample `i`, in Angstrom, decomposed row-major:
    /// `(ix, iy, iz)` with `iz` fastest-varying.
    pub fn position(&self, i: usize) -> [f64; 3] {
        let (ny, nz) = (self.dims[1], self.dims[2]);
        let iz = i % nz;
        let iy = (i / nz) % ny;
        let ix = i / (ny * nz);
        [
            self.origin[0] + self.spacing[0] * ix as f64,
            self.origin[1] + self.spacing[1] * iy as f64,
            self.origin[2] + self.spacing[2] * iz as f64,
        ]
    }

    /// Position of sample `i`, in Bohr.
    pub fn position_bohr(&self, i: usize) -> [f64; 3] {
        let p = self.position(i);
        [
            p[0] / BOHR_TO_ANGSTROM,
            p[1] / BOHR_TO_ANGSTROM,
            p[2] / BOHR_TO_ANGSTROM,
        ]
    }

    pub fn cube_type(&self) -> CubeType {
        *self.tag.read()
    }

    pub fn set_cube_type(&self, tag: CubeType) {
        *self.tag.write() = tag;
    }

    /// Writes sample `i`. Callers (the evaluator's workers) must guarantee
    /// no two workers ever target the same index; the write lock taken by
    /// the evaluator for the whole computation is the only synchronization.
    pub fn set_value(&self, i: usize, v: f64) {
        self.data.write()[i] = v;
    }

    pub fn value(&self, i: usize) -> f64 {
        self.data.read()[i]
    }

    pub fn values(&self) -> Vec<f64> {
        self.data.read().clone()
    }

    /// Read/write lock over the sample array, exposed for the evaluator and
    /// for readers (e.g. renderers) that need to block until a dispatched
    /// computation has released it.
    pub fn lock(&self) -> &RwLock<Vec<f64>> {
        &self.data
    }

    pub(crate) fn data_handle(&self) -> Arc<RwLock<Vec<f64>>> {
        Arc::clone(&self.data)
    }

    pub(crate) fn tag_handle(&self) -> Arc<RwLock<CubeType>> {
        Arc::clone(&self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_decomposes_row_major() {
        let cube = Cube::new([-1.0, -1.0, -1.0], [1.0, 1.0, 1.0], [3, 3, 3]);
        // index 13 = (1,1,1) in row-major (ix*9 + iy*3 + iz)
        assert_eq!(cube.position(13), [0.0, 0.0, 0.0]);
        assert_eq!(cube.position(0), [-1.0, -1.0, -1.0]);
        assert_eq!(cube.position(26), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn set_value_is_visible_through_lock() {
        let cube = Cube::new([0.0; 3], [1.0; 3], [2, 2, 2]);
        cube.set_value(5, 42.0);
        assert_eq!(cube.value(5), 42.0);
    }

    #[test]
    fn tag_defaults_unset() {
        let cube = Cube::new([0.0; 3], [1.0; 3], [1, 1, 1]);
        assert_eq!(cube.cube_type(), CubeType::Unset);
        cube.set_cube_type(CubeType::Mo);
        assert_eq!(cube.cube_type(), CubeType::Mo);
    }
}
