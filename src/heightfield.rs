use std::ops::{Index, IndexMut};

use anyhow::{Result, ensure};
use glam::Vec3;

/// Grid dimensions, both guaranteed non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    x_size: usize,
    z_size: usize,
}

impl GridSize {
    pub fn new(x_size: usize, z_size: usize) -> Result<Self> {
        ensure!(
            x_size > 0 && z_size > 0,
            "grid dimensions must be positive, got {x_size}x{z_size}"
        );
        Ok(Self { x_size, z_size })
    }

    pub fn x_size(&self) -> usize {
        self.x_size
    }

    pub fn z_size(&self) -> usize {
        self.z_size
    }

    pub fn vertex_count(&self) -> usize {
        self.x_size * self.z_size
    }

    /// `x_size + z_size`, the quantity every generation formula scales with.
    pub fn extent(&self) -> f32 {
        (self.x_size + self.z_size) as f32
    }

    pub fn contains(&self, x: usize, z: usize) -> bool {
        x < self.x_size && z < self.z_size
    }

    /// Every `(x, z)` coordinate, x-major.
    pub fn coords(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let z_size = self.z_size;
        (0..self.x_size).flat_map(move |x| (0..z_size).map(move |z| (x, z)))
    }
}

/// Dense `x_size * z_size` grid stored flat at `x * z_size + z`.
///
/// Indexing outside the grid panics; use [`Grid::try_get`] when the coordinate
/// may be off the edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    size: GridSize,
    cells: Vec<T>,
}

pub type Heightfield = Grid<f32>;
pub type NormalField = Grid<Vec3>;

impl<T: Clone> Grid<T> {
    pub fn filled(size: GridSize, value: T) -> Self {
        Self {
            size,
            cells: vec![value; size.vertex_count()],
        }
    }
}

impl<T> Grid<T> {
    pub fn from_fn(size: GridSize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let cells = size.coords().map(|(x, z)| f(x, z)).collect();
        Self { size, cells }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn x_size(&self) -> usize {
        self.size.x_size
    }

    pub fn z_size(&self) -> usize {
        self.size.z_size
    }

    pub fn try_get(&self, x: usize, z: usize) -> Option<&T> {
        self.size.contains(x, z).then(|| &self.cells[x * self.size.z_size + z])
    }

    pub fn get(&self, x: usize, z: usize) -> &T {
        &self[(x, z)]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.cells.iter_mut()
    }

    fn offset(&self, x: usize, z: usize) -> usize {
        assert!(
            self.size.contains(x, z),
            "grid index ({x}, {z}) out of range for {}x{} grid",
            self.size.x_size,
            self.size.z_size
        );
        x * self.size.z_size + z
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (x, z): (usize, usize)) -> &T {
        &self.cells[self.offset(x, z)]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (x, z): (usize, usize)) -> &mut T {
        let offset = self.offset(x, z);
        &mut self.cells[offset]
    }
}

impl Heightfield {
    pub fn zeroed(size: GridSize) -> Self {
        Self::filled(size, 0.0)
    }

    /// Largest height in the grid.
    pub fn max_value(&self) -> f32 {
        self.cells.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }
}
