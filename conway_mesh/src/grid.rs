//! Global grid: assembly target for reports and sequential reference.

use crate::error::SimResult;
use crate::partition::{dead_cells, PartitionSpec};
use crate::topology::Coords;
use crate::update::next_state;
use std::fmt;

/// Square `size x size` grid of cells, row-major, no border.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    cells: Vec<bool>,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![false; size * size],
        }
    }

    /// [`new`](Self::new) that reports allocation failure instead of aborting.
    pub fn try_new(size: usize) -> SimResult<Self> {
        let cells = dead_cells(size, size, "global grid")?;
        Ok(Self { size, cells })
    }

    /// Build from rows of 0/1 digits; any other character is dead.
    pub fn from_rows(rows: &[&str]) -> Self {
        let size = rows.len();
        let mut grid = Self::new(size);
        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().filter(|ch| !ch.is_whitespace()).take(size).enumerate() {
                grid.set(r, c, ch == '1');
            }
        }
        grid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.size + col]
    }

    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        self.cells[row * self.size + col] = alive;
    }

    /// Set a cell addressed with wraparound on both axes.
    pub fn set_wrapped(&mut self, row: usize, col: usize, alive: bool) {
        let (row, col) = (row % self.size, col % self.size);
        self.set(row, col, alive);
    }

    /// Kill every cell.
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    pub fn live_cells(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks(self.size.max(1))
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [bool]> {
        self.cells.chunks_mut(self.size.max(1))
    }

    /// Interior block owned by the rank at `coords`, row-major.
    pub fn scatter(&self, spec: &PartitionSpec, coords: Coords) -> Vec<bool> {
        let row0 = coords.row * spec.local_rows;
        let col0 = coords.col * spec.local_cols;
        let mut block = Vec::with_capacity(spec.interior_len());
        for r in row0..row0 + spec.local_rows {
            let start = r * self.size + col0;
            block.extend_from_slice(&self.cells[start..start + spec.local_cols]);
        }
        block
    }

    /// Inverse of [`scatter`](Self::scatter): `blocks` are in rank order.
    pub fn assemble(spec: &PartitionSpec, blocks: &[Vec<bool>]) -> SimResult<Self> {
        let mut grid = Self::try_new(spec.size)?;
        for (rank, block) in blocks.iter().enumerate() {
            let coords = spec.mesh.coords_of(rank);
            let row0 = coords.row * spec.local_rows;
            let col0 = coords.col * spec.local_cols;
            for (r, chunk) in block.chunks(spec.local_cols).enumerate() {
                let start = (row0 + r) * spec.size + col0;
                grid.cells[start..start + spec.local_cols].copy_from_slice(chunk);
            }
        }
        Ok(grid)
    }

    /// One generation on a single torus, no decomposition. Used as the
    /// reference the distributed run must match bit for bit.
    pub fn step(&self) -> Self {
        let n = self.size;
        let mut next = Self::new(n);
        for row in 0..n {
            for col in 0..n {
                // Offsets of n - 1 step backwards on the torus.
                #[rustfmt::skip]
                let offsets = [
                    (n - 1, n - 1), (n - 1, 0), (n - 1, 1),
                    (0, n - 1),                 (0, 1),
                    (1, n - 1),     (1, 0),     (1, 1),
                ];
                let count = offsets
                    .iter()
                    .filter(|&&(dr, dc)| self.get((row + dr) % n, (col + dc) % n))
                    .count() as u8;
                next.set(row, col, next_state(self.get(row, col), count));
            }
        }
        next
    }
}

/// Diagnostic matrix: one row per line, cells as `0`/`1` separated by spaces.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for (i, &alive) in row.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                f.write_str(if alive { "1" } else { "0" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::MeshShape;

    #[test]
    fn display_is_zero_one_matrix() {
        let grid = Grid::from_rows(&["10", "01"]);
        assert_eq!(grid.to_string(), "1 0\n0 1\n");
    }

    #[test]
    fn scatter_then_assemble_restores_grid() {
        let grid = Grid::from_rows(&["100100", "010010", "001001", "111000", "000111", "101010"]);
        let spec = PartitionSpec::validate_and_partition(6, MeshShape::new(3, 2)).unwrap();
        let blocks: Vec<_> = (0..6)
            .map(|rank| grid.scatter(&spec, spec.mesh.coords_of(rank)))
            .collect();
        assert_eq!(blocks[1], vec![true, false, false, false, true, false]);
        assert_eq!(Grid::assemble(&spec, &blocks).unwrap(), grid);
    }

    #[test]
    fn reference_step_wraps_around() {
        // Blinker straddling the right edge.
        let grid = Grid::from_rows(&["00000", "00000", "10011", "00000", "00000"]);
        let next = grid.step();
        let expected = Grid::from_rows(&["00000", "00001", "00001", "00001", "00000"]);
        assert_eq!(next, expected);
        assert_eq!(next.step(), grid);
    }
}
