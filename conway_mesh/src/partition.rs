//! Domain decomposition and per-rank partition storage.

use crate::error::{ConfigError, SimError, SimResult};
use crate::topology::MeshShape;

/// Border width on each side of the interior.
pub const GHOST: usize = 1;

/// Global extent and per-axis local extent shared by every rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSpec {
    pub size: usize,
    pub mesh: MeshShape,
    pub local_rows: usize,
    pub local_cols: usize,
}

impl PartitionSpec {
    /// Split an `size x size` grid over `mesh`, each axis independently.
    pub fn validate_and_partition(size: usize, mesh: MeshShape) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::ZeroExtent);
        }
        if mesh.size() == 0 {
            return Err(ConfigError::ZeroProcesses);
        }
        if size % mesh.rows != 0 || size % mesh.cols != 0 {
            return Err(ConfigError::NotDivisible {
                size,
                rows: mesh.rows,
                cols: mesh.cols,
            });
        }
        Ok(Self {
            size,
            mesh,
            local_rows: size / mesh.rows,
            local_cols: size / mesh.cols,
        })
    }

    pub fn interior_len(&self) -> usize {
        self.local_rows * self.local_cols
    }
}

/// `rows x cols` dead cells, or `ResourceExhausted` naming `what` when the
/// buffer cannot be reserved.
pub(crate) fn dead_cells(rows: usize, cols: usize, what: &'static str) -> SimResult<Vec<bool>> {
    let len = rows.checked_mul(cols).ok_or(SimError::ResourceExhausted {
        what,
        cells: usize::MAX,
    })?;
    let mut cells = Vec::new();
    cells
        .try_reserve_exact(len)
        .map_err(|_| SimError::ResourceExhausted { what, cells: len })?;
    cells.resize(len, false);
    Ok(cells)
}

/// One rank's grid: `local_rows x local_cols` interior wrapped in a ghost
/// ring, stored row-major with stride `local_cols + 2`.
///
/// Interior cells live at rows and columns `1..=local_*`; index 0 and
/// `local_* + 1` are ghost storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPartition {
    local_rows: usize,
    local_cols: usize,
    cells: Vec<bool>,
}

impl LocalPartition {
    /// Allocate a dead partition, reporting allocation failure instead of
    /// aborting the process.
    pub fn allocate(local_rows: usize, local_cols: usize) -> SimResult<Self> {
        let cells = dead_cells(local_rows + 2 * GHOST, local_cols + 2 * GHOST, "local partition")?;
        Ok(Self {
            local_rows,
            local_cols,
            cells,
        })
    }

    pub fn for_spec(spec: &PartitionSpec) -> SimResult<Self> {
        Self::allocate(spec.local_rows, spec.local_cols)
    }

    pub fn local_rows(&self) -> usize {
        self.local_rows
    }

    pub fn local_cols(&self) -> usize {
        self.local_cols
    }

    fn stride(&self) -> usize {
        self.local_cols + 2 * GHOST
    }

    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.stride() + col
    }

    /// Cell in padded coordinates (ghost ring included).
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[self.idx(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        let i = self.idx(row, col);
        self.cells[i] = alive;
    }

    /// Padded row `row`, ghost columns included.
    pub fn row(&self, row: usize) -> &[bool] {
        let start = self.idx(row, 0);
        &self.cells[start..start + self.stride()]
    }

    /// Interior cells of padded column `col`, top to bottom.
    pub fn interior_col(&self, col: usize) -> Vec<bool> {
        (GHOST..=self.local_rows).map(|r| self.get(r, col)).collect()
    }

    /// Overwrite the interior rows of padded column `col`.
    pub fn write_col(&mut self, col: usize, values: &[bool]) {
        debug_assert_eq!(values.len(), self.local_rows);
        for (offset, &alive) in values.iter().enumerate() {
            self.set(GHOST + offset, col, alive);
        }
    }

    /// Overwrite an entire padded row, ghost columns included.
    pub fn write_row(&mut self, row: usize, values: &[bool]) {
        debug_assert_eq!(values.len(), self.stride());
        let start = self.idx(row, 0);
        let stride = self.stride();
        self.cells[start..start + stride].copy_from_slice(values);
    }

    /// Owned interior cells, row-major, ghost ring excluded.
    pub fn interior(&self) -> Vec<bool> {
        let mut out = Vec::with_capacity(self.local_rows * self.local_cols);
        for r in GHOST..=self.local_rows {
            out.extend_from_slice(&self.row(r)[GHOST..=self.local_cols]);
        }
        out
    }

    /// Load interior cells from a row-major block. Ghost cells are untouched.
    pub fn load_interior(&mut self, block: &[bool]) {
        debug_assert_eq!(block.len(), self.local_rows * self.local_cols);
        for (r, chunk) in block.chunks(self.local_cols).enumerate() {
            let start = self.idx(r + GHOST, GHOST);
            self.cells[start..start + self.local_cols].copy_from_slice(chunk);
        }
    }

    pub fn live_interior_cells(&self) -> usize {
        self.interior().iter().filter(|&&alive| alive).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_mesh_partitions_evenly() {
        let spec = PartitionSpec::validate_and_partition(4, MeshShape::new(2, 2)).unwrap();
        assert_eq!((spec.local_rows, spec.local_cols), (2, 2));
        assert_eq!(spec.interior_len(), 4);
    }

    #[test]
    fn non_square_mesh_uses_each_axis() {
        let spec = PartitionSpec::validate_and_partition(6, MeshShape::new(3, 2)).unwrap();
        assert_eq!(spec.local_rows, 2);
        assert_eq!(spec.local_cols, 3);
    }

    #[test]
    fn indivisible_extent_rejected() {
        let err = PartitionSpec::validate_and_partition(5, MeshShape::new(2, 3)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::NotDivisible {
                size: 5,
                rows: 2,
                cols: 3
            }
        );

        // Divisible along rows only still fails.
        assert!(PartitionSpec::validate_and_partition(6, MeshShape::new(3, 4)).is_err());
        assert_eq!(
            PartitionSpec::validate_and_partition(0, MeshShape::new(1, 1)),
            Err(ConfigError::ZeroExtent)
        );
    }

    #[test]
    fn buffer_includes_ghost_ring_per_axis() {
        let part = LocalPartition::allocate(2, 3).unwrap();
        assert_eq!(part.row(0).len(), 5);
        assert_eq!(part.interior_col(1).len(), 2);
        assert_eq!(part.interior().len(), 6);
    }

    #[test]
    fn interior_load_leaves_ghosts_dead() {
        let mut part = LocalPartition::allocate(2, 2).unwrap();
        part.load_interior(&[true, true, true, true]);
        assert_eq!(part.live_interior_cells(), 4);
        assert!(part.row(0).iter().all(|&c| !c));
        assert!(part.row(3).iter().all(|&c| !c));
        assert!(!part.get(1, 0) && !part.get(1, 3));
    }

    #[test]
    fn boundary_accessors_address_the_right_cells() {
        let mut part = LocalPartition::allocate(2, 3).unwrap();
        part.load_interior(&[true, false, false, false, false, true]);
        assert_eq!(part.interior_col(1), vec![true, false]);
        assert_eq!(part.interior_col(3), vec![false, true]);

        part.write_col(0, &[true, true]);
        assert!(part.get(1, 0) && part.get(2, 0));
        part.write_row(3, &[true, false, false, false, true]);
        assert!(part.get(3, 0) && part.get(3, 4));
    }
}
