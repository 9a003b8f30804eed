//! Initial interior contents for each rank.
//!
//! Every variant is a pure function of the seed value and common knowledge
//! (grid size, mesh, rank), so initialization is reproducible. A rank
//! only ever generates its own block.

use crate::error::{ConfigError, SimResult};
use crate::grid::Grid;
use crate::partition::{dead_cells, PartitionSpec};
use crate::patterns;
use crate::topology::ProcessTopology;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    /// Named pattern on an otherwise dead grid. Centered when no origin is given.
    Pattern {
        name: String,
        origin: Option<(usize, usize)>,
    },
    /// Random global grid: every mesh sees the same cells.
    Random(u64),
    /// Each rank fills its own interior from `seed + rank`. The global
    /// result depends on the mesh.
    PerProcess(u64),
    /// Explicit global grid.
    Grid(Grid),
}

impl Seed {
    pub fn pattern(name: impl Into<String>) -> Self {
        Seed::Pattern {
            name: name.into(),
            origin: None,
        }
    }

    /// The whole starting grid, when it is independent of the decomposition.
    pub fn global_grid(&self, size: usize) -> SimResult<Option<Grid>> {
        match self {
            Seed::Pattern { name, origin } => {
                let pattern = patterns::find(name)?;
                let origin = origin.unwrap_or_else(|| patterns::centered_origin(pattern, size));
                let mut grid = Grid::try_new(size)?;
                patterns::apply_pattern(&mut grid, pattern, origin);
                Ok(Some(grid))
            }
            Seed::Random(seed) => {
                let mut grid = Grid::try_new(size)?;
                patterns::apply_random_pattern(&mut grid, *seed);
                Ok(Some(grid))
            }
            Seed::PerProcess(_) => Ok(None),
            Seed::Grid(grid) => {
                check_size(grid, size)?;
                Ok(Some(grid.clone()))
            }
        }
    }

    /// Row-major interior block for the rank described by `topology`.
    ///
    /// Only the rank's own block is generated; its cells match the same
    /// block of [`global_grid`](Self::global_grid).
    pub fn interior(&self, spec: &PartitionSpec, topology: &ProcessTopology) -> SimResult<Vec<bool>> {
        let rows = topology.coords.row * spec.local_rows..(topology.coords.row + 1) * spec.local_rows;
        let cols = topology.coords.col * spec.local_cols..(topology.coords.col + 1) * spec.local_cols;
        let mut block = dead_cells(spec.local_rows, spec.local_cols, "seed block")?;

        match self {
            Seed::Pattern { name, origin } => {
                let pattern = patterns::find(name)?;
                let origin = origin.unwrap_or_else(|| patterns::centered_origin(pattern, spec.size));
                for (row, col) in patterns::placed_cells(pattern, origin, spec.size) {
                    if rows.contains(&row) && cols.contains(&col) {
                        block[(row - rows.start) * spec.local_cols + (col - cols.start)] = true;
                    }
                }
            }
            Seed::Random(seed) => {
                for (offset, cells) in block.chunks_mut(spec.local_cols).enumerate() {
                    patterns::fill_random_row(cells, *seed, rows.start + offset, cols.start);
                }
            }
            Seed::PerProcess(seed) => {
                patterns::fill_random(&mut block, seed.wrapping_add(topology.rank as u64));
            }
            Seed::Grid(grid) => {
                check_size(grid, spec.size)?;
                let source = grid.rows().skip(rows.start).take(spec.local_rows);
                for (cells, row) in block.chunks_mut(spec.local_cols).zip(source) {
                    cells.copy_from_slice(&row[cols.clone()]);
                }
            }
        }
        Ok(block)
    }
}

fn check_size(grid: &Grid, size: usize) -> Result<(), ConfigError> {
    if grid.size() != size {
        return Err(ConfigError::SeedSizeMismatch {
            expected: size,
            actual: grid.size(),
        });
    }
    Ok(())
}

impl Default for Seed {
    fn default() -> Self {
        Seed::Random(0)
    }
}
