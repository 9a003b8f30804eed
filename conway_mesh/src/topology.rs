//! Periodic 2D process mesh.
//!
//! Ranks are laid out row-major over a `rows x cols` torus. Each rank's four
//! cardinal neighbors are computed once when its [`ProcessTopology`] is built
//! and stored in a small array indexed by [`Direction`], so the per-generation
//! exchange never re-derives them.

use crate::comm::Rank;
use crate::error::ConfigError;
use std::fmt;

/// Shape of the process mesh (rows x cols of processes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshShape {
    pub rows: usize,
    pub cols: usize,
}

impl MeshShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Most square factorization of `processes` into two dimensions, with
    /// `rows >= cols`.
    pub fn balanced(processes: usize) -> Result<Self, ConfigError> {
        if processes == 0 {
            return Err(ConfigError::ZeroProcesses);
        }
        // Largest divisor not above the square root becomes the column count.
        let mut cols = 1;
        let mut d = 1;
        while d * d <= processes {
            if processes % d == 0 {
                cols = d;
            }
            d += 1;
        }
        Ok(Self {
            rows: processes / cols,
            cols,
        })
    }

    pub fn size(&self) -> usize {
        self.rows * self.cols
    }

    pub fn rank_of(&self, coords: Coords) -> Rank {
        coords.row * self.cols + coords.col
    }

    pub fn coords_of(&self, rank: Rank) -> Coords {
        Coords {
            row: rank / self.cols,
            col: rank % self.cols,
        }
    }

    /// Coordinates one step away in `dir`, wrapping around the torus.
    pub fn shift(&self, coords: Coords, dir: Direction) -> Coords {
        let Coords { row, col } = coords;
        match dir {
            Direction::Up => Coords {
                row: (row + self.rows - 1) % self.rows,
                col,
            },
            Direction::Down => Coords {
                row: (row + 1) % self.rows,
                col,
            },
            Direction::Left => Coords {
                row,
                col: (col + self.cols - 1) % self.cols,
            },
            Direction::Right => Coords {
                row,
                col: (col + 1) % self.cols,
            },
        }
    }

    /// Neighbor ranks of the process at `coords`.
    pub fn neighbors_of(&self, coords: Coords) -> Neighbors {
        let mut ranks = [0; 4];
        for dir in Direction::ALL {
            ranks[dir.index()] = self.rank_of(self.shift(coords, dir));
        }
        Neighbors(ranks)
    }
}

impl fmt::Display for MeshShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Position of a process within the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coords {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Neighbor ranks indexed by [`Direction`]. Always populated: on a torus
/// every process has four neighbors, possibly itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors([Rank; 4]);

impl Neighbors {
    pub fn get(&self, dir: Direction) -> Rank {
        self.0[dir.index()]
    }
}

/// Immutable view of one process's place in the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessTopology {
    pub shape: MeshShape,
    pub rank: Rank,
    pub coords: Coords,
    pub neighbors: Neighbors,
}

impl ProcessTopology {
    pub fn new(shape: MeshShape, rank: Rank) -> Self {
        let coords = shape.coords_of(rank);
        Self {
            shape,
            rank,
            coords,
            neighbors: shape.neighbors_of(coords),
        }
    }

    pub fn neighbor(&self, dir: Direction) -> Rank {
        self.neighbors.get(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_factorization_is_square_as_possible() {
        assert_eq!(MeshShape::balanced(1).unwrap(), MeshShape::new(1, 1));
        assert_eq!(MeshShape::balanced(2).unwrap(), MeshShape::new(2, 1));
        assert_eq!(MeshShape::balanced(4).unwrap(), MeshShape::new(2, 2));
        assert_eq!(MeshShape::balanced(6).unwrap(), MeshShape::new(3, 2));
        assert_eq!(MeshShape::balanced(7).unwrap(), MeshShape::new(7, 1));
        assert_eq!(MeshShape::balanced(12).unwrap(), MeshShape::new(4, 3));
        assert_eq!(MeshShape::balanced(16).unwrap(), MeshShape::new(4, 4));
    }

    #[test]
    fn zero_processes_rejected() {
        assert_eq!(MeshShape::balanced(0), Err(ConfigError::ZeroProcesses));
    }

    #[test]
    fn rank_coords_roundtrip_row_major() {
        let shape = MeshShape::new(3, 2);
        assert_eq!(shape.coords_of(0), Coords { row: 0, col: 0 });
        assert_eq!(shape.coords_of(1), Coords { row: 0, col: 1 });
        assert_eq!(shape.coords_of(5), Coords { row: 2, col: 1 });
        for rank in 0..shape.size() {
            assert_eq!(shape.rank_of(shape.coords_of(rank)), rank);
        }
    }

    #[test]
    fn neighbors_wrap_at_mesh_edges() {
        let shape = MeshShape::new(3, 3);
        let corner = ProcessTopology::new(shape, 0);
        assert_eq!(corner.neighbor(Direction::Up), 6);
        assert_eq!(corner.neighbor(Direction::Down), 3);
        assert_eq!(corner.neighbor(Direction::Left), 2);
        assert_eq!(corner.neighbor(Direction::Right), 1);

        let center = ProcessTopology::new(shape, 4);
        assert_eq!(center.neighbor(Direction::Up), 1);
        assert_eq!(center.neighbor(Direction::Down), 7);
        assert_eq!(center.neighbor(Direction::Left), 3);
        assert_eq!(center.neighbor(Direction::Right), 5);
    }

    #[test]
    fn degenerate_meshes_point_at_self_or_single_peer() {
        let single = ProcessTopology::new(MeshShape::new(1, 1), 0);
        for dir in Direction::ALL {
            assert_eq!(single.neighbor(dir), 0);
        }

        // Two columns: left and right neighbor coincide.
        let pair = ProcessTopology::new(MeshShape::new(1, 2), 0);
        assert_eq!(pair.neighbor(Direction::Left), 1);
        assert_eq!(pair.neighbor(Direction::Right), 1);
        assert_eq!(pair.neighbor(Direction::Up), 0);
    }

    #[test]
    fn neighbor_relation_is_symmetric() {
        let shape = MeshShape::new(4, 3);
        for rank in 0..shape.size() {
            let topo = ProcessTopology::new(shape, rank);
            for dir in Direction::ALL {
                let peer = ProcessTopology::new(shape, topo.neighbor(dir));
                assert_eq!(peer.neighbor(dir.opposite()), rank);
            }
        }
    }
}
