//! Local application of the life rule against a haloed partition.

use crate::partition::{LocalPartition, GHOST};

/// Next state of one cell given its current state and live-neighbor count.
pub fn next_state(alive: bool, live_neighbors: u8) -> bool {
    match (alive, live_neighbors) {
        (true, 2) | (true, 3) => true, // Survival
        (false, 3) => true,            // Birth
        _ => false,                    // Death or stays dead
    }
}

/// Live cells among the eight around padded position `(row, col)`.
/// `row` and `col` must be interior positions so every neighbor is in bounds.
pub fn live_neighbors(grid: &LocalPartition, row: usize, col: usize) -> u8 {
    #[rustfmt::skip]
    let neighbors = [
        (row - 1, col - 1), (row - 1, col), (row - 1, col + 1),
        (row, col - 1),                     (row, col + 1),
        (row + 1, col - 1), (row + 1, col), (row + 1, col + 1),
    ];
    neighbors
        .iter()
        .filter(|&&(nr, nc)| grid.get(nr, nc))
        .count() as u8
}

/// Compute the next generation of every interior cell of `current` into
/// `next`. Reads ghost cells, never writes `current`; the ghost ring of
/// `next` is left as it was.
pub fn update(current: &LocalPartition, next: &mut LocalPartition) {
    debug_assert_eq!(current.local_rows(), next.local_rows());
    debug_assert_eq!(current.local_cols(), next.local_cols());

    for row in GHOST..=current.local_rows() {
        for col in GHOST..=current.local_cols() {
            let count = live_neighbors(current, row, col);
            next.set(row, col, next_state(current.get(row, col), count));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition(rows: usize, cols: usize, live: &[(usize, usize)]) -> LocalPartition {
        let mut part = LocalPartition::allocate(rows, cols).unwrap();
        for &(r, c) in live {
            part.set(r, c, true);
        }
        part
    }

    #[test]
    fn rule_table() {
        for count in 0..=8 {
            assert_eq!(next_state(true, count), count == 2 || count == 3);
            assert_eq!(next_state(false, count), count == 3);
        }
    }

    #[test]
    fn blinker_flips_orientation() {
        let current = partition(5, 5, &[(3, 2), (3, 3), (3, 4)]);
        let mut next = LocalPartition::allocate(5, 5).unwrap();
        update(&current, &mut next);

        let mut expected = LocalPartition::allocate(5, 5).unwrap();
        for r in 2..=4 {
            expected.set(r, 3, true);
        }
        assert_eq!(next.interior(), expected.interior());
    }

    #[test]
    fn ghost_cells_feed_boundary_neighbors() {
        // Three live ghosts above the top-left interior cell: birth at (1, 2)
        // needs exactly three live neighbors, all of them in the ghost row.
        let current = partition(3, 3, &[(0, 1), (0, 2), (0, 3)]);
        let mut next = LocalPartition::allocate(3, 3).unwrap();
        update(&current, &mut next);

        assert!(next.get(1, 2));
        assert_eq!(live_neighbors(&current, 1, 1), 2);
        assert!(!next.get(1, 1));
    }

    #[test]
    fn diagonal_ghost_corner_counts() {
        let current = partition(2, 2, &[(0, 0), (0, 1), (1, 0)]);
        assert_eq!(live_neighbors(&current, 1, 1), 3);
        let mut next = LocalPartition::allocate(2, 2).unwrap();
        update(&current, &mut next);
        assert!(next.get(1, 1));
    }

    #[test]
    fn update_is_pure() {
        let current = partition(4, 4, &[(1, 1), (1, 2), (2, 1), (3, 3), (0, 4), (4, 0)]);
        let snapshot = current.clone();

        let mut first = LocalPartition::allocate(4, 4).unwrap();
        let mut second = LocalPartition::allocate(4, 4).unwrap();
        update(&current, &mut first);
        update(&current, &mut second);

        assert_eq!(first, second);
        assert_eq!(current, snapshot);
    }

    #[test]
    fn stale_next_contents_are_overwritten() {
        let current = partition(3, 3, &[]);
        let mut next = partition(3, 3, &[(1, 1), (2, 2), (3, 3)]);
        update(&current, &mut next);
        assert_eq!(next.live_interior_cells(), 0);
    }
}
