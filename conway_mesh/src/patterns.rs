//! Named starting patterns and reproducible random fills.

use crate::error::ConfigError;
use crate::grid::Grid;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A named starting pattern; cells are `(row, col)` offsets from its top-left.
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(usize, usize)],
}

impl Pattern {
    /// Bounding box as `(height, width)`.
    pub fn extent(&self) -> (usize, usize) {
        let height = self.cells.iter().map(|&(r, _)| r + 1).max().unwrap_or(0);
        let width = self.cells.iter().map(|&(_, c)| c + 1).max().unwrap_or(0);
        (height, width)
    }
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "Glider",
        cells: &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
    },
    Pattern {
        name: "Blinker",
        cells: &[(0, 0), (0, 1), (0, 2)],
    },
    Pattern {
        name: "Toad",
        cells: &[(0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2)],
    },
    Pattern {
        name: "Beacon",
        cells: &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 2), (2, 3), (3, 2), (3, 3)],
    },
    Pattern {
        name: "Pulsar",
        cells: &[
            // Top section
            (0, 2), (0, 3), (0, 4), (0, 8), (0, 9), (0, 10),
            (2, 0), (2, 5), (2, 7), (2, 12),
            (3, 0), (3, 5), (3, 7), (3, 12),
            (4, 0), (4, 5), (4, 7), (4, 12),
            (5, 2), (5, 3), (5, 4), (5, 8), (5, 9), (5, 10),
            // Bottom section (mirrored)
            (7, 2), (7, 3), (7, 4), (7, 8), (7, 9), (7, 10),
            (8, 0), (8, 5), (8, 7), (8, 12),
            (9, 0), (9, 5), (9, 7), (9, 12),
            (10, 0), (10, 5), (10, 7), (10, 12),
            (12, 2), (12, 3), (12, 4), (12, 8), (12, 9), (12, 10),
        ],
    },
    Pattern {
        name: "R-pentomino",
        cells: &[(1, 1), (1, 2), (0, 2), (2, 1), (2, 0)],
    },
    Pattern {
        name: "Gosper Glider Gun",
        cells: &[
            (4, 0), (4, 1), (5, 0), (5, 1),
            (4, 10), (5, 10), (6, 10), (3, 11), (7, 11), (2, 12), (8, 12),
            (2, 13), (8, 13), (5, 14), (3, 15), (7, 15), (4, 16), (5, 16),
            (6, 16), (5, 17), (2, 20), (3, 20), (4, 20), (2, 21), (3, 21),
            (4, 21), (1, 22), (5, 22), (0, 24), (1, 24), (5, 24), (6, 24),
            (2, 34), (3, 34), (2, 35), (3, 35),
        ],
    },
];

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Look a pattern up by name, ignoring case, spaces, dashes and underscores.
pub fn find(name: &str) -> Result<&'static Pattern, ConfigError> {
    let wanted = normalize(name);
    PATTERNS
        .iter()
        .find(|p| normalize(p.name) == wanted)
        .ok_or_else(|| ConfigError::UnknownPattern(name.to_string()))
}

/// Top-left position that centers `pattern` on a `size x size` grid.
pub fn centered_origin(pattern: &Pattern, size: usize) -> (usize, usize) {
    let (height, width) = pattern.extent();
    (size.saturating_sub(height) / 2, size.saturating_sub(width) / 2)
}

/// Global `(row, col)` positions of `pattern` placed at `origin` on a
/// `size x size` torus.
pub fn placed_cells(
    pattern: &Pattern,
    origin: (usize, usize),
    size: usize,
) -> impl Iterator<Item = (usize, usize)> + '_ {
    pattern
        .cells
        .iter()
        .map(move |&(row, col)| ((origin.0 + row) % size, (origin.1 + col) % size))
}

pub fn apply_pattern(grid: &mut Grid, pattern: &Pattern, origin: (usize, usize)) {
    grid.clear();
    for (row, col) in placed_cells(pattern, origin, grid.size()) {
        grid.set(row, col, true);
    }
}

/// Fill `cells` with independent fair coin flips drawn from `seed`.
pub fn fill_random(cells: &mut [bool], seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for cell in cells.iter_mut() {
        *cell = rng.gen_bool(0.5);
    }
}

/// Fill `cells` with row `row` of the random grid drawn from `seed`,
/// starting at column `first_col`.
///
/// Each row is its own ChaCha stream and each cell one word of it, so a
/// cell depends only on the seed and its global position. Any block of the
/// grid can be drawn without generating the rest.
pub fn fill_random_row(cells: &mut [bool], seed: u64, row: usize, first_col: usize) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(row as u64);
    rng.set_word_pos(first_col as u128);
    for cell in cells.iter_mut() {
        *cell = rng.next_u32() & 1 == 1;
    }
}

pub fn apply_random_pattern(grid: &mut Grid, seed: u64) {
    for (row, cells) in grid.rows_mut().enumerate() {
        fill_random_row(cells, seed, row, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_separators() {
        assert_eq!(find("glider").unwrap().name, "Glider");
        assert_eq!(find("r_pentomino").unwrap().name, "R-pentomino");
        assert_eq!(find("gosper-glider-gun").unwrap().name, "Gosper Glider Gun");
        assert_eq!(
            find("spaceship").err(),
            Some(ConfigError::UnknownPattern("spaceship".into()))
        );
    }

    #[test]
    fn extents_match_known_shapes() {
        assert_eq!(find("blinker").unwrap().extent(), (1, 3));
        assert_eq!(find("pulsar").unwrap().extent(), (13, 13));
        assert_eq!(find("gosper glider gun").unwrap().extent(), (9, 36));
    }

    #[test]
    fn centered_blinker() {
        let blinker = find("blinker").unwrap();
        let mut grid = Grid::new(5);
        apply_pattern(&mut grid, blinker, centered_origin(blinker, 5));
        assert_eq!(grid, Grid::from_rows(&["00000", "00000", "01110", "00000", "00000"]));
    }

    #[test]
    fn pattern_wraps_past_the_edge() {
        let blinker = find("blinker").unwrap();
        let mut grid = Grid::new(4);
        apply_pattern(&mut grid, blinker, (3, 3));
        assert!(grid.get(3, 3) && grid.get(3, 0) && grid.get(3, 1));
        assert_eq!(grid.live_cells(), 3);
    }

    #[test]
    fn random_fill_is_reproducible() {
        let mut a = Grid::new(8);
        let mut b = Grid::new(8);
        apply_random_pattern(&mut a, 7);
        apply_random_pattern(&mut b, 7);
        assert_eq!(a, b);
        assert!(a.live_cells() > 0 && a.live_cells() < 64);

        let mut c = Grid::new(8);
        apply_random_pattern(&mut c, 8);
        assert_ne!(a, c);
    }

    #[test]
    fn random_row_can_start_mid_row() {
        let mut grid = Grid::new(16);
        apply_random_pattern(&mut grid, 5);
        let row = grid.rows().nth(9).unwrap().to_vec();

        let mut tail = vec![false; 10];
        fill_random_row(&mut tail, 5, 9, 6);
        assert_eq!(tail, row[6..]);
    }

    #[test]
    fn apply_pattern_replaces_previous_contents() {
        let glider = find("glider").unwrap();
        let mut grid = Grid::new(6);
        apply_random_pattern(&mut grid, 1);
        apply_pattern(&mut grid, glider, (0, 0));
        assert_eq!(grid.live_cells(), 5);
    }
}
