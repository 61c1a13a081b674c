//! Clean-exit test and naive thirds-based sector classification.
//!
//! The grid is split into column thirds `[0, left)`, `[left, right)`,
//! `[right, W)` and row thirds likewise. The middle column third only
//! distinguishes N from S: every row at or below `top` maps to S.
use crate::direction::{Diagonal, Direction};
use crate::grid::PourPoint;

/// Floor-divided third boundaries of a grid shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorLimits {
    pub left: usize,
    pub right: usize,
    pub top: usize,
    pub bottom: usize,
}

impl SectorLimits {
    pub fn for_shape(rows: usize, cols: usize) -> Self {
        Self {
            left: cols / 3,
            right: 2 * cols / 3,
            top: rows / 3,
            bottom: 2 * rows / 3,
        }
    }
}

/// Result of the naive stage: either final, or a corner that still needs
/// the neighbour check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaiveDirection {
    Terminal(Direction),
    CornerCheck(Diagonal),
}

impl NaiveDirection {
    pub fn direction(self) -> Direction {
        match self {
            NaiveDirection::Terminal(d) => d,
            NaiveDirection::CornerCheck(d) => d.into(),
        }
    }
}

/// Whether the pour point lies on the outer ring of a `rows`×`cols` grid.
///
/// With `reference_compat` both coordinates are tested against the single
/// index set {0, rows-1, cols-1}.
pub fn is_clean_exit(rows: usize, cols: usize, pour: PourPoint, reference_compat: bool) -> bool {
    let last_row = rows - 1;
    let last_col = cols - 1;
    if reference_compat {
        let edges = [0, last_row, last_col];
        return edges.contains(&pour.row) || edges.contains(&pour.col);
    }
    pour.row == 0 || pour.row == last_row || pour.col == 0 || pour.col == last_col
}

/// Sector of a pour point. Does not look at edges; see [`naive_direction`].
pub fn sector_direction(limits: SectorLimits, pour: PourPoint) -> Direction {
    let PourPoint { row: r, col: c } = pour;
    if c < limits.left {
        if r < limits.top {
            Direction::NW
        } else if r < limits.bottom {
            Direction::W
        } else {
            Direction::SW
        }
    } else if c < limits.right {
        if r < limits.top {
            Direction::N
        } else {
            Direction::S
        }
    } else if r < limits.top {
        Direction::NE
    } else if r < limits.bottom {
        Direction::E
    } else {
        Direction::SE
    }
}

/// Classify a pour point within its grid, before any neighbour lookup.
pub fn naive_direction(rows: usize, cols: usize, pour: PourPoint, reference_compat: bool) -> NaiveDirection {
    if !is_clean_exit(rows, cols, pour, reference_compat) {
        return NaiveDirection::Terminal(Direction::Dirty);
    }
    let d = sector_direction(SectorLimits::for_shape(rows, cols), pour);
    match d.diagonal() {
        Some(corner) => NaiveDirection::CornerCheck(corner),
        None => NaiveDirection::Terminal(d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pp(row: usize, col: usize) -> PourPoint {
        PourPoint { row, col }
    }

    #[test]
    fn limits_use_floor_division() {
        assert_eq!(SectorLimits::for_shape(3, 3), SectorLimits { left: 1, right: 2, top: 1, bottom: 2 });
        assert_eq!(SectorLimits::for_shape(7, 5), SectorLimits { left: 1, right: 3, top: 2, bottom: 4 });
        assert_eq!(SectorLimits::for_shape(1, 1), SectorLimits { left: 0, right: 0, top: 0, bottom: 0 });
    }

    #[test]
    fn three_by_three_sectors() {
        use Direction::*;
        let lim = SectorLimits::for_shape(3, 3);
        let expected = [[NW, N, NE], [W, S, E], [SW, S, SE]];
        for (r, row) in expected.iter().enumerate() {
            for (c, &d) in row.iter().enumerate() {
                assert_eq!(sector_direction(lim, pp(r, c)), d, "cell ({r},{c})");
            }
        }
    }

    #[test]
    fn middle_column_has_no_centre() {
        let lim = SectorLimits::for_shape(9, 9);
        for r in 3..9 {
            assert_eq!(sector_direction(lim, pp(r, 4)), Direction::S);
        }
        assert_eq!(sector_direction(lim, pp(2, 4)), Direction::N);
    }

    #[test]
    fn thirds_boundaries_are_exclusive() {
        let lim = SectorLimits::for_shape(6, 6);
        assert_eq!(sector_direction(lim, pp(0, 1)), Direction::NW);
        assert_eq!(sector_direction(lim, pp(0, 2)), Direction::N);
        assert_eq!(sector_direction(lim, pp(0, 4)), Direction::NE);
        assert_eq!(sector_direction(lim, pp(2, 5)), Direction::E);
        assert_eq!(sector_direction(lim, pp(4, 5)), Direction::SE);
    }

    #[test]
    fn clean_exit_requires_an_edge() {
        assert!(is_clean_exit(3, 3, pp(0, 1), false));
        assert!(is_clean_exit(3, 3, pp(1, 2), false));
        assert!(is_clean_exit(3, 3, pp(2, 2), false));
        assert!(!is_clean_exit(3, 3, pp(1, 1), false));
        assert!(!is_clean_exit(5, 4, pp(2, 2), false));
    }

    #[test]
    fn reference_edges_mix_axes() {
        // Row 3 is interior of a 6x4 grid, but equals W-1 in the shared index set.
        assert!(!is_clean_exit(6, 4, pp(3, 1), false));
        assert!(is_clean_exit(6, 4, pp(3, 1), true));
        // Row 5 = H-1 is an edge either way.
        assert!(is_clean_exit(6, 4, pp(5, 1), true));
    }

    #[test]
    fn naive_dispatch() {
        assert_eq!(naive_direction(3, 3, pp(0, 1), false), NaiveDirection::Terminal(Direction::N));
        assert_eq!(naive_direction(3, 3, pp(1, 1), false), NaiveDirection::Terminal(Direction::Dirty));
        assert_eq!(naive_direction(3, 3, pp(2, 2), false), NaiveDirection::CornerCheck(Diagonal::SE));
        assert_eq!(naive_direction(3, 3, pp(0, 0), false).direction(), Direction::NW);
    }

    #[test]
    fn single_pixel_grid_is_clean() {
        // All limits are zero, so the only pixel lands in the SE corner.
        assert_eq!(naive_direction(1, 1, pp(0, 0), false), NaiveDirection::CornerCheck(Diagonal::SE));
    }
}
