//! Directional keyboard focus movement across the bookmark grid.
//!
//! Rows may be shorter than the configured column count (only the last row in
//! practice), so moving vertically between rows of different widths remaps
//! the column according to how the rows are aligned on screen.

use super::grid::{Alignment, GridLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Keys the grid reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Move(Direction),
    /// Backspace / Escape.
    Back,
}

/// Where a tile sits and the shape around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    pub col: usize,
    pub row: usize,
    /// Number of tiles in this tile's own row.
    pub col_count: usize,
    /// Number of rows in the whole grid.
    pub row_count: usize,
}

impl GridPosition {
    /// Position of the tile at (`col`, `row`), if such a tile exists.
    pub fn of(grid: &GridLayout, col: usize, row: usize) -> Option<Self> {
        grid.tile(col, row)?;
        Some(Self {
            col,
            row,
            col_count: grid.column_count(row)?,
            row_count: grid.row_count(),
        })
    }
}

/// What a key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Move focus to the tile at (col, row).
    Focus(usize, usize),
    /// Activate the back affordance.
    Back,
    Ignored,
}

/// React to `key` given the current focus.
///
/// With no focused tile, any movement key focuses the first tile.
pub fn handle_key(
    grid: &GridLayout,
    focus: Option<(usize, usize)>,
    key: NavKey,
    alignment: Alignment,
    back_visible: bool,
) -> NavOutcome {
    let direction = match key {
        NavKey::Back if back_visible => return NavOutcome::Back,
        NavKey::Back => return NavOutcome::Ignored,
        NavKey::Move(direction) => direction,
    };

    let position = focus.and_then(|(col, row)| GridPosition::of(grid, col, row));
    let Some(position) = position else {
        return match grid.first_tile() {
            Some(_) => NavOutcome::Focus(0, 0),
            None => NavOutcome::Ignored,
        };
    };

    match step(grid, position, direction, alignment) {
        Some((col, row)) => NavOutcome::Focus(col, row),
        None => NavOutcome::Ignored,
    }
}

/// Compute the tile reached from `from` by moving in `direction`.
pub fn step(
    grid: &GridLayout,
    from: GridPosition,
    direction: Direction,
    alignment: Alignment,
) -> Option<(usize, usize)> {
    let GridPosition {
        col,
        row,
        col_count,
        row_count,
    } = from;

    let (target_col, target_row) = match direction {
        Direction::Left if col > 0 => (col - 1, row),
        Direction::Left if row > 0 => (grid.column_count(row - 1)?.checked_sub(1)?, row - 1),
        Direction::Left => return None,

        Direction::Right if col + 1 < col_count => (col + 1, row),
        Direction::Right if row + 1 < row_count => (0, row + 1),
        Direction::Right => return None,

        Direction::Up => {
            let target_row = row.checked_sub(1)?;
            let target_count = grid.column_count(target_row)?;
            (remap_up(col, col_count, target_count, alignment)?, target_row)
        }
        Direction::Down => {
            if row + 1 >= row_count {
                return None;
            }
            let target_row = row + 1;
            let target_count = grid.column_count(target_row)?;
            (remap_down(col, col_count, target_count, alignment)?, target_row)
        }
    };

    grid.tile(target_col, target_row)?;
    Some((target_col, target_row))
}

/// Column reached when moving down. Always clamped into the target row.
fn remap_down(col: usize, count: usize, target: usize, alignment: Alignment) -> Option<usize> {
    if target == 0 {
        return None;
    }
    let last = target as isize - 1;
    let col = col as isize;
    let diff = count as isize - target as isize;
    let new_col = match alignment {
        _ if diff == 0 => col,
        Alignment::Left => col.min(last),
        Alignment::Center => (col - ceil_half(diff)).clamp(0, last),
        Alignment::Right => (col - diff).clamp(0, last),
    };
    usize::try_from(new_col).ok()
}

/// Column reached when moving up. Not clamped: a column that lands outside
/// the target row simply has no tile and the move is dropped.
fn remap_up(col: usize, count: usize, target: usize, alignment: Alignment) -> Option<usize> {
    let col = col as isize;
    let diff = count as isize - target as isize;
    let new_col = match alignment {
        Alignment::Left => col,
        Alignment::Center => col - ceil_half(diff),
        Alignment::Right => col - diff,
    };
    usize::try_from(new_col).ok()
}

/// `ceil(n / 2)` for signed `n`.
fn ceil_half(n: isize) -> isize {
    -((-n).div_euclid(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bookmarks::BookmarkNode;
    use crate::core::grid::SpecialFolders;

    const ALIGNMENTS: [Alignment; 3] = [Alignment::Left, Alignment::Center, Alignment::Right];

    fn grid(n: usize, columns: usize) -> GridLayout {
        let children: Vec<_> = (0..n)
            .map(|i| BookmarkNode::Link {
                id: i.to_string(),
                title: format!("t{i}"),
                url: format!("https://t{i}.example/"),
            })
            .collect();
        let folders = SpecialFolders {
            bookmarks_bar: true,
            other: true,
            mobile: true,
        };
        GridLayout::build("1", &children, columns, &folders)
    }

    fn press(g: &GridLayout, at: (usize, usize), d: Direction, a: Alignment) -> NavOutcome {
        handle_key(g, Some(at), NavKey::Move(d), a, false)
    }

    #[test]
    fn ceil_half_rounds_toward_positive() {
        assert_eq!(ceil_half(3), 2);
        assert_eq!(ceil_half(4), 2);
        assert_eq!(ceil_half(-3), -1);
        assert_eq!(ceil_half(0), 0);
    }

    #[test]
    fn right_from_row_end_wraps_to_next_row() {
        let g = grid(12, 5);
        assert_eq!(
            press(&g, (4, 0), Direction::Right, Alignment::Left),
            NavOutcome::Focus(0, 1)
        );
        assert_eq!(
            press(&g, (1, 2), Direction::Right, Alignment::Left),
            NavOutcome::Ignored
        );
    }

    #[test]
    fn left_from_row_start_wraps_to_previous_row_end() {
        let g = grid(12, 5);
        assert_eq!(
            press(&g, (0, 2), Direction::Left, Alignment::Left),
            NavOutcome::Focus(4, 1)
        );
        assert_eq!(
            press(&g, (0, 0), Direction::Left, Alignment::Left),
            NavOutcome::Ignored
        );
    }

    #[test]
    fn horizontal_moves_stay_in_row_away_from_edges() {
        let g = grid(17, 4);
        for row in 0..g.row_count() {
            let count = g.column_count(row).unwrap();
            for col in 0..count {
                let right = press(&g, (col, row), Direction::Right, Alignment::Left);
                if col + 1 < count {
                    assert_eq!(right, NavOutcome::Focus(col + 1, row));
                } else if row + 1 < g.row_count() {
                    assert_eq!(right, NavOutcome::Focus(0, row + 1));
                }
                let left = press(&g, (col, row), Direction::Left, Alignment::Left);
                if col > 0 {
                    assert_eq!(left, NavOutcome::Focus(col - 1, row));
                } else if row > 0 {
                    let prev = g.column_count(row - 1).unwrap();
                    assert_eq!(left, NavOutcome::Focus(prev - 1, row - 1));
                }
            }
        }
    }

    #[test]
    fn vertical_moves_stop_at_grid_edges() {
        let g = grid(12, 5);
        for a in ALIGNMENTS {
            for col in 0..5 {
                assert_eq!(press(&g, (col, 0), Direction::Up, a), NavOutcome::Ignored);
            }
            for col in 0..2 {
                assert_eq!(press(&g, (col, 2), Direction::Down, a), NavOutcome::Ignored);
            }
        }
    }

    #[test]
    fn down_into_short_row_left_aligned_clamps() {
        let g = grid(12, 5);
        let down = |col| press(&g, (col, 1), Direction::Down, Alignment::Left);
        assert_eq!(down(0), NavOutcome::Focus(0, 2));
        assert_eq!(down(1), NavOutcome::Focus(1, 2));
        assert_eq!(down(4), NavOutcome::Focus(1, 2));
    }

    #[test]
    fn down_into_short_row_centered_shifts_and_clamps() {
        // Row of 5 over a row of 2: diff 3, shift ceil(1.5) = 2.
        let g = grid(12, 5);
        let down = |col| press(&g, (col, 1), Direction::Down, Alignment::Center);
        assert_eq!(down(0), NavOutcome::Focus(0, 2));
        assert_eq!(down(2), NavOutcome::Focus(0, 2));
        assert_eq!(down(3), NavOutcome::Focus(1, 2));
        assert_eq!(down(4), NavOutcome::Focus(1, 2));
    }

    #[test]
    fn down_into_short_row_right_aligned_shifts_and_clamps() {
        let g = grid(12, 5);
        let down = |col| press(&g, (col, 1), Direction::Down, Alignment::Right);
        assert_eq!(down(0), NavOutcome::Focus(0, 2));
        assert_eq!(down(3), NavOutcome::Focus(0, 2));
        assert_eq!(down(4), NavOutcome::Focus(1, 2));
    }

    #[test]
    fn up_from_short_row_remaps_without_clamping() {
        let g = grid(12, 5);
        let up = |col, a| press(&g, (col, 2), Direction::Up, a);
        assert_eq!(up(1, Alignment::Left), NavOutcome::Focus(1, 1));
        // diff = 2 - 5 = -3, shift ceil(-1.5) = -1.
        assert_eq!(up(0, Alignment::Center), NavOutcome::Focus(1, 1));
        assert_eq!(up(1, Alignment::Center), NavOutcome::Focus(2, 1));
        assert_eq!(up(0, Alignment::Right), NavOutcome::Focus(3, 1));
        assert_eq!(up(1, Alignment::Right), NavOutcome::Focus(4, 1));
    }

    #[test]
    fn equal_rows_keep_column() {
        let g = grid(10, 5);
        for a in ALIGNMENTS {
            assert_eq!(press(&g, (3, 0), Direction::Down, a), NavOutcome::Focus(3, 1));
            assert_eq!(press(&g, (3, 1), Direction::Up, a), NavOutcome::Focus(3, 0));
        }
    }

    #[test]
    fn no_focus_goes_to_first_tile() {
        let g = grid(12, 5);
        for d in [Direction::Left, Direction::Right, Direction::Up, Direction::Down] {
            assert_eq!(
                handle_key(&g, None, NavKey::Move(d), Alignment::Left, false),
                NavOutcome::Focus(0, 0)
            );
        }
        // A stale focus from an earlier folder counts as no focus.
        assert_eq!(
            handle_key(&g, Some((4, 9)), NavKey::Move(Direction::Up), Alignment::Left, false),
            NavOutcome::Focus(0, 0)
        );
        let empty = grid(0, 5);
        assert_eq!(
            handle_key(&empty, None, NavKey::Move(Direction::Down), Alignment::Left, false),
            NavOutcome::Ignored
        );
    }

    #[test]
    fn back_only_when_visible() {
        let g = grid(3, 5);
        assert_eq!(
            handle_key(&g, Some((0, 0)), NavKey::Back, Alignment::Left, true),
            NavOutcome::Back
        );
        assert_eq!(
            handle_key(&g, Some((0, 0)), NavKey::Back, Alignment::Left, false),
            NavOutcome::Ignored
        );
    }
}
