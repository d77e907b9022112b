//! Grid geometry for the composite: how many columns and rows a session
//! gets, where each thumbnail cell sits on the canvas, and where the logo
//! is anchored. Everything here is pure integer math.

use crate::error::{BoothError, BoothResult};

/// Pixel margins around and between grid cells.
///
/// `outer` frames the grid on the left, right and top. `inner` separates
/// neighbouring cells. `bottom` pads the canvas below the grid only; the
/// asymmetry versus the top is intentional and reserves room for the logo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Margins {
    pub outer: u32,
    pub inner: u32,
    pub bottom: u32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            outer: 20,
            inner: 10,
            bottom: 80,
        }
    }
}

impl Margins {
    pub const fn zero() -> Self {
        Self {
            outer: 0,
            inner: 0,
            bottom: 0,
        }
    }
}

/// Column/row split for a session of `cols * rows` thumbnails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub cols: u32,
    pub rows: u32,
}

impl GridLayout {
    /// Divisibility heuristic: prefer a 3-wide grid, fall back to 2-wide,
    /// else a single column. Not a rectangle packer; counts like 5 or 7
    /// always land in one column. `cols * rows == count` holds for every
    /// accepted input.
    pub fn for_count(count: u32) -> BoothResult<Self> {
        if count == 0 {
            return Err(BoothError::empty_input("grid layout needs at least one image"));
        }
        Ok(if count % 3 == 0 {
            Self {
                cols: 3,
                rows: count / 3,
            }
        } else if count % 2 == 0 {
            Self {
                cols: 2,
                rows: count / 2,
            }
        } else {
            Self {
                cols: 1,
                rows: count,
            }
        })
    }

    pub fn count(self) -> u32 {
        self.cols * self.rows
    }

    /// Canvas dimensions for a uniform cell size `(cw, ch)`.
    ///
    /// The top margin is counted once via `outer`; the extra space below
    /// the grid comes from `margins.bottom`.
    pub fn canvas_size(self, cell: (u32, u32), margins: Margins) -> (u32, u32) {
        let (cw, ch) = cell;
        let width = self.cols * cw + 2 * margins.outer + (self.cols - 1) * margins.inner;
        let height =
            self.rows * ch + margins.outer + (self.rows - 1) * margins.inner + margins.bottom;
        (width, height)
    }

    /// Top-left paste position of the cell at column `col`, row `row`.
    pub fn cell_origin(self, col: u32, row: u32, cell: (u32, u32), margins: Margins) -> (i64, i64) {
        let (cw, ch) = cell;
        let x = margins.outer + col * (margins.inner + cw);
        let y = margins.outer + row * (margins.inner + ch);
        (i64::from(x), i64::from(y))
    }

    /// Cell coordinates `(col, row)` in fill order. Column-major: all of
    /// column 0 top to bottom, then column 1, and so on.
    pub fn slots(self) -> impl Iterator<Item = (u32, u32)> {
        let rows = self.rows;
        (0..self.cols).flat_map(move |col| (0..rows).map(move |row| (col, row)))
    }
}

/// Bottom-right anchor for the logo: flush with the outer margin on the
/// right, lifted off the bottom edge by the inner margin.
pub fn logo_origin(canvas: (u32, u32), logo: (u32, u32), margins: Margins) -> (i64, i64) {
    let x = i64::from(canvas.0) - i64::from(margins.outer) - i64::from(logo.0);
    let y = i64::from(canvas.1) - i64::from(logo.1) - i64::from(margins.inner);
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_prefers_three_wide() {
        assert_eq!(GridLayout::for_count(6).unwrap(), GridLayout { cols: 3, rows: 2 });
        assert_eq!(GridLayout::for_count(9).unwrap(), GridLayout { cols: 3, rows: 3 });
        assert_eq!(GridLayout::for_count(3).unwrap(), GridLayout { cols: 3, rows: 1 });
    }

    #[test]
    fn grid_falls_back_to_two_then_one() {
        assert_eq!(GridLayout::for_count(4).unwrap(), GridLayout { cols: 2, rows: 2 });
        assert_eq!(GridLayout::for_count(2).unwrap(), GridLayout { cols: 2, rows: 1 });
        assert_eq!(GridLayout::for_count(5).unwrap(), GridLayout { cols: 1, rows: 5 });
        assert_eq!(GridLayout::for_count(7).unwrap(), GridLayout { cols: 1, rows: 7 });
        assert_eq!(GridLayout::for_count(1).unwrap(), GridLayout { cols: 1, rows: 1 });
    }

    #[test]
    fn grid_is_exact_for_all_small_counts() {
        for count in 1..=24u32 {
            let grid = GridLayout::for_count(count).unwrap();
            assert_eq!(grid.count(), count, "count {count}");
            assert!(matches!(grid.cols, 1..=3));
        }
    }

    #[test]
    fn zero_images_is_an_error() {
        assert!(matches!(
            GridLayout::for_count(0),
            Err(crate::BoothError::EmptyInput(_))
        ));
    }

    #[test]
    fn canvas_size_matches_reference_numbers() {
        let grid = GridLayout { cols: 3, rows: 2 };
        let margins = Margins {
            outer: 20,
            inner: 10,
            bottom: 80,
        };
        assert_eq!(grid.canvas_size((500, 375), margins), (1560, 860));
    }

    #[test]
    fn single_cell_with_zero_side_margins_is_cell_plus_bottom() {
        let grid = GridLayout { cols: 1, rows: 1 };
        let margins = Margins {
            outer: 0,
            inner: 0,
            bottom: 80,
        };
        assert_eq!(grid.canvas_size((500, 500), margins), (500, 580));
    }

    #[test]
    fn slots_fill_column_major() {
        let grid = GridLayout { cols: 2, rows: 2 };
        let order: Vec<_> = grid.slots().collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn cell_origins_include_margins() {
        let grid = GridLayout { cols: 3, rows: 2 };
        let margins = Margins {
            outer: 20,
            inner: 10,
            bottom: 80,
        };
        assert_eq!(grid.cell_origin(0, 0, (500, 375), margins), (20, 20));
        assert_eq!(grid.cell_origin(1, 0, (500, 375), margins), (530, 20));
        assert_eq!(grid.cell_origin(0, 1, (500, 375), margins), (20, 405));
    }

    #[test]
    fn logo_anchors_bottom_right() {
        let margins = Margins {
            outer: 20,
            inner: 10,
            bottom: 80,
        };
        assert_eq!(logo_origin((1560, 860), (200, 60), margins), (1340, 790));
    }
}
